// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resolvers and the built-in type models.
//!
//! A resolver claims a [`TypeDescriptor`] and produces an unvalidated model,
//! or declines without side effects. The container consults resolvers in
//! registration order and stops at the first claim.
//!
//! Built-ins:
//! - [`ScalarResolver`]: fixed-width primitives ([`ScalarModel`])
//! - [`CompositeResolver`]: struct, table, union and enum declarations
//!   ([`StructModel`], [`TableModel`], [`UnionModel`], [`EnumModel`])
//!
//! Custom resolvers are an advanced extension point: a resolver that claims
//! descriptors the built-ins would handle can change the binary layout and
//! break wire compatibility. The engine does not police this.

mod enums;
mod members;
mod scalars;
mod structs;
mod tables;
mod unions;

pub use enums::EnumModel;
pub use members::ResolvedMember;
pub use scalars::ScalarModel;
pub use structs::{FieldOffset, StructLayout, StructModel};
pub use tables::{FieldSlot, TableModel, KEY_TAG};
pub use unions::{UnionModel, MAX_UNION_VARIANTS};

use std::sync::Arc;

use crate::container::ResolveContext;
use crate::model::ModelRef;
use crate::schema::{DeclKind, TypeDescriptor};

/// Pluggable model factory.
pub trait TypeResolver: Send + Sync {
    /// Name used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Claim `descriptor` by returning a fresh, uninitialized model, or
    /// decline with `None`. `cx` gives read access to the transaction's
    /// working cache.
    fn try_claim(&self, descriptor: TypeDescriptor, cx: &ResolveContext<'_>) -> Option<ModelRef>;
}

/// Claims every [`TypeDescriptor::Scalar`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ScalarResolver;

impl TypeResolver for ScalarResolver {
    fn name(&self) -> &str {
        "scalar"
    }

    fn try_claim(&self, descriptor: TypeDescriptor, _cx: &ResolveContext<'_>) -> Option<ModelRef> {
        let kind = descriptor.as_scalar()?;
        Some(Arc::new(ScalarModel::new(kind)))
    }
}

/// Claims every [`TypeDescriptor::Decl`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CompositeResolver;

impl TypeResolver for CompositeResolver {
    fn name(&self) -> &str {
        "composite"
    }

    fn try_claim(&self, descriptor: TypeDescriptor, _cx: &ResolveContext<'_>) -> Option<ModelRef> {
        let decl = descriptor.as_decl()?;
        let model: ModelRef = match decl.kind {
            DeclKind::Struct => Arc::new(StructModel::new(decl)),
            DeclKind::Table => Arc::new(TableModel::new(decl)),
            DeclKind::Union => Arc::new(UnionModel::new(decl)),
            DeclKind::Enum { underlying } => Arc::new(EnumModel::new(decl, underlying)),
        };
        Some(model)
    }
}

#[cfg(test)]
mod tests;
