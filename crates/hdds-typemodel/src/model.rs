// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type model collaborator contract.
//!
//! A [`TypeModel`] is the resolved artifact for one [`TypeDescriptor`]: the
//! binary layout rules plus whatever codec hooks the format attaches. The
//! resolution engine only drives two lifecycle calls:
//!
//! - [`TypeModel::initialize`] runs once, right after the model has been
//!   registered in the transaction's working cache. It may resolve member
//!   types through the [`ResolveContext`], which re-enters the engine.
//! - [`TypeModel::validate`] runs during the transaction's closing fixpoint
//!   passes and reports one of exactly three outcomes ([`Validation`]).

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::container::ResolveContext;
use crate::error::{ResolveError, ValidationError};
use crate::schema::TypeDescriptor;

/// Shared handle to a resolved model.
pub type ModelRef = Arc<dyn TypeModel>;

/// Coarse classification of a model, used by peers when validating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Scalar,
    Enum,
    Struct,
    Table,
    Union,
    /// Model produced by a custom resolver outside the built-in kinds.
    Custom,
}

impl ModelKind {
    /// Kinds that can be embedded by value in a struct.
    pub const fn is_inline(self) -> bool {
        matches!(self, ModelKind::Scalar | ModelKind::Enum | ModelKind::Struct)
    }
}

/// Inline footprint of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub size: usize,
    pub alignment: usize,
}

impl Layout {
    pub const fn new(size: usize, alignment: usize) -> Self {
        Self { size, alignment }
    }

    /// 32-bit offset used for out-of-line references (tables, unions).
    pub const UOFFSET: Layout = Layout::new(4, 4);
}

/// Three-valued outcome of [`TypeModel::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The model is consistent.
    Ok,
    /// Cannot decide yet; a peer created in the same transaction is not
    /// ready. The scheduler retries in a later pass.
    Pending(String),
    /// The schema is genuinely invalid.
    Fatal(ValidationError),
}

impl Validation {
    pub fn pending(reason: impl Into<String>) -> Self {
        Validation::Pending(reason.into())
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        Validation::Fatal(ValidationError::new(reason))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Validation::Ok)
    }
}

/// Resolved, eventually-validated description of a type.
///
/// Models are shared (`Arc`) and registered before initialization, so
/// any state filled in by `initialize` or `validate` lives behind interior
/// mutability (`OnceLock`, `parking_lot` locks).
pub trait TypeModel: Send + Sync + fmt::Debug {
    /// Descriptor this model was created for.
    fn descriptor(&self) -> TypeDescriptor;

    fn kind(&self) -> ModelKind;

    /// Resolve dependencies. Must be idempotent; may re-enter the engine
    /// through `cx`.
    fn initialize(&self, cx: &mut ResolveContext<'_>) -> Result<(), ResolveError>;

    fn validate(&self) -> Validation;

    /// Inline layout, or `None` while it is not yet known.
    fn layout(&self) -> Option<Layout>;

    fn as_any(&self) -> &dyn Any;
}

/// Downcast a shared model to its concrete type.
pub fn downcast_model<M: TypeModel + 'static>(model: &ModelRef) -> Option<&M> {
    model.as_any().downcast_ref::<M>()
}
