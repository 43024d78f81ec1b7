// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Discriminated unions.
//!
//! Discriminant 0 is reserved for "none"; variant `i` (declaration order)
//! is encoded as `i + 1` in a `u8`, which bounds a union to 255 variants.

use std::any::Any;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::members::{resolve_members, ResolvedMember};
use crate::container::ResolveContext;
use crate::error::ResolveError;
use crate::model::{Layout, ModelKind, TypeModel, Validation};
use crate::schema::{TypeDecl, TypeDescriptor};

pub const MAX_UNION_VARIANTS: usize = u8::MAX as usize;

#[derive(Debug)]
pub struct UnionModel {
    decl: &'static TypeDecl,
    variants: OnceLock<Vec<ResolvedMember>>,
}

impl UnionModel {
    pub fn new(decl: &'static TypeDecl) -> Self {
        Self {
            decl,
            variants: OnceLock::new(),
        }
    }

    pub fn variants(&self) -> &[ResolvedMember] {
        self.variants.get().map_or(&[], Vec::as_slice)
    }

    /// Wire discriminant of the variant carrying `descriptor`.
    pub fn discriminant(&self, descriptor: TypeDescriptor) -> Option<u8> {
        let index = self
            .variants()
            .iter()
            .position(|v| v.decl.ty == descriptor)?;
        u8::try_from(index + 1).ok()
    }
}

impl TypeModel for UnionModel {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::Decl(self.decl)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Union
    }

    fn initialize(&self, cx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
        if self.variants.get().is_some() {
            return Ok(());
        }
        let variants = resolve_members(self.decl, cx)?;
        let _ = self.variants.set(variants);
        Ok(())
    }

    fn validate(&self) -> Validation {
        let Some(variants) = self.variants.get() else {
            return Validation::fatal("union validated before initialization");
        };
        if variants.is_empty() {
            return Validation::fatal("unions must declare at least one variant");
        }
        if variants.len() > MAX_UNION_VARIANTS {
            return Validation::fatal(format!(
                "{} variants exceed the limit of {}",
                variants.len(),
                MAX_UNION_VARIANTS
            ));
        }

        let mut seen = HashSet::with_capacity(variants.len());
        for variant in variants {
            if !matches!(variant.kind, ModelKind::Table | ModelKind::Struct) {
                return Validation::fatal(format!(
                    "union variant `{}` has type `{}`; variants must be tables or structs",
                    variant.name(),
                    variant.decl.ty
                ));
            }
            if !seen.insert(variant.decl.ty) {
                return Validation::fatal(format!(
                    "type `{}` appears in more than one variant",
                    variant.decl.ty
                ));
            }
        }
        Validation::Ok
    }

    fn layout(&self) -> Option<Layout> {
        Some(Layout::UOFFSET)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
