// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed-size inline structs.
//!
//! Members are laid out in declaration order, each aligned to its own
//! alignment; the total size is padded to the largest member alignment.
//! A member struct without a computed layout yet makes validation
//! *pending*, so a struct that contains itself by value never converges.

use std::any::Any;
use std::sync::OnceLock;

use super::members::{resolve_members, ResolvedMember};
use crate::container::ResolveContext;
use crate::error::ResolveError;
use crate::model::{Layout, ModelKind, ModelRef, TypeModel, Validation};
use crate::schema::{TypeDecl, TypeDescriptor};

/// Placement of one struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldOffset {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
}

/// Computed struct layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    pub size: usize,
    pub alignment: usize,
    pub fields: Vec<FieldOffset>,
}

#[derive(Debug)]
pub struct StructModel {
    decl: &'static TypeDecl,
    members: OnceLock<Vec<ResolvedMember>>,
    layout: OnceLock<StructLayout>,
}

impl StructModel {
    pub fn new(decl: &'static TypeDecl) -> Self {
        Self {
            decl,
            members: OnceLock::new(),
            layout: OnceLock::new(),
        }
    }

    pub fn members(&self) -> &[ResolvedMember] {
        self.members.get().map_or(&[], Vec::as_slice)
    }

    pub fn member_model(&self, name: &str) -> Option<ModelRef> {
        self.members()
            .iter()
            .find(|m| m.name() == name)
            .and_then(ResolvedMember::model)
    }

    /// Layout, once validation computed it.
    pub fn struct_layout(&self) -> Option<&StructLayout> {
        self.layout.get()
    }

    fn compute_layout(&self, members: &[ResolvedMember]) -> Result<StructLayout, Validation> {
        let mut offset = 0usize;
        let mut alignment = 1usize;
        let mut fields = Vec::with_capacity(members.len());

        for member in members {
            let model = member.model().ok_or_else(|| {
                Validation::fatal(format!("model of member `{}` was dropped", member.name()))
            })?;
            let Some(inner) = model.layout() else {
                return Err(Validation::pending(format!(
                    "member `{}` waits for the layout of `{}`",
                    member.name(),
                    member.decl.ty
                )));
            };

            if !inner.alignment.is_power_of_two() {
                return Err(Validation::fatal(format!(
                    "member `{}` has alignment {}; alignments must be powers of two",
                    member.name(),
                    inner.alignment
                )));
            }

            let overflow = || {
                Validation::fatal(format!(
                    "struct size overflows at member `{}`",
                    member.name()
                ))
            };
            offset = align_up(offset, inner.alignment).ok_or_else(overflow)?;
            fields.push(FieldOffset {
                name: member.name(),
                offset,
                size: inner.size,
            });
            offset = offset.checked_add(inner.size).ok_or_else(overflow)?;
            alignment = alignment.max(inner.alignment);
        }

        let size = align_up(offset, alignment)
            .ok_or_else(|| Validation::fatal("struct size overflows"))?;
        Ok(StructLayout {
            size,
            alignment,
            fields,
        })
    }
}

/// Round `value` up to `alignment` (a power of two), `None` on overflow.
fn align_up(value: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    let mask = alignment - 1;
    value.checked_add(mask).map(|v| v & !mask)
}

impl TypeModel for StructModel {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::Decl(self.decl)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Struct
    }

    fn initialize(&self, cx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
        if self.members.get().is_some() {
            return Ok(());
        }
        let members = resolve_members(self.decl, cx)?;
        let _ = self.members.set(members);
        Ok(())
    }

    fn validate(&self) -> Validation {
        if self.layout.get().is_some() {
            return Validation::Ok;
        }
        let Some(members) = self.members.get() else {
            return Validation::fatal("struct validated before initialization");
        };
        if members.is_empty() {
            return Validation::fatal("structs must declare at least one member");
        }

        for member in members {
            if member.metadata().deprecated {
                return Validation::fatal(format!(
                    "struct member `{}` cannot be deprecated",
                    member.name()
                ));
            }
            if !member.kind.is_inline() {
                return Validation::fatal(format!(
                    "struct member `{}` has non-inline type `{}`; structs hold only scalars, enums and structs",
                    member.name(),
                    member.decl.ty
                ));
            }
        }

        match self.compute_layout(members) {
            Ok(layout) => {
                let _ = self.layout.set(layout);
                Validation::Ok
            }
            Err(outcome) => outcome,
        }
    }

    fn layout(&self) -> Option<Layout> {
        self.layout
            .get()
            .map(|layout| Layout::new(layout.size, layout.alignment))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
