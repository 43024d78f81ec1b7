// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Offset-referenced tables with vtable slot assignment.
//!
//! Slot rules:
//! - Without explicit indices, members take consecutive slots in
//!   declaration order.
//! - With explicit indices, every member must carry one (mixing is an
//!   error) and the index is the first slot of the member.
//! - Union members occupy two slots: discriminator, then value.
//! - Deprecated members keep their slots.
//! - At most one member carries the `key` tag; it must be a scalar or enum.
//!
//! Tables are referenced by offset, so cyclic references between tables
//! validate without waiting on each other.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::members::{resolve_members, ResolvedMember};
use crate::container::ResolveContext;
use crate::error::ResolveError;
use crate::model::{Layout, ModelKind, ModelRef, TypeModel, Validation};
use crate::schema::{TypeDecl, TypeDescriptor};

/// Member tag marking the table's sort key.
pub const KEY_TAG: &str = "key";

/// vtable placement of one table member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    pub name: &'static str,
    /// First slot occupied.
    pub slot: u16,
    /// Number of consecutive slots (2 for unions).
    pub width: u16,
    pub deprecated: bool,
    pub key: bool,
}

#[derive(Debug)]
pub struct TableModel {
    decl: &'static TypeDecl,
    members: OnceLock<Vec<ResolvedMember>>,
    slots: OnceLock<Vec<FieldSlot>>,
}

impl TableModel {
    pub fn new(decl: &'static TypeDecl) -> Self {
        Self {
            decl,
            members: OnceLock::new(),
            slots: OnceLock::new(),
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

    /// Slot assignment, once validated. Declaration order.
    pub fn slots(&self) -> Option<&[FieldSlot]> {
        self.slots.get().map(Vec::as_slice)
    }

    pub fn key_field(&self) -> Option<&FieldSlot> {
        self.slots()?.iter().find(|slot| slot.key)
    }

    /// Number of vtable entries (highest occupied slot + 1).
    pub fn vtable_len(&self) -> Option<usize> {
        let slots = self.slots()?;
        Some(
            slots
                .iter()
                .map(|s| usize::from(s.slot) + usize::from(s.width))
                .max()
                .unwrap_or(0),
        )
    }

    fn assign_slots(&self, members: &[ResolvedMember]) -> Result<Vec<FieldSlot>, Validation> {
        let explicit = members
            .iter()
            .filter(|m| m.metadata().index.is_some())
            .count();
        if explicit != 0 && explicit != members.len() {
            return Err(Validation::fatal(format!(
                "{} of {} members carry an explicit index; use indices on all members or none",
                explicit,
                members.len()
            )));
        }

        let mut occupied: BTreeMap<u16, &'static str> = BTreeMap::new();
        let mut next = 0u16;
        let mut slots = Vec::with_capacity(members.len());
        let mut key: Option<&'static str> = None;

        for member in members {
            let width: u16 = if member.kind == ModelKind::Union { 2 } else { 1 };
            let slot = member.metadata().index.unwrap_or(next);
            let end = slot.checked_add(width).ok_or_else(|| {
                Validation::fatal(format!("member `{}` exceeds the vtable range", member.name()))
            })?;

            for s in slot..end {
                if let Some(owner) = occupied.insert(s, member.name()) {
                    return Err(Validation::fatal(format!(
                        "member `{}` collides with `{}` at slot {}",
                        member.name(),
                        owner,
                        s
                    )));
                }
            }
            next = end;

            let is_key = member.metadata().has_tag(KEY_TAG);
            if is_key {
                if let Some(previous) = key {
                    return Err(Validation::fatal(format!(
                        "members `{}` and `{}` are both tagged `{}`",
                        previous,
                        member.name(),
                        KEY_TAG
                    )));
                }
                if !matches!(member.kind, ModelKind::Scalar | ModelKind::Enum) {
                    return Err(Validation::fatal(format!(
                        "key member `{}` must be a scalar or enum, found `{}`",
                        member.name(),
                        member.decl.ty
                    )));
                }
                if member.metadata().deprecated {
                    return Err(Validation::fatal(format!(
                        "key member `{}` cannot be deprecated",
                        member.name()
                    )));
                }
                key = Some(member.name());
            }

            slots.push(FieldSlot {
                name: member.name(),
                slot,
                width,
                deprecated: member.metadata().deprecated,
                key: is_key,
            });
        }

        Ok(slots)
    }
}

impl TypeModel for TableModel {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::Decl(self.decl)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Table
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
        if self.slots.get().is_some() {
            return Validation::Ok;
        }
        let Some(members) = self.members.get() else {
            return Validation::fatal("table validated before initialization");
        };
        match self.assign_slots(members) {
            Ok(slots) => {
                let _ = self.slots.set(slots);
                Validation::Ok
            }
            Err(outcome) => outcome,
        }
    }

    fn layout(&self) -> Option<Layout> {
        Some(Layout::UOFFSET)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
