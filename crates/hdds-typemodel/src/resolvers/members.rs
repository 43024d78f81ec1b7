// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member resolution shared by struct, table and union models.

use std::sync::{Arc, Weak};

use crate::container::ResolveContext;
use crate::error::ResolveError;
use crate::model::{ModelKind, ModelRef, TypeModel};
use crate::schema::{MemberDecl, MemberMetadata, TypeDecl};

/// A declared member together with the model of its type.
///
/// Peers are held weakly: the container's cache owns models, and cyclic
/// schemas would otherwise keep rolled-back models alive.
#[derive(Debug, Clone)]
pub struct ResolvedMember {
    pub decl: &'static MemberDecl,
    pub kind: ModelKind,
    model: Weak<dyn TypeModel>,
}

impl ResolvedMember {
    pub fn name(&self) -> &'static str {
        self.decl.name
    }

    pub fn metadata(&self) -> &MemberMetadata {
        &self.decl.metadata
    }

    /// Model of the member's type, while its owner is alive.
    pub fn model(&self) -> Option<ModelRef> {
        self.model.upgrade()
    }
}

/// Resolve every member type of `decl` through the transaction.
pub(crate) fn resolve_members(
    decl: &'static TypeDecl,
    cx: &mut ResolveContext<'_>,
) -> Result<Vec<ResolvedMember>, ResolveError> {
    decl.members
        .iter()
        .map(|member| {
            let model = cx.resolve(member.ty)?;
            Ok(ResolvedMember {
                decl: member,
                kind: model.kind(),
                model: Arc::downgrade(&model),
            })
        })
        .collect()
}
