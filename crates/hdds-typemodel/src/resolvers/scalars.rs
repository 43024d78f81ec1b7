// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::any::Any;

use crate::container::ResolveContext;
use crate::error::ResolveError;
use crate::model::{Layout, ModelKind, TypeModel, Validation};
use crate::schema::{ScalarKind, TypeDescriptor};

/// Fixed-width primitive. Always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarModel {
    kind: ScalarKind,
}

impl ScalarModel {
    pub const fn new(kind: ScalarKind) -> Self {
        Self { kind }
    }

    pub const fn scalar_kind(&self) -> ScalarKind {
        self.kind
    }
}

impl TypeModel for ScalarModel {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::Scalar(self.kind)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Scalar
    }

    fn initialize(&self, _cx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
        Ok(())
    }

    fn validate(&self) -> Validation {
        Validation::Ok
    }

    fn layout(&self) -> Option<Layout> {
        Some(Layout::new(self.kind.size(), self.kind.alignment()))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
