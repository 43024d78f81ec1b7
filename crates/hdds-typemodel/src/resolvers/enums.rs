// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enums over an integer scalar.
//!
//! The underlying scalar is resolved through the container during
//! `initialize`, so a custom resolver for that scalar also governs the
//! enum's layout. Duplicate values are accepted as aliases; duplicate
//! names are not.

use std::any::Any;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock, Weak};

use crate::container::ResolveContext;
use crate::error::ResolveError;
use crate::model::{Layout, ModelKind, TypeModel, Validation};
use crate::schema::{EnumLiteral, ScalarKind, TypeDecl, TypeDescriptor};

#[derive(Debug)]
pub struct EnumModel {
    decl: &'static TypeDecl,
    underlying: ScalarKind,
    underlying_model: OnceLock<Weak<dyn TypeModel>>,
}

impl EnumModel {
    pub fn new(decl: &'static TypeDecl, underlying: ScalarKind) -> Self {
        Self {
            decl,
            underlying,
            underlying_model: OnceLock::new(),
        }
    }

    pub fn underlying(&self) -> ScalarKind {
        self.underlying
    }

    pub fn literals(&self) -> &'static [EnumLiteral] {
        self.decl.literals
    }

    pub fn value_of(&self, name: &str) -> Option<i128> {
        self.decl
            .literals
            .iter()
            .find(|literal| literal.name == name)
            .map(|literal| literal.value)
    }
}

impl TypeModel for EnumModel {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::Decl(self.decl)
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Enum
    }

    fn initialize(&self, cx: &mut ResolveContext<'_>) -> Result<(), ResolveError> {
        if self.underlying_model.get().is_some() {
            return Ok(());
        }
        let model = cx.resolve(TypeDescriptor::Scalar(self.underlying))?;
        let _ = self.underlying_model.set(Arc::downgrade(&model));
        Ok(())
    }

    fn validate(&self) -> Validation {
        let Some((min, max)) = self.underlying.integer_range() else {
            return Validation::fatal(format!(
                "underlying type `{}` is not an integer",
                self.underlying.name()
            ));
        };
        if self.decl.literals.is_empty() {
            return Validation::fatal("enums must declare at least one literal");
        }

        let mut names = HashSet::with_capacity(self.decl.literals.len());
        for literal in self.decl.literals {
            if !names.insert(literal.name) {
                return Validation::fatal(format!("literal `{}` declared twice", literal.name));
            }
            if literal.value < min || literal.value > max {
                return Validation::fatal(format!(
                    "literal `{}` = {} does not fit `{}`",
                    literal.name,
                    literal.value,
                    self.underlying.name()
                ));
            }
        }

        if self.layout().is_none() {
            return Validation::pending(format!(
                "layout of underlying `{}` not known yet",
                self.underlying.name()
            ));
        }
        Validation::Ok
    }

    fn layout(&self) -> Option<Layout> {
        self.underlying_model.get()?.upgrade()?.layout()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
