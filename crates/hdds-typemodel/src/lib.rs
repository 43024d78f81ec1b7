// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HDDS Type Models - transactional type model resolution
//!
//! Resolves user-declared data shapes (structs, tables, unions, enums and
//! scalars of a schema-driven binary format) into validated type models
//! that carry the binary layout rules used by encoders, decoders and size
//! computation.
//!
//! ## Quick Start
//!
//! ```rust
//! use hdds_typemodel::schema::{MemberDecl, TypeDecl, TypeDescriptor};
//! use hdds_typemodel::{Container, OnError};
//!
//! static VEC3_FIELDS: [MemberDecl; 3] = [
//!     MemberDecl::new("x", TypeDescriptor::FLOAT32),
//!     MemberDecl::new("y", TypeDescriptor::FLOAT32),
//!     MemberDecl::new("z", TypeDescriptor::FLOAT32),
//! ];
//! static VEC3: TypeDecl = TypeDecl::structure("demo::Vec3", &VEC3_FIELDS);
//!
//! let container = Container::create_default();
//! let model = container
//!     .try_create_model(TypeDescriptor::decl(&VEC3), OnError::Propagate)?
//!     .expect("propagating call returns a model");
//! assert_eq!(model.layout().map(|l| l.size), Some(12));
//! # Ok::<(), hdds_typemodel::ResolveError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------+
//! |  Container            resolver list | committed cache | lock   |
//! +---------------------------------------------------------------+
//! |  ResolveContext       one transaction: working cache, depth,   |
//! |                       validation queue                         |
//! +---------------------------------------------------------------+
//! |  TypeResolver         ScalarResolver -> CompositeResolver      |
//! +---------------------------------------------------------------+
//! |  Scheduler            fixpoint validation + forced final pass  |
//! +---------------------------------------------------------------+
//! ```
//!
//! A cache miss opens a transaction. The first resolver that claims the
//! descriptor creates a model, which is registered before it is
//! initialized, so self- and mutually-recursive types resolve to the same
//! in-progress instance. When the outermost call unwinds, every model
//! created in the transaction is validated to a fixpoint; success
//! publishes them all at once, any failure discards them all.
//!
//! ## Modules Overview
//!
//! - [`schema`] - type descriptors and declarations
//! - [`model`] - the `TypeModel` contract and the three-valued `Validation`
//! - [`container`] - engine entry point and transaction context
//! - [`resolvers`] - resolver trait and built-in models
//! - [`scheduler`] - fixpoint validation
//! - [`cache`] - committed cache and working copies
//! - [`config`] - container configuration

pub mod cache;
pub mod config;
pub mod container;
pub mod error;
pub mod model;
pub mod resolvers;
pub mod scheduler;
pub mod schema;

pub use config::ContainerConfig;
pub use container::{Container, ContainerBuilder, ContainerStats, OnError, ResolveContext};
pub use error::{ConfigError, ResolveError, ValidationError};
pub use model::{downcast_model, Layout, ModelKind, ModelRef, TypeModel, Validation};
pub use resolvers::{CompositeResolver, ScalarResolver, TypeResolver};
pub use schema::{TypeDecl, TypeDescriptor};
