// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Resolution engine entry point.
//!
//! The [`Container`] owns the ordered resolver list, the committed model
//! cache and the engine lock. Every cache miss runs inside a transaction:
//!
//! ```text
//! Idle -> SnapshotTaken -> Resolving (depth >= 1) -> Validating (depth 0)
//!      -> Committed | RolledBack -> Idle
//! ```
//!
//! The transaction is an explicit value, [`ResolveContext`], threaded
//! through every nested resolution a model triggers from
//! [`TypeModel::initialize`](crate::model::TypeModel::initialize). It owns
//! the working cache and the recursion depth, so two unrelated call trees
//! can never share either.
//!
//! # Thread Safety
//!
//! - Committed cache: `ArcSwap`, lock-free reads (`try_get_model` and
//!   committed hits in `try_create_model`, counted with atomics)
//! - Engine lock: one `ReentrantMutex` serializes whole transactions; the
//!   inner `RefCell` turns same-thread re-entry through the public API
//!   into an `InvariantViolation` instead of a deadlock
//! - Resolver list: mutated only through `&mut self`

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, RwLock};

use crate::cache::{ModelCache, WorkingCache};
use crate::config::ContainerConfig;
use crate::error::ResolveError;
use crate::model::ModelRef;
use crate::resolvers::{CompositeResolver, ScalarResolver, TypeResolver};
use crate::scheduler::{self, PassReport};
use crate::schema::TypeDescriptor;

/// What `try_create_model` does with a suppressible failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnError {
    /// Return the error.
    Propagate,
    /// Return `Ok(None)` for `NotResolvable`, validation and depth-limit
    /// failures. Invariant violations still propagate.
    Suppress,
}

/// Engine counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerStats {
    pub hits: u64,
    pub misses: u64,
    pub committed: u64,
    pub rolled_back: u64,
    /// Models published by committed transactions.
    pub models_committed: u64,
    /// Scheduler report of the most recent committed transaction.
    pub last_validation: PassReport,
}

/// State guarded by the engine lock.
#[derive(Default)]
struct EngineState {
    queue: VecDeque<ModelRef>,
    next_txn: u64,
}

/// Orchestrates resolvers, cache and transactions.
pub struct Container {
    config: ContainerConfig,
    resolvers: Vec<Box<dyn TypeResolver>>,
    cache: ModelCache,
    engine: ReentrantMutex<RefCell<EngineState>>,
    hits: AtomicU64,
    misses: AtomicU64,
    /// Transaction counters, written only under the engine lock.
    stats: RwLock<ContainerStats>,
}

impl Container {
    /// Container with the default configuration and no resolvers.
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    /// Container with `config` and no resolvers.
    ///
    /// An invalid `config` is normalized (see
    /// [`ContainerConfig::normalized`]).
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            config: config.normalized(),
            resolvers: Vec::new(),
            cache: ModelCache::new(),
            engine: ReentrantMutex::new(RefCell::new(EngineState::default())),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stats: RwLock::new(ContainerStats::default()),
        }
    }

    /// Container with the scalar resolver registered before the composite
    /// resolver, so the narrower claim wins on overlap.
    pub fn create_default() -> Self {
        Self::builder().with_default_resolvers().build()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::default()
    }

    /// Append `resolver`; resolvers are consulted in registration order.
    ///
    /// Custom resolvers may redefine binary layout rules and break
    /// compatibility with the reference wire format. Taking `&mut self`
    /// rules out registration while any resolution is in flight.
    pub fn register_resolver<R: TypeResolver + 'static>(&mut self, resolver: R) {
        log::debug!(
            "[typemodel] registered resolver #{} `{}`",
            self.resolvers.len(),
            resolver.name()
        );
        self.resolvers.push(Box::new(resolver));
    }

    pub fn resolver_names(&self) -> Vec<&str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Committed-cache lookup; never triggers resolution.
    pub fn try_get_model(&self, descriptor: TypeDescriptor) -> Option<ModelRef> {
        self.cache.get(&descriptor)
    }

    /// Resolve `descriptor`, creating and validating models as needed.
    ///
    /// A committed hit returns immediately. Otherwise the call runs a whole
    /// transaction; on any failure nothing it created becomes visible.
    pub fn try_create_model(
        &self,
        descriptor: TypeDescriptor,
        on_error: OnError,
    ) -> Result<Option<ModelRef>, ResolveError> {
        match self.resolve(descriptor) {
            Ok(model) => Ok(Some(model)),
            Err(err) if on_error == OnError::Suppress && err.is_suppressible() => {
                log::debug!("[typemodel] suppressed: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Like [`try_create_model`](Self::try_create_model) with
    /// [`OnError::Propagate`].
    pub fn resolve(&self, descriptor: TypeDescriptor) -> Result<ModelRef, ResolveError> {
        if let Some(model) = self.cache.get(&descriptor) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(model);
        }

        let engine = self.engine.lock();
        let mut state = engine.try_borrow_mut().map_err(|_| {
            ResolveError::invariant(format!(
                "re-entrant Container call for `{}` inside a transaction; \
                 nested lookups must go through ResolveContext",
                descriptor
            ))
        })?;

        // Another thread may have committed it while we waited for the lock.
        if let Some(model) = self.cache.get(&descriptor) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(model);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let EngineState { queue, next_txn } = &mut *state;
        *next_txn += 1;
        queue.clear();
        let cx = ResolveContext::begin(self, queue, *next_txn);
        cx.run(descriptor)
    }

    /// Resolve a descriptor that the calling convention guarantees to be
    /// valid.
    ///
    /// # Panics
    ///
    /// Panics if resolution fails; that is a caller invariant violation.
    pub fn create_model(&self, descriptor: TypeDescriptor) -> ModelRef {
        match self.resolve(descriptor) {
            Ok(model) => model,
            Err(err) => panic!("type model for `{}` must resolve: {}", descriptor, err),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn contains(&self, descriptor: TypeDescriptor) -> bool {
        self.cache.contains(&descriptor)
    }

    /// Committed descriptors (unordered).
    pub fn descriptors(&self) -> Vec<TypeDescriptor> {
        self.cache.snapshot().keys().copied().collect()
    }

    pub fn stats(&self) -> ContainerStats {
        let mut stats = *self.stats.read();
        stats.hits = self.hits.load(Ordering::Relaxed);
        stats.misses = self.misses.load(Ordering::Relaxed);
        stats
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::create_default()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("resolvers", &self.resolver_names())
            .field("models", &self.cache.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Builder for [`Container`].
#[derive(Default)]
pub struct ContainerBuilder {
    config: ContainerConfig,
    default_resolvers: bool,
    resolvers: Vec<Box<dyn TypeResolver>>,
}

impl ContainerBuilder {
    pub fn config(mut self, config: ContainerConfig) -> Self {
        self.config = config;
        self
    }

    /// Register the scalar and composite resolvers ahead of any resolver
    /// added with [`resolver`](Self::resolver).
    pub fn with_default_resolvers(mut self) -> Self {
        self.default_resolvers = true;
        self
    }

    pub fn resolver<R: TypeResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn build(self) -> Container {
        let mut container = Container::with_config(self.config);
        if self.default_resolvers {
            container.register_resolver(ScalarResolver);
            container.register_resolver(CompositeResolver);
        }
        container.resolvers.extend(self.resolvers);
        container
    }
}

/// One transaction: the working cache, the validation queue and the
/// recursion depth shared by every nested resolution it triggers.
pub struct ResolveContext<'a> {
    container: &'a Container,
    working: WorkingCache,
    queue: &'a mut VecDeque<ModelRef>,
    depth: usize,
    txn: u64,
}

impl<'a> ResolveContext<'a> {
    fn begin(container: &'a Container, queue: &'a mut VecDeque<ModelRef>, txn: u64) -> Self {
        let working = container.cache.begin();
        if container.config.log_transactions {
            log::debug!(
                "[typemodel] txn #{} begin (snapshot: {} models)",
                txn,
                container.cache.len()
            );
        }
        Self {
            container,
            working,
            queue,
            depth: 0,
            txn,
        }
    }

    /// Resolve the outermost descriptor, then validate and commit, or roll
    /// back on any failure.
    fn run(mut self, descriptor: TypeDescriptor) -> Result<ModelRef, ResolveError> {
        let resolved = self.resolve(descriptor).and_then(|model| {
            if self.depth != 0 {
                return Err(ResolveError::invariant(format!(
                    "depth {} after outermost resolution of `{}`",
                    self.depth, descriptor
                )));
            }
            Ok(model)
        });

        match resolved {
            Ok(model) => {
                let report = match scheduler::run(self.queue) {
                    Ok(report) => report,
                    Err(err) => return Err(self.rollback(err)),
                };
                if !self.queue.is_empty() {
                    let err = ResolveError::invariant("validation queue not drained");
                    return Err(self.rollback(err));
                }
                self.commit(report)?;
                Ok(model)
            }
            Err(err) => Err(self.rollback(err)),
        }
    }

    fn commit(self, report: PassReport) -> Result<(), ResolveError> {
        let container = self.container;
        let txn = self.txn;
        let added = container.cache.commit(self.working)?;

        let mut stats = container.stats.write();
        stats.committed += 1;
        stats.models_committed += added as u64;
        stats.last_validation = report;
        drop(stats);

        if container.config.log_transactions {
            log::debug!(
                "[typemodel] txn #{} committed {} models ({} passes{})",
                txn,
                added,
                report.passes,
                if report.forced { ", forced" } else { "" }
            );
        }
        Ok(())
    }

    fn rollback(self, err: ResolveError) -> ResolveError {
        let container = self.container;
        self.queue.clear();
        let discarded = self.working.rollback();
        container.stats.write().rolled_back += 1;
        log::warn!(
            "[typemodel] txn #{} rolled back, {} models discarded: {}",
            self.txn,
            discarded,
            err
        );
        err
    }

    /// Model for `descriptor` within this transaction.
    ///
    /// Returns the committed or in-progress model when one exists, so
    /// self- and mutually-referential types resolve to a single instance.
    /// Otherwise the first resolver to claim the descriptor creates the
    /// model, which is registered, initialized (possibly recursing here)
    /// and queued for validation.
    ///
    /// If initialization fails, the model and every model created while
    /// initializing it are dropped from the transaction before the error
    /// propagates, so a caller that tolerates the error never commits a
    /// peer of the failed model.
    pub fn resolve(&mut self, descriptor: TypeDescriptor) -> Result<ModelRef, ResolveError> {
        if let Some(model) = self.working.get(&descriptor) {
            return Ok(model);
        }

        let limit = self.container.config.max_depth;
        if self.depth >= limit {
            return Err(ResolveError::DepthLimitExceeded { descriptor, limit });
        }

        self.depth += 1;
        let result = self.create(descriptor);
        self.depth -= 1;
        result
    }

    fn create(&mut self, descriptor: TypeDescriptor) -> Result<ModelRef, ResolveError> {
        let model = self.claim(descriptor)?;
        if model.descriptor() != descriptor {
            return Err(ResolveError::invariant(format!(
                "resolver produced a model for `{}` when asked for `{}`",
                model.descriptor(),
                descriptor
            )));
        }

        let mark = self.working.mark();
        let queued = self.queue.len();
        self.working.insert(descriptor, Arc::clone(&model))?;
        log::trace!(
            "[typemodel] txn #{} depth {}: created `{}`",
            self.txn,
            self.depth,
            descriptor
        );

        if let Err(err) = model.initialize(self) {
            let dropped = self.working.discard_since(mark);
            self.queue.truncate(queued);
            log::trace!(
                "[typemodel] txn #{}: `{}` failed to initialize, {} models dropped",
                self.txn,
                descriptor,
                dropped
            );
            return Err(err);
        }

        self.queue.push_back(Arc::clone(&model));
        Ok(model)
    }

    fn claim(&self, descriptor: TypeDescriptor) -> Result<ModelRef, ResolveError> {
        let container = self.container;
        for resolver in &container.resolvers {
            if let Some(model) = resolver.try_claim(descriptor, self) {
                log::trace!(
                    "[typemodel] `{}` claimed by `{}`",
                    descriptor,
                    resolver.name()
                );
                return Ok(model);
            }
        }
        Err(ResolveError::NotResolvable { descriptor })
    }

    /// Working-cache lookup without resolution.
    pub fn get(&self, descriptor: TypeDescriptor) -> Option<ModelRef> {
        self.working.get(&descriptor)
    }

    /// Nesting level of the resolution currently executing (1 = outermost).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn transaction_id(&self) -> u64 {
        self.txn
    }

    /// Models created so far in this transaction.
    pub fn created(&self) -> usize {
        self.working.pending_len()
    }
}
