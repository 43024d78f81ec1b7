// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Committed model cache and transaction working copies.
//!
//! The committed map is immutable once published: readers load the current
//! `Arc<ModelMap>` through `ArcSwap` without locking, so they never observe
//! a transaction in progress. A transaction starts from a snapshot of that
//! map and records its own entries in a [`WorkingCache`] overlay:
//!
//! ```text
//! ModelCache (ArcSwap<ModelMap>)
//! +-- snapshot() ---------> Arc<ModelMap>          (taken at transaction start)
//! +-- begin() ------------> WorkingCache
//!                           +-- base: Arc<ModelMap>   (the snapshot)
//!                           +-- pending: ModelMap     (models created in the txn)
//!
//! commit(working)   -> publish base + pending as the new committed map
//! rollback(working) -> drop pending; committed map stays at the snapshot
//! ```
//!
//! Lookups in a working cache see the snapshot plus every model registered
//! so far, including models still being initialized.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::error::ResolveError;
use crate::model::ModelRef;
use crate::schema::TypeDescriptor;

/// Descriptor to model mapping.
pub type ModelMap = HashMap<TypeDescriptor, ModelRef>;

/// The durable, committed cache.
pub struct ModelCache {
    committed: ArcSwap<ModelMap>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            committed: ArcSwap::from_pointee(ModelMap::new()),
        }
    }

    pub fn get(&self, descriptor: &TypeDescriptor) -> Option<ModelRef> {
        self.committed.load().get(descriptor).map(Arc::clone)
    }

    pub fn contains(&self, descriptor: &TypeDescriptor) -> bool {
        self.committed.load().contains_key(descriptor)
    }

    pub fn len(&self) -> usize {
        self.committed.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.load().is_empty()
    }

    /// Immutable view of the committed map at this instant.
    pub fn snapshot(&self) -> Arc<ModelMap> {
        self.committed.load_full()
    }

    /// Start a working copy on top of the current committed map.
    pub(crate) fn begin(&self) -> WorkingCache {
        WorkingCache::new(self.snapshot())
    }

    /// Publish `working` as the new committed map.
    ///
    /// Fails if the committed map moved since the working copy was taken;
    /// the engine lock makes that impossible unless bookkeeping is broken.
    pub(crate) fn commit(&self, working: WorkingCache) -> Result<usize, ResolveError> {
        let current = self.committed.load_full();
        if !Arc::ptr_eq(&current, &working.base) {
            return Err(ResolveError::invariant(
                "committed cache changed while a transaction was open",
            ));
        }
        let added = working.pending.len();
        if added > 0 {
            self.committed.store(Arc::new(working.into_map()));
        }
        Ok(added)
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction-private view: snapshot plus models created so far.
pub struct WorkingCache {
    base: Arc<ModelMap>,
    pending: ModelMap,
    /// Pending descriptors in registration order.
    order: Vec<TypeDescriptor>,
}

impl WorkingCache {
    pub(crate) fn new(base: Arc<ModelMap>) -> Self {
        Self {
            base,
            pending: ModelMap::new(),
            order: Vec::new(),
        }
    }

    pub fn get(&self, descriptor: &TypeDescriptor) -> Option<ModelRef> {
        self.pending
            .get(descriptor)
            .or_else(|| self.base.get(descriptor))
            .map(Arc::clone)
    }

    pub fn contains(&self, descriptor: &TypeDescriptor) -> bool {
        self.pending.contains_key(descriptor) || self.base.contains_key(descriptor)
    }

    /// Register a freshly created model. A descriptor may only be
    /// registered once per cache.
    pub(crate) fn insert(
        &mut self,
        descriptor: TypeDescriptor,
        model: ModelRef,
    ) -> Result<(), ResolveError> {
        if self.contains(&descriptor) {
            return Err(ResolveError::invariant(format!(
                "type `{}` registered twice in one transaction",
                descriptor
            )));
        }
        self.pending.insert(descriptor, model);
        self.order.push(descriptor);
        Ok(())
    }

    /// Position to pass to [`discard_since`](Self::discard_since).
    pub(crate) fn mark(&self) -> usize {
        self.order.len()
    }

    /// Drop every model registered after `mark`, returning how many were
    /// dropped. Snapshot entries are never removed.
    pub(crate) fn discard_since(&mut self, mark: usize) -> usize {
        if mark >= self.order.len() {
            return 0;
        }
        let dropped = self.order.split_off(mark);
        for descriptor in &dropped {
            self.pending.remove(descriptor);
        }
        dropped.len()
    }

    /// Number of models created in this transaction.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Descriptors created in this transaction, in registration order.
    pub fn pending_descriptors(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.order.iter()
    }

    /// Discard every model created in this transaction.
    pub(crate) fn rollback(self) -> usize {
        self.pending.len()
    }

    fn into_map(self) -> ModelMap {
        let mut map = Arc::unwrap_or_clone(self.base);
        map.extend(self.pending);
        map
    }
}
