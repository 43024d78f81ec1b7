// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixpoint validation scheduler.
//!
//! Models created in a transaction are validated only once the whole
//! transaction's type graph exists, because forward and cyclic references
//! can make a model undecidable at creation time.
//!
//! # Algorithm
//!
//! 1. Drain the whole queue into a batch and validate every entry:
//!    `Ok` drops it, `Pending` re-queues it, `Fatal` aborts immediately.
//! 2. Repeat while the last pass validated at least one entry.
//! 3. If entries remain and a pass made no progress, run one forced pass
//!    in which any outcome other than `Ok` is terminal.
//!
//! Every entry therefore gets a terminal decision; a cycle that can never
//! be decided surfaces as an error instead of looping.

use std::collections::VecDeque;

use crate::error::ResolveError;
use crate::model::{ModelRef, Validation};

/// Summary of a successful scheduler run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    /// Regular passes executed (the forced pass is not counted).
    pub passes: usize,
    /// Entries validated successfully.
    pub validated: usize,
    /// Whether the forced final pass ran.
    pub forced: bool,
}

/// Validate every queued model to a fixpoint, draining `queue`.
///
/// On error the queue may still hold unvalidated entries; the caller
/// discards them together with the transaction.
pub fn run(queue: &mut VecDeque<ModelRef>) -> Result<PassReport, ResolveError> {
    let mut report = PassReport::default();

    while !queue.is_empty() {
        let batch: Vec<ModelRef> = queue.drain(..).collect();
        report.passes += 1;
        let mut progressed = 0usize;

        for model in batch {
            match model.validate() {
                Validation::Ok => {
                    progressed += 1;
                    log::trace!("[typemodel::scheduler] `{}` validated", model.descriptor());
                }
                Validation::Pending(reason) => {
                    log::trace!(
                        "[typemodel::scheduler] `{}` pending: {}",
                        model.descriptor(),
                        reason
                    );
                    queue.push_back(model);
                }
                Validation::Fatal(source) => {
                    return Err(ResolveError::Validation {
                        descriptor: model.descriptor(),
                        source,
                    });
                }
            }
        }

        report.validated += progressed;
        log::debug!(
            "[typemodel::scheduler] pass {}: {} validated, {} pending",
            report.passes,
            progressed,
            queue.len()
        );

        if progressed == 0 && !queue.is_empty() {
            report.forced = true;
            forced_pass(queue, &mut report)?;
        }
    }

    Ok(report)
}

fn forced_pass(queue: &mut VecDeque<ModelRef>, report: &mut PassReport) -> Result<(), ResolveError> {
    log::warn!(
        "[typemodel::scheduler] no progress after {} passes, forcing {} entries",
        report.passes,
        queue.len()
    );

    while let Some(model) = queue.pop_front() {
        match model.validate() {
            Validation::Ok => report.validated += 1,
            Validation::Pending(reason) => {
                return Err(ResolveError::validation(
                    model.descriptor(),
                    format!("validation did not converge: {}", reason),
                ));
            }
            Validation::Fatal(source) => {
                return Err(ResolveError::Validation {
                    descriptor: model.descriptor(),
                    source,
                });
            }
        }
    }
    Ok(())
}
