//! Hooks the executor calls back into
//!
//! The crate draws no output and asks no questions itself; the host decides
//! how progress is shown and how a run is confirmed.

use crate::types::ApplyResult;
use anyhow::Result;

/// Receives progress while a plan runs.
///
/// Calls arrive on the executor's thread. In a parallel tier the per-resource
/// completions are delivered once the tier has finished.
pub trait ProgressCallback: Send {
    /// A tier of `count` resources is about to run.
    fn on_batch_start(&mut self, count: usize, tier: u8);

    fn on_resource_start(&mut self, id: &str, description: &str);

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult);

    fn on_batch_complete(&mut self);
}

/// Asked once before anything is applied.
pub trait ConfirmCallback: Send {
    /// `Ok(false)` skips the whole run.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Reports nothing
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize, _tier: u8) {}
    fn on_resource_start(&mut self, _id: &str, _description: &str) {}
    fn on_resource_complete(&mut self, _id: &str, _result: &ApplyResult) {}
    fn on_batch_complete(&mut self) {}
}

/// Confirms every run
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Declines every run
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}

/// Per-call settings handed to [`crate::Resource::apply`].
pub struct ApplyContext {
    pub dry_run: bool,
    /// Resources may log what they change
    pub verbose: bool,
}

impl ApplyContext {
    pub fn new(dry_run: bool, verbose: bool) -> Self {
        Self { dry_run, verbose }
    }
}
