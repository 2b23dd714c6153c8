//! Progress reporting for apply and destroy.

use declarative::{ApplyResult, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};

/// Tier names shown while a batch runs.
fn tier_name(tier: u8) -> &'static str {
    match tier {
        0 => "profiles, monitors, iRules, nodes, data groups, policies",
        1 => "pools",
        2 => "virtual addresses",
        3 => "virtual servers",
        4 => "device groups",
        _ => "other",
    }
}

/// Status glyph for a result
pub fn symbol(result: &ApplyResult) -> &'static str {
    match result {
        ApplyResult::NoChange => "○",
        ApplyResult::Created | ApplyResult::Modified | ApplyResult::Removed => "✓",
        ApplyResult::Failed { .. } => "✗",
        ApplyResult::Skipped { .. } => "⊘",
    }
}

/// One progress bar per tier.
#[derive(Default)]
pub struct TierProgress {
    bar: Option<ProgressBar>,
    quiet: bool,
    failures: Vec<(String, String)>,
}

impl TierProgress {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            ..Self::default()
        }
    }

    /// Failed resources with their errors, in completion order
    pub fn failures(&self) -> &[(String, String)] {
        &self.failures
    }
}

impl ProgressCallback for TierProgress {
    fn on_batch_start(&mut self, count: usize, tier: u8) {
        if self.quiet {
            return;
        }
        let bar = ProgressBar::new(count as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {prefix} {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }
        bar.set_prefix(format!("tier {tier} ({})", tier_name(tier)));
        self.bar = Some(bar);
    }

    fn on_resource_start(&mut self, id: &str, _description: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(id.to_string());
        }
    }

    fn on_resource_complete(&mut self, id: &str, result: &ApplyResult) {
        if let ApplyResult::Failed { error } = result {
            self.failures.push((id.to_string(), error.clone()));
        }
        if let Some(bar) = &self.bar {
            bar.set_message(format!("{} {id}", symbol(result)));
            bar.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_failures_when_quiet() {
        let mut progress = TierProgress::new(true);
        progress.on_batch_start(2, 1);
        progress.on_resource_complete("bigip_ltm_pool.web", &ApplyResult::Created);
        progress.on_resource_complete(
            "bigip_ltm_pool.api",
            &ApplyResult::Failed {
                error: "409".into(),
            },
        );
        progress.on_batch_complete();

        assert_eq!(
            progress.failures(),
            &[("bigip_ltm_pool.api".to_string(), "409".to_string())]
        );
    }

    #[test]
    fn test_symbols() {
        assert_eq!(symbol(&ApplyResult::Created), "✓");
        assert_eq!(symbol(&ApplyResult::NoChange), "○");
        assert_eq!(tier_name(3), "virtual servers");
    }
}
