//! `refresh` - write observed appliance state back to the state file

use anyhow::Result;

use super::Session;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context, jobs: usize) -> Result<()> {
    let session = Session::open(ctx)?;
    let report = session.refresh(jobs)?;
    session.save()?;

    if !ctx.quiet {
        for key in &report.vanished {
            ui::warn(&format!("{key} no longer exists, removed from state"));
        }
    }
    ui::success(&format!(
        "Refreshed {} resources ({} removed)",
        report.refreshed,
        report.vanished.len()
    ));
    Ok(())
}
