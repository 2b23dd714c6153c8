//! `import` - start tracking an object that already exists

use anyhow::{Context as AnyhowContext, Result, bail};

use super::Session;
use crate::Context;
use crate::state;
use crate::ui;

pub fn run(ctx: &Context, type_name: &str, label: &str, identity: &str) -> Result<()> {
    let session = Session::open(ctx)?;
    import(&session, type_name, label, identity)?;
    session.save()?;
    ui::success(&format!("Imported {identity} as {}", state::key(type_name, label)));
    Ok(())
}

fn import(session: &Session, type_name: &str, label: &str, identity: &str) -> Result<()> {
    let key = state::key(type_name, label);
    if session.shared.with_state(|s| s.get(&key).is_some()) {
        bail!("{key} is already tracked; remove it from state before importing again");
    }

    let handler = session.shared.provider.handler(type_name)?;
    let instance = handler
        .import(&session.shared.client, identity)
        .with_context(|| format!("Could not import {identity}"))?;
    session.shared.with_state(|s| s.record(&key, &instance));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::session;
    use serde_json::json;

    #[test]
    fn test_import_records_observed_state() {
        let (_dir, mock, session) = session("");
        mock.insert(
            "tm/ltm/pool/~Common~web",
            json!({"name": "web", "partition": "Common", "loadBalancingMode": "ratio-member"}),
        );

        import(&session, "bigip_ltm_pool", "web", "/Common/web").unwrap();
        let entry = session
            .shared
            .with_state(|s| s.get("bigip_ltm_pool.web").cloned())
            .unwrap();
        assert_eq!(entry.id, "/Common/web");
        assert_eq!(entry.attributes["load_balancing_mode"], json!("ratio-member"));

        let err = import(&session, "bigip_ltm_pool", "web", "/Common/web").unwrap_err();
        assert!(err.to_string().contains("already tracked"));
    }

    #[test]
    fn test_import_missing_object_fails() {
        let (_dir, _mock, session) = session("");
        assert!(import(&session, "bigip_ltm_node", "n1", "/Common/n1").is_err());
        assert!(session.shared.with_state(|s| s.is_empty()));
    }

    #[test]
    fn test_import_unknown_type_fails() {
        let (_dir, _mock, session) = session("");
        assert!(import(&session, "bigip_gtm_pool", "p", "/Common/p").is_err());
    }
}
