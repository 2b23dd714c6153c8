//! Command implementations
//!
//! Every command except `schema` and `completions` opens a [`Session`]:
//! config, a client for the management endpoint, and the state file.

pub mod apply;
pub mod destroy;
pub mod import;
pub mod plan;
pub mod refresh;
pub mod schema;

use anyhow::{Context as AnyhowContext, Result, bail};
use bigip::Client;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

use crate::Context;
use crate::config::Config;
use crate::paths;
use crate::provider::{Instance, Provider};
use crate::resource::{ManagedResource, Shared};
use crate::state::{self, ProviderState};

/// Config, client and state for one command run.
pub struct Session {
    pub config: Config,
    pub shared: Arc<Shared>,
    state_path: PathBuf,
}

/// Outcome of refreshing tracked resources.
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub refreshed: usize,
    /// Keys whose objects no longer exist.
    pub vanished: Vec<String>,
}

impl Session {
    pub fn open(ctx: &Context) -> Result<Self> {
        let config_path = paths::config_file(ctx.config.as_deref())?;
        let config = Config::load(&config_path)?;
        let client = Client::new(&config.connection()?)
            .context("Could not set up the management connection")?;
        Self::with_client(ctx, config, client)
    }

    /// Open a session over an existing client
    pub fn with_client(ctx: &Context, config: Config, client: Client) -> Result<Self> {
        let state_path = paths::state_file(ctx.state.as_deref())?;
        let state = ProviderState::load(&state_path)?;
        Ok(Self {
            config,
            shared: Shared::new(Provider::new(), client, state),
            state_path,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.shared.with_state(|s| s.save(&self.state_path))
    }

    /// Read every tracked resource and write observed state back
    ///
    /// Objects deleted out of band are dropped from state. Any other read
    /// failure aborts the refresh.
    pub fn refresh(&self, jobs: usize) -> Result<RefreshReport> {
        let entries: Vec<(String, Instance)> = self.shared.with_state(|s| {
            s.resources
                .iter()
                .map(|(key, entry)| Ok((key.clone(), entry.to_instance()?)))
                .collect::<Result<_>>()
        })?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .build()
            .context("Failed to create refresh thread pool")?;

        let shared = &self.shared;
        let results: Vec<(String, Result<Instance>)> = pool.install(|| {
            entries
                .into_par_iter()
                .map(|(key, mut instance)| {
                    let outcome = read_entry(shared, &key, &mut instance).map(|()| instance);
                    (key, outcome)
                })
                .collect()
        });

        let mut report = RefreshReport::default();
        for (key, outcome) in results {
            let instance = outcome.with_context(|| format!("Could not refresh {key}"))?;
            if instance.id.is_none() {
                report.vanished.push(key.clone());
            } else {
                report.refreshed += 1;
            }
            self.shared.with_state(|s| s.record(&key, &instance));
        }
        Ok(report)
    }

    /// Declared resources plus tracked ones no longer declared
    pub fn resources(&self) -> Result<Vec<ManagedResource>> {
        let declared = self.config.declared()?;
        let mut out = Vec::with_capacity(declared.len());
        let mut seen = std::collections::HashSet::new();

        for d in &declared {
            let key = state::key(&d.type_name, &d.label);
            let observed = self.observed(&key)?;
            out.push(
                ManagedResource::declared(&self.shared, &d.type_name, &d.label, &d.attributes, observed)
                    .with_context(|| format!("In {key}"))?,
            );
            seen.insert(key);
        }

        for (key, instance) in self.tracked()? {
            if seen.contains(&key) {
                continue;
            }
            let Some((type_name, label)) = state::split_key(&key) else {
                bail!("Malformed state key: {key}");
            };
            out.push(ManagedResource::orphan(&self.shared, type_name, label, instance)?);
        }

        Ok(out)
    }

    /// Every tracked resource as an orphan, for teardown
    pub fn teardown(&self) -> Result<Vec<ManagedResource>> {
        self.tracked()?
            .into_iter()
            .map(|(key, instance)| {
                let Some((type_name, label)) = state::split_key(&key) else {
                    bail!("Malformed state key: {key}");
                };
                ManagedResource::orphan(&self.shared, type_name, label, instance)
            })
            .collect()
    }

    fn observed(&self, key: &str) -> Result<Option<Instance>> {
        self.shared
            .with_state(|s| s.get(key).map(state::StateEntry::to_instance))
            .transpose()
    }

    fn tracked(&self) -> Result<Vec<(String, Instance)>> {
        self.shared.with_state(|s| {
            s.resources
                .iter()
                .map(|(key, entry)| Ok((key.clone(), entry.to_instance()?)))
                .collect()
        })
    }
}

fn read_entry(shared: &Shared, key: &str, instance: &mut Instance) -> Result<()> {
    let Some((type_name, _)) = state::split_key(key) else {
        bail!("Malformed state key: {key}");
    };
    shared
        .provider
        .handler(type_name)?
        .read(&shared.client, instance)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use bigip::MockTransport;
    use tempfile::TempDir;

    /// A session over an in-memory appliance with state in a temp dir.
    pub fn session(config: &str) -> (TempDir, MockTransport, Session) {
        let dir = TempDir::new().unwrap();
        let ctx = Context {
            verbose: 0,
            quiet: true,
            config: None,
            state: Some(dir.path().join("state.json").display().to_string()),
        };
        let mock = MockTransport::new();
        let session = Session::with_client(
            &ctx,
            Config::parse(config).unwrap(),
            Client::with_transport(mock.clone()),
        )
        .unwrap();
        (dir, mock, session)
    }
}

#[cfg(test)]
mod tests {
    use super::testing::session;
    use declarative::Resource;
    use serde_json::json;

    const CONFIG: &str = r#"
[resources.bigip_ltm_node.n1]
name = "n1"
address = "10.0.0.1"
"#;

    #[test]
    fn test_resources_include_orphans() {
        let (_dir, _mock, session) = session(CONFIG);
        session.shared.with_state(|s| {
            s.record(
                "bigip_ltm_pool.old",
                &crate::provider::Instance {
                    id: Some(bigip::ResourceId::new("Common", "old")),
                    attributes: json!({"name": "old"}),
                },
            );
        });

        let resources = session.resources().unwrap();
        let ids: Vec<_> = resources.iter().map(Resource::id).collect();
        assert_eq!(ids, vec!["bigip_ltm_node.n1", "bigip_ltm_pool.old"]);
        assert!(resources[1].desired_state().is_absent());
    }

    #[test]
    fn test_refresh_drops_vanished_and_updates_attributes() {
        let (_dir, mock, session) = session(CONFIG);
        mock.insert(
            "tm/ltm/node/~Common~n1",
            json!({"name": "n1", "partition": "Common", "address": "10.0.0.9"}),
        );
        session.shared.with_state(|s| {
            for name in ["n1", "gone"] {
                s.record(
                    &format!("bigip_ltm_node.{name}"),
                    &crate::provider::Instance {
                        id: Some(bigip::ResourceId::new("Common", name)),
                        attributes: json!({"name": name}),
                    },
                );
            }
        });

        let report = session.refresh(2).unwrap();
        assert_eq!(report.refreshed, 1);
        assert_eq!(report.vanished, vec!["bigip_ltm_node.gone"]);

        let entry = session
            .shared
            .with_state(|s| s.get("bigip_ltm_node.n1").cloned())
            .unwrap();
        assert_eq!(entry.attributes["address"], json!("10.0.0.9"));
    }

    #[test]
    fn test_refresh_error_aborts() {
        let (_dir, mock, session) = session(CONFIG);
        mock.fail("GET", "tm/ltm/node/~Common~n1", 401, "Authentication failed");
        session.shared.with_state(|s| {
            s.record(
                "bigip_ltm_node.n1",
                &crate::provider::Instance {
                    id: Some(bigip::ResourceId::new("Common", "n1")),
                    attributes: json!({"name": "n1"}),
                },
            );
        });
        let err = session.refresh(1).unwrap_err();
        assert!(format!("{err:#}").contains("Authentication failed"));
    }
}
