//! Shared fixtures for snapshotter BDD scenarios.

use dosnap::PluginConfig;
use dosnap::Snapshotter;
use dosnap::test_support::ScriptedGateway;
use rstest::fixture;
use serde_json::Value;

#[derive(Clone, Debug)]
pub enum Outcome {
    Returned(String),
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct SnapshotterContext {
    pub gateway: ScriptedGateway,
    pub snapshotter: Snapshotter<ScriptedGateway>,
    pub descriptor: Option<Value>,
    pub outcome: Option<Outcome>,
}

impl SnapshotterContext {
    pub fn record<E: std::fmt::Display>(mut self, result: Result<String, E>) -> Self {
        self.outcome = Some(match result {
            Ok(value) => Outcome::Returned(value),
            Err(err) => Outcome::Failed(err.to_string()),
        });
        self
    }
}

#[fixture]
pub fn snapshotter_context() -> SnapshotterContext {
    let gateway = ScriptedGateway::new();
    let snapshotter = Snapshotter::with_gateway(gateway.clone(), PluginConfig::default());
    SnapshotterContext {
        gateway,
        snapshotter,
        descriptor: None,
        outcome: None,
    }
}
