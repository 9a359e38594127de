use anyhow::Context;
use navmapcore::ais::BoundingBox;
use navmapcore::tracking::OperationZone;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

pub const AIS_KEY_ENV: &str = "AIS_STREAM_API_KEY";
pub const LLM_KEY_ENV: &str = "LLM_API_KEY";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub upstream_url: String,
    pub bounding_box: BoundingBox,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            upstream_url: "wss://stream.aisstream.io/v0/stream".into(),
            bounding_box: BoundingBox::SOUTHERN_RED_SEA,
            api_key: None,
        }
    }
}

impl RelayConfig {
    /// Upstream URL with the key appended as the `api-key` query parameter.
    pub fn upstream_endpoint(&self, api_key: &str) -> String {
        let separator = if self.upstream_url.contains('?') { '&' } else { '?' };
        format!("{}{}api-key={}", self.upstream_url, separator, api_key)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://ai.gateway.lovable.dev/v1/chat/completions".into(),
            model: "google/gemini-2.5-flash".into(),
            temperature: 0.7,
            timeout_secs: 30,
            api_key: None,
        }
    }
}

/// Offline scenario parameters: synthetic traffic driven through the zone tracker.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub ships: usize,
    pub ticks: usize,
    pub tick_minutes: f64,
    pub seed: u64,
    pub zone: OperationZone,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            ships: 40,
            ticks: 24,
            tick_minutes: 10.0,
            seed: 0,
            zone: OperationZone::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind: SocketAddr,
    pub relay: RelayConfig,
    pub llm: LlmConfig,
    pub scenario: ScenarioConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            relay: RelayConfig::default(),
            llm: LlmConfig::default(),
            scenario: ScenarioConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading gateway config {}", path_ref.display()))?;
        let config: GatewayConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing gateway config {}", path_ref.display()))?;
        config
            .relay
            .bounding_box
            .validate()
            .with_context(|| format!("validating bounding box in {}", path_ref.display()))?;
        config
            .scenario
            .zone
            .validate()
            .with_context(|| format!("validating scenario zone in {}", path_ref.display()))?;
        Ok(config)
    }

    /// Fills API keys from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|name| std::env::var(name).ok());
    }

    /// Environment values win over file values; blank values are ignored.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        if let Some(key) = non_blank(AIS_KEY_ENV) {
            self.relay.api_key = Some(key);
        }
        if let Some(key) = non_blank(LLM_KEY_ENV) {
            self.llm.api_key = Some(key);
        }
    }
}
