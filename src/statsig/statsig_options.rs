use std::sync::Arc;

use super::statsig_datastore::StatsigDatastore;

pub type RulesUpdatedCallback = Arc<dyn Fn(&str) + Send + Sync>;

pub const DEFAULT_RULESETS_SYNC_INTERVAL_MS: u32 = 10_000;
pub const DEFAULT_IDLISTS_SYNC_INTERVAL_MS: u32 = 60_000;

pub struct StatsigOptions {
    pub api_override: String,
    /// Falls back to `api_override` when unset.
    pub api_for_download_config_specs: Option<String>,
    /// Falls back to `api_override` when unset.
    pub api_for_get_id_lists: Option<String>,
    pub rulesets_sync_interval_ms: u32,
    pub idlists_sync_interval_ms: u32,

    /// Disables all network access and background syncing. The store stays empty.
    pub local_mode: bool,

    /// A serialized download_config_specs payload used as the initial snapshot.
    /// Ignored when a `data_store` is also provided.
    pub bootstrap_values: Option<String>,
    pub data_store: Option<Arc<dyn StatsigDatastore>>,

    /// Called with the raw payload every time a new set of rules is accepted.
    pub rules_updated_callback: Option<RulesUpdatedCallback>,
}

impl Default for StatsigOptions {
    fn default() -> StatsigOptions {
        StatsigOptions {
            api_override: "https://statsigapi.net/v1".to_string(),
            api_for_download_config_specs: None,
            api_for_get_id_lists: None,
            rulesets_sync_interval_ms: DEFAULT_RULESETS_SYNC_INTERVAL_MS,
            idlists_sync_interval_ms: DEFAULT_IDLISTS_SYNC_INTERVAL_MS,
            local_mode: false,
            bootstrap_values: None,
            data_store: None,
            rules_updated_callback: None,
        }
    }
}

impl StatsigOptions {
    /// Points every endpoint at the same base url.
    pub fn with_api(mut self, api: &str) -> StatsigOptions {
        self.api_override = api.to_string();
        self.api_for_download_config_specs = None;
        self.api_for_get_id_lists = None;
        self
    }
}
