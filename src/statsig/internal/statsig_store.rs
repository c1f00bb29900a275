use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::statsig::statsig_datastore::StatsigDatastore;
use crate::statsig::statsig_error::Result;
use crate::statsig::statsig_error_sink::{LogErrorSink, StatsigErrorSink};
use crate::statsig::statsig_options::{DEFAULT_IDLISTS_SYNC_INTERVAL_MS, DEFAULT_RULESETS_SYNC_INTERVAL_MS};
use crate::statsig::statsig_specs_client::StatsigSpecsClient;
use crate::StatsigOptions;

use super::config_spec_syncer::ConfigSpecSyncer;
use super::id_list::{IdList, IdLists};
use super::id_list_syncer::IdListSyncer;
use super::specs::Specs;
use super::statsig_network::StatsigNetwork;
use super::sync_scheduler::SyncScheduler;

/// Local replica of every gate, config, layer and id list.
///
/// Construction performs the initial load and starts the background syncs. All getters
/// read the latest committed snapshot and never touch the network.
pub struct StatsigStore {
    local_mode: bool,
    config_spec_syncer: Arc<ConfigSpecSyncer>,
    id_list_syncer: Arc<IdListSyncer>,
    scheduler: SyncScheduler,
    data_store: Option<Arc<dyn StatsigDatastore>>,
}

impl StatsigStore {
    /// Creates a store backed by the statsig api, logging failures through `log`.
    pub async fn initialize(secret_key: &str, options: StatsigOptions) -> StatsigStore {
        let network = Arc::new(StatsigNetwork::new(secret_key, &options));
        StatsigStore::new(network, options, Arc::new(LogErrorSink)).await
    }

    pub async fn new(
        network: Arc<dyn StatsigSpecsClient>,
        options: StatsigOptions,
        error_sink: Arc<dyn StatsigErrorSink>,
    ) -> StatsigStore {
        let store = StatsigStore {
            local_mode: options.local_mode,
            config_spec_syncer: Arc::new(ConfigSpecSyncer::new(network.clone(), &options, error_sink.clone())),
            id_list_syncer: Arc::new(IdListSyncer::new(network, error_sink.clone())),
            scheduler: SyncScheduler::new(error_sink.clone()),
            data_store: options.data_store.clone(),
        };

        if store.local_mode {
            log::debug!(target: "statsig", "local mode, skipping config spec and id list sync");
            return store;
        }

        if let Some(data_store) = &store.data_store {
            data_store.initialize().await;
        }

        store.config_spec_syncer.initialize().await;
        if let Err(e) = store.id_list_syncer.sync_id_lists().await {
            error_sink.report(&e);
        }

        let config_spec_syncer = store.config_spec_syncer.clone();
        store.scheduler.spawn(
            "config_specs",
            interval_or_default(options.rulesets_sync_interval_ms, DEFAULT_RULESETS_SYNC_INTERVAL_MS),
            move || {
                let syncer = config_spec_syncer.clone();
                async move { syncer.download_config_specs().await }
            },
        );

        let id_list_syncer = store.id_list_syncer.clone();
        store.scheduler.spawn(
            "id_lists",
            interval_or_default(options.idlists_sync_interval_ms, DEFAULT_IDLISTS_SYNC_INTERVAL_MS),
            move || {
                let syncer = id_list_syncer.clone();
                async move { syncer.sync_id_lists().await }
            },
        );

        store
    }

    pub fn is_ready_for_checks(&self) -> bool {
        self.get_last_update_time() != 0
    }

    pub fn get_last_update_time(&self) -> u64 {
        self.config_spec_syncer.last_sync_time()
    }

    /// The whole current snapshot. Holding it pins one consistent version.
    ///
    /// Use this to walk every gate, config or layer without copying the maps.
    pub fn get_specs(&self) -> Arc<Specs> {
        self.config_spec_syncer.get_specs()
    }

    pub fn get_gate(&self, gate_name: &str) -> Option<Arc<Value>> {
        self.get_specs().gates.get(gate_name).cloned()
    }

    pub fn get_config(&self, config_name: &str) -> Option<Arc<Value>> {
        self.get_specs().configs.get(config_name).cloned()
    }

    pub fn get_layer(&self, layer_name: &str) -> Option<Arc<Value>> {
        self.get_specs().layers.get(layer_name).cloned()
    }

    pub fn get_layer_name_for_experiment(&self, experiment_name: &str) -> Option<String> {
        self.get_specs().experiment_to_layer.get(experiment_name).cloned()
    }

    pub fn get_experiment_to_layer(&self) -> HashMap<String, String> {
        self.get_specs().experiment_to_layer.clone()
    }

    pub fn get_id_list(&self, list_name: &str) -> Option<Arc<IdList>> {
        self.id_list_syncer.get_id_list(list_name)
    }

    pub fn get_all_id_lists(&self) -> Arc<IdLists> {
        self.id_list_syncer.get_all_id_lists()
    }

    /// Stops both background syncs, waiting for any cycle in progress, then shuts the
    /// datastore down.
    pub async fn shutdown(&self) -> Result<()> {
        if self.local_mode {
            return Ok(());
        }

        let result = self.scheduler.shutdown().await;
        if let Some(data_store) = &self.data_store {
            data_store.shutdown().await;
        }
        result
    }
}

fn interval_or_default(interval_ms: u32, default_ms: u32) -> Duration {
    match interval_ms {
        0 => Duration::from_millis(default_ms as u64),
        ms => Duration::from_millis(ms as u64),
    }
}
