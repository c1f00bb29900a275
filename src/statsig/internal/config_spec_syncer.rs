use std::sync::{Arc, RwLock};

use crate::statsig::statsig_datastore::{StatsigDatastore, CONFIG_SPEC_KEY};
use crate::statsig::statsig_error::{Result, StatsigError};
use crate::statsig::statsig_error_sink::StatsigErrorSink;
use crate::statsig::statsig_options::RulesUpdatedCallback;
use crate::statsig::statsig_specs_client::StatsigSpecsClient;
use crate::StatsigOptions;

use super::data_types::APIDownloadedConfigs;
use super::specs::{CachedSpecs, Specs};

/// Owns the current [`Specs`] and keeps it up to date.
///
/// Readers take a cheap `Arc` clone of the current snapshot. Every update builds a complete
/// replacement first and swaps it in under a short write lock.
pub struct ConfigSpecSyncer {
    specs: RwLock<Arc<Specs>>,
    network: Arc<dyn StatsigSpecsClient>,
    data_store: Option<Arc<dyn StatsigDatastore>>,
    bootstrap_values: Option<String>,
    rules_updated_callback: Option<RulesUpdatedCallback>,
    error_sink: Arc<dyn StatsigErrorSink>,
}

impl ConfigSpecSyncer {
    pub fn new(
        network: Arc<dyn StatsigSpecsClient>,
        options: &StatsigOptions,
        error_sink: Arc<dyn StatsigErrorSink>,
    ) -> ConfigSpecSyncer {
        ConfigSpecSyncer {
            specs: RwLock::new(Arc::new(Specs::new())),
            network,
            data_store: options.data_store.clone(),
            bootstrap_values: options.bootstrap_values.clone(),
            rules_updated_callback: options.rules_updated_callback.clone(),
            error_sink,
        }
    }

    pub fn get_specs(&self) -> Arc<Specs> {
        // A poisoned lock still holds a complete snapshot since writers only ever swap the Arc.
        match self.specs.read() {
            Ok(specs) => specs.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last_sync_time(&self) -> u64 {
        self.get_specs().last_sync_time
    }

    /// Loads the first snapshot: datastore, then bootstrap values, then the network.
    ///
    /// Failures are reported and leave the store empty; the periodic sync fills it later.
    pub async fn initialize(&self) {
        if let Some(data_store) = &self.data_store {
            if self.bootstrap_values.is_some() {
                log::warn!(target: "statsig", "data_store gets priority over bootstrap_values. bootstrap_values will be ignored");
            }

            if let Err(e) = self.load_from_data_store(data_store.as_ref()).await {
                self.error_sink.report(&e);
            }

            if self.last_sync_time() == 0 {
                self.sync_and_report().await;
            }
        } else if let Some(bootstrap_values) = &self.bootstrap_values {
            if let Err(e) = self.bootstrap(bootstrap_values) {
                self.error_sink.report(&e);
            }
        } else {
            self.sync_and_report().await;
        }
    }

    /// Fetches everything changed since the current snapshot and applies it.
    pub async fn download_config_specs(&self) -> Result<()> {
        let downloaded_configs = self
            .network
            .fetch_config_specs(self.last_sync_time())
            .await?;

        if !self.process_specs(&downloaded_configs)? {
            log::debug!(target: "statsig", "no config spec updates");
            return Ok(());
        }

        self.save_to_data_store().await
    }

    async fn sync_and_report(&self) {
        if let Err(e) = self.download_config_specs().await {
            self.error_sink.report(&e);
        }
    }

    fn bootstrap(&self, bootstrap_values: &str) -> Result<()> {
        let downloaded_configs: Option<APIDownloadedConfigs> = serde_json::from_str(bootstrap_values)
            .map_err(|e| StatsigError::MalformedPayload {
                what: "bootstrap_values",
                source: e,
            })?;

        if let Some(downloaded_configs) = downloaded_configs {
            self.process_specs(&downloaded_configs)?;
        }
        Ok(())
    }

    /// Swaps in the specs carried by `downloaded_configs`. Returns whether anything changed.
    fn process_specs(&self, downloaded_configs: &APIDownloadedConfigs) -> Result<bool> {
        let specs = match Specs::from_downloaded_configs(downloaded_configs) {
            Some(specs) => specs,
            None => return Ok(false),
        };

        log::debug!(target: "statsig", "applying config specs from {}", specs.last_sync_time);
        self.set_specs(specs);

        if let Some(callback) = &self.rules_updated_callback {
            let raw = serde_json::to_string(downloaded_configs).map_err(|e| StatsigError::MalformedPayload {
                what: "download_config_specs",
                source: e,
            })?;
            callback(&raw);
        }

        Ok(true)
    }

    async fn load_from_data_store(&self, data_store: &dyn StatsigDatastore) -> Result<()> {
        let cache_string = match data_store.get(CONFIG_SPEC_KEY).await {
            Some(value) => value,
            None => return Ok(()),
        };

        let cached: CachedSpecs = serde_json::from_str(&cache_string).map_err(|e| {
            log::warn!(target: "statsig", "Invalid type returned from StatsigOptions.data_store");
            StatsigError::MalformedCache(e.to_string())
        })?;

        let current = self.get_specs();
        match cached.last_update_time {
            Some(time) if time >= current.last_sync_time => {
                log::debug!(target: "statsig", "loaded config specs from data_store at {}", time);
                self.set_specs(current.merged_with_cache(cached));
            }
            _ => {
                log::debug!(target: "statsig", "ignoring stale or untimed data_store record");
            }
        }

        Ok(())
    }

    async fn save_to_data_store(&self) -> Result<()> {
        let data_store = match &self.data_store {
            Some(data_store) => data_store,
            None => return Ok(()),
        };

        let specs = self.get_specs();
        if specs.last_sync_time == 0 {
            return Ok(());
        }

        let value = serde_json::to_string(specs.as_ref()).map_err(|e| StatsigError::MalformedPayload {
            what: "config specs cache",
            source: e,
        })?;
        data_store.set(CONFIG_SPEC_KEY, &value).await;
        Ok(())
    }

    fn set_specs(&self, specs: Specs) {
        // Constructing the Arc before taking the lock keeps the write section to a pointer swap.
        let new_specs = Arc::new(specs);
        match self.specs.write() {
            Ok(mut current) => *current = new_specs,
            Err(poisoned) => *poisoned.into_inner() = new_specs,
        }
    }
}
