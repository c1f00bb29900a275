use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::data_types::APIDownloadedConfigs;

pub type SpecMap = HashMap<String, Arc<Value>>;

/// An immutable view of every gate, config and layer definition at one point in time.
///
/// The store swaps whole `Specs` values; a reader holding an `Arc<Specs>` never sees a
/// mix of two versions.
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct Specs {
    pub gates: SpecMap,
    pub configs: SpecMap,
    pub layers: SpecMap,
    pub experiment_to_layer: HashMap<String, String>,
    #[serde(rename = "last_update_time")]
    pub last_sync_time: u64,
}

impl Specs {
    pub fn new() -> Specs {
        Specs::default()
    }

    /// Builds a snapshot from a download_config_specs payload.
    ///
    /// Returns `None` for payloads that carry no time or no updates.
    pub fn from_downloaded_configs(downloaded_configs: &APIDownloadedConfigs) -> Option<Specs> {
        if !downloaded_configs.is_valid() {
            return None;
        }

        let mut experiment_to_layer = HashMap::new();
        if let Some(layers) = &downloaded_configs.layers {
            for (layer_name, experiments) in layers {
                for experiment_name in experiments {
                    experiment_to_layer.insert(experiment_name.clone(), layer_name.clone());
                }
            }
        }

        Some(Specs {
            gates: index_by_name(&downloaded_configs.feature_gates),
            configs: index_by_name(&downloaded_configs.dynamic_configs),
            layers: index_by_name(&downloaded_configs.layer_configs),
            experiment_to_layer,
            last_sync_time: downloaded_configs.time.unwrap_or_default(),
        })
    }

    /// Merges a persisted record over `self`. Empty maps in the record keep the current ones.
    pub fn merged_with_cache(&self, cached: CachedSpecs) -> Specs {
        fn pick<T: Clone>(cached: Option<HashMap<String, T>>, current: &HashMap<String, T>) -> HashMap<String, T> {
            match cached {
                Some(map) if !map.is_empty() => map,
                _ => current.clone(),
            }
        }

        Specs {
            gates: pick(cached.gates, &self.gates),
            configs: pick(cached.configs, &self.configs),
            layers: pick(cached.layers, &self.layers),
            experiment_to_layer: pick(cached.experiment_to_layer, &self.experiment_to_layer),
            last_sync_time: match cached.last_update_time {
                Some(0) | None => self.last_sync_time,
                Some(time) => time,
            },
        }
    }
}

fn index_by_name(definitions: &[Value]) -> SpecMap {
    definitions
        .iter()
        .filter_map(|definition| {
            let name = definition.get("name")?.as_str()?;
            Some((name.to_string(), Arc::new(definition.clone())))
        })
        .collect()
}

/// The record read back from a datastore. Every field is optional so that a partial
/// record can still be inspected before it is accepted.
#[derive(Deserialize, Debug, Default)]
pub struct CachedSpecs {
    pub gates: Option<SpecMap>,
    pub configs: Option<SpecMap>,
    pub layers: Option<SpecMap>,
    pub experiment_to_layer: Option<HashMap<String, String>>,
    pub last_update_time: Option<u64>,
}
