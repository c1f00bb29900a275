use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Response of the download_config_specs endpoint.
///
/// Gate, config and layer definitions are kept as raw json. Only `name` is read here;
/// the rest is handed to the evaluator untouched.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct APIDownloadedConfigs {
    #[serde(default)]
    pub feature_gates: Vec<Value>,
    #[serde(default)]
    pub dynamic_configs: Vec<Value>,
    #[serde(default)]
    pub layer_configs: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub has_updates: bool,
    #[serde(default)]
    pub time: Option<u64>,

    #[serde(flatten)]
    pub other: HashMap<String, Value>,
}

impl APIDownloadedConfigs {
    /// Payloads without a time, or without updates since the cursor, are never applied.
    pub fn is_valid(&self) -> bool {
        self.time.is_some() && self.has_updates
    }
}

/// One entry of the get_id_lists directory.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct APIIdList {
    pub url: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub creation_time: i64,
    #[serde(rename = "fileID")]
    pub file_id: Option<String>,
}
