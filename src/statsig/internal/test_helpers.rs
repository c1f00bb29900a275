use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::statsig::statsig_datastore::StatsigDatastore;
use crate::statsig::statsig_error::{Result, StatsigError};
use crate::statsig::statsig_error_sink::StatsigErrorSink;
use crate::statsig::statsig_specs_client::{IdListRange, StatsigSpecsClient};

use super::data_types::{APIDownloadedConfigs, APIIdList};

/// In-memory stand-in for the statsig api. Unset responses fail like a 500 would.
#[derive(Default)]
pub struct FakeSpecsClient {
    pub config_specs: Mutex<Option<Value>>,
    pub id_lists: Mutex<Option<Value>>,
    /// url -> range body. A `None` body simulates a response without content-length.
    pub ranges: Mutex<HashMap<String, Option<IdListRange>>>,

    pub since_times: Mutex<Vec<u64>>,
    pub range_requests: Mutex<Vec<(String, u64)>>,
}

impl FakeSpecsClient {
    pub fn set_config_specs(&self, value: Value) {
        *self.config_specs.lock().unwrap() = Some(value);
    }

    pub fn set_id_lists(&self, value: Value) {
        *self.id_lists.lock().unwrap() = Some(value);
    }

    pub fn set_range(&self, url: &str, text: &str) {
        self.ranges.lock().unwrap().insert(
            url.to_string(),
            Some(IdListRange {
                content_length: text.len() as u64,
                text: text.to_string(),
            }),
        );
    }

    pub fn set_range_without_content_length(&self, url: &str) {
        self.ranges.lock().unwrap().insert(url.to_string(), None);
    }

    pub fn config_spec_requests(&self) -> usize {
        self.since_times.lock().unwrap().len()
    }
}

fn failed(endpoint: &str) -> StatsigError {
    StatsigError::RequestFailed {
        endpoint: endpoint.to_string(),
        status: 500,
    }
}

#[async_trait]
impl StatsigSpecsClient for FakeSpecsClient {
    async fn fetch_config_specs(&self, since_time: u64) -> Result<APIDownloadedConfigs> {
        self.since_times.lock().unwrap().push(since_time);
        let value = self
            .config_specs
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| failed("download_config_specs"))?;

        serde_json::from_value(value).map_err(|e| StatsigError::MalformedPayload {
            what: "download_config_specs",
            source: e,
        })
    }

    async fn fetch_id_lists(&self) -> Result<Option<HashMap<String, APIIdList>>> {
        let value = self
            .id_lists
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| failed("get_id_lists"))?;

        serde_json::from_value(value).map_err(|e| StatsigError::MalformedPayload {
            what: "get_id_lists",
            source: e,
        })
    }

    async fn fetch_id_list_range(&self, list_name: &str, url: &str, start: u64) -> Result<IdListRange> {
        self.range_requests.lock().unwrap().push((url.to_string(), start));
        match self.ranges.lock().unwrap().get(url) {
            Some(Some(range)) => Ok(range.clone()),
            Some(None) => Err(StatsigError::MissingContentLength(list_name.to_string())),
            None => Err(failed("id_list_file")),
        }
    }
}

#[derive(Default)]
pub struct MemoryDatastore {
    pub values: Mutex<HashMap<String, String>>,
    pub gets: AtomicUsize,
}

impl MemoryDatastore {
    pub fn with_value(key: &str, value: &str) -> MemoryDatastore {
        let store = MemoryDatastore::default();
        store.values.lock().unwrap().insert(key.to_string(), value.to_string());
        store
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl StatsigDatastore for MemoryDatastore {
    async fn get(&self, key: &str) -> Option<String> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.value(key)
    }

    async fn set(&self, key: &str, value: &str) {
        self.values.lock().unwrap().insert(key.to_string(), value.to_string());
    }
}

/// Keeps the display form of every reported error.
#[derive(Default)]
pub struct RecordingErrorSink {
    pub errors: Mutex<Vec<String>>,
}

impl RecordingErrorSink {
    pub fn count(&self) -> usize {
        self.errors.lock().unwrap().len()
    }
}

impl StatsigErrorSink for RecordingErrorSink {
    fn report(&self, error: &StatsigError) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}
