use std::collections::HashMap;

use async_trait::async_trait;
use http::header::{CONTENT_LENGTH, RANGE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::statsig::statsig_error::{Result, StatsigError};
use crate::statsig::statsig_specs_client::{IdListRange, StatsigSpecsClient};
use crate::StatsigOptions;

use super::data_types::{APIDownloadedConfigs, APIIdList};

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct StatsigNetwork {
    client: Client,
    secret: String,
    api_for_download_config_specs: String,
    api_for_get_id_lists: String,
    statsig_metadata: Value,
}

impl StatsigNetwork {
    pub fn new(secret_key: &str, options: &StatsigOptions) -> Self {
        StatsigNetwork {
            client: Client::new(),
            secret: secret_key.to_string(),
            api_for_download_config_specs: options
                .api_for_download_config_specs
                .clone()
                .unwrap_or_else(|| options.api_override.clone()),
            api_for_get_id_lists: options
                .api_for_get_id_lists
                .clone()
                .unwrap_or_else(|| options.api_override.clone()),
            statsig_metadata: json!(HashMap::from([
                ("sdkType".to_string(), "rust-server".to_string()),
                ("sdkVersion".to_string(), VERSION.to_string())
            ])),
        }
    }

    async fn post_request<T: DeserializeOwned>(
        &self,
        base_api: &str,
        endpoint: &'static str,
        mut body: HashMap<&str, Value>,
    ) -> Result<T> {
        let url = format!("{}/{}", base_api, endpoint);

        body.insert("statsigMetadata", self.statsig_metadata.clone());

        let res = self
            .client
            .post(url)
            .header("STATSIG-API-KEY", self.secret.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| StatsigError::network(endpoint, e))?;

        let text = Self::success_text(endpoint, res).await?;
        serde_json::from_str::<T>(&text).map_err(|e| StatsigError::MalformedPayload {
            what: endpoint,
            source: e,
        })
    }

    async fn success_text(endpoint: &str, res: Response) -> Result<String> {
        if !res.status().is_success() {
            return Err(StatsigError::RequestFailed {
                endpoint: endpoint.to_string(),
                status: res.status().as_u16(),
            });
        }

        res.text().await.map_err(|e| StatsigError::network(endpoint, e))
    }
}

#[async_trait]
impl StatsigSpecsClient for StatsigNetwork {
    async fn fetch_config_specs(&self, since_time: u64) -> Result<APIDownloadedConfigs> {
        let body = HashMap::from([("sinceTime", json!(since_time))]);

        log::debug!(target: "statsig", "fetching config specs since {}", since_time);
        self.post_request(&self.api_for_download_config_specs, "download_config_specs", body)
            .await
    }

    async fn fetch_id_lists(&self) -> Result<Option<HashMap<String, APIIdList>>> {
        log::debug!(target: "statsig", "fetching id list directory");
        self.post_request(&self.api_for_get_id_lists, "get_id_lists", HashMap::new())
            .await
    }

    async fn fetch_id_list_range(&self, list_name: &str, url: &str, start: u64) -> Result<IdListRange> {
        let res = self
            .client
            .get(url)
            .header(RANGE, format!("bytes={}-", start))
            .send()
            .await
            .map_err(|e| StatsigError::network("id_list_file", e))?;

        if !res.status().is_success() {
            return Err(StatsigError::RequestFailed {
                endpoint: "id_list_file".to_string(),
                status: res.status().as_u16(),
            });
        }

        let content_length = res
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| StatsigError::MissingContentLength(list_name.to_string()))?;

        let text = res
            .text()
            .await
            .map_err(|e| StatsigError::network("id_list_file", e))?;

        Ok(IdListRange { content_length, text })
    }
}
