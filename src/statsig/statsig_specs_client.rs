use std::collections::HashMap;

use async_trait::async_trait;

use super::internal::data_types::{APIDownloadedConfigs, APIIdList};
use super::statsig_error::Result;

/// A slice of an id list file, starting at the requested byte offset.
#[derive(Clone, Debug, PartialEq)]
pub struct IdListRange {
    /// The declared `content-length` of the response.
    pub content_length: u64,
    pub text: String,
}

/// Remote source of config specs and id lists.
///
/// [`StatsigNetwork`](crate::StatsigNetwork) is the http implementation. Tests and
/// proxies can provide their own.
#[async_trait]
pub trait StatsigSpecsClient: Send + Sync {
    /// Fetches every spec changed after `since_time`. A `since_time` of 0 asks for everything.
    async fn fetch_config_specs(&self, since_time: u64) -> Result<APIDownloadedConfigs>;

    /// Fetches the id list directory. `None` means the server had no directory to give.
    async fn fetch_id_lists(&self) -> Result<Option<HashMap<String, APIIdList>>>;

    /// Fetches `url` from byte `start` to the end of the file.
    async fn fetch_id_list_range(&self, list_name: &str, url: &str, start: u64) -> Result<IdListRange>;
}
