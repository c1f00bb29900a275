use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

use futures::future::join_all;

use crate::statsig::statsig_error::Result;
use crate::statsig::statsig_error_sink::StatsigErrorSink;
use crate::statsig::statsig_specs_client::StatsigSpecsClient;

use super::data_types::APIIdList;
use super::id_list::{IdList, IdLists};

/// Owns every id list and reconciles it with the server's directory.
///
/// The collection is published as an `Arc<IdLists>`. Each commit clones the map of
/// `Arc<IdList>` under the write lock, so concurrent downloads in one cycle are serialized
/// only for the instant it takes to insert their result.
pub struct IdListSyncer {
    id_lists: RwLock<Arc<IdLists>>,
    network: Arc<dyn StatsigSpecsClient>,
    error_sink: Arc<dyn StatsigErrorSink>,
}

impl IdListSyncer {
    pub fn new(network: Arc<dyn StatsigSpecsClient>, error_sink: Arc<dyn StatsigErrorSink>) -> IdListSyncer {
        IdListSyncer {
            id_lists: RwLock::new(Arc::new(HashMap::new())),
            network,
            error_sink,
        }
    }

    pub fn get_id_list(&self, list_name: &str) -> Option<Arc<IdList>> {
        self.get_all_id_lists().get(list_name).cloned()
    }

    pub fn get_all_id_lists(&self) -> Arc<IdLists> {
        match self.id_lists.read() {
            Ok(id_lists) => id_lists.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Runs one directory cycle: download new content for every list that grew or rotated,
    /// wait for all of it, then drop the lists the server no longer has.
    pub async fn sync_id_lists(&self) -> Result<()> {
        let server_id_lists = match self.network.fetch_id_lists().await? {
            Some(server_id_lists) => server_id_lists,
            None => return Ok(()),
        };

        let local_id_lists = self.get_all_id_lists();
        let downloads: Vec<_> = server_id_lists
            .iter()
            .filter_map(|(list_name, server_list)| {
                let list = IdList::plan_download(list_name, server_list, local_id_lists.get(list_name).map(|list| list.as_ref()))?;
                Some(self.download_single_id_list(list))
            })
            .collect();

        let finished = join_all(downloads).await;
        log::debug!(target: "statsig", "synced {} of {} id lists", finished.into_iter().filter(|ok| *ok).count(), server_id_lists.len());

        self.remove_deleted_lists(&server_id_lists);
        Ok(())
    }

    async fn download_single_id_list(&self, mut list: IdList) -> bool {
        let result = async {
            let range = self
                .network
                .fetch_id_list_range(&list.name, &list.url, list.read_bytes)
                .await?;
            list.apply_range(&range)
        }
        .await;

        match result {
            Ok(()) => {
                self.commit(list);
                true
            }
            Err(e) => {
                self.error_sink.report(&e);
                false
            }
        }
    }

    fn commit(&self, list: IdList) {
        let name = list.name.clone();
        let list = Arc::new(list);
        let mut id_lists = self.write_lock();
        Arc::make_mut(&mut *id_lists).insert(name, list);
    }

    fn remove_deleted_lists(&self, server_id_lists: &HashMap<String, APIIdList>) {
        let mut id_lists = self.write_lock();
        if id_lists.keys().all(|name| server_id_lists.contains_key(name)) {
            return;
        }

        Arc::make_mut(&mut *id_lists).retain(|name, _| {
            let keep = server_id_lists.contains_key(name);
            if !keep {
                log::debug!(target: "statsig", "removing deleted id list {}", name);
            }
            keep
        });
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Arc<IdLists>> {
        match self.id_lists.write() {
            Ok(id_lists) => id_lists,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
