pub use data_types::{APIDownloadedConfigs, APIIdList};
pub use id_list::{IdList, IdLists};
pub use specs::{SpecMap, Specs};
pub use statsig_network::StatsigNetwork;
pub use statsig_store::StatsigStore;

pub mod helpers;

pub(crate) mod data_types;
mod config_spec_syncer;
mod id_list;
mod id_list_syncer;
mod specs;
mod statsig_network;
mod statsig_store;
mod sync_scheduler;

#[cfg(test)]
mod test_helpers;
