use async_trait::async_trait;

pub const CONFIG_SPEC_KEY: &str = "statsig.cache";

/// Persistent key/value storage used to survive restarts.
///
/// The store reads [`CONFIG_SPEC_KEY`] once at startup and writes it after every
/// config spec update fetched from the network.
#[async_trait] // when implementing this trait, use the #[async_trait] macro
pub trait StatsigDatastore: Send + Sync {
    async fn initialize(&self) {}
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str);
    async fn shutdown(&self) {}
}
