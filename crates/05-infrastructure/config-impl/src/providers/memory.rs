//! 内存配置提供者

use crate::builder::ConfigurationBuilder;
use config_abstractions::{ConfigResult, ConfigurationProvider, ConfigurationSource, ProviderStore};
use std::sync::Arc;

/// 内存配置源
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigurationSource {
    /// 初始数据
    pub initial_data: Vec<(String, String)>,
}

impl MemoryConfigurationSource {
    /// 使用初始数据创建内存配置源
    pub fn new<I, K, V>(initial_data: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            initial_data: initial_data
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl ConfigurationSource for MemoryConfigurationSource {
    fn build(&self) -> ConfigResult<Arc<dyn ConfigurationProvider>> {
        Ok(Arc::new(MemoryConfigurationProvider::new(self)))
    }
}

/// 内存配置提供者
///
/// 数据在创建时写入，`load` 不会重置数据。
#[derive(Debug, Default)]
pub struct MemoryConfigurationProvider {
    store: ProviderStore,
}

impl MemoryConfigurationProvider {
    /// 根据内存配置源创建提供者
    pub fn new(source: &MemoryConfigurationSource) -> Self {
        let provider = Self::default();
        for (key, value) in &source.initial_data {
            provider.add(key, value);
        }
        provider
    }

    /// 添加配置项
    pub fn add(&self, key: &str, value: &str) {
        self.store.set(key, value);
    }

    /// 当前所有配置项
    pub fn entries(&self) -> Vec<(String, String)> {
        self.store.snapshot()
    }
}

impl ConfigurationProvider for MemoryConfigurationProvider {
    fn store(&self) -> &ProviderStore {
        &self.store
    }

    fn load(&self) -> ConfigResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "MemoryConfigurationProvider"
    }
}

impl ConfigurationBuilder {
    /// 添加内存配置
    pub fn add_in_memory_collection<I, K, V>(&mut self, initial_data: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.add(MemoryConfigurationSource::new(initial_data))
    }
}
