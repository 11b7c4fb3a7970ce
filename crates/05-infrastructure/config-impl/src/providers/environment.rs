//! 环境变量配置提供者

use crate::builder::ConfigurationBuilder;
use config_abstractions::{
    ConfigData, ConfigResult, ConfigurationProvider, ConfigurationSource, ProviderStore,
    KEY_DELIMITER,
};
use std::sync::Arc;
use tracing::debug;
use uncased::Uncased;

/// 环境变量中的层级分隔符
const ENV_SEPARATOR: &str = "__";

/// 环境变量配置源
#[derive(Debug, Clone, Default)]
pub struct EnvironmentVariablesConfigurationSource {
    /// 环境变量前缀，匹配时不区分大小写并从键中去除
    pub prefix: String,
}

impl EnvironmentVariablesConfigurationSource {
    /// 创建环境变量配置源
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl ConfigurationSource for EnvironmentVariablesConfigurationSource {
    fn build(&self) -> ConfigResult<Arc<dyn ConfigurationProvider>> {
        Ok(Arc::new(EnvironmentVariablesConfigurationProvider::new(
            self.prefix.clone(),
        )))
    }
}

/// 环境变量配置提供者
///
/// 环境变量名中的 `__` 映射为路径分隔符 `:`。
#[derive(Debug, Default)]
pub struct EnvironmentVariablesConfigurationProvider {
    prefix: String,
    store: ProviderStore,
}

impl EnvironmentVariablesConfigurationProvider {
    /// 创建新的环境变量配置提供者
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            store: ProviderStore::new(),
        }
    }

    /// 获取环境变量前缀
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 从给定的变量集合加载
    pub fn load_from<I, K, V>(&self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut data = ConfigData::new();
        for (name, value) in vars {
            if let Some(key) = self.env_key_to_config_key(name.as_ref()) {
                data.insert(Uncased::from_owned(key), value.into());
            }
        }

        debug!("加载了 {} 个环境变量，前缀: {}", data.len(), self.prefix);
        self.store.replace(data);
    }

    /// 将环境变量名转换为配置键，前缀不匹配时返回 `None`
    fn env_key_to_config_key(&self, name: &str) -> Option<String> {
        let head = name.get(..self.prefix.len())?;
        if !head.eq_ignore_ascii_case(&self.prefix) {
            return None;
        }
        let key = name.get(self.prefix.len()..)?;
        Some(key.replace(ENV_SEPARATOR, KEY_DELIMITER))
    }
}

impl ConfigurationProvider for EnvironmentVariablesConfigurationProvider {
    fn store(&self) -> &ProviderStore {
        &self.store
    }

    fn load(&self) -> ConfigResult<()> {
        self.load_from(std::env::vars_os().filter_map(|(name, value)| {
            Some((name.into_string().ok()?, value.into_string().ok()?))
        }));
        Ok(())
    }

    fn name(&self) -> &str {
        "EnvironmentVariablesConfigurationProvider"
    }
}

impl ConfigurationBuilder {
    /// 添加带前缀的环境变量，前缀为空时加载所有环境变量
    pub fn add_environment_variables(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.add(EnvironmentVariablesConfigurationSource::new(prefix))
    }
}
