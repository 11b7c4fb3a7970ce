//! 配置构建器

use crate::root::ConfigurationRoot;
use config_abstractions::{ConfigResult, ConfigurationProvider, ConfigurationSource};
use std::sync::Arc;
use tracing::{debug, info};

/// 配置构建器
///
/// 按顺序收集配置源，构建时依次创建提供者，后添加的配置源优先级更高。
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    /// 配置源列表
    sources: Vec<Arc<dyn ConfigurationSource>>,
}

impl ConfigurationBuilder {
    /// 创建新的配置构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加配置源
    pub fn add<S>(&mut self, source: S) -> &mut Self
    where
        S: ConfigurationSource + 'static,
    {
        self.add_shared(Arc::new(source))
    }

    /// 添加共享的配置源
    pub fn add_shared(&mut self, source: Arc<dyn ConfigurationSource>) -> &mut Self {
        debug!("添加配置源: {:?}", source);
        self.sources.push(source);
        self
    }

    /// 已添加的配置源（按添加顺序）
    pub fn sources(&self) -> &[Arc<dyn ConfigurationSource>] {
        &self.sources
    }

    /// 构建配置根
    pub fn build(&self) -> ConfigResult<ConfigurationRoot> {
        info!("开始构建配置，共 {} 个配置源", self.sources.len());

        let providers = self
            .sources
            .iter()
            .map(|source| source.build())
            .collect::<ConfigResult<Vec<Arc<dyn ConfigurationProvider>>>>()?;

        ConfigurationRoot::new(providers)
    }
}
