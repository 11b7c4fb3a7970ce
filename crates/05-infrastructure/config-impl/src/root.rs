//! 配置根实现

use crate::section::ConfigurationSection;
use config_abstractions::{
    path, ConfigError, ConfigResult, Configuration, ConfigurationProvider, ReloadToken,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// 配置根
///
/// 按注册顺序持有配置提供者，读取时从后往前查找（后注册者优先），写入时写到每个提供者。
/// 克隆得到的是同一个配置根的句柄。
#[derive(Clone)]
pub struct ConfigurationRoot {
    inner: Arc<RootInner>,
}

struct RootInner {
    providers: Vec<Arc<dyn ConfigurationProvider>>,
    reload_token: Mutex<ReloadToken>,
}

impl ConfigurationRoot {
    /// 创建配置根并按顺序加载每个提供者
    pub fn new(providers: Vec<Arc<dyn ConfigurationProvider>>) -> ConfigResult<Self> {
        for provider in &providers {
            debug!("加载配置提供者: {}", provider.name());
            provider.load()?;
        }

        let inner = Arc::new(RootInner {
            providers,
            reload_token: Mutex::new(ReloadToken::new()),
        });
        for index in 0..inner.providers.len() {
            RootInner::watch_provider(&inner, index);
        }

        info!("配置根构建完成，共 {} 个配置提供者", inner.providers.len());
        Ok(Self { inner })
    }

    /// 已注册的配置提供者
    pub fn providers(&self) -> &[Arc<dyn ConfigurationProvider>] {
        &self.inner.providers
    }

    /// 重新加载所有提供者，然后发布新令牌并触发旧令牌
    pub fn reload(&self) -> ConfigResult<()> {
        info!("重新加载配置");
        for provider in &self.inner.providers {
            provider.load()?;
        }
        self.inner.raise_changed();
        Ok(())
    }

    /// 列出根下所有可达的配置项
    ///
    /// 深度优先遍历子节，仅输出有值的路径。
    pub fn as_enumerable(&self) -> Vec<(String, String)> {
        let mut entries = Vec::new();
        let mut pending: Vec<ConfigurationSection> = self.get_children();
        pending.reverse();

        while let Some(section) = pending.pop() {
            if let Some(value) = section.value() {
                entries.push((section.path().to_owned(), value));
            }
            let mut children = section.get_children();
            children.reverse();
            pending.extend(children);
        }

        entries
    }

    pub(crate) fn child_keys(&self, parent_path: Option<&str>) -> Vec<String> {
        self.inner
            .providers
            .iter()
            .fold(Vec::new(), |seed, provider| {
                provider.get_child_keys(seed, parent_path)
            })
    }

    pub(crate) fn sections_for(&self, parent_path: Option<&str>) -> Vec<ConfigurationSection> {
        self.child_keys(parent_path)
            .into_iter()
            .map(|key| {
                let section_path = match parent_path {
                    Some(parent) => path::combine([parent, key.as_str()]),
                    None => key,
                };
                ConfigurationSection::new(self.clone(), section_path)
            })
            .collect()
    }
}

impl RootInner {
    /// 监听提供者的令牌，触发后重新监听提供者的新令牌
    fn watch_provider(inner: &Arc<Self>, index: usize) {
        let Some(provider) = inner.providers.get(index) else {
            return;
        };
        let root: Weak<Self> = Arc::downgrade(inner);
        let _ = provider.get_reload_token().register_change_callback(move || {
            if let Some(root) = root.upgrade() {
                debug!("配置提供者 {} 通知变更", index);
                root.raise_changed();
                Self::watch_provider(&root, index);
            }
        });
    }

    fn raise_changed(&self) {
        let previous = std::mem::take(&mut *self.reload_token.lock());
        previous.on_reload();
    }
}

impl Configuration for ConfigurationRoot {
    type Section = ConfigurationSection;

    fn get(&self, key: &str) -> Option<String> {
        self.inner
            .providers
            .iter()
            .rev()
            .find_map(|provider| provider.try_get(key))
    }

    fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        if self.inner.providers.is_empty() {
            return Err(ConfigError::NoSources);
        }

        debug!("设置配置值: {}", key);
        for provider in &self.inner.providers {
            provider.set(key, value);
        }
        Ok(())
    }

    fn get_section(&self, key: &str) -> ConfigurationSection {
        ConfigurationSection::new(self.clone(), key.to_owned())
    }

    fn get_children(&self) -> Vec<ConfigurationSection> {
        self.sections_for(None)
    }

    fn get_reload_token(&self) -> ReloadToken {
        self.inner.reload_token.lock().clone()
    }
}

impl fmt::Debug for ConfigurationRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationRoot")
            .field("providers", &self.inner.providers)
            .finish()
    }
}
