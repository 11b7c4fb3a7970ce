//! 配置节实现

use crate::root::ConfigurationRoot;
use config_abstractions::{path, ConfigResult, Configuration, ReloadToken};

/// 配置节
///
/// 配置根在某个路径上的实时视图，不缓存任何值。
#[derive(Debug, Clone)]
pub struct ConfigurationSection {
    root: ConfigurationRoot,
    path: String,
}

impl ConfigurationSection {
    /// 创建绑定到 `root` 与 `path` 的配置节
    pub fn new(root: ConfigurationRoot, path: impl Into<String>) -> Self {
        Self {
            root,
            path: path.into(),
        }
    }

    /// 完整路径
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 路径的最后一段
    pub fn key(&self) -> &str {
        path::get_section_key(Some(&self.path)).unwrap_or_default()
    }

    /// 本节自身的值
    pub fn value(&self) -> Option<String> {
        self.root.get(&self.path)
    }

    /// 设置本节自身的值
    pub fn set_value(&self, value: &str) -> ConfigResult<()> {
        self.root.set(&self.path, value)
    }

    /// 本节是否有值或子节
    pub fn exists(&self) -> bool {
        self.value().is_some() || !self.root.child_keys(Some(&self.path)).is_empty()
    }

    /// 所属配置根
    pub fn root(&self) -> &ConfigurationRoot {
        &self.root
    }

    /// 重新加载所属配置根
    pub fn reload(&self) -> ConfigResult<()> {
        self.root.reload()
    }

    fn full_path(&self, key: &str) -> String {
        path::combine([self.path.as_str(), key])
    }
}

impl Configuration for ConfigurationSection {
    type Section = Self;

    fn get(&self, key: &str) -> Option<String> {
        self.root.get(&self.full_path(key))
    }

    fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        self.root.set(&self.full_path(key), value)
    }

    fn get_section(&self, key: &str) -> Self {
        Self::new(self.root.clone(), self.full_path(key))
    }

    fn get_children(&self) -> Vec<Self> {
        self.root.sections_for(Some(&self.path))
    }

    fn get_reload_token(&self) -> ReloadToken {
        self.root.get_reload_token()
    }
}
