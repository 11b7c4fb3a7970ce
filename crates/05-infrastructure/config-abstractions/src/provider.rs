//! 配置提供者抽象接口

use crate::errors::ConfigResult;
use crate::path::KEY_DELIMITER;
use crate::token::ReloadToken;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uncased::{Uncased, UncasedStr};

/// 不区分大小写的扁平配置数据
///
/// 键按 ASCII 折叠比较，保留第一次插入时的大小写。
pub type ConfigData = BTreeMap<Uncased<'static>, String>;

/// 配置提供者 trait
///
/// 每个提供者拥有一份扁平的键值数据。默认方法都委托给 [`ConfigurationProvider::store`]
/// 返回的 [`ProviderStore`]，具体提供者通常只需要实现 `store`、`load` 与 `name`。
pub trait ConfigurationProvider: Send + Sync + fmt::Debug {
    /// 提供者持有的数据存储
    fn store(&self) -> &ProviderStore;

    /// 从数据源（重新）加载数据
    fn load(&self) -> ConfigResult<()>;

    /// 获取提供者名称
    fn name(&self) -> &str;

    /// 获取配置值
    fn try_get(&self, key: &str) -> Option<String> {
        self.store().get(key)
    }

    /// 设置配置值
    fn set(&self, key: &str, value: &str) {
        self.store().set(key, value);
    }

    /// 将 `parent_path` 下的直接子键合并到 `earlier_keys`
    fn get_child_keys(&self, earlier_keys: Vec<String>, parent_path: Option<&str>) -> Vec<String> {
        self.store().child_keys(earlier_keys, parent_path)
    }

    /// 获取提供者自己的重载令牌
    fn get_reload_token(&self) -> ReloadToken {
        self.store().reload_token()
    }
}

/// 配置源 trait
///
/// 配置源是提供者的工厂，由构建器按注册顺序调用。
pub trait ConfigurationSource: Send + Sync + fmt::Debug {
    /// 构建配置提供者
    fn build(&self) -> ConfigResult<Arc<dyn ConfigurationProvider>>;
}

/// 提供者共享的数据存储
///
/// 数据由读写锁保护，可被多个线程同时读取和写入。
pub struct ProviderStore {
    data: RwLock<ConfigData>,
    reload_token: Mutex<ReloadToken>,
}

impl ProviderStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self {
            data: RwLock::new(ConfigData::new()),
            reload_token: Mutex::new(ReloadToken::new()),
        }
    }

    /// 获取配置值
    pub fn get(&self, key: &str) -> Option<String> {
        self.data.read().get(UncasedStr::new(key)).cloned()
    }

    /// 设置配置值，已存在的键保留原有大小写
    pub fn set(&self, key: &str, value: &str) {
        self.data
            .write()
            .insert(Uncased::from_owned(key.to_owned()), value.to_owned());
    }

    /// 整体替换数据
    pub fn replace(&self, data: ConfigData) {
        *self.data.write() = data;
    }

    /// 当前数据的快照
    pub fn snapshot(&self) -> Vec<(String, String)> {
        self.data
            .read()
            .iter()
            .map(|(key, value)| (key.as_str().to_owned(), value.clone()))
            .collect()
    }

    /// 数据条目数
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// 合并直接子键
    ///
    /// 对每个以 `parent_path:` 开头的键（`parent_path` 为 `None` 时为所有键），取其后的第一段，
    /// 不区分大小写地去重后追加到 `earlier_keys` 末尾。
    pub fn child_keys(&self, mut earlier_keys: Vec<String>, parent_path: Option<&str>) -> Vec<String> {
        let prefix = parent_path.map(|parent| format!("{parent}{KEY_DELIMITER}"));
        let data = self.data.read();

        for key in data.keys() {
            let Some(rest) = strip_prefix_ignore_case(key.as_str(), prefix.as_deref()) else {
                continue;
            };
            let segment = rest.split(KEY_DELIMITER).next().unwrap_or(rest);
            if !earlier_keys
                .iter()
                .any(|seen| seen.eq_ignore_ascii_case(segment))
            {
                earlier_keys.push(segment.to_owned());
            }
        }

        earlier_keys
    }

    /// 当前重载令牌
    pub fn reload_token(&self) -> ReloadToken {
        self.reload_token.lock().clone()
    }

    /// 替换重载令牌并触发旧令牌
    ///
    /// 供能够自行感知数据源变化的提供者使用。
    pub fn on_reload(&self) {
        let previous = std::mem::take(&mut *self.reload_token.lock());
        previous.on_reload();
    }
}

impl Default for ProviderStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ProviderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderStore")
            .field("entries", &self.len())
            .finish()
    }
}

fn strip_prefix_ignore_case<'a>(key: &'a str, prefix: Option<&str>) -> Option<&'a str> {
    let Some(prefix) = prefix else {
        return Some(key);
    };
    let head = key.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        key.get(prefix.len()..)
    } else {
        None
    }
}
