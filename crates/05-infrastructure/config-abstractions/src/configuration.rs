//! 配置视图接口

use crate::errors::ConfigResult;
use crate::token::ReloadToken;

/// 配置视图 trait
///
/// 配置根与配置节共享的读写接口。
pub trait Configuration: Send + Sync {
    /// 子配置节类型
    type Section: Configuration;

    /// 获取配置值
    fn get(&self, key: &str) -> Option<String>;

    /// 设置配置值
    fn set(&self, key: &str, value: &str) -> ConfigResult<()>;

    /// 获取子配置节
    fn get_section(&self, key: &str) -> Self::Section;

    /// 获取直接子配置节
    fn get_children(&self) -> Vec<Self::Section>;

    /// 获取当前重载令牌
    fn get_reload_token(&self) -> ReloadToken;
}
