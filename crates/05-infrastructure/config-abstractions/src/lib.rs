//! # Configuration Abstractions
//!
//! 配置组合抽象层，定义配置组合的核心接口和约定。
//!
//! ## 核心接口
//!
//! - [`ConfigurationProvider`] - 配置提供者接口
//! - [`ConfigurationSource`] - 配置源（提供者工厂）接口
//! - [`Configuration`] - 配置视图接口
//! - [`ReloadToken`] - 配置重载通知令牌
//! - [`path`] - 配置路径工具

pub mod configuration;
pub mod errors;
pub mod path;
pub mod provider;
pub mod token;

pub use configuration::*;
pub use errors::*;
pub use path::KEY_DELIMITER;
pub use provider::*;
pub use token::*;
