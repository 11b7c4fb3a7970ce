//! # Configuration Implementation
//!
//! 配置组合引擎的具体实现：把多个有序配置源合并为一棵按路径寻址的配置树。
//!
//! ## 主要组件
//!
//! - [`ConfigurationBuilder`] - 配置构建器
//! - [`ConfigurationRoot`] - 配置根（后注册的配置源优先）
//! - [`ConfigurationSection`] - 配置节视图
//! - [`JsonConfigurationFileParser`] - JSON 配置解析器
//! - [`MemoryConfigurationProvider`] - 内存配置提供者
//! - [`JsonConfigurationProvider`] - JSON 配置提供者
//! - [`CommandLineConfigurationProvider`] - 命令行配置提供者
//! - [`EnvironmentVariablesConfigurationProvider`] - 环境变量配置提供者
//!
//! ```
//! use config_abstractions::Configuration;
//! use config_impl::ConfigurationBuilder;
//!
//! let config = ConfigurationBuilder::new()
//!     .add_in_memory_collection([("Data:Name", "first")])
//!     .add_in_memory_collection([("data:name", "second")])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.get("DATA:NAME").as_deref(), Some("second"));
//! assert_eq!(config.get_section("Data").get("Name").as_deref(), Some("second"));
//! ```

pub mod builder;
pub mod json_parser;
pub mod providers;
pub mod root;
pub mod section;

pub use builder::*;
pub use json_parser::*;
pub use providers::*;
pub use root::*;
pub use section::*;

#[cfg(test)]
mod tests;
