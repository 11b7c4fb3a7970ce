//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("未注册任何配置提供者 (no sources)，请先注册配置源再设置配置值")]
    NoSources,

    #[error("参数 `{name}` 无效: {message}")]
    InvalidArgument { name: &'static str, message: String },

    #[error("配置文件 '{path}' 不存在且未标记为可选")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("无法解析 JSON 配置，第 '{line}' 行出错: '{excerpt}'")]
    JsonParse {
        line: usize,
        column: usize,
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },

    /// 位置指向重复键对应的值结束处
    #[error("发现重复的配置键 '{key}' (第 {line} 行，第 {column} 列)")]
    DuplicateKey {
        key: String,
        line: usize,
        column: usize,
    },

    /// 位置指向该标记结束处，例如根节点 `"test"` 报告第 1 行第 6 列
    #[error("不支持的 JSON 标记 '{token}'，路径 '{path}'，第 {line} 行，第 {column} 列")]
    UnsupportedToken {
        token: &'static str,
        path: String,
        line: usize,
        column: usize,
    },

    #[error("开关映射的键不区分大小写，发现重复的键 '{switch}'")]
    DuplicateSwitchMapping { switch: String },

    #[error("开关映射包含无效的开关 '{switch}'")]
    InvalidSwitchMapping { switch: String },

    #[error("短开关 '{switch}' 未在开关映射中定义")]
    ShortSwitchNotDefined { switch: String },

    #[error("无法识别的参数格式: '{argument}'")]
    UnrecognizedArgument { argument: String },

    #[error("开关 '{switch}' 缺少对应的值")]
    MissingSwitchValue { switch: String },
}

impl ConfigError {
    /// 创建参数错误
    pub fn invalid_argument(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            message: message.into(),
        }
    }

    /// 是否为 JSON 格式类错误（解析失败、重复键、不支持的标记）
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::JsonParse { .. } | Self::DuplicateKey { .. } | Self::UnsupportedToken { .. }
        )
    }

    /// 出错位置所在行号（从 1 开始），仅格式类错误携带
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::JsonParse { line, .. }
            | Self::DuplicateKey { line, .. }
            | Self::UnsupportedToken { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
