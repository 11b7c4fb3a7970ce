//! 配置路径工具
//!
//! 配置路径由 [`KEY_DELIMITER`] 连接的若干段组成。空段（开头、结尾或连续的分隔符）
//! 是合法的路径段，所有函数都按原样保留它们。

use crate::errors::{ConfigError, ConfigResult};

/// 路径段分隔符
pub const KEY_DELIMITER: &str = ":";

/// 组合配置路径段
///
/// ```
/// use config_abstractions::path;
///
/// assert_eq!(path::combine(["a", "b", "c"]), "a:b:c");
/// assert_eq!(path::combine(["", "Key2"]), ":Key2");
/// ```
pub fn combine<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut combined = String::new();
    for (index, segment) in segments.into_iter().enumerate() {
        if index > 0 {
            combined.push_str(KEY_DELIMITER);
        }
        combined.push_str(segment.as_ref());
    }
    combined
}

/// 组合可能缺失的路径段序列，序列缺失时返回参数错误
pub fn try_combine<S: AsRef<str>>(segments: Option<&[S]>) -> ConfigResult<String> {
    segments
        .map(|segments| combine(segments.iter()))
        .ok_or_else(|| ConfigError::invalid_argument("segments", "路径段序列不能为空"))
}

/// 获取路径的最后一段
///
/// 没有分隔符时返回整个路径，空路径原样返回。
pub fn get_section_key(path: Option<&str>) -> Option<&str> {
    let path = path?;
    match path.rfind(KEY_DELIMITER) {
        Some(index) => Some(&path[index + KEY_DELIMITER.len()..]),
        None => Some(path),
    }
}

/// 获取父路径
///
/// 没有分隔符或路径为空时返回 `None`。
pub fn get_parent_path(path: Option<&str>) -> Option<&str> {
    let path = path.filter(|path| !path.is_empty())?;
    path.rfind(KEY_DELIMITER).map(|index| &path[..index])
}
