//! JSON 配置提供者

use crate::builder::ConfigurationBuilder;
use crate::json_parser::JsonConfigurationFileParser;
use config_abstractions::{
    ConfigData, ConfigError, ConfigResult, ConfigurationProvider, ConfigurationSource,
    ProviderStore,
};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// 字节流配置源在错误信息中的名称
const STREAM_NAME: &str = "<stream>";

/// 打开的字节流
pub type ConfigStream = Box<dyn Read + Send>;

/// 字节流提供函数，返回 `None` 表示数据源不存在
pub type StreamSupplier = Arc<dyn Fn() -> ConfigResult<Option<ConfigStream>> + Send + Sync>;

/// JSON 配置源
#[derive(Clone)]
pub struct JsonConfigurationSource {
    path: Option<PathBuf>,
    optional: bool,
    stream: Option<StreamSupplier>,
}

impl JsonConfigurationSource {
    /// 创建基于文件的 JSON 配置源
    pub fn from_file<P: AsRef<Path>>(path: P, optional: bool) -> ConfigResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(ConfigError::invalid_argument(
                "path",
                "文件路径必须是非空字符串",
            ));
        }

        Ok(Self {
            path: Some(path.to_path_buf()),
            optional,
            stream: None,
        })
    }

    /// 创建基于字节流提供函数的 JSON 配置源
    pub fn from_stream<F>(supplier: F) -> Self
    where
        F: Fn() -> ConfigResult<Option<ConfigStream>> + Send + Sync + 'static,
    {
        Self {
            path: None,
            optional: true,
            stream: Some(Arc::new(supplier)),
        }
    }

    /// 设置是否可选
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    /// 文件路径
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 是否可选
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// 打开数据源
    ///
    /// 文件或字节流不存在时：可选返回 `None`，否则返回 [`ConfigError::FileNotFound`]。
    pub fn open(&self) -> ConfigResult<Option<ConfigStream>> {
        if let Some(stream) = &self.stream {
            return match stream()? {
                None if !self.optional => Err(ConfigError::FileNotFound {
                    path: String::from(STREAM_NAME),
                }),
                opened => Ok(opened),
            };
        }

        match &self.path {
            Some(path) if path.is_file() => Ok(Some(Box::new(File::open(path)?))),
            _ if self.optional => Ok(None),
            path => Err(ConfigError::FileNotFound {
                path: path
                    .as_deref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_default(),
            }),
        }
    }
}

impl fmt::Debug for JsonConfigurationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonConfigurationSource")
            .field("path", &self.path)
            .field("optional", &self.optional)
            .field("has_stream", &self.stream.is_some())
            .finish()
    }
}

impl ConfigurationSource for JsonConfigurationSource {
    fn build(&self) -> ConfigResult<Arc<dyn ConfigurationProvider>> {
        Ok(Arc::new(JsonConfigurationProvider::new(self.clone())))
    }
}

/// JSON 配置提供者
#[derive(Debug)]
pub struct JsonConfigurationProvider {
    source: JsonConfigurationSource,
    store: ProviderStore,
}

impl JsonConfigurationProvider {
    /// 创建新的 JSON 配置提供者
    pub fn new(source: JsonConfigurationSource) -> Self {
        Self {
            source,
            store: ProviderStore::new(),
        }
    }

    /// 配置源
    pub fn source(&self) -> &JsonConfigurationSource {
        &self.source
    }

    /// 从字节流加载，解析错误原样返回
    pub fn load_from_reader<R: Read>(&self, mut reader: R) -> ConfigResult<()> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;

        let data = JsonConfigurationFileParser::parse(&content)?;
        debug!("JSON 配置加载完成，共 {} 个配置项", data.len());
        self.store.replace(data);
        Ok(())
    }
}

impl ConfigurationProvider for JsonConfigurationProvider {
    fn store(&self) -> &ProviderStore {
        &self.store
    }

    fn load(&self) -> ConfigResult<()> {
        debug!("加载 JSON 配置: {:?}", self.source.path());

        match self.source.open()? {
            Some(stream) => self.load_from_reader(stream),
            None => {
                warn!("可选的 JSON 配置不存在，使用空配置: {:?}", self.source.path());
                self.store.replace(ConfigData::new());
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        "JsonConfigurationProvider"
    }
}

impl ConfigurationBuilder {
    /// 添加 JSON 配置文件
    pub fn add_json_file<P: AsRef<Path>>(&mut self, path: P, optional: bool) -> ConfigResult<&mut Self> {
        let source = JsonConfigurationSource::from_file(path, optional)?;
        Ok(self.add(source))
    }

    /// 添加 JSON 字节流
    pub fn add_json_stream<F>(&mut self, supplier: F) -> &mut Self
    where
        F: Fn() -> ConfigResult<Option<ConfigStream>> + Send + Sync + 'static,
    {
        self.add(JsonConfigurationSource::from_stream(supplier))
    }
}
