//! 命令行配置提供者
//!
//! 支持的参数形式：
//!
//! - `--key=value`、`/key=value`、`-k=value`（`-k` 必须在开关映射中定义）
//! - `--key value`、`/key value`、`-k value`
//!
//! `/key` 等同于 `--key`。开关映射把命令行开关重命名为配置键，映射的键不区分大小写。

use crate::builder::ConfigurationBuilder;
use config_abstractions::{
    ConfigData, ConfigError, ConfigResult, ConfigurationProvider, ConfigurationSource,
    ProviderStore,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use uncased::{Uncased, UncasedStr};

/// 命令行配置源
#[derive(Debug, Clone, Default)]
pub struct CommandLineConfigurationSource {
    /// 命令行参数
    pub args: Vec<String>,
    /// 开关映射（开关 → 配置键）
    pub switch_mappings: Option<Vec<(String, String)>>,
}

impl CommandLineConfigurationSource {
    /// 创建命令行配置源
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            switch_mappings: None,
        }
    }

    /// 设置开关映射
    pub fn with_switch_mappings<I, K, V>(mut self, switch_mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.switch_mappings = Some(
            switch_mappings
                .into_iter()
                .map(|(switch, key)| (switch.into(), key.into()))
                .collect(),
        );
        self
    }
}

impl ConfigurationSource for CommandLineConfigurationSource {
    fn build(&self) -> ConfigResult<Arc<dyn ConfigurationProvider>> {
        let provider = CommandLineConfigurationProvider::new(
            self.args.clone(),
            self.switch_mappings.as_deref().unwrap_or_default(),
        )?;
        Ok(Arc::new(provider))
    }
}

/// 命令行配置提供者
#[derive(Debug)]
pub struct CommandLineConfigurationProvider {
    args: Vec<String>,
    switch_mappings: BTreeMap<Uncased<'static>, String>,
    store: ProviderStore,
}

impl CommandLineConfigurationProvider {
    /// 创建命令行配置提供者，先校验开关映射
    pub fn new(args: Vec<String>, switch_mappings: &[(String, String)]) -> ConfigResult<Self> {
        Ok(Self {
            args,
            switch_mappings: validate_switch_mappings(switch_mappings)?,
            store: ProviderStore::new(),
        })
    }

    /// 命令行参数
    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn parse_args(&self) -> ConfigResult<ConfigData> {
        let mut data = ConfigData::new();
        let mut args = self.args.iter();

        while let Some(arg) = args.next() {
            let (current, key_start) = if let Some(rest) = arg.strip_prefix('/') {
                (format!("--{rest}"), 2)
            } else if arg.starts_with("--") {
                (arg.clone(), 2)
            } else if arg.starts_with('-') {
                (arg.clone(), 1)
            } else {
                return Err(ConfigError::UnrecognizedArgument {
                    argument: arg.clone(),
                });
            };

            let (key, value) = match current.split_once('=') {
                Some((switch, value)) => {
                    let key = self.resolve_key(switch, key_start)?;
                    (key, value.to_owned())
                }
                None => {
                    let key = self.resolve_key(&current, key_start)?;
                    let value = args.next().ok_or_else(|| ConfigError::MissingSwitchValue {
                        switch: current.clone(),
                    })?;
                    (key, value.clone())
                }
            };

            data.insert(Uncased::from_owned(key), value);
        }

        Ok(data)
    }

    fn resolve_key(&self, switch: &str, key_start: usize) -> ConfigResult<String> {
        if let Some(mapped) = self.switch_mappings.get(UncasedStr::new(switch)) {
            return Ok(mapped.clone());
        }
        if key_start == 1 {
            return Err(ConfigError::ShortSwitchNotDefined {
                switch: switch.to_owned(),
            });
        }
        Ok(switch[key_start..].to_owned())
    }
}

impl ConfigurationProvider for CommandLineConfigurationProvider {
    fn store(&self) -> &ProviderStore {
        &self.store
    }

    fn load(&self) -> ConfigResult<()> {
        let data = self.parse_args()?;
        debug!("命令行配置加载完成，共 {} 个配置项", data.len());
        self.store.replace(data);
        Ok(())
    }

    fn name(&self) -> &str {
        "CommandLineConfigurationProvider"
    }
}

fn validate_switch_mappings(
    switch_mappings: &[(String, String)],
) -> ConfigResult<BTreeMap<Uncased<'static>, String>> {
    let mut validated = BTreeMap::new();

    for (switch, key) in switch_mappings {
        if !switch.starts_with('-') {
            return Err(ConfigError::InvalidSwitchMapping {
                switch: switch.clone(),
            });
        }
        if validated.contains_key(UncasedStr::new(switch)) {
            return Err(ConfigError::DuplicateSwitchMapping {
                switch: switch.clone(),
            });
        }
        validated.insert(Uncased::from_owned(switch.clone()), key.clone());
    }

    Ok(validated)
}

impl ConfigurationBuilder {
    /// 添加命令行参数
    pub fn add_command_line<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add(CommandLineConfigurationSource::new(args))
    }

    /// 添加带开关映射的命令行参数，映射在构建时校验
    pub fn add_command_line_with_mappings<I, S, M, K, V>(
        &mut self,
        args: I,
        switch_mappings: M,
    ) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        M: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.add(CommandLineConfigurationSource::new(args).with_switch_mappings(switch_mappings))
    }
}
