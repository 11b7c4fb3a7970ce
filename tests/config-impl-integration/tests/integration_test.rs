//! config-impl 集成测试：基于真实文件与多种配置源的组合场景
use anyhow::Result;
use config_abstractions::{ConfigError, Configuration};
use config_impl::{ConfigurationBuilder, JsonConfigurationSource};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

const APP_SETTINGS: &str = r#"{
    // 应用配置
    "App": {
        "Name": "from-json",
        "Port": 8080,
        "Debug": false,
        "Hosts": ["alpha", "beta"]
    },
    "Logging": { "Level": "info" }
}"#;

fn write_file(dir: &TempDir, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.path().join(name);
    fs::write(&path, content)?;
    Ok(path)
}

/// 测试从 JSON 文件加载并扁平化
#[test]
fn test_load_json_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_file(&dir, "appsettings.json", APP_SETTINGS)?;

    let config = ConfigurationBuilder::new().add_json_file(&path, false)?.build()?;

    assert_eq!(config.get("app:name").as_deref(), Some("from-json"));
    assert_eq!(config.get("App:Port").as_deref(), Some("8080"));
    assert_eq!(config.get("App:Debug").as_deref(), Some("false"));
    assert_eq!(config.get("App:Hosts:0").as_deref(), Some("alpha"));
    assert_eq!(config.get("App:Hosts:1").as_deref(), Some("beta"));
    assert_eq!(config.get("Logging:Level").as_deref(), Some("info"));

    let hosts: Vec<String> = config
        .get_section("App:Hosts")
        .get_children()
        .iter()
        .map(|section| section.key().to_owned())
        .collect();
    assert_eq!(hosts, vec!["0", "1"]);
    Ok(())
}

/// 测试带 BOM 的 JSON 文件
#[test]
fn test_load_json_file_with_byte_order_mark() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_file(&dir, "bom.json", "\u{feff}{\"Key\": \"Value\", \"Id\": 123456789012345678901234}")?;

    let config = ConfigurationBuilder::new().add_json_file(&path, false)?.build()?;

    assert_eq!(config.get("key").as_deref(), Some("Value"));
    assert_eq!(config.get("Id").as_deref(), Some("123456789012345678901234"));
    Ok(())
}

/// 测试缺失的必选文件在构建时报错
#[test]
fn test_missing_required_file_fails() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("missing.json");

    let err = ConfigurationBuilder::new().add_json_file(&path, false)?.build().unwrap_err();

    assert!(matches!(err, ConfigError::FileNotFound { ref path } if path.contains("missing.json")));
    Ok(())
}

/// 测试缺失的可选文件视为空配置
#[test]
fn test_missing_optional_file_is_empty() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("missing.json");

    let config = ConfigurationBuilder::new()
        .add_json_file(&path, true)?
        .add_in_memory_collection([("Key", "Value")])
        .build()?;

    assert_eq!(config.get("Key").as_deref(), Some("Value"));
    assert_eq!(config.as_enumerable().len(), 1);
    Ok(())
}

/// 测试空路径被拒绝
#[test]
fn test_empty_path_is_invalid() {
    let err = JsonConfigurationSource::from_file("", false).unwrap_err();

    assert!(matches!(err, ConfigError::InvalidArgument { name: "path", .. }));
}

/// 测试 JSON → 内存 → 命令行 的覆盖顺序
#[test]
fn test_override_order_across_sources() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_file(&dir, "appsettings.json", APP_SETTINGS)?;

    let config = ConfigurationBuilder::new()
        .add_json_file(&path, false)?
        .add_in_memory_collection([("App:Name", "from-memory"), ("App:Port", "9090")])
        .add_command_line(["--app:port=7070", "/Logging:Level", "debug"])
        .build()?;

    assert_eq!(config.get("App:Name").as_deref(), Some("from-memory"));
    assert_eq!(config.get("App:Port").as_deref(), Some("7070"));
    assert_eq!(config.get("Logging:Level").as_deref(), Some("debug"));
    assert_eq!(config.get("App:Hosts:0").as_deref(), Some("alpha"));

    let children: Vec<String> = config
        .get_section("App")
        .get_children()
        .iter()
        .map(|section| section.key().to_owned())
        .collect();
    assert_eq!(children, vec!["Debug", "Hosts", "Name", "Port"]);
    Ok(())
}

/// 测试文件修改后重载生效并触发回调
#[test]
fn test_reload_picks_up_file_changes() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_file(&dir, "appsettings.json", r#"{"Feature": {"Enabled": "false"}}"#)?;

    let config = ConfigurationBuilder::new().add_json_file(&path, false)?.build()?;
    let section = config.get_section("Feature");
    assert_eq!(section.get("Enabled").as_deref(), Some("false"));

    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let _ = config.get_reload_token().register_change_callback(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    fs::write(&path, r#"{"Feature": {"Enabled": "true", "Rollout": 50}}"#)?;
    config.reload()?;

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert_eq!(section.get("Enabled").as_deref(), Some("true"));
    assert_eq!(section.get("Rollout").as_deref(), Some("50"));
    Ok(())
}

/// 测试重载时删除可选文件会清空该提供者的数据
#[test]
fn test_reload_after_optional_file_removed() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_file(&dir, "optional.json", r#"{"Key": "Value"}"#)?;

    let config = ConfigurationBuilder::new().add_json_file(&path, true)?.build()?;
    assert_eq!(config.get("Key").as_deref(), Some("Value"));

    fs::remove_file(&path)?;
    config.reload()?;

    assert_eq!(config.get("Key"), None);
    Ok(())
}

/// 测试文件中的重复键报告行号
#[test]
fn test_duplicate_key_in_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_file(&dir, "dup.json", "{\n  \"Name\": \"a\",\n  \"name\": \"b\"\n}")?;

    let err = ConfigurationBuilder::new().add_json_file(&path, false)?.build().unwrap_err();

    assert!(err.is_format_error());
    assert!(matches!(err, ConfigError::DuplicateKey { ref key, line: 3, .. } if key == "name"));
    assert_eq!(err.line(), Some(3));
    Ok(())
}

/// 测试文件格式错误
#[test]
fn test_malformed_file_reports_format_error() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_file(&dir, "broken.json", "{\n  \"Name\": \"a\",\n  \"Other\": \n")?;

    let err = ConfigurationBuilder::new().add_json_file(&path, false)?.build().unwrap_err();

    assert!(err.is_format_error());
    assert!(matches!(err, ConfigError::JsonParse { .. }));
    assert!(err.line().is_some());
    Ok(())
}

/// 测试根节点不是对象的文件被拒绝
#[test]
fn test_array_root_file_is_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_file(&dir, "array.json", r#"["a", "b"]"#)?;

    let err = ConfigurationBuilder::new().add_json_file(&path, false)?.build().unwrap_err();

    assert!(matches!(err, ConfigError::UnsupportedToken { token: "StartArray", .. }));
    Ok(())
}

/// 测试环境变量与带映射的命令行组合
#[test]
fn test_environment_and_mapped_command_line() -> Result<()> {
    std::env::set_var("CFGIT_ENV_TEST_Database__Host", "db.local");
    std::env::set_var("CFGIT_ENV_TEST_Database__Port", "5432");

    let config = ConfigurationBuilder::new()
        .add_environment_variables("CFGIT_ENV_TEST_")
        .add_command_line_with_mappings(["-p", "6543"], [("-p", "Database:Port")])
        .build()?;

    assert_eq!(config.get("database:host").as_deref(), Some("db.local"));
    assert_eq!(config.get("Database:Port").as_deref(), Some("6543"));
    Ok(())
}

/// 测试命令行中未映射的短开关在构建时报错
#[test]
fn test_unmapped_short_switch_fails() {
    let err = ConfigurationBuilder::new()
        .add_command_line(["-x", "1"])
        .build()
        .unwrap_err();

    assert!(matches!(err, ConfigError::ShortSwitchNotDefined { ref switch } if switch == "-x"));
}
