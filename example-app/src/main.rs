//! # 示例应用程序
//!
//! 演示如何组合 JSON 文件、环境变量与命令行参数三类配置源

use anyhow::{Context, Result};
use clap::Parser;
use config_abstractions::Configuration;
use config_impl::{ConfigurationBuilder, ConfigurationRoot, ConfigurationSection};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// 环境变量前缀
const ENV_PREFIX: &str = "APP_";

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn ADSP 配置组合示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "appsettings.json")]
    config: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 以 --key=value、--key value 或 /key value 形式覆盖的配置项
    #[arg(last = true)]
    overrides: Vec<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("启动 Lorn ADSP 配置示例应用");

    let config = build_configuration(&args)?;

    // 演示配置读取
    print_configuration(&config);

    // 演示重载通知
    demonstrate_reload(&config)?;

    info!("应用已退出");
    Ok(())
}

/// 按 JSON 文件 → 环境变量 → 命令行 的顺序构建配置，后者优先
fn build_configuration(args: &Args) -> Result<ConfigurationRoot> {
    info!("构建配置");

    let mut builder = ConfigurationBuilder::new();

    if !Path::new(&args.config).exists() {
        info!("配置文件不存在，将仅使用环境变量与命令行参数: {}", args.config);
    }
    builder
        .add_json_file(&args.config, true)
        .with_context(|| format!("无效的配置文件路径: {}", args.config))?;

    builder
        .add_environment_variables(ENV_PREFIX)
        .add_command_line(args.overrides.iter());

    let config = builder.build().context("加载配置失败")?;

    info!("配置构建完成，共 {} 个配置提供者", config.providers().len());
    Ok(config)
}

/// 打印整棵配置树
fn print_configuration(config: &ConfigurationRoot) {
    let children = config.get_children();
    if children.is_empty() {
        warn!("没有任何配置项");
        return;
    }

    for section in &children {
        print_section(section, 0);
    }

    for (key, value) in config.as_enumerable() {
        debug!("{} = {}", key, value);
    }
}

fn print_section(section: &ConfigurationSection, depth: usize) {
    let indent = "  ".repeat(depth);
    match section.value() {
        Some(value) => println!("{}{} = {}", indent, section.key(), value),
        None => println!("{}{}", indent, section.key()),
    }

    for child in section.get_children() {
        print_section(&child, depth + 1);
    }
}

/// 注册重载回调并手动触发一次重载
fn demonstrate_reload(config: &ConfigurationRoot) -> Result<()> {
    info!("演示配置重载通知");

    let reloads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reloads);
    let registration = config.get_reload_token().register_change_callback(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    config.reload().context("重载配置失败")?;
    info!("重载回调触发次数: {}", reloads.load(Ordering::SeqCst));

    // 旧令牌已触发，注销不会产生任何效果
    registration.dispose();

    let token = config.get_reload_token();
    debug!("新的重载令牌是否已变更: {}", token.has_changed());
    Ok(())
}
