//! 配置重载与令牌测试

use crate::*;
use config_abstractions::{
    ConfigError, ConfigResult, Configuration, ConfigurationProvider, ConfigurationSource,
    ProviderStore,
};
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn empty_config() -> ConfigurationRoot {
    ConfigurationBuilder::new().build().unwrap()
}

fn counting_callback(count: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
    let count = Arc::clone(count);
    move || {
        count.fetch_add(1, Ordering::SeqCst);
    }
}

/// 能够自行感知变更的测试提供者
#[derive(Debug, Default)]
struct SelfReloadingProvider {
    store: ProviderStore,
    loads: AtomicUsize,
}

impl ConfigurationProvider for SelfReloadingProvider {
    fn store(&self) -> &ProviderStore {
        &self.store
    }

    fn load(&self) -> ConfigResult<()> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "SelfReloadingProvider"
    }
}

#[derive(Debug)]
struct SelfReloadingSource(Arc<SelfReloadingProvider>);

impl ConfigurationSource for SelfReloadingSource {
    fn build(&self) -> ConfigResult<Arc<dyn ConfigurationProvider>> {
        Ok(self.0.clone())
    }
}

/// 测试未重载时返回同一个令牌
#[test]
fn test_same_reload_token_returned_repeatedly() {
    let config = empty_config();

    assert_eq!(config.get_reload_token(), config.get_reload_token());
}

/// 测试重载后返回新的令牌
#[test]
fn test_different_token_after_reload() {
    let config = empty_config();

    let token1 = config.get_reload_token();
    let token2 = config.get_reload_token();
    config.reload().unwrap();
    let token3 = config.get_reload_token();
    let token4 = config.get_reload_token();

    assert_eq!(token1, token2);
    assert_eq!(token3, token4);
    assert_ne!(token1, token3);
}

/// 测试重载触发旧令牌，新令牌未触发
#[test]
fn test_token_triggered_on_reload() {
    let config = empty_config();

    let token1 = config.get_reload_token();
    assert!(!token1.has_changed());
    config.reload().unwrap();

    assert!(token1.has_changed());
    assert!(!config.get_reload_token().has_changed());
}

/// 测试每次重载回调只调用一次，已注销的回调不调用
#[test]
fn test_multiple_callbacks_on_reload() {
    let config = empty_config();
    let called1 = Arc::new(AtomicUsize::new(0));
    let called2 = Arc::new(AtomicUsize::new(0));

    let token1 = config.get_reload_token();
    let _ = token1.register_change_callback(counting_callback(&called1));
    let _ = token1.register_change_callback(counting_callback(&called2));
    assert_eq!(called1.load(Ordering::SeqCst), 0);

    config.reload().unwrap();
    assert_eq!(called1.load(Ordering::SeqCst), 1);
    assert_eq!(called2.load(Ordering::SeqCst), 1);

    let token2 = config.get_reload_token();
    let cleanup1 = token2.register_change_callback(counting_callback(&called1));
    let _ = token2.register_change_callback(counting_callback(&called2));
    cleanup1.dispose();

    config.reload().unwrap();
    assert_eq!(called1.load(Ordering::SeqCst), 1);
    assert_eq!(called2.load(Ordering::SeqCst), 2);
}

/// 测试回调按注册顺序调用
#[test]
fn test_callbacks_fire_in_registration_order() {
    let config = empty_config();
    let order = Arc::new(Mutex::new(Vec::new()));

    let token = config.get_reload_token();
    for i in 0..5 {
        let order = Arc::clone(&order);
        let _ = token.register_change_callback(move || order.lock().push(i));
    }
    config.reload().unwrap();

    assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
}

/// 测试配置节共享配置根的令牌与重载
#[test]
fn test_section_delegates_reload() {
    let config = ConfigurationBuilder::new()
        .add_in_memory_collection([("A:B", "c")])
        .build()
        .unwrap();
    let section = config.get_section("A");

    let token = section.get_reload_token();
    assert_eq!(token, config.get_reload_token());
    section.reload().unwrap();

    assert!(token.has_changed());
    assert_eq!(section.get_reload_token(), config.get_reload_token());
}

/// 测试重载时所有提供者重新加载后才发布新令牌
#[test]
fn test_reload_loads_providers_before_signal() {
    let provider = Arc::new(SelfReloadingProvider::default());
    let mut builder = ConfigurationBuilder::new();
    builder.add(SelfReloadingSource(provider.clone()));
    let config = builder.build().unwrap();
    assert_eq!(provider.loads.load(Ordering::SeqCst), 1);

    let observed = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&observed);
    let watched = provider.clone();
    let _ = config
        .get_reload_token()
        .register_change_callback(move || seen.store(watched.loads.load(Ordering::SeqCst), Ordering::SeqCst));

    config.reload().unwrap();

    assert_eq!(observed.load(Ordering::SeqCst), 2);
}

/// 测试提供者自身的变更通知传递到配置根
#[test]
fn test_provider_change_propagates_to_root() {
    let provider = Arc::new(SelfReloadingProvider::default());
    let mut builder = ConfigurationBuilder::new();
    builder.add(SelfReloadingSource(provider.clone()));
    let config = builder.build().unwrap();
    let count = Arc::new(AtomicUsize::new(0));

    let first = config.get_reload_token();
    let _ = first.register_change_callback(counting_callback(&count));
    provider.store().on_reload();

    assert!(first.has_changed());
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // 配置根重新监听了提供者的新令牌
    let second = config.get_reload_token();
    assert_ne!(first, second);
    provider.store().on_reload();
    assert!(second.has_changed());
    assert_eq!(provider.loads.load(Ordering::SeqCst), 1);
}

/// 测试重载失败时保留旧令牌
#[test]
fn test_failed_reload_keeps_token() {
    let payload = Arc::new(Mutex::new(String::from(r#"{"Key": "v1"}"#)));
    let supplier_payload = Arc::clone(&payload);
    let config = ConfigurationBuilder::new()
        .add_json_stream(move || Ok(Some(Box::new(Cursor::new(supplier_payload.lock().clone())) as ConfigStream)))
        .build()
        .unwrap();
    assert_eq!(config.get("key").as_deref(), Some("v1"));

    let token = config.get_reload_token();
    *payload.lock() = String::from(r#"{"Key": "#);
    let err = config.reload().unwrap_err();

    assert!(matches!(err, ConfigError::JsonParse { .. }));
    assert!(!token.has_changed());

    *payload.lock() = String::from(r#"{"Key": "v2"}"#);
    config.reload().unwrap();
    assert!(token.has_changed());
    assert_eq!(config.get("KEY").as_deref(), Some("v2"));
}
