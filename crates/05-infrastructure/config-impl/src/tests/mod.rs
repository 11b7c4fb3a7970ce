//! 配置组合引擎测试

mod reload_tests;
