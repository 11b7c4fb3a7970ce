//! 配置提供者实现

pub mod command_line;
pub mod environment;
pub mod json;
pub mod memory;

pub use command_line::*;
pub use environment::*;
pub use json::*;
pub use memory::*;
