//! dbfault-bootstrap - 统一启动骨架
//!
//! 配置 -> 日志/指标 -> 翻译器注册表

mod error;
mod infrastructure;
mod runtime;

pub use error::*;
pub use infrastructure::*;
pub use runtime::*;
