//! ports - 抽象 trait 层
//!
//! 错误翻译器接口与按方言名查找的注册表

mod registry;
mod translator;

pub use registry::*;
pub use translator::*;
