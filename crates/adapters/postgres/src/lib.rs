//! dbfault-adapter-postgres - PostgreSQL 错误翻译
//!
//! SQLSTATE 目录、错误字段提取、detail 解析，以及由偏函数规则组成的翻译器。

mod config;
mod detail;
mod event;
mod fields;
mod rules;
mod sqlstate;
mod translator;

pub use config::*;
pub use detail::*;
pub use event::*;
pub use fields::*;
pub use rules::*;
pub use sqlstate::*;
pub use translator::*;
