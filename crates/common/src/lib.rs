//! dbfault-common - 通用组合子库

pub mod partial;

pub use partial::*;
