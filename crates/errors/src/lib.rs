//! dbfault-errors - 数据库错误分类的类型定义
//!
//! 分类后的异常、约束模型，以及翻译/注册表的前置条件错误

mod constraint;
mod exception;

pub use constraint::*;
pub use exception::*;

use thiserror::Error;

/// 装箱的任意错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 翻译失败：翻译器不接受该错误类型（调用方违反前置条件）
///
/// 原始错误通过 `source` 原样交还调用方。
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("{dialect} translator does not accept error: {source}")]
    Unsupported {
        dialect: String,
        #[source]
        source: BoxError,
    },
}

impl TranslateError {
    /// 取回原始错误
    pub fn into_source(self) -> BoxError {
        match self {
            TranslateError::Unsupported { source, .. } => source,
        }
    }
}

/// 翻译结果
pub type TranslateResult<T> = Result<T, TranslateError>;

/// 翻译器注册表查找错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("dialect name must not be blank")]
    MissingDialect,

    #[error("no error translator registered for dialect: {0}")]
    UnknownDialect(String),
}

/// SQLSTATE 目录查找错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("unknown SQLSTATE code: {0}")]
    UnknownSqlState(String),
}
