//! ErrorTranslator trait 定义
//!
//! 一个翻译器对应一种数据库方言：判断某个错误是否由它负责，并翻译成统一的 DbException。

use std::error::Error;

use dbfault_errors::{BoxError, DbException, TranslateResult};

/// 成功翻译次数（标签：dialect, kind）
pub const TRANSLATIONS_TOTAL: &str = "db_error_translations_total";

/// 被翻译器拒绝的次数（标签：dialect）
pub const REJECTIONS_TOTAL: &str = "db_error_translation_rejections_total";

/// 错误翻译器 trait
pub trait ErrorTranslator: Send + Sync {
    /// 方言名
    fn dialect(&self) -> &str;

    /// 该错误是否属于本方言且可翻译
    fn acceptable(&self, error: &(dyn Error + 'static)) -> bool;

    /// 翻译错误，原始错误保留为 cause
    ///
    /// 不可接受的错误以 `TranslateError::Unsupported` 返回，其中携带原始错误。
    fn translate(&self, error: BoxError) -> TranslateResult<DbException>;

    /// 可翻译则翻译，否则原样返回
    fn translate_or_pass(&self, error: BoxError) -> BoxError {
        match self.translate(error) {
            Ok(exception) => Box::new(exception),
            Err(rejected) => rejected.into_source(),
        }
    }
}
