//! PostgreSQL 错误翻译器
//!
//! 错误 -> `RawErrorEvent` -> 规则链 -> `DbException`。
//! 两段都是偏函数，组合后的定义域即 `acceptable` 的判定范围。

use std::error::Error;
use std::fmt;

use dbfault_common::{unlift, BoxPartialFunction, PartialFunction};
use dbfault_errors::{BoxError, DbException, TranslateError, TranslateResult};
use dbfault_ports::{ErrorTranslator, REJECTIONS_TOTAL, TRANSLATIONS_TOTAL};
use metrics::counter;
use sqlx::postgres::PgDatabaseError;
use tracing::warn;

use crate::config::TranslatorSettings;
use crate::event::RawErrorEvent;
use crate::rules::{fallback_exception, rule_chain};

type Pipeline = BoxPartialFunction<'static, dyn Error + 'static, DbException>;

/// 从任意错误中取出 PostgreSQL 错误事件
///
/// 支持直接的 `RawErrorEvent`、`PgDatabaseError` 以及包着它的 `sqlx::Error::Database`。
pub fn extract_event(error: &(dyn Error + 'static)) -> Option<RawErrorEvent> {
    if let Some(event) = error.downcast_ref::<RawErrorEvent>() {
        return Some(event.clone());
    }
    if let Some(pg) = error.downcast_ref::<PgDatabaseError>() {
        return Some(RawErrorEvent::from_pg(pg));
    }
    match error.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) => db
            .try_downcast_ref::<PgDatabaseError>()
            .map(RawErrorEvent::from_pg),
        _ => None,
    }
}

fn event_extractor() -> impl PartialFunction<dyn Error + 'static, RawErrorEvent> + Send + Sync {
    unlift::<dyn Error + 'static, RawErrorEvent, _>(extract_event)
}

pub struct PostgresErrorTranslator {
    settings: TranslatorSettings,
    pipeline: Pipeline,
}

impl PostgresErrorTranslator {
    pub fn new(settings: TranslatorSettings) -> Self {
        let pipeline = rule_chain(&settings)
            .compose_partial(event_extractor())
            .boxed();
        Self { settings, pipeline }
    }

    pub fn settings(&self) -> &TranslatorSettings {
        &self.settings
    }

    /// 直接翻译一个已解析的事件
    ///
    /// 规则链以兜底规则结尾，事件总能得到分类结果。
    pub fn translate_event(&self, event: RawErrorEvent) -> DbException {
        let exception = self
            .pipeline
            .apply_or_else(&event, |_| fallback_exception(&event));
        record_translation(self.dialect(), &exception);
        exception.with_cause(Box::new(event))
    }
}

impl Default for PostgresErrorTranslator {
    fn default() -> Self {
        Self::new(TranslatorSettings::default())
    }
}

impl fmt::Debug for PostgresErrorTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresErrorTranslator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ErrorTranslator for PostgresErrorTranslator {
    fn dialect(&self) -> &str {
        &self.settings.dialect
    }

    fn acceptable(&self, error: &(dyn Error + 'static)) -> bool {
        self.pipeline.is_defined_at(error)
    }

    fn translate(&self, error: BoxError) -> TranslateResult<DbException> {
        match self.pipeline.try_apply(&*error) {
            Some(exception) => {
                record_translation(self.dialect(), &exception);
                Ok(exception.with_cause(error))
            }
            None => {
                warn!(dialect = %self.dialect(), error = %error, "Error not accepted by translator");
                let labels = [("dialect", self.dialect().to_string())];
                counter!(REJECTIONS_TOTAL, &labels).increment(1);
                Err(TranslateError::Unsupported {
                    dialect: self.dialect().to_string(),
                    source: error,
                })
            }
        }
    }
}

fn record_translation(dialect: &str, exception: &DbException) {
    let labels = [
        ("dialect", dialect.to_string()),
        ("kind", exception.kind_name().to_string()),
    ];
    counter!(TRANSLATIONS_TOTAL, &labels).increment(1);
}

/// 在 sqlx 调用点直接翻译错误
pub trait SqlxErrorExt<T> {
    /// 可翻译的错误换成 `DbException`，其余原样返回
    fn translate_db_err(self, translator: &dyn ErrorTranslator) -> Result<T, BoxError>;
}

impl<T> SqlxErrorExt<T> for Result<T, sqlx::Error> {
    fn translate_db_err(self, translator: &dyn ErrorTranslator) -> Result<T, BoxError> {
        self.map_err(|err| translator.translate_or_pass(Box::new(err)))
    }
}
