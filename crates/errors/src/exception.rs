//! 分类后的数据库异常
//!
//! 公共字段（消息、SQLSTATE、严重级别、原始错误）放在 [`DbException`] 上，
//! 各分类特有的数据放在 [`DbErrorKind`] 中。

use thiserror::Error;

use crate::{BoxError, Constraint};

/// 按列顺序排列的非法值（列名 -> 值）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidValues(Vec<(String, String)>);

impl InvalidValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已存在的列会被覆盖，位置不变
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.0.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<C, V> FromIterator<(C, V)> for InvalidValues
where
    C: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (C, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (column, value) in iter {
            values.insert(column, value);
        }
        values
    }
}

/// 约束违反详情
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    pub constraint: Constraint,
    pub invalid_values: InvalidValues,
    /// 原始 detail 文本
    pub detail: Option<String>,
}

impl ConstraintViolation {
    pub fn new(constraint: Constraint) -> Self {
        Self {
            constraint,
            invalid_values: InvalidValues::new(),
            detail: None,
        }
    }

    pub fn with_invalid_values(mut self, values: InvalidValues) -> Self {
        self.invalid_values = values;
        self
    }

    pub fn with_detail(mut self, detail: Option<&str>) -> Self {
        self.detail = detail.map(str::to_string);
        self
    }
}

/// 异常分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbErrorKind {
    /// 无进一步结构的数据库错误
    Generic,
    /// 数据格式或取值范围错误
    Data,
    /// 非法 UUID 字面量
    InvalidUuid { invalid_value: String },
    /// 认证/授权错误
    Authorization,
    /// 约束违反
    Constraint(ConstraintViolation),
}

impl DbErrorKind {
    /// 稳定的 snake_case 标签（用于 metrics 与日志）
    pub fn name(&self) -> &'static str {
        match self {
            DbErrorKind::Generic => "generic",
            DbErrorKind::Data => "data",
            DbErrorKind::InvalidUuid { .. } => "invalid_uuid",
            DbErrorKind::Authorization => "authorization",
            DbErrorKind::Constraint(violation) => match violation.constraint.kind() {
                crate::ConstraintKind::PrimaryKey => "primary_key_violation",
                crate::ConstraintKind::ForeignKey => "foreign_key_violation",
                crate::ConstraintKind::Unique => "unique_violation",
                crate::ConstraintKind::Check => "check_violation",
                crate::ConstraintKind::NotNull => "not_null_violation",
                crate::ConstraintKind::Other => "constraint_violation",
            },
        }
    }

    /// 数据错误（含 UUID 特化）
    pub fn is_data(&self) -> bool {
        matches!(self, DbErrorKind::Data | DbErrorKind::InvalidUuid { .. })
    }
}

/// 分类后的数据库异常
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DbException {
    kind: DbErrorKind,
    message: String,
    sql_state: Option<String>,
    severity: Option<String>,
    #[source]
    cause: Option<BoxError>,
}

impl DbException {
    pub fn new(kind: DbErrorKind, message: impl Into<String>, sql_state: Option<&str>) -> Self {
        Self {
            kind,
            message: message.into(),
            sql_state: sql_state.map(str::to_string),
            severity: None,
            cause: None,
        }
    }

    pub fn generic(message: impl Into<String>, sql_state: Option<&str>) -> Self {
        Self::new(DbErrorKind::Generic, message, sql_state)
    }

    pub fn data(message: impl Into<String>, sql_state: Option<&str>) -> Self {
        Self::new(DbErrorKind::Data, message, sql_state)
    }

    pub fn invalid_uuid(
        message: impl Into<String>,
        sql_state: Option<&str>,
        invalid_value: impl Into<String>,
    ) -> Self {
        Self::new(
            DbErrorKind::InvalidUuid {
                invalid_value: invalid_value.into(),
            },
            message,
            sql_state,
        )
    }

    pub fn authorization(message: impl Into<String>, sql_state: Option<&str>) -> Self {
        Self::new(DbErrorKind::Authorization, message, sql_state)
    }

    pub fn constraint_violation(
        message: impl Into<String>,
        sql_state: Option<&str>,
        violation: ConstraintViolation,
    ) -> Self {
        Self::new(DbErrorKind::Constraint(violation), message, sql_state)
    }

    pub fn with_severity(mut self, severity: Option<&str>) -> Self {
        self.severity = severity.map(str::to_string);
        self
    }

    pub fn with_cause(mut self, cause: BoxError) -> Self {
        self.cause = Some(cause);
        self
    }

    pub fn kind(&self) -> &DbErrorKind {
        &self.kind
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn sql_state(&self) -> Option<&str> {
        self.sql_state.as_deref()
    }

    pub fn severity(&self) -> Option<&str> {
        self.severity.as_deref()
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self.kind, DbErrorKind::Constraint(_))
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        match &self.kind {
            DbErrorKind::Constraint(violation) => Some(&violation.constraint),
            _ => None,
        }
    }

    pub fn invalid_values(&self) -> Option<&InvalidValues> {
        match &self.kind {
            DbErrorKind::Constraint(violation) => Some(&violation.invalid_values),
            _ => None,
        }
    }

    pub fn invalid_uuid_value(&self) -> Option<&str> {
        match &self.kind {
            DbErrorKind::InvalidUuid { invalid_value } => Some(invalid_value),
            _ => None,
        }
    }
}
