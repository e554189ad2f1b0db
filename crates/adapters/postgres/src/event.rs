//! 原始错误事件
//!
//! PostgreSQL ErrorResponse / NoticeResponse 的字段集合，按协议定义的单字母字段码索引。
//! 由传输层产生，只读。

use std::collections::BTreeMap;
use std::fmt;

use sqlx::postgres::{PgDatabaseError, PgErrorPosition, PgSeverity};
use thiserror::Error;

/// 协议字段码
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldCode {
    /// `S` 严重级别（本地化）
    Severity,
    /// `V` 严重级别（非本地化）
    SeverityNonLocalized,
    /// `C` SQLSTATE
    Code,
    /// `M` 主消息
    Message,
    /// `D` 详情
    Detail,
    /// `H` 提示
    Hint,
    /// `P` 语句中的位置
    Position,
    /// `p` 内部查询中的位置
    InternalPosition,
    /// `q` 内部查询
    InternalQuery,
    /// `W` 上下文
    Where,
    /// `s`
    Schema,
    /// `t`
    Table,
    /// `c`
    Column,
    /// `d`
    DataType,
    /// `n`
    Constraint,
    /// `F`
    File,
    /// `L`
    Line,
    /// `R`
    Routine,
    /// 未识别的字段码，按协议要求保留但忽略
    Unknown(u8),
}

impl FieldCode {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'S' => FieldCode::Severity,
            b'V' => FieldCode::SeverityNonLocalized,
            b'C' => FieldCode::Code,
            b'M' => FieldCode::Message,
            b'D' => FieldCode::Detail,
            b'H' => FieldCode::Hint,
            b'P' => FieldCode::Position,
            b'p' => FieldCode::InternalPosition,
            b'q' => FieldCode::InternalQuery,
            b'W' => FieldCode::Where,
            b's' => FieldCode::Schema,
            b't' => FieldCode::Table,
            b'c' => FieldCode::Column,
            b'd' => FieldCode::DataType,
            b'n' => FieldCode::Constraint,
            b'F' => FieldCode::File,
            b'L' => FieldCode::Line,
            b'R' => FieldCode::Routine,
            other => FieldCode::Unknown(other),
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            FieldCode::Severity => b'S',
            FieldCode::SeverityNonLocalized => b'V',
            FieldCode::Code => b'C',
            FieldCode::Message => b'M',
            FieldCode::Detail => b'D',
            FieldCode::Hint => b'H',
            FieldCode::Position => b'P',
            FieldCode::InternalPosition => b'p',
            FieldCode::InternalQuery => b'q',
            FieldCode::Where => b'W',
            FieldCode::Schema => b's',
            FieldCode::Table => b't',
            FieldCode::Column => b'c',
            FieldCode::DataType => b'd',
            FieldCode::Constraint => b'n',
            FieldCode::File => b'F',
            FieldCode::Line => b'L',
            FieldCode::Routine => b'R',
            FieldCode::Unknown(byte) => byte,
        }
    }
}

/// 解码 ErrorResponse 消息体失败
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("error response is missing its terminating NUL byte")]
    MissingTerminator,

    #[error("field '{0}' is not NUL-terminated")]
    UnterminatedField(char),

    #[error("field '{0}' is not valid UTF-8")]
    InvalidUtf8(char),

    #[error("{0} unexpected bytes after error response terminator")]
    TrailingBytes(usize),
}

/// 原始错误事件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawErrorEvent {
    fields: BTreeMap<FieldCode, String>,
}

impl RawErrorEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, code: FieldCode, value: impl Into<String>) -> Self {
        self.set(code, value);
        self
    }

    pub fn set(&mut self, code: FieldCode, value: impl Into<String>) {
        self.fields.insert(code, value.into());
    }

    pub fn get(&self, code: FieldCode) -> Option<&str> {
        self.fields.get(&code).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldCode, &str)> {
        self.fields.iter().map(|(code, value)| (*code, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn severity(&self) -> Option<&str> {
        self.get(FieldCode::SeverityNonLocalized)
            .or_else(|| self.get(FieldCode::Severity))
    }

    pub fn code(&self) -> Option<&str> {
        self.get(FieldCode::Code)
    }

    pub fn message(&self) -> Option<&str> {
        self.get(FieldCode::Message)
    }

    pub fn detail(&self) -> Option<&str> {
        self.get(FieldCode::Detail)
    }

    /// 解析 ErrorResponse 消息体（不含消息类型字节与长度）
    ///
    /// 格式：若干 `(字段码字节, 以 NUL 结尾的字符串)`，以单个 NUL 结束。
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        let mut event = Self::new();
        let mut rest = body;

        loop {
            let (&tag, tail) = rest.split_first().ok_or(DecodeError::MissingTerminator)?;
            if tag == 0 {
                if !tail.is_empty() {
                    return Err(DecodeError::TrailingBytes(tail.len()));
                }
                return Ok(event);
            }

            let end = tail
                .iter()
                .position(|b| *b == 0)
                .ok_or(DecodeError::UnterminatedField(tag as char))?;
            let value = std::str::from_utf8(&tail[..end])
                .map_err(|_| DecodeError::InvalidUtf8(tag as char))?;

            event.set(FieldCode::from_byte(tag), value);
            rest = &tail[end + 1..];
        }
    }

    /// 编码为 ErrorResponse 消息体
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for (code, value) in &self.fields {
            buf.push(code.as_byte());
            buf.extend_from_slice(value.as_bytes());
            buf.push(0);
        }
        buf.push(0);
        buf
    }

    /// 从 sqlx 的 PostgreSQL 错误复制全部字段
    pub fn from_pg(err: &PgDatabaseError) -> Self {
        let mut event = Self::new()
            .with(FieldCode::Severity, severity_str(err.severity()))
            .with(FieldCode::Code, err.code())
            .with(FieldCode::Message, err.message());

        let optional = [
            (FieldCode::Detail, err.detail()),
            (FieldCode::Hint, err.hint()),
            (FieldCode::Where, err.r#where()),
            (FieldCode::Schema, err.schema()),
            (FieldCode::Table, err.table()),
            (FieldCode::Column, err.column()),
            (FieldCode::DataType, err.data_type()),
            (FieldCode::Constraint, err.constraint()),
            (FieldCode::File, err.file()),
            (FieldCode::Routine, err.routine()),
        ];
        for (code, value) in optional {
            if let Some(value) = value {
                event.set(code, value);
            }
        }

        match err.position() {
            Some(PgErrorPosition::Original(position)) => {
                event.set(FieldCode::Position, position.to_string());
            }
            Some(PgErrorPosition::Internal { position, query }) => {
                event.set(FieldCode::InternalPosition, position.to_string());
                event.set(FieldCode::InternalQuery, query);
            }
            None => {}
        }

        if let Some(line) = err.line() {
            event.set(FieldCode::Line, line.to_string());
        }

        event
    }
}

fn severity_str(severity: PgSeverity) -> &'static str {
    match severity {
        PgSeverity::Panic => "PANIC",
        PgSeverity::Fatal => "FATAL",
        PgSeverity::Error => "ERROR",
        PgSeverity::Warning => "WARNING",
        PgSeverity::Notice => "NOTICE",
        PgSeverity::Debug => "DEBUG",
        PgSeverity::Info => "INFO",
        PgSeverity::Log => "LOG",
    }
}

impl fmt::Display for RawErrorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.severity().unwrap_or("ERROR"),
            self.message().unwrap_or("<no message>")
        )?;
        if let Some(code) = self.code() {
            write!(f, " (SQLSTATE {})", code)?;
        }
        Ok(())
    }
}

impl std::error::Error for RawErrorEvent {}
