//! 错误字段适配器
//!
//! 优先读取结构化字段；缺失时依次在消息、详情文本中按正则回退提取。
//! 结构化字段存在时无条件优先，自由文本只作补充。

use once_cell::sync::Lazy;
use regex::Regex;

use crate::event::{FieldCode, RawErrorEvent};

static SCHEMA_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| vec![Regex::new(r#"\bschema "([^"]+)""#).unwrap()]);

static TABLE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"\b(?:table|relation) "([^"]+)""#).unwrap(),
    ]
});

static CONSTRAINT_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| vec![Regex::new(r#"\bconstraint "([^"]+)""#).unwrap()]);

static COLUMN_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| vec![Regex::new(r#"\bcolumn "([^"]+)""#).unwrap()]);

/// 从原始事件中提取命名字段
#[derive(Debug, Clone, Copy)]
pub struct ErrorFields<'a> {
    event: &'a RawErrorEvent,
}

impl<'a> ErrorFields<'a> {
    pub fn new(event: &'a RawErrorEvent) -> Self {
        Self { event }
    }

    pub fn sql_state(&self) -> Option<&'a str> {
        self.event.code()
    }

    pub fn severity(&self) -> Option<&'a str> {
        self.event.severity()
    }

    pub fn message(&self) -> Option<&'a str> {
        self.event.message()
    }

    pub fn detail(&self) -> Option<&'a str> {
        self.event.detail()
    }

    pub fn schema(&self) -> Option<&'a str> {
        self.structured_or_scanned(FieldCode::Schema, &SCHEMA_PATTERNS)
    }

    pub fn table(&self) -> Option<&'a str> {
        self.structured_or_scanned(FieldCode::Table, &TABLE_PATTERNS)
    }

    pub fn constraint(&self) -> Option<&'a str> {
        self.structured_or_scanned(FieldCode::Constraint, &CONSTRAINT_PATTERNS)
    }

    pub fn column(&self) -> Option<&'a str> {
        self.structured_or_scanned(FieldCode::Column, &COLUMN_PATTERNS)
    }

    fn structured_or_scanned(&self, code: FieldCode, patterns: &[Regex]) -> Option<&'a str> {
        if let Some(value) = self.event.get(code).filter(|v| !v.trim().is_empty()) {
            return Some(value);
        }

        // 先扫描 message，再扫描 detail；第一个捕获组命中即返回
        [self.message(), self.detail()]
            .into_iter()
            .flatten()
            .find_map(|text| first_capture(patterns, text))
    }
}

fn first_capture<'t>(patterns: &[Regex], text: &'t str) -> Option<&'t str> {
    patterns
        .iter()
        .find_map(|pattern| pattern.captures(text)?.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(message: &str) -> RawErrorEvent {
        RawErrorEvent::new()
            .with(FieldCode::Code, "23502")
            .with(FieldCode::Message, message)
    }

    #[test]
    fn test_structured_fields_read_directly() {
        let e = RawErrorEvent::new()
            .with(FieldCode::Code, "23505")
            .with(FieldCode::Schema, "public")
            .with(FieldCode::Table, "parent")
            .with(FieldCode::Constraint, "pk_parent")
            .with(FieldCode::Column, "id");
        let fields = ErrorFields::new(&e);

        assert_eq!(fields.sql_state(), Some("23505"));
        assert_eq!(fields.schema(), Some("public"));
        assert_eq!(fields.table(), Some("parent"));
        assert_eq!(fields.constraint(), Some("pk_parent"));
        assert_eq!(fields.column(), Some("id"));
    }

    #[test]
    fn test_falls_back_to_message() {
        let e = event(
            "null value in column \"name\" of relation \"person\" violates not-null constraint",
        );
        let fields = ErrorFields::new(&e);

        assert_eq!(fields.column(), Some("name"));
        assert_eq!(fields.table(), Some("person"));
        assert_eq!(fields.constraint(), None);
    }

    #[test]
    fn test_falls_back_to_detail() {
        let e = event("insert or update violates foreign key constraint \"fk_parent\"")
            .with(FieldCode::Detail, "Key (parent_id)=(7) is not present in table \"parent\".");
        let fields = ErrorFields::new(&e);

        assert_eq!(fields.constraint(), Some("fk_parent"));
        assert_eq!(fields.table(), Some("parent"));
    }

    #[test]
    fn test_message_scanned_before_detail() {
        let e = event("insert or update on table \"child\" violates foreign key constraint \"fk\"")
            .with(FieldCode::Detail, "Key (parent_id)=(7) is not present in table \"parent\".");
        assert_eq!(ErrorFields::new(&e).table(), Some("child"));
    }

    #[test]
    fn test_structured_wins_over_free_text() {
        let e = event("new row for relation \"from_text\" violates check constraint \"chk_text\"")
            .with(FieldCode::Table, "structured")
            .with(FieldCode::Constraint, "chk_structured");
        let fields = ErrorFields::new(&e);

        assert_eq!(fields.table(), Some("structured"));
        assert_eq!(fields.constraint(), Some("chk_structured"));
    }

    #[test]
    fn test_blank_structured_field_is_absent() {
        let e = event("relation \"person\" does not exist").with(FieldCode::Table, "  ");
        assert_eq!(ErrorFields::new(&e).table(), Some("person"));
    }

    #[test]
    fn test_schema_tolerates_trailing_text() {
        let e = event("schema \"audit\" does not exist at character 15");
        assert_eq!(ErrorFields::new(&e).schema(), Some("audit"));
    }

    #[test]
    fn test_absent_everywhere() {
        let e = RawErrorEvent::new();
        let fields = ErrorFields::new(&e);

        assert_eq!(fields.sql_state(), None);
        assert_eq!(fields.message(), None);
        assert_eq!(fields.table(), None);
        assert_eq!(fields.column(), None);
        assert_eq!(fields.schema(), None);
    }
}
