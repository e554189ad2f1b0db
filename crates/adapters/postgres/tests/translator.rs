//! 翻译器端到端测试：从 ErrorResponse 消息体到分类后的异常

use std::io;
use std::sync::Arc;

use dbfault_adapter_postgres::{
    FieldCode, POSTGRES_ALIASES, PostgresErrorTranslator, RawErrorEvent, TranslatorSettings,
};
use dbfault_errors::{ConstraintKind, DbErrorKind, DbException, RegistryError};
use dbfault_ports::{ErrorTranslator, TranslatorRegistry};

fn wire_body(fields: &[(u8, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (code, value) in fields {
        body.push(*code);
        body.extend_from_slice(value.as_bytes());
        body.push(0);
    }
    body.push(0);
    body
}

fn decoded(fields: &[(u8, &str)]) -> RawErrorEvent {
    RawErrorEvent::decode(&wire_body(fields)).unwrap()
}

fn translate(event: RawErrorEvent) -> DbException {
    PostgresErrorTranslator::default()
        .translate(Box::new(event))
        .unwrap()
}

#[test]
fn test_foreign_key_from_wire() {
    let event = decoded(&[
        (b'S', "ERROR"),
        (b'V', "ERROR"),
        (b'C', "23503"),
        (b'M', "insert or update on table \"child\" violates foreign key constraint \"fk_child_parent\""),
        (b'D', "Key (parent_id1, parent_id2)=(22222, 813205855) is not present in table \"parent\"."),
        (b's', "public"),
        (b't', "child"),
        (b'n', "fk_child_parent"),
        (b'F', "ri_triggers.c"),
        (b'L', "2608"),
        (b'R', "ri_ReportViolation"),
    ]);
    let exception = translate(event);

    assert_eq!(exception.kind_name(), "foreign_key_violation");
    assert_eq!(exception.sql_state(), Some("23503"));
    assert_eq!(exception.severity(), Some("ERROR"));

    let constraint = exception.constraint().unwrap();
    assert_eq!(constraint.kind(), ConstraintKind::ForeignKey);
    assert_eq!(constraint.name(), Some("fk_child_parent"));
    assert_eq!(constraint.table(), "child");
    assert_eq!(constraint.columns(), ["parent_id1", "parent_id2"]);

    let values = exception.invalid_values().unwrap();
    assert_eq!(values.get("parent_id1"), Some("22222"));
    assert_eq!(values.get("parent_id2"), Some("813205855"));
}

#[test]
fn test_primary_key_versus_unique() {
    let base = [
        (b'C', "23505"),
        (b'M', "duplicate key value violates unique constraint"),
        (b'D', "Key (id)=(1) already exists."),
        (b't', "parent"),
    ];

    let mut pk = base.to_vec();
    pk.push((b'n', "pk_parent"));
    let exception = translate(decoded(&pk));
    assert_eq!(exception.kind_name(), "primary_key_violation");

    let mut unique = base.to_vec();
    unique.push((b'n', "unq_parent_id"));
    let exception = translate(decoded(&unique));
    assert_eq!(exception.kind_name(), "unique_violation");
}

#[test]
fn test_not_null_from_message_only() {
    let exception = translate(decoded(&[
        (b'C', "23502"),
        (b'M', "null value in column \"name\" of relation \"person\" violates not-null constraint"),
    ]));

    let constraint = exception.constraint().unwrap();
    assert_eq!(constraint.kind(), ConstraintKind::NotNull);
    assert_eq!(constraint.table(), "person");
    assert_eq!(constraint.columns(), ["name"]);
}

#[test]
fn test_invalid_uuid_wins_over_data_exception() {
    let exception = translate(decoded(&[
        (b'C', "22P02"),
        (b'M', "invalid input syntax for type uuid: \"not-a-uuid\""),
    ]));
    assert_eq!(exception.invalid_uuid_value(), Some("not-a-uuid"));

    let exception = translate(decoded(&[
        (b'C', "22P02"),
        (b'M', "invalid input syntax for type integer: \"abc\""),
    ]));
    assert!(matches!(exception.kind(), DbErrorKind::Data));
}

#[test]
fn test_every_postgres_event_is_translated() {
    let translator = PostgresErrorTranslator::default();
    let events = [
        RawErrorEvent::new(),
        decoded(&[(b'C', "XX000"), (b'M', "internal error")]),
        decoded(&[(b'C', "99999")]),
        decoded(&[(b'C', "28P01"), (b'M', "password authentication failed for user \"app\"")]),
        decoded(&[(b'C', "23505"), (b'M', "duplicate key value")]),
    ];

    for event in events {
        assert!(translator.acceptable(&event));
        assert!(translator.translate(Box::new(event)).is_ok());
    }
}

#[test]
fn test_password_failure_is_authorization() {
    let exception = translate(decoded(&[
        (b'S', "FATAL"),
        (b'C', "28P01"),
        (b'M', "password authentication failed for user \"app\""),
    ]));
    assert!(matches!(exception.kind(), DbErrorKind::Authorization));
    assert_eq!(exception.severity(), Some("FATAL"));
}

#[test]
fn test_translate_or_pass_returns_foreign_error_untouched() {
    let translator = PostgresErrorTranslator::default();
    let passed = translator.translate_or_pass(Box::new(io::Error::new(io::ErrorKind::TimedOut, "deadline")));

    let original = passed.downcast_ref::<io::Error>().unwrap();
    assert_eq!(original.kind(), io::ErrorKind::TimedOut);
    assert_eq!(original.to_string(), "deadline");
}

#[test]
fn test_translate_or_pass_wraps_postgres_error() {
    let translator = PostgresErrorTranslator::default();
    let event = decoded(&[(b'C', "42P01"), (b'M', "relation \"missing\" does not exist")]);
    let passed = translator.translate_or_pass(Box::new(event.clone()));

    let exception = passed.downcast_ref::<DbException>().unwrap();
    assert_eq!(exception.kind_name(), "generic");
    assert_eq!(exception.message(), "relation \"missing\" does not exist");
    assert_eq!(exception.cause().and_then(|c| c.downcast_ref::<RawErrorEvent>()), Some(&event));
}

#[test]
fn test_logged_rule_inputs() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();

    let translator =
        PostgresErrorTranslator::new(TranslatorSettings::new().with_rule_input_logging(true));
    let exception = translator
        .translate(Box::new(RawErrorEvent::new().with(FieldCode::Code, "23514").with(FieldCode::Table, "orders")))
        .unwrap();
    assert_eq!(exception.kind_name(), "check_violation");
}

#[test]
fn test_registry_lookup_by_alias() {
    let translator: Arc<dyn ErrorTranslator> = Arc::new(PostgresErrorTranslator::default());
    let registry = TranslatorRegistry::new().with_translator(POSTGRES_ALIASES.iter().copied(), translator);

    for name in ["postgresql", "PostgreSQL", "postgres", "PG"] {
        assert_eq!(registry.get(Some(name)).unwrap().dialect(), "postgresql");
    }
    assert!(matches!(registry.get(Some("mysql")), Err(RegistryError::UnknownDialect(_))));
    assert!(matches!(registry.get(None), Err(RegistryError::MissingDialect)));
}

#[test]
fn test_malformed_body_is_rejected() {
    assert!(RawErrorEvent::decode(b"").is_err());
    assert!(RawErrorEvent::decode(b"Cabc").is_err());
    assert!(RawErrorEvent::decode(b"C23505\0\0extra").is_err());
}
