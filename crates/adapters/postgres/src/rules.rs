//! 分类规则链
//!
//! 规则按从具体到一般的固定顺序以 `or_else` 组合，首个有定义的规则胜出，
//! 最后的兜底规则保证整条链处处有定义：
//!
//! 1. 非法 UUID 字面量（22P02 且消息匹配 UUID 语法错误）
//! 2. 数据异常类（22）
//! 3. 完整性约束违反类（23），再按错误码细分约束类型
//! 4. 认证规范无效类（28）
//! 5. 兜底：通用数据库错误

use dbfault_common::{partial, total, unlift, BoxPartialFunction, PartialFunction};
use dbfault_errors::{Constraint, ConstraintKind, ConstraintViolation, DbErrorKind, DbException};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

use crate::config::TranslatorSettings;
use crate::detail::{key_columns, parse_key_values};
use crate::event::RawErrorEvent;
use crate::fields::ErrorFields;
use crate::sqlstate::{SqlState, SqlStateClass};

/// 一条装箱的分类规则
pub type Rule = BoxPartialFunction<'static, RawErrorEvent, DbException>;

static UUID_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"invalid input syntax for (?:type )?uuid: "(.*)""#).unwrap());

const FALLBACK_MESSAGE: &str = "database error";

fn has_state(event: &RawErrorEvent, state: SqlState) -> bool {
    event.code().is_some_and(|code| state.matches(code))
}

fn in_class(event: &RawErrorEvent, class: SqlStateClass) -> bool {
    event.code().is_some_and(|code| class.contains(code))
}

fn state_is(state: SqlState) -> impl Fn(&RawErrorEvent) -> bool + Send + Sync + Clone {
    move |event: &RawErrorEvent| has_state(event, state)
}

fn class_is(class: SqlStateClass) -> impl Fn(&RawErrorEvent) -> bool + Send + Sync + Clone {
    move |event: &RawErrorEvent| in_class(event, class)
}

/// 以事件的消息、SQLSTATE、严重级别构造异常
fn exception(event: &RawErrorEvent, kind: DbErrorKind) -> DbException {
    let fields = ErrorFields::new(event);
    DbException::new(
        kind,
        fields.message().unwrap_or(FALLBACK_MESSAGE),
        fields.sql_state(),
    )
    .with_severity(fields.severity())
}

fn matched(rule: &'static str) -> impl Fn(DbException) -> DbException + Send + Sync + Clone {
    move |exception| {
        debug!(
            rule,
            kind = exception.kind_name(),
            sql_state = exception.sql_state().unwrap_or_default(),
            "Classification rule matched"
        );
        exception
    }
}

/// 非法 UUID 字面量
pub fn invalid_uuid_rule() -> impl PartialFunction<RawErrorEvent, DbException> + Send + Sync {
    unlift(|event: &RawErrorEvent| {
        if !has_state(event, SqlState::InvalidTextRepresentation) {
            return None;
        }
        let literal = UUID_LITERAL.captures(event.message()?)?.get(1)?.as_str();
        Some(exception(
            event,
            DbErrorKind::InvalidUuid {
                invalid_value: literal.to_string(),
            },
        ))
    })
    .and_then(matched("invalid_uuid"))
}

/// 数据异常类
pub fn data_exception_rule() -> impl PartialFunction<RawErrorEvent, DbException> + Send + Sync {
    partial(class_is(SqlStateClass::DataException), |event: &RawErrorEvent| {
        exception(event, DbErrorKind::Data)
    })
    .and_then(matched("data_exception"))
}

/// 按错误码细分约束类型；未覆盖的完整性错误码无定义
///
/// 协议层不区分主键与唯一约束：约束名以主键前缀开头时才判为主键。
pub fn constraint_kind_rule(
    settings: &TranslatorSettings,
) -> impl PartialFunction<RawErrorEvent, ConstraintKind> + Send + Sync + use<> {
    let settings = settings.clone();

    partial(state_is(SqlState::NotNullViolation), |_: &RawErrorEvent| {
        ConstraintKind::NotNull
    })
    .or_else(partial(
        state_is(SqlState::ForeignKeyViolation),
        |_: &RawErrorEvent| ConstraintKind::ForeignKey,
    ))
    .or_else(partial(
        state_is(SqlState::UniqueViolation),
        move |event: &RawErrorEvent| {
            let primary = ErrorFields::new(event)
                .constraint()
                .is_some_and(|name| settings.is_primary_key_name(name));
            if primary {
                ConstraintKind::PrimaryKey
            } else {
                ConstraintKind::Unique
            }
        },
    ))
    .or_else(partial(
        state_is(SqlState::CheckViolation),
        |_: &RawErrorEvent| ConstraintKind::Check,
    ))
}

/// 完整性约束违反类
///
/// 无法得到表名（结构化字段与文本均缺失）时无定义，交给后续规则。
pub fn integrity_rule(
    settings: &TranslatorSettings,
) -> impl PartialFunction<RawErrorEvent, DbException> + Send + Sync + use<> {
    let kind_of = constraint_kind_rule(settings);

    unlift(move |event: &RawErrorEvent| {
        if !in_class(event, SqlStateClass::IntegrityConstraintViolation) {
            return None;
        }

        let fields = ErrorFields::new(event);
        let kind = kind_of.apply_or_else(event, |_| ConstraintKind::Other);
        let columns = match fields.column() {
            Some(column) => vec![column.to_string()],
            None => key_columns(fields.detail()),
        };
        let constraint = Constraint::new(kind, fields.constraint(), fields.table()?, columns).ok()?;

        let violation = ConstraintViolation::new(constraint)
            .with_invalid_values(parse_key_values(fields.detail()))
            .with_detail(fields.detail());
        Some(exception(event, DbErrorKind::Constraint(violation)))
    })
    .and_then(matched("integrity_constraint_violation"))
}

/// 认证规范无效类
pub fn authorization_rule() -> impl PartialFunction<RawErrorEvent, DbException> + Send + Sync {
    partial(
        class_is(SqlStateClass::InvalidAuthorizationSpecification),
        |event: &RawErrorEvent| exception(event, DbErrorKind::Authorization),
    )
    .and_then(matched("authorization"))
}

/// 通用数据库错误
pub fn fallback_exception(event: &RawErrorEvent) -> DbException {
    exception(event, DbErrorKind::Generic)
}

/// 兜底规则
pub fn catch_all_rule() -> impl PartialFunction<RawErrorEvent, DbException> + Send + Sync {
    total(fallback_exception).and_then(matched("generic"))
}

/// 构造完整规则链
pub fn rule_chain(settings: &TranslatorSettings) -> Rule {
    let chain = invalid_uuid_rule()
        .or_else(data_exception_rule())
        .or_else(integrity_rule(settings))
        .or_else(authorization_rule())
        .or_else(catch_all_rule());

    if settings.log_rule_inputs {
        chain
            .logged(|event: &RawErrorEvent| {
                trace!(
                    sql_state = event.code().unwrap_or_default(),
                    message = event.message().unwrap_or_default(),
                    "Evaluating classification rules"
                );
            })
            .boxed()
    } else {
        chain.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::FieldCode;

    fn event(code: &str, message: &str) -> RawErrorEvent {
        RawErrorEvent::new()
            .with(FieldCode::Severity, "ERROR")
            .with(FieldCode::Code, code)
            .with(FieldCode::Message, message)
    }

    fn classify(event: &RawErrorEvent) -> DbException {
        rule_chain(&TranslatorSettings::default())
            .apply(event)
            .expect("rule chain is total")
    }

    fn unique_violation(constraint: &str) -> RawErrorEvent {
        event(
            "23505",
            &format!("duplicate key value violates unique constraint \"{constraint}\""),
        )
        .with(FieldCode::Table, "parent")
        .with(FieldCode::Constraint, constraint)
        .with(FieldCode::Detail, "Key (name)=(John) already exists.")
    }

    #[test]
    fn test_invalid_uuid() {
        let e = event("22P02", "invalid input syntax for type uuid: \"INVALID\"");
        let exc = classify(&e);

        assert_eq!(exc.invalid_uuid_value(), Some("INVALID"));
        assert_eq!(exc.sql_state(), Some("22P02"));
        assert_eq!(exc.severity(), Some("ERROR"));
    }

    #[test]
    fn test_invalid_uuid_tried_before_data_exception() {
        let e = event("22P02", "invalid input syntax for type uuid: \"INVALID\"");

        // 两条规则都有定义，链中 UUID 规则在前
        assert!(invalid_uuid_rule().is_defined_at(&e));
        assert!(data_exception_rule().is_defined_at(&e));
        assert_eq!(classify(&e).kind_name(), "invalid_uuid");
    }

    #[test]
    fn test_invalid_uuid_legacy_message() {
        let e = event("22p02", "invalid input syntax for uuid: \"abc\"");
        assert_eq!(classify(&e).invalid_uuid_value(), Some("abc"));
    }

    #[test]
    fn test_other_text_representation_is_data() {
        let e = event("22P02", "invalid input syntax for type integer: \"x\"");
        assert!(!invalid_uuid_rule().is_defined_at(&e));
        assert_eq!(*classify(&e).kind(), DbErrorKind::Data);
    }

    #[test]
    fn test_data_exception_class() {
        for code in ["22001", "22003", "22012", "2200G"] {
            let exc = classify(&event(code, "data problem"));
            assert_eq!(*exc.kind(), DbErrorKind::Data, "code {code}");
        }
    }

    #[test]
    fn test_primary_key_by_name_prefix() {
        let exc = classify(&unique_violation("pk_parent"));
        let constraint = exc.constraint().unwrap();

        assert_eq!(constraint.kind(), ConstraintKind::PrimaryKey);
        assert_eq!(constraint.name(), Some("pk_parent"));
        assert_eq!(constraint.table(), "parent");
        assert_eq!(constraint.columns(), ["name"]);
    }

    #[test]
    fn test_unique_without_prefix() {
        let exc = classify(&unique_violation("unq_name"));
        assert_eq!(exc.constraint().unwrap().kind(), ConstraintKind::Unique);
        assert_eq!(exc.invalid_values().unwrap().get("name"), Some("John"));
        assert_eq!(exc.kind_name(), "unique_violation");
    }

    #[test]
    fn test_primary_key_prefix_case_insensitive() {
        let exc = classify(&unique_violation("PK_Parent"));
        assert_eq!(exc.constraint().unwrap().kind(), ConstraintKind::PrimaryKey);
    }

    #[test]
    fn test_custom_primary_key_prefix() {
        let settings = TranslatorSettings::new().with_primary_key_prefix("pkey_");
        let chain = rule_chain(&settings);

        let exc = chain.apply(&unique_violation("pk_parent")).unwrap();
        assert_eq!(exc.constraint().unwrap().kind(), ConstraintKind::Unique);

        let exc = chain.apply(&unique_violation("pkey_parent")).unwrap();
        assert_eq!(exc.constraint().unwrap().kind(), ConstraintKind::PrimaryKey);
    }

    #[test]
    fn test_foreign_key_composite() {
        let detail =
            "Key (parent_id1, parent_id2)=(22222, 813205855) is not present in table \"parent\".";
        let e = event(
            "23503",
            "insert or update on table \"child\" violates foreign key constraint \"fk_child_parent\"",
        )
        .with(FieldCode::Detail, detail);
        let exc = classify(&e);
        let constraint = exc.constraint().unwrap();

        assert_eq!(constraint.kind(), ConstraintKind::ForeignKey);
        assert_eq!(constraint.table(), "child");
        assert_eq!(constraint.name(), Some("fk_child_parent"));
        assert_eq!(constraint.columns(), ["parent_id1", "parent_id2"]);

        let values: Vec<_> = exc.invalid_values().unwrap().iter().collect();
        assert_eq!(
            values,
            vec![("parent_id1", "22222"), ("parent_id2", "813205855")]
        );
        match exc.kind() {
            DbErrorKind::Constraint(violation) => {
                assert_eq!(violation.detail.as_deref(), Some(detail))
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_not_null_prefers_column_field() {
        let e = event(
            "23502",
            "null value in column \"name\" of relation \"person\" violates not-null constraint",
        )
        .with(FieldCode::Detail, "Failing row contains (1, null).");
        let exc = classify(&e);
        let constraint = exc.constraint().unwrap();

        assert_eq!(constraint.kind(), ConstraintKind::NotNull);
        assert_eq!(constraint.table(), "person");
        assert_eq!(constraint.columns(), ["name"]);
        assert_eq!(constraint.name(), None);
        assert!(exc.invalid_values().unwrap().is_empty());
    }

    #[test]
    fn test_check_without_columns() {
        let e = event(
            "23514",
            "new row for relation \"person\" violates check constraint \"chk_age\"",
        );
        let constraint = classify(&e).constraint().cloned().unwrap();

        assert_eq!(constraint.kind(), ConstraintKind::Check);
        assert_eq!(constraint.name(), Some("chk_age"));
        assert!(constraint.columns().is_empty());
    }

    #[test]
    fn test_other_integrity_codes() {
        let e = event(
            "23P01",
            "conflicting key value violates exclusion constraint \"no_overlap\"",
        )
        .with(FieldCode::Table, "booking");
        let exc = classify(&e);

        assert_eq!(exc.constraint().unwrap().kind(), ConstraintKind::Other);
        assert_eq!(exc.kind_name(), "constraint_violation");
        assert!(!constraint_kind_rule(&TranslatorSettings::default()).is_defined_at(&e));
    }

    #[test]
    fn test_integrity_without_table_falls_through() {
        let e = event("23505", "duplicate key value violates unique constraint \"unq_name\"");

        assert!(!integrity_rule(&TranslatorSettings::default()).is_defined_at(&e));
        let exc = classify(&e);
        assert_eq!(*exc.kind(), DbErrorKind::Generic);
        assert_eq!(exc.sql_state(), Some("23505"));
    }

    #[test]
    fn test_authorization_class() {
        let exc = classify(&event("28P01", "password authentication failed for user \"app\""));
        assert_eq!(*exc.kind(), DbErrorKind::Authorization);
        assert_eq!(exc.message(), "password authentication failed for user \"app\"");
    }

    #[test]
    fn test_catch_all_preserves_state_and_message() {
        let exc = classify(&event("42P01", "relation \"missing\" does not exist"));
        assert_eq!(*exc.kind(), DbErrorKind::Generic);
        assert_eq!(exc.sql_state(), Some("42P01"));
        assert_eq!(exc.message(), "relation \"missing\" does not exist");
    }

    #[test]
    fn test_unknown_state_is_generic() {
        let exc = classify(&event("ZZ999", "something odd"));
        assert_eq!(*exc.kind(), DbErrorKind::Generic);
        assert_eq!(exc.sql_state(), Some("ZZ999"));
    }

    #[test]
    fn test_empty_event_is_generic() {
        let exc = classify(&RawErrorEvent::new());
        assert_eq!(*exc.kind(), DbErrorKind::Generic);
        assert_eq!(exc.sql_state(), None);
        assert_eq!(exc.message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_logged_chain_same_result() {
        let settings = TranslatorSettings::new().with_rule_input_logging(true);
        let exc = rule_chain(&settings).apply(&unique_violation("pk_parent")).unwrap();
        assert_eq!(exc.constraint().unwrap().kind(), ConstraintKind::PrimaryKey);
    }
}
