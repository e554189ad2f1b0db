//! 约束值对象

use std::fmt;

use thiserror::Error;

/// 约束类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Unique,
    Check,
    NotNull,
    Other,
}

impl ConstraintKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "primary_key",
            ConstraintKind::ForeignKey => "foreign_key",
            ConstraintKind::Unique => "unique",
            ConstraintKind::Check => "check",
            ConstraintKind::NotNull => "not_null",
            ConstraintKind::Other => "other",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 构造约束失败（调用方编程错误）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("constraint table must not be blank")]
    BlankTable,
}

/// 被违反的 schema 约束
///
/// 不可变，按值比较。`table` 必须非空；空白列名在构造时被过滤。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constraint {
    kind: ConstraintKind,
    name: Option<String>,
    table: String,
    columns: Vec<String>,
}

impl Constraint {
    pub fn new<I, C>(
        kind: ConstraintKind,
        name: Option<&str>,
        table: &str,
        columns: I,
    ) -> Result<Self, ConstraintError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        if table.trim().is_empty() {
            return Err(ConstraintError::BlankTable);
        }

        Ok(Self {
            kind,
            name: name.map(str::to_string),
            table: table.to_string(),
            columns: columns
                .into_iter()
                .map(|c| c.as_ref().trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        })
    }

    pub fn primary_key<I, C>(name: Option<&str>, table: &str, columns: I) -> Result<Self, ConstraintError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Self::new(ConstraintKind::PrimaryKey, name, table, columns)
    }

    pub fn foreign_key<I, C>(name: Option<&str>, table: &str, columns: I) -> Result<Self, ConstraintError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Self::new(ConstraintKind::ForeignKey, name, table, columns)
    }

    pub fn unique<I, C>(name: Option<&str>, table: &str, columns: I) -> Result<Self, ConstraintError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Self::new(ConstraintKind::Unique, name, table, columns)
    }

    pub fn check<I, C>(name: Option<&str>, table: &str, columns: I) -> Result<Self, ConstraintError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Self::new(ConstraintKind::Check, name, table, columns)
    }

    pub fn not_null<I, C>(name: Option<&str>, table: &str, columns: I) -> Result<Self, ConstraintError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Self::new(ConstraintKind::NotNull, name, table, columns)
    }

    pub fn other<I, C>(name: Option<&str>, table: &str, columns: I) -> Result<Self, ConstraintError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Self::new(ConstraintKind::Other, name, table, columns)
    }

    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} constraint", self.kind)?;
        if let Some(name) = &self.name {
            write!(f, " \"{}\"", name)?;
        }
        write!(f, " on {}({})", self.table, self.columns.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories_set_kind() {
        let cols = ["id"];
        assert_eq!(
            Constraint::primary_key(Some("pk_parent"), "parent", cols).unwrap().kind(),
            ConstraintKind::PrimaryKey
        );
        assert_eq!(
            Constraint::foreign_key(None, "child", cols).unwrap().kind(),
            ConstraintKind::ForeignKey
        );
        assert_eq!(
            Constraint::unique(None, "parent", cols).unwrap().kind(),
            ConstraintKind::Unique
        );
        assert_eq!(
            Constraint::check(None, "parent", cols).unwrap().kind(),
            ConstraintKind::Check
        );
        assert_eq!(
            Constraint::not_null(None, "parent", cols).unwrap().kind(),
            ConstraintKind::NotNull
        );
        assert_eq!(
            Constraint::other(None, "parent", cols).unwrap().kind(),
            ConstraintKind::Other
        );
    }

    #[test]
    fn test_blank_table_rejected() {
        assert_eq!(
            Constraint::unique(Some("unq_name"), "", ["name"]),
            Err(ConstraintError::BlankTable)
        );
        assert_eq!(
            Constraint::unique(Some("unq_name"), "   ", ["name"]),
            Err(ConstraintError::BlankTable)
        );
    }

    #[test]
    fn test_blank_columns_filtered() {
        let constraint =
            Constraint::foreign_key(Some("fk_parent"), "child", ["parent_id1", "", " ", "parent_id2"])
                .unwrap();
        assert_eq!(constraint.columns(), ["parent_id1", "parent_id2"]);
    }

    #[test]
    fn test_check_without_columns() {
        let constraint = Constraint::check(Some("chk_age"), "person", Vec::<String>::new()).unwrap();
        assert!(constraint.columns().is_empty());
        assert_eq!(constraint.to_string(), "check constraint \"chk_age\" on person()");
    }

    #[test]
    fn test_structural_equality() {
        let a = Constraint::unique(Some("unq_name"), "parent", ["name"]).unwrap();
        let b = Constraint::unique(Some("unq_name"), "parent", vec!["name".to_string()]).unwrap();
        let c = Constraint::primary_key(Some("unq_name"), "parent", ["name"]).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.to_string(), "unique constraint \"unq_name\" on parent(name)");
    }
}
