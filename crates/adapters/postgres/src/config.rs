//! 翻译器配置
//!
//! 规则链构造时读取，构造后不再变化

/// 默认方言名
pub const POSTGRES_DIALECT: &str = "postgresql";

/// 注册表中的别名（查找时忽略大小写）
pub const POSTGRES_ALIASES: &[&str] = &["postgresql", "postgres", "pg"];

/// 主键约束名的约定前缀
pub const DEFAULT_PRIMARY_KEY_PREFIX: &str = "pk_";

/// PostgreSQL 错误翻译器配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorSettings {
    /// 方言名（用于日志与 metrics 标签）
    pub dialect: String,
    /// 唯一约束名以此前缀开头（忽略大小写）时视为主键
    pub primary_key_prefix: String,
    /// 是否记录每个进入规则链的错误事件
    pub log_rule_inputs: bool,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            dialect: POSTGRES_DIALECT.to_string(),
            primary_key_prefix: DEFAULT_PRIMARY_KEY_PREFIX.to_string(),
            log_rule_inputs: false,
        }
    }
}

impl TranslatorSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = dialect.into();
        self
    }

    /// 设置主键前缀
    pub fn with_primary_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.primary_key_prefix = prefix.into();
        self
    }

    pub fn with_rule_input_logging(mut self, enabled: bool) -> Self {
        self.log_rule_inputs = enabled;
        self
    }

    /// 约束名是否符合主键命名约定
    pub fn is_primary_key_name(&self, constraint_name: &str) -> bool {
        let prefix = self.primary_key_prefix.to_lowercase();
        !prefix.is_empty() && constraint_name.to_lowercase().starts_with(&prefix)
    }
}
