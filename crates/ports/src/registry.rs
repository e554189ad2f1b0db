//! 翻译器注册表
//!
//! 方言名（忽略大小写）-> 翻译器。构建完成后只读，可在线程间共享。

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dbfault_errors::RegistryError;
use tracing::debug;

use crate::ErrorTranslator;

#[derive(Clone, Default)]
pub struct TranslatorRegistry {
    translators: HashMap<String, Arc<dyn ErrorTranslator>>,
}

impl TranslatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以一组名称注册同一个翻译器；同名的旧注册被覆盖
    pub fn register<I, S>(&mut self, names: I, translator: Arc<dyn ErrorTranslator>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let key = normalize(name.as_ref());
            if key.is_empty() {
                continue;
            }
            debug!(dialect = %key, translator = translator.dialect(), "Registering error translator");
            self.translators.insert(key, Arc::clone(&translator));
        }
    }

    pub fn with_translator<I, S>(mut self, names: I, translator: Arc<dyn ErrorTranslator>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.register(names, translator);
        self
    }

    /// 按方言名查找
    ///
    /// 名称为空白（含缺失）时返回 `MissingDialect`，未注册时返回 `UnknownDialect`。
    pub fn get(&self, name: Option<&str>) -> Result<Arc<dyn ErrorTranslator>, RegistryError> {
        let key = normalize(name.unwrap_or_default());
        if key.is_empty() {
            return Err(RegistryError::MissingDialect);
        }
        self.translators
            .get(&key)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownDialect(name.unwrap_or_default().trim().to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.translators.contains_key(&normalize(name))
    }

    /// 已注册的名称（排序后）
    pub fn dialects(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.translators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }
}

impl fmt::Debug for TranslatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorRegistry")
            .field("dialects", &self.dialects())
            .finish()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
