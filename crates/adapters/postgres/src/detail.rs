//! detail 文本解析
//!
//! 识别 `Key (col1, col2)=(val1, val2) ...` 形式，得到按列顺序的列名 -> 值。
//! 只做尽力而为的补充：不匹配、列数不一致或文本为空时返回空映射，从不报错。

use dbfault_errors::InvalidValues;
use once_cell::sync::Lazy;
use regex::Regex;

// 值组取到最后一个后随空白的 `)`；没有时取到最后一个 `)`
static KEY_VALUE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\s*Key \((.+?)\)=\((.*)\)\s").unwrap(),
        Regex::new(r"^\s*Key \((.+?)\)=\((.*)\)").unwrap(),
    ]
});

/// 解析 detail 文本
pub fn parse_key_values(detail: Option<&str>) -> InvalidValues {
    let Some(detail) = detail.filter(|d| !d.trim().is_empty()) else {
        return InvalidValues::new();
    };
    let Some(captures) = KEY_VALUE_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(detail))
    else {
        return InvalidValues::new();
    };

    let columns = split_list(&captures[1]);
    let values = split_list(&captures[2]);
    if columns.len() != values.len() {
        return InvalidValues::new();
    }

    columns.into_iter().zip(values).collect()
}

/// detail 中的列名（按出现顺序）
pub fn key_columns(detail: Option<&str>) -> Vec<String> {
    parse_key_values(detail)
        .columns()
        .map(str::to_string)
        .collect()
}

fn split_list(group: &str) -> Vec<&str> {
    group.split(',').map(str::trim).collect()
}
