//! FieldFormatter：模型字段的输入/输出整理。
//!
//! 写入前对 `data` 中的列调用输入 formatter，读取后对结果行调用输出 formatter。
//! formatter 以 `Box<dyn FieldFormatter>` 保存，借助 `dyn_clone` 保持 `ModelOptions: Clone`。

use crate::value::SqlValue;
use std::fmt;

pub trait FieldFormatter: dyn_clone::DynClone + fmt::Debug {
    fn format(&self, value: SqlValue) -> SqlValue;
}

dyn_clone::clone_trait_object!(FieldFormatter);

/// 闭包 formatter。
#[derive(Clone)]
pub struct FnFormatter<F> {
    name: &'static str,
    f: F,
}

impl<F> fmt::Debug for FnFormatter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFormatter").field("name", &self.name).finish()
    }
}

impl<F> FieldFormatter for FnFormatter<F>
where
    F: Fn(SqlValue) -> SqlValue + Clone,
{
    fn format(&self, value: SqlValue) -> SqlValue {
        (self.f)(value)
    }
}

/// 用闭包构造 formatter；`name` 只用于调试输出。
pub fn formatter<F>(name: &'static str, f: F) -> Box<dyn FieldFormatter>
where
    F: Fn(SqlValue) -> SqlValue + Clone + 'static,
{
    Box::new(FnFormatter { name, f })
}

/// 去掉字符串首尾空白。
#[derive(Debug, Clone, Copy, Default)]
pub struct Trim;

impl FieldFormatter for Trim {
    fn format(&self, value: SqlValue) -> SqlValue {
        match value {
            SqlValue::String(s) if s.trim().len() != s.len() => {
                SqlValue::String(s.trim().to_string().into())
            }
            other => other,
        }
    }
}

/// `NULL` 替换为默认值。
#[derive(Debug, Clone)]
pub struct DefaultIfNull(pub SqlValue);

impl FieldFormatter for DefaultIfNull {
    fn format(&self, value: SqlValue) -> SqlValue {
        if value.is_null() {
            self.0.clone()
        } else {
            value
        }
    }
}
