//! 条件表达式：`where`/`having` 的递归值结构。
//!
//! 一个 [`Condition`] 对应一次 `where()` 调用，编译为一个带括号的条件组；
//! 组内每个 [`Term`] 是原样片段、`列 => 操作数` 或待主键归一化的裸值。

use crate::record::Record;
use crate::value::SqlValue;

/// 条件之间的连接词。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Glue {
    #[default]
    And,
    Or,
    Xor,
}

impl Glue {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
        }
    }

    /// 识别 `AND`/`OR`/`XOR` 标记（大小写不敏感）。
    pub fn from_token(token: &str) -> Option<Self> {
        let t = token.trim();
        if t.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if t.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else if t.eq_ignore_ascii_case("xor") {
            Some(Self::Xor)
        } else {
            None
        }
    }

    fn from_value(v: &SqlValue) -> Option<Self> {
        v.as_str().and_then(Self::from_token)
    }
}

/// where 运算符。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Egt,
    Lt,
    Elt,
    Like,
    NotLike,
    In,
    NotIn,
    Between,
    NotBetween,
    Bind,
    Exp,
}

impl Operator {
    /// 解析运算符记号：大小写不敏感，内部多余空白会被折叠。
    pub fn parse(token: &str) -> Option<Self> {
        let normalized = token
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        let op = match normalized.as_str() {
            "eq" | "=" => Self::Eq,
            "neq" | "<>" | "!=" => Self::Neq,
            "gt" | ">" => Self::Gt,
            "egt" | ">=" => Self::Egt,
            "lt" | "<" => Self::Lt,
            "elt" | "<=" => Self::Elt,
            "like" => Self::Like,
            "not like" | "notlike" => Self::NotLike,
            "in" => Self::In,
            "not in" | "notin" => Self::NotIn,
            "between" => Self::Between,
            "not between" | "notbetween" => Self::NotBetween,
            "bind" => Self::Bind,
            "exp" => Self::Exp,
            _ => return None,
        };
        Some(op)
    }

    pub fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "<>",
            Self::Gt => ">",
            Self::Egt => ">=",
            Self::Lt => "<",
            Self::Elt => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::Between => "BETWEEN",
            Self::NotBetween => "NOT BETWEEN",
            Self::Bind => "=",
            Self::Exp => "",
        }
    }

    pub(crate) fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Neq | Self::Gt | Self::Egt | Self::Lt | Self::Elt
        )
    }
}

/// 列的操作数。
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// 等值：`col = v`；`Null` 为 `IS NULL`；标量列表为 `IN (...)`。
    Value(SqlValue),
    /// `[op, value(, extra)]`；`extra` 是 IN 的 `exp` 标记或 LIKE 的连接词。
    /// 运算符在编译时才校验，未知运算符会让编译失败。
    Expr {
        op: String,
        value: SqlValue,
        extra: Option<String>,
    },
    /// 多个操作数作用于同一列，用 `glue` 连接。
    List { items: Vec<Operand>, glue: Glue },
}

impl Operand {
    pub fn op(op: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::Expr {
            op: op.into(),
            value: value.into(),
            extra: None,
        }
    }

    pub fn eq(value: impl Into<SqlValue>) -> Self {
        Self::Value(value.into())
    }

    pub fn like(pattern: impl Into<SqlValue>) -> Self {
        Self::op("like", pattern)
    }

    /// 多个 LIKE 模式之间使用指定连接词（默认 OR）。
    pub fn like_with(pattern: impl Into<SqlValue>, glue: Glue) -> Self {
        Self::Expr {
            op: "like".to_string(),
            value: pattern.into(),
            extra: Some(glue.as_str().to_string()),
        }
    }

    pub fn in_(values: impl Into<SqlValue>) -> Self {
        Self::op("in", values)
    }

    pub fn not_in(values: impl Into<SqlValue>) -> Self {
        Self::op("not in", values)
    }

    /// `col IN <raw>`：子查询等原样片段，不做任何处理。
    pub fn in_exp(raw: impl Into<String>) -> Self {
        Self::Expr {
            op: "in".to_string(),
            value: SqlValue::String(raw.into().into()),
            extra: Some("exp".to_string()),
        }
    }

    pub fn between(from: impl Into<SqlValue>, to: impl Into<SqlValue>) -> Self {
        Self::op("between", SqlValue::List(vec![from.into(), to.into()]))
    }

    pub fn not_between(from: impl Into<SqlValue>, to: impl Into<SqlValue>) -> Self {
        Self::op("not between", SqlValue::List(vec![from.into(), to.into()]))
    }

    /// `col = :name`，交给外部绑定。
    pub fn bind(name: impl Into<String>) -> Self {
        Self::op("bind", SqlValue::String(name.into().into()))
    }

    /// `col <raw>`：调用方自行保证安全。
    pub fn exp(raw: impl Into<String>) -> Self {
        Self::op("exp", SqlValue::Raw(raw.into()))
    }

    pub fn all(items: impl IntoIterator<Item = Operand>) -> Self {
        Self::List {
            items: items.into_iter().collect(),
            glue: Glue::And,
        }
    }

    pub fn any(items: impl IntoIterator<Item = Operand>) -> Self {
        Self::List {
            items: items.into_iter().collect(),
            glue: Glue::Or,
        }
    }

    /// 从松散的值形状推断操作数：
    ///
    /// - `[op, value(, extra)]` 且 `op` 是已知运算符 => `Expr`
    /// - 首/尾带 `AND`/`OR`/`XOR` 标记，或含嵌套列表 => `List`
    /// - 其余标量列表 => `Value(List)`，编译为 `IN (...)`
    pub fn from_value(value: SqlValue) -> Self {
        let SqlValue::List(mut items) = value else {
            return Self::Value(value);
        };

        if items.len() >= 2
            && let Some(op) = items[0].as_str()
            && Operator::parse(op).is_some()
        {
            let op = op.to_string();
            let mut rest = items.drain(1..);
            let value = rest.next().unwrap_or(SqlValue::Null);
            let extra = rest.next().map(|e| e.to_string());
            return Self::Expr { op, value, extra };
        }

        let mut glue = None;
        if let Some(g) = items.last().and_then(Glue::from_value) {
            glue = Some(g);
            items.pop();
        } else if let Some(g) = items.first().and_then(Glue::from_value) {
            glue = Some(g);
            items.remove(0);
        }

        if glue.is_some() || items.iter().any(SqlValue::is_list) {
            return Self::List {
                items: items.into_iter().map(Self::from_value).collect(),
                glue: glue.unwrap_or_default(),
            };
        }

        Self::Value(SqlValue::List(items))
    }
}

impl From<SqlValue> for Operand {
    fn from(v: SqlValue) -> Self {
        Self::from_value(v)
    }
}

macro_rules! impl_operand_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Self::from_value(v.into())
                }
            }
        )*
    };
}

impl_operand_from!(
    (),
    bool,
    i32,
    i64,
    u32,
    u64,
    f64,
    String,
    &'static str,
    Vec<SqlValue>,
    Vec<i64>,
    Vec<&'static str>,
);

impl<T: Into<SqlValue>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Self::Value(SqlValue::from_option(v))
    }
}

impl<const N: usize> From<[&'static str; N]> for Operand {
    fn from(v: [&'static str; N]) -> Self {
        Self::from_value(v.into())
    }
}

impl<const N: usize> From<[i64; N]> for Operand {
    fn from(v: [i64; N]) -> Self {
        Self::from_value(v.into())
    }
}

impl<const N: usize> From<[SqlValue; N]> for Operand {
    fn from(v: [SqlValue; N]) -> Self {
        Self::from_value(v.into())
    }
}

/// 条件组中的一项。
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Raw(String),
    Field { key: String, operand: Operand },
    /// 裸值条件：由模型层替换为 `主键 = 值`。
    PrimaryKey(SqlValue),
}

/// 一个条件组，编译为 `( ... )`。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Condition {
    pub terms: Vec<Term>,
    pub glue: Glue,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(expr: impl Into<String>) -> Self {
        Self::new().and_raw(expr)
    }

    /// 以 `(key, operand)` 对构造条件组。
    pub fn from_pairs<K, O>(pairs: impl IntoIterator<Item = (K, O)>) -> Self
    where
        K: Into<String>,
        O: Into<Operand>,
    {
        let mut c = Self::new();
        for (k, o) in pairs {
            c = c.field(k, o);
        }
        c
    }

    pub fn field(mut self, key: impl Into<String>, operand: impl Into<Operand>) -> Self {
        self.terms.push(Term::Field {
            key: key.into(),
            operand: operand.into(),
        });
        self
    }

    pub fn eq(self, key: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.field(key, Operand::Value(value.into()))
    }

    pub fn op(self, key: impl Into<String>, op: &str, value: impl Into<SqlValue>) -> Self {
        self.field(key, Operand::op(op, value))
    }

    /// 空白片段被忽略。
    pub fn and_raw(mut self, expr: impl Into<String>) -> Self {
        let expr = expr.into();
        if !expr.trim().is_empty() {
            self.terms.push(Term::Raw(expr));
        }
        self
    }

    pub fn glue(mut self, glue: Glue) -> Self {
        self.glue = glue;
        self
    }

    /// 组内条件改用 OR 连接。
    pub fn or(self) -> Self {
        self.glue(Glue::Or)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl From<&'static str> for Condition {
    fn from(v: &'static str) -> Self {
        Self::raw(v)
    }
}

impl From<String> for Condition {
    fn from(v: String) -> Self {
        Self::raw(v)
    }
}

impl From<Record> for Condition {
    fn from(r: Record) -> Self {
        Self::from_pairs(r)
    }
}

impl From<i64> for Condition {
    fn from(v: i64) -> Self {
        Self {
            terms: vec![Term::PrimaryKey(v.into())],
            glue: Glue::And,
        }
    }
}

impl From<u64> for Condition {
    fn from(v: u64) -> Self {
        Self {
            terms: vec![Term::PrimaryKey(v.into())],
            glue: Glue::And,
        }
    }
}

impl<K: Into<String>, O: Into<Operand>, const N: usize> From<[(K, O); N]> for Condition {
    fn from(pairs: [(K, O); N]) -> Self {
        Self::from_pairs(pairs)
    }
}
