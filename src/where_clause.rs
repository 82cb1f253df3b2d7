//! 条件渲染：把 `where`/`having` 的条件组编译为 SQL 片段。
//!
//! 每个 [`Condition`] 渲染为一个带括号的组，多个组之间固定用 `AND` 连接。

use crate::condition::{Condition, Glue, Operand, Operator, Term};
use crate::error::{DbError, DbResult};
use crate::flavor::Flavor;
use crate::identifier::Identifiers;
use crate::interpolate::{format_value, quote_string};
use crate::string_builder::StringBuilder;
use crate::value::SqlValue;

/// 渲染中间结果：若干片段与它们之间的连接词。
#[derive(Debug)]
struct Fragment {
    parts: Vec<String>,
    glue: Glue,
    compound: bool,
}

impl Fragment {
    fn one(part: String) -> Self {
        Self {
            parts: vec![part],
            glue: Glue::And,
            compound: false,
        }
    }

    fn many(parts: Vec<String>, glue: Glue) -> Self {
        Self {
            parts,
            glue,
            compound: false,
        }
    }

    fn joined(&self) -> String {
        let mut buf = StringBuilder::new();
        buf.write_strings(&self.parts, &format!(" {} ", self.glue.as_str()));
        buf.into_string()
    }

    /// 作为上一级的一项时，多片段需要加括号。
    fn nested(&self) -> String {
        if self.parts.len() > 1 || self.compound {
            format!("({})", self.joined())
        } else {
            self.joined()
        }
    }
}

/// 条件渲染器。
pub(crate) struct ConditionRenderer<'a> {
    ids: &'a Identifiers<'a>,
    flavor: Flavor,
}

impl<'a> ConditionRenderer<'a> {
    pub(crate) fn new(ids: &'a Identifiers<'a>, flavor: Flavor) -> Self {
        Self { ids, flavor }
    }

    /// 渲染全部条件组，返回不带 `WHERE`/`HAVING` 关键字的片段；无条件时为空串。
    pub(crate) fn render_groups(&self, groups: &[Condition]) -> DbResult<String> {
        let mut out = Vec::with_capacity(groups.len());
        for group in groups {
            let frag = self.render_condition(group)?;
            if frag.parts.is_empty() {
                continue;
            }
            out.push(format!("({})", frag.joined()));
        }
        let mut buf = StringBuilder::new();
        buf.write_strings(&out, " AND ");
        Ok(buf.into_string())
    }

    fn render_condition(&self, cond: &Condition) -> DbResult<Fragment> {
        let mut frags = cond
            .terms
            .iter()
            .map(|t| self.render_term(t))
            .collect::<DbResult<Vec<_>>>()?;
        frags.retain(|f| !f.parts.is_empty());

        if frags.len() == 1 {
            let mut only = frags.remove(0);
            only.compound = false;
            return Ok(only);
        }
        Ok(Fragment::many(
            frags.iter().map(Fragment::nested).collect(),
            cond.glue,
        ))
    }

    fn render_term(&self, term: &Term) -> DbResult<Fragment> {
        match term {
            Term::Raw(expr) => {
                let expr = expr.trim();
                if expr.is_empty() {
                    return Ok(Fragment::many(Vec::new(), Glue::And));
                }
                let mut frag = Fragment::one(expr.to_string());
                frag.compound = has_logic_keyword(expr);
                Ok(frag)
            }
            Term::Field { key, operand } => self.render_field(key, operand),
            Term::PrimaryKey(v) => Err(DbError::validation(format!(
                "bare value condition `{v}` needs a primary key"
            ))),
        }
    }

    /// `a|b` 对多列取 OR，`a&b` 取 AND。
    fn render_field(&self, key: &str, operand: &Operand) -> DbResult<Fragment> {
        let (columns, glue): (Vec<&str>, Glue) = if key.contains('|') {
            (key.split('|').collect(), Glue::Or)
        } else if key.contains('&') {
            (key.split('&').collect(), Glue::And)
        } else {
            (vec![key], Glue::And)
        };
        let columns: Vec<&str> = columns
            .into_iter()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        if columns.is_empty() {
            return Err(DbError::validation("condition with an empty column name"));
        }

        let mut frags = columns
            .iter()
            .map(|col| self.render_operand(&self.ids.key(col), operand))
            .collect::<DbResult<Vec<_>>>()?;
        if frags.len() == 1 {
            return Ok(frags.remove(0));
        }
        Ok(Fragment::many(
            frags.iter().map(Fragment::nested).collect(),
            glue,
        ))
    }

    fn render_operand(&self, col: &str, operand: &Operand) -> DbResult<Fragment> {
        match operand {
            Operand::Value(v) => {
                if let Some(raw) = v.as_exp() {
                    return Ok(Fragment::one(format!("{col} = {raw}")));
                }
                match v {
                    SqlValue::Null => Ok(Fragment::one(format!("{col} IS NULL"))),
                    SqlValue::List(items) => self.render_in(col, Operator::In, items),
                    _ => Ok(Fragment::one(format!(
                        "{col} = {}",
                        format_value(v, self.flavor)?
                    ))),
                }
            }
            Operand::Expr { op, value, extra } => {
                let operator =
                    Operator::parse(op).ok_or_else(|| DbError::UnknownOperator(op.clone()))?;
                self.render_expr(col, operator, value, extra.as_deref())
            }
            Operand::List { items, glue } => {
                if items.is_empty() {
                    return Err(DbError::validation(format!(
                        "empty operand list for `{col}`"
                    )));
                }
                let frags = items
                    .iter()
                    .map(|item| self.render_operand(col, item))
                    .collect::<DbResult<Vec<_>>>()?;
                Ok(Fragment::many(
                    frags.iter().map(Fragment::nested).collect(),
                    *glue,
                ))
            }
        }
    }

    fn render_expr(
        &self,
        col: &str,
        op: Operator,
        value: &SqlValue,
        extra: Option<&str>,
    ) -> DbResult<Fragment> {
        match op {
            _ if op.is_comparison() => {
                if value.is_null() {
                    let test = if op == Operator::Eq {
                        "IS NULL"
                    } else {
                        "IS NOT NULL"
                    };
                    return Ok(Fragment::one(format!("{col} {test}")));
                }
                Ok(Fragment::one(format!(
                    "{col} {} {}",
                    op.sql(),
                    format_value(value, self.flavor)?
                )))
            }
            Operator::Like | Operator::NotLike => {
                let patterns = like_patterns(value);
                if patterns.is_empty() {
                    return Err(DbError::validation(format!(
                        "empty LIKE pattern for `{col}`"
                    )));
                }
                let glue = extra.and_then(Glue::from_token).unwrap_or(Glue::Or);
                let parts = patterns
                    .iter()
                    .map(|p| {
                        let mut lit = String::new();
                        quote_string(&mut lit, &format!("%{p}%"), self.flavor);
                        format!("{col} {} {lit}", op.sql())
                    })
                    .collect();
                Ok(Fragment::many(parts, glue))
            }
            Operator::Bind => {
                let name = match value.as_str().map(str::trim) {
                    Some(name) if !name.is_empty() => name.to_string(),
                    _ => bind_name(col),
                };
                Ok(Fragment::one(format!("{col} = :{name}")))
            }
            Operator::Exp => match value {
                SqlValue::List(_) => Err(DbError::validation(format!(
                    "exp on `{col}` needs a single expression"
                ))),
                _ => Ok(Fragment::one(format!("{col} {value}"))),
            },
            Operator::In | Operator::NotIn => {
                if extra.is_some_and(|e| e.trim().eq_ignore_ascii_case("exp")) {
                    return Ok(Fragment::one(format!("{col} {} {value}", op.sql())));
                }
                if let Some(raw) = value.as_exp() {
                    return Ok(Fragment::one(format!("{col} {} {raw}", op.sql())));
                }
                match value {
                    SqlValue::String(s) if is_subquery(s) => {
                        let s = s.trim();
                        let sub = if s.starts_with('(') {
                            s.to_string()
                        } else {
                            format!("({s})")
                        };
                        Ok(Fragment::one(format!("{col} {} {sub}", op.sql())))
                    }
                    SqlValue::String(s) => self.render_in(col, op, &split_values(s)),
                    SqlValue::List(items) => self.render_in(col, op, items),
                    SqlValue::Null => self.render_in(col, op, &[]),
                    other => self.render_in(col, op, std::slice::from_ref(other)),
                }
            }
            Operator::Between | Operator::NotBetween => {
                let bounds = match value {
                    SqlValue::String(s) => split_values(s),
                    SqlValue::List(items) => items.clone(),
                    _ => Vec::new(),
                };
                let [from, to] = bounds.as_slice() else {
                    return Err(DbError::validation(format!(
                        "BETWEEN on `{col}` needs exactly two bounds"
                    )));
                };
                Ok(Fragment::one(format!(
                    "{col} {} {} AND {}",
                    op.sql(),
                    format_value(from, self.flavor)?,
                    format_value(to, self.flavor)?
                )))
            }
            // is_comparison 已覆盖其余运算符
            _ => Err(DbError::UnknownOperator(op.sql().to_string())),
        }
    }

    /// 空列表：`IN` 为 `0 = 1`，`NOT IN` 为 `0 = 0`。
    fn render_in(&self, col: &str, op: Operator, items: &[SqlValue]) -> DbResult<Fragment> {
        if items.is_empty() {
            let always = if op == Operator::NotIn { "0 = 0" } else { "0 = 1" };
            return Ok(Fragment::one(always.to_string()));
        }
        let values = items
            .iter()
            .map(|v| format_value(v, self.flavor))
            .collect::<DbResult<Vec<_>>>()?;
        Ok(Fragment::one(format!(
            "{col} {} ({})",
            op.sql(),
            values.join(",")
        )))
    }
}

fn has_logic_keyword(expr: &str) -> bool {
    expr.split_whitespace().any(|w| Glue::from_token(w).is_some())
}

fn is_subquery(s: &str) -> bool {
    let s = s.trim_start().trim_start_matches('(').trim_start();
    s.get(..7)
        .is_some_and(|head| head.eq_ignore_ascii_case("select "))
}

/// 逗号分隔的字符串拆成值；能解析为数字的部分按数字渲染。
pub(crate) fn split_values(s: &str) -> Vec<SqlValue> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if let Ok(n) = p.parse::<i64>() {
                SqlValue::I64(n)
            } else if let Ok(f) = p.parse::<f64>()
                && f.is_finite()
            {
                SqlValue::F64(f)
            } else {
                SqlValue::String(p.to_string().into())
            }
        })
        .collect()
}

fn like_patterns(value: &SqlValue) -> Vec<String> {
    match value {
        SqlValue::Null => Vec::new(),
        SqlValue::String(s) => s.split_whitespace().map(str::to_string).collect(),
        SqlValue::List(items) => items
            .iter()
            .map(|v| v.to_string())
            .filter(|p| !p.trim().is_empty())
            .collect(),
        other => vec![other.to_string()],
    }
}

/// 由列名推导绑定名：去掉引号，`.` 换成 `_`。
fn bind_name(col: &str) -> String {
    col.chars()
        .filter(|c| !matches!(c, '`' | '"' | '[' | ']'))
        .map(|c| if c == '.' { '_' } else { c })
        .collect()
}
