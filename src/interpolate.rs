//! 值格式化与绑定替换：把 `SqlValue` 写成方言字面量，并把 `?`/`:name` 替换为绑定值。
//!
//! 安全警告：字符串字面量的转义是防注入边界；`Raw`/`['exp', raw]` 会绕过转义，
//! 只应用于调用方自己拼出的可信片段。

use crate::error::{DbError, DbResult};
use crate::flavor::Flavor;
use crate::query::Bind;
use crate::value::{SqlDateTime, SqlValue};
use time::macros::format_description;

/// 把值格式化为 SQL 字面量。
pub fn format_value(v: &SqlValue, flavor: Flavor) -> DbResult<String> {
    let mut out = String::new();
    encode_value(&mut out, v, flavor)?;
    Ok(out)
}

pub(crate) fn encode_value(out: &mut String, v: &SqlValue, flavor: Flavor) -> DbResult<()> {
    if let Some(raw) = v.as_exp() {
        out.push_str(raw);
        return Ok(());
    }
    match v {
        SqlValue::Null => out.push_str("NULL"),
        SqlValue::Bool(b) => out.push(if *b { '1' } else { '0' }),
        SqlValue::I64(n) => out.push_str(&n.to_string()),
        SqlValue::U64(n) => out.push_str(&n.to_string()),
        SqlValue::F64(n) if n.is_finite() => out.push_str(&n.to_string()),
        SqlValue::F64(_) => out.push_str("NULL"),
        SqlValue::String(s) => quote_string(out, s.as_ref(), flavor),
        SqlValue::Bytes(b) => encode_bytes(out, b, flavor),
        SqlValue::DateTime(dt) => encode_datetime(out, dt, flavor)?,
        SqlValue::Raw(s) => out.push_str(s),
        SqlValue::List(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                encode_value(out, item, flavor)?;
            }
        }
    }
    Ok(())
}

/// 单引号字符串字面量。MySQL/PostgreSQL 用反斜杠转义，其余方言把 `'` 写成 `''`。
pub(crate) fn quote_string(out: &mut String, s: &str, flavor: Flavor) {
    match flavor {
        Flavor::PostgreSQL => out.push('E'),
        Flavor::SQLServer => out.push('N'),
        _ => {}
    }

    out.push('\'');
    if flavor.backslash_escapes() {
        for ch in s.chars() {
            match ch {
                '\u{0000}' => out.push_str("\\0"),
                '\u{0008}' => out.push_str("\\b"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{001a}' => out.push_str("\\Z"),
                '\'' => out.push_str("\\'"),
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                _ => out.push(ch),
            }
        }
    } else {
        for ch in s.chars() {
            if ch == '\'' {
                out.push_str("''");
            } else {
                out.push(ch);
            }
        }
    }
    out.push('\'');
}

fn encode_bytes(out: &mut String, data: &[u8], flavor: Flavor) {
    if data.is_empty() {
        out.push_str("NULL");
        return;
    }

    match flavor {
        Flavor::MySQL => {
            out.push_str("_binary");
            quote_string(out, &String::from_utf8_lossy(data), flavor);
        }
        Flavor::PostgreSQL => {
            out.push_str("E'\\\\x");
            push_hex(out, data);
            out.push_str("'::bytea");
        }
        Flavor::SQLite => {
            out.push_str("X'");
            push_hex(out, data);
            out.push('\'');
        }
        Flavor::SQLServer => {
            out.push_str("0x");
            push_hex(out, data);
        }
        Flavor::Oracle => {
            out.push_str("hextoraw('");
            push_hex(out, data);
            out.push_str("')");
        }
    }
}

fn push_hex(out: &mut String, data: &[u8]) {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    for &b in data {
        out.push(HEX[((b >> 4) & 0xF) as usize] as char);
        out.push(HEX[(b & 0xF) as usize] as char);
    }
}

fn encode_datetime(out: &mut String, v: &SqlDateTime, flavor: Flavor) -> DbResult<()> {
    // 四舍五入到微秒
    let dt = v.dt + time::Duration::nanoseconds(500);
    let micros = dt.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
    ))?;

    match flavor {
        Flavor::MySQL => {
            out.push('\'');
            out.push_str(&micros);
            out.push('\'');
        }
        Flavor::PostgreSQL | Flavor::SQLServer => {
            out.push('\'');
            out.push_str(&micros);
            out.push(' ');
            match (&v.tz_abbr, flavor) {
                (Some(abbr), Flavor::PostgreSQL) => out.push_str(abbr),
                _ => out.push_str(
                    &dt.format(format_description!(
                        "[offset_hour sign:mandatory]:[offset_minute]"
                    ))?,
                ),
            }
            out.push('\'');
        }
        Flavor::SQLite => {
            out.push('\'');
            out.push_str(&dt.format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]"
            ))?);
            out.push('\'');
        }
        Flavor::Oracle => {
            out.push_str("to_timestamp('");
            out.push_str(&micros);
            out.push_str("', 'YYYY-MM-DD HH24:MI:SS.FF')");
        }
    }
    Ok(())
}

/// 绑定替换：字符串字面量之外的 `?` 依次取位置绑定值，`:name` 取同名绑定值。
///
/// - 没有任何位置绑定值时 `?` 原样保留（交给驱动预编译）
/// - 位置绑定值不足时报错
/// - 找不到的 `:name` 原样保留；`::` 类型转换不受影响
pub(crate) fn substitute_binds(sql: &str, binds: &[Bind], flavor: Flavor) -> DbResult<String> {
    if binds.is_empty() {
        return Ok(sql.to_string());
    }

    let mut positional = Vec::new();
    let mut named = Vec::new();
    for b in binds {
        match b {
            Bind::Positional(v) => positional.push(v),
            Bind::Named(name, v) => named.push((name.as_str(), v)),
        }
    }

    let mut out = String::with_capacity(sql.len() + binds.len() * 8);
    let mut quote: Option<char> = None;
    let mut escaping = false;
    let mut arg_idx = 0usize;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        if escaping {
            out.push(c);
            escaping = false;
            continue;
        }

        match c {
            '\\' if quote.is_some() && flavor.backslash_escapes() => {
                out.push(c);
                escaping = true;
            }
            '\'' | '"' | '`' => {
                if quote == Some(c) {
                    quote = None;
                } else if quote.is_none() {
                    quote = Some(c);
                }
                out.push(c);
            }
            '?' if quote.is_none() && !positional.is_empty() => {
                let v = positional.get(arg_idx).ok_or_else(|| {
                    DbError::validation(format!(
                        "not enough bind values: {} given",
                        positional.len()
                    ))
                })?;
                encode_value(&mut out, v, flavor)?;
                arg_idx += 1;
            }
            ':' if quote.is_none() => {
                if chars.peek() == Some(&':') {
                    out.push_str("::");
                    chars.next();
                    continue;
                }
                if !chars
                    .peek()
                    .is_some_and(|n| n.is_ascii_alphabetic() || *n == '_')
                {
                    out.push(':');
                    continue;
                }
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if n.is_ascii_alphanumeric() || n == '_' {
                        name.push(n);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match named.iter().find(|(k, _)| *k == name) {
                    Some((_, v)) => encode_value(&mut out, v, flavor)?,
                    None => {
                        out.push(':');
                        out.push_str(&name);
                    }
                }
            }
            _ => out.push(c),
        }
    }

    Ok(out)
}

/// 把字符串字面量之外的连续空白折叠为一个空格，并去掉首尾空白。
pub(crate) fn collapse_whitespace(sql: &str, flavor: Flavor) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut escaping = false;
    let mut pending_space = false;

    for c in sql.trim().chars() {
        if quote.is_none() && c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        out.push(c);

        if escaping {
            escaping = false;
            continue;
        }
        match c {
            '\\' if quote.is_some() && flavor.backslash_escapes() => escaping = true,
            '\'' | '"' | '`' => {
                if quote == Some(c) {
                    quote = None;
                } else if quote.is_none() {
                    quote = Some(c);
                }
            }
            _ => {}
        }
    }
    out
}
