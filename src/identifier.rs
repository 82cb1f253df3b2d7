//! 标识符处理：表引用解析、表前缀替换、列名限定与加引号。

use crate::config::DbConfig;

/// 表引用：`users`、`users u`、`users AS u`、`(SELECT ...) t`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub(crate) fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with('(')
            && let Some(end) = matching_paren(s)
        {
            return Self {
                name: s[..=end].to_string(),
                alias: parse_alias(&s[end + 1..]),
            };
        }

        let mut tokens = s.split_whitespace();
        let name = tokens.next().unwrap_or_default().to_string();
        let rest: Vec<&str> = tokens.collect();
        let alias = match rest.as_slice() {
            [alias] => Some((*alias).to_string()),
            [kw, alias] if kw.eq_ignore_ascii_case("as") => Some((*alias).to_string()),
            _ => None,
        };
        if alias.is_none() && !rest.is_empty() {
            return Self {
                name: s.to_string(),
                alias: None,
            };
        }
        Self { name, alias }
    }
}

fn parse_alias(rest: &str) -> Option<String> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    match tokens.as_slice() {
        [alias] => Some((*alias).to_string()),
        [kw, alias] if kw.eq_ignore_ascii_case("as") => Some((*alias).to_string()),
        _ => None,
    }
}

/// 返回与首个 `(` 匹配的 `)` 下标。
fn matching_paren(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match c {
            '\'' | '"' | '`' => {
                if quote == Some(c) {
                    quote = None;
                } else if quote.is_none() {
                    quote = Some(c);
                }
            }
            '(' if quote.is_none() => depth += 1,
            ')' if quote.is_none() => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// 按顶层逗号拆分（括号与引号内的逗号保留），去掉空白项。
pub(crate) fn split_top_level(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut begin = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '\'' | '"' | '`' => {
                if quote == Some(c) {
                    quote = None;
                } else if quote.is_none() {
                    quote = Some(c);
                }
            }
            '(' if quote.is_none() => depth += 1,
            ')' if quote.is_none() => depth = depth.saturating_sub(1),
            ',' if quote.is_none() && depth == 0 => {
                out.push(s[begin..i].trim().to_string());
                begin = i + 1;
            }
            _ => {}
        }
    }
    out.push(s[begin..].trim().to_string());
    out.retain(|p| !p.is_empty());
    out
}

/// 只由字母、数字、`_`、`.`、`*`、`$` 组成的简单标识符才会被加工。
fn is_plain(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '*' | '$'))
}

/// 按 ` AS ` 拆出别名（大小写不敏感）。
fn split_as(s: &str) -> Option<(&str, &str)> {
    let lower = s.to_ascii_lowercase();
    let pos = lower.rfind(" as ")?;
    let alias = s[pos + 4..].trim();
    is_plain(alias).then(|| (&s[..pos], alias))
}

/// 列名/表名格式化器。
#[derive(Debug, Clone)]
pub(crate) struct Identifiers<'a> {
    config: &'a DbConfig,
    qualifier: Option<String>,
}

impl<'a> Identifiers<'a> {
    pub(crate) fn new(config: &'a DbConfig) -> Self {
        Self {
            config,
            qualifier: None,
        }
    }

    /// 未限定的列会被加上 `main` 表（或其别名）前缀。
    pub(crate) fn qualify_with(mut self, main: &TableRef) -> Self {
        self.qualifier = Some(match &main.alias {
            Some(alias) => self.quote_part(alias),
            None => self.table_name(&main.name),
        });
        self
    }

    fn quote_part(&self, part: &str) -> String {
        if self.config.quote_identifiers && part != "*" && is_plain(part) {
            self.config.flavor.quote(part)
        } else {
            part.to_string()
        }
    }

    fn quote_path(&self, path: &str) -> String {
        path.split('.')
            .map(|p| self.quote_part(p))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// 格式化列引用。表达式（含括号、空格、引号等）原样返回。
    pub(crate) fn key(&self, key: &str) -> String {
        let key = key.trim();
        if key == "*" {
            return key.to_string();
        }
        if let Some((expr, alias)) = split_as(key) {
            return format!("{} AS {}", self.key(expr), self.quote_part(alias.trim()));
        }
        if !is_plain(key) || key.starts_with(|c: char| c.is_ascii_digit()) {
            return key.to_string();
        }
        if !key.contains('.')
            && let Some(q) = &self.qualifier
        {
            return format!("{q}.{}", self.quote_part(key));
        }
        self.quote_path(key)
    }

    /// `ORDER BY` 项：`name`、`name desc`、或原样表达式。
    pub(crate) fn order_item(&self, item: &str) -> String {
        let item = item.trim();
        let mut parts = item.rsplitn(2, char::is_whitespace);
        let last = parts.next().unwrap_or_default();
        if let Some(head) = parts.next()
            && (last.eq_ignore_ascii_case("asc") || last.eq_ignore_ascii_case("desc"))
        {
            return format!("{} {}", self.key(head), last.to_ascii_uppercase());
        }
        self.key(item)
    }

    /// 表名：`db.table`/子查询原样；`__USER_INFO__` 转为 `前缀user_info`；裸表名加库名与前缀。
    pub(crate) fn table_name(&self, name: &str) -> String {
        let name = name.trim();
        if name.starts_with('(') {
            return name.to_string();
        }
        let bare = match name
            .strip_prefix("__")
            .and_then(|n| n.strip_suffix("__"))
        {
            Some(inner) if !inner.is_empty() => inner.to_ascii_lowercase(),
            _ => {
                if name.contains('.') {
                    return self.quote_path(name);
                }
                if !is_plain(name) {
                    return name.to_string();
                }
                name.to_string()
            }
        };
        let full = format!("{}{bare}", self.config.table_prefix);
        match &self.config.database {
            Some(db) => format!("{}.{}", self.quote_part(db), self.quote_part(&full)),
            None => self.quote_part(&full),
        }
    }

    /// 带别名的表引用。
    pub(crate) fn table(&self, table: &TableRef) -> String {
        let name = self.table_name(&table.name);
        match &table.alias {
            Some(alias) => format!(
                "{name}{}{}",
                self.config.flavor.table_alias_keyword(),
                self.quote_part(alias)
            ),
            None => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Identifiers, TableRef, split_top_level};
    use crate::config::DbConfig;
    use crate::flavor::Flavor;
    use pretty_assertions::assert_eq;

    #[test]
    fn split_keeps_nested_commas() {
        assert_eq!(
            split_top_level("id, CONCAT(a,b) AS ab ,'x,y'"),
            vec!["id", "CONCAT(a,b) AS ab", "'x,y'"]
        );
        assert!(split_top_level(" , ").is_empty());
    }

    #[test]
    fn table_ref_aliases() {
        assert_eq!(
            TableRef::parse("users AS u"),
            TableRef {
                name: "users".into(),
                alias: Some("u".into())
            }
        );
        assert_eq!(TableRef::parse("users u").alias.as_deref(), Some("u"));
        assert_eq!(TableRef::parse("users").alias, None);
        let sub = TableRef::parse("(SELECT id FROM a) t");
        assert_eq!(sub.name, "(SELECT id FROM a)");
        assert_eq!(sub.alias.as_deref(), Some("t"));
    }

    #[test]
    fn table_prefix_substitution() {
        let cfg = DbConfig::new().with_table_prefix("app_");
        let ids = Identifiers::new(&cfg);
        assert_eq!(ids.table_name("users"), "app_users");
        assert_eq!(ids.table_name("__USER_INFO__"), "app_user_info");
        assert_eq!(ids.table_name("other.users"), "other.users");

        let cfg = DbConfig::new()
            .with_table_prefix("app_")
            .with_database("shop");
        assert_eq!(Identifiers::new(&cfg).table_name("users"), "shop.app_users");
    }

    #[test]
    fn keys_are_qualified_and_quoted() {
        let cfg = DbConfig::new()
            .with_flavor(Flavor::MySQL)
            .with_quoted_identifiers(true);
        let ids = Identifiers::new(&cfg).qualify_with(&TableRef::parse("users u"));
        assert_eq!(ids.key("id"), "`u`.`id`");
        assert_eq!(ids.key("o.id"), "`o`.`id`");
        assert_eq!(ids.key("COUNT(*)"), "COUNT(*)");
        assert_eq!(ids.key("name AS n"), "`u`.`name` AS `n`");
        assert_eq!(ids.order_item("name desc"), "`u`.`name` DESC");
    }
}
