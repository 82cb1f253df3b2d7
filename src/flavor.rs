//! SQL Flavor（方言）：控制标识符引号、字符串字面量与 LIMIT 语法。

use std::fmt;

/// 支持的数据库方言。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flavor {
    #[default]
    MySQL,
    PostgreSQL,
    SQLite,
    SQLServer,
    Oracle,
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MySQL => "MySQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLite => "SQLite",
            Self::SQLServer => "SQLServer",
            Self::Oracle => "Oracle",
        };
        f.write_str(s)
    }
}

impl Flavor {
    /// 为标识符加引号。
    pub fn quote(self, name: &str) -> String {
        match self {
            Self::MySQL => format!("`{name}`"),
            Self::SQLServer => format!("[{name}]"),
            Self::PostgreSQL | Self::SQLite | Self::Oracle => format!("\"{name}\""),
        }
    }

    /// 字符串字面量内是否以反斜杠转义（否则以 `''` 表示单引号）。
    pub fn backslash_escapes(self) -> bool {
        matches!(self, Self::MySQL | Self::PostgreSQL)
    }

    /// 表别名连接词；Oracle 不接受 `AS`。
    pub(crate) fn table_alias_keyword(self) -> &'static str {
        match self {
            Self::Oracle => " ",
            _ => " AS ",
        }
    }

    /// UPDATE/DELETE 是否支持 `LIMIT n`。
    pub(crate) fn supports_mutation_limit(self) -> bool {
        matches!(self, Self::MySQL | Self::SQLite)
    }

    /// 按方言输出分页子句。
    pub(crate) fn limit_clause(self, offset: Option<u64>, count: u64) -> String {
        match self {
            Self::MySQL => match offset {
                Some(o) => format!("LIMIT {o},{count}"),
                None => format!("LIMIT {count}"),
            },
            Self::PostgreSQL | Self::SQLite => match offset {
                Some(o) => format!("LIMIT {count} OFFSET {o}"),
                None => format!("LIMIT {count}"),
            },
            Self::SQLServer | Self::Oracle => format!(
                "OFFSET {} ROWS FETCH NEXT {count} ROWS ONLY",
                offset.unwrap_or(0)
            ),
        }
    }
}
