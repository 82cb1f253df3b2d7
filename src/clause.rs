//! 子句名与子句取值：`Query::set` 的类型化入口。

use crate::condition::Condition;
use crate::error::DbError;
use crate::record::Record;
use crate::value::SqlValue;
use std::fmt;
use std::str::FromStr;

/// 语句类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatementType {
    #[default]
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// 根据原始 SQL 的首个关键字推断语句类型；无法识别时按查询处理。
    pub fn sniff(sql: &str) -> Self {
        let word = sql
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default();
        if word.eq_ignore_ascii_case("insert") || word.eq_ignore_ascii_case("replace") {
            Self::Insert
        } else if word.eq_ignore_ascii_case("update") {
            Self::Update
        } else if word.eq_ignore_ascii_case("delete") {
            Self::Delete
        } else {
            Self::Select
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 子句名（有限集合）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClauseName {
    Table,
    Fields,
    Distinct,
    Where,
    Join,
    Group,
    Having,
    Order,
    Limit,
    Page,
    PageSize,
    Start,
    Data,
    Values,
    Set,
    Bind,
    Select,
    Insert,
    Update,
    Delete,
    Count,
}

impl ClauseName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Fields => "fields",
            Self::Distinct => "distinct",
            Self::Where => "where",
            Self::Join => "join",
            Self::Group => "group",
            Self::Having => "having",
            Self::Order => "order",
            Self::Limit => "limit",
            Self::Page => "page",
            Self::PageSize => "pagesize",
            Self::Start => "start",
            Self::Data => "data",
            Self::Values => "values",
            Self::Set => "set",
            Self::Bind => "bind",
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Count => "count",
        }
    }

    /// 设置语句类型的伪子句（`select/insert/update/delete/count`）。
    pub fn statement_type(self) -> Option<StatementType> {
        match self {
            Self::Select | Self::Count => Some(StatementType::Select),
            Self::Insert => Some(StatementType::Insert),
            Self::Update => Some(StatementType::Update),
            Self::Delete => Some(StatementType::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for ClauseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClauseName {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s.trim().to_ascii_lowercase().as_str() {
            "table" | "from" => Self::Table,
            "field" | "fields" => Self::Fields,
            "distinct" => Self::Distinct,
            "where" => Self::Where,
            "join" => Self::Join,
            "group" => Self::Group,
            "having" => Self::Having,
            "order" => Self::Order,
            "limit" => Self::Limit,
            "page" => Self::Page,
            "pagesize" | "num" => Self::PageSize,
            "start" => Self::Start,
            "data" => Self::Data,
            "values" => Self::Values,
            "set" => Self::Set,
            "bind" => Self::Bind,
            "select" => Self::Select,
            "insert" => Self::Insert,
            "update" => Self::Update,
            "delete" => Self::Delete,
            "count" => Self::Count,
            _ => return Err(DbError::UnsupportedClause(s.to_string())),
        };
        Ok(name)
    }
}

/// Join 类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinOption {
    #[default]
    InnerJoin,
    LeftJoin,
    LeftOuterJoin,
    RightJoin,
    RightOuterJoin,
    FullJoin,
    FullOuterJoin,
}

impl JoinOption {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::InnerJoin => "INNER JOIN",
            Self::LeftJoin => "LEFT JOIN",
            Self::LeftOuterJoin => "LEFT OUTER JOIN",
            Self::RightJoin => "RIGHT JOIN",
            Self::RightOuterJoin => "RIGHT OUTER JOIN",
            Self::FullJoin => "FULL JOIN",
            Self::FullOuterJoin => "FULL OUTER JOIN",
        }
    }
}

/// 一条 join：`{table, alias, on}`，或整段原样 join 片段。
#[derive(Debug, Clone, PartialEq)]
pub enum Join {
    Table {
        option: JoinOption,
        table: String,
        alias: Option<String>,
        on: String,
    },
    Raw(String),
}

impl Join {
    pub fn new(table: impl Into<String>, on: impl Into<String>) -> Self {
        Self::Table {
            option: JoinOption::default(),
            table: table.into(),
            alias: None,
            on: on.into(),
        }
    }

    pub fn with_option(self, option: JoinOption) -> Self {
        match self {
            Self::Table {
                table, alias, on, ..
            } => Self::Table {
                option,
                table,
                alias,
                on,
            },
            raw => raw,
        }
    }

    pub fn with_alias(self, alias: impl Into<String>) -> Self {
        match self {
            Self::Table {
                option, table, on, ..
            } => Self::Table {
                option,
                table,
                alias: Some(alias.into()),
                on,
            },
            raw => raw,
        }
    }
}

/// `Query::set` 接受的子句取值。
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseValue {
    Scalar(SqlValue),
    Record(Record),
    Records(Vec<Record>),
    Condition(Condition),
    Join(Join),
}

macro_rules! impl_scalar_clause_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for ClauseValue {
                fn from(v: $ty) -> Self {
                    Self::Scalar(v.into())
                }
            }
        )*
    };
}

impl_scalar_clause_value!(
    SqlValue,
    bool,
    i32,
    i64,
    u32,
    u64,
    f64,
    String,
    &'static str,
    Vec<SqlValue>,
    Vec<&'static str>,
    Vec<String>,
    Vec<i64>,
);

impl From<Record> for ClauseValue {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl From<Vec<Record>> for ClauseValue {
    fn from(v: Vec<Record>) -> Self {
        Self::Records(v)
    }
}

impl From<Condition> for ClauseValue {
    fn from(v: Condition) -> Self {
        Self::Condition(v)
    }
}

impl From<Join> for ClauseValue {
    fn from(v: Join) -> Self {
        Self::Join(v)
    }
}
