//! 错误类型：子句设置、编译校验与执行阶段共用一个枚举。

use crate::adapter::AdapterError;
use crate::clause::ClauseName;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// 未知的子句名。
    #[error("query unsupported clause `{0}`")]
    UnsupportedClause(String),

    /// 子句名合法，但取值形状不被该子句接受。
    #[error("query invalid value for clause `{clause}`: {message}")]
    InvalidClauseValue { clause: ClauseName, message: String },

    /// 编译前置校验失败（缺少必需子句、分页格式错误等）。
    #[error("query validation failed: {0}")]
    Validation(String),

    #[error("query unknown where operator `{0}`")]
    UnknownOperator(String),

    #[error("query failed to format value: {0}")]
    Format(#[from] time::error::Format),

    #[error("db adapter error: {0}")]
    Adapter(#[from] AdapterError),

    /// 语句执行失败，附带出错的 SQL 便于排查。
    #[error("db execution failed: {message} [SQL: {sql}]")]
    Execution { sql: String, message: String },

    #[error("model duplicate value for unique field `{field}`")]
    Duplicate { field: String },

    #[error("model `{0}` is not registered")]
    UnknownModel(String),
}

impl DbError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn invalid_value(clause: ClauseName, message: impl Into<String>) -> Self {
        Self::InvalidClauseValue {
            clause,
            message: message.into(),
        }
    }

    /// 是否属于编译期校验错误（不涉及 I/O）。
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnknownOperator(_))
    }
}
