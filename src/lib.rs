//! halo-sql-query：驱动无关的 SQL 查询模型与子句编译器。
//!
//! - [`Query`]：按子句名累积的语句模型（select/insert/update/delete）
//! - [`Parser`]：把 `Query` 编译为方言 SQL 文本
//! - [`Db`] / [`Model`]：持有 [`Adapter`] 的执行门面

pub mod adapter;
pub mod clause;
pub mod condition;
pub mod config;
pub mod db;
pub mod error;
pub mod flavor;
pub mod formatter;
mod identifier;
pub mod interpolate;
#[cfg(test)]
mod interpolate_tests;
pub mod macros;
#[cfg(test)]
mod mock_adapter;
pub mod model;
#[cfg(test)]
mod model_tests;
pub mod parser;
pub mod query;
#[cfg(test)]
mod query_tests;
pub mod record;
mod string_builder;
#[cfg(test)]
mod update_delete_tests;
pub mod value;
mod where_clause;
#[cfg(test)]
mod where_clause_tests;

pub use crate::adapter::{Adapter, AdapterError, AdapterResult};
pub use crate::clause::{ClauseName, ClauseValue, Join, JoinOption, StatementType};
pub use crate::condition::{Condition, Glue, Operand, Operator, Term};
pub use crate::config::DbConfig;
pub use crate::db::{Db, Pager, QueryResult};
pub use crate::error::{DbError, DbResult};
pub use crate::flavor::Flavor;
pub use crate::formatter::{DefaultIfNull, FieldFormatter, Trim, formatter};
pub use crate::interpolate::format_value;
pub use crate::macros::IntoStrings;
pub use crate::model::{Model, ModelOptions, ModelRegistry};
pub use crate::parser::Parser;
pub use crate::query::{Bind, DataEntry, InsertRow, Query};
pub use crate::record::Record;
pub use crate::value::{SqlDateTime, SqlValue, raw};
