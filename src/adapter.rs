//! Adapter：执行层与具体数据库驱动之间的窄接口。
//!
//! 每种数据库方言实现一个 adapter；本 crate 只负责生成 SQL 并通过该接口执行，
//! 连接池、重试、超时都属于 adapter 自己的职责。

use crate::record::Record;
use crate::value::SqlValue;

/// adapter 返回的错误，只携带驱动给出的描述。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct AdapterError(pub String);

impl AdapterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type AdapterResult<T> = Result<T, AdapterError>;

/// 数据库连接适配器。
///
/// 调用顺序固定为 `prepare` -> `bind_params`（可选）-> `execute` -> `fetch*`/`last_id`/`number_of_rows`。
pub trait Adapter {
    fn connect(&mut self) -> AdapterResult<()>;

    fn disconnect(&mut self) -> AdapterResult<()> {
        Ok(())
    }

    fn prepare(&mut self, sql: &str) -> AdapterResult<()>;

    /// 为已准备的语句绑定 `:name` 参数。
    fn bind_params(&mut self, params: &[(String, SqlValue)]) -> AdapterResult<()>;

    fn execute(&mut self) -> AdapterResult<()>;

    /// 取下一行；没有更多行时返回 `None`。
    fn fetch(&mut self) -> AdapterResult<Option<Record>>;

    fn fetch_all(&mut self) -> AdapterResult<Vec<Record>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// 转义字符串，返回可直接嵌入 SQL 的字面量。
    fn escape(&self, value: &str) -> String;

    fn last_id(&self) -> u64;

    /// 最近一次执行影响（或返回）的行数。
    fn number_of_rows(&self) -> u64;

    fn begin_transaction(&mut self) -> AdapterResult<()>;

    fn commit(&mut self) -> AdapterResult<()>;

    fn rollback(&mut self) -> AdapterResult<()>;

    /// 驱动最近一次的错误描述。
    fn error_message(&self) -> Option<String> {
        None
    }
}

impl<A: Adapter + ?Sized> Adapter for Box<A> {
    fn connect(&mut self) -> AdapterResult<()> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> AdapterResult<()> {
        (**self).disconnect()
    }

    fn prepare(&mut self, sql: &str) -> AdapterResult<()> {
        (**self).prepare(sql)
    }

    fn bind_params(&mut self, params: &[(String, SqlValue)]) -> AdapterResult<()> {
        (**self).bind_params(params)
    }

    fn execute(&mut self) -> AdapterResult<()> {
        (**self).execute()
    }

    fn fetch(&mut self) -> AdapterResult<Option<Record>> {
        (**self).fetch()
    }

    fn fetch_all(&mut self) -> AdapterResult<Vec<Record>> {
        (**self).fetch_all()
    }

    fn escape(&self, value: &str) -> String {
        (**self).escape(value)
    }

    fn last_id(&self) -> u64 {
        (**self).last_id()
    }

    fn number_of_rows(&self) -> u64 {
        (**self).number_of_rows()
    }

    fn begin_transaction(&mut self) -> AdapterResult<()> {
        (**self).begin_transaction()
    }

    fn commit(&mut self) -> AdapterResult<()> {
        (**self).commit()
    }

    fn rollback(&mut self) -> AdapterResult<()> {
        (**self).rollback()
    }

    fn error_message(&self) -> Option<String> {
        (**self).error_message()
    }
}
