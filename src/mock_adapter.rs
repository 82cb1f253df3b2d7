//! 测试用 adapter：记录收到的 SQL 与调用，按队列返回结果集。

use crate::adapter::{Adapter, AdapterError, AdapterResult};
use crate::record::Record;
use crate::value::SqlValue;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub(crate) struct MockAdapter {
    pub executed: Vec<String>,
    pub calls: Vec<String>,
    pub params: Vec<Vec<(String, SqlValue)>>,
    /// 每次 execute 依次取出一个结果集。
    pub results: VecDeque<Vec<Record>>,
    /// SQL 包含该片段时 execute 失败。
    pub fail_on: Option<String>,
    pub fail_commit: bool,
    pub fail_rollback: bool,
    pub last_id: u64,
    pub affected: u64,
    current: VecDeque<Record>,
    prepared: String,
}

impl MockAdapter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_rows(mut self, rows: Vec<Record>) -> Self {
        self.results.push_back(rows);
        self
    }

    pub(crate) fn failing_on(mut self, fragment: &str) -> Self {
        self.fail_on = Some(fragment.to_string());
        self
    }
}

impl Adapter for MockAdapter {
    fn connect(&mut self) -> AdapterResult<()> {
        self.calls.push("connect".to_string());
        Ok(())
    }

    fn disconnect(&mut self) -> AdapterResult<()> {
        self.calls.push("disconnect".to_string());
        Ok(())
    }

    fn prepare(&mut self, sql: &str) -> AdapterResult<()> {
        self.prepared = sql.to_string();
        Ok(())
    }

    fn bind_params(&mut self, params: &[(String, SqlValue)]) -> AdapterResult<()> {
        self.params.push(params.to_vec());
        Ok(())
    }

    fn execute(&mut self) -> AdapterResult<()> {
        self.executed.push(self.prepared.clone());
        if let Some(fragment) = &self.fail_on
            && self.prepared.contains(fragment.as_str())
        {
            return Err(AdapterError::new("mock execution failure"));
        }
        self.current = self.results.pop_front().unwrap_or_default().into();
        Ok(())
    }

    fn fetch(&mut self) -> AdapterResult<Option<Record>> {
        Ok(self.current.pop_front())
    }

    fn escape(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    fn last_id(&self) -> u64 {
        self.last_id
    }

    fn number_of_rows(&self) -> u64 {
        self.affected
    }

    fn begin_transaction(&mut self) -> AdapterResult<()> {
        self.calls.push("begin".to_string());
        Ok(())
    }

    fn commit(&mut self) -> AdapterResult<()> {
        self.calls.push("commit".to_string());
        if self.fail_commit {
            return Err(AdapterError::new("mock commit failure"));
        }
        Ok(())
    }

    fn rollback(&mut self) -> AdapterResult<()> {
        self.calls.push("rollback".to_string());
        if self.fail_rollback {
            return Err(AdapterError::new("mock rollback failure"));
        }
        Ok(())
    }
}
