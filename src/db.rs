//! Db：执行门面。持有 adapter、编译器和一条待执行的 `Query`。
//!
//! 链式 setter 写入待执行的 `Query`；`execute`/`find`/`fetch_all` 等动词把它取出（随即重置）、
//! 编译并交给 adapter 执行，再把结果整理成 [`QueryResult`]。

use crate::adapter::{Adapter, AdapterError};
use crate::clause::{ClauseName, StatementType};
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::parser::Parser;
use crate::query::Query;
use crate::record::Record;
use crate::value::SqlValue;
use std::mem;

/// 一次执行的结果。
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// insert：最近插入的 id。
    Inserted(u64),
    /// update/delete：受影响行数。
    Affected(u64),
    Rows(Vec<Record>),
    /// 以一个结果键列的值为键。
    Keyed(Vec<(String, Record)>),
    /// 以两个结果键列分组：外层按第一列，内层按第二列。
    Grouped(Vec<(String, Vec<(String, Record)>)>),
}

impl QueryResult {
    pub fn last_id(&self) -> Option<u64> {
        match self {
            Self::Inserted(id) => Some(*id),
            _ => None,
        }
    }

    pub fn affected(&self) -> Option<u64> {
        match self {
            Self::Affected(n) => Some(*n),
            _ => None,
        }
    }

    /// 取出全部行（丢弃结果键）。
    pub fn into_rows(self) -> Vec<Record> {
        match self {
            Self::Rows(rows) => rows,
            Self::Keyed(rows) => rows.into_iter().map(|(_, r)| r).collect(),
            Self::Grouped(groups) => groups
                .into_iter()
                .flat_map(|(_, rows)| rows.into_iter().map(|(_, r)| r))
                .collect(),
            Self::Inserted(_) | Self::Affected(_) => Vec::new(),
        }
    }
}

/// 分页结果。
#[derive(Debug, Clone, PartialEq)]
pub struct Pager {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub pages: u64,
    pub rows: Vec<Record>,
}

#[derive(Debug)]
pub struct Db<A: Adapter> {
    adapter: A,
    parser: Parser,
    pending: Query,
    result_key: Option<(String, Option<String>)>,
    connected: bool,
    transaction_depth: u32,
    last_sql: Option<String>,
}

impl<A: Adapter> Db<A> {
    pub fn new(adapter: A, config: DbConfig) -> Self {
        Self {
            adapter,
            parser: Parser::new(config),
            pending: Query::new(),
            result_key: None,
            connected: false,
            transaction_depth: 0,
            last_sql: None,
        }
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn config(&self) -> &DbConfig {
        self.parser.config()
    }

    pub fn parser(&self) -> &Parser {
        &self.parser
    }

    /// 最近一次交给 adapter 的 SQL。
    pub fn last_sql(&self) -> Option<&str> {
        self.last_sql.as_deref()
    }

    pub fn pending(&self) -> &Query {
        &self.pending
    }

    pub fn pending_mut(&mut self) -> &mut Query {
        &mut self.pending
    }

    /// 取出待执行的 `Query`，门面随即回到空白状态。
    pub fn take_query(&mut self) -> Query {
        mem::take(&mut self.pending)
    }

    crate::__forward_query_setters!(pending_mut);

    /// 下一次 select 的结果按一个或两个列的值建键。
    pub fn result_key(&mut self, first: impl Into<String>, second: Option<&str>) -> &mut Self {
        self.result_key = Some((first.into(), second.map(str::to_string)));
        self
    }

    /// 编译待执行的 `Query` 而不执行。
    pub fn compile(&mut self) -> DbResult<String> {
        let query = self.take_query();
        self.parser.parse(query)
    }

    /// 编译并执行一个 `Query`。
    pub fn query(&mut self, query: Query) -> DbResult<QueryResult> {
        let ty = query.ty();
        let sql = self.parser.parse(query)?;
        self.run(ty, &sql, &[])
    }

    /// 直接执行原样 SQL；语句类型由 SQL 开头的关键字判断。
    pub fn query_sql(&mut self, sql: &str, params: &[(String, SqlValue)]) -> DbResult<QueryResult> {
        self.run(StatementType::sniff(sql), sql, params)
    }

    /// 执行待执行的 `Query`。
    pub fn execute(&mut self) -> DbResult<QueryResult> {
        let query = self.take_query();
        self.query(query)
    }

    /// 取第一行。
    pub fn find(&mut self) -> DbResult<Option<Record>> {
        let mut query = self.take_query();
        query.set_type(StatementType::Select);
        query.clear_clause(ClauseName::Page).clear_clause(ClauseName::PageSize);
        query.limit(1);
        Ok(self.query(query)?.into_rows().into_iter().next())
    }

    pub fn fetch_all(&mut self) -> DbResult<Vec<Record>> {
        let mut query = self.take_query();
        query.set_type(StatementType::Select);
        Ok(self.query(query)?.into_rows())
    }

    /// 取 `key => value` 两列，按结果顺序返回。
    pub fn fetch_key_values(
        &mut self,
        key: &str,
        value: &str,
    ) -> DbResult<Vec<(String, SqlValue)>> {
        let mut query = self.take_query();
        query.set_type(StatementType::Select);
        query.fields([key, value]);
        let rows = self.query(query)?.into_rows();
        Ok(key_values(rows, key, value))
    }

    /// 先统计总数，再取第 `page` 页（从 1 开始）。
    pub fn fetch_pager(&mut self, page: u64, page_size: u64) -> DbResult<Pager> {
        let mut query = self.take_query();
        query.set_type(StatementType::Select);
        let page = page.max(1);
        let page_size = page_size.max(1);

        let total = self.count_of(count_query(&self.parser, &query)?)?;
        query
            .clear_clause(ClauseName::Limit)
            .clear_clause(ClauseName::Start)
            .page(page)
            .page_size(page_size);
        let rows = if total == 0 {
            Vec::new()
        } else {
            self.query(query)?.into_rows()
        };
        Ok(Pager {
            total,
            page,
            page_size,
            pages: total.div_ceil(page_size),
            rows,
        })
    }

    pub fn count(&mut self) -> DbResult<u64> {
        let query = self.take_query();
        let counted = count_query(&self.parser, &query)?;
        self.count_of(counted)
    }

    pub(crate) fn count_of(&mut self, query: Query) -> DbResult<u64> {
        let rows = self.query(query)?.into_rows();
        Ok(rows
            .first()
            .and_then(Record::first_value)
            .and_then(SqlValue::as_u64)
            .unwrap_or(0))
    }

    fn ensure_connected(&mut self) -> DbResult<()> {
        if !self.connected {
            self.adapter.connect()?;
            self.connected = true;
        }
        Ok(())
    }

    fn run(
        &mut self,
        ty: StatementType,
        sql: &str,
        params: &[(String, SqlValue)],
    ) -> DbResult<QueryResult> {
        self.ensure_connected()?;
        self.last_sql = Some(sql.to_string());
        let result_key = self.result_key.take();
        tracing::debug!(statement = %ty, sql, "executing statement");

        match self.exec(ty, sql, params) {
            Ok(rows) => {
                let result = match ty {
                    StatementType::Insert => QueryResult::Inserted(self.adapter.last_id()),
                    StatementType::Update | StatementType::Delete => {
                        QueryResult::Affected(self.adapter.number_of_rows())
                    }
                    StatementType::Select => shape_rows(rows, result_key),
                };
                tracing::trace!(statement = %ty, rows = self.adapter.number_of_rows(), "statement done");
                Ok(result)
            }
            Err(err) => Err(self.fail(sql, err)),
        }
    }

    fn exec(
        &mut self,
        ty: StatementType,
        sql: &str,
        params: &[(String, SqlValue)],
    ) -> Result<Vec<Record>, AdapterError> {
        self.adapter.prepare(sql)?;
        if !params.is_empty() {
            self.adapter.bind_params(params)?;
        }
        self.adapter.execute()?;
        if ty == StatementType::Select {
            self.adapter.fetch_all()
        } else {
            Ok(Vec::new())
        }
    }

    /// 执行失败：事务中先回滚，再返回带 SQL 的错误。
    fn fail(&mut self, sql: &str, err: AdapterError) -> DbError {
        let message = self.adapter.error_message().unwrap_or(err.0);
        if self.transaction_depth > 0 {
            tracing::warn!(sql, error = %message, "statement failed, rolling back transaction");
            self.transaction_depth = 0;
            if let Err(rollback_err) = self.adapter.rollback() {
                tracing::error!(error = %rollback_err, "rollback after failed statement failed");
            }
        }
        DbError::Execution {
            sql: sql.to_string(),
            message,
        }
    }

    // ---- 事务 ----

    pub fn in_transaction(&self) -> bool {
        self.transaction_depth > 0
    }

    /// 开启事务；嵌套调用只计数，最外层才真正开启。
    pub fn begin(&mut self) -> DbResult<()> {
        self.ensure_connected()?;
        if self.transaction_depth == 0 {
            self.adapter.begin_transaction()?;
        }
        self.transaction_depth += 1;
        Ok(())
    }

    pub fn commit(&mut self) -> DbResult<()> {
        match self.transaction_depth {
            0 => Ok(()),
            1 => {
                // 提交失败时事务仍然打开，由调用方决定回滚
                self.adapter.commit()?;
                self.transaction_depth = 0;
                Ok(())
            }
            _ => {
                self.transaction_depth -= 1;
                Ok(())
            }
        }
    }

    /// 回滚整个事务（不论嵌套层数）。
    pub fn rollback(&mut self) -> DbResult<()> {
        if self.transaction_depth == 0 {
            return Ok(());
        }
        self.transaction_depth = 0;
        self.adapter.rollback()?;
        Ok(())
    }

    /// 在事务中运行 `f`：返回 `Ok` 时提交，返回 `Err` 时回滚。
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> DbResult<T>) -> DbResult<T> {
        self.begin()?;
        match f(self) {
            Ok(value) => match self.commit() {
                Ok(()) => Ok(value),
                Err(err) => {
                    if let Err(rollback_err) = self.rollback() {
                        tracing::error!(error = %rollback_err, "rollback after failed commit failed");
                    }
                    Err(err)
                }
            },
            Err(err) => {
                if let Err(rollback_err) = self.rollback() {
                    tracing::error!(error = %rollback_err, "transaction rollback failed");
                }
                Err(err)
            }
        }
    }

    // ---- adapter 透传 ----

    pub fn escape(&self, value: &str) -> String {
        self.adapter.escape(value)
    }

    pub fn last_id(&self) -> u64 {
        self.adapter.last_id()
    }

    pub fn number_of_rows(&self) -> u64 {
        self.adapter.number_of_rows()
    }

    pub fn error_message(&self) -> Option<String> {
        self.adapter.error_message()
    }

    pub fn close(&mut self) -> DbResult<()> {
        if self.connected {
            self.connected = false;
            self.adapter.disconnect()?;
        }
        Ok(())
    }
}

/// 由查询派生统计查询：去掉排序和分页。
///
/// 带 `GROUP BY` 或 `DISTINCT` 时每组/每个去重结果是一行，改为统计子查询的行数：
/// `SELECT COUNT(*) FROM (<inner>) t`。
pub(crate) fn count_query(parser: &Parser, query: &Query) -> DbResult<Query> {
    let mut q = query.clone();
    q.clear_clause(ClauseName::Order)
        .clear_clause(ClauseName::Limit)
        .clear_clause(ClauseName::Page)
        .clear_clause(ClauseName::PageSize)
        .clear_clause(ClauseName::Start);

    let distinct = q
        .distinct
        .iter()
        .any(|v| !matches!(v, SqlValue::Bool(false) | SqlValue::Null));
    if q.group.is_empty() && !distinct {
        q.clear_clause(ClauseName::Fields).count();
        return Ok(q);
    }

    let inner = parser.parse(q)?;
    let mut outer = Query::new();
    outer.table(format!("({inner}) t")).count();
    Ok(outer)
}

/// 把结果行投影为 `key => value` 对。
pub(crate) fn key_values(rows: Vec<Record>, key: &str, value: &str) -> Vec<(String, SqlValue)> {
    rows.into_iter()
        .map(|mut row| {
            let k = row.get(key).map(|v| v.to_string()).unwrap_or_default();
            let v = row.remove(value).unwrap_or(SqlValue::Null);
            (k, v)
        })
        .collect()
}

fn shape_rows(rows: Vec<Record>, key: Option<(String, Option<String>)>) -> QueryResult {
    let key_of = |row: &Record, col: &str| row.get(col).map(|v| v.to_string()).unwrap_or_default();
    match key {
        None => QueryResult::Rows(rows),
        Some((first, None)) => QueryResult::Keyed(
            rows.into_iter()
                .map(|row| (key_of(&row, &first), row))
                .collect(),
        ),
        Some((first, Some(second))) => {
            let mut groups: Vec<(String, Vec<(String, Record)>)> = Vec::new();
            for row in rows {
                let outer = key_of(&row, &first);
                let inner = key_of(&row, &second);
                match groups.iter_mut().find(|(k, _)| *k == outer) {
                    Some((_, items)) => items.push((inner, row)),
                    None => groups.push((outer, vec![(inner, row)])),
                }
            }
            QueryResult::Grouped(groups)
        }
    }
}
