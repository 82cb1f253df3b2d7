//! Model：绑定一张表的执行门面。
//!
//! 在 [`Db`] 之上增加表默认值、主键归一化、字段输入/输出整理与唯一性校验。
//! 模型配置通过 [`ModelRegistry`] 显式注册与查找，不使用全局缓存。

use crate::adapter::Adapter;
use crate::clause::StatementType;
use crate::condition::{Operand, Term};
use crate::db::{Db, Pager, QueryResult, key_values};
use crate::error::{DbError, DbResult};
use crate::formatter::FieldFormatter;
use crate::macros::{IntoStrings, collect_into_strings};
use crate::query::{DataEntry, Query};
use crate::record::Record;
use crate::value::SqlValue;
use std::collections::HashMap;
use std::mem;

/// 模型配置。
#[derive(Debug, Clone)]
pub struct ModelOptions {
    pub name: String,
    pub table: String,
    pub primary_key: String,
    /// 声明的列；为空时不过滤写入数据。
    pub fields: Vec<String>,
    pub unique: Vec<String>,
    input: Vec<(String, Box<dyn FieldFormatter>)>,
    output: Vec<(String, Box<dyn FieldFormatter>)>,
}

impl ModelOptions {
    /// 表名默认与模型名相同，主键默认为 `id`。
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            table: name.clone(),
            name,
            primary_key: "id".to_string(),
            fields: Vec::new(),
            unique: Vec::new(),
            input: Vec::new(),
            output: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_primary_key(mut self, pk: impl Into<String>) -> Self {
        self.primary_key = pk.into();
        self
    }

    pub fn with_fields<T: IntoStrings>(mut self, fields: T) -> Self {
        self.fields = collect_into_strings(fields);
        self
    }

    pub fn with_unique<T: IntoStrings>(mut self, fields: T) -> Self {
        self.unique = collect_into_strings(fields);
        self
    }

    pub fn with_input(mut self, field: impl Into<String>, f: Box<dyn FieldFormatter>) -> Self {
        self.input.push((field.into(), f));
        self
    }

    pub fn with_output(mut self, field: impl Into<String>, f: Box<dyn FieldFormatter>) -> Self {
        self.output.push((field.into(), f));
        self
    }

    /// 写入前整理：只保留声明的列（及主键），再逐列调用输入 formatter。
    pub fn format_input(&self, mut data: Record) -> Record {
        if !self.fields.is_empty() {
            data.retain(|k, _| k == self.primary_key || self.fields.iter().any(|f| f == k));
        }
        apply(&self.input, &mut data);
        data
    }

    pub fn format_output(&self, mut row: Record) -> Record {
        apply(&self.output, &mut row);
        row
    }
}

fn apply(formatters: &[(String, Box<dyn FieldFormatter>)], row: &mut Record) {
    for (field, f) in formatters {
        if let Some(v) = row.get_mut(field) {
            let old = mem::replace(v, SqlValue::Null);
            *v = f.format(old);
        }
    }
}

/// 模型配置注册表。
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    options: HashMap<String, ModelOptions>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册配置，返回同名的旧配置。
    pub fn register(&mut self, options: ModelOptions) -> Option<ModelOptions> {
        self.options.insert(options.name.clone(), options)
    }

    pub fn get(&self, name: &str) -> DbResult<&ModelOptions> {
        self.options
            .get(name)
            .ok_or_else(|| DbError::UnknownModel(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// 用注册的配置构造模型。
    pub fn model<A: Adapter>(&self, name: &str, db: Db<A>) -> DbResult<Model<A>> {
        Ok(Model::new(db, self.get(name)?.clone()))
    }
}

#[derive(Debug)]
pub struct Model<A: Adapter> {
    db: Db<A>,
    options: ModelOptions,
}

impl<A: Adapter> Model<A> {
    pub fn new(db: Db<A>, options: ModelOptions) -> Self {
        Self { db, options }
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn db(&self) -> &Db<A> {
        &self.db
    }

    pub fn db_mut(&mut self) -> &mut Db<A> {
        &mut self.db
    }

    pub fn into_db(self) -> Db<A> {
        self.db
    }

    pub fn pending_mut(&mut self) -> &mut Query {
        self.db.pending_mut()
    }

    crate::__forward_query_setters!(pending_mut);

    /// 补全表名，把裸值条件改写为主键条件。
    pub fn normalize(&self, mut query: Query) -> Query {
        if query.table.is_empty() {
            query.table(self.options.table.clone());
        }
        for cond in query.where_.iter_mut().chain(query.having.iter_mut()) {
            for term in &mut cond.terms {
                if let Term::PrimaryKey(v) = term {
                    let value = mem::replace(v, SqlValue::Null);
                    *term = Term::Field {
                        key: self.options.primary_key.clone(),
                        operand: Operand::Value(value),
                    };
                }
            }
        }
        query
    }

    /// 编译待执行的查询（已归一化），不执行。
    pub fn compile(&mut self) -> DbResult<String> {
        self.stage();
        self.db.compile()
    }

    fn stage(&mut self) {
        let query = self.db.take_query();
        let query = self.normalize(query);
        *self.db.pending_mut() = query;
    }

    // ---- 读 ----

    pub fn find(&mut self) -> DbResult<Option<Record>> {
        self.stage();
        Ok(self.db.find()?.map(|r| self.options.format_output(r)))
    }

    pub fn find_by_id(&mut self, id: impl Into<SqlValue>) -> DbResult<Option<Record>> {
        let pk = self.options.primary_key.clone();
        self.db.where_eq(pk, id);
        self.find()
    }

    pub fn fetch_all(&mut self) -> DbResult<Vec<Record>> {
        self.stage();
        let rows = self.db.fetch_all()?;
        Ok(rows
            .into_iter()
            .map(|r| self.options.format_output(r))
            .collect())
    }

    pub fn fetch_key_values(
        &mut self,
        key: &str,
        value: &str,
    ) -> DbResult<Vec<(String, SqlValue)>> {
        self.stage();
        self.db.fields([key, value]);
        let rows = self
            .db
            .fetch_all()?
            .into_iter()
            .map(|r| self.options.format_output(r))
            .collect();
        Ok(key_values(rows, key, value))
    }

    pub fn fetch_pager(&mut self, page: u64, page_size: u64) -> DbResult<Pager> {
        self.stage();
        let mut pager = self.db.fetch_pager(page, page_size)?;
        pager.rows = mem::take(&mut pager.rows)
            .into_iter()
            .map(|r| self.options.format_output(r))
            .collect();
        Ok(pager)
    }

    pub fn count(&mut self) -> DbResult<u64> {
        self.stage();
        self.db.count()
    }

    // ---- 写 ----

    /// 插入一行，返回新 id。
    pub fn add(&mut self, data: Record) -> DbResult<u64> {
        let query = self.db.take_query();
        let mut query = self.normalize(query);
        query.data(data).set_type(StatementType::Insert);
        if !query.formatted() {
            self.prepare_data(&mut query, None)?;
        }
        Ok(self.db.query(query)?.last_id().unwrap_or(0))
    }

    /// 按条件更新，返回受影响行数。
    ///
    /// 没有 where 条件而数据带主键时，以主键为条件，且主键不写入 SET。
    pub fn modify(&mut self, data: Record) -> DbResult<u64> {
        let query = self.db.take_query();
        let mut query = self.normalize(query);
        query.data(data).set_type(StatementType::Update);

        let pk = self.options.primary_key.clone();
        let mut own_id = None;
        if let Some(id) = take_data(&mut query, &pk).filter(|v| !v.is_null()) {
            if query.where_.is_empty() {
                query.where_eq(pk.clone(), id.clone());
            } else {
                query.data_value(pk, id.clone());
            }
            own_id = Some(id);
        }

        if !query.formatted() {
            self.prepare_data(&mut query, own_id)?;
        }
        Ok(self.db.query(query)?.affected().unwrap_or(0))
    }

    /// 数据无主键（或主键为空）时插入，否则按主键更新。
    pub fn save(&mut self, data: Record) -> DbResult<QueryResult> {
        let has_id = data
            .get(&self.options.primary_key)
            .is_some_and(|v| !v.is_null());
        if has_id {
            self.modify(data).map(QueryResult::Affected)
        } else {
            let mut data = data;
            data.remove(&self.options.primary_key);
            self.add(data).map(QueryResult::Inserted)
        }
    }

    /// 按条件删除，返回受影响行数。
    pub fn remove(&mut self) -> DbResult<u64> {
        let query = self.db.take_query();
        let mut query = self.normalize(query);
        query.set_type(StatementType::Delete);
        Ok(self.db.query(query)?.affected().unwrap_or(0))
    }

    pub fn remove_by_id(&mut self, id: impl Into<SqlValue>) -> DbResult<u64> {
        let pk = self.options.primary_key.clone();
        self.db.where_eq(pk, id);
        self.remove()
    }

    /// 整理写入数据并校验唯一列；`own_id` 是当前行的主键，校验时排除它自身。
    fn prepare_data(&mut self, query: &mut Query, own_id: Option<SqlValue>) -> DbResult<()> {
        let mut pairs = Record::new();
        let mut raws = Vec::new();
        for entry in mem::take(&mut query.data) {
            match entry {
                DataEntry::Pair(k, v) => {
                    pairs.insert(k, v);
                }
                DataEntry::Raw(raw) => raws.push(raw),
            }
        }
        let pairs = self.options.format_input(pairs);
        self.verify_unique(query, &pairs, own_id)?;

        query.data(pairs);
        for raw in raws {
            query.data_expr(raw);
        }
        Ok(())
    }

    fn verify_unique(
        &mut self,
        query: &Query,
        data: &Record,
        own_id: Option<SqlValue>,
    ) -> DbResult<()> {
        for field in &self.options.unique {
            let Some(value) = data.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let mut probe = Query::new();
            probe.table = query.table.clone();
            probe.count().where_eq(field.clone(), value.clone());
            if let Some(id) = &own_id {
                probe.where_op(self.options.primary_key.clone(), "neq", id.clone());
            }
            if self.db.count_of(probe)? > 0 {
                return Err(DbError::Duplicate {
                    field: field.clone(),
                });
            }
        }
        Ok(())
    }
}

fn take_data(query: &mut Query, key: &str) -> Option<SqlValue> {
    let pos = query
        .data
        .iter()
        .position(|e| matches!(e, DataEntry::Pair(k, _) if k == key))?;
    match query.data.remove(pos) {
        DataEntry::Pair(_, v) => Some(v),
        DataEntry::Raw(_) => None,
    }
}
