//! Query：一条 SQL 语句的可合并子句集合（语句构建中的数据模型）。
//!
//! 每个子句槽位都是列表：重复设置会追加，只有 [`Query::set_raw`] 会整体替换。
//! `Query` 被 [`Parser::parse`](crate::parser::Parser::parse) 按值消费，编译一次即失效。

use crate::clause::{ClauseName, ClauseValue, Join, JoinOption, StatementType};
use crate::condition::{Condition, Term};
use crate::error::{DbError, DbResult};
use crate::identifier::{TableRef, split_top_level};
use crate::macros::{IntoStrings, collect_into_strings};
use crate::record::Record;
use crate::value::SqlValue;

/// `data`/`set` 槽位中的一项。
#[derive(Debug, Clone, PartialEq)]
pub enum DataEntry {
    Pair(String, SqlValue),
    /// 原样 SET 片段，如 `hits=hits+1`。
    Raw(String),
}

/// `values` 槽位中的一行。
#[derive(Debug, Clone, PartialEq)]
pub enum InsertRow {
    Named(Record),
    /// 不带列名、按表列顺序写入的一行。
    Positional(Vec<SqlValue>),
}

/// 绑定值：替换 `?` 或 `:name`。
#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Positional(SqlValue),
    Named(String, SqlValue),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub(crate) ty: Option<StatementType>,
    pub(crate) table: Vec<String>,
    pub(crate) fields: Vec<String>,
    pub(crate) distinct: Vec<SqlValue>,
    pub(crate) where_: Vec<Condition>,
    pub(crate) join: Vec<Join>,
    pub(crate) group: Vec<String>,
    pub(crate) having: Vec<Condition>,
    pub(crate) order: Vec<String>,
    pub(crate) limit: Vec<SqlValue>,
    pub(crate) page: Vec<SqlValue>,
    pub(crate) page_size: Vec<SqlValue>,
    pub(crate) start: Vec<SqlValue>,
    pub(crate) data: Vec<DataEntry>,
    pub(crate) values: Vec<InsertRow>,
    pub(crate) bind: Vec<Bind>,
    pub(crate) count: bool,
    pub(crate) formatted: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 `(子句名, 取值)` 序列构造。
    pub fn from_clauses<I, V>(clauses: I) -> DbResult<Self>
    where
        I: IntoIterator<Item = (ClauseName, V)>,
        V: Into<ClauseValue>,
    {
        let mut q = Self::new();
        for (name, value) in clauses {
            q.set(name, value)?;
        }
        Ok(q)
    }

    /// 按子句名设置：
    ///
    /// - `select/insert/update/delete/count` 设置语句类型，并写入 `fields`/`table`
    /// - 列表型子句：传入列表时替换，否则追加
    /// - `data/values/set/join`：合并键值对，或追加标量
    pub fn set(&mut self, name: ClauseName, value: impl Into<ClauseValue>) -> DbResult<&mut Self> {
        self.route(name, value.into(), false)?;
        Ok(self)
    }

    /// 以字符串子句名设置；未知子句名返回 [`DbError::UnsupportedClause`]。
    pub fn set_named(&mut self, name: &str, value: impl Into<ClauseValue>) -> DbResult<&mut Self> {
        let name: ClauseName = name.parse()?;
        self.set(name, value)
    }

    /// 整体替换一个子句槽位。
    pub fn set_raw(
        &mut self,
        name: ClauseName,
        value: impl Into<ClauseValue>,
    ) -> DbResult<&mut Self> {
        self.route(name, value.into(), true)?;
        Ok(self)
    }

    /// 清空一个子句槽位。
    pub fn clear_clause(&mut self, name: ClauseName) -> &mut Self {
        match name {
            ClauseName::Table | ClauseName::Insert | ClauseName::Update | ClauseName::Delete => {
                self.table.clear()
            }
            ClauseName::Fields | ClauseName::Select => self.fields.clear(),
            ClauseName::Count => self.count = false,
            ClauseName::Distinct => self.distinct.clear(),
            ClauseName::Where => self.where_.clear(),
            ClauseName::Join => self.join.clear(),
            ClauseName::Group => self.group.clear(),
            ClauseName::Having => self.having.clear(),
            ClauseName::Order => self.order.clear(),
            ClauseName::Limit => self.limit.clear(),
            ClauseName::Page => self.page.clear(),
            ClauseName::PageSize => self.page_size.clear(),
            ClauseName::Start => self.start.clear(),
            ClauseName::Data | ClauseName::Set => self.data.clear(),
            ClauseName::Values => self.values.clear(),
            ClauseName::Bind => self.bind.clear(),
        }
        self
    }

    fn route(&mut self, name: ClauseName, value: ClauseValue, replace: bool) -> DbResult<()> {
        if let Some(ty) = name.statement_type() {
            self.ty = Some(ty);
            if name == ClauseName::Count {
                self.count = true;
            }
            if is_flag(&value) {
                return Ok(());
            }
            let canonical = match name {
                ClauseName::Select | ClauseName::Count => ClauseName::Fields,
                _ => ClauseName::Table,
            };
            return self.route_slot(canonical, value, replace);
        }
        self.route_slot(name, value, replace)
    }

    fn route_slot(&mut self, name: ClauseName, value: ClauseValue, replace: bool) -> DbResult<()> {
        match name {
            ClauseName::Table => set_strings(&mut self.table, name, value, replace),
            ClauseName::Fields => set_strings(&mut self.fields, name, value, replace),
            ClauseName::Group => set_strings(&mut self.group, name, value, replace),
            ClauseName::Order => set_strings(&mut self.order, name, value, replace),
            ClauseName::Distinct => set_scalars(&mut self.distinct, name, value, replace),
            ClauseName::Limit => set_scalars(&mut self.limit, name, value, replace),
            ClauseName::Page => set_scalars(&mut self.page, name, value, replace),
            ClauseName::PageSize => set_scalars(&mut self.page_size, name, value, replace),
            ClauseName::Start => set_scalars(&mut self.start, name, value, replace),
            ClauseName::Where => set_conditions(&mut self.where_, name, value, replace),
            ClauseName::Having => set_conditions(&mut self.having, name, value, replace),
            ClauseName::Join => self.route_join(value, replace),
            ClauseName::Data | ClauseName::Set => self.route_data(name, value, replace),
            ClauseName::Values => self.route_values(value, replace),
            ClauseName::Bind => self.route_bind(value, replace),
            ClauseName::Select
            | ClauseName::Insert
            | ClauseName::Update
            | ClauseName::Delete
            | ClauseName::Count => self.route(name, value, replace),
        }
    }

    fn route_join(&mut self, value: ClauseValue, replace: bool) -> DbResult<()> {
        let joins = match value {
            ClauseValue::Join(j) => vec![j],
            ClauseValue::Scalar(SqlValue::List(items)) => {
                let joins = items.into_iter().map(|v| Join::Raw(v.to_string())).collect();
                self.join.clear();
                joins
            }
            ClauseValue::Scalar(v) => vec![Join::Raw(v.to_string())],
            ClauseValue::Record(r) => vec![join_from_record(r)?],
            ClauseValue::Records(rs) => rs
                .into_iter()
                .map(join_from_record)
                .collect::<DbResult<Vec<_>>>()?,
            ClauseValue::Condition(_) => {
                return Err(DbError::invalid_value(
                    ClauseName::Join,
                    "a condition is not a join",
                ));
            }
        };
        if replace {
            self.join.clear();
        }
        self.join.extend(joins);
        Ok(())
    }

    fn route_data(&mut self, name: ClauseName, value: ClauseValue, replace: bool) -> DbResult<()> {
        if replace {
            self.data.clear();
        }
        match value {
            ClauseValue::Record(r) => self.merge_data(r),
            ClauseValue::Records(rs) => rs.into_iter().for_each(|r| self.merge_data(r)),
            ClauseValue::Scalar(SqlValue::Null) => {}
            ClauseValue::Scalar(v) => self.data.push(DataEntry::Raw(v.to_string())),
            ClauseValue::Condition(_) | ClauseValue::Join(_) => {
                return Err(DbError::invalid_value(name, "expected key-value data"));
            }
        }
        Ok(())
    }

    fn merge_data(&mut self, record: Record) {
        for (k, v) in record {
            let existing = self.data.iter_mut().find_map(|e| match e {
                DataEntry::Pair(key, value) if *key == k => Some(value),
                _ => None,
            });
            match existing {
                Some(slot) => *slot = v,
                None => self.data.push(DataEntry::Pair(k, v)),
            }
        }
    }

    fn route_values(&mut self, value: ClauseValue, replace: bool) -> DbResult<()> {
        if replace {
            self.values.clear();
        }
        match value {
            ClauseValue::Record(r) => self.values.push(InsertRow::Named(r)),
            ClauseValue::Records(rs) => self.values.extend(rs.into_iter().map(InsertRow::Named)),
            ClauseValue::Scalar(SqlValue::List(items)) => {
                self.values.push(InsertRow::Positional(items))
            }
            ClauseValue::Scalar(v) => self.values.push(InsertRow::Positional(vec![v])),
            ClauseValue::Condition(_) | ClauseValue::Join(_) => {
                return Err(DbError::invalid_value(
                    ClauseName::Values,
                    "expected a row of values",
                ));
            }
        }
        Ok(())
    }

    fn route_bind(&mut self, value: ClauseValue, replace: bool) -> DbResult<()> {
        match value {
            ClauseValue::Scalar(SqlValue::List(items)) => {
                self.bind.clear();
                self.bind.extend(items.into_iter().map(Bind::Positional));
            }
            ClauseValue::Scalar(v) => {
                if replace {
                    self.bind.clear();
                }
                self.bind.push(Bind::Positional(v));
            }
            ClauseValue::Record(r) => {
                if replace {
                    self.bind.clear();
                }
                self.bind
                    .extend(r.into_iter().map(|(k, v)| Bind::Named(k, v)));
            }
            _ => {
                return Err(DbError::invalid_value(
                    ClauseName::Bind,
                    "expected values or named values",
                ));
            }
        }
        Ok(())
    }

    // ---- 元信息 ----

    /// 语句类型，未设置时为 select。
    pub fn ty(&self) -> StatementType {
        self.ty.unwrap_or_default()
    }

    pub fn set_type(&mut self, ty: StatementType) -> &mut Self {
        self.ty = Some(ty);
        self
    }

    /// 为 true 时跳过自动的输入整理与唯一性校验。
    pub fn formatted(&self) -> bool {
        self.formatted
    }

    pub fn set_formatted(&mut self, formatted: bool) -> &mut Self {
        self.formatted = formatted;
        self
    }

    pub fn is_count(&self) -> bool {
        self.count
    }

    /// 任一表引用带别名，或存在 join。
    pub fn has_alias(&self) -> bool {
        !self.join.is_empty()
            || self.table.len() > 1
            || self
                .table
                .iter()
                .any(|t| TableRef::parse(t).alias.is_some())
    }

    pub fn tables(&self) -> &[String] {
        &self.table
    }

    pub fn where_conditions(&self) -> &[Condition] {
        &self.where_
    }

    pub fn where_conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.where_
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    // ---- 类型化的链式设置 ----

    pub fn table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table.extend(split_top_level(&table.into()));
        self
    }

    /// 追加列；逗号分隔的字符串会被拆分（括号与引号内的逗号保留）。
    pub fn field(&mut self, field: impl Into<String>) -> &mut Self {
        self.fields.extend(split_top_level(&field.into()));
        self
    }

    /// 整体替换列。
    pub fn fields<T: IntoStrings>(&mut self, fields: T) -> &mut Self {
        self.fields = split_all(collect_into_strings(fields));
        self
    }

    pub fn distinct(&mut self, distinct: bool) -> &mut Self {
        self.distinct = vec![SqlValue::Bool(distinct)];
        self
    }

    /// `SELECT DISTINCT <cols>`。
    pub fn distinct_fields(&mut self, fields: impl Into<String>) -> &mut Self {
        self.distinct
            .extend(split_top_level(&fields.into()).into_iter().map(SqlValue::from));
        self
    }

    pub fn where_(&mut self, condition: impl Into<Condition>) -> &mut Self {
        let c = condition.into();
        if !c.is_empty() {
            self.where_.push(c);
        }
        self
    }

    pub fn where_op(
        &mut self,
        key: impl Into<String>,
        op: &str,
        value: impl Into<SqlValue>,
    ) -> &mut Self {
        self.where_(Condition::new().op(key, op, value))
    }

    pub fn where_eq(&mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.where_(Condition::new().eq(key, value))
    }

    pub fn having(&mut self, condition: impl Into<Condition>) -> &mut Self {
        let c = condition.into();
        if !c.is_empty() {
            self.having.push(c);
        }
        self
    }

    pub fn join(&mut self, table: impl Into<String>, on: impl Into<String>) -> &mut Self {
        self.join.push(Join::new(table, on));
        self
    }

    pub fn left_join(&mut self, table: impl Into<String>, on: impl Into<String>) -> &mut Self {
        self.join
            .push(Join::new(table, on).with_option(JoinOption::LeftJoin));
        self
    }

    pub fn right_join(&mut self, table: impl Into<String>, on: impl Into<String>) -> &mut Self {
        self.join
            .push(Join::new(table, on).with_option(JoinOption::RightJoin));
        self
    }

    pub fn join_with(&mut self, join: Join) -> &mut Self {
        self.join.push(join);
        self
    }

    /// 原样 join 片段，如 `LEFT JOIN t ON ...`。
    pub fn join_raw(&mut self, join: impl Into<String>) -> &mut Self {
        self.join.push(Join::Raw(join.into()));
        self
    }

    pub fn group(&mut self, group: impl Into<String>) -> &mut Self {
        self.group.extend(split_top_level(&group.into()));
        self
    }

    pub fn order(&mut self, order: impl Into<String>) -> &mut Self {
        self.order.extend(split_top_level(&order.into()));
        self
    }

    /// 只限制条数。
    pub fn limit(&mut self, count: u64) -> &mut Self {
        self.limit = vec![SqlValue::U64(count)];
        self
    }

    pub fn limit_range(&mut self, offset: u64, count: u64) -> &mut Self {
        self.limit = vec![SqlValue::String(format!("{offset},{count}").into())];
        self
    }

    /// `"count"` 或 `"offset,count"`。
    pub fn limit_raw(&mut self, limit: impl Into<String>) -> &mut Self {
        self.limit = vec![SqlValue::String(limit.into().into())];
        self
    }

    /// 从 1 开始的页码。
    pub fn page(&mut self, page: u64) -> &mut Self {
        self.page = vec![SqlValue::U64(page)];
        self
    }

    pub fn page_size(&mut self, size: u64) -> &mut Self {
        self.page_size = vec![SqlValue::U64(size)];
        self
    }

    pub fn start(&mut self, start: u64) -> &mut Self {
        self.start = vec![SqlValue::U64(start)];
        self
    }

    /// 合并写入数据：同名列覆盖。
    pub fn data(&mut self, data: Record) -> &mut Self {
        self.merge_data(data);
        self
    }

    pub fn data_value(&mut self, key: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        let mut r = Record::new();
        r.insert(key, value);
        self.merge_data(r);
        self
    }

    /// 原样 SET 片段，如 `hits=hits+1`。
    pub fn data_expr(&mut self, expr: impl Into<String>) -> &mut Self {
        self.data.push(DataEntry::Raw(expr.into()));
        self
    }

    /// 追加一行插入数据。
    pub fn values(&mut self, row: Record) -> &mut Self {
        self.values.push(InsertRow::Named(row));
        self
    }

    pub fn values_many(&mut self, rows: impl IntoIterator<Item = Record>) -> &mut Self {
        self.values.extend(rows.into_iter().map(InsertRow::Named));
        self
    }

    /// 不带列名的一行。
    pub fn values_list(&mut self, row: impl IntoIterator<Item = SqlValue>) -> &mut Self {
        self.values
            .push(InsertRow::Positional(row.into_iter().collect()));
        self
    }

    pub fn bind(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.bind.push(Bind::Positional(value.into()));
        self
    }

    pub fn bind_named(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        self.bind.push(Bind::Named(name.into(), value.into()));
        self
    }

    pub fn select(&mut self, fields: impl Into<String>) -> &mut Self {
        self.ty = Some(StatementType::Select);
        self.field(fields)
    }

    pub fn insert(&mut self, table: impl Into<String>) -> &mut Self {
        self.ty = Some(StatementType::Insert);
        self.table(table)
    }

    pub fn update(&mut self, table: impl Into<String>) -> &mut Self {
        self.ty = Some(StatementType::Update);
        self.table(table)
    }

    pub fn delete(&mut self, table: impl Into<String>) -> &mut Self {
        self.ty = Some(StatementType::Delete);
        self.table(table)
    }

    /// 统计查询：未指定列时编译为 `COUNT(*)`。
    pub fn count(&mut self) -> &mut Self {
        self.ty = Some(StatementType::Select);
        self.count = true;
        self
    }
}

/// 类型伪子句上的 `true`/空值只切换语句类型。
fn is_flag(value: &ClauseValue) -> bool {
    matches!(
        value,
        ClauseValue::Scalar(SqlValue::Bool(true)) | ClauseValue::Scalar(SqlValue::Null)
    )
}

fn value_to_strings(v: SqlValue, out: &mut Vec<String>) {
    match v {
        SqlValue::Null => {}
        SqlValue::String(s) => out.extend(split_top_level(&s)),
        SqlValue::List(items) => items.into_iter().for_each(|i| value_to_strings(i, out)),
        other => out.push(other.to_string()),
    }
}

fn split_all(items: Vec<String>) -> Vec<String> {
    items.iter().flat_map(|s| split_top_level(s)).collect()
}

fn set_strings(
    slot: &mut Vec<String>,
    name: ClauseName,
    value: ClauseValue,
    replace: bool,
) -> DbResult<()> {
    let ClauseValue::Scalar(v) = value else {
        return Err(DbError::invalid_value(name, "expected a name or a list of names"));
    };
    if replace || v.is_list() {
        slot.clear();
    }
    value_to_strings(v, slot);
    Ok(())
}

fn set_scalars(
    slot: &mut Vec<SqlValue>,
    name: ClauseName,
    value: ClauseValue,
    replace: bool,
) -> DbResult<()> {
    match value {
        ClauseValue::Scalar(SqlValue::List(items)) => *slot = items,
        ClauseValue::Scalar(v) => {
            if replace {
                slot.clear();
            }
            slot.push(v);
        }
        _ => return Err(DbError::invalid_value(name, "expected a scalar value")),
    }
    Ok(())
}

fn set_conditions(
    slot: &mut Vec<Condition>,
    name: ClauseName,
    value: ClauseValue,
    replace: bool,
) -> DbResult<()> {
    let condition = match value {
        ClauseValue::Condition(c) => c,
        ClauseValue::Record(r) => Condition::from(r),
        ClauseValue::Scalar(SqlValue::String(s)) => Condition::raw(s.into_owned()),
        ClauseValue::Scalar(SqlValue::Raw(s)) => Condition::raw(s),
        ClauseValue::Scalar(SqlValue::Null) => Condition::new(),
        ClauseValue::Scalar(v @ (SqlValue::I64(_) | SqlValue::U64(_) | SqlValue::List(_))) => {
            Condition {
                terms: vec![Term::PrimaryKey(v)],
                ..Condition::default()
            }
        }
        _ => return Err(DbError::invalid_value(name, "expected a condition")),
    };
    if replace {
        slot.clear();
    }
    if !condition.is_empty() {
        slot.push(condition);
    }
    Ok(())
}

/// `{table, alias, on, type}` 形式的 join 记录。
fn join_from_record(mut r: Record) -> DbResult<Join> {
    let text = |v: Option<SqlValue>| v.filter(|v| !v.is_null()).map(|v| v.to_string());
    let table = text(r.remove("table"))
        .ok_or_else(|| DbError::invalid_value(ClauseName::Join, "join requires `table`"))?;
    let on = text(r.remove("on")).unwrap_or_default();
    let alias = text(r.remove("alias"));
    let option = match text(r.remove("type")).as_deref().map(str::to_ascii_lowercase) {
        None => JoinOption::InnerJoin,
        Some(t) => match t.as_str() {
            "inner" => JoinOption::InnerJoin,
            "left" => JoinOption::LeftJoin,
            "left outer" => JoinOption::LeftOuterJoin,
            "right" => JoinOption::RightJoin,
            "right outer" => JoinOption::RightOuterJoin,
            "full" => JoinOption::FullJoin,
            "full outer" => JoinOption::FullOuterJoin,
            _ => {
                return Err(DbError::invalid_value(
                    ClauseName::Join,
                    format!("unknown join type `{t}`"),
                ));
            }
        },
    };
    Ok(Join::Table {
        option,
        table,
        alias,
        on,
    })
}
