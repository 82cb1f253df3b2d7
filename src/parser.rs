//! Parser：把 [`Query`] 编译为最终 SQL 字符串。
//!
//! 编译分三步：预处理（默认列、分页、插入行展开、兜底条件）、校验、按语句模板渲染。
//! 模板中缺失的子句会被跳过，非空片段之间只保留一个空格。

use crate::clause::{Join, StatementType};
use crate::condition::Condition;
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::identifier::{Identifiers, TableRef, split_top_level};
use crate::interpolate::{collapse_whitespace, format_value, substitute_binds};
use crate::query::{Bind, DataEntry, InsertRow, Query};
use crate::record::Record;
use crate::string_builder::StringBuilder;
use crate::value::SqlValue;
use crate::where_clause::ConditionRenderer;

/// 没有 where 条件的 update/delete 会被加上这个永假条件。
pub const MUTATION_GUARD: &str = "1=0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Distinct,
    Fields,
    Table,
    Join,
    Where,
    Group,
    Having,
    Order,
    Limit,
    InsertFields,
    InsertValues,
    Set,
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Keyword(&'static str),
    Clause(Slot),
}

use Token::{Clause, Keyword};

const SELECT_TEMPLATE: &[Token] = &[
    Keyword("SELECT"),
    Clause(Slot::Distinct),
    Clause(Slot::Fields),
    Keyword("FROM"),
    Clause(Slot::Table),
    Clause(Slot::Join),
    Clause(Slot::Where),
    Clause(Slot::Group),
    Clause(Slot::Having),
    Clause(Slot::Order),
    Clause(Slot::Limit),
];

const INSERT_TEMPLATE: &[Token] = &[
    Keyword("INSERT INTO"),
    Clause(Slot::Table),
    Clause(Slot::InsertFields),
    Keyword("VALUES"),
    Clause(Slot::InsertValues),
];

const UPDATE_TEMPLATE: &[Token] = &[
    Keyword("UPDATE"),
    Clause(Slot::Table),
    Keyword("SET"),
    Clause(Slot::Set),
    Clause(Slot::Where),
    Clause(Slot::Order),
    Clause(Slot::Limit),
];

const DELETE_TEMPLATE: &[Token] = &[
    Keyword("DELETE FROM"),
    Clause(Slot::Table),
    Clause(Slot::Where),
    Clause(Slot::Order),
    Clause(Slot::Limit),
];

fn template(ty: StatementType) -> &'static [Token] {
    match ty {
        StatementType::Select => SELECT_TEMPLATE,
        StatementType::Insert => INSERT_TEMPLATE,
        StatementType::Update => UPDATE_TEMPLATE,
        StatementType::Delete => DELETE_TEMPLATE,
    }
}

/// 分页结果：`offset` 为 `None` 时只限制条数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Limit {
    offset: Option<u64>,
    count: u64,
}

/// 预处理后的语句，所有槽位都已规整。
#[derive(Debug, Default)]
struct Prepared {
    ty: StatementType,
    qualify: bool,
    tables: Vec<TableRef>,
    distinct: bool,
    count: bool,
    fields: Vec<String>,
    joins: Vec<Join>,
    where_: Vec<Condition>,
    group: Vec<String>,
    having: Vec<Condition>,
    order: Vec<String>,
    limit: Option<Limit>,
    set: Vec<DataEntry>,
    insert_fields: Vec<String>,
    insert_rows: Vec<Vec<SqlValue>>,
    binds: Vec<Bind>,
}

/// SQL 编译器。无内部可变状态，可复用。
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: DbConfig,
}

impl Parser {
    pub fn new(config: DbConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// 编译一条语句。`query` 被消费，失败时不产生任何部分输出。
    pub fn parse(&self, query: Query) -> DbResult<String> {
        let prepared = self.preprocess(query)?;
        check(&prepared)?;
        let sql = self.render(&prepared)?;
        let sql = substitute_binds(&sql, &prepared.binds, self.config.flavor)?;
        let sql = collapse_whitespace(&sql, self.config.flavor);
        tracing::debug!(statement = %prepared.ty, sql = %sql, "query compiled");
        Ok(sql)
    }

    fn preprocess(&self, q: Query) -> DbResult<Prepared> {
        let ty = q.ty();
        let mut p = Prepared {
            ty,
            qualify: ty == StatementType::Select && q.has_alias(),
            tables: q.table.iter().map(|t| TableRef::parse(t)).collect(),
            count: q.count,
            joins: q.join,
            group: q.group,
            having: q.having,
            order: q.order,
            binds: q.bind,
            ..Prepared::default()
        };

        match ty {
            StatementType::Select => {
                let mut distinct_cols = Vec::new();
                for v in &q.distinct {
                    match v {
                        SqlValue::Bool(flag) => p.distinct |= *flag,
                        SqlValue::Null => {}
                        other => {
                            p.distinct = true;
                            distinct_cols.extend(split_top_level(&other.to_string()));
                        }
                    }
                }
                distinct_cols.extend(q.fields);
                p.fields = distinct_cols;
                p.where_ = q.where_;
                p.limit = self.pagination(&q.limit, &q.page, &q.page_size, &q.start)?;
            }
            StatementType::Insert => {
                let (fields, rows) = insert_rows(q.data, q.values)?;
                p.insert_fields = fields;
                p.insert_rows = rows;
            }
            StatementType::Update | StatementType::Delete => {
                if ty == StatementType::Update {
                    p.set = update_entries(q.data, q.values)?;
                }
                p.where_ = q.where_;
                if p.where_.iter().all(Condition::is_empty) {
                    p.where_ = vec![Condition::raw(MUTATION_GUARD)];
                }
                if let Some(v) = q.limit.last() {
                    let limit = parse_limit(v)?;
                    if limit.offset.is_some() {
                        return Err(DbError::validation(format!(
                            "{ty} does not accept a limit offset"
                        )));
                    }
                    if !self.config.flavor.supports_mutation_limit() {
                        return Err(DbError::validation(format!(
                            "{} does not support LIMIT on {ty}",
                            self.config.flavor
                        )));
                    }
                    p.limit = Some(limit);
                }
            }
        }
        Ok(p)
    }

    /// 显式 `limit` 优先；否则由 `page`/`pagesize`/`start` 组合出偏移量。
    fn pagination(
        &self,
        limit: &[SqlValue],
        page: &[SqlValue],
        page_size: &[SqlValue],
        start: &[SqlValue],
    ) -> DbResult<Option<Limit>> {
        if let Some(v) = limit.last() {
            return parse_limit(v).map(Some);
        }
        let page = page.last().map(|v| number(v, "page")).transpose()?;
        let size = page_size
            .last()
            .map(|v| number(v, "pagesize"))
            .transpose()?;
        let start = start.last().map(|v| number(v, "start")).transpose()?;
        if page.is_none() && size.is_none() && start.is_none() {
            return Ok(None);
        }

        let size = size.unwrap_or(self.config.default_page_size);
        if size == 0 {
            return Err(DbError::validation("page size must be positive"));
        }
        let skipped = page.map_or(0, |p| p.max(1) - 1).saturating_mul(size);
        Ok(Some(Limit {
            offset: Some(skipped.saturating_add(start.unwrap_or(0))),
            count: size,
        }))
    }

    fn render(&self, p: &Prepared) -> DbResult<String> {
        let ids = match p.tables.first() {
            Some(main) if p.qualify => Identifiers::new(&self.config).qualify_with(main),
            _ => Identifiers::new(&self.config),
        };
        let conditions = ConditionRenderer::new(&ids, self.config.flavor);

        let mut buf = StringBuilder::new();
        for token in template(p.ty) {
            match token {
                Keyword(kw) => buf.write_leading(kw),
                Clause(slot) => {
                    let piece = self.render_slot(*slot, p, &ids, &conditions)?;
                    buf.write_leading(&piece);
                }
            }
        }
        Ok(buf.into_string())
    }

    fn render_slot(
        &self,
        slot: Slot,
        p: &Prepared,
        ids: &Identifiers<'_>,
        conditions: &ConditionRenderer<'_>,
    ) -> DbResult<String> {
        let flavor = self.config.flavor;
        let piece = match slot {
            Slot::Distinct if p.distinct && !p.count => "DISTINCT".to_string(),
            Slot::Distinct => String::new(),
            Slot::Fields => render_fields(p, ids),
            Slot::Table => p
                .tables
                .iter()
                .map(|t| ids.table(t))
                .collect::<Vec<_>>()
                .join(","),
            Slot::Join => p
                .joins
                .iter()
                .map(|j| render_join(j, ids))
                .collect::<Vec<_>>()
                .join(" "),
            Slot::Where => {
                let rendered = conditions.render_groups(&p.where_)?;
                if rendered.is_empty()
                    && matches!(p.ty, StatementType::Update | StatementType::Delete)
                {
                    format!("WHERE ({MUTATION_GUARD})")
                } else {
                    with_keyword("WHERE", rendered)
                }
            }
            Slot::Group => with_keyword("GROUP BY", join_keys(&p.group, |k| ids.key(k))),
            Slot::Having => with_keyword("HAVING", conditions.render_groups(&p.having)?),
            Slot::Order => with_keyword("ORDER BY", join_keys(&p.order, |k| ids.order_item(k))),
            Slot::Limit => p
                .limit
                .map(|l| flavor.limit_clause(l.offset, l.count))
                .unwrap_or_default(),
            Slot::InsertFields if p.insert_fields.is_empty() => String::new(),
            Slot::InsertFields => format!("({})", join_keys(&p.insert_fields, |k| ids.key(k))),
            Slot::InsertValues => {
                let mut rows = Vec::with_capacity(p.insert_rows.len());
                for row in &p.insert_rows {
                    let values = row
                        .iter()
                        .map(|v| format_value(v, flavor))
                        .collect::<DbResult<Vec<_>>>()?;
                    rows.push(format!("({})", values.join(",")));
                }
                rows.join(",")
            }
            Slot::Set => {
                let mut items = Vec::with_capacity(p.set.len());
                for entry in &p.set {
                    items.push(match entry {
                        DataEntry::Pair(k, v) => format!("{}={}", ids.key(k), format_value(v, flavor)?),
                        DataEntry::Raw(raw) => raw.clone(),
                    });
                }
                items.join(",")
            }
        };
        Ok(piece)
    }
}

fn check(p: &Prepared) -> DbResult<()> {
    if p.tables.is_empty() {
        return Err(DbError::validation(format!("{} requires a table", p.ty)));
    }
    match p.ty {
        StatementType::Insert if p.insert_rows.is_empty() => {
            Err(DbError::validation("insert requires at least one row of values"))
        }
        StatementType::Update if p.set.is_empty() => {
            Err(DbError::validation("update requires data to set"))
        }
        StatementType::Update | StatementType::Delete if p.where_.is_empty() => Err(
            DbError::validation(format!("{} requires a where condition", p.ty)),
        ),
        _ => Ok(()),
    }
}

fn render_fields(p: &Prepared, ids: &Identifiers<'_>) -> String {
    let keys = join_keys(&p.fields, |k| ids.key(k));
    match (p.count, keys.is_empty()) {
        (true, true) => "COUNT(*)".to_string(),
        (true, false) if p.distinct => format!("COUNT(DISTINCT {keys})"),
        (true, false) => format!("COUNT({keys})"),
        (false, true) => "*".to_string(),
        (false, false) => keys,
    }
}

fn render_join(join: &Join, ids: &Identifiers<'_>) -> String {
    match join {
        Join::Raw(raw) => raw.trim().to_string(),
        Join::Table {
            option,
            table,
            alias,
            on,
        } => {
            let mut table = TableRef::parse(table);
            if alias.is_some() {
                table.alias = alias.clone();
            }
            let on = on.trim();
            if on.is_empty() {
                format!("{} {}", option.as_str(), ids.table(&table))
            } else {
                format!("{} {} ON {on}", option.as_str(), ids.table(&table))
            }
        }
    }
}

fn join_keys(keys: &[String], f: impl Fn(&str) -> String) -> String {
    keys.iter().map(|k| f(k)).collect::<Vec<_>>().join(",")
}

fn with_keyword(keyword: &str, body: String) -> String {
    if body.is_empty() {
        body
    } else {
        format!("{keyword} {body}")
    }
}

fn number(v: &SqlValue, what: &str) -> DbResult<u64> {
    v.as_u64()
        .ok_or_else(|| DbError::validation(format!("invalid {what} value `{v}`")))
}

/// `limit` 取值：`n` 或 `"offset,count"`。
fn parse_limit(v: &SqlValue) -> DbResult<Limit> {
    if let Some(count) = v.as_u64() {
        return Ok(Limit {
            offset: None,
            count,
        });
    }
    let invalid = || DbError::validation(format!("invalid limit `{v}`"));
    let text = v.as_str().ok_or_else(invalid)?;
    let (offset, count) = text.split_once(',').ok_or_else(invalid)?;
    let offset = offset.trim().parse::<u64>().map_err(|_| invalid())?;
    let count = count.trim().parse::<u64>().map_err(|_| invalid())?;
    Ok(Limit {
        offset: Some(offset),
        count,
    })
}

/// 插入行展开：`data` 作为首行，其后是 `values` 各行。
///
/// 具名行以所有行的键并集为列（首次出现的顺序），缺失列补 `NULL`；
/// 位置行不产生列清单；两者不能混用。
fn insert_rows(
    data: Vec<DataEntry>,
    values: Vec<InsertRow>,
) -> DbResult<(Vec<String>, Vec<Vec<SqlValue>>)> {
    let mut rows = Vec::with_capacity(values.len() + 1);
    if !data.is_empty() {
        let mut first = Record::with_capacity(data.len());
        for entry in data {
            match entry {
                DataEntry::Pair(k, v) => {
                    first.insert(k, v);
                }
                DataEntry::Raw(raw) => {
                    return Err(DbError::validation(format!(
                        "raw data `{raw}` cannot be inserted"
                    )));
                }
            }
        }
        rows.push(InsertRow::Named(first));
    }
    rows.extend(values);

    let named = rows.iter().filter(|r| matches!(r, InsertRow::Named(_))).count();
    if named == 0 {
        let rows: Vec<Vec<SqlValue>> = rows
            .into_iter()
            .filter_map(|r| match r {
                InsertRow::Positional(values) => Some(values),
                InsertRow::Named(_) => None,
            })
            .collect();
        if rows.windows(2).any(|w| w[0].len() != w[1].len()) {
            return Err(DbError::validation(
                "positional insert rows must have the same length",
            ));
        }
        return Ok((Vec::new(), rows));
    }
    if named != rows.len() {
        return Err(DbError::validation(
            "cannot mix named and positional insert rows",
        ));
    }

    let mut fields: Vec<String> = Vec::new();
    for row in &rows {
        if let InsertRow::Named(r) = row {
            for k in r.keys() {
                if !fields.iter().any(|f| f == k) {
                    fields.push(k.to_string());
                }
            }
        }
    }
    let rows = rows
        .into_iter()
        .filter_map(|r| match r {
            InsertRow::Named(record) => Some(
                fields
                    .iter()
                    .map(|f| record.get(f).cloned().unwrap_or(SqlValue::Null))
                    .collect(),
            ),
            InsertRow::Positional(_) => None,
        })
        .collect();
    Ok((fields, rows))
}

/// update 的 SET 列表：`data` 加上 `values` 中的具名行（后者覆盖同名键）。
fn update_entries(data: Vec<DataEntry>, values: Vec<InsertRow>) -> DbResult<Vec<DataEntry>> {
    let mut entries = data;
    for row in values {
        let InsertRow::Named(record) = row else {
            return Err(DbError::validation("update cannot use positional values"));
        };
        for (k, v) in record {
            match entries
                .iter_mut()
                .find(|e| matches!(e, DataEntry::Pair(key, _) if *key == k))
            {
                Some(DataEntry::Pair(_, slot)) => *slot = v,
                _ => entries.push(DataEntry::Pair(k, v)),
            }
        }
    }
    Ok(entries)
}
