//! 宏与参数收集工具：`record!` 构造行数据，`IntoStrings` 让列名参数可以是字符串、数组或 `Vec`。

/// 构造 [`Record`](crate::record::Record)：`record! { "id" => 1, "name" => "a" }`。
#[macro_export]
macro_rules! record {
    () => {
        $crate::record::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::record::Record::new();
        $(
            record.insert($key, $value);
        )+
        record
    }};
}

/// 为持有待执行 `Query` 的类型生成链式子句 setter，`$pending` 是返回 `&mut Query` 的方法名。
#[doc(hidden)]
#[macro_export]
macro_rules! __forward_query_setters {
    ($pending:ident) => {
        pub fn table(&mut self, table: impl Into<String>) -> &mut Self {
            self.$pending().table(table);
            self
        }

        pub fn field(&mut self, field: impl Into<String>) -> &mut Self {
            self.$pending().field(field);
            self
        }

        pub fn fields<T: $crate::macros::IntoStrings>(&mut self, fields: T) -> &mut Self {
            self.$pending().fields(fields);
            self
        }

        pub fn distinct(&mut self, distinct: bool) -> &mut Self {
            self.$pending().distinct(distinct);
            self
        }

        pub fn distinct_fields(&mut self, fields: impl Into<String>) -> &mut Self {
            self.$pending().distinct_fields(fields);
            self
        }

        pub fn where_(&mut self, condition: impl Into<$crate::condition::Condition>) -> &mut Self {
            self.$pending().where_(condition);
            self
        }

        pub fn where_op(
            &mut self,
            key: impl Into<String>,
            op: &str,
            value: impl Into<$crate::value::SqlValue>,
        ) -> &mut Self {
            self.$pending().where_op(key, op, value);
            self
        }

        pub fn where_eq(
            &mut self,
            key: impl Into<String>,
            value: impl Into<$crate::value::SqlValue>,
        ) -> &mut Self {
            self.$pending().where_eq(key, value);
            self
        }

        pub fn having(&mut self, condition: impl Into<$crate::condition::Condition>) -> &mut Self {
            self.$pending().having(condition);
            self
        }

        pub fn join(&mut self, table: impl Into<String>, on: impl Into<String>) -> &mut Self {
            self.$pending().join(table, on);
            self
        }

        pub fn left_join(&mut self, table: impl Into<String>, on: impl Into<String>) -> &mut Self {
            self.$pending().left_join(table, on);
            self
        }

        pub fn right_join(&mut self, table: impl Into<String>, on: impl Into<String>) -> &mut Self {
            self.$pending().right_join(table, on);
            self
        }

        pub fn join_with(&mut self, join: $crate::clause::Join) -> &mut Self {
            self.$pending().join_with(join);
            self
        }

        pub fn group(&mut self, group: impl Into<String>) -> &mut Self {
            self.$pending().group(group);
            self
        }

        pub fn order(&mut self, order: impl Into<String>) -> &mut Self {
            self.$pending().order(order);
            self
        }

        pub fn limit(&mut self, count: u64) -> &mut Self {
            self.$pending().limit(count);
            self
        }

        pub fn limit_range(&mut self, offset: u64, count: u64) -> &mut Self {
            self.$pending().limit_range(offset, count);
            self
        }

        pub fn page(&mut self, page: u64) -> &mut Self {
            self.$pending().page(page);
            self
        }

        pub fn page_size(&mut self, size: u64) -> &mut Self {
            self.$pending().page_size(size);
            self
        }

        pub fn data(&mut self, data: $crate::record::Record) -> &mut Self {
            self.$pending().data(data);
            self
        }

        pub fn data_value(
            &mut self,
            key: impl Into<String>,
            value: impl Into<$crate::value::SqlValue>,
        ) -> &mut Self {
            self.$pending().data_value(key, value);
            self
        }

        pub fn data_expr(&mut self, expr: impl Into<String>) -> &mut Self {
            self.$pending().data_expr(expr);
            self
        }

        pub fn values(&mut self, row: $crate::record::Record) -> &mut Self {
            self.$pending().values(row);
            self
        }

        pub fn values_many(
            &mut self,
            rows: impl IntoIterator<Item = $crate::record::Record>,
        ) -> &mut Self {
            self.$pending().values_many(rows);
            self
        }

        pub fn bind(&mut self, value: impl Into<$crate::value::SqlValue>) -> &mut Self {
            self.$pending().bind(value);
            self
        }

        pub fn bind_named(
            &mut self,
            name: impl Into<String>,
            value: impl Into<$crate::value::SqlValue>,
        ) -> &mut Self {
            self.$pending().bind_named(name, value);
            self
        }

        /// 跳过输入整理与唯一性校验。
        pub fn set_formatted(&mut self, formatted: bool) -> &mut Self {
            self.$pending().set_formatted(formatted);
            self
        }

        /// 按子句名设置；未知子句或取值形状不符时报错。
        pub fn set(
            &mut self,
            name: $crate::clause::ClauseName,
            value: impl Into<$crate::clause::ClauseValue>,
        ) -> $crate::error::DbResult<&mut Self> {
            self.$pending().set(name, value)?;
            Ok(self)
        }

        pub fn set_named(
            &mut self,
            name: &str,
            value: impl Into<$crate::clause::ClauseValue>,
        ) -> $crate::error::DbResult<&mut Self> {
            self.$pending().set_named(name, value)?;
            Ok(self)
        }
    };
}

pub trait IntoStrings {
    fn extend_into_strings(self, dst: &mut Vec<String>);
}

impl IntoStrings for String {
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.push(self);
    }
}

impl<'a> IntoStrings for &'a str {
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.push(self.to_string());
    }
}

impl<const N: usize, T> IntoStrings for [T; N]
where
    T: Into<String>,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.into_iter().map(Into::into));
    }
}

impl<'a, T> IntoStrings for &'a [T]
where
    T: Into<String> + Clone,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.iter().cloned().map(Into::into));
    }
}

impl<T> IntoStrings for Vec<T>
where
    T: Into<String>,
{
    fn extend_into_strings(self, dst: &mut Vec<String>) {
        dst.extend(self.into_iter().map(Into::into));
    }
}

pub(crate) fn collect_into_strings<T>(value: T) -> Vec<String>
where
    T: IntoStrings,
{
    let mut dst = Vec::new();
    value.extend_into_strings(&mut dst);
    dst
}
