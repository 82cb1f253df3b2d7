//! 解析器与执行门面的配置。

use crate::flavor::Flavor;

/// 数据库配置：方言、表前缀、库名、标识符引号与默认分页大小。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub flavor: Flavor,
    /// 追加在裸表名前的前缀。
    pub table_prefix: String,
    /// 非空时裸表名会被限定为 `database.prefix_table`。
    pub database: Option<String>,
    pub quote_identifiers: bool,
    /// 只给了 `page`/`start` 而没有给每页条数时使用。
    pub default_page_size: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            flavor: Flavor::default(),
            table_prefix: String::new(),
            database: None,
            quote_identifiers: false,
            default_page_size: 20,
        }
    }
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flavor(mut self, flavor: Flavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn with_table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_quoted_identifiers(mut self, quote: bool) -> Self {
        self.quote_identifiers = quote;
        self
    }

    pub fn with_default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = size.max(1);
        self
    }
}
