#[cfg(test)]
mod tests {
    use crate::clause::{ClauseName, Join, JoinOption, StatementType};
    use crate::condition::Term;
    use crate::error::DbError;
    use crate::query::{Bind, DataEntry, InsertRow, Query};
    use crate::record;
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_clause_name_is_rejected() {
        let mut q = Query::new();
        let err = q.set_named("frobnicate", 1).unwrap_err();
        assert!(matches!(err, DbError::UnsupportedClause(name) if name == "frobnicate"));
    }

    #[test]
    fn clause_aliases_resolve() {
        let mut q = Query::new();
        q.set_named("from", "users")
            .unwrap()
            .set_named("field", "id")
            .unwrap()
            .set_named("num", 15)
            .unwrap();
        assert_eq!(q.table, vec!["users"]);
        assert_eq!(q.fields, vec!["id"]);
        assert_eq!(q.page_size, vec![SqlValue::I64(15)]);
    }

    #[test]
    fn string_slots_append_and_lists_replace() {
        let mut q = Query::new();
        q.set(ClauseName::Fields, "id, CONCAT(a,b) AS ab").unwrap();
        q.set(ClauseName::Fields, "age").unwrap();
        assert_eq!(q.fields, vec!["id", "CONCAT(a,b) AS ab", "age"]);

        q.set(ClauseName::Fields, vec!["x", "y"]).unwrap();
        assert_eq!(q.fields, vec!["x", "y"]);

        q.set_raw(ClauseName::Fields, "z").unwrap();
        assert_eq!(q.fields, vec!["z"]);
    }

    #[test]
    fn statement_type_clauses() {
        let mut q = Query::new();
        assert_eq!(q.ty(), StatementType::Select);

        q.set(ClauseName::Insert, "users").unwrap();
        assert_eq!(q.ty(), StatementType::Insert);
        assert_eq!(q.tables(), ["users".to_string()]);

        let mut q = Query::new();
        q.set(ClauseName::Delete, true).unwrap();
        assert_eq!(q.ty(), StatementType::Delete);
        assert!(q.tables().is_empty());

        let mut q = Query::new();
        q.set(ClauseName::Count, true).unwrap();
        assert!(q.is_count());
        assert_eq!(q.ty(), StatementType::Select);
    }

    #[test]
    fn data_merges_by_key() {
        let mut q = Query::new();
        q.data_value("a", 1)
            .data_expr("hits=hits+1")
            .data(record! { "a" => 2, "b" => 3 });
        assert_eq!(
            q.data,
            vec![
                DataEntry::Pair("a".into(), SqlValue::I64(2)),
                DataEntry::Raw("hits=hits+1".into()),
                DataEntry::Pair("b".into(), SqlValue::I64(3)),
            ]
        );
    }

    #[test]
    fn values_and_binds() {
        let mut q = Query::new();
        q.set(ClauseName::Values, record! { "id" => 1 }).unwrap();
        q.set(ClauseName::Values, vec![SqlValue::from(2), SqlValue::from("b")])
            .unwrap();
        assert_eq!(
            q.values,
            vec![
                InsertRow::Named(record! { "id" => 1 }),
                InsertRow::Positional(vec![SqlValue::I64(2), SqlValue::from("b")]),
            ]
        );

        q.set(ClauseName::Bind, vec![1_i64, 2]).unwrap();
        q.set(ClauseName::Bind, record! { "name" => "x" }).unwrap();
        assert_eq!(
            q.bind,
            vec![
                Bind::Positional(SqlValue::I64(1)),
                Bind::Positional(SqlValue::I64(2)),
                Bind::Named("name".into(), SqlValue::from("x")),
            ]
        );
    }

    #[test]
    fn where_routing() {
        let mut q = Query::new();
        q.set(ClauseName::Where, "a = 1").unwrap();
        q.set(ClauseName::Where, 7_i64).unwrap();
        q.set(ClauseName::Where, record! { "b" => 2 }).unwrap();
        assert_eq!(q.where_conditions().len(), 3);
        assert_eq!(q.where_[0].terms, vec![Term::Raw("a = 1".into())]);
        assert_eq!(q.where_[1].terms, vec![Term::PrimaryKey(SqlValue::I64(7))]);

        let err = q
            .set(ClauseName::Where, Join::new("t", "a = b"))
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidClauseValue { .. }));
    }

    #[test]
    fn join_from_record() {
        let mut q = Query::new();
        q.set(
            ClauseName::Join,
            record! { "table" => "orders", "alias" => "o", "on" => "o.uid = u.id", "type" => "left" },
        )
        .unwrap();
        assert_eq!(
            q.join,
            vec![
                Join::new("orders", "o.uid = u.id")
                    .with_option(JoinOption::LeftJoin)
                    .with_alias("o")
            ]
        );
        assert!(q.has_alias());
    }

    #[test]
    fn clones_are_independent() {
        let mut q = Query::new();
        q.table("users").where_eq("id", 1);
        let mut copy = q.clone();
        copy.where_eq("name", "x").limit(3);
        assert_eq!(q.where_conditions().len(), 1);
        assert!(q.limit.is_empty());
        assert_eq!(copy.where_conditions().len(), 2);
    }

    #[test]
    fn clear_clause_and_is_empty() {
        let mut q = Query::new();
        assert!(q.is_empty());
        q.table("users").order("id");
        q.clear_clause(ClauseName::Table).clear_clause(ClauseName::Order);
        assert!(q.is_empty());
    }

    #[test]
    fn from_clauses_builds_a_query() {
        let q = Query::from_clauses([
            (ClauseName::Table, "users"),
            (ClauseName::Order, "id desc"),
        ])
        .unwrap();
        assert_eq!(q.tables(), ["users".to_string()]);
        assert_eq!(q.order, vec!["id desc"]);
    }
}
