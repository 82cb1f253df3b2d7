#[cfg(test)]
mod tests {
    use crate::condition::{Condition, Glue, Operand};
    use crate::error::DbError;
    use crate::parser::Parser;
    use crate::query::Query;
    use crate::value::{SqlValue, raw};
    use pretty_assertions::assert_eq;

    fn where_sql(c: Condition) -> String {
        let mut q = Query::new();
        q.table("t").where_(c);
        let sql = Parser::default().parse(q).unwrap();
        sql.trim_start_matches("SELECT * FROM t WHERE ").to_string()
    }

    fn where_err(c: Condition) -> DbError {
        let mut q = Query::new();
        q.table("t").where_(c);
        Parser::default().parse(q).unwrap_err()
    }

    #[test]
    fn between_accepts_pairs_and_strings() {
        assert_eq!(
            where_sql(Condition::new().field("age", Operand::between(1, 10))),
            "(age BETWEEN 1 AND 10)"
        );
        assert_eq!(
            where_sql(Condition::new().op("age", "not between", "1, 10")),
            "(age NOT BETWEEN 1 AND 10)"
        );
        assert!(where_err(Condition::new().op("age", "between", "1")).is_validation());
    }

    #[test]
    fn in_variants() {
        assert_eq!(
            where_sql(Condition::new().op("id", "in", "1,2,a")),
            "(id IN (1,2,'a'))"
        );
        assert_eq!(
            where_sql(Condition::new().field("id", Operand::not_in(vec![4_i64, 5]))),
            "(id NOT IN (4,5))"
        );
        assert_eq!(
            where_sql(Condition::new().field("id", Operand::in_(Vec::<i64>::new()))),
            "(0 = 1)"
        );
        assert_eq!(
            where_sql(Condition::new().field("id", Operand::not_in(Vec::<i64>::new()))),
            "(0 = 0)"
        );
        assert_eq!(
            where_sql(Condition::new().op("id", "in", "select uid from vip")),
            "(id IN (select uid from vip))"
        );
        assert_eq!(
            where_sql(Condition::new().field("id", Operand::in_exp("(SELECT 1)"))),
            "(id IN (SELECT 1))"
        );
    }

    #[test]
    fn exp_rejects_value_lists() {
        let err = where_err(Condition::new().op("id", "exp", vec![1_i64, 2]));
        assert!(err.is_validation());
    }

    #[test]
    fn exp_and_bind() {
        assert_eq!(
            where_sql(Condition::new().field("created", Operand::exp("> NOW()"))),
            "(created > NOW())"
        );
        assert_eq!(
            where_sql(Condition::new().eq("created", raw("NOW()"))),
            "(created = NOW())"
        );
        assert_eq!(
            where_sql(Condition::new().field("user.id", Operand::bind(""))),
            "(user.id = :user_id)"
        );
        assert_eq!(
            where_sql(Condition::new().field("id", Operand::bind("uid"))),
            "(id = :uid)"
        );
    }

    #[test]
    fn multi_column_keys() {
        assert_eq!(
            where_sql(Condition::new().field("name|email", Operand::like("x"))),
            "(name LIKE '%x%' OR email LIKE '%x%')"
        );
        assert_eq!(
            where_sql(Condition::new().eq("a&b", 1)),
            "(a = 1 AND b = 1)"
        );
    }

    #[test]
    fn loose_list_shapes() {
        let gt = SqlValue::from(vec![SqlValue::from("gt"), SqlValue::from(3)]);
        assert_eq!(where_sql(Condition::new().field("age", gt)), "(age > 3)");

        let range = SqlValue::List(vec![
            SqlValue::from(vec![SqlValue::from("gt"), SqlValue::from(1)]),
            SqlValue::from(vec![SqlValue::from("lt"), SqlValue::from(9)]),
            SqlValue::from("or"),
        ]);
        assert_eq!(
            where_sql(Condition::new().field("age", range)),
            "(age > 1 OR age < 9)"
        );
    }

    #[test]
    fn group_glue() {
        assert_eq!(
            where_sql(Condition::new().eq("a", 1).eq("b", 2).glue(Glue::Xor)),
            "(a = 1 XOR b = 2)"
        );
        assert_eq!(
            where_sql(
                Condition::new()
                    .eq("a", 1)
                    .field("b", Operand::any([Operand::eq(2), Operand::op("gt", 5)]))
            ),
            "(a = 1 AND (b = 2 OR b > 5))"
        );
    }

    #[test]
    fn operator_errors() {
        assert!(matches!(
            where_err(Condition::new().op("id", "approx", 1)),
            DbError::UnknownOperator(op) if op == "approx"
        ));
        assert!(where_err(Condition::new().field("name", Operand::like("  "))).is_validation());
    }
}
