#[cfg(test)]
mod tests {
    use crate::flavor::Flavor;
    use crate::interpolate::{format_value, substitute_binds};
    use crate::query::Bind;
    use crate::value::{SqlDateTime, SqlValue, raw};
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    #[test]
    fn scalars() {
        let f = |v: SqlValue| format_value(&v, Flavor::MySQL).unwrap();
        assert_eq!(f(SqlValue::Null), "NULL");
        assert_eq!(f(true.into()), "1");
        assert_eq!(f(false.into()), "0");
        assert_eq!(f((-3_i64).into()), "-3");
        assert_eq!(f(1.5_f64.into()), "1.5");
        assert_eq!(f(f64::NAN.into()), "NULL");
        assert_eq!(f(vec![1_i64, 2].into()), "1,2");
        assert_eq!(f(raw("a + 1")), "a + 1");
    }

    #[test]
    fn strings_per_flavor() {
        let v = SqlValue::from("it's a \\ test\n");
        assert_eq!(
            format_value(&v, Flavor::MySQL).unwrap(),
            "'it\\'s a \\\\ test\\n'"
        );
        assert_eq!(
            format_value(&v, Flavor::PostgreSQL).unwrap(),
            "E'it\\'s a \\\\ test\\n'"
        );
        assert_eq!(
            format_value(&v, Flavor::SQLite).unwrap(),
            "'it''s a \\ test\n'"
        );
        assert_eq!(
            format_value(&v, Flavor::Oracle).unwrap(),
            "'it''s a \\ test\n'"
        );
    }

    #[test]
    fn bytes_per_flavor() {
        let v = SqlValue::Bytes(b"abc".to_vec());
        let cases = vec![
            (Flavor::MySQL, "_binary'abc'"),
            (Flavor::PostgreSQL, "E'\\\\x616263'::bytea"),
            (Flavor::SQLite, "X'616263'"),
            (Flavor::SQLServer, "0x616263"),
            (Flavor::Oracle, "hextoraw('616263')"),
        ];
        for (flavor, expected) in cases {
            assert_eq!(format_value(&v, flavor).unwrap(), expected);
        }
        assert_eq!(
            format_value(&SqlValue::Bytes(Vec::new()), Flavor::MySQL).unwrap(),
            "NULL"
        );
    }

    #[test]
    fn datetimes_per_flavor() {
        let v = SqlValue::from(datetime!(2024-01-02 03:04:05.123456 UTC));
        let cases = vec![
            (Flavor::MySQL, "'2024-01-02 03:04:05.123456'"),
            (Flavor::PostgreSQL, "'2024-01-02 03:04:05.123456 +00:00'"),
            (Flavor::SQLite, "'2024-01-02 03:04:05.123'"),
            (Flavor::SQLServer, "'2024-01-02 03:04:05.123456 +00:00'"),
            (
                Flavor::Oracle,
                "to_timestamp('2024-01-02 03:04:05.123456', 'YYYY-MM-DD HH24:MI:SS.FF')",
            ),
        ];
        for (flavor, expected) in cases {
            assert_eq!(format_value(&v, flavor).unwrap(), expected);
        }

        let abbr = SqlValue::DateTime(
            SqlDateTime::new(datetime!(2024-01-02 03:04:05 UTC)).with_tz_abbr("UTC"),
        );
        assert_eq!(
            format_value(&abbr, Flavor::PostgreSQL).unwrap(),
            "'2024-01-02 03:04:05.000000 UTC'"
        );
    }

    #[test]
    fn binds_skip_literals_and_casts() {
        let binds = vec![
            Bind::Positional(SqlValue::from(1)),
            Bind::Named("name".to_string(), SqlValue::from("x")),
        ];
        let sql = "SELECT id::text FROM t WHERE a = ? AND b = ':name' AND c = :name AND d = :other";
        assert_eq!(
            substitute_binds(sql, &binds, Flavor::PostgreSQL).unwrap(),
            "SELECT id::text FROM t WHERE a = 1 AND b = ':name' AND c = E'x' AND d = :other"
        );
    }

    #[test]
    fn question_marks_stay_without_positional_binds() {
        let binds = vec![Bind::Named("a".to_string(), SqlValue::from(2))];
        assert_eq!(
            substitute_binds("x = ? AND y = :a", &binds, Flavor::MySQL).unwrap(),
            "x = ? AND y = 2"
        );
        assert_eq!(substitute_binds("x = ?", &[], Flavor::MySQL).unwrap(), "x = ?");
    }

    #[test]
    fn escaped_quotes_inside_literals() {
        let binds = vec![Bind::Positional(SqlValue::from(5))];
        assert_eq!(
            substitute_binds("a = 'it\\'s ?' AND b = ?", &binds, Flavor::MySQL).unwrap(),
            "a = 'it\\'s ?' AND b = 5"
        );
        assert_eq!(
            substitute_binds("a = 'it''s ?' AND b = ?", &binds, Flavor::SQLite).unwrap(),
            "a = 'it''s ?' AND b = 5"
        );
    }

    #[test]
    fn too_few_binds_is_validation_error() {
        let binds = vec![Bind::Positional(SqlValue::from(5))];
        let err = substitute_binds("a = ? AND b = ?", &binds, Flavor::MySQL).unwrap_err();
        assert!(err.is_validation());
    }
}
