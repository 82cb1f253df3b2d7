#[cfg(test)]
mod tests {
    use crate::clause::ClauseName;
    use crate::config::DbConfig;
    use crate::db::{Db, QueryResult};
    use crate::error::DbError;
    use crate::formatter::{DefaultIfNull, Trim, formatter};
    use crate::mock_adapter::MockAdapter;
    use crate::model::{Model, ModelOptions, ModelRegistry};
    use crate::record;
    use crate::value::SqlValue;
    use pretty_assertions::assert_eq;

    fn user_options() -> ModelOptions {
        ModelOptions::new("users")
            .with_fields(["id", "name", "email"])
            .with_unique(["email"])
            .with_input("name", Box::new(Trim))
            .with_output(
                "name",
                formatter("upper", |v: SqlValue| match v {
                    SqlValue::String(s) => SqlValue::from(s.to_uppercase()),
                    other => other,
                }),
            )
    }

    fn users(adapter: MockAdapter) -> Model<MockAdapter> {
        Model::new(Db::new(adapter, DbConfig::new()), user_options())
    }

    fn no_duplicates() -> Vec<crate::record::Record> {
        vec![record! { "COUNT(*)" => 0 }]
    }

    #[test]
    fn registry_builds_models() {
        let mut registry = ModelRegistry::new();
        assert!(registry.register(user_options()).is_none());
        assert!(registry.contains("users"));

        let model = registry
            .model("users", Db::new(MockAdapter::new(), DbConfig::new()))
            .unwrap();
        assert_eq!(model.options().primary_key, "id");

        let err = registry
            .model("posts", Db::new(MockAdapter::new(), DbConfig::new()))
            .unwrap_err();
        assert!(matches!(err, DbError::UnknownModel(name) if name == "posts"));
    }

    #[test]
    fn bare_values_target_the_primary_key() {
        let mut model = users(MockAdapter::new());
        model.where_(5_i64);
        assert_eq!(
            model.compile().unwrap(),
            "SELECT * FROM users WHERE (id = 5)"
        );

        model.set(ClauseName::Where, vec![1_i64, 2]).unwrap();
        assert_eq!(
            model.compile().unwrap(),
            "SELECT * FROM users WHERE (id IN (1,2))"
        );
    }

    #[test]
    fn find_by_id_formats_output() {
        let mut model = users(
            MockAdapter::new().with_rows(vec![record! { "id" => 5, "name" => "ann" }]),
        );
        let row = model.find_by_id(5).unwrap().unwrap();
        assert_eq!(row.get("name"), Some(&SqlValue::from("ANN")));
        assert_eq!(
            model.db().adapter().executed,
            vec!["SELECT * FROM users WHERE (id = 5) LIMIT 1"]
        );
    }

    #[test]
    fn add_filters_formats_and_checks_uniqueness() {
        let mut model = users(MockAdapter::new().with_rows(no_duplicates()));
        model.db_mut().adapter_mut().last_id = 7;

        let id = model
            .add(record! { "name" => "  bob ", "email" => "b@x", "junk" => 1 })
            .unwrap();
        assert_eq!(id, 7);
        assert_eq!(
            model.db().adapter().executed,
            vec![
                "SELECT COUNT(*) FROM users WHERE (email = 'b@x')",
                "INSERT INTO users (name,email) VALUES ('bob','b@x')",
            ]
        );
    }

    #[test]
    fn add_rejects_duplicates() {
        let mut model = users(MockAdapter::new().with_rows(vec![record! { "COUNT(*)" => 1 }]));
        let err = model.add(record! { "email" => "b@x" }).unwrap_err();
        assert!(matches!(err, DbError::Duplicate { field } if field == "email"));
        assert_eq!(model.db().adapter().executed.len(), 1);
    }

    #[test]
    fn formatted_queries_skip_input_processing() {
        let mut model = users(MockAdapter::new());
        model.set_formatted(true);
        model
            .add(record! { "name" => " x ", "junk" => 1, "email" => "b@x" })
            .unwrap();
        assert_eq!(
            model.db().adapter().executed,
            vec!["INSERT INTO users (name,junk,email) VALUES (' x ',1,'b@x')"]
        );
    }

    #[test]
    fn modify_by_primary_key_excludes_own_row() {
        let mut model = users(MockAdapter::new().with_rows(no_duplicates()));
        model.db_mut().adapter_mut().affected = 1;
        let n = model
            .modify(record! { "id" => 3, "email" => "c@x" })
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(
            model.db().adapter().executed,
            vec![
                "SELECT COUNT(*) FROM users WHERE (email = 'c@x') AND (id <> 3)",
                "UPDATE users SET email='c@x' WHERE (id = 3)",
            ]
        );
    }

    #[test]
    fn save_inserts_or_updates() {
        let mut model = users(MockAdapter::new());
        model.db_mut().adapter_mut().last_id = 11;
        model.db_mut().adapter_mut().affected = 1;

        let inserted = model.save(record! { "id" => (), "name" => "z" }).unwrap();
        assert_eq!(inserted, QueryResult::Inserted(11));

        let updated = model.save(record! { "id" => 4, "name" => "z" }).unwrap();
        assert_eq!(updated, QueryResult::Affected(1));

        assert_eq!(
            model.db().adapter().executed,
            vec![
                "INSERT INTO users (name) VALUES ('z')",
                "UPDATE users SET name='z' WHERE (id = 4)",
            ]
        );
    }

    #[test]
    fn remove_variants() {
        let mut model = users(MockAdapter::new());
        model.remove_by_id(3).unwrap();
        model.remove().unwrap();
        assert_eq!(
            model.db().adapter().executed,
            vec!["DELETE FROM users WHERE (id = 3)", "DELETE FROM users WHERE (1=0)"]
        );
    }

    #[test]
    fn pager_and_count_use_model_table() {
        let mut model = users(
            MockAdapter::new()
                .with_rows(vec![record! { "COUNT(*)" => 1 }])
                .with_rows(vec![record! { "id" => 1, "name" => "ann" }])
                .with_rows(vec![record! { "COUNT(*)" => 1 }]),
        );
        let pager = model.fetch_pager(1, 20).unwrap();
        assert_eq!(pager.rows[0].get("name"), Some(&SqlValue::from("ANN")));
        assert_eq!(model.count().unwrap(), 1);
        assert_eq!(
            model.db().adapter().executed,
            vec![
                "SELECT COUNT(*) FROM users",
                "SELECT * FROM users LIMIT 0,20",
                "SELECT COUNT(*) FROM users",
            ]
        );
    }

    #[test]
    fn key_values_are_formatted() {
        let mut model = users(
            MockAdapter::new().with_rows(vec![record! { "id" => 1, "name" => "ann" }]),
        );
        let pairs = model.fetch_key_values("id", "name").unwrap();
        assert_eq!(pairs, vec![("1".to_string(), SqlValue::from("ANN"))]);
        assert_eq!(
            model.db().adapter().executed,
            vec!["SELECT id,name FROM users"]
        );
    }

    #[test]
    fn default_if_null_formatter() {
        let options = ModelOptions::new("posts")
            .with_input("title", Box::new(DefaultIfNull(SqlValue::from("untitled"))));
        let formatted = options.format_input(record! { "title" => () });
        assert_eq!(formatted.get("title"), Some(&SqlValue::from("untitled")));
    }
}
