#[cfg(test)]
mod tests {
    use crate::clause::ClauseName;
    use crate::condition::{Condition, Term};
    use crate::config::DbConfig;
    use crate::flavor::Flavor;
    use crate::parser::Parser;
    use crate::query::Query;
    use crate::record;
    use pretty_assertions::assert_eq;

    #[test]
    fn update_with_where() {
        let mut q = Query::new();
        q.update("users")
            .data(record! { "name" => "b", "age" => 30 })
            .where_eq("id", 1);
        assert_eq!(
            Parser::default().parse(q).unwrap(),
            "UPDATE users SET name='b',age=30 WHERE (id = 1)"
        );
    }

    #[test]
    fn update_and_delete_without_where_never_touch_rows() {
        let mut q = Query::new();
        q.update("users").data(record! { "name" => "b" });
        assert_eq!(
            Parser::default().parse(q).unwrap(),
            "UPDATE users SET name='b' WHERE (1=0)"
        );

        let mut q = Query::new();
        q.delete("users");
        assert_eq!(
            Parser::default().parse(q).unwrap(),
            "DELETE FROM users WHERE (1=0)"
        );
    }

    #[test]
    fn blank_where_fragments_keep_the_guard() {
        let mut q = Query::new();
        q.update("users").data(record! { "name" => "b" }).where_("   ");
        assert_eq!(
            Parser::default().parse(q).unwrap(),
            "UPDATE users SET name='b' WHERE (1=0)"
        );

        let mut q = Query::new();
        q.delete("users").set_named("where", "").unwrap();
        assert_eq!(
            Parser::default().parse(q).unwrap(),
            "DELETE FROM users WHERE (1=0)"
        );

        let mut q = Query::new();
        q.delete("users").where_(Condition::new().and_raw(""));
        assert_eq!(
            Parser::default().parse(q).unwrap(),
            "DELETE FROM users WHERE (1=0)"
        );

        let mut q = Query::new();
        q.delete("users");
        q.where_.push(Condition {
            terms: vec![Term::Raw("  ".into())],
            ..Condition::default()
        });
        assert_eq!(
            Parser::default().parse(q).unwrap(),
            "DELETE FROM users WHERE (1=0)"
        );
    }

    #[test]
    fn update_mixes_raw_and_pairs() {
        let mut q = Query::new();
        q.set(ClauseName::Update, "posts")
            .unwrap()
            .set(ClauseName::Set, "hits=hits+1")
            .unwrap()
            .set(ClauseName::Set, record! { "title" => "x" })
            .unwrap()
            .set(ClauseName::Where, record! { "id" => 3 })
            .unwrap();
        assert_eq!(
            Parser::default().parse(q).unwrap(),
            "UPDATE posts SET hits=hits+1,title='x' WHERE (id = 3)"
        );
    }

    #[test]
    fn update_requires_data() {
        let mut q = Query::new();
        q.update("users").where_eq("id", 1);
        assert!(Parser::default().parse(q).unwrap_err().is_validation());
    }

    #[test]
    fn delete_with_order_and_limit() {
        let mut q = Query::new();
        q.delete("users")
            .where_op("id", "lt", 10)
            .order("id")
            .limit(5);
        assert_eq!(
            Parser::default().parse(q).unwrap(),
            "DELETE FROM users WHERE (id < 10) ORDER BY id LIMIT 5"
        );
    }

    #[test]
    fn mutation_limit_restrictions() {
        let mut q = Query::new();
        q.delete("users").where_eq("id", 1).limit(1);
        let pg = Parser::new(DbConfig::new().with_flavor(Flavor::PostgreSQL));
        assert!(pg.parse(q).unwrap_err().is_validation());

        let mut q = Query::new();
        q.update("users")
            .data(record! { "a" => 1 })
            .where_eq("id", 1)
            .limit_range(10, 5);
        assert!(Parser::default().parse(q).unwrap_err().is_validation());
    }

    #[test]
    fn update_never_qualifies_keys() {
        let mut q = Query::new();
        q.update("users u")
            .data(record! { "name" => "b" })
            .where_eq("u.id", 1);
        assert_eq!(
            Parser::default().parse(q).unwrap(),
            "UPDATE users AS u SET name='b' WHERE (u.id = 1)"
        );
    }
}
