use sqlfluent::{
    BoolOp, InOptions, NameGenerator, Params, Query, QbError, TokenExpander, Validator, Value,
    WhereClause, select_from,
};
use std::sync::Arc;

/// Moderation-queue style query: joins, nested OR, IN lists and a subquery.
fn moderation_queue(names: Arc<NameGenerator>) -> Query {
    let mut banned = Query::with_names(Arc::clone(&names));
    banned.select("uid").from("{banned}");
    banned.where_clause().add_with("lifted > :now", [("now", 1_700_000_000)]);

    let mut q = Query::with_names(names);
    q.select(["p.pid", "p.subject", "u.username"])
        .from("{posts} p")
        .join_with(
            "LEFT JOIN {users} u ON u.uid = p.uid AND u.usergroup <> :guest",
            [("guest", 1)],
            Some("u"),
        )
        .order_by("p.dateline DESC")
        .limit(25)
        .offset(50);

    q.where_clause()
        .in_list("p.visible", 0)
        .in_with("p.fid", vec![2, 5, 9], InOptions::new().param_name("fid"))
        .nested(BoolOp::Or, |c| {
            c.add("p.edituid = 0").add_with("p.edittime < :cutoff", [("cutoff", 1_699_000_000)]);
        })
        .add(format!("p.uid NOT IN ({})", banned.to_sql()))
        .add(Query::clone(&banned));

    q
}

#[test]
fn renders_complete_statement() {
    let q = moderation_queue(Arc::new(NameGenerator::new()));
    let sql = q.to_sql();

    let select = sql.find("SELECT").unwrap();
    let from = sql.find("\nFROM {posts} p").unwrap();
    let join = sql.find("\nLEFT JOIN {users} u").unwrap();
    let where_ = sql.find("\nWHERE p.visible = :param_1").unwrap();
    let order = sql.find("\nORDER BY p.dateline DESC").unwrap();
    let limit = sql.find("\nLIMIT 25\nOFFSET 50").unwrap();
    assert!(select < from && from < join && join < where_ && where_ < order && order < limit);

    assert!(sql.contains("p.fid IN (:fid_1,:fid_2,:fid_3)"));
    assert!(sql.contains("(\n\tp.edituid = 0\n\tOR\n\tp.edittime < :cutoff\n)"));
    assert!(q.joined("u"));
}

#[test]
fn merges_params_from_every_source() {
    let q = moderation_queue(Arc::new(NameGenerator::new()));
    let params = q.params();

    assert_eq!(params.get_param("param_1").unwrap(), &Value::Int(0));
    assert_eq!(params.get_param("fid_2").unwrap(), &Value::Int(5));
    assert_eq!(params.get_param("cutoff").unwrap(), &Value::Int(1_699_000_000));
    assert_eq!(params.get_param("now").unwrap(), &Value::Int(1_700_000_000));
    assert_eq!(params.get_param("guest").unwrap(), &Value::Int(1));
    assert_eq!(params.len(), 7);
}

#[test]
fn converts_to_positional_for_postgres() {
    let q = moderation_queue(Arc::new(NameGenerator::new()));
    let pq = q.to_positional().unwrap();

    assert!(!pq.sql.contains(":param_1"));
    assert!(pq.sql.contains("u.usergroup <> $1"));
    assert!(pq.sql.contains("p.visible = $2"));
    assert!(pq.sql.contains("p.fid IN ($3,$4,$5)"));
    // `:now` appears twice (inline text and embedded subquery) but binds once
    assert_eq!(pq.sql.matches("lifted > $7").count(), 2);
    assert_eq!(pq.params.len(), 7);
    assert_eq!(pq.params[0], Value::Int(1));
    assert_eq!(pq.params_ref().len(), 7);
}

#[test]
fn unbound_placeholder_fails_conversion() {
    let mut q = select_from("t");
    q.where_clause().add("a = :never_bound");
    assert_eq!(
        q.to_positional().unwrap_err(),
        QbError::ParamNotFound("never_bound".into())
    );
}

#[test]
fn where_clause_can_be_built_standalone() {
    let mut root = WhereClause::or();
    root.add("a = 1").add(WhereClause::and());
    root.set_param("x", "y");

    assert_eq!(root.to_sql().as_deref(), Some("a = 1"));
    assert_eq!(root.params(), [("x", "y")].into_iter().collect::<Params>());
}

#[test]
fn stored_validator_inlines_literals() {
    let quote: Validator<'_> = Box::new(|v: &Value| match v.as_str() {
        Some(s) => format!("'{}'", s.replace('\'', "''")),
        None => v.to_string(),
    });

    let mut q = Query::with_names(Arc::new(NameGenerator::new()));
    q.from("t");
    q.where_clause()
        .in_with("kind", vec!["a", "o'k"], InOptions::new().validator(quote));

    assert_eq!(q.to_sql(), "SELECT\n\t*\nFROM t\nWHERE kind IN ('a','o''k')");
    assert!(q.params().is_empty());
}

#[test]
fn tokens_expand_after_rendering() {
    let q = moderation_queue(Arc::new(NameGenerator::new()));
    let sql = TokenExpander::new().with_table_prefix("mybb_").expand(&q.to_sql());
    assert!(sql.contains("FROM mybb_posts p"));
    assert!(sql.contains("LEFT JOIN mybb_users u"));
    assert!(sql.contains("FROM mybb_banned"));
    assert!(!sql.contains('{'));
}

#[cfg(feature = "tracing")]
#[test]
fn logger_emits_without_panicking() {
    use sqlfluent::TracingSqlLogger;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        let q = moderation_queue(Arc::new(NameGenerator::new()));
        TracingSqlLogger::new().with_values().log(&q);
        TracingSqlLogger::new()
            .level(tracing::Level::INFO)
            .no_truncate()
            .log(&q);
        q.to_positional().unwrap();
    });
}
