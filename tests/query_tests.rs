mod common;

use common::{Article, Empty};
use datastore_mapper::{QueryOptions, RecordId, build_query_string, create_schema_query};
use serde_json::json;

#[test]
fn test_query_without_filters_has_no_where() {
    let record = Empty {
        id: RecordId::from(1),
    };
    assert_eq!(
        build_query_string(&record, &QueryOptions::default()),
        "SELECT * FROM Empty"
    );

    // Fields declared but all null behave the same way
    assert_eq!(
        build_query_string(&Article::new(1), &QueryOptions::default()),
        "SELECT * FROM Article"
    );
}

#[test]
fn test_filters_are_joined_with_and() {
    let mut article = Article::new(1);
    article.title = Some("rust".to_string());
    article.views = Some(3);

    assert_eq!(
        build_query_string(&article, &QueryOptions::default()),
        "SELECT * FROM Article WHERE title contains 'rust' AND views = 3"
    );
}

#[test]
fn test_group_and_order_by_declared_fields() {
    let mut article = Article::new(1);
    article.published = Some(true);

    let options = QueryOptions::default().group_by("title").order_by("views");
    assert_eq!(
        build_query_string(&article, &options),
        "SELECT * FROM Article WHERE published = true GROUP BY title ORDER BY views"
    );
}

#[test]
fn test_unknown_group_and_order_fields_are_ignored() {
    let options = QueryOptions::default()
        .group_by("author")
        .order_by("id");

    assert_eq!(
        build_query_string(&Article::new(1), &options),
        "SELECT * FROM Article"
    );
}

#[test]
fn test_non_string_options_are_ignored() {
    let options = QueryOptions::from_json(&json!({"groupBy": 5, "orderBy": "created"}));

    assert_eq!(
        build_query_string(&Article::new(1), &options),
        "SELECT * FROM Article ORDER BY created"
    );
}

#[test]
fn test_schema_query_allows_literals() {
    let mut article = Article::new(1);
    article.title = Some("rust".to_string());

    let request = create_schema_query(&article, &QueryOptions::default());
    assert!(request.gql_query.allow_literals);
    assert_eq!(
        request.gql_query.query_string,
        "SELECT * FROM Article WHERE title contains 'rust'"
    );

    let body = serde_json::to_value(&request).unwrap();
    assert_eq!(
        body,
        json!({"gqlQuery": {
            "queryString": "SELECT * FROM Article WHERE title contains 'rust'",
            "allowLiterals": true
        }})
    );
}
