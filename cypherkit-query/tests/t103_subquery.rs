use cypherkit_query::{
    BindParam, Error, NodePattern, Properties, PropertyConditions, PropertyValue, QueryBuilder,
    SetClause, SharedBindParam,
};
use serde_json::json;

fn person(identifier: &str, name: &str) -> NodePattern {
    NodePattern::new()
        .identifier(identifier)
        .label("Person")
        .r#where(PropertyConditions::new().eq("name", name))
}

#[test]
fn test_call_with_shared_allocator() -> cypherkit_query::Result<()> {
    let shared = SharedBindParam::from(BindParam::new());
    let subquery = QueryBuilder::with_bind_param(shared.clone())
        .r#match(person("friend", "Bob"))
        .r#return(["friend"]);
    let mut query = QueryBuilder::with_bind_param(shared)
        .r#match(person("me", "Ann"))
        .call(subquery)
        .r#return(["me", "friend"]);
    let compiled = query.compile()?;

    assert_eq!(
        compiled.statement,
        "MATCH (me:Person { name: $name }) \
         CALL { MATCH (friend:Person { name: $name__aaaa }) RETURN friend } \
         RETURN me, friend"
    );
    assert_eq!(
        compiled.parameters.get("name"),
        Some(&PropertyValue::String("Ann".to_string()))
    );
    assert_eq!(
        compiled.parameters.get("name__aaaa"),
        Some(&PropertyValue::String("Bob".to_string()))
    );
    Ok(())
}

#[test]
fn test_call_with_unrelated_allocator_fails() {
    let subquery = QueryBuilder::new().r#match(person("friend", "Bob"));
    let mut query = QueryBuilder::new()
        .r#match(person("me", "Ann"))
        .call(subquery);

    let err = query.statement().expect_err("different allocators");
    assert!(matches!(err, Error::Composition(_)));
    assert!(err.is_constraint());
    assert!(query.bind_param().is_empty());
}

#[test]
fn test_nested_calls_share_one_allocator() -> cypherkit_query::Result<()> {
    let outer = QueryBuilder::new();
    let middle = outer.subquery();
    let inner = middle.subquery().r#match(person("c", "Cy"));
    let middle = middle.r#match(person("b", "Bo")).call(inner);
    let mut query = outer.r#match(person("a", "Al")).call(middle);

    assert_eq!(
        query.statement()?,
        "MATCH (a:Person { name: $name }) CALL { MATCH (b:Person { name: $name__aaaa }) \
         CALL { MATCH (c:Person { name: $name__aaaa__aaaa }) } }"
    );
    assert_eq!(query.bind_param().len(), 3);
    Ok(())
}

#[test]
fn test_for_each_body() -> cypherkit_query::Result<()> {
    let parent = QueryBuilder::new().r#match("p = (a)-[*]->(b)");
    let body = parent
        .subquery()
        .set(SetClause::properties("n", Properties::new().with("marked", true)));
    let mut query = parent.for_each("n", "nodes(p)", body);

    let compiled = query.compile()?;
    assert_eq!(
        compiled.statement,
        "MATCH p = (a)-[*]->(b) FOREACH (n IN nodes(p) | SET n.marked = $marked)"
    );
    assert_eq!(
        compiled.parameters.get("marked"),
        Some(&PropertyValue::Bool(true))
    );
    Ok(())
}

#[test]
fn test_json_call_body_shares_the_builder_allocator() -> cypherkit_query::Result<()> {
    let mut query = QueryBuilder::new();
    query.add_json(&json!([
        { "match": { "identifier": "a", "where": { "id": 1 } } },
        { "call": [
            { "match": { "identifier": "b", "where": { "id": 2 } } },
            { "return": ["b"] }
        ]},
        { "return": ["a", "b"] }
    ]))?;

    assert_eq!(
        query.statement()?,
        "MATCH (a { id: $id }) CALL { MATCH (b { id: $id__aaaa }) RETURN b } RETURN a, b"
    );
    Ok(())
}
