use cypherkit_query::{
    DeleteClause, HopBound, NodePattern, Operator, PatternClause, PatternElement, PropertyConditions,
    PropertyValue, QueryBuilder, RelationshipPattern, ReturnItem, WhereParams,
};

#[test]
fn test_simple_match() -> cypherkit_query::Result<()> {
    let mut query = QueryBuilder::new().r#match(
        NodePattern::new()
            .identifier("a")
            .label("MyLabel")
            .r#where(PropertyConditions::new().eq("id", "20")),
    );
    let compiled = query.compile()?;

    assert_eq!(compiled.statement, "MATCH (a:MyLabel { id: $id })");
    assert_eq!(compiled.parameters.len(), 1);
    assert_eq!(
        compiled.parameters.get("id"),
        Some(&PropertyValue::String("20".to_string()))
    );
    Ok(())
}

#[test]
fn test_non_eq_conditions_are_hoisted() -> cypherkit_query::Result<()> {
    let mut query = QueryBuilder::new().r#match(
        NodePattern::new().identifier("n").label("Node").r#where(
            PropertyConditions::new()
                .eq("name", "John")
                .op("age", Operator::Gte, 18),
        ),
    );
    let compiled = query.compile()?;

    assert_eq!(
        compiled.statement,
        "MATCH (n:Node { name: $name }) WHERE n.age >= $age"
    );
    assert_eq!(
        compiled.parameters.get("name"),
        Some(&PropertyValue::String("John".to_string()))
    );
    assert_eq!(compiled.parameters.get("age"), Some(&PropertyValue::Int(18)));
    Ok(())
}

#[test]
fn test_variable_length_relationships() -> cypherkit_query::Result<()> {
    let path = |relationship: RelationshipPattern| {
        PatternClause::related([
            PatternElement::from(NodePattern::new().identifier("a")),
            relationship.into(),
            NodePattern::new().identifier("b").into(),
        ])
    };

    let mut bounded = QueryBuilder::new().r#match(path(
        RelationshipPattern::outgoing()
            .r#type("KNOWS")
            .min_hops(2)
            .max_hops(5),
    ));
    assert_eq!(bounded.statement()?, "MATCH (a)-[:KNOWS*2..5]->(b)");

    let mut unbounded = QueryBuilder::new().r#match(path(
        RelationshipPattern::outgoing()
            .r#type("KNOWS")
            .max_hops(HopBound::Infinite),
    ));
    assert_eq!(unbounded.statement()?, "MATCH (a)-[:KNOWS*]->(b)");
    Ok(())
}

#[test]
fn test_colliding_names_are_suffixed() -> cypherkit_query::Result<()> {
    let by_id = |identifier: &str, id: i64| {
        WhereParams::new().identifier(identifier, PropertyConditions::new().eq("id", id))
    };
    let mut query = QueryBuilder::new()
        .r#match("(a), (b)")
        .r#where(by_id("a", 1))
        .r#where(by_id("b", 2));
    let compiled = query.compile()?;

    assert_eq!(
        compiled.statement,
        "MATCH (a), (b) WHERE a.id = $id WHERE b.id = $id__aaaa"
    );
    assert_eq!(compiled.parameters.get("id"), Some(&PropertyValue::Int(1)));
    assert_eq!(
        compiled.parameters.get("id__aaaa"),
        Some(&PropertyValue::Int(2))
    );
    Ok(())
}

#[test]
fn test_create_relationship_between_matched_nodes() -> cypherkit_query::Result<()> {
    let mut query = QueryBuilder::new()
        .r#match(PatternClause::multiple([
            NodePattern::new()
                .identifier("a")
                .label("User")
                .r#where(PropertyConditions::new().eq("id", 1)),
            NodePattern::new()
                .identifier("b")
                .label("User")
                .r#where(PropertyConditions::new().eq("id", 2)),
        ]))
        .create(PatternClause::related([
            PatternElement::from(NodePattern::new().identifier("a")),
            RelationshipPattern::outgoing()
                .identifier("r")
                .r#type("FOLLOWS")
                .into(),
            NodePattern::new().identifier("b").into(),
        ]))
        .r#return(vec![ReturnItem::new("r").alias("follow")]);

    assert_eq!(
        query.statement()?,
        "MATCH (a:User { id: $id }), (b:User { id: $id__aaaa }) \
         CREATE (a)-[r:FOLLOWS]->(b) RETURN r AS follow"
    );
    Ok(())
}

#[test]
fn test_injection_attempts_stay_quoted() -> cypherkit_query::Result<()> {
    let hostile = "x`}) DETACH DELETE n //";
    let mut query = QueryBuilder::new()
        .r#match(
            NodePattern::new()
                .identifier(hostile)
                .label(hostile)
                .r#where(PropertyConditions::new().eq(hostile, hostile)),
        )
        .delete(DeleteClause::identifiers([hostile], false));
    let compiled = query.compile()?;

    let quoted = "`x``}) DETACH DELETE n //`";
    assert_eq!(
        compiled.statement,
        format!("MATCH ({quoted}:{quoted} {{ {quoted}: ${quoted} }}) DELETE {quoted}")
    );
    assert_eq!(
        compiled.parameters.get(hostile),
        Some(&PropertyValue::String(hostile.to_string()))
    );
    Ok(())
}

#[test]
fn test_errors_name_the_offending_key() {
    let mut query = QueryBuilder::new().delete(DeleteClause::Literal {
        literal: String::new(),
        detach: true,
    });
    let err = query.statement().expect_err("empty literal");
    assert!(err.is_constraint());
    assert_eq!(err.key(), Some("literal"));
}
