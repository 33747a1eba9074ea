use cypherkit_query::{NodePattern, Params, Properties, PropertyValue, QueryBuilder};
use futures::executor::block_on;
use std::cell::RefCell;

/// Stands in for a driver session: records what it was asked to run.
#[derive(Default)]
struct RecordingSession {
    calls: RefCell<Vec<(String, Params)>>,
}

impl RecordingSession {
    async fn run(&self, statement: String, parameters: Params) -> usize {
        let mut calls = self.calls.borrow_mut();
        calls.push((statement, parameters));
        calls.len()
    }
}

#[test]
fn test_run_hands_statement_to_async_executor() -> cypherkit_query::Result<()> {
    let session = RecordingSession::default();
    let mut query = QueryBuilder::new()
        .create(
            NodePattern::new()
                .identifier("n")
                .label("Movie")
                .properties(Properties::new().with("title", "Heat").with("year", 1995)),
        )
        .r#return(["n"]);

    let pending = query.run(|statement, parameters| session.run(statement, parameters))?;
    let count = block_on(pending);

    assert_eq!(count, 1);
    let calls = session.calls.borrow();
    let (statement, parameters) = &calls[0];
    assert_eq!(
        statement,
        "CREATE (n:Movie { title: $title, year: $year }) RETURN n"
    );
    assert_eq!(parameters.get("year"), Some(&PropertyValue::Int(1995)));
    Ok(())
}

#[test]
fn test_run_does_not_call_executor_on_error() {
    let mut called = false;
    let mut query = QueryBuilder::new().raw("   ");
    let result = query.run(|_, _| called = true);

    assert!(result.is_err());
    assert!(!called);
}

#[test]
fn test_compiled_query_serializes_for_the_wire() -> cypherkit_query::Result<()> {
    let mut query = QueryBuilder::new()
        .r#match(NodePattern::new().identifier("n"))
        .limit(3);
    let compiled = query.compile()?;
    let wire = serde_json::to_value(&compiled)?;

    assert_eq!(
        wire,
        serde_json::json!({
            "statement": "MATCH (n) LIMIT $limit",
            "parameters": { "limit": 3 }
        })
    );
    Ok(())
}
