//! MATCH, CREATE and MERGE.

use super::{keyword_raw, non_empty};
use crate::bind_param::BindParam;
use crate::clause::{MatchClause, PatternClause, PatternElement};
use crate::error::{Error, Result};
use crate::pattern::{CompiledPattern, PatternMode, compile_node, compile_relationship};
use crate::where_params::Where;

pub(super) fn render_match(clause: &MatchClause, bind_param: &mut BindParam) -> Result<String> {
    let keyword = if clause.optional {
        "OPTIONAL MATCH"
    } else {
        "MATCH"
    };
    render_pattern(keyword, "match", &clause.pattern, bind_param, PatternMode::Match)
}

pub(super) fn render_create(
    keyword: &str,
    key: &str,
    pattern: &PatternClause,
    bind_param: &mut BindParam,
) -> Result<String> {
    render_pattern(keyword, key, pattern, bind_param, PatternMode::Create)
}

fn render_pattern(
    keyword: &str,
    key: &str,
    pattern: &PatternClause,
    bind_param: &mut BindParam,
    mode: PatternMode,
) -> Result<String> {
    let compiled = match pattern {
        PatternClause::Literal(literal) => return keyword_raw(keyword, key, literal),
        PatternClause::Node(node) => vec![compile_node(node, bind_param, mode)?],
        PatternClause::Multiple(nodes) => {
            non_empty("multiple", nodes)?;
            nodes
                .iter()
                .map(|node| compile_node(node, bind_param, mode))
                .collect::<Result<Vec<_>>>()?
        }
        PatternClause::Related(elements) => {
            check_alternation(elements)?;
            elements
                .iter()
                .map(|element| match element {
                    PatternElement::Node(node) => compile_node(node, bind_param, mode),
                    PatternElement::Relationship(relationship) => {
                        compile_relationship(relationship, bind_param, mode)
                    }
                })
                .collect::<Result<Vec<_>>>()?
        }
    };

    let separator = match pattern {
        PatternClause::Multiple(_) => ", ",
        _ => "",
    };
    let mut statements = Vec::with_capacity(compiled.len());
    let mut hoisted: Option<Where> = None;
    for CompiledPattern {
        statement,
        standalone,
    } in compiled
    {
        statements.push(statement);
        if let Some(standalone) = standalone {
            hoisted = Some(match hoisted {
                Some(existing) => existing.and(standalone),
                None => standalone,
            });
        }
    }

    let mut text = format!("{keyword} {}", statements.join(separator));
    if let Some(hoisted) = hoisted.filter(|w| !w.is_empty()) {
        text.push_str(" WHERE ");
        text.push_str(&hoisted.text());
    }
    Ok(text)
}

fn check_alternation(elements: &[PatternElement]) -> Result<()> {
    non_empty("related", elements)?;
    for (index, element) in elements.iter().enumerate() {
        let expects_node = index % 2 == 0;
        if element.is_node() != expects_node {
            let expected = if expects_node { "a node" } else { "a relationship" };
            return Err(Error::Composition(format!(
                "`related` element {index} must be {expected}"
            )));
        }
    }
    if elements.len() % 2 == 0 {
        return Err(Error::Composition(
            "`related` must end with a node".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{render_create, render_match};
    use crate::bind_param::BindParam;
    use crate::clause::{MatchClause, PatternClause, PatternElement};
    use crate::error::Error;
    use crate::pattern::{NodePattern, Properties, RelationshipPattern};
    use crate::where_params::{Operator, PropertyConditions};

    fn person(identifier: &str) -> NodePattern {
        NodePattern::new().identifier(identifier).label("Person")
    }

    #[test]
    fn literal_match() {
        let mut bp = BindParam::new();
        let text = render_match(&MatchClause::new("(n)-->(m)"), &mut bp).expect("render");
        assert_eq!(text, "MATCH (n)-->(m)");
    }

    #[test]
    fn optional_match() {
        let mut bp = BindParam::new();
        let text = render_match(&MatchClause::optional(person("p")), &mut bp).expect("render");
        assert_eq!(text, "OPTIONAL MATCH (p:Person)");
    }

    #[test]
    fn multiple_nodes_are_comma_joined_and_hoisted_together() {
        let mut bp = BindParam::new();
        let clause = MatchClause::new(PatternClause::multiple([
            person("a").r#where(PropertyConditions::new().op("age", Operator::Gt, 30i64)),
            person("b").r#where(
                PropertyConditions::new()
                    .eq("name", "Bob")
                    .op("age", Operator::Lt, 20i64),
            ),
        ]));
        let text = render_match(&clause, &mut bp).expect("render");
        assert_eq!(
            text,
            "MATCH (a:Person), (b:Person { name: $name }) WHERE a.age > $age AND b.age < $age__aaaa"
        );
    }

    #[test]
    fn related_chain() {
        let mut bp = BindParam::new();
        let clause = MatchClause::new(PatternClause::related([
            PatternElement::from(person("a")),
            RelationshipPattern::outgoing()
                .identifier("r")
                .r#type("KNOWS")
                .r#where(PropertyConditions::new().op("since", Operator::Gte, 2000i64))
                .into(),
            person("b").into(),
        ]));
        let text = render_match(&clause, &mut bp).expect("render");
        assert_eq!(
            text,
            "MATCH (a:Person)-[r:KNOWS]->(b:Person) WHERE r.since >= $since"
        );
    }

    #[test]
    fn misplaced_related_elements_are_composition_errors() {
        let mut bp = BindParam::new();
        let two_nodes = MatchClause::new(PatternClause::related([
            PatternElement::from(person("a")),
            person("b").into(),
        ]));
        assert!(matches!(
            render_match(&two_nodes, &mut bp),
            Err(Error::Composition(_))
        ));

        let dangling = MatchClause::new(PatternClause::related([
            PatternElement::from(person("a")),
            RelationshipPattern::outgoing().into(),
        ]));
        assert!(matches!(
            render_match(&dangling, &mut bp),
            Err(Error::Composition(_))
        ));

        let empty = MatchClause::new(PatternClause::related([]));
        assert_eq!(
            render_match(&empty, &mut bp).expect_err("empty").key(),
            Some("related")
        );
    }

    #[test]
    fn create_never_hoists() {
        let mut bp = BindParam::new();
        let node = person("p").properties(Properties::new().with("name", "Ann"));
        let text = render_create("CREATE", "create", &node.into(), &mut bp).expect("render");
        assert_eq!(text, "CREATE (p:Person { name: $name })");

        let conditional = person("p").r#where(PropertyConditions::new().op("age", Operator::Gt, 1i64));
        let err = render_create("MERGE", "merge", &conditional.into(), &mut bp)
            .expect_err("non eq in merge");
        assert_eq!(err.key(), Some("where"));
    }

    #[test]
    fn blank_literal_is_rejected() {
        let mut bp = BindParam::new();
        let err = render_create("CREATE", "create", &PatternClause::from("  "), &mut bp)
            .expect_err("blank");
        assert_eq!(err.key(), Some("create"));
    }
}
