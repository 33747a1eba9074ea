//! Patterns, conditions and property maps.

use super::{Fields, LITERAL_KEY, describe, string, strings};
use crate::clause::{MatchClause, PatternClause, PatternElement};
use crate::error::{Error, Result};
use crate::pattern::{
    HopBound, Label, NodeDescriptor, NodePattern, PatternFilter, Properties,
    RelationshipDescriptor, RelationshipDirection, RelationshipPattern,
};
use crate::value::Operand;
use crate::where_params::{Condition, Operator, PropertyConditions, WhereParams};
use cypherkit_api::PropertyValue;
use serde_json::Value;

const NODE_KEYS: [&str; 4] = ["identifier", "label", "where", "properties"];
const STRUCTURE_KEYS: [&str; 3] = ["literal", "multiple", "related"];
const RELATIONSHIP_KEYS: [&str; 7] = [
    "direction",
    "identifier",
    "name",
    "where",
    "properties",
    "minHops",
    "maxHops",
];
const INFINITY: &str = "infinity";

pub(super) fn parse_match(value: &Value) -> Result<MatchClause> {
    let (pattern, optional) = pattern_clause("match", value, true)?;
    Ok(MatchClause { pattern, optional })
}

pub(super) fn parse_pattern_clause(key: &str, value: &Value) -> Result<PatternClause> {
    pattern_clause(key, value, false).map(|(pattern, _)| pattern)
}

fn pattern_clause(key: &str, value: &Value, allow_optional: bool) -> Result<(PatternClause, bool)> {
    if let Value::String(literal) = value {
        return Ok((PatternClause::Literal(literal.clone()), false));
    }

    let mut allowed: Vec<&str> = NODE_KEYS.iter().chain(&STRUCTURE_KEYS).copied().collect();
    if allow_optional {
        allowed.push("optional");
    }
    let fields = Fields::new(key, value, &allowed)?;
    let optional = fields.bool("optional")?;

    let structures = STRUCTURE_KEYS
        .iter()
        .copied()
        .filter(|structure| fields.has(structure))
        .collect::<Vec<_>>();
    let structure = match structures.as_slice() {
        [] => None,
        [structure] => Some(*structure),
        [first, second, ..] => {
            return Err(Error::shape(
                *second,
                format!("no other pattern shape alongside `{first}`"),
                describe(fields.required(second)?),
            ));
        }
    };
    if let Some(structure) = structure {
        if let Some(node_key) = NODE_KEYS.iter().find(|node_key| fields.has(node_key)) {
            return Err(Error::shape(
                *node_key,
                format!("no node fields alongside `{structure}`"),
                describe(fields.required(node_key)?),
            ));
        }
    }

    let pattern = match structure {
        Some("literal") => PatternClause::Literal(fields.required_string("literal")?.to_string()),
        Some("multiple") => {
            let nodes = array("multiple", fields.required("multiple")?)?
                .iter()
                .map(|node| node_descriptor("multiple", node))
                .collect::<Result<Vec<_>>>()?;
            PatternClause::Multiple(nodes)
        }
        Some(_) => {
            let elements = array("related", fields.required("related")?)?
                .iter()
                .enumerate()
                .map(|(index, element)| pattern_element(index, element))
                .collect::<Result<Vec<_>>>()?;
            PatternClause::Related(elements)
        }
        None => PatternClause::Node(NodeDescriptor::Pattern(node_fields(&fields)?)),
    };
    Ok((pattern, optional))
}

// Objects with a `direction` are relationships; raw strings take the kind of
// their position.
fn pattern_element(index: usize, value: &Value) -> Result<PatternElement> {
    match value {
        Value::String(raw) if index % 2 == 0 => {
            Ok(PatternElement::Node(NodeDescriptor::Raw(raw.clone())))
        }
        Value::String(raw) => Ok(PatternElement::Relationship(RelationshipDescriptor::Raw(
            raw.clone(),
        ))),
        Value::Object(map) if map.contains_key("direction") => {
            Ok(PatternElement::Relationship(relationship_descriptor("related", value)?))
        }
        _ => Ok(PatternElement::Node(node_descriptor("related", value)?)),
    }
}

fn node_descriptor(key: &str, value: &Value) -> Result<NodeDescriptor> {
    match value {
        Value::String(raw) => Ok(NodeDescriptor::Raw(raw.clone())),
        _ => {
            let fields = Fields::new(key, value, &NODE_KEYS)?;
            Ok(NodeDescriptor::Pattern(node_fields(&fields)?))
        }
    }
}

fn node_fields(fields: &Fields<'_>) -> Result<NodePattern> {
    let mut node = NodePattern::new();
    node.identifier = fields.string("identifier")?.map(str::to_string);
    node.label = fields.get("label").map(label).transpose()?;
    node.filter = filter(fields)?;
    Ok(node)
}

/// `"A"`, `["A", "B"]` (all), or `{"any": ["A", "B"]}`.
fn label(value: &Value) -> Result<Label> {
    match value {
        Value::Object(_) => {
            let fields = Fields::new("label", value, &["all", "any"])?;
            fields.exclusive("all", "any", true)?;
            match fields.strings("any")? {
                Some(any) => Ok(Label::Any(non_empty_names("any", any)?)),
                None => Ok(Label::All(non_empty_names(
                    "all",
                    fields.strings("all")?.unwrap_or_default(),
                )?)),
            }
        }
        other => Ok(Label::All(non_empty_names("label", strings("label", other)?)?)),
    }
}

// An empty label or type list would silently widen the pattern.
fn non_empty_names(key: &str, names: Vec<String>) -> Result<Vec<String>> {
    if names.is_empty() {
        return Err(Error::shape(key, "at least one name", "[]"));
    }
    Ok(names)
}

fn filter(fields: &Fields<'_>) -> Result<PatternFilter> {
    fields.exclusive("where", "properties", false)?;
    if let Some(conditions) = fields.get("where") {
        return Ok(PatternFilter::Where(property_conditions("where", conditions)?));
    }
    if let Some(properties_value) = fields.get("properties") {
        return Ok(PatternFilter::Properties(properties("properties", properties_value)?));
    }
    Ok(PatternFilter::None)
}

fn relationship_descriptor(key: &str, value: &Value) -> Result<RelationshipDescriptor> {
    if let Value::String(raw) = value {
        return Ok(RelationshipDescriptor::Raw(raw.clone()));
    }
    let fields = Fields::new(key, value, &RELATIONSHIP_KEYS)?;
    let direction = match fields.required_string("direction")? {
        "out" => RelationshipDirection::LeftToRight,
        "in" => RelationshipDirection::RightToLeft,
        "none" => RelationshipDirection::Undirected,
        other => {
            return Err(Error::shape(
                "direction",
                "one of `out`, `in`, `none`",
                format!("{other:?}"),
            ));
        }
    };
    let mut relationship = RelationshipPattern::new(direction);
    relationship.identifier = fields.string("identifier")?.map(str::to_string);
    relationship.types = match fields.strings("name")? {
        Some(names) => non_empty_names("name", names)?,
        None => Vec::new(),
    };
    relationship.filter = filter(&fields)?;
    relationship.min_hops = fields.get("minHops").map(|v| hop("minHops", v)).transpose()?;
    relationship.max_hops = fields.get("maxHops").map(|v| hop("maxHops", v)).transpose()?;
    Ok(relationship.into())
}

fn hop(key: &str, value: &Value) -> Result<HopBound> {
    match value {
        Value::String(text) if text == INFINITY => Ok(HopBound::Infinite),
        Value::Number(number) => number
            .as_u64()
            .and_then(|hops| u32::try_from(hops).ok())
            .map(HopBound::Finite)
            .ok_or_else(|| Error::shape(key, "a non-negative integer", number.to_string())),
        other => Err(Error::shape(
            key,
            format!("a non-negative integer or {INFINITY:?}"),
            describe(other),
        )),
    }
}

/// `{"identifier": {"property": value | {"operator": value}}}`
pub(super) fn where_params(key: &str, value: &Value) -> Result<WhereParams> {
    let Value::Object(map) = value else {
        return Err(Error::shape(
            key,
            "an object of identifiers to conditions",
            describe(value),
        ));
    };
    let mut params = WhereParams::new();
    for (identifier, conditions) in map {
        params.insert(identifier.clone(), property_conditions(identifier, conditions)?);
    }
    Ok(params)
}

fn property_conditions(key: &str, value: &Value) -> Result<PropertyConditions> {
    let Value::Object(map) = value else {
        return Err(Error::shape(
            key,
            "an object of properties to conditions",
            describe(value),
        ));
    };
    let mut conditions = PropertyConditions::new();
    for (property, condition_value) in map {
        conditions.insert(property.clone(), condition(property, condition_value)?);
    }
    Ok(conditions)
}

fn condition(property: &str, value: &Value) -> Result<Condition> {
    let Value::Object(map) = value else {
        return Ok(Condition::Value(operand(property, value)?));
    };
    if map.contains_key(LITERAL_KEY) {
        return Ok(Condition::Value(operand(property, value)?));
    }
    if map.is_empty() {
        return Err(Error::shape(property, "at least one operator", "{}"));
    }
    let comparisons = map
        .iter()
        .map(|(key, operand_value)| -> Result<(Operator, Operand)> {
            let operator = Operator::from_key(key).ok_or_else(|| {
                let known = Operator::ALL.map(Operator::key).join(", ");
                Error::shape(key.clone(), format!("an operator ({known})"), describe(operand_value))
            })?;
            Ok((operator, operand(key, operand_value)?))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Condition::Operators(comparisons))
}

/// `{"name": "Ann", "at": {"$literal": "datetime()"}}`
pub(super) fn properties(key: &str, value: &Value) -> Result<Properties> {
    let Value::Object(map) = value else {
        return Err(Error::shape(key, "an object of property values", describe(value)));
    };
    let mut properties = Properties::new();
    for (name, property_value) in map {
        properties.insert(name.clone(), operand(name, property_value)?);
    }
    Ok(properties)
}

/// A JSON value, or `{"$literal": "text"}`. Other objects are rejected.
fn operand(key: &str, value: &Value) -> Result<Operand> {
    match value {
        Value::Object(map) => match (map.len(), map.get(LITERAL_KEY)) {
            (1, Some(text)) => Ok(Operand::literal(string(LITERAL_KEY, text)?)),
            _ => Err(Error::shape(
                key,
                format!("a value or {{\"{LITERAL_KEY}\": \"...\"}}"),
                describe(value),
            )),
        },
        other => json_value(key, other).map(Operand::Value),
    }
}

/// Converts a JSON value exactly; numbers that are neither an `i64` nor a
/// float are rejected.
pub(super) fn json_value(key: &str, value: &Value) -> Result<PropertyValue> {
    PropertyValue::try_from(value.clone()).map_err(|err| {
        Error::shape(key, "an integer within i64 or a float", err.0.to_string())
    })
}

pub(super) fn array<'a>(key: &str, value: &'a Value) -> Result<&'a Vec<Value>> {
    match value {
        Value::Array(items) if items.is_empty() => Err(Error::shape(key, "a non-empty array", "[]")),
        Value::Array(items) => Ok(items),
        other => Err(Error::shape(key, "an array", describe(other))),
    }
}
