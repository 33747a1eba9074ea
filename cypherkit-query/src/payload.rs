//! JSON clause payloads.
//!
//! Each payload is an object with exactly one clause key:
//!
//! ```json
//! [
//!   {"match": {"identifier": "n", "label": "Node", "where": {"age": {"gte": 18}}}},
//!   {"return": ["n"]},
//!   {"limit": 10}
//! ]
//! ```
//!
//! Every field is checked. Unknown keys and values of the wrong shape are
//! rejected with [`Error::Shape`] naming the key. A literal operand is
//! written `{"$literal": "datetime()"}` and an unbounded hop count
//! `"infinity"`.

mod clauses;
mod patterns;

use crate::bind_param::SharedBindParam;
use crate::clause::Clause;
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Marks a literal operand.
pub const LITERAL_KEY: &str = "$literal";

const CLAUSE_KEYS: [&str; 18] = [
    "match",
    "create",
    "merge",
    "set",
    "onCreateSet",
    "onMatchSet",
    "remove",
    "delete",
    "return",
    "orderBy",
    "with",
    "unwind",
    "skip",
    "limit",
    "where",
    "forEach",
    "call",
    "raw",
];

const DESCRIBE_LIMIT: usize = 64;

/// Parses a payload object or an array of payload objects.
///
/// Nested `call` and `forEach` bodies become builders bound through
/// `bind_param`.
pub fn parse_payloads(value: &Value, bind_param: &SharedBindParam) -> Result<Vec<Clause>> {
    match value {
        Value::Array(payloads) => payloads
            .iter()
            .map(|payload| parse_payload(payload, bind_param))
            .collect(),
        Value::Object(_) => Ok(vec![parse_payload(value, bind_param)?]),
        other => Err(Error::shape(
            "payload",
            "an object or an array of objects",
            describe(other),
        )),
    }
}

pub fn parse_payload(value: &Value, bind_param: &SharedBindParam) -> Result<Clause> {
    let Value::Object(object) = value else {
        return Err(Error::shape(
            "payload",
            "an object with one clause key",
            describe(value),
        ));
    };
    if let Some((unknown, body)) = object
        .iter()
        .find(|(key, _)| !CLAUSE_KEYS.contains(&key.as_str()))
    {
        return Err(Error::shape(
            unknown.clone(),
            "a clause key",
            describe(body),
        ));
    }
    let mut entries = object.iter();
    let (key, body) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => {
            return Err(Error::shape(
                "payload",
                "exactly one clause key",
                describe(value),
            ));
        }
    };

    match key.as_str() {
        "match" => patterns::parse_match(body).map(Clause::Match),
        "create" => patterns::parse_pattern_clause("create", body).map(Clause::Create),
        "merge" => patterns::parse_pattern_clause("merge", body).map(Clause::Merge),
        "set" => clauses::parse_set("set", body).map(Clause::Set),
        "onCreateSet" => clauses::parse_set("onCreateSet", body).map(Clause::OnCreateSet),
        "onMatchSet" => clauses::parse_set("onMatchSet", body).map(Clause::OnMatchSet),
        "remove" => clauses::parse_remove(body).map(Clause::Remove),
        "delete" => clauses::parse_delete(body).map(Clause::Delete),
        "return" => clauses::parse_projection("return", body).map(Clause::Return),
        "with" => clauses::parse_projection("with", body).map(Clause::With),
        "orderBy" => clauses::parse_order_by(body).map(Clause::OrderBy),
        "unwind" => clauses::parse_unwind(body).map(Clause::Unwind),
        "skip" => clauses::parse_pagination("skip", body).map(Clause::Skip),
        "limit" => clauses::parse_pagination("limit", body).map(Clause::Limit),
        "where" => clauses::parse_where(body).map(Clause::Where),
        "forEach" => clauses::parse_for_each(body, bind_param).map(Clause::ForEach),
        "call" => clauses::parse_call(body, bind_param).map(Clause::Call),
        "raw" => string("raw", body).map(|raw| Clause::Raw(raw.to_string())),
        other => Err(Error::shape(other, "a clause key", describe(body))),
    }
}

/// The fields of a payload object, restricted to a known set of keys.
struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn new(key: &str, value: &'a Value, allowed: &[&str]) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::shape(key, "an object", describe(value)));
        };
        if let Some((unknown, value)) = map
            .iter()
            .find(|(field, _)| !allowed.contains(&field.as_str()))
        {
            return Err(Error::shape(
                unknown.clone(),
                format!("one of `{}`", allowed.join("`, `")),
                describe(value),
            ));
        }
        Ok(Fields { map })
    }

    /// A present field. `null` is not a valid value for any field, so a
    /// null field is handed to the typed getters and rejected there.
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key)
    }

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn string(&self, key: &str) -> Result<Option<&'a str>> {
        self.get(key).map(|value| string(key, value)).transpose()
    }

    fn required_string(&self, key: &str) -> Result<&'a str> {
        self.string(key)?
            .ok_or_else(|| Error::shape(key, "a string", "nothing"))
    }

    fn required(&self, key: &str) -> Result<&'a Value> {
        self.get(key)
            .ok_or_else(|| Error::shape(key, "a value", "nothing"))
    }

    fn bool(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            None => Ok(false),
            Some(Value::Bool(flag)) => Ok(*flag),
            Some(other) => Err(Error::shape(key, "a boolean", describe(other))),
        }
    }

    fn strings(&self, key: &str) -> Result<Option<Vec<String>>> {
        self.get(key).map(|value| strings(key, value)).transpose()
    }

    /// Rejects payloads that give both or, when `required`, neither of two
    /// alternative keys.
    fn exclusive(&self, first: &str, second: &str, required: bool) -> Result<()> {
        match (self.has(first), self.has(second)) {
            (true, true) => Err(Error::shape(
                second,
                format!("either `{first}` or `{second}`"),
                "both",
            )),
            (false, false) if required => Err(Error::shape(
                first,
                format!("either `{first}` or `{second}`"),
                "neither",
            )),
            _ => Ok(()),
        }
    }
}

fn string<'a>(key: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::shape(key, "a string", describe(value)))
}

/// A single string or an array of strings.
fn strings(key: &str, value: &Value) -> Result<Vec<String>> {
    match value {
        Value::String(single) => Ok(vec![single.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| string(key, item).map(str::to_string))
            .collect(),
        other => Err(Error::shape(
            key,
            "a string or an array of strings",
            describe(other),
        )),
    }
}

/// Compact JSON for error messages, cut after a few dozen characters.
pub(crate) fn describe(value: &Value) -> String {
    let text = value.to_string();
    match text.char_indices().nth(DESCRIBE_LIMIT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text,
    }
}
