//! Non-structural clauses.

use super::patterns::{array, json_value, properties, where_params};
use super::{Fields, describe, parse_payloads, string};
use crate::bind_param::SharedBindParam;
use crate::builder::QueryBuilder;
use crate::clause::{
    CallClause, DeleteClause, ForEachClause, OrderByClause, OrderByItem, Pagination, Projection,
    ProjectionClause, RemoveClause, ReturnItem, SetClause, SortDirection, UnwindClause,
    WhereClause,
};
use crate::error::{Error, Result};
use serde_json::Value;

pub(super) fn parse_set(key: &str, value: &Value) -> Result<SetClause> {
    if let Value::String(raw) = value {
        return Ok(SetClause::Raw(raw.clone()));
    }
    let fields = Fields::new(key, value, &["identifier", "properties"])?;
    Ok(SetClause::Properties {
        identifier: fields.required_string("identifier")?.to_string(),
        properties: properties("properties", fields.required("properties")?)?,
    })
}

pub(super) fn parse_remove(value: &Value) -> Result<RemoveClause> {
    if let Value::String(raw) = value {
        return Ok(RemoveClause::Raw(raw.clone()));
    }
    let fields = Fields::new("remove", value, &["identifier", "properties", "labels"])?;
    fields.exclusive("properties", "labels", true)?;
    let identifier = fields.required_string("identifier")?.to_string();
    if let Some(labels) = fields.strings("labels")? {
        return Ok(RemoveClause::Labels { identifier, labels });
    }
    Ok(RemoveClause::Properties {
        identifier,
        properties: fields.strings("properties")?.unwrap_or_default(),
    })
}

pub(super) fn parse_delete(value: &Value) -> Result<DeleteClause> {
    if let Value::String(raw) = value {
        return Ok(DeleteClause::Raw(raw.clone()));
    }
    let fields = Fields::new("delete", value, &["identifiers", "literal", "detach"])?;
    fields.exclusive("identifiers", "literal", true)?;
    let detach = fields.bool("detach")?;
    if let Some(literal) = fields.string("literal")? {
        return Ok(DeleteClause::Literal {
            literal: literal.to_string(),
            detach,
        });
    }
    Ok(DeleteClause::Identifiers {
        identifiers: fields.strings("identifiers")?.unwrap_or_default(),
        detach,
    })
}

/// `"a, b"`, `["a", {"identifier": "b", "property": "x", "alias": "y"}]`, or
/// `{"items": [...], "distinct": true}`.
pub(super) fn parse_projection(key: &str, value: &Value) -> Result<ProjectionClause> {
    match value {
        Value::Object(_) => {
            let fields = Fields::new(key, value, &["items", "distinct"])?;
            Ok(ProjectionClause {
                projection: projection(key, fields.required("items")?)?,
                distinct: fields.bool("distinct")?,
            })
        }
        other => Ok(ProjectionClause::new(projection(key, other)?)),
    }
}

fn projection(key: &str, value: &Value) -> Result<Projection> {
    match value {
        Value::String(raw) => Ok(Projection::Raw(raw.clone())),
        Value::Array(items) if items.iter().all(Value::is_string) => Ok(Projection::Names(
            items
                .iter()
                .map(|item| string(key, item).map(str::to_string))
                .collect::<Result<_>>()?,
        )),
        Value::Array(items) => Ok(Projection::Items(
            items
                .iter()
                .map(|item| return_item(key, item))
                .collect::<Result<_>>()?,
        )),
        other => Err(Error::shape(
            key,
            "a string or an array of projection items",
            describe(other),
        )),
    }
}

fn return_item(key: &str, value: &Value) -> Result<ReturnItem> {
    if let Value::String(identifier) = value {
        return Ok(ReturnItem::new(identifier.clone()));
    }
    let fields = Fields::new(key, value, &["identifier", "property", "alias"])?;
    Ok(ReturnItem {
        identifier: fields.required_string("identifier")?.to_string(),
        property: fields.string("property")?.map(str::to_string),
        alias: fields.string("alias")?.map(str::to_string),
    })
}

pub(super) fn parse_order_by(value: &Value) -> Result<OrderByClause> {
    match value {
        Value::String(raw) => Ok(OrderByClause::Raw(raw.clone())),
        Value::Array(items) => Ok(OrderByClause::Items(
            items.iter().map(order_by_item).collect::<Result<_>>()?,
        )),
        Value::Object(_) => Ok(OrderByClause::Items(vec![order_by_item(value)?])),
        other => Err(Error::shape(
            "orderBy",
            "a string, an object or an array",
            describe(other),
        )),
    }
}

fn order_by_item(value: &Value) -> Result<OrderByItem> {
    if let Value::String(identifier) = value {
        return Ok(OrderByItem::new(identifier.clone()));
    }
    let fields = Fields::new("orderBy", value, &["identifier", "property", "direction"])?;
    let direction = match fields.string("direction")? {
        None => None,
        Some(direction) if direction.eq_ignore_ascii_case("asc") => Some(SortDirection::Ascending),
        Some(direction) if direction.eq_ignore_ascii_case("desc") => {
            Some(SortDirection::Descending)
        }
        Some(other) => {
            return Err(Error::shape(
                "direction",
                "`ASC` or `DESC`",
                format!("{other:?}"),
            ));
        }
    };
    Ok(OrderByItem {
        identifier: fields.required_string("identifier")?.to_string(),
        property: fields.string("property")?.map(str::to_string),
        direction,
    })
}

pub(super) fn parse_unwind(value: &Value) -> Result<UnwindClause> {
    if let Value::String(raw) = value {
        return Ok(UnwindClause::Raw(raw.clone()));
    }
    let fields = Fields::new("unwind", value, &["value", "values", "as"])?;
    fields.exclusive("value", "values", true)?;
    let alias = fields.required_string("as")?.to_string();
    if let Some(value) = fields.string("value")? {
        return Ok(UnwindClause::Expression {
            value: value.to_string(),
            alias,
        });
    }
    let values = match fields.required("values")? {
        Value::Array(values) => values
            .iter()
            .map(|value| json_value("values", value))
            .collect::<Result<Vec<_>>>()?,
        other => return Err(Error::shape("values", "an array", describe(other))),
    };
    Ok(UnwindClause::Values { values, alias })
}

pub(super) fn parse_pagination(key: &str, value: &Value) -> Result<Pagination> {
    match value {
        Value::String(raw) => Ok(Pagination::Raw(raw.clone())),
        Value::Number(number) => number
            .as_u64()
            .map(Pagination::Count)
            .ok_or_else(|| Error::shape(key, "a non-negative integer", number.to_string())),
        other => Err(Error::shape(
            key,
            "a non-negative integer or a string",
            describe(other),
        )),
    }
}

pub(super) fn parse_where(value: &Value) -> Result<WhereClause> {
    match value {
        Value::String(raw) => Ok(WhereClause::Raw(raw.clone())),
        other => Ok(WhereClause::Params(where_params("where", other)?)),
    }
}

/// `{"variable": "x", "list": "nodes(p)", "body": [payloads]}`
pub(super) fn parse_for_each(
    value: &Value,
    bind_param: &SharedBindParam,
) -> Result<ForEachClause> {
    if let Value::String(raw) = value {
        return Ok(ForEachClause::Raw(raw.clone()));
    }
    let fields = Fields::new("forEach", value, &["variable", "list", "body"])?;
    Ok(ForEachClause::Body {
        variable: fields.required_string("variable")?.to_string(),
        list: fields.required_string("list")?.to_string(),
        body: nested("body", fields.required("body")?, bind_param)?,
    })
}

pub(super) fn parse_call(value: &Value, bind_param: &SharedBindParam) -> Result<CallClause> {
    match value {
        Value::String(raw) => Ok(CallClause::Raw(raw.clone())),
        other => Ok(CallClause::Subquery(nested("call", other, bind_param)?)),
    }
}

fn nested(key: &str, value: &Value, bind_param: &SharedBindParam) -> Result<QueryBuilder> {
    if let Value::Array(_) = value {
        array(key, value)?;
    }
    let clauses = parse_payloads(value, bind_param)?;
    Ok(QueryBuilder::with_bind_param(bind_param.clone()).add_all(clauses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cypherkit_api::PropertyValue;
    use serde_json::json;

    #[test]
    fn integers_beyond_i64_are_rejected() {
        let err = parse_set(
            "set",
            &json!({ "identifier": "n", "properties": { "id": u64::MAX } }),
        )
        .expect_err("u64::MAX");
        assert!(matches!(
            err,
            Error::Shape { ref key, ref expected, ref actual }
                if key == "id"
                    && expected == "an integer within i64 or a float"
                    && actual == "18446744073709551615"
        ));

        let err = parse_unwind(&json!({ "values": [1, u64::MAX], "as": "x" }))
            .expect_err("u64::MAX in list");
        assert_eq!(err.key(), Some("values"));
    }

    #[test]
    fn set_requires_identifier_and_properties() {
        let set = parse_set("set", &json!({ "identifier": "n", "properties": { "a": 1 } }))
            .expect("parse");
        assert!(matches!(set, SetClause::Properties { identifier, .. } if identifier == "n"));
        let err = parse_set("onCreateSet", &json!({ "identifier": "n" })).expect_err("missing");
        assert_eq!(err.key(), Some("properties"));
    }

    #[test]
    fn remove_takes_labels_or_properties() {
        assert_eq!(
            parse_remove(&json!({ "identifier": "n", "labels": "Old" })).expect("labels"),
            RemoveClause::Labels {
                identifier: "n".into(),
                labels: vec!["Old".into()]
            }
        );
        let err = parse_remove(&json!({ "identifier": "n" })).expect_err("neither");
        assert_eq!(err.key(), Some("properties"));
    }

    #[test]
    fn delete_shapes() {
        assert_eq!(
            parse_delete(&json!({ "identifiers": ["a", "b"], "detach": true })).expect("parse"),
            DeleteClause::identifiers(["a", "b"], true)
        );
        let err = parse_delete(&json!({ "identifiers": "a", "literal": "b" })).expect_err("both");
        assert_eq!(err.key(), Some("literal"));
        let err = parse_delete(&json!({ "identifiers": ["a"], "detach": "yes" }))
            .expect_err("not a bool");
        assert_eq!(err.key(), Some("detach"));
    }

    #[test]
    fn null_fields_are_type_errors() {
        let err = parse_delete(&json!({ "identifiers": ["n"], "detach": null }))
            .expect_err("null flag");
        assert!(matches!(
            &err,
            Error::Shape { key, expected, actual }
                if key == "detach" && expected == "a boolean" && actual == "null"
        ));
        let err = parse_delete(&json!({ "identifiers": null })).expect_err("null names");
        assert_eq!(err.key(), Some("identifiers"));
    }

    #[test]
    fn projections() {
        assert_eq!(
            parse_projection("return", &json!(["a", "b"])).expect("names"),
            ProjectionClause::new(["a", "b"])
        );
        assert_eq!(
            parse_projection(
                "with",
                &json!({ "items": ["a", { "identifier": "b", "alias": "c" }], "distinct": true })
            )
            .expect("items"),
            ProjectionClause::distinct(vec![ReturnItem::new("a"), ReturnItem::new("b").alias("c")])
        );
        assert!(parse_projection("return", &json!(3)).is_err());
    }

    #[test]
    fn order_by_directions() {
        assert_eq!(
            parse_order_by(&json!([{ "identifier": "n", "property": "x", "direction": "desc" }, "m"]))
                .expect("parse"),
            OrderByClause::Items(vec![
                OrderByItem::new("n").property("x").descending(),
                OrderByItem::new("m"),
            ])
        );
        let err = parse_order_by(&json!({ "identifier": "n", "direction": "up" }))
            .expect_err("direction");
        assert_eq!(err.key(), Some("direction"));
    }

    #[test]
    fn unwind_shapes() {
        assert_eq!(
            parse_unwind(&json!({ "values": [1, 2], "as": "x" })).expect("values"),
            UnwindClause::Values {
                values: vec![PropertyValue::Int(1), PropertyValue::Int(2)],
                alias: "x".into()
            }
        );
        let err = parse_unwind(&json!({ "value": "list" })).expect_err("alias");
        assert_eq!(err.key(), Some("as"));
    }

    #[test]
    fn pagination_rejects_negative_and_fractional_counts() {
        assert_eq!(parse_pagination("limit", &json!(10)).expect("count"), Pagination::Count(10));
        assert_eq!(
            parse_pagination("skip", &json!("$offset")).expect("raw"),
            Pagination::Raw("$offset".into())
        );
        assert_eq!(
            parse_pagination("skip", &json!(-1)).expect_err("negative").key(),
            Some("skip")
        );
        assert_eq!(
            parse_pagination("limit", &json!(1.5)).expect_err("fraction").key(),
            Some("limit")
        );
    }

    #[test]
    fn nested_bodies_share_the_allocator() {
        let handle = SharedBindParam::new();
        let CallClause::Subquery(subquery) =
            parse_call(&json!([{ "raw": "RETURN 1" }]), &handle).expect("call")
        else {
            panic!("expected a subquery");
        };
        assert!(subquery.shared_bind_param().same_as(&handle));

        let err = parse_for_each(
            &json!({ "variable": "x", "list": "xs", "body": [] }),
            &handle,
        )
        .expect_err("empty body");
        assert_eq!(err.key(), Some("body"));
    }
}
