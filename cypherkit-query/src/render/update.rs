//! SET, ON CREATE SET, ON MATCH SET, REMOVE and DELETE.

use super::{keyword_raw, non_blank, non_empty};
use crate::bind_param::BindParam;
use crate::clause::{DeleteClause, RemoveClause, SetClause};
use crate::error::{Error, Result};
use crate::escape::{escape_if_needed, escape_joined};
use crate::pattern::Properties;
use crate::value::Operand;

pub(super) fn render_set(
    keyword: &str,
    key: &str,
    set: &SetClause,
    bind_param: &mut BindParam,
) -> Result<String> {
    match set {
        SetClause::Raw(raw) => keyword_raw(keyword, key, raw),
        SetClause::Properties {
            identifier,
            properties,
        } => Ok(format!(
            "{keyword} {}",
            set_parts(identifier, properties, bind_param)?
        )),
    }
}

/// `n.a = $a, n.b = $b`
pub(crate) fn set_parts(
    identifier: &str,
    properties: &Properties,
    bind_param: &mut BindParam,
) -> Result<String> {
    non_blank("identifier", identifier)?;
    if properties.is_empty() {
        return Err(Error::shape("properties", "a non-empty map", "{}"));
    }
    let identifier = escape_if_needed(identifier);
    let parts = properties
        .iter()
        .map(|(name, operand)| {
            let value = match operand {
                Operand::Value(value) => {
                    format!("${}", escape_if_needed(&bind_param.add(name, value.clone())))
                }
                Operand::Literal(literal) => literal.as_str().to_string(),
            };
            format!("{identifier}.{} = {value}", escape_if_needed(name))
        })
        .collect::<Vec<_>>();
    Ok(parts.join(", "))
}

pub(super) fn render_remove(remove: &RemoveClause) -> Result<String> {
    match remove {
        RemoveClause::Raw(raw) => keyword_raw("REMOVE", "remove", raw),
        RemoveClause::Properties {
            identifier,
            properties,
        } => {
            non_blank("identifier", identifier)?;
            non_empty("properties", properties)?;
            let identifier = escape_if_needed(identifier);
            let parts = properties
                .iter()
                .map(|property| format!("{identifier}.{}", escape_if_needed(property)))
                .collect::<Vec<_>>();
            Ok(format!("REMOVE {}", parts.join(", ")))
        }
        RemoveClause::Labels { identifier, labels } => {
            non_blank("identifier", identifier)?;
            non_empty("labels", labels)?;
            Ok(format!(
                "REMOVE {}:{}",
                escape_if_needed(identifier),
                escape_joined(labels, ":")
            ))
        }
    }
}

pub(super) fn render_delete(delete: &DeleteClause) -> Result<String> {
    let (target, detach) = match delete {
        DeleteClause::Raw(raw) => return keyword_raw("DELETE", "delete", raw),
        DeleteClause::Identifiers {
            identifiers,
            detach,
        } => {
            non_empty("identifiers", identifiers)?;
            (escape_joined(identifiers, ", "), *detach)
        }
        DeleteClause::Literal { literal, detach } => {
            (non_blank("literal", literal)?.to_string(), *detach)
        }
    };
    let keyword = if detach { "DETACH DELETE" } else { "DELETE" };
    Ok(format!("{keyword} {target}"))
}
