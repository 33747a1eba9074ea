//! WHERE, FOREACH and CALL.

use super::{keyword_raw, non_blank};
use crate::bind_param::{BindParam, SharedBindParam};
use crate::builder::QueryBuilder;
use crate::clause::{CallClause, ForEachClause, WhereClause};
use crate::error::{Error, Result};
use crate::escape::escape_if_needed;
use crate::where_params::Where;

/// Empty conditions render to nothing, not to a bare `WHERE`.
pub(super) fn render_where(clause: &WhereClause, bind_param: &mut BindParam) -> Result<String> {
    let text = match clause {
        WhereClause::Raw(raw) => return keyword_raw("WHERE", "where", raw),
        WhereClause::Params(params) => Where::new(params, bind_param).text(),
        WhereClause::Bound(bound) => bound.text(),
    };
    if text.is_empty() {
        return Ok(String::new());
    }
    Ok(format!("WHERE {text}"))
}

pub(super) fn render_for_each(
    for_each: &ForEachClause,
    bind_param: &mut BindParam,
    handle: &SharedBindParam,
) -> Result<String> {
    match for_each {
        ForEachClause::Raw(raw) => keyword_raw("FOREACH", "forEach", raw),
        ForEachClause::Body {
            variable,
            list,
            body,
        } => {
            let variable = escape_if_needed(non_blank("variable", variable)?);
            let list = non_blank("list", list)?;
            let body = nested("forEach", body, bind_param, handle)?;
            Ok(format!("FOREACH ({variable} IN {list} | {body})"))
        }
    }
}

pub(super) fn render_call(
    call: &CallClause,
    bind_param: &mut BindParam,
    handle: &SharedBindParam,
) -> Result<String> {
    match call {
        CallClause::Raw(raw) => keyword_raw("CALL", "call", raw),
        CallClause::Subquery(subquery) => {
            let body = nested("call", subquery, bind_param, handle)?;
            Ok(format!("CALL {{ {body} }}"))
        }
    }
}

// The nested builder binds into the parent's allocator, so it must have been
// created with the parent's handle.
fn nested(
    key: &str,
    builder: &QueryBuilder,
    bind_param: &mut BindParam,
    handle: &SharedBindParam,
) -> Result<String> {
    if !builder.shares_bind_param(handle) {
        return Err(Error::Composition(format!(
            "`{key}` body must be built with the enclosing query's bind parameters"
        )));
    }
    builder.render_nested(bind_param)
}
