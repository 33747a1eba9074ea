//! Clause dispatch: one renderer per keyword.

mod control;
mod projection;
mod structural;
mod update;

use crate::bind_param::{BindParam, SharedBindParam};
use crate::clause::Clause;
use crate::error::{Error, Result};

pub(crate) use update::set_parts;

/// Renders one clause, binding its values through `bind_param`.
///
/// `handle` is the allocator `bind_param` was borrowed from; nested builders
/// must point at the same one.
pub(crate) fn render_clause(
    clause: &Clause,
    bind_param: &mut BindParam,
    handle: &SharedBindParam,
) -> Result<String> {
    match clause {
        Clause::Match(clause) => structural::render_match(clause, bind_param),
        Clause::Create(pattern) => structural::render_create("CREATE", "create", pattern, bind_param),
        Clause::Merge(pattern) => structural::render_create("MERGE", "merge", pattern, bind_param),
        Clause::Set(set) => update::render_set("SET", "set", set, bind_param),
        Clause::OnCreateSet(set) => update::render_set("ON CREATE SET", "onCreateSet", set, bind_param),
        Clause::OnMatchSet(set) => update::render_set("ON MATCH SET", "onMatchSet", set, bind_param),
        Clause::Remove(remove) => update::render_remove(remove),
        Clause::Delete(delete) => update::render_delete(delete),
        Clause::Return(projection) => projection::render_projection("RETURN", "return", projection),
        Clause::With(projection) => projection::render_projection("WITH", "with", projection),
        Clause::OrderBy(order_by) => projection::render_order_by(order_by),
        Clause::Unwind(unwind) => projection::render_unwind(unwind, bind_param),
        Clause::Skip(skip) => projection::render_pagination("SKIP", "skip", skip, bind_param),
        Clause::Limit(limit) => projection::render_pagination("LIMIT", "limit", limit, bind_param),
        Clause::Where(clause) => control::render_where(clause, bind_param),
        Clause::ForEach(for_each) => control::render_for_each(for_each, bind_param, handle),
        Clause::Call(call) => control::render_call(call, bind_param, handle),
        Clause::Raw(raw) => non_blank("raw", raw).map(str::to_string),
    }
}

/// `KEYWORD raw`, rejecting blank raw text.
fn keyword_raw(keyword: &str, key: &str, raw: &str) -> Result<String> {
    Ok(format!("{keyword} {}", non_blank(key, raw)?))
}

fn non_blank<'a>(key: &str, text: &'a str) -> Result<&'a str> {
    if text.trim().is_empty() {
        return Err(Error::shape(key, "a non-empty string", format!("{text:?}")));
    }
    Ok(text)
}

fn non_empty<T>(key: &str, items: &[T]) -> Result<()> {
    if items.is_empty() {
        return Err(Error::shape(key, "a non-empty list", "[]"));
    }
    Ok(())
}
