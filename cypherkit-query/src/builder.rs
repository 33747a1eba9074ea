//! The query orchestrator.

use crate::bind_param::{BindParam, SharedBindParam};
use crate::clause::{
    CallClause, Clause, DeleteClause, ForEachClause, MatchClause, OrderByClause, Pagination,
    PatternClause, Projection, ProjectionClause, RemoveClause, SetClause, UnwindClause,
    WhereClause,
};
use crate::error::Result;
use crate::escape::escape_if_needed;
use crate::pattern::{self, Label, Properties};
use crate::payload;
use crate::render::{self, render_clause};
use crate::value::Params;
use serde::Serialize;
use tracing::debug;

/// A compiled statement and the parameters it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub statement: String,
    pub parameters: Params,
}

/// Accumulates clauses and compiles them, in insertion order, into one
/// parameterized statement.
///
/// Clauses are rendered once. Later calls to [`QueryBuilder::statement`]
/// only render clauses added since, so parameters are never registered
/// twice.
///
/// # Example
///
/// ```ignore
/// let mut query = QueryBuilder::new()
///     .r#match(NodePattern::new().identifier("a").label("MyLabel").r#where(
///         PropertyConditions::new().eq("id", "20"),
///     ))
///     .r#return(["a"]);
/// assert_eq!(query.statement()?, "MATCH (a:MyLabel { id: $id }) RETURN a");
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    clauses: Vec<Clause>,
    fragments: Vec<String>,
    bind_param: SharedBindParam,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder that binds through `bind_param`. Builders nested with
    /// [`QueryBuilder::call`] or [`QueryBuilder::for_each`] must be created
    /// this way with their parent's handle.
    pub fn with_bind_param(bind_param: SharedBindParam) -> Self {
        QueryBuilder {
            bind_param,
            ..Self::default()
        }
    }

    /// An empty builder sharing this builder's bind parameters.
    pub fn subquery(&self) -> Self {
        Self::with_bind_param(self.bind_param.clone())
    }

    pub fn push(&mut self, clause: Clause) -> &mut Self {
        self.clauses.push(clause);
        self
    }

    pub fn add(mut self, clause: Clause) -> Self {
        self.push(clause);
        self
    }

    pub fn add_all(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.clauses.extend(clauses);
        self
    }

    /// Parses one payload object, or an array of them, and appends the
    /// clauses. Nothing is appended if any payload is invalid.
    pub fn add_json(&mut self, payload: &serde_json::Value) -> Result<&mut Self> {
        let clauses = payload::parse_payloads(payload, &self.bind_param)?;
        self.clauses.extend(clauses);
        Ok(self)
    }

    pub fn add_json_str(&mut self, payload: &str) -> Result<&mut Self> {
        let value: serde_json::Value = serde_json::from_str(payload)?;
        self.add_json(&value)
    }

    pub fn r#match(self, pattern: impl Into<PatternClause>) -> Self {
        self.add(Clause::Match(MatchClause::new(pattern)))
    }

    pub fn optional_match(self, pattern: impl Into<PatternClause>) -> Self {
        self.add(Clause::Match(MatchClause::optional(pattern)))
    }

    pub fn create(self, pattern: impl Into<PatternClause>) -> Self {
        self.add(Clause::Create(pattern.into()))
    }

    pub fn merge(self, pattern: impl Into<PatternClause>) -> Self {
        self.add(Clause::Merge(pattern.into()))
    }

    pub fn set(self, set: impl Into<SetClause>) -> Self {
        self.add(Clause::Set(set.into()))
    }

    pub fn on_create_set(self, set: impl Into<SetClause>) -> Self {
        self.add(Clause::OnCreateSet(set.into()))
    }

    pub fn on_match_set(self, set: impl Into<SetClause>) -> Self {
        self.add(Clause::OnMatchSet(set.into()))
    }

    pub fn remove(self, remove: impl Into<RemoveClause>) -> Self {
        self.add(Clause::Remove(remove.into()))
    }

    pub fn delete(self, delete: impl Into<DeleteClause>) -> Self {
        self.add(Clause::Delete(delete.into()))
    }

    pub fn r#return(self, projection: impl Into<Projection>) -> Self {
        self.add(Clause::Return(ProjectionClause::new(projection)))
    }

    pub fn return_distinct(self, projection: impl Into<Projection>) -> Self {
        self.add(Clause::Return(ProjectionClause::distinct(projection)))
    }

    pub fn order_by(self, order_by: impl Into<OrderByClause>) -> Self {
        self.add(Clause::OrderBy(order_by.into()))
    }

    pub fn with(self, projection: impl Into<Projection>) -> Self {
        self.add(Clause::With(ProjectionClause::new(projection)))
    }

    pub fn with_distinct(self, projection: impl Into<Projection>) -> Self {
        self.add(Clause::With(ProjectionClause::distinct(projection)))
    }

    pub fn unwind(self, unwind: impl Into<UnwindClause>) -> Self {
        self.add(Clause::Unwind(unwind.into()))
    }

    /// `SKIP $skip`
    pub fn skip(self, count: u64) -> Self {
        self.add(Clause::Skip(Pagination::Count(count)))
    }

    /// `LIMIT $limit`
    pub fn limit(self, count: u64) -> Self {
        self.add(Clause::Limit(Pagination::Count(count)))
    }

    pub fn r#where(self, conditions: impl Into<WhereClause>) -> Self {
        self.add(Clause::Where(conditions.into()))
    }

    /// `FOREACH (variable IN list | body)`; `list` is spliced unescaped.
    pub fn for_each(
        self,
        variable: impl Into<String>,
        list: impl Into<String>,
        body: QueryBuilder,
    ) -> Self {
        self.add(Clause::ForEach(ForEachClause::Body {
            variable: variable.into(),
            list: list.into(),
            body,
        }))
    }

    pub fn call(self, call: impl Into<CallClause>) -> Self {
        self.add(Clause::Call(call.into()))
    }

    /// Appends trusted text verbatim.
    pub fn raw(self, raw: impl Into<String>) -> Self {
        self.add(Clause::Raw(raw.into()))
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Renders the clauses added since the last call and returns the whole
    /// statement, whitespace runs collapsed to single spaces.
    ///
    /// If a clause fails to render, none of the clauses rendered by this call
    /// are kept and the bind parameters are restored.
    pub fn statement(&mut self) -> Result<String> {
        let rendered = self.fragments.len();
        if rendered < self.clauses.len() {
            let mut bind_param = self.bind_param.try_borrow_mut()?;
            let checkpoint = bind_param.clone();
            for clause in &self.clauses[rendered..] {
                match render_clause(clause, &mut bind_param, &self.bind_param) {
                    Ok(fragment) => self.fragments.push(fragment),
                    Err(err) => {
                        *bind_param = checkpoint;
                        self.fragments.truncate(rendered);
                        debug!(clause = clause.key(), error = %err, "clause failed to render");
                        return Err(err);
                    }
                }
            }
            debug!(
                clauses = self.clauses.len(),
                parameters = bind_param.len(),
                "rendered statement"
            );
        }
        Ok(normalize(&self.fragments))
    }

    /// Snapshot of the bound parameters.
    pub fn bind_param(&self) -> Params {
        self.bind_param.get()
    }

    pub fn shared_bind_param(&self) -> &SharedBindParam {
        &self.bind_param
    }

    pub fn compile(&mut self) -> Result<CompiledQuery> {
        let statement = self.statement()?;
        Ok(CompiledQuery {
            statement,
            parameters: self.bind_param(),
        })
    }

    /// Compiles and hands the statement and its parameters to `executor`,
    /// which usually returns a future.
    pub fn run<F, R>(&mut self, executor: F) -> Result<R>
    where
        F: FnOnce(String, Params) -> R,
    {
        let CompiledQuery {
            statement,
            parameters,
        } = self.compile()?;
        Ok(executor(statement, parameters))
    }

    /// `n:Label`, or `n` when there is no label.
    pub fn identifier_with_label(identifier: &str, label: Option<&Label>) -> String {
        let identifier = escape_if_needed(identifier);
        match label.map(Label::render).filter(|label| !label.is_empty()) {
            Some(label) => format!("{identifier}:{label}"),
            None => identifier,
        }
    }

    /// `n.a = $a, n.b = $b`
    pub fn set_parts(
        identifier: &str,
        properties: &Properties,
        bind_param: &mut BindParam,
    ) -> Result<String> {
        render::set_parts(identifier, properties, bind_param)
    }

    /// `{ a: $a, b: $b }`
    pub fn properties_with_params(properties: &Properties, bind_param: &mut BindParam) -> String {
        pattern::properties_with_params(properties, bind_param)
    }

    pub(crate) fn shares_bind_param(&self, handle: &SharedBindParam) -> bool {
        self.bind_param.same_as(handle)
    }

    // Renders into a parent's allocator without touching this builder's
    // cache; cached fragments are already bound there.
    pub(crate) fn render_nested(&self, bind_param: &mut BindParam) -> Result<String> {
        let mut fragments = self.fragments.clone();
        for clause in &self.clauses[self.fragments.len()..] {
            fragments.push(render_clause(clause, bind_param, &self.bind_param)?);
        }
        Ok(normalize(&fragments))
    }
}

// Joins fragments with single spaces and collapses whitespace runs, except
// inside backtick-quoted names and string literals, which are copied as is.
fn normalize(fragments: &[String]) -> String {
    let mut out = String::new();
    for fragment in fragments {
        let mut quote: Option<char> = None;
        let mut escaped = false;
        let mut space = !out.is_empty();
        for c in fragment.chars() {
            if let Some(open) = quote {
                out.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' && open != '`' {
                    escaped = true;
                } else if c == open {
                    quote = None;
                }
                continue;
            }
            if c.is_whitespace() {
                space = !out.is_empty();
                continue;
            }
            if space {
                out.push(' ');
                space = false;
            }
            if matches!(c, '`' | '\'' | '"') {
                quote = Some(c);
            }
            out.push(c);
        }
    }
    out
}
