//! Compiles typed clause payloads into one parameterized Cypher statement.
//!
//! Names are escaped with backticks when needed and every value is bound
//! through a [`BindParam`] allocator, so the statement text never contains
//! caller data. The exceptions are raw strings and [`Literal`] operands,
//! which are spliced verbatim and must only carry trusted text.

pub mod bind_param;
pub mod builder;
pub mod clause;
pub mod error;
pub mod escape;
pub mod pattern;
pub mod payload;
mod render;
pub mod value;
pub mod where_params;

pub use bind_param::{BindParam, COLLISION_SUFFIX, SharedBindParam};
pub use builder::{CompiledQuery, QueryBuilder};
pub use clause::{
    CallClause, Clause, DeleteClause, ForEachClause, MatchClause, OrderByClause, OrderByItem,
    Pagination, PatternClause, PatternElement, Projection, ProjectionClause, RemoveClause,
    ReturnItem, SetClause, SortDirection, UnwindClause, WhereClause,
};
pub use cypherkit_api::{Labeled, Point, PropertyValue};
pub use error::{Error, Result};
pub use escape::{escape_if_needed, needs_escaping};
pub use pattern::{
    CompiledPattern, HopBound, Label, NodeDescriptor, NodePattern, PatternFilter, PatternMode,
    Properties, RelationshipDescriptor, RelationshipDirection, RelationshipPattern,
    compile_node, compile_relationship,
};
pub use value::{Literal, Operand, Params};
pub use where_params::{Condition, Operator, PropertyConditions, Where, WhereParams};

/// Compiles a JSON payload (one object or an array) with a fresh allocator.
pub fn compile_json(payload: &serde_json::Value) -> Result<CompiledQuery> {
    let mut builder = QueryBuilder::new();
    builder.add_json(payload)?;
    builder.compile()
}
