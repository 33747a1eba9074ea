//! Typed clause payloads, one variant per statement keyword.
//!
//! Every payload can be given as a trusted raw string, which is spliced after
//! the keyword without escaping or binding, or as a structured value whose
//! names are escaped and whose values are bound.

use crate::builder::QueryBuilder;
use crate::pattern::{
    NodeDescriptor, NodePattern, Properties, RelationshipDescriptor, RelationshipPattern,
};
use crate::where_params::{Where, WhereParams};
use cypherkit_api::PropertyValue;

#[derive(Debug, Clone)]
pub enum Clause {
    Match(MatchClause),
    Create(PatternClause),
    Merge(PatternClause),
    Set(SetClause),
    OnCreateSet(SetClause),
    OnMatchSet(SetClause),
    Remove(RemoveClause),
    Delete(DeleteClause),
    Return(ProjectionClause),
    OrderBy(OrderByClause),
    With(ProjectionClause),
    Unwind(UnwindClause),
    Skip(Pagination),
    Limit(Pagination),
    Where(WhereClause),
    ForEach(ForEachClause),
    Call(CallClause),
    /// Spliced verbatim.
    Raw(String),
}

impl Clause {
    /// Keyword of the payload as used in JSON payloads.
    pub fn key(&self) -> &'static str {
        match self {
            Clause::Match(_) => "match",
            Clause::Create(_) => "create",
            Clause::Merge(_) => "merge",
            Clause::Set(_) => "set",
            Clause::OnCreateSet(_) => "onCreateSet",
            Clause::OnMatchSet(_) => "onMatchSet",
            Clause::Remove(_) => "remove",
            Clause::Delete(_) => "delete",
            Clause::Return(_) => "return",
            Clause::OrderBy(_) => "orderBy",
            Clause::With(_) => "with",
            Clause::Unwind(_) => "unwind",
            Clause::Skip(_) => "skip",
            Clause::Limit(_) => "limit",
            Clause::Where(_) => "where",
            Clause::ForEach(_) => "forEach",
            Clause::Call(_) => "call",
            Clause::Raw(_) => "raw",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchClause {
    pub pattern: PatternClause,
    pub optional: bool,
}

impl MatchClause {
    pub fn new(pattern: impl Into<PatternClause>) -> Self {
        MatchClause {
            pattern: pattern.into(),
            optional: false,
        }
    }

    pub fn optional(pattern: impl Into<PatternClause>) -> Self {
        MatchClause {
            pattern: pattern.into(),
            optional: true,
        }
    }
}

/// The pattern of a MATCH, CREATE or MERGE.
#[derive(Debug, Clone, PartialEq)]
pub enum PatternClause {
    /// Spliced after the keyword.
    Literal(String),
    Node(NodeDescriptor),
    /// Comma-separated sibling nodes.
    Multiple(Vec<NodeDescriptor>),
    /// A path: nodes at even positions, relationships at odd ones, starting
    /// and ending with a node.
    Related(Vec<PatternElement>),
}

impl PatternClause {
    pub fn multiple<I, N>(nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<NodeDescriptor>,
    {
        PatternClause::Multiple(nodes.into_iter().map(Into::into).collect())
    }

    pub fn related(elements: impl IntoIterator<Item = PatternElement>) -> Self {
        PatternClause::Related(elements.into_iter().collect())
    }
}

impl From<NodePattern> for PatternClause {
    fn from(node: NodePattern) -> Self {
        PatternClause::Node(node.into())
    }
}

impl From<NodeDescriptor> for PatternClause {
    fn from(node: NodeDescriptor) -> Self {
        PatternClause::Node(node)
    }
}

impl From<&str> for PatternClause {
    fn from(literal: &str) -> Self {
        PatternClause::Literal(literal.to_string())
    }
}

impl From<String> for PatternClause {
    fn from(literal: String) -> Self {
        PatternClause::Literal(literal)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatternElement {
    Node(NodeDescriptor),
    Relationship(RelationshipDescriptor),
}

impl PatternElement {
    pub fn is_node(&self) -> bool {
        matches!(self, PatternElement::Node(_))
    }
}

impl From<NodePattern> for PatternElement {
    fn from(node: NodePattern) -> Self {
        PatternElement::Node(node.into())
    }
}

impl From<NodeDescriptor> for PatternElement {
    fn from(node: NodeDescriptor) -> Self {
        PatternElement::Node(node)
    }
}

impl From<RelationshipPattern> for PatternElement {
    fn from(relationship: RelationshipPattern) -> Self {
        PatternElement::Relationship(relationship.into())
    }
}

impl From<RelationshipDescriptor> for PatternElement {
    fn from(relationship: RelationshipDescriptor) -> Self {
        PatternElement::Relationship(relationship)
    }
}

/// SET, ON CREATE SET and ON MATCH SET.
#[derive(Debug, Clone, PartialEq)]
pub enum SetClause {
    Raw(String),
    /// `n.a = $a, n.b = $b`
    Properties {
        identifier: String,
        properties: Properties,
    },
}

impl SetClause {
    pub fn properties(identifier: impl Into<String>, properties: Properties) -> Self {
        SetClause::Properties {
            identifier: identifier.into(),
            properties,
        }
    }
}

impl From<&str> for SetClause {
    fn from(raw: &str) -> Self {
        SetClause::Raw(raw.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RemoveClause {
    Raw(String),
    /// `n.a, n.b`
    Properties {
        identifier: String,
        properties: Vec<String>,
    },
    /// `n:A:B`
    Labels {
        identifier: String,
        labels: Vec<String>,
    },
}

impl From<&str> for RemoveClause {
    fn from(raw: &str) -> Self {
        RemoveClause::Raw(raw.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteClause {
    Raw(String),
    Identifiers {
        identifiers: Vec<String>,
        detach: bool,
    },
    /// Unescaped delete target with an optional DETACH.
    Literal { literal: String, detach: bool },
}

impl DeleteClause {
    pub fn identifiers<I, S>(identifiers: I, detach: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DeleteClause::Identifiers {
            identifiers: identifiers.into_iter().map(Into::into).collect(),
            detach,
        }
    }
}

impl From<&str> for DeleteClause {
    fn from(raw: &str) -> Self {
        DeleteClause::Raw(raw.to_string())
    }
}

/// RETURN and WITH.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionClause {
    pub projection: Projection,
    pub distinct: bool,
}

impl ProjectionClause {
    pub fn new(projection: impl Into<Projection>) -> Self {
        ProjectionClause {
            projection: projection.into(),
            distinct: false,
        }
    }

    pub fn distinct(projection: impl Into<Projection>) -> Self {
        ProjectionClause {
            projection: projection.into(),
            distinct: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Raw(String),
    /// Escaped identifiers.
    Names(Vec<String>),
    Items(Vec<ReturnItem>),
}

impl From<&str> for Projection {
    fn from(raw: &str) -> Self {
        Projection::Raw(raw.to_string())
    }
}

impl From<Vec<&str>> for Projection {
    fn from(names: Vec<&str>) -> Self {
        Projection::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Projection {
    fn from(names: [&str; N]) -> Self {
        Projection::Names(names.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<ReturnItem>> for Projection {
    fn from(items: Vec<ReturnItem>) -> Self {
        Projection::Items(items)
    }
}

/// `identifier[.property] [AS alias]`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnItem {
    pub identifier: String,
    pub property: Option<String>,
    pub alias: Option<String>,
}

impl ReturnItem {
    pub fn new(identifier: impl Into<String>) -> Self {
        ReturnItem {
            identifier: identifier.into(),
            property: None,
            alias: None,
        }
    }

    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrderByClause {
    Raw(String),
    Items(Vec<OrderByItem>),
}

impl From<&str> for OrderByClause {
    fn from(raw: &str) -> Self {
        OrderByClause::Raw(raw.to_string())
    }
}

impl From<Vec<OrderByItem>> for OrderByClause {
    fn from(items: Vec<OrderByItem>) -> Self {
        OrderByClause::Items(items)
    }
}

impl From<OrderByItem> for OrderByClause {
    fn from(item: OrderByItem) -> Self {
        OrderByClause::Items(vec![item])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub identifier: String,
    pub property: Option<String>,
    pub direction: Option<SortDirection>,
}

impl OrderByItem {
    pub fn new(identifier: impl Into<String>) -> Self {
        OrderByItem {
            identifier: identifier.into(),
            property: None,
            direction: None,
        }
    }

    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn ascending(mut self) -> Self {
        self.direction = Some(SortDirection::Ascending);
        self
    }

    pub fn descending(mut self) -> Self {
        self.direction = Some(SortDirection::Descending);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnwindClause {
    Raw(String),
    /// `UNWIND value AS alias`, `value` spliced unescaped.
    Expression { value: String, alias: String },
    /// The list is bound as one parameter.
    Values {
        values: Vec<PropertyValue>,
        alias: String,
    },
}

impl From<&str> for UnwindClause {
    fn from(raw: &str) -> Self {
        UnwindClause::Raw(raw.to_string())
    }
}

/// SKIP and LIMIT.
#[derive(Debug, Clone, PartialEq)]
pub enum Pagination {
    /// Always bound, never spliced.
    Count(u64),
    Raw(String),
}

impl From<u64> for Pagination {
    fn from(count: u64) -> Self {
        Pagination::Count(count)
    }
}

impl From<&str> for Pagination {
    fn from(raw: &str) -> Self {
        Pagination::Raw(raw.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhereClause {
    Raw(String),
    Params(WhereParams),
    /// Conditions bound earlier through the builder's own allocator.
    Bound(Where),
}

impl From<&str> for WhereClause {
    fn from(raw: &str) -> Self {
        WhereClause::Raw(raw.to_string())
    }
}

impl From<WhereParams> for WhereClause {
    fn from(params: WhereParams) -> Self {
        WhereClause::Params(params)
    }
}

impl From<Where> for WhereClause {
    fn from(bound: Where) -> Self {
        WhereClause::Bound(bound)
    }
}

#[derive(Debug, Clone)]
pub enum ForEachClause {
    Raw(String),
    /// `FOREACH (variable IN list | body)`, `list` spliced unescaped. The
    /// body must share the parent's allocator.
    Body {
        variable: String,
        list: String,
        body: QueryBuilder,
    },
}

impl From<&str> for ForEachClause {
    fn from(raw: &str) -> Self {
        ForEachClause::Raw(raw.to_string())
    }
}

#[derive(Debug, Clone)]
pub enum CallClause {
    Raw(String),
    /// `CALL { ... }`. The subquery must share the parent's allocator.
    Subquery(QueryBuilder),
}

impl From<&str> for CallClause {
    fn from(raw: &str) -> Self {
        CallClause::Raw(raw.to_string())
    }
}

impl From<QueryBuilder> for CallClause {
    fn from(subquery: QueryBuilder) -> Self {
        CallClause::Subquery(subquery)
    }
}
