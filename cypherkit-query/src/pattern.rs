//! Node and relationship pattern compiler.

use crate::bind_param::BindParam;
use crate::error::{Error, Result};
use crate::escape::{escape_if_needed, escape_joined};
use crate::value::Operand;
use crate::where_params::{PropertyConditions, Where};
use cypherkit_api::Labeled;
use indexmap::IndexMap;
use tracing::trace;

/// Prefix of identifiers synthesized for anonymous nodes with hoisted
/// conditions.
pub const NODE_IDENTIFIER_PREFIX: &str = "__n";
/// Prefix of identifiers synthesized for anonymous relationships with
/// hoisted conditions.
pub const RELATIONSHIP_IDENTIFIER_PREFIX: &str = "__r";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    /// `A:B`, the node carries every label.
    All(Vec<String>),
    /// `A|B`, the node carries at least one label.
    Any(Vec<String>),
    /// Label text resolved from a model, used as is.
    Resolved(String),
}

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Label::All(vec![name.into()])
    }

    pub fn all<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Label::All(names.into_iter().map(Into::into).collect())
    }

    pub fn any<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Label::Any(names.into_iter().map(Into::into).collect())
    }

    /// The label a model resolves to.
    pub fn of(model: impl Labeled) -> Self {
        Label::Resolved(model.label())
    }

    pub fn render(&self) -> String {
        match self {
            Label::All(names) => escape_joined(names, ":"),
            Label::Any(names) => escape_joined(names, "|"),
            Label::Resolved(text) => text.clone(),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Label::All(names) | Label::Any(names) => names.is_empty(),
            Label::Resolved(text) => text.is_empty(),
        }
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::new(name)
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label::new(name)
    }
}

/// Property values written inline: `{ name: $name }`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    inner: IndexMap<String, Operand>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Operand>) {
        self.inner.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Operand> {
        self.inner.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Operand)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Operand>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Properties::new();
        for (name, value) in iter {
            properties.insert(name, value);
        }
        properties
    }
}

/// How the content of a pattern is constrained.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PatternFilter {
    #[default]
    None,
    /// Always written inline.
    Properties(Properties),
    /// Equalities are written inline; other comparisons are hoisted into the
    /// clause's `WHERE` when matching.
    Where(PropertyConditions),
}

/// Whether a pattern is matched or created. Only matching can hoist
/// conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternMode {
    Match,
    Create,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePattern {
    pub identifier: Option<String>,
    pub label: Option<Label>,
    pub filter: PatternFilter,
}

impl NodePattern {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn model(self, model: impl Labeled) -> Self {
        self.label(Label::of(model))
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.filter = PatternFilter::Properties(properties);
        self
    }

    pub fn r#where(mut self, conditions: PropertyConditions) -> Self {
        self.filter = PatternFilter::Where(conditions);
        self
    }
}

/// A node given as a trusted raw pattern string or as a structured pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeDescriptor {
    /// Spliced unchanged. Nothing is escaped or bound.
    Raw(String),
    Pattern(NodePattern),
}

impl From<NodePattern> for NodeDescriptor {
    fn from(pattern: NodePattern) -> Self {
        NodeDescriptor::Pattern(pattern)
    }
}

impl From<&str> for NodeDescriptor {
    fn from(raw: &str) -> Self {
        NodeDescriptor::Raw(raw.to_string())
    }
}

impl From<String> for NodeDescriptor {
    fn from(raw: String) -> Self {
        NodeDescriptor::Raw(raw)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationshipDirection {
    /// `-[]->`
    LeftToRight,
    /// `<-[]-`
    RightToLeft,
    /// `-[]-`
    #[default]
    Undirected,
}

/// One end of a variable-length hop range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopBound {
    Finite(u32),
    Infinite,
}

impl From<u32> for HopBound {
    fn from(hops: u32) -> Self {
        HopBound::Finite(hops)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipPattern {
    pub identifier: Option<String>,
    pub types: Vec<String>,
    pub direction: RelationshipDirection,
    pub filter: PatternFilter,
    pub min_hops: Option<HopBound>,
    pub max_hops: Option<HopBound>,
}

impl RelationshipPattern {
    pub fn new(direction: RelationshipDirection) -> Self {
        RelationshipPattern {
            direction,
            ..Self::default()
        }
    }

    pub fn outgoing() -> Self {
        Self::new(RelationshipDirection::LeftToRight)
    }

    pub fn incoming() -> Self {
        Self::new(RelationshipDirection::RightToLeft)
    }

    pub fn undirected() -> Self {
        Self::new(RelationshipDirection::Undirected)
    }

    pub fn identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Adds an accepted relationship type; several are rendered `A|B`.
    pub fn r#type(mut self, name: impl Into<String>) -> Self {
        self.types.push(name.into());
        self
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.filter = PatternFilter::Properties(properties);
        self
    }

    pub fn r#where(mut self, conditions: PropertyConditions) -> Self {
        self.filter = PatternFilter::Where(conditions);
        self
    }

    pub fn min_hops(mut self, hops: impl Into<HopBound>) -> Self {
        self.min_hops = Some(hops.into());
        self
    }

    pub fn max_hops(mut self, hops: impl Into<HopBound>) -> Self {
        self.max_hops = Some(hops.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipDescriptor {
    /// Spliced unchanged, e.g. `-[:KNOWS]->`.
    Raw(String),
    Pattern(RelationshipPattern),
}

impl From<RelationshipPattern> for RelationshipDescriptor {
    fn from(pattern: RelationshipPattern) -> Self {
        RelationshipDescriptor::Pattern(pattern)
    }
}

impl From<&str> for RelationshipDescriptor {
    fn from(raw: &str) -> Self {
        RelationshipDescriptor::Raw(raw.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledPattern {
    pub statement: String,
    /// Conditions that could not be written inline and must be ANDed into
    /// the enclosing clause's `WHERE`.
    pub standalone: Option<Where>,
}

impl CompiledPattern {
    fn raw(statement: &str) -> Self {
        CompiledPattern {
            statement: statement.to_string(),
            standalone: None,
        }
    }
}

/// Compiles `(identifier:Label { ... })`.
pub fn compile_node(
    descriptor: &NodeDescriptor,
    bind_param: &mut BindParam,
    mode: PatternMode,
) -> Result<CompiledPattern> {
    let node = match descriptor {
        NodeDescriptor::Raw(raw) => return Ok(CompiledPattern::raw(raw)),
        NodeDescriptor::Pattern(node) => node,
    };

    let (identifier, inner, standalone) = compile_filter(
        node.identifier.as_deref(),
        &node.filter,
        NODE_IDENTIFIER_PREFIX,
        bind_param,
        mode,
    )?;

    let mut head = identifier.as_deref().map(escape_if_needed).unwrap_or_default();
    if let Some(label) = node.label.as_ref().filter(|label| !label.is_empty()) {
        head.push(':');
        head.push_str(&label.render());
    }

    Ok(CompiledPattern {
        statement: format!("({})", join_head_and_inner(head, &inner)),
        standalone,
    })
}

/// Compiles `-[identifier:TYPE*min..max { ... }]->` and its other
/// directions.
pub fn compile_relationship(
    descriptor: &RelationshipDescriptor,
    bind_param: &mut BindParam,
    mode: PatternMode,
) -> Result<CompiledPattern> {
    let relationship = match descriptor {
        RelationshipDescriptor::Raw(raw) => return Ok(CompiledPattern::raw(raw)),
        RelationshipDescriptor::Pattern(relationship) => relationship,
    };

    let hops = hops(relationship.min_hops, relationship.max_hops)?;
    let (identifier, inner, standalone) = compile_filter(
        relationship.identifier.as_deref(),
        &relationship.filter,
        RELATIONSHIP_IDENTIFIER_PREFIX,
        bind_param,
        mode,
    )?;

    let mut head = identifier.as_deref().map(escape_if_needed).unwrap_or_default();
    if !relationship.types.is_empty() {
        head.push(':');
        head.push_str(&escape_joined(&relationship.types, "|"));
    }
    head.push_str(&hops);

    let body = format!("[{}]", join_head_and_inner(head, &inner));
    let statement = match relationship.direction {
        RelationshipDirection::LeftToRight => format!("-{body}->"),
        RelationshipDirection::RightToLeft => format!("<-{body}-"),
        RelationshipDirection::Undirected => format!("-{body}-"),
    };

    Ok(CompiledPattern {
        statement,
        standalone,
    })
}

/// `{ a: $a, b: datetime() }`, or empty for no properties.
pub fn properties_with_params(properties: &Properties, bind_param: &mut BindParam) -> String {
    if properties.is_empty() {
        return String::new();
    }
    let parts = properties
        .iter()
        .map(|(name, operand)| {
            let rendered = match operand {
                Operand::Value(value) => {
                    let param = bind_param.add(name, value.clone());
                    format!("${}", escape_if_needed(&param))
                }
                Operand::Literal(literal) => literal.as_str().to_string(),
            };
            format!("{}: {rendered}", escape_if_needed(name))
        })
        .collect::<Vec<_>>();
    format!("{{ {} }}", parts.join(", "))
}

// Returns the identifier to render, the inline part and the hoisted part.
fn compile_filter(
    identifier: Option<&str>,
    filter: &PatternFilter,
    synthesized_prefix: &str,
    bind_param: &mut BindParam,
    mode: PatternMode,
) -> Result<(Option<String>, String, Option<Where>)> {
    let identifier = identifier.map(str::to_string);
    match filter {
        PatternFilter::None => Ok((identifier, String::new(), None)),
        PatternFilter::Properties(properties) => {
            let inner = properties_with_params(properties, bind_param);
            Ok((identifier, inner, None))
        }
        PatternFilter::Where(conditions) => {
            let (eq, rest) = conditions.split_by_operator();
            if mode == PatternMode::Create {
                if let Some((property, condition)) = rest.iter().next() {
                    let operators = condition
                        .comparisons()
                        .iter()
                        .map(|(op, _)| op.key())
                        .collect::<Vec<_>>()
                        .join(", ");
                    return Err(Error::shape(
                        "where",
                        "equality conditions only when creating",
                        format!("`{operators}` on `{property}`"),
                    ));
                }
            }

            // Inline names do not reference the identifier, any will do.
            let inner = Where::for_identifier(identifier.as_deref().unwrap_or(""), &eq, bind_param)
                .object()?;
            if rest.is_empty() {
                return Ok((identifier, inner, None));
            }

            let identifier = match identifier {
                Some(identifier) => identifier,
                None => {
                    let synthesized = bind_param.reserve_unique_name(synthesized_prefix);
                    trace!(identifier = %synthesized, "synthesized pattern identifier");
                    synthesized
                }
            };
            let standalone = Where::for_identifier(&identifier, &rest, bind_param);
            trace!(
                identifier = %identifier,
                conditions = rest.len(),
                "hoisting pattern conditions"
            );
            Ok((Some(identifier), inner, Some(standalone)))
        }
    }
}

fn join_head_and_inner(head: String, inner: &str) -> String {
    match (head.is_empty(), inner.is_empty()) {
        (_, true) => head,
        (true, false) => inner.to_string(),
        (false, false) => format!("{head} {inner}"),
    }
}

fn hops(min: Option<HopBound>, max: Option<HopBound>) -> Result<String> {
    use HopBound::{Finite, Infinite};
    Ok(match (min, max) {
        (None, None) => String::new(),
        (Some(Infinite), _) | (_, Some(Infinite)) => "*".to_string(),
        (Some(Finite(min)), None) => format!("*{min}.."),
        (None, Some(Finite(max))) => format!("*..{max}"),
        (Some(Finite(min)), Some(Finite(max))) if min == max => format!("*{min}"),
        (Some(Finite(min)), Some(Finite(max))) if min > max => {
            return Err(Error::shape(
                "minHops",
                format!("at most maxHops ({max})"),
                min.to_string(),
            ));
        }
        (Some(Finite(min)), Some(Finite(max))) => format!("*{min}..{max}"),
    })
}
