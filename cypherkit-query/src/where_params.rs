//! Condition compiler.
//!
//! Conditions are given per identifier and property:
//! `identifier -> property -> value | [(operator, value), ...]`. A bare value
//! means equality. [`Where`] binds every value through the allocator once and
//! can then render either a standalone boolean expression
//! (`n.age >= $age AND ...`) or, for equality-only conditions, the inline
//! bracket syntax used inside patterns (`{ name: $name }`).

use crate::bind_param::BindParam;
use crate::error::{Error, Result};
use crate::escape::escape_if_needed;
use crate::value::{Literal, Operand};
use cypherkit_api::PropertyValue;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// `x IN $param`
    In,
    /// `$param IN x`
    ReverseIn,
    Contains,
}

impl Operator {
    pub const ALL: [Operator; 9] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Gte,
        Operator::Lt,
        Operator::Lte,
        Operator::In,
        Operator::ReverseIn,
        Operator::Contains,
    ];

    /// Key used for the operator in JSON payloads.
    pub fn key(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::In => "in",
            Operator::ReverseIn => "_in",
            Operator::Contains => "contains",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.key() == key)
    }

    /// Only equality can be written inline in a pattern.
    pub fn is_eq(self) -> bool {
        self == Operator::Eq
    }

    fn symbol(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::In | Operator::ReverseIn => "IN",
            Operator::Contains => "CONTAINS",
        }
    }
}

/// The condition on one property.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Implicit equality.
    Value(Operand),
    /// Every comparison must hold.
    Operators(Vec<(Operator, Operand)>),
}

impl Condition {
    pub fn op(operator: Operator, operand: impl Into<Operand>) -> Self {
        Condition::Operators(vec![(operator, operand.into())])
    }

    /// Adds another comparison that must hold as well.
    pub fn and(self, operator: Operator, operand: impl Into<Operand>) -> Self {
        let mut comparisons = self.into_comparisons();
        comparisons.push((operator, operand.into()));
        Condition::Operators(comparisons)
    }

    pub fn comparisons(&self) -> Vec<(Operator, &Operand)> {
        match self {
            Condition::Value(operand) => vec![(Operator::Eq, operand)],
            Condition::Operators(ops) => ops.iter().map(|(op, operand)| (*op, operand)).collect(),
        }
    }

    fn into_comparisons(self) -> Vec<(Operator, Operand)> {
        match self {
            Condition::Value(operand) => vec![(Operator::Eq, operand)],
            Condition::Operators(ops) => ops,
        }
    }
}

macro_rules! condition_from_operand {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Condition {
                fn from(value: $ty) -> Self {
                    Condition::Value(Operand::from(value))
                }
            }
        )*
    };
}

condition_from_operand!(
    Operand,
    Literal,
    PropertyValue,
    &str,
    String,
    i64,
    i32,
    f64,
    bool,
    Vec<&str>,
    Vec<String>,
    Vec<i64>,
);

/// Conditions on the properties of one identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyConditions {
    inner: IndexMap<String, Condition>,
}

impl PropertyConditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// `property = value`.
    pub fn eq(self, property: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.with(property, Condition::Value(value.into()))
    }

    /// Adds `property <operator> value`, keeping comparisons already given
    /// for the property.
    pub fn op(
        mut self,
        property: impl Into<String>,
        operator: Operator,
        value: impl Into<Operand>,
    ) -> Self {
        let property = property.into();
        let condition = match self.inner.shift_remove(&property) {
            Some(existing) => existing.and(operator, value),
            None => Condition::op(operator, value),
        };
        self.inner.insert(property, condition);
        self
    }

    /// Sets the condition for `property`, replacing any previous one.
    pub fn with(mut self, property: impl Into<String>, condition: impl Into<Condition>) -> Self {
        self.insert(property, condition);
        self
    }

    pub fn insert(&mut self, property: impl Into<String>, condition: impl Into<Condition>) {
        self.inner.insert(property.into(), condition.into());
    }

    pub fn get(&self, property: &str) -> Option<&Condition> {
        self.inner.get(property)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Splits into the part that can be written inline and the rest.
    ///
    /// The first equality comparison of each property goes to the inline
    /// half. Every other comparison, including a repeated equality on the
    /// same property, goes to the standalone half.
    pub fn split_by_operator(&self) -> (PropertyConditions, PropertyConditions) {
        let mut eq_only = PropertyConditions::new();
        let mut rest = PropertyConditions::new();
        for (property, condition) in &self.inner {
            let mut inline: Option<Operand> = None;
            let mut standalone: Vec<(Operator, Operand)> = Vec::new();
            for (operator, operand) in condition.comparisons() {
                if operator.is_eq() && inline.is_none() {
                    inline = Some(operand.clone());
                } else {
                    standalone.push((operator, operand.clone()));
                }
            }
            if let Some(operand) = inline {
                eq_only.insert(property.clone(), Condition::Value(operand));
            }
            if !standalone.is_empty() {
                rest.insert(property.clone(), Condition::Operators(standalone));
            }
        }
        (eq_only, rest)
    }
}

impl<K: Into<String>, C: Into<Condition>> FromIterator<(K, C)> for PropertyConditions {
    fn from_iter<I: IntoIterator<Item = (K, C)>>(iter: I) -> Self {
        let mut conditions = PropertyConditions::new();
        for (property, condition) in iter {
            conditions.insert(property, condition);
        }
        conditions
    }
}

/// Conditions keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereParams {
    inner: IndexMap<String, PropertyConditions>,
}

impl WhereParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds conditions for `identifier`, merged property by property with
    /// conditions already given for it.
    pub fn identifier(
        mut self,
        identifier: impl Into<String>,
        conditions: PropertyConditions,
    ) -> Self {
        self.insert(identifier, conditions);
        self
    }

    pub fn insert(&mut self, identifier: impl Into<String>, conditions: PropertyConditions) {
        let entry = self.inner.entry(identifier.into()).or_default();
        for (property, condition) in conditions.inner {
            entry.inner.insert(property, condition);
        }
    }

    pub fn get(&self, identifier: &str) -> Option<&PropertyConditions> {
        self.inner.get(identifier)
    }

    /// True when no identifier carries any condition.
    pub fn is_empty(&self) -> bool {
        self.inner.values().all(PropertyConditions::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyConditions)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Per-identifier [`PropertyConditions::split_by_operator`]. Identifiers
    /// left without conditions are dropped from the respective half.
    pub fn split_by_operator(&self) -> (WhereParams, WhereParams) {
        let mut eq_only = WhereParams::new();
        let mut rest = WhereParams::new();
        for (identifier, conditions) in &self.inner {
            let (eq, other) = conditions.split_by_operator();
            if !eq.is_empty() {
                eq_only.inner.insert(identifier.clone(), eq);
            }
            if !other.is_empty() {
                rest.inner.insert(identifier.clone(), other);
            }
        }
        (eq_only, rest)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum BoundOperand {
    Param(String),
    Literal(Literal),
}

impl BoundOperand {
    fn render(&self) -> String {
        match self {
            BoundOperand::Param(name) => format!("${}", escape_if_needed(name)),
            BoundOperand::Literal(literal) => literal.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Comparison {
    identifier: String,
    property: String,
    operator: Operator,
    operand: BoundOperand,
}

impl Comparison {
    fn text(&self) -> String {
        let target = format!(
            "{}.{}",
            escape_if_needed(&self.identifier),
            escape_if_needed(&self.property)
        );
        let operand = self.operand.render();
        match self.operator {
            Operator::ReverseIn => format!("{operand} IN {target}"),
            op => format!("{target} {} {operand}", op.symbol()),
        }
    }
}

/// Conditions whose values are already registered with an allocator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Where {
    comparisons: Vec<Comparison>,
}

impl Where {
    /// Binds every value of `params`; the parameter for a value is named
    /// after its property.
    pub fn new(params: &WhereParams, bind_param: &mut BindParam) -> Self {
        let mut this = Where::default();
        for (identifier, conditions) in params.iter() {
            this.bind(identifier, conditions, bind_param);
        }
        this
    }

    /// Same as [`Where::new`] for the conditions of a single identifier.
    pub fn for_identifier(
        identifier: &str,
        conditions: &PropertyConditions,
        bind_param: &mut BindParam,
    ) -> Self {
        let mut this = Where::default();
        this.bind(identifier, conditions, bind_param);
        this
    }

    fn bind(
        &mut self,
        identifier: &str,
        conditions: &PropertyConditions,
        bind_param: &mut BindParam,
    ) {
        for (property, condition) in conditions.iter() {
            for (operator, operand) in condition.comparisons() {
                let operand = match operand {
                    Operand::Value(value) => {
                        BoundOperand::Param(bind_param.add(property, value.clone()))
                    }
                    Operand::Literal(literal) => BoundOperand::Literal(literal.clone()),
                };
                self.comparisons.push(Comparison {
                    identifier: identifier.to_string(),
                    property: property.to_string(),
                    operator,
                    operand,
                });
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Whether every comparison is an equality.
    pub fn is_eq_only(&self) -> bool {
        self.comparisons.iter().all(|c| c.operator.is_eq())
    }

    /// Names of the parameters this condition references.
    pub fn param_names(&self) -> Vec<&str> {
        self.comparisons
            .iter()
            .filter_map(|c| match &c.operand {
                BoundOperand::Param(name) => Some(name.as_str()),
                BoundOperand::Literal(_) => None,
            })
            .collect()
    }

    /// Appends the comparisons of `other`; both must hold.
    pub fn and(mut self, other: Where) -> Where {
        self.comparisons.extend(other.comparisons);
        self
    }

    /// `a.x = $x AND b.y >= $y`; empty when there are no conditions.
    pub fn text(&self) -> String {
        self.comparisons
            .iter()
            .map(Comparison::text)
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// `{ x: $x, y: $y }`; empty when there are no conditions.
    ///
    /// Fails when a comparison is not an equality, or when a property would
    /// appear twice.
    pub fn object(&self) -> Result<String> {
        if self.comparisons.is_empty() {
            return Ok(String::new());
        }
        let mut parts = Vec::with_capacity(self.comparisons.len());
        let mut seen: Vec<&str> = Vec::with_capacity(self.comparisons.len());
        for comparison in &self.comparisons {
            if !comparison.operator.is_eq() {
                return Err(Error::shape(
                    comparison.property.clone(),
                    "an equality condition",
                    format!("operator `{}`", comparison.operator.key()),
                ));
            }
            if seen.contains(&comparison.property.as_str()) {
                return Err(Error::shape(
                    comparison.property.clone(),
                    "a single inline value",
                    "several equality conditions",
                ));
            }
            seen.push(&comparison.property);
            parts.push(format!(
                "{}: {}",
                escape_if_needed(&comparison.property),
                comparison.operand.render()
            ));
        }
        Ok(format!("{{ {} }}", parts.join(", ")))
    }
}
