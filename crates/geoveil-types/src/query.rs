//! Minimal filter expression language for bulk catalog queries.
//!
//! A [`Filter`] is evaluated once per candidate [`CatalogInfo`]. Expressions
//! are either literals, entry properties, or [`VolatileFunction`]s computed
//! from the entry at evaluation time. A filter that contains a volatile
//! function must never be cached or memoized across entries or requests;
//! [`Filter::is_cacheable`] reports this.

use std::fmt;
use std::sync::Arc;

use crate::CatalogError;
use crate::catalog::CatalogInfo;

/// A scalar produced by an [`Expression`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    Text(String),
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Option<&str>> for Value {
    fn from(s: Option<&str>) -> Self {
        s.map(Value::from).unwrap_or(Value::Null)
    }
}

/// A function evaluated against each candidate entry.
///
/// Implementations may depend on state outside the entry (for example the
/// request being served), so results are never reused between evaluations.
pub trait VolatileFunction: Send + Sync {
    /// Name used in debug output.
    fn name(&self) -> &str;

    /// Compute the value for `info`.
    fn evaluate(&self, info: &CatalogInfo) -> Result<Value, CatalogError>;
}

#[derive(Clone)]
pub enum Expression {
    Literal(Value),
    Property(String),
    Function(Arc<dyn VolatileFunction>),
}

impl fmt::Debug for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Expression::Property(p) => f.debug_tuple("Property").field(p).finish(),
            Expression::Function(func) => write!(f, "Function({})", func.name()),
        }
    }
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    pub fn property(name: impl Into<String>) -> Self {
        Expression::Property(name.into())
    }

    pub fn function(func: Arc<dyn VolatileFunction>) -> Self {
        Expression::Function(func)
    }

    pub fn evaluate(&self, info: &CatalogInfo) -> Result<Value, CatalogError> {
        match self {
            Expression::Literal(v) => Ok(v.clone()),
            Expression::Property(p) => info.property(p),
            Expression::Function(func) => func.evaluate(info),
        }
    }

    fn is_volatile(&self) -> bool {
        matches!(self, Expression::Function(_))
    }
}

/// Boolean predicate over catalog entries.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Matches everything.
    Include,
    /// Matches nothing.
    Exclude,
    Equals(Expression, Expression),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn equals(left: Expression, right: Expression) -> Self {
        Filter::Equals(left, right)
    }

    /// Shorthand for `property == value`.
    pub fn property_equals(property: &str, value: impl Into<Value>) -> Self {
        Filter::Equals(Expression::property(property), Expression::literal(value))
    }

    /// Logical AND of two filters, simplifying `Include` and `Exclude` and
    /// flattening nested conjunctions.
    pub fn and(left: Filter, right: Filter) -> Filter {
        match (left, right) {
            (Filter::Include, other) | (other, Filter::Include) => other,
            (Filter::Exclude, _) | (_, Filter::Exclude) => Filter::Exclude,
            (Filter::And(mut children), Filter::And(rest)) => {
                children.extend(rest);
                Filter::And(children)
            }
            (Filter::And(mut children), other) => {
                children.push(other);
                Filter::And(children)
            }
            (other, Filter::And(mut children)) => {
                children.insert(0, other);
                Filter::And(children)
            }
            (l, r) => Filter::And(vec![l, r]),
        }
    }

    pub fn or(left: Filter, right: Filter) -> Filter {
        match (left, right) {
            (Filter::Include, _) | (_, Filter::Include) => Filter::Include,
            (Filter::Exclude, other) | (other, Filter::Exclude) => other,
            (l, r) => Filter::Or(vec![l, r]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Filter {
        match filter {
            Filter::Include => Filter::Exclude,
            Filter::Exclude => Filter::Include,
            other => Filter::Not(Box::new(other)),
        }
    }

    /// Evaluate the filter against one entry.
    ///
    /// Conjunctions and disjunctions short-circuit left to right. Errors from
    /// property lookups or volatile functions propagate unchanged.
    pub fn evaluate(&self, info: &CatalogInfo) -> Result<bool, CatalogError> {
        match self {
            Filter::Include => Ok(true),
            Filter::Exclude => Ok(false),
            Filter::Equals(l, r) => Ok(l.evaluate(info)? == r.evaluate(info)?),
            Filter::And(children) => {
                for child in children {
                    if !child.evaluate(info)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(children) => {
                for child in children {
                    if child.evaluate(info)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(inner) => Ok(!inner.evaluate(info)?),
        }
    }

    /// `false` when any part of the filter is a [`VolatileFunction`].
    pub fn is_cacheable(&self) -> bool {
        match self {
            Filter::Include | Filter::Exclude => true,
            Filter::Equals(l, r) => !l.is_volatile() && !r.is_volatile(),
            Filter::And(children) | Filter::Or(children) => {
                children.iter().all(Filter::is_cacheable)
            }
            Filter::Not(inner) => inner.is_cacheable(),
        }
    }
}
