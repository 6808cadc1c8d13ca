//! Repetition bounds for rule nodes.
//!
//! A bound is a fixed count, infinity, the number of captures recorded so far
//! under a group name, or a function of the current span. Dynamic bounds are
//! resolved once, when an attempt is seeded.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use phf::{Map, phf_map};

use crate::error::RuleError;
use crate::outcome::Span;

/// A bound computed from the span an attempt is seeded with.
pub type Count = Arc<dyn Fn(&Span) -> usize + Send + Sync>;

/// One side of a [`Quantifier`].
#[derive(Clone)]
pub enum Bound {
    Fixed(usize),
    Infinite,
    /// Number of captures recorded under this name when the attempt starts.
    Group(Arc<str>),
    Computed(Count),
}

impl fmt::Debug for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Infinite => write!(f, "inf"),
            Self::Group(name) => write!(f, "@{name}"),
            Self::Computed(_) => write!(f, "%fn%"),
        }
    }
}

/// One-character shorthands. Keep in sync with the parser below.
const SHORTHANDS: Map<&'static str, (usize, Option<usize>)> = phf_map! {
    "*" => (0, None),
    "+" => (1, None),
    "?" => (0, Some(1)),
};

/// A `[min, max]` repetition bound.
#[derive(Clone, Debug)]
pub struct Quantifier {
    min: Bound,
    max: Bound,
}

impl Quantifier {
    /// Build from two bounds, rejecting combinations that can never resolve.
    pub fn new(min: Bound, max: Bound) -> Result<Self, RuleError> {
        match (&min, &max) {
            (Bound::Infinite, _) => Err(RuleError::UnboundedMinimum),
            (Bound::Fixed(lo), Bound::Fixed(hi)) if lo > hi => {
                Err(RuleError::InvertedBounds { min: *lo, max: *hi })
            }
            _ => Ok(Self { min, max }),
        }
    }

    pub fn once() -> Self {
        Self::exactly(1)
    }

    pub fn exactly(n: usize) -> Self {
        Self {
            min: Bound::Fixed(n),
            max: Bound::Fixed(n),
        }
    }

    pub fn range(min: usize, max: usize) -> Result<Self, RuleError> {
        Self::new(Bound::Fixed(min), Bound::Fixed(max))
    }

    pub fn at_least(min: usize) -> Self {
        Self {
            min: Bound::Fixed(min),
            max: Bound::Infinite,
        }
    }

    /// `*`
    pub fn any() -> Self {
        Self::at_least(0)
    }

    /// `+`
    pub fn some() -> Self {
        Self::at_least(1)
    }

    /// `?`
    pub fn optional() -> Self {
        Self {
            min: Bound::Fixed(0),
            max: Bound::Fixed(1),
        }
    }

    /// Exactly as many repetitions as captures recorded under `group`.
    pub fn same_as(group: &str) -> Self {
        let name: Arc<str> = Arc::from(group);
        Self {
            min: Bound::Group(Arc::clone(&name)),
            max: Bound::Group(name),
        }
    }

    /// Exactly `f(span)` repetitions.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Span) -> usize + Send + Sync + 'static,
    {
        let f: Count = Arc::new(f);
        Self {
            min: Bound::Computed(Arc::clone(&f)),
            max: Bound::Computed(f),
        }
    }

    /// Between `min(span)` and `max(span)` repetitions.
    pub fn computed_range<F, G>(min: F, max: G) -> Self
    where
        F: Fn(&Span) -> usize + Send + Sync + 'static,
        G: Fn(&Span) -> usize + Send + Sync + 'static,
    {
        Self {
            min: Bound::Computed(Arc::new(min)),
            max: Bound::Computed(Arc::new(max)),
        }
    }

    /// Parse the textual form: `*`, `+`, `?`, `n`, `{n}`, `{n,}`, `{n,m}` or
    /// `@group`.
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        let text = text.trim();
        if let Some(&(min, max)) = SHORTHANDS.get(text) {
            return Ok(Self {
                min: Bound::Fixed(min),
                max: max.map_or(Bound::Infinite, Bound::Fixed),
            });
        }
        let malformed = || RuleError::MalformedQuantifier(text.to_string());
        if let Some(group) = text.strip_prefix('@') {
            if group.is_empty() {
                return Err(malformed());
            }
            return Ok(Self::same_as(group));
        }

        let body = text
            .strip_prefix('{')
            .and_then(|t| t.strip_suffix('}'))
            .unwrap_or(text);
        let count = |s: &str| s.trim().parse::<usize>().map_err(|_| malformed());
        match body.split_once(',') {
            None => Ok(Self::exactly(count(body)?)),
            Some((lo, hi)) if hi.trim().is_empty() => Ok(Self::at_least(count(lo)?)),
            Some((lo, hi)) => Self::range(count(lo)?, count(hi)?),
        }
    }

    /// Whether this is the default `{1}` bound.
    pub fn is_once(&self) -> bool {
        matches!((&self.min, &self.max), (Bound::Fixed(1), Bound::Fixed(1)))
    }

    /// Resolve against the span an attempt is seeded with. `None` is infinity.
    pub(crate) fn resolve(&self, span: &Span) -> Result<(usize, Option<usize>), RuleError> {
        let min = match &self.min {
            Bound::Fixed(n) => *n,
            Bound::Infinite => return Err(RuleError::UnboundedMinimum),
            Bound::Group(name) => span.count(name),
            Bound::Computed(f) => f(span),
        };
        let max = match &self.max {
            Bound::Fixed(n) => Some(*n),
            Bound::Infinite => None,
            Bound::Group(name) => Some(span.count(name)),
            Bound::Computed(f) => Some(f(span)),
        };
        match max {
            Some(max) if min > max => Err(RuleError::InvertedBounds { min, max }),
            _ => Ok((min, max)),
        }
    }
}

impl Default for Quantifier {
    fn default() -> Self {
        Self::once()
    }
}

impl FromStr for Quantifier {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
