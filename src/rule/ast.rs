//! The rule tree as users build it.
//!
//! Every builder takes its operands by value and returns a new tree, so a
//! finished [`Rule`] never shares a subtree with another one. Call
//! [`Rule::compile`] (or [`Rule::find_all`]) to run it.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};
use std::sync::Arc;

use crate::error::RuleError;
use crate::outcome::Span;

use super::quantifier::Quantifier;

/// A fallible predicate over one symbol and the span matched so far.
///
/// An `Err` counts as "does not accept" and matching carries on.
pub type Predicate<T> = Arc<dyn Fn(&T, &Span) -> anyhow::Result<bool> + Send + Sync>;

/// A leaf matching unit.
#[derive(Clone)]
pub enum Atom<T> {
    /// A fixed run of symbols, compared positionally.
    Literal(Vec<T>),
    /// A single symbol accepted by a predicate.
    Predicate(Predicate<T>),
    /// A stream boundary sentinel (start or end of input).
    Boundary,
}

impl<T> Atom<T> {
    /// Number of symbols one repetition consumes.
    pub fn width(&self) -> usize {
        match self {
            Self::Literal(symbols) => symbols.len(),
            Self::Predicate(_) | Self::Boundary => 1,
        }
    }
}

impl<T: PartialEq> Atom<T> {
    /// Whether `symbol` is acceptable at `offset` within one repetition.
    /// `None` is the boundary sentinel.
    pub(crate) fn accepts(&self, offset: usize, symbol: Option<&T>, span: &Span) -> bool {
        match (self, symbol) {
            (Self::Boundary, symbol) => symbol.is_none(),
            (_, None) => false,
            (Self::Literal(symbols), Some(symbol)) => symbols.get(offset) == Some(symbol),
            (Self::Predicate(f), Some(symbol)) => match f(symbol, span) {
                Ok(accepted) => accepted,
                Err(err) => {
                    log::trace!("predicate rejected symbol at {}: {err:#}", span.end());
                    false
                }
            },
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Atom<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(symbols) => f.debug_tuple("Literal").field(symbols).finish(),
            Self::Predicate(_) => write!(f, "Predicate"),
            Self::Boundary => write!(f, "Boundary"),
        }
    }
}

/// How competing attempts through a node are arbitrated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Report every length.
    #[default]
    All,
    /// Keep only the longest span through the node.
    Greedy,
    /// Keep only the shortest span through the node.
    Lazy,
}

/// What a node matches: an atom, or another node it wraps.
#[derive(Debug, Clone)]
pub enum Target<T, C> {
    Atom(Atom<T>),
    Rule(C),
}

/// The logical combinator attached to a node. At most one per node.
#[derive(Debug, Clone)]
pub enum Combinator<C> {
    None,
    /// The span must also be matched in full by this rule.
    And(C),
    /// Alternatives seeded from the same position.
    Or(Vec<C>),
    /// Exactly one of the node and this rule may match the span.
    Xor(C),
    /// Flip success and failure.
    Not,
}

/// A composable matching rule over symbols of type `T`.
#[derive(Debug, Clone)]
pub struct Rule<T> {
    pub(crate) target: Target<T, Box<Rule<T>>>,
    pub(crate) quantifier: Quantifier,
    pub(crate) name: Option<Arc<str>>,
    pub(crate) mode: Mode,
    pub(crate) combinator: Combinator<Box<Rule<T>>>,
    pub(crate) next: Option<Box<Rule<T>>>,
}

impl<T> Rule<T> {
    fn leaf(atom: Atom<T>) -> Self {
        Self {
            target: Target::Atom(atom),
            quantifier: Quantifier::once(),
            name: None,
            mode: Mode::All,
            combinator: Combinator::None,
            next: None,
        }
    }

    /// Match a single symbol.
    pub fn symbol(symbol: T) -> Self {
        Self::leaf(Atom::Literal(vec![symbol]))
    }

    /// Match a fixed run of symbols.
    pub fn literal(symbols: impl IntoIterator<Item = T>) -> Result<Self, RuleError> {
        let symbols: Vec<T> = symbols.into_iter().collect();
        if symbols.is_empty() {
            return Err(RuleError::EmptyLiteral);
        }
        Ok(Self::leaf(Atom::Literal(symbols)))
    }

    /// Match one symbol accepted by `f`, which also sees the span so far.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&T, &Span) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self::leaf(Atom::Predicate(Arc::new(f)))
    }

    /// Match one symbol for which `f` holds.
    pub fn test<F>(f: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self::predicate(move |symbol, _| Ok(f(symbol)))
    }

    /// Match the start or end of the input.
    pub fn boundary() -> Self {
        Self::leaf(Atom::Boundary)
    }

    /// Wrap `rule` in a new node.
    pub fn group(rule: Rule<T>) -> Self {
        Self {
            target: Target::Rule(Box::new(rule)),
            quantifier: Quantifier::once(),
            name: None,
            mode: Mode::All,
            combinator: Combinator::None,
            next: None,
        }
    }

    /// Whether quantifier, name and mode can be set on this node directly
    /// instead of on a new wrapper.
    fn is_plain(&self) -> bool {
        self.quantifier.is_once()
            && self.name.is_none()
            && self.mode == Mode::All
            && matches!(self.combinator, Combinator::None)
            && self.next.is_none()
    }

    /// Attach a quantifier, an optional capture name and an arbitration mode.
    ///
    /// A node that already carries any of these (or a combinator) is wrapped
    /// first, so the new bound applies to it as a whole.
    pub fn quantify(self, quantifier: Quantifier, name: Option<&str>, mode: Mode) -> Self {
        let mut node = if self.is_plain() {
            self
        } else {
            Self::group(self)
        };
        node.quantifier = quantifier;
        node.name = name.map(Arc::from);
        node.mode = mode;
        node
    }

    pub fn repeat(self, quantifier: Quantifier) -> Self {
        self.quantify(quantifier, None, Mode::All)
    }

    pub fn greedy(self, quantifier: Quantifier) -> Self {
        self.quantify(quantifier, None, Mode::Greedy)
    }

    pub fn lazy(self, quantifier: Quantifier) -> Self {
        self.quantify(quantifier, None, Mode::Lazy)
    }

    /// Capture the span of this rule under `name`.
    pub fn named(self, name: &str) -> Self {
        self.quantify(Quantifier::once(), Some(name), Mode::All)
    }

    /// Match `self` and then `other` immediately after it.
    pub fn then(self, other: Rule<T>) -> Self {
        let mut head = if self.next.is_none() {
            self
        } else {
            Self::group(self)
        };
        head.next = Some(Box::new(other));
        Self::group(head)
    }

    /// Match every rule in turn.
    pub fn sequence(rules: impl IntoIterator<Item = Rule<T>>) -> Result<Self, RuleError> {
        let mut rules: Vec<Rule<T>> = rules.into_iter().collect();
        let mut chain = rules.pop().ok_or(RuleError::EmptySequence)?;
        while let Some(prev) = rules.pop() {
            let mut prev = if prev.next.is_none() {
                prev
            } else {
                Self::group(prev)
            };
            prev.next = Some(Box::new(chain));
            chain = prev;
        }
        Ok(Self::group(chain))
    }

    /// The span matched by `self` must also be matched in full by `other`.
    pub fn and(mut self, other: Rule<T>) -> Self {
        match self.combinator {
            Combinator::None => {
                self.combinator = Combinator::And(Box::new(other));
                self
            }
            Combinator::And(inner) => {
                self.combinator = Combinator::And(Box::new(inner.and(other)));
                self
            }
            _ => Self::group(self).and(other),
        }
    }

    /// Match either `self` or `other`; every matching alternative is reported.
    pub fn or(mut self, other: Rule<T>) -> Self {
        if let Combinator::Or(alternatives) = &mut self.combinator {
            alternatives.push(Box::new(other));
            return self;
        }
        if matches!(self.combinator, Combinator::None) {
            self.combinator = Combinator::Or(vec![Box::new(other)]);
            return self;
        }
        Self::group(self).or(other)
    }

    /// Match spans matched by exactly one of `self` and `other`.
    pub fn xor(self, other: Rule<T>) -> Self {
        let mut node = Self::group(self);
        node.combinator = Combinator::Xor(Box::new(other));
        node
    }

    /// Flip success and failure of `self`, keeping span boundaries.
    pub fn invert(self) -> Self {
        let mut node = Self::group(self);
        node.combinator = Combinator::Not;
        node
    }
}

impl<T> BitAnd for Rule<T> {
    type Output = Rule<T>;

    fn bitand(self, other: Rule<T>) -> Rule<T> {
        self.and(other)
    }
}

impl<T> BitOr for Rule<T> {
    type Output = Rule<T>;

    fn bitor(self, other: Rule<T>) -> Rule<T> {
        self.or(other)
    }
}

impl<T> BitXor for Rule<T> {
    type Output = Rule<T>;

    fn bitxor(self, other: Rule<T>) -> Rule<T> {
        self.xor(other)
    }
}

impl<T> Not for Rule<T> {
    type Output = Rule<T>;

    fn not(self) -> Rule<T> {
        self.invert()
    }
}
