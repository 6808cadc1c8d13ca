//! The quantifier state machine of a leaf node.
//!
//! One [`Attempt`] is one seeding of an atom at a position. It is fed one
//! symbol per step and repeats the atom internally until `max` repetitions
//! are reached or a repetition fails.

use std::sync::Arc;

use crate::outcome::{Outcome, Span};
use crate::rule::Atom;

/// What an attempt reports after consuming a symbol.
#[derive(Debug)]
pub(crate) enum Step {
    /// More symbols are needed before anything can be reported.
    Continue,
    /// A repetition count within bounds was reached; the attempt stays live.
    Report(Outcome),
    /// The attempt is finished; this is its last word.
    Last(Outcome),
}

#[derive(Debug)]
pub(crate) struct Attempt {
    span: Span,
    /// Where this attempt was seeded.
    origin: usize,
    /// Symbols of the current repetition matched so far.
    offset: usize,
    count: usize,
    min: usize,
    max: Option<usize>,
}

impl Attempt {
    /// Bounds must already be resolved and satisfy `min <= max`, `max > 0`.
    pub(crate) fn new(span: Span, min: usize, max: Option<usize>) -> Self {
        debug_assert!(max.is_none_or(|max| max > 0 && min <= max));
        Self {
            origin: span.end,
            span,
            offset: 0,
            count: 0,
            min,
            max,
        }
    }

    pub(crate) fn advance<T: PartialEq>(
        &mut self,
        atom: &Atom<T>,
        name: Option<&Arc<str>>,
        symbol: Option<&T>,
    ) -> Step {
        self.span.end += 1;
        if !atom.accepts(self.offset, symbol, &self.span) {
            let mut failed = self.span.clone();
            failed.repeat = self.count;
            return Step::Last(Outcome::Fail(failed));
        }
        self.offset += 1;
        if self.offset < atom.width() {
            return Step::Continue;
        }

        self.offset = 0;
        self.count += 1;
        let mut report = self.span.clone();
        report.repeat = self.count;
        if self.max == Some(self.count) {
            return Step::Last(Outcome::Success(report));
        }
        if let Some(name) = name {
            self.span.push_named(name, self.origin);
        }
        if self.count < self.min {
            Step::Continue
        } else {
            Step::Report(Outcome::Success(report))
        }
    }
}
