//! The streaming front-end.
//!
//! A [`Stream`] frames its input with a boundary sentinel on either side and
//! advances every live attempt by one symbol per [`Stream::push`]. A new
//! attempt of the whole pattern is seeded at every position, so every match
//! anywhere in the input is reported.

use itertools::Itertools;

use crate::error::RuleError;
use crate::outcome::{Outcome, Span};
use crate::rule::{Pattern, Rule};

use super::run::Run;

/// An in-progress match of a [`Pattern`] over symbols fed one at a time.
///
/// ```
/// use rulematch::Rule;
///
/// let pattern = Rule::literal("ab".chars()).unwrap().compile();
/// let mut stream = pattern.stream().unwrap();
/// for c in "xabab".chars() {
///     stream.push(c).unwrap();
/// }
/// let spans: Vec<_> = stream
///     .finish()
///     .unwrap()
///     .iter()
///     .map(|m| (m.epoch(), m.end()))
///     .collect();
/// assert_eq!(spans, vec![(1, 3), (3, 5)]);
/// ```
pub struct Stream<'p, T> {
    run: Run<'p, T>,
    /// Every symbol seen so far; `None` marks a sentinel.
    history: Vec<Option<T>>,
    found: Vec<Outcome>,
}

impl<'p, T: PartialEq> Stream<'p, T> {
    pub fn new(pattern: &'p Pattern<T>) -> Result<Self, RuleError> {
        let mut stream = Self {
            run: Run::new(pattern),
            history: Vec::new(),
            found: Vec::new(),
        };
        stream.step(None)?;
        Ok(stream)
    }

    /// Feed the next input symbol.
    pub fn push(&mut self, symbol: T) -> Result<(), RuleError> {
        self.step(Some(symbol))
    }

    /// Close the input and return every match, in the order they finished.
    pub fn finish(mut self) -> Result<Vec<Outcome>, RuleError> {
        self.step(None)?;
        let limit = self.history.len() - 1;
        let run = &self.run;
        let matches = self
            .found
            .into_iter()
            .filter(|outcome| run.arbiter.admits(run.pattern, outcome.span()))
            .map(|outcome| outcome.into_span().finalize(limit))
            .filter(|span| !span.is_empty())
            .unique_by(|span| (span.epoch(), span.end()))
            .map(Outcome::Success)
            .collect_vec();
        log::debug!(
            "stream finished after {} symbols: {} matches",
            limit.saturating_sub(1),
            matches.len()
        );
        Ok(matches)
    }

    fn step(&mut self, symbol: Option<T>) -> Result<(), RuleError> {
        let pos = self.history.len();
        self.history.push(symbol);
        let root = self.run.pattern.root();
        self.run.activate(root, Span::seed(pos), true)?;
        let outcomes = self
            .run
            .broadcast(root, self.history[pos].as_ref(), &self.history)?;
        for outcome in outcomes {
            if let Outcome::Success(span) = outcome {
                self.run.arbiter.record(self.run.pattern, &span);
                self.found.push(Outcome::Success(span));
            }
        }
        log::trace!(
            "step {pos}: {} live attempts, {} matches so far",
            self.run.live_attempts(),
            self.found.len()
        );
        Ok(())
    }
}

impl<T: PartialEq> Pattern<T> {
    /// Start feeding symbols one at a time.
    pub fn stream(&self) -> Result<Stream<'_, T>, RuleError> {
        Stream::new(self)
    }

    /// Every match of this pattern in `symbols`.
    ///
    /// Matches are reported as `Success` spans in input coordinates, at most
    /// one per `(epoch, end)`, with empty matches left out.
    pub fn find_all(
        &self,
        symbols: impl IntoIterator<Item = T>,
    ) -> Result<Vec<Outcome>, RuleError> {
        let mut stream = self.stream()?;
        for symbol in symbols {
            stream.push(symbol)?;
        }
        stream.finish()
    }
}

impl<T: Clone + PartialEq> Rule<T> {
    /// Compile and match in one go.
    pub fn find_all(
        &self,
        symbols: impl IntoIterator<Item = T>,
    ) -> Result<Vec<Outcome>, RuleError> {
        self.compile().find_all(symbols)
    }
}
