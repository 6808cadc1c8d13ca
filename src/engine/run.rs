//! Step-synchronous execution of a compiled pattern.
//!
//! A [`Run`] owns everything transient about one pass over an input: the
//! live attempts of every leaf node and the arbitration state. The pattern
//! itself is only ever read.
//!
//! Two operations drive it:
//!
//! * [`Run::activate`] seeds a new attempt of a subtree at a position and
//!   reports whether that subtree may be skipped without consuming input.
//! * [`Run::broadcast`] advances every live attempt under a subtree by one
//!   symbol and returns the outcomes that finished on that symbol.
//!
//! AND and XOR need to know whether a second rule matches exactly the span a
//! candidate covers. That rule is never live on its own; it is seeded at the
//! span start and the already-consumed symbols are replayed into it.

use crate::error::RuleError;
use crate::outcome::{Entry, Frame, Outcome, Span};
use crate::rule::{Atom, Combinator, Mode, Node, NodeIdx, Pattern, Target};

use super::arbiter::Arbiter;
use super::attempt::{Attempt, Step};

/// Whether a freshly seeded subtree can be passed over without input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    /// At least one more symbol is required.
    Go,
    /// The subtree may match the empty span.
    Opt,
}

impl Signal {
    fn flip(self) -> Self {
        match self {
            Self::Go => Self::Opt,
            Self::Opt => Self::Go,
        }
    }
}

pub(crate) struct Run<'p, T> {
    pub(crate) pattern: &'p Pattern<T>,
    live: Vec<Vec<Attempt>>,
    pub(crate) arbiter: Arbiter,
}

impl<'p, T: PartialEq> Run<'p, T> {
    pub(crate) fn new(pattern: &'p Pattern<T>) -> Self {
        Self {
            pattern,
            live: (0..pattern.len()).map(|_| Vec::new()).collect(),
            arbiter: Arbiter::default(),
        }
    }

    pub(crate) fn live_attempts(&self) -> usize {
        self.live.iter().map(Vec::len).sum()
    }

    /// Seed the node `idx` (not its `next` chain) with `span`.
    ///
    /// With `affect` unset nothing is registered; the call only computes the
    /// signal.
    pub(crate) fn activate(
        &mut self,
        idx: NodeIdx,
        mut span: Span,
        affect: bool,
    ) -> Result<Signal, RuleError> {
        let pattern = self.pattern;
        let node = &pattern[idx];
        if node.needs_origin() {
            span.push(Entry::Origin {
                node: idx,
                pos: span.end,
            });
        }

        let (min, max) = node.quantifier.resolve(&span)?;
        let mut signal = if max == Some(0) {
            Signal::Opt
        } else {
            match &node.target {
                Target::Atom(_) => {
                    if affect {
                        self.live[idx.idx()].push(Attempt::new(span.clone(), min, max));
                    }
                    Signal::Go
                }
                Target::Rule(child) => {
                    let mut inner = span.clone();
                    inner.frames.push(Frame {
                        node: idx,
                        count: 0,
                        min,
                        max,
                    });
                    match self.seed_chain(*child, inner, affect)? {
                        Some(_) => Signal::Opt,
                        None => Signal::Go,
                    }
                }
            }
        };
        if min == 0 {
            signal = Signal::Opt;
        }

        match &node.combinator {
            Combinator::None => {}
            Combinator::And(other) => {
                if signal == Signal::Opt && self.activate(*other, span, false)? != Signal::Opt {
                    signal = Signal::Go;
                }
            }
            Combinator::Or(alternatives) => {
                for alt in alternatives {
                    if self.activate(*alt, span.clone(), affect)? == Signal::Opt {
                        signal = Signal::Opt;
                    }
                }
            }
            Combinator::Xor(other) => {
                let other = self.activate(*other, span, false)?;
                signal = if other == signal {
                    Signal::Go
                } else {
                    Signal::Opt
                };
            }
            Combinator::Not => signal = signal.flip(),
        }
        Ok(signal)
    }

    /// Seed `idx` and, while the nodes seeded so far may be skipped, the
    /// rest of its `next` chain from the same position.
    ///
    /// Returns the span that passes over the whole chain without consuming
    /// input, if there is one.
    pub(crate) fn seed_chain(
        &mut self,
        idx: NodeIdx,
        mut span: Span,
        affect: bool,
    ) -> Result<Option<Span>, RuleError> {
        let pattern = self.pattern;
        let mut cur = idx;
        loop {
            if self.activate(cur, span.clone(), affect)? == Signal::Go {
                return Ok(None);
            }
            let node = &pattern[cur];
            if node.mode != Mode::All {
                span.push(Entry::Length { node: cur, len: 0 });
            }
            match node.next {
                Some(next) => cur = next,
                None => return Ok(Some(span)),
            }
        }
    }

    /// Advance every attempt under `idx` by one symbol (`None` is a stream
    /// boundary) and return what finished, including whatever finished at
    /// the end of the node's `next` chain.
    pub(crate) fn broadcast(
        &mut self,
        idx: NodeIdx,
        symbol: Option<&T>,
        history: &[Option<T>],
    ) -> Result<Vec<Outcome>, RuleError> {
        let pattern = self.pattern;
        let node = &pattern[idx];
        // The chain goes first so attempts seeded below wait for the next symbol.
        let tail = match node.next {
            Some(next) => Some(self.broadcast(next, symbol, history)?),
            None => None,
        };

        let mut outcomes = match &node.target {
            Target::Atom(atom) => self.advance(idx, atom, node, symbol),
            Target::Rule(child) => {
                let reports = self.broadcast(*child, symbol, history)?;
                self.repeat(idx, *child, reports)?
            }
        };

        outcomes = match &node.combinator {
            Combinator::None => outcomes,
            Combinator::And(other) => outcomes
                .into_iter()
                .map(|outcome| self.conjoin(idx, *other, outcome, history))
                .collect::<Result<Vec<_>, _>>()?,
            Combinator::Or(alternatives) => {
                for alt in alternatives {
                    outcomes.extend(self.broadcast(*alt, symbol, history)?);
                }
                outcomes
            }
            Combinator::Xor(other) => settle(idx, outcomes)
                .into_iter()
                .map(|outcome| self.exclude(idx, *other, outcome, history))
                .collect::<Result<Vec<_>, _>>()?,
            Combinator::Not => settle(idx, outcomes)
                .into_iter()
                .map(Outcome::invert)
                .collect(),
        };

        for outcome in &mut outcomes {
            decorate(idx, node, outcome);
        }
        outcomes.retain(|outcome| self.arbiter.admits(pattern, outcome.span()));

        let (Some(next), Some(mut finished)) = (node.next, tail) else {
            return Ok(outcomes);
        };
        for outcome in outcomes {
            if let Outcome::Success(span) = outcome
                && let Some(passed) = self.seed_chain(next, span, true)?
            {
                finished.push(Outcome::Success(passed));
            }
        }
        Ok(finished)
    }

    fn advance(
        &mut self,
        idx: NodeIdx,
        atom: &Atom<T>,
        node: &Node<T>,
        symbol: Option<&T>,
    ) -> Vec<Outcome> {
        let attempts = std::mem::take(&mut self.live[idx.idx()]);
        let mut alive = Vec::with_capacity(attempts.len());
        let mut outcomes = Vec::new();
        for mut attempt in attempts {
            match attempt.advance(atom, node.name.as_ref(), symbol) {
                Step::Continue => alive.push(attempt),
                Step::Report(outcome) => {
                    outcomes.push(outcome);
                    alive.push(attempt);
                }
                Step::Last(outcome) => outcomes.push(outcome),
            }
        }
        self.live[idx.idx()] = alive;
        outcomes
    }

    /// Count a completed repetition of the group `idx`, seed the next one
    /// while under `max`, and pass on the spans whose count is in bounds.
    fn repeat(
        &mut self,
        idx: NodeIdx,
        child: NodeIdx,
        reports: Vec<Outcome>,
    ) -> Result<Vec<Outcome>, RuleError> {
        let pattern = self.pattern;
        let node = &pattern[idx];
        let mut passed = Vec::with_capacity(reports.len());
        for outcome in reports {
            match outcome {
                Outcome::Fail(mut span) => {
                    span.pop_frame(idx);
                    passed.push(Outcome::Fail(span));
                }
                Outcome::Success(mut span) => {
                    let frame = span.pop_frame(idx);
                    debug_assert!(
                        frame.is_some(),
                        "success of {idx:?} without a repetition frame"
                    );
                    let Some(mut frame) = frame else {
                        continue;
                    };
                    frame.count += 1;
                    if frame.max.is_none_or(|max| frame.count < max) {
                        let mut again = span.clone();
                        if let Some(name) = &node.name {
                            let origin = again.origin_of(idx).unwrap_or(again.epoch);
                            again.push_named(name, origin);
                        }
                        again.frames.push(frame.clone());
                        self.seed_chain(child, again, true)?;
                    }
                    if frame.count >= frame.min {
                        span.repeat = frame.count;
                        passed.push(Outcome::Success(span));
                    }
                }
            }
        }
        Ok(passed)
    }

    fn conjoin(
        &mut self,
        idx: NodeIdx,
        other: NodeIdx,
        outcome: Outcome,
        history: &[Option<T>],
    ) -> Result<Outcome, RuleError> {
        let Outcome::Success(mut span) = outcome else {
            return Ok(outcome);
        };
        let origin = span.origin_of(idx).unwrap_or(span.epoch);
        Ok(match self.replay(other, origin, span.end, history)? {
            Some(found) => {
                span.absorb(&found);
                Outcome::Success(span)
            }
            None => Outcome::Fail(span),
        })
    }

    fn exclude(
        &mut self,
        idx: NodeIdx,
        other: NodeIdx,
        outcome: Outcome,
        history: &[Option<T>],
    ) -> Result<Outcome, RuleError> {
        let origin = outcome.origin_of(idx).unwrap_or(outcome.epoch);
        let matched = self.replay(other, origin, outcome.end, history)?;
        Ok(match (outcome, matched) {
            (Outcome::Success(span), None) => Outcome::Success(span),
            (Outcome::Success(span), Some(_)) => Outcome::Fail(span),
            (Outcome::Fail(mut span), Some(found)) => {
                span.absorb(&found);
                Outcome::Success(span)
            }
            (Outcome::Fail(span), None) => Outcome::Fail(span),
        })
    }

    /// Seed `idx` at `from`, feed it `history[from..to]` and return a
    /// success that ends exactly at `to`.
    fn replay(
        &mut self,
        idx: NodeIdx,
        from: usize,
        to: usize,
        history: &[Option<T>],
    ) -> Result<Option<Span>, RuleError> {
        if from == to {
            return self.seed_chain(idx, Span::seed(from), false);
        }
        self.seed_chain(idx, Span::seed(from), true)?;
        let mut last = Vec::new();
        for symbol in &history[from..to] {
            last = self.broadcast(idx, symbol.as_ref(), history)?;
        }
        self.reset(idx);
        Ok(last.into_iter().find_map(|outcome| match outcome {
            Outcome::Success(span) if span.end == to => Some(span),
            _ => None,
        }))
    }

    /// Drop every live attempt under `idx`.
    fn reset(&mut self, idx: NodeIdx) {
        for attempts in &mut self.live[self.pattern.subtree(idx)] {
            attempts.clear();
        }
    }
}

/// Stamp the capture name and the arbitration length of node `idx` onto a
/// success, and drop the node's origin marker.
fn decorate<T>(idx: NodeIdx, node: &Node<T>, outcome: &mut Outcome) {
    let success = outcome.is_success();
    let span = outcome.span_mut();
    let origin = span.take_origin(idx).unwrap_or(span.epoch);
    if !success {
        return;
    }
    if let Some(name) = &node.name {
        span.push_named(name, origin);
    }
    if node.mode != Mode::All {
        let len = span.end - origin;
        span.push(Entry::Length { node: idx, len });
    }
}

/// Collapse outcomes of node `idx` that cover the same span: the span is a
/// success if any attempt matched it.
fn settle(idx: NodeIdx, outcomes: Vec<Outcome>) -> Vec<Outcome> {
    let key = |outcome: &Outcome| {
        (
            outcome.epoch,
            outcome.origin_of(idx).unwrap_or(outcome.epoch),
            outcome.end,
        )
    };
    let mut settled: Vec<Outcome> = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match settled.iter_mut().find(|seen| key(seen) == key(&outcome)) {
            Some(seen) => {
                if outcome.is_success() && !seen.is_success() {
                    *seen = outcome;
                }
            }
            None => settled.push(outcome),
        }
    }
    settled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Quantifier, Rule};

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "without a repetition frame")]
    fn test_group_success_needs_its_frame() {
        let pattern = Rule::group(Rule::symbol('a'))
            .repeat(Quantifier::exactly(2))
            .compile();
        let root = pattern.root();
        let Target::Rule(child) = pattern[root].target else {
            panic!("expected a wrapper");
        };
        let mut run = Run::new(&pattern);
        let _ = run.repeat(root, child, vec![Outcome::Success(Span::seed(1))]);
    }

    #[test]
    fn test_group_counts_repetitions_in_its_frame() {
        let pattern = Rule::group(Rule::symbol('a'))
            .repeat(Quantifier::exactly(2))
            .compile();
        let root = pattern.root();
        let Target::Rule(child) = pattern[root].target else {
            panic!("expected a wrapper");
        };
        let mut run = Run::new(&pattern);
        let mut span = Span::seed(1);
        span.end = 2;
        span.frames.push(Frame {
            node: root,
            count: 1,
            min: 2,
            max: Some(2),
        });
        let passed = run.repeat(root, child, vec![Outcome::Success(span)]).unwrap();
        assert_eq!(passed.len(), 1);
        assert_eq!(passed[0].repeat_count(), 2);
        assert!(passed[0].frames.is_empty());
        assert_eq!(run.live_attempts(), 0);
    }
}
