//! The value threaded through every step of a match attempt.
//!
//! Positions are stored in *stream* coordinates: index 0 is the leading
//! boundary sentinel and input symbol `k` sits at index `k + 1`. Every public
//! accessor converts back to input coordinates, so a span that covers a
//! sentinel reports it as zero width.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::Arc;

use itertools::Itertools;

use crate::rule::NodeIdx;

/// One entry of a capture log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Entry {
    /// A completed capture group span.
    Named {
        name: Arc<str>,
        start: usize,
        end: usize,
    },
    /// Span length through a greedy or lazy node, read by arbitration.
    Length { node: NodeIdx, len: usize },
    /// Where the current activation of `node` started.
    Origin { node: NodeIdx, pos: usize },
}

/// Repetition bookkeeping for one activation of a group node.
///
/// Bounds are resolved once when the group is activated and travel with the
/// attempt, so later captures cannot move them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) node: NodeIdx,
    pub(crate) count: usize,
    pub(crate) min: usize,
    pub(crate) max: Option<usize>,
}

/// Position markers, repetition count and capture log of a match attempt.
///
/// Cloning is cheap: the capture log is shared until one of the clones
/// appends to it.
#[derive(Debug, Clone, Default)]
pub struct Span {
    pub(crate) epoch: usize,
    pub(crate) end: usize,
    pub(crate) repeat: usize,
    pub(crate) log: Arc<Vec<Entry>>,
    pub(crate) frames: Vec<Frame>,
}

impl Span {
    /// An empty span starting (and ending) at stream position `pos`.
    pub(crate) fn seed(pos: usize) -> Self {
        Self {
            epoch: pos,
            end: pos,
            ..Self::default()
        }
    }

    /// Start of the match this span belongs to.
    pub fn epoch(&self) -> usize {
        self.epoch.saturating_sub(1)
    }

    /// End of the span (exclusive).
    pub fn end(&self) -> usize {
        self.end.saturating_sub(1)
    }

    /// Number of completed repetitions of the quantified node that produced
    /// this span.
    pub fn repeat_count(&self) -> usize {
        self.repeat
    }

    /// All named captures, grouped by name, each list in encounter order.
    pub fn captures(&self) -> HashMap<&str, Vec<(usize, usize)>> {
        self.log
            .iter()
            .filter_map(|entry| match entry {
                Entry::Named { name, start, end } => Some((
                    name.as_ref(),
                    (start.saturating_sub(1), end.saturating_sub(1)),
                )),
                _ => None,
            })
            .into_group_map()
    }

    /// Spans recorded under `name`, in encounter order.
    pub fn group(&self, name: &str) -> Vec<(usize, usize)> {
        self.captures().remove(name).unwrap_or_default()
    }

    /// How many captures have been recorded under `name` so far.
    pub fn count(&self, name: &str) -> usize {
        self.log
            .iter()
            .filter(|entry| matches!(entry, Entry::Named { name: n, .. } if n.as_ref() == name))
            .count()
    }

    pub(crate) fn push(&mut self, entry: Entry) {
        Arc::make_mut(&mut self.log).push(entry);
    }

    pub(crate) fn push_named(&mut self, name: &Arc<str>, start: usize) {
        let end = self.end;
        self.push(Entry::Named {
            name: Arc::clone(name),
            start,
            end,
        });
    }

    /// Start of the most recent activation of `node` this span went through.
    pub(crate) fn origin_of(&self, node: NodeIdx) -> Option<usize> {
        self.log.iter().rev().find_map(|entry| match entry {
            Entry::Origin { node: n, pos } if *n == node => Some(*pos),
            _ => None,
        })
    }

    /// Like [`Span::origin_of`], but also removes the marker.
    pub(crate) fn take_origin(&mut self, node: NodeIdx) -> Option<usize> {
        let at = self
            .log
            .iter()
            .rposition(|entry| matches!(entry, Entry::Origin { node: n, .. } if *n == node))?;
        match Arc::make_mut(&mut self.log).remove(at) {
            Entry::Origin { pos, .. } => Some(pos),
            _ => None,
        }
    }

    /// Length markers left by greedy and lazy nodes.
    pub(crate) fn lengths(&self) -> impl Iterator<Item = (NodeIdx, usize)> + '_ {
        self.log.iter().filter_map(|entry| match entry {
            Entry::Length { node, len } => Some((*node, *len)),
            _ => None,
        })
    }

    /// Remove the repetition frame of `node` and anything stacked above it.
    pub(crate) fn pop_frame(&mut self, node: NodeIdx) -> Option<Frame> {
        let at = self.frames.iter().rposition(|frame| frame.node == node)?;
        let frame = self.frames.swap_remove(at);
        self.frames.truncate(at);
        Some(frame)
    }

    /// Append the named captures of `other`.
    pub(crate) fn absorb(&mut self, other: &Span) {
        let named = other
            .log
            .iter()
            .filter(|entry| matches!(entry, Entry::Named { .. }))
            .cloned()
            .collect_vec();
        if !named.is_empty() {
            Arc::make_mut(&mut self.log).extend(named);
        }
    }

    /// Strip internal bookkeeping and clamp positions to the trailing
    /// sentinel at stream index `limit`.
    pub(crate) fn finalize(mut self, limit: usize) -> Self {
        let log = self
            .log
            .iter()
            .filter_map(|entry| match entry {
                Entry::Named { name, start, end } => Some(Entry::Named {
                    name: Arc::clone(name),
                    start: (*start).min(limit),
                    end: (*end).min(limit),
                }),
                _ => None,
            })
            .collect_vec();
        self.epoch = self.epoch.min(limit);
        self.end = self.end.min(limit);
        self.log = Arc::new(log);
        self.frames.clear();
        self
    }

    /// Whether the span covers no input symbols.
    pub fn is_empty(&self) -> bool {
        self.epoch() >= self.end()
    }
}

/// A span tagged with whether the attempt that produced it matched.
#[derive(Debug, Clone)]
pub enum Outcome {
    Success(Span),
    Fail(Span),
}

impl Outcome {
    /// Flip the tag, keeping positions and captures.
    pub fn invert(self) -> Self {
        match self {
            Self::Success(span) => Self::Fail(span),
            Self::Fail(span) => Self::Success(span),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn span(&self) -> &Span {
        match self {
            Self::Success(span) | Self::Fail(span) => span,
        }
    }

    pub(crate) fn span_mut(&mut self) -> &mut Span {
        match self {
            Self::Success(span) | Self::Fail(span) => span,
        }
    }

    pub fn into_span(self) -> Span {
        match self {
            Self::Success(span) | Self::Fail(span) => span,
        }
    }
}

impl Deref for Outcome {
    type Target = Span;

    fn deref(&self) -> &Span {
        self.span()
    }
}

impl From<&Outcome> for bool {
    fn from(outcome: &Outcome) -> bool {
        outcome.is_success()
    }
}
