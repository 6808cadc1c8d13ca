//! Greedy/lazy arbitration.
//!
//! Every span that passes a greedy or lazy node carries a length marker for
//! it. Finished matches update the best length per node, across every match
//! start of the run; candidates that are already worse than the best are
//! dropped wherever they are seen.

use std::collections::HashMap;

use crate::outcome::Span;
use crate::rule::{Mode, NodeIdx, Pattern};

#[derive(Debug, Default)]
pub(crate) struct Arbiter {
    best: HashMap<NodeIdx, usize>,
}

impl Arbiter {
    /// Fold the length markers of a finished match into the best lengths.
    pub(crate) fn record<T>(&mut self, pattern: &Pattern<T>, span: &Span) {
        for (node, len) in span.lengths() {
            match pattern[node].mode {
                Mode::Greedy => {
                    let best = self.best.entry(node).or_insert(len);
                    *best = (*best).max(len);
                }
                Mode::Lazy => {
                    let best = self.best.entry(node).or_insert(len);
                    *best = (*best).min(len);
                }
                Mode::All => {}
            }
        }
    }

    /// Whether `span` is no worse than the best known length at every
    /// greedy or lazy node it went through.
    pub(crate) fn admits<T>(&self, pattern: &Pattern<T>, span: &Span) -> bool {
        span.lengths().all(|(node, len)| {
            match (pattern[node].mode, self.best.get(&node)) {
                (Mode::Greedy, Some(&best)) => len >= best,
                (Mode::Lazy, Some(&best)) => len <= best,
                _ => true,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Entry;
    use crate::rule::{Quantifier, Rule};

    fn through(node: NodeIdx, epoch: usize, len: usize) -> Span {
        let mut span = Span::seed(epoch);
        span.push(Entry::Length { node, len });
        span
    }

    fn single(mode: Mode) -> Pattern<char> {
        Rule::symbol('a')
            .quantify(Quantifier::any(), None, mode)
            .compile()
    }

    #[test]
    fn greedy_keeps_the_longest() {
        let pattern = single(Mode::Greedy);
        let node = pattern.root();
        let mut arbiter = Arbiter::default();
        arbiter.record(&pattern, &through(node, 1, 2));
        arbiter.record(&pattern, &through(node, 1, 5));
        arbiter.record(&pattern, &through(node, 1, 3));
        assert!(!arbiter.admits(&pattern, &through(node, 1, 4)));
        assert!(arbiter.admits(&pattern, &through(node, 1, 5)));
    }

    #[test]
    fn lazy_keeps_the_shortest() {
        let pattern = single(Mode::Lazy);
        let node = pattern.root();
        let mut arbiter = Arbiter::default();
        arbiter.record(&pattern, &through(node, 1, 3));
        arbiter.record(&pattern, &through(node, 1, 1));
        assert!(!arbiter.admits(&pattern, &through(node, 1, 2)));
        assert!(arbiter.admits(&pattern, &through(node, 1, 1)));
    }

    #[test]
    fn match_starts_compete_with_each_other() {
        let pattern = single(Mode::Greedy);
        let node = pattern.root();
        let mut arbiter = Arbiter::default();
        arbiter.record(&pattern, &through(node, 1, 9));
        assert!(!arbiter.admits(&pattern, &through(node, 4, 1)));
        assert!(arbiter.admits(&pattern, &through(node, 4, 9)));
    }

    #[test]
    fn plain_nodes_are_ignored() {
        let pattern = single(Mode::All);
        let node = pattern.root();
        let mut arbiter = Arbiter::default();
        arbiter.record(&pattern, &through(node, 1, 9));
        assert!(arbiter.admits(&pattern, &through(node, 1, 0)));
    }
}
