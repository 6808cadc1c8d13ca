//! Flattening a [`Rule`] tree into an indexed arena.
//!
//! Nodes are stored in post-order, so the subtree rooted at a node occupies
//! the contiguous range `first..=idx`. Per-run state is kept outside the
//! pattern, keyed by [`NodeIdx`], which lets one `Pattern` serve any number
//! of runs.

use std::ops::{Index, RangeInclusive};
use std::sync::Arc;

use super::ast::{Atom, Combinator, Mode, Rule, Target};
use super::quantifier::Quantifier;

/// Stable position of a node inside a [`Pattern`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub(crate) usize);

impl NodeIdx {
    #[inline]
    pub(crate) fn idx(self) -> usize {
        self.0
    }
}

/// One node of a compiled [`Pattern`].
#[derive(Debug)]
pub struct Node<T> {
    pub(crate) target: Target<T, NodeIdx>,
    pub(crate) quantifier: Quantifier,
    pub(crate) name: Option<Arc<str>>,
    pub(crate) mode: Mode,
    pub(crate) combinator: Combinator<NodeIdx>,
    pub(crate) next: Option<NodeIdx>,
    /// First node of this node's subtree.
    pub(crate) first: NodeIdx,
}

impl<T> Node<T> {
    /// Whether activations of this node leave an origin marker behind.
    pub(crate) fn needs_origin(&self) -> bool {
        self.name.is_some()
            || self.mode != Mode::All
            || !matches!(self.combinator, Combinator::None | Combinator::Or(_))
    }
}

/// A compiled rule, ready to be matched any number of times.
#[derive(Debug)]
pub struct Pattern<T> {
    nodes: Vec<Node<T>>,
    root: NodeIdx,
}

impl<T> Pattern<T> {
    pub fn root(&self) -> NodeIdx {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in the subtree rooted at `idx`, `idx` included.
    pub(crate) fn subtree(&self, idx: NodeIdx) -> RangeInclusive<usize> {
        self[idx].first.idx()..=idx.idx()
    }
}

impl<T> Index<NodeIdx> for Pattern<T> {
    type Output = Node<T>;

    #[inline]
    fn index(&self, idx: NodeIdx) -> &Node<T> {
        &self.nodes[idx.idx()]
    }
}

impl<T: Clone> Pattern<T> {
    pub fn new(rule: &Rule<T>) -> Self {
        let mut nodes = Vec::new();
        let root = lower(rule, &mut nodes);
        Self { nodes, root }
    }
}

impl<T: Clone> From<&Rule<T>> for Pattern<T> {
    fn from(rule: &Rule<T>) -> Self {
        Self::new(rule)
    }
}

impl<T: Clone> Rule<T> {
    pub fn compile(&self) -> Pattern<T> {
        Pattern::new(self)
    }
}

fn lower<T: Clone>(rule: &Rule<T>, nodes: &mut Vec<Node<T>>) -> NodeIdx {
    let first = NodeIdx(nodes.len());
    let target = match &rule.target {
        Target::Atom(atom) => Target::Atom(Atom::clone(atom)),
        Target::Rule(inner) => Target::Rule(lower(inner, nodes)),
    };
    let combinator = match &rule.combinator {
        Combinator::None => Combinator::None,
        Combinator::And(other) => Combinator::And(lower(other, nodes)),
        Combinator::Or(alternatives) => {
            Combinator::Or(alternatives.iter().map(|alt| lower(alt, nodes)).collect())
        }
        Combinator::Xor(other) => Combinator::Xor(lower(other, nodes)),
        Combinator::Not => Combinator::Not,
    };
    let next = rule.next.as_ref().map(|next| lower(next, nodes));
    nodes.push(Node {
        target,
        quantifier: rule.quantifier.clone(),
        name: rule.name.clone(),
        mode: rule.mode,
        combinator,
        next,
        first,
    });
    NodeIdx(nodes.len() - 1)
}
