//! Building rules and compiling them into patterns.

pub mod ast;
pub mod compile;
pub mod quantifier;

pub use ast::{Atom, Combinator, Mode, Predicate, Rule, Target};
pub use compile::{Node, NodeIdx, Pattern};
pub use quantifier::{Bound, Count, Quantifier};
