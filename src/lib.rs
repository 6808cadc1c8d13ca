//! A streaming rule-tree matcher with quantifiers, captures and logical
//! combinators.
//!
//! Rules are built from atoms and combined with `then`, `&` (both must match
//! the same span), `|`, `^` (exactly one may match) and `!`. Matching consumes
//! the input one symbol at a time and keeps every viable attempt alive at
//! once, so nothing is ever backtracked over.
//!
//! # Example
//!
//! ```rust
//! use rulematch::{Mode, Quantifier, Rule};
//!
//! // the longest run of 'a's followed by just as many 'b's
//! let rule = Rule::symbol('a')
//!     .quantify(Quantifier::some(), Some("a"), Mode::Greedy)
//!     .then(Rule::symbol('b').repeat(Quantifier::same_as("a")));
//!
//! let found = rule.find_all("xaabbb".chars())?;
//! let spans: Vec<_> = found.iter().map(|m| (m.epoch(), m.end())).collect();
//! assert_eq!(spans, vec![(1, 5)]);
//! assert_eq!(found[0].group("a"), vec![(1, 2), (1, 3)]);
//! # Ok::<(), rulematch::RuleError>(())
//! ```

mod engine;
mod error;
mod outcome;
pub mod rule;

pub use engine::Stream;
pub use error::RuleError;
pub use outcome::{Outcome, Span};
pub use rule::{Atom, Bound, Mode, Pattern, Quantifier, Rule};
