//! Errors raised while building or running a rule tree.

/// Errors that can occur while constructing a rule or resolving its bounds.
///
/// Everything except [`RuleError::InvertedBounds`] is reported while the tree
/// is being built. Input that simply does not match is never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// A literal atom with no symbols in it.
    EmptyLiteral,
    /// A sequence with no elements.
    EmptySequence,
    /// A quantifier whose lower bound is infinite.
    UnboundedMinimum,
    /// A quantifier whose resolved lower bound exceeds its upper bound.
    InvertedBounds { min: usize, max: usize },
    /// A textual quantifier that could not be parsed.
    MalformedQuantifier(String),
}

impl std::fmt::Display for RuleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLiteral => write!(f, "Literal atom must contain at least one symbol"),
            Self::EmptySequence => write!(f, "Sequence must contain at least one rule"),
            Self::UnboundedMinimum => write!(f, "Quantifier lower bound cannot be infinite"),
            Self::InvertedBounds { min, max } => {
                write!(f, "Quantifier lower bound {min} exceeds upper bound {max}")
            }
            Self::MalformedQuantifier(text) => write!(f, "Malformed quantifier: {text:?}"),
        }
    }
}

impl std::error::Error for RuleError {}
