//! Matching a compiled [`Pattern`](crate::rule::Pattern) against a stream of
//! symbols.

mod arbiter;
mod attempt;
mod run;
mod stream;

pub use stream::Stream;

#[cfg(test)]
mod tests;
