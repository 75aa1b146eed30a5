//! Concrete syntax tree produced by the parser
//!
//! The tree keeps every terminal as a leaf and every grammar rule
//! application as an interior node, with children in grammar order.

mod node;
mod production;

pub use node::*;
pub use production::*;
