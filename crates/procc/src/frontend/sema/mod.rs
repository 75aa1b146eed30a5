//! Semantic analysis module
//!
//! Symbol tables, the type rules between symbol types, and the analyzer
//! that checks a parsed tree against them.

mod analyzer;
mod scope;
mod types;

pub use analyzer::SemanticAnalyzer;
pub use scope::{ScopeChain, SymbolEntry, SymbolTable};
pub use types::SymbolType;
