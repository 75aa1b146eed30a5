//! Parser module: tokens to syntax tree plus symbol tables

mod parser;

pub use parser::{parse, ParsedProgram, Parser, MAX_EXPRESSION_DEPTH};
