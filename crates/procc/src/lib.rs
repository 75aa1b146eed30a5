//! procc - front end for a small Pascal/Ada-style procedural language
//!
//! Source text goes through a scanner, a recursive descent parser that builds
//! the syntax tree and symbol tables, and a semantic analyzer that resolves
//! names and checks types. The checked tree is the input to a code generator.
//!
//! ## Architecture
//!
//! - **Frontend** (`frontend/`): lexer, syntax tree, parser, semantic analysis
//! - **Driver** (`driver/`): file handling and diagnostics wiring
//! - **Common** (`common/`): shared infrastructure (errors, spans)

pub mod common;
pub mod driver;
pub mod frontend;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use driver::Driver;
pub use frontend::{CheckedProgram, CompileContext, Frontend, FrontendConfig};
