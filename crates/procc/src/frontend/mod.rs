//! Front end pipeline
//!
//! The front end is responsible for:
//! 1. Scanning source text into tokens
//! 2. Parsing tokens into a syntax tree, filling symbol tables on the way
//! 3. Semantic analysis (scope resolution and type checking)
//!
//! Its output is a [`CheckedProgram`], the hand-off artifact for a code generator.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

use crate::common::{CompileResult, DiagnosticReporter};

pub use ast::{Production, SyntaxNode};
pub use lexer::{scan, Scanner, Token, TokenKind};
pub use parser::{parse, ParsedProgram, Parser};
pub use sema::{ScopeChain, SemanticAnalyzer, SymbolEntry, SymbolTable, SymbolType};

/// Configuration options passed to the front end
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_tree: bool,
    pub verbose: bool,
}

/// Compilation context providing access to diagnostics and file info
pub struct CompileContext<'a> {
    pub filename: String,
    pub file_id: usize,
    pub reporter: &'a DiagnosticReporter,
}

impl<'a> CompileContext<'a> {
    pub fn new(filename: String, file_id: usize, reporter: &'a DiagnosticReporter) -> Self {
        Self { filename, file_id, reporter }
    }
}

/// A syntax tree that passed semantic analysis, with the tables it was checked against
///
/// Procedure-local tables stay attached to their declaration nodes in `tree`.
#[derive(Debug, Clone)]
pub struct CheckedProgram {
    pub tree: SyntaxNode,
    pub globals: SymbolTable,
    pub builtins: SymbolTable,
}

impl CheckedProgram {
    /// Name given in the program header
    pub fn name(&self) -> Option<&str> {
        self.tree
            .child(0)
            .and_then(|header| header.child(1))
            .and_then(SyntaxNode::identifier)
    }
}

/// Scan, parse and analyze one source file
pub struct Frontend;

impl Frontend {
    pub fn new() -> Self {
        Self
    }

    /// Run the whole pipeline, reporting the first error through `ctx`
    pub fn compile(
        &self,
        source: &str,
        ctx: &CompileContext,
        config: &FrontendConfig,
    ) -> CompileResult<CheckedProgram> {
        log::debug!("compiling {}", ctx.filename);
        let result = self.run(source, config);
        if let Err(e) = &result {
            ctx.reporter.report_error(ctx.file_id, e);
        }
        result
    }

    /// Run the whole pipeline without reporting
    pub fn check(&self, source: &str) -> CompileResult<CheckedProgram> {
        self.run(source, &FrontendConfig::default())
    }

    fn run(&self, source: &str, config: &FrontendConfig) -> CompileResult<CheckedProgram> {
        // Phase 1: Scanning
        if config.verbose {
            eprintln!("Scanning...");
        }
        let tokens = scan(source)?;

        if config.dump_tokens {
            eprintln!("=== Tokens ===");
            for token in &tokens {
                eprintln!("{token}");
            }
            eprintln!("=== End Tokens ===\n");
        }

        // Phase 2: Parsing
        if config.verbose {
            eprintln!("Parsing...");
        }
        let ParsedProgram { tree, globals, builtins } = parse(tokens)?;

        if config.dump_tree {
            eprintln!("=== Syntax Tree ===");
            eprint!("{tree}");
            eprintln!("=== End Syntax Tree ===\n");
        }

        // Phase 3: Semantic analysis
        if config.verbose {
            eprintln!("Analyzing...");
        }
        SemanticAnalyzer::new(&globals, &builtins).analyze(&tree)?;

        log::debug!("front end finished: {} global symbols", globals.len());
        Ok(CheckedProgram { tree, globals, builtins })
    }

    pub fn dump_tokens(&self, source: &str) -> CompileResult<String> {
        let tokens = scan(source)?;
        let mut output = String::new();
        for token in &tokens {
            output.push_str(&token.to_string());
            output.push('\n');
        }
        Ok(output)
    }

    pub fn dump_tree(&self, source: &str) -> CompileResult<String> {
        let program = parse(scan(source)?)?;
        Ok(program.tree.to_string())
    }
}

impl Default for Frontend {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::common::CompileError;

    #[test]
    fn test_check_returns_tables() {
        let program = Frontend::new()
            .check("program demo is variable x : integer; begin x := 1; end program.")
            .unwrap();
        assert_eq!(program.name(), Some("demo"));
        assert!(program.globals.contains("x"));
        assert!(program.builtins.contains("getinteger"));
    }

    #[test]
    fn test_first_error_stops_pipeline() {
        let err = Frontend::new().check("program p is begin x := @; end program.").unwrap_err();
        assert!(matches!(err, CompileError::Scan { line: 1, .. }));
    }

    #[test]
    fn test_dump_tokens_format() {
        let dump = Frontend::new().dump_tokens("x := 42").unwrap();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(
            lines,
            vec!["Ln:1 | IdentifierToken | x", "Ln:1 | := |", "Ln:1 | IntegerToken | 42"]
        );
    }

    #[test]
    fn test_dump_tree_starts_at_program() {
        let dump = Frontend::new().dump_tree("program p is begin end program.").unwrap();
        assert!(dump.starts_with("<program>\n  <program_header>\n    'program'\n"), "{dump}");
    }
}
