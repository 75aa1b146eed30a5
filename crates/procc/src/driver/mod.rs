//! Compilation driver: source files in, checked programs out

use crate::common::{CompileResult, DiagnosticReporter};
use crate::frontend::{CheckedProgram, CompileContext, Frontend, FrontendConfig};
use std::fs;
use std::path::Path;

/// Default input when no path is given on the command line
pub const DEFAULT_INPUT: &str = "data/source.src";

/// Runs the front end over a file with diagnostics wired to stderr
pub struct Driver {
    frontend: Frontend,
    config: FrontendConfig,
}

impl Driver {
    pub fn new(config: FrontendConfig) -> Self {
        Self {
            frontend: Frontend::new(),
            config,
        }
    }

    /// Read `path` and run it through the front end
    pub fn compile_file(&self, path: &Path) -> CompileResult<CheckedProgram> {
        let source = fs::read_to_string(path)?;
        self.compile_source(&source, &path.display().to_string())
    }

    /// Run in-memory source text through the front end, reporting under `filename`
    pub fn compile_source(&self, source: &str, filename: &str) -> CompileResult<CheckedProgram> {
        let mut reporter = DiagnosticReporter::new();
        let file_id = reporter.add_file(filename, source);

        if self.config.verbose {
            eprintln!("Checking {filename}");
        }
        log::debug!("read {} bytes from {filename}", source.len());

        let ctx = CompileContext::new(filename.to_string(), file_id, &reporter);
        self.frontend.compile(source, &ctx, &self.config)
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(FrontendConfig::default())
    }
}
