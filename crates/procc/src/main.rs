//! procc - checks a source program through scanning, parsing and semantic analysis
//!
//! Usage: procc [OPTIONS] [input]

use anyhow::Context;
use clap::Parser as ClapParser;
use procc::driver::{Driver, DEFAULT_INPUT};
use procc::frontend::FrontendConfig;
use std::path::PathBuf;
use std::process;

#[derive(ClapParser, Debug)]
#[command(name = "procc")]
#[command(version)]
#[command(about = "Front end for a small procedural language", long_about = None)]
struct Args {
    /// Input source file
    #[arg(default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Input source file (overrides the positional argument)
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    input_flag: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump the syntax tree (for debugging)
    #[arg(long)]
    dump_tree: bool,
}

impl Args {
    fn input(&self) -> &PathBuf {
        self.input_flag.as_ref().unwrap_or(&self.input)
    }
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(&args) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let input = args.input();
    let config = FrontendConfig {
        dump_tokens: args.dump_tokens,
        dump_tree: args.dump_tree,
        verbose: args.verbose,
    };

    let program = Driver::new(config)
        .compile_file(input)
        .with_context(|| format!("failed to compile {}", input.display()))?;

    if args.verbose {
        eprintln!(
            "Checked program '{}' ({} global symbols)",
            program.name().unwrap_or("?"),
            program.globals.len()
        );
    }

    Ok(())
}
