//! gonec-drv - Compiler driver.
//!
//! Entry point and orchestrator for the Gone front end. The driver
//! reads a source file, runs the pipeline up to the requested phase,
//! prints that phase's artifact to stdout, and reports diagnostics on
//! stderr. It contains no language logic of its own.
//!
//! ```text
//! Source (.g)
//!      |
//!      v
//! [gonec-lex] --> tokens          (phase: lex)
//!      |
//!      v
//! [gonec-par] --> AST             (phase: parse)
//!      |
//!      v
//! [gonec-sem] --> typed AST       (phase: check)
//!      |
//!      v
//! [gonec-ir]  --> instructions    (phase: ir)
//! ```
//!
//! Exit status is 0 iff no diagnostic was produced. IR is only
//! generated when checking reported no errors.

mod dump;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gonec_sem::TypeRegistry;
use gonec_util::Handler;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Compiler configuration, straight from the command line.
#[derive(Debug, Parser)]
#[command(
    name = "gonec",
    about = "Compiler front end for the Gone language",
    version
)]
pub struct Config {
    /// Phase to run
    #[arg(value_enum)]
    pub phase: Phase,

    /// Gone source file
    pub input: PathBuf,

    /// With `check`: print the resolved type of every expression
    #[arg(long)]
    pub show_types: bool,
}

/// Pipeline phase selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Phase {
    /// Print the token stream
    Lex,
    /// Print the AST
    Parse,
    /// Run semantic checks
    Check,
    /// Print the basic-block IR
    Ir,
}

/// Driver-level failures that are not Gone diagnostics.
#[derive(Debug, Error)]
pub enum CompileError {
    /// One or more diagnostics were reported
    #[error("compilation failed")]
    CompilationFailed,
}

/// Parse arguments, run one compilation session, and map diagnostics to
/// the exit status.
pub fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing();

    Session::new(config).run()
}

/// Initialize the tracing subscriber from the `GONEC_LOG` env filter.
fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env("GONEC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// State for one compiler invocation.
pub struct Session {
    config: Config,
    handler: Handler,
}

impl Session {
    /// Create a session for the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            handler: Handler::new(),
        }
    }

    /// Run the pipeline up to the configured phase.
    ///
    /// Diagnostics go to stderr in detection order; the phase artifact
    /// goes to stdout. Returns `CompileError::CompilationFailed` when
    /// any diagnostic was produced.
    pub fn run(&self) -> Result<()> {
        let path = &self.config.input;
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("can't read {}", path.display()))?;

        debug!(file = %path.display(), "lexing");
        if self.config.phase == Phase::Lex {
            for token in gonec_lex::tokenize(&source, &self.handler) {
                println!("{}: {}", token.span.line, token.token);
            }
            return self.finish();
        }

        debug!(file = %path.display(), "parsing");
        let ast = gonec_par::parse(&source, &self.handler);
        if self.config.phase == Phase::Parse {
            if !self.handler.has_errors() {
                println!("{ast:#?}");
            }
            return self.finish();
        }

        // The pipeline halts before checking when parsing failed
        if self.handler.has_errors() {
            return self.finish();
        }

        debug!("checking");
        let registry = TypeRegistry::new();
        let context = gonec_sem::check(&ast, &registry, &self.handler);
        if self.config.phase == Phase::Check {
            if self.config.show_types && !self.handler.has_errors() {
                dump::show_types(&ast, &context, &registry);
            }
            return self.finish();
        }

        // IR is only generated for clean programs
        if self.handler.error_count() == 0 {
            debug!("lowering");
            for inst in gonec_ir::lower(&ast) {
                println!("{inst}");
            }
        }

        self.finish()
    }

    /// Print diagnostics and convert their presence into the result.
    fn finish(&self) -> Result<()> {
        for diagnostic in self.handler.diagnostics() {
            eprintln!("{diagnostic}");
        }

        if self.handler.has_errors() {
            Err(CompileError::CompilationFailed.into())
        } else {
            Ok(())
        }
    }
}
