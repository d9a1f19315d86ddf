//! Shared logic for the commands that run completion (`complete`, `wd`).

use std::fs;
use std::path::Path;

use wordfsa_core::Colors;
use wordfsa_engine::{Engine, EngineOptions, Limits, PrintTracer, Verbosity};

use super::loader;

/// Limits given on the command line. Unset values keep the engine defaults.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LimitArgs {
    pub max_length: Option<usize>,
    pub max_equations: Option<usize>,
    pub max_overlap: Option<usize>,
}

impl LimitArgs {
    pub fn to_limits(self) -> Limits {
        let mut limits = Limits::new();
        if let Some(n) = self.max_length {
            limits = limits.max_word_length(n);
        }
        if let Some(n) = self.max_equations {
            limits = limits.max_equations(n);
        }
        if let Some(n) = self.max_overlap {
            limits = limits.max_overlap_length(n);
        }
        limits
    }
}

pub struct CompletionInput<'a> {
    pub presentation: &'a Path,
    pub limits: LimitArgs,
    pub options: EngineOptions,
    pub verbosity: Option<Verbosity>,
    pub color: bool,
    /// Refuse presentations with a generator that has no inverse.
    pub require_group: bool,
}

/// Load the presentation and run completion to the end, tracing to stderr
/// when a verbosity is set. Exits on failure.
pub fn run_completion(input: CompletionInput) -> Engine {
    let presentation = loader::load_presentation(input.presentation).unwrap_or_else(|e| fail(e));
    let mut engine = Engine::new(&presentation, input.limits.to_limits(), input.options)
        .unwrap_or_else(|e| fail(e));
    if input.require_group && !engine.alphabet().is_group() {
        fail("word differences need every generator to have an inverse");
    }

    match input.verbosity {
        Some(verbosity) => {
            let mut tracer = PrintTracer::new(engine.alphabet(), verbosity, Colors::new(input.color));
            let result = engine.complete_with(&mut tracer);
            tracer.print();
            result.unwrap_or_else(|e| fail(e));
        }
        None => engine.complete().unwrap_or_else(|e| fail(e)),
    }

    if !engine.is_confluent() {
        let stats = engine.stats();
        eprintln!(
            "warning: {} overlaps deferred; the result is not confluent",
            stats.deferred
        );
    }
    engine
}

/// Write `bytes` to `path`, or to stdout when `path` is absent.
pub fn write_output(path: Option<&Path>, bytes: &[u8]) {
    match path {
        Some(path) => {
            if let Err(e) = fs::write(path, bytes) {
                fail(format!("failed to write '{}': {}", path.display(), e));
            }
        }
        None => {
            use std::io::Write;
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = stdout.write_all(bytes).and_then(|()| stdout.flush()) {
                fail(format!("failed to write stdout: {}", e));
            }
        }
    }
}

pub fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", msg);
    std::process::exit(1);
}
