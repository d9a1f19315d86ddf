//! Run completion and emit the compiled rewriting system.

use std::path::PathBuf;

use wordfsa_core::Colors;
use wordfsa_engine::{EngineOptions, NoopTracer, PrintTracer, Verbosity};

use super::run_common::{self, CompletionInput, LimitArgs, fail};

pub struct CompleteArgs {
    pub presentation: PathBuf,
    pub output: Option<PathBuf>,
    pub binary: Option<PathBuf>,
    pub limits: LimitArgs,
    pub track_differences: bool,
    pub keep_secondary: bool,
    pub verbosity: Option<Verbosity>,
    pub color: bool,
}

pub fn run(args: CompleteArgs) {
    let options = EngineOptions::new()
        .track_differences(args.track_differences)
        .keep_secondary(args.keep_secondary);
    let mut engine = run_common::run_completion(CompletionInput {
        presentation: &args.presentation,
        limits: args.limits,
        options,
        verbosity: args.verbosity,
        color: args.color,
        require_group: false,
    });

    let system = match args.verbosity {
        Some(verbosity) => {
            let mut tracer = PrintTracer::new(engine.alphabet(), verbosity, Colors::new(args.color));
            let system = engine.compile_with(&mut tracer);
            tracer.print();
            system
        }
        None => engine.compile_with(&mut NoopTracer),
    }
    .unwrap_or_else(|e| fail(e));

    let mut json = system.to_serialized().to_json();
    json.push('\n');
    run_common::write_output(args.output.as_deref(), json.as_bytes());

    if let Some(path) = &args.binary {
        run_common::write_output(Some(path), &system.to_bytes());
    }

    eprintln!(
        "{} rules, {} states, {}",
        system.rule_count(),
        system.state_count(),
        if system.is_confluent() { "confluent" } else { "not confluent" }
    );
}
