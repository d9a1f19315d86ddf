//! Run completion and export the word-difference automaton.

use std::path::PathBuf;

use wordfsa_engine::{EngineOptions, Verbosity, WdFlags};

use super::run_common::{self, CompletionInput, LimitArgs, fail};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WdFormat {
    #[default]
    Text,
    Json,
    Binary,
}

pub struct WdArgs {
    pub presentation: PathBuf,
    pub output: Option<PathBuf>,
    pub format: WdFormat,
    pub flags: WdFlags,
    pub limits: LimitArgs,
    pub verbosity: Option<Verbosity>,
    pub color: bool,
}

pub fn run(args: WdArgs) {
    if args.format == WdFormat::Binary && args.output.is_none() {
        fail("binary output needs -o <FILE>");
    }

    let mut engine = run_common::run_completion(CompletionInput {
        presentation: &args.presentation,
        limits: args.limits,
        options: EngineOptions::new(),
        verbosity: args.verbosity,
        color: args.color,
        require_group: true,
    });

    let automaton = engine.grow_wd(args.flags).unwrap_or_else(|e| fail(e));
    let bytes = match args.format {
        WdFormat::Text => automaton.dump(engine.alphabet()).into_bytes(),
        WdFormat::Json => {
            let mut json = automaton.to_json();
            json.push('\n');
            json.into_bytes()
        }
        WdFormat::Binary => automaton.to_binary(),
    };
    run_common::write_output(args.output.as_deref(), &bytes);

    eprintln!(
        "{} states, {} transitions",
        automaton.state_count,
        automaton.transition_count()
    );
}
