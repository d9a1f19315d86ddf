//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands,
//! so `complete` and `wd` share one definition of the completion limits.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Presentation file (positional). `-` reads stdin.
pub fn presentation_arg() -> Arg {
    Arg::new("presentation")
        .value_name("PRESENTATION")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Presentation JSON file (`-` for stdin)")
}

/// Compiled system (positional): JSON record or binary module.
pub fn system_arg() -> Arg {
    Arg::new("system")
        .value_name("SYSTEM")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Rewriting system (JSON record or .wfsa module)")
}

/// Words to reduce (positional, repeated).
pub fn words_arg() -> Arg {
    Arg::new("words")
        .value_name("WORD")
        .num_args(1..)
        .required(true)
        .help("Words to reduce, as generator names separated by `*` or spaces")
}

/// Output file (-o/--output).
pub fn output_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Write the result to FILE instead of stdout")
}

/// Binary module output (--binary).
pub fn binary_arg() -> Arg {
    Arg::new("binary")
        .long("binary")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Also write the compiled system as a binary module")
}

/// Word length bound (--max-length).
pub fn max_length_arg() -> Arg {
    Arg::new("max_length")
        .long("max-length")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Longest word the engine may hold")
}

/// Live equation bound (--max-equations).
pub fn max_equations_arg() -> Arg {
    Arg::new("max_equations")
        .long("max-equations")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Stop once more equations than N are alive")
}

/// Overlap deferral bound (--max-overlap).
pub fn max_overlap_arg() -> Arg {
    Arg::new("max_overlap")
        .long("max-overlap")
        .value_name("N")
        .value_parser(value_parser!(usize))
        .help("Defer overlaps longer than N (the result is then not confluent)")
}

/// Disable the word-difference tracker (--no-differences).
pub fn no_differences_arg() -> Arg {
    Arg::new("no_differences")
        .long("no-differences")
        .action(ArgAction::SetTrue)
        .help("Do not track word differences")
}

/// Keep secondary equations in the output (--keep-secondary).
pub fn keep_secondary_arg() -> Arg {
    Arg::new("keep_secondary")
        .long("keep-secondary")
        .action(ArgAction::SetTrue)
        .help("Keep equations the difference tracker found")
}

/// Difference automaton output format (--format).
pub fn format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .value_name("FORMAT")
        .default_value("text")
        .value_parser(["text", "json", "binary"])
        .help("Automaton output format")
}

/// Only primary states (--primary-only).
pub fn primary_only_arg() -> Arg {
    Arg::new("primary_only")
        .long("primary-only")
        .action(ArgAction::SetTrue)
        .help("Only states reached by primary equations")
}

/// Only proved transitions (--known-only).
pub fn known_only_arg() -> Arg {
    Arg::new("known_only")
        .long("known-only")
        .action(ArgAction::SetTrue)
        .help("Only transitions proved by an equation")
}

/// Sparse transition table (--sparse).
pub fn sparse_arg() -> Arg {
    Arg::new("sparse")
        .long("sparse")
        .action(ArgAction::SetTrue)
        .help("Emit a sparse transition table")
}

/// Trace verbosity (-v, -vv, -vvv).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Trace completion (-v events, -vv adoptions and states, -vvv transitions)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}
