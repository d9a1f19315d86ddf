//! Command builders for the CLI.
//!
//! Each command is built from the shared arg builders in `args.rs`.

use clap::Command;

use super::args::*;

/// Completion limits shared by `complete` and `wd`.
fn with_limit_args(cmd: Command) -> Command {
    cmd.arg(max_length_arg())
        .arg(max_equations_arg())
        .arg(max_overlap_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("wordfsa")
        .about("Knuth-Bendix completion for finitely presented groups and monoids")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(complete_command())
        .subcommand(reduce_command())
        .subcommand(dump_command())
        .subcommand(wd_command())
}

/// Run completion on a presentation and emit the rewriting system.
pub fn complete_command() -> Command {
    let cmd = Command::new("complete")
        .about("Complete a presentation into a rewriting system")
        .override_usage(
            "\
  wordfsa complete <PRESENTATION> [-o <FILE>] [--binary <FILE>]
  wordfsa complete <PRESENTATION> --max-length <N> --max-equations <N> -v",
        )
        .after_help(
            r#"EXAMPLES:
  wordfsa complete z2.json                     # system JSON to stdout
  wordfsa complete z2.json -o z2.rws.json      # system JSON to a file
  wordfsa complete s3.json --binary s3.wfsa    # also a binary module
  wordfsa complete bs.json --max-overlap 12    # stop short on long overlaps
  wordfsa complete s3.json -vv                 # trace to stderr"#,
        )
        .arg(presentation_arg())
        .arg(output_arg())
        .arg(binary_arg())
        .arg(no_differences_arg())
        .arg(keep_secondary_arg())
        .arg(verbose_arg())
        .arg(color_arg());

    with_limit_args(cmd)
}

/// Reduce words with a compiled system.
pub fn reduce_command() -> Command {
    Command::new("reduce")
        .about("Reduce words to normal form")
        .override_usage("  wordfsa reduce <SYSTEM> <WORD>...")
        .after_help(
            r#"EXAMPLES:
  wordfsa reduce s3.rws.json 'a*b*a' bab    # one normal form per line
  wordfsa reduce s3.wfsa 'b a b'            # binary module input"#,
        )
        .arg(system_arg())
        .arg(words_arg())
}

/// Show rules and the transition table of a compiled system.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show the rules and states of a compiled system")
        .override_usage("  wordfsa dump <SYSTEM>")
        .after_help(
            r#"EXAMPLES:
  wordfsa dump s3.rws.json
  wordfsa dump s3.wfsa --color never"#,
        )
        .arg(system_arg())
        .arg(color_arg())
}

/// Run completion and export the word-difference automaton.
pub fn wd_command() -> Command {
    let cmd = Command::new("wd")
        .about("Export the word-difference automaton of a group presentation")
        .override_usage(
            "\
  wordfsa wd <PRESENTATION> [--format text|json]
  wordfsa wd <PRESENTATION> --format binary -o <FILE>",
        )
        .after_help(
            r#"EXAMPLES:
  wordfsa wd z2.json                              # one line per state
  wordfsa wd z2.json --format json -o z2.wd.json
  wordfsa wd s3.json --known-only --sparse --format binary -o s3.wd"#,
        )
        .arg(presentation_arg())
        .arg(output_arg())
        .arg(format_arg())
        .arg(primary_only_arg())
        .arg(known_only_arg())
        .arg(sparse_arg())
        .arg(verbose_arg())
        .arg(color_arg());

    with_limit_args(cmd)
}
