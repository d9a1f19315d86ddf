//! Tests for CLI dispatch logic.
//!
//! These tests verify:
//! 1. Params extraction: correct fields are extracted from ArgMatches
//! 2. Conversion: params become command args with defaults applied
//! 3. Rejection: missing positionals and bad values fail in clap

use std::path::PathBuf;

use wordfsa_engine::{Verbosity, WdFlags};

use super::*;
use crate::cli::commands::{complete_command, dump_command, reduce_command, wd_command};
use crate::commands::complete::CompleteArgs;
use crate::commands::run_common::LimitArgs;
use crate::commands::wd::{WdArgs, WdFormat};

#[test]
fn complete_extracts_limits() {
    let m = complete_command()
        .try_get_matches_from([
            "complete",
            "s3.json",
            "-o",
            "s3.rws.json",
            "--binary",
            "s3.wfsa",
            "--max-length",
            "40",
            "--max-equations",
            "1000",
        ])
        .unwrap();

    let params = CompleteParams::from_matches(&m);

    assert_eq!(params.presentation, PathBuf::from("s3.json"));
    assert_eq!(params.output, Some(PathBuf::from("s3.rws.json")));
    assert_eq!(params.binary, Some(PathBuf::from("s3.wfsa")));
    assert_eq!(
        params.limits,
        LimitArgs {
            max_length: Some(40),
            max_equations: Some(1000),
            max_overlap: None,
        }
    );
    assert_eq!(params.verbose, 0);
}

#[test]
fn complete_defaults() {
    let m = complete_command()
        .try_get_matches_from(["complete", "z2.json", "--color", "never"])
        .unwrap();

    let args: CompleteArgs = CompleteParams::from_matches(&m).into();

    assert_eq!(args.output, None);
    assert_eq!(args.limits, LimitArgs::default());
    assert!(args.track_differences);
    assert!(!args.keep_secondary);
    assert_eq!(args.verbosity, None);
    assert!(!args.color);

    let limits = args.limits.to_limits();
    assert_eq!(limits.get_max_overlap_length(), usize::MAX);
}

#[test]
fn verbose_count_selects_trace_level() {
    let level = |flags: &[&str]| {
        let mut argv = vec!["complete", "z2.json"];
        argv.extend_from_slice(flags);
        let m = complete_command().try_get_matches_from(argv).unwrap();
        CompleteArgs::from(CompleteParams::from_matches(&m)).verbosity
    };

    assert_eq!(level(&[]), None);
    assert_eq!(level(&["-v"]), Some(Verbosity::Default));
    assert_eq!(level(&["-vv"]), Some(Verbosity::Verbose));
    assert_eq!(level(&["-vvv"]), Some(Verbosity::VeryVerbose));
    assert_eq!(level(&["-v", "-v", "-v", "-v"]), Some(Verbosity::VeryVerbose));
}

#[test]
fn complete_flags_toggle_options() {
    let m = complete_command()
        .try_get_matches_from(["complete", "z2.json", "--no-differences", "--keep-secondary"])
        .unwrap();

    let args: CompleteArgs = CompleteParams::from_matches(&m).into();

    assert!(!args.track_differences);
    assert!(args.keep_secondary);
}

#[test]
fn complete_requires_presentation() {
    let result = complete_command().try_get_matches_from(["complete"]);

    assert!(result.is_err());
}

#[test]
fn limits_must_be_numbers() {
    let result = complete_command().try_get_matches_from(["complete", "z2.json", "--max-length", "many"]);

    assert!(result.is_err());
}

#[test]
fn reduce_collects_words() {
    let m = reduce_command()
        .try_get_matches_from(["reduce", "s3.wfsa", "a*b*a", "bab"])
        .unwrap();

    let params = ReduceParams::from_matches(&m);

    assert_eq!(params.system, PathBuf::from("s3.wfsa"));
    assert_eq!(params.words, vec!["a*b*a", "bab"]);
}

#[test]
fn reduce_requires_a_word() {
    let result = reduce_command().try_get_matches_from(["reduce", "s3.wfsa"]);

    assert!(result.is_err());
}

#[test]
fn dump_extracts_color() {
    let m = dump_command()
        .try_get_matches_from(["dump", "s3.rws.json", "--color", "always"])
        .unwrap();

    let params = DumpParams::from_matches(&m);

    assert_eq!(params.system, PathBuf::from("s3.rws.json"));
    assert!(params.color.should_colorize());
}

#[test]
fn wd_builds_flags() {
    let m = wd_command()
        .try_get_matches_from([
            "wd",
            "s3.json",
            "--format",
            "binary",
            "-o",
            "s3.wd",
            "--known-only",
            "--sparse",
            "--max-overlap",
            "12",
        ])
        .unwrap();

    let args: WdArgs = WdParams::from_matches(&m).into();

    assert_eq!(args.format, WdFormat::Binary);
    assert_eq!(args.output, Some(PathBuf::from("s3.wd")));
    assert_eq!(args.flags, WdFlags::KNOWN_ONLY | WdFlags::SPARSE);
    assert!(!args.flags.contains(WdFlags::PRIMARY_ONLY));
    assert_eq!(args.limits.max_overlap, Some(12));
}

#[test]
fn wd_defaults_to_text() {
    let m = wd_command().try_get_matches_from(["wd", "z2.json"]).unwrap();

    let args: WdArgs = WdParams::from_matches(&m).into();

    assert_eq!(args.format, WdFormat::Text);
    assert_eq!(args.flags, WdFlags::NONE);
}

#[test]
fn wd_rejects_unknown_format() {
    let result = wd_command().try_get_matches_from(["wd", "z2.json", "--format", "dot"]);

    assert!(result.is_err());
}

#[test]
fn cli_lists_subcommands() {
    let cli = build_cli();
    let names: Vec<&str> = cli.get_subcommands().map(|c| c.get_name()).collect();

    insta::assert_snapshot!(names.join(" "), @"complete reduce dump wd");
}
