//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! This module contains:
//! - `*Params` structs that mirror command `*Args` but are populated from clap
//! - `from_matches()` extractors
//! - `Into<*Args>` impls to bridge dispatch → command handlers

use std::path::PathBuf;

use clap::ArgMatches;
use wordfsa_engine::{Verbosity, WdFlags};

use super::ColorChoice;
use crate::commands::complete::CompleteArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::reduce::ReduceArgs;
use crate::commands::run_common::LimitArgs;
use crate::commands::wd::{WdArgs, WdFormat};

pub struct CompleteParams {
    pub presentation: PathBuf,
    pub output: Option<PathBuf>,
    pub binary: Option<PathBuf>,
    pub limits: LimitArgs,
    pub no_differences: bool,
    pub keep_secondary: bool,
    pub verbose: u8,
    pub color: ColorChoice,
}

impl CompleteParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            presentation: required_path(m, "presentation"),
            output: m.get_one::<PathBuf>("output").cloned(),
            binary: m.get_one::<PathBuf>("binary").cloned(),
            limits: parse_limits(m),
            no_differences: m.get_flag("no_differences"),
            keep_secondary: m.get_flag("keep_secondary"),
            verbose: m.get_count("verbose"),
            color: parse_color(m),
        }
    }
}

impl From<CompleteParams> for CompleteArgs {
    fn from(p: CompleteParams) -> Self {
        Self {
            presentation: p.presentation,
            output: p.output,
            binary: p.binary,
            limits: p.limits,
            track_differences: !p.no_differences,
            keep_secondary: p.keep_secondary,
            verbosity: verbosity_from_count(p.verbose),
            color: p.color.should_colorize(),
        }
    }
}

pub struct ReduceParams {
    pub system: PathBuf,
    pub words: Vec<String>,
}

impl ReduceParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            system: required_path(m, "system"),
            words: m
                .get_many::<String>("words")
                .map(|w| w.cloned().collect())
                .unwrap_or_default(),
        }
    }
}

impl From<ReduceParams> for ReduceArgs {
    fn from(p: ReduceParams) -> Self {
        Self {
            system: p.system,
            words: p.words,
        }
    }
}

pub struct DumpParams {
    pub system: PathBuf,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            system: required_path(m, "system"),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            system: p.system,
            color: p.color.should_colorize(),
        }
    }
}

pub struct WdParams {
    pub presentation: PathBuf,
    pub output: Option<PathBuf>,
    pub format: WdFormat,
    pub primary_only: bool,
    pub known_only: bool,
    pub sparse: bool,
    pub limits: LimitArgs,
    pub verbose: u8,
    pub color: ColorChoice,
}

impl WdParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        let format = match m.get_one::<String>("format").map(|s| s.as_str()) {
            Some("json") => WdFormat::Json,
            Some("binary") => WdFormat::Binary,
            _ => WdFormat::Text,
        };
        Self {
            presentation: required_path(m, "presentation"),
            output: m.get_one::<PathBuf>("output").cloned(),
            format,
            primary_only: m.get_flag("primary_only"),
            known_only: m.get_flag("known_only"),
            sparse: m.get_flag("sparse"),
            limits: parse_limits(m),
            verbose: m.get_count("verbose"),
            color: parse_color(m),
        }
    }
}

impl From<WdParams> for WdArgs {
    fn from(p: WdParams) -> Self {
        let mut flags = WdFlags::NONE;
        if p.primary_only {
            flags |= WdFlags::PRIMARY_ONLY;
        }
        if p.known_only {
            flags |= WdFlags::KNOWN_ONLY;
        }
        if p.sparse {
            flags |= WdFlags::SPARSE;
        }
        Self {
            presentation: p.presentation,
            output: p.output,
            format: p.format,
            flags,
            limits: p.limits,
            verbosity: verbosity_from_count(p.verbose),
            color: p.color.should_colorize(),
        }
    }
}

// Positionals marked `required` are always present once clap accepted the input.
fn required_path(m: &ArgMatches, id: &str) -> PathBuf {
    m.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}

fn parse_limits(m: &ArgMatches) -> LimitArgs {
    LimitArgs {
        max_length: m.get_one::<usize>("max_length").copied(),
        max_equations: m.get_one::<usize>("max_equations").copied(),
        max_overlap: m.get_one::<usize>("max_overlap").copied(),
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// No trace without `-v`; each further `-v` raises the level.
fn verbosity_from_count(count: u8) -> Option<Verbosity> {
    match count {
        0 => None,
        1 => Some(Verbosity::Default),
        2 => Some(Verbosity::Verbose),
        _ => Some(Verbosity::VeryVerbose),
    }
}
