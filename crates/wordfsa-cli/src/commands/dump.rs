//! Show the rules and transition table of a compiled system.

use std::path::PathBuf;

use wordfsa_core::Colors;

use super::loader;
use super::run_common::fail;

pub struct DumpArgs {
    pub system: PathBuf,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    let system = loader::load_system(&args.system).unwrap_or_else(|e| fail(e));
    print!("{}", system.dump(Colors::new(args.color)));
}
