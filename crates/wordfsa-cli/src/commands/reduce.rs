//! Reduce words with a compiled system.

use std::path::PathBuf;

use super::loader;
use super::run_common::fail;

pub struct ReduceArgs {
    pub system: PathBuf,
    pub words: Vec<String>,
}

pub fn run(args: ReduceArgs) {
    let system = loader::load_system(&args.system).unwrap_or_else(|e| fail(e));
    let alphabet = system.alphabet();

    for text in &args.words {
        let word = alphabet
            .parse_word(text)
            .unwrap_or_else(|e| fail(format!("'{}': {}", text, e)));
        let reduced = system
            .reduced(&word)
            .unwrap_or_else(|e| fail(format!("'{}': {}", text, e)));
        println!("{}", alphabet.display_word(&reduced));
    }
}
