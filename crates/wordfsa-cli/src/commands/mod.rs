pub mod complete;
pub mod dump;
pub mod loader;
pub mod reduce;
pub mod run_common;
pub mod wd;

#[cfg(test)]
mod loader_tests;
