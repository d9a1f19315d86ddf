mod cli;
mod commands;

use cli::{CompleteParams, DumpParams, ReduceParams, WdParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("complete", m)) => {
            let params = CompleteParams::from_matches(m);
            commands::complete::run(params.into());
        }
        Some(("reduce", m)) => {
            let params = ReduceParams::from_matches(m);
            commands::reduce::run(params.into());
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into());
        }
        Some(("wd", m)) => {
            let params = WdParams::from_matches(m);
            commands::wd::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
