use clap::Command;
use tracing_subscriber::EnvFilter;

use drfp::command_line::encode;

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = Command::new("drfp")
        .about("Differential reaction fingerprints from reaction SMILES")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(encode::command())
        .get_matches();

    match matches.subcommand() {
        Some((name, submatches)) if name == encode::NAME => encode::action(submatches),
        Some((name, _)) => Err(eyre::eyre!("unknown subcommand: {name}")),
        None => unreachable!("subcommand required"),
    }
}
