use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use log::error;

mod cli;
mod util;
mod cmd_create;
mod cmd_info;
mod cmd_dump;
mod cmd_set;

fn init_logger() {
    // Level comes from RUST_LOG, default info.
    // Example: RUST_LOG=debug dbfgrid dump --path people.dbf
    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn main() {
    init_logger();

    if let Err(e) = run() {
        error!("{:?}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Create { path, fields } =>
            cmd_create::exec(path, fields),

        cli::Cmd::Info { path, json } =>
            cmd_info::exec(path, json),

        cli::Cmd::Dump { path, limit, json } =>
            cmd_dump::exec(path, limit, json),

        cli::Cmd::Set { path, row, col, value } =>
            cmd_set::exec(path, row, col, value),
    }
}
