use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI for inspecting and editing DBF tables through the paged grid model.
#[derive(Parser, Debug)]
#[command(name = "dbfgrid", version, about = "DBF table grid CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Create an empty table from a field spec
    ///
    /// Spec format (comma separated): NAME:TYPE[:LENGTH[:DECIMALS]]
    /// e.g. "NAME:C:20,QTY:N:5,PRICE:N:8:2,BORN:D,ACTIVE:L"
    Create {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        fields: String,
    },
    /// Print header and schema of a table
    Info {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Fetch rows batch-by-batch and print them
    Dump {
        #[arg(long)]
        path: PathBuf,
        /// Stop after this many rows (default: drain the table)
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Edit one cell and persist it
    Set {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        row: usize,
        #[arg(long)]
        col: usize,
        /// New value, parsed per the column's declared type
        #[arg(long)]
        value: String,
    },
}
