//! Turn a CSV transaction export into a `POST /transaction_list` body.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;

use spend_categorizer::domain::MAX_BATCH_SIZE;
use spend_categorizer::io::csv_batch::read_transaction_batch;

#[derive(Parser, Debug)]
#[command(name = "txns-to-json", about = "Convert a CSV transaction export to a JSON batch")]
struct Args {
    /// CSV export with transactionId, transactionTimeUtc, transactionType,
    /// counterpartName and amount columns
    csv: PathBuf,

    /// First data row to include (0-based, header excluded)
    #[arg(long, default_value_t = 0)]
    start_row: usize,

    /// Number of rows to include; capped at the batch bound
    #[arg(long, default_value_t = MAX_BATCH_SIZE)]
    count: usize,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file = File::open(&args.csv).with_context(|| format!("open {}", args.csv.display()))?;
    let list = read_transaction_batch(file, args.start_row, args.count)
        .with_context(|| format!("parse {}", args.csv.display()))?;

    let out = if args.pretty {
        serde_json::to_string_pretty(&list)?
    } else {
        serde_json::to_string(&list)?
    };
    println!("{out}");

    Ok(())
}
