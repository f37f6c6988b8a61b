use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use mopedphys_core::hex32;
use mopedphys_io::{load_tuning, tuning_hash, write_tuning_json, TuningData};

#[derive(Parser, Debug)]
#[command(name = "tune_hash", version, about = "Hash a vehicle tuning JSON (or emit the reference bike)")]
struct Opts {
    /// Path to a tuning .json. Omit with --emit to write the reference bike.
    input: Option<PathBuf>,

    /// Write the built-in reference tuning to the given path instead of reading.
    #[arg(long)]
    emit: Option<PathBuf>,

    /// Pretty-print JSON when emitting or rewriting.
    #[arg(long, action = ArgAction::SetTrue)]
    pretty: bool,

    /// Rewrite the input file (normalized field order) after hashing.
    #[arg(long, action = ArgAction::SetTrue)]
    rewrite: bool,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    if let Some(out) = opts.emit {
        let t = TuningData::reference_bike();
        write_tuning_json(&t, &out, opts.pretty)?;
        println!("{}  {}", hex32(tuning_hash(&t)), out.display());
        return Ok(());
    }

    let Some(input) = opts.input else {
        anyhow::bail!("either an input path or --emit <path> is required");
    };

    let t = load_tuning(&input)?;
    println!("{}  {} ({})", hex32(tuning_hash(&t)), input.display(), t.name);

    if opts.rewrite {
        write_tuning_json(&t, &input, opts.pretty)?;
    }
    Ok(())
}
