//! Snapshot compare command

use clap::Args;
use ledgerutil_core::config::{CompareOptions, DEFAULT_SAMPLE_LIMIT};
use ledgerutil_core::diff::render_human_summary;
use ledgerutil_core::errors::ExError;
use ledgerutil_engine::{compare_snapshots, CompareOutcome};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// First snapshot directory
    pub snapshot_path1: PathBuf,

    /// Second snapshot directory
    pub snapshot_path2: PathBuf,

    /// Directory for the comparison report (defaults to the current directory)
    #[arg(short = 'o', long, alias = "outputDir", default_value = "")]
    pub output_dir: String,

    /// Number of differences to record in the report
    #[arg(short = 'f', long, alias = "firstDiffs", default_value_t = DEFAULT_SAMPLE_LIMIT as i64, allow_negative_numbers = true)]
    pub first_diffs: i64,

    /// Also print a human-readable summary of the differences
    #[arg(long)]
    pub summary: bool,
}

pub fn execute(args: CompareArgs) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = if args.output_dir.is_empty() {
        std::env::current_dir()?
    } else {
        PathBuf::from(args.output_dir)
    };
    let options =
        CompareOptions::from_first_diffs(output_dir, args.first_diffs).map_err(ExError::from)?;

    let outcome = compare_snapshots(&args.snapshot_path1, &args.snapshot_path2, &options)?;

    print!("\nSuccessfully compared snapshots. ");
    match &outcome {
        CompareOutcome::Identical => {
            println!("Both snapshot public state hashes were the same. No results were generated.");
        }
        CompareOutcome::Compared {
            report_path,
            result,
        } => {
            println!(
                "Results saved to {}. Total differences found: {}",
                report_path.display(),
                result.total_difference_count
            );
            if args.summary {
                println!();
                print!("{}", render_human_summary(result));
            }
        }
    }

    Ok(())
}
