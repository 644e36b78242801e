use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser};
use melt_core::{CoreError, Database, DateVal};
use tracing_subscriber::EnvFilter;

mod rules;
mod transform;

/// Split, merge, & melt cultures in a CKII character history database.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// CSV file of dynasty and early -> later culture melt rules
    #[arg(value_name = "RULES.CSV")]
    rule_file: PathBuf,

    /// Birth date at which the early -> later cultural transition occurs
    /// (e.g. 1120.1.1)
    #[arg(long, value_name = "Y.M.D")]
    date: DateVal,

    /// Directory from which to load the preexisting character history
    #[arg(long = "history-dir", value_name = "DIR")]
    history_dir: PathBuf,

    /// Path at which the new character history directory is created
    #[arg(
        long = "output-history-dir",
        value_name = "DIR",
        default_value = "./characters"
    )]
    output_history_dir: PathBuf,

    /// If the output directory already exists, delete and recreate it
    #[arg(long, short = 'f')]
    force: bool,

    /// Show more about what the program is doing; repeat for more detail
    #[arg(long, short = 'v', action = ArgAction::Count)]
    verbose: u8,

    /// Print the melt summary as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    process::exit(run(cli));
}

fn run(cli: Cli) -> i32 {
    let melt_rules = match rules::load(&cli.rule_file) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("Fatal melt rule error:\n{e}");
            return 3;
        }
    };

    if let Err(message) = stage_output_dir(&cli.output_history_dir, cli.force) {
        eprintln!("{message}");
        return 1;
    }

    let mut db = Database::new();
    if let Err(e) = db.parse_dir(&cli.history_dir) {
        return report_core_error(&e);
    }

    let stats = transform::apply(&mut db, &melt_rules, &cli.date);

    if let Err(e) = db.rewrite(&cli.output_history_dir) {
        return report_core_error(&e);
    }

    if cli.json {
        let rendered = serde_json::to_string_pretty(&stats.to_json()).unwrap_or_else(|e| {
            eprintln!("Error rendering JSON summary: {e}");
            process::exit(1);
        });
        println!("{rendered}");
    } else {
        print!("{}", stats.to_text());
    }
    0
}

fn report_core_error(e: &CoreError) -> i32 {
    if e.is_parse() {
        eprintln!("Fatal character history parse error:\n{e}");
        2
    } else {
        eprintln!("Fatal error:\n{e}");
        1
    }
}

/// Pre-flight for the output directory: refuse to clobber an existing path
/// unless `--force` was given, then create it fresh.
fn stage_output_dir(path: &Path, force: bool) -> Result<(), String> {
    if path.exists() {
        if !force {
            return Err(format!(
                "The output directory already exists (use -f / --force to replace it): {}",
                path.display()
            ));
        }
        let removed = if path.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        if let Err(e) = removed {
            return Err(format!(
                "Failed to remove existing output path {}: {e}",
                path.display()
            ));
        }
    }
    fs::create_dir_all(path).map_err(|e| {
        format!(
            "Failed to create output directory {}: {e}",
            path.display()
        )
    })
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
