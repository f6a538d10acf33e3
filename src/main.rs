use std::{io, path::PathBuf, process::ExitCode};

use book_catalog::{Catalog, Console};
use clap::Parser;
use colored::Colorize;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the book catalog
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Catalog file to load at startup and save on exit
    #[arg(short, long, env = "BOOK_CATALOG_FILE", default_value = "books.json")]
    file: PathBuf,

    /// Log catalog operations to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Install the stderr log subscriber; `RUST_LOG` wins over `--verbose`
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "book_catalog=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    println!("{}", "Library catalog".green().bold());
    println!("===============");

    let loaded = Catalog::load(&args.file);
    let mut catalog = loaded.catalog;

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());

    let session = console
        .report_load_issues(&loaded.issues)
        .and_then(|()| console.run(&mut catalog, &args.file));

    match session {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("console session failed: {e}");
            // The catalog is still in memory; try to keep the user's changes
            if let Err(e) = catalog.save(&args.file) {
                error!("{e}");
            }
            ExitCode::FAILURE
        }
    }
}
