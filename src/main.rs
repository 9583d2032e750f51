use clap::Parser;
use supersearch::cli::{Cli, Commands};
use supersearch::commands;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "SUPERSEARCH_LOG";

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Index {
            source,
            output,
            types,
        }) => {
            let report = commands::index(source.as_deref(), output.as_deref(), types)?;
            println!(
                "Indexed {} document(s) into {}",
                report.documents, report.location
            );
            if report.skipped > 0 {
                println!("Skipped {} item(s) without title or link", report.skipped);
            }
            Ok(())
        }
        Some(Commands::Search {
            query,
            limit,
            snapshot,
        }) => {
            let results = commands::search(&query, limit, snapshot.as_deref())?;
            if results.is_empty() {
                println!("No matches found for '{query}'");
                return Ok(());
            }
            for result in &results {
                println!("{}  {}", result.title, result.link);
            }
            println!("\n{} result(s) found", results.len());
            Ok(())
        }
        Some(Commands::List { snapshot }) => {
            let documents = commands::list(snapshot.as_deref())?;
            for doc in &documents {
                println!("{}  {}", doc.title, doc.link);
            }
            println!("\n{} document(s)", documents.len());
            Ok(())
        }
        Some(Commands::Shell { limit, snapshot }) => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            commands::shell(stdin.lock(), stdout.lock(), limit, snapshot.as_deref())
        }
        None => {
            Cli::parse_from(["supersearch", "--help"]);
            Ok(())
        }
    }
}
