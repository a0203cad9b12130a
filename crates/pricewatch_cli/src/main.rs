use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use pricewatch_cli::{load_apps, render_summary, Args, ConsoleProgress};
use pricewatch_engine::ScrapeOrchestrator;
use pricewatch_logging::{scrape_error, scrape_info};

fn main() -> ExitCode {
    let args = Args::parse();
    pricewatch_logging::initialize(args.log_destination(), LevelFilter::Info);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            scrape_error!("{:#}", err);
            eprintln!("\n[ERROR] - {err:#}\n");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    println!("\nStarting app price check...\n");

    let apps = load_apps(&args.config)?;
    println!("[OK] - Configuration valid: {} apps loaded", apps.len());
    if apps.is_empty() {
        println!("[WARNING] - No apps to check");
        return Ok(());
    }

    let orchestrator = ScrapeOrchestrator::from_config(args.engine_config())
        .context("could not set up the HTTP client")?;
    scrape_info!(
        "Checking {} apps with a {:?} pause between requests",
        apps.len(),
        orchestrator.delay()
    );

    let progress = ConsoleProgress::stdout();
    let report = orchestrator.run_blocking(&apps, &progress)?;
    print!("{}", render_summary(&report));
    Ok(())
}
