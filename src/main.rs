// src/main.rs
// =============================================================================
// Entry point of the link-sieve CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, filter from RUST_LOG)
// 3. Build a Validator from the default or a --policy file
// 4. Dispatch to the subcommand handler and print results
// 5. Exit with a code: 0 = success, 1 = `check` rejected something, 2 = error
// =============================================================================

mod cli;

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use cli::{Cli, Commands, OutputArgs};
use link_sieve::fetch;
use link_sieve::{scrape_with_report, FetchedPage, Policy, Rejection, ScrapeReport, Validator};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    link_sieve::logging::init_logging(cli.verbose)?;

    match cli.command {
        Commands::Scrape {
            urls,
            output,
            show_rejected,
            concurrency,
            timeout,
        } => handle_scrape(urls, &output, show_rejected, concurrency, timeout).await,
        Commands::Extract {
            file,
            base_url,
            status,
            output,
            show_rejected,
        } => handle_extract(&file, base_url, status, &output, show_rejected),
        Commands::Check { urls, output } => handle_check(&urls, &output),
    }
}

// Builds the validator from --policy, or the built-in policy without it
fn load_validator(policy_path: Option<&Path>) -> Result<Validator> {
    match policy_path {
        Some(path) => {
            let policy = Policy::from_json_file(path)?;
            info!(path = %path.display(), "loaded admission policy");
            Ok(Validator::new(policy)?)
        }
        None => Ok(Validator::default()),
    }
}

// Handles the 'scrape' subcommand
//
// Pages that fail to download are reported and skipped. The run only fails
// when not a single page could be fetched.
async fn handle_scrape(
    urls: Vec<String>,
    output: &OutputArgs,
    show_rejected: bool,
    concurrency: usize,
    timeout: u64,
) -> Result<i32> {
    let validator = load_validator(output.policy.as_deref())?;
    let client = fetch::build_client(Duration::from_secs(timeout))?;

    let requested = urls.len();
    let results = fetch::fetch_pages(&client, urls, concurrency).await;

    let mut reports = Vec::new();
    let mut failures = Vec::new();
    for (url, result) in results {
        match result {
            Ok(page) => reports.push(scrape_with_report(&page, &validator)),
            Err(e) => failures.push((url, format!("{:#}", e))),
        }
    }

    info!(
        fetched = reports.len(),
        failed = failures.len(),
        "scrape finished"
    );

    print_reports(&reports, output.json, show_rejected)?;

    for (url, error) in &failures {
        eprintln!("⚠️  Could not fetch {}: {}", url, error);
    }

    if failures.len() == requested {
        bail!("none of the {} page(s) could be fetched", requested);
    }
    Ok(0)
}

// Handles the 'extract' subcommand
fn handle_extract(
    file: &Path,
    base_url: String,
    status: u16,
    output: &OutputArgs,
    show_rejected: bool,
) -> Result<i32> {
    let validator = load_validator(output.policy.as_deref())?;
    let body = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;

    let page = FetchedPage::new(base_url, status, Some(body));
    let report = scrape_with_report(&page, &validator);

    print_reports(std::slice::from_ref(&report), output.json, show_rejected)?;
    Ok(0)
}

// One row of `check` output
#[derive(Debug, Serialize)]
struct CheckResult {
    url: String,
    admitted: bool,
    #[serde(flatten)]
    rejection: Option<Rejection>,
}

// Handles the 'check' subcommand
fn handle_check(urls: &[String], output: &OutputArgs) -> Result<i32> {
    let validator = load_validator(output.policy.as_deref())?;

    let results: Vec<CheckResult> = urls
        .iter()
        .map(|url| {
            let rejection = validator.evaluate(url).err();
            CheckResult {
                url: url.clone(),
                admitted: rejection.is_none(),
                rejection,
            }
        })
        .collect();

    if output.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("{:<70} {:<10} {}", "URL", "DECISION", "REASON");
        println!("{}", "=".repeat(110));
        for result in &results {
            let decision = if result.admitted { "✅ ADMIT" } else { "❌ REJECT" };
            let reason = result
                .rejection
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_default();
            println!("{:<70} {:<10} {}", truncate(&result.url, 67), decision, reason);
        }
    }

    let rejected = results.iter().filter(|r| !r.admitted).count();
    Ok(if rejected > 0 { 1 } else { 0 })
}

// Prints scrape reports either as JSON or as a per-page listing
fn print_reports(reports: &[ScrapeReport], json: bool, show_rejected: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(reports)?);
        return Ok(());
    }

    for report in reports {
        println!("📄 {} [HTTP {}]", report.url, report.status);
        if report.effective_url != report.url {
            println!("   served from {}", report.effective_url);
        }
        println!(
            "   {} link(s) found, {} admitted, {} rejected",
            report.total(),
            report.admitted.len(),
            report.rejected.len()
        );

        for link in &report.admitted {
            println!("   ✅ {}", link);
        }

        if show_rejected {
            for link in &report.rejected {
                println!("   ❌ {:<67} {}", truncate(&link.url, 64), link.rejection);
            }
        }
        println!();
    }

    let admitted: usize = reports.iter().map(|r| r.admitted.len()).sum();
    let rejected: usize = reports.iter().map(|r| r.rejected.len()).sum();

    println!("📊 Summary:");
    println!("   📄 Pages: {}", reports.len());
    println!("   ✅ Admitted: {}", admitted);
    println!("   ❌ Rejected: {}", rejected);
    Ok(())
}

// Shortens long URLs for table display
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
