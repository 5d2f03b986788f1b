// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Three subcommands:
// - scrape:  fetch live pages and print the links the crawler would queue
// - extract: same, but for an HTML file on disk served "as if" from a URL
// - check:   run the admission rules on URLs given directly
//
// All of them accept --policy to swap in a JSON admission policy.
// =============================================================================

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "link-sieve",
    version,
    about = "Extract and filter crawlable links from web pages",
    long_about = "link-sieve pulls the outbound links out of a page and keeps only the ones a \
                  domain-restricted crawler should queue: in-scope hosts, no crawler traps, \
                  no non-HTML resources."
)]
pub struct Cli {
    /// Log every rejected link and extraction fallback to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

// Flags shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// JSON admission policy (fields left out keep their defaults)
    #[arg(long, value_name = "FILE")]
    pub policy: Option<PathBuf>,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch pages and list the links that pass the admission rules
    ///
    /// Example: link-sieve scrape https://www.ics.uci.edu/
    Scrape {
        /// Page URLs to fetch
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,

        /// Also list rejected links with the reason
        #[arg(long)]
        show_rejected: bool,

        /// How many pages to fetch at the same time
        #[arg(long, default_value_t = 8)]
        concurrency: usize,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },

    /// Extract links from a local HTML file
    ///
    /// Example: link-sieve extract page.html --base-url https://www.ics.uci.edu/dir/
    Extract {
        /// HTML file to read
        file: PathBuf,

        /// URL the file is treated as having been served from
        #[arg(long)]
        base_url: String,

        /// HTTP status to pretend the page came back with
        #[arg(long, default_value_t = 200)]
        status: u16,

        #[command(flatten)]
        output: OutputArgs,

        /// Also list rejected links with the reason
        #[arg(long)]
        show_rejected: bool,
    },

    /// Show the admission decision for each URL
    ///
    /// Example: link-sieve check https://www.ics.uci.edu/paper.pdf
    Check {
        /// URLs to evaluate
        #[arg(required = true)]
        urls: Vec<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It pulls the fields of another Args struct into this subcommand
//    - OutputArgs is written once and every subcommand gets --policy and --json
//
// 2. Why Vec<String> with required = true?
//    - A Vec positional argument takes any number of values
//    - required = true makes clap complain when none are given
//
// 3. Why PathBuf for files?
//    - PathBuf is the owned path type, like String is for text
//    - Paths are not always valid UTF-8, so they get their own type
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scrape_defaults() {
        let cli = Cli::try_parse_from(["link-sieve", "scrape", "https://www.ics.uci.edu/"]).unwrap();
        match cli.command {
            Commands::Scrape {
                urls,
                output,
                show_rejected,
                concurrency,
                timeout,
            } => {
                assert_eq!(urls, vec!["https://www.ics.uci.edu/"]);
                assert!(output.policy.is_none());
                assert!(!output.json);
                assert!(!show_rejected);
                assert_eq!(concurrency, 8);
                assert_eq!(timeout, 10);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "link-sieve",
            "extract",
            "page.html",
            "--base-url",
            "https://www.ics.uci.edu/",
            "--policy",
            "policy.json",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Extract {
                file,
                base_url,
                status,
                output,
                ..
            } => {
                assert_eq!(file, PathBuf::from("page.html"));
                assert_eq!(base_url, "https://www.ics.uci.edu/");
                assert_eq!(status, 200);
                assert_eq!(output.policy, Some(PathBuf::from("policy.json")));
                assert!(output.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_check_requires_urls() {
        assert!(Cli::try_parse_from(["link-sieve", "check"]).is_err());
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["link-sieve", "check", "https://x.ics.uci.edu/", "-v"]).unwrap();
        assert!(cli.verbose);
    }
}
