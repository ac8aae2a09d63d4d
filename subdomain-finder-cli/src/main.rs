//! `subdomain-finder` command-line entry point.
//!
//! Parses arguments, installs logging, runs the scan pipeline and writes the results.
//! Logs go to stderr; the final subdomain list goes to stdout and the output file.

mod args;
mod input;
mod output;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use subdomain_finder_core::{
    CoreError, DiscoveryReport, ScanService, ScanState, SourceStatus, SystemResolver, VerificationRecord,
    load_wordlist,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use args::Args;
use output::{
    render_subdomains, render_verification, resolve_output_path, verification_path, write_file,
};

const PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

/// Exit status for bad arguments, an unusable domain or wordlist.
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn exit_status(err: &anyhow::Error) -> u8 {
    let configuration = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<CoreError>())
        .any(CoreError::is_configuration);
    if configuration { EXIT_CONFIG } else { 1 }
}

/// Logs to stderr; `RUST_LOG` overrides the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose),
        )
        .with(filter)
        .init();
}

async fn run(args: Args) -> Result<()> {
    let wordlist = if args.bruteforce_enabled() {
        load_wordlist(&args.wordlist)
            .await
            .context("Cannot start brute force")?
    } else {
        Vec::new()
    };
    let external = match &args.input {
        Some(path) => input::read_candidates(path).await?,
        None => Vec::new(),
    };

    let config = args.to_config(wordlist);
    let service = if args.system_resolver {
        ScanService::with_resolver(config, Arc::new(SystemResolver))
    } else {
        ScanService::new(config)
    };
    let service = service.context("Invalid scan configuration")?;
    let domain = service.config().domain.clone();
    tracing::info!("Scanning {domain}");
    tracing::debug!("{:?}", service.config());

    let ticker = spawn_progress_ticker(&service);
    let discovery = service.discover(&external).await;
    ticker.abort();
    let discovery = discovery?;

    print_summary(&discovery);

    let now = chrono::Local::now();
    let results_path = resolve_output_path(args.output.as_deref(), &domain, args.format, now);
    if discovery.subdomains.is_empty() {
        println!("No valid subdomains found.");
    } else {
        let rendered = render_subdomains(&domain, &discovery.subdomains, args.format)?;
        write_file(&results_path, &rendered).await?;
        println!("Results saved to {}", results_path.display());
    }

    if args.verify && !discovery.subdomains.is_empty() {
        let records = service.verify(&discovery.subdomains).await?;
        print_verification(&records);
        let path = verification_path(&results_path);
        write_file(&path, &render_verification(&records)?).await?;
        println!("Verification saved to {}", path.display());
    }

    Ok(())
}

/// Periodic brute-force progress lines while discovery runs.
fn spawn_progress_ticker(service: &ScanService) -> tokio::task::JoinHandle<()> {
    let progress = service.progress();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PROGRESS_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let snapshot = progress.snapshot();
            if snapshot.state == ScanState::Resolving {
                tracing::info!(
                    "[bruteforce] {}/{} resolved, {} found",
                    snapshot.resolved,
                    snapshot.total,
                    snapshot.hits
                );
            }
        }
    })
}

fn print_summary(report: &DiscoveryReport) {
    if !report.sources.is_empty() {
        println!("\nPassive sources:");
        for source in &report.sources {
            let detail = match source.status {
                SourceStatus::Success => format!("{} hostnames", source.count),
                _ => source.error.clone().unwrap_or_default(),
            };
            println!(
                "  {:<14} {:<8} {:>6}ms  {detail}",
                source.source,
                format!("{:?}", source.status).to_lowercase(),
                source.elapsed_ms
            );
        }
    }

    for (label, hosts) in [
        ("Brute force", &report.bruteforce),
        ("Passive sources", &report.passive),
    ] {
        if !hosts.is_empty() {
            println!("\n{label} ({}):", hosts.len());
            for host in hosts {
                println!("  {host}");
            }
        }
    }

    println!(
        "\nTotal unique subdomains: {} ({}ms)",
        report.subdomains.len(),
        report.elapsed_ms
    );
}

fn print_verification(records: &[VerificationRecord]) {
    let mut records: Vec<&VerificationRecord> = records.iter().collect();
    records.sort_by(|a, b| a.host.cmp(&b.host));

    println!("\nVerification:");
    for record in records {
        let ips = record
            .ips
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let status = record
            .http_status
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        println!(
            "  {:<40} {:<32} {:>4}  {}",
            record.host,
            if ips.is_empty() { "-" } else { ips.as_str() },
            status,
            record.final_url.as_deref().unwrap_or("")
        );
    }
}
