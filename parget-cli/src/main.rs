//! parget CLI - download large files over parallel HTTP range requests.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use parget::{
    DownloadOptions, Downloader, RequestProfile, ReqwestClient, DEFAULT_CONNECTIONS,
    DEFAULT_PROBE_TIMEOUT,
};
use tracing_subscriber::EnvFilter;

/// Download a file over parallel HTTP range requests.
#[derive(Debug, Parser)]
#[command(name = "parget", version, about)]
struct Cli {
    /// URL of the resource to download
    url: String,

    /// Destination file path
    output: PathBuf,

    /// Number of parallel connections (used when the server supports
    /// range requests)
    #[arg(short = 'n', long, default_value_t = DEFAULT_CONNECTIONS)]
    connections: usize,

    /// Per-connection transfer timeout in seconds
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,

    /// Expected size in bytes, used when the server reports no
    /// Content-Length
    #[arg(long)]
    expected_size: Option<u64>,

    /// Referer header to send with every request
    #[arg(long)]
    referer: Option<String>,

    /// User-Agent header to send with every request
    #[arg(long)]
    user_agent: Option<String>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), parget::DownloadError> {
    let mut profile = RequestProfile::default();
    if let Some(ref referer) = cli.referer {
        profile.referer = Some(referer.clone());
    }
    if let Some(ref user_agent) = cli.user_agent {
        profile.user_agent = user_agent.clone();
    }

    let client = ReqwestClient::with_config(
        DEFAULT_PROBE_TIMEOUT,
        Duration::from_secs(cli.timeout_secs),
        profile,
    )?;
    let options = DownloadOptions {
        connections: cli.connections,
        expected_size: cli.expected_size,
    };
    let downloader = Downloader::with_client(client, options);

    println!("Downloading {} -> {}", cli.url, cli.output.display());
    let report = downloader.download(&cli.url, &cli.output)?;

    println!("Done: {report}");
    if !report.size_matches() {
        println!(
            "Warning: downloaded size ({}) differs from expected size ({})",
            report.final_size, report.expected_size
        );
    }

    Ok(())
}
