//! CLI entry point for the CHB quay converter.
//!
//! Provides subcommands for converting a single export (file or URL) and for
//! periodically syncing the latest export from the NDOV index.

use anyhow::{Result, anyhow};
use chb_quays::archive::decode_payload;
use chb_quays::fetch::{
    BasicClient, DEFAULT_INDEX_URL, export_stem, export_timestamp, export_url, fetch_bytes,
    latest_export, list_exports,
};
use chb_quays::filter::DEFAULT_LOCALITY;
use chb_quays::output::{LATEST_STEM, print_stats, write_atomic, write_documents};
use chb_quays::pipeline::{self, PipelineConfig, PipelineOutput};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "chb_quays")]
#[command(about = "Convert CHB stop/quay exports into per-locality JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a CHB export (.xml or .xml.gz) from a file or URL
    Convert {
        /// Path to file or URL to fetch
        #[arg(value_name = "FILE_OR_URL")]
        source: String,

        /// Town to keep stops for (falls back to CHB_LOCALITY, then "Amsterdam")
        #[arg(short, long)]
        locality: Option<String>,

        /// Directory to write JSON documents to
        #[arg(short, long, default_value = "output")]
        output_dir: String,

        /// File stem for the documents (defaults to the source file name)
        #[arg(long)]
        stem: Option<String>,
    },
    /// Download the latest export from the NDOV index and convert it
    Sync {
        /// Directory listing that publishes ExportCHB archives
        #[arg(long, default_value = DEFAULT_INDEX_URL)]
        index_url: String,

        /// Directory to keep downloaded archives in
        #[arg(short, long, default_value = "scrapeNDOV")]
        download_dir: String,

        /// Directory to write JSON documents to
        #[arg(short, long, default_value = "output")]
        output_dir: String,

        /// Town to keep stops for (falls back to CHB_LOCALITY, then "Amsterdam")
        #[arg(short, long)]
        locality: Option<String>,

        /// Seconds to wait between sync rounds
        #[arg(short = 'i', long, default_value_t = 86_400)]
        interval: u64,

        /// Number of rounds to run (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 1)]
        runs: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/chb_quays.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("chb_quays.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            source,
            locality,
            output_dir,
            stem,
        } => {
            let locality = resolve_locality(locality);
            let bytes = fetcher(&source).await?;
            let xml = decode_payload(&bytes)?;

            let stem = stem.unwrap_or_else(|| {
                let file_name = source.rsplit('/').next().unwrap_or(&source);
                export_stem(file_name).to_string()
            });

            let output = run_pipeline(xml, PipelineConfig::new(&locality)).await?;
            write_documents(Path::new(&output_dir), &stem, &locality, &output)?;
            print_stats(&output.stats)?;
        }
        Commands::Sync {
            index_url,
            download_dir,
            output_dir,
            locality,
            interval,
            runs,
        } => {
            let locality = resolve_locality(locality);
            sync(
                &index_url,
                Path::new(&download_dir),
                Path::new(&output_dir),
                &locality,
                interval,
                runs,
            )
            .await?;
        }
    }

    Ok(())
}

/// Command-line value, then `CHB_LOCALITY`, then the default.
fn resolve_locality(arg: Option<String>) -> String {
    arg.or_else(|| std::env::var("CHB_LOCALITY").ok())
        .unwrap_or_else(|| DEFAULT_LOCALITY.to_string())
}

/// Loads export data from a local file path or fetches it over HTTP.
#[tracing::instrument(fields(source = %url))]
async fn fetcher(url: &String) -> Result<Vec<u8>> {
    let bytes = if url.starts_with("http") {
        let client = BasicClient::new()?;
        fetch_bytes(&client, url).await?
    } else {
        std::fs::read(url)?
    };
    Ok(bytes)
}

/// Runs the synchronous pipeline off the async runtime.
async fn run_pipeline(xml: String, config: PipelineConfig) -> Result<PipelineOutput> {
    let output = tokio::task::spawn_blocking(move || pipeline::run(&xml, &config)).await??;
    Ok(output)
}

/// Repeats [`sync_once`] every `interval` seconds. A failed round is logged
/// and the loop carries on.
#[tracing::instrument(skip(download_dir, output_dir))]
async fn sync(
    index_url: &str,
    download_dir: &Path,
    output_dir: &Path,
    locality: &str,
    interval: u64,
    runs: usize,
) -> Result<()> {
    let client = BasicClient::new()?;

    if runs == 0 {
        info!(interval, "Syncing indefinitely. Press Ctrl+C to stop.");
    }

    let mut round = 0;
    loop {
        if runs > 0 && round >= runs {
            break;
        }
        round += 1;

        info!(
            round,
            total = if runs == 0 { None } else { Some(runs) },
            "Starting sync round"
        );

        if let Err(e) = sync_once(&client, index_url, download_dir, output_dir, locality).await {
            error!(error = %e, "Sync round failed");
        }

        if runs == 0 || round < runs {
            info!(interval, "Waiting before next sync round");
            tokio::time::sleep(tokio::time::Duration::from_secs(interval)).await;
        }
    }

    info!(output_dir = %output_dir.display(), "Finished syncing");
    Ok(())
}

/// Downloads the newest export (reusing an earlier download of the same
/// archive), refreshes the `ExportCHBLatest` copies and writes both the
/// versioned and the latest documents.
async fn sync_once(
    client: &BasicClient,
    index_url: &str,
    download_dir: &Path,
    output_dir: &Path,
    locality: &str,
) -> Result<()> {
    let names = list_exports(client, index_url).await?;
    let latest = latest_export(&names)
        .ok_or_else(|| anyhow!("No ExportCHB archives listed at {index_url}"))?;

    match export_timestamp(latest) {
        Some(published) => info!(export = %latest, %published, "Latest export selected"),
        None => info!(export = %latest, "Latest export selected (no timestamp in name)"),
    }

    std::fs::create_dir_all(download_dir)?;
    let archive_path = download_dir.join(latest);
    let bytes = if archive_path.exists() {
        debug!(path = %archive_path.display(), "Archive already downloaded");
        std::fs::read(&archive_path)?
    } else {
        let url = export_url(index_url, latest)?;
        let bytes = fetch_bytes(client, &url).await?;
        write_atomic(&archive_path, &bytes)?;
        info!(bytes = bytes.len(), path = %archive_path.display(), "Archive downloaded");
        bytes
    };

    let xml = match decode_payload(&bytes) {
        Ok(xml) => xml,
        Err(e) => {
            // Drop the unreadable copy so the next round downloads it again.
            std::fs::remove_file(&archive_path)?;
            return Err(e.context(format!("Failed to decode {}", archive_path.display())));
        }
    };

    let latest_archive = download_dir.join(format!("{LATEST_STEM}.xml.gz"));
    write_atomic(&latest_archive, &bytes)?;
    let latest_xml = download_dir.join(format!("{LATEST_STEM}.xml"));
    std::fs::write(&latest_xml, &xml)?;
    info!(path = %latest_xml.display(), "Archive unzipped");

    let output = run_pipeline(xml, PipelineConfig::new(locality)).await?;
    write_documents(output_dir, export_stem(latest), locality, &output)?;
    write_documents(output_dir, LATEST_STEM, locality, &output)?;
    print_stats(&output.stats)?;

    Ok(())
}
