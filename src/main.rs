//! order-export - stream filtered order summaries to CSV
//!
//! # Usage
//!
//! ```bash
//! # January orders from California that used the SPRING coupon
//! order-export --start-date 2024-01-01 --end-date 2024-01-31 \
//!     --country US --region CA --coupon spring -o january.csv
//!
//! # Everything exportable, to stdout
//! order-export -o -
//! ```

use std::path::Path;

use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use order_export::cli::{CliInterface, OutputTarget};
use order_export::error::Result;
use order_export::export::{CsvSink, ExportPipeline, ExportResult, ProgressTracker};
use order_export::filter::FilterSpec;
use order_export::source::MongoOrderSource;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or run one export
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    cli.config().validate()?;

    // Reject bad filters before any output exists
    let spec = FilterSpec::parse(&cli.raw_filter())?;
    let source = MongoOrderSource::connect(&cli.config().source).await?;

    let cancel_token = CancellationToken::new();
    let ctrl_c_handle = spawn_ctrl_c_listener(cancel_token.clone());

    let pipeline = ExportPipeline::from_config(&cli.config().export)
        .with_cancellation(cancel_token)
        .with_progress(ProgressTracker::new(cli.show_progress()));

    let outcome = match cli.output_target() {
        OutputTarget::Stdout => {
            run_export(&pipeline, &spec, &source, tokio::io::stdout()).await
        }
        OutputTarget::File(path) => export_to_file(&pipeline, &spec, &source, &path).await,
    };

    ctrl_c_handle.abort();
    let result = outcome?;

    if result.cancelled {
        eprintln!(
            "Export cancelled: {} orders written before interruption",
            result.rows_written
        );
    } else if !result.any_match {
        eprintln!("No orders matched the filter; report contains the header only");
    }
    Ok(())
}

/// Export into a new file, removing it again if the export fails
async fn export_to_file(
    pipeline: &ExportPipeline,
    spec: &FilterSpec,
    source: &MongoOrderSource,
    path: &Path,
) -> Result<ExportResult> {
    let file = tokio::fs::File::create(path).await?;

    match run_export(pipeline, spec, source, file).await {
        Ok(result) => {
            eprintln!("Exported {} orders to {}", result.rows_written, path.display());
            Ok(result)
        }
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(path).await {
                warn!("Could not remove partial report {}: {}", path.display(), remove_err);
            } else {
                info!("Removed partial report {}", path.display());
            }
            Err(e)
        }
    }
}

/// Run the pipeline against one destination and flush it afterwards
async fn run_export<W>(
    pipeline: &ExportPipeline,
    spec: &FilterSpec,
    source: &MongoOrderSource,
    destination: W,
) -> Result<ExportResult>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut sink = CsvSink::new(destination);
    let result = pipeline.export(spec, source, &mut sink).await?;
    sink.finish().await?;
    Ok(result)
}

/// Cancel the export on Ctrl+C
fn spawn_ctrl_c_listener(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => token.cancel(),
            Err(err) => eprintln!("Failed to listen for Ctrl+C: {}", err),
        }
    })
}

/// Initialize logging on stderr so stdout can carry the report
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
