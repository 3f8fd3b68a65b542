use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use imgfit::api;
use imgfit::models::AppConfig;
use imgfit::server;
use size_fit::{CancelFlag, SizeSearch};

#[derive(Parser)]
#[command(name = "imgfit")]
#[command(about = "Fit images to a target file size or convert between formats")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Re-encode an image file as a JPEG close to a target size
    Process {
        /// Source image
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the JPEG
        #[arg(short, long)]
        output: PathBuf,

        /// Target size in KB (defaults to the configured default)
        #[arg(short, long)]
        size: Option<u32>,
    },
    /// Convert an image file to another format
    Convert {
        /// Source image
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the converted image
        #[arg(short, long)]
        output: PathBuf,

        /// Target format: jpeg, png, gif, webp, bmp or tiff
        #[arg(short, long)]
        format: String,
    },
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "imgfit API",
        description = "Image size targeting and format conversion",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_process_image,
        api::handle_convert_image,
        api::handle_health,
    ),
    components(schemas(
        api::ProcessImageForm,
        api::ConvertImageForm,
        api::HealthResponse,
    )),
    tags(
        (name = "Images", description = "Size targeting and format conversion"),
        (name = "Health", description = "Liveness check")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Process {
            input,
            output,
            size,
        }) => run_process_command(&input, &output, size),
        Some(Commands::Convert {
            input,
            output,
            format,
        }) => run_convert_command(&input, &output, &format),
        Some(Commands::Serve) | None => run_server().await,
    }
}

/// Minimal logging for CLI commands
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgfit=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn config_file() -> Option<PathBuf> {
    std::env::var("CONFIG_FILE").ok().map(PathBuf::from)
}

/// Run the size search on a file (no server needed)
fn run_process_command(input: &Path, output: &Path, size: Option<u32>) -> anyhow::Result<()> {
    init_cli_tracing();

    let config = AppConfig::load(config_file().as_deref());
    let target_kb = size.unwrap_or(config.default_size_kb);
    let bytes = std::fs::read(input)?;

    let search = SizeSearch::new(config.search_options());
    let outcome = size_fit::process_image(
        &bytes,
        target_kb,
        &search,
        config.decode_limits(),
        &CancelFlag::new(),
    )?;

    std::fs::write(output, &outcome.bytes)?;

    let chosen = outcome.report.chosen;
    println!(
        "Wrote {} ({:.2} KB, quality {}, {}x{}, {} iterations)",
        output.display(),
        chosen.size_kb,
        chosen.quality,
        chosen.width,
        chosen.height,
        outcome.report.iterations()
    );
    if !outcome.report.status.is_converged() {
        eprintln!("Warning: could not get within tolerance of {target_kb} KB");
    }

    Ok(())
}

/// Convert a file to another format (no server needed)
fn run_convert_command(input: &Path, output: &Path, format: &str) -> anyhow::Result<()> {
    init_cli_tracing();

    let config = AppConfig::load(config_file().as_deref());
    let bytes = std::fs::read(input)?;
    let converted = size_fit::convert_bytes(&bytes, format, config.decode_limits())?;

    std::fs::write(output, &converted.bytes)?;
    println!(
        "Wrote {} ({}, {} bytes)",
        output.display(),
        converted.media_type(),
        converted.bytes.len()
    );

    Ok(())
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgfit=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:10000".to_string());
    let config = AppConfig::load(config_file().as_deref());

    let state = server::create_app_state(config);

    let app = server::build_router(state)
        // OpenAPI documentation (binary only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "imgfit server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(%e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
