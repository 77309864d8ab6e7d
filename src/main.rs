use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use pixkey::api;
use pixkey::cli::{self, KeySource, TextSource};
use pixkey::models::AppConfig;
use pixkey::server;

#[derive(Parser)]
#[command(name = "pixkey")]
#[command(about = "Hide text in PNG images behind a compact key")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Encode text into a PNG file
    Encode {
        /// Text to encode
        #[arg(short, long, conflicts_with = "input", required_unless_present = "input")]
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,

        /// Write the key to this file instead of stdout
        #[arg(short, long)]
        key_file: Option<PathBuf>,
    },
    /// Decode a PNG file back into text
    Decode {
        /// Encoded PNG file
        #[arg(long)]
        image: PathBuf,

        /// Key printed by `pixkey encode`
        #[arg(short, long, conflicts_with = "key_file", required_unless_present = "key_file")]
        key: Option<String>,

        /// Read the key from a file instead
        #[arg(long)]
        key_file: Option<PathBuf>,
    },
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pixkey API",
        description = "Hide text in PNG images behind a compact key",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_encode,
        api::handle_decode,
        api::handle_image,
        api::handle_image_download,
    ),
    components(schemas(
        api::EncodeRequest,
        api::UploadedFile,
        api::EncodeResponse,
        api::DecodeRequest,
        api::DecodeResponse,
    )),
    tags(
        (name = "Codec", description = "Text encoding and decoding"),
        (name = "Images", description = "Encoded image retrieval")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Encode {
            text,
            input,
            output,
            key_file,
        }) => run_encode_command(text, input, &output, key_file),
        Some(Commands::Decode {
            image,
            key,
            key_file,
        }) => run_decode_command(&image, key, key_file),
        Some(Commands::Serve) => run_server().await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for one-shot commands
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixkey=warn,pixel_codec=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

fn load_config() -> AppConfig {
    let config_file = std::env::var("CONFIG_FILE").ok().map(PathBuf::from);
    AppConfig::load(config_file.as_deref())
}

/// Encode text to a PNG file (no server needed)
fn run_encode_command(
    text: Option<String>,
    input: Option<PathBuf>,
    output: &PathBuf,
    key_file: Option<PathBuf>,
) -> anyhow::Result<()> {
    init_cli_tracing();
    let config = load_config();

    let source = match (&text, &input) {
        (Some(text), _) => TextSource::Inline(text),
        (None, Some(path)) => TextSource::File(path),
        (None, None) => anyhow::bail!("Either --text or --input is required"),
    };

    let outcome = cli::encode_to_file(&config, source, output, key_file.as_deref())?;

    if outcome.dropped_chars > 0 {
        eprintln!(
            "Warning: {} unsupported characters will not survive decoding",
            outcome.dropped_chars
        );
    }
    eprintln!(
        "Encoded {} ({}x{}, {} bytes)",
        output.display(),
        outcome.width,
        outcome.height,
        outcome.png_bytes.len()
    );
    match key_file {
        Some(path) => eprintln!("Key written to {}", path.display()),
        None => println!("{}", outcome.key),
    }

    Ok(())
}

/// Decode a PNG file and print the text
fn run_decode_command(
    image: &PathBuf,
    key: Option<String>,
    key_file: Option<PathBuf>,
) -> anyhow::Result<()> {
    init_cli_tracing();
    let config = load_config();

    let key = match (&key, &key_file) {
        (Some(key), _) => KeySource::Inline(key),
        (None, Some(path)) => KeySource::File(path),
        (None, None) => anyhow::bail!("Either --key or --key-file is required"),
    };

    let text = cli::decode_from_file(&config, image, key)?;
    println!("{text}");

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Read environment variables
    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let public_url = std::env::var("PUBLIC_URL").ok();

    // Header
    println!("Pixkey v{VERSION}");
    println!("Hide text in PNG images behind a compact key\n");

    // Environment variables section
    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  PUBLIC_URL  = {}",
        public_url.as_deref().unwrap_or("(not set, relative image links)")
    );

    // Config source
    let config_source = match config_file {
        Some(ref path) if PathBuf::from(path).exists() => path.to_string(),
        Some(_) => "defaults (file not found)".to_string(),
        None => "defaults".to_string(),
    };
    println!("\nConfig:  {config_source}");

    // Commands section
    println!("\nCommands:");
    println!("  pixkey serve    Start the HTTP server");
    println!("  pixkey encode   Encode text into a PNG file");
    println!("  pixkey decode   Decode a PNG file with its key");
    println!("\nRun 'pixkey --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixkey=debug,pixel_codec=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let public_url = std::env::var("PUBLIC_URL").ok().filter(|u| !u.is_empty());

    let config = load_config();
    tracing::info!(
        max_text_chars = config.limits.max_text_chars,
        max_image_pixels = config.limits.max_image_pixels,
        max_images = config.store.max_images,
        public_url = ?public_url,
        "Configuration loaded"
    );

    // Create application state using shared server module
    let state = server::create_app_state(config, public_url)?;

    // Build router: start with shared API routes, add production-only routes
    let app = server::build_router(state)
        // OpenAPI documentation (production only)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Pixkey server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
