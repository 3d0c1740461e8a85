use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use certforge::api;
use certforge::assets::{AssetCategory, AssetLoader};
use certforge::models::{AppConfig, CertificateType, RenderRequest, StyleConfig, TextAlign};
use certforge::server;

#[derive(Parser)]
#[command(name = "certforge")]
#[command(about = "Certforge - certificate image renderer for hackathons")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Render a certificate directly to a PNG file
    Render {
        /// Participant name drawn on the certificate
        #[arg(short, long)]
        name: String,

        /// Certificate type: participant, judge, supervisor or winner
        #[arg(short = 't', long = "type", default_value = "participant")]
        certificate_type: String,

        /// Hackathon id whose overrides apply
        #[arg(long)]
        hackathon: Option<String>,

        /// Output PNG file path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Extract embedded assets to filesystem for customization
    Init {
        /// Extract certificate templates
        #[arg(long)]
        templates: bool,

        /// Extract config.yaml
        #[arg(long)]
        config: bool,

        /// Extract all assets (the default when no category is given)
        #[arg(long)]
        all: bool,

        /// Overwrite existing files
        #[arg(long, short)]
        force: bool,

        /// List embedded assets without extracting
        #[arg(long)]
        list: bool,
    },
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Certforge API",
        description = "Certificate image renderer for hackathon participants, judges and supervisors",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        api::handle_certificate,
        api::handle_typed_certificate,
        api::handle_render_request,
        api::handle_resolve,
    ),
    components(schemas(api::ResolveResponse, RenderRequest, StyleConfig, TextAlign)),
    tags(
        (name = "Certificate", description = "Certificate rendering and configuration lookup")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Render {
            name,
            certificate_type,
            hackathon,
            output,
        }) => run_render_command(name, &certificate_type, hackathon, &output).await,
        Some(Commands::Init {
            templates,
            config,
            all,
            force,
            list,
        }) => run_init_command(templates, config, all, force, list),
        Some(Commands::Serve) => run_server().await,
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Load config (CONFIG_FILE or embedded), apply env overrides and seed the assets dir
fn load_config() -> (AppConfig, AssetLoader) {
    let config_file = std::env::var("CONFIG_FILE").ok().map(PathBuf::from);
    let loader = AssetLoader::new(None, config_file);

    let mut config = AppConfig::load_from_assets(&loader);
    config.apply_env_overrides();

    let loader = loader.with_assets_dir(config.assets_dir.clone());
    match loader.seed_if_configured() {
        Ok(report) if !report.is_empty() => {
            tracing::info!(
                templates = report.templates_seeded.len(),
                "Seeded assets directory with embedded templates"
            );
        }
        Err(e) => {
            tracing::warn!(%e, "Failed to seed assets");
        }
        _ => {}
    }

    (config, loader)
}

/// Render a certificate directly to a PNG file (no server needed)
async fn run_render_command(
    name: String,
    certificate_type: &str,
    hackathon: Option<String>,
    output: &Path,
) -> anyhow::Result<()> {
    // Minimal logging for CLI
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "certforge=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let (config, loader) = load_config();
    let state = server::create_app_state(config, loader)?;

    let certificate_type = CertificateType::parse(certificate_type);
    let mut request = RenderRequest::new(name).with_type(certificate_type);
    request.hackathon_id = hackathon;

    let result = state
        .renderer
        .render_async(request, certificate_type)
        .await
        .map_err(|e| anyhow::anyhow!("Render error: {e}"))?;

    std::fs::write(output, &result.png_bytes)?;
    println!(
        "Rendered {} ({}x{}, {} bytes, template from {})",
        output.display(),
        result.width,
        result.height,
        result.png_bytes.len(),
        result.source_used.source_kind
    );

    Ok(())
}

/// Extract embedded assets to filesystem
fn run_init_command(
    templates: bool,
    config: bool,
    all: bool,
    force: bool,
    list: bool,
) -> anyhow::Result<()> {
    if list {
        println!("Embedded assets:\n");
        println!("Templates:");
        for f in AssetLoader::list_embedded(AssetCategory::Templates) {
            println!("  {f}");
        }
        println!("\nConfig:");
        for f in AssetLoader::list_embedded(AssetCategory::Config) {
            println!("  {f}");
        }
        return Ok(());
    }

    // No category flag extracts everything
    let everything = all || (!templates && !config);
    let mut categories = Vec::new();
    if everything || templates {
        categories.push(AssetCategory::Templates);
    }
    if everything || config {
        categories.push(AssetCategory::Config);
    }

    let assets_dir = std::env::var("ASSETS_DIR").ok().map(PathBuf::from);
    let config_file = std::env::var("CONFIG_FILE").ok().map(PathBuf::from);
    let loader = AssetLoader::new(assets_dir, config_file);

    let report = loader.init(&categories, force)?;

    if !report.written.is_empty() {
        println!("Extracted {} files:", report.written.len());
        for f in &report.written {
            println!("  + {f}");
        }
    }
    if !report.skipped.is_empty() {
        println!(
            "\nSkipped {} existing files (use --force to overwrite):",
            report.skipped.len()
        );
        for f in &report.skipped {
            println!("  - {f}");
        }
    }

    if report.written.is_empty() && report.skipped.is_empty() {
        println!("No files to extract.");
    }

    Ok(())
}

/// Display status and configuration information
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();
    let assets_dir = std::env::var("ASSETS_DIR").ok();
    let legacy_file = std::env::var("LEGACY_SETTINGS_FILE").ok();
    let fonts_dir = std::env::var("FONTS_DIR").ok();

    println!("Certforge v{VERSION}");
    println!("Certificate image renderer for hackathons\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR            = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE          = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  ASSETS_DIR           = {}",
        assets_dir.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  LEGACY_SETTINGS_FILE = {}",
        legacy_file.as_deref().unwrap_or("(not set)")
    );
    println!(
        "  FONTS_DIR            = {}",
        fonts_dir.as_deref().unwrap_or("(not set)")
    );

    let loader = AssetLoader::new(None, config_file.clone().map(PathBuf::from));
    let mut config = AppConfig::load_from_assets(&loader);
    config.apply_env_overrides();

    println!("\nConfiguration:");
    let config_source = match config_file {
        Some(ref path) if PathBuf::from(path).exists() => path.to_string(),
        Some(_) => "embedded (file not found)".to_string(),
        None => "embedded".to_string(),
    };
    println!("  Config:           {config_source}");
    println!("  Assets dir:       {}", config.assets_dir.display());

    let default_path = config.default_template_path();
    let default_source = if default_path.is_file() {
        default_path.display().to_string()
    } else if AssetLoader::has_embedded(&config.default_template) {
        "embedded".to_string()
    } else {
        "MISSING".to_string()
    };
    println!("  Default template: {default_source}");
    println!(
        "  Legacy settings:  {}",
        config
            .legacy_settings_file
            .as_ref()
            .map(|p| {
                let state = if p.is_file() { "" } else { " (absent)" };
                format!("{}{state}", p.display())
            })
            .unwrap_or_else(|| "(disabled)".to_string())
    );
    println!(
        "  Seed records:     {} settings, {} hackathons",
        config.settings.len(),
        config.hackathons.len()
    );

    let font = config.fonts.candidates.iter().find(|p| p.is_file());
    println!(
        "  Certificate font: {}",
        font.map(|p| p.display().to_string())
            .unwrap_or_else(|| "none found (system fonts)".to_string())
    );

    println!("\nCommands:");
    println!("  certforge serve    Start the HTTP server");
    println!("  certforge render   Render a certificate to a PNG file");
    println!("  certforge init     Extract embedded assets");
    println!("\nRun 'certforge --help' for more details.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "certforge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let (config, loader) = load_config();

    tracing::info!(
        assets_dir = %config.assets_dir.display(),
        default_template = %config.default_template.display(),
        legacy_settings = ?config.legacy_settings_file.as_ref().map(|p| p.display().to_string()),
        "Asset sources configured"
    );

    let state = server::create_app_state(config, loader)?;

    let app = server::build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Certforge server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
