//! House Price Prediction API entry point
//!
//! # Usage
//!
//! ```bash
//! # Serve the API
//! house-price-api serve --port 8000 --model models/house_price_model.json
//!
//! # Predict a single record offline
//! house-price-api predict --input house.json
//!
//! # Check that a model artifact loads
//! house-price-api check-model --model models/house_price_model.json
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Startup or I/O failure (including a missing model)
//! - 3: Invalid input record
//! - 10: Inference failed

use anyhow::Context;
use clap::{Parser, Subcommand};
use house_price_api::config::{
    ServiceConfig, DEFAULT_HOST, DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT,
};
use house_price_api::model::DEFAULT_MODEL_PATH;
use house_price_api::telemetry::init_tracing;
use house_price_api::{
    create_router, predict_from_json, AppState, LoadedModel, LogFormat, PredictionError,
    API_NAME, API_VERSION,
};
use std::path::PathBuf;
use std::sync::Arc;

const EXIT_INVALID_INPUT: i32 = 3;
const EXIT_INFERENCE_FAILED: i32 = 10;

#[derive(Parser)]
#[command(name = "house-price-api")]
#[command(about = "House Price Prediction API - serve a trained regression model")]
#[command(version)]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, env = "LOG_FORMAT", default_value = "json")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind to
        #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Path to the model artifact
        #[arg(short, long, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,

        /// Largest accepted request body in bytes
        #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
        max_body_bytes: usize,
    },

    /// Predict the price of a single JSON record
    Predict {
        /// Path to a JSON file holding one record
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the model artifact
        #[arg(short, long, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },

    /// Load and validate a model artifact
    CheckModel {
        /// Path to the model artifact
        #[arg(short, long, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
        model: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format, "info")?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            model,
            max_body_bytes,
        } => {
            let config = ServiceConfig::builder()
                .host(host)
                .port(port)
                .model_path(model)
                .log_format(cli.log_format)
                .max_body_bytes(max_body_bytes)
                .build();
            serve(config).await?;
        }

        Commands::Predict { input, model } => {
            let model = LoadedModel::load(&model)
                .with_context(|| format!("cannot start without model {}", model.display()))?;
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let payload: serde_json::Value = match serde_json::from_str(&content) {
                Ok(payload) => payload,
                Err(e) => {
                    eprintln!("{}", serde_json::json!({ "detail": format!("Invalid input: {}", e) }));
                    std::process::exit(EXIT_INVALID_INPUT);
                }
            };

            match predict_from_json(&model, &payload) {
                Ok(result) => println!("{}", serde_json::to_string_pretty(&result)?),
                Err(err) => {
                    eprintln!("{}", serde_json::json!({ "detail": err.to_string() }));
                    let code = match err {
                        PredictionError::Validation(_) => EXIT_INVALID_INPUT,
                        PredictionError::Inference(_) => EXIT_INFERENCE_FAILED,
                    };
                    std::process::exit(code);
                }
            }
        }

        Commands::CheckModel { model } => {
            let loaded = LoadedModel::load(&model)
                .with_context(|| format!("model {} failed to load", model.display()))?;
            println!("{}", serde_json::to_string_pretty(loaded.summary())?);
        }
    }

    Ok(())
}

async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let addr = config
        .bind_address()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;

    // The process must not accept traffic without a model.
    let model = LoadedModel::load(&config.model_path).with_context(|| {
        format!(
            "cannot start without model {}",
            config.model_path.display()
        )
    })?;

    let state = AppState::new(Arc::new(model))?.with_max_body_bytes(config.max_body_bytes);
    let router = create_router(state);

    tracing::info!("Starting {} v{} on {}", API_NAME, API_VERSION, addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
