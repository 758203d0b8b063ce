#![forbid(unsafe_code)]

pub mod bridge;
pub mod cli;
pub mod client;
pub mod document;
pub mod error;
pub mod export;
pub mod server;

use cli::{ClientArgs, Outcome, ServeArgs};
use client::{ApiClient, Controller, ControllerError, SelectedFile};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const SERVER_LOG_FILTER: &str = "doc2sheet=info,tower_http=info";
const CLIENT_LOG_FILTER: &str = "doc2sheet=warn";

/// Run the doc2sheet CLI. Returns an exit code (0, 1, or 2).
pub async fn run() -> u8 {
    use clap::Parser;
    use cli::{Cli, Command};

    let cli = Cli::parse();

    if cli.describe {
        return handle_describe();
    }

    match cli.command {
        Some(Command::Serve(args)) => {
            init_logging(SERVER_LOG_FILTER);
            handle_serve(&args).await.exit_code()
        }
        Some(Command::Extract {
            file,
            client,
            save_text,
            excel,
        }) => {
            init_logging(CLIENT_LOG_FILTER);
            handle_extract(&file, &client, save_text, excel)
                .await
                .exit_code()
        }
        Some(Command::PythonExtract { file, client }) => {
            init_logging(CLIENT_LOG_FILTER);
            handle_python_extract(&file, &client).await.exit_code()
        }
        None => {
            eprintln!("Error: a subcommand is required (see --help)");
            Outcome::Usage.exit_code()
        }
    }
}

/// Logs go to stderr; `RUST_LOG` overrides `default_filter`.
fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn handle_describe() -> u8 {
    let operator = serde_json::json!({
        "name": "doc2sheet",
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "accepted_extensions": document::DocumentFormat::ACCEPTED_EXTENSIONS,
        "outcome_header": server::OUTCOME_HEADER,
        "endpoints": [
            {
                "method": "POST",
                "path": "/api/extract",
                "request": "multipart/form-data; field \"file\"",
                "response": "application/json {\"content\": string}"
            },
            {
                "method": "POST",
                "path": "/api/convert-to-excel",
                "request": "application/json {\"content\": string}",
                "response": export::XLSX_CONTENT_TYPE
            },
            {
                "method": "POST",
                "path": "/api/python-extract",
                "request": "multipart/form-data; field \"file\"",
                "response": export::XLSX_CONTENT_TYPE
            },
            {
                "method": "GET",
                "path": "/health",
                "request": null,
                "response": "application/json {\"status\": \"ok\"}"
            }
        ]
    });

    if let Ok(json) = serde_json::to_string_pretty(&operator) {
        println!("{}", json);
        Outcome::Success.exit_code()
    } else {
        eprintln!("Error: Failed to serialize service description");
        Outcome::Usage.exit_code()
    }
}

async fn handle_serve(args: &ServeArgs) -> Outcome {
    let config = args.to_config();
    match server::start_server(&config).await {
        Ok(()) => Outcome::Success,
        Err(error) => {
            eprintln!("Error: server on {} failed: {error}", config.addr);
            Outcome::Usage
        }
    }
}

async fn handle_extract(file: &Path, args: &ClientArgs, save_text: bool, excel: bool) -> Outcome {
    let controller = match select(file, args).await {
        Ok(controller) => controller,
        Err(outcome) => return outcome,
    };

    let text = match controller.extract().await {
        Ok(text) => text,
        Err(error) => return report(&error),
    };

    if !save_text && !excel {
        print!("{text}");
        return Outcome::Success;
    }

    if save_text {
        match controller.download_text().await {
            Ok(path) => println!("{}", path.display()),
            Err(error) => return report(&error),
        }
    }
    if excel {
        match controller.download_excel().await {
            Ok(path) => println!("{}", path.display()),
            Err(error) => return report(&error),
        }
    }
    Outcome::Success
}

async fn handle_python_extract(file: &Path, args: &ClientArgs) -> Outcome {
    let controller = match select(file, args).await {
        Ok(controller) => controller,
        Err(outcome) => return outcome,
    };

    match controller.python_extract().await {
        Ok(path) => {
            println!("{}", path.display());
            Outcome::Success
        }
        Err(error) => report(&error),
    }
}

/// Read `file` and select it on a fresh controller.
async fn select(file: &Path, args: &ClientArgs) -> Result<Controller, Outcome> {
    let selected = match SelectedFile::read(file).await {
        Ok(selected) => selected,
        Err(error) => {
            eprintln!("Error: cannot read {}: {error}", file.display());
            return Err(Outcome::Usage);
        }
    };

    let controller = Controller::new(ApiClient::new(args.server.clone()), args.out.clone());
    match controller.select_file(selected) {
        Ok(()) => Ok(controller),
        Err(error) => {
            eprintln!("Error: {error}");
            Err(Outcome::Usage)
        }
    }
}

fn report(error: &ControllerError) -> Outcome {
    eprintln!("Error: {error}");
    Outcome::Failed
}
