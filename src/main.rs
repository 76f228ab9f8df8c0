use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use file_vault_client::{
    adapters::{
        cli::{Cli, Command},
        controllers::{browse_controller::BrowseController, file_controller::FileController},
    },
    create_file_directory,
    domain::config::client::DEFAULT_LOG_FILTER,
    ApplicationError, ClientConfig, FileBrowser,
};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so listings on stdout stay clean.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => return Ok(report_failure(e)),
    };

    tracing::info!("Using file backend at {}", config.api_url);

    let directory = create_file_directory(&config).context("Failed to create HTTP client")?;
    let browser = FileBrowser::new(directory, config.download_dir.clone());

    let result = match &cli.command {
        Command::Browse => {
            BrowseController::run(&browser)
                .await
                .context("Interactive session failed")?;
            return Ok(ExitCode::SUCCESS);
        }
        command => run(&browser, command).await,
    };

    match result {
        Ok(output) => {
            print!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_failure(e)),
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig, ApplicationError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &cli.api_url {
        config.api_url = ClientConfig::new(url.as_str()).api_url;
    }
    if let Command::Download {
        output: Some(dir), ..
    } = &cli.command
    {
        config.download_dir = dir.clone();
    }
    Ok(config)
}

fn report_failure(e: ApplicationError) -> ExitCode {
    // The cause was logged where it happened; users get the short form.
    eprintln!("{}", e);
    ExitCode::FAILURE
}

async fn run(browser: &FileBrowser, command: &Command) -> Result<String, ApplicationError> {
    match command {
        Command::List(args) => FileController::list(browser, args).await,
        Command::Upload { path, mime_type } => {
            FileController::upload(browser, path, mime_type.clone()).await
        }
        Command::Delete { id } => FileController::delete(browser, id).await,
        Command::Download { id, .. } => {
            browser.refresh().await?;
            FileController::download(browser, id).await
        }
        Command::Savings => Ok(FileController::savings(browser).await),
        Command::FileTypes => Ok(FileController::file_types()),
        Command::Browse => Ok(String::new()),
    }
}
