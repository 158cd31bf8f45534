//! Viewr command-line entry point.
//!
//! # Architecture Overview
//!
//! ```text
//!   viewr run / serve                 viewr config           viewr service <cmd>
//!         │                                │                        │
//!         ▼                                ▼                        ▼
//!   ┌──────────────┐               ┌──────────────┐        ┌──────────────────┐
//!   │ConfigResolver│               │ template /   │        │ServiceController │
//!   │ defaults <   │               │ validate     │        │ status → act     │
//!   │ doc < env <  │               └──────────────┘        └────────┬─────────┘
//!   │ flags        │                                                │
//!   └──────┬───────┘                                                ▼
//!          ▼                                               ┌──────────────────┐
//!   ┌──────────────┐   SIGINT/SIGTERM                      │ systemd adapter  │
//!   │LifecycleRun- │◀── CancellationToken                  │ (Linux)          │
//!   │ner: probe,   │                                       └──────────────────┘
//!   │log, serve,   │
//!   │drain         │
//!   └──────────────┘
//! ```

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use viewr::cli::{Cli, Command, ServiceCommand};
use viewr::config::{self, loader, ConfigResolver, FlagProvider, NoFlags};
use viewr::lifecycle::signals::cancel_on_shutdown_signal;
use viewr::lifecycle::LifecycleRunner;
use viewr::service::{PlatformManager, ServiceController, ServiceDefinition};

/// Subdirectory of the application root holding the JSON log.
const LOG_DIR_NAME: &str = "logs";

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit 2 from inside clap.
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Run(args) => run(config_path, &args, true).await,
        Command::Serve => run(config_path, &NoFlags, false).await,
        Command::Config {
            init,
            validate,
            overwrite,
        } => config_command(config_path, init, validate, overwrite),
        Command::Service(command) => service_command(command, config_path),
    }
}

async fn run(config_path: Option<&Path>, flags: &dyn FlagProvider, interactive: bool) -> ExitCode {
    let resolution = match ConfigResolver::new().resolve(config_path, flags) {
        Ok(resolution) => resolution,
        Err(e) => {
            eprintln!("Error: failed to load the configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if interactive {
        if let Some(deferred) = &resolution.deferred {
            eprintln!("Warning: {}", deferred);
        }
    }

    let log_dir = loader::app_root().ok().map(|root| root.join(LOG_DIR_NAME));
    let runner = LifecycleRunner::new(Arc::new(resolution.config))
        .provenance(resolution.provenance.to_string())
        .emit_to_console(interactive)
        .log_dir(log_dir);

    match runner.run(cancel_on_shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn config_command(config_path: Option<&Path>, init: bool, validate: bool, overwrite: bool) -> ExitCode {
    if init {
        return match config::export_template(None, overwrite) {
            Ok(path) => {
                println!("Configuration file initialized at: {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: failed initialization: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    if validate {
        return match config::validate(config_path) {
            Ok(source) => {
                println!("Configuration source: {}", source);
                println!("Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: failed to validate the configuration file: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    ExitCode::SUCCESS
}

fn service_command(command: ServiceCommand, config_path: Option<&Path>) -> ExitCode {
    let definition = match ServiceDefinition::for_current_exe(config_path) {
        Ok(definition) => definition,
        Err(e) => {
            eprintln!("Error: failed to locate the executable: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let controller = ServiceController::new(PlatformManager::new(definition));
    let outcome = match command {
        ServiceCommand::Install => controller.install(),
        ServiceCommand::Uninstall => controller.uninstall(),
        ServiceCommand::Start => controller.start(),
        ServiceCommand::Stop => controller.stop(),
        ServiceCommand::Restart => controller.restart(),
        ServiceCommand::Status => controller.status(),
    };

    println!("{}", outcome.message);
    outcome.exit.into()
}

