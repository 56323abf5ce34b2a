//! Command-line front end for the execution bridge.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use wizardry_bridge::bridge::{CallDescriptor, ExecutionBridge};
use wizardry_bridge::config::{self, BridgeConfig};
use wizardry_bridge::error::HostError;
use wizardry_bridge::host::{LineHost, ResponseFormat};
use wizardry_bridge::logging;

#[derive(Parser)]
#[command(name = "wizardry-bridge")]
#[command(version, about = "Run host commands on behalf of a script context", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Serve newline-delimited requests on stdin/stdout
    wizardry-bridge serve
    echo '{\"id\":\"1\",\"command\":[\"uname\",\"-a\"]}' | wizardry-bridge serve

    # One-shot execution, result printed as JSON
    wizardry-bridge exec -- ls -la /tmp
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./wizardry.toml, then the XDG config dir)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Mirror logs to stderr at debug level (also WIZARDRY_DEBUG=1)
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve requests from stdin, one JSON object per line
    Serve {
        /// How responses are written to stdout
        #[arg(short, long, value_enum, default_value_t = ResponseFormat::Json)]
        format: ResponseFormat,
    },

    /// Run one command and print its result
    Exec {
        /// Program to run, resolved on PATH
        program: String,

        /// Program arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = logging::init_and_store_logging(&config.effective_logging()) {
        eprintln!("Warning: logging disabled: {e}");
    }

    match cli.command {
        Commands::Serve { format } => match serve(format).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::from(2)
            }
        },
        Commands::Exec { program, args } => exec(program, args).await,
    }
}

fn load_config(cli: &Cli) -> Result<BridgeConfig, HostError> {
    let loaded = match &cli.config {
        Some(path) => config::from_path(path)?,
        None => config::load()?,
    };

    let config = loaded.apply_env();
    Ok(if cli.debug { config.with_debug(true) } else { config })
}

async fn serve(format: ResponseFormat) -> Result<(), HostError> {
    tracing::info!(?format, "serving requests on stdin");
    LineHost::new()
        .with_format(format)
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await?;
    Ok(())
}

async fn exec(program: String, args: Vec<String>) -> ExitCode {
    let descriptor = CallDescriptor::from_strings(std::iter::once(program).chain(args));
    let result =
        match tokio::task::spawn_blocking(move || ExecutionBridge::new().execute(&descriptor))
            .await
        {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error: execution task failed: {e}");
                return ExitCode::from(2);
            }
        };

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error: failed to encode result: {e}");
            return ExitCode::from(2);
        }
    }

    ExitCode::from(u8::try_from(result.exit_code).unwrap_or(1))
}
