//! CLI entrypoint for superbuilder-client
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, anyhow, bail};
use clap::Parser;
use sb_application::{
    ChatOptions, ClientError, MiddlewareClient, ModelDownload, NoProgress, ProgressNotifier,
};
use sb_domain::SetModelsRequest;
use sb_infrastructure::{ConfigLoader, FileConfig, GrpcMiddlewareGateway};
use sb_presentation::{
    ChatPrinter, Cli, Command, ConfigCommand, ConsoleFormatter, FilesCommand, ModelCommand,
    OutputConfig, ProgressReporter, SimpleProgress,
};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered log lines reach the file
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);
    config.validate()?;

    let output = OutputConfig {
        color: config.output.color,
        show_progress: config.output.show_progress && !cli.quiet,
    };
    output.apply();

    let Some(command) = cli.command.clone() else {
        bail!("No command given. Run with --help for usage.");
    };

    info!("Starting superbuilder-client");

    // === Dependency Injection ===
    let session = config.connection.session_options();
    let gateway = Arc::new(GrpcMiddlewareGateway::connect(&session).await?);

    let client = MiddlewareClient::new(
        gateway,
        config.client.client_options(config.connection.timeout()),
    )
    .with_progress(progress_for(&output));

    let result = run(&client, command, &config, cli.quiet).await;

    // Always release the session, even when the command failed
    if let Err(e) = client.close().await {
        warn!("Failed to close middleware session: {}", e);
    }

    result
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    // Initialize logging based on verbosity level
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("--log-file must name a file: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Command-line flags win over every configuration source.
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(address) = &cli.address {
        config.connection.address = address.clone();
    }
    if cli.tls {
        config.connection.tls = true;
    }
    if let Some(ca_path) = &cli.ca_path {
        config.connection.ca_path = Some(ca_path.clone());
    }
    if let Some(server_name) = &cli.server_name {
        config.connection.server_name = Some(server_name.clone());
    }
    if let Some(timeout) = cli.timeout {
        config.connection.timeout_secs = timeout;
    }
}

fn progress_for(output: &OutputConfig) -> Arc<dyn ProgressNotifier> {
    if !output.show_progress {
        Arc::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Arc::new(ProgressReporter::new())
    } else {
        Arc::new(SimpleProgress)
    }
}

async fn run(
    client: &MiddlewareClient,
    command: Command,
    config: &FileConfig,
    quiet: bool,
) -> Result<()> {
    match command {
        Command::Status => {
            let greeting = client.get_status().await?;
            let backend_ready = match client.check_backend().await {
                Ok(ready) => ready,
                Err(e) if e.is_connection() => return Err(e.into()),
                Err(e) => {
                    warn!("Backend check failed: {}", e);
                    false
                }
            };
            println!("{}", ConsoleFormatter::format_status(&greeting, backend_ready));
        }

        Command::History => {
            let history = client.get_history().await?;
            println!("{}", ConsoleFormatter::format_history(&history));
        }

        Command::Config(ConfigCommand::Show) => {
            let config = client.get_config().await?;
            println!("{}", ConsoleFormatter::format_assistant(config.active_assistant()));
        }

        Command::Config(ConfigCommand::Models) => {
            let config = client.get_config().await?;
            println!("{}", ConsoleFormatter::format_catalog(config.active_assistant()));
        }

        Command::Config(ConfigCommand::SetChatModel { full_name }) => {
            let assistant = client.switch_chat_model(&full_name).await?;
            println!(
                "{}",
                ConsoleFormatter::format_message("Active chat model:", &full_name)
            );
            println!("{}", ConsoleFormatter::format_assistant(&assistant));
        }

        Command::Chat {
            prompt,
            attachments,
            query_type,
            remove_session,
        } => {
            let mut options = ChatOptions::new(prompt).with_attachments(attachments);
            if let Some(query_type) = query_type {
                options = options.with_query_type(query_type);
            }
            chat(client, options, remove_session, quiet).await?;
        }

        Command::Warmup => {
            let message = client.warmup().await?;
            println!("{}", ConsoleFormatter::format_message("Models loaded:", &message));
        }

        Command::SetParameters => {
            let message = client.set_parameters(&config.parameters).await?;
            println!(
                "{}",
                ConsoleFormatter::format_message("Parameters updated:", &message)
            );
        }

        Command::Files(command) => files(client, command).await?,

        Command::Model(command) => model(client, command).await?,

        Command::Demo { prompt } => demo(client, prompt, quiet).await?,
    }

    Ok(())
}

async fn files(client: &MiddlewareClient, command: FilesCommand) -> Result<()> {
    match command {
        FilesCommand::Add { paths } => {
            let report = client.add_files(&paths).await?.finish().await?;
            println!("{}", ConsoleFormatter::format_transfer(&report));
        }
        FilesCommand::Remove { paths } => {
            let message = client.remove_files(&paths).await?;
            println!("{}", ConsoleFormatter::format_message("Files removed:", &message));
        }
        FilesCommand::List => {
            let files = client.list_files().await?;
            println!("{}", ConsoleFormatter::format_file_list(&files));
        }
    }
    Ok(())
}

async fn model(client: &MiddlewareClient, command: ModelCommand) -> Result<()> {
    match command {
        ModelCommand::Download { full_name, role } => {
            match client.download_model(role, &full_name).await? {
                ModelDownload::AlreadyPresent(folder) => println!(
                    "{}",
                    ConsoleFormatter::format_message(
                        "Already downloaded:",
                        &folder.display().to_string()
                    )
                ),
                ModelDownload::Started(stream) => {
                    let report = stream.finish().await?;
                    println!("{}", ConsoleFormatter::format_transfer(&report));
                }
            }
        }
        ModelCommand::DownloadUrl { url, local_path } => {
            let report = client.download_files(&url, &local_path).await?.finish().await?;
            println!("{}", ConsoleFormatter::format_transfer(&report));
        }
        ModelCommand::Set {
            assistant,
            llm,
            embedder,
            ranker,
        } => {
            let request = SetModelsRequest {
                assistant: assistant.unwrap_or_default(),
                llm: llm.unwrap_or_default(),
                embedder: embedder.unwrap_or_default(),
                ranker: ranker.unwrap_or_default(),
            };
            let message = client.set_models(request).await?;
            println!("{}", ConsoleFormatter::format_message("Models set:", &message));
        }
    }
    Ok(())
}

async fn chat(
    client: &MiddlewareClient,
    options: ChatOptions,
    remove_session: bool,
    quiet: bool,
) -> Result<(), ClientError> {
    let stream = client.chat_with(options).await?;
    let reply = ChatPrinter::stdout().print(stream).await?;
    if !quiet {
        print!("{}", ConsoleFormatter::format_chat_summary(&reply));
    }

    if remove_session {
        let message = client.remove_session(reply.session_id).await?;
        println!("{}", ConsoleFormatter::format_message("Session removed:", &message));
    }
    Ok(())
}

/// Status, history, config, switch chat model, then one chat.
async fn demo(client: &MiddlewareClient, prompt: String, quiet: bool) -> Result<()> {
    let greeting = client.get_status().await?;
    let backend_ready = client.check_backend().await.unwrap_or_else(|e| {
        warn!("Backend check failed: {}", e);
        false
    });
    println!("{}", ConsoleFormatter::format_status(&greeting, backend_ready));

    let history = client.get_history().await?;
    println!("{}", ConsoleFormatter::format_history(&history));

    let config = client.get_config().await?;
    let assistant = config.active_assistant();
    println!("{}", ConsoleFormatter::format_assistant(assistant));

    match assistant.next_chat_model() {
        Some(next) => {
            let full_name = next.full_name.clone();
            let updated = client.switch_chat_model(&full_name).await?;
            println!(
                "{}",
                ConsoleFormatter::format_message("Switched chat model to", &full_name)
            );
            println!("{}", ConsoleFormatter::format_assistant(&updated));
        }
        None => println!(
            "{}",
            ConsoleFormatter::format_message(
                "Chat model unchanged:",
                "no other chat model in the catalog"
            )
        ),
    }

    println!("\n> {}", prompt);
    let options = ChatOptions::new(prompt).avoiding(&history);
    chat(client, options, false, quiet).await?;
    Ok(())
}
