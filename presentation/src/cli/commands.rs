//! CLI command definitions

use clap::{Parser, Subcommand};
use sb_domain::ModelRole;
use std::path::PathBuf;

/// CLI arguments for superbuilder-client
#[derive(Parser, Debug)]
#[command(name = "superbuilder-client")]
#[command(author, version, about = "Client for the SuperBuilder inference middleware")]
#[command(long_about = r#"
superbuilder-client talks to a running SuperBuilder middleware: it checks the
service, reads chat history, inspects and switches the active assistant's
models, streams chat replies, manages the knowledge base and downloads models.

Configuration files are loaded from (in priority order):
1. SUPERBUILDER_<SECTION>__<KEY>   Environment variables
2. --config <path>                 Explicit config file
3. ./superbuilder.toml             Project-level config
4. ~/.config/superbuilder-client/config.toml   Global config

Command-line flags override all of them.

Example:
  superbuilder-client status
  superbuilder-client config set-chat-model Mistral-7B-Instruct-v0.3-int4-ov
  superbuilder-client chat "What is the capital of France?"
  superbuilder-client files add report.pdf notes.txt
  superbuilder-client model download Mistral-7B-Instruct-v0.3-int4-ov
  superbuilder-client --tls --ca-path ca.pem --address 10.0.0.5:5006 demo
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Middleware address (host:port)
    #[arg(long, global = true, value_name = "HOST:PORT")]
    pub address: Option<String>,

    /// Connect over TLS (requires --ca-path or connection.ca_path)
    #[arg(long, global = true)]
    pub tls: bool,

    /// PEM CA bundle used to verify the middleware
    #[arg(long, global = true, value_name = "PATH")]
    pub ca_path: Option<PathBuf>,

    /// TLS server name (defaults to the host of --address)
    #[arg(long, global = true, value_name = "NAME")]
    pub server_name: Option<String>,

    /// Timeout for connecting and quick calls, in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

/// Top-level commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Greet the middleware and check whether the inference backend is ready
    Status,

    /// Print the middleware's chat history
    History,

    /// Inspect or change the active assistant
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Send a prompt and stream the reply
    Chat {
        /// The prompt to send
        prompt: String,

        /// Files to attach (can be specified multiple times)
        #[arg(long = "attach", value_name = "PATH")]
        attachments: Vec<String>,

        /// Query type understood by the middleware (e.g. "image")
        #[arg(long, value_name = "TYPE")]
        query_type: Option<String>,

        /// Remove the chat session from the middleware's history afterwards
        #[arg(long)]
        remove_session: bool,
    },

    /// Warm up the active models
    Warmup,

    /// Push the configured generation parameters to the middleware
    SetParameters,

    /// Manage the knowledge-base documents used for retrieval
    #[command(subcommand)]
    Files(FilesCommand),

    /// Download models into the local hub or set the models to load
    #[command(subcommand)]
    Model(ModelCommand),

    /// Run the reference flow: status, history, config, switch chat model, chat
    Demo {
        /// Prompt used for the chat step
        #[arg(long, default_value = "What is the capital of France?")]
        prompt: String,
    },
}

/// `config` subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    /// Show the active assistant and its selected models
    Show,

    /// List every model the middleware can activate
    Models,

    /// Activate another chat model from the catalog
    SetChatModel {
        /// Full name of the chat model
        full_name: String,
    },
}

/// `files` subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum FilesCommand {
    /// Upload files to the knowledge base
    Add {
        /// Files to upload; missing files are skipped
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },

    /// Remove files from the knowledge base
    Remove {
        #[arg(required = true, value_name = "PATH")]
        paths: Vec<PathBuf>,
    },

    /// List the files in the knowledge base
    List,
}

/// `model` subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ModelCommand {
    /// Download a catalog model into the middleware's local model hub
    Download {
        /// Full name of the model
        full_name: String,

        /// Role of the model in the catalog
        #[arg(long, default_value = "chat", value_parser = parse_role)]
        role: ModelRole,
    },

    /// Download from an explicit URL into a local directory
    DownloadUrl {
        url: String,

        /// Destination directory on the middleware host
        local_path: String,
    },

    /// Set the models the middleware loads
    Set {
        /// Assistant short name
        #[arg(long)]
        assistant: Option<String>,

        #[arg(long)]
        llm: Option<String>,

        #[arg(long)]
        embedder: Option<String>,

        #[arg(long)]
        ranker: Option<String>,
    },
}

fn parse_role(value: &str) -> Result<ModelRole, String> {
    value.parse()
}
