//! studybot CLI: terminal chat client for the study assistant service

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use studybot_engine::{
    render_message_html, ChatTransport, Config, ConversationClient, HttpTransport, Message,
    ReplyMode, ResetRequest, SessionId,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Chat with the study assistant from your terminal
#[derive(Parser, Debug)]
#[command(name = "studybot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Chat service base URL (overrides the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Treat a reply without a `response` field as empty instead of an error
    #[arg(long, global = true)]
    lenient: bool,

    /// Write logs to this file (the TUI never logs to the terminal)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Open the chat TUI (default when no command specified)
    Tui,

    /// Send one message in a fresh session and print the reply
    Send {
        /// Message text
        message: String,
    },

    /// Print the HTML for one message body
    Render {
        /// Render as a bot message
        #[arg(long)]
        bot: bool,

        /// Render as a bot error message
        #[arg(long)]
        error: bool,

        /// Raw message text
        text: String,
    },

    /// Ask the service to forget a session
    Reset {
        /// Session id to reset
        #[arg(long)]
        session: String,
    },
}

const DEFAULT_LOG_FILTER: &str = "studybot=info";

fn main() {
    let cli = Cli::parse();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    if let Err(e) = init_logging(cli.log_file.as_deref(), interactive) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    let code = match cli.command {
        None | Some(Commands::Tui) => cmd_tui(&config),
        Some(Commands::Send { message }) => cmd_send(&config, &message),
        Some(Commands::Render { bot, error, text }) => cmd_render(bot, error, &text),
        Some(Commands::Reset { session }) => cmd_reset(&config, session),
    };
    std::process::exit(code);
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(url) = &cli.base_url {
        config.base_url.clone_from(url);
    }
    if cli.lenient {
        config.reply_mode = ReplyMode::Lenient;
    }
    config.validate()?;
    Ok(config)
}

/// One-shot commands log to stderr. The TUI logs only to `--log-file`.
fn init_logging(log_file: Option<&Path>, interactive: bool) -> std::io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    match (log_file, interactive) {
        (Some(path), _) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        (None, false) => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
        (None, true) => {}
    }
    Ok(())
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_tui(config: &Config) -> i32 {
    let rt = runtime();
    if let Err(e) = rt.block_on(studybot_tui::run_tui(config)) {
        eprintln!("Error: {e}");
        return 1;
    }
    0
}

fn cmd_send(config: &Config, message: &str) -> i32 {
    let transport = match HttpTransport::new(&config.base_url, config.reply_mode) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let rt = runtime();
    let mut client = ConversationClient::new();
    info!(session_id = %client.session(), base_url = %config.base_url, "sending message");
    let Some(outcome) = rt.block_on(client.send(&transport, message)) else {
        eprintln!("Error: message is empty");
        return 1;
    };

    info!(?outcome, "send finished");

    let Some(reply) = client.log().last() else {
        return 1;
    };
    if outcome.is_error() {
        eprintln!("{}", reply.body);
        1
    } else {
        println!("{}", reply.body);
        0
    }
}

fn cmd_render(bot: bool, error: bool, text: &str) -> i32 {
    let message = match (bot, error) {
        (_, true) => Message::bot_error(0, text),
        (true, false) => Message::bot(0, text),
        (false, false) => Message::user(0, text),
    };
    println!("{}", render_message_html(&message));
    0
}

fn cmd_reset(config: &Config, session: String) -> i32 {
    let transport = match HttpTransport::new(&config.base_url, config.reply_mode) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let request = ResetRequest {
        session_id: SessionId::from_string(session),
    };
    let rt = runtime();
    match rt.block_on(transport.reset_session(&request)) {
        Ok(()) => {
            info!(session_id = %request.session_id, "session reset");
            println!("Reset {}", request.session_id);
        }
        // The service forgetting a session is best effort
        Err(e) => {
            warn!(session_id = %request.session_id, error = %e, "reset failed");
            println!("Reset {} locally; service said: {e}", request.session_id);
        }
    }
    0
}
