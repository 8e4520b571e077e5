use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use flightgenius::core::config::Config;
use flightgenius::core::gateway::GeminiGateway;
use flightgenius::core::session::SessionController;
use flightgenius::ui::chat_loop::{run_chat_loop, ChatLoopOptions};
use flightgenius::utils::logging::LoggingState;

#[derive(Parser)]
#[command(name = "flightgenius")]
#[command(about = "A terminal chat client for the FlightGenius flight-search assistant")]
#[command(
    long_about = "FlightGenius is a full-screen terminal chat client for an AI flight-search \
assistant with live search grounding. Responses arrive as markdown with web \
citations and can be exported as an itinerary document.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your API key (required)\n\
  RUST_LOG          Enable diagnostic tracing to flightgenius-trace.log\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Ctrl+R            Start/stop a voice recording\n\
  Ctrl+O            Attach a file (ticket image, passport scan, PDF)\n\
  Ctrl+E            Export the latest response as an itinerary document\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit"
)]
struct Args {
    /// Model to use for chat (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// API base URL override (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Log the transcript to this file
    #[arg(short, long)]
    log: Option<String>,

    /// Disable markdown rendering in the chat area
    #[arg(long)]
    no_markdown: bool,
}

fn init_tracing() -> Result<(), Box<dyn Error>> {
    // The alternate screen owns stdout/stderr; diagnostics go to a file and
    // only when explicitly requested.
    if std::env::var("RUST_LOG").is_ok() {
        let file = std::fs::File::create("flightgenius-trace.log")?;
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing()?;

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("⚠️  Could not read config, using defaults: {e}");
        Config::default()
    });

    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => {
            eprintln!(
                "❌ Error: GEMINI_API_KEY environment variable not set\n\n\
                 Please set your API key:\n\
                 export GEMINI_API_KEY=\"your-api-key-here\""
            );
            std::process::exit(1);
        }
    };

    let model = args.model.unwrap_or_else(|| config.model().to_string());
    let base_url = args
        .base_url
        .unwrap_or_else(|| config.base_url().to_string());
    let markdown = !args.no_markdown && config.markdown_enabled();

    let logging = LoggingState::new(args.log).map_err(|e| format!("cannot open log file: {e}"))?;
    let gateway = Arc::new(GeminiGateway::new(&base_url, api_key, model));
    let session = SessionController::with_greeting();
    let options = ChatLoopOptions {
        markdown,
        export_dir: std::env::current_dir()?,
    };

    run_chat_loop(session, gateway, logging, options).await
}
