use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info};

use subscope::broker::LoopbackBroker;
use subscope::config::load_config;
use subscope::console::ConsoleRenderer;
use subscope::session::{self, Command, CommandError, HELP, Session};
use subscope::utils::error::AppError;
use subscope::utils::logging;

/// Interactive publish/subscribe demo client.
#[derive(Debug, Parser)]
#[command(name = "subscope", version, about)]
struct Args {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,

    /// Broker URL, for example ws://localhost:8008
    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    vpn: Option<String>,

    #[arg(long)]
    username: Option<String>,

    #[arg(long)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut settings = load_config()?;
    if let Some(level) = args.log_level {
        settings.logging.level = level;
    }
    if let Some(url) = args.url {
        settings.connection.url = url;
    }
    if let Some(vpn) = args.vpn {
        settings.connection.vpn = vpn;
    }
    if let Some(username) = args.username {
        settings.connection.username = username;
    }
    if let Some(password) = args.password {
        settings.connection.password = password;
    }

    logging::init(&settings.logging.level);
    info!("Starting subscope as {}", settings.connection.client_name);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::unbounded_channel();

    let session = Session::new(
        settings,
        LoopbackBroker::new(event_tx),
        ConsoleRenderer::stdout(),
    );
    let session_task = tokio::spawn(session::run(session, command_rx, event_rx));

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.parse::<Command>() {
            Ok(Command::Help) => println!("{HELP}"),
            Ok(command) => {
                let quit = command == Command::Quit;
                if command_tx.send(command).is_err() || quit {
                    break;
                }
            }
            Err(CommandError::Empty) => {}
            Err(err) => println!("{err}"),
        }
    }

    drop(command_tx);
    if let Err(err) = session_task.await {
        error!("Session task failed: {}", err);
    }
    Ok(())
}
