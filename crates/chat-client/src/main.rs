// crates/chat-client/src/main.rs

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use chat_client::{parse_command, run_poller, ChatConnection, ClientConfig, Command, PollEnd, Session};

#[derive(Parser)]
#[clap(name = "chat-client")]
#[clap(about = "Terminal client for the chat server")]
struct Cli {
    /// Your username
    #[clap(short, long, default_value = "fred")]
    user: String,

    /// Server to connect to: `host`, `host:port`, or `:port`
    #[clap(long, default_value = "localhost")]
    host: String,

    /// How often to check for new messages, in milliseconds
    #[clap(long, default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

/// Print a line the way a log would: local timestamp first.
fn print_line(line: &str) {
    println!("{} {}", Local::now().format("%Y/%m/%d %H:%M:%S"), line);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.debug {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = ClientConfig::new(
        &cli.user,
        &cli.host,
        Duration::from_millis(cli.poll_interval_ms.max(1)),
    );

    let conn = ChatConnection::connect(&config.server_addr).await?;
    let session = Session::new(&config.username, conn);

    let welcome = session.register().await.context("error registering user")?;
    print_line(&welcome.greeting);
    print_line("List of users online:");
    for user in &welcome.roster {
        print_line(user);
    }

    // Listen for messages
    let (stop_tx, stop_rx) = watch::channel(false);
    let mut poller = tokio::spawn(run_poller(
        session.clone(),
        config.poll_interval,
        stop_rx,
        |notification| print_line(&notification.to_string()),
    ));

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = stdin.next_line() => {
                let keep_going = match line {
                    Ok(Some(line)) => handle_line(&session, &line).await,
                    Ok(None) => {
                        debug!("EOF on stdin, logging out");
                        report(session.logout().await, "logging out");
                        false
                    }
                    Err(err) => {
                        warn!(error = %err, "failed to read stdin");
                        report(session.logout().await, "logging out");
                        false
                    }
                };
                if !keep_going {
                    break;
                }
            }
            ended = &mut poller => {
                match ended {
                    Ok(PollEnd::SessionEnded(err)) => debug!(error = %err, "poller ended"),
                    Ok(PollEnd::Stopped) => {}
                    Err(err) => warn!(error = %err, "poller task failed"),
                }
                print_line("Chat has been shutdown. Goodbye.");
                return Ok(());
            }
        }
    }

    stop_tx.send_replace(true);
    if let Err(err) = poller.await {
        warn!(error = %err, "poller task failed");
    }
    Ok(())
}

/// Run one typed command. Returns `false` when the client should exit.
async fn handle_line(session: &Session, line: &str) -> bool {
    let Some(command) = parse_command(line) else {
        return true;
    };

    match command {
        Command::List => match session.list().await {
            Ok(users) => {
                print_line("Current online users:");
                for user in users {
                    print_line(&user);
                }
            }
            Err(err) => print_line(&format!("Error listing users: {err}")),
        },
        Command::Tell { target, text } => {
            report(session.tell(&target, &text).await, "telling users something");
        }
        Command::Say { text } => {
            report(session.say(&text).await, "saying something");
        }
        Command::Usage(usage) => print_line(usage),
        Command::Logout => {
            report(session.logout().await, "logging out");
            return false;
        }
        Command::Shutdown => {
            report(session.shutdown().await, "shutting down server");
            return false;
        }
    }

    true
}

fn report<E: std::fmt::Display>(result: Result<(), E>, doing: &str) {
    if let Err(err) = result {
        print_line(&format!("Error {doing}: {err}"));
    }
}
