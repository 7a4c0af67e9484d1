mod repl;

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use history::{BoardId, History, Intent, Reconciler, RelayEvent, WireError};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::repl::ReplCommand;

type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("websocket failed: {0}")]
    Ws(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for websocket event")]
    Timeout,
    #[error("relay rejected a message: {code}: {message}")]
    Relay { code: String, message: String },
    #[error("{0}")]
    Wire(#[from] WireError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("stdin failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for CliError {
    fn from(error: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::Ws(Box::new(error))
    }
}

#[derive(Parser, Debug)]
#[command(name = "whiteboard-cli", about = "Shared whiteboard REST and realtime CLI")]
struct Cli {
    #[arg(long, env = "WHITEBOARD_BASE_URL", default_value = "http://127.0.0.1:5000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Ping,
    Board(BoardCommand),
    /// Join a board and draw interactively from stdin.
    Session(SessionArgs),
}

#[derive(Args, Debug)]
struct BoardCommand {
    #[command(subcommand)]
    command: BoardSubcommand,
}

#[derive(Subcommand, Debug)]
enum BoardSubcommand {
    List,
    Show { board_id: String },
    Create,
    /// Live room membership and last broadcast history.
    Room { board_id: String },
}

#[derive(Args, Debug)]
struct SessionArgs {
    board_id: String,
    #[arg(long, help = "Color for new elements, e.g. #1f77b4")]
    color: Option<String>,
}

/// Board as returned by the REST surface.
#[derive(Debug, Deserialize)]
struct BoardView {
    id: BoardId,
    data: History,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let base_url = cli.base_url.trim_end_matches('/').to_owned();

    match cli.command {
        Command::Ping => run_ping(&base_url).await,
        Command::Board(board) => run_board(&base_url, board).await,
        Command::Session(args) => run_session(&base_url, args).await,
    }
}

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let response = reqwest::get(format!("{base_url}/healthz")).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_board(base_url: &str, board: BoardCommand) -> Result<(), CliError> {
    let json = match board.command {
        BoardSubcommand::List => api_request(base_url, reqwest::Method::GET, "/api/whiteboard").await?,
        BoardSubcommand::Show { board_id } => {
            api_request(base_url, reqwest::Method::GET, &format!("/api/whiteboard/{board_id}")).await?
        }
        BoardSubcommand::Create => api_request(base_url, reqwest::Method::POST, "/api/whiteboard").await?,
        BoardSubcommand::Room { board_id } => {
            api_request(base_url, reqwest::Method::GET, &format!("/api/whiteboard/{board_id}/room")).await?
        }
    };
    print_json(&json)
}

// =============================================================================
// SESSION
// =============================================================================

async fn run_session(base_url: &str, args: SessionArgs) -> Result<(), CliError> {
    let board = fetch_board(base_url, &args.board_id).await?;
    let mut reconciler = Reconciler::new(board.id);
    reconciler.set_color(args.color);
    let join = reconciler.hydrate(board.data);

    let (mut stream, _) = connect_async(ws_url(base_url)?).await?;
    let session_id = wait_for_connected(&mut stream).await?;
    send_intent(&mut stream, &join).await?;
    eprintln!("joined {} as session {session_id}; type `help`", reconciler.board_id());
    print!("{}", repl::render(&reconciler));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                let command = match repl::parse_command(&line) {
                    Ok(command) => command,
                    Err(error) => {
                        eprintln!("{error}");
                        continue;
                    }
                };
                match command {
                    ReplCommand::Quit => break,
                    ReplCommand::Help => println!("{}", repl::HELP),
                    ReplCommand::Show => print!("{}", repl::render(&reconciler)),
                    command => match repl::apply(&mut reconciler, &command) {
                        Ok(intents) => {
                            for intent in &intents {
                                send_intent(&mut stream, intent).await?;
                            }
                        }
                        Err(error) => eprintln!("{error}"),
                    },
                }
            }
            event = recv_event(&mut stream) => {
                match event? {
                    RelayEvent::Error { code, message, .. } => eprintln!("relay error {code}: {message}"),
                    event => {
                        if reconciler.apply(&event) {
                            print!("{}", repl::render(&reconciler));
                        }
                    }
                }
            }
        }
    }

    send_intent(&mut stream, &reconciler.leave()).await?;
    stream.close(None).await?;
    Ok(())
}

async fn fetch_board(base_url: &str, board_id: &str) -> Result<BoardView, CliError> {
    let json = api_request(base_url, reqwest::Method::GET, &format!("/api/whiteboard/{board_id}")).await?;
    Ok(serde_json::from_value(json)?)
}

async fn wait_for_connected(stream: &mut WsStream) -> Result<String, CliError> {
    let fut = async {
        loop {
            match recv_event(stream).await? {
                RelayEvent::Connected { session_id } => return Ok(session_id.to_string()),
                RelayEvent::Error { code, message, .. } => return Err(CliError::Relay { code, message }),
                _ => {}
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), fut)
        .await
        .map_err(|_| CliError::Timeout)?
}

async fn recv_event(stream: &mut WsStream) -> Result<RelayEvent, CliError> {
    loop {
        let Some(message) = stream.next().await else {
            return Err(CliError::WsClosed);
        };
        match message? {
            Message::Text(text) => return Ok(RelayEvent::decode(text.as_str())?),
            Message::Close(_) => return Err(CliError::WsClosed),
            _ => {}
        }
    }
}

async fn send_intent(stream: &mut WsStream, intent: &Intent) -> Result<(), CliError> {
    stream.send(Message::Text(intent.encode()?.into())).await?;
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

async fn api_request(base_url: &str, method: reqwest::Method, path: &str) -> Result<Value, CliError> {
    let client = reqwest::Client::new();
    let url = format!("{base_url}{path}");
    let response = client.request(method, &url).send().await?;
    let status = response.status();
    let value = response
        .json::<Value>()
        .await
        .unwrap_or_else(|_| Value::Null);

    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: value.to_string() });
    }
    Ok(value)
}

fn ws_url(base_url: &str) -> Result<String, CliError> {
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/api/ws"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/api/ws"));
    }
    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
