//! `client <host> <port> <name>`: connects to a Fish tournament server and
//! plays until the socket closes, answering placement and movement requests
//! with `fish_strategy`'s minimax search.
//!
//! The wire protocol is symmetric with `fish_remote::proxy::PlayerProxy` —
//! that type drives this exact exchange from the server's side of the
//! socket — but here we're on the client end, so everything is read before
//! it's written rather than the other way around.

use std::io::Write;
use std::net::TcpStream;

use clap::Parser;
use flexi_logger::Logger;
use serde_json::{json, Value};

use fish_engine::json::JsonStream;
use fish_engine::state::Phase;
use fish_remote::wire::{action_to_wire, coord_to_wire, state_from_wire, WireState};

/// How many of the maximizer's own moves ahead to search on each request.
const LOOK_AHEAD_PLIES: u32 = 2;

#[derive(Parser, Debug)]
#[command(name = "client", about = "Connect to a Fish tournament server")]
struct Args {
    host: String,
    port: u16,
    /// 1..=12 characters; the server drops connections whose name doesn't
    /// fit that window.
    name: String,

    #[arg(long, default_value_t = String::from("info"))]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _logger = Logger::try_with_env_or_str(&args.log_level)?.log_to_stderr().start()?;

    let mut stream = TcpStream::connect((args.host.as_str(), args.port))?;
    stream.write_all(serde_json::to_string(&args.name)?.as_bytes())?;

    let reader = stream.try_clone()?;
    let mut incoming = JsonStream::new(reader);

    loop {
        let message = match incoming.next_value() {
            Some(Ok(v)) => v,
            Some(Err(e)) => {
                log::warn!("malformed message from server: {}", e);
                break;
            }
            None => {
                log::info!("server closed the connection");
                break;
            }
        };
        let Some((method, args_val)) = split_call(&message) else {
            log::warn!("unexpected message shape: {}", message);
            break;
        };
        let reply = handle_call(&method, &args_val);
        stream.write_all(serde_json::to_string(&reply)?.as_bytes())?;
        if method == "end" {
            break;
        }
    }
    Ok(())
}

fn split_call(message: &Value) -> Option<(String, Value)> {
    let arr = message.as_array()?;
    let method = arr.first()?.as_str()?.to_string();
    let args = arr.get(1)?.clone();
    Some((method, args))
}

/// Every call is acknowledged with the literal string `"void"` except
/// `setup` (a coordinate) and `take-turn` (an action).
fn handle_call(method: &str, args: &Value) -> Value {
    match method {
        "setup" => handle_setup(args).unwrap_or_else(|e| {
            log::warn!("failed to answer setup: {}", e);
            json!("void")
        }),
        "take-turn" => handle_take_turn(args).unwrap_or_else(|e| {
            log::warn!("failed to answer take-turn: {}", e);
            json!("void")
        }),
        _ => json!("void"),
    }
}

fn handle_setup(args: &Value) -> anyhow::Result<Value> {
    let wire: WireState = serde_json::from_value(args.get(0).cloned().unwrap_or(Value::Null))?;
    let state = state_from_wire(&wire, Phase::PlacePenguins).map_err(|e| anyhow::anyhow!("{}", e))?;
    let coord = fish_strategy::find_next_placement(&state).map_err(|e| anyhow::anyhow!("{}", e))?;
    Ok(json!(coord_to_wire(coord)))
}

fn handle_take_turn(args: &Value) -> anyhow::Result<Value> {
    let wire: WireState = serde_json::from_value(args.get(0).cloned().unwrap_or(Value::Null))?;
    let state = state_from_wire(&wire, Phase::MovePenguins).map_err(|e| anyhow::anyhow!("{}", e))?;
    let action = fish_strategy::find_next_move(&state, LOOK_AHEAD_PLIES)
        .ok_or_else(|| anyhow::anyhow!("no legal move available"))?;
    Ok(json!(action_to_wire(action)))
}
