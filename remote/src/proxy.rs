//! A `Player` implementation that forwards every call across a TCP socket
//! as a `[method, args]` JSON message, per the remote protocol.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use serde_json::{json, Value};

use fish_admin::{Player, PlayerFailure};
use fish_engine::coord::Coord;
use fish_engine::state::{Action, GameState, PlayerColor};

use crate::errors::ProtocolError;
use crate::wire::{action_from_wire, action_to_wire, color_name, coord_from_wire, state_to_wire};

const EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);
const READ_BUFFER: usize = 1 << 16;

pub struct PlayerProxy {
    name: String,
    stream: TcpStream,
}

impl PlayerProxy {
    /// Reads the client's opening name message and wraps the socket if the
    /// name is acceptable (length 1..=12). The accept loop drops the
    /// connection on any error without counting it, but logs which of the
    /// two ways it failed.
    pub fn accept(mut stream: TcpStream) -> Result<PlayerProxy, ProtocolError> {
        stream.set_read_timeout(Some(EXCHANGE_TIMEOUT)).map_err(|_| ProtocolError::Timeout)?;
        let mut buf = [0u8; 1024];
        let n = stream.read(&mut buf).map_err(|_| ProtocolError::Timeout)?;
        if n == 0 {
            return Err(ProtocolError::Timeout);
        }
        let raw = String::from_utf8_lossy(&buf[..n]);
        let name = serde_json::from_str::<String>(raw.trim()).unwrap_or_else(|_| raw.trim().to_string());
        if name.is_empty() || name.len() > 12 {
            return Err(ProtocolError::UnacceptableName);
        }
        Ok(PlayerProxy { name, stream })
    }

    fn exchange(&mut self, method: &str, args: Value) -> Result<Value, PlayerFailure> {
        let message = json!([method, args]);
        let bytes = serde_json::to_vec(&message).map_err(|_| PlayerFailure)?;
        self.stream.write_all(&bytes).map_err(|_| PlayerFailure)?;
        self.stream.set_read_timeout(Some(EXCHANGE_TIMEOUT)).map_err(|_| PlayerFailure)?;
        let mut buf = vec![0u8; READ_BUFFER];
        let n = self.stream.read(&mut buf).map_err(|e| self.fail(ProtocolError::Timeout, &e.to_string()))?;
        if n == 0 {
            return Err(self.fail(ProtocolError::Timeout, "connection closed"));
        }
        serde_json::from_slice(&buf[..n]).map_err(|e| self.fail(ProtocolError::Malformed, &e.to_string()))
    }

    fn fail(&self, reason: ProtocolError, detail: &str) -> PlayerFailure {
        log::warn!("{}: {} ({})", self.name, reason, detail);
        PlayerFailure
    }

    fn exchange_void(&mut self, method: &str, args: Value) -> bool {
        matches!(self.exchange(method, args), Ok(Value::String(s)) if s == "void")
    }
}

impl Player for PlayerProxy {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> bool {
        self.exchange_void("start", json!([true]))
    }

    fn playing_as(&mut self, color: PlayerColor) -> bool {
        self.exchange_void("playing-as", json!([color_name(color)]))
    }

    fn playing_with(&mut self, opponents: &[PlayerColor]) -> bool {
        let names: Vec<String> = opponents.iter().copied().map(color_name).collect();
        self.exchange_void("playing-with", json!([names]))
    }

    fn setup(&mut self, state: &GameState) -> Result<Coord, PlayerFailure> {
        let wire = state_to_wire(state);
        let reply = self.exchange("setup", json!([wire]))?;
        let pair: [i64; 2] = serde_json::from_value(reply).map_err(|_| PlayerFailure)?;
        Ok(coord_from_wire(pair))
    }

    fn take_turn(&mut self, state: &GameState, previous_actions: &[Action]) -> Result<Action, PlayerFailure> {
        let wire = state_to_wire(state);
        let prev: Vec<[[i64; 2]; 2]> = previous_actions.iter().copied().map(action_to_wire).collect();
        let reply = self.exchange("take-turn", json!([wire, prev]))?;
        let pair: [[i64; 2]; 2] = serde_json::from_value(reply).map_err(|_| PlayerFailure)?;
        Ok(action_from_wire(pair))
    }

    fn end(&mut self, is_winner: bool) -> bool {
        self.exchange_void("end", json!([is_winner]))
    }
}
