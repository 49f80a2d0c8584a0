//! `server <port>`: binds a TCP listener, accepts remote players for up to
//! two 30s windows, and runs a tournament over whoever showed up.

use std::net::TcpListener;
use std::process::ExitCode;

use clap::Parser;
use flexi_logger::Logger;

use fish_admin::{Competitor, Manager, Player};
use fish_remote::accept_players;

/// A hex board sized to comfortably hold the `penguins_per_player` quota for
/// anywhere from two to four players.
const BOARD_ROWS: usize = 5;
const BOARD_COLS: usize = 5;
const FISH_PER_TILE: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "server", about = "Run a Fish tournament server")]
struct Args {
    /// TCP port to listen on.
    port: u16,

    #[arg(long, default_value_t = String::from("info"))]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _logger = Logger::try_with_env_or_str(&args.log_level)
        .expect("invalid log level")
        .log_to_stderr()
        .start()
        .expect("failed to start logger");

    let listener = match TcpListener::bind(("0.0.0.0", args.port)) {
        Ok(l) => l,
        Err(e) => {
            log::error!("failed to bind port {}: {}", args.port, e);
            return ExitCode::FAILURE;
        }
    };

    let proxies = accept_players(&listener);
    if proxies.is_empty() {
        log::error!("tournament aborted: not enough clients connected");
        return ExitCode::FAILURE;
    }

    let pool: Vec<Competitor> = proxies
        .into_iter()
        .enumerate()
        .map(|(age, proxy)| Competitor {
            age: age as u32,
            player: Box::new(proxy) as Box<dyn Player>,
        })
        .collect();

    let mut manager = Manager::new(BOARD_ROWS, BOARD_COLS, FISH_PER_TILE);
    let report = match manager.run_tournament(pool) {
        Ok(r) => r,
        Err(e) => {
            log::error!("tournament failed to run: {}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("{} winner(s), {} cheater(s)", report.winners.len(), report.cheaters.len());
    log::info!("winners: {:?}", report.winners);
    log::info!("losers: {:?}", report.losers);
    log::info!("cheaters: {:?}", report.cheaters);

    ExitCode::SUCCESS
}
