mod command;
mod net;
mod registry;
mod render;
mod room;
mod session;
mod state;
#[cfg(test)]
mod testutil;

use std::net::TcpListener;
use std::thread;

use state::ServerState;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DEFAULT_PORT: u16 = 12346;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    tracing::info!("Server Version: {VERSION}");

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let listener = TcpListener::bind(("0.0.0.0", port))?;
    tracing::info!("Listening on port {port}");

    let state = ServerState::default();
    for socket in listener.incoming() {
        let socket = match socket {
            Ok(socket) => socket,
            Err(error) => {
                tracing::warn!(%error, "accept failed");
                continue;
            }
        };

        let state = state.clone();
        let name = socket
            .peer_addr()
            .map(|addr| format!("client#{}", addr.port()))
            .unwrap_or_else(|_| "client#?".to_owned());
        if let Err(error) = thread::Builder::new()
            .name(name)
            .spawn(move || net::handle_new_connection(state, socket))
        {
            tracing::warn!(%error, "failed to spawn connection thread");
        }
    }

    Ok(())
}
