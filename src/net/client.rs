//! Relay client
//!
//! Incoming commands are applied straight to the shared stage from a tokio
//! task, concurrently with the simulation thread. Commands for the local tank
//! are dropped: the relay never echoes our own lines, but a second client for
//! the same tank would, and local state is authoritative for it.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::protocol::{parse_client_number, parse_team};
use crate::error::NetError;
use crate::sim::{Applied, Command, EntityId, Stage, Team};

pub type Incoming = Lines<BufReader<OwnedReadHalf>>;

/// A connection that finished the handshake
pub struct Connection {
    client_number: usize,
    team: Team,
    incoming: Incoming,
    outgoing: OwnedWriteHalf,
}

/// Connect to a relay and run the handshake
pub async fn connect(addr: impl ToSocketAddrs, name: &str) -> Result<Connection, NetError> {
    let stream = TcpStream::connect(addr).await?;
    let (read, mut outgoing) = stream.into_split();
    let mut incoming = BufReader::new(read).lines();

    let line = incoming.next_line().await?.ok_or(NetError::Closed)?;
    let client_number = parse_client_number(&line)?;
    outgoing
        .write_all(format!("{}\n", name.trim()).as_bytes())
        .await?;
    let line = incoming.next_line().await?.ok_or(NetError::Closed)?;
    let team = parse_team(&line)?;

    log::info!("connected as client {client_number} ({})", team.as_str());
    Ok(Connection {
        client_number,
        team,
        incoming,
        outgoing,
    })
}

impl Connection {
    pub fn client_number(&self) -> usize {
        self.client_number
    }

    pub fn team(&self) -> Team {
        self.team
    }

    /// Start applying remote commands to `stage` and return a sender for ours
    pub fn start(
        self,
        stage: Arc<Stage>,
        local_tank: Option<EntityId>,
    ) -> (CommandSender, JoinHandle<u64>) {
        let receiver = spawn_receiver(self.incoming, stage, local_tank);
        (CommandSender::spawn(self.outgoing), receiver)
    }
}

/// Apply every well-formed incoming line to `stage`
///
/// Resolves to the number of commands applied once the connection ends.
pub fn spawn_receiver(
    mut incoming: Incoming,
    stage: Arc<Stage>,
    local_tank: Option<EntityId>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut applied = 0u64;
        loop {
            let line = match incoming.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    log::info!("relay closed the connection");
                    break;
                }
                Err(e) => {
                    log::warn!("connection lost: {e}");
                    break;
                }
            };
            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(e) => {
                    log::warn!("ignoring line `{line}`: {e}");
                    continue;
                }
            };
            if Some(command.tank()) == local_tank {
                log::debug!("suppressed echo `{line}`");
                continue;
            }
            if stage.apply(&command) != Applied::Missing {
                applied += 1;
            }
        }
        applied
    })
}

/// Queues local commands for the writer task
///
/// Sending never blocks, so it is safe from the simulation thread.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::UnboundedSender<Command>,
}

impl CommandSender {
    fn spawn(mut outgoing: OwnedWriteHalf) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Command>();
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                let line = format!("{command}\n");
                if let Err(e) = outgoing.write_all(line.as_bytes()).await {
                    log::warn!("failed to send `{command}`: {e}");
                    break;
                }
            }
        });
        Self { tx }
    }

    pub fn send(&self, command: Command) -> Result<(), NetError> {
        self.tx.send(command).map_err(|_| NetError::Closed)
    }
}
