//! Relay server
//!
//! Accepts up to `max_connections` peers, runs the handshake, then copies
//! every line a peer sends to all other connected peers unchanged.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinHandle;

use super::protocol::{client_number_line, team_for_client};
use crate::error::NetError;

/// Lines waiting for a slow peer before it starts missing some
const BACKLOG: usize = 1024;

/// A relayed line tagged with the connection that sent it
type Relayed = (usize, Arc<str>);

pub struct Relay {
    listener: TcpListener,
    slots: Arc<Semaphore>,
    next_client: Arc<AtomicUsize>,
    lines: broadcast::Sender<Relayed>,
}

impl Relay {
    pub async fn bind(addr: impl ToSocketAddrs, max_connections: usize) -> Result<Self, NetError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::from_listener(listener, max_connections))
    }

    pub fn from_listener(listener: TcpListener, max_connections: usize) -> Self {
        let (lines, _) = broadcast::channel(BACKLOG);
        Self {
            listener,
            slots: Arc::new(Semaphore::new(max_connections)),
            next_client: Arc::new(AtomicUsize::new(0)),
            lines,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, NetError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept peers until the listener fails
    pub async fn run(self) -> Result<(), NetError> {
        log::info!("relay listening on {}", self.local_addr()?);
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let Ok(slot) = Arc::clone(&self.slots).try_acquire_owned() else {
                log::warn!("relay full, refusing {peer}");
                drop(stream);
                continue;
            };
            let client = self.next_client.fetch_add(1, Ordering::SeqCst);
            // Subscribe before the handshake so nothing sent meanwhile is lost
            let rx = self.lines.subscribe();
            let tx = self.lines.clone();
            tokio::spawn(async move {
                match serve(stream, client, tx, rx).await {
                    Ok(()) => log::info!("client {client} ({peer}) disconnected"),
                    Err(e) => log::warn!("client {client} ({peer}) dropped: {e}"),
                }
                drop(slot);
            });
        }
    }

    pub fn spawn(self) -> JoinHandle<Result<(), NetError>> {
        tokio::spawn(self.run())
    }
}

async fn serve(
    stream: TcpStream,
    client: usize,
    tx: broadcast::Sender<Relayed>,
    mut rx: broadcast::Receiver<Relayed>,
) -> Result<(), NetError> {
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    write
        .write_all(format!("{}\n", client_number_line(client)).as_bytes())
        .await?;
    let name = lines.next_line().await?.ok_or(NetError::Closed)?;
    let team = team_for_client(client);
    write
        .write_all(format!("{}\n", team.as_str()).as_bytes())
        .await?;
    log::info!("client {client} `{}` joined as {}", name.trim(), team.as_str());

    loop {
        tokio::select! {
            incoming = lines.next_line() => {
                match incoming? {
                    Some(line) => {
                        // No receivers just means nobody else is connected
                        let _ = tx.send((client, Arc::from(line)));
                    }
                    None => return Ok(()),
                }
            }
            outgoing = rx.recv() => {
                match outgoing {
                    Ok((from, line)) if from != client => {
                        write.write_all(line.as_bytes()).await?;
                        write.write_all(b"\n").await?;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        log::warn!("client {client} lagged, {n} lines skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return Ok(()),
                }
            }
        }
    }
}
