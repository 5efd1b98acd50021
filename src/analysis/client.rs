//! TCP line client for the analysis service
//!
//! The socket lives on a dedicated thread running a current-thread tokio
//! runtime. Callers talk to it through a request channel and wait for replies
//! on a bounded std channel, so the game loop never touches the socket.

use std::sync::mpsc::{self as std_mpsc, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::wire::{Inbound, Outbound, decode_line, encode_line};
use super::{AnalysisError, AnalysisResult, Analyzer, TelemetryFrame};
use crate::platform::time::unix_millis;

/// Extra wait on the caller side beyond the worker's own timeout
const REPLY_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy)]
pub struct ClientTimeouts {
    pub connect: Duration,
    pub ping: Duration,
    pub analysis: Duration,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_millis(2000),
            ping: Duration::from_millis(2000),
            analysis: Duration::from_millis(5000),
        }
    }
}

enum Request {
    Ping(SyncSender<bool>),
    State(TelemetryFrame),
    Analyze(u32, SyncSender<Option<AnalysisResult>>),
}

pub struct AnalysisClient {
    tx: Option<UnboundedSender<Request>>,
    timeouts: ClientTimeouts,
    worker: Option<JoinHandle<()>>,
}

impl AnalysisClient {
    /// Connect to `addr` (host:port). Fails if the service cannot be reached
    /// within the connect timeout.
    pub fn connect(addr: &str, timeouts: ClientTimeouts) -> Result<Self, AnalysisError> {
        let (tx, rx) = unbounded_channel();
        let (ready_tx, ready_rx) = std_mpsc::sync_channel(1);
        let addr = addr.to_string();

        let worker = thread::Builder::new()
            .name("analysis-client".into())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        let _ = ready_tx.send(Err(AnalysisError::Io(e)));
                        return;
                    }
                };

                runtime.block_on(async move {
                    let stream =
                        match tokio::time::timeout(timeouts.connect, TcpStream::connect(&addr))
                            .await
                        {
                            Ok(Ok(stream)) => stream,
                            Ok(Err(e)) => {
                                let _ = ready_tx.send(Err(AnalysisError::Io(e)));
                                return;
                            }
                            Err(_) => {
                                let _ = ready_tx.send(Err(AnalysisError::Timeout("connect")));
                                return;
                            }
                        };
                    let _ = ready_tx.send(Ok(()));
                    log::info!("Connected to analysis service at {}", addr);

                    serve(stream, rx, timeouts).await;
                    log::debug!("Analysis client worker stopped");
                });
            })?;

        match ready_rx.recv_timeout(timeouts.connect + REPLY_GRACE) {
            Ok(Ok(())) => Ok(Self {
                tx: Some(tx),
                timeouts,
                worker: Some(worker),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(AnalysisError::Timeout("connect")),
        }
    }

    /// Worker still holds an open connection
    pub fn is_connected(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }

    fn submit(&self, request: Request) -> bool {
        match &self.tx {
            Some(tx) => tx.send(request).is_ok(),
            None => false,
        }
    }
}

impl Analyzer for AnalysisClient {
    fn ping(&self) -> bool {
        let (reply_tx, reply_rx) = std_mpsc::sync_channel(1);
        if !self.submit(Request::Ping(reply_tx)) {
            return false;
        }
        reply_rx
            .recv_timeout(self.timeouts.ping + REPLY_GRACE)
            .unwrap_or(false)
    }

    fn send_state(&self, frame: TelemetryFrame) {
        if !self.submit(Request::State(frame)) {
            log::debug!("Analysis service not connected, telemetry dropped");
        }
    }

    fn request_analysis(&self, sample_size: u32) -> Option<AnalysisResult> {
        let (reply_tx, reply_rx) = std_mpsc::sync_channel(1);
        if !self.submit(Request::Analyze(sample_size, reply_tx)) {
            return None;
        }
        reply_rx
            .recv_timeout(self.timeouts.analysis + REPLY_GRACE)
            .ok()
            .flatten()
    }
}

impl Drop for AnalysisClient {
    fn drop(&mut self) {
        // Closing the request channel ends the worker
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("Analysis client worker panicked");
            }
        }
    }
}

/// Reply kinds a request waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Pong,
    Analysis,
}

impl Reply {
    fn stage(self) -> &'static str {
        match self {
            Reply::Pong => "ping",
            Reply::Analysis => "analysis",
        }
    }
}

struct Connection {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    /// Replies still owed to requests that timed out. The service answers in
    /// order, so the next ones of that kind belong to them.
    late_pongs: u32,
    late_results: u32,
}

impl Connection {
    fn new(stream: TcpStream) -> Self {
        let (read_half, writer) = stream.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
            late_pongs: 0,
            late_results: 0,
        }
    }

    async fn send(&mut self, message: &Outbound) -> Result<(), AnalysisError> {
        let line = encode_line(message)?;
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read lines until one satisfies `wanted`, skipping acks, strays and
    /// replies owed to earlier timed-out requests
    async fn wait_for<T>(
        &mut self,
        kind: Reply,
        limit: Duration,
        mut wanted: impl FnMut(Inbound) -> Option<T>,
    ) -> Result<T, AnalysisError> {
        let Self {
            lines,
            late_pongs,
            late_results,
            ..
        } = self;
        let late = match kind {
            Reply::Pong => late_pongs,
            Reply::Analysis => late_results,
        };

        let read = async {
            loop {
                let line = match lines.next_line().await {
                    Ok(Some(line)) => line,
                    Ok(None) => return Err(AnalysisError::Disconnected),
                    Err(e) => return Err(AnalysisError::Io(e)),
                };
                match decode_line(&line) {
                    Ok(Inbound::GameStateAck) => continue,
                    Ok(message) => match wanted(message) {
                        Some(_) if *late > 0 => {
                            *late -= 1;
                            log::debug!("Discarding late {} reply", kind.stage());
                        }
                        Some(value) => return Ok(value),
                        None => log::debug!(
                            "Skipping unexpected reply while waiting for {}",
                            kind.stage()
                        ),
                    },
                    Err(e) => log::warn!("Ignoring bad line from analysis service: {}", e),
                }
            }
        };

        let outcome = tokio::time::timeout(limit, read).await;
        match outcome {
            Ok(result) => result,
            Err(_) => {
                *late += 1;
                Err(AnalysisError::Timeout(kind.stage()))
            }
        }
    }

    async fn ping(&mut self, limit: Duration) -> Result<bool, AnalysisError> {
        self.send(&Outbound::Ping {
            timestamp: unix_millis(),
        })
        .await?;
        self.wait_for(Reply::Pong, limit, |m| match m {
            Inbound::Pong => Some(true),
            _ => None,
        })
        .await
    }

    async fn analyze(
        &mut self,
        sample_size: u32,
        limit: Duration,
    ) -> Result<AnalysisResult, AnalysisError> {
        self.send(&Outbound::RequestAnalysis {
            timestamp: unix_millis(),
            data_points: sample_size,
        })
        .await?;
        self.wait_for(Reply::Analysis, limit, |m| match m {
            Inbound::AnalysisResult(result) => Some(result),
            _ => None,
        })
        .await
    }
}

async fn serve(stream: TcpStream, mut rx: UnboundedReceiver<Request>, timeouts: ClientTimeouts) {
    let mut conn = Connection::new(stream);

    while let Some(request) = rx.recv().await {
        let outcome = match request {
            Request::Ping(reply) => match conn.ping(timeouts.ping).await {
                Ok(alive) => {
                    let _ = reply.send(alive);
                    Ok(())
                }
                Err(e) => {
                    let _ = reply.send(false);
                    Err(e)
                }
            },
            Request::State(frame) => {
                conn.send(&Outbound::GameState {
                    timestamp: unix_millis(),
                    data: frame,
                })
                .await
            }
            Request::Analyze(sample_size, reply) => {
                match conn.analyze(sample_size, timeouts.analysis).await {
                    Ok(result) => {
                        let _ = reply.send(Some(result));
                        Ok(())
                    }
                    Err(e) => {
                        let _ = reply.send(None);
                        Err(e)
                    }
                }
            }
        };

        match outcome {
            Ok(()) => {}
            Err(AnalysisError::Disconnected) | Err(AnalysisError::Io(_)) => {
                log::warn!("Analysis service connection lost");
                break;
            }
            Err(e) => log::warn!("Analysis service: {}", e),
        }
    }
}
