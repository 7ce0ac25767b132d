use std::{
    borrow::Cow,
    io,
    net::TcpStream,
    sync::{
        Arc,
        mpsc::{self, Receiver, Sender, TryRecvError},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use rustls::ClientConfig;
use tungstenite::{
    Message, WebSocket,
    client::IntoClientRequest,
    handshake::HandshakeError,
    protocol::{CloseFrame, frame::coding::CloseCode},
    stream::MaybeTlsStream,
};
use url::Url;

use crate::{
    frame_trace,
    log::log_sink::LogSink,
    protocol::{ClientMessage, Decoded, decode, encode},
    signaling_client::{
        close_code::{ABNORMAL_CLOSURE, NO_STATUS, NORMAL_CLOSURE},
        signaling_client_error::SignalingClientError,
        signaling_command::SignalingCommand,
        signaling_event::SignalingEvent,
    },
    sink_debug, sink_info, sink_trace, sink_warn,
};

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(50);

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// WebSocket signaling connection.
///
/// One network thread owns the socket. It alternates between draining the
/// command queue and reading with a short socket timeout, so outbound frames
/// never wait behind a blocking read.
pub struct SignalingClient {
    cmd_tx: Sender<SignalingCommand>,
    handle: Option<JoinHandle<()>>,
    logger: Arc<dyn LogSink>,
}

impl SignalingClient {
    /// Opens the socket and completes the WebSocket handshake. Returns the
    /// client plus the receiver of inbound events.
    ///
    /// `tls` pins the trust roots for `wss://`; `None` uses the default roots.
    ///
    /// # Errors
    ///
    /// Any failure before the handshake completes: DNS/TCP, TLS or HTTP
    /// upgrade.
    pub fn connect(
        endpoint: &Url,
        tls: Option<Arc<ClientConfig>>,
        read_timeout: Duration,
        logger: Arc<dyn LogSink>,
    ) -> Result<(Self, Receiver<SignalingEvent>), SignalingClientError> {
        let host = endpoint
            .host_str()
            .ok_or_else(|| SignalingClientError::InvalidEndpoint(format!("{endpoint}: no host")))?;
        let port = endpoint
            .port_or_known_default()
            .ok_or_else(|| SignalingClientError::InvalidEndpoint(format!("{endpoint}: no port")))?;

        sink_debug!(logger, "[Signaling] connecting to {}:{}", host, port);
        let stream = TcpStream::connect((host, port))?;
        stream.set_nodelay(true)?;
        // Same socket; kept to adjust the timeout once the handshake is done.
        let raw = stream.try_clone()?;

        let request = endpoint.as_str().into_client_request()?;
        let connector = tls.map(tungstenite::Connector::Rustls);
        let (socket, _response) =
            tungstenite::client_tls_with_config(request, stream, None, connector).map_err(
                |e| match e {
                    HandshakeError::Failure(err) => SignalingClientError::Handshake(err.to_string()),
                    HandshakeError::Interrupted(_) => {
                        SignalingClientError::Handshake("handshake interrupted".into())
                    }
                },
            )?;
        raw.set_read_timeout(Some(read_timeout))?;

        sink_info!(logger, "[Signaling] connected to {}", host);

        let (cmd_tx, cmd_rx) = mpsc::channel::<SignalingCommand>();
        let (ev_tx, ev_rx) = mpsc::channel::<SignalingEvent>();
        let thread_logger = logger.clone();
        let handle = thread::Builder::new()
            .name("room-signaling".into())
            .spawn(move || run_network_loop(socket, &cmd_rx, &ev_tx, thread_logger.as_ref()))?;

        Ok((
            Self {
                cmd_tx,
                handle: Some(handle),
                logger,
            },
            ev_rx,
        ))
    }

    /// Queues one frame for sending.
    ///
    /// # Errors
    ///
    /// [`SignalingClientError::Disconnected`] once the network thread is gone.
    pub fn send(&self, msg: &ClientMessage) -> Result<(), SignalingClientError> {
        sink_trace!(self.logger, "[Signaling] queue {}", msg.type_name());
        self.cmd_tx
            .send(SignalingCommand::Send(msg.clone()))
            .map_err(|_| SignalingClientError::Disconnected)
    }

    /// Sends a close frame with `code` and waits for the network thread.
    /// Idempotent.
    pub fn close(&mut self, code: u16) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        let _ = self.cmd_tx.send(SignalingCommand::Close { code });
        if handle.join().is_err() {
            sink_warn!(self.logger, "[Signaling] network thread panicked");
        }
    }
}

impl Drop for SignalingClient {
    fn drop(&mut self) {
        self.close(NORMAL_CLOSURE);
    }
}

fn run_network_loop(
    mut socket: Socket,
    cmd_rx: &Receiver<SignalingCommand>,
    ev_tx: &Sender<SignalingEvent>,
    logger: &dyn LogSink,
) {
    loop {
        // 1) Outbound: everything queued since the last pass.
        loop {
            match cmd_rx.try_recv() {
                Ok(SignalingCommand::Send(msg)) => {
                    if let Err(e) = write_message(&mut socket, &msg, logger) {
                        sink_warn!(logger, "[Signaling] send {} failed: {}", msg.type_name(), e);
                        let _ = ev_tx.send(SignalingEvent::Closed {
                            code: ABNORMAL_CLOSURE,
                            reason: e.to_string(),
                        });
                        return;
                    }
                }
                Ok(SignalingCommand::Close { code }) => {
                    close_socket(&mut socket, code, logger);
                    return;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    close_socket(&mut socket, NORMAL_CLOSURE, logger);
                    return;
                }
            }
        }

        // 2) Inbound: at most one frame, bounded by the read timeout.
        match socket.read() {
            Ok(Message::Text(text)) => {
                frame_trace!(logger, "[Signaling] <- {}", text);
                let Some(event) = dispatch_text(&text, logger) else {
                    continue;
                };
                if ev_tx.send(event).is_err() {
                    close_socket(&mut socket, NORMAL_CLOSURE, logger);
                    return;
                }
            }
            Ok(Message::Close(frame)) => {
                let (code, reason) = frame.map_or((NO_STATUS, String::new()), |f| {
                    (u16::from(f.code), f.reason.into_owned())
                });
                sink_info!(logger, "[Signaling] server closed ({}) {}", code, reason);
                let _ = ev_tx.send(SignalingEvent::Closed { code, reason });
                return;
            }
            Ok(_) => {}
            Err(tungstenite::Error::Io(e))
                if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {}
            Err(e) => {
                sink_warn!(logger, "[Signaling] connection lost: {}", e);
                let _ = ev_tx.send(SignalingEvent::Closed {
                    code: ABNORMAL_CLOSURE,
                    reason: e.to_string(),
                });
                return;
            }
        }
    }
}

fn write_message(
    socket: &mut Socket,
    msg: &ClientMessage,
    logger: &dyn LogSink,
) -> Result<(), SignalingClientError> {
    let text = encode(msg)?;
    frame_trace!(logger, "[Signaling] -> {}", text);
    socket.send(Message::Text(text))?;
    Ok(())
}

fn close_socket(socket: &mut Socket, code: u16, logger: &dyn LogSink) {
    let frame = CloseFrame {
        code: CloseCode::from(code),
        reason: Cow::Borrowed(""),
    };
    match socket.close(Some(frame)).and_then(|()| socket.flush()) {
        Ok(()) | Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {}
        Err(e) => sink_warn!(logger, "[Signaling] close({}) not delivered: {}", code, e),
    }
}

/// Text frame -> event. Parse failures are logged and dropped.
fn dispatch_text(text: &str, logger: &dyn LogSink) -> Option<SignalingEvent> {
    match decode(text) {
        Ok(Decoded::Message(msg)) => Some(SignalingEvent::Message(msg)),
        Ok(Decoded::Unrecognized(kind)) => Some(SignalingEvent::Unrecognized(kind)),
        Err(e) => {
            sink_warn!(logger, "[Signaling] dropping malformed frame: {}", e);
            None
        }
    }
}
