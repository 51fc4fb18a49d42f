//! Single-threaded HTTP listener.
//!
//! One connection is accepted, read once, answered and closed before the
//! next is accepted. Pulses and probes therefore never overlap. A failure
//! on one connection is logged and the loop carries on; only a bind
//! failure stops the service.

use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use smol_str::SmolStr;
use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info, warn};

use crate::config::{ConfigStore, DriverIoConfig, LOGO_FILE};
use crate::error::RemoteError;
use crate::executor::ActionExecutor;
use crate::gate::PasscodeGate;
use crate::io::backend_from_settings;
use crate::logo::Logo;
use crate::probe::TcpProbe;
use crate::pulse::PulseActuator;
use crate::render::render;
use crate::request::{Request, READ_CAP};
use crate::router::route;
use crate::settings::{ServerSettings, Settings};

/// Pending connections queued while one request is being handled.
pub const LISTEN_BACKLOG: i32 = 5;

/// Pause after a failed `accept` so a persistent failure does not spin.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Configuration loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RemoteContext {
    /// Driver IO connection details and passcode.
    pub config: DriverIoConfig,
    /// Optional dashboard logo.
    pub logo: Option<Logo>,
}

impl RemoteContext {
    /// Load the Driver IO config and logo from the store.
    #[must_use]
    pub fn load(store: &ConfigStore) -> Self {
        Self {
            config: store.load(),
            logo: Logo::load(store.path(LOGO_FILE)),
        }
    }
}

/// Listener state. `Handling` only lasts for one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Waiting in `accept`.
    Idle,
    /// Processing one connection.
    Handling,
}

/// The HTTP listener and everything it drives.
#[derive(Debug)]
pub struct Server {
    listener: TcpListener,
    context: RemoteContext,
    gate: PasscodeGate,
    executor: ActionExecutor,
    read_timeout: Option<Duration>,
    state: ListenerState,
}

impl Server {
    /// Bind the listener. A bind failure is a startup error.
    pub fn bind(
        settings: &ServerSettings,
        context: RemoteContext,
        executor: ActionExecutor,
    ) -> Result<Self, RemoteError> {
        let listener = bind_listener(settings.listen).map_err(|err| RemoteError::Bind {
            addr: SmolStr::new(settings.listen.to_string()),
            reason: SmolStr::new(err.to_string()),
        })?;
        let gate = PasscodeGate::new(context.config.passcode.as_deref());
        if settings.read_timeout.is_none() {
            debug!("request reads are unbounded; a silent client stalls the listener");
        }
        Ok(Self {
            listener,
            context,
            gate,
            executor,
            read_timeout: settings.read_timeout,
            state: ListenerState::Idle,
        })
    }

    /// Bind with the GPIO backend, pulse lines and probe taken from settings.
    pub fn from_settings(settings: &Settings, context: RemoteContext) -> Result<Self, RemoteError> {
        let actuator = PulseActuator::new(backend_from_settings(&settings.gpio));
        let probe = TcpProbe::from_settings(&settings.probe);
        let executor = ActionExecutor::new(actuator, Box::new(probe)).with_lines(&settings.gpio);
        Self::bind(&settings.server, context, executor)
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, RemoteError> {
        self.listener
            .local_addr()
            .map_err(|err| RemoteError::Transport(format!("local address: {err}").into()))
    }

    /// Current listener state.
    #[must_use]
    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Serve forever.
    pub fn run(mut self) -> ! {
        if let Ok(addr) = self.local_addr() {
            info!(%addr, "web server running");
        }
        loop {
            if let Err(err) = self.accept_one() {
                warn!(%err, "error handling request");
            }
        }
    }

    /// Accept and handle exactly one connection.
    ///
    /// Returns the per-connection transport error, if any. The listener is
    /// back in [`ListenerState::Idle`] whichever way this returns. A failed
    /// `accept` returns after [`ACCEPT_BACKOFF`].
    pub fn accept_one(&mut self) -> Result<(), RemoteError> {
        let (stream, peer) = self.listener.accept().map_err(accept_failed)?;
        self.state = ListenerState::Handling;
        let result = self.handle_connection(stream, peer);
        self.state = ListenerState::Idle;
        result
    }

    /// Route, authorize, execute and render one parsed request.
    pub fn respond(&mut self, request: &Request) -> String {
        let action = route(request.path());
        let gate_passed = action.is_privileged() && self.gate.verify(request.passcode());
        let outcome = self
            .executor
            .execute(action, gate_passed, &self.context.config);
        debug!(?outcome, "action finished");
        render(&outcome, self.context.logo.as_ref())
    }

    fn handle_connection(&mut self, mut stream: TcpStream, peer: SocketAddr) -> Result<(), RemoteError> {
        info!(%peer, "connection");
        let transport = |what: &str, err: std::io::Error| {
            RemoteError::Transport(format!("{what} {peer}: {err}").into())
        };

        stream
            .set_read_timeout(self.read_timeout)
            .map_err(|err| transport("set read timeout", err))?;
        let mut buffer = [0_u8; READ_CAP];
        let len = stream
            .read(&mut buffer)
            .map_err(|err| transport("read", err))?;
        let request = Request::parse(&buffer[..len]);
        info!(%peer, method = request.method(), path = request.path(), "request");

        let body = self.respond(&request);
        write_response(&mut stream, &body).map_err(|err| transport("write", err))?;
        let _ = stream.shutdown(Shutdown::Both);
        Ok(())
    }
}

fn bind_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    Ok(socket.into())
}

fn accept_failed(err: std::io::Error) -> RemoteError {
    thread::sleep(ACCEPT_BACKOFF);
    RemoteError::Transport(format!("accept: {err}").into())
}

fn write_response(stream: &mut TcpStream, body: &str) -> std::io::Result<()> {
    let head = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    stream.write_all(head.as_bytes())?;
    stream.write_all(body.as_bytes())?;
    stream.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{LoopbackBackend, PinLog};
    use crate::probe::{ProbeResult, ReachabilityProbe};

    struct Unreachable;

    impl ReachabilityProbe for Unreachable {
        fn probe(&self, _host: &str) -> ProbeResult {
            ProbeResult { reachable: false }
        }
    }

    fn server(passcode: Option<&str>) -> (Server, PinLog) {
        let log = PinLog::default();
        let actuator = PulseActuator::new(Box::new(LoopbackBackend::with_log(log.clone())));
        let executor = ActionExecutor::new(actuator, Box::new(Unreachable));
        let context = RemoteContext {
            config: DriverIoConfig {
                passcode: passcode.map(Into::into),
                ..DriverIoConfig::default()
            },
            logo: None,
        };
        let settings = ServerSettings {
            listen: SocketAddr::from(([127, 0, 0, 1], 0)),
            read_timeout: Some(Duration::from_secs(2)),
        };
        (Server::bind(&settings, context, executor).expect("bind"), log)
    }

    #[test]
    fn wrong_passcode_is_denied_without_side_effects() {
        let (mut server, log) = server(Some("123456"));
        let page = server.respond(&Request::parse(b"GET /reboot?passcode=000000 HTTP/1.1\r\n"));
        assert!(page.contains("ACCESS DENIED"));
        assert!(log.is_empty());
    }

    #[test]
    fn missing_ip_renders_offline() {
        let (mut server, log) = server(Some("123456"));
        let page = server.respond(&Request::parse(b"GET /status?passcode=123456 HTTP/1.1\r\n"));
        assert!(page.contains("Driver IO is OFFLINE"));
        assert!(log.is_empty());
    }

    #[test]
    fn bind_conflict_is_startup_error() {
        let (server, _) = server(None);
        let taken = server.local_addr().expect("addr");
        let settings = ServerSettings {
            listen: taken,
            read_timeout: None,
        };
        let actuator = PulseActuator::new(Box::new(LoopbackBackend::default()));
        let executor = ActionExecutor::new(actuator, Box::new(Unreachable));
        let err = Server::bind(&settings, RemoteContext::default(), executor).unwrap_err();
        assert!(matches!(err, RemoteError::Bind { .. }));
        assert!(err.is_startup());
    }

    #[test]
    fn listener_accepts_after_bind() {
        let (mut server, _) = server(None);
        let addr = server.local_addr().expect("addr");
        let client = std::thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).expect("connect");
            stream.write_all(b"GET / HTTP/1.1\r\n\r\n").expect("send");
            let mut response = String::new();
            stream.read_to_string(&mut response).expect("read");
            response
        });
        server.accept_one().expect("serve");
        let response = client.join().expect("client");
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert_eq!(LISTEN_BACKLOG, 5);
    }

    #[test]
    fn accept_failure_backs_off() {
        let started = std::time::Instant::now();
        let err = accept_failed(std::io::Error::from(std::io::ErrorKind::Other));
        assert!(started.elapsed() >= ACCEPT_BACKOFF);
        assert!(matches!(err, RemoteError::Transport(_)));
        assert!(!err.is_startup());
    }

    #[test]
    fn starts_idle() {
        let (server, _) = server(None);
        assert_eq!(server.state(), ListenerState::Idle);
    }
}
