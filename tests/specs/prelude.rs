//! Shared helpers for the end-to-end specs.

use std::io::{BufRead, BufReader};
use std::net::UdpSocket;
use std::path::PathBuf;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use tempfile::TempDir;

pub use rfs_wire::{
    OperationKind, Request, Response, Status, Value, CALLBACK_REQUEST_ID, MAX_MESSAGE_BYTES,
    UNPARSEABLE_REQUEST_ID,
};

/// Upper bound for condition polling.
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

/// How long a spec waits for a single reply.
const REPLY_WAIT: Duration = Duration::from_secs(2);

/// A spawned daemon with its served root. The process is killed on drop.
pub struct Daemon {
    child: Child,
    port: u16,
    root: PathBuf,
    _dir: TempDir,
}

impl Daemon {
    pub fn at_least_once() -> Daemon {
        Daemon::start(&["-m", "ALO"])
    }

    pub fn at_most_once() -> Daemon {
        Daemon::start(&["-m", "AMO"])
    }

    /// Spawn `rfsd` on an ephemeral port over a fresh served root and wait
    /// for its readiness line. `extra` must include a mode flag.
    pub fn start(extra: &[&str]) -> Daemon {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path().join("served");
        std::fs::create_dir(&root).expect("create served root");
        // Daemon logs land outside the served tree.
        let log = std::fs::File::create(dir.path().join("daemon.log")).expect("create log file");
        let mut child = Command::new(assert_cmd::cargo::cargo_bin("rfsd"))
            .arg("0")
            .arg(&root)
            .args(extra)
            .stdout(Stdio::piped())
            .stderr(Stdio::from(log))
            .spawn()
            .expect("spawn rfsd");
        let stdout = child.stdout.take().expect("daemon stdout");
        let port = read_ready_port(stdout);
        Daemon { child, port, root, _dir: dir }
    }

    pub fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Write a file under the served root.
    pub fn file(&self, name: &str, contents: &[u8]) {
        std::fs::write(self.root.join(name), contents).expect("write served file");
    }

    pub fn mkdir(&self, name: &str) {
        std::fs::create_dir_all(self.root.join(name)).expect("create served directory");
    }

    pub fn read_file(&self, name: &str) -> Vec<u8> {
        std::fs::read(self.root.join(name)).expect("read served file")
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.root.join(name).is_file()
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn read_ready_port(stdout: ChildStdout) -> u16 {
    let mut line = String::new();
    BufReader::new(stdout).read_line(&mut line).expect("read readiness line");
    let port = line
        .trim()
        .strip_prefix("READY port=")
        .unwrap_or_else(|| panic!("unexpected readiness line: {line:?}"));
    port.parse().expect("numeric port in readiness line")
}

/// A raw wire-speaking client socket.
pub struct Client {
    socket: UdpSocket,
    server: String,
}

impl Client {
    pub fn connect(daemon: &Daemon) -> Client {
        let socket = UdpSocket::bind("127.0.0.1:0").expect("bind client socket");
        socket.set_read_timeout(Some(REPLY_WAIT)).expect("set read timeout");
        Client { socket, server: daemon.addr() }
    }

    pub fn send(&self, request: &Request) {
        self.send_raw(&request.encode().expect("encode request"));
    }

    pub fn send_raw(&self, frame: &[u8]) {
        self.socket.send_to(frame, &self.server).expect("send datagram");
    }

    /// Wait for the reply to `id`, skipping anything else.
    pub fn recv(&self, id: i32) -> Response {
        let deadline = Instant::now() + REPLY_WAIT;
        let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
        while Instant::now() < deadline {
            let Ok((len, _)) = self.socket.recv_from(&mut buf) else { continue };
            if let Ok(response) = Response::decode(&buf[..len]) {
                if response.request_id() == id {
                    return response;
                }
            }
        }
        panic!("no reply to request {id} arrived");
    }

    pub fn roundtrip(&self, request: &Request) -> Response {
        self.send(request);
        self.recv(request.id())
    }

    /// Wait for a FILE_UPDATED push.
    pub fn recv_callback(&self) -> Request {
        let deadline = Instant::now() + REPLY_WAIT;
        let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
        while Instant::now() < deadline {
            let Ok((len, _)) = self.socket.recv_from(&mut buf) else { continue };
            if let Ok(update) = Request::decode_callback(&buf[..len]) {
                return update;
            }
        }
        panic!("no callback arrived");
    }

    /// Assert that nothing lands on this socket within `wait`.
    pub fn expect_silence(&self, wait: Duration) {
        let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
        self.socket.set_read_timeout(Some(wait)).expect("set read timeout");
        let outcome = self.socket.recv_from(&mut buf);
        self.socket.set_read_timeout(Some(REPLY_WAIT)).expect("restore read timeout");
        if let Ok((len, _)) = outcome {
            panic!("unexpected datagram arrived: {:?}", &buf[..len]);
        }
    }
}

/// Poll `cond` until it holds or `max_ms` passes.
pub fn wait_for(max_ms: u64, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_millis(max_ms);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(25));
    }
    false
}
