//! Subscription and callback specs
//!
//! REGISTER handshakes, FILE_UPDATED pushes across sockets, and interval
//! expiry, all through real datagrams.

use std::time::Duration;

use serial_test::serial;

use crate::prelude::*;

#[test]
fn updates_reach_a_registered_watcher() {
    let daemon = Daemon::at_least_once();
    daemon.file("watched.txt", b"v1");
    let watcher = Client::connect(&daemon);
    let writer = Client::connect(&daemon);

    let ack = watcher.roundtrip(&Request::register(1, 60_000, "watched.txt"));
    assert_eq!(ack.status(), Status::Ok);

    let reply = writer.roundtrip(&Request::append(2, "watched.txt", b" v2"));
    assert_eq!(reply.status(), Status::Ok);

    let update = watcher.recv_callback();
    assert_eq!(update.id(), CALLBACK_REQUEST_ID);
    assert_eq!(update.kind(), OperationKind::FileUpdated);
    assert_eq!(update.text_param(0).unwrap(), "watched.txt");
    assert!(update.i64_param(1).unwrap() > 0);
    assert_eq!(update.bytes_param(2).unwrap(), b"v1 v2");
}

#[test]
fn updates_to_other_files_are_not_pushed() {
    let daemon = Daemon::at_least_once();
    daemon.file("watched.txt", b"v1");
    daemon.file("other.txt", b"v1");
    let watcher = Client::connect(&daemon);
    let writer = Client::connect(&daemon);

    watcher.roundtrip(&Request::register(1, 60_000, "watched.txt"));
    writer.roundtrip(&Request::append(2, "other.txt", b"!"));

    watcher.expect_silence(Duration::from_millis(300));
}

/// The registered spelling and the mutating spelling differ but normalize
/// to the same file, so the callback still fires.
#[test]
fn path_spellings_are_unified() {
    let daemon = Daemon::at_least_once();
    daemon.file("watched.txt", b"v1");
    let watcher = Client::connect(&daemon);
    let writer = Client::connect(&daemon);

    watcher.roundtrip(&Request::register(1, 60_000, "./watched.txt"));
    writer.roundtrip(&Request::append(2, "sub/../watched.txt", b"!"));

    let update = watcher.recv_callback();
    assert_eq!(update.text_param(0).unwrap(), "watched.txt");
}

#[test]
#[serial]
fn subscriptions_expire_after_the_interval() {
    let daemon = Daemon::at_least_once();
    daemon.file("watched.txt", b"v1");
    let watcher = Client::connect(&daemon);
    let writer = Client::connect(&daemon);

    let ack = watcher.roundtrip(&Request::register(1, 200, "watched.txt"));
    assert_eq!(ack.status(), Status::Ok);

    std::thread::sleep(Duration::from_millis(400));
    let reply = writer.roundtrip(&Request::append(2, "watched.txt", b"!"));
    assert_eq!(reply.status(), Status::Ok);

    watcher.expect_silence(Duration::from_millis(300));
}

#[test]
#[serial]
fn reregistration_restarts_the_window() {
    let daemon = Daemon::at_least_once();
    daemon.file("watched.txt", b"v1");
    let watcher = Client::connect(&daemon);
    let writer = Client::connect(&daemon);

    watcher.roundtrip(&Request::register(1, 1_000, "watched.txt"));
    std::thread::sleep(Duration::from_millis(600));
    watcher.roundtrip(&Request::register(2, 1_000, "watched.txt"));
    std::thread::sleep(Duration::from_millis(600));

    // 1.2s after the first registration, but only 0.6s into the second
    // window: the subscription must still be live.
    writer.roundtrip(&Request::append(3, "watched.txt", b"!"));
    let update = watcher.recv_callback();
    assert_eq!(update.text_param(0).unwrap(), "watched.txt");
}

#[test]
fn register_rejects_missing_files() {
    let daemon = Daemon::at_least_once();
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::register(1, 1_000, "ghost.txt"));

    assert_eq!(reply.status(), Status::NotFound);
}

#[test]
fn register_rejects_directories() {
    let daemon = Daemon::at_least_once();
    daemon.mkdir("sub");
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::register(1, 1_000, "sub"));

    assert_eq!(reply.status(), Status::BadRequest);
}

#[test]
fn register_rejects_negative_intervals() {
    let daemon = Daemon::at_least_once();
    daemon.file("watched.txt", b"v1");
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::register(1, -5, "watched.txt"));

    assert_eq!(reply.status(), Status::BadRequest);
}

/// Callback loss only silences the push; the registration handshake and
/// the mutation itself still succeed.
#[test]
fn lost_callbacks_are_not_retried() {
    let daemon = Daemon::start(&["-m", "ALO", "--callback-loss-prob", "1"]);
    daemon.file("watched.txt", b"v1");
    let watcher = Client::connect(&daemon);
    let writer = Client::connect(&daemon);

    let ack = watcher.roundtrip(&Request::register(1, 60_000, "watched.txt"));
    assert_eq!(ack.status(), Status::Ok);

    let reply = writer.roundtrip(&Request::append(2, "watched.txt", b"!"));
    assert_eq!(reply.status(), Status::Ok);

    watcher.expect_silence(Duration::from_millis(300));
    assert_eq!(daemon.read_file("watched.txt"), b"v1!");
}
