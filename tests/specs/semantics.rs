//! Invocation semantics specs
//!
//! Duplicate requests observed end to end: at-least-once re-executes,
//! at-most-once replays the remembered reply.

use crate::prelude::*;

#[test]
fn at_least_once_applies_a_duplicate_insert_twice() {
    let daemon = Daemon::at_least_once();
    daemon.file("a.txt", b"hi");
    let client = Client::connect(&daemon);
    let request = Request::insert(7, 1, "a.txt", b"XX");

    client.roundtrip(&request);
    client.roundtrip(&request);

    assert_eq!(daemon.read_file("a.txt"), b"hXXXXi");
}

#[test]
fn at_most_once_applies_a_duplicate_insert_once() {
    let daemon = Daemon::at_most_once();
    daemon.file("a.txt", b"hi");
    let client = Client::connect(&daemon);
    let request = Request::insert(7, 1, "a.txt", b"XX");

    let first = client.roundtrip(&request);
    let second = client.roundtrip(&request);

    assert_eq!(first.status(), Status::Ok);
    assert_eq!(second.status(), Status::Ok);
    assert_eq!(second.values(), first.values());
    assert_eq!(daemon.read_file("a.txt"), b"hXXi");
}

#[test]
fn at_most_once_distinguishes_request_ids() {
    let daemon = Daemon::at_most_once();
    daemon.file("a.txt", b"hi");
    let client = Client::connect(&daemon);

    client.roundtrip(&Request::insert(1, 1, "a.txt", b"XX"));
    client.roundtrip(&Request::insert(2, 1, "a.txt", b"XX"));

    assert_eq!(daemon.read_file("a.txt"), b"hXXXXi");
}

#[test]
fn at_most_once_distinguishes_clients() {
    let daemon = Daemon::at_most_once();
    daemon.file("a.txt", b"hi");
    let one = Client::connect(&daemon);
    let two = Client::connect(&daemon);
    let request = Request::insert(7, 1, "a.txt", b"XX");

    one.roundtrip(&request);
    two.roundtrip(&request);

    assert_eq!(daemon.read_file("a.txt"), b"hXXXXi");
}

/// Failures must not be replayed: a retry after the cause is fixed has to
/// execute for real.
#[test]
fn at_most_once_does_not_remember_failures() {
    let daemon = Daemon::at_most_once();
    let client = Client::connect(&daemon);
    let request = Request::insert(3, 0, "late.txt", b"now");

    let failed = client.roundtrip(&request);
    assert_eq!(failed.status(), Status::NotFound);

    daemon.file("late.txt", b"");
    let retried = client.roundtrip(&request);

    assert_eq!(retried.status(), Status::Ok);
    assert_eq!(daemon.read_file("late.txt"), b"now");
}

#[test]
fn at_most_once_replays_read_replies_unchanged() {
    let daemon = Daemon::at_most_once();
    daemon.file("a.txt", b"v1");
    let client = Client::connect(&daemon);
    let request = Request::read(5, "a.txt");

    let first = client.roundtrip(&request);
    // The file changes on disk; the duplicate must still see the reply
    // the first execution produced.
    daemon.file("a.txt", b"v2");
    let second = client.roundtrip(&request);

    assert_eq!(first.values(), &[Value::Bytes(b"v1".to_vec())]);
    assert_eq!(second.values(), first.values());
}
