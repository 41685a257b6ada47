//! Wire fault specs
//!
//! Broken datagrams, oversized frames, and injected loss, as seen from
//! the far end of the socket.

use std::time::Duration;

use crate::prelude::*;

#[test]
fn garbage_is_answered_with_the_sentinel_id() {
    let daemon = Daemon::at_least_once();
    let client = Client::connect(&daemon);

    client.send_raw(&[0xde]);
    let reply = client.recv(UNPARSEABLE_REQUEST_ID);

    assert_eq!(reply.status(), Status::BadRequest);
    assert!(matches!(reply.values().first(), Some(Value::Text(_))));
}

#[test]
fn empty_datagrams_are_answered_with_the_sentinel_id() {
    let daemon = Daemon::at_least_once();
    let client = Client::connect(&daemon);

    client.send_raw(&[]);
    let reply = client.recv(UNPARSEABLE_REQUEST_ID);

    assert_eq!(reply.status(), Status::BadRequest);
}

/// Once four id bytes are readable, the error reply echoes them so the
/// sender can match it to the attempt.
#[test]
fn a_readable_id_is_echoed_from_broken_frames() {
    let daemon = Daemon::at_least_once();
    let client = Client::connect(&daemon);

    let mut frame = 99i32.to_be_bytes().to_vec();
    frame.push(0xc8); // no such operation
    client.send_raw(&frame);
    let reply = client.recv(99);

    assert_eq!(reply.status(), Status::BadRequest);
}

#[test]
fn truncated_frames_are_rejected_with_their_id() {
    let daemon = Daemon::at_least_once();
    daemon.file("a.txt", b"hello");
    let client = Client::connect(&daemon);

    let frame = Request::read(42, "a.txt").encode().unwrap();
    client.send_raw(&frame[..frame.len() / 2]);
    let reply = client.recv(42);

    assert_eq!(reply.status(), Status::BadRequest);
}

#[test]
fn wrong_arity_is_rejected() {
    let daemon = Daemon::at_least_once();
    let client = Client::connect(&daemon);

    // READ with a declared arity of 2.
    let mut frame = Vec::new();
    frame.extend_from_slice(&11i32.to_be_bytes());
    frame.push(1);
    frame.extend_from_slice(&2i32.to_be_bytes());
    client.send_raw(&frame);
    let reply = client.recv(11);

    assert_eq!(reply.status(), Status::BadRequest);
}

/// A frame longer than the receive buffer arrives truncated, so its
/// declared payload cannot be satisfied.
#[test]
fn oversized_frames_are_rejected_not_processed() {
    let daemon = Daemon::at_least_once();
    daemon.file("a.txt", b"hello");
    let client = Client::connect(&daemon);

    // INSERT whose data value alone exceeds the message cap.
    let mut frame = Vec::new();
    frame.extend_from_slice(&5i32.to_be_bytes());
    frame.push(2);
    frame.extend_from_slice(&3i32.to_be_bytes());
    frame.push(2); // Int32 offset
    frame.extend_from_slice(&0i32.to_be_bytes());
    frame.push(0); // Text path
    frame.extend_from_slice(&5i32.to_be_bytes());
    frame.extend_from_slice(b"a.txt");
    frame.push(1); // Bytes payload, longer than fits
    frame.extend_from_slice(&6000i32.to_be_bytes());
    frame.resize(frame.len() + 6000, 0xaa);
    client.send_raw(&frame);
    let reply = client.recv(5);

    assert_eq!(reply.status(), Status::BadRequest);
    assert_eq!(daemon.read_file("a.txt"), b"hello");
}

#[test]
fn inbound_callback_frames_are_rejected() {
    let daemon = Daemon::at_least_once();
    let client = Client::connect(&daemon);

    let frame = Request::file_updated("a.txt", 1, b"spoof").encode().unwrap();
    client.send_raw(&frame);
    let reply = client.recv(CALLBACK_REQUEST_ID);

    assert_eq!(reply.status(), Status::BadRequest);
}

#[test]
fn mistyped_parameters_are_rejected() {
    let daemon = Daemon::at_least_once();
    daemon.file("a.txt", b"hello");
    let client = Client::connect(&daemon);

    // READ whose single parameter is an Int32 instead of Text.
    let mut frame = Vec::new();
    frame.extend_from_slice(&13i32.to_be_bytes());
    frame.push(1);
    frame.extend_from_slice(&1i32.to_be_bytes());
    frame.push(2);
    frame.extend_from_slice(&7i32.to_be_bytes());
    client.send_raw(&frame);
    let reply = client.recv(13);

    assert_eq!(reply.status(), Status::BadRequest);
}

/// Total reply loss: the daemon stays silent but the mutation lands, which
/// is exactly the window where at-least-once duplicates double-apply.
#[test]
fn lost_replies_hide_an_applied_effect() {
    let daemon = Daemon::start(&["-m", "ALO", "-l", "1"]);
    daemon.file("a.txt", b"hi");
    let client = Client::connect(&daemon);

    client.send(&Request::insert(1, 1, "a.txt", b"X"));
    client.expect_silence(Duration::from_millis(300));

    assert!(
        wait_for(SPEC_WAIT_MAX_MS, || daemon.read_file("a.txt") == b"hXi"),
        "the insert should land even though the reply was dropped"
    );
}
