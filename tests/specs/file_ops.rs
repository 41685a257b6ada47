//! File operation specs
//!
//! Each remote operation exercised over a real socket against a spawned
//! daemon, including its rejection paths.

use crate::prelude::*;

#[test]
fn empty_request_gets_an_empty_ok() {
    let daemon = Daemon::at_least_once();
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::empty(9));

    assert_eq!(reply.status(), Status::Ok);
    assert!(reply.values().is_empty());
}

#[test]
fn read_returns_the_whole_file() {
    let daemon = Daemon::at_least_once();
    daemon.file("a.txt", b"hello world");
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::read(1, "a.txt"));

    assert_eq!(reply.status(), Status::Ok);
    assert_eq!(reply.values(), &[Value::Bytes(b"hello world".to_vec())]);
}

#[test]
fn read_of_a_missing_file_is_not_found() {
    let daemon = Daemon::at_least_once();
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::read(1, "ghost.txt"));

    assert_eq!(reply.status(), Status::NotFound);
    assert!(matches!(reply.values().first(), Some(Value::Text(_))));
}

#[test]
fn escaping_paths_are_rejected() {
    let daemon = Daemon::at_least_once();
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::read(1, "../secret"));

    assert_eq!(reply.status(), Status::BadRequest);
}

#[test]
fn insert_splices_at_the_offset() {
    let daemon = Daemon::at_least_once();
    daemon.file("a.txt", b"hello");
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::insert(1, 2, "a.txt", b"XX"));

    assert_eq!(reply.status(), Status::Ok);
    assert!(reply.values().is_empty());
    assert_eq!(daemon.read_file("a.txt"), b"heXXllo");
}

#[test]
fn insert_past_the_end_is_rejected_and_changes_nothing() {
    let daemon = Daemon::at_least_once();
    daemon.file("a.txt", b"hi");
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::insert(1, 7, "a.txt", b"XX"));

    assert_eq!(reply.status(), Status::BadRequest);
    assert_eq!(daemon.read_file("a.txt"), b"hi");
}

#[test]
fn append_extends_the_file() {
    let daemon = Daemon::at_least_once();
    daemon.file("log.txt", b"one\n");
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::append(1, "log.txt", b"two\n"));

    assert_eq!(reply.status(), Status::Ok);
    assert_eq!(daemon.read_file("log.txt"), b"one\ntwo\n");
}

#[test]
fn touch_creates_the_file_and_reports_the_stamp() {
    let daemon = Daemon::at_least_once();
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::touch(1, "new.txt"));

    assert_eq!(reply.status(), Status::Ok);
    match reply.values() {
        [Value::Int64(at)] => assert!(*at > 0),
        other => panic!("unexpected touch reply: {other:?}"),
    }
    assert!(daemon.has_file("new.txt"));
}

#[test]
fn get_attr_reports_mtime_then_atime() {
    let daemon = Daemon::at_least_once();
    daemon.file("a.txt", b"hello");
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::get_attr(1, "a.txt"));

    assert_eq!(reply.status(), Status::Ok);
    match reply.values() {
        [Value::Int64(mtime_ms), Value::Int64(atime_ms)] => {
            assert!(*mtime_ms > 0);
            assert!(*atime_ms > 0);
        }
        other => panic!("unexpected attr reply: {other:?}"),
    }
}

#[test]
fn mutations_move_the_modification_time() {
    let daemon = Daemon::at_least_once();
    daemon.file("a.txt", b"hello");
    let client = Client::connect(&daemon);

    let before = client.roundtrip(&Request::get_attr(1, "a.txt"));
    std::thread::sleep(std::time::Duration::from_millis(30));
    client.roundtrip(&Request::append(2, "a.txt", b"!"));
    let after = client.roundtrip(&Request::get_attr(3, "a.txt"));

    let mtime = |reply: &Response| match reply.values() {
        [Value::Int64(mtime_ms), _] => *mtime_ms,
        other => panic!("unexpected attr reply: {other:?}"),
    };
    assert!(mtime(&after) > mtime(&before));
}

#[test]
fn list_dir_sorts_names_and_marks_directories() {
    let daemon = Daemon::at_least_once();
    daemon.file("b.txt", b"");
    daemon.file("a.txt", b"");
    daemon.mkdir("sub");
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::list_dir(1, ""));

    assert_eq!(reply.status(), Status::Ok);
    assert_eq!(
        reply.values(),
        &[
            Value::Text("a.txt".to_string()),
            Value::Text("b.txt".to_string()),
            Value::Text("sub/".to_string()),
        ]
    );
}

#[test]
fn list_dir_of_a_file_is_rejected() {
    let daemon = Daemon::at_least_once();
    daemon.file("a.txt", b"hello");
    let client = Client::connect(&daemon);

    let reply = client.roundtrip(&Request::list_dir(1, "a.txt"));

    assert_eq!(reply.status(), Status::BadRequest);
}
