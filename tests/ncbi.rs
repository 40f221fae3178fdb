use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::thread;

use assert_matches::assert_matches;

use kira_assembly_fetch::error::AssemblyError;
use kira_assembly_fetch::ncbi::{NcbiClient, NcbiHttpClient};

/// Answers a single request with `status_line` and `body`, then closes.
fn serve_once(status_line: &'static str, body: &'static [u8]) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 0 {
            if line == "\r\n" {
                break;
            }
            line.clear();
        }
        let mut stream = stream;
        write!(
            stream,
            "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        )
        .unwrap();
        stream.write_all(body).unwrap();
    });
    format!("http://{addr}/genomes/all/file.gz")
}

#[test]
fn download_writes_body() {
    let url = serve_once("HTTP/1.1 200 OK", b"\x1f\x8bpayload");
    let temp = tempfile::tempdir().unwrap();
    let destination = temp.path().join("x.protein.faa.gz");

    let client = NcbiHttpClient::new(None).unwrap();
    client.download(&url, &destination).unwrap();

    assert_eq!(fs::read(&destination).unwrap(), b"\x1f\x8bpayload");
}

#[test]
fn not_found_leaves_destination_absent() {
    let url = serve_once("HTTP/1.1 404 Not Found", b"missing");
    let temp = tempfile::tempdir().unwrap();
    let destination = temp.path().join("x.genomic.gtf.gz");

    let client = NcbiHttpClient::new(None).unwrap();
    let err = client.download(&url, &destination).unwrap_err();

    assert_matches!(err, AssemblyError::NcbiStatus { status: 404, .. });
    assert!(!destination.exists());
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn connection_refused_leaves_destination_absent() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let temp = tempfile::tempdir().unwrap();
    let destination = temp.path().join("x.genomic.fna.gz");

    let client = NcbiHttpClient::new(None).unwrap();
    let err = client
        .download(&format!("http://{addr}/file.gz"), &destination)
        .unwrap_err();

    assert_matches!(err, AssemblyError::NcbiHttp(_));
    assert!(!destination.exists());
}
