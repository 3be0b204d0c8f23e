use std::time::Duration;

use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, duplex, split};

use super::*;

const TIMEOUT: Duration = Duration::from_secs(5);

fn channel_pair() -> (HelperChannel, DuplexStream) {
    let (client, peer) = duplex(4096);
    let (read_half, write_half) = split(client);
    (HelperChannel::new(read_half, write_half), peer)
}

/// Answers every request line with whatever `respond` builds from it.
fn spawn_peer(
    peer: DuplexStream,
    respond: impl Fn(Value) -> String + Send + 'static,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let (read_half, mut write_half) = split(peer);
        let mut lines = BufReader::new(read_half).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let request: Value = serde_json::from_str(&line).unwrap();
            let mut response = respond(request);
            response.push('\n');
            write_half.write_all(response.as_bytes()).await.unwrap();
            write_half.flush().await.unwrap();
        }
    })
}

#[tokio::test]
async fn health_round_trip() {
    let (channel, peer) = channel_pair();
    spawn_peer(peer, |request| {
        assert_eq!(request["method"], json!("health"));
        assert_eq!(request["params"], json!({}));
        json!({ "id": request["id"], "result": { "status": "ok", "version": "0.1.0" } }).to_string()
    });

    let result = channel.request("health", &json!({}), TIMEOUT).await.unwrap();
    assert_eq!(result.get("status"), Some(&json!("ok")));
}

#[tokio::test]
async fn mismatched_id_yields_none() {
    let (channel, peer) = channel_pair();
    spawn_peer(peer, |_| json!({ "id": "someone-else", "result": {} }).to_string());

    assert!(channel.request("health", &json!({}), TIMEOUT).await.is_none());
}

#[tokio::test]
async fn error_response_yields_none() {
    let (channel, peer) = channel_pair();
    spawn_peer(peer, |request| {
        json!({ "id": request["id"], "error": { "code": -32601, "message": "Method not found" } }).to_string()
    });

    assert!(channel.request("bogus", &json!({}), TIMEOUT).await.is_none());
}

#[tokio::test]
async fn non_object_result_yields_none() {
    let (channel, peer) = channel_pair();
    spawn_peer(peer, |request| json!({ "id": request["id"], "result": "ok" }).to_string());

    assert!(channel.request("health", &json!({}), TIMEOUT).await.is_none());
}

#[tokio::test]
async fn closed_peer_yields_none() {
    let (channel, peer) = channel_pair();
    drop(peer);

    assert!(channel.request("health", &json!({}), TIMEOUT).await.is_none());
}

#[tokio::test]
async fn peer_closing_output_after_request_yields_none() {
    let (channel, peer) = channel_pair();
    tokio::spawn(async move {
        let mut lines = BufReader::new(peer).lines();
        let _ = lines.next_line().await;
    });

    assert!(channel.request("health", &json!({}), TIMEOUT).await.is_none());
}

#[tokio::test]
async fn silent_peer_times_out_and_late_reply_is_discarded() {
    let (channel, peer) = channel_pair();
    tokio::spawn(async move {
        let (read_half, mut write_half) = split(peer);
        let mut lines = BufReader::new(read_half).lines();

        let first: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        let late = format!("{}\n", json!({ "id": first["id"], "result": { "late": true } }));
        write_half.write_all(late.as_bytes()).await.unwrap();
        write_half.flush().await.unwrap();

        let second: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        let reply = format!("{}\n", json!({ "id": second["id"], "result": { "late": false } }));
        write_half.write_all(reply.as_bytes()).await.unwrap();
        write_half.flush().await.unwrap();
    });

    assert!(channel.request("slow", &json!({}), Duration::from_millis(50)).await.is_none());
    tokio::time::sleep(Duration::from_millis(400)).await;

    let result = channel.request("fast", &json!({}), TIMEOUT).await.unwrap();
    assert_eq!(result.get("late"), Some(&json!(false)));
}

#[tokio::test]
async fn concurrent_requests_each_get_their_own_response() {
    let (channel, peer) = channel_pair();
    spawn_peer(peer, |request| json!({ "id": request["id"], "result": { "echo": request["method"] } }).to_string());

    let channel = std::sync::Arc::new(channel);
    let mut handles = Vec::new();
    for method in ["alpha", "beta", "gamma", "delta"] {
        let channel = std::sync::Arc::clone(&channel);
        handles.push(tokio::spawn(async move {
            let result = channel.request(method, &json!({}), TIMEOUT).await.unwrap();
            assert_eq!(result.get("echo"), Some(&json!(method)));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
}
