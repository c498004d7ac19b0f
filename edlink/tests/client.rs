//! Integration tests for the companion server client

use edlink::{
    parse_journal_log, CompanionTransport, EdlaClient, Error, Frame, LivenessProber, StreamKind,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Answers the challenge with the last path segment, like the real server
struct EchoToken;

impl Respond for EchoToken {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let token = request
            .url
            .path_segments()
            .and_then(|segments| segments.last())
            .unwrap_or_default()
            .to_string();
        ResponseTemplate::new(200).set_body_string(token)
    }
}

async fn echo_server() -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/edla/challenge/[A-Za-z0-9]+$"))
        .respond_with(EchoToken)
        .mount(&mock_server)
        .await;
    mock_server
}

fn client_for(uri: &str) -> EdlaClient {
    EdlaClient::builder().base_url(uri).build().unwrap()
}

#[tokio::test]
async fn test_challenge_echo() {
    let mock_server = echo_server().await;
    let client = client_for(&mock_server.uri());

    assert_eq!(client.challenge("abc").await.unwrap(), "abc");

    let prober = LivenessProber::new(Arc::new(client), Duration::from_secs(5));
    assert!(prober.probe_once().await);
}

#[tokio::test]
async fn test_challenge_mismatch_is_not_live() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/edla/challenge/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string("someone else"))
        .mount(&mock_server)
        .await;

    let prober = LivenessProber::new(
        Arc::new(client_for(&mock_server.uri())),
        Duration::from_secs(5),
    );
    assert!(!prober.probe_with_token("abc").await);
}

#[tokio::test]
async fn test_custom_challenge_route() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/challenge/xyz"))
        .respond_with(EchoToken)
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = EdlaClient::builder()
        .base_url(mock_server.uri())
        .challenge_route("/challenge/")
        .build()
        .unwrap();

    assert_eq!(client.challenge("xyz").await.unwrap(), "xyz");
}

#[tokio::test]
async fn test_challenge_error_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let err = client.challenge("abc").await.unwrap_err();
    assert!(matches!(err, Error::ApiError(_)));

    let prober = LivenessProber::new(Arc::new(client), Duration::from_secs(5));
    assert!(!prober.probe_once().await);
}

#[tokio::test]
async fn test_unreachable_server_is_not_live() {
    // grab a free port, then release it
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = client_for(&format!("http://127.0.0.1:{port}"));
    assert!(matches!(client.challenge("abc").await, Err(Error::Http(_))));

    let prober = LivenessProber::new(Arc::new(client), Duration::from_secs(5));
    assert!(!prober.probe_once().await);
}

#[tokio::test]
async fn test_request_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = EdlaClient::builder()
        .base_url(mock_server.uri())
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    assert!(client.challenge("late").await.is_err());
}

#[tokio::test]
async fn test_fetch_journal() {
    let journal = concat!(
        r#"{"timestamp":"2024-05-01T18:00:00Z","event":"Fileheader","part":1}"#,
        "\r\n",
        r#"{"timestamp":"2024-05-01T18:00:05Z","event":"Commander","FID":"F1","Name":"Jameson"}"#,
        "\r\n",
        r#"{"timestamp":"2024-05-01T18:00:09Z","event":"Location","StarSystem":"Sol"}"#,
        "\r\n",
    );

    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file/Journal"))
        .respond_with(ResponseTemplate::new(200).set_body_string(journal))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server.uri());
    let text = client.fetch_journal().await.unwrap();
    let events = parse_journal_log(&text);

    assert_eq!(events.len(), 3);
    assert_eq!(events[1]["Name"], "Jameson");
    assert_eq!(events[2]["StarSystem"], "Sol");
}

#[tokio::test]
async fn test_open_stream_yields_data_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();

        ws.send(Message::Text(r#"{"isGameRunning":true}"#.to_string()))
            .await
            .unwrap();
        ws.send(Message::Ping(vec![1])).await.unwrap();
        ws.send(Message::Binary(vec![0xde, 0xad])).await.unwrap();
        ws.send(Message::Text(r#"{"isGameRunning":false}"#.to_string()))
            .await
            .unwrap();
        ws.close(None).await.unwrap();

        // drain until the client acknowledges the close
        while let Some(Ok(_)) = ws.next().await {}
    });

    let client = client_for(&format!("http://127.0.0.1:{port}"));
    let stream = client.open_stream(StreamKind::Game).await.unwrap();

    let frames: Vec<Frame> = tokio::time::timeout(Duration::from_secs(5), stream.collect::<Vec<_>>())
        .await
        .unwrap()
        .into_iter()
        .map(|frame| frame.unwrap())
        .collect();

    assert_eq!(
        frames,
        vec![
            Frame::Text(r#"{"isGameRunning":true}"#.to_string()),
            Frame::Binary(vec![0xde, 0xad]),
            Frame::Text(r#"{"isGameRunning":false}"#.to_string()),
        ]
    );

    server.await.unwrap();
}

#[tokio::test]
async fn test_open_stream_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = client_for(&format!("http://127.0.0.1:{port}"));
    assert!(matches!(
        client.open_stream(StreamKind::Status).await,
        Err(Error::WebSocket(_))
    ));
}
