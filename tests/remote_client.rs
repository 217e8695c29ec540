use serde_json::json;
use std::time::Duration;
use veo::api::{ClientSettings, InferenceError, OllamaClient};
use veo::models::{GenerateOptions, GenerateRequest};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(base_url: String) -> ClientSettings {
    ClientSettings {
        base_url,
        probe_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(10),
        chunk_timeout: Duration::from_secs(5),
        verbose: false,
    }
}

fn request(prompt: &str) -> GenerateRequest {
    GenerateRequest {
        model: "gemma:2b".to_string(),
        prompt: prompt.to_string(),
        stream: true,
        options: GenerateOptions {
            temperature: 0.5,
            top_p: 0.75,
            repeat_penalty: 1.25,
            num_ctx: Some(1024),
            num_thread: Some(4),
        },
    }
}

fn ndjson(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        body.push_str(&json!({ "response": fragment, "done": false }).to_string());
        body.push('\n');
    }
    body.push_str(&json!({ "response": "", "done": true }).to_string());
    body.push('\n');
    body
}

async fn mount_tags(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_probe_happy_path() {
    let server = MockServer::start().await;
    mount_tags(&server, 200).await;

    let client = OllamaClient::new(settings(server.uri()));
    assert!(client.probe().await.is_ok());
}

#[tokio::test]
async fn test_probe_non_success_is_unavailable() {
    let server = MockServer::start().await;
    mount_tags(&server, 503).await;

    let client = OllamaClient::new(settings(server.uri()));
    assert!(matches!(
        client.probe().await,
        Err(InferenceError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_probe_unreachable_host() {
    let client = OllamaClient::new(settings("http://127.0.0.1:1".to_string()));
    assert!(matches!(
        client.probe().await,
        Err(InferenceError::Unavailable(_))
    ));
}

#[tokio::test]
async fn test_ask_streams_and_reassembles() {
    let server = MockServer::start().await;
    mount_tags(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "gemma:2b",
            "prompt": "Say hi",
            "stream": true,
            "options": {
                "temperature": 0.5,
                "top_p": 0.75,
                "repeat_penalty": 1.25,
                "num_ctx": 1024,
                "num_thread": 4
            }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(ndjson(&["Hi", " there", "!"]), "application/x-ndjson"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(settings(server.uri()));
    let mut out = Vec::new();
    let completion = client
        .ask(&request("Say hi"), "VEO-x: ", &mut out)
        .await
        .unwrap();

    assert_eq!(completion.text, "Hi there!");
    assert_eq!(String::from_utf8(out).unwrap(), "VEO-x: Hi there!\n");
}

#[tokio::test]
async fn test_ask_skips_generate_when_probe_fails() {
    let server = MockServer::start().await;
    mount_tags(&server, 500).await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(ndjson(&["x"]), "application/x-ndjson"))
        .expect(0)
        .mount(&server)
        .await;

    let client = OllamaClient::new(settings(server.uri()));
    let mut out = Vec::new();
    let result = client.ask(&request("hello"), "VEO-x: ", &mut out).await;

    assert!(matches!(result, Err(InferenceError::Unavailable(_))));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_generate_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'nope' not found"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(settings(server.uri()));
    let mut out = Vec::new();
    let result = client.generate(&request("hello"), "VEO-x: ", &mut out).await;

    match result {
        Err(InferenceError::Status { status, message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("not found"));
        }
        other => panic!("unexpected result: {:?}", other.map(|c| c.text)),
    }
}

#[tokio::test]
async fn test_generate_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(ndjson(&["late"]), "application/x-ndjson")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = OllamaClient::new(ClientSettings {
        request_timeout: Duration::from_millis(200),
        ..settings(server.uri())
    });
    let mut out = Vec::new();
    let result = client.generate(&request("hello"), "VEO-x: ", &mut out).await;

    assert!(matches!(result, Err(InferenceError::Timeout(_))));
}

/// Serves one chunked response that sends a first fragment and then stalls.
async fn stalling_server() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;

        let fragment = "{\"response\":\"Hi\"}\n";
        let head = "HTTP/1.1 200 OK\r\nContent-Type: application/x-ndjson\r\nTransfer-Encoding: chunked\r\n\r\n";
        let chunk = format!("{:x}\r\n{}\r\n", fragment.len(), fragment);
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(chunk.as_bytes()).await;
        let _ = socket.flush().await;
        tokio::time::sleep(Duration::from_secs(10)).await;
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_request_timeout_mid_body_is_a_timeout() {
    let base_url = stalling_server().await;
    let client = OllamaClient::new(ClientSettings {
        request_timeout: Duration::from_millis(500),
        chunk_timeout: Duration::from_secs(5),
        ..settings(base_url)
    });

    let mut out = Vec::new();
    let result = client.generate(&request("hello"), "VEO-x: ", &mut out).await;

    match result {
        Err(InferenceError::Timeout(after)) => assert_eq!(after, Duration::from_millis(500)),
        other => panic!("unexpected result: {:?}", other.map(|c| c.text)),
    }
    assert_eq!(String::from_utf8(out).unwrap(), "VEO-x: Hi\n");
}
