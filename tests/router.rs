use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use veo::api::{build_prompt, ClientSettings, OllamaClient, PromptSettings};
use veo::brain::triggers::{COIN_FACES, GREETING_REPLIES};
use veo::brain::OfflineBrain;
use veo::history::{FileHistoryStore, History, HistoryStore};
use veo::models::{GenerateOptions, Turn};
use veo::router::{Brain, Reply, Router, Session};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    _dir: TempDir,
    memory_file: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let memory_file = dir.path().join("veo_memory.json");
        Self {
            _dir: dir,
            memory_file,
        }
    }

    fn session(&self) -> Session {
        Session::new(
            "gemma:2b",
            GenerateOptions {
                temperature: 0.5,
                top_p: 0.75,
                repeat_penalty: 1.25,
                num_ctx: Some(1024),
                num_thread: Some(2),
            },
        )
    }

    fn router(&self, base_url: &str, history: History) -> Router {
        self.router_with(self.session(), base_url, history)
    }

    fn router_with(&self, session: Session, base_url: &str, history: History) -> Router {
        let client = OllamaClient::new(ClientSettings {
            base_url: base_url.to_string(),
            probe_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(10),
            chunk_timeout: Duration::from_secs(5),
            verbose: false,
        });
        Router::new(
            session,
            client,
            PromptSettings::default(),
            OfflineBrain::new(false),
            history,
        )
    }

    fn history(&self) -> History {
        History::load(Box::new(FileHistoryStore::new(&self.memory_file)), 50)
    }

    fn stored(&self) -> Vec<Turn> {
        FileHistoryStore::new(&self.memory_file).load()
    }
}

async fn ollama(fragments: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut body = String::new();
    for fragment in fragments {
        body.push_str(&json!({ "response": fragment }).to_string());
        body.push('\n');
    }
    body.push_str("{\"done\":true}\n");

    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/x-ndjson"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_unreachable_server_falls_back_to_offline() {
    let fixture = Fixture::new();
    let mut router = fixture.router("http://127.0.0.1:1", fixture.history());

    let mut out = Vec::new();
    let reply = router.process("hi", &mut out).await.unwrap();

    match &reply {
        Reply::Offline(text) => assert!(GREETING_REPLIES.contains(&text.as_str())),
        other => panic!("expected offline reply, got {:?}", other),
    }
    assert!(out.is_empty());
    assert_eq!(router.session().last_brain, Some(Brain::Offline));

    let stored = fixture.stored();
    assert_eq!(stored, vec![Turn::new("hi", reply.text())]);
}

#[tokio::test]
async fn test_remote_reply_is_streamed_and_recorded() {
    let fixture = Fixture::new();
    let server = ollama(&["Hello", " from", " the model."]).await;
    let mut router = fixture.router(&server.uri(), fixture.history());

    let mut out = Vec::new();
    let reply = router.process("hello?", &mut out).await.unwrap();

    assert_eq!(reply, Reply::Streamed("Hello from the model.".to_string()));
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("VEO-x: Hello from the model.\n"));
    assert!(printed.contains("[Generated in"));
    assert_eq!(router.session().last_brain, Some(Brain::Remote));
    assert_eq!(
        fixture.stored(),
        vec![Turn::new("hello?", "Hello from the model.")]
    );
}

#[tokio::test]
async fn test_empty_remote_reply_falls_back() {
    let fixture = Fixture::new();
    let server = ollama(&["", "   "]).await;
    let mut router = fixture.router(&server.uri(), fixture.history());

    let mut out = Vec::new();
    let reply = router.process("2+2", &mut out).await.unwrap();

    assert_eq!(reply, Reply::Offline("The result is 4.".to_string()));
    assert_eq!(fixture.stored().len(), 1);
}

#[tokio::test]
async fn test_one_turn_per_call_on_both_paths() {
    let fixture = Fixture::new();
    let server = ollama(&["ok"]).await;

    let mut remote = fixture.router(&server.uri(), fixture.history());
    let mut out = Vec::new();
    for i in 0..3 {
        remote.process(&format!("remote {}", i), &mut out).await.unwrap();
        assert_eq!(remote.history().len(), i + 1);
    }
    drop(remote);

    let mut offline = fixture.router("http://127.0.0.1:1", fixture.history());
    for i in 0..3 {
        offline.process(&format!("offline {}", i), &mut out).await.unwrap();
        assert_eq!(offline.history().len(), 4 + i);
    }

    let stored = fixture.stored();
    assert_eq!(stored.len(), 6);
    assert_eq!(stored[0].user, "remote 0");
    assert_eq!(stored[5].user, "offline 2");
}

#[tokio::test]
async fn test_prompt_carries_recent_context_and_current_model() {
    let fixture = Fixture::new();
    let store = FileHistoryStore::new(&fixture.memory_file);
    store
        .save(&[
            Turn::new("first", "one"),
            Turn::new("second", "I cannot do that."),
            Turn::new("third", "three"),
            Turn::new("fourth", "four"),
        ])
        .unwrap();
    let history = fixture.history();
    let expected_prompt = build_prompt("fifth", history.turns(), &PromptSettings::default());
    assert!(expected_prompt.contains("User: third\nAssistant: three\nUser: fourth\nAssistant: four\n"));
    assert!(!expected_prompt.contains("first"));
    assert!(!expected_prompt.contains("cannot"));

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3:8b",
            "prompt": expected_prompt,
            "stream": true
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"response\":\"five\",\"done\":true}\n", "application/x-ndjson"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut router = fixture.router(&server.uri(), history);
    router.set_model("llama3:8b");
    assert_eq!(router.model(), "llama3:8b");

    let mut out = Vec::new();
    let reply = router.process("fifth", &mut out).await.unwrap();
    assert_eq!(reply, Reply::Streamed("five".to_string()));
}

#[tokio::test]
async fn test_forced_offline_never_calls_server() {
    let fixture = Fixture::new();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = fixture.session();
    session.offline = true;
    let mut router = fixture.router_with(session, &server.uri(), fixture.history());

    let mut out = Vec::new();
    let reply = router.process("flip a coin", &mut out).await.unwrap();

    assert!(COIN_FACES.contains(&reply.text()));
    assert_eq!(reply.brain(), Brain::Offline);
    assert!(router.status().offline);
    assert_eq!(router.status().turns, 1);
}

#[tokio::test]
async fn test_history_cap_holds_across_calls() {
    let fixture = Fixture::new();
    let history = History::empty(Box::new(FileHistoryStore::new(&fixture.memory_file)), 5);
    let mut session = fixture.session();
    session.offline = true;
    let mut router = fixture.router_with(session, "http://127.0.0.1:1", history);

    let mut out = Vec::new();
    for i in 0..12 {
        router.process(&format!("message {}", i), &mut out).await.unwrap();
        assert!(router.history().len() <= 5);
    }

    let stored = fixture.stored();
    assert_eq!(stored.len(), 5);
    assert_eq!(stored[0].user, "message 7");
    assert_eq!(stored[4].user, "message 11");
}
