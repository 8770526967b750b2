use parley::config::MemoryBackend;
use parley::{ChatClient, ParleyConfig, init_logging};
use parley_test_utils::RecordingModel;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::tempdir;

#[tokio::test]
async fn json5_config_drives_a_durable_client() {
    init_logging();
    let temp = tempdir().expect("tempdir");
    let path = temp.path().join("chat_memory");
    let source = format!(
        r#"{{
            // persisted window of two messages
            memory: {{ backend: "file", capacity: 2, path: {path:?} }},
            chat: {{ default_system: "You are a doctor" }},
        }}"#,
        path = path.to_string_lossy()
    );
    let config = ParleyConfig::load_from_str(&source).expect("config");
    assert_eq!(config.memory.backend, MemoryBackend::File);

    let model = Arc::new(RecordingModel::new("rest more"));
    let client = ChatClient::from_config(model.clone(), &config).expect("client");
    client.chat("patient-1", "I feel tired").await.expect("chat");
    client.chat("patient-1", "still tired").await.expect("chat");

    let window = client.memory().expect("memory").get("patient-1");
    let contents: Vec<&str> = window.iter().map(|record| record.content.as_str()).collect();
    assert_eq!(contents, vec!["still tired", "rest more"]);
    assert!(path.join("patient-1.prly").is_file());
}
