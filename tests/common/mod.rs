/*!
 * Common test utilities for the subtitle translator test suite
 */

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use subtitle_translator::app_config::TranslationConfig;
use subtitle_translator::errors::ProviderError;
use subtitle_translator::subtitle_processor::{SrtEntry, SubtitleEntry};
use subtitle_translator::translation::TextTranslator;

pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.
With a second line.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

pub const SAMPLE_ASS: &str = "[Script Info]
Title: Sample
ScriptType: v4.00+

[V4+ Styles]
Format: Name, Fontname, Fontsize
Style: Default,Arial,20

[Events]
Format: Layer, Start, End, Style, Text
Dialogue: 0,0:00:01.00,0:00:04.00,Default,Hello, world
Comment: 0,0:00:02.00,0:00:03.00,Default,not carried
Dialogue: 1,0:00:05.00,0:00:07.50,Default,{\\i1}Second{\\i0} line
";

/// Route library logs to the test output, once per process
pub fn init_test_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .filter_level(log::LevelFilter::Debug)
        .try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// An SRT entry with sequential timing
pub fn srt_entry(id: usize, text: &str) -> SubtitleEntry {
    SubtitleEntry::Srt(SrtEntry {
        id: id.to_string(),
        start_time: format!("00:00:{:02},000", id % 60),
        end_time: format!("00:00:{:02},500", id % 60),
        text: text.to_string(),
    })
}

/// `count` SRT entries with texts `line 1`..`line {count}`
pub fn srt_entries(count: usize) -> Vec<SubtitleEntry> {
    (1..=count).map(|i| srt_entry(i, &format!("line {}", i))).collect()
}

/// A config pointing at `url` that passes validation
pub fn test_translation_config(url: &str) -> TranslationConfig {
    TranslationConfig {
        api_base_url: url.to_string(),
        model_name: "test-model".to_string(),
        timeout_secs: 5,
        ..TranslationConfig::default()
    }
}

/// Translator with per-text scripted behaviour
///
/// Answers `T:{text}` unless the text is listed as failing or panicking;
/// every call is recorded in order of arrival.
#[derive(Default)]
pub struct ScriptedTranslator {
    failures: HashMap<String, ProviderError>,
    delays: HashMap<String, Duration>,
    panics: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, text: &str, error: ProviderError) -> Self {
        self.failures.insert(text.to_string(), error);
        self
    }

    pub fn delay_on(mut self, text: &str, delay: Duration) -> Self {
        self.delays.insert(text.to_string(), delay);
        self
    }

    pub fn panic_on(mut self, text: &str) -> Self {
        self.panics.push(text.to_string());
        self
    }

    /// Texts received so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl TextTranslator for ScriptedTranslator {
    async fn translate_one(&self, text: &str) -> Result<String, ProviderError> {
        self.calls.lock().push(text.to_string());

        if let Some(delay) = self.delays.get(text) {
            tokio::time::sleep(*delay).await;
        }
        if self.panics.iter().any(|p| p == text) {
            panic!("scripted panic on {}", text);
        }
        if let Some(error) = self.failures.get(text) {
            return Err(error.clone());
        }

        Ok(format!("T:{}", text))
    }
}

/// HTTP server answering every request with the same canned response
pub struct CannedServer {
    /// Base URL of the server
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    /// Raw requests received so far (headers and body)
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

/// Start a server replying `HTTP/1.1 {status}` with a JSON `body`
pub async fn spawn_canned_server(status: &'static str, body: String) -> Result<CannedServer> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/v1", listener.local_addr()?);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&requests);

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let Ok(request) = read_request(&mut stream).await else {
                continue;
            };
            recorded.lock().push(request);

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    Ok(CannedServer { url, requests })
}

/// Start a server that accepts connections and never answers
pub async fn spawn_silent_server() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let url = format!("http://{}/v1", listener.local_addr()?);

    tokio::spawn(async move {
        let mut open = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            open.push(stream);
        }
    });

    Ok(url)
}

/// A URL nothing listens on
pub fn unreachable_url() -> String {
    "http://127.0.0.1:1/v1".to_string()
}

/// A chat-completions response body carrying `content`
pub fn chat_response(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16 }
    })
    .to_string()
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        if let Some(header_end) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    Ok(String::from_utf8_lossy(&buffer).to_string())
}
