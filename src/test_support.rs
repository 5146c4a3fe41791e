use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Assistant answer wrapped in prose and a fenced block, with one insight
/// missing a usable confidence and a table without explicit headers.
pub const FENCED_RESPONSE: &str = r#"Here is the analysis you asked for.

```json
{
  "insights": [
    {"content": "Seed valuations compressed in 2023", "confidence": 0.92, "source": "PitchBook"},
    {"content": "Climate funds raised record capital", "confidence": "high"}
  ],
  "visualizations": [
    {
      "visualType": "pie_chart",
      "title": "Sector Mix",
      "data": [{"sector": "AI", "value": 2.5}, {"sector": "Fintech", "value": 1.1}],
      "source": "Crunchbase"
    },
    {"type": "table", "title": "Top Deals", "data": [{"company": "Cohere", "amount": 270}]}
  ]
}
```

Let me know if you want more detail."#;

pub const MALFORMED_RESPONSE: &str = "I could not find any data for that question.";

pub fn temp_path(prefix: &str) -> PathBuf {
    let now_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "vc_research_hub_{prefix}_{}_{}",
        std::process::id(),
        now_ns
    ))
}

pub fn remove_dir_if_exists(path: &Path) {
    let _ = std::fs::remove_dir_all(path);
}

pub fn write_response_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Err(error) = std::fs::write(&path, contents) {
        panic!("failed to write {}: {error}", path.display());
    }
    path
}

pub fn apply_hub_test_env(command: &mut Command, log_dir: &Path) {
    command.env("HUB_INITIAL_FOLDER", "1");
    command.env("HUB_INITIAL_DASHBOARD", "1");
    command.env("HUB_LOG_DIR", log_dir.as_os_str());
    command.env("HUB_FILE_LOG", "info");
    command.env("RUST_LOG", "error");
}

/// In-memory log sink for asserting on emitted tracing output.
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(buffer) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    /// Runs `f` with a subscriber that records events at `level` and above.
    pub fn capture<T>(&self, level: Level, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(level)
            .with_ansi(false)
            .with_target(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .0
            .lock()
            .map_err(|_| io::Error::other("captured log buffer poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
