// JSONL log of every structured LLM exchange, one line per pipeline stage call
use serde::{Serialize, Serializer};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Serialize)]
struct HeuristicEntry<'a, I, O>
where
    I: Serialize,
    O: Serialize,
{
    stage: &'a str,
    #[serde(serialize_with = "serialize_as_json")]
    input: &'a I,
    #[serde(serialize_with = "serialize_as_json")]
    output: &'a O,
    latency_ms: u64,
    timestamp: String,
}

fn serialize_as_json<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    let json_string = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&json_string)
}

pub struct HeuristicLogger {
    writer: Option<Mutex<BufWriter<File>>>,
}

impl HeuristicLogger {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        let writer = log_file.and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => Some(Mutex::new(BufWriter::new(file))),
                Err(e) => {
                    warn!("Failed to open heuristic log file {:?}: {}", path, e);
                    None
                }
            }
        });

        Self { writer }
    }

    pub fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn log_stage<I, O>(&self, stage: &str, input: &I, output: &O, latency_ms: u64)
    where
        I: Serialize,
        O: Serialize,
    {
        let Some(writer) = &self.writer else {
            return;
        };

        let entry = HeuristicEntry {
            stage,
            input,
            output,
            latency_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        if let Ok(mut writer) = writer.lock() {
            match serde_json::to_string(&entry) {
                Ok(json) => {
                    if let Err(e) = writeln!(writer, "{}", json) {
                        warn!("Failed to write heuristic log entry: {}", e);
                    }
                    if let Err(e) = writer.flush() {
                        warn!("Failed to flush heuristic log: {}", e);
                    }
                }
                Err(e) => {
                    warn!("Failed to serialize heuristic entry for stage {}: {}", stage, e);
                }
            }
        }

        debug!(stage, latency_ms, "Heuristic log entry written");
    }
}

impl Default for HeuristicLogger {
    fn default() -> Self {
        Self::disabled()
    }
}
