//! # JSON Output Module
//!
//! Line-delimited JSON events on stdout, for scripts driving the CLI.
//!
//! ## Message types:
//! - `start`: a batch begins (mode, frame count, axis bound)
//! - `frame`: one frame was written
//! - `animation`: the GIF of a batch was assembled
//! - `conversion`: a video was converted to GIF
//! - `complete`: the batch finished
//! - `error`: the run aborted

use crate::axis::AxisBound;
use crate::mode::ChartMode;
use serde::Serialize;
use std::path::PathBuf;

/// One JSON event
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    Start {
        mode: ChartMode,
        total_frames: usize,
        axis_bound: AxisBound,
    },
    Frame {
        period: String,
        path: PathBuf,
        entities: Vec<String>,
    },
    Animation {
        path: PathBuf,
        frames: usize,
    },
    Conversion {
        gif_path: PathBuf,
        video_path: Option<PathBuf>,
    },
    Complete {
        frames_rendered: usize,
        duration_seconds: f64,
    },
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Serialize to a single line
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"type":"error","message":"unserializable event: {}"}}"#, e)
        })
    }

    /// Emit the message on stdout
    pub fn emit(&self) {
        println!("{}", self.to_line());
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::compute_bound;

    #[test]
    fn test_start_message_shape() {
        let message = JsonMessage::Start {
            mode: ChartMode::TopN,
            total_frames: 63,
            axis_bound: compute_bound(1_300_000_000.0).unwrap(),
        };
        let value: serde_json::Value = serde_json::from_str(&message.to_line()).unwrap();
        assert_eq!(value["type"], "start");
        assert_eq!(value["mode"]["mode"], "top_n");
        assert_eq!(value["total_frames"], 63);
        assert_eq!(value["axis_bound"], 1_300_000_000.0);
    }

    #[test]
    fn test_error_message_shape() {
        let line = JsonMessage::error("Missing key: Atlantis".into(), None).to_line();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["message"], "Missing key: Atlantis");
        assert!(value["details"].is_null());
    }
}
