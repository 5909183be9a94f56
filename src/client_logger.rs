//! Logging hooks for Gemini client operations.
//!
//! The [`ClientLogger`] trait lets callers capture every API interaction passing
//! through the [`Gemini`](crate::Gemini) client.  [`JsonLinesLogger`] is the
//! implementation the chat binary installs for `--log-file`.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::{Error, GenerateContentRequest, GenerateContentResponse, Model, Result};

/// A trait for logging Gemini client operations.
///
/// Implementations must not fail the request they observe; errors while logging
/// are the implementation's own concern.
pub trait ClientLogger: Send + Sync {
    /// Log an outgoing request, before it is sent.
    fn log_request(&self, model: &Model, request: &GenerateContentRequest);

    /// Log one chunk of a streamed response, as it is received.
    fn log_stream_chunk(&self, chunk: &GenerateContentResponse);

    /// Log a failed request or a failure in the middle of a stream.
    fn log_error(&self, error: &Error);
}

/// Appends one JSON object per line to a file.
///
/// Each line has a `timestamp` (RFC 3339, UTC), a `kind` of `request`, `chunk`
/// or `error`, and the kind-specific payload.
pub struct JsonLinesLogger {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesLogger {
    /// Opens `path` for appending, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())
            .map_err(|err| {
                Error::io(
                    format!("failed to open log file {}", path.as_ref().display()),
                    err,
                )
            })?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    fn write_line(&self, kind: &str, payload: Value) {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        let line = json!({
            "timestamp": timestamp,
            "kind": kind,
            "payload": payload,
        });
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{line}");
            let _ = writer.flush();
        }
    }
}

impl ClientLogger for JsonLinesLogger {
    fn log_request(&self, model: &Model, request: &GenerateContentRequest) {
        let payload = json!({
            "model": model.to_string(),
            "request": serde_json::to_value(request).unwrap_or(Value::Null),
        });
        self.write_line("request", payload);
    }

    fn log_stream_chunk(&self, chunk: &GenerateContentResponse) {
        self.write_line(
            "chunk",
            serde_json::to_value(chunk).unwrap_or(Value::Null),
        );
    }

    fn log_error(&self, error: &Error) {
        self.write_line("error", json!({ "message": error.to_string() }));
    }
}
