//! Line protocol between an operator and the simulator.
//!
//! Each input line is `<command> [key=value ...]`. Blank lines and lines
//! starting with `#` are ignored. Each handled line is answered with one
//! JSON line: the outcome itself, or
//! `{"error": {"type": ..., "reason": ..., "description": ...}}`.

use serde::Serialize;
use serde_json::json;
use tapelib_core::command::Request;
use tapelib_core::error::CommandError;
use tapelib_core::query::Outcome;

/// A line that could not be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("expected key=value, got '{0}'")]
    MalformedParameter(String),

    #[error("parameter '{0}' given twice")]
    DuplicateParameter(String),
}

impl ProtocolError {
    fn rejection(&self) -> (&'static str, &'static str) {
        match self {
            ProtocolError::MalformedParameter(_) => ("parameter", "malformed"),
            ProtocolError::DuplicateParameter(_) => ("parameter", "duplicate"),
        }
    }
}

/// Parse one input line. Returns `Ok(None)` for lines with nothing to do.
pub fn parse_line(line: &str) -> Result<Option<Request>, ProtocolError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };
    let mut request = Request::new(name);
    for token in tokens {
        let (key, value) = token
            .split_once('=')
            .ok_or_else(|| ProtocolError::MalformedParameter(token.to_string()))?;
        if key.is_empty() {
            return Err(ProtocolError::MalformedParameter(token.to_string()));
        }
        if request.params.contains_key(key) {
            return Err(ProtocolError::DuplicateParameter(key.to_string()));
        }
        request = request.param(key, value);
    }
    Ok(Some(request))
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    reason: &'a str,
    description: String,
}

fn error_line(kind: &str, reason: &str, description: String) -> String {
    json!({ "error": ErrorBody { kind, reason, description } }).to_string()
}

/// Render the result of a handled request as one JSON line.
pub fn render(result: &Result<Outcome, CommandError>) -> String {
    match result {
        Ok(outcome) => match serde_json::to_string(outcome) {
            Ok(line) => line,
            Err(err) => error_line("server", "internal", err.to_string()),
        },
        Err(err) => {
            let rejection = err.rejection();
            error_line(rejection.kind, rejection.reason, err.to_string())
        }
    }
}

/// Render a line that never reached the library.
pub fn render_protocol_error(err: &ProtocolError) -> String {
    let (kind, reason) = err.rejection();
    error_line(kind, reason, err.to_string())
}
