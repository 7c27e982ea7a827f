//! JSON I/O handling for CLI
//!
//! - Input: one JSON document from a file or stdin
//! - Output: one JSON object per run on stdout
//! - UTF-8 only

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Read a JSON document from `path`, or from stdin when `None`
pub fn read_document(path: Option<&Path>) -> CliResult<Value> {
    let content = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CliError::io_error(format!("Failed to read '{}': {}", path.display(), e))
        })?,
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };

    parse_document(&content)
}

fn parse_document(content: &str) -> CliResult<Value> {
    if content.trim().is_empty() {
        return Err(CliError::io_error("Empty input"));
    }
    Ok(serde_json::from_str(content)?)
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&mut io::stdout(), &json!({"status": "ok", "data": data}))
}

/// Write a validation failure to stdout
pub fn write_invalid(errors: Value) -> CliResult<()> {
    write_line(&mut io::stdout(), &json!({"status": "invalid", "errors": errors}))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(
        &mut io::stdout(),
        &json!({"status": "error", "code": code, "message": message}),
    )
}

fn write_line<W: Write>(writer: &mut W, response: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, response)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_document_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"a": [1, 2]}}"#).unwrap();

        let doc = read_document(Some(file.path())).unwrap();
        assert_eq!(doc, json!({"a": [1, 2]}));
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = parse_document("  \n").unwrap_err();
        assert_eq!(err.code(), "CLI_IO_ERROR");
    }

    #[test]
    fn test_write_line_is_one_line() {
        let mut buffer = Vec::new();
        write_line(&mut buffer, &json!({"status": "ok", "data": {"x": 1}})).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        assert!(output.ends_with('\n'));
        assert_eq!(output.lines().count(), 1);
    }
}
