// Property file parser
// Parses `key = value` lines with `#` comments

use std::fs;
use std::io;
use std::path::Path;

/// Parse property text, invoking `handler` for each key-value pair.
///
/// Keys keep their case. Whitespace around keys and values is trimmed and
/// everything after a `#` is a comment. Lines without `=` are skipped with
/// a warning. The first error returned by `handler` stops parsing.
///
/// # Arguments
/// * `data` - The property file content to parse
/// * `handler` - Callback invoked with `(key, value)` for each entry
pub fn parse_propfile<E>(
    data: &str,
    handler: &mut dyn FnMut(&str, &str) -> Result<(), E>,
) -> Result<(), E> {
    for (index, raw) in data.lines().enumerate() {
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            log::warn!("Line {}: key without value: {:?}", index + 1, line);
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            log::warn!("Line {}: value without key", index + 1);
            continue;
        }
        handler(key, value.trim())?;
    }
    Ok(())
}

/// Read and parse a property file.
///
/// # Errors
/// I/O errors are wrapped into `E`; handler errors pass through unchanged.
pub fn parse_propfile_at<E: From<io::Error>>(
    path: &Path,
    handler: &mut dyn FnMut(&str, &str) -> Result<(), E>,
) -> Result<(), E> {
    let data = fs::read_to_string(path)?;
    parse_propfile(&data, handler)
}
