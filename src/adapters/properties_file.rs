// SPDX-License-Identifier: MIT OR Apache-2.0

//! `.properties` configuration file parser.
//!
//! Supports `key=value`, `key: value` and `key value` lines, `#` and `!`
//! comments, backslash line continuations and the usual escapes. A line holding
//! only `#---` or `!---` starts a new document.

use crate::domain::{ConfigError, Result};
use crate::ports::{ConfigParser, Document};

/// Parser for `.properties` files.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::PropertiesParser;
/// use layercfg::ports::ConfigParser;
///
/// let content = "app.name=demo\n#---\napp.config.activate.on-profile=prod\napp.name=prod-demo\n";
/// let documents = PropertiesParser::new().parse(content).unwrap();
/// assert_eq!(documents.len(), 2);
/// assert_eq!(documents[1][1], ("app.name".to_string(), "prod-demo".to_string()));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertiesParser;

impl PropertiesParser {
    /// Creates a new properties parser.
    pub fn new() -> Self {
        PropertiesParser
    }
}

fn is_document_separator(line: &str) -> bool {
    let line = line.trim_end();
    line == "#---" || line == "!---"
}

fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn parse_line(line: &str, line_number: usize) -> Result<(String, String)> {
    let mut key = String::new();
    let mut chars = line.chars().peekable();
    let mut escaped = false;
    while let Some(&ch) = chars.peek() {
        if escaped {
            key.push(unescape(ch, &mut chars, line_number)?);
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            chars.next();
            continue;
        }
        if ch == '=' || ch == ':' || ch.is_whitespace() {
            break;
        }
        key.push(ch);
        chars.next();
    }
    // Skip whitespace, at most one separator, then whitespace again.
    while chars.peek().map_or(false, |c| c.is_whitespace()) {
        chars.next();
    }
    if matches!(chars.peek(), Some('=') | Some(':')) {
        chars.next();
    }
    while chars.peek().map_or(false, |c| c.is_whitespace()) {
        chars.next();
    }
    let mut value = String::new();
    while let Some(&ch) = chars.peek() {
        if ch == '\\' {
            chars.next();
            match chars.peek() {
                Some(&next) => value.push(unescape(next, &mut chars, line_number)?),
                None => break,
            }
        } else {
            value.push(ch);
            chars.next();
        }
    }
    Ok((key, value))
}

fn unescape<I: Iterator<Item = char>>(
    ch: char,
    chars: &mut std::iter::Peekable<I>,
    line_number: usize,
) -> Result<char> {
    chars.next();
    Ok(match ch {
        't' => '\t',
        'n' => '\n',
        'r' => '\r',
        'f' => '\u{000C}',
        'u' => {
            let hex: String = chars.by_ref().take(4).collect();
            u32::from_str_radix(&hex, 16)
                .ok()
                .filter(|_| hex.len() == 4)
                .and_then(char::from_u32)
                .ok_or_else(|| ConfigError::ParseError {
                    message: format!("Malformed \\uxxxx encoding on line {}", line_number),
                    source: None,
                })?
        }
        other => other,
    })
}

impl ConfigParser for PropertiesParser {
    fn parse(&self, content: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut current = Document::new();
        let mut logical = String::new();
        let mut start_line = 0;
        for (index, raw) in content.lines().enumerate() {
            let continuing = !logical.is_empty();
            let line = if continuing { raw.trim_start() } else { raw };
            if !continuing {
                if is_document_separator(line) {
                    documents.push(std::mem::take(&mut current));
                    continue;
                }
                let trimmed = line.trim_start();
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                start_line = index + 1;
            }
            if ends_with_continuation(line) {
                logical.push_str(&line[..line.len() - 1]);
                continue;
            }
            logical.push_str(line);
            current.push(parse_line(logical.trim_start(), start_line)?);
            logical.clear();
        }
        if !logical.is_empty() {
            current.push(parse_line(logical.trim_start(), start_line)?);
        }
        documents.push(current);
        Ok(documents)
    }

    fn supported_extensions(&self) -> &[&str] {
        &["properties"]
    }
}
