//! Header parsing for persona documents
//!
//! A document starts with a `---` line, carries YAML up to the next `---`
//! line, and everything after that is the body. Leading blank lines and a
//! UTF-8 BOM are tolerated; LF and CRLF both work.

use eyre::{Context, Result};
use std::fs;
use std::path::Path;

use super::{Persona, PersonaHeader};

const DELIMITER: &str = "---";

/// Header and body of a parsed document
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub header: PersonaHeader,
    pub raw_header: String,
    pub body: String,
    /// 1-based line in the source where the body starts
    pub body_line: usize,
}

/// Split a document into its raw header block and body
pub fn split_document(content: &str) -> Result<(&str, &str)> {
    let content = content.trim_start_matches('\u{feff}');

    let mut offset = 0;
    let mut header_start: Option<usize> = None;

    for line in content.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let text = line.trim_end_matches(['\n', '\r']);

        match header_start {
            None => {
                if text.trim().is_empty() {
                    continue;
                }
                if text.trim_end() != DELIMITER {
                    eyre::bail!("Document must start with a header block (---)");
                }
                header_start = Some(offset);
            }
            Some(start) => {
                if text.trim_end() == DELIMITER {
                    return Ok((&content[start..line_start], &content[offset..]));
                }
            }
        }
    }

    match header_start {
        None => eyre::bail!("Document is empty"),
        Some(_) => eyre::bail!("No closing header delimiter (---) found"),
    }
}

/// Parse the YAML inside a header block
pub fn parse_header(yaml: &str) -> Result<PersonaHeader> {
    if yaml.trim().is_empty() {
        eyre::bail!("Header block is empty");
    }

    serde_yaml::from_str(yaml).context("Failed to parse YAML header")
}

/// Parse a whole document from a string
pub fn parse_document(content: &str) -> Result<ParsedDocument> {
    let (raw_header, body) = split_document(content)?;
    let header = parse_header(raw_header)?;

    // The body is a suffix of `content`; count the lines before it
    let consumed = &content[..content.len() - body.len()];

    Ok(ParsedDocument {
        header,
        raw_header: raw_header.to_string(),
        body: body.to_string(),
        body_line: consumed.matches('\n').count() + 1,
    })
}

/// Read and parse a persona document; `root` is used for the relative path
pub fn parse_file(path: &Path, root: &Path) -> Result<Persona> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read persona file: {}", path.display()))?;

    let doc = parse_document(&content).with_context(|| format!("Failed to parse header in {}", path.display()))?;

    let relative_path = path.strip_prefix(root).unwrap_or(path).to_path_buf();

    Ok(Persona {
        header: doc.header,
        raw_header: doc.raw_header,
        body: doc.body,
        body_line: doc.body_line,
        path: path.to_path_buf(),
        relative_path,
    })
}
