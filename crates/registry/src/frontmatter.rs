//! Header codec for definition files.
//!
//! A definition file may open with a header: a `---` marker line, a block
//! of YAML key-value data, and a second `---` marker line. [`split`]
//! locates those boundaries without interpreting the YAML, so the body
//! slice stays byte-for-byte identical to the input. Discovery parses the
//! header leniently ([`parse_lossy`]); the training rewrite needs exact
//! boundaries and parses strictly ([`parse_strict`], [`splice`]).

use {
    serde_yaml::{Mapping, Value},
    std::path::Path,
};

/// Marker line that opens and closes a header block.
pub const MARKER: &str = "---";

/// A definition file split at its header boundaries.
#[derive(Debug, PartialEq, Eq)]
pub struct Document<'a> {
    /// Raw YAML between the marker lines. `None` when the file has no
    /// well-formed pair of markers.
    pub header: Option<&'a str>,
    /// Everything after the closing marker line, untouched. The whole
    /// input when no header is present.
    pub body: &'a str,
}

/// Split `content` at its header marker lines.
///
/// The opening marker must be the first non-blank line; the closing marker
/// must start at column zero, since an indented `---` can belong to a YAML
/// block scalar. A file that opens a header but never closes it is treated
/// as having none.
pub fn split(content: &str) -> Document<'_> {
    let text = content.trim_start_matches('\u{feff}').trim_start();

    let Some(rest) = after_opening_marker(text) else {
        return Document { header: None, body: content };
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == MARKER {
            return Document {
                header: Some(&rest[..offset]),
                body: &rest[offset + line.len()..],
            };
        }
        offset += line.len();
    }
    Document { header: None, body: content }
}

fn after_opening_marker(text: &str) -> Option<&str> {
    let (first, rest) = text.split_once('\n')?;
    (first.trim_end() == MARKER).then_some(rest)
}

/// Parse header YAML leniently: malformed or non-mapping headers degrade
/// to an empty mapping with a warning, never an error.
pub fn parse_lossy(header: &str, path: &Path) -> Mapping {
    match serde_yaml::from_str::<Value>(header) {
        Ok(Value::Mapping(map)) => map,
        Ok(Value::Null) => Mapping::new(),
        Ok(_) => {
            tracing::warn!(?path, "header is not a key-value mapping, ignoring");
            Mapping::new()
        },
        Err(e) => {
            tracing::warn!(?path, %e, "malformed header, ignoring");
            Mapping::new()
        },
    }
}

/// Parse header YAML strictly, for callers that rewrite the header in
/// place. The error is the human-readable reason.
pub fn parse_strict(header: &str) -> Result<Mapping, String> {
    match serde_yaml::from_str::<Value>(header) {
        Ok(Value::Mapping(map)) => Ok(map),
        Ok(Value::Null) => Ok(Mapping::new()),
        Ok(_) => Err("header is not a key-value mapping".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Render a full definition file from a header and a markdown body. The
/// body is trimmed and terminated with a single newline.
pub fn compose(header: &Mapping, body: &str) -> crate::Result<String> {
    let yaml = serde_yaml::to_string(header)?;
    Ok(format!("{MARKER}\n{yaml}{MARKER}\n\n{}\n", body.trim()))
}

/// Re-attach a rewritten header to an untouched body slice. `raw_body`
/// must be the [`Document::body`] of the file being rewritten; it is
/// carried over byte-for-byte.
pub fn splice(header: &Mapping, raw_body: &str) -> crate::Result<String> {
    let yaml = serde_yaml::to_string(header)?;
    Ok(format!("{MARKER}\n{yaml}{MARKER}\n{raw_body}"))
}
