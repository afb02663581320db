use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::graph::NodeKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum DocumentKind {
    #[serde(rename = "g", alias = "genre")]
    Genre,
    #[serde(rename = "a", alias = "artist")]
    Artist,
}

impl From<DocumentKind> for NodeKind {
    fn from(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::Genre => Self::Genre,
            DocumentKind::Artist => Self::Artist,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct DocumentNode {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub name: String,
    #[serde(default, rename = "count", alias = "songCount")]
    pub song_count: u64,
    #[serde(default, rename = "plays", alias = "playCount")]
    pub play_count: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DocumentEdge {
    #[serde(alias = "sourceIndex")]
    pub source: usize,
    #[serde(alias = "targetIndex")]
    pub target: usize,
}

/// On-disk shape of a listening graph, before validation.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDocument {
    pub nodes: Vec<DocumentNode>,
    #[serde(default, rename = "links", alias = "edges")]
    pub edges: Vec<DocumentEdge>,
    #[serde(default)]
    pub max_genre_songs: u64,
    #[serde(default)]
    pub max_artist_songs: u64,
    #[serde(default)]
    pub max_genre_plays: u64,
    #[serde(default)]
    pub max_artist_plays: u64,
}

pub fn parse_graph_document(raw: &str) -> Result<GraphDocument> {
    let json = strip_jsonp(raw);
    serde_json::from_str(json).context("invalid graph document JSON")
}

pub fn read_graph_document(path: &Path) -> Result<GraphDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph document {}", path.display()))?;
    parse_graph_document(&raw)
        .with_context(|| format!("failed to parse graph document {}", path.display()))
}

/// Callback name wrapped around JSON-P exports.
pub const JSONP_CALLBACK: &str = "itgCallback";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Jsonp,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Spaces per nesting level; `None` writes everything on one line.
    pub indent: Option<usize>,
}

pub fn encode_graph_document(document: &GraphDocument, options: ExportOptions) -> Result<String> {
    let json = match options.indent {
        Some(width) => {
            let indent = " ".repeat(width);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut out = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
            document
                .serialize(&mut serializer)
                .context("failed to encode graph document")?;
            String::from_utf8(out).context("encoded graph document is not UTF-8")?
        }
        None => serde_json::to_string(document).context("failed to encode graph document")?,
    };

    Ok(match options.format {
        ExportFormat::Json => json,
        ExportFormat::Jsonp => format!("{JSONP_CALLBACK}({json});"),
    })
}

pub fn write_graph_document(
    path: &Path,
    document: &GraphDocument,
    options: ExportOptions,
) -> Result<()> {
    let encoded = encode_graph_document(document, options)?;
    fs::write(path, encoded).with_context(|| format!("failed to write {}", path.display()))
}

pub(super) fn parse_json_array<T: serde::de::DeserializeOwned>(raw: &str) -> Result<Vec<T>> {
    let value: serde_json::Value =
        serde_json::from_str(strip_jsonp(raw)).context("invalid JSON")?;
    let items = value
        .as_array()
        .ok_or_else(|| anyhow!("expected a JSON array"))?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::deserialize(item).with_context(|| format!("invalid entry {index}"))
        })
        .collect()
}

/// Unwraps `callback({...});` so JSON-P exports decode like plain JSON.
fn strip_jsonp(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return trimmed;
    }

    let Some(open) = trimmed.find('(') else {
        return trimmed;
    };
    let Some(close) = trimmed.rfind(')') else {
        return trimmed;
    };
    if close <= open {
        return trimmed;
    }

    let callback = &trimmed[..open];
    if callback
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.')
    {
        trimmed[open + 1..close].trim()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "nodes": [
            {"id": 0, "name": "Rock", "type": "g", "count": 12, "plays": 40, "rating": 50},
            {"id": 0, "name": "Nirvana", "type": "a", "count": 4, "plays": 9}
        ],
        "links": [{"source": 1, "target": 0}],
        "maxGenreSongs": 12,
        "maxArtistSongs": 4,
        "maxGenrePlays": 40,
        "maxArtistPlays": 9
    }"#;

    #[test]
    fn parses_aggregator_field_names() {
        let document = parse_graph_document(SAMPLE).expect("parse");

        assert_eq!(document.nodes.len(), 2);
        assert_eq!(document.nodes[0].kind, DocumentKind::Genre);
        assert_eq!(document.nodes[0].song_count, 12);
        assert_eq!(document.nodes[1].play_count, 9);
        assert_eq!(document.edges, vec![DocumentEdge { source: 1, target: 0 }]);
        assert_eq!(document.max_genre_plays, 40);
    }

    #[test]
    fn parses_descriptive_field_names() {
        let raw = r#"{
            "nodes": [{"id": 3, "name": "Jazz", "type": "genre", "songCount": 2, "playCount": 5}],
            "edges": [{"sourceIndex": 0, "targetIndex": 0}],
            "maxGenreSongs": 2,
            "maxGenrePlays": 5
        }"#;
        let document = parse_graph_document(raw).expect("parse");

        assert_eq!(document.nodes[0].id, 3);
        assert_eq!(document.nodes[0].play_count, 5);
        assert_eq!(document.edges[0], DocumentEdge { source: 0, target: 0 });
        assert_eq!(document.max_artist_songs, 0);
    }

    #[test]
    fn unwraps_jsonp() {
        let raw = format!("itgCallback({SAMPLE});\n");
        let document = parse_graph_document(&raw).expect("parse");
        assert_eq!(document.nodes[1].name, "Nirvana");
    }

    #[test]
    fn jsonp_export_reads_back() {
        let document = parse_graph_document(SAMPLE).expect("parse");
        let options = ExportOptions {
            format: ExportFormat::Jsonp,
            indent: None,
        };
        let encoded = encode_graph_document(&document, options).expect("encode");

        assert!(encoded.starts_with("itgCallback({"));
        assert!(encoded.ends_with("});"));
        assert!(!encoded.contains('\n'));
        assert_eq!(parse_graph_document(&encoded).expect("reparse"), document);
    }

    #[test]
    fn export_indent_sets_the_nesting_width() {
        let document = parse_graph_document(SAMPLE).expect("parse");
        let options = ExportOptions {
            format: ExportFormat::Json,
            indent: Some(4),
        };
        let encoded = encode_graph_document(&document, options).expect("encode");
        let second_line = encoded.lines().nth(1).expect("multi-line output");

        assert!(second_line.starts_with("    \""));
        assert!(!second_line.starts_with("     "));
        assert_eq!(parse_graph_document(&encoded).expect("reparse"), document);
    }

    #[test]
    fn json_arrays_report_the_bad_entry() {
        let items: Vec<u32> = parse_json_array("[1, 2]").expect("parse");
        assert_eq!(items, vec![1, 2]);

        let error = parse_json_array::<u32>("[1, \"x\"]").expect_err("string entry");
        assert_eq!(error.to_string(), "invalid entry 1");
        assert!(parse_json_array::<u32>("{}").is_err());
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(parse_graph_document("{\"nodes\": 3}").is_err());
        assert!(parse_graph_document("not json").is_err());
        assert!(
            parse_graph_document(r#"{"nodes": [{"id": 0, "name": "x", "type": "z"}]}"#).is_err()
        );
    }
}
