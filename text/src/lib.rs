//! Parser and emitter for the textual tree format.
//!
//! Documents are UTF-8 text with block and flow collection styles,
//! optional `!Name` tags, quoted and plain scalars, and `#` comments:
//!
//! ```
//! use text::parse;
//!
//! let doc =
//!     parse("!Monster {ac: 16, attacks: [BITE, HURT], hp: [3, 6], name: Cave lizard}").unwrap();
//! assert!(doc.root().tag().is_some());
//! ```
//!
//! Emission via `Display` is canonical: a top-level untagged mapping is
//! written in block form with sorted keys, everything else as a single
//! flow line. `parse(doc.to_string())` reproduces the document up to
//! mapping entry order (see [`node::Node::canonicalize`]).
//!
//! Quoted scalars keep their style in the tree ([`node::Scalar::Quoted`])
//! so later resolution can tell them apart from plain scalars.
//!
//! The supported grammar is a subset of the common textual tree syntax:
//! anchors, aliases, multi-document streams and block scalars are out of
//! scope, and quoted scalars do not span lines.

pub mod error;

mod block;
mod flow;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use fuda::decoder::{DecodableFrom, Decoder};
use fuda::encoder::{EncodableTo, Encoder};
use node::Node;

use error::Error;

/// A parsed document: ownership of the root [`Node`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Node,
}

impl Document {
    pub fn new(root: Node) -> Self {
        Document { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn into_root(self) -> Node {
        self.root
    }

    /// Canonical form for parse-equivalence comparison.
    pub fn canonicalize(&self) -> Document {
        Document {
            root: self.root.canonicalize(),
        }
    }
}

/// Parses a complete document. Empty input is a null document.
pub fn parse(input: &str) -> Result<Document, Error> {
    let lines = block::collect_lines(input)?;
    let Some(first) = lines.first() else {
        return Ok(Document::new(Node::null()));
    };
    if first.indent != 0 {
        return Err(Error::syntax(
            first.number,
            "top-level content must not be indented",
        ));
    }
    if block::is_dash_item(first.content) || block::split_key(first.content).is_some() {
        let mut pos = 0;
        let root = block::parse_block(&lines, &mut pos, 0)?;
        if pos != lines.len() {
            return Err(Error::TrailingInput(lines[pos].number));
        }
        return Ok(Document::new(root));
    }
    // a bare tag on the first line may introduce a block node, the same
    // shape a tagged mapping value takes
    if let Some(tag) = flow::bare_tag(first.content) {
        if let Some(next) = lines.get(1) {
            if block::is_dash_item(next.content) || block::split_key(next.content).is_some() {
                let mut pos = 1;
                let root = block::parse_block(&lines, &mut pos, next.indent)?;
                if pos != lines.len() {
                    return Err(Error::TrailingInput(lines[pos].number));
                }
                return Ok(Document::new(Node::tagged(tag, root)));
            }
        }
    }
    // a flow document, possibly spanning several lines
    let number = first.number;
    let stripped = lines
        .iter()
        .map(|l| l.content)
        .collect::<Vec<_>>()
        .join("\n");
    flow::parse_document(&stripped)
        .map(Document::new)
        .map_err(|message| Error::syntax(number, message))
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.root {
            Node::Mapping(mapping) if !mapping.is_empty() => {
                let mut entries: Vec<(String, &Node)> = mapping
                    .iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                for (key, value) in entries {
                    writeln!(f, "{}: {}", key, value)?;
                }
                Ok(())
            }
            Node::Sequence(items) if !items.is_empty() => {
                for item in items {
                    writeln!(f, "- {}", item)?;
                }
                Ok(())
            }
            root => writeln!(f, "{}", root),
        }
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl DecodableFrom<&str> for Document {}

impl Decoder<&str, Document> for &str {
    type Error = Error;

    fn decode(&self) -> Result<Document, Self::Error> {
        parse(self)
    }
}

impl DecodableFrom<String> for Document {}

impl Decoder<String, Document> for String {
    type Error = Error;

    fn decode(&self) -> Result<Document, Self::Error> {
        parse(self)
    }
}

impl EncodableTo<Document> for String {}

impl Encoder<Document, String> for Document {
    type Error = Error;

    fn encode(&self) -> Result<String, Self::Error> {
        Ok(self.to_string())
    }
}
