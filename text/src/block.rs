//! Line-oriented block parser.
//!
//! Block syntax is the indented form of the textual tree format:
//!
//! ```text
//! tests:
//! - mark: pytest.mark.xfail
//!   name: feature_A_exists
//! - name: feature_B_exists
//! ```
//!
//! The parser walks a cursor over comment-stripped lines. Indentation is
//! spaces only; a mapping entry value either follows the key on the same
//! line in flow form, or is a nested block on deeper lines.

use node::{Mapping, Node};

use crate::error::Error;
use crate::flow;

/// One significant input line: comment-stripped, end-trimmed, non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    /// 1-based line number in the original input.
    pub(crate) number: usize,
    /// Count of leading spaces.
    pub(crate) indent: usize,
    /// Line content with the indentation removed.
    pub(crate) content: &'a str,
}

/// Splits input into significant lines, stripping comments and rejecting
/// tab indentation and unterminated quotes.
pub(crate) fn collect_lines(input: &str) -> Result<Vec<Line<'_>>, Error> {
    let mut lines = Vec::new();
    for (i, raw) in input.lines().enumerate() {
        let number = i + 1;
        let end = content_end(raw, number)?;
        let content = raw[..end].trim_end();
        if content.trim().is_empty() {
            continue;
        }
        let mut indent = 0;
        for c in content.chars() {
            match c {
                ' ' => indent += 1,
                '\t' => return Err(Error::TabIndent(number)),
                _ => break,
            }
        }
        lines.push(Line {
            number,
            indent,
            content: &content[indent..],
        });
    }
    Ok(lines)
}

/// Byte offset where an unquoted `#` starts a comment, or the line length.
fn content_end(line: &str, number: usize) -> Result<usize, Error> {
    let mut quote: Option<char> = None;
    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match quote {
            Some('"') => match c {
                '\\' => {
                    chars.next();
                }
                '"' => quote = None,
                _ => {}
            },
            Some(_) => {
                if c == '\'' {
                    // '' stays inside the scalar
                    if let Some((_, '\'')) = chars.peek() {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '#' => return Ok(i),
                _ => {}
            },
        }
    }
    if quote.is_some() {
        return Err(Error::UnterminatedQuote(number));
    }
    Ok(line.len())
}

/// Whether a line introduces a block sequence item.
pub(crate) fn is_dash_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

/// Finds the mapping separator: a top-level `:` followed by a space or
/// the end of line. Quoted scalars and flow collections are skipped, so
/// `"a: b"` and `{a: 1}` never split.
pub(crate) fn split_key(content: &str) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = content.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if let Some(q) = quote {
            match (q, c) {
                ('"', '\\') => {
                    chars.next();
                }
                ('"', '"') => quote = None,
                ('\'', '\'') => {
                    if let Some((_, '\'')) = chars.peek() {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' | '{' => depth += 1,
            ']' | '}' => depth = depth.saturating_sub(1),
            ':' if depth == 0 => {
                let value = &content[i + 1..];
                if value.is_empty() || value.starts_with(' ') {
                    return Some((&content[..i], value));
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses the block node starting at the cursor, at the given indent.
pub(crate) fn parse_block(lines: &[Line], pos: &mut usize, indent: usize) -> Result<Node, Error> {
    if is_dash_item(lines[*pos].content) {
        parse_sequence(lines, pos, indent)
    } else {
        parse_mapping(lines, pos, indent)
    }
}

fn parse_sequence(lines: &[Line], pos: &mut usize, indent: usize) -> Result<Node, Error> {
    let mut items = Vec::new();
    while *pos < lines.len() {
        let line = lines[*pos];
        if line.indent != indent || !is_dash_item(line.content) {
            break;
        }
        *pos += 1;
        let rest = line.content[1..].trim_start();
        let item = if rest.is_empty() {
            nested_or_null(lines, pos, indent)?
        } else if split_key(rest).is_some() {
            // compact mapping: the first entry shares the dash line and
            // following entries align under it
            let item_indent = line.indent + (line.content.len() - rest.len());
            parse_compact_mapping(rest, line.number, lines, pos, item_indent)?
        } else {
            inline_value(rest, line.number, lines, pos, indent)?
        };
        items.push(item);
    }
    Ok(Node::Sequence(items))
}

fn parse_mapping(lines: &[Line], pos: &mut usize, indent: usize) -> Result<Node, Error> {
    let mut mapping = Mapping::new();
    while *pos < lines.len() {
        let line = lines[*pos];
        if line.indent != indent {
            break;
        }
        if is_dash_item(line.content) {
            return Err(Error::syntax(
                line.number,
                "sequence item in mapping context",
            ));
        }
        *pos += 1;
        let (key, value) = parse_entry(line.content, line.number, lines, pos, indent)?;
        mapping.insert(key, value);
    }
    Ok(Node::Mapping(mapping))
}

fn parse_compact_mapping(
    first: &str,
    number: usize,
    lines: &[Line],
    pos: &mut usize,
    indent: usize,
) -> Result<Node, Error> {
    let mut mapping = Mapping::new();
    let (key, value) = parse_entry(first, number, lines, pos, indent)?;
    mapping.insert(key, value);
    while *pos < lines.len() {
        let line = lines[*pos];
        if line.indent != indent || is_dash_item(line.content) {
            break;
        }
        *pos += 1;
        let (key, value) = parse_entry(line.content, line.number, lines, pos, indent)?;
        mapping.insert(key, value);
    }
    Ok(Node::Mapping(mapping))
}

/// Parses one `key: value` entry whose key line has been consumed.
fn parse_entry(
    content: &str,
    number: usize,
    lines: &[Line],
    pos: &mut usize,
    indent: usize,
) -> Result<(Node, Node), Error> {
    let (key_text, value_text) =
        split_key(content).ok_or_else(|| Error::syntax(number, "expected a 'key: value' entry"))?;
    let key = flow::parse_document(key_text.trim())
        .map_err(|message| Error::syntax(number, message))?;
    let value_text = value_text.trim();
    let value = if value_text.is_empty() {
        // a block sequence value may sit at the same indent as its key
        if *pos < lines.len()
            && lines[*pos].indent == indent
            && is_dash_item(lines[*pos].content)
        {
            parse_sequence(lines, pos, indent)?
        } else {
            nested_or_null(lines, pos, indent)?
        }
    } else {
        inline_value(value_text, number, lines, pos, indent)?
    };
    Ok((key, value))
}

/// Parses an inline value: a flow node, or a bare tag whose node follows
/// as a nested block.
fn inline_value(
    text: &str,
    number: usize,
    lines: &[Line],
    pos: &mut usize,
    indent: usize,
) -> Result<Node, Error> {
    if let Some(tag) = flow::bare_tag(text) {
        let inner = nested_or_null(lines, pos, indent)?;
        return Ok(Node::tagged(tag, inner));
    }
    flow::parse_document(text).map_err(|message| Error::syntax(number, message))
}

fn nested_or_null(lines: &[Line], pos: &mut usize, indent: usize) -> Result<Node, Error> {
    if *pos < lines.len() && lines[*pos].indent > indent {
        let child = lines[*pos].indent;
        parse_block(lines, pos, child)
    } else {
        Ok(Node::null())
    }
}
