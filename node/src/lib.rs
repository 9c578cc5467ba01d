//! Document tree model for the fuda toolkit.
//!
//! A parsed document is a tree of [`Node`]s: scalars, sequences, mappings
//! and tagged nodes. The `text` crate produces and consumes this tree; the
//! `bind` crate resolves tagged nodes into typed values.
//!
//! `Display` renders a node in its canonical flow form, e.g.
//! `!Monster {ac: 16, attacks: [BITE, HURT], hp: [3, 6], name: Cave lizard}`.

pub mod error;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use error::Error;

/// An explicit type annotation attached to a node.
///
/// The textual form is `!Name` where `Name` consists of one or more
/// characters from `[A-Za-z0-9._-]`, e.g. `!Monster` or `!pytest.mark`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    name: String,
}

impl Tag {
    /// Builds a tag from a bare name (without the `!` sigil).
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.is_empty() {
            return Err(Error::EmptyTagName);
        }
        if let Some(c) = name.chars().find(|c| !is_tag_char(*c)) {
            return Err(Error::InvalidTagCharacter(c));
        }
        Ok(Tag {
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "!{}", self.name)
    }
}

impl FromStr for Tag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix('!').ok_or(Error::MissingTagSigil)?;
        Tag::new(name)
    }
}

/// Characters permitted in a tag name.
pub fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// A leaf value.
///
/// Plain-scalar resolution follows the usual textual-tree conventions:
/// `null`, `~` and the empty string resolve to [`Scalar::Null`], `true`
/// and `false` to [`Scalar::Bool`], decimal integers to [`Scalar::Int`],
/// and everything else stays a string.
///
/// A string written in quotes keeps its style as [`Scalar::Quoted`]: it
/// is never re-resolved, and quoting is the escape hatch that keeps a
/// string matching an implicit pattern a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Quoted(String),
}

impl Scalar {
    /// Resolves an unquoted scalar literal to its typed form.
    pub fn from_plain(s: &str) -> Scalar {
        match s {
            "" | "~" | "null" => Scalar::Null,
            "true" => Scalar::Bool(true),
            "false" => Scalar::Bool(false),
            _ => match s.parse::<i64>() {
                Ok(n) => Scalar::Int(n),
                Err(_) => Scalar::Str(s.to_string()),
            },
        }
    }

    /// The string content of a plain or quoted string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) | Scalar::Quoted(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Scalar::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Whether a string scalar must be double-quoted to survive a round trip.
///
/// A string is quoted when its plain form would resolve to a different
/// scalar kind (`"16"`, `"null"`) or collide with structural syntax.
fn needs_quoting(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    if !matches!(Scalar::from_plain(s), Scalar::Str(_)) {
        return true;
    }
    // a leading dash would read as a block sequence item
    if s.starts_with(' ') || s.ends_with(' ') || s == "-" || s.starts_with("- ") {
        return true;
    }
    s.chars().any(|c| {
        matches!(
            c,
            ':' | '#'
                | '{'
                | '}'
                | '['
                | ']'
                | ','
                | '!'
                | '"'
                | '\''
                | '&'
                | '*'
                | '|'
                | '>'
                | '%'
                | '@'
                | '`'
        ) || c.is_control()
    })
}

fn write_quoted(f: &mut Formatter<'_>, s: &str) -> std::fmt::Result {
    write!(f, "\"")?;
    for c in s.chars() {
        match c {
            '"' => write!(f, "\\\"")?,
            '\\' => write!(f, "\\\\")?,
            '\n' => write!(f, "\\n")?,
            '\t' => write!(f, "\\t")?,
            '\0' => write!(f, "\\0")?,
            c => write!(f, "{}", c)?,
        }
    }
    write!(f, "\"")
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Str(s) => {
                if needs_quoting(s) {
                    write_quoted(f, s)
                } else {
                    write!(f, "{}", s)
                }
            }
            Scalar::Quoted(s) => write_quoted(f, s),
        }
    }
}

/// An ordered mapping preserving source entry order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    entries: Vec<(Node, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Mapping::default()
    }

    /// Inserts an entry, replacing the value of an existing equal key.
    pub fn insert(&mut self, key: Node, value: Node) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    /// Looks up a value by string key; quoting on the key is ignored.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find_map(|(k, v)| {
            (k.as_scalar().and_then(Scalar::as_str) == Some(key)).then_some(v)
        })
    }

    pub fn entries(&self) -> &[(Node, Node)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Node, Node)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<(Node, Node)>> for Mapping {
    fn from(entries: Vec<(Node, Node)>) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in entries {
            mapping.insert(k, v);
        }
        mapping
    }
}

impl FromIterator<(Node, Node)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (Node, Node)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (k, v) in iter {
            mapping.insert(k, v);
        }
        mapping
    }
}

/// A node in the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping),
    Tagged(Tag, Box<Node>),
}

impl Node {
    pub fn str(s: &str) -> Node {
        Node::Scalar(Scalar::Str(s.to_string()))
    }

    pub fn quoted(s: &str) -> Node {
        Node::Scalar(Scalar::Quoted(s.to_string()))
    }

    pub fn int(n: i64) -> Node {
        Node::Scalar(Scalar::Int(n))
    }

    pub fn null() -> Node {
        Node::Scalar(Scalar::Null)
    }

    pub fn tagged(tag: Tag, inner: Node) -> Node {
        Node::Tagged(tag, Box::new(inner))
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the tag of a tagged node, if any.
    pub fn tag(&self) -> Option<&Tag> {
        match self {
            Node::Tagged(tag, _) => Some(tag),
            _ => None,
        }
    }

    /// Returns an equivalent tree with every mapping sorted by the flow
    /// form of its keys.
    ///
    /// Two documents that differ only in mapping entry order canonicalize
    /// to equal trees, which is how parse-equivalence is checked.
    pub fn canonicalize(&self) -> Node {
        match self {
            Node::Scalar(s) => Node::Scalar(s.clone()),
            Node::Sequence(items) => {
                Node::Sequence(items.iter().map(Node::canonicalize).collect())
            }
            Node::Mapping(mapping) => {
                let mut entries: Vec<(Node, Node)> = mapping
                    .iter()
                    .map(|(k, v)| (k.canonicalize(), v.canonicalize()))
                    .collect();
                entries.sort_by_key(|(k, _)| k.to_string());
                Node::Mapping(Mapping { entries })
            }
            Node::Tagged(tag, inner) => Node::tagged(tag.clone(), inner.canonicalize()),
        }
    }
}

impl From<i64> for Node {
    fn from(n: i64) -> Self {
        Node::int(n)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Node::str(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Scalar(Scalar::Bool(b))
    }
}

impl From<Scalar> for Node {
    fn from(s: Scalar) -> Self {
        Node::Scalar(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Sequence(items)
    }
}

impl From<Mapping> for Node {
    fn from(m: Mapping) -> Self {
        Node::Mapping(m)
    }
}

impl Display for Node {
    /// Renders the flow form. Mapping entries are emitted in sorted key
    /// order so that equivalent documents render identically.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Node::Scalar(s) => write!(f, "{}", s),
            Node::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Node::Mapping(mapping) => {
                let mut entries: Vec<(String, &Node)> = mapping
                    .iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Node::Tagged(tag, inner) => write!(f, "{} {}", tag, inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::error::Error;
    use crate::{Mapping, Node, Scalar, Tag};
    use std::str::FromStr;

    #[rstest(
        input,
        expected,
        case("!Monster", "Monster"),
        case("!pytest.mark", "pytest.mark"),
        case("!x-y_z.9", "x-y_z.9")
    )]
    fn test_tag_from_str(input: &str, expected: &str) {
        let tag = Tag::from_str(input).unwrap();
        assert_eq!(expected, tag.name());
        assert_eq!(input, tag.to_string());
    }

    #[rstest(
        input,
        expected,
        case("Monster", Error::MissingTagSigil),
        case("!", Error::EmptyTagName),
        case("!a b", Error::InvalidTagCharacter(' ')),
        case("!a:b", Error::InvalidTagCharacter(':'))
    )]
    fn test_tag_from_str_with_error(input: &str, expected: Error) {
        assert_eq!(expected, Tag::from_str(input).unwrap_err());
    }

    #[rstest(
        input,
        expected,
        case("", Scalar::Null),
        case("~", Scalar::Null),
        case("null", Scalar::Null),
        case("true", Scalar::Bool(true)),
        case("false", Scalar::Bool(false)),
        case("16", Scalar::Int(16)),
        case("-3", Scalar::Int(-3)),
        case("Cave lizard", Scalar::Str("Cave lizard".to_string())),
        case("16 hp", Scalar::Str("16 hp".to_string())),
        case("pytest.mark.xfail", Scalar::Str("pytest.mark.xfail".to_string()))
    )]
    fn test_scalar_from_plain(input: &str, expected: Scalar) {
        assert_eq!(expected, Scalar::from_plain(input));
    }

    #[rstest(
        scalar,
        expected,
        case(Scalar::Null, "null"),
        case(Scalar::Int(16), "16"),
        case(Scalar::Str("BITE".to_string()), "BITE"),
        case(Scalar::Str("Cave lizard".to_string()), "Cave lizard"),
        // quoted: the plain form would resolve to a different kind
        case(Scalar::Str("16".to_string()), "\"16\""),
        case(Scalar::Str("null".to_string()), "\"null\""),
        case(Scalar::Str("".to_string()), "\"\""),
        // quoted: structural characters
        case(Scalar::Str("a: b".to_string()), "\"a: b\""),
        case(Scalar::Str("a#b".to_string()), "\"a#b\""),
        case(Scalar::Str("line\nbreak".to_string()), "\"line\\nbreak\""),
        // quoted strings keep their quotes even when plain would do
        case(Scalar::Quoted("BITE".to_string()), "\"BITE\""),
        case(Scalar::Quoted("16".to_string()), "\"16\"")
    )]
    fn test_scalar_display(scalar: Scalar, expected: &str) {
        assert_eq!(expected, scalar.to_string());
    }

    #[rstest]
    fn test_quoted_and_plain_strings_are_distinct() {
        assert_ne!(
            Scalar::Str("pytest.mark.xfail".to_string()),
            Scalar::Quoted("pytest.mark.xfail".to_string())
        );
        assert_eq!(
            Some("pytest.mark.xfail"),
            Scalar::Quoted("pytest.mark.xfail".to_string()).as_str()
        );
    }

    #[rstest]
    fn test_mapping_get_ignores_key_quoting() {
        let mut mapping = Mapping::new();
        mapping.insert(Node::quoted("name"), Node::str("Cave lizard"));
        assert_eq!(Some(&Node::str("Cave lizard")), mapping.get("name"));
    }

    #[rstest]
    fn test_mapping_insert_and_get() {
        let mut mapping = Mapping::new();
        mapping.insert(Node::str("name"), Node::str("Cave lizard"));
        mapping.insert(Node::str("ac"), Node::int(16));
        assert_eq!(Some(&Node::int(16)), mapping.get("ac"));
        assert_eq!(None, mapping.get("hp"));

        // replacement keeps a single entry per key
        mapping.insert(Node::str("ac"), Node::int(18));
        assert_eq!(2, mapping.len());
        assert_eq!(Some(&Node::int(18)), mapping.get("ac"));
    }

    #[rstest]
    fn test_node_display_flow_form() {
        let mut mapping = Mapping::new();
        mapping.insert(Node::str("name"), Node::str("Cave lizard"));
        mapping.insert(Node::str("hp"), Node::Sequence(vec![Node::int(3), Node::int(6)]));
        mapping.insert(Node::str("ac"), Node::int(16));
        mapping.insert(
            Node::str("attacks"),
            Node::Sequence(vec![Node::str("BITE"), Node::str("HURT")]),
        );
        let tag = Tag::new("Monster").unwrap();
        let node = Node::tagged(tag, Node::Mapping(mapping));
        assert_eq!(
            "!Monster {ac: 16, attacks: [BITE, HURT], hp: [3, 6], name: Cave lizard}",
            node.to_string()
        );
    }

    #[rstest]
    fn test_canonicalize_orders_mappings() {
        let a = Node::Mapping(Mapping::from(vec![
            (Node::str("b"), Node::int(2)),
            (Node::str("a"), Node::int(1)),
        ]));
        let b = Node::Mapping(Mapping::from(vec![
            (Node::str("a"), Node::int(1)),
            (Node::str("b"), Node::int(2)),
        ]));
        assert_ne!(a, b);
        assert_eq!(a.canonicalize(), b.canonicalize());
    }
}
