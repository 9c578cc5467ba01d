//! Flow-style node parser built on nom.
//!
//! Flow syntax is the bracketed form of the textual tree format:
//! `!Monster {ac: 16, attacks: [BITE, HURT], hp: [3, 6], name: Cave lizard}`.
//! Flow collections may span lines; quoted scalars may not.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt},
    multi::separated_list0,
    sequence::{delimited, preceded, terminated},
};

use node::{Mapping, Node, Scalar, Tag, is_tag_char};

/// Characters that terminate a plain scalar in flow context.
const FLOW_INDICATORS: &str = ",[]{}:#\n";

/// Parses a complete flow document, consuming all input.
pub(crate) fn parse_document(input: &str) -> Result<Node, String> {
    match all_consuming(delimited(multispace0, flow_node, multispace0)).parse(input) {
        Ok((_, node)) => Ok(node),
        Err(e) => Err(format!("{:?}", e)),
    }
}

/// Recognizes input that is exactly one tag literal (e.g. `!Monster`),
/// used for block values whose node follows on deeper lines.
pub(crate) fn bare_tag(input: &str) -> Option<Tag> {
    match all_consuming(delimited(multispace0, tag_literal, multispace0)).parse(input) {
        Ok((_, tag)) => Some(tag),
        Err(_) => None,
    }
}

fn flow_node(input: &str) -> IResult<&str, Node> {
    let (input, tag) = opt(terminated(tag_literal, multispace0)).parse(input)?;
    match tag {
        Some(tag) => {
            // a tag with no following node wraps a null scalar
            let (input, value) = opt(flow_value).parse(input)?;
            Ok((input, Node::tagged(tag, value.unwrap_or_else(Node::null))))
        }
        None => flow_value(input),
    }
}

fn flow_value(input: &str) -> IResult<&str, Node> {
    alt((
        flow_sequence,
        flow_mapping,
        map(double_quoted, |s| Node::Scalar(Scalar::Quoted(s))),
        map(single_quoted, |s| Node::Scalar(Scalar::Quoted(s))),
        map(plain, Node::Scalar),
    ))
    .parse(input)
}

fn tag_literal(input: &str) -> IResult<&str, Tag> {
    let (input, _) = char('!').parse(input)?;
    let (input, name) = take_while1(is_tag_char).parse(input)?;
    match Tag::new(name) {
        Ok(tag) => Ok((input, tag)),
        Err(_) => Err(nom::Err::Failure(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Tag,
        ))),
    }
}

fn flow_sequence(input: &str) -> IResult<&str, Node> {
    map(
        delimited(
            terminated(char('['), multispace0),
            separated_list0(delimited(multispace0, char(','), multispace0), flow_node),
            preceded(multispace0, char(']')),
        ),
        Node::Sequence,
    )
    .parse(input)
}

fn flow_mapping(input: &str) -> IResult<&str, Node> {
    map(
        delimited(
            terminated(char('{'), multispace0),
            separated_list0(delimited(multispace0, char(','), multispace0), flow_entry),
            preceded(multispace0, char('}')),
        ),
        |entries| Node::Mapping(Mapping::from(entries)),
    )
    .parse(input)
}

fn flow_entry(input: &str) -> IResult<&str, (Node, Node)> {
    let (input, key) = scalar_key(input)?;
    let (input, _) = delimited(multispace0, char(':'), multispace0).parse(input)?;
    // `{a: }` carries a null value
    let (input, value) = opt(flow_node).parse(input)?;
    Ok((input, (key, value.unwrap_or_else(Node::null))))
}

fn scalar_key(input: &str) -> IResult<&str, Node> {
    alt((
        map(double_quoted, |s| Node::Scalar(Scalar::Quoted(s))),
        map(single_quoted, |s| Node::Scalar(Scalar::Quoted(s))),
        map(plain, Node::Scalar),
    ))
    .parse(input)
}

fn plain(input: &str) -> IResult<&str, Scalar> {
    let (rest, s) = take_while1(|c: char| !FLOW_INDICATORS.contains(c)).parse(input)?;
    Ok((rest, Scalar::from_plain(s.trim())))
}

fn double_quoted(input: &str) -> IResult<&str, String> {
    let (input, _) = char('"').parse(input)?;
    let mut out = String::new();
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((&input[i + 1..], out)),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, '0')) => out.push('\0'),
                Some((_, '"')) => out.push('"'),
                Some((_, '\\')) => out.push('\\'),
                _ => {
                    return Err(nom::Err::Failure(nom::error::Error::new(
                        input,
                        nom::error::ErrorKind::Escaped,
                    )));
                }
            },
            '\n' => break,
            c => out.push(c),
        }
    }
    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn single_quoted(input: &str) -> IResult<&str, String> {
    let (input, _) = char('\'').parse(input)?;
    let mut out = String::new();
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '\'' => {
                // '' is an escaped single quote
                if let Some((_, '\'')) = chars.peek() {
                    chars.next();
                    out.push('\'');
                } else {
                    return Ok((&input[i + 1..], out));
                }
            }
            '\n' => break,
            c => out.push(c),
        }
    }
    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use node::{Mapping, Node, Scalar, Tag};

    use super::parse_document;

    fn monster_node() -> Node {
        let mut mapping = Mapping::new();
        mapping.insert(Node::str("ac"), Node::int(16));
        mapping.insert(
            Node::str("attacks"),
            Node::Sequence(vec![Node::str("BITE"), Node::str("HURT")]),
        );
        mapping.insert(Node::str("hp"), Node::Sequence(vec![Node::int(3), Node::int(6)]));
        mapping.insert(Node::str("name"), Node::str("Cave lizard"));
        Node::tagged(Tag::new("Monster").unwrap(), Node::Mapping(mapping))
    }

    #[rstest]
    fn test_parse_tagged_mapping() {
        let input = "!Monster {ac: 16, attacks: [BITE, HURT], hp: [3, 6], name: Cave lizard}";
        assert_eq!(monster_node(), parse_document(input).unwrap());
    }

    #[rstest]
    fn test_parse_multiline_flow() {
        let input = "{ac: 16,\n  hp: [3,\n 6]}";
        let parsed = parse_document(input).unwrap();
        let mapping = parsed.as_mapping().unwrap();
        assert_eq!(Some(&Node::int(16)), mapping.get("ac"));
        assert_eq!(
            Some(&Node::Sequence(vec![Node::int(3), Node::int(6)])),
            mapping.get("hp")
        );
    }

    #[rstest(
        input,
        expected,
        case("[]", Node::Sequence(vec![])),
        case("[ ]", Node::Sequence(vec![])),
        case("{}", Node::Mapping(Mapping::new())),
        case("BITE", Node::str("BITE")),
        case("Cave lizard", Node::str("Cave lizard")),
        case("-3", Node::int(-3)),
        case("null", Node::null()),
        case("~", Node::null()),
        case("true", Node::from(true)),
        // quoted scalars keep their style and are never re-resolved
        case("\"16\"", Node::quoted("16")),
        case("'it''s'", Node::quoted("it's")),
        case("\"a: b\"", Node::quoted("a: b")),
        case("\"line\\nbreak\"", Node::quoted("line\nbreak"))
    )]
    fn test_parse_simple(input: &str, expected: Node) {
        assert_eq!(expected, parse_document(input).unwrap());
    }

    #[rstest]
    fn test_parse_tagged_scalar() {
        let input = "!pytest.mark pytest.mark.xfail";
        let expected = Node::tagged(
            Tag::new("pytest.mark").unwrap(),
            Node::str("pytest.mark.xfail"),
        );
        assert_eq!(expected, parse_document(input).unwrap());
    }

    #[rstest]
    fn test_parse_bare_tag_wraps_null() {
        let parsed = parse_document("!Empty").unwrap();
        assert_eq!(
            Node::tagged(Tag::new("Empty").unwrap(), Node::Scalar(Scalar::Null)),
            parsed
        );
    }

    #[rstest]
    fn test_duplicate_flow_keys_last_wins() {
        let parsed = parse_document("{a: 1, a: 2}").unwrap();
        let mapping = parsed.as_mapping().unwrap();
        assert_eq!(1, mapping.len());
        assert_eq!(Some(&Node::int(2)), mapping.get("a"));
    }

    #[rstest(
        input,
        case("[1, 2"),
        case("{a: 1"),
        case("\"unterminated"),
        case("'unterminated"),
        case("[1,, 2]"),
        case("extra ] bracket")
    )]
    fn test_parse_invalid(input: &str) {
        assert!(parse_document(input).is_err());
    }
}
