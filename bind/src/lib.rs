//! Tag registry and typed bindings.
//!
//! A [`Registry`] owns the associations between tags and the functions
//! that construct and represent typed values. It is an explicit object
//! rather than process-global state: build one per serializer variant,
//! register bindings at startup, and treat it as read-only afterwards.
//!
//! Resolution turns a parsed [`Node`] tree into a [`Value`] tree in which
//! tagged nodes have been replaced by constructed values; representation
//! is the inverse walk. Untagged plain string scalars are matched against
//! registered implicit patterns, so conventionally formatted strings can
//! round-trip without an explicit tag marker. Quoted strings are exempt:
//! writing the scalar in quotes keeps a matching string a string.
//!
//! ```
//! use bind::{Binding, Registry};
//! use node::{Node, Scalar};
//!
//! #[derive(Debug, PartialEq)]
//! struct Flag(bool);
//!
//! impl Binding for Flag {
//!     const TAG: &'static str = "Flag";
//!
//!     fn from_node(node: &Node) -> Result<Self, bind::error::Error> {
//!         let set = node.as_scalar().and_then(Scalar::as_bool).unwrap_or(false);
//!         Ok(Flag(set))
//!     }
//!
//!     fn to_node(&self) -> Result<Node, bind::error::Error> {
//!         Ok(Node::tagged(node::Tag::new(Self::TAG)?, Node::from(self.0)))
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.bind::<Flag>().unwrap();
//! let flag: Flag = registry.from_text("!Flag true").unwrap();
//! assert_eq!(Flag(true), flag);
//! ```
//!
//! An implicit pattern can capture any untagged plain string that happens
//! to match it, whether or not the author meant the tagged type. Anchor
//! patterns tightly and register them only in registries whose documents
//! actually use the convention; document authors can always quote a
//! scalar to opt out.

pub mod error;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use node::{Mapping, Node, Scalar, Tag};
use text::Document;

use error::Error;

/// Object-safe view of a constructed value.
///
/// Implemented for every `Any + Debug` type, so constructors can box
/// arbitrary domain values into a [`Value`] tree.
pub trait Opaque: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + fmt::Debug> Opaque for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A type bound to a tag: its constructor and representer.
///
/// `to_node` decides the emitted form. A record type usually emits a
/// tagged mapping; a decorator-like value may emit a plain string that
/// round-trips through an implicit pattern instead.
pub trait Binding: Any + fmt::Debug + Sized {
    /// Bare tag name, without the `!` sigil.
    const TAG: &'static str;

    /// Constructs a value from the raw parsed node under the tag.
    fn from_node(node: &Node) -> Result<Self, Error>;

    /// Represents the value as a node.
    fn to_node(&self) -> Result<Node, Error>;
}

/// A resolved document tree: structural data with constructed values at
/// the positions where tags (or implicit patterns) matched.
#[derive(Debug)]
pub enum Value {
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Mapping(Vec<(Value, Value)>),
    Other(Box<dyn Opaque>),
}

impl Value {
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Other(boxed) => boxed.as_ref().as_any().downcast_ref(),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a mapping entry by string key; quoting on the key is
    /// ignored.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Mapping(entries) => entries.iter().find_map(|(k, v)| match k {
                Value::Scalar(s) if s.as_str() == Some(key) => Some(v),
                _ => None,
            }),
            _ => None,
        }
    }
}

type Constructor = Box<dyn Fn(&Node) -> Result<Box<dyn Opaque>, Error> + Send + Sync>;
type Representer = Box<dyn Fn(&dyn Opaque) -> Result<Node, Error> + Send + Sync>;

struct ImplicitRule {
    pattern: Regex,
    tag: Tag,
}

/// The tag registry: constructors by tag, representers by type, and
/// implicit pattern rules in registration order.
///
/// Registration is last-wins: binding a tag or type again replaces the
/// earlier binding. Intended use is single-writer initialization followed
/// by read-only resolution; wrap the registry in a lock if it must be
/// mutated concurrently.
#[derive(Default)]
pub struct Registry {
    constructors: HashMap<Tag, Constructor>,
    representers: HashMap<TypeId, Representer>,
    implicit: Vec<ImplicitRule>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<String> = self.constructors.keys().map(Tag::to_string).collect();
        tags.sort();
        f.debug_struct("Registry")
            .field("tags", &tags)
            .field("representers", &self.representers.len())
            .field("implicit_rules", &self.implicit.len())
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Registers a [`Binding`] type under its declared tag.
    pub fn bind<T: Binding>(&mut self) -> Result<(), Error> {
        let tag = Tag::new(T::TAG)?;
        self.bind_with(tag, T::from_node, T::to_node);
        Ok(())
    }

    /// Registers closures for a type that cannot implement [`Binding`]
    /// itself, e.g. a foreign decorator-like value whose constructor
    /// captures a namespace object.
    pub fn bind_with<T, C, R>(&mut self, tag: Tag, construct: C, represent: R)
    where
        T: Any + fmt::Debug,
        C: Fn(&Node) -> Result<T, Error> + Send + Sync + 'static,
        R: Fn(&T) -> Result<Node, Error> + Send + Sync + 'static,
    {
        let constructor: Constructor =
            Box::new(move |node| construct(node).map(|v| Box::new(v) as Box<dyn Opaque>));
        let expected = std::any::type_name::<T>();
        let representer: Representer = Box::new(move |value| {
            let value = value
                .as_any()
                .downcast_ref::<T>()
                .ok_or(Error::TypeMismatch { expected })?;
            represent(value)
        });
        self.constructors.insert(tag, constructor);
        self.representers.insert(TypeId::of::<T>(), representer);
    }

    /// Routes untagged plain string scalars matching `pattern` to `tag`'s
    /// constructor. Rules are consulted in registration order; quoted
    /// strings are never matched.
    pub fn register_implicit(&mut self, pattern: Regex, tag: Tag) {
        self.implicit.push(ImplicitRule { pattern, tag });
    }

    /// Resolves a parsed node tree into a value tree.
    pub fn resolve(&self, node: &Node) -> Result<Value, Error> {
        match node {
            Node::Tagged(tag, inner) => self.construct(tag, inner).map(Value::Other),
            Node::Scalar(Scalar::Str(s)) => {
                for rule in &self.implicit {
                    if rule.pattern.is_match(s) {
                        return self.construct(&rule.tag, node).map(Value::Other);
                    }
                }
                Ok(Value::Scalar(Scalar::Str(s.clone())))
            }
            Node::Scalar(s) => Ok(Value::Scalar(s.clone())),
            Node::Sequence(items) => items
                .iter()
                .map(|item| self.resolve(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Sequence),
            Node::Mapping(mapping) => {
                let mut entries = Vec::with_capacity(mapping.len());
                for (k, v) in mapping.iter() {
                    entries.push((self.resolve(k)?, self.resolve(v)?));
                }
                Ok(Value::Mapping(entries))
            }
        }
    }

    /// Renders a value tree back into nodes, the inverse of `resolve`.
    pub fn render(&self, value: &Value) -> Result<Node, Error> {
        match value {
            Value::Scalar(s) => Ok(Node::Scalar(s.clone())),
            Value::Sequence(items) => items
                .iter()
                .map(|item| self.render(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Node::Sequence),
            Value::Mapping(entries) => {
                let mut mapping = Mapping::new();
                for (k, v) in entries {
                    mapping.insert(self.render(k)?, self.render(v)?);
                }
                Ok(Node::Mapping(mapping))
            }
            Value::Other(opaque) => {
                let representer = self
                    .representers
                    .get(&opaque.as_ref().as_any().type_id())
                    .ok_or_else(|| Error::NoRepresenter(opaque.as_ref().type_name()))?;
                representer(opaque.as_ref())
            }
        }
    }

    /// Parses text and resolves the root into a `T`.
    pub fn from_text<T: Any>(&self, input: &str) -> Result<T, Error> {
        let doc = text::parse(input)?;
        match self.resolve(doc.root())? {
            Value::Other(boxed) => boxed
                .into_any()
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| Error::TypeMismatch {
                    expected: std::any::type_name::<T>(),
                }),
            _ => Err(Error::TypeMismatch {
                expected: std::any::type_name::<T>(),
            }),
        }
    }

    /// Represents a typed value and emits it as document text.
    pub fn to_text<T: Any + fmt::Debug>(&self, value: &T) -> Result<String, Error> {
        let node = self.represent(value)?;
        Ok(Document::new(node).to_string())
    }

    /// Looks up the representer for `T` and applies it.
    pub fn represent<T: Any + fmt::Debug>(&self, value: &T) -> Result<Node, Error> {
        let representer = self
            .representers
            .get(&TypeId::of::<T>())
            .ok_or_else(|| Error::NoRepresenter(std::any::type_name::<T>()))?;
        representer(value)
    }

    fn construct(&self, tag: &Tag, node: &Node) -> Result<Box<dyn Opaque>, Error> {
        let constructor = self
            .constructors
            .get(tag)
            .ok_or_else(|| Error::UnknownTag(tag.to_string()))?;
        constructor(node)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use node::{Node, Scalar, Tag};
    use regex::Regex;

    use crate::error::Error;
    use crate::{Binding, Registry, Value};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Flag(bool);

    impl Binding for Flag {
        const TAG: &'static str = "Flag";

        fn from_node(node: &Node) -> Result<Self, Error> {
            node.as_scalar()
                .and_then(Scalar::as_bool)
                .map(Flag)
                .ok_or(Error::UnexpectedShape("boolean scalar"))
        }

        fn to_node(&self) -> Result<Node, Error> {
            Ok(Node::tagged(Tag::new(Self::TAG)?, Node::from(self.0)))
        }
    }

    #[rstest]
    fn test_bind_and_from_text() {
        let mut registry = Registry::new();
        registry.bind::<Flag>().unwrap();
        assert_eq!(Flag(true), registry.from_text::<Flag>("!Flag true").unwrap());
    }

    #[rstest]
    fn test_unknown_tag_error() {
        let registry = Registry::new();
        let err = registry.from_text::<Flag>("!Flag true").unwrap_err();
        assert_eq!(Error::UnknownTag("!Flag".to_string()), err);
    }

    #[rstest]
    fn test_no_representer_error() {
        let registry = Registry::new();
        let err = registry.to_text(&Flag(true)).unwrap_err();
        assert!(matches!(err, Error::NoRepresenter(_)));
    }

    #[rstest]
    fn test_from_text_type_mismatch() {
        let mut registry = Registry::new();
        registry.bind::<Flag>().unwrap();
        let err = registry.from_text::<String>("!Flag true").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[rstest]
    fn test_untyped_root_is_not_a_value() {
        let mut registry = Registry::new();
        registry.bind::<Flag>().unwrap();
        let err = registry.from_text::<Flag>("plain text").unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[rstest]
    fn test_duplicate_registration_last_wins() {
        let mut registry = Registry::new();
        registry.bind::<Flag>().unwrap();
        // rebinding the same tag replaces the constructor
        registry.bind_with(
            Tag::new("Flag").unwrap(),
            |_node: &Node| Ok(Flag(false)),
            |flag: &Flag| Flag::to_node(flag),
        );
        assert_eq!(
            Flag(false),
            registry.from_text::<Flag>("!Flag true").unwrap()
        );
    }

    #[rstest]
    fn test_implicit_rule_routes_matching_strings() {
        let mut registry = Registry::new();
        registry.bind::<Flag>().unwrap();
        registry.register_implicit(
            Regex::new(r"^flag\.(?:on|off)$").unwrap(),
            Tag::new("Flag").unwrap(),
        );
        // rebind with a constructor understanding the string form
        registry.bind_with(
            Tag::new("Flag").unwrap(),
            |node: &Node| {
                let s = node
                    .as_scalar()
                    .and_then(Scalar::as_str)
                    .ok_or(Error::UnexpectedShape("string scalar"))?;
                Ok(Flag(s.ends_with("on")))
            },
            Flag::to_node,
        );
        let resolved = registry.resolve(&Node::str("flag.on")).unwrap();
        assert_eq!(Some(&Flag(true)), resolved.downcast_ref::<Flag>());

        // non-matching strings pass through untouched
        let resolved = registry.resolve(&Node::str("flag.maybe")).unwrap();
        assert!(matches!(resolved, Value::Scalar(Scalar::Str(_))));

        // quoting opts a matching string out of the rule
        let resolved = registry.resolve(&Node::quoted("flag.on")).unwrap();
        assert!(matches!(resolved, Value::Scalar(Scalar::Quoted(_))));
    }

    #[rstest]
    fn test_resolve_is_structural() {
        let mut registry = Registry::new();
        registry.bind::<Flag>().unwrap();
        let doc = text::parse("flags: [!Flag true, !Flag false]").unwrap();
        let resolved = registry.resolve(doc.root()).unwrap();
        let Some(Value::Sequence(items)) = resolved.get("flags") else {
            panic!("expected a sequence of flags");
        };
        assert_eq!(Some(&Flag(true)), items[0].downcast_ref::<Flag>());
        assert_eq!(Some(&Flag(false)), items[1].downcast_ref::<Flag>());
    }

    #[rstest]
    fn test_render_round_trip() {
        let mut registry = Registry::new();
        registry.bind::<Flag>().unwrap();
        let doc = text::parse("flag: !Flag true").unwrap();
        let resolved = registry.resolve(doc.root()).unwrap();
        let rendered = registry.render(&resolved).unwrap();
        assert_eq!(doc.root().canonicalize(), rendered.canonicalize());
    }
}
