//! Anchor names, tags and document directives.

use std::fmt;

use hashlink::LinkedHashMap;

/// Well-known tags of the YAML core schema.
pub mod tags {
    /// The `tag:yaml.org,2002:` prefix bound to `!!` by default.
    pub const DEFAULT_PREFIX: &str = "tag:yaml.org,2002:";
    /// `!!null`
    pub const NULL: &str = "tag:yaml.org,2002:null";
    /// `!!bool`
    pub const BOOL: &str = "tag:yaml.org,2002:bool";
    /// `!!str`
    pub const STR: &str = "tag:yaml.org,2002:str";
    /// `!!int`
    pub const INT: &str = "tag:yaml.org,2002:int";
    /// `!!float`
    pub const FLOAT: &str = "tag:yaml.org,2002:float";
    /// `!!timestamp`
    pub const TIMESTAMP: &str = "tag:yaml.org,2002:timestamp";
    /// `!!merge`
    pub const MERGE: &str = "tag:yaml.org,2002:merge";
    /// `!!seq`
    pub const SEQ: &str = "tag:yaml.org,2002:seq";
    /// `!!map`
    pub const MAP: &str = "tag:yaml.org,2002:map";
}

/// The name of an anchor (`&name`) or of the anchor an alias refers to (`*name`).
///
/// A missing anchor is represented by [`AnchorName::empty`], which is distinct from any name.
#[derive(Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct AnchorName(Option<String>);

impl AnchorName {
    /// No anchor.
    #[must_use]
    pub fn empty() -> Self {
        AnchorName(None)
    }

    /// An anchor with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        AnchorName(Some(name.into()))
    }

    /// Whether there is no anchor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// The name, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether the name can be written as `&name`: non-empty, no blanks, no flow indicators.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match &self.0 {
            Some(name) => !name.is_empty() && name.chars().all(crate::char_traits::is_anchor_char),
            None => false,
        }
    }
}

impl From<&str> for AnchorName {
    fn from(name: &str) -> Self {
        AnchorName::new(name)
    }
}

impl fmt::Display for AnchorName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(""))
    }
}

/// The tag of a node, once its handle has been resolved against the active directives.
///
/// A node without any tag has an empty `TagName`. The non-specific tags `!` and `?` are kept
/// as such for the schema layer to resolve.
#[derive(Clone, PartialEq, Eq, Hash, Default, Debug)]
pub struct TagName(Option<String>);

impl TagName {
    /// No tag.
    #[must_use]
    pub fn empty() -> Self {
        TagName(None)
    }

    /// A tag with the given (already resolved) value.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        TagName(Some(tag.into()))
    }

    /// The non-specific `!` tag.
    #[must_use]
    pub fn non_specific() -> Self {
        TagName::new("!")
    }

    /// Whether there is no tag.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// The tag, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Whether the tag is `!` or `?`.
    #[must_use]
    pub fn is_non_specific(&self) -> bool {
        matches!(self.as_str(), Some("!" | "?"))
    }

    /// Whether the tag is a local tag (`!foo`).
    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self.as_str(), Some(tag) if tag.starts_with('!') && tag.len() > 1)
    }

    /// Whether the tag is a global (URI) tag.
    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self.as_str(), Some(tag) if !tag.starts_with('!') && tag != "?")
    }
}

impl From<&str> for TagName {
    fn from(tag: &str) -> Self {
        TagName::new(tag)
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str().unwrap_or(""))
    }
}

/// The `%YAML major.minor` directive.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VersionDirective {
    /// Major version. Only 1 is supported.
    pub major: u32,
    /// Minor version.
    pub minor: u32,
}

impl fmt::Display for VersionDirective {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A `%TAG handle prefix` directive.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TagDirective {
    /// The handle, e.g. `!e!`.
    pub handle: String,
    /// What the handle expands to.
    pub prefix: String,
}

impl TagDirective {
    /// Create a directive.
    #[must_use]
    pub fn new(handle: impl Into<String>, prefix: impl Into<String>) -> Self {
        TagDirective {
            handle: handle.into(),
            prefix: prefix.into(),
        }
    }

    /// The two directives every document starts with.
    #[must_use]
    pub fn defaults() -> [TagDirective; 2] {
        [
            TagDirective::new("!", "!"),
            TagDirective::new("!!", tags::DEFAULT_PREFIX),
        ]
    }

    /// Whether this directive is one of [`TagDirective::defaults`].
    #[must_use]
    pub fn is_default(&self) -> bool {
        TagDirective::defaults().contains(self)
    }
}

/// Tag directives keyed by handle, in declaration order.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TagDirectiveCollection {
    directives: LinkedHashMap<String, String>,
}

impl TagDirectiveCollection {
    /// An empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A collection holding the default directives only.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut collection = Self::new();
        collection.add_defaults();
        collection
    }

    /// Add a directive.
    ///
    /// Returns the directive back if its handle is already bound.
    pub fn add(&mut self, directive: TagDirective) -> Result<(), TagDirective> {
        if self.directives.contains_key(&directive.handle) {
            return Err(directive);
        }
        self.directives.insert(directive.handle, directive.prefix);
        Ok(())
    }

    /// Bind the default handles that are not already bound.
    pub fn add_defaults(&mut self) {
        for directive in TagDirective::defaults() {
            let _ = self.add(directive);
        }
    }

    /// Whether `handle` is bound.
    #[must_use]
    pub fn contains(&self, handle: &str) -> bool {
        self.directives.contains_key(handle)
    }

    /// The prefix bound to `handle`.
    #[must_use]
    pub fn get(&self, handle: &str) -> Option<&str> {
        self.directives.get(handle).map(String::as_str)
    }

    /// Number of directives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.directives.len()
    }

    /// Whether there is no directive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Forget every directive.
    pub fn clear(&mut self) {
        self.directives.clear();
    }

    /// Iterate over `(handle, prefix)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.directives
            .iter()
            .map(|(handle, prefix)| (handle.as_str(), prefix.as_str()))
    }

    /// Iterate over the directives that are not defaults.
    pub fn explicit(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|&(handle, prefix)| {
            !TagDirective::defaults()
                .iter()
                .any(|d| d.handle == handle && d.prefix == prefix)
        })
    }
}

impl FromIterator<TagDirective> for TagDirectiveCollection {
    fn from_iter<I: IntoIterator<Item = TagDirective>>(iter: I) -> Self {
        let mut collection = Self::new();
        for directive in iter {
            let _ = collection.add(directive);
        }
        collection
    }
}
