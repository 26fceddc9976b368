//! Converter vocabulary.
//!
//! A converter is a named unary transform (`cpspch`, `ampdb`, ...) that an
//! external evaluator applies to a node's value. Nothing here computes; the
//! parser only checks names against a [`ConverterSet`] handed to it through
//! its configuration.

use std::collections::BTreeSet;
use std::fmt;

/// Csound value converters recognized by [`ConverterSet::csound`].
pub const CSOUND_CONVERTERS: &[&str] = &[
    // pitch
    "cpspch", "cpsoct", "octpch", "pchoct", "octcps", "cpsmidinn", "octmidinn", "pchmidinn",
    // amplitude
    "ampdb", "ampdbfs", "dbamp", "dbfsamp",
];

/// The name of a converter attached to an expression node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Converter(String);

impl Converter {
    /// Create a converter tag from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The converter name as written in the score.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Converter {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Converter {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// What the parser does with a converter call whose name is not in the
/// configured vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownConverterPolicy {
    /// Record the name as written; validity is the evaluator's concern.
    #[default]
    Record,
    /// Fail the parse with a syntax error.
    Reject,
}

/// A set of recognized converter names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConverterSet {
    names: BTreeSet<String>,
}

impl ConverterSet {
    /// Create an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// The Csound pitch and amplitude converters.
    pub fn csound() -> Self {
        CSOUND_CONVERTERS.iter().copied().collect()
    }

    /// Add a converter name.
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.names.insert(name.into());
        self
    }

    /// Check whether a name is part of the vocabulary.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of recognized names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over the recognized names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ConverterSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
