//! Parsed instrument definitions.
//!
//! [`Definitions`] is the root of a successful parse: an insertion-ordered
//! map from instrument number to the features that instrument draws. It also
//! writes the document frame (header and trailer) a renderer places around
//! the drawn body.

use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::dsl::Instr;

/// Default frame width in user units.
pub const DEFAULT_FRAME_WIDTH: u32 = 1000;

/// Default frame height in user units.
pub const DEFAULT_FRAME_HEIGHT: u32 = 1000;

/// Settings for the document frame written by [`Definitions::header_with`].
#[derive(Debug, Clone, PartialEq)]
pub struct FrameConfig {
    /// Frame width in user units.
    pub width: u32,
    /// Frame height in user units.
    pub height: u32,
    /// Background fill; `None` leaves the frame transparent.
    pub background: Option<String>,
    /// Document title.
    pub title: Option<String>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
            background: Some("white".to_string()),
            title: None,
        }
    }
}

impl FrameConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set or clear the background fill.
    pub fn with_background(mut self, background: Option<String>) -> Self {
        self.background = background;
        self
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Instrument definitions produced by parsing a score.
///
/// Keys are the instrument numbers as decimal strings, in the order they
/// first appear in the source. Instruments declared together in one block
/// share a single [`Instr`].
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    instruments: IndexMap<String, Arc<Instr>>,
}

impl Definitions {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: String, instr: Arc<Instr>) {
        self.instruments.insert(key, instr);
    }

    /// Check whether an instrument is defined.
    pub fn contains_key(&self, key: &str) -> bool {
        self.instruments.contains_key(key)
    }

    /// Instrument keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.instruments.keys().map(String::as_str)
    }

    /// Look up an instrument by key.
    pub fn get(&self, key: &str) -> Option<&Instr> {
        self.instruments.get(key).map(|instr| instr.as_ref())
    }

    /// Iterate over `(key, instrument)` pairs in declaration order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.instruments.iter(),
        }
    }

    /// Number of defined instruments.
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// Whether no instrument is defined.
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Write the document prologue with the default frame.
    pub fn header<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        self.header_with(&FrameConfig::default(), sink)
    }


    /// Write the document prologue.
    ///
    /// The prologue is rendered completely before a single write to `sink`,
    /// so a successful return means all of it was written.
    pub fn header_with<W: Write + ?Sized>(
        &self,
        config: &FrameConfig,
        sink: &mut W,
    ) -> io::Result<()> {
        let mut out = String::new();
        out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"no\"?>\n");
        out.push_str(&format!(
            "<!-- csgraph {}: instruments {} -->\n",
            env!("CARGO_PKG_VERSION"),
            self.keys().collect::<Vec<_>>().join(" ")
        ));
        out.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n",
            w = config.width,
            h = config.height
        ));
        if let Some(title) = &config.title {
            out.push_str(&format!("  <title>{}</title>\n", escape_xml(title)));
        }
        if let Some(background) = &config.background {
            out.push_str(&format!(
                "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>\n",
                config.width,
                config.height,
                escape_xml(background)
            ));
        }
        sink.write_all(out.as_bytes())
    }

    /// Write the document epilogue.
    ///
    /// The epilogue does not depend on the frame, so there is no `_with` form.
    pub fn trailer<W: Write + ?Sized>(&self, sink: &mut W) -> io::Result<()> {
        let out = format!(
            "<!-- end of {} instrument(s) -->\n</svg>\n",
            self.instruments.len()
        );
        sink.write_all(out.as_bytes())
    }

    /// Canonical DSL source for these definitions.
    ///
    /// Instruments that share a feature set are printed as one block.
    pub fn to_source(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Definitions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut blocks: Vec<(Vec<&str>, &Arc<Instr>)> = Vec::new();
        for (key, instr) in &self.instruments {
            match blocks.iter_mut().find(|(_, shared)| Arc::ptr_eq(*shared, instr)) {
                Some((keys, _)) => keys.push(key.as_str()),
                None => blocks.push((vec![key.as_str()], instr)),
            }
        }

        for (i, (keys, instr)) in blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "instr {} do", keys.join(", "))?;
            write!(f, "{}", instr)?;
            writeln!(f, "end")?;
        }
        Ok(())
    }
}

/// Equal when both hold the same instruments in the same order.
impl PartialEq for Definitions {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

/// Iterator over `(key, instrument)` pairs of [`Definitions`].
pub struct Iter<'a> {
    inner: indexmap::map::Iter<'a, String, Arc<Instr>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a Instr);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, instr)| (key.as_str(), instr.as_ref()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a Definitions {
    type Item = (&'a str, &'a Instr);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
