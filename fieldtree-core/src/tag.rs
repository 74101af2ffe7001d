//! Raw per-field metadata.

use core::fmt;

/// A raw field tag in the conventional `key:"value" other:"value"` format.
///
/// The tag is stored verbatim and only parsed when [`Tag::lookup`] is called.
/// Quoted values are returned as written: escape sequences are not
/// interpreted.
///
/// ```
/// use fieldtree_core::Tag;
///
/// let tag = Tag::new(r#"json:"name" mapper:"n""#);
/// assert_eq!(tag.lookup("mapper"), Some("n"));
/// assert_eq!(tag.get("missing"), "");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tag(&'static str);

impl Tag {
    /// Wrap a raw tag string.
    pub const fn new(raw: &'static str) -> Self {
        Self(raw)
    }

    /// Returns the raw tag string.
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Returns true if no tag was attached.
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the value associated with `key`, or an empty string.
    pub fn get(&self, key: &str) -> &'static str {
        self.lookup(key).unwrap_or_default()
    }

    /// Returns the value associated with `key`, if the key is present.
    ///
    /// A key that is present with an empty value yields `Some("")`.
    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        self.pairs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Iterates over every well-formed `key:"value"` pair, in order.
    ///
    /// Parsing stops at the first malformed pair.
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &'static str)> {
        let mut rest = self.0;
        core::iter::from_fn(move || {
            rest = rest.trim_start_matches(' ');
            let (key, after) = rest.split_once(":\"")?;
            if key.is_empty() || key.contains([' ', '"', ':']) {
                return None;
            }
            let end = closing_quote(after)?;
            let value = &after[..end];
            rest = &after[end + 1..];
            Some((key, value))
        })
    }
}

/// Finds the closing quote, skipping backslash-escaped characters.
fn closing_quote(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}
