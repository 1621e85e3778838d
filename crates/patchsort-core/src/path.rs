//! RFC 6901 JSON Pointer addressing, independent of any particular JSON tree.
//!
//! A [`Path`] is a sequence of [`Token`]s. Tokens decoded from a raw wire
//! patch are always [`Token::Key`] — a bare string segment gives no hint
//! about whether its parent is an array or an object, so we cannot safely
//! guess. Tokens built while walking an actual `current`/`target` tree (see
//! [`crate::generator`]) carry [`Token::Index`] wherever the tree says the
//! parent is an array.

use std::fmt;

use serde_json::Value;

use crate::SorterError;

/// One segment of a [`Path`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    /// An object member name.
    Key(String),
    /// A sequence position, known to address an array because the path was
    /// built by walking a tree rather than parsed from a raw string.
    Index(usize),
}

impl Token {
    fn as_encoded_str(&self) -> String {
        match self {
            Token::Key(k) => encode_segment(k),
            Token::Index(i) => i.to_string(),
        }
    }
}

/// An RFC 6901 JSON Pointer, decomposed into [`Token`]s.
///
/// ```
/// # use patchsort_core::Path;
/// let path = Path::decode("/PORT/Ethernet0/lanes").unwrap();
/// assert_eq!(path.encode(), "/PORT/Ethernet0/lanes");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Path(Vec<Token>);

impl Path {
    /// The empty path, addressing the whole document.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path directly from tokens, e.g. while walking a tree.
    #[must_use]
    pub fn from_tokens(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }

    /// Decodes a raw RFC 6901 pointer string. Every segment becomes a
    /// [`Token::Key`] — decoding alone cannot tell keys from indices apart.
    ///
    /// ```
    /// # use patchsort_core::{Path, Token};
    /// let path = Path::decode("/a~1b/c~0d").unwrap();
    /// assert_eq!(path.tokens(), &[Token::Key("a/b".into()), Token::Key("c~d".into())]);
    /// ```
    pub fn decode(pointer: &str) -> Result<Self, SorterError> {
        if pointer.is_empty() {
            return Ok(Self::root());
        }
        if !pointer.starts_with('/') {
            return Err(SorterError::InvalidInputPatch(format!(
                "JSON Pointer {pointer:?} must be empty or start with '/'"
            )));
        }
        let tokens = pointer
            .split('/')
            .skip(1)
            .map(|segment| Token::Key(decode_segment(segment)))
            .collect();
        Ok(Self(tokens))
    }

    /// Renders the path back to an RFC 6901 pointer string.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for token in &self.0 {
            out.push('/');
            out.push_str(&token.as_encoded_str());
        }
        out
    }

    /// Returns this path's tokens.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a new path with `token` appended.
    #[must_use]
    pub fn child(&self, token: Token) -> Self {
        let mut tokens = self.0.clone();
        tokens.push(token);
        Self(tokens)
    }

    /// Returns this path's parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Returns the prefix of `self` with `len` segments.
    #[must_use]
    pub fn prefix(&self, len: usize) -> Self {
        Self(self.0[..len.min(self.0.len())].to_vec())
    }

    /// Returns `true` if `self` is a prefix of (or equal to) `other`,
    /// i.e. `other` addresses `self` or a descendant of `self`.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// Resolves this path against `value`, returning the addressed
    /// sub-value if every segment along the way exists and has the
    /// expected shape.
    #[must_use]
    pub fn resolve<'v>(&self, value: &'v Value) -> Option<&'v Value> {
        let mut current = value;
        for token in &self.0 {
            current = match (token, current) {
                (Token::Key(k), Value::Object(map)) => map.get(k)?,
                (Token::Index(i), Value::Array(items)) => items.get(*i)?,
                // A raw, context-free `Key` may still address an array
                // position if its text happens to be a valid index (this is
                // exactly what lets a path decoded from a raw patch resolve
                // against either container kind).
                (Token::Key(k), Value::Array(items)) => {
                    let idx: usize = k.parse().ok()?;
                    items.get(idx)?
                }
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

fn encode_segment(raw: &str) -> String {
    raw.replace('~', "~0").replace('/', "~1")
}

fn decode_segment(raw: &str) -> String {
    // Order matters: ~1 must be decoded after ~0, or "~01" would wrongly
    // become "/" instead of "~1".
    raw.replace("~1", "/").replace("~0", "~")
}
