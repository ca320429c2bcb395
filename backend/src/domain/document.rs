//! Document identity and content kinds.
//!
//! A document is a named blob of bytes. The name doubles as the storage key
//! and decides how the content is rendered, so every name is validated once
//! through [`DocumentName::parse`] before any store operation sees it.

use std::fmt;

/// Maximum document name length, in characters.
pub const DOCUMENT_NAME_MAX: usize = 100;

/// Validation errors returned by [`DocumentName::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentNameError {
    /// The name was empty once trimmed.
    Empty,
    /// The name exceeds [`DOCUMENT_NAME_MAX`] characters.
    TooLong { max: usize },
    /// The name contains characters outside the allowed set.
    InvalidCharacters,
    /// The name starts with a dot.
    LeadingDot,
    /// A path segment carries leading or trailing whitespace.
    SurroundingWhitespace,
}

impl fmt::Display for DocumentNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "A name is required"),
            Self::TooLong { max } => write!(f, "Name must be at most {max} characters"),
            Self::InvalidCharacters => write!(
                f,
                "Name may only contain letters, numbers, spaces, dots, dashes, or underscores"
            ),
            Self::LeadingDot => write!(f, "Name must not start with a dot"),
            Self::SurroundingWhitespace => {
                write!(f, "Name must not start or end with whitespace")
            }
        }
    }
}

impl std::error::Error for DocumentNameError {}

/// Validated document name.
///
/// ## Invariants
/// - Surrounding whitespace is trimmed.
/// - Between 1 and [`DOCUMENT_NAME_MAX`] characters.
/// - Only ASCII letters, digits, spaces, `.`, `-` and `_`; no leading dot.
///   Path separators and `..` can therefore never reach the store.
///
/// # Examples
/// ```
/// use cms::domain::{DocumentName, DocumentNameError};
///
/// let name = DocumentName::parse(" about.md ").expect("valid name");
/// assert_eq!(name.as_str(), "about.md");
/// assert_eq!(DocumentName::parse("../etc/passwd"), Err(DocumentNameError::InvalidCharacters));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentName(String);

impl DocumentName {
    /// Validate raw input into a name.
    pub fn parse(raw: &str) -> Result<Self, DocumentNameError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DocumentNameError::Empty);
        }
        if name.chars().count() > DOCUMENT_NAME_MAX {
            return Err(DocumentNameError::TooLong {
                max: DOCUMENT_NAME_MAX,
            });
        }
        if !name.chars().all(is_name_char) {
            return Err(DocumentNameError::InvalidCharacters);
        }
        if name.starts_with('.') {
            return Err(DocumentNameError::LeadingDot);
        }
        Ok(Self(name.to_owned()))
    }

    /// Validate a name taken from a URL path segment.
    ///
    /// Unlike [`parse`](Self::parse) nothing is trimmed: `/%20about.md` does
    /// not address `about.md`.
    pub fn from_path(raw: &str) -> Result<Self, DocumentNameError> {
        let name = Self::parse(raw)?;
        if name.0 != raw {
            return Err(DocumentNameError::SurroundingWhitespace);
        }
        Ok(name)
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rendering mode implied by the extension.
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        ContentKind::for_name(&self.0)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, ' ' | '.' | '-' | '_')
}

impl AsRef<str> for DocumentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a document's bytes are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Served verbatim as `text/plain`.
    Plain,
    /// Converted from Markdown to HTML.
    Markdown,
}

impl ContentKind {
    /// Resolve the kind from a file name. Only `.md` selects markdown;
    /// `.txt` and every other extension fall back to plain text.
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        match name.rsplit_once('.') {
            Some((stem, "md")) if !stem.is_empty() => Self::Markdown,
            _ => Self::Plain,
        }
    }
}

/// A document loaded from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    name: DocumentName,
    content: Vec<u8>,
}

impl Document {
    /// Pair a name with its raw content.
    #[must_use]
    pub fn new(name: DocumentName, content: Vec<u8>) -> Self {
        Self { name, content }
    }

    /// Document name.
    #[must_use]
    pub fn name(&self) -> &DocumentName {
        &self.name
    }

    /// Raw bytes as stored.
    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Content decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Rendering mode implied by the name.
    #[must_use]
    pub fn kind(&self) -> ContentKind {
        self.name.kind()
    }
}
