//! Author names as delivered by search providers and storage

use serde::{Deserialize, Serialize};

/// Separators recognised inside a single delimited author string
pub const AUTHOR_DELIMITERS: [char; 2] = [',', ';'];

/// Author list of a record
///
/// Providers deliver either an ordered list of names or one delimited
/// string (`"Smith A, Johnson B"`). Both forms are kept as received so
/// persisted records round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Authors {
    /// Ordered list of author names
    List(Vec<String>),
    /// Single string with names separated by `,` or `;`
    Delimited(String),
}

impl Default for Authors {
    fn default() -> Self {
        Authors::List(Vec::new())
    }
}

impl Authors {
    /// Build a list form from names
    pub fn list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Authors::List(names.into_iter().map(Into::into).collect())
    }

    /// First author, trimmed
    ///
    /// For a list this is the first element; for a delimited string it is
    /// the text before the first delimiter.
    pub fn first(&self) -> Option<&str> {
        let first = match self {
            Authors::List(names) => names.first().map(String::as_str)?,
            Authors::Delimited(text) => text.split(AUTHOR_DELIMITERS).next()?,
        };
        let first = first.trim();
        (!first.is_empty()).then_some(first)
    }

    /// All non-blank names in order
    pub fn names(&self) -> Vec<&str> {
        match self {
            Authors::List(names) => names
                .iter()
                .map(|n| n.trim())
                .filter(|n| !n.is_empty())
                .collect(),
            Authors::Delimited(text) => text
                .split(AUTHOR_DELIMITERS)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .collect(),
        }
    }

    /// True when there is no usable author name
    pub fn is_missing(&self) -> bool {
        self.names().is_empty()
    }

    /// Names joined with `separator`
    pub fn join(&self, separator: &str) -> String {
        self.names().join(separator)
    }
}

impl From<Vec<String>> for Authors {
    fn from(names: Vec<String>) -> Self {
        Authors::List(names)
    }
}

impl From<&str> for Authors {
    fn from(text: &str) -> Self {
        Authors::Delimited(text.to_string())
    }
}
