//! Property-bag view of `<configuration>` and `<properties>` blocks.
//!
//! Maven treats these blocks as free-form key/value maps: every child element
//! name is a key and its text is the value. [`Properties`] decodes such a block
//! into a plain ordered map; nested structures collapse to their text.

use std::collections::BTreeMap;

use xot::{Node, Xot};

/// Decoded key/value block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Decodes the element children of `block`.
    ///
    /// Later duplicates of a key win, matching how Maven merges them.
    pub fn decode(xot: &Xot, block: Node) -> Self {
        let entries = xot
            .children(block)
            .filter_map(|child| {
                let element = xot.element(child)?;
                let key = xot.local_name_str(element.name()).to_string();
                let value = xot
                    .text_content_str(child)
                    .map(|text| text.trim().to_string())
                    .unwrap_or_default();
                Some((key, value))
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for Properties {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
