//! Hyperlink registry (OSC 8).
//!
//! Cells carry a [`HyperlinkId`]: an opaque key into the registry owned by
//! the screen. The key is non-owning; resolving an id that is no longer
//! registered simply yields "no hyperlink".

use serde::{Deserialize, Serialize};

/// Opaque hyperlink key. `NONE` (0) means no hyperlink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HyperlinkId(pub u32);

impl HyperlinkId {
    pub const NONE: HyperlinkId = HyperlinkId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn is_some(self) -> bool {
        self.0 != 0
    }
}

/// A registered hyperlink target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hyperlink {
    pub id: HyperlinkId,
    /// The `id=` parameter from OSC 8, if the application supplied one.
    pub id_param: Option<String>,
    pub uri: String,
}

/// Table of hyperlinks owned by the screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HyperlinkRegistry {
    links: Vec<Hyperlink>,
    next_id: u32,
}

impl HyperlinkRegistry {
    pub fn new() -> Self {
        HyperlinkRegistry {
            links: Vec::new(),
            next_id: 1,
        }
    }

    /// Register a hyperlink, reusing an existing entry when the
    /// application supplied a matching explicit `id=` parameter
    /// (OSC 8 semantics: same id + uri refer to one logical link).
    pub fn define(&mut self, id_param: Option<&str>, uri: &str) -> HyperlinkId {
        if let Some(wanted) = id_param {
            if let Some(existing) = self
                .links
                .iter()
                .find(|l| l.id_param.as_deref() == Some(wanted) && l.uri == uri)
            {
                return existing.id;
            }
        }
        let id = HyperlinkId(self.next_id);
        self.next_id += 1;
        self.links.push(Hyperlink {
            id,
            id_param: id_param.map(str::to_owned),
            uri: uri.to_owned(),
        });
        id
    }

    /// Look up a hyperlink by id. An unknown or `NONE` id is not an
    /// error; it is simply no hyperlink.
    pub fn resolve(&self, id: HyperlinkId) -> Option<&Hyperlink> {
        if id.is_none() {
            return None;
        }
        self.links.iter().find(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.next_id = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_and_resolve() {
        let mut registry = HyperlinkRegistry::new();
        let id = registry.define(None, "https://example.com");
        assert!(id.is_some());

        let link = registry.resolve(id).unwrap();
        assert_eq!(link.uri, "https://example.com");
    }

    #[test]
    fn test_explicit_id_dedup() {
        let mut registry = HyperlinkRegistry::new();
        let a = registry.define(Some("x"), "https://example.com");
        let b = registry.define(Some("x"), "https://example.com");
        let c = registry.define(Some("x"), "https://other.example");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_unresolved_id_is_no_hyperlink() {
        let registry = HyperlinkRegistry::new();
        assert!(registry.resolve(HyperlinkId(42)).is_none());
        assert!(registry.resolve(HyperlinkId::NONE).is_none());
    }

    #[test]
    fn test_anonymous_links_are_distinct() {
        let mut registry = HyperlinkRegistry::new();
        let a = registry.define(None, "https://example.com");
        let b = registry.define(None, "https://example.com");
        assert_ne!(a, b);
    }
}
