//! XML response navigation.
//!
//! MWS responses normally put every element in the API namespace
//! (`{endpoint}/{version}`), but some gateways and recorded fixtures drop it.
//! Lookups are therefore resolved in two steps: the namespaced schema first,
//! then unqualified local-name matching if the namespaced lookup finds
//! nothing under the root.

use roxmltree::{Document, Node};

use crate::error::OrdersError;

/// Namespace-aware entry point for reading response documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    namespace: String,
}

impl ResponseSchema {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Pick the lookup strategy for one document.
    pub fn lookup_for(&self, root: Node<'_, '_>) -> Lookup<'_> {
        let primary = Lookup::Namespaced(self.namespace.as_str());
        if root.children().any(|c| primary.matches_any(&c)) {
            primary
        } else {
            Lookup::Unqualified
        }
    }
}

/// How element names are matched within one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'s> {
    /// Local name plus exact namespace URI.
    Namespaced(&'s str),
    /// Local name only.
    Unqualified,
}

impl<'s> Lookup<'s> {
    fn matches_any(&self, node: &Node<'_, '_>) -> bool {
        if !node.is_element() {
            return false;
        }
        match self {
            Lookup::Namespaced(ns) => node.tag_name().namespace() == Some(*ns),
            Lookup::Unqualified => true,
        }
    }

    fn matches(&self, node: &Node<'_, '_>, name: &str) -> bool {
        self.matches_any(node) && node.tag_name().name() == name
    }

    pub fn child<'a, 'i>(&self, node: Node<'a, 'i>, name: &str) -> Option<Node<'a, 'i>> {
        node.children().find(|c| self.matches(c, name))
    }

    pub fn children<'a, 'i>(&self, node: Node<'a, 'i>, name: &str) -> Vec<Node<'a, 'i>> {
        node.children().filter(|c| self.matches(c, name)).collect()
    }

    /// Raw text of a child element. Present-but-empty yields `Some("")`.
    pub fn raw_text<'a>(&self, node: Node<'a, '_>, name: &str) -> Option<&'a str> {
        self.child(node, name).map(|c| c.text().unwrap_or(""))
    }

    /// Trimmed text of a child element; blank or absent yields `None`.
    pub fn text(&self, node: Node<'_, '_>, name: &str) -> Option<String> {
        self.raw_text(node, name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

pub fn parse_document(body: &str) -> Result<Document<'_>, OrdersError> {
    Document::parse(body)
        .map_err(|e| OrdersError::Transport(format!("malformed xml response: {e}")))
}

/// Map an `<ErrorResponse>` body to an API error. Bodies that are not MWS
/// error documents still produce an error carrying a trimmed excerpt.
pub fn api_error(body: &str) -> OrdersError {
    if let Ok(doc) = Document::parse(body) {
        let lookup = Lookup::Unqualified;
        let root = doc.root_element();
        if let Some(err) = lookup.child(root, "Error") {
            return OrdersError::Api {
                code: lookup.text(err, "Code"),
                message: lookup
                    .text(err, "Message")
                    .unwrap_or_else(|| "unknown".to_string()),
            };
        }
    }
    let excerpt: String = body.trim().chars().take(200).collect();
    OrdersError::Api {
        code: None,
        message: if excerpt.is_empty() {
            "empty error response".to_string()
        } else {
            excerpt
        },
    }
}
