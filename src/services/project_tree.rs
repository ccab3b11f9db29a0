//! Normalized, owned view of an xmeml project document.
//!
//! The project format repeats child elements freely (`bin`, `clip`, `track`,
//! `file`, ...) and nothing downstream should care whether a given element
//! occurred once or many times. [`Node`] therefore groups children by tag
//! name, and every group is an ordered sequence, possibly of length one.

use anyhow::{Context, Result};
use camino::Utf8Path;
use indexmap::IndexMap;
use roxmltree::ParsingOptions;
use thiserror::Error;

/// Errors that make a project file unusable as a whole
#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Malformed project XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Unexpected root element <{0}>, expected <xmeml>")]
    UnexpectedRoot(String),

    #[error("Project file has no <project> element")]
    MissingProject,
}

/// One element of the project tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    tag: String,
    attributes: IndexMap<String, String>,
    text: Option<String>,
    children: IndexMap<String, Vec<Node>>,
}

impl Node {
    fn from_element(element: roxmltree::Node<'_, '_>) -> Self {
        let attributes = element
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect();

        let text: String = element
            .children()
            .filter(|child| child.is_text())
            .filter_map(|child| child.text())
            .collect();
        let text = text.trim();

        let mut children: IndexMap<String, Vec<Node>> = IndexMap::new();
        for child in element.children().filter(|child| child.is_element()) {
            children
                .entry(child.tag_name().name().to_string())
                .or_default()
                .push(Node::from_element(child));
        }

        Self {
            tag: element.tag_name().name().to_string(),
            attributes,
            text: (!text.is_empty()).then(|| text.to_string()),
            children,
        }
    }

    /// Local tag name (namespace prefixes are dropped).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Trimmed character data directly inside this element, if any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// All children with the given tag, in document order. Empty if none.
    pub fn children(&self, tag: &str) -> &[Node] {
        self.children.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First child with the given tag.
    pub fn child(&self, tag: &str) -> Option<&Node> {
        self.children(tag).first()
    }

    pub fn child_text(&self, tag: &str) -> Option<&str> {
        self.child(tag).and_then(Node::text)
    }

    /// Follow a chain of tags, taking the first match at every step.
    pub fn descend(&self, tags: &[&str]) -> Option<&Node> {
        tags.iter().try_fold(self, |node, tag| node.child(tag))
    }

    /// Pre-order walk over this node and every descendant.
    ///
    /// Children are visited group by group (groups in order of first
    /// appearance, each group in document order).
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Iterator returned by [`Node::walk`].
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        for group in node.children.values().rev() {
            self.stack.extend(group.iter().rev());
        }
        Some(node)
    }
}

/// The parsed project document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectTree {
    root: Node,
}

impl ProjectTree {
    /// Parse project XML text.
    ///
    /// Exported projects carry a `<!DOCTYPE xmeml>` declaration, so DTDs are
    /// accepted (and ignored).
    pub fn parse(xml: &str) -> Result<Self, ProjectError> {
        let mut options = ParsingOptions::default();
        options.allow_dtd = true;

        let document = roxmltree::Document::parse_with_options(xml, options)?;
        let root = Node::from_element(document.root_element());

        tracing::debug!("Parsed project tree rooted at <{}>", root.tag());
        Ok(Self { root })
    }

    /// Read and parse a project file.
    pub async fn load(path: &Utf8Path) -> Result<Self> {
        let xml = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read project file: {}", path))?;

        let tree = Self::parse(&xml)
            .with_context(|| format!("Failed to parse project file: {}", path))?;

        tracing::info!("Loaded project file {}", path);
        Ok(tree)
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// The `<project>` element under the `<xmeml>` root.
    pub fn project(&self) -> Result<&Node, ProjectError> {
        if self.root.tag() != "xmeml" {
            return Err(ProjectError::UnexpectedRoot(self.root.tag().to_string()));
        }
        self.root.child("project").ok_or(ProjectError::MissingProject)
    }
}
