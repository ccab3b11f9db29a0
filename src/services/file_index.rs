//! Lookup of file records by their project-wide identifier.
//!
//! Clips usually reference their media as `<file id="file-3"/>` and the full
//! record (with its `pathurl`) appears once, somewhere else in the document.

use super::path_resolver::resolve_path_url;
use super::project_tree::{Node, ProjectTree};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashMap;

/// Tag of file record elements.
pub const FILE_RECORD_TAG: &str = "file";

/// Tag of the URL field inside a file record.
pub const PATH_URL_TAG: &str = "pathurl";

/// Resolved file records of one project tree, keyed by `id`.
///
/// Only `file` elements carrying both an `id` and a `pathurl` count as
/// records; bare references are ignored. When several records share an id the
/// first one in [`Node::walk`] order wins.
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    records: HashMap<String, Utf8PathBuf>,
}

impl FileIndex {
    /// Build the index in a single walk over the whole tree.
    pub fn build(tree: &ProjectTree) -> Self {
        Self::from_node(tree.root())
    }

    pub fn from_node(root: &Node) -> Self {
        let mut records = HashMap::new();
        let mut duplicates = 0usize;

        for node in root.walk().filter(|node| node.tag() == FILE_RECORD_TAG) {
            let (Some(id), Some(pathurl)) = (node.attr("id"), node.child_text(PATH_URL_TAG)) else {
                continue;
            };

            if records.contains_key(id) {
                duplicates += 1;
                tracing::debug!("Duplicate file record id {}, keeping the first one", id);
                continue;
            }
            records.insert(id.to_string(), resolve_path_url(pathurl));
        }

        tracing::debug!(
            "Indexed {} file records ({} duplicates ignored)",
            records.len(),
            duplicates
        );

        Self { records }
    }

    /// Resolved path of the record with the given id.
    ///
    /// `None` means the media is not described anywhere in the project
    /// (offline or missing), which is not an error.
    pub fn resolve(&self, id: &str) -> Option<&Utf8Path> {
        self.records.get(id).map(Utf8PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(xml: &str) -> FileIndex {
        FileIndex::build(&ProjectTree::parse(xml).unwrap())
    }

    #[test]
    fn test_resolves_nested_record() {
        let idx = index(
            r#"<xmeml><project><children><clip><media><video><track><clipitem>
                 <file id="f1"><name>A.mov</name><pathurl>file:///src/A.mov</pathurl></file>
               </clipitem></track></video></media></clip></children></project></xmeml>"#,
        );
        assert_eq!(idx.resolve("f1"), Some(Utf8Path::new("/src/A.mov")));
        assert_eq!(idx.resolve("f2"), None);
    }

    #[test]
    fn test_bare_references_are_not_records() {
        let idx = index(
            r#"<xmeml>
                 <file id="f1"/>
                 <sequence><file id="f1"><pathurl>file:///src/A.mov</pathurl></file></sequence>
               </xmeml>"#,
        );
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.resolve("f1"), Some(Utf8Path::new("/src/A.mov")));
    }

    #[test]
    fn test_first_record_wins_on_duplicate_ids() {
        let idx = index(
            r#"<xmeml>
                 <file id="f1"><pathurl>file:///first.mov</pathurl></file>
                 <file id="f1"><pathurl>file:///second.mov</pathurl></file>
               </xmeml>"#,
        );
        assert_eq!(idx.resolve("f1"), Some(Utf8Path::new("/first.mov")));
    }

    #[test]
    fn test_empty_tree() {
        let idx = index("<xmeml/>");
        assert!(idx.is_empty());
    }
}
