use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hash::ContentHash;
use crate::object::ObjectId;

/// Kind of object a tree entry points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeEntryType {
    /// Subtree / directory.
    Directory,
    /// Normal file.
    Regular,
    /// Executable file.
    Executable,
    /// Symbolic link.
    Symlink,
}

impl TreeEntryType {
    /// Octal mode value (for display).
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Directory => 0o040000,
        }
    }
}

impl std::fmt::Display for TreeEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

/// A single entry in a tree.
///
/// `size` and `content_hash` are only populated for files whose metadata the
/// backing source supplied inline with the tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub entry_type: TreeEntryType,
    /// Id of the referenced object.
    pub object_id: ObjectId,
    pub size: Option<u64>,
    pub content_hash: Option<ContentHash>,
}

impl TreeEntry {
    /// Create an entry without inline metadata.
    pub fn new(entry_type: TreeEntryType, object_id: ObjectId) -> Self {
        Self {
            entry_type,
            object_id,
            size: None,
            content_hash: None,
        }
    }

    /// Create a regular-file entry carrying inline size and content hash.
    pub fn file_with_metadata(object_id: ObjectId, size: u64, content_hash: ContentHash) -> Self {
        Self {
            entry_type: TreeEntryType::Regular,
            object_id,
            size: Some(size),
            content_hash: Some(content_hash),
        }
    }
}

/// Directory snapshot: an ordered mapping from entry name to [`TreeEntry`].
///
/// A tree carries its own id so it can be written to a cache keyed by it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tree {
    id: ObjectId,
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    pub fn new(id: ObjectId, entries: impl IntoIterator<Item = (String, TreeEntry)>) -> Self {
        Self {
            id,
            entries: entries.into_iter().collect(),
        }
    }

    /// Create an empty tree.
    pub fn empty(id: ObjectId) -> Self {
        Self {
            id,
            entries: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name)
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &'static [u8]) -> ObjectId {
        ObjectId::from(s)
    }

    #[test]
    fn entries_iterate_in_name_order() {
        let tree = Tree::new(
            id(b"t"),
            vec![
                ("zebra.txt".to_string(), TreeEntry::new(TreeEntryType::Regular, id(b"z"))),
                ("alpha.txt".to_string(), TreeEntry::new(TreeEntryType::Regular, id(b"a"))),
                ("middle".to_string(), TreeEntry::new(TreeEntryType::Directory, id(b"m"))),
            ],
        );
        let names: Vec<&str> = tree.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["alpha.txt", "middle", "zebra.txt"]);
    }

    #[test]
    fn get_entry() {
        let tree = Tree::new(
            id(b"t"),
            vec![(
                "a.txt".to_string(),
                TreeEntry::file_with_metadata(id(b"b1"), 5, ContentHash::from_bytes([1; 32])),
            )],
        );
        let entry = tree.get("a.txt").unwrap();
        assert_eq!(entry.size, Some(5));
        assert_eq!(entry.entry_type, TreeEntryType::Regular);
        assert!(tree.get("missing").is_none());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn empty_tree() {
        let tree = Tree::empty(id(b"t"));
        assert!(tree.is_empty());
        assert_eq!(tree.id(), &id(b"t"));
    }

    #[test]
    fn entry_type_displays_as_octal_mode() {
        assert_eq!(TreeEntryType::Regular.to_string(), "100644");
        assert_eq!(TreeEntryType::Executable.to_string(), "100755");
        assert_eq!(TreeEntryType::Symlink.to_string(), "120000");
        assert_eq!(TreeEntryType::Directory.to_string(), "040000");
    }
}
