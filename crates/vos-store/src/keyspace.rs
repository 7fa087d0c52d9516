use std::fmt;

use serde::{Deserialize, Serialize};

/// Partition of the local store holding one kind of object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum KeySpace {
    Tree,
    Blob,
    BlobMetadata,
}

impl KeySpace {
    pub const ALL: [KeySpace; 3] = [KeySpace::Tree, KeySpace::Blob, KeySpace::BlobMetadata];

    /// Stable name, also used as the on-disk directory name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Tree => "tree",
            Self::Blob => "blob",
            Self::BlobMetadata => "blobmeta",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Tree => 0,
            Self::Blob => 1,
            Self::BlobMetadata => 2,
        }
    }
}

impl fmt::Display for KeySpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_distinct() {
        let names: std::collections::HashSet<_> = KeySpace::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), KeySpace::ALL.len());
    }

    #[test]
    fn indices_match_all_order() {
        for (i, ks) in KeySpace::ALL.iter().enumerate() {
            assert_eq!(ks.index(), i);
        }
    }
}
