//! Ordered, name-addressed children of a node.

use tracing::instrument;

use crate::domain::arena::{Forest, NodeId};
use crate::domain::error::{DomainError, DomainResult};

/// Insertion-ordered mapping from child name to node handle.
///
/// A `Tree` only stores handles; resolving multi-segment paths and
/// rendering need the owning [`Forest`] to descend into the children's
/// own trees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<(String, NodeId)>,
}

/// Split a `/`-delimited path, dropping empty segments (leading `/`, `//`).
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`, keeping the position of an existing key.
    /// Returns the handle that was displaced, if any.
    pub(crate) fn insert(&mut self, key: String, id: NodeId) -> Option<NodeId> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, id)),
            None => {
                self.entries.push((key, id));
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, key: &str) -> DomainResult<NodeId> {
        let pos = self
            .entries
            .iter()
            .position(|(k, _)| k == key)
            .ok_or_else(|| DomainError::KeyNotFound(key.to_string()))?;
        Ok(self.entries.remove(pos).1)
    }

    /// Single-segment lookup in this tree only.
    pub fn get_local(&self, key: &str) -> Option<NodeId> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, id)| *id)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get_local(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.entries.iter().map(|(k, id)| (k.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `path` (`"a"`, `"a/b/c"`, `"/a/b"`) against this tree.
    ///
    /// A leading `/` is ignored here; resolving from the absolute root is
    /// the caller's job (see [`Forest::get_child`]).
    #[instrument(level = "trace", skip(self, forest))]
    pub fn get(&self, forest: &Forest, path: &str) -> DomainResult<NodeId> {
        let segments = split_path(path);
        let (first, rest) = segments
            .split_first()
            .ok_or_else(|| DomainError::InvalidPath(path.to_string()))?;

        let mut current = self
            .get_local(first)
            .ok_or_else(|| DomainError::KeyNotFound(first.to_string()))?;
        for segment in rest {
            current = forest
                .children(current)?
                .get_local(segment)
                .ok_or_else(|| DomainError::KeyNotFound(segment.to_string()))?;
        }
        Ok(current)
    }

    /// Connector-style depiction of the whole subtree:
    ///
    /// ```text
    /// /
    /// |--a
    /// |	|--b
    /// |--c
    /// ```
    pub fn render(&self, forest: &Forest) -> String {
        let mut out = String::from("/\n");
        let mut open = Vec::new();
        self.render_level(forest, &mut open, &mut out);
        out
    }

    fn render_level(&self, forest: &Forest, open: &mut Vec<bool>, out: &mut String) {
        let level = open.len();
        open.push(true);
        let last = self.entries.len().saturating_sub(1);

        for (i, (key, id)) in self.entries.iter().enumerate() {
            if open[0] {
                out.push('|');
            }
            for &is_open in &open[1..=level] {
                out.push('\t');
                if is_open {
                    out.push('|');
                }
            }
            out.push_str("--");
            out.push_str(key);
            out.push('\n');

            if i == last {
                open[level] = false;
            }
            if let Ok(children) = forest.children(*id) {
                children.render_level(forest, open, out);
            }
        }
        open.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_path_with_leading_and_double_slashes_when_split_then_drops_empty_segments() {
        assert_eq!(split_path("/a//b/"), vec!["a", "b"]);
        assert!(split_path("/").is_empty());
    }

    #[test]
    fn given_existing_key_when_inserting_then_keeps_position() {
        let mut forest = Forest::new();
        let (a, b, c) = (forest.new_node("a"), forest.new_node("b"), forest.new_node("c"));
        let mut tree = Tree::new();
        tree.insert("a".into(), a);
        tree.insert("b".into(), b);

        let displaced = tree.insert("a".into(), c);

        assert_eq!(displaced, Some(a));
        assert_eq!(tree.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(tree.get_local("a"), Some(c));
    }

    #[test]
    fn given_empty_tree_when_rendered_then_only_header() {
        let forest = Forest::new();
        assert_eq!(Tree::new().render(&forest), "/\n");
    }
}
