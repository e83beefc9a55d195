//! Prefix tree used as the symbol table for command and flag names.
//!
//! Keys are compared `char` by `char` with no normalization. Every operation
//! walks at most one node per character of the key, so cost is independent of
//! how many keys the table holds.

use std::collections::BTreeMap;

/// A node in a [`PrefixTree`].
///
/// Every node reachable from the root is either terminal (carries a value) or
/// has at least one child; [`PrefixTree::delete`] maintains this by pruning.
#[derive(Debug, Clone)]
pub struct Node<V> {
    children: BTreeMap<char, Node<V>>,
    value: Option<V>,
}

impl<V> Default for Node<V> {
    fn default() -> Self {
        Self {
            children: BTreeMap::new(),
            value: None,
        }
    }
}

impl<V> Node<V> {
    /// Whether a key ends exactly at this node.
    pub fn is_terminal(&self) -> bool {
        self.value.is_some()
    }

    /// Value stored at this node, if terminal.
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Child nodes in key order.
    pub fn children(&self) -> impl Iterator<Item = (char, &Node<V>)> {
        self.children.iter().map(|(ch, node)| (*ch, node))
    }

    /// All terminal entries at or below this node, each key prefixed with
    /// `prefix`, in lexicographic order.
    pub fn entries(&self, prefix: &str) -> Vec<(String, &V)> {
        let mut out = Vec::new();
        let mut path = prefix.to_string();
        self.collect(&mut path, &mut out);
        out
    }

    fn collect<'a>(&'a self, path: &mut String, out: &mut Vec<(String, &'a V)>) {
        if let Some(v) = &self.value {
            out.push((path.clone(), v));
        }
        for (ch, child) in &self.children {
            path.push(*ch);
            child.collect(path, out);
            path.pop();
        }
    }

    /// Remove `key` below this node, rebuilding the subtree.
    ///
    /// Returns the pruned node (or `None` when nothing is left under it) and
    /// the removed value.
    fn remove(mut self, key: &[char]) -> (Option<Node<V>>, Option<V>) {
        let removed = match key.split_first() {
            None => self.value.take(),
            Some((ch, rest)) => match self.children.remove(ch) {
                None => None,
                Some(child) => {
                    let (kept, removed) = child.remove(rest);
                    if let Some(kept) = kept {
                        self.children.insert(*ch, kept);
                    }
                    removed
                }
            },
        };
        let keep = self.value.is_some() || !self.children.is_empty();
        (keep.then_some(self), removed)
    }
}

/// Result of [`PrefixTree::find`].
#[derive(Debug)]
pub enum Lookup<'a, V> {
    /// The key is present; carries its value.
    Hit(&'a V),
    /// The key is absent.
    Miss {
        /// Number of leading characters of the key that matched a path.
        matched: usize,
        /// The last node reached along the key's path.
        nearest: &'a Node<V>,
    },
}

impl<'a, V> Lookup<'a, V> {
    /// The value on a hit.
    pub fn hit(self) -> Option<&'a V> {
        match self {
            Lookup::Hit(v) => Some(v),
            Lookup::Miss { .. } => None,
        }
    }
}

/// A generic trie mapping string keys to values.
#[derive(Debug, Clone)]
pub struct PrefixTree<V> {
    root: Node<V>,
    len: usize,
}

impl<V> Default for PrefixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PrefixTree<V> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            root: Node::default(),
            len: 0,
        }
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The root node.
    pub fn root(&self) -> &Node<V> {
        &self.root
    }

    /// Insert `value` at `key`, returning any value it replaced.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let mut node = &mut self.root;
        for ch in key.chars() {
            node = node.children.entry(ch).or_default();
        }
        let previous = node.value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Look up `key`.
    ///
    /// On a miss, reports how far the key matched and the last node reached,
    /// so callers can offer the keys below it as suggestions.
    pub fn find(&self, key: &str) -> Lookup<'_, V> {
        let mut node = &self.root;
        let mut matched = 0;
        for ch in key.chars() {
            match node.children.get(&ch) {
                Some(next) => {
                    node = next;
                    matched += 1;
                }
                None => {
                    return Lookup::Miss {
                        matched,
                        nearest: node,
                    };
                }
            }
        }
        match &node.value {
            Some(v) => Lookup::Hit(v),
            None => Lookup::Miss {
                matched,
                nearest: node,
            },
        }
    }

    /// Value stored at `key`.
    pub fn get(&self, key: &str) -> Option<&V> {
        self.find(key).hit()
    }

    /// Whether `key` is present.
    pub fn has(&self, key: &str) -> bool {
        matches!(self.find(key), Lookup::Hit(_))
    }

    /// Remove `key`, pruning nodes that no longer lead to any key.
    pub fn delete(&mut self, key: &str) -> Option<V> {
        let chars: Vec<char> = key.chars().collect();
        let root = std::mem::take(&mut self.root);
        let (kept, removed) = root.remove(&chars);
        self.root = kept.unwrap_or_default();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    /// All keys starting with `prefix`, with their values, in key order.
    pub fn complete(&self, prefix: &str) -> Vec<(String, &V)> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            match node.children.get(&ch) {
                Some(next) => node = next,
                None => return Vec::new(),
            }
        }
        node.entries(prefix)
    }

    /// Keys sharing the longest matching prefix with `key`.
    ///
    /// Returns nothing when not even the first character matches.
    pub fn suggest(&self, key: &str) -> Vec<String> {
        match self.find(key) {
            Lookup::Hit(_) => vec![key.to_string()],
            Lookup::Miss { matched: 0, .. } => Vec::new(),
            Lookup::Miss { matched, nearest } => {
                let prefix: String = key.chars().take(matched).collect();
                nearest.entries(&prefix).into_iter().map(|(k, _)| k).collect()
            }
        }
    }

    /// Iterate every key and value in key order.
    pub fn entries(&self) -> Vec<(String, &V)> {
        self.root.entries("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_count<V>(node: &Node<V>) -> usize {
        1 + node.children().map(|(_, c)| node_count(c)).sum::<usize>()
    }

    #[test]
    fn insert_overwrites_existing_value() {
        let mut t = PrefixTree::new();
        assert_eq!(t.insert("add", 1), None);
        assert_eq!(t.insert("add", 2), Some(1));
        assert_eq!(t.get("add"), Some(&2));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn find_miss_reports_nearest_node() {
        let mut t = PrefixTree::new();
        t.insert("clone", "c");
        t.insert("commit", "m");
        match t.find("cot") {
            Lookup::Miss { matched, nearest } => {
                assert_eq!(matched, 2);
                let keys: Vec<String> = nearest.entries("co").into_iter().map(|(k, _)| k).collect();
                assert_eq!(keys, vec!["commit".to_string()]);
            }
            Lookup::Hit(_) => panic!("unexpected hit"),
        }
    }

    #[test]
    fn prefix_of_key_is_not_a_hit() {
        let mut t = PrefixTree::new();
        t.insert("verbose", ());
        assert!(!t.has("verb"));
        assert!(t.has("verbose"));
        assert!(!t.has("verbosely"));
    }

    #[test]
    fn delete_prunes_childless_branch() {
        let mut t = PrefixTree::new();
        t.insert("ab", 1);
        t.insert("abcd", 2);
        let before = node_count(t.root());
        assert_eq!(t.delete("abcd"), Some(2));
        assert_eq!(node_count(t.root()), before - 2);
        assert!(t.has("ab"));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn delete_keeps_nodes_still_leading_to_keys() {
        let mut t = PrefixTree::new();
        t.insert("ab", 1);
        t.insert("abcd", 2);
        assert_eq!(t.delete("ab"), Some(1));
        assert!(!t.has("ab"));
        assert!(t.has("abcd"));
    }

    #[test]
    fn delete_missing_key_is_noop() {
        let mut t = PrefixTree::new();
        t.insert("ab", 1);
        assert_eq!(t.delete("abc"), None);
        assert_eq!(t.delete("x"), None);
        assert_eq!(t.len(), 1);
        assert!(t.has("ab"));
    }

    #[test]
    fn delete_last_key_leaves_empty_root() {
        let mut t = PrefixTree::new();
        t.insert("only", 1);
        t.delete("only");
        assert!(t.is_empty());
        assert_eq!(node_count(t.root()), 1);
    }

    #[test]
    fn complete_lists_keys_in_order() {
        let mut t = PrefixTree::new();
        for k in ["verbose", "version", "value", "v"] {
            t.insert(k, ());
        }
        let keys: Vec<String> = t.complete("ver").into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["verbose".to_string(), "version".to_string()]);
    }

    #[test]
    fn suggest_uses_longest_matching_prefix() {
        let mut t = PrefixTree::new();
        t.insert("output", ());
        t.insert("other", ());
        assert_eq!(t.suggest("outptu"), vec!["output".to_string()]);
        assert!(t.suggest("zzz").is_empty());
    }

    #[test]
    fn multibyte_keys_compare_per_char() {
        let mut t = PrefixTree::new();
        t.insert("café", 1);
        t.insert("cafe", 2);
        assert_eq!(t.get("café"), Some(&1));
        assert_eq!(t.get("cafe"), Some(&2));
    }
}
