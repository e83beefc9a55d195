//! Tests for the prefix tree as a command and flag symbol table.

use argot_schema::{Lookup, PrefixTree};

const KEYS: &[&str] = &[
    "add", "alias", "a", "branch", "build", "b", "checkout", "cherry-pick", "clone", "commit",
];

fn table() -> PrefixTree<usize> {
    let mut t = PrefixTree::new();
    for (i, k) in KEYS.iter().enumerate() {
        t.insert(k, i);
    }
    t
}

#[test]
fn every_inserted_key_is_found_until_deleted() {
    let mut t = table();
    assert_eq!(t.len(), KEYS.len());
    for (i, k) in KEYS.iter().enumerate() {
        assert_eq!(t.get(k), Some(&i), "key {k}");
    }
    for (n, k) in KEYS.iter().enumerate() {
        assert!(t.delete(k).is_some());
        assert!(!t.has(k));
        // Remaining keys are unaffected by pruning.
        for rest in &KEYS[n + 1..] {
            assert!(t.has(rest), "{rest} lost after deleting {k}");
        }
    }
    assert!(t.is_empty());
    assert_eq!(t.root().children().count(), 0);
}

#[test]
fn completion_is_sorted_and_prefix_bounded() {
    let t = table();
    let keys: Vec<String> = t.complete("c").into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["checkout", "cherry-pick", "clone", "commit"]);
    assert!(t.complete("z").is_empty());
    assert_eq!(t.complete("").len(), KEYS.len());
}

#[test]
fn near_miss_suggests_longest_shared_prefix() {
    let t = table();
    assert_eq!(t.suggest("chec"), ["checkout"]);
    assert_eq!(t.suggest("cherries"), ["cherry-pick"]);
    assert_eq!(t.suggest("comit"), ["commit"]);
    assert!(t.suggest("zebra").is_empty());
    assert_eq!(t.suggest("clone"), ["clone"]);
}

#[test]
fn miss_reports_match_depth() {
    let t = table();
    match t.find("bui") {
        Lookup::Miss { matched, nearest } => {
            assert_eq!(matched, 3);
            assert!(!nearest.is_terminal());
        }
        Lookup::Hit(_) => panic!("'bui' is not a key"),
    }
    assert!(matches!(t.find("b"), Lookup::Hit(&5)));
}
