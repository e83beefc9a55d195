//! Command tree.
//!
//! Each [`CommandNode`] owns its declarations, a symbol table over their keys,
//! and a symbol table over its subcommands' names and aliases. Subcommands are
//! attached fully built and shared behind [`Arc`], so a tree is immutable once
//! assembled. A subcommand that *inherits* sees its parent's declarations
//! (transitively, while each ancestor also inherits) by reference.

use crate::declaration::{Declaration, DeclarationKind};
use crate::error::SchemaError;
use crate::trie::PrefixTree;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A command and its subcommands.
#[derive(Debug, Clone)]
pub struct CommandNode {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    deprecated: bool,
    deprecation_message: Option<String>,
    inherit: bool,
    declarations: Vec<Arc<Declaration>>,
    /// Every declaration key and alias → index into `declarations`.
    keys: PrefixTree<usize>,
    subcommands: BTreeMap<String, Arc<CommandNode>>,
    /// Subcommand names and aliases → canonical name.
    commands: PrefixTree<String>,
}

impl CommandNode {
    /// Create a command with no declarations or subcommands.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            description: None,
            deprecated: false,
            deprecation_message: None,
            inherit: false,
            declarations: Vec::new(),
            keys: PrefixTree::new(),
            subcommands: BTreeMap::new(),
            commands: PrefixTree::new(),
        }
    }

    /// Add an alternative name, registered with the parent on attach.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark deprecated, optionally explaining what to use instead.
    pub fn with_deprecation(mut self, message: Option<String>) -> Self {
        self.deprecated = true;
        self.deprecation_message = message;
        self
    }

    /// Inherit the parent's declarations.
    pub fn with_inherit(mut self, inherit: bool) -> Self {
        self.inherit = inherit;
        self
    }

    /// Canonical name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Alternative names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether the command is deprecated.
    pub fn is_deprecated(&self) -> bool {
        self.deprecated
    }

    /// Deprecation message, if any.
    pub fn deprecation_message(&self) -> Option<&str> {
        self.deprecation_message.as_deref()
    }

    /// Whether the command inherits its parent's declarations.
    pub fn inherits(&self) -> bool {
        self.inherit
    }

    /// Declarations owned by this command, in registration order.
    pub fn declarations(&self) -> &[Arc<Declaration>] {
        &self.declarations
    }

    /// Own declaration registered under `key` (primary key or alias).
    pub fn declaration(&self, key: &str) -> Option<&Arc<Declaration>> {
        self.keys.get(key).map(|&i| &self.declarations[i])
    }

    /// Symbol table over subcommand names and aliases.
    pub fn command_table(&self) -> &PrefixTree<String> {
        &self.commands
    }

    /// Subcommand matched by name or alias.
    pub fn subcommand(&self, name: &str) -> Option<&Arc<CommandNode>> {
        self.commands
            .get(name)
            .and_then(|canonical| self.subcommands.get(canonical))
    }

    /// Subcommands in name order.
    pub fn subcommands(&self) -> impl Iterator<Item = &Arc<CommandNode>> {
        self.subcommands.values()
    }

    /// Register a declaration.
    ///
    /// Fails when the declaration is malformed, when any of its keys is
    /// already visible here, or when it would clash with a key owned by a
    /// subcommand that inherits from this command.
    pub fn add_declaration(&mut self, mut decl: Declaration) -> Result<&mut Self, SchemaError> {
        decl.validate()?;

        let keys: Vec<String> = decl.lookup_keys().map(str::to_string).collect();
        let inherited_below = self.inheriting_descendant_keys();
        for key in &keys {
            if self.keys.has(key) || inherited_below.iter().any(|k| k == key) {
                return Err(SchemaError::DuplicateKey {
                    key: key.clone(),
                    command: self.name.clone(),
                });
            }
        }
        if keys.len() != keys.iter().collect::<std::collections::HashSet<_>>().len() {
            return Err(SchemaError::DuplicateKey {
                key: decl.key().to_string(),
                command: self.name.clone(),
            });
        }

        if let DeclarationKind::Positional { index, .. } = &mut decl.kind {
            let positionals: Vec<&Arc<Declaration>> =
                self.declarations.iter().filter(|d| d.is_positional()).collect();
            if positionals.last().is_some_and(|last| last.array) {
                return Err(SchemaError::InvalidDeclaration {
                    key: keys[0].clone(),
                    reason: "positional declared after an array positional".to_string(),
                });
            }
            *index = positionals.len();
        }

        let slot = self.declarations.len();
        for key in &keys {
            self.keys.insert(key, slot);
        }
        self.declarations.push(Arc::new(decl));
        Ok(self)
    }

    /// Attach a fully built subcommand.
    ///
    /// Fails when the name or an alias is already used by a sibling, or when
    /// an inheriting subcommand (or its inheriting descendants) declares a key
    /// this command already declares.
    pub fn add_subcommand(&mut self, child: CommandNode) -> Result<&mut Self, SchemaError> {
        for name in std::iter::once(&child.name).chain(child.aliases.iter()) {
            if name.is_empty() || self.commands.has(name) {
                return Err(SchemaError::DuplicateCommand {
                    name: name.clone(),
                    parent: self.name.clone(),
                });
            }
        }
        if child.inherit {
            for key in child.visible_keys_below() {
                if self.keys.has(&key) {
                    return Err(SchemaError::DuplicateKey {
                        key,
                        command: child.name.clone(),
                    });
                }
            }
        }

        let canonical = child.name.clone();
        self.commands.insert(&canonical, canonical.clone());
        for alias in &child.aliases {
            self.commands.insert(alias, canonical.clone());
        }
        self.subcommands.insert(canonical, Arc::new(child));
        Ok(self)
    }

    /// Keys owned by this node plus those of descendants that inherit from it.
    fn visible_keys_below(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.keys.entries().into_iter().map(|(k, _)| k).collect();
        keys.extend(self.inheriting_descendant_keys());
        keys
    }

    /// Keys of subcommands that inherit (transitively) from this node.
    fn inheriting_descendant_keys(&self) -> Vec<String> {
        self.subcommands
            .values()
            .filter(|child| child.inherit)
            .flat_map(|child| child.visible_keys_below())
            .collect()
    }

    /// Walk `path` from this node, returning every node along it (this node first).
    ///
    /// Returns `None` if any segment does not name a subcommand.
    pub fn resolve_path<S: AsRef<str>>(&self, path: &[S]) -> Option<Vec<&CommandNode>> {
        let mut chain = vec![self];
        let mut node = self;
        for segment in path {
            node = node.subcommand(segment.as_ref())?.as_ref();
            chain.push(node);
        }
        Some(chain)
    }

    /// Declarations visible to the command at `path`, ancestors first.
    ///
    /// The set starts at the deepest ancestor reachable through an unbroken
    /// chain of inheriting commands. Declarations are shared, not copied.
    pub fn effective_declarations<S: AsRef<str>>(&self, path: &[S]) -> Vec<Arc<Declaration>> {
        let Some(chain) = self.resolve_path(path) else {
            return Vec::new();
        };
        let mut start = chain.len() - 1;
        while start > 0 && chain[start].inherit {
            start -= 1;
        }
        chain[start..]
            .iter()
            .flat_map(|node| node.declarations.iter().map(Arc::clone))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declaration::AliasKind;

    #[test]
    fn duplicate_alias_is_rejected() {
        let mut root = CommandNode::new("app");
        root.add_declaration(Declaration::flag("verbose").with_alias(AliasKind::Short, "v"))
            .unwrap();
        let err = root
            .add_declaration(Declaration::flag("version").with_alias(AliasKind::Short, "v"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateKey { key, .. } if key == "v"));
    }

    #[test]
    fn positional_indices_follow_registration() {
        let mut root = CommandNode::new("app");
        root.add_declaration(Declaration::positional("src")).unwrap();
        root.add_declaration(Declaration::flag("force")).unwrap();
        root.add_declaration(Declaration::positional("dst")).unwrap();
        let indices: Vec<usize> = root
            .declarations()
            .iter()
            .filter_map(|d| match d.kind {
                DeclarationKind::Positional { index, .. } => Some(index),
                DeclarationKind::Flag { .. } => None,
            })
            .collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn positional_after_array_positional_is_rejected() {
        let mut root = CommandNode::new("app");
        root.add_declaration(Declaration::positional("files").with_array(true))
            .unwrap();
        assert!(matches!(
            root.add_declaration(Declaration::positional("dst")),
            Err(SchemaError::InvalidDeclaration { .. })
        ));
    }

    #[test]
    fn sibling_names_and_aliases_must_be_unique() {
        let mut root = CommandNode::new("app");
        root.add_subcommand(CommandNode::new("remove").with_alias("rm"))
            .unwrap();
        let err = root
            .add_subcommand(CommandNode::new("rm"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateCommand { name, .. } if name == "rm"));
    }

    #[test]
    fn inheriting_child_cannot_shadow_parent_key() {
        let mut root = CommandNode::new("app");
        root.add_declaration(Declaration::flag("config")).unwrap();
        let mut child = CommandNode::new("run").with_inherit(true);
        child.add_declaration(Declaration::flag("config")).unwrap();
        assert!(matches!(
            root.add_subcommand(child),
            Err(SchemaError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn non_inheriting_child_may_reuse_parent_key() {
        let mut root = CommandNode::new("app");
        root.add_declaration(Declaration::flag("config")).unwrap();
        let mut child = CommandNode::new("run");
        child.add_declaration(Declaration::flag("config")).unwrap();
        assert!(root.add_subcommand(child).is_ok());
    }

    #[test]
    fn parent_key_added_later_cannot_clash_with_inheriting_child() {
        let mut root = CommandNode::new("app");
        let mut child = CommandNode::new("run").with_inherit(true);
        child.add_declaration(Declaration::flag("jobs")).unwrap();
        root.add_subcommand(child).unwrap();
        assert!(root.add_declaration(Declaration::flag("jobs")).is_err());
    }

    #[test]
    fn grandchild_inheritance_is_checked_through_the_chain() {
        let mut grandchild = CommandNode::new("deep").with_inherit(true);
        grandchild.add_declaration(Declaration::flag("config")).unwrap();
        let mut child = CommandNode::new("run").with_inherit(true);
        child.add_subcommand(grandchild).unwrap();
        let mut root = CommandNode::new("app");
        root.add_declaration(Declaration::flag("config")).unwrap();
        assert!(root.add_subcommand(child).is_err());
    }

    #[test]
    fn effective_declarations_share_inherited_entries() {
        let mut grandchild = CommandNode::new("deep").with_inherit(true);
        grandchild.add_declaration(Declaration::flag("depth")).unwrap();
        let mut child = CommandNode::new("run");
        child.add_declaration(Declaration::flag("jobs")).unwrap();
        child.add_subcommand(grandchild).unwrap();
        let mut root = CommandNode::new("app");
        root.add_declaration(Declaration::flag("config")).unwrap();
        root.add_subcommand(child).unwrap();

        let keys: Vec<String> = root
            .effective_declarations(&["run", "deep"])
            .iter()
            .map(|d| d.key().to_string())
            .collect();
        // `run` does not inherit, so `config` stops at the root.
        assert_eq!(keys, vec!["jobs".to_string(), "depth".to_string()]);

        let run = root.subcommand("run").unwrap();
        let shared = &root.effective_declarations(&["run", "deep"])[0];
        assert!(Arc::ptr_eq(shared, &run.declarations()[0]));
    }

    #[test]
    fn subcommand_lookup_by_alias() {
        let mut root = CommandNode::new("app");
        root.add_subcommand(CommandNode::new("remove").with_alias("rm"))
            .unwrap();
        assert_eq!(root.subcommand("rm").unwrap().name(), "remove");
        assert!(root.subcommand("r").is_none());
    }
}
