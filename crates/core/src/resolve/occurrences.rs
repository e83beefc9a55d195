use crate::grammar::ast::{FlagForm, ParsedArguments};
use argot_diagnostics::Span;
use argot_schema::{AliasKind, Declaration, DeclarationKind, PrefixTree};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One appearance of a declaration, whatever name or form it was written with.
#[derive(Debug, Clone)]
pub(super) struct Occurrence {
    pub(super) values: Vec<String>,
    pub(super) ordinal: usize,
    pub(super) span: Span,
    /// Member of a short-flag group; such occurrences skip relation checks.
    pub(super) from_group: bool,
}

/// Occurrences of the input grouped by the declaration they belong to.
pub(super) struct OccurrenceIndex<'p> {
    parsed: &'p ParsedArguments,
    /// Flag name or alias → primary key.
    flag_names: PrefixTree<String>,
    /// Flag name or alias → whether it is written with `--` or `-`.
    spelling_kinds: BTreeMap<String, AliasKind>,
    /// Positional key → effective index.
    positional_keys: BTreeMap<String, usize>,
    /// Positional index → owning primary key.
    positional_owner: BTreeMap<usize, String>,
    /// Primary key → occurrences in input order. Only non-empty lists.
    by_key: BTreeMap<String, Vec<Occurrence>>,
    displays: BTreeMap<String, String>,
}

impl<'p> OccurrenceIndex<'p> {
    pub(super) fn build(parsed: &'p ParsedArguments, declarations: &[Arc<Declaration>]) -> Self {
        let mut index = Self {
            parsed,
            flag_names: PrefixTree::new(),
            spelling_kinds: BTreeMap::new(),
            positional_keys: BTreeMap::new(),
            positional_owner: BTreeMap::new(),
            by_key: BTreeMap::new(),
            displays: BTreeMap::new(),
        };
        let mut next_positional = 0usize;
        for decl in declarations {
            let key = decl.key().to_string();
            index.displays.insert(key.clone(), decl.display_name());
            let occurrences = match &decl.kind {
                DeclarationKind::Flag { .. } => {
                    for (name, kind) in flag_spellings(decl) {
                        index.flag_names.insert(name, key.clone());
                        index.spelling_kinds.insert(name.to_string(), kind);
                    }
                    index.flag_occurrences(decl)
                }
                DeclarationKind::Positional { .. } => {
                    let at = next_positional;
                    next_positional += 1;
                    index.positional_keys.insert(key.clone(), at);
                    index.positional_occurrences(&key, at, decl.array)
                }
            };
            if !occurrences.is_empty() {
                index.by_key.insert(key, occurrences);
            }
        }
        index
    }

    fn flag_occurrences(&self, decl: &Declaration) -> Vec<Occurrence> {
        let mut found = Vec::new();
        let mut group_chars = Vec::new();
        for (name, kind) in flag_spellings(decl) {
            if let Some(occs) = self.parsed.flags.get(name) {
                let matching = occs
                    .iter()
                    .filter(|o| !o.is_group() && written_as(&o.form) == kind);
                found.extend(matching.map(|o| Occurrence {
                    values: o.values.clone(),
                    ordinal: o.ordinal,
                    span: o.span,
                    from_group: false,
                }));
            }
            let mut chars = name.chars();
            if let (AliasKind::Short, Some(c), None) = (kind, chars.next(), chars.next()) {
                group_chars.push(c);
            }
        }
        for (_, occ) in self.parsed.flag_occurrences() {
            for member in occ.members() {
                if group_chars.contains(member) {
                    found.push(Occurrence {
                        values: Vec::new(),
                        ordinal: occ.ordinal,
                        span: occ.span,
                        from_group: true,
                    });
                }
            }
        }
        found.sort_by_key(|o| o.ordinal);
        found
    }

    fn positional_occurrences(&mut self, key: &str, at: usize, array: bool) -> Vec<Occurrence> {
        let taken: Vec<(usize, Occurrence)> = if array {
            self.parsed
                .positionals
                .range(at..)
                .filter(|(i, _)| !self.positional_owner.contains_key(i))
                .map(|(i, p)| {
                    (
                        *i,
                        Occurrence {
                            values: p.values.clone(),
                            ordinal: p.ordinal,
                            span: p.span,
                            from_group: false,
                        },
                    )
                })
                .collect()
        } else {
            self.parsed
                .positionals
                .get(&at)
                .filter(|_| !self.positional_owner.contains_key(&at))
                .map(|p| {
                    vec![(
                        at,
                        Occurrence {
                            values: p.values.clone(),
                            ordinal: p.ordinal,
                            span: p.span,
                            from_group: false,
                        },
                    )]
                })
                .unwrap_or_default()
        };
        for (i, _) in &taken {
            self.positional_owner.insert(*i, key.to_string());
        }
        // Array positionals collate into one occurrence, so repetition never applies.
        let mut occs = taken.into_iter().map(|(_, o)| o);
        let Some(mut first) = occs.next() else {
            return Vec::new();
        };
        for o in occs {
            first.values.extend(o.values);
            first.span = first.span.cover(o.span);
        }
        vec![first]
    }

    /// Occurrences of the declaration with primary key `key`.
    pub(super) fn occurrences(&self, key: &str) -> &[Occurrence] {
        self.by_key.get(key).map_or(&[], Vec::as_slice)
    }

    /// Whether `name` (a primary key, alias or undeclared flag name) appears in the input.
    pub(super) fn is_present(&self, name: &str) -> bool {
        if let Some(key) = self.primary_key(name) {
            return self.by_key.contains_key(key);
        }
        if self
            .parsed
            .flags
            .get(name)
            .is_some_and(|occs| occs.iter().any(|o| !o.is_group()))
        {
            return true;
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => self
                .parsed
                .flags
                .values()
                .flatten()
                .any(|o| o.members().contains(&c)),
            _ => false,
        }
    }

    /// Spellings of every input occurrence that belongs to a declared key other than `key`.
    ///
    /// Unrecognized flags and positionals no declaration owns are left out.
    pub(super) fn others_present(&self, key: &str) -> Vec<String> {
        let is_other = |owner: Option<&String>| owner.is_some_and(|owner| owner != key);
        let mut others: Vec<String> = Vec::new();
        let mut push = |name: String| {
            if !others.contains(&name) {
                others.push(name);
            }
        };
        for (name, occ) in self.parsed.flag_occurrences() {
            if occ.is_group() {
                for member in occ.members() {
                    if is_other(self.flag_owner(&member.to_string(), AliasKind::Short)) {
                        push(format!("-{member}"));
                    }
                }
            } else if is_other(self.flag_owner(name, written_as(&occ.form))) {
                push(occ.raw.clone());
            }
        }
        for (i, p) in &self.parsed.positionals {
            if is_other(self.positional_owner.get(i)) {
                push(p.raw.clone());
            }
        }
        others
    }

    /// Primary key of the flag spelled `name`, when a declaration accepts it in that `kind`.
    pub(super) fn flag_owner(&self, name: &str, kind: AliasKind) -> Option<&String> {
        if self.spelling_kinds.get(name) != Some(&kind) {
            return None;
        }
        self.flag_names.get(name)
    }

    fn primary_key<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if let Some(key) = self.flag_names.get(name) {
            return Some(key);
        }
        self.positional_keys.contains_key(name).then_some(name)
    }

    /// How a user would write `name`: the declaration's display name, or `--name`.
    pub(super) fn display(&self, name: &str) -> String {
        self.primary_key(name)
            .and_then(|key| self.displays.get(key))
            .cloned()
            .unwrap_or_else(|| format!("--{name}"))
    }

    /// Symbol table of every declared flag name and alias.
    pub(super) fn flag_names(&self) -> &PrefixTree<String> {
        &self.flag_names
    }
}

/// The long key and every alias of a flag declaration, with how each is written.
fn flag_spellings(decl: &Declaration) -> impl Iterator<Item = (&str, AliasKind)> {
    std::iter::once((decl.key(), AliasKind::Long))
        .chain(decl.aliases().iter().map(|a| (a.value.as_str(), a.kind)))
}

/// Which alias kind an occurrence was written as. Group members are short flags.
pub(super) fn written_as(form: &FlagForm) -> AliasKind {
    match form {
        FlagForm::Long => AliasKind::Long,
        FlagForm::Short | FlagForm::Group { .. } => AliasKind::Short,
    }
}
