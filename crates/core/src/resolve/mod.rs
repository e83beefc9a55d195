//! Resolution and coercion engine.
//!
//! Turns a [`ParsedArguments`] skeleton into typed values. Declarations are
//! processed in order and the pass stops at the first declaration that cannot
//! be satisfied; that declaration's own coercion failures are reported
//! together. Flags matching no declaration are reported after every
//! declaration has resolved.

mod diagnostics_util;
mod occurrences;

use crate::coerce::CoercerRegistry;
use crate::error::Error;
use crate::grammar::ast::{ParsedArguments, ResolvedCommand};
use crate::resolver::{EnvResolver, Resolver};
use argot_diagnostics::Span;
use argot_schema::{
    AliasKind, Declaration, DefaultValue, ExcessValuePolicy, MultiplePolicy, ParserOptions,
    UnrecognizedPolicy, Value,
};
use diagnostics_util as diag;
use occurrences::{Occurrence, OccurrenceIndex, written_as};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ValueSource {
    /// The input.
    User,
    /// A resolver in the chain.
    Resolver {
        /// The resolver's id.
        id: String,
    },
    /// A declared default.
    Default,
}

/// The final value of one declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResolvedValue {
    /// A single value.
    Single {
        /// Raw text the value was coerced from.
        raw: String,
        /// Typed value.
        value: Value,
        /// Origin of the value.
        source: ValueSource,
    },
    /// A list of values.
    Multi {
        /// Raw text of each element.
        raw: Vec<String>,
        /// Typed elements, one per raw element.
        values: Vec<Value>,
        /// Origin of the values.
        source: ValueSource,
    },
}

impl ResolvedValue {
    /// Origin of the value.
    pub fn source(&self) -> &ValueSource {
        match self {
            ResolvedValue::Single { source, .. } | ResolvedValue::Multi { source, .. } => source,
        }
    }

    /// The value, if single.
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            ResolvedValue::Single { value, .. } => Some(value),
            ResolvedValue::Multi { .. } => None,
        }
    }

    /// The elements, if multi.
    pub fn as_multi(&self) -> Option<&[Value]> {
        match self {
            ResolvedValue::Multi { values, .. } => Some(values),
            ResolvedValue::Single { .. } => None,
        }
    }
}

/// Typed outcome of an interpretation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// Matched command, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<ResolvedCommand>,
    /// Primary key → value. Optional declarations without a value are absent.
    pub values: BTreeMap<String, ResolvedValue>,
}

impl Resolution {
    /// Command path, empty when no command was matched.
    pub fn command_path(&self) -> &[String] {
        self.command.as_ref().map_or(&[], |c| c.path.as_slice())
    }

    /// Value of the declaration with primary key `key`.
    pub fn get(&self, key: &str) -> Option<&ResolvedValue> {
        self.values.get(key)
    }
}

/// Resolve and coerce every declaration against a parsed input.
///
/// `declarations` is the effective set of the resolved command, in order.
/// `resolvers` are consulted in order, followed by an environment resolver
/// when `options.environment_prefix` is set.
pub async fn coerce(
    parsed: &ParsedArguments,
    options: &ParserOptions,
    declarations: &[Arc<Declaration>],
    resolvers: &[Arc<dyn Resolver>],
    coercers: &CoercerRegistry,
) -> Result<Resolution, Error> {
    if let Some(command) = parsed.command.as_ref().filter(|c| c.deprecated) {
        return Err(Error::Command(diag::deprecated_command(
            command,
            options.deprecated_commands,
        )));
    }
    if options.must_provide_command && parsed.command.is_none() {
        return Err(Error::Command(diag::missing_command(
            parsed.positionals.get(&0),
        )));
    }

    let env = options.environment_prefix.as_deref().map(EnvResolver::new);
    let mut chain: Vec<&dyn Resolver> = resolvers.iter().map(|r| r.as_ref()).collect();
    if let Some(env) = &env {
        chain.push(env);
    }

    let engine = Engine {
        options,
        index: OccurrenceIndex::build(parsed, declarations),
        resolvers: chain,
        coercers,
    };

    let mut values = BTreeMap::new();
    for decl in declarations {
        if let Some(value) = engine.resolve_declaration(decl).await? {
            debug!(key = decl.key(), source = ?value.source(), "resolved declaration");
            values.insert(decl.key().to_string(), value);
        } else {
            debug!(key = decl.key(), "optional declaration left unset");
        }
    }

    engine.check_unrecognized(parsed)?;

    Ok(Resolution {
        command: parsed.command.clone(),
        values,
    })
}

struct Engine<'a> {
    options: &'a ParserOptions,
    index: OccurrenceIndex<'a>,
    resolvers: Vec<&'a dyn Resolver>,
    coercers: &'a CoercerRegistry,
}

impl Engine<'_> {
    async fn resolve_declaration(&self, decl: &Declaration) -> Result<Option<ResolvedValue>, Error> {
        let key = decl.key();
        let occurrences = self.index.occurrences(key);

        if occurrences.is_empty() {
            if let Some((id, raw)) = self.query_resolvers(key, false).await? {
                let source = ValueSource::Resolver { id };
                return self.coerce_values(decl, vec![raw], source, None).await.map(Some);
            }
            if let Some(default) = &decl.unspecified_default {
                return Ok(Some(from_default(decl, default)));
            }
            let optional = decl.optional
                || decl
                    .required_unless_present
                    .iter()
                    .any(|k| self.index.is_present(k));
            if optional {
                return Ok(None);
            }
            return Err(Error::Coercion(vec![diag::missing_argument(decl)]));
        }

        if occurrences.iter().any(|o| !o.from_group) {
            self.check_relations(decl, occurrences)?;
        }

        let selected = self.apply_multiplicity(decl, occurrences)?;
        let span = selected
            .iter()
            .map(|o| o.span)
            .reduce(Span::cover)
            .unwrap_or_else(|| Span::empty(0));
        let values: Vec<String> = selected.iter().flat_map(|o| o.values.iter().cloned()).collect();

        if values.is_empty() {
            if let Some((id, raw)) = self.query_resolvers(key, true).await? {
                let source = ValueSource::Resolver { id };
                return self.coerce_values(decl, vec![raw], source, Some(span)).await.map(Some);
            }
            if let Some(default) = &decl.specified_default {
                return Ok(Some(from_default(decl, default)));
            }
            if decl.array {
                return Ok(Some(ResolvedValue::Multi {
                    raw: Vec::new(),
                    values: Vec::new(),
                    source: ValueSource::User,
                }));
            }
            return Err(Error::Coercion(vec![diag::missing_value(decl, span)]));
        }

        self.coerce_values(decl, values, ValueSource::User, Some(span))
            .await
            .map(Some)
    }

    /// First resolver in the chain that reports `key` as existing and supplies a value.
    async fn query_resolvers(
        &self,
        key: &str,
        user_provided_raw: bool,
    ) -> Result<Option<(String, String)>, Error> {
        for resolver in &self.resolvers {
            let id = resolver.id();
            trace!(resolver = id, key, user_provided_raw, "querying resolver");
            let exists = resolver
                .key_exists(key, user_provided_raw)
                .await
                .map_err(|source| resolver_error(id, key, source))?;
            if !exists {
                continue;
            }
            let value = resolver
                .resolve_key(key)
                .await
                .map_err(|source| resolver_error(id, key, source))?;
            match value {
                Some(v) => return Ok(Some((id.to_string(), v))),
                None => trace!(resolver = id, key, "resolver claimed key without a value"),
            }
        }
        Ok(None)
    }

    fn check_relations(&self, decl: &Declaration, occurrences: &[Occurrence]) -> Result<(), Error> {
        let span = occurrences.iter().find(|o| !o.from_group).map(|o| o.span);
        for dependency in &decl.dependencies {
            if !self.index.is_present(dependency) {
                let shown = self.index.display(dependency);
                return Err(Error::Coercion(vec![diag::unmet_dependency(decl, &shown, span)]));
            }
        }
        for conflict in &decl.conflicts {
            if self.index.is_present(conflict) {
                let shown = self.index.display(conflict);
                return Err(Error::Coercion(vec![diag::conflicting_argument(
                    decl, &shown, span,
                )]));
            }
        }
        if decl.exclusive {
            let others = self.index.others_present(decl.key());
            if !others.is_empty() {
                return Err(Error::Coercion(vec![diag::exclusive_argument(
                    decl, &others, span,
                )]));
            }
        }
        Ok(())
    }

    fn apply_multiplicity<'o>(
        &self,
        decl: &Declaration,
        occurrences: &'o [Occurrence],
    ) -> Result<&'o [Occurrence], Error> {
        if occurrences.len() < 2 {
            return Ok(occurrences);
        }
        let policy = if decl.array {
            self.options.array_multiple_definitions
        } else {
            self.options.too_many_definitions
        };
        let n = occurrences.len();
        trace!(key = decl.key(), occurrences = n, %policy, "applying multiplicity policy");
        match policy {
            MultiplePolicy::Append if decl.array => Ok(occurrences),
            MultiplePolicy::Append => Err(Error::Coercion(vec![diag::append_not_allowed(
                decl,
                occurrences[1].span,
            )])),
            MultiplePolicy::Drop => Ok(&occurrences[..1]),
            MultiplePolicy::Overwrite => Ok(&occurrences[n - 1..]),
            MultiplePolicy::Throw => Err(Error::Coercion(vec![diag::too_many_definitions(
                decl,
                n,
                occurrences[1].span,
            )])),
        }
    }

    /// Union coercion over the declaration's candidate types.
    async fn coerce_values(
        &self,
        decl: &Declaration,
        values: Vec<String>,
        source: ValueSource,
        span: Option<Span>,
    ) -> Result<ResolvedValue, Error> {
        let unknown: Vec<_> = decl
            .types
            .iter()
            .filter(|t| self.coercers.get(t).is_none())
            .map(|t| diag::unknown_type(decl, t))
            .collect();
        if !unknown.is_empty() {
            return Err(Error::Coercion(unknown));
        }

        let mut errors = Vec::new();
        if decl.array {
            // A type is chosen only when it accepts every element.
            for type_name in &decl.types {
                let Some(coercer) = self.coercers.get(type_name) else {
                    continue;
                };
                let mut typed = Vec::with_capacity(values.len());
                let mut failed = false;
                for (i, raw) in values.iter().enumerate() {
                    trace!(key = decl.key(), type_name = %type_name, raw = %raw, "coercing element");
                    match coercer.coerce(raw).await {
                        Ok(value) => typed.push(value),
                        Err(reason) => {
                            failed = true;
                            errors.push(diag::invalid_value(
                                decl,
                                type_name,
                                raw,
                                reason,
                                Some(i + 1),
                                span,
                            ));
                        }
                    }
                }
                if !failed {
                    return Ok(ResolvedValue::Multi {
                        raw: values,
                        values: typed,
                        source,
                    });
                }
            }
            return Err(Error::Coercion(errors));
        }

        let raw = &values[0];
        let mut chosen = None;
        for type_name in &decl.types {
            let Some(coercer) = self.coercers.get(type_name) else {
                continue;
            };
            trace!(key = decl.key(), type_name = %type_name, raw = %raw, "coercing value");
            match coercer.coerce(raw).await {
                Ok(value) => {
                    chosen = Some(value);
                    break;
                }
                Err(reason) => errors.push(diag::invalid_value(decl, type_name, raw, reason, None, span)),
            }
        }
        let Some(value) = chosen else {
            return Err(Error::Coercion(errors));
        };

        if values.len() > 1 {
            match self.options.too_many_values {
                ExcessValuePolicy::Throw => {
                    return Err(Error::Coercion(vec![diag::too_many_values(
                        decl,
                        &values[1..],
                        span,
                    )]));
                }
                ExcessValuePolicy::Drop => {
                    debug!(key = decl.key(), dropped = values.len() - 1, "dropping excess values");
                }
            }
        }

        Ok(ResolvedValue::Single {
            raw: raw.clone(),
            value,
            source,
        })
    }

    /// Report or skip every flag, group members included, that matches no declaration.
    fn check_unrecognized(&self, parsed: &ParsedArguments) -> Result<(), Error> {
        let names = self.index.flag_names();
        let mut unknown: Vec<(String, String, Span)> = Vec::new();
        for (name, occ) in parsed.flag_occurrences() {
            if occ.is_group() {
                for member in occ.members() {
                    let member = member.to_string();
                    if self.index.flag_owner(&member, AliasKind::Short).is_none() {
                        unknown.push((format!("-{member}"), member, occ.span));
                    }
                }
            } else if self.index.flag_owner(name, written_as(&occ.form)).is_none() {
                unknown.push((occ.raw.clone(), name.to_string(), occ.span));
            }
        }
        if unknown.is_empty() {
            return Ok(());
        }

        if self.options.unrecognized_argument == UnrecognizedPolicy::Skip {
            for (raw, _, _) in &unknown {
                debug!(arg = %raw, "skipping unrecognized argument");
            }
            return Ok(());
        }

        let mut seen = std::collections::BTreeSet::new();
        let diagnostics = unknown
            .into_iter()
            .filter(|(raw, _, _)| seen.insert(raw.clone()))
            .map(|(raw, name, span)| {
                let suggestion = names.suggest(&name).into_iter().next().map(|s| {
                    if s.chars().count() == 1 {
                        format!("-{s}")
                    } else {
                        format!("--{s}")
                    }
                });
                diag::unrecognized_argument(&raw, suggestion, span)
            })
            .collect();
        Err(Error::Coercion(diagnostics))
    }
}

fn resolver_error(id: &str, key: &str, source: crate::resolver::BoxError) -> Error {
    Error::Resolver {
        id: id.to_string(),
        key: key.to_string(),
        source,
    }
}

fn from_default(decl: &Declaration, default: &DefaultValue) -> ResolvedValue {
    match default {
        DefaultValue::Single(value) if decl.array => ResolvedValue::Multi {
            raw: vec![value.to_string()],
            values: vec![value.clone()],
            source: ValueSource::Default,
        },
        DefaultValue::Single(value) => ResolvedValue::Single {
            raw: value.to_string(),
            value: value.clone(),
            source: ValueSource::Default,
        },
        DefaultValue::Multi(values) => ResolvedValue::Multi {
            raw: values.iter().map(ToString::to_string).collect(),
            values: values.clone(),
            source: ValueSource::Default,
        },
    }
}
