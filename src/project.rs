//! @acp:module "Value Projector"
//! @acp:summary "Recursive walker that turns projectable values into filtered trees"
//! @acp:domain serialization
//! @acp:layer service
//!
//! # Dispatch
//!
//! For each value, first match wins:
//!
//! 1. No context: plain conversion, no directives ([`passthrough`])
//! 2. Custom hook: its bytes are embedded verbatim
//! 3. Hidden or absent: nothing
//! 4. Sequence: element-wise
//! 5. Mapping: key-wise, honouring export keys
//! 6. Record: field-by-field under each field's directive
//! 7. Scalar or raw JSON: as-is
//!
//! There is no cycle detection; a self-referential value recurses without
//! bound.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use crate::config::{EmbeddedPolicy, SieveConfig};
use crate::directive::Directive;
use crate::error::{Result, SieveError};
use crate::naming::FieldName;
use crate::node::Node;
use crate::scope::ScopeSet;
use crate::value::{CustomProjection, ProjectionOptions, Projectable, RecordView, Shape};

/// @acp:summary "Active scopes and settings threaded through recursion"
#[derive(Debug, Clone)]
pub struct Context<'c> {
    scopes: ScopeSet,
    config: &'c SieveConfig,
}

impl<'c> Context<'c> {
    pub fn new(scopes: ScopeSet, config: &'c SieveConfig) -> Self {
        Self { scopes, config }
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    pub fn config(&self) -> &'c SieveConfig {
        self.config
    }

    /// Child context with its own scope set and the same config.
    pub fn narrowed(&self, scopes: &[String]) -> Self {
        Self {
            scopes: ScopeSet::new(scopes.iter().cloned()),
            config: self.config,
        }
    }
}

/// @acp:summary "Project one value under a context and export-key restriction"
///
/// `export_keys` must be sorted. `Ok(None)` means the value collapsed to
/// nothing (hidden or absent).
pub fn project(
    value: &dyn Projectable,
    context: Option<&Context<'_>>,
    export_keys: &[String],
) -> Result<Option<Node>> {
    let Some(context) = context else {
        return Ok(passthrough(value));
    };

    if let Some(custom) = value.custom() {
        return project_custom(value.type_name(), custom, context, export_keys).map(Some);
    }

    match value.shape() {
        Shape::Hidden | Shape::Null => Ok(None),
        Shape::Scalar(scalar) => Ok(Some(scalar.to_node())),
        Shape::Raw(raw) => Ok(Some(Node::Raw(raw.to_owned()))),
        Shape::Sequence(items) => project_sequence(&items, context, export_keys).map(Some),
        Shape::Mapping(entries) => project_mapping(&entries, context, export_keys),
        Shape::Record(record) => project_record(&record, context, export_keys),
    }
}

/// @acp:summary "Plain conversion: naming tags apply, directives do not"
///
/// Used when no context is active, for the single-key drill-down and for
/// equality checks. Private fields and hidden values are still dropped;
/// embedded records are always flattened; custom hooks are not consulted.
pub fn passthrough(value: &dyn Projectable) -> Option<Node> {
    match value.shape() {
        Shape::Hidden => None,
        Shape::Null => Some(Node::Null),
        Shape::Scalar(scalar) => Some(scalar.to_node()),
        Shape::Raw(raw) => Some(Node::Raw(raw.to_owned())),
        Shape::Sequence(items) => Some(Node::Array(
            items
                .iter()
                .map(|item| passthrough(*item).unwrap_or_default())
                .collect(),
        )),
        Shape::Mapping(entries) => Some(Node::Object(
            entries
                .iter()
                .filter_map(|(key, value)| passthrough(*value).map(|node| (key.clone(), node)))
                .collect(),
        )),
        Shape::Record(record) => Some(Node::Object(passthrough_record(&record))),
    }
}

fn passthrough_record(record: &RecordView<'_>) -> BTreeMap<String, Node> {
    let mut out = BTreeMap::new();
    let mut promoted = BTreeMap::new();

    for field in record.fields() {
        let Some(value) = field.value() else {
            continue;
        };
        let shape = value.shape();

        if field.is_embedded() {
            if let Shape::Record(inner) = shape {
                promoted.extend(passthrough_record(&inner));
            }
            continue;
        }

        let Some(name) = FieldName::resolve(field.ident(), field.tag()) else {
            continue;
        };
        if matches!(shape, Shape::Hidden) || (name.omit_empty && shape.is_empty()) {
            continue;
        }
        if let Some(node) = passthrough(value) {
            out.insert(name.name.to_string(), node);
        }
    }

    merge_promoted(&mut out, promoted, &declared_names(record));
    out
}

fn project_custom(
    type_name: &'static str,
    custom: &dyn CustomProjection,
    context: &Context<'_>,
    export_keys: &[String],
) -> Result<Node> {
    let options = ProjectionOptions::new(context.scopes(), export_keys);
    let bytes = custom.project_json(&options).map_err(|source| {
        tracing::debug!("Custom projection for {} failed: {}", type_name, source);
        SieveError::Hook { type_name, source }
    })?;
    let raw = serde_json::from_slice(&bytes)
        .map_err(|source| SieveError::InvalidHookOutput { type_name, source })?;
    Ok(Node::Raw(raw))
}

/// With export keys active, elements that collapse to nothing are dropped;
/// otherwise every element keeps its position.
fn project_sequence(
    items: &[&dyn Projectable],
    context: &Context<'_>,
    export_keys: &[String],
) -> Result<Node> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match project(*item, Some(context), export_keys)? {
            Some(node) => out.push(node),
            None if export_keys.is_empty() => out.push(Node::Null),
            None => {}
        }
    }
    Ok(Node::Array(out))
}

fn project_mapping(
    entries: &[(String, &dyn Projectable)],
    context: &Context<'_>,
    export_keys: &[String],
) -> Result<Option<Node>> {
    let mut out = BTreeMap::new();

    for (key, value) in entries {
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        if !export_keys.is_empty() {
            if !contains_key(export_keys, key) {
                continue;
            }
            if export_keys.len() == 1 {
                return project(*value, Some(context), &[]);
            }
        }
        let node = project(*value, Some(context), &[])?.unwrap_or_default();
        out.insert(key.to_string(), node);
    }

    Ok(Some(Node::Object(out)))
}

/// @acp:summary "Field-by-field projection of a record"
fn project_record(
    record: &RecordView<'_>,
    context: &Context<'_>,
    export_keys: &[String],
) -> Result<Option<Node>> {
    // Drill-down: one export key returns that field's raw value. An absent
    // value collapses like any other absent value.
    if let [key] = export_keys {
        let value = record
            .lookup(key)
            .filter(|value| !matches!(value.shape(), Shape::Null));
        return Ok(value.and_then(passthrough));
    }

    let flatten = context.config().embedded == EmbeddedPolicy::Flatten;
    let mut out = BTreeMap::new();
    let mut promoted = BTreeMap::new();

    for field in record.fields() {
        let ident = field.ident();

        if field.is_embedded() {
            if !flatten {
                continue;
            }
            let Some(value) = field.value() else {
                continue;
            };
            let Shape::Record(inner) = value.shape() else {
                continue;
            };

            let directive = Directive::parse(field.directive());
            if !in_scope(&directive, context) {
                tracing::trace!(field = ident, "skipped embedded: out of scope");
                continue;
            }
            if directive.excludes(value, Some(record)) {
                tracing::trace!(field = ident, "skipped embedded: excluded");
                continue;
            }

            let child = child_context(context, &directive);
            if let Some(Node::Object(entries)) = project_record(&inner, &child, export_keys)? {
                for (key, node) in entries {
                    promoted.entry(key).or_insert(node);
                }
            }
            continue;
        }

        if !export_keys.is_empty() && !contains_key(export_keys, ident) {
            continue;
        }

        let Some(name) = FieldName::resolve(ident, field.tag()) else {
            continue;
        };

        let directive = Directive::parse(field.directive());
        if !in_scope(&directive, context) {
            tracing::trace!(field = ident, "skipped: out of scope");
            continue;
        }

        let Some(value) = field.value() else {
            continue;
        };
        let shape = value.shape();
        if matches!(shape, Shape::Hidden | Shape::Null) {
            continue;
        }
        if name.omit_empty && shape.is_empty() {
            tracing::trace!(field = ident, "skipped: empty");
            continue;
        }
        if directive.excludes(value, Some(record)) {
            tracing::trace!(field = ident, "skipped: excluded");
            continue;
        }

        let child = child_context(context, &directive);
        let node = project(value, Some(&*child), directive.export_keys())?;
        out.insert(name.name.to_string(), node.unwrap_or_default());
    }

    merge_promoted(&mut out, promoted, &declared_names(record));
    Ok(Some(Node::Object(out)))
}

fn in_scope(directive: &Directive, context: &Context<'_>) -> bool {
    !directive.has_scopes() || context.scopes().contains_any(directive.scopes())
}

/// Child context for a field's value: narrowed when the directive names next
/// scopes, otherwise the current one.
fn child_context<'a, 'c>(
    context: &'a Context<'c>,
    directive: &Directive,
) -> Cow<'a, Context<'c>> {
    if directive.has_next_scopes() {
        Cow::Owned(context.narrowed(directive.next_scopes()))
    } else {
        Cow::Borrowed(context)
    }
}

/// Output names of the record's own readable fields. A promoted field with
/// one of these names is shadowed even when the own field is not emitted.
fn declared_names(record: &RecordView<'_>) -> BTreeSet<&'static str> {
    record
        .fields()
        .iter()
        .filter(|field| !field.is_embedded() && field.value().is_some())
        .filter_map(|field| FieldName::resolve(field.ident(), field.tag()))
        .map(|name| name.name)
        .collect()
}

fn merge_promoted(
    out: &mut BTreeMap<String, Node>,
    promoted: BTreeMap<String, Node>,
    shadowed: &BTreeSet<&str>,
) {
    for (key, node) in promoted {
        if !shadowed.contains(key.as_str()) {
            out.entry(key).or_insert(node);
        }
    }
}

fn contains_key(sorted_keys: &[String], key: &str) -> bool {
    sorted_keys
        .binary_search_by(|probe| probe.as_str().cmp(key))
        .is_ok()
}
