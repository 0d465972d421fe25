//! @acp:module "Value Model"
//! @acp:summary "Shape-based view of arbitrary values for the projector"
//! @acp:domain serialization
//! @acp:layer model
//!
//! Every projectable type reports a [`Shape`]: a closed set of variants the
//! projector knows how to walk. Records describe their fields through a
//! [`RecordView`], which `#[derive(Projectable)]` generates.

use std::borrow::Cow;

use base64::Engine;
use chrono::{DateTime, Utc};
use serde_json::value::RawValue;
use serde_json::Number;

use crate::node::Node;
use crate::scope::ScopeSet;

/// @acp:summary "A value that can be projected into a generic tree"
pub trait Projectable {
    /// Describe this value's shape for the projector.
    fn shape(&self) -> Shape<'_>;

    /// Custom serialization hook. When this returns `Some`, the hook's output
    /// replaces structural projection for this value.
    fn custom(&self) -> Option<&dyn CustomProjection> {
        None
    }

    /// Type name used in error messages.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// @acp:summary "Type-supplied override that returns pre-encoded JSON"
pub trait CustomProjection {
    /// Encode this value under the given options. The bytes must hold exactly
    /// one JSON value; they are embedded verbatim in the output.
    fn project_json(&self, options: &ProjectionOptions<'_>) -> anyhow::Result<Vec<u8>>;
}

/// @acp:summary "Active scopes and export-key restriction handed to custom hooks"
#[derive(Debug, Clone, Copy)]
pub struct ProjectionOptions<'a> {
    scopes: &'a ScopeSet,
    export_keys: &'a [String],
}

impl<'a> ProjectionOptions<'a> {
    pub fn new(scopes: &'a ScopeSet, export_keys: &'a [String]) -> Self {
        Self {
            scopes,
            export_keys,
        }
    }

    pub fn scopes(&self) -> &'a ScopeSet {
        self.scopes
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    pub fn has_any_scope<I, S>(&self, scopes: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.scopes.contains_any(scopes)
    }

    pub fn has_export_keys(&self) -> bool {
        !self.export_keys.is_empty()
    }

    /// Export keys, sorted.
    pub fn export_keys(&self) -> &'a [String] {
        self.export_keys
    }
}

/// @acp:summary "Structural classification of a value"
pub enum Shape<'a> {
    /// No externally accessible representation. Never emitted.
    Hidden,
    /// Absent optional or empty pointer.
    Null,
    Scalar(Scalar<'a>),
    /// Already-encoded JSON, emitted verbatim.
    Raw(&'a RawValue),
    Sequence(Vec<&'a dyn Projectable>),
    /// Entries with stringified keys.
    Mapping(Vec<(String, &'a dyn Projectable)>),
    Record(RecordView<'a>),
}

/// Kind of a shape, used to reject cross-kind equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Hidden,
    Null,
    Bool,
    Int,
    Uint,
    Float,
    Str,
    Bytes,
    Timestamp,
    Text,
    Raw,
    Sequence,
    Mapping,
    Record(&'static str),
}

impl Shape<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Shape::Hidden => Kind::Hidden,
            Shape::Null => Kind::Null,
            Shape::Scalar(scalar) => scalar.kind(),
            Shape::Raw(_) => Kind::Raw,
            Shape::Sequence(_) => Kind::Sequence,
            Shape::Mapping(_) => Kind::Mapping,
            Shape::Record(record) => Kind::Record(record.type_name()),
        }
    }

    /// Structural emptiness for omit-if-empty: zero scalars, empty
    /// collections and absent values. Records, timestamps and custom text
    /// are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Shape::Hidden | Shape::Null => true,
            Shape::Scalar(scalar) => scalar.is_zero(),
            Shape::Raw(_) | Shape::Record(_) => false,
            Shape::Sequence(items) => items.is_empty(),
            Shape::Mapping(entries) => entries.is_empty(),
        }
    }
}

/// @acp:summary "Terminal value with its runtime type preserved"
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar<'a> {
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(Cow<'a, str>),
    Bytes(&'a [u8]),
    Timestamp(DateTime<Utc>),
    /// Custom string representation of a non-string type.
    Text(String),
}

impl Scalar<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Scalar::Bool(_) => Kind::Bool,
            Scalar::Int(_) => Kind::Int,
            Scalar::Uint(_) => Kind::Uint,
            Scalar::Float(_) => Kind::Float,
            Scalar::Str(_) => Kind::Str,
            Scalar::Bytes(_) => Kind::Bytes,
            Scalar::Timestamp(_) => Kind::Timestamp,
            Scalar::Text(_) => Kind::Text,
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Scalar::Bool(b) => !b,
            Scalar::Int(i) => *i == 0,
            Scalar::Uint(u) => *u == 0,
            Scalar::Float(f) => *f == 0.0,
            Scalar::Str(s) => s.is_empty(),
            Scalar::Bytes(b) => b.is_empty(),
            Scalar::Timestamp(_) | Scalar::Text(_) => false,
        }
    }

    /// Non-finite floats have no JSON form and become null.
    pub fn to_node(&self) -> Node {
        match self {
            Scalar::Bool(b) => Node::Bool(*b),
            Scalar::Int(i) => Node::Number(Number::from(*i)),
            Scalar::Uint(u) => Node::Number(Number::from(*u)),
            Scalar::Float(f) => Number::from_f64(*f).map_or(Node::Null, Node::Number),
            Scalar::Str(s) => Node::String(s.to_string()),
            Scalar::Bytes(b) => Node::String(base64::engine::general_purpose::STANDARD.encode(b)),
            Scalar::Timestamp(t) => {
                Node::String(t.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
            }
            Scalar::Text(s) => Node::String(s.clone()),
        }
    }
}

/// @acp:summary "Field-by-field description of a struct-like value"
pub struct RecordView<'a> {
    type_name: &'static str,
    fields: Vec<FieldView<'a>>,
}

impl<'a> RecordView<'a> {
    pub fn new(type_name: &'static str, fields: Vec<FieldView<'a>>) -> Self {
        Self { type_name, fields }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldView<'a>] {
        &self.fields
    }

    /// @acp:summary "Find an accessible field value by declared identifier"
    ///
    /// Direct fields are searched first, then fields promoted from embedded
    /// records, depth first. Private fields are not returned.
    pub fn lookup(&self, ident: &str) -> Option<&'a dyn Projectable> {
        if let Some(field) = self
            .fields
            .iter()
            .find(|f| !f.is_embedded() && f.ident() == ident)
        {
            return field.value();
        }
        self.fields
            .iter()
            .filter(|f| f.is_embedded())
            .filter_map(FieldView::value)
            .find_map(|value| match value.shape() {
                Shape::Record(inner) => inner.lookup(ident),
                _ => None,
            })
    }
}

/// @acp:summary "One declared field: identifier, metadata and (if accessible) value"
#[derive(Clone, Copy)]
pub struct FieldView<'a> {
    ident: &'static str,
    tag: Option<&'static str>,
    directive: &'static str,
    embedded: bool,
    value: Option<&'a dyn Projectable>,
}

impl<'a> FieldView<'a> {
    /// An accessible field.
    pub fn new(ident: &'static str, value: &'a dyn Projectable) -> Self {
        Self {
            ident,
            tag: None,
            directive: "",
            embedded: false,
            value: Some(value),
        }
    }

    /// A field whose value cannot be read from outside its type.
    pub fn private(ident: &'static str) -> Self {
        Self {
            ident,
            tag: None,
            directive: "",
            embedded: false,
            value: None,
        }
    }

    /// Naming tag: `"<name>[,omitempty]"`, or `"-"` to never emit.
    pub fn with_tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Directive string, see [`crate::Directive::parse`].
    pub fn with_directive(mut self, directive: &'static str) -> Self {
        self.directive = directive;
        self
    }

    pub fn as_embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn ident(&self) -> &'static str {
        self.ident
    }

    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    pub fn directive(&self) -> &'static str {
        self.directive
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn value(&self) -> Option<&'a dyn Projectable> {
        self.value
    }
}

/// @acp:summary "Raw byte sequence, encoded as base64 text"
///
/// `Vec<u8>` projects as a list of numbers; wrap it to get scalar byte
/// semantics (base64 output, byte-wise literal comparison).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ByteString(pub Vec<u8>);

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// @acp:summary "Value with no externally accessible representation"
///
/// Projects as [`Shape::Hidden`]: never emitted, whatever the scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Private<T>(pub T);

/// @acp:summary "Projects any `Display` type as its string representation"
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Displayed<T>(pub T);
