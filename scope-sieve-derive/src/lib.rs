//! Procedural macros for scope-sieve
//!
//! This crate provides `#[derive(Projectable)]`, which describes a struct's
//! fields to the projector: declared identifier, output name, directive,
//! accessibility and embedding.

use proc_macro::TokenStream;

mod projectable;

/// Derive `scope_sieve::Projectable` for a struct with named fields.
///
/// Only `pub` fields are readable; other fields are listed but never emitted.
/// Generic type parameters get a `Projectable` bound.
///
/// # Field attributes
///
/// - `#[sieve("s:private;ev:0")]` or `#[sieve(tag = "...")]` - directive string
/// - `#[sieve(name = "label,omitempty")]` - naming tag, used verbatim
/// - `#[sieve(omitempty)]` - skip the field when its value is empty
/// - `#[sieve(skip)]` - never emit the field
/// - `#[sieve(embed)]` - promote the field's own fields into the parent
///
/// Without `name`, `#[serde(rename = "...")]` supplies the output name,
/// `#[serde(skip)]` and `#[serde(skip_serializing)]` suppress the field and
/// `#[serde(flatten)]` marks it embedded. Embedded fields are readable even
/// when not `pub`. Other serde options are skipped; a serde attribute that
/// does not parse as a comma-separated option list is a compile error.
///
/// # Container attributes
///
/// - `#[sieve(custom)]` - route projection through the type's
///   `CustomProjection` impl
/// - `#[sieve(display)]` - project as the type's `Display` text; works on
///   any struct or enum
///
/// # Example
///
/// ```ignore
/// #[derive(Projectable)]
/// pub struct Object {
///     pub created_at: u64,
///     #[sieve("ef:created_at")]
///     pub updated_at: u64,
/// }
/// ```
#[proc_macro_derive(Projectable, attributes(sieve))]
pub fn derive_projectable(input: TokenStream) -> TokenStream {
    projectable::derive_projectable_impl(input)
}
