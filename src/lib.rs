#![forbid(unsafe_code)]

//! @acp:module "Scope Sieve Library"
//! @acp:summary "Scope-driven selective projection of values into JSON trees"
//! @acp:domain serialization
//! @acp:layer api
//! @acp:stability stable
//!
//! # Scope Sieve
//!
//! Project a value into a generic tree, keeping only the fields the caller
//! may see. Each field carries a small directive that names the scopes it is
//! visible under, which sub-fields to export and when to drop it.
//!
//! ## Directives
//!
//! - **Scopes**: `s:public,private` emits the field only when one of the
//!   listed scopes is active
//! - **Next scopes**: `ns:public` projects the field's value under a new set
//! - **Export keys**: `k:id` drills into the value and returns just `id`
//! - **Exclusions**: `ef:other` / `ev:0` drop the field when it equals a
//!   sibling or a literal; `e.any` switches from all-must-match to any
//!
//! ## Example
//!
//! ```rust
//! use scope_sieve::{sieve, Projectable};
//!
//! #[derive(Projectable)]
//! pub struct Account {
//!     pub name: String,
//!     #[sieve("s:private")]
//!     pub email: String,
//! }
//!
//! let account = Account {
//!     name: "ada".into(),
//!     email: "ada@example.com".into(),
//! };
//!
//! let public = sieve(&account, ["public"]).to_string()?;
//! assert_eq!(public, r#"{"name":"ada"}"#);
//!
//! let private = sieve(&account, ["private"]).to_string()?;
//! assert_eq!(private, r#"{"email":"ada@example.com","name":"ada"}"#);
//! # Ok::<(), scope_sieve::SieveError>(())
//! ```

extern crate self as scope_sieve;

pub mod config;
pub mod containers;
pub mod directive;
pub mod error;
pub mod exclusion;
pub mod naming;
pub mod node;
pub mod project;
pub mod scope;
pub mod sieve;
pub mod value;

// Re-exports
pub use config::{EmbeddedPolicy, SieveConfig};
pub use directive::Directive;
pub use error::{Result, SieveError};
pub use exclusion::{ExcludeEqualField, ExcludeEqualValue, ExclusionStrategy};
pub use naming::FieldName;
pub use node::Node;
pub use project::{passthrough, project, Context};
pub use scope::{ScopeSet, WILDCARD};
pub use sieve::{sieve, Sieve};
pub use value::{
    ByteString, CustomProjection, Displayed, FieldView, Kind, Private, Projectable,
    ProjectionOptions, RecordView, Scalar, Shape,
};

pub use scope_sieve_derive::Projectable;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
