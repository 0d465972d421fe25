//! @acp:module "Directive Parser"
//! @acp:summary "Parses per-field projection directives (scopes, export keys, exclusions)"
//! @acp:domain serialization
//! @acp:layer service
//!
//! # Grammar
//!
//! A directive is a list of clauses separated by `;`. Each clause is either a
//! bare flag or a `key:value` pair:
//!
//! | Key                                | Value                         |
//! |------------------------------------|-------------------------------|
//! | `s`, `scopes`                      | comma-separated scope names   |
//! | `ns`, `nextScopes`                 | scopes for the field's value  |
//! | `k`, `ek`, `exportKeys`            | comma-separated identifiers   |
//! | `ef`, `eef`, `excludeEqualField`   | sibling field identifier      |
//! | `ev`, `eev`, `excludeEqualValue`   | literal                       |
//! | `e.any` (flag)                     | exclude when any strategy matches |
//!
//! Later `s`/`ns`/`k` clauses replace earlier ones; exclusion clauses
//! accumulate in order. Unknown or malformed clauses are ignored.

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::exclusion::{ExcludeEqualField, ExcludeEqualValue, ExclusionStrategy};
use crate::value::{Projectable, RecordView};

/// Regex for a single clause: `key[:value]`
/// Groups: 1=key, 2=value
static CLAUSE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][\w.]*)\s*(?::(.*))?$").unwrap());

/// Flag that switches exclusions to any-may-match.
pub const ANY_EXCLUSION_FLAG: &str = "e.any";

/// @acp:summary "Parsed projection rules for one field"
#[derive(Clone, Default)]
pub struct Directive {
    scopes: Vec<String>,
    next_scopes: Vec<String>,
    export_keys: Vec<String>,
    exclusions: Vec<Arc<dyn ExclusionStrategy>>,
    combine_any: bool,
}

impl Directive {
    pub fn new() -> Self {
        Self::default()
    }

    /// @acp:summary "Parse a directive string; never fails"
    pub fn parse(tag: &str) -> Self {
        let mut directive = Self::default();

        for clause in tag.split(';') {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }

            let Some(caps) = CLAUSE_PATTERN.captures(clause) else {
                tracing::debug!("Ignoring malformed directive clause: {}", clause);
                continue;
            };
            let key = caps.get(1).map_or("", |m| m.as_str());
            let value = caps
                .get(2)
                .map(|m| m.as_str().trim())
                .filter(|v| !v.is_empty());

            match (key, value) {
                (ANY_EXCLUSION_FLAG, None) => directive.combine_any = true,
                ("s" | "scopes", Some(value)) => directive.scopes = split_list(value),
                ("ns" | "nextScopes", Some(value)) => directive.next_scopes = split_list(value),
                ("k" | "ek" | "exportKeys", Some(value)) => {
                    directive = directive.with_export_keys(split_list(value));
                }
                ("ef" | "eef" | "excludeEqualField", Some(value)) => {
                    directive.exclusions.push(Arc::new(ExcludeEqualField::new(value)));
                }
                ("ev" | "eev" | "excludeEqualValue", Some(value)) => {
                    directive.exclusions.push(Arc::new(ExcludeEqualValue::new(value)));
                }
                _ => tracing::debug!("Ignoring unknown directive clause: {}", clause),
            }
        }

        directive
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_next_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.next_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Export keys are kept sorted for lookup.
    pub fn with_export_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.export_keys = keys.into_iter().map(Into::into).collect();
        self.export_keys.sort();
        self
    }

    pub fn push_exclusion(mut self, strategy: impl ExclusionStrategy + 'static) -> Self {
        self.exclusions.push(Arc::new(strategy));
        self
    }

    pub fn with_combine_any(mut self, combine_any: bool) -> Self {
        self.combine_any = combine_any;
        self
    }

    pub fn has_scopes(&self) -> bool {
        !self.scopes.is_empty()
    }

    pub fn has_next_scopes(&self) -> bool {
        !self.next_scopes.is_empty()
    }

    pub fn has_export_keys(&self) -> bool {
        !self.export_keys.is_empty()
    }

    pub fn has_exclusions(&self) -> bool {
        !self.exclusions.is_empty()
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn next_scopes(&self) -> &[String] {
        &self.next_scopes
    }

    pub fn export_keys(&self) -> &[String] {
        &self.export_keys
    }

    pub fn exclusions(&self) -> &[Arc<dyn ExclusionStrategy>] {
        &self.exclusions
    }

    pub fn combine_any(&self) -> bool {
        self.combine_any
    }

    /// @acp:summary "Evaluate exclusions under the all/any combination rule"
    ///
    /// All-mode stops at the first non-matching strategy; any-mode stops at
    /// the first match. No strategies means no exclusion.
    pub fn excludes(&self, value: &dyn Projectable, record: Option<&RecordView<'_>>) -> bool {
        if self.exclusions.is_empty() {
            return false;
        }

        for strategy in &self.exclusions {
            let matched = strategy.matches(value, record);
            tracing::trace!(strategy = strategy.name(), matched, "exclusion checked");
            if matched && self.combine_any {
                return true;
            }
            if !matched && !self.combine_any {
                return false;
            }
        }

        !self.combine_any
    }
}

impl fmt::Debug for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directive")
            .field("scopes", &self.scopes)
            .field("next_scopes", &self.next_scopes)
            .field("export_keys", &self.export_keys)
            .field(
                "exclusions",
                &self.exclusions.iter().map(|e| e.name()).collect::<Vec<_>>(),
            )
            .field("combine_any", &self.combine_any)
            .finish()
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(directive: &Directive) -> Vec<&'static str> {
        directive.exclusions().iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_empty_directive() {
        let directive = Directive::parse("");
        assert!(!directive.has_scopes());
        assert!(!directive.has_export_keys());
        assert!(!directive.has_exclusions());
        assert!(!directive.combine_any());
    }

    #[test]
    fn test_short_and_long_aliases() {
        let short = Directive::parse("s:public,private;k:Name;ef:created_at;ev:0");
        let long = Directive::parse(
            "scopes:public,private;exportKeys:Name;excludeEqualField:created_at;excludeEqualValue:0",
        );
        for directive in [&short, &long] {
            assert_eq!(directive.scopes(), &["public", "private"]);
            assert_eq!(directive.export_keys(), &["Name"]);
            assert_eq!(names(directive), vec!["equal_field", "equal_value"]);
        }
        assert_eq!(Directive::parse("ek:a").export_keys(), &["a"]);
        assert_eq!(names(&Directive::parse("eef:a;eev:b")), vec!["equal_field", "equal_value"]);
    }

    #[test]
    fn test_export_keys_sorted() {
        let directive = Directive::parse("k:zeta, alpha ,mid");
        assert_eq!(directive.export_keys(), &["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_later_clause_overwrites() {
        let directive = Directive::parse("s:public;s:private;k:a,b;k:c");
        assert_eq!(directive.scopes(), &["private"]);
        assert_eq!(directive.export_keys(), &["c"]);
    }

    #[test]
    fn test_exclusions_accumulate_in_order() {
        let directive = Directive::parse("ev:1;ef:other;ev:2");
        assert_eq!(names(&directive), vec!["equal_value", "equal_field", "equal_value"]);
    }

    #[test]
    fn test_any_flag() {
        assert!(Directive::parse("ev:1;e.any").combine_any());
        assert!(Directive::parse(" e.any ").combine_any());
        assert!(!Directive::parse("e.any:true").combine_any());
    }

    #[test]
    fn test_malformed_and_unknown_clauses_ignored() {
        let directive = Directive::parse(";;:x; s: ;unknown:1;bare;s:ok;-;k:");
        assert_eq!(directive.scopes(), &["ok"]);
        assert!(!directive.has_export_keys());
        assert!(!directive.has_exclusions());
    }

    #[test]
    fn test_literal_keeps_colons() {
        let directive = Directive::parse("ev:2024-01-01T00:00:00Z");
        let value = chrono::DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
        assert!(directive.excludes(&value, None));
    }

    #[test]
    fn test_next_scopes() {
        let directive = Directive::parse("s:admin;ns:public");
        assert_eq!(directive.scopes(), &["admin"]);
        assert_eq!(directive.next_scopes(), &["public"]);
    }

    #[test]
    fn test_all_mode_requires_every_match() {
        let directive = Directive::parse("ev:0;ev:1");
        assert!(!directive.excludes(&0, None));
        assert!(!directive.excludes(&1, None));
        assert!(Directive::parse("ev:0;ev:0").excludes(&0, None));
    }

    #[test]
    fn test_any_mode_needs_one_match() {
        let directive = Directive::parse("ev:0;ev:1;e.any");
        assert!(directive.excludes(&0, None));
        assert!(directive.excludes(&1, None));
        assert!(!directive.excludes(&2, None));
    }

    #[test]
    fn test_builder_matches_parser() {
        let built = Directive::new()
            .with_scopes(["private"])
            .with_export_keys(["b", "a"])
            .push_exclusion(ExcludeEqualValue::new("x"))
            .with_combine_any(true);
        let parsed = Directive::parse("s:private;k:b,a;ev:x;e.any");
        assert_eq!(format!("{:?}", built), format!("{:?}", parsed));
    }
}
