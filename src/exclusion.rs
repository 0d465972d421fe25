//! @acp:module "Exclusion Strategies"
//! @acp:summary "Predicates that drop a field when its value matches"
//! @acp:domain serialization
//! @acp:layer logic
//!
//! Strategies never fail: a missing sibling, a kind mismatch or a literal
//! that does not parse under the field's type all count as "no match".

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};

use crate::value::{Projectable, RecordView, Scalar, Shape};

/// @acp:summary "Decides whether a field value should be excluded"
pub trait ExclusionStrategy: fmt::Debug + Send + Sync {
    /// Stable name for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether `value` matches. `record` is the record holding the field,
    /// when there is one.
    fn matches(&self, value: &dyn Projectable, record: Option<&RecordView<'_>>) -> bool;
}

/// @acp:summary "Matches when the value deep-equals a sibling field"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeEqualField {
    field: String,
}

impl ExcludeEqualField {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl ExclusionStrategy for ExcludeEqualField {
    fn name(&self) -> &'static str {
        "equal_field"
    }

    fn matches(&self, value: &dyn Projectable, record: Option<&RecordView<'_>>) -> bool {
        let Some(sibling) = record.and_then(|r| r.lookup(&self.field)) else {
            return false;
        };
        deep_equal(value, sibling)
    }
}

/// @acp:summary "Matches when the value equals a literal parsed under the value's type"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludeEqualValue {
    literal: String,
}

impl ExcludeEqualValue {
    pub fn new(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
        }
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }
}

impl ExclusionStrategy for ExcludeEqualValue {
    fn name(&self) -> &'static str {
        "equal_value"
    }

    fn matches(&self, value: &dyn Projectable, _record: Option<&RecordView<'_>>) -> bool {
        match value.shape() {
            Shape::Scalar(scalar) => scalar_equals_literal(&scalar, &self.literal),
            _ => false,
        }
    }
}

/// Structural equality. Values of different kinds are never equal, at any
/// depth. Private record fields are not compared.
pub(crate) fn deep_equal(a: &dyn Projectable, b: &dyn Projectable) -> bool {
    match (a.shape(), b.shape()) {
        (Shape::Null, Shape::Null) => true,
        (Shape::Scalar(x), Shape::Scalar(y)) => x == y,
        (Shape::Raw(x), Shape::Raw(y)) => x.get() == y.get(),
        (Shape::Sequence(xs), Shape::Sequence(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(&ys).all(|(x, y)| deep_equal(*x, *y))
        }
        (Shape::Mapping(xs), Shape::Mapping(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(key, x)| {
                    ys.iter()
                        .find(|(other, _)| other == key)
                        .is_some_and(|(_, y)| deep_equal(*x, *y))
                })
        }
        (Shape::Record(x), Shape::Record(y)) => {
            x.type_name() == y.type_name()
                && x.fields().len() == y.fields().len()
                && x.fields().iter().zip(y.fields()).all(|(fx, fy)| {
                    fx.ident() == fy.ident()
                        && match (fx.value(), fy.value()) {
                            (Some(vx), Some(vy)) => deep_equal(vx, vy),
                            (None, None) => true,
                            _ => false,
                        }
                })
        }
        _ => false,
    }
}

fn scalar_equals_literal(scalar: &Scalar<'_>, literal: &str) -> bool {
    match scalar {
        Scalar::Int(i) => literal.parse::<i64>().is_ok_and(|lit| lit == *i),
        Scalar::Uint(u) => literal.parse::<u64>().is_ok_and(|lit| lit == *u),
        Scalar::Float(f) => literal.parse::<f64>().is_ok_and(|lit| lit == *f),
        Scalar::Bool(b) => parse_bool(literal) == Some(*b),
        Scalar::Str(s) => s == literal,
        Scalar::Bytes(bytes) => *bytes == literal.as_bytes(),
        Scalar::Timestamp(t) => timestamp_equals_literal(t, literal),
        Scalar::Text(text) => text == literal,
    }
}

/// RFC 3339 first, then integer epoch seconds.
fn timestamp_equals_literal(t: &DateTime<Utc>, literal: &str) -> bool {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(literal) {
        return *t == parsed;
    }
    literal
        .parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .is_some_and(|parsed| *t == parsed)
}

fn parse_bool(literal: &str) -> Option<bool> {
    match literal {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ByteString, Displayed, FieldView};

    fn excluded_by_value(value: &dyn Projectable, literal: &str) -> bool {
        ExcludeEqualValue::new(literal).matches(value, None)
    }

    #[test]
    fn test_names() {
        assert_eq!(ExcludeEqualField::new("a").name(), "equal_field");
        assert_eq!(ExcludeEqualValue::new("a").name(), "equal_value");
    }

    #[test]
    fn test_integer_literals() {
        assert!(excluded_by_value(&0i32, "0"));
        assert!(excluded_by_value(&-7i64, "-7"));
        assert!(!excluded_by_value(&7i64, "8"));
        assert!(!excluded_by_value(&7i64, "seven"));
        assert!(excluded_by_value(&7u16, "7"));
        assert!(!excluded_by_value(&7u16, "-7"));
    }

    #[test]
    fn test_float_and_bool_literals() {
        assert!(excluded_by_value(&1.5f64, "1.5"));
        assert!(!excluded_by_value(&1.5f64, "1.25"));
        assert!(excluded_by_value(&true, "true"));
        assert!(excluded_by_value(&true, "T"));
        assert!(excluded_by_value(&false, "0"));
        assert!(!excluded_by_value(&false, "no"));
    }

    #[test]
    fn test_string_and_bytes_literals() {
        assert!(excluded_by_value(&"draft".to_string(), "draft"));
        assert!(!excluded_by_value(&"draft".to_string(), "Draft"));
        assert!(excluded_by_value(&ByteString(b"abc".to_vec()), "abc"));
        assert!(!excluded_by_value(&ByteString(b"abc".to_vec()), "ab"));
    }

    #[test]
    fn test_timestamp_literals() {
        let t = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert!(excluded_by_value(&t, "1700000000"));
        assert!(excluded_by_value(&t, "2023-11-14T22:13:20Z"));
        assert!(excluded_by_value(&t, "2023-11-15T00:13:20+02:00"));
        assert!(!excluded_by_value(&t, "1700000001"));
        assert!(!excluded_by_value(&t, "yesterday"));
    }

    #[test]
    fn test_text_literal() {
        assert!(excluded_by_value(&Displayed(std::net::Ipv4Addr::LOCALHOST), "127.0.0.1"));
    }

    #[test]
    fn test_non_scalars_never_match_a_literal() {
        assert!(!excluded_by_value(&vec![1, 2], "[1,2]"));
        assert!(!excluded_by_value(&Option::<i32>::None, "null"));
    }

    #[test]
    fn test_equal_field() {
        let created = 100u64;
        let updated = 100u64;
        let label = "100".to_string();
        let record = RecordView::new(
            "Object",
            vec![
                FieldView::new("created_at", &created),
                FieldView::new("updated_at", &updated),
                FieldView::new("label", &label),
                FieldView::private("idx"),
            ],
        );

        assert!(ExcludeEqualField::new("created_at").matches(&updated, Some(&record)));
        assert!(!ExcludeEqualField::new("created_at").matches(&120u64, Some(&record)));
        // Same digits, different kind.
        assert!(!ExcludeEqualField::new("label").matches(&updated, Some(&record)));
        assert!(!ExcludeEqualField::new("created_at").matches(&100i64, Some(&record)));
        assert!(!ExcludeEqualField::new("idx").matches(&updated, Some(&record)));
        assert!(!ExcludeEqualField::new("missing").matches(&updated, Some(&record)));
        assert!(!ExcludeEqualField::new("created_at").matches(&updated, None));
    }

    #[test]
    fn test_deep_equal_collections() {
        assert!(deep_equal(&vec![1, 2], &vec![1, 2]));
        assert!(!deep_equal(&vec![1, 2], &vec![2, 1]));
        assert!(!deep_equal(&vec![1u8], &[1i8]));

        let a = std::collections::BTreeMap::from([("k", vec!["x"])]);
        let b = std::collections::HashMap::from([("k", vec!["x"])]);
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &std::collections::HashMap::from([("k", vec!["y"])])));
    }

    #[test]
    fn test_deep_equal_rejects_hidden_and_nan() {
        assert!(!deep_equal(&crate::value::Private(1), &crate::value::Private(1)));
        assert!(!deep_equal(&f64::NAN, &f64::NAN));
        assert!(deep_equal(&Option::<u8>::None, &Option::<String>::None));
    }
}
