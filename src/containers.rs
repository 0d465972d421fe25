//! @acp:module "Std Implementations"
//! @acp:summary "Projectable implementations for primitives, wrappers and collections"
//! @acp:domain serialization
//! @acp:layer model

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::node::Node;
use crate::value::{
    ByteString, CustomProjection, Displayed, Private, Projectable, Scalar, Shape,
};

macro_rules! impl_signed {
    ($($ty:ty),*) => {
        $(
            impl Projectable for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Scalar(Scalar::Int(*self as i64))
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Projectable for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Scalar(Scalar::Uint(*self as u64))
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl Projectable for f32 {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Float(f64::from(*self)))
    }
}

impl Projectable for f64 {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Float(*self))
    }
}

impl Projectable for bool {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Bool(*self))
    }
}

impl Projectable for char {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Str(Cow::Owned(self.to_string())))
    }
}

impl Projectable for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Str(Cow::Borrowed(self)))
    }
}

impl Projectable for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Str(Cow::Borrowed(self.as_str())))
    }
}

impl Projectable for Cow<'_, str> {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Str(Cow::Borrowed(self.as_ref())))
    }
}

impl<Tz: TimeZone> Projectable for DateTime<Tz> {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Timestamp(self.with_timezone(&Utc)))
    }
}

impl Projectable for ByteString {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Bytes(&self.0))
    }
}

impl<T> Projectable for Private<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Hidden
    }
}

impl<T: Display> Projectable for Displayed<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Scalar(Scalar::Text(self.0.to_string()))
    }
}

// Wrappers are transparent: both the shape and the hook come from the
// wrapped value.
macro_rules! impl_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Projectable + ?Sized> Projectable for $ptr<T> {
                fn shape(&self) -> Shape<'_> {
                    (**self).shape()
                }

                fn custom(&self) -> Option<&dyn CustomProjection> {
                    (**self).custom()
                }

                fn type_name(&self) -> &'static str {
                    (**self).type_name()
                }
            }
        )*
    };
}

impl_pointer!(Box, Rc, Arc);

impl<T: Projectable + ?Sized> Projectable for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn custom(&self) -> Option<&dyn CustomProjection> {
        (**self).custom()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }
}

impl<T: Projectable> Projectable for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(value) => value.shape(),
            None => Shape::Null,
        }
    }

    fn custom(&self) -> Option<&dyn CustomProjection> {
        self.as_ref().and_then(|value| value.custom())
    }

    fn type_name(&self) -> &'static str {
        match self {
            Some(value) => value.type_name(),
            None => std::any::type_name::<T>(),
        }
    }
}

macro_rules! impl_sequence {
    ($($seq:ident),*) => {
        $(
            impl<T: Projectable> Projectable for $seq<T> {
                fn shape(&self) -> Shape<'_> {
                    Shape::Sequence(self.iter().map(|item| item as &dyn Projectable).collect())
                }
            }
        )*
    };
}

impl_sequence!(Vec, VecDeque, BTreeSet);

impl<T: Projectable, S> Projectable for HashSet<T, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(self.iter().map(|item| item as &dyn Projectable).collect())
    }
}

impl<T: Projectable> Projectable for [T] {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(self.iter().map(|item| item as &dyn Projectable).collect())
    }
}

impl<T: Projectable, const N: usize> Projectable for [T; N] {
    fn shape(&self) -> Shape<'_> {
        Shape::Sequence(self.iter().map(|item| item as &dyn Projectable).collect())
    }
}

impl<K: Display, V: Projectable, S> Projectable for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Mapping(
            self.iter()
                .map(|(key, value)| (key.to_string(), value as &dyn Projectable))
                .collect(),
        )
    }
}

impl<K: Display, V: Projectable> Projectable for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Mapping(
            self.iter()
                .map(|(key, value)| (key.to_string(), value as &dyn Projectable))
                .collect(),
        )
    }
}

impl Projectable for Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Value::Null => Shape::Null,
            Value::Bool(b) => Shape::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Shape::Scalar(number_scalar(n)),
            Value::String(s) => Shape::Scalar(Scalar::Str(Cow::Borrowed(s.as_str()))),
            Value::Array(items) => {
                Shape::Sequence(items.iter().map(|item| item as &dyn Projectable).collect())
            }
            Value::Object(entries) => Shape::Mapping(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value as &dyn Projectable))
                    .collect(),
            ),
        }
    }
}

impl Projectable for Node {
    fn shape(&self) -> Shape<'_> {
        match self {
            Node::Null => Shape::Null,
            Node::Bool(b) => Shape::Scalar(Scalar::Bool(*b)),
            Node::Number(n) => Shape::Scalar(number_scalar(n)),
            Node::String(s) => Shape::Scalar(Scalar::Str(Cow::Borrowed(s.as_str()))),
            Node::Array(items) => {
                Shape::Sequence(items.iter().map(|item| item as &dyn Projectable).collect())
            }
            Node::Object(entries) => Shape::Mapping(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value as &dyn Projectable))
                    .collect(),
            ),
            Node::Raw(raw) => Shape::Raw(&**raw),
        }
    }
}

fn number_scalar(n: &serde_json::Number) -> Scalar<'static> {
    if let Some(i) = n.as_i64() {
        Scalar::Int(i)
    } else if let Some(u) = n.as_u64() {
        Scalar::Uint(u)
    } else {
        Scalar::Float(n.as_f64().unwrap_or_default())
    }
}
