// Copyright (c) 2025 absorb contributors
// This file is licensed under the MIT, see license.md file

use super::{Blob, Value};

macro_rules! impl_into_value {
	($($source:ty => $variant:ident),+ $(,)?) => {
		$(
			impl From<$source> for Value {
				fn from(v: $source) -> Self {
					Value::$variant(v)
				}
			}
		)+
	};
}

impl_into_value! {
	bool => Boolean,
	f32 => Float4,
	f64 => Float8,
	i8 => Int1,
	i16 => Int2,
	i32 => Int4,
	i64 => Int8,
	i128 => Int16,
	u8 => Uint1,
	u16 => Uint2,
	u32 => Uint4,
	u64 => Uint8,
	u128 => Uint16,
	String => Utf8,
	Blob => Blob,
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Utf8(v.to_string())
	}
}

impl From<Vec<u8>> for Value {
	fn from(v: Vec<u8>) -> Self {
		Value::Blob(Blob::new(v))
	}
}

/// `None` is the absent value: it is never assigned to a destination slot.
impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(v: Option<T>) -> Self {
		match v {
			Some(v) => v.into(),
			None => Value::Undefined,
		}
	}
}

/// Builds one row of column values from native Rust values.
///
/// ```
/// use absorb::{Value, row};
///
/// let row = row!["jane", 34i64, None::<bool>];
/// assert_eq!(row[2], Value::Undefined);
/// ```
#[macro_export]
macro_rules! row {
	() => {
		::std::vec::Vec::<$crate::Value>::new()
	};
	($($value:expr),+ $(,)?) => {
		::std::vec![$($crate::Value::from($value)),+]
	};
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_row_macro() {
		let row = row!["x", 7i32, None::<i64>];
		assert_eq!(row, vec![Value::utf8("x"), Value::Int4(7), Value::Undefined]);
	}

	#[test]
	fn test_option_into_value() {
		assert_eq!(Value::from(Some(1i64)), Value::Int8(1));
		assert_eq!(Value::from(None::<i64>), Value::Undefined);
	}
}
