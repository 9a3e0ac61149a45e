// Copyright (c) 2025 absorb contributors
// This file is licensed under the MIT, see license.md file

use super::{Blob, Value};
use crate::error::Fault;

/// Conversion of one column [`Value`] into one destination slot.
///
/// Conversions are checked: a narrowing that would lose the value is a
/// [`Fault::Conversion`], not a silent wrap. `Undefined` is only accepted
/// by `Option` slots; the engine skips undefined values before assignment
/// everywhere else, leaving the slot at its default.
pub trait FromValue: Sized {
	fn from_value(value: Value) -> Result<Self, Fault>;
}

macro_rules! impl_from_value_integer {
	($($target:ty),+) => {
		$(
			impl FromValue for $target {
				fn from_value(value: Value) -> Result<Self, Fault> {
					let from = value.get_type();
					match value {
						Value::Int1(v) => <$target>::try_from(v).map_err(|_| Fault::conversion::<$target>(from)),
						Value::Int2(v) => <$target>::try_from(v).map_err(|_| Fault::conversion::<$target>(from)),
						Value::Int4(v) => <$target>::try_from(v).map_err(|_| Fault::conversion::<$target>(from)),
						Value::Int8(v) => <$target>::try_from(v).map_err(|_| Fault::conversion::<$target>(from)),
						Value::Int16(v) => <$target>::try_from(v).map_err(|_| Fault::conversion::<$target>(from)),
						Value::Uint1(v) => <$target>::try_from(v).map_err(|_| Fault::conversion::<$target>(from)),
						Value::Uint2(v) => <$target>::try_from(v).map_err(|_| Fault::conversion::<$target>(from)),
						Value::Uint4(v) => <$target>::try_from(v).map_err(|_| Fault::conversion::<$target>(from)),
						Value::Uint8(v) => <$target>::try_from(v).map_err(|_| Fault::conversion::<$target>(from)),
						Value::Uint16(v) => <$target>::try_from(v).map_err(|_| Fault::conversion::<$target>(from)),
						_ => Err(Fault::conversion::<$target>(from)),
					}
				}
			}
		)+
	};
}

impl_from_value_integer!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);

impl FromValue for f64 {
	fn from_value(value: Value) -> Result<Self, Fault> {
		let from = value.get_type();
		match value {
			Value::Float8(v) => Ok(v),
			Value::Float4(v) => Ok(v as f64),
			Value::Int1(v) => Ok(v as f64),
			Value::Int2(v) => Ok(v as f64),
			Value::Int4(v) => Ok(v as f64),
			Value::Int8(v) => Ok(v as f64),
			Value::Int16(v) => Ok(v as f64),
			Value::Uint1(v) => Ok(v as f64),
			Value::Uint2(v) => Ok(v as f64),
			Value::Uint4(v) => Ok(v as f64),
			Value::Uint8(v) => Ok(v as f64),
			Value::Uint16(v) => Ok(v as f64),
			_ => Err(Fault::conversion::<f64>(from)),
		}
	}
}

impl FromValue for f32 {
	fn from_value(value: Value) -> Result<Self, Fault> {
		let from = value.get_type();
		match value {
			Value::Float4(v) => Ok(v),
			// Narrowing a float8 must survive the round-trip.
			Value::Float8(v) => {
				let narrowed = v as f32;
				if narrowed as f64 == v {
					Ok(narrowed)
				} else {
					Err(Fault::conversion::<f32>(from))
				}
			}
			Value::Int1(v) => Ok(v as f32),
			Value::Int2(v) => Ok(v as f32),
			Value::Int4(v) => Ok(v as f32),
			Value::Int8(v) => Ok(v as f32),
			Value::Int16(v) => Ok(v as f32),
			Value::Uint1(v) => Ok(v as f32),
			Value::Uint2(v) => Ok(v as f32),
			Value::Uint4(v) => Ok(v as f32),
			Value::Uint8(v) => Ok(v as f32),
			Value::Uint16(v) => Ok(v as f32),
			_ => Err(Fault::conversion::<f32>(from)),
		}
	}
}

impl FromValue for bool {
	fn from_value(value: Value) -> Result<Self, Fault> {
		match value {
			Value::Boolean(v) => Ok(v),
			other => Err(Fault::conversion::<bool>(other.get_type())),
		}
	}
}

impl FromValue for String {
	fn from_value(value: Value) -> Result<Self, Fault> {
		match value {
			Value::Utf8(v) => Ok(v),
			other => Err(Fault::conversion::<String>(other.get_type())),
		}
	}
}

impl FromValue for Blob {
	fn from_value(value: Value) -> Result<Self, Fault> {
		match value {
			Value::Blob(v) => Ok(v),
			other => Err(Fault::conversion::<Blob>(other.get_type())),
		}
	}
}

impl FromValue for Value {
	fn from_value(value: Value) -> Result<Self, Fault> {
		Ok(value)
	}
}

impl<T: FromValue> FromValue for Option<T> {
	fn from_value(value: Value) -> Result<Self, Fault> {
		if value.is_undefined() {
			Ok(None)
		} else {
			T::from_value(value).map(Some)
		}
	}
}

impl<T: FromValue> FromValue for Box<T> {
	fn from_value(value: Value) -> Result<Self, Fault> {
		T::from_value(value).map(Box::new)
	}
}
