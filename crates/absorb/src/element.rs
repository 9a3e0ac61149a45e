// Copyright (c) 2025 absorb contributors
// This file is licensed under the MIT, see license.md file

use std::collections::{BTreeMap, HashMap};

use crate::{
	error::Fault,
	plan::Plan,
	value::{Blob, FromValue, Value},
};

/// The shape of one destination element, decided at compile time and
/// consulted once per session open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
	/// A single convertible value (integers, floats, text, blobs).
	Scalar,
	/// A struct-like record with registered fields.
	Record,
	/// A keyed mapping; session keys become runtime map keys.
	Mapping,
}

/// Registration-time descriptor for one record field.
///
/// The `tags` table lists declared binding keys per tag namespace; an empty
/// declared key excludes the field for that namespace. The setter runs the
/// value-assignment algorithm into the field.
pub struct FieldSpec<T> {
	pub name: &'static str,
	pub tags: &'static [(&'static str, &'static str)],
	pub set: fn(&mut T, Value) -> Result<(), Fault>,
}

/// A type rows can be bound into: the per-row element of a destination.
///
/// Implemented for native scalars, keyed mappings, and (through
/// `#[derive(Element)]`) user record types. Field registration replaces
/// runtime introspection: a record declares its fields once, and binding
/// plans are resolved against that table.
pub trait Element: Sized + 'static {
	fn kind() -> ElementKind;

	/// Field table for record elements; empty for scalars and mappings.
	fn fields() -> &'static [FieldSpec<Self>] {
		&[]
	}

	/// Constructs one element from one row of column values.
	fn build(plan: &Plan, row: Vec<Value>) -> Result<Self, Fault>;
}

/// Binds one row into a record element through its resolved plan.
///
/// Undefined values are never assigned: the field keeps its default.
/// Keys without a matching field are silently ignored.
pub fn bind_record<T: Element + Default>(plan: &Plan, row: Vec<Value>) -> Result<T, Fault> {
	let specs = T::fields();
	let field_map = plan.field_map();
	if row.len() != field_map.len() {
		return Err(Fault::Arity {
			expected: field_map.len(),
			got: row.len(),
		});
	}
	let mut element = T::default();
	for (slot, value) in field_map.iter().zip(row) {
		if value.is_undefined() {
			continue;
		}
		if let Some(idx) = slot {
			(specs[*idx].set)(&mut element, value)?;
		}
	}
	Ok(element)
}

/// Binds a single-value row into a scalar element.
pub fn bind_scalar<T: FromValue + Default>(mut row: Vec<Value>) -> Result<T, Fault> {
	if row.len() != 1 {
		return Err(Fault::Arity {
			expected: 1,
			got: row.len(),
		});
	}
	let value = row.remove(0);
	if value.is_undefined() {
		return Ok(T::default());
	}
	T::from_value(value)
}

/// Binds one row into a keyed mapping, using the session keys verbatim.
///
/// An undefined value omits its key from the mapping entirely. Short rows
/// leave trailing keys absent; surplus values have no key and fault.
pub fn bind_mapping<M, V>(plan: &Plan, row: Vec<Value>) -> Result<M, Fault>
where
	M: Default + Extend<(String, V)>,
	V: FromValue,
{
	let keys = plan.keys();
	if row.len() > keys.len() {
		return Err(Fault::Arity {
			expected: keys.len(),
			got: row.len(),
		});
	}
	let mut mapping = M::default();
	for (key, value) in keys.iter().zip(row) {
		if value.is_undefined() {
			continue;
		}
		mapping.extend(std::iter::once((key.clone(), V::from_value(value)?)));
	}
	Ok(mapping)
}

macro_rules! impl_scalar_element {
	($($scalar:ty),+ $(,)?) => {
		$(
			impl Element for $scalar {
				fn kind() -> ElementKind {
					ElementKind::Scalar
				}

				fn build(_plan: &Plan, row: Vec<Value>) -> Result<Self, Fault> {
					bind_scalar(row)
				}
			}
		)+
	};
}

impl_scalar_element!(bool, i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64, String, Blob, Value);

impl<V: FromValue + 'static> Element for HashMap<String, V> {
	fn kind() -> ElementKind {
		ElementKind::Mapping
	}

	fn build(plan: &Plan, row: Vec<Value>) -> Result<Self, Fault> {
		bind_mapping(plan, row)
	}
}

impl<V: FromValue + 'static> Element for BTreeMap<String, V> {
	fn kind() -> ElementKind {
		ElementKind::Mapping
	}

	fn build(plan: &Plan, row: Vec<Value>) -> Result<Self, Fault> {
		bind_mapping(plan, row)
	}
}
