// Copyright (c) 2025 absorb contributors
// This file is licensed under the MIT, see license.md file

use std::collections::HashMap;

use crate::element::{Element, ElementKind};

/// A compiled binding plan: which destination slot each session key writes
/// to, for one element type and one ordered key sequence.
///
/// Plans are immutable once built and shared read-only between any number
/// of concurrent sessions.
#[derive(Debug)]
pub struct Plan {
	kind: ElementKind,
	keys: Vec<String>,
	/// Parallel to `keys` for record elements: index into the element's
	/// field table, or `None` when the key matches no field.
	field_map: Vec<Option<usize>>,
}

impl Plan {
	pub(crate) fn resolve<T: Element>(tag: &str, keys: &[String]) -> Self {
		let kind = T::kind();
		let field_map = match kind {
			ElementKind::Record => resolve_fields::<T>(tag, keys),
			ElementKind::Scalar | ElementKind::Mapping => Vec::new(),
		};
		Self {
			kind,
			keys: keys.to_vec(),
			field_map,
		}
	}

	pub fn kind(&self) -> ElementKind {
		self.kind
	}

	pub fn keys(&self) -> &[String] {
		&self.keys
	}

	pub fn field_map(&self) -> &[Option<usize>] {
		&self.field_map
	}
}

/// Resolves session keys against a record's registered fields.
///
/// A declared annotation for the session's tag namespace wins and is
/// exclusive: the field's name is not consulted, and an empty declared key
/// excludes the field. Otherwise the field matches by exact name first,
/// then by case-folded name; the first field registering a folded name
/// keeps it.
fn resolve_fields<T: Element>(tag: &str, keys: &[String]) -> Vec<Option<usize>> {
	let specs = T::fields();

	let mut exact: HashMap<&'static str, usize> = HashMap::with_capacity(specs.len());
	let mut folded: HashMap<String, usize> = HashMap::with_capacity(specs.len());
	for (idx, spec) in specs.iter().enumerate() {
		if let Some((_, declared)) = spec.tags.iter().find(|(ns, _)| *ns == tag) {
			if !declared.is_empty() {
				exact.insert(declared, idx);
			}
		} else {
			exact.entry(spec.name).or_insert(idx);
			folded.entry(spec.name.to_lowercase()).or_insert(idx);
		}
	}

	keys.iter()
		.map(|key| {
			exact.get(key.as_str())
				.copied()
				.or_else(|| folded.get(&key.to_lowercase()).copied())
		})
		.collect()
}
