// Copyright (c) 2025 absorb contributors
// This file is licensed under the MIT, see license.md file

use std::{any::TypeId, sync::Arc};

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::{element::Element, plan::Plan};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PlanKey {
	element: TypeId,
	compound: String,
}

/// Process-wide cache of compiled binding plans.
///
/// Keyed by `(element type, tag namespace, key sequence)`. Read-mostly and
/// append-only: plans are never invalidated, and the key space is bounded
/// by the program's compiled types. Racing first-writers may each build a
/// candidate plan, but store-if-absent keeps exactly one canonical copy;
/// plan construction is pure, so the redundant work is harmless.
#[derive(Debug, Default)]
pub struct Registry {
	plans: DashMap<PlanKey, Arc<Plan>>,
}

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

impl Registry {
	pub fn new() -> Self {
		Self {
			plans: DashMap::new(),
		}
	}

	/// The default process-wide registry. Tests that need isolation can
	/// construct their own and pass it explicitly.
	pub fn global() -> &'static Registry {
		&GLOBAL
	}

	/// Returns the cached plan for `(T, tag, keys)`, building it on first
	/// request.
	pub fn plan<T: Element>(&self, tag: &str, keys: &[String]) -> Arc<Plan> {
		let key = PlanKey {
			element: TypeId::of::<T>(),
			compound: format!("{}:{}", tag, keys.join("+")),
		};
		if let Some(plan) = self.plans.get(&key) {
			return plan.clone();
		}
		let built = Arc::new(Plan::resolve::<T>(tag, keys));
		debug!(element = std::any::type_name::<T>(), compound = %key.compound, "built binding plan");
		self.plans.entry(key).or_insert(built).value().clone()
	}

	pub fn len(&self) -> usize {
		self.plans.len()
	}

	pub fn is_empty(&self) -> bool {
		self.plans.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn keys(names: &[&str]) -> Vec<String> {
		names.iter().map(|k| k.to_string()).collect()
	}

	#[test]
	fn test_plan_is_cached() {
		let registry = Registry::new();
		let first = registry.plan::<i64>("t", &keys(&["n"]));
		let second = registry.plan::<i64>("t", &keys(&["n"]));
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_distinct_key_sequences_get_distinct_plans() {
		let registry = Registry::new();
		let a = registry.plan::<i64>("t", &keys(&["a"]));
		let b = registry.plan::<i64>("t", &keys(&["b"]));
		assert!(!Arc::ptr_eq(&a, &b));
		assert_eq!(registry.len(), 2);
	}

	#[test]
	fn test_tag_namespace_separates_plans() {
		let registry = Registry::new();
		let a = registry.plan::<i64>("csv", &keys(&["n"]));
		let b = registry.plan::<i64>("sql", &keys(&["n"]));
		assert!(!Arc::ptr_eq(&a, &b));
	}

	#[test]
	fn test_element_type_separates_plans() {
		let registry = Registry::new();
		registry.plan::<i64>("t", &keys(&["n"]));
		registry.plan::<String>("t", &keys(&["n"]));
		assert_eq!(registry.len(), 2);
	}

	#[test]
	fn test_concurrent_first_writers_converge() {
		let registry = Arc::new(Registry::new());
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let registry = registry.clone();
				std::thread::spawn(move || registry.plan::<i64>("t", &keys(&["n"])))
			})
			.collect();
		let plans: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
		assert_eq!(registry.len(), 1);
		for plan in &plans[1..] {
			assert!(Arc::ptr_eq(&plans[0], plan));
		}
	}
}
