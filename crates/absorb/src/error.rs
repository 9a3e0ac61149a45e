// Copyright (c) 2025 absorb contributors
// This file is licensed under the MIT, see license.md file

use crate::value::Type;

/// Programming-error class: caller/schema misuse detected by the engine.
///
/// A fault is never retried and never downgraded into a source error. It
/// indicates that the destination shape and the producer's emitted rows
/// disagree, which is a bug on one side of the contract.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Fault {
	#[error("absorb called before open")]
	NotOpen,

	#[error("absorb called on a closed session")]
	Closed,

	#[error("row carries {got} values, expected {expected}")]
	Arity { expected: usize, got: usize },

	#[error("cannot absorb {count} elements into fixed destination of capacity {capacity}")]
	Capacity { capacity: usize, count: usize },

	#[error("single-valued destination already holds an element")]
	SingleOverflow,

	#[error("cannot convert {from} into {target}")]
	Conversion { from: Type, target: &'static str },

	#[error("handoff queue disconnected before the element was received")]
	Disconnected,
}

impl Fault {
	pub(crate) fn conversion<T>(from: Type) -> Self {
		Fault::Conversion {
			from,
			target: std::any::type_name::<T>(),
		}
	}
}

/// The error returned to the caller of [`absorb`](crate::absorb).
///
/// Source errors pass through verbatim; faults stay distinguishable so a
/// schema mismatch is never mistaken for a transient retrieval failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("binding fault: {0}")]
	Fault(#[from] Fault),

	#[error(transparent)]
	Source(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
	/// Wraps a failure originating in the producer's own retrieval step.
	pub fn source(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
		Error::Source(err.into())
	}

	pub fn is_fault(&self) -> bool {
		matches!(self, Error::Fault(_))
	}
}
