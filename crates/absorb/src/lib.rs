// Copyright (c) 2025 absorb contributors
// This file is licensed under the MIT, see license.md file

//! Binds rows of loosely-typed column values into strongly-typed
//! destinations.
//!
//! A producer (a parsed text table, a query cursor, any row source)
//! implements [`Absorbable`] and drives an [`Absorber`] through
//! `open` → many `absorb` → `close`, declaring its column keys once and
//! pushing one row of [`Value`]s per element. The engine classifies the
//! destination once, resolves a cached binding plan mapping keys to fields,
//! and converts each value into its destination slot.
//!
//! ```
//! use absorb::{Absorbable, Absorber, Error, row};
//!
//! struct Counter(i64);
//!
//! impl Absorbable for Counter {
//! 	fn emit(&mut self, into: &mut dyn Absorber) -> Result<(), Error> {
//! 		into.open("", Some(self.0 as usize), &["n"])?;
//! 		for n in 1..=self.0 {
//! 			into.absorb(row![n])?;
//! 		}
//! 		Ok(())
//! 	}
//! }
//!
//! let mut out: Vec<i64> = Vec::new();
//! absorb::absorb(&mut out, &mut Counter(3)).unwrap();
//! assert_eq!(out, vec![1, 2, 3]);
//! ```

pub mod element;
pub mod error;
pub mod plan;
pub mod registry;
pub mod session;
pub mod value;

pub use element::{Element, ElementKind, FieldSpec, bind_mapping, bind_record, bind_scalar};
pub use error::{Error, Fault};
pub use plan::Plan;
pub use registry::Registry;
pub use session::{Absorbable, Absorber, Dest, Destination, Session};
pub use value::{Blob, FromValue, Type, Value};

#[cfg(feature = "derive")]
pub use absorb_derive::Element;

/// Absorbs every row `source` emits into `dest`.
///
/// Equivalent to constructing a [`Session`] for `dest` and calling
/// `source.emit(...)`; the session is closed on every exit path and the
/// producer's reported error is returned verbatim.
pub fn absorb<'a, D: Destination<'a>>(dest: D, source: &mut (impl Absorbable + ?Sized)) -> Result<(), Error> {
	absorb_with(Registry::global(), dest, source)
}

/// Like [`absorb`] but resolves binding plans through an explicit
/// registry instead of the process-wide one.
pub fn absorb_with<'a, D: Destination<'a>>(
	registry: &'a Registry,
	dest: D,
	source: &mut (impl Absorbable + ?Sized),
) -> Result<(), Error> {
	let mut session = Session::with_registry(dest, registry);
	let result = source.emit(&mut session);
	session.close();
	result
}
