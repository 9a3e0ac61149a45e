// Copyright (c) 2025 absorb contributors
// This file is licensed under the MIT, see license.md file

use std::{
	collections::{BTreeMap, HashMap},
	sync::Arc,
};

use crossbeam_channel::Sender;
use tracing::trace;

use crate::{
	element::{Element, ElementKind},
	error::{Error, Fault},
	plan::Plan,
	registry::Registry,
	value::{Blob, FromValue, Value},
};

/// Implemented by row sources (file readers, query cursors).
///
/// `emit` must open the absorber once with its tag namespace and ordered
/// key sequence, absorb one row per element, and return `Ok(())` on clean
/// exhaustion. Failures in the source's own retrieval step are returned as
/// [`Error::Source`] and pass through to the caller verbatim; the session
/// closes regardless of how `emit` returns.
pub trait Absorbable {
	fn emit(&mut self, into: &mut dyn Absorber) -> Result<(), Error>;
}

/// The consumer half of the handshake, implemented by [`Session`].
///
/// `count` is a pre-sizing hint (`None` if unknown); it is never
/// load-bearing for correctness. All three calls follow the protocol
/// `open` → many `absorb` → `close`; every returned fault is in the
/// programming-error class and indicates caller/schema misuse.
pub trait Absorber {
	fn open(&mut self, tag: &str, count: Option<usize>, keys: &[&str]) -> Result<(), Fault>;

	/// Binds one row and appends the resulting element to the
	/// destination. Blocks when the destination is a handoff queue and
	/// no consumer is ready.
	fn absorb(&mut self, row: Vec<Value>) -> Result<(), Fault>;

	fn close(&mut self);
}

enum DestKind<'a, T> {
	/// Write-once slot.
	Single(&'a mut T),
	/// Write-once slot allocated on first write.
	Pointer(&'a mut Option<T>),
	/// Growable, appended in emission order.
	Sequence(&'a mut Vec<T>),
	/// Fixed capacity, written at the element cursor.
	Fixed(&'a mut [T]),
	/// Concurrent handoff queue; sends block until received.
	Queue(Sender<T>),
}

/// A classified destination: the container shape is fixed here, once, and
/// every later absorb dispatches on it with a single match.
pub struct Dest<'a, T> {
	kind: DestKind<'a, T>,
}

impl<'a, T> Dest<'a, T> {
	pub fn single(slot: &'a mut T) -> Self {
		Self {
			kind: DestKind::Single(slot),
		}
	}

	pub fn pointer(slot: &'a mut Option<T>) -> Self {
		Self {
			kind: DestKind::Pointer(slot),
		}
	}

	pub fn sequence(vec: &'a mut Vec<T>) -> Self {
		Self {
			kind: DestKind::Sequence(vec),
		}
	}

	pub fn fixed(buf: &'a mut [T]) -> Self {
		Self {
			kind: DestKind::Fixed(buf),
		}
	}

	pub fn queue(sender: Sender<T>) -> Self {
		Self {
			kind: DestKind::Queue(sender),
		}
	}
}

/// Classifies a destination's outer shape into a [`Dest`].
///
/// Implemented for growable sequences, fixed-size buffers, optional slots,
/// handoff queue senders, keyed mappings, scalars, and (through
/// `#[derive(Element)]`) user record types.
pub trait Destination<'a> {
	type Elem: Element;

	fn into_dest(self) -> Dest<'a, Self::Elem>;
}

impl<'a, T: Element> Destination<'a> for &'a mut Vec<T> {
	type Elem = T;

	fn into_dest(self) -> Dest<'a, T> {
		Dest::sequence(self)
	}
}

impl<'a, T: Element> Destination<'a> for &'a mut [T] {
	type Elem = T;

	fn into_dest(self) -> Dest<'a, T> {
		Dest::fixed(self)
	}
}

impl<'a, T: Element, const N: usize> Destination<'a> for &'a mut [T; N] {
	type Elem = T;

	fn into_dest(self) -> Dest<'a, T> {
		Dest::fixed(self)
	}
}

impl<'a, T: Element> Destination<'a> for &'a mut Option<T> {
	type Elem = T;

	fn into_dest(self) -> Dest<'a, T> {
		Dest::pointer(self)
	}
}

impl<T: Element + Send> Destination<'static> for Sender<T> {
	type Elem = T;

	fn into_dest(self) -> Dest<'static, T> {
		Dest::queue(self)
	}
}

macro_rules! impl_single_destination {
	($($scalar:ty),+ $(,)?) => {
		$(
			impl<'a> Destination<'a> for &'a mut $scalar {
				type Elem = $scalar;

				fn into_dest(self) -> Dest<'a, $scalar> {
					Dest::single(self)
				}
			}
		)+
	};
}

impl_single_destination!(bool, i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64, String, Blob, Value);

impl<'a, V: FromValue + 'static> Destination<'a> for &'a mut HashMap<String, V> {
	type Elem = HashMap<String, V>;

	fn into_dest(self) -> Dest<'a, Self::Elem> {
		Dest::single(self)
	}
}

impl<'a, V: FromValue + 'static> Destination<'a> for &'a mut BTreeMap<String, V> {
	type Elem = BTreeMap<String, V>;

	fn into_dest(self) -> Dest<'a, Self::Elem> {
		Dest::single(self)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
	Unopened,
	Absorbing,
	Closed,
}

/// One binding session: open once per batch, absorb once per row, close.
///
/// A session is single-writer: one producer drives it sequentially.
/// Reusing a session is allowed; a fresh `open` resets the element cursor
/// and rebinds the plan. Dropping the session closes it, so the plan is
/// released even when a producer's row loop exits early.
pub struct Session<'a, T: Element> {
	dest: Dest<'a, T>,
	registry: &'a Registry,
	plan: Option<Arc<Plan>>,
	state: State,
	cursor: usize,
	arity: usize,
}

impl<'a, T: Element> Session<'a, T> {
	pub fn new(dest: impl Destination<'a, Elem = T>) -> Self {
		Self::with_registry(dest, Registry::global())
	}

	pub fn with_registry(dest: impl Destination<'a, Elem = T>, registry: &'a Registry) -> Self {
		Self {
			dest: dest.into_dest(),
			registry,
			plan: None,
			state: State::Unopened,
			cursor: 0,
			arity: 0,
		}
	}

	/// Elements accepted since the last `open`.
	pub fn absorbed(&self) -> usize {
		self.cursor
	}
}

impl<T: Element> Absorber for Session<'_, T> {
	fn open(&mut self, tag: &str, count: Option<usize>, keys: &[&str]) -> Result<(), Fault> {
		match &mut self.dest.kind {
			DestKind::Sequence(vec) => {
				vec.clear();
				if let Some(count) = count {
					vec.reserve(count);
				}
			}
			DestKind::Fixed(buf) => {
				if let Some(count) = count {
					if count > buf.len() {
						return Err(Fault::Capacity {
							capacity: buf.len(),
							count,
						});
					}
				}
			}
			DestKind::Single(_) | DestKind::Pointer(_) => {
				if let Some(count) = count {
					if count > 1 {
						return Err(Fault::Capacity {
							capacity: 1,
							count,
						});
					}
				}
			}
			DestKind::Queue(_) => {}
		}

		let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
		self.plan = Some(self.registry.plan::<T>(tag, &keys));
		self.arity = match T::kind() {
			ElementKind::Scalar => 1,
			ElementKind::Record | ElementKind::Mapping => keys.len(),
		};
		self.cursor = 0;
		self.state = State::Absorbing;
		trace!(tag, keys = keys.len(), "session opened");
		Ok(())
	}

	fn absorb(&mut self, row: Vec<Value>) -> Result<(), Fault> {
		match self.state {
			State::Unopened => return Err(Fault::NotOpen),
			State::Closed => return Err(Fault::Closed),
			State::Absorbing => {}
		}
		let plan = self.plan.as_ref().ok_or(Fault::NotOpen)?;

		// Mappings tolerate short rows (trailing keys absent); every
		// other element shape requires the exact declared arity.
		let mismatched = match T::kind() {
			ElementKind::Mapping => row.len() > self.arity,
			ElementKind::Scalar | ElementKind::Record => row.len() != self.arity,
		};
		if mismatched {
			return Err(Fault::Arity {
				expected: self.arity,
				got: row.len(),
			});
		}

		let element = T::build(plan, row)?;

		match &mut self.dest.kind {
			DestKind::Single(slot) => {
				if self.cursor > 0 {
					return Err(Fault::SingleOverflow);
				}
				**slot = element;
			}
			DestKind::Pointer(slot) => {
				if self.cursor > 0 {
					return Err(Fault::SingleOverflow);
				}
				**slot = Some(element);
			}
			DestKind::Sequence(vec) => vec.push(element),
			DestKind::Fixed(buf) => {
				if self.cursor >= buf.len() {
					return Err(Fault::Capacity {
						capacity: buf.len(),
						count: self.cursor + 1,
					});
				}
				buf[self.cursor] = element;
			}
			DestKind::Queue(sender) => sender.send(element).map_err(|_| Fault::Disconnected)?,
		}
		self.cursor += 1;
		Ok(())
	}

	fn close(&mut self) {
		if self.state != State::Closed {
			trace!(absorbed = self.cursor, "session closed");
		}
		self.plan = None;
		self.state = State::Closed;
	}
}

impl<T: Element> Drop for Session<'_, T> {
	fn drop(&mut self) {
		self.close();
	}
}
