// Copyright (c) 2025 absorb contributors
// This file is licensed under the MIT, see license.md file

//! End-to-end tests driving the engine through the producer contract.

use std::collections::HashMap;

use absorb::{Absorbable, Absorber, Blob, Element, Error, Registry, Value, row};

/// A row source with a fixed tag, key sequence, and prepared rows.
struct Rows {
	tag: &'static str,
	keys: &'static [&'static str],
	count: Option<usize>,
	rows: Vec<Vec<Value>>,
}

impl Rows {
	fn new(tag: &'static str, keys: &'static [&'static str], rows: Vec<Vec<Value>>) -> Self {
		Self {
			tag,
			keys,
			count: None,
			rows,
		}
	}
}

impl Absorbable for Rows {
	fn emit(&mut self, into: &mut dyn Absorber) -> Result<(), Error> {
		into.open(self.tag, self.count, self.keys)?;
		for row in self.rows.drain(..) {
			into.absorb(row)?;
		}
		Ok(())
	}
}

/// A CSV-like text table: first line declares the keys, every other line
/// is one row of text values. The thin external collaborator of the
/// producer contract.
struct TextTable {
	text: &'static str,
}

impl Absorbable for TextTable {
	fn emit(&mut self, into: &mut dyn Absorber) -> Result<(), Error> {
		let mut lines = self.text.lines();
		let Some(header) = lines.next() else {
			return Ok(());
		};
		let keys: Vec<&str> = header.split(',').collect();
		into.open("table", None, &keys)?;
		for line in lines {
			into.absorb(line.split(',').map(Value::from).collect())?;
		}
		Ok(())
	}
}

const PEOPLE: &str = "First,Last,Last-Seen\n\
	Ada,Lovelace,London\n\
	Alan,Turing,Bletchley\n\
	Grace,Hopper,Arlington\n\
	Edsger,Dijkstra,Austin\n\
	Barbara,Liskov,Cambridge";

#[derive(Element, Clone, Debug, Default, PartialEq)]
struct Person {
	first: String,
	last: String,
	#[absorb(table = "Last-Seen")]
	location: String,
}

// ============================================================================
// Records
// ============================================================================

#[test]
fn test_round_trip_single_record() {
	#[derive(Element, Debug, Default, PartialEq)]
	struct Named {
		name: String,
		#[absorb(t = "Aliased")]
		actual: i64,
	}

	let mut src = Rows::new("t", &["Name", "Aliased"], vec![row!["x", 7i64]]);
	let mut out = Named::default();
	absorb::absorb(&mut out, &mut src).unwrap();
	assert_eq!(out, Named {
		name: "x".to_string(),
		actual: 7
	});
}

#[test]
fn test_record_sequence_from_text_table() {
	let mut out: Vec<Person> = Vec::new();
	absorb::absorb(&mut out, &mut TextTable { text: PEOPLE }).unwrap();

	assert_eq!(out.len(), 5);
	assert_eq!(out[0], Person {
		first: "Ada".to_string(),
		last: "Lovelace".to_string(),
		location: "London".to_string()
	});
	assert_eq!(out[4].location, "Cambridge");
}

#[test]
fn test_unmatched_keys_are_ignored() {
	#[derive(Element, Debug, Default, PartialEq)]
	struct Narrow {
		first: String,
	}

	let mut out: Vec<Narrow> = Vec::new();
	absorb::absorb(&mut out, &mut TextTable { text: PEOPLE }).unwrap();
	assert_eq!(out.len(), 5);
	assert_eq!(out[1].first, "Alan");
}

#[test]
fn test_undefined_value_keeps_field_default() {
	let mut src = Rows::new(
		"",
		&["first", "last"],
		vec![row!["Ada", None::<String>]],
	);
	let mut out = Person::default();
	absorb::absorb(&mut out, &mut src).unwrap();
	assert_eq!(out.first, "Ada");
	assert_eq!(out.last, "");
}

// ============================================================================
// Scalars and sequences
// ============================================================================

#[test]
fn test_scalar_sequence_with_count_hint() {
	let mut src = Rows::new("", &["n"], vec![row![34i64], row![55i64], row![22i64], row![1i64]]);
	src.count = Some(4);
	let mut out: Vec<i64> = Vec::new();
	absorb::absorb(&mut out, &mut src).unwrap();
	assert_eq!(out, vec![34, 55, 22, 1]);
}

#[test]
fn test_empty_source_yields_empty_sequence() {
	let mut src = Rows::new("", &["n"], Vec::new());
	let mut out: Vec<i64> = Vec::new();
	absorb::absorb(&mut out, &mut src).unwrap();
	assert!(out.is_empty());
}

#[test]
fn test_numeric_widening_across_rows() {
	let mut src = Rows::new("", &["n"], vec![row![7i32], row![9u8]]);
	let mut out: Vec<i64> = Vec::new();
	absorb::absorb(&mut out, &mut src).unwrap();
	assert_eq!(out, vec![7, 9]);
}

#[test]
fn test_pointer_destination_allocates() {
	let mut src = Rows::new("", &["n"], vec![row![42i64]]);
	let mut out: Option<i64> = None;
	absorb::absorb(&mut out, &mut src).unwrap();
	assert_eq!(out, Some(42));
}

#[test]
fn test_blob_destination_is_one_opaque_value() {
	let mut src = Rows::new("", &["data"], vec![row![vec![1u8, 2, 3]]]);
	let mut out = Blob::empty();
	absorb::absorb(&mut out, &mut src).unwrap();
	assert_eq!(out.as_bytes(), &[1, 2, 3]);
}

#[test]
fn test_byte_sequence_is_one_row_per_byte() {
	let mut src = Rows::new("", &["b"], vec![row![1u8], row![2u8]]);
	let mut out: Vec<u8> = Vec::new();
	absorb::absorb(&mut out, &mut src).unwrap();
	assert_eq!(out, vec![1, 2]);
}

// ============================================================================
// Mappings
// ============================================================================

#[test]
fn test_mapping_sequence_from_text_table() {
	let mut out: Vec<HashMap<String, String>> = Vec::new();
	absorb::absorb(&mut out, &mut TextTable { text: PEOPLE }).unwrap();

	assert_eq!(out.len(), 5);
	assert_eq!(out[0]["First"], "Ada");
	assert_eq!(out[0]["Last-Seen"], "London");
}

#[test]
fn test_null_omits_mapping_key() {
	let mut src = Rows::new(
		"",
		&["a", "b", "c"],
		vec![vec![Value::Int8(1), Value::Undefined, Value::Int8(3)]],
	);
	let mut out: HashMap<String, i64> = HashMap::new();
	absorb::absorb(&mut out, &mut src).unwrap();

	assert_eq!(out.get("a"), Some(&1));
	assert!(!out.contains_key("b"));
	assert_eq!(out.get("c"), Some(&3));
}

// ============================================================================
// Fault class
// ============================================================================

#[test]
fn test_fixed_capacity_overflow_at_absorb() {
	let mut src = Rows::new("", &["n"], vec![row![1i64], row![2i64], row![3i64]]);
	let mut out = [0i64; 2];
	let err = absorb::absorb(&mut out, &mut src).unwrap_err();
	assert!(err.is_fault());
}

#[test]
fn test_fixed_capacity_overflow_at_open() {
	let mut src = Rows::new("", &["n"], Vec::new());
	src.count = Some(3);
	let mut out = [0i64; 2];
	let err = absorb::absorb(&mut out, &mut src).unwrap_err();
	assert!(err.is_fault());
}

#[test]
fn test_second_element_into_single_destination() {
	let mut src = Rows::new("", &["n"], vec![row![1i64], row![2i64]]);
	let mut out = 0i64;
	let err = absorb::absorb(&mut out, &mut src).unwrap_err();
	assert!(err.is_fault());
	// The first element landed before the fault.
	assert_eq!(out, 1);
}

#[test]
fn test_unconvertible_value_is_fault() {
	let mut src = Rows::new("", &["n"], vec![row!["not a number"]]);
	let mut out: Vec<i64> = Vec::new();
	let err = absorb::absorb(&mut out, &mut src).unwrap_err();
	assert!(err.is_fault());
}

// ============================================================================
// Source error class
// ============================================================================

#[test]
fn test_source_error_passes_through_verbatim() {
	struct Failing;

	impl Absorbable for Failing {
		fn emit(&mut self, into: &mut dyn Absorber) -> Result<(), Error> {
			into.open("", None, &["n"])?;
			into.absorb(row![1i64])?;
			Err(Error::source(std::io::Error::new(
				std::io::ErrorKind::UnexpectedEof,
				"row torn mid-read",
			)))
		}
	}

	let mut out: Vec<i64> = Vec::new();
	let err = absorb::absorb(&mut out, &mut Failing).unwrap_err();
	assert!(!err.is_fault());
	match err {
		Error::Source(inner) => {
			let io = inner.downcast::<std::io::Error>().unwrap();
			assert_eq!(io.kind(), std::io::ErrorKind::UnexpectedEof);
		}
		other => panic!("expected source error, got {other:?}"),
	}
	// Rows absorbed before the failure are kept.
	assert_eq!(out, vec![1]);
}

// ============================================================================
// Handoff queue
// ============================================================================

#[test]
fn test_handoff_queue_delivers_in_emission_order() {
	// Rendezvous channel: every send suspends until the consumer is ready.
	let (tx, rx) = crossbeam_channel::bounded::<Person>(0);

	let producer = std::thread::spawn(move || {
		absorb::absorb(tx, &mut TextTable { text: PEOPLE }).unwrap();
	});

	// The iterator ends only once the producer finished and the session
	// dropped its sender.
	let received: Vec<Person> = rx.iter().collect();
	producer.join().unwrap();

	assert_eq!(received.len(), 5);
	assert_eq!(received[0].first, "Ada");
	assert_eq!(received[4].first, "Barbara");
}

// ============================================================================
// Registry injection
// ============================================================================

#[test]
fn test_isolated_registry() {
	let registry = Registry::new();
	assert!(registry.is_empty());

	let mut out: Vec<i64> = Vec::new();
	let mut src = Rows::new("", &["n"], vec![row![1i64]]);
	absorb::absorb_with(&registry, &mut out, &mut src).unwrap();
	assert_eq!(registry.len(), 1);

	// The same (type, tag, keys) triple reuses the cached plan.
	let mut src = Rows::new("", &["n"], vec![row![2i64]]);
	absorb::absorb_with(&registry, &mut out, &mut src).unwrap();
	assert_eq!(registry.len(), 1);
}
