//! Shared fixtures for codec integration tests
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use stowage_codec::{GraphCodec, ObjectSerializer, TreeCodec, WireFormat};
use stowage_core::{ObjectRef, TypeRegistry, WeakRef};
use stowage_macros::Reflectable;

/// Object holding a reference to itself
#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "test.Named")]
pub struct Named {
	pub name: String,
	#[reflect(rename = "self")]
	pub this: Option<ObjectRef>,
}

#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "test.Person")]
pub struct Person {
	pub name: String,
	pub friends: Vec<ObjectRef>,
	pub best_friend: Option<ObjectRef>,
	pub parent: WeakRef,
}

#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "test.Dog")]
pub struct Dog {
	pub name: String,
	pub good: bool,
}

#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "test.Cat")]
pub struct Cat {
	pub name: String,
	pub lives: u8,
}

/// Holds pets through type-erased handles
#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "test.Owner")]
pub struct Owner {
	pub pets: Vec<ObjectRef>,
	pub favourite: Option<ObjectRef>,
}

#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "test.Link")]
pub struct Link {
	pub index: u32,
	pub next: Option<ObjectRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Reflectable)]
#[reflect(type_name = "test.Retry")]
pub struct RetryPolicy {
	pub attempts: u8,
	pub backoff_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Reflectable)]
#[reflect(type_name = "test.Job")]
pub struct Job {
	pub name: String,
	pub retry: RetryPolicy,
	pub tags: BTreeMap<String, String>,
	pub ratio: f64,
	pub offset: i64,
	pub created: Option<DateTime<Utc>>,
	pub fallback: Option<Box<RetryPolicy>>,
}

#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "test.Window", computed = "length")]
pub struct Window {
	pub start: u32,
	pub end: u32,
	#[reflect(readonly)]
	pub revision: u32,
	pub label: Option<String>,
}

impl Window {
	pub fn length(&self) -> u32 {
		self.end.saturating_sub(self.start)
	}
}

/// Never registered with [`registry`]
#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "test.Stray")]
pub struct Stray {
	pub id: u32,
}

pub fn registry() -> Arc<TypeRegistry> {
	Arc::new(
		TypeRegistry::new()
			.with::<Named>()
			.with::<Person>()
			.with::<Dog>()
			.with::<Cat>()
			.with::<Owner>()
			.with::<Link>()
			.with::<Job>()
			.with::<Window>(),
	)
}

pub fn graph(format: WireFormat) -> GraphCodec {
	GraphCodec::new(registry()).with_format(format)
}

pub fn tree(format: WireFormat) -> TreeCodec {
	TreeCodec::new(registry()).with_format(format)
}

pub fn serializers() -> Vec<Arc<dyn ObjectSerializer>> {
	vec![
		Arc::new(graph(WireFormat::MessagePack)),
		Arc::new(graph(WireFormat::Json)),
		Arc::new(tree(WireFormat::MessagePack)),
		Arc::new(tree(WireFormat::Json)),
	]
}

/// Singly linked chain `0 -> 1 -> ... -> len - 1`
pub fn chain(len: u32) -> ObjectRef {
	let mut head = None;
	for index in (0..len).rev() {
		head = Some(ObjectRef::new(Link { index, next: head }));
	}
	head.expect("chain must not be empty")
}

/// Take a chain apart front to back so that dropping it does not recurse.
pub fn unlink_chain(head: ObjectRef) {
	let mut current = Some(head);
	while let Some(node) = current {
		current = node
			.downcast::<Link>()
			.and_then(|link| link.write().next.take());
	}
}

/// Envelope header for hand-written documents
pub fn header(strategy: u8, format: u8) -> Vec<u8> {
	let mut bytes = b"STWG".to_vec();
	bytes.extend_from_slice(&[1, strategy, format]);
	bytes
}
