//! Field selection policy and member compatibility

mod common;

use common::*;
use rstest::rstest;
use stowage_codec::{GraphCodec, ObjectSerializerExt, TreeCodec, WireFormat};
use stowage_core::{FieldSelectionPolicy, Typed};

fn window() -> Typed<Window> {
	Typed::new(Window {
		start: 10,
		end: 25,
		revision: 7,
		label: Some("peak".to_string()),
	})
}

fn json_payload(bytes: &[u8]) -> &str {
	std::str::from_utf8(&bytes[7..]).unwrap()
}

#[rstest]
fn test_default_policy_writes_read_write_members_only() {
	let codec = graph(WireFormat::Json);
	let bytes = codec.serialize(&window()).unwrap();
	let payload = json_payload(&bytes);

	assert!(payload.contains("\"start\""));
	assert!(payload.contains("\"label\""));
	assert!(!payload.contains("\"revision\""));
	assert!(!payload.contains("\"length\""));

	let restored: Typed<Window> = codec.deserialize(&bytes).unwrap();
	let guard = restored.read();
	assert_eq!((guard.start, guard.end), (10, 25));
	assert_eq!(guard.label.as_deref(), Some("peak"));
	assert_eq!(guard.revision, 0);
}

#[rstest]
fn test_read_only_members_are_written_but_never_assigned() {
	let codec = GraphCodec::new(registry())
		.with_format(WireFormat::Json)
		.with_policy(FieldSelectionPolicy::new(false));
	let bytes = codec.serialize(&window()).unwrap();
	let payload = json_payload(&bytes);

	assert!(payload.contains("\"revision\""));
	assert!(payload.contains("\"length\""));

	let restored: Typed<Window> = codec.deserialize(&bytes).unwrap();
	assert_eq!(restored.read().revision, 0);
	assert_eq!(restored.read().length(), 15);
}

#[rstest]
fn test_inline_records_round_trip_with_all_members() {
	let codec = TreeCodec::new(registry())
		.with_format(WireFormat::Json)
		.with_policy(FieldSelectionPolicy::new(false));
	let job = Typed::new(Job::default());

	let bytes = codec.serialize(&job).unwrap();
	let payload = json_payload(&bytes);
	assert!(payload.contains("\"backoff_ms\""));

	let restored: Typed<Job> = codec.deserialize(&bytes).unwrap();
	assert_eq!(*restored.read(), Job::default());
}

#[rstest]
fn test_unknown_members_are_ignored() {
	let codec = graph(WireFormat::Json);
	let mut bytes = header(1, 2);
	bytes.extend_from_slice(
		br#"{"root":0,"nodes":[{"id":0,"type":"test.Window","fields":[
			{"name":"start","value":{"Unsigned":1}},
			{"name":"retired_field","value":{"Boolean":true}},
			{"name":"revision","value":{"Unsigned":99}}
		]}]}"#,
	);

	let restored: Typed<Window> = codec.deserialize(&bytes).unwrap();
	let guard = restored.read();
	assert_eq!(guard.start, 1);
	assert_eq!(guard.end, 0);
	assert_eq!(guard.revision, 0);
}

#[rstest]
fn test_missing_members_keep_defaults() {
	let codec = graph(WireFormat::Json);
	let mut bytes = header(1, 2);
	bytes.extend_from_slice(br#"{"root":0,"nodes":[{"id":0,"type":"test.Window","fields":[]}]}"#);

	let restored: Typed<Window> = codec.deserialize(&bytes).unwrap();
	assert!(restored.read().label.is_none());
}
