//! Persisting scheduler state through a blob store

use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::RwLock;
use rstest::{fixture, rstest};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use stowage::prelude::*;
use stowage::{RootRef, StrategyKind, WireFormat};
use thiserror::Error;

#[derive(Debug, Error)]
enum StoreError {
	#[error("No blob stored under key '{0}'")]
	NotFound(String),
	#[error(transparent)]
	Codec(#[from] CodecError),
}

#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "scheduler.JobDetail")]
struct JobDetail {
	key: String,
	description: Option<String>,
	durable: bool,
	data: BTreeMap<String, FieldValue>,
}

#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "scheduler.EmailPayload")]
struct EmailPayload {
	to: Vec<String>,
	subject: String,
}

#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "scheduler.HolidayCalendar")]
struct HolidayCalendar {
	name: String,
	excluded: Vec<DateTime<Utc>>,
}

#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "scheduler.SimpleTrigger", computed = "remaining")]
struct SimpleTrigger {
	key: String,
	job: Option<Typed<JobDetail>>,
	calendar: Option<ObjectRef>,
	start: Option<DateTime<Utc>>,
	interval_secs: u64,
	repeat_count: u32,
	#[reflect(readonly)]
	times_fired: u32,
}

impl SimpleTrigger {
	fn remaining(&self) -> u32 {
		self.repeat_count.saturating_sub(self.times_fired)
	}
}

#[derive(Debug, Default, Reflectable)]
#[reflect(type_name = "scheduler.Snapshot")]
struct SchedulerSnapshot {
	triggers: Vec<ObjectRef>,
	paused: bool,
}

/// Keyed byte blobs, standing in for a database table
struct BlobStore {
	serializer: Arc<dyn ObjectSerializer>,
	blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl BlobStore {
	fn new(settings: &SerializerSettings) -> Result<Self, StoreError> {
		Ok(Self {
			serializer: settings.build(Arc::new(TypeRegistry::discovered()))?,
			blobs: RwLock::new(HashMap::new()),
		})
	}

	fn store<T: RootRef>(&self, key: &str, value: &T) -> Result<usize, StoreError> {
		let bytes = self.serializer.serialize(value)?;
		let len = bytes.len();
		self.blobs.write().insert(key.to_string(), bytes);
		Ok(len)
	}

	fn load<T: RootRef>(&self, key: &str) -> Result<T, StoreError> {
		let blobs = self.blobs.read();
		let bytes = blobs
			.get(key)
			.ok_or_else(|| StoreError::NotFound(key.to_string()))?;
		Ok(self.serializer.deserialize(bytes)?)
	}

	fn truncate(&self, key: &str) {
		if let Some(bytes) = self.blobs.write().get_mut(key) {
			let half = bytes.len() / 2;
			bytes.truncate(half);
		}
	}
}

fn start_time() -> DateTime<Utc> {
	Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap()
}

#[fixture]
fn snapshot() -> Typed<SchedulerSnapshot> {
	let payload = ObjectRef::new(EmailPayload {
		to: vec!["ops@example.com".to_string()],
		subject: "Weekly report".to_string(),
	});
	let mut data = BTreeMap::new();
	data.insert("payload".to_string(), FieldValue::Reference(payload));
	data.insert("attempt".to_string(), FieldValue::Integer(1));
	data.insert("dry_run".to_string(), FieldValue::Boolean(false));

	let job = Typed::new(JobDetail {
		key: "reports.weekly".to_string(),
		description: Some("Mail the weekly report".to_string()),
		durable: true,
		data,
	});
	let calendar = ObjectRef::new(HolidayCalendar {
		name: "public-holidays".to_string(),
		excluded: vec![start_time() + Duration::days(1)],
	});

	let triggers = (0..2)
		.map(|i| {
			ObjectRef::new(SimpleTrigger {
				key: format!("reports.weekly.{}", i),
				job: Some(job.clone()),
				calendar: Some(calendar.clone()),
				start: Some(start_time() + Duration::hours(i)),
				interval_secs: 604_800,
				repeat_count: 10,
				times_fired: 4,
			})
		})
		.collect();

	Typed::new(SchedulerSnapshot {
		triggers,
		paused: false,
	})
}

fn trigger(snapshot: &Typed<SchedulerSnapshot>, index: usize) -> Typed<SimpleTrigger> {
	snapshot.read().triggers[index]
		.downcast::<SimpleTrigger>()
		.unwrap()
}

#[rstest]
fn test_snapshot_round_trip(
	snapshot: Typed<SchedulerSnapshot>,
	#[values(WireFormat::MessagePack, WireFormat::Json)] format: WireFormat,
) {
	let store = BlobStore::new(&SerializerSettings {
		format,
		..Default::default()
	})
	.unwrap();

	store.store("scheduler", &snapshot).unwrap();
	let restored: Typed<SchedulerSnapshot> = store.load("scheduler").unwrap();

	let first = trigger(&restored, 0);
	let second = trigger(&restored, 1);
	let first = first.read();
	let second = second.read();

	assert_eq!(first.key, "reports.weekly.0");
	assert_eq!(second.start, Some(start_time() + Duration::hours(1)));
	assert!(first.job.as_ref().unwrap().ptr_eq(second.job.as_ref().unwrap()));
	assert!(
		first
			.calendar
			.as_ref()
			.unwrap()
			.ptr_eq(second.calendar.as_ref().unwrap())
	);

	// Read-only members are not written and start from their default.
	assert_eq!(first.times_fired, 0);
	assert_eq!(first.remaining(), 10);

	let job = first.job.as_ref().unwrap().read();
	assert_eq!(job.description.as_deref(), Some("Mail the weekly report"));
	assert_eq!(job.data.get("attempt"), Some(&FieldValue::Integer(1)));
	let payload = job.data["payload"]
		.as_reference()
		.unwrap()
		.downcast::<EmailPayload>()
		.unwrap();
	assert_eq!(payload.read().to, ["ops@example.com"]);

	let calendar = first
		.calendar
		.as_ref()
		.unwrap()
		.downcast::<HolidayCalendar>()
		.unwrap();
	assert_eq!(calendar.read().excluded, [start_time() + Duration::days(1)]);
}

#[rstest]
fn test_tree_strategy_from_configuration(snapshot: Typed<SchedulerSnapshot>) {
	let settings = SerializerSettings::from_toml_str(
		r#"
		strategy = "tree"
		format = "json"
		"#,
	)
	.unwrap();
	let store = BlobStore::new(&settings).unwrap();
	assert_eq!(store.serializer.strategy(), StrategyKind::Tree);

	store.store("scheduler", &snapshot).unwrap();
	let restored: Typed<SchedulerSnapshot> = store.load("scheduler").unwrap();

	let first = trigger(&restored, 0);
	let second = trigger(&restored, 1);
	assert!(
		!first
			.read()
			.job
			.as_ref()
			.unwrap()
			.ptr_eq(second.read().job.as_ref().unwrap())
	);
	assert_eq!(
		first.read().job.as_ref().unwrap().read().key,
		second.read().job.as_ref().unwrap().read().key
	);
}

#[rstest]
fn test_missing_blob() {
	let store = BlobStore::new(&SerializerSettings::default()).unwrap();
	let err = store.load::<Typed<JobDetail>>("nothing").unwrap_err();
	assert!(matches!(err, StoreError::NotFound(ref key) if key == "nothing"));
}

#[rstest]
fn test_truncated_blob_is_reported(snapshot: Typed<SchedulerSnapshot>) {
	let store = BlobStore::new(&SerializerSettings::default()).unwrap();
	store.store("scheduler", &snapshot).unwrap();
	store.truncate("scheduler");

	let err = store.load::<Typed<SchedulerSnapshot>>("scheduler").unwrap_err();
	assert!(matches!(
		err,
		StoreError::Codec(CodecError::MalformedData { .. })
	));
}

#[rstest]
fn test_loading_as_wrong_type(snapshot: Typed<SchedulerSnapshot>) {
	let store = BlobStore::new(&SerializerSettings::default()).unwrap();
	store.store("scheduler", &snapshot).unwrap();

	let err = store.load::<Typed<JobDetail>>("scheduler").unwrap_err();
	assert!(matches!(
		err,
		StoreError::Codec(CodecError::TypeMismatch { .. })
	));
}

#[rstest]
fn test_storing_nothing_is_rejected() {
	let store = BlobStore::new(&SerializerSettings::default()).unwrap();
	let err = store.store("empty", &None::<ObjectRef>).unwrap_err();
	assert!(matches!(
		err,
		StoreError::Codec(CodecError::InvalidArgument { .. })
	));
}
