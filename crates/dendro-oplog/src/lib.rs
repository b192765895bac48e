//! Operation records and the append-only log shared by dendro tree engines.
//!
//! Every structural step an engine performs is mirrored by a typed record:
//! rotations, recolorings, splits, height updates. The log is the single
//! medium for stepping through a tree's history. There is no rewind and no
//! snapshotting: to show the tree as of record N, replay a fresh engine
//! over the insertions anchored in the first N records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::slice;

/// Behavior every engine-specific operation kind implements.
///
/// A kind is a small copyable tag. Exactly one record per `insert` call
/// answers `is_insert_start`, which keeps log prefixes replayable even
/// for engines that accept duplicate keys.
pub trait OpKind: Copy + Eq + fmt::Debug {
    /// True for the single anchor record an insertion opens with.
    fn is_insert_start(&self) -> bool;

    /// Stable kebab-case tag, matching the serialized form.
    fn label(&self) -> &'static str;
}

/// One logged step.
///
/// `subject` is the key the step concerns: the inserted key, the rotation
/// pivot, the promoted separator. Records reference keys rather than
/// nodes, so a record stays meaningful after the tree has moved on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord<K, Op> {
    pub kind: Op,
    pub subject: Option<K>,
    pub description: String,
}

impl<K, Op> OperationRecord<K, Op> {
    pub fn new(kind: Op, subject: Option<K>, description: impl Into<String>) -> Self {
        Self {
            kind,
            subject,
            description: description.into(),
        }
    }
}

/// Keys of the insert-start anchors among the first `upto` records.
///
/// This is the replay filter: re-inserting these keys into a fresh engine
/// reproduces the tree as of record `upto`. `upto` past the end means the
/// whole history.
pub fn insert_keys<K: Copy, Op: OpKind>(records: &[OperationRecord<K, Op>], upto: usize) -> Vec<K> {
    let upto = upto.min(records.len());
    records[..upto]
        .iter()
        .filter(|r| r.kind.is_insert_start())
        .filter_map(|r| r.subject)
        .collect()
}

/// Append-only record sequence.
///
/// There is deliberately no way to remove or truncate records. A log
/// lives and dies with its engine; playback works on prefixes of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationLog<K, Op> {
    records: Vec<OperationRecord<K, Op>>,
}

impl<K, Op> Default for OperationLog<K, Op> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, Op> OperationLog<K, Op> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn as_slice(&self) -> &[OperationRecord<K, Op>] {
        &self.records
    }

    pub fn iter(&self) -> slice::Iter<'_, OperationRecord<K, Op>> {
        self.records.iter()
    }
}

impl<K: Copy, Op: OpKind> OperationLog<K, Op> {
    /// Append one record.
    pub fn record(&mut self, kind: Op, subject: Option<K>, description: impl Into<String>) {
        self.records.push(OperationRecord::new(kind, subject, description));
    }

    /// See [`insert_keys`].
    pub fn insert_keys(&self, upto: usize) -> Vec<K> {
        insert_keys(&self.records, upto)
    }
}

/// The seam every tree engine implements.
///
/// `fresh` must hand back an engine with the same configuration as `self`
/// (a B-Tree keeps its order) and an empty log.
pub trait TreeEngine: Sized {
    type Key: Copy;
    type Kind: OpKind;

    /// New empty engine configured like `self`.
    fn fresh(&self) -> Self;

    /// Insert one key, appending this step's records to the log.
    fn insert(&mut self, key: Self::Key);

    /// Everything logged so far, in order.
    fn operations(&self) -> &[OperationRecord<Self::Key, Self::Kind>];
}

/// Rebuild the tree as of record `step`.
///
/// Fresh engine, re-run every insertion whose anchor falls inside the
/// prefix. The replayed engine's log covers those insertions in full,
/// which is what a renderer wants when the user scrubs to mid-animation.
pub fn replay_prefix<E: TreeEngine>(engine: &E, step: usize) -> E {
    let mut fresh = engine.fresh();
    for key in insert_keys(engine.operations(), step) {
        fresh.insert(key);
    }
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    enum FakeOp {
        Start,
        Work,
    }

    impl OpKind for FakeOp {
        fn is_insert_start(&self) -> bool {
            matches!(self, FakeOp::Start)
        }

        fn label(&self) -> &'static str {
            match self {
                FakeOp::Start => "start",
                FakeOp::Work => "work",
            }
        }
    }

    /// Minimal engine: remembers inserted keys, logs one anchor plus one
    /// detail record per insert.
    struct Recorder {
        keys: Vec<i64>,
        log: OperationLog<i64, FakeOp>,
    }

    impl Recorder {
        fn new() -> Self {
            Self {
                keys: Vec::new(),
                log: OperationLog::new(),
            }
        }
    }

    impl TreeEngine for Recorder {
        type Key = i64;
        type Kind = FakeOp;

        fn fresh(&self) -> Self {
            Recorder::new()
        }

        fn insert(&mut self, key: i64) {
            self.log
                .record(FakeOp::Start, Some(key), format!("start {key}"));
            self.keys.push(key);
            self.log
                .record(FakeOp::Work, Some(key), format!("work {key}"));
        }

        fn operations(&self) -> &[OperationRecord<i64, FakeOp>] {
            self.log.as_slice()
        }
    }

    #[test]
    fn log_starts_empty() {
        let log: OperationLog<i64, FakeOp> = OperationLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.insert_keys(10).is_empty());
    }

    #[test]
    fn record_appends_in_order() {
        let mut log = OperationLog::new();
        log.record(FakeOp::Start, Some(1), "a");
        log.record(FakeOp::Work, None, "b");
        log.record(FakeOp::Start, Some(2), "c");

        let descriptions: Vec<&str> = log.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["a", "b", "c"]);
    }

    #[test]
    fn insert_keys_filters_anchors_within_prefix() {
        let mut log = OperationLog::new();
        log.record(FakeOp::Start, Some(1), "");
        log.record(FakeOp::Work, Some(1), "");
        log.record(FakeOp::Start, Some(2), "");
        log.record(FakeOp::Work, Some(2), "");

        assert_eq!(log.insert_keys(0), Vec::<i64>::new());
        assert_eq!(log.insert_keys(1), vec![1]);
        assert_eq!(log.insert_keys(2), vec![1]);
        assert_eq!(log.insert_keys(3), vec![1, 2]);
        assert_eq!(log.insert_keys(100), vec![1, 2]);
    }

    #[test]
    fn replay_prefix_reinserts_anchor_keys() {
        let mut engine = Recorder::new();
        engine.insert(5);
        engine.insert(3);
        engine.insert(8);

        // Each insert produced two records; the prefix covering the first
        // two inserts ends at record 4.
        let replayed = replay_prefix(&engine, 4);
        assert_eq!(replayed.keys, vec![5, 3]);

        let full = replay_prefix(&engine, engine.operations().len());
        assert_eq!(full.keys, vec![5, 3, 8]);
    }

    #[test]
    fn replay_prefix_past_end_replays_everything() {
        let mut engine = Recorder::new();
        engine.insert(1);
        engine.insert(2);

        let replayed = replay_prefix(&engine, usize::MAX);
        assert_eq!(replayed.keys, vec![1, 2]);
    }

    #[test]
    fn replay_prefix_zero_is_empty() {
        let mut engine = Recorder::new();
        engine.insert(1);

        let replayed = replay_prefix(&engine, 0);
        assert!(replayed.keys.is_empty());
        assert!(replayed.operations().is_empty());
    }

    #[test]
    fn record_serializes_with_kind_and_subject() {
        let record: OperationRecord<i64, FakeOp> =
            OperationRecord::new(FakeOp::Work, Some(7), "work 7");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["subject"], 7);
        assert_eq!(json["description"], "work 7");
    }
}
