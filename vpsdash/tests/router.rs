//! Frame decoding and dispatch.
use vpsdash::router::{decode, dispatch, FrameConsumer};
use vpsdash::types::Snapshot;

#[derive(Default)]
struct Recorder {
    snapshots: Vec<Snapshot>,
    ready: Vec<bool>,
}

impl FrameConsumer for Recorder {
    fn on_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    fn on_scan_ready(&mut self, ready: bool) {
        self.ready.push(ready);
    }
}

#[test]
fn malformed_frames_are_dropped() {
    let mut rec = Recorder::default();
    assert!(!dispatch("not json", &mut rec));
    assert!(!dispatch(r#"{"snapshot": 5}"#, &mut rec));
    assert!(!dispatch("", &mut rec));
    assert!(rec.snapshots.is_empty() && rec.ready.is_empty());
}

#[test]
fn heartbeat_dispatches_nothing() {
    let mut rec = Recorder::default();
    assert!(dispatch("{}", &mut rec));
    assert!(rec.snapshots.is_empty() && rec.ready.is_empty());
}

#[test]
fn both_fields_dispatch_independently() {
    let mut rec = Recorder::default();
    let frame = r#"{"type":"metrics","snapshot":{"cpu":{"total_percent":12.5}},"ncdu_ready":false}"#;
    assert!(dispatch(frame, &mut rec));
    assert_eq!(rec.snapshots.len(), 1);
    assert_eq!(rec.snapshots[0].cpu.total_percent, 12.5);
    assert_eq!(rec.ready, vec![false]);
}

#[test]
fn untyped_frames_carry_snapshots() {
    let mut rec = Recorder::default();
    assert!(dispatch(r#"{"snapshot":{},"ncdu_ready":true}"#, &mut rec));
    assert_eq!(rec.snapshots.len(), 1);
    assert_eq!(rec.ready, vec![true]);
}

#[test]
fn foreign_frame_types_do_not_feed_snapshots() {
    let mut rec = Recorder::default();
    assert!(dispatch(r#"{"type":"alert","snapshot":{},"ncdu_ready":true}"#, &mut rec));
    assert!(rec.snapshots.is_empty());
    assert_eq!(rec.ready, vec![true]);
}

#[test]
fn decode_reads_full_snapshot() {
    let frame = decode(
        r#"{"type":"metrics","snapshot":{
            "timestamp":"2024-05-01T12:00:00Z",
            "cpu":{"total_percent":5,"per_core":[1,9],"core_count":2,"model_name":"EPYC","freq_mhz":2900},
            "memory":{"percent":40,"used_bytes":4,"total_bytes":10,"free_bytes":6,"cached":1,"buffers":1},
            "swap":{"percent":0,"used_bytes":0,"total_bytes":0,"free_bytes":0},
            "disks":[{"mountpoint":"/","device":"vda1","fstype":"ext4","total_bytes":10,"used_bytes":5,"free_bytes":5,"percent":50}],
            "disk_io":[{"device":"vda","read_bps":1,"write_bps":2,"read_ops":3,"write_ops":4}],
            "network":[{"interface":"eth0","recv_bps":7,"sent_bps":8,"total_recv":70,"total_sent":80}]
        },"ncdu_ready":false}"#,
    )
    .expect("valid frame");
    let snap = frame.snapshot.expect("snapshot");
    assert_eq!(frame.kind.as_deref(), Some("metrics"));
    assert_eq!(snap.cpu.per_core, vec![1.0, 9.0]);
    assert_eq!(snap.cpu.model_name, "EPYC");
    assert_eq!(snap.disks[0].fstype, "ext4");
    assert_eq!(snap.net_totals(), (7.0, 8.0));
    assert_eq!(snap.disk_io_totals(), (1.0, 2.0));
    assert!(snap.timestamp.is_some());
}

#[test]
fn fractional_disk_op_rates_decode() {
    let mut rec = Recorder::default();
    let frame = r#"{"type":"metrics","snapshot":{"disk_io":[
        {"device":"sda","read_bps":1.0,"write_bps":2.0,"read_ops":12.5,"write_ops":0.5}
    ]},"ncdu_ready":true}"#;
    assert!(dispatch(frame, &mut rec));
    assert_eq!(rec.snapshots.len(), 1);
    assert_eq!(rec.snapshots[0].disk_io[0].read_ops, 12.5);
    assert_eq!(rec.snapshots[0].disk_io[0].write_ops, 0.5);
    assert_eq!(rec.ready, vec![true]);
}

#[test]
fn null_lists_decode_as_empty() {
    let mut rec = Recorder::default();
    let frame = r#"{"snapshot":{
        "timestamp":"0001-01-01T00:00:00Z",
        "cpu":{"total_percent":5.0,"per_core":null},
        "disks":null,"disk_io":null,"network":null
    },"ncdu_ready":true}"#;
    assert!(dispatch(frame, &mut rec));
    let snap = &rec.snapshots[0];
    assert_eq!(snap.cpu.total_percent, 5.0);
    assert!(snap.cpu.per_core.is_empty());
    assert!(snap.disks.is_empty() && snap.disk_io.is_empty() && snap.network.is_empty());
    assert_eq!(snap.net_totals(), (0.0, 0.0));
    assert_eq!(rec.ready, vec![true]);
}

#[test]
fn null_children_decode_as_leaf() {
    let entry: vpsdash::types::DirEntry =
        serde_json::from_str(r#"{"name":"log","asize":10,"dsize":12,"is_dir":true,"children":null}"#)
            .expect("dir entry");
    assert!(entry.children.is_empty());
    assert_eq!(entry.dsize, 12);
}
