use assetgrid_crdt::{ReplicatedSequence, Rga};
use assetgrid_types::UserId;

// ── Basics ───────────────────────────────────────────────────────

#[test]
fn new_rga_is_empty() {
    let rga: Rga<char> = Rga::new(UserId::new());
    assert!(rga.is_empty());
    assert_eq!(rga.len(), 0);
    assert_eq!(rga.to_vec(), Vec::<char>::new());
}

#[test]
fn replica_accessors() {
    let a = UserId::new();
    let mut rga: Rga<i32> = Rga::new(a);
    assert_eq!(rga.replica(), a);
    let b = UserId::new();
    rga.set_replica(b);
    assert_eq!(rga.replica(), b);
}

#[test]
fn insert_batch_at_front() {
    let mut rga = Rga::new(UserId::new());
    rga.insert(0, vec!['c']);
    rga.insert(0, vec!['a', 'b']);
    assert_eq!(rga.to_vec(), vec!['a', 'b', 'c']);
}

#[test]
fn insert_in_middle_keeps_batch_order() {
    let mut rga = Rga::new(UserId::new());
    rga.insert(0, vec!['a', 'd']);
    rga.insert(1, vec!['b', 'c']);
    assert_eq!(rga.to_vec(), vec!['a', 'b', 'c', 'd']);
}

#[test]
fn insert_beyond_end_appends() {
    let mut rga = Rga::new(UserId::new());
    rga.insert(0, vec![1, 2]);
    rga.insert(99, vec![3]);
    assert_eq!(rga.to_vec(), vec![1, 2, 3]);
}

#[test]
fn delete_range() {
    let mut rga = Rga::new(UserId::new());
    rga.insert(0, vec!['a', 'b', 'c', 'd']);
    rga.delete(1, 2);
    assert_eq!(rga.to_vec(), vec!['a', 'd']);
    assert_eq!(rga.len(), 2);
}

#[test]
fn delete_past_end_clamps() {
    let mut rga = Rga::new(UserId::new());
    rga.insert(0, vec![1, 2, 3]);
    rga.delete(2, 99);
    assert_eq!(rga.to_vec(), vec![1, 2]);
    rga.delete(99, 1);
    assert_eq!(rga.to_vec(), vec![1, 2]);
}

#[test]
fn insert_after_tombstone_anchors_visibly() {
    let mut rga = Rga::new(UserId::new());
    rga.insert(0, vec!['a', 'b', 'c']);
    rga.delete(1, 1);
    // Visible: a c. Insert between them.
    rga.insert(1, vec!['x']);
    assert_eq!(rga.to_vec(), vec!['a', 'x', 'c']);
}

// ── Merge ────────────────────────────────────────────────────────

#[test]
fn merge_adopts_remote_inserts() {
    let mut a = Rga::new(UserId::new());
    let mut b = Rga::new(UserId::new());
    a.insert(0, vec!["one"]);
    b.merge(&a);
    assert_eq!(b.to_vec(), vec!["one"]);
    b.insert(1, vec!["two"]);
    a.merge(&b);
    assert_eq!(a.to_vec(), vec!["one", "two"]);
}

#[test]
fn merge_is_idempotent() {
    let mut a = Rga::new(UserId::new());
    a.insert(0, vec![1, 2, 3]);
    let before = a.to_vec();
    let snapshot = a.clone();
    a.merge(&snapshot);
    a.merge(&snapshot);
    assert_eq!(a.to_vec(), before);
}

#[test]
fn tombstone_wins_over_live_value() {
    let mut a = Rga::new(UserId::new());
    a.insert(0, vec!['a', 'b']);
    let mut b = a.clone();
    b.set_replica(UserId::new());
    b.delete(0, 1);
    a.merge(&b);
    assert_eq!(a.to_vec(), vec!['b']);
    // The delete survives re-merging the pre-delete state.
    let mut c = b.clone();
    c.merge(&a);
    assert_eq!(c.to_vec(), vec!['b']);
}

#[test]
fn concurrent_inserts_converge_to_one_order() {
    let base: Rga<char> = Rga::new(UserId::new());
    let mut a = base.clone();
    a.set_replica(UserId::new());
    let mut b = base.clone();
    b.set_replica(UserId::new());

    a.insert(0, vec!['a']);
    b.insert(0, vec!['b']);

    let ab = a.merged(&b);
    let ba = b.merged(&a);
    assert_eq!(ab.to_vec(), ba.to_vec());
    assert_eq!(ab.len(), 2);
}

#[test]
fn interleaved_edits_converge() {
    let mut a = Rga::new(UserId::new());
    a.insert(0, vec![10, 20, 30]);
    let mut b = a.clone();
    b.set_replica(UserId::new());

    a.insert(1, vec![15]);
    b.delete(2, 1);
    b.insert(2, vec![25]);

    let ab = a.merged(&b);
    let ba = b.merged(&a);
    assert_eq!(ab.to_vec(), ba.to_vec());
    assert!(ab.to_vec().contains(&15));
    assert!(ab.to_vec().contains(&25));
    assert!(!ab.to_vec().contains(&30));
}

#[test]
fn serde_round_trip() {
    let mut rga = Rga::new(UserId::new());
    rga.insert(0, vec!["x".to_string(), "y".to_string()]);
    rga.delete(0, 1);
    let json = serde_json::to_string(&rga).unwrap();
    let back: Rga<String> = serde_json::from_str(&json).unwrap();
    assert_eq!(back.to_vec(), rga.to_vec());
}
