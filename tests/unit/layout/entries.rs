use super::*;

#[test]
fn new_entries_round_robin_over_photos() {
    let got = reconcile_assignments(&[], 5, 2);
    assert_eq!(got, vec![Some(0), Some(1), Some(0), Some(1), Some(0)]);
    assert_eq!(reconcile_assignments(&[], 3, 0), vec![None, None, None]);
}

#[test]
fn growing_list_preserves_existing_positions() {
    let old = vec![Some(2), None, Some(0)];
    let got = reconcile_assignments(&old, 5, 3);
    assert_eq!(got, vec![Some(2), None, Some(0), Some(0), Some(1)]);
}

#[test]
fn shrinking_list_truncates() {
    let old = vec![Some(1), Some(1), Some(1), Some(1)];
    assert_eq!(reconcile_assignments(&old, 2, 2), vec![Some(1), Some(1)]);
}

#[test]
fn unchanged_length_keeps_everything() {
    let old = vec![Some(1), None, Some(0)];
    assert_eq!(reconcile_assignments(&old, 3, 2), old);
}

#[test]
fn removed_photos_are_reassigned() {
    let old = vec![Some(4), Some(0)];
    assert_eq!(reconcile_assignments(&old, 2, 2), vec![Some(0), Some(0)]);
}

#[test]
fn reconcile_entries_pairs_labels_with_photos() {
    let old = vec![
        Entry {
            label: "Ana".into(),
            photo: Some(1),
        },
        Entry::new("Bo"),
    ];
    let got = reconcile_entries(&old, vec!["Ana".into(), "Bo".into(), "Cy".into()], 2);
    assert_eq!(got[0].photo, Some(1));
    assert_eq!(got[1].photo, None);
    assert_eq!(got[2], Entry {
        label: "Cy".into(),
        photo: Some(0),
    });
}
