use super::*;

#[test]
fn test_forward_range_is_unchanged() {
    let range = SelectedLineRange::new(3, 8).with_sides(Some(DiffSide::Additions), None);
    assert_eq!(range.clone().normalize(), range);
}

#[test]
fn test_backward_range_swaps_endpoints() {
    let range = SelectedLineRange::new(10, 5).with_sides(Some(DiffSide::Additions), None);
    let normalized = range.normalize();
    assert_eq!(normalized.start, 5);
    assert_eq!(normalized.end, 10);
    assert_eq!(normalized.side, Some(DiffSide::Additions));
    assert_eq!(normalized.end_side, None);
}

#[test]
fn test_backward_range_across_sides_swaps_sides() {
    let range = SelectedLineRange::new(10, 5)
        .with_sides(Some(DiffSide::Deletions), Some(DiffSide::Additions));
    let normalized = range.normalize();
    assert_eq!(normalized.side, Some(DiffSide::Additions));
    assert_eq!(normalized.end_side, Some(DiffSide::Deletions));
}

#[test]
fn test_normalize_is_idempotent() {
    let cases = [
        SelectedLineRange::new(10, 5),
        SelectedLineRange::new(10, 5).with_sides(Some(DiffSide::Additions), None),
        SelectedLineRange::new(9, 2)
            .with_sides(Some(DiffSide::Deletions), Some(DiffSide::Additions)),
        SelectedLineRange::new(4, 4).with_sides(None, Some(DiffSide::Deletions)),
    ];
    for range in cases {
        let once = range.normalize();
        assert!(once.is_normalized());
        assert_eq!(once.clone().normalize(), once);
    }
}

#[test]
fn test_upward_and_downward_drag_store_same_shape() {
    let down = SelectedLineRange::new(5, 10).with_sides(Some(DiffSide::Additions), None);
    let up = SelectedLineRange::new(10, 5).with_sides(Some(DiffSide::Additions), None);
    assert_eq!(down.normalize(), up.normalize());
}

#[test]
fn test_json_uses_camel_case() {
    let range = SelectedLineRange::new(1, 2)
        .with_sides(Some(DiffSide::Additions), Some(DiffSide::Deletions));
    let json = serde_json::to_value(&range).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"start": 1, "end": 2, "side": "additions", "endSide": "deletions"})
    );
}
