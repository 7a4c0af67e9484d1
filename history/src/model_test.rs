use super::*;
use crate::event::TEXT_PLACEHOLDER;

fn pen(id: &str, points: &[f64]) -> DrawEvent {
    DrawEvent {
        id: EventId::from(id),
        tool: Tool::Pen,
        points: points.to_vec(),
        text: None,
        color: None,
        undo: false,
    }
}

fn sample() -> History {
    History::from_events(vec![pen("a", &[0.0, 0.0, 1.0, 1.0]), pen("b", &[5.0, 5.0]), pen("c", &[9.0, 9.0])])
}

fn ids(history: &History) -> Vec<&str> {
    history.iter().map(|ev| ev.id.as_str()).collect()
}

// =============================================================================
// begin_stroke
// =============================================================================

#[test]
fn begin_stroke_appends_visible_event() {
    let history = sample();
    let (id, next) = history
        .begin_stroke(Tool::Pen, Some("#00ff00".into()), Point::new(2.0, 3.0))
        .expect("begin");

    assert_eq!(next.len(), 4);
    let last = next.events().last().expect("last");
    assert_eq!(last.id, id);
    assert_eq!(last.points, vec![2.0, 3.0]);
    assert_eq!(last.color.as_deref(), Some("#00ff00"));
    assert!(!last.undo);
    // Input snapshot untouched.
    assert_eq!(history.len(), 3);
}

#[test]
fn begin_text_uses_placeholder() {
    let (id, next) = History::new()
        .begin_stroke(Tool::Text, None, Point::new(7.0, 8.0))
        .expect("begin");
    let ev = next.get(&id).expect("event");
    assert_eq!(ev.tool, Tool::Text);
    assert_eq!(ev.text.as_deref(), Some(TEXT_PLACEHOLDER));
}

#[test]
fn begin_stroke_rejects_non_finite_anchor() {
    let err = History::new()
        .begin_stroke(Tool::Pen, None, Point::new(f64::NAN, 1.0))
        .expect_err("nan anchor");
    assert!(matches!(err, HistoryError::Malformed { .. }));
}

#[test]
fn begin_stroke_with_existing_id_is_rejected() {
    let err = sample()
        .begin_stroke_with_id(EventId::from("a"), Tool::Pen, None, Point::new(0.0, 0.0))
        .expect_err("duplicate");
    assert_eq!(err, HistoryError::DuplicateId(EventId::from("a")));
}

// =============================================================================
// extend_stroke / set_text
// =============================================================================

#[test]
fn extend_stroke_appends_pair_to_match_only() {
    let next = sample().extend_stroke(&EventId::from("b"), Point::new(6.0, 7.0));
    assert_eq!(next.get(&EventId::from("b")).expect("b").points, vec![5.0, 5.0, 6.0, 7.0]);
    assert_eq!(next.get(&EventId::from("a")).expect("a").points, vec![0.0, 0.0, 1.0, 1.0]);
}

#[test]
fn extend_unknown_id_is_identity() {
    let history = sample();
    assert_eq!(history.extend_stroke(&EventId::from("zzz"), Point::new(1.0, 1.0)), history);
}

#[test]
fn extend_with_non_finite_point_is_identity() {
    let history = sample();
    assert_eq!(history.extend_stroke(&EventId::from("a"), Point::new(f64::INFINITY, 0.0)), history);
}

#[test]
fn extend_undone_stroke_still_applies_in_place() {
    let id = EventId::from("a");
    let next = sample().mark_undo(&id).extend_stroke(&id, Point::new(2.0, 2.0));
    let ev = next.get(&id).expect("a");
    assert!(ev.undo);
    assert_eq!(ev.point_count(), 3);
}

#[test]
fn text_anchor_is_never_extended() {
    let (id, history) = History::new()
        .begin_stroke(Tool::Text, None, Point::new(1.0, 1.0))
        .expect("begin");
    let next = history.extend_stroke(&id, Point::new(2.0, 2.0));
    assert_eq!(next.get(&id).expect("text").points, vec![1.0, 1.0]);
}

#[test]
fn set_text_replaces_content() {
    let (id, history) = History::new()
        .begin_stroke(Tool::Text, None, Point::new(1.0, 1.0))
        .expect("begin");
    let next = history.set_text(&id, "hello");
    assert_eq!(next.get(&id).expect("text").text.as_deref(), Some("hello"));
}

#[test]
fn set_text_on_pen_is_identity() {
    let history = sample();
    assert_eq!(history.set_text(&EventId::from("a"), "nope"), history);
}

// =============================================================================
// undo / redo / visible
// =============================================================================

#[test]
fn mark_undo_hides_but_keeps_event() {
    let next = sample().mark_undo(&EventId::from("b"));
    assert_eq!(next.len(), 3);
    assert!(next.get(&EventId::from("b")).expect("b").undo);
    let visible: Vec<&str> = next.visible().iter().map(|ev| ev.id.as_str()).collect();
    assert_eq!(visible, vec!["a", "c"]);
}

#[test]
fn redo_after_undo_restores_visible_set_and_order() {
    let history = sample();
    let id = EventId::from("b");
    let restored = history.mark_undo(&id).mark_redo(&id);

    assert_eq!(restored.visible(), history.visible());
    assert_eq!(ids(&restored), ids(&history));
    assert!(!restored.get(&id).expect("b").undo);
}

#[test]
fn soft_delete_round_trip_holds_for_every_event() {
    let history = sample().mark_undo(&EventId::from("c"));
    for ev in &history {
        let after = history.mark_undo(&ev.id).mark_redo(&ev.id);
        assert_eq!(ids(&after), ids(&history));
        assert!(after.get(&ev.id).expect("event").is_visible());
    }
}

#[test]
fn undo_unknown_id_is_identity() {
    let history = sample();
    assert_eq!(history.mark_undo(&EventId::from("missing")), history);
    assert_eq!(history.mark_redo(&EventId::from("missing")), history);
}

#[test]
fn visible_of_empty_history_is_empty() {
    assert!(History::new().visible().is_empty());
}

#[test]
fn history_serializes_as_plain_array() {
    let json = serde_json::to_value(sample()).expect("serialize");
    assert!(json.is_array());
    assert_eq!(json.as_array().map(Vec::len), Some(3));
}
