use super::*;

fn board() -> BoardId {
    BoardId::from("myBoard")
}

fn intent_history(intent: &Intent) -> &History {
    match intent {
        Intent::Drawing(_, h) | Intent::Undo(_, h) | Intent::Redo(_, h) => h,
        Intent::JoinRoom(_) | Intent::LeaveRoom(_) => panic!("expected a sync intent, got {}", intent.name()),
    }
}

/// Draw a two-point pen stroke and return its id.
fn draw_line(rec: &mut Reconciler, from: (f64, f64), to: (f64, f64)) -> EventId {
    rec.set_tool(Tool::Pen);
    rec.begin_stroke(Point::new(from.0, from.1)).expect("begin");
    let id = rec.active_stroke().cloned().expect("active stroke");
    rec.extend_stroke(Point::new(to.0, to.1)).expect("extend");
    rec.finish_stroke().expect("finish");
    id
}

// =============================================================================
// hydrate / leave
// =============================================================================

#[test]
fn hydrate_seeds_history_and_joins() {
    let mut rec = Reconciler::new(board());
    let seeded = History::new()
        .begin_stroke(Tool::Pen, None, Point::new(1.0, 1.0))
        .expect("begin")
        .1;

    let intent = rec.hydrate(seeded.clone());
    assert_eq!(intent, Intent::JoinRoom(board()));
    assert_eq!(rec.history(), &seeded);
    assert!(!rec.can_undo(), "hydrated events were not authored locally");
}

#[test]
fn leave_resets_everything() {
    let mut rec = Reconciler::new(board());
    draw_line(&mut rec, (0.0, 0.0), (1.0, 1.0));
    rec.undo().expect("undo");

    assert_eq!(rec.leave(), Intent::LeaveRoom(board()));
    assert!(rec.history().is_empty());
    assert!(!rec.can_undo());
    assert!(!rec.can_redo());
    assert!(rec.active_stroke().is_none());
}

// =============================================================================
// authored edits
// =============================================================================

#[test]
fn begin_stroke_sends_full_history_and_records_id() {
    let mut rec = Reconciler::new(board());
    rec.set_color(Some("#112233".into()));
    let intent = rec.begin_stroke(Point::new(0.0, 0.0)).expect("begin");

    let sent = intent_history(&intent);
    assert_eq!(sent, rec.history());
    assert_eq!(sent.len(), 1);
    assert_eq!(sent.events()[0].color.as_deref(), Some("#112233"));
    assert_eq!(rec.local_history().len(), 1);
    assert_eq!(rec.active_stroke(), Some(&sent.events()[0].id));
}

#[test]
fn begin_stroke_with_bad_anchor_leaves_state_alone() {
    let mut rec = Reconciler::new(board());
    assert!(rec.begin_stroke(Point::new(f64::NAN, 0.0)).is_err());
    assert!(rec.history().is_empty());
    assert!(rec.local_history().is_empty());
}

#[test]
fn extend_without_active_stroke_sends_nothing() {
    let mut rec = Reconciler::new(board());
    assert!(rec.extend_stroke(Point::new(1.0, 1.0)).is_none());
    assert!(rec.finish_stroke().is_none());
}

#[test]
fn extend_grows_active_stroke_without_duplicating_stack_entry() {
    let mut rec = Reconciler::new(board());
    rec.begin_stroke(Point::new(0.0, 0.0)).expect("begin");
    rec.extend_stroke(Point::new(1.0, 1.0)).expect("extend");
    let intent = rec.extend_stroke(Point::new(2.0, 2.0)).expect("extend");

    assert_eq!(intent_history(&intent).events()[0].points, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
    assert_eq!(rec.local_history().len(), 1);
}

#[test]
fn finish_stroke_clears_active_stroke() {
    let mut rec = Reconciler::new(board());
    rec.begin_stroke(Point::new(0.0, 0.0)).expect("begin");
    let intent = rec.finish_stroke().expect("finish");
    assert!(matches!(intent, Intent::Drawing(..)));
    assert!(rec.active_stroke().is_none());
}

#[test]
fn text_placement_does_not_start_a_drag() {
    let mut rec = Reconciler::new(board());
    rec.set_tool(Tool::Text);
    rec.begin_stroke(Point::new(5.0, 5.0)).expect("begin");
    assert!(rec.active_stroke().is_none());
    assert_eq!(rec.history().events()[0].tool, Tool::Text);
}

#[test]
fn set_text_edits_and_sends() {
    let mut rec = Reconciler::new(board());
    rec.set_tool(Tool::Text);
    rec.begin_stroke(Point::new(5.0, 5.0)).expect("begin");
    let id = rec.history().events()[0].id.clone();

    let intent = rec.set_text(&id, "hello").expect("set_text");
    assert_eq!(intent_history(&intent).get(&id).and_then(|ev| ev.text.as_deref()), Some("hello"));
}

#[test]
fn set_text_on_unknown_or_pen_event_is_ignored() {
    let mut rec = Reconciler::new(board());
    let pen_id = draw_line(&mut rec, (0.0, 0.0), (1.0, 1.0));
    assert!(rec.set_text(&EventId::from("missing"), "x").is_none());
    assert!(rec.set_text(&pen_id, "x").is_none());
}

#[test]
fn editing_a_remote_text_adopts_it_into_the_undo_stack() {
    let mut remote = Reconciler::new(board());
    remote.set_tool(Tool::Text);
    let intent = remote.begin_stroke(Point::new(1.0, 1.0)).expect("begin");
    let id = remote.history().events()[0].id.clone();

    let mut rec = Reconciler::new(board());
    rec.apply(&RelayEvent::sync(SyncKind::Drawing, board(), intent_history(&intent).clone()));
    assert!(!rec.can_undo());

    rec.set_text(&id, "mine now").expect("set_text");
    assert_eq!(rec.local_history(), &[id]);
}

#[test]
fn new_edit_clears_redo_chain() {
    let mut rec = Reconciler::new(board());
    draw_line(&mut rec, (0.0, 0.0), (1.0, 1.0));
    rec.undo().expect("undo");
    assert!(rec.can_redo());

    draw_line(&mut rec, (2.0, 2.0), (3.0, 3.0));
    assert!(!rec.can_redo());
}

// =============================================================================
// undo / redo
// =============================================================================

#[test]
fn undo_on_empty_stack_is_noop() {
    let mut rec = Reconciler::new(board());
    assert!(rec.undo().is_none());
    assert!(rec.redo().is_none());
}

#[test]
fn undo_then_redo_moves_id_between_stacks() {
    let mut rec = Reconciler::new(board());
    let first = draw_line(&mut rec, (0.0, 0.0), (1.0, 1.0));
    let second = draw_line(&mut rec, (2.0, 2.0), (3.0, 3.0));
    assert_eq!(rec.local_history(), &[first.clone(), second.clone()]);

    let undo = rec.undo().expect("undo");
    assert!(matches!(undo, Intent::Undo(..)));
    assert_eq!(rec.local_history(), &[first.clone()]);
    assert_eq!(rec.redo_history(), &[second.clone()]);
    assert!(intent_history(&undo).get(&second).expect("second").undo);
    assert_eq!(rec.visible().len(), 1);

    let redo = rec.redo().expect("redo");
    assert!(matches!(redo, Intent::Redo(..)));
    assert_eq!(rec.local_history(), &[first, second.clone()]);
    assert!(rec.redo_history().is_empty());
    assert!(!intent_history(&redo).get(&second).expect("second").undo);
    assert_eq!(rec.visible().len(), 2);
}

#[test]
fn stacks_never_share_an_id() {
    let mut rec = Reconciler::new(board());
    for i in 0..4_i32 {
        let base = f64::from(i);
        draw_line(&mut rec, (base, base), (base + 1.0, base + 1.0));
    }
    let steps: [fn(&mut Reconciler) -> Option<Intent>; 6] =
        [Reconciler::undo, Reconciler::undo, Reconciler::redo, Reconciler::undo, Reconciler::undo, Reconciler::redo];
    for step in steps {
        step(&mut rec).expect("step");
        for id in rec.local_history() {
            assert!(!rec.redo_history().contains(id));
        }
    }
    assert_eq!(rec.local_history().len() + rec.redo_history().len(), 4);
}

#[test]
fn undo_order_is_lifo() {
    let mut rec = Reconciler::new(board());
    let a = draw_line(&mut rec, (0.0, 0.0), (1.0, 1.0));
    let b = draw_line(&mut rec, (2.0, 2.0), (3.0, 3.0));
    rec.undo().expect("undo b");
    rec.undo().expect("undo a");
    assert_eq!(rec.redo_history(), &[b, a]);
    assert!(rec.visible().is_empty());
    assert_eq!(rec.history().len(), 2);
}

// =============================================================================
// inbound
// =============================================================================

#[test]
fn broadcast_replaces_history_wholesale() {
    let mut rec = Reconciler::new(board());
    draw_line(&mut rec, (0.0, 0.0), (1.0, 1.0));

    let mut other = Reconciler::new(board());
    let remote = other.begin_stroke(Point::new(9.0, 9.0)).expect("begin");
    let remote_history = intent_history(&remote).clone();

    assert!(rec.apply(&RelayEvent::sync(SyncKind::Drawing, board(), remote_history.clone())));
    assert_eq!(rec.history(), &remote_history);
    // Stacks are local state; a broadcast does not touch them.
    assert_eq!(rec.local_history().len(), 1);
}

#[test]
fn broadcast_for_other_board_is_ignored() {
    let mut rec = Reconciler::new(board());
    draw_line(&mut rec, (0.0, 0.0), (1.0, 1.0));
    let before = rec.history().clone();

    assert!(!rec.apply(&RelayEvent::sync(SyncKind::Undo, BoardId::from("other"), History::new())));
    assert_eq!(rec.history(), &before);
}

#[test]
fn non_sync_events_are_ignored() {
    let mut rec = Reconciler::new(board());
    let event = RelayEvent::Error { code: "E".into(), message: "m".into(), retryable: false };
    assert!(!rec.apply(&event));
}

#[test]
fn undo_of_remotely_overwritten_event_still_moves_stacks() {
    let mut rec = Reconciler::new(board());
    let id = draw_line(&mut rec, (0.0, 0.0), (1.0, 1.0));

    // A peer broadcast that lost our stroke.
    rec.apply(&RelayEvent::sync(SyncKind::Drawing, board(), History::new()));
    let intent = rec.undo().expect("undo");

    assert!(intent_history(&intent).is_empty());
    assert_eq!(rec.redo_history(), &[id]);
}
