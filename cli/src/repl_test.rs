use super::*;
use history::{BoardId, History, RelayEvent};

fn reconciler() -> Reconciler {
    let mut reconciler = Reconciler::new(BoardId::from("myBoard"));
    reconciler.hydrate(History::new());
    reconciler
}

// =============================================================================
// parse_command
// =============================================================================

#[test]
fn parses_pen_points() {
    assert_eq!(
        parse_command("pen 1,2 3.5,4"),
        Ok(ReplCommand::Pen(vec![Point::new(1.0, 2.0), Point::new(3.5, 4.0)]))
    );
}

#[test]
fn parses_text_with_and_without_content() {
    assert_eq!(
        parse_command("text 5,6 hello world"),
        Ok(ReplCommand::Text { anchor: Point::new(5.0, 6.0), content: Some("hello world".into()) })
    );
    assert_eq!(
        parse_command("text 5,6"),
        Ok(ReplCommand::Text { anchor: Point::new(5.0, 6.0), content: None })
    );
}

#[test]
fn parses_simple_commands() {
    assert_eq!(parse_command("  undo "), Ok(ReplCommand::Undo));
    assert_eq!(parse_command("redo"), Ok(ReplCommand::Redo));
    assert_eq!(parse_command("show"), Ok(ReplCommand::Show));
    assert_eq!(parse_command("exit"), Ok(ReplCommand::Quit));
    assert_eq!(parse_command("color default"), Ok(ReplCommand::Color(None)));
    assert_eq!(parse_command("color #00ff00"), Ok(ReplCommand::Color(Some("#00ff00".into()))));
    assert_eq!(
        parse_command("edit abc new words"),
        Ok(ReplCommand::Edit { id: EventId::from("abc"), content: "new words".into() })
    );
}

#[test]
fn rejects_bad_input() {
    assert_eq!(parse_command(""), Err(ParseError::Empty));
    assert_eq!(parse_command("erase 1,2"), Err(ParseError::Unknown("erase".into())));
    assert_eq!(parse_command("pen 1;2"), Err(ParseError::BadPoint("1;2".into())));
    assert_eq!(parse_command("pen"), Err(ParseError::Usage("pen X,Y [X,Y ...]")));
    assert_eq!(parse_command("edit onlyid"), Err(ParseError::Usage("edit ID content")));
}

// =============================================================================
// apply
// =============================================================================

#[test]
fn pen_emits_one_drawing_per_pointer_event() {
    let mut r = reconciler();
    let intents = apply(&mut r, &parse_command("pen 0,0 1,1 2,2").expect("parse")).expect("apply");

    // begin + two extends + finish
    assert_eq!(intents.len(), 4);
    assert!(intents.iter().all(|intent| intent.name() == "drawing"));

    let Intent::Drawing(_, last) = intents.last().expect("last") else {
        panic!("expected drawing");
    };
    assert_eq!(last.len(), 1);
    assert_eq!(last.events()[0].points, vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]);
    assert_eq!(r.local_history().len(), 1);
}

#[test]
fn text_with_content_sets_text() {
    let mut r = reconciler();
    let intents = apply(&mut r, &parse_command("text 3,4 hi").expect("parse")).expect("apply");
    assert_eq!(intents.len(), 2);
    let event = &r.history().events()[0];
    assert_eq!(event.tool, Tool::Text);
    assert_eq!(event.text.as_deref(), Some("hi"));
}

#[test]
fn undo_redo_round_trip_through_commands() {
    let mut r = reconciler();
    apply(&mut r, &ReplCommand::Pen(vec![Point::new(0.0, 0.0)])).expect("pen");

    let undo = apply(&mut r, &ReplCommand::Undo).expect("undo");
    assert!(matches!(undo.as_slice(), [Intent::Undo(..)]));
    assert!(r.visible().is_empty());

    let redo = apply(&mut r, &ReplCommand::Redo).expect("redo");
    assert!(matches!(redo.as_slice(), [Intent::Redo(..)]));
    assert_eq!(r.visible().len(), 1);

    // Nothing left to redo.
    assert!(apply(&mut r, &ReplCommand::Redo).expect("redo").is_empty());
}

#[test]
fn malformed_anchor_is_reported() {
    let mut r = reconciler();
    let result = apply(&mut r, &ReplCommand::Pen(vec![Point::new(f64::NAN, 0.0)]));
    assert!(matches!(result, Err(HistoryError::Malformed { .. })));
    assert!(r.history().is_empty());
}

#[test]
fn color_applies_to_new_elements() {
    let mut r = reconciler();
    apply(&mut r, &ReplCommand::Color(Some("#123456".into()))).expect("color");
    apply(&mut r, &ReplCommand::Pen(vec![Point::new(1.0, 1.0)])).expect("pen");
    assert_eq!(r.history().events()[0].color.as_deref(), Some("#123456"));
}

// =============================================================================
// render
// =============================================================================

#[test]
fn render_lists_only_visible_elements() {
    let mut r = reconciler();
    apply(&mut r, &ReplCommand::Pen(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)])).expect("pen");
    apply(&mut r, &ReplCommand::Text { anchor: Point::new(5.0, 6.0), content: None }).expect("text");
    apply(&mut r, &ReplCommand::Undo).expect("undo");

    let rendered = render(&r);
    assert!(rendered.starts_with("board myBoard (1 visible / 2 total"));
    assert!(rendered.contains("pen "));
    assert!(rendered.contains("@1,2 (2 points)"));
    assert!(!rendered.contains("New Text"));
}

#[test]
fn render_reflects_remote_broadcast() {
    let mut r = reconciler();
    let mut remote = reconciler();
    apply(&mut remote, &ReplCommand::Text { anchor: Point::new(0.0, 0.0), content: Some("from peer".into()) })
        .expect("text");

    assert!(r.apply(&RelayEvent::Drawing(BoardId::from("myBoard"), remote.history().clone())));
    assert!(render(&r).contains("\"from peer\""));
}
