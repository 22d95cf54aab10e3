//! Tests for AllocationSession

use rstest::{fixture, rstest};

use allotree::application::services::{AllocationSession, AppliedEdit, EditOutcome};
use allotree::application::ApplicationError;
use allotree::domain::{AllocationMode, DomainError, Forest, Row, RowId};
use allotree::util::testing;

#[fixture]
fn session() -> AllocationSession {
    testing::init_test_setup();
    AllocationSession::new(Forest::new(vec![
        Row::new("total", "Total", 200.0).with_children(vec![
            Row::new("a", "A", 80.0),
            Row::new("b", "B", 120.0),
        ]),
    ]))
}

fn value_of(session: &AllocationSession, raw: &str) -> f64 {
    session
        .forest()
        .find(&RowId::from(raw))
        .expect("row exists")
        .effective_value()
}

#[rstest]
fn given_percentage_input_when_allocating_then_grows_by_percent(mut session: AllocationSession) {
    // Arrange
    session.set_input(RowId::from("a"), "25").unwrap();

    // Act
    let outcome = session
        .allocate(&RowId::from("a"), AllocationMode::Percentage)
        .unwrap();

    // Assert
    assert_eq!(
        outcome,
        EditOutcome::Applied(AppliedEdit {
            id: RowId::from("a"),
            new_value: 100.0,
            delta: 20.0,
        })
    );
    assert_eq!(value_of(&session, "a"), 100.0);
    assert_eq!(value_of(&session, "total"), 220.0);
    assert_eq!(value_of(&session, "b"), 120.0);
}

#[rstest]
fn given_absolute_input_when_allocating_then_adds_amount(mut session: AllocationSession) {
    // Arrange
    session.set_input(RowId::from("b"), "-20").unwrap();

    // Act
    session
        .allocate(&RowId::from("b"), AllocationMode::Absolute)
        .unwrap();

    // Assert
    assert_eq!(value_of(&session, "b"), 100.0);
    assert_eq!(value_of(&session, "total"), 180.0);
}

#[rstest]
fn given_zero_input_when_allocating_then_edit_is_applied(mut session: AllocationSession) {
    // Arrange
    session.set_input(RowId::from("a"), "0").unwrap();

    // Act
    let outcome = session
        .allocate(&RowId::from("a"), AllocationMode::Absolute)
        .unwrap();

    // Assert: zero is an entered amount, not "nothing entered"
    assert!(outcome.is_applied());
    let row = session.forest().find(&RowId::from("a")).unwrap();
    assert_eq!(row.override_value, Some(80.0));
    assert_eq!(session.history().len(), 1);
}

#[rstest]
fn given_no_input_when_allocating_then_snapshot_kept(mut session: AllocationSession) {
    // Arrange
    let before = session.forest().clone();

    // Act
    let outcome = session
        .allocate(&RowId::from("a"), AllocationMode::Percentage)
        .unwrap();

    // Assert
    assert_eq!(outcome, EditOutcome::NoInput(RowId::from("a")));
    assert_eq!(session.forest(), &before);
    assert!(session.history().is_empty());
}

#[rstest]
fn given_malformed_input_when_setting_then_rejected_and_previous_kept(
    mut session: AllocationSession,
) {
    // Arrange
    session.set_input(RowId::from("a"), "5").unwrap();

    // Act
    let result = session.set_input(RowId::from("a"), "five");

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::MalformedInput(_)))
    ));
    assert_eq!(session.pending().get(&RowId::from("a")), Some(5.0));
}

#[rstest]
fn given_unknown_row_when_allocating_then_not_found(mut session: AllocationSession) {
    // Arrange
    session.set_input(RowId::from("zzz"), "10").unwrap();
    let before = session.forest().clone();

    // Act
    let outcome = session
        .allocate(&RowId::from("zzz"), AllocationMode::Absolute)
        .unwrap();

    // Assert
    assert_eq!(outcome, EditOutcome::NotFound(RowId::from("zzz")));
    assert_eq!(session.forest(), &before);
}

#[rstest]
fn given_repeated_percentage_when_allocating_then_compounds_on_current_value(
    mut session: AllocationSession,
) {
    // Arrange
    session.set_input(RowId::from("a"), "50").unwrap();

    // Act
    session
        .allocate(&RowId::from("a"), AllocationMode::Percentage)
        .unwrap();
    session
        .allocate(&RowId::from("a"), AllocationMode::Percentage)
        .unwrap();

    // Assert: 80 -> 120 -> 180; each edit's delta is measured against base 80
    assert_eq!(value_of(&session, "a"), 180.0);
    let deltas: Vec<f64> = session.history().iter().map(|e| e.delta).collect();
    assert_eq!(deltas, vec![40.0, 100.0]);
    assert_eq!(value_of(&session, "total"), 200.0 + 40.0 + 100.0);
}

#[rstest]
fn given_direct_value_when_setting_then_records_history(mut session: AllocationSession) {
    // Act
    let outcome = session.set_value(&RowId::from("total"), 250.0).unwrap();

    // Assert
    assert!(outcome.is_applied());
    assert_eq!(session.history()[0].delta, 50.0);
    assert_eq!(value_of(&session, "a"), 80.0);
}

#[rstest]
fn given_conflicting_ids_when_setting_then_error_and_snapshot_kept() {
    // Arrange
    testing::init_test_setup();
    let forest = Forest::new(vec![Row::new(1, "x", 1.0), Row::new(1, "y", 2.0)]);
    let mut session = AllocationSession::new(forest.clone());

    // Act
    let result = session.set_value(&RowId::from(1), 5.0);

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::ConflictingIdentifier(_)))
    ));
    assert_eq!(session.forest(), &forest);
    assert!(session.history().is_empty());
}

#[rstest]
fn given_cleared_input_when_allocating_then_no_input(mut session: AllocationSession) {
    // Arrange
    session.set_input(RowId::from("a"), "10").unwrap();
    assert_eq!(session.clear_input(&RowId::from("a")), Some(10.0));

    // Act
    let outcome = session
        .allocate(&RowId::from("a"), AllocationMode::Absolute)
        .unwrap();

    // Assert
    assert_eq!(outcome, EditOutcome::NoInput(RowId::from("a")));
}
