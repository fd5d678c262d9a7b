use triage_core::{
    apply, Action, Direction, Priority, Recurrence, RecurrenceKind, Task, TaskCollection,
    TaskStatus,
};

const T0: i64 = 1_000;

fn task(id: &str, status: TaskStatus, order: i64) -> Task {
    let mut task = Task::captured(id, format!("task {id}"), order, T0);
    task.status = status;
    if status == TaskStatus::Completed {
        task.done_at = Some(T0);
    }
    task
}

fn collection(tasks: Vec<Task>) -> TaskCollection {
    TaskCollection::new(tasks)
}

fn status_of(collection: &TaskCollection, id: &str) -> TaskStatus {
    collection.get(id).unwrap().status
}

fn queued_ids(collection: &TaskCollection) -> Vec<&str> {
    collection
        .lane(TaskStatus::Queued)
        .into_iter()
        .map(|task| task.id.as_str())
        .collect()
}

fn add(id: &str, title: &str, now: i64) -> Action {
    Action::Add {
        id: id.to_string(),
        title: title.to_string(),
        now,
    }
}

fn move_to(id: &str, to: TaskStatus, now: i64) -> Action {
    Action::MoveTo {
        id: id.to_string(),
        to,
        now,
    }
}

#[test]
fn add_captures_a_task_with_defaults() {
    let next = apply(&TaskCollection::empty(), add("a", "Write report", 1_000));

    assert_eq!(next.len(), 1);
    let added = next.get("a").unwrap();
    assert_eq!(added.title, "Write report");
    assert_eq!(added.status, TaskStatus::Captured);
    assert_eq!(added.order, 1);
    assert_eq!(added.priority, Priority::Normal);
    assert!(added.tags.is_empty());
    assert_eq!(added.created_at, 1_000);
    assert_eq!(added.updated_at, 1_000);
    assert_eq!(added.done_at, None);
}

#[test]
fn add_trims_and_ignores_blank_titles() {
    let base = TaskCollection::empty();
    let blank = apply(&base, add("a", "   ", 1_000));
    assert!(blank.same_snapshot(&base));

    let trimmed = apply(&base, add("a", "  plan week \n", 1_000));
    assert_eq!(trimmed.get("a").unwrap().title, "plan week");
}

#[test]
fn add_appends_after_the_captured_tail() {
    let base = collection(vec![
        task("a", TaskStatus::Captured, 4),
        task("b", TaskStatus::Queued, 9),
    ]);
    let next = apply(&base, add("c", "third", 2_000));
    assert_eq!(next.get("c").unwrap().order, 5);
}

#[test]
fn move_to_queued_auto_promotes_when_no_task_is_active() {
    let base = collection(vec![task("a", TaskStatus::Captured, 1)]);
    let next = apply(&base, move_to("a", TaskStatus::Queued, 2_000));

    let moved = next.get("a").unwrap();
    assert_eq!(moved.status, TaskStatus::Active);
    assert_eq!(moved.order, 0);
    assert_eq!(moved.started_at, Some(2_000));
}

#[test]
fn move_to_queued_stays_queued_behind_an_active_task() {
    let base = collection(vec![
        task("now", TaskStatus::Active, 0),
        task("a", TaskStatus::Captured, 1),
    ]);
    let next = apply(&base, move_to("a", TaskStatus::Queued, 2_000));

    assert_eq!(status_of(&next, "now"), TaskStatus::Active);
    assert_eq!(status_of(&next, "a"), TaskStatus::Queued);
    assert_eq!(next.get("a").unwrap().order, 1);
}

#[test]
fn move_to_completed_sets_done_at_and_moving_away_clears_it() {
    let base = collection(vec![task("a", TaskStatus::Captured, 1)]);
    let done = apply(&base, move_to("a", TaskStatus::Completed, 2_000));
    assert_eq!(done.get("a").unwrap().done_at, Some(2_000));

    let deferred = apply(&done, move_to("a", TaskStatus::Deferred, 3_000));
    let task = deferred.get("a").unwrap();
    assert_eq!(task.status, TaskStatus::Deferred);
    assert_eq!(task.done_at, None);
    assert_eq!(task.updated_at, 3_000);
}

#[test]
fn move_to_active_demotes_the_previous_focus_item() {
    let base = collection(vec![
        task("old", TaskStatus::Active, 0),
        task("q", TaskStatus::Queued, 3),
        task("a", TaskStatus::Captured, 1),
    ]);
    let next = apply(&base, move_to("a", TaskStatus::Active, 2_000));

    assert_eq!(next.count(TaskStatus::Active), 1);
    let promoted = next.get("a").unwrap();
    assert_eq!(promoted.status, TaskStatus::Active);
    assert_eq!(promoted.order, 0);
    let demoted = next.get("old").unwrap();
    assert_eq!(demoted.status, TaskStatus::Queued);
    assert_eq!(demoted.order, 4);
}

#[test]
fn move_unknown_id_returns_same_snapshot() {
    let base = collection(vec![task("a", TaskStatus::Captured, 1)]);
    let next = apply(&base, move_to("missing", TaskStatus::Deferred, 2_000));
    assert!(next.same_snapshot(&base));
}

#[test]
fn set_active_swaps_focus_and_requeues_previous() {
    let base = collection(vec![
        task("now", TaskStatus::Active, 0),
        task("q1", TaskStatus::Queued, 1),
        task("q2", TaskStatus::Queued, 2),
    ]);
    let next = apply(
        &base,
        Action::SetActive {
            id: "q2".to_string(),
            now: 5_000,
        },
    );

    assert_eq!(next.active().unwrap().id, "q2");
    assert_eq!(next.active().unwrap().started_at, Some(5_000));
    let demoted = next.get("now").unwrap();
    assert_eq!(demoted.status, TaskStatus::Queued);
    assert_eq!(demoted.order, 3);
    assert_eq!(queued_ids(&next), vec!["q1", "now"]);
}

#[test]
fn set_active_on_unknown_id_returns_same_snapshot() {
    let base = collection(vec![task("now", TaskStatus::Active, 0)]);
    let next = apply(
        &base,
        Action::SetActive {
            id: "ghost".to_string(),
            now: 5_000,
        },
    );
    assert!(next.same_snapshot(&base));
}

#[test]
fn complete_active_derives_elapsed_minutes_and_clock() {
    let mut active = task("a", TaskStatus::Active, 0);
    active.started_at = Some(1_000);
    let base = collection(vec![active]);

    let done_at = 1_000 + 30 * 60_000;
    let next = apply(&base, Action::CompleteActive { now: done_at });

    let done = next.get("a").unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert_eq!(done.done_at, Some(done_at));
    assert_eq!(done.actual_minutes, Some(30));
    // 1970-01-01T00:30:01Z, a Thursday
    assert_eq!(done.completed_at_hour, Some(0));
    assert_eq!(done.day_of_week, Some(4));
}

#[test]
fn complete_active_without_start_keeps_previous_actual_minutes() {
    let mut active = task("a", TaskStatus::Active, 0);
    active.actual_minutes = Some(12);
    let next = apply(&collection(vec![active]), Action::CompleteActive { now: 9_000 });
    assert_eq!(next.get("a").unwrap().actual_minutes, Some(12));
}

#[test]
fn complete_active_without_active_task_is_noop() {
    let base = collection(vec![task("q", TaskStatus::Captured, 1)]);
    let next = apply(&base, Action::CompleteActive { now: 9_000 });
    assert!(next.same_snapshot(&base));
}

#[test]
fn complete_active_promotes_the_queue_head() {
    let base = collection(vec![
        task("now", TaskStatus::Active, 0),
        task("second", TaskStatus::Queued, 2),
        task("first", TaskStatus::Queued, 1),
    ]);
    let next = apply(&base, Action::CompleteActive { now: 9_000 });

    assert_eq!(status_of(&next, "now"), TaskStatus::Completed);
    let promoted = next.active().unwrap();
    assert_eq!(promoted.id, "first");
    assert_eq!(promoted.order, 0);
    assert_eq!(promoted.started_at, Some(9_000));
    assert_eq!(status_of(&next, "second"), TaskStatus::Queued);
}

#[test]
fn reorder_swaps_with_neighbour() {
    let base = collection(vec![
        task("now", TaskStatus::Active, 0),
        task("a", TaskStatus::Queued, 1),
        task("b", TaskStatus::Queued, 2),
        task("c", TaskStatus::Queued, 3),
    ]);
    let next = apply(
        &base,
        Action::Reorder {
            id: "b".to_string(),
            direction: Direction::Up,
            now: 4_000,
        },
    );

    assert_eq!(queued_ids(&next), vec!["b", "a", "c"]);
    assert_eq!(next.get("a").unwrap().updated_at, 4_000);
    assert_eq!(next.get("b").unwrap().updated_at, 4_000);
    assert_eq!(next.get("c").unwrap().updated_at, T0);
}

#[test]
fn reorder_at_lane_boundaries_returns_same_snapshot() {
    let base = collection(vec![
        task("now", TaskStatus::Active, 0),
        task("a", TaskStatus::Queued, 1),
        task("b", TaskStatus::Queued, 2),
    ]);

    let first_up = apply(
        &base,
        Action::Reorder {
            id: "a".to_string(),
            direction: Direction::Up,
            now: 4_000,
        },
    );
    assert!(first_up.same_snapshot(&base));

    let last_down = apply(
        &base,
        Action::Reorder {
            id: "b".to_string(),
            direction: Direction::Down,
            now: 4_000,
        },
    );
    assert!(last_down.same_snapshot(&base));

    let not_queued = apply(
        &base,
        Action::Reorder {
            id: "now".to_string(),
            direction: Direction::Down,
            now: 4_000,
        },
    );
    assert!(not_queued.same_snapshot(&base));
}

#[test]
fn normalize_keeps_most_recently_updated_active_task() {
    let mut older = task("older", TaskStatus::Active, 0);
    older.updated_at = 2_000;
    let mut newer = task("newer", TaskStatus::Active, 0);
    newer.updated_at = 3_000;

    let next = apply(
        &TaskCollection::empty(),
        Action::Normalize {
            tasks: vec![newer, older],
            now: 5_000,
        },
    );

    assert_eq!(next.active().unwrap().id, "newer");
    let demoted = next.get("older").unwrap();
    assert_eq!(demoted.status, TaskStatus::Queued);
    assert_eq!(demoted.done_at, None);
    assert_eq!(demoted.updated_at, 5_000);
}

#[test]
fn normalize_promotes_lowest_queued_when_no_task_is_active() {
    let next = apply(
        &TaskCollection::empty(),
        Action::Normalize {
            tasks: vec![task("two", TaskStatus::Queued, 2), task("one", TaskStatus::Queued, 1)],
            now: 5_000,
        },
    );

    let promoted = next.get("one").unwrap();
    assert_eq!(promoted.status, TaskStatus::Active);
    assert_eq!(promoted.order, 0);
    assert_eq!(status_of(&next, "two"), TaskStatus::Queued);
}

#[test]
fn normalize_without_active_or_queued_changes_nothing() {
    let tasks = vec![task("a", TaskStatus::Captured, 1), task("b", TaskStatus::Deferred, 1)];
    let next = apply(
        &TaskCollection::empty(),
        Action::Normalize {
            tasks: tasks.clone(),
            now: 5_000,
        },
    );
    assert_eq!(next.tasks(), tasks.as_slice());
}

#[test]
fn normalize_is_idempotent() {
    let mut dup_tags = task("tags", TaskStatus::Captured, 1);
    dup_tags.tags = vec!["x".to_string(), "y".to_string(), "x".to_string()];
    let mut first_active = task("a1", TaskStatus::Active, 0);
    first_active.updated_at = 7;
    let second_active = task("a2", TaskStatus::Active, 0);
    let list = vec![
        dup_tags,
        first_active,
        second_active,
        task("q", TaskStatus::Queued, 1),
        task("d", TaskStatus::Completed, 1),
    ];

    let once = apply(
        &TaskCollection::empty(),
        Action::Normalize {
            tasks: list,
            now: 9_000,
        },
    );
    let twice = apply(
        &once,
        Action::Normalize {
            tasks: once.to_vec(),
            now: 9_500,
        },
    );

    assert_eq!(twice, once);
    assert_eq!(once.get("tags").unwrap().tags, vec!["x", "y"]);
    assert_eq!(once.count(TaskStatus::Active), 1);
}

#[test]
fn completed_then_undone_returns_to_captured_without_done_at() {
    let mut active = task("a", TaskStatus::Active, 0);
    active.started_at = Some(0);
    let done = apply(&collection(vec![active]), Action::CompleteActive { now: 120_000 });
    assert!(done.get("a").unwrap().done_at.is_some());

    let undone = apply(
        &done,
        Action::UndoCompleted {
            id: "a".to_string(),
            now: 130_000,
        },
    );
    let task = undone.get("a").unwrap();
    assert_eq!(task.status, TaskStatus::Captured);
    assert_eq!(task.done_at, None);
    assert_eq!(task.actual_minutes, Some(2));
}

#[test]
fn undo_and_restore_are_guarded_by_status() {
    let base = collection(vec![
        task("a", TaskStatus::Captured, 1),
        task("d", TaskStatus::Discarded, 1),
    ]);

    let undo_open = apply(
        &base,
        Action::UndoCompleted {
            id: "a".to_string(),
            now: 2_000,
        },
    );
    assert!(undo_open.same_snapshot(&base));

    let restore_open = apply(
        &base,
        Action::RestoreDiscarded {
            id: "a".to_string(),
            now: 2_000,
        },
    );
    assert!(restore_open.same_snapshot(&base));

    let restored = apply(
        &base,
        Action::RestoreDiscarded {
            id: "d".to_string(),
            now: 2_000,
        },
    );
    let task = restored.get("d").unwrap();
    assert_eq!(task.status, TaskStatus::Captured);
    assert_eq!(task.order, 2);
}

#[test]
fn completing_a_daily_task_regenerates_a_fresh_successor() {
    let mut recurring = task("r", TaskStatus::Active, 0);
    recurring.started_at = Some(0);
    recurring.recurrence = Some(Recurrence::daily());
    recurring.tags = vec!["home".to_string()];
    recurring.priority = Priority::High;
    recurring.estimated_minutes = Some(15);
    let base = collection(vec![recurring, task("c", TaskStatus::Captured, 3)]);

    let next = apply(&base, Action::CompleteActive { now: 600_000 });
    assert_eq!(next.len(), base.len() + 1);

    let successor = next
        .iter()
        .find(|task| task.id != "r" && task.id != "c")
        .unwrap();
    assert!(successor.id.starts_with("rec_600000_"));
    assert_eq!(successor.status, TaskStatus::Captured);
    assert_eq!(successor.order, 4);
    assert_eq!(successor.title, "task r");
    assert_eq!(successor.recurrence.as_ref().unwrap().kind, RecurrenceKind::Daily);
    assert_eq!(successor.tags, vec!["home"]);
    assert_eq!(successor.priority, Priority::High);
    assert_eq!(successor.estimated_minutes, Some(15));
    assert_eq!(successor.done_at, None);
    assert_eq!(successor.started_at, None);
    assert_eq!(successor.actual_minutes, None);
    assert_eq!(successor.completed_at_hour, None);
    assert_eq!(successor.day_of_week, None);
    assert_eq!(successor.created_at, 600_000);

    assert_eq!(status_of(&next, "r"), TaskStatus::Completed);
}

#[test]
fn field_setters_stamp_updated_at_and_report_noops() {
    let base = collection(vec![task("a", TaskStatus::Deferred, 1)]);

    let tagged = apply(
        &base,
        Action::AddTag {
            id: "a".to_string(),
            tag: " focus ".to_string(),
            now: 2_000,
        },
    );
    assert_eq!(tagged.get("a").unwrap().tags, vec!["focus"]);
    assert_eq!(tagged.get("a").unwrap().updated_at, 2_000);

    let again = apply(
        &tagged,
        Action::AddTag {
            id: "a".to_string(),
            tag: "focus".to_string(),
            now: 3_000,
        },
    );
    assert!(again.same_snapshot(&tagged));

    let absent = apply(
        &tagged,
        Action::RemoveTag {
            id: "a".to_string(),
            tag: "other".to_string(),
            now: 3_000,
        },
    );
    assert!(absent.same_snapshot(&tagged));

    let due = apply(
        &tagged,
        Action::SetLaterDue {
            id: "a".to_string(),
            due: Some(99_000),
            now: 4_000,
        },
    );
    assert_eq!(due.get("a").unwrap().later_due_date, Some(99_000));

    let described = apply(
        &due,
        Action::SetDescription {
            id: "a".to_string(),
            description: Some("   ".to_string()),
            now: 5_000,
        },
    );
    assert_eq!(described.get("a").unwrap().description, None);
    assert_eq!(described.get("a").unwrap().updated_at, 5_000);
}

#[test]
fn archive_is_independent_of_status() {
    let base = collection(vec![task("a", TaskStatus::Captured, 1)]);
    let archived = apply(
        &base,
        Action::Archive {
            id: "a".to_string(),
            now: 2_000,
        },
    );
    let task = archived.get("a").unwrap();
    assert_eq!(task.archived_at, Some(2_000));
    assert_eq!(task.status, TaskStatus::Captured);

    let restored = apply(
        &archived,
        Action::RestoreArchive {
            id: "a".to_string(),
            now: 3_000,
        },
    );
    assert_eq!(restored.get("a").unwrap().archived_at, None);
}
