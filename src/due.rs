use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::models::Task;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Where a task stands relative to the current time. Derived on demand from
/// the due fields, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    Overdue,
    Today,
    Upcoming,
    Unscheduled,
}

pub fn parse_due_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

pub fn parse_due_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).ok()
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).expect("23:59 is a valid time")
}

/// The task's due date. Malformed strings are treated as absent.
pub fn due_date(task: &Task) -> Option<NaiveDate> {
    task.due_date.as_deref().and_then(parse_due_date)
}

/// The task's due date and time combined into one comparable instant.
/// Time defaults to end of day (23:59) when absent or malformed. A time
/// without a date yields nothing.
pub fn due_instant(task: &Task) -> Option<NaiveDateTime> {
    let date = due_date(task)?;
    let time = task
        .due_time
        .as_deref()
        .and_then(parse_due_time)
        .unwrap_or_else(end_of_day);
    Some(date.and_time(time))
}

/// True iff the due date falls on the same calendar day as `now`,
/// regardless of time of day.
pub fn is_due_today(task: &Task, now: NaiveDateTime) -> bool {
    due_date(task) == Some(now.date())
}

/// True iff the due instant is strictly before `now` and the task is not
/// due today. Overdue means a past day, not a past time of day: a task due
/// today at 09:00 is still "today" at 17:00, never overdue.
pub fn is_overdue(task: &Task, now: NaiveDateTime) -> bool {
    match due_instant(task) {
        Some(instant) => instant < now && !is_due_today(task, now),
        None => false,
    }
}

pub fn status(task: &Task, now: NaiveDateTime) -> DueStatus {
    if due_date(task).is_none() {
        DueStatus::Unscheduled
    } else if is_due_today(task, now) {
        DueStatus::Today
    } else if is_overdue(task, now) {
        DueStatus::Overdue
    } else {
        DueStatus::Upcoming
    }
}

fn category_rank(instant: NaiveDateTime, now: NaiveDateTime) -> u8 {
    let today = instant.date() == now.date();
    let overdue = instant < now && !today;
    if overdue {
        0
    } else if today {
        1
    } else {
        2
    }
}

fn created_millis(task: &Task) -> i64 {
    chrono::DateTime::parse_from_rfc3339(&task.created_at)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Display order for a fixed `now`:
/// incomplete before completed; among pairs where both due dates parse,
/// overdue before today before upcoming, then earlier due instant, then
/// lexical due time; everything still tied (including dated vs undated
/// pairs) falls back to most recently created first.
///
/// This is a pairwise relation, not a total order: a dated and an undated
/// task compare by creation time alone, which can form cycles with the
/// category keys across a collection. Use [`sort`], which accepts that;
/// `slice::sort_by` panics on comparators that break its total-order
/// contract.
pub fn compare(a: &Task, b: &Task, now: NaiveDateTime) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| match (due_instant(a), due_instant(b)) {
            (Some(ia), Some(ib)) => category_rank(ia, now)
                .cmp(&category_rank(ib, now))
                .then(ia.cmp(&ib))
                .then_with(|| match (well_formed_time(a), well_formed_time(b)) {
                    (Some(ta), Some(tb)) => ta.cmp(tb),
                    _ => Ordering::Equal,
                }),
            _ => Ordering::Equal,
        })
        .then_with(|| created_millis(b).cmp(&created_millis(a)))
}

fn well_formed_time(task: &Task) -> Option<&str> {
    let raw = task.due_time.as_deref()?;
    parse_due_time(raw)?;
    Some(raw)
}

/// Stable sort by [`compare`] against a single `now` snapshot.
///
/// Binary insertion rather than `slice::sort_by`: [`compare`] has no total
/// order across dated and undated tasks, and the standard sort panics when
/// it detects that. Inserting each task at its binary-search position keeps
/// the sort stable and deterministic for any input.
pub fn sort(tasks: &mut [Task], now: NaiveDateTime) {
    for unsorted in 1..tasks.len() {
        let mut left = 0;
        let mut right = unsorted;
        while left < right {
            let mid = left + (right - left) / 2;
            if compare(&tasks[unsorted], &tasks[mid], now) == Ordering::Less {
                right = mid;
            } else {
                left = mid + 1;
            }
        }
        tasks[left..=unsorted].rotate_right(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskId;

    fn task(id: i64, date: Option<&str>, time: Option<&str>, completed: bool, created: &str) -> Task {
        Task {
            id: TaskId::Int(id),
            text: format!("task {}", id),
            due_date: date.map(str::to_string),
            due_time: time.map(str::to_string),
            completed,
            created_at: created.to_string(),
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn due_today_is_calendar_day_equality() {
        let now = noon(2024, 3, 15);
        let morning = task(1, Some("2024-03-15"), Some("08:00"), false, "2024-03-01T09:00:00Z");
        let evening = task(2, Some("2024-03-15"), Some("23:00"), false, "2024-03-01T09:00:00Z");
        let tomorrow = task(3, Some("2024-03-16"), None, false, "2024-03-01T09:00:00Z");
        assert!(is_due_today(&morning, now));
        assert!(is_due_today(&evening, now));
        assert!(!is_due_today(&tomorrow, now));
    }

    #[test]
    fn today_is_never_overdue_even_past_its_time() {
        let now = noon(2024, 3, 15);
        let past_time = task(1, Some("2024-03-15"), Some("08:00"), false, "2024-03-01T09:00:00Z");
        assert!(!is_overdue(&past_time, now));
        assert_eq!(status(&past_time, now), DueStatus::Today);
    }

    #[test]
    fn past_day_is_overdue_future_day_is_not() {
        let now = noon(2024, 3, 15);
        let yesterday = task(1, Some("2024-03-14"), None, false, "2024-03-01T09:00:00Z");
        let tomorrow = task(2, Some("2024-03-16"), None, false, "2024-03-01T09:00:00Z");
        assert!(is_overdue(&yesterday, now));
        assert!(!is_overdue(&tomorrow, now));
        assert_eq!(status(&yesterday, now), DueStatus::Overdue);
        assert_eq!(status(&tomorrow, now), DueStatus::Upcoming);
    }

    #[test]
    fn undated_task_is_neither_overdue_nor_today() {
        let now = noon(2024, 3, 15);
        let undated = task(1, None, None, false, "2024-03-01T09:00:00Z");
        assert!(!is_overdue(&undated, now));
        assert!(!is_due_today(&undated, now));
        assert_eq!(status(&undated, now), DueStatus::Unscheduled);
    }

    #[test]
    fn malformed_date_is_treated_as_absent() {
        let now = noon(2024, 3, 15);
        let bad = task(1, Some("not-a-date"), Some("09:00"), false, "2024-03-01T09:00:00Z");
        assert_eq!(due_instant(&bad), None);
        assert_eq!(status(&bad, now), DueStatus::Unscheduled);
    }

    #[test]
    fn malformed_time_defaults_to_end_of_day() {
        let now = noon(2024, 3, 15);
        let bad_time = task(1, Some("2024-03-14"), Some("25:99"), false, "2024-03-01T09:00:00Z");
        let expected = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(due_instant(&bad_time), Some(expected));
        assert!(is_overdue(&bad_time, now));
    }

    #[test]
    fn missing_time_defaults_to_end_of_day() {
        let dated = task(1, Some("2024-03-20"), None, false, "2024-03-01T09:00:00Z");
        let expected = NaiveDate::from_ymd_opt(2024, 3, 20)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(due_instant(&dated), Some(expected));
    }

    #[test]
    fn time_without_date_is_ignored() {
        let timed = task(1, None, Some("09:00"), false, "2024-03-01T09:00:00Z");
        assert_eq!(due_instant(&timed), None);
    }

    #[test]
    fn sorts_overdue_then_today_then_upcoming_then_completed() {
        let now = noon(2024, 3, 15);
        let a = task(1, Some("2024-03-14"), None, false, "2024-03-01T09:00:00Z");
        let b = task(2, Some("2024-03-15"), None, false, "2024-03-01T09:00:00Z");
        let c = task(3, Some("2024-03-16"), None, false, "2024-03-01T09:00:00Z");
        let d = task(4, Some("2024-03-14"), None, true, "2024-03-01T09:00:00Z");
        let mut tasks = vec![d.clone(), c.clone(), b.clone(), a.clone()];
        sort(&mut tasks, now);
        let ids: Vec<_> = tasks.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id, d.id]);
    }

    #[test]
    fn same_category_orders_by_earlier_instant() {
        let now = noon(2024, 3, 15);
        let later = task(1, Some("2024-03-16"), Some("18:00"), false, "2024-03-01T09:00:00Z");
        let sooner = task(2, Some("2024-03-16"), Some("09:00"), false, "2024-03-01T09:00:00Z");
        assert_eq!(compare(&sooner, &later, now), Ordering::Less);
        assert_eq!(compare(&later, &sooner, now), Ordering::Greater);
    }

    #[test]
    fn identical_due_date_and_time_order_by_newest_created_first() {
        let now = noon(2024, 3, 15);
        let older = task(1, Some("2024-01-01"), Some("09:00"), false, "2023-12-01T09:00:00Z");
        let newer = task(2, Some("2024-01-01"), Some("09:00"), false, "2023-12-20T09:00:00Z");
        assert_eq!(compare(&newer, &older, now), Ordering::Less);
    }

    #[test]
    fn dated_and_undated_pair_falls_back_to_newest_created_first() {
        let now = noon(2024, 3, 15);
        let dated = task(1, Some("2024-03-16"), None, false, "2024-03-01T09:00:00Z");
        let undated = task(2, None, None, false, "2024-03-10T09:00:00Z");
        assert_eq!(compare(&undated, &dated, now), Ordering::Less);
    }

    #[test]
    fn sort_tolerates_comparison_cycles_between_dated_and_undated_tasks() {
        let now = noon(2024, 3, 15);
        let overdue_oldest = task(1, Some("2024-03-10"), None, false, "2024-03-01T09:00:00Z");
        let undated_middle = task(2, None, None, false, "2024-03-05T09:00:00Z");
        let upcoming_newest = task(3, Some("2024-03-20"), None, false, "2024-03-09T09:00:00Z");

        // Pairwise these three form a cycle: the undated task beats the
        // overdue one on creation time, the overdue one beats the upcoming
        // on category, and the upcoming beats the undated on creation time.
        assert_eq!(compare(&undated_middle, &overdue_oldest, now), Ordering::Less);
        assert_eq!(compare(&overdue_oldest, &upcoming_newest, now), Ordering::Less);
        assert_eq!(compare(&upcoming_newest, &undated_middle, now), Ordering::Less);

        let base = [overdue_oldest, undated_middle, upcoming_newest];
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in orders {
            let mut tasks: Vec<Task> = order.iter().map(|&i| base[i].clone()).collect();
            sort(&mut tasks, now);
            assert_eq!(tasks.len(), 3);
            for pair in tasks.windows(2) {
                assert_ne!(
                    compare(&pair[0], &pair[1], now),
                    Ordering::Greater,
                    "inversion after sorting order {:?}",
                    order
                );
            }
        }
    }

    #[test]
    fn sort_of_shuffled_mixed_lists_never_inverts_adjacent_pairs() {
        fn mixed_tasks() -> Vec<Task> {
            let dates = [
                Some("2024-03-10"),
                Some("2024-03-14"),
                Some("2024-03-15"),
                Some("2024-03-16"),
                Some("2024-03-20"),
                Some("not-a-date"),
                None,
            ];
            (0..36)
                .map(|i| {
                    let time = match i % 4 {
                        0 => Some("09:00"),
                        1 => Some("18:30"),
                        _ => None,
                    };
                    task(
                        i,
                        dates[i as usize % dates.len()],
                        time,
                        i % 5 == 0,
                        &format!("2024-03-01T{:02}:{:02}:00Z", i / 6, (i % 6) * 10),
                    )
                })
                .collect()
        }

        // Fisher-Yates with a fixed multiplicative generator so a failing
        // seed reproduces exactly.
        fn shuffle(tasks: &mut [Task], seed: u64) {
            let mut state = seed;
            for i in (1..tasks.len()).rev() {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let j = (state >> 33) as usize % (i + 1);
                tasks.swap(i, j);
            }
        }

        let now = noon(2024, 3, 15);
        for seed in 1..=8 {
            let mut tasks = mixed_tasks();
            shuffle(&mut tasks, seed);
            sort(&mut tasks, now);

            let mut ids: Vec<_> = tasks.iter().filter_map(|t| t.id.as_int()).collect();
            ids.sort_unstable();
            assert_eq!(ids, (0..36).collect::<Vec<i64>>(), "seed {}", seed);

            if let Some(first_done) = tasks.iter().position(|t| t.completed) {
                assert!(
                    tasks[first_done..].iter().all(|t| t.completed),
                    "incomplete task after a completed one, seed {}",
                    seed
                );
            }
            for pair in tasks.windows(2) {
                assert_ne!(
                    compare(&pair[0], &pair[1], now),
                    Ordering::Greater,
                    "adjacent inversion, seed {}",
                    seed
                );
            }
        }
    }

    #[test]
    fn completed_sorts_last_regardless_of_due_date() {
        let now = noon(2024, 3, 15);
        let done_overdue = task(1, Some("2024-03-01"), None, true, "2024-03-01T09:00:00Z");
        let open_undated = task(2, None, None, false, "2024-03-01T09:00:00Z");
        assert_eq!(compare(&open_undated, &done_overdue, now), Ordering::Less);
    }

    #[test]
    fn unparseable_created_at_sorts_as_oldest() {
        let now = noon(2024, 3, 15);
        let bad = task(1, None, None, false, "whenever");
        let good = task(2, None, None, false, "2024-03-01T09:00:00Z");
        assert_eq!(compare(&good, &bad, now), Ordering::Less);
    }
}
