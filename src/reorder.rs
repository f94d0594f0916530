//! Drag-and-drop reordering of one day's task list.
//!
//! A move removes the task at `from` and reinserts it at `to` in the
//! remaining sequence. It is not a swap: moving index 0 to index 2 in
//! `[a, b, c, d]` yields `[b, c, a, d]`. Every returned task carries its new
//! position as `order`, so the result is always densely numbered from zero.
//!
//! Nothing here touches a store. Callers persist the result through
//! [`crate::controller::TaskListController::reorder`].

use chrono::NaiveDate;

use crate::task::{display_key, Task};

/// Move the task at `from` to `to` and renumber.
///
/// # Panics
///
/// Panics when `from` or `to` is out of bounds. Bounds are the caller's
/// responsibility; the controller checks them before calling in.
pub fn move_task(tasks: &[Task], from: usize, to: usize) -> Vec<Task> {
    let len = tasks.len();
    assert!(from < len, "move source {from} out of bounds for {len} tasks");
    assert!(to < len, "move destination {to} out of bounds for {len} tasks");

    let mut sequence = tasks.to_vec();
    let moved = sequence.remove(from);
    sequence.insert(to, moved);
    renumber(sequence)
}

/// Assign every task its index as `order`.
pub fn renumber(tasks: Vec<Task>) -> Vec<Task> {
    tasks
        .into_iter()
        .enumerate()
        .map(|(index, task)| task.with_order(index as u32))
        .collect()
}

/// True when the orders read exactly `0, 1, .., n-1` in sequence.
pub fn has_dense_order(tasks: &[Task]) -> bool {
    tasks
        .iter()
        .enumerate()
        .all(|(index, task)| task.order as usize == index)
}

/// The tasks due on `date`, in display order.
pub fn day_sequence(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    let mut day: Vec<Task> = tasks
        .iter()
        .filter(|task| task.scope_date() == date)
        .cloned()
        .collect();
    day.sort_by_key(display_key);
    day
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{NewTask, TaskId};
    use chrono::Utc;

    fn sample(orders: &[u32]) -> Vec<Task> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        orders
            .iter()
            .enumerate()
            .map(|(index, order)| {
                let mut task = NewTask::on_day(format!("Task {}", index + 1), date)
                    .into_task(*order, Utc::now());
                task.id = Some(TaskId(index as i64 + 1));
                task
            })
            .collect()
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.title.as_str()).collect()
    }

    #[test]
    fn move_down_lands_after_skipped_items() {
        let moved = move_task(&sample(&[0, 1, 2, 3]), 0, 2);
        assert_eq!(titles(&moved), ["Task 2", "Task 3", "Task 1", "Task 4"]);
        assert!(has_dense_order(&moved));
    }

    #[test]
    fn move_up() {
        let moved = move_task(&sample(&[0, 1, 2, 3]), 3, 1);
        assert_eq!(titles(&moved), ["Task 1", "Task 4", "Task 2", "Task 3"]);
    }

    #[test]
    fn sparse_orders_are_compacted() {
        let renumbered = renumber(sample(&[5, 10, 15]));
        let orders: Vec<u32> = renumbered.iter().map(|task| task.order).collect();
        assert_eq!(orders, [0, 1, 2]);
    }

    #[test]
    fn input_is_left_untouched() {
        let original = sample(&[7, 8, 9]);
        let _ = move_task(&original, 2, 0);
        let orders: Vec<u32> = original.iter().map(|task| task.order).collect();
        assert_eq!(orders, [7, 8, 9]);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_panics() {
        let _ = move_task(&sample(&[0, 1]), 0, 2);
    }

    #[test]
    fn day_sequence_filters_and_sorts() {
        let mut tasks = sample(&[2, 0, 1]);
        let other_day = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        tasks.push(NewTask::on_day("Elsewhere", other_day).into_task(0, Utc::now()));

        let day = day_sequence(&tasks, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(titles(&day), ["Task 2", "Task 3", "Task 1"]);
    }
}
