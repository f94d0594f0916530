//! Badges unlocked from the current month's activity.

use chrono::NaiveDate;
use serde::Serialize;

use crate::stats::{completion_rate, consecutive_days, in_month};
use crate::task::{Priority, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    TaskMaster,
    ConsistencyKing,
    HighAchiever,
    ProductiveMonth,
    Perfectionist,
    EarlyStarter,
}

impl Badge {
    pub const ALL: [Badge; 6] = [
        Badge::TaskMaster,
        Badge::ConsistencyKing,
        Badge::HighAchiever,
        Badge::ProductiveMonth,
        Badge::Perfectionist,
        Badge::EarlyStarter,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Badge::TaskMaster => "Task Master",
            Badge::ConsistencyKing => "Consistency King",
            Badge::HighAchiever => "High Achiever",
            Badge::ProductiveMonth => "Productive Month",
            Badge::Perfectionist => "Perfectionist",
            Badge::EarlyStarter => "Early Starter",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Badge::TaskMaster => "Complete 10 tasks this month",
            Badge::ConsistencyKing => "Complete tasks 7 days in a row",
            Badge::HighAchiever => "Complete 5 high priority tasks this month",
            Badge::ProductiveMonth => "Plan 20 tasks this month",
            Badge::Perfectionist => "Reach an 80% completion rate this month",
            Badge::EarlyStarter => "Complete 15 tasks this month",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub badge: Badge,
    pub title: &'static str,
    pub description: &'static str,
    pub unlocked: bool,
}

/// Figures the badges are judged on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthActivity {
    pub planned: usize,
    pub completed: usize,
    pub high_priority_completed: usize,
    pub rate: f32,
    pub streak: usize,
}

impl MonthActivity {
    pub fn measure(tasks: &[Task], today: NaiveDate) -> Self {
        let month: Vec<Task> = in_month(tasks, today).cloned().collect();
        let completed: Vec<&Task> = month.iter().filter(|task| task.completed).collect();
        Self {
            planned: month.len(),
            completed: completed.len(),
            high_priority_completed: completed
                .iter()
                .filter(|task| task.priority == Priority::High)
                .count(),
            rate: completion_rate(&month),
            // streak spans all tasks, not just this month
            streak: consecutive_days(tasks, today),
        }
    }

    pub fn unlocks(&self, badge: Badge) -> bool {
        match badge {
            Badge::TaskMaster => self.completed >= 10,
            Badge::ConsistencyKing => self.streak >= 7,
            Badge::HighAchiever => self.high_priority_completed >= 5,
            Badge::ProductiveMonth => self.planned >= 20,
            Badge::Perfectionist => self.rate >= 80.0,
            Badge::EarlyStarter => self.completed >= 15,
        }
    }
}

pub fn evaluate(tasks: &[Task], today: NaiveDate) -> Vec<Achievement> {
    let activity = MonthActivity::measure(tasks, today);
    Badge::ALL
        .iter()
        .map(|badge| Achievement {
            badge: *badge,
            title: badge.title(),
            description: badge.description(),
            unlocked: activity.unlocks(*badge),
        })
        .collect()
}
