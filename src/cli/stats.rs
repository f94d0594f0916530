//! daybook stats command implementations.

use crate::achievements::{self, MonthActivity};
use crate::cli::{today, Context};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::stats;
use crate::store::TaskStore;

#[derive(serde::Serialize)]
struct AchievementsOutput {
    activity: MonthActivity,
    unlocked: usize,
    achievements: Vec<achievements::Achievement>,
}

pub(crate) async fn run_summary(ctx: &mut Context, yearly: bool) -> Result<()> {
    let tasks = ctx.store().query_all().await?;
    let summary = stats::summarize(&tasks, today(), yearly);

    let mut human = HumanOutput::new(if yearly {
        "Completion by year"
    } else {
        "Completion by month"
    });
    human.push_summary("Tasks", summary.total.to_string());
    human.push_summary("Completed", summary.completed.to_string());
    human.push_summary("Rate", format!("{:.1}%", summary.rate));
    human.push_summary("Streak", format!("{} days", summary.streak));
    for period in &summary.periods {
        human.push_detail(format!(
            "{}: {}/{} ({:.1}%)",
            period.label, period.completed, period.total, period.rate
        ));
    }
    for (category, share) in &summary.categories {
        human.push_detail(format!("{category}: {share:.1}% of completed"));
    }
    if summary.total == 0 {
        human.push_next_step("daybook task add <title>");
    }

    emit_success(ctx.output(), "stats", &summary, Some(&human))
}

pub(crate) async fn run_achievements(ctx: &mut Context) -> Result<()> {
    let tasks = ctx.store().query_all().await?;
    let today = today();
    let activity = MonthActivity::measure(&tasks, today);
    let achievements = achievements::evaluate(&tasks, today);
    let unlocked = achievements.iter().filter(|a| a.unlocked).count();

    let mut human = HumanOutput::new("Achievements");
    human.push_summary("Unlocked", format!("{unlocked}/{}", achievements.len()));
    for achievement in &achievements {
        let mark = if achievement.unlocked { "[x]" } else { "[ ]" };
        human.push_detail(format!(
            "{mark} {}: {}",
            achievement.title, achievement.description
        ));
    }

    let output = AchievementsOutput {
        activity,
        unlocked,
        achievements,
    };
    emit_success(ctx.output(), "stats achievements", &output, Some(&human))
}
