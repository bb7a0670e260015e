//! Iteration (sprint) creation.

use super::MaintenanceError;
use crate::shortcut::Workspace;
use crate::templates::TemplateRenderer;
use crate::types::{NewIteration, TargetItem};
use chrono::{Days, NaiveDate};
use tracing::info;

/// A run of equally spaced iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationPlan {
    /// Start of the first iteration.
    pub start: NaiveDate,

    /// Length of each iteration in days.
    pub duration_days: u32,

    /// Days between the starts of consecutive iterations.
    pub period_days: u32,

    /// Number of iterations.
    pub count: u32,

    /// Team (group) mention name.
    pub team_slug: Option<String>,
}

impl IterationPlan {
    pub const DEFAULT_DURATION_DAYS: u32 = 10;
    pub const DEFAULT_PERIOD_DAYS: u32 = 14;

    /// Checks `period > duration > 0`.
    ///
    /// # Errors
    ///
    /// Returns [`MaintenanceError::InvalidPlan`] otherwise.
    pub fn validate(&self) -> Result<(), MaintenanceError> {
        if self.duration_days == 0 || self.period_days <= self.duration_days {
            return Err(MaintenanceError::InvalidPlan {
                duration: self.duration_days,
                period: self.period_days,
            });
        }
        Ok(())
    }

    /// Start and end dates of every iteration in the plan.
    ///
    /// # Errors
    ///
    /// Returns [`MaintenanceError::DateOutOfRange`] if a date overflows the calendar.
    pub fn windows(&self) -> Result<Vec<(NaiveDate, NaiveDate)>, MaintenanceError> {
        (0..self.count)
            .map(|i| {
                let offset = u64::from(i) * u64::from(self.period_days);
                let start = self
                    .start
                    .checked_add_days(Days::new(offset))
                    .ok_or(MaintenanceError::DateOutOfRange)?;
                let end = start
                    .checked_add_days(Days::new(u64::from(self.duration_days)))
                    .ok_or(MaintenanceError::DateOutOfRange)?;
                Ok((start, end))
            })
            .collect()
    }
}

/// Creates the iterations of `plan`, named with `name_format`.
///
/// In dry-run mode the iterations are logged and none are created.
///
/// # Errors
///
/// Returns [`MaintenanceError`] if the plan is invalid, a name cannot be
/// rendered, or the workspace rejects an iteration.
pub async fn create_iterations(
    workspace: &dyn Workspace,
    renderer: &TemplateRenderer,
    name_format: &str,
    plan: &IterationPlan,
    dry_run: bool,
) -> Result<Vec<TargetItem>, MaintenanceError> {
    plan.validate()?;

    let mut created = Vec::new();
    for (index, (start, end)) in (1..).zip(plan.windows()?) {
        let iteration = NewIteration {
            name: renderer.render_iteration_name(name_format, start, end, index)?,
            start_date: start,
            end_date: end,
            team_slug: plan.team_slug.clone(),
        };

        if dry_run {
            info!(name = %iteration.name, "Would create iteration");
            continue;
        }

        let item = workspace.create_iteration(&iteration).await?;
        info!(name = %iteration.name, url = %item.app_url, "Created iteration");
        created.push(item);
    }
    Ok(created)
}
