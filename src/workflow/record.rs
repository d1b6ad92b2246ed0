use chrono::NaiveDate;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::domain::work::{
    CreateWorkEntryRequest, WorkCategory, WorkEntry, WorkItemDraft, WorkPriority, WorkStatus,
    check_hours, normalize_tags,
};
use crate::error::{AppError, AppResult};
use crate::identity::Session;

/// Manually entered work item.
#[derive(Debug, Clone)]
pub struct QuickEntry {
    pub title: String,
    pub description: String,
    pub category: WorkCategory,
    pub status: WorkStatus,
    pub priority: WorkPriority,
    pub tags: Vec<String>,
    pub estimated_hours: Option<f64>,
    pub project: Option<String>,
    pub work_date: Option<NaiveDate>,
}

#[cfg(test)]
impl QuickEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            category: WorkCategory::Development,
            status: WorkStatus::InProgress,
            priority: WorkPriority::Medium,
            tags: Vec::new(),
            estimated_hours: None,
            project: None,
            work_date: None,
        }
    }
}

pub async fn record_quick(
    ctx: &AppContext,
    session: &Session,
    team: &str,
    entry: QuickEntry,
) -> AppResult<WorkEntry> {
    let title = entry.title.trim();
    if title.is_empty() {
        return Err(AppError::InvalidDraft("title must not be empty".to_string()));
    }
    let estimated_hours = check_hours("estimated_hours", entry.estimated_hours)?;
    let description = entry.description.trim();

    let request = CreateWorkEntryRequest {
        team_name: team.to_string(),
        username: session.username().to_string(),
        title: title.to_string(),
        description: description.to_string(),
        raw_input: format!("{title}\n{description}"),
        category: entry.category,
        status: entry.status,
        priority: entry.priority,
        tags: normalize_tags(entry.tags),
        estimated_hours,
        actual_hours: None,
        project: entry.project,
        dependencies: Vec::new(),
        blockers: Vec::new(),
        work_date: entry.work_date,
    };

    ctx.work_api.create_entry(&request).await
}

#[derive(Debug)]
pub struct RejectedDraft {
    /// 1-based position in the extracted list.
    pub position: usize,
    pub title: String,
    pub error: AppError,
}

#[derive(Debug, Default)]
pub struct RecordOutcome {
    pub created: Vec<WorkEntry>,
    pub rejected: Vec<RejectedDraft>,
}

/// Submits each draft independently; one failing record does not stop the rest.
pub async fn record_drafts(
    ctx: &AppContext,
    session: &Session,
    team: &str,
    raw_text: &str,
    drafts: Vec<WorkItemDraft>,
) -> RecordOutcome {
    let mut outcome = RecordOutcome::default();

    for (index, draft) in drafts.into_iter().enumerate() {
        let position = index + 1;
        let title = draft.display_title().to_string();

        let result = match draft.into_request(team, session.username(), raw_text, WorkCategory::Other)
        {
            Ok(request) => ctx.work_api.create_entry(&request).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(entry) => outcome.created.push(entry),
            Err(error) => {
                warn!(position, %title, %error, "work item was not recorded");
                outcome.rejected.push(RejectedDraft {
                    position,
                    title,
                    error,
                });
            }
        }
    }

    info!(
        created = outcome.created.len(),
        rejected = outcome.rejected.len(),
        "recorded extracted work items"
    );
    outcome
}
