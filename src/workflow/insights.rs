use serde::Serialize;
use tracing::debug;

use crate::context::AppContext;
use crate::credentials::CredentialChain;
use crate::domain::analysis::{DailySummary, SummaryStatistics, TeamInsight};
use crate::domain::work::{WorkCategory, WorkEntry, WorkPriority, WorkStatus};
use crate::error::{AppError, AppResult};
use crate::services::CompletionRequest;
use crate::workflow::reply::{decode_json, require_content};

const INSIGHTS_TEMPERATURE: f32 = 0.3;
const INSIGHTS_SYSTEM_PROMPT: &str = "You are an expert project manager analyzing team work \
progress. Provide concise, actionable insights in the language of the work items. Always respond \
with valid JSON only.";

#[derive(Serialize)]
struct EntryDigest<'a> {
    title: &'a str,
    status: WorkStatus,
    priority: WorkPriority,
    category: WorkCategory,
    tags: &'a [String],
    blockers: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

/// Asks the model for a short reading of the team's state. `None` when there is nothing to read.
pub async fn generate_team_insights(
    ctx: &AppContext,
    credentials: &CredentialChain,
    entries: &[WorkEntry],
    summary: Option<&DailySummary>,
) -> AppResult<Option<TeamInsight>> {
    if entries.is_empty() {
        return Ok(None);
    }

    let credential = credentials.require()?;
    let request = CompletionRequest {
        model: ctx.config.insights_model.clone(),
        system: INSIGHTS_SYSTEM_PROMPT.to_string(),
        user: build_insights_prompt(entries, summary)?,
        temperature: INSIGHTS_TEMPERATURE,
    };

    debug!(entries = entries.len(), "requesting team insights");
    let content = ctx
        .language_model
        .complete(&credential.key, &request)
        .await?;
    let content = require_content(content)?;
    decode_json(&content).map(Some)
}

fn build_insights_prompt(entries: &[WorkEntry], summary: Option<&DailySummary>) -> AppResult<String> {
    let digest: Vec<EntryDigest<'_>> = entries
        .iter()
        .map(|entry| EntryDigest {
            title: &entry.title,
            status: entry.status,
            priority: entry.priority,
            category: entry.category,
            tags: &entry.tags,
            blockers: &entry.blockers,
            username: entry.username.as_deref(),
        })
        .collect();
    let work_data = serde_json::to_string_pretty(&digest)
        .map_err(|err| AppError::LanguageModel(format!("failed to encode work data: {err}")))?;

    let stats = summary
        .map(|summary| summary.statistics.clone())
        .unwrap_or_else(|| count_statistics(entries));

    Ok(format!(
        "Below is the current work data of a team. Give concise, practical insights.

Work data:
{work_data}

Statistics:
- total items: {total}
- completed: {completed}
- in progress: {in_progress}
- blocked: {blocked}

Respond with a JSON object in exactly this shape:
{{
  \"summary\": \"two or three sentences on the team's overall progress\",
  \"keyProgress\": [\"important completed or ongoing work\"],
  \"blockers\": [\"current blocking factors, if any\"],
  \"nextActions\": [\"what to focus on next, considering priority and dependencies\"],
  \"risks\": [\"deadlines, blockers or unhandled high-priority work\"],
  \"momentum\": \"high|medium|low\"
}}

Respond with valid JSON only.",
        total = stats.total_work_items,
        completed = stats.completed_items,
        in_progress = stats.in_progress_items,
        blocked = stats.blocked_items,
    ))
}

fn count_statistics(entries: &[WorkEntry]) -> SummaryStatistics {
    let count = |status: WorkStatus| entries.iter().filter(|e| e.status == status).count() as u32;
    SummaryStatistics {
        total_work_items: entries.len() as u32,
        completed_items: count(WorkStatus::Completed),
        in_progress_items: count(WorkStatus::InProgress),
        blocked_items: count(WorkStatus::Blocked),
        cancelled_items: count(WorkStatus::Cancelled),
        ..SummaryStatistics::default()
    }
}
