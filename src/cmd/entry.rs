use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::context::AppContext;
use crate::domain::work::{
    EntryFilter, UpdateWorkEntryRequest, WorkCategory, WorkEntry, WorkPriority, WorkStatus,
    check_hours, normalize_tags,
};
use crate::error::{AppError, AppResult};
use crate::identity::Session;
use crate::views::{EntryView, render_entries, render_entry_detail};
use crate::workflow::record::{QuickEntry, record_quick};

#[derive(Args, Debug, Clone)]
pub struct EntryArgs {
    /// Team to act on; defaults to the configured team.
    #[arg(short, long, global = true)]
    pub team: Option<String>,
    #[command(subcommand)]
    pub command: EntryCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum EntryCommand {
    /// Record a work item by hand.
    Add(AddArgs),
    /// List your work items.
    List(ListArgs),
    /// Show one work item in full.
    Show { id: String },
    /// Change fields of a work item.
    Update(UpdateArgs),
    /// Delete a work item.
    Delete { id: String },
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    pub title: String,
    #[arg(short, long, default_value = "")]
    pub description: String,
    #[arg(short, long, value_enum, default_value_t = WorkStatus::InProgress)]
    pub status: WorkStatus,
    #[arg(short, long, value_enum, default_value_t = WorkPriority::Medium)]
    pub priority: WorkPriority,
    #[arg(short, long, value_enum, default_value_t = WorkCategory::Development)]
    pub category: WorkCategory,
    /// Comma-separated labels.
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
    #[arg(long)]
    pub hours: Option<f64>,
    #[arg(long)]
    pub project: Option<String>,
    /// Date the work belongs to (YYYY-MM-DD).
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long, value_enum, default_value_t = EntryView::List)]
    pub view: EntryView,
    #[arg(long)]
    pub from: Option<NaiveDate>,
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Only entries recorded for this date.
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub on: Option<NaiveDate>,
    #[arg(short, long, value_enum)]
    pub status: Option<WorkStatus>,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    #[arg(short, long, value_enum)]
    pub status: Option<WorkStatus>,
    #[arg(short, long, value_enum)]
    pub priority: Option<WorkPriority>,
    #[arg(short, long, value_enum)]
    pub category: Option<WorkCategory>,
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
    #[arg(long)]
    pub hours: Option<f64>,
    #[arg(long)]
    pub actual_hours: Option<f64>,
}

impl UpdateArgs {
    fn into_request(self) -> AppResult<(String, UpdateWorkEntryRequest)> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(AppError::InvalidDraft("title must not be empty".to_string()));
            }
        }
        let update = UpdateWorkEntryRequest {
            title: self.title.map(|title| title.trim().to_string()),
            description: self.description,
            category: self.category,
            status: self.status,
            priority: self.priority,
            tags: self.tags.map(normalize_tags),
            estimated_hours: check_hours("hours", self.hours)?,
            actual_hours: check_hours("actual_hours", self.actual_hours)?,
        };
        if update.is_empty() {
            return Err(AppError::InvalidDraft(
                "nothing to update; pass at least one field".to_string(),
            ));
        }
        Ok((self.id, update))
    }
}

pub async fn run(ctx: &AppContext, session: &Session, args: EntryArgs) -> AppResult<String> {
    let team = ctx.config.team_or(args.team)?;
    let username = session.username();

    match args.command {
        EntryCommand::Add(add) => {
            let entry = record_quick(
                ctx,
                session,
                &team,
                QuickEntry {
                    title: add.title,
                    description: add.description,
                    category: add.category,
                    status: add.status,
                    priority: add.priority,
                    tags: add.tags,
                    estimated_hours: add.hours,
                    project: add.project,
                    work_date: add.date,
                },
            )
            .await?;
            Ok(format!("Recorded: {}\n", render_entry_detail(&entry)))
        }
        EntryCommand::List(list) => {
            let entries = match list.on {
                Some(date) => ctx.work_api.entries_for_date(&team, username, date).await?,
                None => {
                    let filter = EntryFilter {
                        start_date: list.from,
                        end_date: list.to,
                        status: list.status,
                    };
                    ctx.work_api.list_entries(&team, username, &filter).await?
                }
            };
            let entries = filter_status(entries, list.status);
            Ok(render_entries(&entries, list.view))
        }
        EntryCommand::Show { id } => {
            let entries = ctx
                .work_api
                .list_entries(&team, username, &EntryFilter::default())
                .await?;
            let entry = entries
                .into_iter()
                .find(|entry| entry.id == id)
                .ok_or_else(|| AppError::WorkApi {
                    status: Some(404),
                    message: format!("no work entry '{id}' for {username} in {team}"),
                })?;
            Ok(render_entry_detail(&entry))
        }
        EntryCommand::Update(update) => {
            let (id, request) = update.into_request()?;
            let entry = ctx
                .work_api
                .update_entry(&team, username, &id, &request)
                .await?;
            Ok(format!("Updated: {}\n", render_entry_detail(&entry)))
        }
        EntryCommand::Delete { id } => {
            ctx.work_api.delete_entry(&team, username, &id).await?;
            Ok(format!("Deleted work entry {id}.\n"))
        }
    }
}

/// The date endpoint takes no status filter, so it is applied locally too.
fn filter_status(entries: Vec<WorkEntry>, status: Option<WorkStatus>) -> Vec<WorkEntry> {
    match status {
        Some(status) => entries.into_iter().filter(|e| e.status == status).collect(),
        None => entries,
    }
}
