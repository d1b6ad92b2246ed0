use std::fmt::Write as _;

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use crate::context::AppContext;
use crate::credentials::CredentialChain;
use crate::domain::work::EntryFilter;
use crate::error::{AppError, AppResult};
use crate::identity::Session;
use crate::views::{render_daily_summary, render_team_insight};
use crate::workflow::insights::generate_team_insights;

#[derive(Args, Debug, Clone)]
pub struct AnalysisArgs {
    #[arg(short, long, global = true)]
    pub team: Option<String>,
    #[command(subcommand)]
    pub command: AnalysisCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum AnalysisCommand {
    /// Daily team summary.
    Summary {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Standup report for a day.
    Standup {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Detected work conflicts for a day.
    Conflicts {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Workload distribution for a day.
    Workload {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Stored insights over a date range, or a model-written reading with --ai.
    Insights {
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        to: Option<NaiveDate>,
        /// Ask the language model for a reading of your current entries.
        #[arg(long)]
        ai: bool,
    },
    /// Your progress over the last days.
    Progress {
        #[arg(long)]
        days: Option<u32>,
    },
    /// Your report over a date range.
    Report {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
}

/// Lazily built so analysis commands that never call the model need no key store.
pub type CredentialLoader<'a> = &'a dyn Fn() -> AppResult<CredentialChain>;

pub async fn run(
    ctx: &AppContext,
    session: Option<&Session>,
    credentials: CredentialLoader<'_>,
    args: AnalysisArgs,
) -> AppResult<String> {
    let team = ctx.config.team_or(args.team)?;

    match args.command {
        AnalysisCommand::Summary { date } => {
            let summary = ctx.work_api.daily_summary(&team, date).await?;
            Ok(render_daily_summary(&summary))
        }
        AnalysisCommand::Standup { date } => {
            let report = ctx.work_api.standup_report(&team, date).await?;
            Ok(format!("{}\n", report.trim_end()))
        }
        AnalysisCommand::Conflicts { date } => {
            let conflicts = ctx.work_api.conflicts(&team, date).await?;
            if conflicts.is_empty() {
                return Ok("No conflicts detected.\n".to_string());
            }
            pretty(&conflicts)
        }
        AnalysisCommand::Workload { date } => pretty(&ctx.work_api.workload(&team, date).await?),
        AnalysisCommand::Insights { from, to, ai } => {
            if ai {
                let session = require_session(session)?;
                let today = Local::now().date_naive();
                let filter = EntryFilter {
                    start_date: Some(from.unwrap_or(today)),
                    end_date: Some(to.unwrap_or(today)),
                    status: None,
                };
                let entries = ctx
                    .work_api
                    .list_entries(&team, session.username(), &filter)
                    .await?;
                // the summary only sharpens the statistics; the insight works without it
                let summary = ctx.work_api.daily_summary(&team, to).await.ok();
                let chain = credentials()?;
                return match generate_team_insights(ctx, &chain, &entries, summary.as_ref())
                    .await?
                {
                    Some(insight) => Ok(render_team_insight(&insight)),
                    None => Ok("No work entries to analyse.\n".to_string()),
                };
            }

            let (start, end) = date_range(from, to)?;
            let insights = ctx.work_api.insights(&team, start, end).await?;
            if insights.is_empty() {
                return Ok("No insights for this period.\n".to_string());
            }
            let mut out = String::new();
            for insight in &insights {
                let acknowledged = if insight.is_acknowledged { " (ack)" } else { "" };
                let _ = writeln!(
                    out,
                    "[{}] {}: {}{acknowledged}",
                    insight.severity, insight.insight_type, insight.title
                );
                if let Some(description) = &insight.description {
                    let _ = writeln!(out, "    {description}");
                }
            }
            Ok(out)
        }
        AnalysisCommand::Progress { days } => {
            let session = require_session(session)?;
            pretty(&ctx.work_api.progress(&team, session.username(), days).await?)
        }
        AnalysisCommand::Report { from, to } => {
            let session = require_session(session)?;
            let (start, end) = date_range(Some(from), Some(to))?;
            let report = ctx
                .work_api
                .report(&team, session.username(), start, end)
                .await?;
            Ok(format!("{}\n", report.trim_end()))
        }
    }
}

fn require_session(session: Option<&Session>) -> AppResult<&Session> {
    session.ok_or_else(|| {
        AppError::Identity("not logged in; run `worklog login <name>` first".to_string())
    })
}

/// Defaults to the last seven days ending today.
fn date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> AppResult<(NaiveDate, NaiveDate)> {
    let end = to.unwrap_or_else(|| Local::now().date_naive());
    let start = from.unwrap_or(end - chrono::Duration::days(6));
    if start > end {
        return Err(AppError::Configuration(format!(
            "start date {start} is after end date {end}"
        )));
    }
    Ok((start, end))
}

fn pretty<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value)
        .map(|text| text + "\n")
        .map_err(|err| AppError::work_api(format!("failed to format response: {err}")))
}
