//! Plain-text renderings of entries and summaries for the terminal.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use clap::ValueEnum;
use serde_json::Value;

use crate::domain::analysis::{DailySummary, TeamInsight};
use crate::domain::work::{WorkEntry, WorkItemDraft, WorkStatus};
use crate::workflow::record::RecordOutcome;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EntryView {
    #[default]
    List,
    Kanban,
    Timeline,
}

pub fn render_entries(entries: &[WorkEntry], view: EntryView) -> String {
    if entries.is_empty() {
        return "No work entries.\n".to_string();
    }
    match view {
        EntryView::List => render_list(entries),
        EntryView::Kanban => render_kanban(entries),
        EntryView::Timeline => render_timeline(entries),
    }
}

fn status_marker(status: WorkStatus) -> &'static str {
    match status {
        WorkStatus::NotStarted => "[ ]",
        WorkStatus::InProgress => "[~]",
        WorkStatus::Completed => "[x]",
        WorkStatus::Blocked => "[!]",
        WorkStatus::Cancelled => "[-]",
    }
}

fn entry_line(entry: &WorkEntry) -> String {
    let mut line = format!(
        "{} {} ({}, {})",
        status_marker(entry.status),
        entry.title,
        entry.priority.as_str(),
        entry.category.as_str()
    );
    if !entry.tags.is_empty() {
        let _ = write!(line, " #{}", entry.tags.join(" #"));
    }
    let _ = write!(line, "  [{}]", entry.id);
    line
}

fn render_list(entries: &[WorkEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let _ = writeln!(out, "{}", entry_line(entry));
    }
    out
}

fn render_kanban(entries: &[WorkEntry]) -> String {
    let mut columns = vec![
        WorkStatus::NotStarted,
        WorkStatus::InProgress,
        WorkStatus::Blocked,
        WorkStatus::Completed,
    ];
    if entries.iter().any(|e| e.status == WorkStatus::Cancelled) {
        columns.push(WorkStatus::Cancelled);
    }

    let mut out = String::new();
    for status in columns {
        let in_column: Vec<_> = entries.iter().filter(|e| e.status == status).collect();
        let _ = writeln!(out, "== {} ({})", status.as_str(), in_column.len());
        for entry in in_column {
            let _ = writeln!(
                out,
                "   {} ({})  [{}]",
                entry.title,
                entry.priority.as_str(),
                entry.id
            );
        }
    }
    out
}

fn render_timeline(entries: &[WorkEntry]) -> String {
    let mut days: BTreeMap<Option<NaiveDate>, Vec<(Option<NaiveDateTime>, &WorkEntry)>> =
        BTreeMap::new();
    for entry in entries {
        let created = parse_timestamp(&entry.created_at);
        days.entry(created.map(|ts| ts.date()))
            .or_default()
            .push((created, entry));
    }

    let mut out = String::new();
    // newest day first; entries without a readable timestamp go last
    for (day, mut items) in days.into_iter().rev() {
        items.sort_by_key(|(created, _)| *created);
        match day {
            Some(day) => {
                let _ = writeln!(out, "{}", day.format("%Y-%m-%d (%a)"));
            }
            None => {
                let _ = writeln!(out, "undated");
            }
        }
        for (created, entry) in items {
            let time = created
                .map(|ts| ts.format("%H:%M").to_string())
                .unwrap_or_else(|| "--:--".to_string());
            let _ = writeln!(out, "  {time}  {}", entry_line(entry));
        }
    }
    out
}

/// Server timestamps come with or without an offset.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

pub fn render_entry_detail(entry: &WorkEntry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", entry.title);
    let _ = writeln!(out, "  id:        {}", entry.id);
    let _ = writeln!(out, "  status:    {}", entry.status.as_str());
    let _ = writeln!(out, "  priority:  {}", entry.priority.as_str());
    let _ = writeln!(out, "  category:  {}", entry.category.as_str());
    if !entry.tags.is_empty() {
        let _ = writeln!(out, "  tags:      {}", entry.tags.join(", "));
    }
    if let Some(hours) = entry.estimated_hours {
        let _ = writeln!(out, "  estimate:  {hours}h");
    }
    if let Some(hours) = entry.actual_hours {
        let _ = writeln!(out, "  actual:    {hours}h");
    }
    if let Some(project) = &entry.project {
        let _ = writeln!(out, "  project:   {project}");
    }
    if !entry.blockers.is_empty() {
        let _ = writeln!(out, "  blockers:  {}", entry.blockers.join("; "));
    }
    if !entry.dependencies.is_empty() {
        let _ = writeln!(out, "  depends:   {}", entry.dependencies.join(", "));
    }
    let _ = writeln!(out, "  created:   {}", entry.created_at);
    if !entry.description.is_empty() {
        let _ = writeln!(out, "\n{}", entry.description);
    }
    if let Some(summary) = &entry.agent_summary {
        let _ = writeln!(out, "\nsummary: {summary}");
    }
    out
}

pub fn render_drafts(drafts: &[WorkItemDraft]) -> String {
    if drafts.is_empty() {
        return "No work items found in the text.\n".to_string();
    }
    let mut out = String::new();
    for (index, draft) in drafts.iter().enumerate() {
        let _ = write!(out, "{:>2}. {}", index + 1, draft.display_title());
        let fields: Vec<String> = [
            draft.status.as_ref().map(|v| format!("status={}", plain(v))),
            draft.priority.as_ref().map(|v| format!("priority={}", plain(v))),
            draft.category.as_ref().map(|v| format!("category={}", plain(v))),
            draft.estimated_hours.as_ref().map(|v| format!("hours={}", plain(v))),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !fields.is_empty() {
            let _ = write!(out, "  ({})", fields.join(", "));
        }
        match &draft.tags {
            Some(Value::Array(tags)) if !tags.is_empty() => {
                let tags: Vec<String> = tags.iter().map(plain).collect();
                let _ = write!(out, " #{}", tags.join(" #"));
            }
            Some(Value::Array(_)) | Some(Value::Null) | None => {}
            Some(other) => {
                let _ = write!(out, " tags={}", plain(other));
            }
        }
        out.push('\n');
    }
    out
}

/// Draft fields are shown as the model wrote them; strings without quotes.
fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub fn render_outcome(outcome: &RecordOutcome) -> String {
    let mut out = format!("Recorded {} work item(s).\n", outcome.created.len());
    for entry in &outcome.created {
        let _ = writeln!(out, "  {}", entry_line(entry));
    }
    if !outcome.rejected.is_empty() {
        let _ = writeln!(out, "Skipped {} item(s):", outcome.rejected.len());
        for rejected in &outcome.rejected {
            let _ = writeln!(
                out,
                "  {}. {}: {}",
                rejected.position, rejected.title, rejected.error
            );
        }
    }
    out
}

pub fn render_daily_summary(summary: &DailySummary) -> String {
    let stats = &summary.statistics;
    let mut out = String::new();
    let _ = writeln!(out, "{} - {}", summary.team, summary.date);
    let _ = writeln!(
        out,
        "  items {}  completed {}  in progress {}  blocked {}  cancelled {}",
        stats.total_work_items,
        stats.completed_items,
        stats.in_progress_items,
        stats.blocked_items,
        stats.cancelled_items
    );
    let _ = writeln!(
        out,
        "  active members {}  hours logged {}",
        stats.active_members, stats.total_hours_logged
    );

    if !summary.members_summary.is_empty() {
        let _ = writeln!(out, "\nMembers");
        for (member, item) in &summary.members_summary {
            let _ = writeln!(
                out,
                "  {member}: {}/{} done, {}h, {} ({})",
                item.completed, item.work_items, item.hours, item.status, item.workload_level
            );
        }
    }
    if !summary.key_achievements.is_empty() {
        let _ = writeln!(out, "\nAchievements");
        for achievement in &summary.key_achievements {
            let _ = writeln!(
                out,
                "  {}: {} ({})",
                achievement.member, achievement.achievement, achievement.impact
            );
        }
    }
    if !summary.detected_conflicts.is_empty() {
        let _ = writeln!(out, "\nConflicts");
        for conflict in &summary.detected_conflicts {
            let _ = writeln!(
                out,
                "  [{}] {} ({}): {}",
                conflict.severity,
                conflict.kind,
                conflict.members.join(", "),
                conflict.description
            );
            if !conflict.suggestion.is_empty() {
                let _ = writeln!(out, "      -> {}", conflict.suggestion);
            }
        }
    }
    if !summary.dependencies.is_empty() {
        let _ = writeln!(out, "\nDependencies");
        for dependency in &summary.dependencies {
            let _ = writeln!(
                out,
                "  {} ({}) waits on {} ({})",
                dependency.blocked_work_id,
                dependency.blocked_member,
                dependency.depends_on_work_id,
                dependency.depends_on_member
            );
        }
    }
    if !summary.resource_warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings");
        for warning in &summary.resource_warnings {
            let who = warning.member.as_deref().unwrap_or("team");
            let _ = writeln!(out, "  {} ({who}): {}", warning.kind, warning.suggestion);
        }
    }
    if let Some(report) = summary.standup_report.as_deref().filter(|r| !r.is_empty()) {
        let _ = writeln!(out, "\nStandup\n{report}");
    }
    out
}

pub fn render_team_insight(insight: &TeamInsight) -> String {
    let mut out = format!("{}\nmomentum: {}\n", insight.summary, insight.momentum.as_str());
    let sections = [
        ("Key progress", &insight.key_progress),
        ("Blockers", &insight.blockers),
        ("Next actions", &insight.next_actions),
        ("Risks", &insight.risks),
    ];
    for (heading, items) in sections {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{heading}");
        for item in items {
            let _ = writeln!(out, "  - {item}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::entry;

    fn sample() -> Vec<WorkEntry> {
        let mut a = entry("w-1", "Login fix");
        a.status = WorkStatus::Completed;
        a.created_at = "2025-01-15T09:30:00".to_string();
        let mut b = entry("w-2", "Payments");
        b.status = WorkStatus::InProgress;
        b.tags = vec!["pg".to_string()];
        b.created_at = "2025-01-16T14:05:00+09:00".to_string();
        let mut c = entry("w-3", "Old spike");
        c.created_at = "2025-01-15T08:00:00".to_string();
        vec![a, b, c]
    }

    #[test]
    fn list_shows_markers_and_tags() {
        let out = render_entries(&sample(), EntryView::List);
        assert!(out.contains("[x] Login fix (medium, development)  [w-1]"));
        assert!(out.contains("[~] Payments (medium, development) #pg  [w-2]"));
    }

    #[test]
    fn kanban_groups_by_status_and_hides_empty_cancelled() {
        let out = render_entries(&sample(), EntryView::Kanban);
        assert!(out.contains("== not_started (1)"));
        assert!(out.contains("== in_progress (1)"));
        assert!(out.contains("== blocked (0)"));
        assert!(out.contains("== completed (1)"));
        assert!(!out.contains("cancelled"));

        let mut entries = sample();
        entries[2].status = WorkStatus::Cancelled;
        assert!(render_entries(&entries, EntryView::Kanban).contains("== cancelled (1)"));
    }

    #[test]
    fn timeline_orders_days_newest_first_and_times_ascending() {
        let out = render_entries(&sample(), EntryView::Timeline);
        let day16 = out.find("2025-01-16").unwrap();
        let day15 = out.find("2025-01-15").unwrap();
        assert!(day16 < day15);

        let spike = out.find("08:00").unwrap();
        let login = out.find("09:30").unwrap();
        assert!(day15 < spike && spike < login);
        assert!(out.contains("14:05"));
    }

    #[test]
    fn timeline_keeps_undated_entries() {
        let mut entries = sample();
        entries[0].created_at = "yesterday".to_string();
        let out = render_entries(&entries, EntryView::Timeline);
        assert!(out.trim_end().ends_with("[w-1]"));
        assert!(out.contains("undated"));
        assert!(out.contains("--:--"));
    }

    #[test]
    fn parses_timestamps_with_and_without_offset() {
        assert!(parse_timestamp("2025-01-15T09:30:00.123456").is_some());
        assert!(parse_timestamp("2025-01-15T09:30:00Z").is_some());
        assert!(parse_timestamp("2025-01-15 09:30:00").is_some());
        assert!(parse_timestamp("15/01/2025").is_none());
    }

    #[test]
    fn drafts_show_only_present_fields() {
        let drafts = vec![WorkItemDraft {
            title: Some("결제 연동".into()),
            status: Some("in_progress".into()),
            ..WorkItemDraft::default()
        }];
        assert_eq!(render_drafts(&drafts), " 1. 결제 연동  (status=in_progress)\n");

        let odd = vec![WorkItemDraft {
            title: Some("Payments".into()),
            estimated_hours: Some("3".into()),
            tags: Some(vec!["pg", "backend"].into()),
            ..WorkItemDraft::default()
        }];
        assert_eq!(render_drafts(&odd), " 1. Payments  (hours=3) #pg #backend\n");
        assert_eq!(render_drafts(&[]), "No work items found in the text.\n");
    }
}
