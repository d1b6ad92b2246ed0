use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Server-computed aggregate of one team's work for a single date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    pub team: String,
    pub statistics: SummaryStatistics,
    #[serde(default)]
    pub members_summary: BTreeMap<String, MemberSummary>,
    #[serde(default)]
    pub key_achievements: Vec<Achievement>,
    #[serde(default)]
    pub detected_conflicts: Vec<Conflict>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub blockers: Vec<serde_json::Value>,
    #[serde(default)]
    pub workload_distribution: BTreeMap<String, f64>,
    #[serde(default)]
    pub resource_warnings: Vec<ResourceWarning>,
    #[serde(default)]
    pub standup_report: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    #[serde(default)]
    pub total_work_items: u32,
    #[serde(default)]
    pub completed_items: u32,
    #[serde(default)]
    pub in_progress_items: u32,
    #[serde(default)]
    pub blocked_items: u32,
    #[serde(default)]
    pub cancelled_items: u32,
    #[serde(default)]
    pub active_members: u32,
    #[serde(default)]
    pub total_hours_logged: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub work_items: u32,
    pub completed: u32,
    pub hours: f64,
    pub status: String,
    pub workload_level: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub member: String,
    pub achievement: String,
    pub impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: String,
    #[serde(default)]
    pub members: Vec<String>,
    pub description: String,
    #[serde(default)]
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependency {
    pub blocked_work_id: String,
    pub blocked_member: String,
    pub depends_on_work_id: String,
    pub depends_on_member: String,
    #[serde(default)]
    pub estimated_completion: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceWarning {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub member: Option<String>,
    #[serde(default)]
    pub hours: Option<f64>,
    #[serde(default)]
    pub threshold: Option<f64>,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkInsight {
    #[serde(default)]
    pub id: Option<i64>,
    pub team_id: i64,
    pub insight_type: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub severity: String,
    #[serde(default)]
    pub related_work_ids: Vec<String>,
    #[serde(default)]
    pub is_acknowledged: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Momentum {
    High,
    Medium,
    Low,
}

impl Momentum {
    pub fn as_str(&self) -> &'static str {
        match self {
            Momentum::High => "high",
            Momentum::Medium => "medium",
            Momentum::Low => "low",
        }
    }
}

/// Model-generated reading of a team's current state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamInsight {
    pub summary: String,
    #[serde(default)]
    pub key_progress: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub next_actions: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    pub momentum: Momentum,
}
