use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum WorkCategory {
    Development,
    Research,
    Meeting,
    Review,
    Documentation,
    Testing,
    Deployment,
    Planning,
    Other,
}

impl WorkCategory {
    pub const ALL: [WorkCategory; 9] = [
        WorkCategory::Development,
        WorkCategory::Research,
        WorkCategory::Meeting,
        WorkCategory::Review,
        WorkCategory::Documentation,
        WorkCategory::Testing,
        WorkCategory::Deployment,
        WorkCategory::Planning,
        WorkCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkCategory::Development => "development",
            WorkCategory::Research => "research",
            WorkCategory::Meeting => "meeting",
            WorkCategory::Review => "review",
            WorkCategory::Documentation => "documentation",
            WorkCategory::Testing => "testing",
            WorkCategory::Deployment => "deployment",
            WorkCategory::Planning => "planning",
            WorkCategory::Other => "other",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|category| category.as_str() == value)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum WorkPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl WorkPriority {
    pub const ALL: [WorkPriority; 4] = [
        WorkPriority::Low,
        WorkPriority::Medium,
        WorkPriority::High,
        WorkPriority::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkPriority::Low => "low",
            WorkPriority::Medium => "medium",
            WorkPriority::High => "high",
            WorkPriority::Urgent => "urgent",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|priority| priority.as_str() == value)
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum WorkStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Blocked,
    Cancelled,
}

impl WorkStatus {
    pub const ALL: [WorkStatus; 5] = [
        WorkStatus::NotStarted,
        WorkStatus::InProgress,
        WorkStatus::Completed,
        WorkStatus::Blocked,
        WorkStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::NotStarted => "not_started",
            WorkStatus::InProgress => "in_progress",
            WorkStatus::Completed => "completed",
            WorkStatus::Blocked => "blocked",
            WorkStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

/// A persisted work entry as returned by the work API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkEntry {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub raw_input: String,
    pub category: WorkCategory,
    pub status: WorkStatus,
    pub priority: WorkPriority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub actual_hours: Option<f64>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub related_work_ids: Vec<String>,
    #[serde(default)]
    pub agent_summary: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateWorkEntryRequest {
    pub team_name: String,
    pub username: String,
    pub title: String,
    pub description: String,
    pub raw_input: String,
    pub category: WorkCategory,
    pub status: WorkStatus,
    pub priority: WorkPriority,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub blockers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_date: Option<NaiveDate>,
}

/// Partial update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateWorkEntryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<WorkCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<WorkPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_hours: Option<f64>,
}

impl UpdateWorkEntryRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Filters for listing a member's entries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkStatus>,
}

/// An unvalidated work item as emitted by text extraction.
///
/// Fields hold exactly the JSON the model produced, whatever its type; typing,
/// defaults and enum checks are applied only when the draft is turned into a
/// [`CreateWorkEntryRequest`], so one odd record never spoils its siblings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkItemDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<Value>,
}

impl WorkItemDraft {
    pub fn display_title(&self) -> &str {
        self.title
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or("<untitled>")
    }

    pub fn into_request(
        self,
        team_name: &str,
        username: &str,
        raw_input: &str,
        default_category: WorkCategory,
    ) -> AppResult<CreateWorkEntryRequest> {
        let title = draft_text(&self.title, "title")?
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| AppError::InvalidDraft("title is missing".to_string()))?
            .to_string();
        let description = draft_text(&self.description, "description")?
            .unwrap_or_default()
            .trim()
            .to_string();

        let category = parse_field(
            draft_text(&self.category, "category")?,
            "category",
            WorkCategory::from_str,
        )?
        .unwrap_or(default_category);
        let priority = parse_field(
            draft_text(&self.priority, "priority")?,
            "priority",
            WorkPriority::from_str,
        )?
        .unwrap_or_default();
        let status = parse_field(
            draft_text(&self.status, "status")?,
            "status",
            WorkStatus::from_str,
        )?
        .unwrap_or_default();

        let tags = draft_tags(&self.tags)?;
        let estimated_hours = check_hours("estimated_hours", draft_hours(&self.estimated_hours)?)?;

        Ok(CreateWorkEntryRequest {
            team_name: team_name.to_string(),
            username: username.to_string(),
            title,
            description,
            raw_input: raw_input.to_string(),
            category,
            status,
            priority,
            tags,
            estimated_hours,
            actual_hours: None,
            project: None,
            dependencies: Vec::new(),
            blockers: Vec::new(),
            work_date: None,
        })
    }
}

/// Hours must be finite and non-negative wherever they are entered.
pub fn check_hours(field: &str, hours: Option<f64>) -> AppResult<Option<f64>> {
    match hours {
        Some(value) if !value.is_finite() || value < 0.0 => Err(AppError::InvalidDraft(format!(
            "{field} must be a non-negative number, got {value}"
        ))),
        hours => Ok(hours),
    }
}

fn draft_text<'a>(value: &'a Option<Value>, field: &str) -> AppResult<Option<&'a str>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.as_str())),
        Some(other) => Err(AppError::InvalidDraft(format!(
            "{field} must be text, got {other}"
        ))),
    }
}

fn draft_hours(value: &Option<Value>) -> AppResult<Option<f64>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64()),
        Some(other) => Err(AppError::InvalidDraft(format!(
            "estimated_hours must be a number, got {other}"
        ))),
    }
}

fn draft_tags(value: &Option<Value>) -> AppResult<Vec<String>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(AppError::InvalidDraft(format!(
                "tags must be a list, got {other}"
            )));
        }
    };
    let tags = items
        .iter()
        .map(|item| match item {
            Value::String(tag) => Ok(tag.clone()),
            other => Err(AppError::InvalidDraft(format!(
                "tags must be text, got {other}"
            ))),
        })
        .collect::<AppResult<Vec<_>>>()?;
    Ok(normalize_tags(tags))
}

fn parse_field<T>(
    value: Option<&str>,
    field: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> AppResult<Option<T>> {
    match value {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse(raw)
            .map(Some)
            .ok_or_else(|| AppError::InvalidDraft(format!("unknown {field} '{raw}'"))),
    }
}

/// Trims labels, drops empty ones and removes duplicates keeping first occurrence.
pub fn normalize_tags(tags: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !result.iter().any(|existing| existing == tag) {
            result.push(tag.to_string());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_enumerations_strictly() {
        assert_eq!(
            WorkCategory::from_str("Documentation"),
            Some(WorkCategory::Documentation)
        );
        assert_eq!(WorkCategory::from_str("chores"), None);
        assert_eq!(WorkPriority::from_str(" URGENT "), Some(WorkPriority::Urgent));
        assert_eq!(WorkStatus::from_str("in_progress"), Some(WorkStatus::InProgress));
        assert_eq!(WorkStatus::from_str("in progress"), None);
    }

    #[test]
    fn serde_rejects_unknown_status() {
        let decoded: Result<WorkStatus, _> = serde_json::from_str("\"done\"");
        assert!(decoded.is_err());
        let decoded: WorkStatus = serde_json::from_str("\"not_started\"").unwrap();
        assert_eq!(decoded, WorkStatus::NotStarted);
    }

    #[test]
    fn draft_defaults_are_applied_at_conversion() {
        let draft = WorkItemDraft {
            title: Some(json!("  로그인 버그 수정 ")),
            ..WorkItemDraft::default()
        };

        let request = draft
            .into_request("curieus", "차성욱", "raw", WorkCategory::Other)
            .unwrap();

        assert_eq!(request.title, "로그인 버그 수정");
        assert_eq!(request.description, "");
        assert_eq!(request.category, WorkCategory::Other);
        assert_eq!(request.priority, WorkPriority::Medium);
        assert_eq!(request.status, WorkStatus::NotStarted);
        assert!(request.tags.is_empty());
        assert_eq!(request.estimated_hours, None);
        assert_eq!(request.raw_input, "raw");
    }

    #[test]
    fn draft_fields_carry_through() {
        let draft = WorkItemDraft {
            title: Some(json!("Payment integration")),
            description: Some(json!("Wire up PG callbacks")),
            category: Some(json!("development")),
            priority: Some(json!("high")),
            status: Some(json!("in_progress")),
            tags: Some(json!(["payments", " backend ", "payments", ""])),
            estimated_hours: Some(json!(3.5)),
        };

        let request = draft
            .into_request("curieus", "alice", "raw", WorkCategory::Other)
            .unwrap();

        assert_eq!(request.category, WorkCategory::Development);
        assert_eq!(request.priority, WorkPriority::High);
        assert_eq!(request.status, WorkStatus::InProgress);
        assert_eq!(request.tags, vec!["payments", "backend"]);
        assert_eq!(request.estimated_hours, Some(3.5));
    }

    #[test]
    fn draft_without_title_is_rejected() {
        let draft = WorkItemDraft {
            title: Some(json!("   ")),
            status: Some(json!("completed")),
            ..WorkItemDraft::default()
        };
        assert!(matches!(
            draft.into_request("t", "u", "raw", WorkCategory::Other),
            Err(AppError::InvalidDraft(_))
        ));
    }

    #[test]
    fn draft_with_unknown_enum_value_is_rejected() {
        let draft = WorkItemDraft {
            title: Some(json!("Deploy")),
            status: Some(json!("done")),
            ..WorkItemDraft::default()
        };
        let error = draft
            .into_request("t", "u", "raw", WorkCategory::Other)
            .unwrap_err();
        assert_eq!(error.to_string(), "invalid work item: unknown status 'done'");
    }

    #[test]
    fn draft_with_negative_hours_is_rejected() {
        let draft = WorkItemDraft {
            title: Some(json!("Deploy")),
            estimated_hours: Some(json!(-1.0)),
            ..WorkItemDraft::default()
        };
        assert!(matches!(
            draft.into_request("t", "u", "raw", WorkCategory::Other),
            Err(AppError::InvalidDraft(_))
        ));
    }

    #[test]
    fn mistyped_draft_fields_are_rejected_per_record() {
        let quoted_hours = WorkItemDraft {
            title: Some(json!("Payments")),
            estimated_hours: Some(json!("3")),
            ..WorkItemDraft::default()
        };
        let error = quoted_hours
            .into_request("t", "u", "raw", WorkCategory::Other)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid work item: estimated_hours must be a number, got \"3\""
        );

        let scalar_tags = WorkItemDraft {
            title: Some(json!("Payments")),
            tags: Some(json!("ops")),
            ..WorkItemDraft::default()
        };
        assert!(matches!(
            scalar_tags.into_request("t", "u", "raw", WorkCategory::Other),
            Err(AppError::InvalidDraft(_))
        ));

        let numeric_title = WorkItemDraft {
            title: Some(json!(42)),
            ..WorkItemDraft::default()
        };
        assert_eq!(numeric_title.display_title(), "<untitled>");
        assert!(matches!(
            numeric_title.into_request("t", "u", "raw", WorkCategory::Other),
            Err(AppError::InvalidDraft(_))
        ));
    }

    #[test]
    fn hours_must_be_finite_and_non_negative() {
        assert_eq!(check_hours("hours", None).unwrap(), None);
        assert_eq!(check_hours("hours", Some(0.0)).unwrap(), Some(0.0));
        assert_eq!(check_hours("hours", Some(2.5)).unwrap(), Some(2.5));
        for bad in [-5.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                check_hours("hours", Some(bad)),
                Err(AppError::InvalidDraft(_))
            ));
        }
    }

    #[test]
    fn create_request_omits_unset_optionals() {
        let request = WorkItemDraft {
            title: Some(json!("Review PR")),
            ..WorkItemDraft::default()
        }
        .into_request("curieus", "alice", "Review PR", WorkCategory::Review)
        .unwrap();

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["category"], "review");
        assert_eq!(value["status"], "not_started");
        assert!(value.get("estimated_hours").is_none());
        assert!(value.get("work_date").is_none());
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(UpdateWorkEntryRequest::default().is_empty());
        let update = UpdateWorkEntryRequest {
            status: Some(WorkStatus::Completed),
            ..UpdateWorkEntryRequest::default()
        };
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"status": "completed"})
        );
    }
}
