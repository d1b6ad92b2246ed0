//! In-memory fakes of the service traits for workflow tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::config::{AppConfig, DEFAULT_EXTRACTION_MODEL, DEFAULT_INSIGHTS_MODEL};
use crate::context::AppContext;
use crate::domain::analysis::{DailySummary, WorkInsight};
use crate::domain::team::{MemberUpdate, NewMember, NewTeam, Team, TeamMember, TeamUpdate};
use crate::domain::work::{CreateWorkEntryRequest, EntryFilter, UpdateWorkEntryRequest, WorkEntry};
use crate::error::{AppError, AppResult};
use crate::services::{CompletionRequest, CompletionService, WorkApiService};

pub fn test_config() -> AppConfig {
    AppConfig {
        api_base_url: "http://work-api.test".to_string(),
        api_token: None,
        default_team: Some("curieus".to_string()),
        openai_base_url: "http://llm.test".to_string(),
        extraction_model: DEFAULT_EXTRACTION_MODEL.to_string(),
        insights_model: DEFAULT_INSIGHTS_MODEL.to_string(),
        storage_path: PathBuf::from("unused.json"),
    }
}

pub fn test_context(work_api: Arc<FakeWorkApi>, language_model: Arc<FakeLanguageModel>) -> AppContext {
    AppContext::new(test_config(), work_api, language_model)
}

pub fn entry(id: &str, title: &str) -> WorkEntry {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "category": "development",
        "status": "not_started",
        "priority": "medium",
        "created_at": "2025-01-15T09:30:00"
    }))
    .expect("valid fixture")
}

/// Stores created entries; titles containing "REJECT" are refused by the "server".
#[derive(Default)]
pub struct FakeWorkApi {
    pub created: Mutex<Vec<CreateWorkEntryRequest>>,
    pub updates: Mutex<Vec<(String, UpdateWorkEntryRequest)>>,
    pub entries: Mutex<Vec<WorkEntry>>,
    pub summary: Mutex<Option<DailySummary>>,
}

impl FakeWorkApi {
    pub fn with_entries(entries: Vec<WorkEntry>) -> Arc<Self> {
        let fake = Self::default();
        *fake.entries.lock().unwrap() = entries;
        Arc::new(fake)
    }
}

fn unsupported<T>() -> AppResult<T> {
    Err(AppError::work_api("not supported by fake"))
}

#[async_trait]
impl WorkApiService for FakeWorkApi {
    async fn list_teams(&self) -> AppResult<Vec<Team>> {
        unsupported()
    }

    async fn get_team(&self, _team: &str) -> AppResult<Team> {
        unsupported()
    }

    async fn create_team(&self, _team: &NewTeam) -> AppResult<Team> {
        unsupported()
    }

    async fn update_team(&self, _team: &str, _update: &TeamUpdate) -> AppResult<Team> {
        unsupported()
    }

    async fn delete_team(&self, _team: &str) -> AppResult<()> {
        unsupported()
    }

    async fn list_members(&self, _team: &str) -> AppResult<Vec<TeamMember>> {
        unsupported()
    }

    async fn add_member(&self, _team: &str, _member: &NewMember) -> AppResult<TeamMember> {
        unsupported()
    }

    async fn update_member(
        &self,
        _team: &str,
        _username: &str,
        _update: &MemberUpdate,
    ) -> AppResult<TeamMember> {
        unsupported()
    }

    async fn remove_member(&self, _team: &str, _username: &str) -> AppResult<()> {
        unsupported()
    }

    async fn create_entry(&self, request: &CreateWorkEntryRequest) -> AppResult<WorkEntry> {
        if request.title.contains("REJECT") {
            return Err(AppError::WorkApi {
                status: Some(422),
                message: "rejected".to_string(),
            });
        }
        let mut created = self.created.lock().unwrap();
        created.push(request.clone());
        let mut entry = entry(&format!("w-{}", created.len()), &request.title);
        entry.status = request.status;
        entry.category = request.category;
        entry.priority = request.priority;
        entry.tags = request.tags.clone();
        Ok(entry)
    }

    async fn list_entries(
        &self,
        _team: &str,
        _username: &str,
        _filter: &EntryFilter,
    ) -> AppResult<Vec<WorkEntry>> {
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn entries_for_date(
        &self,
        _team: &str,
        _username: &str,
        _date: NaiveDate,
    ) -> AppResult<Vec<WorkEntry>> {
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn update_entry(
        &self,
        _team: &str,
        _username: &str,
        work_id: &str,
        update: &UpdateWorkEntryRequest,
    ) -> AppResult<WorkEntry> {
        self.updates
            .lock()
            .unwrap()
            .push((work_id.to_string(), update.clone()));
        let mut updated = entry(work_id, update.title.as_deref().unwrap_or("updated"));
        if let Some(status) = update.status {
            updated.status = status;
        }
        Ok(updated)
    }

    async fn delete_entry(&self, _team: &str, _username: &str, _work_id: &str) -> AppResult<()> {
        unsupported()
    }

    async fn daily_summary(&self, _team: &str, _date: Option<NaiveDate>) -> AppResult<DailySummary> {
        self.summary
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::WorkApi {
                status: Some(404),
                message: "no summary".to_string(),
            })
    }

    async fn conflicts(&self, _team: &str, _date: Option<NaiveDate>) -> AppResult<Vec<Value>> {
        unsupported()
    }

    async fn workload(&self, _team: &str, _date: Option<NaiveDate>) -> AppResult<Value> {
        unsupported()
    }

    async fn standup_report(&self, _team: &str, _date: Option<NaiveDate>) -> AppResult<String> {
        unsupported()
    }

    async fn insights(
        &self,
        _team: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> AppResult<Vec<WorkInsight>> {
        unsupported()
    }

    async fn progress(&self, _team: &str, _username: &str, _days: Option<u32>) -> AppResult<Value> {
        unsupported()
    }

    async fn report(
        &self,
        _team: &str,
        _username: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> AppResult<String> {
        unsupported()
    }
}

/// Answers every completion with a fixed reply and records the keys and requests.
pub struct FakeLanguageModel {
    reply: Option<String>,
    pub api_keys: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeLanguageModel {
    pub fn replying(reply: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.map(str::to_string),
            api_keys: Mutex::new(Vec::new()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionService for FakeLanguageModel {
    async fn complete(
        &self,
        api_key: &SecretString,
        request: &CompletionRequest,
    ) -> AppResult<Option<String>> {
        self.api_keys
            .lock()
            .unwrap()
            .push(api_key.expose_secret().to_string());
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}
