use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::analysis::{DailySummary, WorkInsight};
use crate::domain::team::{MemberUpdate, NewMember, NewTeam, Team, TeamMember, TeamUpdate};
use crate::domain::work::{CreateWorkEntryRequest, EntryFilter, UpdateWorkEntryRequest, WorkEntry};
use crate::error::AppResult;

#[async_trait]
pub trait WorkApiService: Send + Sync {
    async fn list_teams(&self) -> AppResult<Vec<Team>>;
    async fn get_team(&self, team: &str) -> AppResult<Team>;
    async fn create_team(&self, team: &NewTeam) -> AppResult<Team>;
    async fn update_team(&self, team: &str, update: &TeamUpdate) -> AppResult<Team>;
    async fn delete_team(&self, team: &str) -> AppResult<()>;

    async fn list_members(&self, team: &str) -> AppResult<Vec<TeamMember>>;
    async fn add_member(&self, team: &str, member: &NewMember) -> AppResult<TeamMember>;
    async fn update_member(
        &self,
        team: &str,
        username: &str,
        update: &MemberUpdate,
    ) -> AppResult<TeamMember>;
    async fn remove_member(&self, team: &str, username: &str) -> AppResult<()>;

    async fn create_entry(&self, request: &CreateWorkEntryRequest) -> AppResult<WorkEntry>;
    async fn list_entries(
        &self,
        team: &str,
        username: &str,
        filter: &EntryFilter,
    ) -> AppResult<Vec<WorkEntry>>;
    async fn entries_for_date(
        &self,
        team: &str,
        username: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<WorkEntry>>;
    async fn update_entry(
        &self,
        team: &str,
        username: &str,
        work_id: &str,
        update: &UpdateWorkEntryRequest,
    ) -> AppResult<WorkEntry>;
    async fn delete_entry(&self, team: &str, username: &str, work_id: &str) -> AppResult<()>;

    async fn daily_summary(&self, team: &str, date: Option<NaiveDate>) -> AppResult<DailySummary>;
    async fn conflicts(&self, team: &str, date: Option<NaiveDate>) -> AppResult<Vec<Value>>;
    async fn workload(&self, team: &str, date: Option<NaiveDate>) -> AppResult<Value>;
    async fn standup_report(&self, team: &str, date: Option<NaiveDate>) -> AppResult<String>;
    async fn insights(
        &self,
        team: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<WorkInsight>>;

    async fn progress(&self, team: &str, username: &str, days: Option<u32>) -> AppResult<Value>;
    async fn report(
        &self,
        team: &str,
        username: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<String>;
}
