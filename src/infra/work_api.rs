use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{
    Client, Method, RequestBuilder, Response, Url,
    header::{ACCEPT, AUTHORIZATION},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::domain::analysis::{DailySummary, WorkInsight};
use crate::domain::team::{MemberUpdate, NewMember, NewTeam, Team, TeamMember, TeamUpdate};
use crate::domain::work::{CreateWorkEntryRequest, EntryFilter, UpdateWorkEntryRequest, WorkEntry};
use crate::error::{AppError, AppResult};
use crate::services::WorkApiService;

const API_PREFIX: [&str; 2] = ["api", "work-management"];

pub struct WorkApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl WorkApiClient {
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token,
        }
    }

    /// Joins path segments under the API prefix, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|err| {
            AppError::Configuration(format!("invalid work API URL '{}': {err}", self.base_url))
        })?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                AppError::Configuration(format!(
                    "work API URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?;
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> AppResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, path = url.path(), "work API request");
        let mut builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        Ok(builder)
    }

    async fn send(builder: RequestBuilder) -> AppResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|err| AppError::work_api(format!("failed to call work API: {err}")))?;

        let status = response.status();
        debug!(status = status.as_u16(), "work API response");
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::WorkApi {
                status: Some(status.as_u16()),
                message: body,
            });
        }
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(builder: RequestBuilder) -> AppResult<T> {
        let response = Self::send(builder).await?;
        response
            .json()
            .await
            .map_err(|err| AppError::work_api(format!("failed to parse work API response: {err}")))
    }

    async fn fetch_text(builder: RequestBuilder) -> AppResult<String> {
        let response = Self::send(builder).await?;
        let body = response
            .text()
            .await
            .map_err(|err| AppError::work_api(format!("failed to read work API response: {err}")))?;
        Ok(decode_text_body(body))
    }
}

/// Text endpoints answer either with a JSON string or with the bare text.
fn decode_text_body(body: String) -> String {
    match serde_json::from_str::<String>(&body) {
        Ok(text) => text,
        Err(_) => body,
    }
}

#[derive(Serialize)]
struct DateQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
}

#[derive(Serialize)]
struct RangeQuery {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

#[derive(Serialize)]
struct DaysQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<u32>,
}

#[async_trait]
impl WorkApiService for WorkApiClient {
    async fn list_teams(&self) -> AppResult<Vec<Team>> {
        Self::fetch(self.request(Method::GET, &["teams"])?).await
    }

    async fn get_team(&self, team: &str) -> AppResult<Team> {
        Self::fetch(self.request(Method::GET, &["teams", team])?).await
    }

    async fn create_team(&self, team: &NewTeam) -> AppResult<Team> {
        if team.name.trim().is_empty() {
            return Err(AppError::work_api("team name must not be empty"));
        }
        Self::fetch(self.request(Method::POST, &["teams"])?.json(team)).await
    }

    async fn update_team(&self, team: &str, update: &TeamUpdate) -> AppResult<Team> {
        Self::fetch(self.request(Method::PUT, &["teams", team])?.json(update)).await
    }

    async fn delete_team(&self, team: &str) -> AppResult<()> {
        Self::send(self.request(Method::DELETE, &["teams", team])?).await?;
        Ok(())
    }

    async fn list_members(&self, team: &str) -> AppResult<Vec<TeamMember>> {
        Self::fetch(self.request(Method::GET, &["teams", team, "members"])?).await
    }

    async fn add_member(&self, team: &str, member: &NewMember) -> AppResult<TeamMember> {
        Self::fetch(
            self.request(Method::POST, &["teams", team, "members"])?
                .json(member),
        )
        .await
    }

    async fn update_member(
        &self,
        team: &str,
        username: &str,
        update: &MemberUpdate,
    ) -> AppResult<TeamMember> {
        Self::fetch(
            self.request(Method::PUT, &["teams", team, "members", username])?
                .json(update),
        )
        .await
    }

    async fn remove_member(&self, team: &str, username: &str) -> AppResult<()> {
        Self::send(self.request(Method::DELETE, &["teams", team, "members", username])?).await?;
        Ok(())
    }

    async fn create_entry(&self, request: &CreateWorkEntryRequest) -> AppResult<WorkEntry> {
        Self::fetch(self.request(Method::POST, &["work-entries"])?.json(request)).await
    }

    async fn list_entries(
        &self,
        team: &str,
        username: &str,
        filter: &EntryFilter,
    ) -> AppResult<Vec<WorkEntry>> {
        Self::fetch(
            self.request(
                Method::GET,
                &["teams", team, "members", username, "work-entries"],
            )?
            .query(filter),
        )
        .await
    }

    async fn entries_for_date(
        &self,
        team: &str,
        username: &str,
        date: NaiveDate,
    ) -> AppResult<Vec<WorkEntry>> {
        let date = date.format("%Y-%m-%d").to_string();
        Self::fetch(self.request(
            Method::GET,
            &["teams", team, "members", username, "work-entries", &date],
        )?)
        .await
    }

    async fn update_entry(
        &self,
        team: &str,
        username: &str,
        work_id: &str,
        update: &UpdateWorkEntryRequest,
    ) -> AppResult<WorkEntry> {
        Self::fetch(
            self.request(
                Method::PUT,
                &["teams", team, "members", username, "work-entries", work_id],
            )?
            .json(update),
        )
        .await
    }

    async fn delete_entry(&self, team: &str, username: &str, work_id: &str) -> AppResult<()> {
        Self::send(self.request(
            Method::DELETE,
            &["teams", team, "members", username, "work-entries", work_id],
        )?)
        .await?;
        Ok(())
    }

    async fn daily_summary(&self, team: &str, date: Option<NaiveDate>) -> AppResult<DailySummary> {
        Self::fetch(
            self.request(Method::GET, &["teams", team, "analysis", "daily"])?
                .query(&DateQuery { date }),
        )
        .await
    }

    async fn conflicts(&self, team: &str, date: Option<NaiveDate>) -> AppResult<Vec<Value>> {
        Self::fetch(
            self.request(Method::GET, &["teams", team, "analysis", "conflicts"])?
                .query(&DateQuery { date }),
        )
        .await
    }

    async fn workload(&self, team: &str, date: Option<NaiveDate>) -> AppResult<Value> {
        Self::fetch(
            self.request(Method::GET, &["teams", team, "analysis", "workload"])?
                .query(&DateQuery { date }),
        )
        .await
    }

    async fn standup_report(&self, team: &str, date: Option<NaiveDate>) -> AppResult<String> {
        Self::fetch_text(
            self.request(Method::GET, &["teams", team, "analysis", "standup"])?
                .query(&DateQuery { date }),
        )
        .await
    }

    async fn insights(
        &self,
        team: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<WorkInsight>> {
        Self::fetch(
            self.request(Method::GET, &["teams", team, "analysis", "insights"])?
                .query(&RangeQuery {
                    start_date: start,
                    end_date: end,
                }),
        )
        .await
    }

    async fn progress(&self, team: &str, username: &str, days: Option<u32>) -> AppResult<Value> {
        Self::fetch(
            self.request(
                Method::GET,
                &["teams", team, "members", username, "progress"],
            )?
            .query(&DaysQuery { days }),
        )
        .await
    }

    async fn report(
        &self,
        team: &str,
        username: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<String> {
        Self::fetch_text(
            self.request(Method::GET, &["teams", team, "members", username, "report"])?
                .query(&RangeQuery {
                    start_date: start,
                    end_date: end,
                }),
        )
        .await
    }
}
