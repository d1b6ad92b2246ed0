use std::sync::Arc;

use tracing::{debug, info};

use crate::credentials::CredentialChain;
use crate::domain::work::{WorkCategory, WorkItemDraft, WorkPriority, WorkStatus};
use crate::error::{AppError, AppResult};
use crate::services::{CompletionRequest, CompletionService};
use crate::workflow::reply::{decode_drafts, require_content};

const EXTRACTION_TEMPERATURE: f32 = 0.1;
const EXTRACTION_SYSTEM_PROMPT: &str = "You are a helpful assistant that converts work descriptions \
into valid JSON arrays. Always respond with only valid JSON, no additional text.";

/// Turns free-form text into work item drafts with one language-model round trip.
pub struct WorkItemExtractor {
    provider: Arc<dyn CompletionService>,
    credentials: CredentialChain,
    model: String,
}

impl WorkItemExtractor {
    pub fn new(
        provider: Arc<dyn CompletionService>,
        credentials: CredentialChain,
        model: String,
    ) -> Self {
        Self {
            provider,
            credentials,
            model,
        }
    }

    pub async fn extract(&self, text: &str) -> AppResult<Vec<WorkItemDraft>> {
        if text.trim().is_empty() {
            return Err(AppError::InvalidDraft("input text is empty".to_string()));
        }

        let credential = self.credentials.require()?;
        debug!(source = credential.source, "resolved language model credential");

        let request = CompletionRequest {
            model: self.model.clone(),
            system: EXTRACTION_SYSTEM_PROMPT.to_string(),
            user: build_extraction_prompt(text),
            temperature: EXTRACTION_TEMPERATURE,
        };

        let content = self.provider.complete(&credential.key, &request).await?;
        let content = require_content(content)?;
        let drafts = decode_drafts(&content)?;

        info!(count = drafts.len(), "extracted work item drafts");
        Ok(drafts)
    }
}

pub fn build_extraction_prompt(text: &str) -> String {
    let categories = joined(WorkCategory::ALL.iter().map(WorkCategory::as_str));
    let priorities = joined(WorkPriority::ALL.iter().map(WorkPriority::as_str));
    let statuses = joined(WorkStatus::ALL.iter().map(WorkStatus::as_str));

    format!(
        "The text below describes work a team member did or plans to do. \
Convert every distinct work item in it into a JSON array.

Input text:
{text}

Each element of the array is an object with these fields:
- \"title\": short title of the work item (required, keep the language of the input)
- \"description\": details, or an empty string
- \"category\": one of {categories}
- \"priority\": one of {priorities}
- \"status\": one of {statuses}
- \"tags\": array of short labels
- \"estimated_hours\": number of hours, or null when the text gives none

Example:
[
  {{
    \"title\": \"Fix login bug\",
    \"description\": \"Session cookie was not refreshed\",
    \"category\": \"development\",
    \"priority\": \"high\",
    \"status\": \"completed\",
    \"tags\": [\"auth\"],
    \"estimated_hours\": 2
  }}
]

Important: respond with a valid JSON array only. Do not add any other text."
    )
}

fn joined<'a>(values: impl Iterator<Item = &'a str>) -> String {
    values.collect::<Vec<_>>().join("/")
}
