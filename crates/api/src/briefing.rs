//! Executive briefing composition.
//!
//! A briefing is a markdown document built from an organization's active
//! scenarios, open alerts and recent activity. The opening summary paragraph
//! is written from a template, or requested from the OpenAI chat-completions
//! API when `OPENAI_API_KEY` is configured. Any failure on that path falls
//! back to the template.

use std::fmt::Write as _;
use std::time::Duration;

use bastion_core::status::{ScenarioStatus, Severity};
use bastion_db::models::activity::ActivityLog;
use bastion_db::models::alert::Alert;
use bastion_db::models::organization::Organization;
use bastion_db::models::scenario::Scenario;
use serde_json::json;

use crate::config::ServerConfig;

/// Upper bound on a summary request, connection included.
pub const SUMMARY_TIMEOUT: Duration = Duration::from_secs(15);

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Recent activity entries listed in a briefing.
pub const ACTIVITY_LIMIT: i64 = 10;

/// Everything a briefing is written from.
#[derive(Debug, Clone)]
pub struct BriefingInputs {
    pub organization: Organization,
    /// Scenarios in `active` or `voting`.
    pub scenarios: Vec<Scenario>,
    /// Alerts still `open`.
    pub alerts: Vec<Alert>,
    pub activity: Vec<ActivityLog>,
}

impl BriefingInputs {
    fn alerts_at_least(&self, floor: Severity) -> usize {
        self.alerts
            .iter()
            .filter(|a| {
                a.severity
                    .parse::<Severity>()
                    .is_ok_and(|s| s.rank() >= floor.rank())
            })
            .count()
    }

    fn voting_count(&self) -> usize {
        self.scenarios
            .iter()
            .filter(|s| s.status == ScenarioStatus::Voting.as_str())
            .count()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Non-success HTTP status: {0}")]
    HttpStatus(u16),

    #[error("Response contained no summary text")]
    EmptyResponse,
}

/// The summary paragraph used when no model is configured or it fails.
pub fn template_summary(inputs: &BriefingInputs) -> String {
    let name = &inputs.organization.name;
    let scenarios = inputs.scenarios.len();
    let alerts = inputs.alerts.len();

    if scenarios == 0 && alerts == 0 {
        return format!(
            "{name} has no active scenarios and no open alerts. \
             No executive action is required at this time."
        );
    }

    let mut summary = format!(
        "{name} is tracking {scenarios} active scenario{} and {alerts} open alert{}.",
        plural(scenarios),
        plural(alerts),
    );
    let urgent = inputs.alerts_at_least(Severity::High);
    if urgent > 0 {
        let _ = write!(
            summary,
            " {urgent} alert{} rated high or critical and should be reviewed first.",
            if urgent == 1 { " is" } else { "s are" }
        );
    }
    let voting = inputs.voting_count();
    if voting > 0 {
        let _ = write!(
            summary,
            " {voting} scenario{} awaiting a decision vote.",
            if voting == 1 { " is" } else { "s are" }
        );
    }
    summary
}

/// Render the full markdown briefing around a summary paragraph.
pub fn compose(inputs: &BriefingInputs, summary: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Executive Briefing: {}", inputs.organization.name);
    let _ = writeln!(out, "\n_Generated {}_\n", chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"));

    let _ = writeln!(out, "## Summary\n\n{}\n", summary.trim());

    let _ = writeln!(out, "## Active Scenarios\n");
    if inputs.scenarios.is_empty() {
        let _ = writeln!(out, "No active scenarios.");
    }
    for scenario in &inputs.scenarios {
        let _ = writeln!(
            out,
            "- **{}** ({} priority, {})",
            scenario.title, scenario.priority, scenario.status
        );
    }

    let _ = writeln!(out, "\n## Open Alerts\n");
    if inputs.alerts.is_empty() {
        let _ = writeln!(out, "No open alerts.");
    }
    for alert in &inputs.alerts {
        let _ = writeln!(out, "- [{}] {}", alert.severity.to_uppercase(), alert.title);
    }

    let _ = writeln!(out, "\n## Recent Activity\n");
    if inputs.activity.is_empty() {
        let _ = writeln!(out, "No recorded activity.");
    }
    for entry in &inputs.activity {
        let _ = writeln!(
            out,
            "- {} {} {}",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.entity_type,
            entry.action
        );
    }
    out
}

/// Prompt sent to the model: the facts, without any of the markdown.
pub fn summary_prompt(inputs: &BriefingInputs) -> String {
    let mut prompt = format!(
        "Write a three-sentence executive summary for the leadership team of {}.\n",
        inputs.organization.name
    );
    if let Some(industry) = &inputs.organization.industry {
        let _ = writeln!(prompt, "Industry: {industry}");
    }
    let _ = writeln!(prompt, "Active scenarios:");
    for s in &inputs.scenarios {
        let _ = writeln!(prompt, "- {} (priority {}, status {})", s.title, s.priority, s.status);
    }
    let _ = writeln!(prompt, "Open alerts:");
    for a in &inputs.alerts {
        let _ = writeln!(prompt, "- {} (severity {})", a.title, a.severity);
    }
    prompt
}

/// Writes briefing summaries, through the model when one is configured.
pub struct BriefingWriter {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl BriefingWriter {
    pub fn from_config(config: &ServerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SUMMARY_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self {
            client,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            endpoint: OPENAI_CHAT_URL.to_string(),
        }
    }

    /// Point requests at a different chat-completions URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// Summary paragraph for a briefing, and whether a model wrote it.
    pub async fn summarize(&self, inputs: &BriefingInputs) -> (String, bool) {
        let Some(api_key) = self.api_key.as_deref() else {
            return (template_summary(inputs), false);
        };

        match self.request_summary(api_key, &summary_prompt(inputs)).await {
            Ok(text) => (text, true),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    organization_id = %inputs.organization.id,
                    "Model summary failed, using template"
                );
                (template_summary(inputs), false)
            }
        }
    }

    async fn request_summary(&self, api_key: &str, prompt: &str) -> Result<String, SummaryError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are a chief-of-staff writing concise, factual executive briefings."
                },
                { "role": "user", "content": prompt }
            ],
            "temperature": 0.3,
            "max_tokens": 300,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SummaryError::HttpStatus(response.status().as_u16()));
        }

        let payload: serde_json::Value = response.json().await?;
        extract_content(&payload).ok_or(SummaryError::EmptyResponse)
    }
}

/// Pull `choices[0].message.content` out of a chat-completions response.
fn extract_content(payload: &serde_json::Value) -> Option<String> {
    payload
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use bastion_core::types::DbId;

    use super::*;

    fn organization() -> Organization {
        Organization {
            id: DbId::new_v4(),
            name: "Acme".into(),
            industry: Some("retail".into()),
            size: None,
            description: None,
            is_demo: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn scenario(title: &str, status: &str) -> Scenario {
        Scenario {
            id: DbId::new_v4(),
            organization_id: DbId::new_v4(),
            playbook_id: None,
            owner_id: None,
            title: title.into(),
            description: None,
            status: status.into(),
            priority: "high".into(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn alert(title: &str, severity: &str) -> Alert {
        Alert {
            id: DbId::new_v4(),
            organization_id: DbId::new_v4(),
            trigger_id: None,
            title: title.into(),
            message: String::new(),
            severity: severity.into(),
            status: "open".into(),
            observed_value: None,
            recommended_playbook_ids: Vec::new(),
            acknowledged_at: None,
            resolved_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn inputs() -> BriefingInputs {
        BriefingInputs {
            organization: organization(),
            scenarios: vec![
                scenario("Price war", "active"),
                scenario("Supplier default", "voting"),
            ],
            alerts: vec![alert("Churn spike", "critical"), alert("Late invoices", "low")],
            activity: Vec::new(),
        }
    }

    #[test]
    fn template_summary_counts_and_highlights() {
        let summary = template_summary(&inputs());
        assert!(summary.starts_with("Acme is tracking 2 active scenarios and 2 open alerts."));
        assert!(summary.contains("1 alert is rated high or critical"));
        assert!(summary.contains("1 scenario is awaiting a decision vote"));
    }

    #[test]
    fn template_summary_for_quiet_organization() {
        let quiet = BriefingInputs {
            scenarios: Vec::new(),
            alerts: Vec::new(),
            ..inputs()
        };
        assert!(template_summary(&quiet).contains("no active scenarios and no open alerts"));
    }

    #[test]
    fn compose_renders_every_section() {
        let doc = compose(&inputs(), "All quiet.");
        assert!(doc.starts_with("# Executive Briefing: Acme"));
        assert!(doc.contains("## Summary\n\nAll quiet."));
        assert!(doc.contains("- **Price war** (high priority, active)"));
        assert!(doc.contains("- [CRITICAL] Churn spike"));
        assert!(doc.contains("No recorded activity."));
    }

    #[test]
    fn extract_content_reads_first_choice() {
        let payload = json!({"choices": [{"message": {"content": "  Focus on churn.  "}}]});
        assert_eq!(extract_content(&payload).as_deref(), Some("Focus on churn."));
        assert_eq!(extract_content(&json!({"choices": []})), None);
    }

    #[tokio::test]
    async fn summarize_without_key_uses_template() {
        let config = ServerConfig::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "postgres://localhost/x".to_string())
        })
        .unwrap();
        let writer = BriefingWriter::from_config(&config);
        assert!(!writer.is_enabled());

        let (summary, generated) = writer.summarize(&inputs()).await;
        assert!(!generated);
        assert_eq!(summary, template_summary(&inputs()));
    }

    #[tokio::test]
    async fn summarize_falls_back_when_endpoint_is_unreachable() {
        let config = ServerConfig::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/x".to_string()),
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            _ => None,
        })
        .unwrap();
        let writer = BriefingWriter::from_config(&config).with_endpoint("http://127.0.0.1:9/v1/chat");

        let (summary, generated) = writer.summarize(&inputs()).await;
        assert!(!generated);
        assert!(summary.starts_with("Acme is tracking"));
    }
}
