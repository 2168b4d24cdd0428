//! Content-moderation collaborator (§4.3, §6). Mirrors
//! `notifications::push::PushClient`'s shape: missing vendor credentials
//! disable scoring entirely rather than blocking message sends, and a
//! transport failure is treated the same as "no verdict" so a flaky vendor
//! never stops the conversation (§4.3 "moderation failures are non-fatal").

use crate::config::ModerationConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Review,
    Block,
}

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    /// Highest score across every category the vendor scores.
    max_score: f32,
}

#[derive(Clone)]
pub struct ModerationClient {
    http: reqwest::Client,
    config: ModerationConfig,
}

impl ModerationClient {
    pub fn new(config: ModerationConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Scores `text` and classifies it per §4.3's two-threshold policy. A
    /// missing vendor key or a transport error both resolve to `Pass` —
    /// there is no way to tell a disabled vendor from a down one at this
    /// layer, and the spec treats both as non-fatal.
    pub async fn score(&self, text: &str) -> Verdict {
        if !self.is_configured() {
            return Verdict::Pass;
        }

        let Some(endpoint) = &self.config.vendor_endpoint else {
            return Verdict::Pass;
        };

        let result = self
            .http
            .post(endpoint)
            .bearer_auth(self.config.vendor_key.as_deref().unwrap_or_default())
            .json(&ScoreRequest { text })
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "moderation vendor unreachable, passing message through");
                return Verdict::Pass;
            }
        };

        let parsed = match response.json::<ScoreResponse>().await {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(error = %err, "moderation vendor returned an unparseable response");
                return Verdict::Pass;
            }
        };

        if parsed.max_score >= self.config.block_threshold {
            Verdict::Block
        } else if parsed.max_score >= self.config.review_threshold {
            Verdict::Review
        } else {
            Verdict::Pass
        }
    }
}
