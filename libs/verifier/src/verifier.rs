//! Replays a contract artifact against a live provider.
//!
//! Each interaction walks PENDING → STATE_SETUP → REQUEST_SENT →
//! PASSED/FAILED; interactions not yet started when the run is cancelled
//! report SKIPPED. Interactions replay sequentially in artifact order, since
//! provider states may share setup.

use crate::provider_state::{NoopStateHandler, ProviderStateHandler};
use crate::report::{InteractionOutcome, InteractionResult, VerificationReport};
use contract_core::interaction::{Interaction, RequestPattern, ResponseTemplate};
use contract_core::matcher::Mismatch;
use contract_core::{ContractArtifact, ContractError};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Shared flag that aborts a verification run between interactions.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Request cancellation; interactions not yet started report
    /// `skipped: aborted`.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Actual response captured from the provider.
#[derive(Debug)]
struct CapturedResponse {
    status: u16,
    headers: BTreeMap<String, String>,
    body: Option<Value>,
}

/// Provider-side contract verifier.
pub struct Verifier {
    base_url: String,
    client: reqwest::Client,
    state_handler: Box<dyn ProviderStateHandler>,
    cancel: CancelFlag,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Verifier {
    /// Create a verifier targeting a provider base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ContractError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ContractError::NetworkFailure(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
            state_handler: Box::new(NoopStateHandler),
            cancel: CancelFlag::default(),
        })
    }

    /// Install the provider-state setup hook.
    #[must_use]
    pub fn with_state_handler(mut self, handler: impl ProviderStateHandler + 'static) -> Self {
        self.state_handler = Box::new(handler);
        self
    }

    /// Handle for cancelling the run from another task.
    #[must_use]
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Replay every interaction in the artifact and aggregate the outcomes.
    /// Individual failures never abort the run.
    pub async fn verify(&self, artifact: &ContractArtifact) -> VerificationReport {
        let mut results = Vec::with_capacity(artifact.interactions.len());

        for interaction in &artifact.interactions {
            let outcome = if self.cancel.is_cancelled() {
                InteractionOutcome::Skipped {
                    reason: "aborted".to_string(),
                }
            } else {
                self.verify_interaction(interaction).await
            };

            match &outcome {
                InteractionOutcome::Passed => {
                    info!(description = %interaction.description, "interaction passed");
                }
                other => {
                    warn!(description = %interaction.description, outcome = %other, "interaction did not pass");
                }
            }

            results.push(InteractionResult {
                description: interaction.description.clone(),
                outcome,
            });
        }

        let report = VerificationReport {
            consumer: artifact.consumer.name.clone(),
            provider: artifact.provider.name.clone(),
            results,
        };
        info!(
            consumer = %report.consumer,
            provider = %report.provider,
            summary = %report.summary(),
            "verification run finished"
        );
        report
    }

    async fn verify_interaction(&self, interaction: &Interaction) -> InteractionOutcome {
        if let Some(state) = &interaction.provider_state {
            if let Err(e) = self.state_handler.setup(&state.name, &state.params).await {
                return InteractionOutcome::Failed {
                    reason: ContractError::ProviderStateSetupFailure {
                        state: state.name.clone(),
                        reason: e.to_string(),
                    }
                    .to_string(),
                };
            }
        }

        let captured = match self.send(&interaction.request).await {
            Ok(captured) => captured,
            Err(reason) => {
                return InteractionOutcome::Failed {
                    reason: ContractError::NetworkFailure(reason).to_string(),
                };
            }
        };

        check_response(&interaction.response, &captured)
    }

    /// Send the literal request derived from the pattern's example values.
    async fn send(&self, pattern: &RequestPattern) -> Result<CapturedResponse, String> {
        let method = reqwest::Method::from_bytes(pattern.method.as_bytes())
            .map_err(|_| format!("invalid method '{}'", pattern.method))?;
        let url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            pattern.example_path()
        );

        let mut request = self.client.request(method, &url);
        for (name, value) in pattern.example_headers() {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = pattern.example_body() {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let bytes = response.bytes().await.map_err(|e| e.to_string())?;
        let body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            }))
        };

        Ok(CapturedResponse {
            status,
            headers,
            body,
        })
    }
}

/// Diff the captured response against the declared template.
fn check_response(template: &ResponseTemplate, actual: &CapturedResponse) -> InteractionOutcome {
    let mut mismatches: Vec<Mismatch> = Vec::new();

    if template.status != actual.status {
        mismatches.push(Mismatch {
            path: "status".to_string(),
            expected: template.status.to_string(),
            actual: actual.status.to_string(),
        });
    }

    for (name, expected) in &template.headers {
        match actual.headers.get(&name.to_ascii_lowercase()) {
            Some(value) if value == expected => {}
            Some(value) => mismatches.push(Mismatch {
                path: format!("header[{name}]"),
                expected: expected.clone(),
                actual: value.clone(),
            }),
            None => mismatches.push(Mismatch {
                path: format!("header[{name}]"),
                expected: expected.clone(),
                actual: "missing".to_string(),
            }),
        }
    }

    if let Some(matcher) = &template.body {
        match &actual.body {
            Some(body) => mismatches.extend(matcher.diff(body)),
            None => mismatches.push(Mismatch {
                path: "$".to_string(),
                expected: "response body".to_string(),
                actual: "no body".to_string(),
            }),
        }
    }

    if mismatches.is_empty() {
        InteractionOutcome::Passed
    } else {
        let reasons: Vec<String> = mismatches.iter().map(ToString::to_string).collect();
        InteractionOutcome::Failed {
            reason: reasons.join("; "),
        }
    }
}
