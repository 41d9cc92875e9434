//! Consumer-side contract session: declare interactions, serve them, write
//! the artifact.

use crate::registry::InteractionRegistry;
use crate::server::MockServer;
use contract_core::interaction::{
    Interaction, ProviderState, RequestPattern, ResponseTemplate,
};
use contract_core::{ContractArtifact, ContractError, Matcher, Participant};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Builder for a consumer contract: collects interactions into a fresh
/// registry, then starts the mock endpoint.
#[derive(Debug)]
pub struct ContractBuilder {
    consumer: String,
    provider: String,
    registry: InteractionRegistry,
}

impl ContractBuilder {
    /// Start declaring a contract between a consumer and a provider.
    #[must_use]
    pub fn new(consumer: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            registry: InteractionRegistry::new(),
        }
    }

    /// Declare an interaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the interaction declaration is incomplete or
    /// overlaps with an already declared one.
    pub fn interaction(
        mut self,
        description: impl Into<String>,
        configure: impl FnOnce(InteractionBuilder) -> InteractionBuilder,
    ) -> Result<Self, ContractError> {
        let builder = configure(InteractionBuilder::new(description));
        self.registry.register(builder.build()?)?;
        Ok(self)
    }

    /// Start the mock endpoint serving the declared interactions. Must be
    /// called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if no interaction was declared or the listener could
    /// not be bound.
    pub fn start_mock_server(self) -> Result<ContractSession, ContractError> {
        if self.registry.is_empty() {
            return Err(ContractError::InvalidInteraction(
                "contract declares no interactions".to_string(),
            ));
        }
        let server = MockServer::start(self.registry)?;
        info!(
            consumer = %self.consumer,
            provider = %self.provider,
            url = %server.url(),
            "contract session started"
        );
        Ok(ContractSession {
            consumer: self.consumer,
            provider: self.provider,
            server,
        })
    }
}

/// Builder for a single interaction.
#[derive(Debug)]
pub struct InteractionBuilder {
    description: String,
    provider_state: Option<ProviderState>,
    method: String,
    path: Option<Matcher>,
    request_headers: BTreeMap<String, Matcher>,
    request_body: Option<Matcher>,
    status: u16,
    response_headers: BTreeMap<String, String>,
    response_body: Option<Matcher>,
}

impl InteractionBuilder {
    fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            provider_state: None,
            method: "GET".to_string(),
            path: None,
            request_headers: BTreeMap::new(),
            request_body: None,
            status: 200,
            response_headers: BTreeMap::new(),
            response_body: None,
        }
    }

    /// Require a named provider state.
    #[must_use]
    pub fn given(mut self, state: impl Into<String>) -> Self {
        self.provider_state = Some(ProviderState::new(state));
        self
    }

    /// Require a provider state with parameters.
    #[must_use]
    pub fn given_state(mut self, state: ProviderState) -> Self {
        self.provider_state = Some(state);
        self
    }

    /// Expect a request with the given method and literal path.
    #[must_use]
    pub fn request(mut self, method: impl Into<String>, path: impl Into<String>) -> Self {
        self.method = method.into();
        self.path = Some(Matcher::literal(path.into()));
        self
    }

    /// Expect a request whose path satisfies a matcher instead of a literal.
    #[must_use]
    pub fn path_matching(mut self, matcher: Matcher) -> Self {
        self.path = Some(matcher);
        self
    }

    /// Expect a request header satisfying a matcher.
    #[must_use]
    pub fn request_header(mut self, name: impl Into<String>, matcher: Matcher) -> Self {
        self.request_headers.insert(name.into(), matcher);
        self
    }

    /// Expect a request body satisfying a matcher. A literal `null` body is
    /// the same as declaring no body.
    #[must_use]
    pub fn request_body(mut self, matcher: Matcher) -> Self {
        self.request_body = (!matcher.is_null_literal()).then_some(matcher);
        self
    }

    /// Respond with the given status code.
    #[must_use]
    pub fn respond_with(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Add a literal response header.
    #[must_use]
    pub fn response_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.response_headers.insert(name.into(), value.into());
        self
    }

    /// Respond with a body template; served values come from the matchers'
    /// canonical examples. A literal `null` body is the same as declaring no
    /// body.
    #[must_use]
    pub fn response_body(mut self, matcher: Matcher) -> Self {
        self.response_body = (!matcher.is_null_literal()).then_some(matcher);
        self
    }

    fn build(self) -> Result<Interaction, ContractError> {
        let path = self.path.ok_or_else(|| {
            ContractError::InvalidInteraction(format!(
                "interaction '{}' declares no request path",
                self.description
            ))
        })?;

        Ok(Interaction {
            description: self.description,
            provider_state: self.provider_state,
            request: RequestPattern {
                method: self.method,
                path,
                headers: self.request_headers,
                body: self.request_body,
            },
            response: ResponseTemplate {
                status: self.status,
                headers: self.response_headers,
                body: self.response_body,
            },
        })
    }
}

/// A running contract session: mock endpoint plus the pending artifact
/// identity. Dropping the session tears the endpoint down.
#[derive(Debug)]
pub struct ContractSession {
    consumer: String,
    provider: String,
    server: MockServer,
}

impl ContractSession {
    /// Base URL to point the client under test at.
    #[must_use]
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Tear down the mock endpoint and promote the exercised interactions
    /// into a contract artifact.
    ///
    /// # Errors
    ///
    /// Fails with the session's diagnostic if any request went unmatched or
    /// any declared interaction was never invoked.
    pub async fn finish(self) -> Result<ContractArtifact, ContractError> {
        let interactions = self.server.finish().await?;
        info!(
            consumer = %self.consumer,
            provider = %self.provider,
            interactions = interactions.len(),
            "contract session verified"
        );
        Ok(ContractArtifact::new(
            Participant::new(self.consumer),
            Participant::new(self.provider),
            interactions,
        ))
    }

    /// Like [`ContractSession::finish`], then write the artifact into the
    /// given directory. Returns the path of the written file.
    ///
    /// # Errors
    ///
    /// Fails with the session's diagnostic, or with an I/O error from
    /// writing the artifact.
    pub async fn finish_and_write(self, dir: impl AsRef<Path>) -> Result<PathBuf, ContractError> {
        let artifact = self.finish().await?;
        let path = artifact.write_to_dir(dir)?;
        info!(path = %path.display(), "contract artifact written");
        Ok(path)
    }
}
