//! Bounded retry around a [`PlayerAgent`].

use grimoire::response::{self, PlayerResponse};
use tracing::{debug, warn};

use super::{AgentRequest, PlayerAgent};
use crate::errors::GameError;

pub struct AgentClient {
    agent: Box<dyn PlayerAgent>,
    max_attempts: u32,
}

impl AgentClient {
    /// `max_attempts` counts the first try; it is clamped to at least one.
    pub fn new(agent: Box<dyn PlayerAgent>, max_attempts: u32) -> Self {
        Self {
            agent,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Ask the agent until it returns a schema-valid response whose action
    /// is on the whitelist.
    ///
    /// Transport and schema failures are retried; once the budget is spent
    /// the whole game fails with [`GameError::RetriesExhausted`].
    pub async fn respond(&self, request: &AgentRequest<'_>) -> Result<PlayerResponse, GameError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = match self.agent.generate(request).await {
                Ok(raw) => {
                    response::parse(&raw, request.allowed_actions).map_err(GameError::from)
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(parsed) => {
                    debug!(
                        player = request.player,
                        action = %parsed.action,
                        attempt,
                        "Agent responded"
                    );
                    return Ok(parsed);
                }
                Err(e) if e.is_retriable() && attempt < self.max_attempts => {
                    warn!(
                        player = request.player,
                        backend = self.agent.backend(),
                        attempt,
                        max_attempts = self.max_attempts,
                        category = %e.retry_category(),
                        "Agent response rejected, retrying: {e}"
                    );
                }
                Err(e) if e.is_retriable() => {
                    return Err(GameError::RetriesExhausted {
                        player: request.player.to_string(),
                        attempts: attempt,
                        last: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}
