use crate::domain::model::{CommandOutcome, HealthEndpoint, HealthReport, Invocation};
use crate::utils::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs to completion. A non-zero exit is an `Ok` outcome, not an error.
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutcome>;
}

#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &str) -> Result<bool>;
}

#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn check(&self, endpoint: &HealthEndpoint) -> HealthReport;
}
