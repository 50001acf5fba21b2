use crate::domain::model::{HealthEndpoint, HealthReport};
use crate::domain::ports::HealthProbe;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::time::{Duration, Instant};

pub struct HttpHealthProbe {
    client: Client,
}

impl HttpHealthProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HealthProbe for HttpHealthProbe {
    async fn check(&self, endpoint: &HealthEndpoint) -> HealthReport {
        let started = Instant::now();
        tracing::debug!("GET {}", endpoint.url);

        let (healthy, status, detail) = match self.client.get(&endpoint.url).send().await {
            Ok(response) => {
                let status = response.status();
                (status.is_success(), Some(status.as_u16()), status.to_string())
            }
            Err(e) => (false, None, describe_error(&e)),
        };

        HealthReport {
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            healthy,
            status,
            detail,
            elapsed_ms: started.elapsed().as_millis(),
        }
    }
}

fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "timed out".to_string()
    } else if error.is_connect() {
        "connection refused".to_string()
    } else {
        error.to_string()
    }
}
