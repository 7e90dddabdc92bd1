//! Background jobs
//!
//! One job exists: the order-expiry sweeper. It runs in-process on a cron
//! schedule and calls the service's own internal cancel-expired endpoint
//! over HTTP, with an explicit request timeout. Every failure mode
//! (timeout, dependency error, network error) is logged and skipped so the
//! schedule is never interrupted by a single failed run.

use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use cron::Schedule;
use serde::Deserialize;

use crate::config::SchedulerSettings;

/// Periodic sweep of expired pending orders
pub struct ExpirySweeper {
    schedule: Schedule,
    client: reqwest::Client,
    url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct SweepOutcome {
    cancelled: u64,
}

impl ExpirySweeper {
    /// Build the sweeper from scheduler settings
    ///
    /// # Errors
    ///
    /// Returns an error when the cron expression does not parse or the
    /// HTTP client cannot be built.
    pub fn from_settings(settings: &SchedulerSettings) -> anyhow::Result<Self> {
        let schedule = Schedule::from_str(&settings.schedule)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            schedule,
            client,
            url: sweep_url(&settings.base_url),
            token: settings.token.clone(),
        })
    }

    /// Run forever, sweeping at every schedule tick
    pub async fn run(self) {
        tracing::info!(url = %self.url, "order-expiry sweeper started");

        loop {
            let Some(next) = self.schedule.upcoming(Utc).next() else {
                tracing::error!("cron schedule yields no upcoming run, sweeper stopping");
                return;
            };

            let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
            tokio::time::sleep(wait).await;
            self.sweep().await;
        }
    }

    async fn sweep(&self) {
        match self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                let cancelled = response
                    .json::<SweepOutcome>()
                    .await
                    .map(|outcome| outcome.cancelled)
                    .unwrap_or_default();
                tracing::info!(cancelled, "order expiry sweep completed");
            }
            Ok(response) => {
                tracing::warn!(
                    status = %response.status(),
                    "order expiry sweep rejected, skipping this run"
                );
            }
            Err(e) if e.is_timeout() => {
                tracing::warn!("order expiry sweep timed out, skipping this run");
            }
            Err(e) => {
                tracing::warn!(error = %e, "order expiry sweep failed, skipping this run");
            }
        }
    }
}

fn sweep_url(base_url: &str) -> String {
    format!(
        "{}/api/internal/orders/cancel-expired",
        base_url.trim_end_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerSettings;

    #[test]
    fn default_schedule_parses_and_has_upcoming_runs() {
        let settings = SchedulerSettings::default();
        let sweeper = ExpirySweeper::from_settings(&settings).unwrap();
        assert!(sweeper.schedule.upcoming(Utc).next().is_some());
    }

    #[test]
    fn bad_cron_expression_is_an_error() {
        let settings = SchedulerSettings {
            schedule: "every five minutes".to_string(),
            ..SchedulerSettings::default()
        };
        assert!(ExpirySweeper::from_settings(&settings).is_err());
    }

    #[test]
    fn sweep_url_handles_trailing_slash() {
        assert_eq!(
            sweep_url("http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080/api/internal/orders/cancel-expired"
        );
        assert_eq!(
            sweep_url("http://127.0.0.1:8080"),
            "http://127.0.0.1:8080/api/internal/orders/cancel-expired"
        );
    }
}
