//! QR-code login polling.
//!
//! The relay is polled on a fixed period until the code is confirmed, it
//! expires, or the caller cancels. Transport errors during a poll are logged
//! and the next tick retries.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::client::api::RelayClient;
use crate::client::error::ClientResult;
use crate::client::session::Credential;

/// Default delay between polls.
pub const POLL_PERIOD: Duration = Duration::from_millis(1500);

/// Status reported by the passport poll endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Success,
    Expired,
    NotScanned,
    ScannedUnconfirmed,
    Unknown(i64),
}

impl PollStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => PollStatus::Success,
            86038 => PollStatus::Expired,
            86101 => PollStatus::NotScanned,
            86090 => PollStatus::ScannedUnconfirmed,
            other => PollStatus::Unknown(other),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            PollStatus::Success => "login confirmed",
            PollStatus::Expired => "QR code expired",
            PollStatus::NotScanned => "waiting for scan",
            PollStatus::ScannedUnconfirmed => "scanned, confirm on the phone",
            PollStatus::Unknown(_) => "unexpected status",
        }
    }
}

#[derive(Debug)]
pub enum LoginOutcome {
    Success(Credential),
    Expired,
    Cancelled,
}

/// Poll `qrcode_key` every `period` until a terminal status or `shutdown`.
///
/// `on_status` sees every non-terminal status so the caller can show progress.
pub async fn wait_for_login<F>(
    client: &RelayClient,
    qrcode_key: &str,
    period: Duration,
    mut shutdown: broadcast::Receiver<()>,
    mut on_status: F,
) -> ClientResult<LoginOutcome>
where
    F: FnMut(PollStatus),
{
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.recv() => {
                tracing::debug!("Login polling cancelled");
                return Ok(LoginOutcome::Cancelled);
            }
        }

        let poll = match client.poll_qrcode(qrcode_key).await {
            Ok(poll) => poll,
            Err(e) => {
                tracing::warn!(error = %e, "Login poll failed, retrying");
                continue;
            }
        };

        match PollStatus::from_code(poll.code) {
            PollStatus::Success => return Ok(LoginOutcome::Success(Credential::from_login(&poll))),
            PollStatus::Expired => return Ok(LoginOutcome::Expired),
            status => {
                tracing::debug!(code = poll.code, message = %poll.message, "Login pending");
                on_status(status);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map() {
        assert_eq!(PollStatus::from_code(0), PollStatus::Success);
        assert_eq!(PollStatus::from_code(86038), PollStatus::Expired);
        assert_eq!(PollStatus::from_code(86101), PollStatus::NotScanned);
        assert_eq!(PollStatus::from_code(86090), PollStatus::ScannedUnconfirmed);
        assert_eq!(PollStatus::from_code(1), PollStatus::Unknown(1));
    }

    #[tokio::test]
    async fn cancellation_stops_polling() {
        let client = RelayClient::new("http://127.0.0.1:9", "/api").unwrap();
        let (tx, rx) = broadcast::channel(1);
        tx.send(()).unwrap();

        let outcome = wait_for_login(&client, "key", Duration::from_secs(60), rx, |_| {})
            .await
            .unwrap();
        assert!(matches!(outcome, LoginOutcome::Cancelled));
    }
}
