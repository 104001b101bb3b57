#![allow(dead_code)]

use async_trait::async_trait;
use otp_fetch::{PollPolicy, Sleeper};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

pub const TEST_EMAIL: &str = "abc123@example.com";

/// Records requested waits and returns immediately.
#[derive(Clone, Default)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
    }
}

pub type SleepRequest = (Duration, oneshot::Sender<()>);

/// Hands every wait to the test and blocks until the test acknowledges it,
/// so mocks can be swapped between attempts.
pub struct GatedSleeper {
    requests: mpsc::UnboundedSender<SleepRequest>,
}

impl GatedSleeper {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SleepRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { requests: tx }, rx)
    }
}

#[async_trait]
impl Sleeper for GatedSleeper {
    async fn sleep(&self, duration: Duration) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.requests.send((duration, ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

pub fn fast_policy(max_attempts: u32) -> PollPolicy {
    PollPolicy::new(
        max_attempts,
        Duration::from_millis(50),
        Duration::from_secs(5),
    )
    .unwrap()
}
