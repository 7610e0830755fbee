use async_trait::async_trait;
use lettre::Message;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use transfer_services::{DeliveryError, MailTransport};

/// Records every message handed to it. Calls listed in `fail_calls` (1-based)
/// fail with a transport error instead.
#[derive(Default)]
pub struct RecordingTransport {
    calls: AtomicUsize,
    fail_calls: Vec<usize>,
    sent: Mutex<Vec<Message>>,
}

impl RecordingTransport {
    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_calls: calls.to_vec(),
            ..Default::default()
        }
    }

    /// Number of send attempts, failed ones included.
    pub fn attempts(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<Message> {
        self.sent.lock().expect("lock").clone()
    }

    /// Raw RFC 5322 text of each delivered message.
    pub fn sent_raw(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|m| String::from_utf8_lossy(&m.formatted()).into_owned())
            .collect()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: Message) -> Result<(), DeliveryError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_calls.contains(&call) {
            return Err(DeliveryError::Transport(
                "454 TLS not available".to_string(),
            ));
        }
        self.sent.lock().expect("lock").push(message);
        Ok(())
    }
}
