//! Cross-module tests driving the conversation engine end to end.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::conversation::{Outbox, Reply};


/// Outbox that keeps every reply in order.
#[derive(Default)]
pub(crate) struct Recorder {
    sent: Mutex<Vec<Reply>>,
}

impl Recorder {
    pub(crate) fn take(&self) -> Vec<Reply> {
        std::mem::take(&mut *self.sent.lock().expect("lock"))
    }
}

#[async_trait]
impl Outbox for Recorder {
    type Error = std::convert::Infallible;

    async fn deliver(&self, reply: Reply) -> Result<(), Self::Error> {
        self.sent.lock().expect("lock").push(reply);
        Ok(())
    }
}
