//! Booking-page chat between a customer and the gig's worker.
//!
//! The thread is a local, append-only log. Sending appends the customer's
//! message immediately, forwards it through the marketplace, and appends the
//! worker's reply once it arrives. Nothing survives the thread itself.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::ports::MarketplaceApi;
use crate::domain::{GigId, MessageId};

/// Canned worker greeting that opens every thread.
pub const WORKER_GREETING: &str =
    "Hello! I see you are interested in my service. How can I help you today?";

/// Canned acknowledgement the worker sends after each customer message.
pub const WORKER_ACKNOWLEDGEMENT: &str =
    "Thank you for your message. I will be with you shortly.";

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    /// The booking customer.
    Customer,
    /// The gig's worker.
    Worker,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Message identifier.
    pub id: MessageId,
    /// Author.
    pub sender: ChatSender,
    /// Body text.
    pub text: String,
}

/// Local chat log for one gig.
pub struct ChatThread<A> {
    api: Arc<A>,
    gig_id: GigId,
    messages: Mutex<Vec<ChatMessage>>,
}

impl<A> ChatThread<A> {
    /// Open a thread seeded with the worker's greeting.
    pub fn open(api: Arc<A>, gig_id: GigId) -> Self {
        let greeting = ChatMessage {
            id: MessageId::local(1),
            sender: ChatSender::Worker,
            text: WORKER_GREETING.to_owned(),
        };
        Self {
            api,
            gig_id,
            messages: Mutex::new(vec![greeting]),
        }
    }

    /// Gig the conversation is about.
    pub fn gig_id(&self) -> &GigId {
        &self.gig_id
    }

    /// Snapshot of the log in append order.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.lock().clone()
    }

    fn append(&self, sender: ChatSender, text: String) {
        let mut messages = self.lock();
        let id = MessageId::local(messages.len() + 1);
        messages.push(ChatMessage { id, sender, text });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ChatMessage>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: MarketplaceApi> ChatThread<A> {
    /// Send a customer message.
    ///
    /// Blank input is ignored. The message is appended before the network
    /// call; when forwarding fails the failure is logged, the message stays
    /// in the log, and no reply is appended.
    pub async fn send(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.append(ChatSender::Customer, text.to_owned());

        if let Err(error) = self.api.post_message(&self.gig_id, text).await {
            warn!(gig_id = %self.gig_id, %error, "chat message could not be forwarded");
            return;
        }

        match self.api.worker_reply(&self.gig_id, text).await {
            Ok(reply) => {
                debug!(gig_id = %self.gig_id, reply_id = %reply.id, "worker replied");
                self.append(ChatSender::Worker, reply.text);
            }
            Err(error) => {
                warn!(gig_id = %self.gig_id, %error, "worker reply did not arrive");
            }
        }
    }
}
