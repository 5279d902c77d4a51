//! In-memory platform and endpoint doubles that record every call.

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use {
    async_trait::async_trait,
    mirror_channels::{
        Attachment, Author, ChannelId, ChatPlatform, Emoji, EndpointId, Error, InboundMessage,
        MessageEdit, MessageId, OutboundFile, OutboundMessage, RelayEndpoint, Result, UserId,
    },
};

/// A user-authored message with no extras.
pub fn message(id: u64, channel: u64, author: u64, content: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(id),
        channel_id: ChannelId(channel),
        author: Author {
            id: UserId(author),
            display_name: format!("user{author}"),
            avatar_url: None,
            bot: false,
        },
        webhook_id: None,
        content: content.to_string(),
        attachments: Vec::new(),
        embeds: Vec::new(),
        stickers: Vec::new(),
        role_mentions: Vec::new(),
        reply_to: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionCall {
    Add(ChannelId, MessageId, Emoji),
    Remove(ChannelId, MessageId, Emoji),
}

#[derive(Default)]
pub struct MockPlatform {
    messages: Mutex<HashMap<(ChannelId, MessageId), InboundMessage>>,
    attachments: Mutex<HashMap<String, Vec<u8>>>,
    fail_fetches: AtomicBool,
    fetches: AtomicU64,
    reactions: Mutex<Vec<ReactionCall>>,
}

impl MockPlatform {
    pub fn insert(&self, message: InboundMessage) {
        self.messages
            .lock()
            .unwrap()
            .insert((message.channel_id, message.id), message);
    }

    pub fn remove(&self, channel: u64, id: u64) {
        self.messages
            .lock()
            .unwrap()
            .remove(&(ChannelId(channel), MessageId(id)));
    }

    pub fn insert_attachment(&self, url: &str, data: &[u8]) {
        self.attachments
            .lock()
            .unwrap()
            .insert(url.to_string(), data.to_vec());
    }

    pub fn fail_fetches(&self) {
        self.fail_fetches.store(true, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn reactions(&self) -> Vec<ReactionCall> {
        self.reactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    async fn fetch_message(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
    ) -> Result<InboundMessage> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetches.load(Ordering::SeqCst) {
            return Err(Error::unavailable("gateway offline"));
        }
        self.messages
            .lock()
            .unwrap()
            .get(&(channel_id, message_id))
            .cloned()
            .ok_or_else(|| Error::not_found(format!("message {message_id}")))
    }

    async fn download_attachment(&self, attachment: &Attachment) -> Result<OutboundFile> {
        let data = self
            .attachments
            .lock()
            .unwrap()
            .get(&attachment.url)
            .cloned()
            .ok_or_else(|| Error::not_found(&attachment.url))?;
        Ok(OutboundFile {
            filename: attachment.filename.clone(),
            data,
        })
    }

    async fn add_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &Emoji,
    ) -> Result<()> {
        self.reactions
            .lock()
            .unwrap()
            .push(ReactionCall::Add(channel_id, message_id, emoji.clone()));
        Ok(())
    }

    async fn remove_reaction(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        emoji: &Emoji,
    ) -> Result<()> {
        self.reactions
            .lock()
            .unwrap()
            .push(ReactionCall::Remove(channel_id, message_id, emoji.clone()));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EndpointCall {
    Send(OutboundMessage),
    Edit(MessageId, MessageEdit),
    Delete(MessageId),
}

/// Endpoint whose posts get ids `identity * 1000 + 1`, `+ 2`, ...
pub struct MockEndpoint {
    identity: EndpointId,
    next_id: AtomicU64,
    fail: AtomicBool,
    calls: Mutex<Vec<EndpointCall>>,
}

impl MockEndpoint {
    pub fn new(identity: u64) -> Self {
        Self {
            identity: EndpointId(identity),
            next_id: AtomicU64::new(identity * 1000 + 1),
            fail: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<EndpointCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: EndpointCall) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::external(
                "webhook request",
                std::io::Error::other("connection reset"),
            ));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }
}

#[async_trait]
impl RelayEndpoint for MockEndpoint {
    fn identity(&self) -> EndpointId {
        self.identity
    }

    async fn send(&self, message: OutboundMessage) -> Result<MessageId> {
        self.record(EndpointCall::Send(message))?;
        Ok(MessageId(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn edit(&self, message_id: MessageId, edit: MessageEdit) -> Result<()> {
        self.record(EndpointCall::Edit(message_id, edit))
    }

    async fn delete(&self, message_id: MessageId) -> Result<()> {
        self.record(EndpointCall::Delete(message_id))
    }
}
