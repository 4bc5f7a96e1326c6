//! ChatWidget - Owns the transcript and context of one chat session
//!
//! The responder is consulted synchronously on submit; the reply itself is
//! shown after the configured typing delay. Each delayed reply runs as a tokio
//! task holding a child of the widget's mount token, so closing or unmounting
//! cancels every reply still in flight. Deliveries are also tagged with the
//! mount generation and anything from an older generation is dropped.

use std::collections::HashSet;

use chat_core::{
    ContextTag, QuickReply, Responder, RuleError, Transcript, TranscriptEntry, WidgetConfig,
};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{Result, WidgetError};
use crate::machine::{WidgetEvent, WidgetState, WidgetStateMachine};

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// Empty or whitespace-only input; nothing changed.
    Ignored,
    /// The user entry was appended and a reply is on its way.
    Scheduled {
        reply_id: u64,
        next_context: ContextTag,
        rule_id: Option<String>,
    },
}

#[derive(Debug)]
struct Delivery {
    generation: u64,
    reply_id: u64,
    text: String,
}

pub struct ChatWidget {
    id: Uuid,
    config: WidgetConfig,
    responder: Responder,
    machine: WidgetStateMachine,
    transcript: Transcript,
    context: ContextTag,
    mount_token: CancellationToken,
    generation: u64,
    next_reply_id: u64,
    pending: HashSet<u64>,
    tx: mpsc::UnboundedSender<Delivery>,
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl ChatWidget {
    /// Mount a widget with the rules named by the config.
    pub fn new(config: WidgetConfig) -> std::result::Result<Self, RuleError> {
        let rules = config.load_rules()?;
        Ok(Self::with_responder(config, Responder::new(rules)))
    }

    /// Mount a widget around an existing responder. Starts closed with an
    /// empty transcript and no context.
    pub fn with_responder(config: WidgetConfig, responder: Responder) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        tracing::debug!(widget_id = %id, rules = responder.rules().len(), "Chat widget mounted");
        Self {
            id,
            config,
            responder,
            machine: WidgetStateMachine::new(),
            transcript: Transcript::new(),
            context: ContextTag::None,
            mount_token: CancellationToken::new(),
            generation: 0,
            next_reply_id: 0,
            pending: HashSet::new(),
            tx,
            rx,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    pub fn state(&self) -> &WidgetState {
        self.machine.state()
    }

    pub fn is_open(&self) -> bool {
        self.machine.state().is_open()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The context the next submission will be answered in.
    pub fn context(&self) -> ContextTag {
        self.context
    }

    pub fn quick_replies(&self) -> &[QuickReply] {
        &self.config.quick_replies
    }

    /// Replies scheduled but not yet shown.
    pub fn pending_replies(&self) -> usize {
        self.pending.len()
    }

    /// Show the widget. Opening an open widget is a no-op.
    pub fn open(&mut self) -> Result<()> {
        self.ensure_mounted()?;
        let transition = self.machine.handle_event(WidgetEvent::Opened)?;
        if transition.changed {
            tracing::info!(widget_id = %self.id, "Chat widget opened");
        }
        Ok(())
    }

    /// Hide the widget, discarding replies that have not been shown yet.
    /// The transcript and context are kept for when it reopens.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_mounted()?;
        self.cancel_pending();
        let transition = self.machine.handle_event(WidgetEvent::Closed)?;
        if transition.changed {
            tracing::info!(widget_id = %self.id, "Chat widget closed");
        }
        Ok(())
    }

    /// Tear the widget down: pending replies are cancelled and the
    /// transcript and context are discarded. Later calls fail.
    pub fn unmount(&mut self) {
        if self.machine.state().is_terminal() {
            return;
        }
        self.cancel_pending();
        self.transcript.clear();
        self.context = ContextTag::None;
        if let Err(e) = self.machine.handle_event(WidgetEvent::Unmounted) {
            tracing::warn!(widget_id = %self.id, "Unexpected unmount: {}", e);
        }
        tracing::info!(widget_id = %self.id, "Chat widget unmounted");
    }

    /// Submit what the user typed.
    ///
    /// Blank input is ignored. Otherwise the user entry is appended, the
    /// responder answers in the current context, the context is replaced and
    /// the reply is scheduled after the typing delay. With a non-zero delay
    /// and no tokio runtime the submission is rejected with
    /// [`WidgetError::NoRuntime`] and nothing changes.
    pub fn submit(&mut self, text: &str) -> Result<SubmitOutcome> {
        self.ensure_mounted()?;
        if !self.machine.state().accepts_user_input() {
            return Err(WidgetError::NotOpen);
        }
        if text.trim().is_empty() {
            return Ok(SubmitOutcome::Ignored);
        }
        let runtime = self.runtime()?;

        self.machine.handle_event(WidgetEvent::UserSubmitted)?;
        self.transcript.push(TranscriptEntry::user(text));

        let response = self.responder.respond(text, self.context);
        tracing::debug!(
            widget_id = %self.id,
            from = %self.context,
            to = %response.next_context,
            rule = response.rule_id.as_deref().unwrap_or("fallback"),
            "Responder answered"
        );
        self.context = response.next_context;

        let reply_id = self.schedule(runtime, response.reply);
        Ok(SubmitOutcome::Scheduled {
            reply_id,
            next_context: response.next_context,
            rule_id: response.rule_id,
        })
    }

    /// Submit the utterance behind a quick-reply button.
    pub fn quick_reply(&mut self, index: usize) -> Result<SubmitOutcome> {
        let utterance = self
            .config
            .quick_replies
            .get(index)
            .map(|quick| quick.utterance.clone())
            .ok_or(WidgetError::UnknownQuickReply {
                index,
                available: self.config.quick_replies.len(),
            })?;
        self.submit(&utterance)
    }

    /// Wait for the next reply, append it and return it.
    /// Returns `None` when nothing is pending.
    pub async fn next_reply(&mut self) -> Option<TranscriptEntry> {
        while !self.pending.is_empty() {
            let delivery = self.rx.recv().await?;
            if let Some(entry) = self.accept(delivery) {
                return Some(entry);
            }
        }
        None
    }

    /// Append a reply that is already due, without waiting.
    pub fn try_next_reply(&mut self) -> Option<TranscriptEntry> {
        while let Ok(delivery) = self.rx.try_recv() {
            if let Some(entry) = self.accept(delivery) {
                return Some(entry);
            }
        }
        None
    }

    /// Wait for every pending reply.
    pub async fn settle(&mut self) -> Vec<TranscriptEntry> {
        let mut delivered = Vec::new();
        while let Some(entry) = self.next_reply().await {
            delivered.push(entry);
        }
        delivered
    }

    fn ensure_mounted(&self) -> Result<()> {
        if self.machine.state().is_terminal() {
            return Err(WidgetError::Unmounted);
        }
        Ok(())
    }

    /// Handle to spawn the delayed reply on; `None` when replies are instant.
    fn runtime(&self) -> Result<Option<Handle>> {
        if self.config.typing_delay().is_zero() {
            return Ok(None);
        }
        Handle::try_current()
            .map(Some)
            .map_err(|_| WidgetError::NoRuntime)
    }

    fn schedule(&mut self, runtime: Option<Handle>, text: String) -> u64 {
        let reply_id = self.next_reply_id;
        self.next_reply_id += 1;
        self.pending.insert(reply_id);

        let delivery = Delivery {
            generation: self.generation,
            reply_id,
            text,
        };
        let delay = self.config.typing_delay();

        let Some(runtime) = runtime else {
            // The receiver is owned by this widget, so the send cannot fail.
            let _ = self.tx.send(delivery);
            return reply_id;
        };

        let token = self.mount_token.child_token();
        let tx = self.tx.clone();
        runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::trace!(reply_id, "Pending reply cancelled");
                }
                _ = tokio::time::sleep(delay) => {
                    // The receiver lives in the widget; a send error means it is gone.
                    let _ = tx.send(delivery);
                }
            }
        });
        reply_id
    }

    fn accept(&mut self, delivery: Delivery) -> Option<TranscriptEntry> {
        if delivery.generation != self.generation || !self.pending.remove(&delivery.reply_id) {
            tracing::debug!(
                widget_id = %self.id,
                reply_id = delivery.reply_id,
                "Discarding stale reply"
            );
            return None;
        }

        let entry = TranscriptEntry::bot(delivery.text);
        self.transcript.push(entry.clone());
        if let Err(e) = self.machine.handle_event(WidgetEvent::ReplyDelivered) {
            tracing::warn!(widget_id = %self.id, "Unexpected delivery: {}", e);
        }
        Some(entry)
    }

    fn cancel_pending(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!(
                widget_id = %self.id,
                count = self.pending.len(),
                "Discarding pending replies"
            );
        }
        self.mount_token.cancel();
        self.mount_token = CancellationToken::new();
        self.generation += 1;
        self.pending.clear();
    }
}

impl Drop for ChatWidget {
    fn drop(&mut self) {
        self.mount_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::rules::builtin::{FALLBACK_REPLY, GREETING_REPLY};
    use chat_core::Speaker;

    fn instant_widget() -> ChatWidget {
        let config = WidgetConfig {
            typing_delay_ms: 0,
            ..WidgetConfig::default()
        };
        let mut widget = ChatWidget::with_responder(config, Responder::default());
        widget.open().unwrap();
        widget
    }

    #[test]
    fn test_starts_closed_and_empty() {
        let widget = ChatWidget::with_responder(WidgetConfig::default(), Responder::default());
        assert_eq!(widget.state(), &WidgetState::Closed);
        assert!(widget.transcript().is_empty());
        assert_eq!(widget.context(), ContextTag::None);
    }

    #[test]
    fn test_submit_requires_open_widget() {
        let mut widget =
            ChatWidget::with_responder(WidgetConfig::default(), Responder::default());
        assert_eq!(widget.submit("hi"), Err(WidgetError::NotOpen));
        assert!(widget.transcript().is_empty());
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut widget = instant_widget();
        for blank in ["", "   ", "\t\n"] {
            assert_eq!(widget.submit(blank).unwrap(), SubmitOutcome::Ignored);
        }
        assert!(widget.transcript().is_empty());
        assert_eq!(widget.state(), &WidgetState::Open);
        assert_eq!(widget.pending_replies(), 0);
    }

    #[test]
    fn test_zero_delay_reply_is_ready_immediately() {
        let mut widget = instant_widget();
        let outcome = widget.submit("Hello!").unwrap();
        assert!(matches!(
            outcome,
            SubmitOutcome::Scheduled { next_context: ContextTag::Intro, .. }
        ));
        assert_eq!(widget.context(), ContextTag::Intro);

        let reply = widget.try_next_reply().unwrap();
        assert_eq!(reply.speaker, Speaker::Bot);
        assert_eq!(reply.text, GREETING_REPLY);
        assert_eq!(widget.transcript().len(), 2);
        assert_eq!(widget.state(), &WidgetState::Open);
    }

    #[test]
    fn test_user_text_kept_as_typed() {
        let mut widget = instant_widget();
        widget.submit("  Tell me MORE  ").unwrap();
        assert_eq!(widget.transcript().entries()[0].text, "  Tell me MORE  ");
        assert_eq!(widget.try_next_reply().unwrap().text, FALLBACK_REPLY);
    }

    #[test]
    fn test_quick_reply_submits_literal_utterance() {
        let mut widget = instant_widget();
        let utterance = widget.quick_replies()[2].utterance.clone();
        widget.quick_reply(2).unwrap();
        assert_eq!(widget.transcript().entries()[0].text, utterance);
        assert_eq!(widget.context(), ContextTag::Skills);

        assert_eq!(
            widget.quick_reply(99),
            Err(WidgetError::UnknownQuickReply {
                index: 99,
                available: 4
            })
        );
    }

    #[test]
    fn test_delayed_submit_outside_runtime_is_rejected() {
        let mut widget =
            ChatWidget::with_responder(WidgetConfig::default(), Responder::default());
        widget.open().unwrap();

        assert_eq!(widget.submit("hi"), Err(WidgetError::NoRuntime));
        assert!(widget.transcript().is_empty());
        assert_eq!(widget.context(), ContextTag::None);
        assert_eq!(widget.state(), &WidgetState::Open);
        assert_eq!(widget.pending_replies(), 0);
    }

    #[test]
    fn test_unmount_twice_is_a_no_op() {
        let mut widget = instant_widget();
        widget.unmount();
        widget.unmount();
        assert_eq!(widget.state(), &WidgetState::Unmounted);
        assert_eq!(widget.close(), Err(WidgetError::Unmounted));
    }

    #[test]
    fn test_unmount_discards_everything() {
        let mut widget = instant_widget();
        widget.submit("hi").unwrap();
        widget.unmount();
        assert!(widget.transcript().is_empty());
        assert_eq!(widget.context(), ContextTag::None);
        assert_eq!(widget.pending_replies(), 0);
        assert_eq!(widget.try_next_reply(), None);
        assert_eq!(widget.submit("hi"), Err(WidgetError::Unmounted));
        assert_eq!(widget.open(), Err(WidgetError::Unmounted));
    }
}
