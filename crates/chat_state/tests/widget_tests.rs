//! Integration tests for the chat widget's delayed replies

use std::time::Duration;

use chat_core::rules::builtin::{GREETING_REPLY, PITSTOP_DEEP_DIVE_REPLY, PITSTOP_REPLY};
use chat_core::{ContextTag, Responder, Speaker, WidgetConfig};
use chat_state::{ChatWidget, SubmitOutcome, WidgetState};

fn open_widget() -> ChatWidget {
    let mut widget = ChatWidget::with_responder(WidgetConfig::default(), Responder::default());
    widget.open().unwrap();
    widget
}

#[tokio::test(start_paused = true)]
async fn test_reply_arrives_after_typing_delay() {
    let mut widget = open_widget();
    widget.submit("hi").unwrap();

    assert_eq!(widget.transcript().len(), 1);
    assert_eq!(widget.state(), &WidgetState::AwaitingReply { pending: 1 });

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(widget.try_next_reply().is_none());

    let reply = widget.next_reply().await.unwrap();
    assert_eq!(reply.speaker, Speaker::Bot);
    assert_eq!(reply.text, GREETING_REPLY);
    assert_eq!(widget.transcript().len(), 2);
    assert_eq!(widget.state(), &WidgetState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_script_yields_two_entries_per_turn() {
    let mut widget = open_widget();
    let script = ["hi", "tell me about pitstop", "more"];

    let mut contexts = Vec::new();
    for utterance in script {
        match widget.submit(utterance).unwrap() {
            SubmitOutcome::Scheduled { next_context, .. } => contexts.push(next_context),
            SubmitOutcome::Ignored => panic!("{utterance:?} was ignored"),
        }
        widget.next_reply().await.unwrap();
    }

    assert_eq!(
        contexts,
        vec![ContextTag::Intro, ContextTag::PitstopDeep, ContextTag::Projects]
    );
    assert_eq!(widget.transcript().len(), 2 * script.len());

    let texts: Vec<&str> = widget
        .transcript()
        .iter()
        .filter(|e| e.speaker == Speaker::Bot)
        .map(|e| e.text.as_str())
        .collect();
    assert_eq!(texts, vec![GREETING_REPLY, PITSTOP_REPLY, PITSTOP_DEEP_DIVE_REPLY]);
}

#[tokio::test(start_paused = true)]
async fn test_rapid_submissions_settle_in_order() {
    let mut widget = open_widget();
    widget.submit("hi").unwrap();
    widget.submit("   ").unwrap();
    widget.submit("skills?").unwrap();
    widget.submit("more").unwrap();
    assert_eq!(widget.pending_replies(), 3);

    let delivered = widget.settle().await;
    assert_eq!(delivered.len(), 3);
    assert_eq!(widget.transcript().len(), 6);
    assert_eq!(widget.transcript().count(Speaker::User), 3);
    assert_eq!(widget.context(), ContextTag::Skills);
    assert_eq!(widget.state(), &WidgetState::Open);
}

#[tokio::test(start_paused = true)]
async fn test_close_discards_pending_reply() {
    let mut widget = open_widget();
    widget.submit("hi").unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;
    widget.close().unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(widget.pending_replies(), 0);
    assert!(widget.try_next_reply().is_none());
    assert_eq!(widget.transcript().len(), 1);
    assert_eq!(widget.state(), &WidgetState::Closed);

    // The conversation survives a close; only the late reply is gone.
    widget.open().unwrap();
    assert_eq!(widget.context(), ContextTag::Intro);
    assert!(widget.next_reply().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_reply_queued_before_close_is_dropped() {
    let mut widget = open_widget();
    widget.submit("hi").unwrap();

    // Let the delivery reach the channel without consuming it.
    tokio::time::sleep(Duration::from_secs(1)).await;
    widget.close().unwrap();
    widget.open().unwrap();

    widget.submit("tell me about pitstop").unwrap();
    let reply = widget.next_reply().await.unwrap();
    assert_eq!(reply.text, PITSTOP_REPLY);

    let bots = widget.transcript().count(Speaker::Bot);
    assert_eq!(bots, 1);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_pending_tasks() {
    let mut widget = open_widget();
    widget.submit("hi").unwrap();
    drop(widget);
    // Nothing left to deliver to; the spawned task must simply finish.
    tokio::time::sleep(Duration::from_secs(2)).await;
}
