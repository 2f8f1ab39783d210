//! Integration tests for [`conversation::ContextResolver`].
//!
//! Uses a temporary SQLite store and [`common::mock_bot::MockBot`] as the live-fetch source.

mod common;

use common::mock_bot::{guild_channel, msg, trigger, MockBot, BOT_ID};
use conversation::{ContextMode, ContextResolver, Resolution, ResolvedContext, ResolverConfig};
use dbot_core::{Channel, DbotError};
use std::sync::Arc;
use storage::{MessageRecord, MessageRepository, MessageStore};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

async fn open_store() -> (Arc<MessageRepository>, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("messages.db");
    let repo = MessageRepository::new(path.to_str().unwrap())
        .await
        .expect("Failed to create repository");
    (Arc::new(repo), dir)
}

fn resolver(store: &Arc<MessageRepository>, bot: &Arc<MockBot>, keyword: Option<&str>) -> ContextResolver {
    let mut config = ResolverConfig::new(BOT_ID);
    config.override_keyword = keyword.map(str::to_string);
    ContextResolver::new(store.clone(), bot.clone(), config)
}

async fn seed(store: &MessageRepository, message: &dbot_core::Message) {
    let record = MessageRecord::from_message(message, message.author.id == BOT_ID);
    store.upsert(&record).await.unwrap();
}

fn resolved(resolution: Resolution) -> ResolvedContext {
    match resolution {
        Resolution::Resolved(context) => context,
        Resolution::NotAddressed => panic!("expected a resolved context"),
    }
}

fn ids(context: &ResolvedContext) -> Vec<&str> {
    context.history.iter().map(|h| h.id.as_str()).collect()
}

/// **Test: A stored chain root -> m1 -> m2 -> trigger resolves oldest-first.**
///
/// **Setup:** root, m1, m2 in the store; trigger replies to m2.
/// **Expected:** history is `[root, m1, m2]`, full mode, no live fetch.
#[tokio::test]
async fn test_stored_chain_is_ordered_oldest_first() {
    let (store, _dir) = open_store().await;
    let root = msg("root", "alice", "what is rust?", None, 1);
    let m1 = msg("m1", BOT_ID, "a language", Some("root"), 2);
    let m2 = msg("m2", "alice", "tell me more", Some("m1"), 3);
    for m in [&root, &m1, &m2] {
        seed(&store, m).await;
    }
    let bot = Arc::new(MockBot::new(Vec::new()));

    let t = trigger("t", "and traits?", Some(&m2), 4);
    let context = resolved(resolver(&store, &bot, None).resolve(&t, &CancellationToken::new()).await.unwrap());

    assert_eq!(ids(&context), vec!["root", "m1", "m2"]);
    assert_eq!(context.mode, ContextMode::Full);
    assert!(context.history[1].is_bot_message);
    assert!(bot.fetched().is_empty());
}

/// **Test: On an empty store the chain is rebuilt with live fetches and written through.**
///
/// **Setup:** Empty store; the platform knows root, m1, m2. The trigger carries m2's body.
/// **Expected:** history is `[root, m1, m2]`; m1 and root were fetched; the store holds all three.
#[tokio::test]
async fn test_live_fetch_fallback_populates_store() {
    let (store, _dir) = open_store().await;
    let root = msg("root", "alice", "what is rust?", None, 1);
    let m1 = msg("m1", BOT_ID, "a language", Some("root"), 2);
    let m2 = msg("m2", "alice", "tell me more", Some("m1"), 3);
    let bot = Arc::new(MockBot::new(vec![root.clone(), m1.clone(), m2.clone()]));

    let t = trigger("t", "and traits?", Some(&m2), 4);
    let context = resolved(resolver(&store, &bot, None).resolve(&t, &CancellationToken::new()).await.unwrap());

    assert_eq!(ids(&context), vec!["root", "m1", "m2"]);
    assert_eq!(bot.fetched(), vec!["m1", "root"]);
    for id in ["root", "m1", "m2", "t"] {
        assert!(store.get(id).await.unwrap().is_some(), "{} should be stored", id);
    }
    assert!(store.get("m1").await.unwrap().unwrap().is_bot_message);
}

/// **Test: Without the parent body in the event, the parent itself is fetched too.**
#[tokio::test]
async fn test_live_fetch_without_parent_body() {
    let (store, _dir) = open_store().await;
    let root = msg("root", "alice", "first", None, 1);
    let m1 = msg("m1", BOT_ID, "second", Some("root"), 2);
    let bot = Arc::new(MockBot::new(vec![root, m1]));

    let mut t = msg("t", "alice", "third", Some("m1"), 3);
    t.mentions = vec![BOT_ID.to_string()];
    let context = resolved(resolver(&store, &bot, None).resolve(&t, &CancellationToken::new()).await.unwrap());

    assert_eq!(ids(&context), vec!["root", "m1"]);
    assert_eq!(bot.fetched(), vec!["m1", "root"]);
}

/// **Test: A failed live fetch truncates the chain but keeps what was found.**
///
/// **Setup:** The platform knows m2 (replying to m1) but not m1.
/// **Expected:** history is `[m2]`; the resolver does not error.
#[tokio::test]
async fn test_fetch_failure_truncates_chain() {
    let (store, _dir) = open_store().await;
    let m2 = msg("m2", "bob", "middle", Some("m1"), 2);
    let bot = Arc::new(MockBot::new(vec![m2]));

    let mut t = msg("t", "alice", "question", Some("m2"), 3);
    t.mentions = vec![BOT_ID.to_string()];
    let context = resolved(resolver(&store, &bot, None).resolve(&t, &CancellationToken::new()).await.unwrap());

    assert_eq!(ids(&context), vec!["m2"]);
    assert_eq!(bot.fetched(), vec!["m2", "m1"]);
}

/// **Test: A reply cycle met during live fetch ends the walk.**
///
/// **Setup:** The platform has a -> b -> a; trigger replies to a.
/// **Expected:** history is `[b, a]`, each once.
#[tokio::test]
async fn test_live_fetch_cycle_terminates() {
    let (store, _dir) = open_store().await;
    let a = msg("a", "alice", "a", Some("b"), 1);
    let b = msg("b", "bob", "b", Some("a"), 2);
    let bot = Arc::new(MockBot::new(vec![a, b]));

    let mut t = msg("t", "alice", "t", Some("a"), 3);
    t.mentions = vec![BOT_ID.to_string()];
    let context = resolved(resolver(&store, &bot, None).resolve(&t, &CancellationToken::new()).await.unwrap());

    assert_eq!(ids(&context), vec!["b", "a"]);
}

/// **Test: The override keyword keeps only the immediate parent, keyword stripped.**
///
/// **Setup:** Chain root -> m1 -> m2 stored, plus an unrelated channel message.
/// **Expected:** history is `[m2]` with the keyword removed; mode Reduced; no window items.
#[tokio::test]
async fn test_reduced_mode_keeps_parent_only() {
    let (store, _dir) = open_store().await;
    let root = msg("root", "alice", "first", None, 1);
    let m1 = msg("m1", BOT_ID, "second", Some("root"), 2);
    let m2 = msg("m2", "alice", "nosys summarize this", Some("m1"), 3);
    let other = msg("x", "carol", "unrelated chatter", None, 4);
    for m in [&root, &m1, &m2, &other] {
        seed(&store, m).await;
    }
    let bot = Arc::new(MockBot::new(Vec::new()));

    let t = trigger("t", "nosys go", Some(&m2), 5);
    let context = resolved(
        resolver(&store, &bot, Some("nosys"))
            .resolve(&t, &CancellationToken::new())
            .await
            .unwrap(),
    );

    assert_eq!(context.mode, ContextMode::Reduced);
    assert_eq!(ids(&context), vec!["m2"]);
    assert_eq!(context.history[0].content, "summarize this");
}

/// **Test: Reduced mode with no parent yields an empty history.**
#[tokio::test]
async fn test_reduced_mode_without_parent() {
    let (store, _dir) = open_store().await;
    seed(&store, &msg("x", "carol", "chatter", None, 1)).await;
    let bot = Arc::new(MockBot::new(Vec::new()));

    let t = trigger("t", "nosys hello", None, 2);
    let context = resolved(
        resolver(&store, &bot, Some("nosys"))
            .resolve(&t, &CancellationToken::new())
            .await
            .unwrap(),
    );

    assert_eq!(context.mode, ContextMode::Reduced);
    assert!(context.history.is_empty());
}

/// **Test: A trigger that neither mentions nor replies to the bot is not addressed and writes nothing.**
#[tokio::test]
async fn test_not_addressed_leaves_store_untouched() {
    let (store, _dir) = open_store().await;
    let parent = msg("p", "bob", "hey", None, 1);
    let mut t = msg("t", "alice", "hello", Some("p"), 2);
    t.referenced = Some(Box::new(parent));
    let bot = Arc::new(MockBot::new(Vec::new()));

    let resolution = resolver(&store, &bot, None)
        .resolve(&t, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(resolution, Resolution::NotAddressed);
    assert_eq!(store.count().await.unwrap(), 0);
    assert!(bot.fetched().is_empty());
}

/// **Test: Replying to a bot message addresses the bot without a mention.**
#[tokio::test]
async fn test_reply_to_bot_is_addressed() {
    let (store, _dir) = open_store().await;
    let parent = msg("p", BOT_ID, "earlier answer", None, 1);
    let mut t = msg("t", "alice", "follow-up", Some("p"), 2);
    t.referenced = Some(Box::new(parent));
    let bot = Arc::new(MockBot::new(Vec::new()));

    let context = resolved(resolver(&store, &bot, None).resolve(&t, &CancellationToken::new()).await.unwrap());

    assert_eq!(ids(&context), vec!["p"]);
    assert!(context.history[0].is_bot_message);
}

/// **Test: Direct messages are addressed without a mention unless configured otherwise.**
#[tokio::test]
async fn test_direct_context_relaxes_addressing() {
    let (store, _dir) = open_store().await;
    let bot = Arc::new(MockBot::new(Vec::new()));
    let mut t = msg("t", "alice", "hi there", None, 1);
    t.channel = Channel {
        id: "dm".to_string(),
        guild_id: None,
    };

    let relaxed = resolver(&store, &bot, None)
        .resolve(&t, &CancellationToken::new())
        .await
        .unwrap();
    assert!(matches!(relaxed, Resolution::Resolved(_)));

    let mut config = ResolverConfig::new(BOT_ID);
    config.dm_requires_mention = true;
    let strict = ContextResolver::new(store.clone(), bot.clone(), config)
        .resolve(&t, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(strict, Resolution::NotAddressed);
}

/// **Test: Window enrichment appends new texts newest-first and drops duplicates.**
///
/// **Setup:** Chain root -> m1; channel messages w1 (same text as root), w2 and w3 (same text),
/// w4 (new text); trigger replies to m1.
/// **Expected:** `[root, m1, w4, w3]`: w1 collides with the chain, w2 with w3, the trigger is excluded.
#[tokio::test]
async fn test_window_enrichment_dedups_by_content() {
    let (store, _dir) = open_store().await;
    let root = msg("root", "alice", "root text", None, 1);
    let m1 = msg("m1", BOT_ID, "answer", Some("root"), 2);
    let w1 = msg("w1", "bob", "root text", None, 10);
    let w2 = msg("w2", "bob", "fresh", None, 11);
    let w3 = msg("w3", "carol", "fresh", None, 12);
    let w4 = msg("w4", "dave", "another", None, 13);
    let elsewhere = dbot_core::Message {
        channel: Channel {
            id: "c2".to_string(),
            guild_id: guild_channel().guild_id,
        },
        ..msg("z", "erin", "other channel", None, 14)
    };
    for m in [&root, &m1, &w1, &w2, &w3, &w4, &elsewhere] {
        seed(&store, m).await;
    }
    let bot = Arc::new(MockBot::new(Vec::new()));

    let t = trigger("t", "question", Some(&m1), 20);
    let context = resolved(resolver(&store, &bot, None).resolve(&t, &CancellationToken::new()).await.unwrap());

    assert_eq!(ids(&context), vec!["root", "m1", "w4", "w3"]);
}

/// **Test: A trigger with no parent still gets the recent window.**
#[tokio::test]
async fn test_window_without_chain() {
    let (store, _dir) = open_store().await;
    seed(&store, &msg("w1", "bob", "earlier", None, 1)).await;
    let bot = Arc::new(MockBot::new(Vec::new()));

    let t = trigger("t", "hello", None, 2);
    let context = resolved(resolver(&store, &bot, None).resolve(&t, &CancellationToken::new()).await.unwrap());

    assert_eq!(ids(&context), vec!["w1"]);
}

/// **Test: Cancellation during a live fetch returns Cancelled.**
#[tokio::test]
async fn test_cancelled_during_fetch() {
    let (store, _dir) = open_store().await;
    let bot = Arc::new(MockBot::hanging());
    let mut t = msg("t", "alice", "hello", Some("missing"), 1);
    t.mentions = vec![BOT_ID.to_string()];

    let cancel = CancellationToken::new();
    cancel.cancel();
    let result = resolver(&store, &bot, None).resolve(&t, &cancel).await;

    assert!(matches!(result, Err(DbotError::Cancelled)));
}
