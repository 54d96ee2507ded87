//! End-to-end workflow tests through the service facade
//!
//! These tests drive the same paths the CLIs use:
//! - Login creates accounts with a self-follow
//! - Following and unfollowing change what the home feed shows
//! - New follows notify the followed account exactly once
//! - Published posts become searchable

use anyhow::Result;
use libmicroblog::config::Config;
use libmicroblog::db::Database;
use libmicroblog::notify::{MockNotifier, Notification};
use libmicroblog::search::SqliteSearchIndex;
use libmicroblog::service::MicroblogService;
use libmicroblog::types::{TimelineEntry, Viewer};
use std::sync::Arc;
use tempfile::TempDir;

/// Helper to build a service over a temporary database with a recording notifier
async fn create_test_service() -> Result<(TempDir, MicroblogService, MockNotifier)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db_path_str = db_path.to_string_lossy().to_string();

    let db = Database::new(&db_path_str).await?;
    let index = Arc::new(SqliteSearchIndex::new(db.pool().clone()));
    let notifier = MockNotifier::new();
    let config = Config::with_database(db_path_str);

    let service =
        MicroblogService::with_components(&config, Arc::new(db), index, Arc::new(notifier.clone()));
    Ok((temp_dir, service, notifier))
}

async fn signed_in(service: &MicroblogService, email: &str) -> Result<Viewer> {
    let outcome = service.accounts().login(email, None).await?;
    Ok(service.accounts().sign_in(&outcome.account.nickname).await?)
}

fn bodies(entries: &[TimelineEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.post.body.as_str()).collect()
}

#[tokio::test]
async fn test_follow_then_unfollow_changes_feed() -> Result<()> {
    let (_temp_dir, service, _notifier) = create_test_service().await?;

    let john = signed_in(&service, "john@example.com").await?;
    let susan = signed_in(&service, "susan@example.com").await?;
    let susan_account = susan.account()?.clone();

    service.posting().publish(&john, "john's first post").await?;
    service.posting().publish(&susan, "susan says hi").await?;

    // Own posts are always visible, others only after following
    let feed = service.feed().followed_posts(john.account()?, 1, 10).await?;
    assert_eq!(bodies(&feed.items), vec!["john's first post"]);

    let followed = service.graph().follow(&john, &susan_account).await?;
    assert_eq!(followed.map(|a| a.nickname), Some("john".to_string()));

    let feed = service.feed().followed_posts(john.account()?, 1, 10).await?;
    let mut seen = bodies(&feed.items);
    seen.sort();
    assert_eq!(seen, vec!["john's first post", "susan says hi"]);

    let unfollowed = service.graph().unfollow(&john, &susan_account).await?;
    assert!(unfollowed.is_some());

    let feed = service.feed().followed_posts(john.account()?, 1, 10).await?;
    assert_eq!(bodies(&feed.items), vec!["john's first post"]);

    Ok(())
}

#[tokio::test]
async fn test_follow_is_idempotent() -> Result<()> {
    let (_temp_dir, service, _notifier) = create_test_service().await?;

    let john = signed_in(&service, "john@example.com").await?;
    let susan = signed_in(&service, "susan@example.com").await?;
    let susan_account = susan.account()?.clone();

    assert!(service.graph().follow(&john, &susan_account).await?.is_some());
    assert!(service.graph().follow(&john, &susan_account).await?.is_none());

    let followers = service.graph().followers(&susan_account).await?;
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].nickname, "john");

    Ok(())
}

#[tokio::test]
async fn test_unfollow_without_edge_is_noop() -> Result<()> {
    let (_temp_dir, service, _notifier) = create_test_service().await?;

    let john = signed_in(&service, "john@example.com").await?;
    let susan = signed_in(&service, "susan@example.com").await?;
    let susan_account = susan.account()?.clone();

    assert!(service.graph().unfollow(&john, &susan_account).await?.is_none());
    assert!(!service
        .graph()
        .is_following(john.account()?, &susan_account)
        .await?);

    Ok(())
}

#[tokio::test]
async fn test_self_follow_cannot_be_removed() -> Result<()> {
    let (_temp_dir, service, _notifier) = create_test_service().await?;

    let john = signed_in(&service, "john@example.com").await?;
    let john_account = john.account()?.clone();

    // Already following oneself from account creation
    assert!(service.graph().follow(&john, &john_account).await?.is_none());
    assert!(service.graph().unfollow(&john, &john_account).await?.is_none());
    assert!(service
        .graph()
        .is_following(&john_account, &john_account)
        .await?);

    Ok(())
}

#[tokio::test]
async fn test_follow_lists_exclude_self_edge() -> Result<()> {
    let (_temp_dir, service, _notifier) = create_test_service().await?;

    let john = signed_in(&service, "john@example.com").await?;
    let susan = signed_in(&service, "susan@example.com").await?;
    let mary = signed_in(&service, "mary@example.com").await?;
    let john_account = john.account()?.clone();

    service.graph().follow(&john, susan.account()?).await?;
    service.graph().follow(&john, mary.account()?).await?;
    service.graph().follow(&susan, &john_account).await?;

    let following: Vec<String> = service
        .graph()
        .following(&john_account)
        .await?
        .into_iter()
        .map(|a| a.nickname)
        .collect();
    assert_eq!(following, vec!["mary", "susan"]);

    let counts = service.graph().follow_counts(&john_account).await?;
    assert_eq!(counts.followers, 1);
    assert_eq!(counts.following, 2);

    Ok(())
}

#[tokio::test]
async fn test_new_follow_sends_one_notification() -> Result<()> {
    let (_temp_dir, service, notifier) = create_test_service().await?;

    let john = signed_in(&service, "john@example.com").await?;
    let susan = signed_in(&service, "susan@example.com").await?;
    let susan_account = susan.account()?.clone();
    let john_account = john.account()?.clone();

    service.graph().follow(&john, &susan_account).await?;
    service.graph().follow(&john, &susan_account).await?;
    service.graph().follow(&john, &john_account).await?;
    service.flush_notifications().await?;

    let delivered = notifier.delivered();
    assert_eq!(delivered.len(), 1);
    match &delivered[0] {
        Notification::NewFollower {
            recipient,
            follower,
        } => {
            assert_eq!(recipient.nickname, "susan");
            assert_eq!(follower.nickname, "john");
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_failing_notifier_does_not_fail_follow() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db_path_str = db_path.to_string_lossy().to_string();
    let db = Database::new(&db_path_str).await?;
    let index = Arc::new(SqliteSearchIndex::new(db.pool().clone()));
    let notifier = MockNotifier::failing();
    let service = MicroblogService::with_components(
        &Config::with_database(db_path_str),
        Arc::new(db),
        index,
        Arc::new(notifier.clone()),
    );

    let john = signed_in(&service, "john@example.com").await?;
    let susan = signed_in(&service, "susan@example.com").await?;

    assert!(service.graph().follow(&john, susan.account()?).await?.is_some());
    service.flush_notifications().await?;
    assert_eq!(notifier.attempt_count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_published_posts_are_searchable() -> Result<()> {
    let (_temp_dir, service, _notifier) = create_test_service().await?;

    let john = signed_in(&service, "john@example.com").await?;
    service.posting().publish(&john, "Beautiful day in Portland!").await?;
    service.posting().publish(&john, "The Avengers movie was so cool!").await?;

    let results = service.search().search("portland").await?;
    assert_eq!(bodies(&results), vec!["Beautiful day in Portland!"]);
    assert_eq!(results[0].author.nickname, "john");

    assert!(service.search().search("").await?.is_empty());
    assert!(service.search().search("nowhere").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_anonymous_viewer_is_rejected() -> Result<()> {
    let (_temp_dir, service, _notifier) = create_test_service().await?;

    let susan = signed_in(&service, "susan@example.com").await?;
    let anonymous = Viewer::Anonymous;

    let follow = service.graph().follow(&anonymous, susan.account()?).await;
    assert_eq!(follow.unwrap_err().exit_code(), 2);

    let feed = service.feed().home_feed(&anonymous, 1).await;
    assert_eq!(feed.unwrap_err().exit_code(), 2);

    Ok(())
}
