//! Feed ordering and pagination tests
//!
//! Posts are written with explicit timestamps so ordering does not depend on
//! the wall clock.

use anyhow::Result;
use libmicroblog::db::Database;
use libmicroblog::error::MicroblogError;
use libmicroblog::service::feed::FeedService;
use libmicroblog::store::Store;
use libmicroblog::types::{Account, NewAccount, NewPost, Post, PostId, Viewer};
use std::sync::Arc;
use tempfile::TempDir;

async fn create_test_db() -> Result<(TempDir, Arc<Database>)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db = Database::new(&db_path.to_string_lossy()).await?;
    Ok((temp_dir, Arc::new(db)))
}

async fn account(db: &Database, nickname: &str) -> Result<Account> {
    Ok(db
        .create_account(NewAccount {
            nickname: nickname.to_string(),
            email: format!("{}@example.com", nickname),
            created_at: 0,
        })
        .await?)
}

async fn post(db: &Database, author: &Account, body: &str, at: i64) -> Result<Post> {
    Ok(db
        .create_post(NewPost {
            author_id: author.id,
            body: body.to_string(),
            created_at: at,
        })
        .await?)
}

#[tokio::test]
async fn test_feed_contains_followed_authors_newest_first() -> Result<()> {
    let (_temp_dir, db) = create_test_db().await?;

    let a = account(&db, "a").await?;
    let b = account(&db, "b").await?;
    let c = account(&db, "c").await?;
    let d = account(&db, "d").await?;

    let pa = post(&db, &a, "from a", 1).await?;
    let pb = post(&db, &b, "from b", 2).await?;
    let _pc = post(&db, &c, "from c", 3).await?;
    let pd = post(&db, &d, "from d", 4).await?;

    db.insert_follow(a.id, b.id).await?;
    db.insert_follow(a.id, d.id).await?;

    let feed = FeedService::new(db.clone(), 3);
    let page = feed.followed_posts(&a, 1, 10).await?;
    let ids: Vec<PostId> = page.items.iter().map(|e| e.post.id).collect();

    assert_eq!(ids, vec![pd.id, pb.id, pa.id]);
    assert!(!page.has_next);

    Ok(())
}

#[tokio::test]
async fn test_feed_is_not_transitive() -> Result<()> {
    let (_temp_dir, db) = create_test_db().await?;

    let a = account(&db, "a").await?;
    let b = account(&db, "b").await?;
    let c = account(&db, "c").await?;
    post(&db, &c, "from c", 1).await?;

    db.insert_follow(a.id, b.id).await?;
    db.insert_follow(b.id, c.id).await?;

    let feed = FeedService::new(db.clone(), 3);
    assert!(feed.followed_posts(&a, 1, 10).await?.items.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_pages_are_disjoint_and_concatenate() -> Result<()> {
    let (_temp_dir, db) = create_test_db().await?;

    let a = account(&db, "a").await?;
    let b = account(&db, "b").await?;
    db.insert_follow(a.id, b.id).await?;

    // Some timestamps collide to exercise the id tie-break
    for i in 0..7i64 {
        let author = if i % 2 == 0 { &a } else { &b };
        post(&db, author, &format!("post {}", i), i / 2).await?;
    }

    let feed = FeedService::new(db.clone(), 3);
    let full: Vec<PostId> = feed
        .followed_posts(&a, 1, 100)
        .await?
        .items
        .iter()
        .map(|e| e.post.id)
        .collect();
    assert_eq!(full.len(), 7);

    let mut paged = Vec::new();
    let mut page_number = 1;
    loop {
        let page = feed.followed_posts(&a, page_number, 3).await?;
        assert!(page.items.len() <= 3);
        paged.extend(page.items.iter().map(|e| e.post.id));
        match page.next_page() {
            Some(next) => page_number = next,
            None => break,
        }
    }

    assert_eq!(page_number, 3);
    assert_eq!(paged, full);

    Ok(())
}

#[tokio::test]
async fn test_home_feed_uses_configured_page_size() -> Result<()> {
    let (_temp_dir, db) = create_test_db().await?;

    let a = account(&db, "a").await?;
    for i in 0..5i64 {
        post(&db, &a, &format!("post {}", i), i).await?;
    }

    let feed = FeedService::new(db.clone(), 3);
    let viewer: Viewer = a.clone().into();

    let first = feed.home_feed(&viewer, 1).await?;
    assert_eq!(first.items.len(), 3);
    assert!(first.has_next);
    assert!(!first.has_prev());

    let second = feed.home_feed(&viewer, 2).await?;
    assert_eq!(second.items.len(), 2);
    assert!(!second.has_next);
    assert_eq!(second.prev_page(), Some(1));

    let past_end = feed.home_feed(&viewer, 9).await?;
    assert!(past_end.items.is_empty());

    assert!(feed.home_feed(&viewer, 0).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_user_posts_only_show_author() -> Result<()> {
    let (_temp_dir, db) = create_test_db().await?;

    let a = account(&db, "a").await?;
    let b = account(&db, "b").await?;
    db.insert_follow(a.id, b.id).await?;
    post(&db, &a, "mine", 1).await?;
    post(&db, &b, "theirs", 2).await?;

    let feed = FeedService::new(db.clone(), 3);
    let page = feed.user_posts(&a, 1).await?;
    let bodies: Vec<&str> = page.items.iter().map(|e| e.post.body.as_str()).collect();
    assert_eq!(bodies, vec!["mine"]);

    Ok(())
}

#[tokio::test]
async fn test_huge_page_requests_do_not_panic() -> Result<()> {
    let (_temp_dir, db) = create_test_db().await?;

    let a = account(&db, "a").await?;
    post(&db, &a, "only post", 1).await?;

    let feed = FeedService::new(db.clone(), 3);

    let past_end = feed.followed_posts(&a, u32::MAX, 1).await?;
    assert!(past_end.items.is_empty());
    assert!(!past_end.has_next);

    let everything = feed.followed_posts(&a, 1, u32::MAX).await?;
    assert_eq!(everything.items.len(), 1);

    let overflow = feed.followed_posts(&a, u32::MAX, u32::MAX).await;
    assert!(matches!(overflow, Err(MicroblogError::InvalidInput(_))));

    Ok(())
}
