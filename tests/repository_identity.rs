use curly::domain::repositories::IdentityRepository;
use curly::error::AppError;
use curly::infrastructure::persistence::PgIdentityRepository;
use sqlx::PgPool;
use std::sync::Arc;

async fn create_guest(pool: &PgPool, username: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO identities (username, kind) VALUES ($1, 'guest') RETURNING id",
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn create_registered(pool: &PgPool, username: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO identities (username, email, kind, password_hash)
         VALUES ($1, $1 || '@example.com', 'free', 'hash') RETURNING id",
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn create_link(pool: &PgPool, owner_id: i64, slug: &str, url: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO links (owner_id, original_url, slug) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(owner_id)
    .bind(url)
    .bind(slug)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn create_click(pool: &PgPool, link_id: i64, owner_id: i64) {
    sqlx::query("INSERT INTO clicks (link_id, owner_id, ip) VALUES ($1, $2, '203.0.113.7')")
        .bind(link_id)
        .bind(owner_id)
        .execute(pool)
        .await
        .unwrap();
}

async fn count(pool: &PgPool, sql: &str, id: i64) -> i64 {
    sqlx::query_scalar(sql)
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test]
async fn test_adopt_guest_transfers_unmatched_link(pool: PgPool) {
    let guest_id = create_guest(&pool, "guest_transfer").await;
    let target_id = create_registered(&pool, "target_transfer").await;
    let link_id = create_link(&pool, guest_id, "gstslug", "https://a.example/").await;
    create_click(&pool, link_id, guest_id).await;
    create_click(&pool, link_id, guest_id).await;

    let repo = PgIdentityRepository::new(Arc::new(pool.clone()));
    let summary = repo.adopt_guest(guest_id, target_id).await.unwrap();

    assert_eq!(summary.links_transferred, 1);
    assert_eq!(summary.links_merged, 0);
    assert_eq!(summary.clicks_rewritten, 2);

    // Link and its clicks now belong to the target.
    let owner: Option<i64> = sqlx::query_scalar("SELECT owner_id FROM links WHERE id = $1")
        .bind(link_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(owner, Some(target_id));
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM clicks WHERE owner_id = $1", target_id).await,
        2
    );

    // Guest identity and its profile are gone.
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM identities WHERE id = $1", guest_id).await,
        0
    );
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM profiles WHERE identity_id = $1", guest_id).await,
        0
    );
}

#[sqlx::test]
async fn test_adopt_guest_merges_matching_destination(pool: PgPool) {
    let guest_id = create_guest(&pool, "guest_merge").await;
    let target_id = create_registered(&pool, "target_merge").await;
    let guest_link = create_link(&pool, guest_id, "gmslug", "https://same.example/").await;
    let target_link = create_link(&pool, target_id, "tmslug", "https://same.example/").await;
    create_click(&pool, guest_link, guest_id).await;
    create_click(&pool, target_link, target_id).await;

    let repo = PgIdentityRepository::new(Arc::new(pool.clone()));
    let summary = repo.adopt_guest(guest_id, target_id).await.unwrap();

    assert_eq!(summary.links_merged, 1);
    assert_eq!(summary.links_transferred, 0);
    assert_eq!(summary.clicks_rewritten, 1);

    // The guest's duplicate link is deleted, its click history rewritten onto
    // the target's link.
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM links WHERE id = $1", guest_link).await,
        0
    );
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM clicks WHERE link_id = $1", target_link).await,
        2
    );
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM clicks WHERE owner_id = $1", target_id).await,
        2
    );
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM identities WHERE id = $1", guest_id).await,
        0
    );
}

#[sqlx::test]
async fn test_adopt_guest_without_links_still_removes_guest(pool: PgPool) {
    let guest_id = create_guest(&pool, "guest_empty").await;
    let target_id = create_registered(&pool, "target_empty").await;

    let repo = PgIdentityRepository::new(Arc::new(pool.clone()));
    let summary = repo.adopt_guest(guest_id, target_id).await.unwrap();

    assert_eq!(summary.links_transferred, 0);
    assert_eq!(summary.links_merged, 0);
    assert_eq!(summary.clicks_rewritten, 0);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM identities WHERE id = $1", guest_id).await,
        0
    );
}

#[sqlx::test]
async fn test_adopt_rolls_back_when_source_is_not_a_guest(pool: PgPool) {
    // The guest-only delete guard fires when the source identity is not (or
    // no longer) a guest, e.g. a concurrent reconciliation already consumed
    // it. Everything done earlier in the transaction must roll back.
    let source_id = create_registered(&pool, "source_regular").await;
    let target_id = create_registered(&pool, "target_rollback").await;
    let link_id = create_link(&pool, source_id, "rbslug", "https://b.example/").await;
    create_click(&pool, link_id, source_id).await;

    let repo = PgIdentityRepository::new(Arc::new(pool.clone()));
    let result = repo.adopt_guest(source_id, target_id).await;

    assert!(matches!(result, Err(AppError::Conflict { .. })));

    // The transfer that ran before the guard was rolled back.
    let owner: Option<i64> = sqlx::query_scalar("SELECT owner_id FROM links WHERE id = $1")
        .bind(link_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(owner, Some(source_id));
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM clicks WHERE owner_id = $1", source_id).await,
        1
    );
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM identities WHERE id = $1", source_id).await,
        1
    );
}
