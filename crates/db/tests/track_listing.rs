//! Integration tests for the track listing engine.
//!
//! Exercises `TrackRepo::list` against a real database:
//! - Sorting with the id tiebreak and page boundaries
//! - Total count independent of page selection
//! - Title, artist, and genre predicates and their conjunction
//! - Live like counts
//! - Validation failures that never reach the database

use std::collections::HashSet;
use std::time::Duration;

use assert_matches::assert_matches;
use sqlx::PgPool;
use spookify_core::listing::{ListingError, ListingParams, ListingRequest, StorageFailure};
use spookify_core::types::DbId;
use spookify_db::models::artist::CreateArtist;
use spookify_db::models::track::{CreateTrack, ListingResult};
use spookify_db::models::user::CreateUser;
use spookify_db::repositories::{ArtistRepo, LikeRepo, TrackRepo, UserRepo};

const DEADLINE: Duration = Duration::from_secs(5);

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn artist(pool: &PgPool, name: &str) -> DbId {
    ArtistRepo::create(
        pool,
        &CreateArtist {
            name: name.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn track(pool: &PgPool, artist_id: DbId, title: &str, year: i32, genres: &[&str]) -> DbId {
    TrackRepo::create(
        pool,
        &CreateTrack {
            artist_id,
            title: title.to_string(),
            duration: 180,
            year,
            genres: genres.iter().map(|g| g.to_string()).collect(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn user(pool: &PgPool, email: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Listener".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn list(pool: &PgPool, params: ListingParams) -> ListingResult {
    TrackRepo::list_with_params(pool, &params, DEADLINE)
        .await
        .unwrap()
}

fn ids(result: &ListingResult) -> Vec<DbId> {
    result.rows.iter().map(|row| row.track.id).collect()
}

// ---------------------------------------------------------------------------
// Sorting and pagination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_seven_tracks_by_year_descending(pool: PgPool) {
    let a = artist(&pool, "Polar Static").await;
    let t1 = track(&pool, a, "One", 2001, &[]).await;
    let t2 = track(&pool, a, "Two", 2010, &[]).await;
    let t3 = track(&pool, a, "Three", 2010, &[]).await;
    let t4 = track(&pool, a, "Four", 1999, &[]).await;
    let t5 = track(&pool, a, "Five", 2020, &[]).await;
    let t6 = track(&pool, a, "Six", 2010, &[]).await;
    let t7 = track(&pool, a, "Seven", 1985, &[]).await;

    let first = list(
        &pool,
        ListingParams {
            sort: "-year".into(),
            page: 1,
            page_size: 5,
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(first.total_matches, 7);
    assert_eq!(ids(&first), vec![t5, t2, t3, t6, t1]);

    let second = list(
        &pool,
        ListingParams {
            sort: "-year".into(),
            page: 2,
            page_size: 5,
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(second.total_matches, 7);
    assert_eq!(ids(&second), vec![t4, t7]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_sort_by_title_ascending(pool: PgPool) {
    let a = artist(&pool, "Alphabet").await;
    let c = track(&pool, a, "charlie", 2000, &[]).await;
    let b = track(&pool, a, "bravo", 2000, &[]).await;
    let al = track(&pool, a, "alpha", 2000, &[]).await;

    let result = list(
        &pool,
        ListingParams {
            sort: "title".into(),
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(ids(&result), vec![al, b, c]);

    let result = list(
        &pool,
        ListingParams {
            sort: "-id".into(),
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(ids(&result), vec![al, b, c]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pages_cover_all_rows_when_sort_values_tie(pool: PgPool) {
    let a = artist(&pool, "Same Year Band").await;
    let mut expected = Vec::new();
    for i in 0..12 {
        expected.push(track(&pool, a, &format!("Song {i}"), 2015, &[]).await);
    }

    let mut seen = Vec::new();
    let mut page = 1;
    loop {
        let result = list(
            &pool,
            ListingParams {
                sort: "-year".into(),
                page,
                page_size: 5,
                ..ListingParams::default()
            },
        )
        .await;
        assert_eq!(result.total_matches, 12);
        if result.rows.is_empty() {
            break;
        }
        seen.extend(ids(&result));
        page += 1;
    }

    assert_eq!(page, 4, "12 rows in pages of 5 end after page 3");
    let unique: HashSet<_> = seen.iter().collect();
    assert_eq!(unique.len(), seen.len(), "no row repeated across pages");
    assert_eq!(seen, expected, "ties are broken by ascending id");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_page_past_end_reports_total(pool: PgPool) {
    let a = artist(&pool, "Tiny Catalog").await;
    track(&pool, a, "Only", 2000, &[]).await;
    track(&pool, a, "Other", 2001, &[]).await;

    let result = list(
        &pool,
        ListingParams {
            page: 1_000_000,
            page_size: 50,
            ..ListingParams::default()
        },
    )
    .await;
    assert!(result.rows.is_empty());
    assert_eq!(result.total_matches, 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_table(pool: PgPool) {
    let result = list(&pool, ListingParams::default()).await;
    assert!(result.rows.is_empty());
    assert_eq!(result.total_matches, 0);
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_genre_filter_requires_every_tag(pool: PgPool) {
    let a = artist(&pool, "Stage Divers").await;
    let both = track(&pool, a, "Encore", 2011, &["rock", "live", "indie"]).await;
    track(&pool, a, "Studio Cut", 2011, &["rock"]).await;
    track(&pool, a, "Unplugged", 2011, &["live", "acoustic"]).await;

    let result = list(
        &pool,
        ListingParams {
            genres: vec!["rock".into(), "live".into()],
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(ids(&result), vec![both]);
    assert_eq!(result.total_matches, 1);
    assert_eq!(result.rows[0].track.genres, vec!["rock", "live", "indie"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_title_text_search_matches_tokens(pool: PgPool) {
    let a = artist(&pool, "Roadtrip").await;
    let night_drive = track(&pool, a, "Night Drive", 2018, &[]).await;
    let morning_drive = track(&pool, a, "Morning Drive", 2018, &[]).await;
    let night_swim = track(&pool, a, "Night Swim", 2018, &[]).await;
    track(&pool, a, "Nightfall", 2018, &[]).await;

    let night = list(
        &pool,
        ListingParams {
            title: "NIGHT".into(),
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(ids(&night), vec![night_drive, night_swim]);

    let drive = list(
        &pool,
        ListingParams {
            title: "drive".into(),
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(ids(&drive), vec![night_drive, morning_drive]);

    let both_terms = list(
        &pool,
        ListingParams {
            title: "drive night".into(),
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(ids(&both_terms), vec![night_drive]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_artist_filter(pool: PgPool) {
    let moon = artist(&pool, "Moon Harbor").await;
    let sun = artist(&pool, "Sun Harbor").await;
    let m1 = track(&pool, moon, "Tide", 2005, &[]).await;
    let s1 = track(&pool, sun, "Glare", 2006, &[]).await;

    let result = list(
        &pool,
        ListingParams {
            artist: "moon".into(),
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(ids(&result), vec![m1]);
    let artist = result.rows[0].artist.as_ref().expect("artist joined");
    assert_eq!(artist.name, "Moon Harbor");

    let result = list(
        &pool,
        ListingParams {
            artist: "harbor".into(),
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(ids(&result), vec![m1, s1]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_filters_are_conjunctive(pool: PgPool) {
    let moon = artist(&pool, "Moon Harbor").await;
    let sun = artist(&pool, "Sun Harbor").await;
    let hit = track(&pool, moon, "Blue Tide", 2005, &["rock", "live"]).await;
    track(&pool, moon, "Blue Tide", 2005, &["rock"]).await;
    track(&pool, moon, "Red Tide", 2005, &["rock", "live"]).await;
    track(&pool, sun, "Blue Tide", 2005, &["rock", "live"]).await;

    let result = list(
        &pool,
        ListingParams {
            title: "blue".into(),
            artist: "moon".into(),
            genres: vec!["live".into(), "rock".into()],
            ..ListingParams::default()
        },
    )
    .await;
    assert_eq!(ids(&result), vec![hit]);
    assert_eq!(result.total_matches, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_total_is_independent_of_page_size(pool: PgPool) {
    let a = artist(&pool, "Counters").await;
    for i in 0..9 {
        let genres: &[&str] = if i % 3 == 0 { &["jazz"] } else { &["pop"] };
        track(&pool, a, &format!("Tune {i}"), 1990 + i, genres).await;
    }

    for (page, page_size) in [(1, 1), (2, 2), (1, 50), (7, 3)] {
        let result = list(
            &pool,
            ListingParams {
                genres: vec!["pop".into()],
                page,
                page_size,
                ..ListingParams::default()
            },
        )
        .await;
        assert_eq!(result.total_matches, 6, "page={page} page_size={page_size}");
    }
}

// ---------------------------------------------------------------------------
// Likes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_like_counts_are_per_track(pool: PgPool) {
    let a = artist(&pool, "Beloved").await;
    let popular = track(&pool, a, "Popular", 2000, &[]).await;
    let ignored = track(&pool, a, "Ignored", 2000, &[]).await;

    let u1 = user(&pool, "one@example.com").await;
    let u2 = user(&pool, "two@example.com").await;
    assert!(LikeRepo::like(&pool, u1, popular).await.unwrap());
    assert!(LikeRepo::like(&pool, u2, popular).await.unwrap());
    assert!(!LikeRepo::like(&pool, u2, popular).await.unwrap(), "second like is a no-op");

    let result = list(&pool, ListingParams::default()).await;
    assert_eq!(ids(&result), vec![popular, ignored]);
    assert_eq!(result.rows[0].likes, 2);
    assert_eq!(result.rows[1].likes, 0);
    assert_eq!(result.total_matches, 2, "likes join must not multiply rows");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unsafe_sort_key_is_rejected(pool: PgPool) {
    let a = artist(&pool, "Guarded").await;
    track(&pool, a, "Safe", 2000, &[]).await;

    let result = TrackRepo::list_with_params(
        &pool,
        &ListingParams {
            sort: "title; DROP TABLE tracks".into(),
            ..ListingParams::default()
        },
        DEADLINE,
    )
    .await;
    assert_matches!(result, Err(ListingError::UnsafeSortKey(_)));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_pagination_is_rejected(pool: PgPool) {
    for (page, page_size) in [(0, 5), (1, 51), (1, 0), (-3, 5)] {
        let result = TrackRepo::list_with_params(
            &pool,
            &ListingParams {
                page,
                page_size,
                ..ListingParams::default()
            },
            DEADLINE,
        )
        .await;
        assert_matches!(result, Err(ListingError::InvalidPagination(_)));
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_deadline_is_a_storage_timeout(pool: PgPool) {
    let request = ListingRequest::from_params(&ListingParams::default()).unwrap();
    let result = TrackRepo::list(&pool, &request, Duration::ZERO).await;
    assert_matches!(
        result,
        Err(ListingError::StorageFailure(StorageFailure::Timeout(d))) if d == Duration::ZERO
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_closed_pool_is_a_storage_failure(pool: PgPool) {
    pool.close().await;
    let request = ListingRequest::from_params(&ListingParams::default()).unwrap();
    let result = TrackRepo::list(&pool, &request, DEADLINE).await;
    assert_matches!(
        result,
        Err(ListingError::StorageFailure(StorageFailure::Query(_)))
    );
}
