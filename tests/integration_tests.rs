//! End-to-end integration tests

use chrono::Utc;
use tempfile::TempDir;

use waypoint::auth::provider::Provider;
use waypoint::storage::models::{Coordinate, Landmark, Member, Spot};
use waypoint::storage::{Database, SpotDelete};
use waypoint::tokens::session;

fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

fn make_member(id: &str, provider_key: &str) -> Member {
    Member {
        created_at: Utc::now(),
        email: None,
        id: id.to_string(),
        image_url: None,
        nickname: format!("member-{id}"),
        notice_token: None,
        point: 0,
        provider: Provider::Kakao,
        provider_key: provider_key.to_string(),
    }
}

fn make_spot(id: &str, member_id: &str) -> Spot {
    Spot {
        coordinate: Coordinate {
            lat: 37.55,
            lng: 126.99,
        },
        created_at: Utc::now(),
        deleted: false,
        id: id.to_string(),
        image_url: format!("https://img.example.com/{id}.jpg"),
        landmark_id: None,
        like_count: 0,
        member_id: member_id.to_string(),
        scrap_count: 0,
        tags: vec!["sunset".to_string()],
    }
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (db, _temp) = setup_db();

    db.put_member(&make_member("m1", "k-1")).unwrap();

    // Mint a session
    let minted = session::create(&db, "m1", 3600).unwrap();

    // Validate it resolves to the member
    let validated = session::validate(&db, &minted.token).unwrap();
    assert_eq!(validated.unwrap().member_id, "m1");

    // Revoke it
    assert!(db.delete_session(&minted.token).unwrap());

    // Verify it's gone
    let validated = session::validate(&db, &minted.token).unwrap();
    assert!(validated.is_none());
}

#[tokio::test]
async fn test_spot_lifecycle() {
    let (db, _temp) = setup_db();

    db.put_member(&make_member("m1", "k-1")).unwrap();
    db.put_spot(&make_spot("s1", "m1")).unwrap();

    // Another member likes and scraps it
    let like = db.toggle_like("m2", "s1").unwrap().unwrap();
    assert!(like.active);
    assert_eq!(like.count, 1);

    let scrap = db.toggle_scrap("m2", "s1").unwrap().unwrap();
    assert!(scrap.active);

    let spot = db.get_spot("s1").unwrap().unwrap();
    assert_eq!(spot.like_count, 1);
    assert_eq!(spot.scrap_count, 1);

    // The spot shows up in the scrapper's list
    let scrapped = db.list_scrapped_spots("m2").unwrap();
    assert_eq!(scrapped.len(), 1);

    // Owner deletes it; it vanishes from queries
    assert_eq!(db.delete_spot("s1", "m1").unwrap(), SpotDelete::Deleted);
    assert!(db.list_scrapped_spots("m2").unwrap().is_empty());
    assert!(db.toggle_like("m2", "s1").unwrap().is_none());
}

#[tokio::test]
async fn test_landmark_claim_chain() {
    let (db, _temp) = setup_db();

    let landmark = Landmark {
        coordinate: Coordinate {
            lat: 37.55,
            lng: 126.99,
        },
        id: "l1".to_string(),
        name: "Namsan Tower".to_string(),
        owner_id: None,
        visit_count: 0,
    };
    db.put_landmark(&landmark).unwrap();

    let outcome = db.claim_landmark("l1", "m1").unwrap().unwrap();
    assert!(outcome.previous_owner_id.is_none());

    let outcome = db.claim_landmark("l1", "m2").unwrap().unwrap();
    assert_eq!(outcome.previous_owner_id.as_deref(), Some("m1"));

    db.visit_landmark("l1").unwrap().unwrap();
    let fetched = db.get_landmark("l1").unwrap().unwrap();
    assert_eq!(fetched.visit_count, 1);
    assert_eq!(fetched.owner_id.as_deref(), Some("m2"));
}

#[tokio::test]
async fn test_multiple_spots_per_member() {
    let (db, _temp) = setup_db();

    db.put_spot(&make_spot("s1", "m1")).unwrap();
    db.put_spot(&make_spot("s2", "m1")).unwrap();
    db.put_spot(&make_spot("s3", "m2")).unwrap();

    let spots = db.list_spots_by_member("m1").unwrap();
    assert_eq!(spots.len(), 2);

    let spots = db.list_spots_by_member("m2").unwrap();
    assert_eq!(spots.len(), 1);
    assert_eq!(spots[0].id, "s3");
}
