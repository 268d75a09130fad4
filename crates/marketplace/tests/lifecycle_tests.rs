//! End-to-end marketplace lifecycle: post a gig, collect offers,
//! accept one, and land in a shared chat.

use campusgig_config::DatabaseConfig;
use campusgig_database::{
    initialize_database, ChatRepository, CreateGigRequest, CreateOfferRequest,
    CreateProfileRequest, GigCategory, GigStatus, OfferError, OfferStatus, ProfileRepository,
};
use campusgig_marketplace::{AcceptanceService, GigService, OfferService};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use tempfile::TempDir;

async fn create_test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test_lifecycle.db");

    let config = DatabaseConfig {
        url: format!("sqlite:{}", db_path.display()),
        max_connections: 1,
    };

    let pool = initialize_database(&config).await.unwrap();
    (pool, temp_dir)
}

async fn seed_profile(pool: &SqlitePool, principal: &str, first: &str, last: &str) {
    ProfileRepository::new(pool.clone())
        .create(&CreateProfileRequest {
            principal_id: principal.to_string(),
            email: Some(format!("{first}@campus.edu").to_lowercase()),
            first_name: first.to_string(),
            last_name: last.to_string(),
            college: "Hillview".to_string(),
            year: Some("2".to_string()),
            branch: None,
            phone: None,
            avatar_url: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_full_gig_lifecycle() {
    let (pool, _temp_dir) = create_test_pool().await;
    seed_profile(&pool, "principal-a", "Asha", "Patel").await;
    seed_profile(&pool, "principal-b", "Ben", "Cole").await;
    seed_profile(&pool, "principal-c", "Cleo", "Diaz").await;

    let gigs = GigService::new(pool.clone());
    let offers = OfferService::new(pool.clone());
    let acceptance = AcceptanceService::new(pool.clone());

    // Asha posts a gig visible on the Hillview board
    let gig = gigs
        .create_gig(CreateGigRequest {
            title: "Lab report typing".to_string(),
            description: "Type up 12 pages of handwritten notes".to_string(),
            category: GigCategory::Academic,
            budget: 300.0,
            deadline: Utc::now() + Duration::days(4),
            location: "Anywhere".to_string(),
            college: "Hillview".to_string(),
            posted_by: "principal-a".to_string(),
            posted_by_name: "Asha Patel".to_string(),
        })
        .await
        .unwrap();

    let board = gigs.list_college_gigs("Hillview").await.unwrap();
    assert_eq!(board.len(), 1);

    // Ben and Cleo both bid
    let ben_offer = offers
        .create_offer(CreateOfferRequest {
            gig_public_id: gig.public_id.clone(),
            offered_by: "principal-b".to_string(),
            offered_by_name: "Ben Cole".to_string(),
            message: "I type fast".to_string(),
            proposed_budget: 250.0,
        })
        .await
        .unwrap();
    let cleo_offer = offers
        .create_offer(CreateOfferRequest {
            gig_public_id: gig.public_id.clone(),
            offered_by: "principal-c".to_string(),
            offered_by_name: "Cleo Diaz".to_string(),
            message: "Done it before".to_string(),
            proposed_budget: 280.0,
        })
        .await
        .unwrap();

    let received = offers.list_received("principal-a").await.unwrap();
    assert_eq!(received.len(), 2);

    // Asha rejects Cleo and accepts Ben
    offers.reject_offer(&cleo_offer.public_id, "principal-a").await.unwrap();
    let outcome = acceptance
        .accept_offer(&ben_offer.public_id, "principal-a")
        .await
        .unwrap();

    assert!(outcome.chat_created);
    assert_eq!(outcome.offer.status, OfferStatus::Accepted);
    assert_eq!(outcome.chat.gig_title, "Lab report typing");

    // The chat carries profile display names, not raw principal ids
    assert_eq!(outcome.chat.participant_a_name, "Asha Patel");
    assert_eq!(outcome.chat.participant_b_name, "Ben Cole");

    // The gig moved off the open board
    assert!(gigs.list_college_gigs("Hillview").await.unwrap().is_empty());
    let gig = gigs.get_gig(&gig.public_id).await.unwrap();
    assert_eq!(gig.status, GigStatus::InProgress);

    // Ben's accepted offer is now frozen
    let withdraw = offers.withdraw_offer(&ben_offer.public_id, "principal-b").await;
    assert!(matches!(withdraw, Err(OfferError::ImmutableState { .. })));

    // A duplicate accept converges on the same chat
    let replay = acceptance
        .accept_offer(&ben_offer.public_id, "principal-a")
        .await
        .unwrap();
    assert!(!replay.chat_created);
    assert_eq!(replay.chat.id, outcome.chat.id);

    let chats = ChatRepository::new(pool.clone())
        .find_for_participant("principal-b")
        .await
        .unwrap();
    assert_eq!(chats.len(), 1);
}

#[tokio::test]
async fn test_gig_delete_takes_offers_and_chats_along() {
    let (pool, _temp_dir) = create_test_pool().await;
    seed_profile(&pool, "principal-a", "Asha", "Patel").await;
    seed_profile(&pool, "principal-b", "Ben", "Cole").await;

    let gigs = GigService::new(pool.clone());
    let offers = OfferService::new(pool.clone());
    let acceptance = AcceptanceService::new(pool.clone());

    let gig = gigs
        .create_gig(CreateGigRequest {
            title: "Bike repair".to_string(),
            description: "Fix a flat and tune the brakes".to_string(),
            category: GigCategory::Other,
            budget: 150.0,
            deadline: Utc::now() + Duration::days(1),
            location: "Bike shed".to_string(),
            college: "Hillview".to_string(),
            posted_by: "principal-a".to_string(),
            posted_by_name: "Asha Patel".to_string(),
        })
        .await
        .unwrap();

    let offer = offers
        .create_offer(CreateOfferRequest {
            gig_public_id: gig.public_id.clone(),
            offered_by: "principal-b".to_string(),
            offered_by_name: "Ben Cole".to_string(),
            message: "Tools ready".to_string(),
            proposed_budget: 140.0,
        })
        .await
        .unwrap();
    acceptance.accept_offer(&offer.public_id, "principal-a").await.unwrap();

    let report = gigs.delete_gig(&gig.public_id, "principal-a").await.unwrap();
    assert_eq!(report.offers, 1);
    assert_eq!(report.chats, 1);

    assert!(offers.list_made("principal-b").await.unwrap().is_empty());
    assert!(ChatRepository::new(pool)
        .find_for_participant("principal-b")
        .await
        .unwrap()
        .is_empty());
}
