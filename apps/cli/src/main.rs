use anyhow::Context;
use campusgig_auth::IdentityClaims;
use campusgig_chats::{FeedRegistry, FsBlobStore, GlobalChatService, MessageService};
use campusgig_config::{load as load_config, AppConfig};
use campusgig_database::{initialize_database, CreateGigRequest, CreateOfferRequest, GigCategory};
use campusgig_marketplace::{AcceptanceService, GigService, OfferService};
use campusgig_users::ProfileService;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use sqlx::{Column, Row, SqlitePool};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::INFO)
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

#[derive(Parser)]
#[command(name = "campusgig")]
#[command(about = "CampusGig backend maintenance tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the database with a demo marketplace graph
    SeedData,
    /// Dump every table as JSON
    DumpData,
    /// Clear all data from the database
    ClearData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let cli = Cli::parse();
    let config = load_config().context("failed to load configuration")?;
    let pool = initialize_database(&config.database)
        .await
        .context("failed to initialise database")?;

    match cli.command {
        Commands::SeedData => seed_data(&config, pool).await,
        Commands::DumpData => dump_data(pool).await,
        Commands::ClearData => clear_data(pool).await,
    }
}

async fn seed_data(config: &AppConfig, pool: SqlitePool) -> anyhow::Result<()> {
    info!("seeding database with demo data");

    let profiles = ProfileService::new(pool.clone());
    let gigs = GigService::new(pool.clone());
    let offers = OfferService::new(pool.clone());
    let acceptance = AcceptanceService::new(pool.clone());

    let blob_store = Arc::new(
        FsBlobStore::new(PathBuf::from(&config.media.blob_root))
            .await
            .context("failed to open blob store")?,
    );
    let messages = MessageService::new(
        pool.clone(),
        &config.media,
        blob_store.clone(),
        Arc::new(FeedRegistry::new()),
    );
    let global = GlobalChatService::new(
        pool,
        &config.media,
        blob_store,
        Arc::new(FeedRegistry::new()),
    );

    let asha = profiles
        .ensure_profile(
            &IdentityClaims {
                principal_id: "demo-asha".to_string(),
                email: Some("asha@campus.edu".to_string()),
                display_name: Some("Asha Patel".to_string()),
                photo_url: None,
                phone: Some("+15550001111".to_string()),
            },
            "Hillview",
        )
        .await?;
    let ben = profiles
        .ensure_profile(
            &IdentityClaims {
                principal_id: "demo-ben".to_string(),
                email: Some("ben@campus.edu".to_string()),
                display_name: Some("Ben Cole".to_string()),
                photo_url: None,
                phone: Some("+15550002222".to_string()),
            },
            "Hillview",
        )
        .await?;

    let gig = gigs
        .create_gig(CreateGigRequest {
            title: "Poster design for the spring fest".to_string(),
            description: "Need an A2 poster, source files included".to_string(),
            category: GigCategory::Creative,
            budget: 500.0,
            deadline: Utc::now() + Duration::days(7),
            location: "Online".to_string(),
            college: "Hillview".to_string(),
            posted_by: asha.principal_id.clone(),
            posted_by_name: asha.display_name(),
        })
        .await?;

    let offer = offers
        .create_offer(CreateOfferRequest {
            gig_public_id: gig.public_id.clone(),
            offered_by: ben.principal_id.clone(),
            offered_by_name: ben.display_name(),
            message: "I've done fest posters before, happy to share samples".to_string(),
            proposed_budget: 450.0,
        })
        .await?;

    let outcome = acceptance
        .accept_offer(&offer.public_id, &asha.principal_id)
        .await?;
    messages
        .send_text(
            &outcome.chat.public_id,
            &ben.principal_id,
            "Thanks! I'll send a first draft tomorrow.".to_string(),
        )
        .await?;
    global
        .send_text(
            &asha.principal_id,
            "Anyone else need design work? Ben is great.".to_string(),
        )
        .await?;

    println!("Database seeded with demo data:");
    println!("- 2 profiles ({}, {})", asha.display_name(), ben.display_name());
    println!("- 1 gig with 1 accepted offer");
    println!("- 1 chat message and 1 global message");
    println!("Run 'dump-data' to see the inserted data");

    Ok(())
}

async fn dump_data(pool: SqlitePool) -> anyhow::Result<()> {
    dump_table(
        &pool,
        "profiles",
        "SELECT id, principal_id, first_name, last_name, college, phone, created_at \
         FROM profiles ORDER BY created_at ASC",
    )
    .await?;
    dump_table(
        &pool,
        "gigs",
        "SELECT id, public_id, title, category, budget, deadline, college, posted_by, status \
         FROM gigs ORDER BY created_at ASC",
    )
    .await?;
    dump_table(
        &pool,
        "offers",
        "SELECT id, public_id, gig_id, offered_by, proposed_budget, status \
         FROM offers ORDER BY created_at ASC",
    )
    .await?;
    dump_table(
        &pool,
        "chats",
        "SELECT id, public_id, offer_id, gig_title, participant_a, participant_b, last_message \
         FROM chats ORDER BY created_at ASC",
    )
    .await?;
    dump_table(
        &pool,
        "messages",
        "SELECT id, public_id, chat_id, sender_id, content, kind, created_at \
         FROM messages ORDER BY created_at ASC",
    )
    .await?;
    dump_table(
        &pool,
        "global_messages",
        "SELECT id, public_id, sender_id, content, kind, created_at \
         FROM global_messages ORDER BY created_at ASC",
    )
    .await?;

    Ok(())
}

async fn dump_table(pool: &SqlitePool, table: &str, query: &str) -> anyhow::Result<()> {
    let rows = sqlx::query(query)
        .fetch_all(pool)
        .await
        .with_context(|| format!("failed to fetch {table}"))?;

    println!("=== {} ({}) ===", table.to_uppercase(), rows.len());
    for row in rows {
        let mut object = serde_json::Map::new();
        for column in row.columns() {
            let name = column.name();
            // SQLite stores everything we dump as integer, real or text
            let value = if let Ok(v) = row.try_get::<i64, _>(name) {
                serde_json::json!(v)
            } else if let Ok(v) = row.try_get::<f64, _>(name) {
                serde_json::json!(v)
            } else if let Ok(v) = row.try_get::<Option<String>, _>(name) {
                serde_json::json!(v)
            } else {
                serde_json::Value::Null
            };
            object.insert(name.to_string(), value);
        }
        println!("{}", serde_json::to_string_pretty(&object)?);
    }
    println!();

    Ok(())
}

async fn clear_data(pool: SqlitePool) -> anyhow::Result<()> {
    info!("clearing all data from database");

    // Children before parents, for the foreign keys
    let tables = [
        "message_reads",
        "messages",
        "chats",
        "offers",
        "gigs",
        "global_messages",
        "profiles",
    ];

    println!("Database cleared:");
    for table in tables {
        let deleted = sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&pool)
            .await
            .with_context(|| format!("failed to clear {table}"))?;
        println!("- {} rows deleted from {table}", deleted.rows_affected());
    }

    Ok(())
}
