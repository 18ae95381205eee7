//! Database seeder for Jajan development and testing.
//!
//! Seeds a handful of journal entries for a demo owner so the UI has
//! something to render locally.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use jajan_db::entities::posts;

/// Demo owner subject (consistent for all seeds).
const DEMO_OWNER: &str = "user_demo";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = jajan_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding demo journal entries...");
    seed_demo_posts(&db).await;

    println!("Done.");
}

async fn seed_demo_posts(db: &DatabaseConnection) {
    let entries = [
        (
            "Warung Sate Pak Heri",
            Some("Charcoal smoke everywhere. The peanut sauce had a proper kick."),
            3,
        ),
        (
            "Blue Bottle",
            Some("Flat white with perfect crema, almost too pretty to drink."),
            1,
        ),
        ("Gelato cart by the station", None, 0),
    ];

    for (place_name, notes, days_ago) in entries {
        let model = posts::ActiveModel {
            id: Set(Uuid::new_v4()),
            created_at: Set((Utc::now() - Duration::days(days_ago)).into()),
            user_id: Set(DEMO_OWNER.to_string()),
            place_name: Set(place_name.to_string()),
            notes: Set(notes.map(ToString::to_string)),
            image_url: Set(None),
        };

        model
            .insert(db)
            .await
            .expect("Failed to insert demo post");
        println!("  seeded: {place_name}");
    }
}
