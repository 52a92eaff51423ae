//! Demo data seed script
//!
//! Seeds the database with realistic French-language content:
//! - Promotions across the whole status/date matrix (pending, approved,
//!   rejected; past, current and future display windows)
//! - A handful of announcements, active and inactive
//!
//! Usage:
//!   DATABASE_URL=... ./seed-demo [--purge] [--promotions N]
//!
//! Environment variables:
//!   DATABASE_URL — PostgreSQL connection string (required)

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use clap::Parser;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::postgres::PgPoolOptions;

use vitrine_api::models::announcement::Announcement;
use vitrine_api::models::promotion::{Promotion, DEFAULT_COLOR};

#[derive(Parser)]
#[command(name = "seed-demo", about = "Seed the vitrine database with demo content")]
struct Args {
    /// Delete all existing promotions and announcements first
    #[arg(long)]
    purge: bool,

    /// Number of extra randomized promotions on top of the fixed matrix
    #[arg(long, default_value_t = 6)]
    promotions: usize,
}

const TITLES: &[&str] = &[
    "Soldes d'été",
    "Offre de rentrée",
    "Happy hour prolongé",
    "Deux pour un sur les desserts",
    "Semaine du terroir",
    "Menu découverte",
    "Brunch du dimanche",
    "Carte fidélité doublée",
];

const COLORS: &[&str] = &[DEFAULT_COLOR, "#0ea5e9", "#22c55e", "#e11d48"];

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL environment variable not set")?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    if args.purge {
        tracing::info!("Purging existing promotions and announcements");
        sqlx::query("DELETE FROM promotions").execute(&pool).await?;
        sqlx::query("DELETE FROM announcements").execute(&pool).await?;
    }

    let today = Utc::now().date_naive();
    let mut rng = rand::thread_rng();

    // Fixed matrix: one promotion per (status, window) combination that the
    // moderation and public views care about.
    let matrix = [
        ("pending", -20i64, -10i64),
        ("pending", -5, 10),
        ("approved", -20, -10),
        ("approved", -5, 10),
        ("approved", 5, 20),
        ("rejected", -5, 10),
    ];
    for (status, start_offset, end_offset) in matrix {
        insert_promotion(
            &pool,
            TITLES.choose(&mut rng).unwrap_or(&TITLES[0]),
            status,
            start_offset,
            end_offset,
            COLORS.choose(&mut rng).unwrap_or(&COLORS[0]),
        )
        .await?;
    }

    for _ in 0..args.promotions {
        let start_offset = rng.gen_range(-30..15);
        let end_offset = start_offset + rng.gen_range(3..21);
        let status = ["pending", "approved", "rejected"][rng.gen_range(0..3)];
        insert_promotion(
            &pool,
            TITLES.choose(&mut rng).unwrap_or(&TITLES[0]),
            status,
            start_offset,
            end_offset,
            COLORS.choose(&mut rng).unwrap_or(&COLORS[0]),
        )
        .await?;
    }

    let now = Utc::now();
    for (title, active, start_offset, end_offset) in [
        ("Fermeture exceptionnelle lundi", true, -2i64, 5i64),
        ("Nouveaux horaires d'ouverture", true, 3, 30),
        ("Ancienne annonce archivée", false, -40, -20),
    ] {
        sqlx::query(
            "INSERT INTO announcements (title, description, start_date, end_date, is_active)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(title)
        .bind("Annonce de démonstration")
        .bind(now + Duration::days(start_offset))
        .bind(now + Duration::days(end_offset))
        .bind(active)
        .execute(&pool)
        .await?;
    }

    // Summarize what the public endpoints would serve right now.
    let promotions: Vec<Promotion> =
        sqlx::query_as("SELECT * FROM promotions ORDER BY created_at DESC")
            .fetch_all(&pool)
            .await?;
    let live_promotions = promotions.iter().filter(|p| p.is_live(today)).count();

    let announcements: Vec<Announcement> =
        sqlx::query_as("SELECT * FROM announcements ORDER BY created_at DESC")
            .fetch_all(&pool)
            .await?;
    let live_announcements = announcements.iter().filter(|a| a.is_live(now)).count();

    tracing::info!(
        "Seeded {} promotions ({} currently live) and {} announcements ({} currently live)",
        promotions.len(),
        live_promotions,
        announcements.len(),
        live_announcements,
    );

    Ok(())
}

async fn insert_promotion(
    pool: &sqlx::PgPool,
    title: &str,
    status: &str,
    start_offset: i64,
    end_offset: i64,
    color: &str,
) -> Result<()> {
    let today = Utc::now().date_naive();
    sqlx::query(
        "INSERT INTO promotions (title, description, start_date, end_date, color, status)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(title)
    .bind("Promotion de démonstration")
    .bind(today + Duration::days(start_offset))
    .bind(today + Duration::days(end_offset))
    .bind(color)
    .bind(status)
    .execute(pool)
    .await?;
    Ok(())
}
