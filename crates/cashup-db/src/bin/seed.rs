//! # Seed Data Generator
//!
//! Populates the database with a USD denomination catalog plus a handful of
//! registers and users for development.
//!
//! ## Usage
//! ```bash
//! cargo run -p cashup-db --bin seed
//!
//! # Specify database path
//! cargo run -p cashup-db --bin seed -- --db ./data/cashup.db
//! ```

use std::env;

use cashup_db::{Database, DbConfig};

/// USD bills and coins, largest first. `sort_order` follows array order.
const DENOMINATIONS: &[(&str, i64)] = &[
    ("$100 bill", 10_000),
    ("$50 bill", 5_000),
    ("$20 bill", 2_000),
    ("$10 bill", 1_000),
    ("$5 bill", 500),
    ("$2 bill", 200),
    ("$1 bill", 100),
    ("Dollar coin", 100),
    ("Half dollar", 50),
    ("Quarter", 25),
    ("Dime", 10),
    ("Nickel", 5),
    ("Penny", 1),
];

const REGISTERS: &[(i64, &str, i64)] = &[
    (1, "Front register", 1),
    (2, "Express lane", 1),
    (3, "Customer service", 2),
];

const USERS: &[(i64, &str)] = &[(1, "Alice Romero"), (2, "Ben Okafor"), (3, "Carla Singh")];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./cashup_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Cashup Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./cashup_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Cashup Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.denominations().list_all().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} denominations", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Seeding denomination catalog...");
    for (order, (name, value_cents)) in DENOMINATIONS.iter().enumerate() {
        db.denominations()
            .insert(name, *value_cents, true, order as i64 + 1)
            .await?;
    }
    println!("  {} denominations", DENOMINATIONS.len());

    println!("Seeding registers...");
    for (id, name, branch_id) in REGISTERS {
        sqlx::query("INSERT INTO registers (id, name, branch_id) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(name)
            .bind(branch_id)
            .execute(db.pool())
            .await?;
    }
    println!("  {} registers", REGISTERS.len());

    println!("Seeding users...");
    for (id, display_name) in USERS {
        sqlx::query("INSERT INTO users (id, display_name) VALUES (?1, ?2)")
            .bind(id)
            .bind(display_name)
            .execute(db.pool())
            .await?;
    }
    println!("  {} users", USERS.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
