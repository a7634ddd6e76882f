//! # Seed Data Generator
//!
//! Populates the database with a demo set of promotion codes.
//!
//! ## Usage
//! ```bash
//! # Seed the database named by DISCOUNT_DB_PATH (default ./discounts.db)
//! cargo run -p discount-db --bin seed
//!
//! # Specify database path
//! cargo run -p discount-db --bin seed -- --db ./data/discounts.db
//! ```
//!
//! ## Generated Codes
//! | Code          | Type                  | Notes                          |
//! |---------------|-----------------------|--------------------------------|
//! | `PERCENT20`   | percentage            | 20% off                        |
//! | `FIXED10`     | fixed_amount          | $10 off                        |
//! | `CAPPED15`    | percentage_with_cap   | 15% off, at most $15           |
//! | `BIGSPEND`    | percentage            | 15% off, $200 minimum basket   |
//! | `VIPONLY`     | specific_group        | `vip` group only               |
//! | `USER123`     | specific_user         | customer `123` only            |
//! | `WELCOME`     | first_time_buyer      | first-time buyers only         |
//! | `LIMITED`     | fixed_amount          | $5 off, 100 uses               |
//! | `SOLO25`      | percentage            | exclusive, not combinable      |
//! | `SUMMER`      | percentage            | expired                        |
//! | `NEWYEAR`     | percentage            | starts in 30 days              |

use chrono::{Duration, Utc};
use discount_core::{DiscountType, DiscountValue, ExternalId, Money, PromotionCode};
use discount_db::{AppConfig, Database};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_config = AppConfig::load()?.db_config();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Discount Manager Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: $DISCOUNT_DB_PATH or ./discounts.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Discount Manager Seed Data Generator");
    println!("======================================");
    println!("Database: {}", db_config.database_path.display());
    println!();

    let db = Database::new(db_config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.codes().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} promotion codes", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Inserting promotion codes...");

    let mut inserted = 0;
    for code in demo_codes() {
        match db.codes().insert(&code).await {
            Ok(id) => {
                println!("  #{:<3} {:<10} {}", id, code.code, code.discount_type);
                inserted += 1;
            }
            Err(e) => eprintln!("Failed to insert {}: {}", code.code, e),
        }
    }

    println!();
    println!("✓ Inserted {} promotion codes", inserted);

    let eligible = db.codes().find_eligible(Utc::now()).await?;
    println!("  Currently eligible: {}", eligible.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// The demo promotion set.
fn demo_codes() -> Vec<PromotionCode> {
    let now = Utc::now();

    let percent20 = described(
        PromotionCode::new(0, "PERCENT20", DiscountType::Percentage, DiscountValue::from_whole(20)),
        "20% Off",
        "20% off the whole order",
    );

    let fixed10 = described(
        PromotionCode::new(0, "FIXED10", DiscountType::FixedAmount, DiscountValue::from_whole(10)),
        "$10 Off",
        "$10 off the whole order",
    );

    let capped15 = described(
        PromotionCode::new(0, "CAPPED15", DiscountType::PercentageWithCap, DiscountValue::from_whole(15)),
        "15% Off (max $15)",
        "15% off, capped at $15",
    );

    let mut bigspend = described(
        PromotionCode::new(0, "BIGSPEND", DiscountType::Percentage, DiscountValue::from_whole(15)),
        "Big Spender",
        "15% off orders of $200 or more",
    );
    bigspend.minimum_basket_value = Some(Money::from_cents(20000));

    let mut viponly = described(
        PromotionCode::new(0, "VIPONLY", DiscountType::SpecificGroup, DiscountValue::from_whole(10)),
        "VIP Members",
        "Reserved for the vip group",
    );
    viponly.conditions.allowed_groups = vec!["vip".to_string()];

    let mut user123 = described(
        PromotionCode::new(0, "USER123", DiscountType::SpecificUser, DiscountValue::from_whole(5)),
        "Personal Code",
        "Issued to customer 123",
    );
    user123.conditions.allowed_users = vec![ExternalId::from("123")];

    let welcome = described(
        PromotionCode::new(0, "WELCOME", DiscountType::FirstTimeBuyer, DiscountValue::from_whole(10)),
        "Welcome",
        "Only for a customer's first order",
    );

    let mut limited = described(
        PromotionCode::new(0, "LIMITED", DiscountType::FixedAmount, DiscountValue::from_whole(5)),
        "Limited Run",
        "$5 off, first 100 redemptions",
    );
    limited.usage_limit = Some(100);

    let mut solo25 = described(
        PromotionCode::new(0, "SOLO25", DiscountType::Percentage, DiscountValue::from_whole(25)),
        "Solo 25%",
        "25% off, cannot be combined",
    );
    solo25.is_exclusive = true;
    solo25.can_be_combined = false;

    let mut summer = described(
        PromotionCode::new(0, "SUMMER", DiscountType::Percentage, DiscountValue::from_whole(30)),
        "Summer Sale",
        "Last season's sale",
    );
    summer.starts_at = Some(now - Duration::days(120));
    summer.expires_at = Some(now - Duration::days(30));

    let mut newyear = described(
        PromotionCode::new(0, "NEWYEAR", DiscountType::Percentage, DiscountValue::from_whole(15)),
        "New Year",
        "Starts next month",
    );
    newyear.starts_at = Some(now + Duration::days(30));

    vec![
        percent20, fixed10, capped15, bigspend, viponly, user123, welcome, limited, solo25,
        summer, newyear,
    ]
}

fn described(mut code: PromotionCode, name: &str, description: &str) -> PromotionCode {
    code.name = name.to_string();
    code.description = Some(description.to_string());
    code
}
