//! # Seed Data Generator
//!
//! Populates the database with development catalog and coupons.
//!
//! ## Usage
//! ```bash
//! # Default database path (./kitab.db)
//! cargo run -p kitab-db --bin seed
//!
//! # Specify database path
//! cargo run -p kitab-db --bin seed -- --db ./data/kitab.db
//! ```
//!
//! ## Generated Data
//! - A shelf of classic titles with realistic prices
//! - Three coupons covering every discount type:
//!   - `SAVE10`: 10% off, minimum purchase $15.00
//!   - `BOOK5`: $5.00 off, minimum purchase $25.00
//!   - `FREESHIP`: free delivery, limited to 100 redemptions

use chrono::{Duration, Utc};
use std::env;

use kitab_core::{Coupon, DiscountType};
use kitab_db::repository::book::new_book;
use kitab_db::repository::coupon::generate_coupon_id;
use kitab_db::{Database, DbConfig};

const SHELF: &[(&str, &str, i64)] = &[
    ("The Stranger", "Albert Camus", 1850),
    ("Nedjma", "Kateb Yacine", 2200),
    ("So Long a Letter", "Mariama Bâ", 1600),
    ("Season of Migration to the North", "Tayeb Salih", 1950),
    ("The Bridges of Constantine", "Ahlam Mosteghanemi", 2400),
    ("The Last Summer of Reason", "Tahar Djaout", 1700),
    ("What the Day Owes the Night", "Yasmina Khadra", 2100),
    ("The Meursault Investigation", "Kamel Daoud", 1900),
    ("Children of the New World", "Assia Djebar", 2050),
    ("The Plague", "Albert Camus", 1750),
    ("Memory in the Flesh", "Ahlam Mosteghanemi", 2300),
    ("The Swallows of Kabul", "Yasmina Khadra", 1800),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let db_path = parse_db_path();
    println!("Seeding database at {}", db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let books = db.books();
    for (title, author, price_cents) in SHELF {
        let book = new_book(title, Some(author), *price_cents);
        books.insert(&book).await?;
        println!("  + {} ({})", book.title, book.id);
    }

    let now = Utc::now();
    let coupons = db.coupons();
    for coupon in [
        seed_coupon("SAVE10", DiscountType::Percentage, 10, Some(1500), None),
        seed_coupon("BOOK5", DiscountType::Fixed, 500, Some(2500), None),
        seed_coupon("FREESHIP", DiscountType::FreeShipping, 0, None, Some(100)),
    ] {
        coupons.insert(&coupon).await?;
        println!("  + coupon {}", coupon.code);
    }

    println!(
        "Done: {} books, 3 coupons (valid from {})",
        SHELF.len(),
        now.format("%Y-%m-%d")
    );
    Ok(())
}

fn seed_coupon(
    code: &str,
    discount_type: DiscountType,
    value: i64,
    min_purchase_cents: Option<i64>,
    usage_limit: Option<i64>,
) -> Coupon {
    let now = Utc::now();
    Coupon {
        id: generate_coupon_id(),
        code: code.to_string(),
        discount_type,
        discount_value: value,
        min_purchase_cents,
        max_discount_cents: None,
        usage_limit,
        used_count: 0,
        valid_from: now,
        valid_until: now + Duration::days(365),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Parses `--db <path>` from the command line, defaulting to ./kitab.db
fn parse_db_path() -> String {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1))
        .cloned()
        .unwrap_or_else(|| "./kitab.db".to_string())
}
