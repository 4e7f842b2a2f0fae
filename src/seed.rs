// Catalog seeding from a JSON creature list.

use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{Category, Months};
use crate::db::{Database, NewCreature};

/// The creature catalog bundled with the binary, used when no seed file
/// is configured.
pub const DEFAULT_SEED: &str = include_str!("../data/creatures.json");

#[derive(Debug, Deserialize)]
pub struct SeedCreature {
    pub name_fr: String,
    pub name_en: String,
    pub category: String,
    #[serde(default)]
    pub months_north: Vec<u8>,
    #[serde(default)]
    pub months_south: Vec<u8>,
    #[serde(default)]
    pub hours_available: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub sell_price: i64,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub icon_url: String,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to parse seed data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid creature {name:?}: {reason}")]
    Invalid { name: String, reason: String },
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

fn invalid(seed: &SeedCreature, reason: impl Into<String>) -> SeedError {
    SeedError::Invalid {
        name: seed.name_en.clone(),
        reason: reason.into(),
    }
}

/// Parse and validate a JSON creature list. Validation is strict here,
/// unlike catalog reads: a bad month or category in the seed aborts the
/// whole load instead of silently degrading.
pub fn parse_seed(raw: &str) -> Result<Vec<SeedCreature>, SeedError> {
    let seeds: Vec<SeedCreature> = serde_json::from_str(raw)?;

    for seed in &seeds {
        if seed.name_fr.trim().is_empty() || seed.name_en.trim().is_empty() {
            return Err(invalid(seed, "both names are required"));
        }
        if Category::from_str_name(&seed.category).is_none() {
            return Err(invalid(
                seed,
                format!("unknown category {:?}", seed.category),
            ));
        }
        Months::new(seed.months_north.clone()).map_err(|e| invalid(seed, e))?;
        Months::new(seed.months_south.clone()).map_err(|e| invalid(seed, e))?;
    }

    Ok(seeds)
}

/// Upsert every creature in the list. Rows are matched on
/// (name_en, category), so re-running refreshes the catalog in place.
pub async fn seed_creatures(db: &Database, raw: &str) -> Result<usize, SeedError> {
    let seeds = parse_seed(raw)?;

    for seed in &seeds {
        let months_north = Months::new(seed.months_north.clone())
            .map_err(|e| invalid(seed, e))?
            .to_json();
        let months_south = Months::new(seed.months_south.clone())
            .map_err(|e| invalid(seed, e))?
            .to_json();

        db.upsert_creature(&NewCreature {
            name_fr: &seed.name_fr,
            name_en: &seed.name_en,
            category: &seed.category,
            months_north: &months_north,
            months_south: &months_south,
            hours_available: &seed.hours_available,
            location: &seed.location,
            sell_price: seed.sell_price,
            image_url: &seed.image_url,
            icon_url: &seed.icon_url,
        })
        .await?;
    }

    Ok(seeds.len())
}

/// Seed the catalog only when it is empty, so user-visible data is never
/// rewritten behind a running deployment's back.
pub async fn seed_if_empty(db: &Database, raw: &str) -> Result<usize, SeedError> {
    if db.count_creatures().await? > 0 {
        return Ok(0);
    }
    seed_creatures(db, raw).await
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        Database::new("sqlite::memory:").await.unwrap()
    }

    #[test]
    fn test_bundled_seed_parses() {
        let seeds = parse_seed(DEFAULT_SEED).unwrap();
        assert!(!seeds.is_empty());

        for category in ["fish", "bug", "sea_creature"] {
            assert!(
                seeds.iter().any(|s| s.category == category),
                "bundled catalog is missing {category}"
            );
        }
    }

    #[test]
    fn test_parse_rejects_bad_category() {
        let raw = r#"[{"name_fr": "Dragon", "name_en": "Dragon", "category": "dragon"}]"#;
        let err = parse_seed(raw).unwrap_err();
        assert!(err.to_string().contains("unknown category"));
    }

    #[test]
    fn test_parse_rejects_bad_month() {
        let raw = r#"[{"name_fr": "Carpe", "name_en": "Carp", "category": "fish", "months_north": [13]}]"#;
        let err = parse_seed(raw).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn test_parse_rejects_missing_name() {
        let raw = r#"[{"name_fr": "", "name_en": "Carp", "category": "fish"}]"#;
        assert!(parse_seed(raw).is_err());
    }

    #[tokio::test]
    async fn test_seed_if_empty_runs_once() {
        let db = test_db().await;

        let seeded = seed_if_empty(&db, DEFAULT_SEED).await.unwrap();
        assert!(seeded > 0);
        assert_eq!(db.count_creatures().await.unwrap(), seeded as i64);

        // Second boot: catalog already present, nothing happens.
        assert_eq!(seed_if_empty(&db, DEFAULT_SEED).await.unwrap(), 0);
        assert_eq!(db.count_creatures().await.unwrap(), seeded as i64);
    }

    #[tokio::test]
    async fn test_reseeding_updates_in_place() {
        let db = test_db().await;

        let raw = r#"[{"name_fr": "Carpe", "name_en": "Carp", "category": "fish", "sell_price": 300}]"#;
        seed_creatures(&db, raw).await.unwrap();

        let updated = r#"[{"name_fr": "Carpe", "name_en": "Carp", "category": "fish", "sell_price": 350}]"#;
        seed_creatures(&db, updated).await.unwrap();

        let creatures = db.list_creatures().await.unwrap();
        assert_eq!(creatures.len(), 1);
        assert_eq!(creatures[0].sell_price, 350);
    }

    #[tokio::test]
    async fn test_seeded_months_are_normalized() {
        let db = test_db().await;

        let raw = r#"[{"name_fr": "Thon", "name_en": "Tuna", "category": "fish", "months_north": [12, 1, 2, 1]}]"#;
        seed_creatures(&db, raw).await.unwrap();

        let creatures = db.list_creatures().await.unwrap();
        assert_eq!(creatures[0].months_north, "[1,2,12]");
        assert_eq!(creatures[0].months_south, "[]");
    }
}
