// Creature catalog domain: categories, hemispheres, month availability,
// combined filtering, and collection statistics.

use std::collections::HashSet;

use serde::Serialize;

use crate::db::Creature;

/// The three creature categories tracked in the creopedia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Fish,
    Bug,
    SeaCreature,
}

impl Category {
    /// Every category, in the order the stats block reports them.
    pub const ALL: [Category; 3] = [Category::Fish, Category::Bug, Category::SeaCreature];

    /// Parse a category string (from query params or the DB).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "fish" => Some(Self::Fish),
            "bug" => Some(Self::Bug),
            "sea_creature" => Some(Self::SeaCreature),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fish => "fish",
            Self::Bug => "bug",
            Self::SeaCreature => "sea_creature",
        }
    }
}

/// Which month-availability list applies to an island.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Hemisphere {
    #[default]
    North,
    South,
}

impl Hemisphere {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "north" => Some(Self::North),
            "south" => Some(Self::South),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::North => "north",
            Self::South => "south",
        }
    }
}

/// An ordered set of months (1-12) a creature is available in.
///
/// Serializes as a plain JSON array, which is also the storage format for
/// the `months_north` / `months_south` columns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Months(Vec<u8>);

impl Months {
    /// Build a validated month set. Values outside 1-12 are rejected;
    /// duplicates collapse and the result is kept in ascending order.
    pub fn new(months: Vec<u8>) -> Result<Self, String> {
        if let Some(bad) = months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(format!("month {bad} is out of range (expected 1-12)"));
        }
        let mut months = months;
        months.sort_unstable();
        months.dedup();
        Ok(Self(months))
    }

    /// Parse a stored JSON month list. Reads are lenient: unparseable text
    /// or out-of-range values degrade to the empty set, matching how the
    /// store treats a missing list.
    pub fn parse_json(raw: &str) -> Self {
        let values: Vec<i64> = serde_json::from_str(raw).unwrap_or_default();
        let mut months: Vec<u8> = values
            .into_iter()
            .filter(|m| (1..=12).contains(m))
            .map(|m| m as u8)
            .collect();
        months.sort_unstable();
        months.dedup();
        Self(months)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).expect("month list serializes")
    }

    pub fn contains(&self, month: u8) -> bool {
        self.0.binary_search(&month).is_ok()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

/// The month set a creature uses for the given hemisphere.
pub fn months_for(creature: &Creature, hemisphere: Hemisphere) -> Months {
    match hemisphere {
        Hemisphere::North => Months::parse_json(&creature.months_north),
        Hemisphere::South => Months::parse_json(&creature.months_south),
    }
}

// ── Catalog filter ───────────────────────────────────────────────────

/// Optional predicates combined with logical AND over the catalog.
#[derive(Debug, Clone, Default)]
pub struct CreatureFilter {
    pub category: Option<Category>,
    /// Month 1-12; range-checked by the API layer before reaching here.
    pub month: Option<u8>,
    pub collected: Option<bool>,
    pub search: Option<String>,
}

/// One creature annotated with an island's availability and progress,
/// in the exact shape of the API payload.
#[derive(Debug, Clone, Serialize)]
pub struct CreatureEntry {
    pub id: i64,
    pub name_fr: String,
    pub name_en: String,
    pub category: String,
    pub months_available: Months,
    pub hours_available: String,
    pub location: String,
    pub sell_price: i64,
    pub image_url: String,
    pub icon_url: String,
    pub collected: bool,
}

impl CreatureEntry {
    fn from_creature(creature: &Creature, months: Months, collected: bool) -> Self {
        Self {
            id: creature.id,
            name_fr: creature.name_fr.clone(),
            name_en: creature.name_en.clone(),
            category: creature.category.clone(),
            months_available: months,
            hours_available: creature.hours_available.clone(),
            location: creature.location.clone(),
            sell_price: creature.sell_price,
            image_url: creature.image_url.clone(),
            icon_url: creature.icon_url.clone(),
            collected,
        }
    }
}

/// Apply every supplied predicate to the ordered catalog and annotate each
/// surviving creature with the island's collected flag.
///
/// `creatures` must already be in catalog order (category, then name_fr);
/// filtering preserves that order. `collected_ids` holds the creature ids
/// with a collected-true progress row for the island; a missing id simply
/// means "not collected".
pub fn filter_creatures(
    creatures: &[Creature],
    collected_ids: &HashSet<i64>,
    hemisphere: Hemisphere,
    filter: &CreatureFilter,
) -> Vec<CreatureEntry> {
    let needle = filter
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    let mut entries = Vec::new();
    for creature in creatures {
        if let Some(category) = filter.category {
            if creature.category != category.as_str() {
                continue;
            }
        }

        let months = months_for(creature, hemisphere);
        if let Some(month) = filter.month {
            if !months.contains(month) {
                continue;
            }
        }

        let collected = collected_ids.contains(&creature.id);
        if let Some(wanted) = filter.collected {
            if collected != wanted {
                continue;
            }
        }

        if let Some(ref needle) = needle {
            if !creature.name_fr.to_lowercase().contains(needle)
                && !creature.name_en.to_lowercase().contains(needle)
            {
                continue;
            }
        }

        entries.push(CreatureEntry::from_creature(creature, months, collected));
    }
    entries
}

// ── Progress aggregation ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStats {
    pub total: i64,
    pub collected: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ByCategory {
    pub fish: CategoryStats,
    pub bug: CategoryStats,
    pub sea_creature: CategoryStats,
}

/// Overall and per-category collection progress for one island.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStats {
    pub total: i64,
    pub collected: i64,
    pub percentage: f64,
    pub by_category: ByCategory,
}

/// Percentage collected, rounded to one decimal with ties to even. Zero
/// totals yield 0 rather than a division error.
fn percentage(collected: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (collected as f64 * 1000.0 / total as f64).round_ties_even() / 10.0
    }
}

/// Compute collection statistics over the full catalog.
///
/// The overall `collected` count walks the same creature list as the
/// per-category buckets, so the three category counts always sum to the
/// overall number.
pub fn collection_stats(creatures: &[Creature], collected_ids: &HashSet<i64>) -> CollectionStats {
    let stats_for = |category: Category| {
        let mut total = 0;
        let mut collected = 0;
        for creature in creatures {
            if creature.category != category.as_str() {
                continue;
            }
            total += 1;
            if collected_ids.contains(&creature.id) {
                collected += 1;
            }
        }
        CategoryStats {
            total,
            collected,
            percentage: percentage(collected, total),
        }
    };

    let total = creatures.len() as i64;
    let collected = creatures
        .iter()
        .filter(|c| collected_ids.contains(&c.id))
        .count() as i64;

    let [fish, bug, sea_creature] = Category::ALL.map(stats_for);

    CollectionStats {
        total,
        collected,
        percentage: percentage(collected, total),
        by_category: ByCategory {
            fish,
            bug,
            sea_creature,
        },
    }
}
