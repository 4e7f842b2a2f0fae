// Database access layer (SQLite via sqlx).

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Island {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub hemisphere: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Creature {
    pub id: i64,
    pub name_fr: String,
    pub name_en: String,
    pub category: String,
    pub months_north: String,
    pub months_south: String,
    pub hours_available: String,
    pub location: String,
    pub sell_price: i64,
    pub image_url: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Progress {
    pub id: i64,
    pub island_id: i64,
    pub creature_id: i64,
    pub collected: bool,
    pub collected_at: Option<String>,
}

/// Everything needed to insert or refresh one catalog creature.
pub struct NewCreature<'a> {
    pub name_fr: &'a str,
    pub name_en: &'a str,
    pub category: &'a str,
    pub months_north: &'a str,
    pub months_south: &'a str,
    pub hours_available: &'a str,
    pub location: &'a str,
    pub sell_price: i64,
    pub image_url: &'a str,
    pub icon_url: &'a str,
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT (datetime('now'))
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS islands (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                hemisphere TEXT NOT NULL DEFAULT 'north'
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS creatures (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name_fr TEXT NOT NULL,
                name_en TEXT NOT NULL,
                category TEXT NOT NULL,
                months_north TEXT NOT NULL DEFAULT '[]',
                months_south TEXT NOT NULL DEFAULT '[]',
                hours_available TEXT NOT NULL DEFAULT '',
                location TEXT NOT NULL DEFAULT '',
                sell_price INTEGER NOT NULL DEFAULT 0,
                image_url TEXT NOT NULL DEFAULT '',
                icon_url TEXT NOT NULL DEFAULT '',
                UNIQUE(name_en, category)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS creopedia_progress (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                island_id INTEGER NOT NULL REFERENCES islands(id) ON DELETE CASCADE,
                creature_id INTEGER NOT NULL REFERENCES creatures(id) ON DELETE CASCADE,
                collected INTEGER NOT NULL DEFAULT 0,
                collected_at TEXT,
                UNIQUE(island_id, creature_id)
            )
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────────────

    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        let row = sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash) VALUES (?, ?) RETURNING id, email, password_hash, created_at",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn delete_user(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Islands ───────────────────────────────────────────────────────

    pub async fn create_island(
        &self,
        user_id: i64,
        name: &str,
        hemisphere: &str,
    ) -> Result<Island, sqlx::Error> {
        let row = sqlx::query_as::<_, Island>(
            "INSERT INTO islands (user_id, name, hemisphere) VALUES (?, ?, ?) RETURNING id, user_id, name, hemisphere",
        )
        .bind(user_id)
        .bind(name)
        .bind(hemisphere)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_islands(&self, user_id: i64) -> Result<Vec<Island>, sqlx::Error> {
        let rows = sqlx::query_as::<_, Island>(
            "SELECT id, user_id, name, hemisphere FROM islands WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Fetch one island, scoped to its owner. Another user's island id
    /// behaves exactly like a missing one.
    pub async fn get_island(&self, id: i64, user_id: i64) -> Result<Option<Island>, sqlx::Error> {
        let row = sqlx::query_as::<_, Island>(
            "SELECT id, user_id, name, hemisphere FROM islands WHERE id = ? AND user_id = ?",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// The user's default island: lowest id, i.e. the first one created.
    pub async fn first_island(&self, user_id: i64) -> Result<Option<Island>, sqlx::Error> {
        let row = sqlx::query_as::<_, Island>(
            "SELECT id, user_id, name, hemisphere FROM islands WHERE user_id = ? ORDER BY id LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_island(
        &self,
        id: i64,
        user_id: i64,
        name: &str,
        hemisphere: &str,
    ) -> Result<Option<Island>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE islands SET name = ?, hemisphere = ? WHERE id = ? AND user_id = ?",
        )
        .bind(name)
        .bind(hemisphere)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_island(id, user_id).await
    }

    pub async fn delete_island(&self, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM islands WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Creatures ─────────────────────────────────────────────────────

    /// The full catalog in presentation order: category, then French name.
    pub async fn list_creatures(&self) -> Result<Vec<Creature>, sqlx::Error> {
        let rows = sqlx::query_as::<_, Creature>(
            "SELECT id, name_fr, name_en, category, months_north, months_south, hours_available, location, sell_price, image_url, icon_url FROM creatures ORDER BY category, name_fr",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_creature(&self, id: i64) -> Result<Option<Creature>, sqlx::Error> {
        let row = sqlx::query_as::<_, Creature>(
            "SELECT id, name_fr, name_en, category, months_north, months_south, hours_available, location, sell_price, image_url, icon_url FROM creatures WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn count_creatures(&self) -> Result<i64, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM creatures")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert a creature, or refresh every field of the existing row with
    /// the same (name_en, category) key.
    pub async fn upsert_creature(
        &self,
        creature: &NewCreature<'_>,
    ) -> Result<Creature, sqlx::Error> {
        let row = sqlx::query_as::<_, Creature>(
            r#"
            INSERT INTO creatures (name_fr, name_en, category, months_north, months_south, hours_available, location, sell_price, image_url, icon_url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name_en, category) DO UPDATE SET
                name_fr = excluded.name_fr,
                months_north = excluded.months_north,
                months_south = excluded.months_south,
                hours_available = excluded.hours_available,
                location = excluded.location,
                sell_price = excluded.sell_price,
                image_url = excluded.image_url,
                icon_url = excluded.icon_url
            RETURNING id, name_fr, name_en, category, months_north, months_south, hours_available, location, sell_price, image_url, icon_url
        "#,
        )
        .bind(creature.name_fr)
        .bind(creature.name_en)
        .bind(creature.category)
        .bind(creature.months_north)
        .bind(creature.months_south)
        .bind(creature.hours_available)
        .bind(creature.location)
        .bind(creature.sell_price)
        .bind(creature.image_url)
        .bind(creature.icon_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    // ── Collection progress ───────────────────────────────────────────

    /// Ids of every creature marked collected on this island.
    pub async fn collected_ids(&self, island_id: i64) -> Result<Vec<i64>, sqlx::Error> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT creature_id FROM creopedia_progress WHERE island_id = ? AND collected = 1",
        )
        .bind(island_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    pub async fn get_progress(
        &self,
        island_id: i64,
        creature_id: i64,
    ) -> Result<Option<Progress>, sqlx::Error> {
        let row = sqlx::query_as::<_, Progress>(
            "SELECT id, island_id, creature_id, collected, collected_at FROM creopedia_progress WHERE island_id = ? AND creature_id = ?",
        )
        .bind(island_id)
        .bind(creature_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Set the collected flag for one (island, creature) pair in a single
    /// upsert, so concurrent toggles cannot race between a read and a write.
    ///
    /// The timestamp is set when the flag first turns on, kept when a
    /// collected creature is marked collected again, and cleared when the
    /// flag turns off.
    pub async fn set_collected(
        &self,
        island_id: i64,
        creature_id: i64,
        collected: bool,
    ) -> Result<Progress, sqlx::Error> {
        let row = sqlx::query_as::<_, Progress>(
            r#"
            INSERT INTO creopedia_progress (island_id, creature_id, collected, collected_at)
            VALUES (?, ?, ?, CASE WHEN ? THEN datetime('now') ELSE NULL END)
            ON CONFLICT(island_id, creature_id) DO UPDATE SET
                collected = excluded.collected,
                collected_at = CASE
                    WHEN excluded.collected = 0 THEN NULL
                    WHEN creopedia_progress.collected = 1 THEN creopedia_progress.collected_at
                    ELSE excluded.collected_at
                END
            RETURNING id, island_id, creature_id, collected, collected_at
        "#,
        )
        .bind(island_id)
        .bind(creature_id)
        .bind(collected)
        .bind(collected)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
