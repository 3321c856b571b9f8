//! Menu Item Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{MenuItem, MenuItemUpdate};
use crate::utils::now_millis;
use chrono::NaiveDate;
use shared::models::MenuItemKind;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const MENU_TABLE: &str = "menu";

#[derive(Clone)]
pub struct MenuItemRepository {
    base: BaseRepository,
}

impl MenuItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All items of a week, regardless of publish state (admin view)
    pub async fn find_week_all(&self, week_start: NaiveDate) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query("SELECT * FROM menu WHERE week_start = $week ORDER BY date, kind, code")
            .bind(("week", week_start))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Items visible to end users: active and published (public view)
    pub async fn find_week_published(&self, week_start: NaiveDate) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query(
                "SELECT * FROM menu WHERE week_start = $week AND active = true AND published = true ORDER BY date, kind, code",
            )
            .bind(("week", week_start))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Side items of a week for the given dates (overwrite guard)
    pub async fn find_sides_on(
        &self,
        week_start: NaiveDate,
        dates: Vec<NaiveDate>,
    ) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query("SELECT * FROM menu WHERE week_start = $week AND kind = 'side' AND date IN $dates")
            .bind(("week", week_start))
            .bind(("dates", dates))
            .await?
            .take(0)?;
        Ok(items)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<MenuItem>> {
        let record_id: RecordId = id
            .parse()
            .map_err(|_| RepoError::NotFound(format!("Invalid menu item id: {}", id)))?;
        let item: Option<MenuItem> = self.base.db().select(record_id).await?;
        Ok(item)
    }

    /// Whether a business code is already used within (week, kind)
    pub async fn code_exists(
        &self,
        week_start: NaiveDate,
        kind: MenuItemKind,
        code: &str,
        exclude: Option<RecordId>,
    ) -> RepoResult<bool> {
        let mut query = String::from(
            "SELECT * FROM menu WHERE week_start = $week AND kind = $kind AND code = $code",
        );
        if exclude.is_some() {
            query.push_str(" AND id != $exclude");
        }
        let mut q = self
            .base
            .db()
            .query(&query)
            .bind(("week", week_start))
            .bind(("kind", kind))
            .bind(("code", code.to_string()));
        if let Some(id) = exclude {
            q = q.bind(("exclude", id));
        }
        let items: Vec<MenuItem> = q.await?.take(0)?;
        Ok(!items.is_empty())
    }

    pub async fn create(&self, item: MenuItem) -> RepoResult<MenuItem> {
        let created: Option<MenuItem> = self.base.db().create(MENU_TABLE).content(item).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create menu item".to_string()))
    }

    /// Insert a batch of items as one atomic multi-document write
    pub async fn insert_batch(&self, items: Vec<MenuItem>) -> RepoResult<Vec<MenuItem>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let created: Vec<MenuItem> = self.base.db().insert(MENU_TABLE).content(items).await?;
        Ok(created)
    }

    pub async fn update(&self, id: &str, data: MenuItemUpdate) -> RepoResult<MenuItem> {
        let record_id: RecordId = id
            .parse()
            .map_err(|_| RepoError::NotFound(format!("Invalid menu item id: {}", id)))?;

        let mut set_parts: Vec<&str> = vec!["updated_at = $now"];
        if data.code.is_some() {
            set_parts.push("code = $code");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.active.is_some() {
            set_parts.push("active = $active");
        }
        if data.published.is_some() {
            set_parts.push("published = $published");
        }

        let query = format!("UPDATE $item SET {} RETURN AFTER", set_parts.join(", "));
        let mut q = self
            .base
            .db()
            .query(&query)
            .bind(("item", record_id))
            .bind(("now", now_millis()));
        if let Some(v) = data.code {
            q = q.bind(("code", v));
        }
        if let Some(v) = data.description {
            q = q.bind(("description", v));
        }
        if let Some(v) = data.price {
            q = q.bind(("price", v));
        }
        if let Some(v) = data.active {
            q = q.bind(("active", v));
        }
        if let Some(v) = data.published {
            q = q.bind(("published", v));
        }

        let items: Vec<MenuItem> = q.await?.take(0)?;
        items
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Menu item {} not found", id)))
    }

    /// Hard delete
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let record_id: RecordId = id
            .parse()
            .map_err(|_| RepoError::NotFound(format!("Invalid menu item id: {}", id)))?;
        let deleted: Option<MenuItem> = self.base.db().delete(record_id).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Menu item {} not found", id)));
        }
        Ok(())
    }

    /// Batch-flip `published` on every active item of a week
    pub async fn set_published_week(
        &self,
        week_start: NaiveDate,
        publish: bool,
    ) -> RepoResult<Vec<MenuItem>> {
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query(
                "UPDATE menu SET published = $publish, updated_at = $now WHERE week_start = $week AND active = true RETURN AFTER",
            )
            .bind(("publish", publish))
            .bind(("now", now_millis()))
            .bind(("week", week_start))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Of the given ids, the ones whose `published` flag did not stick
    pub async fn find_unpublished(&self, ids: Vec<RecordId>) -> RepoResult<Vec<MenuItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query("SELECT * FROM menu WHERE id IN $ids AND published != true")
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Re-apply `published = true` to straggler ids
    pub async fn republish(&self, ids: Vec<RecordId>) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let items: Vec<MenuItem> = self
            .base
            .db()
            .query("UPDATE menu SET published = true, updated_at = $now WHERE id IN $ids RETURN AFTER")
            .bind(("now", now_millis()))
            .bind(("ids", ids))
            .await?
            .take(0)?;
        Ok(items.len())
    }
}
