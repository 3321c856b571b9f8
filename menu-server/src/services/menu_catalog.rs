//! Menu Catalog - single source of truth for what can be ordered, at what price
//!
//! Owns the weekly menu: item CRUD, publish/unpublish, availability queries,
//! default-side application and week duplication. All bulk writes go through
//! the repository as one batch; `apply_default_sides` additionally runs a
//! bounded verify-and-repair pass because the batch read-back is not
//! guaranteed to be immediately consistent.

use crate::core::config::DefaultSide;
use crate::db::repository::{MenuItemRepository, RepoError};
use crate::db::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use crate::utils::now_millis;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuItemKind, PriceTable, UserCategory};
use shared::week;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Verification attempts after a default-sides batch before giving up
const PUBLISH_REPAIR_ATTEMPTS: usize = 3;

// =============================================================================
// Types
// =============================================================================

/// One day of a week menu, grouped by item kind
#[derive(Debug, Clone, Serialize)]
pub struct DayMenu {
    pub date: NaiveDate,
    pub day: String,
    pub lunches: Vec<MenuItem>,
    pub sides: Vec<MenuItem>,
}

/// A whole week's menu grouped by date
#[derive(Debug, Clone, Serialize)]
pub struct WeekMenu {
    pub week_start: NaiveDate,
    pub days: Vec<DayMenu>,
}

impl WeekMenu {
    fn group(week_start: NaiveDate, items: Vec<MenuItem>) -> Self {
        let mut days: Vec<DayMenu> = week::work_days(week_start)
            .into_iter()
            .map(|date| DayMenu {
                date,
                day: week::day_name(date.weekday()).to_string(),
                lunches: Vec::new(),
                sides: Vec::new(),
            })
            .collect();

        for item in items {
            if let Some(day) = days.iter_mut().find(|d| d.date == item.date) {
                match item.kind {
                    MenuItemKind::Lunch => day.lunches.push(item),
                    MenuItemKind::Side => day.sides.push(item),
                }
            }
        }

        Self { week_start, days }
    }

    pub fn item_count(&self) -> usize {
        self.days
            .iter()
            .map(|d| d.lunches.len() + d.sides.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    /// Flat iterator over every item of the week
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> {
        self.days
            .iter()
            .flat_map(|d| d.lunches.iter().chain(d.sides.iter()))
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("No menu items for week {0}")]
    WeekEmpty(NaiveDate),

    #[error("Week {0} has no active items to publish")]
    NothingToPublish(NaiveDate),

    #[error("Code {code} already used for a {kind} in week {week}")]
    CodeTaken {
        code: String,
        kind: MenuItemKind,
        week: NaiveDate,
    },

    #[error("Default sides already exist for {0}")]
    SidesAlreadyApplied(NaiveDate),

    #[error("No default side dishes configured")]
    NoDefaultSides,

    #[error("Target week {0} already has menu items")]
    TargetOccupied(NaiveDate),

    #[error("{date} is not a work day of week {week}")]
    DayOutsideWeek { date: NaiveDate, week: NaiveDate },

    #[error("{0} is not a Monday week anchor")]
    BadAnchor(NaiveDate),

    #[error("Menu item not found: {0}")]
    ItemNotFound(String),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::WeekEmpty(_) => AppError::with_message(ErrorCode::MenuWeekEmpty, message),
            CatalogError::NothingToPublish(_) => {
                AppError::with_message(ErrorCode::NothingToPublish, message)
            }
            CatalogError::CodeTaken { .. } => {
                AppError::with_message(ErrorCode::MenuCodeTaken, message)
            }
            CatalogError::SidesAlreadyApplied(_) => {
                AppError::with_message(ErrorCode::SidesAlreadyApplied, message)
            }
            CatalogError::NoDefaultSides => {
                AppError::with_message(ErrorCode::DefaultSidesMissing, message)
            }
            CatalogError::TargetOccupied(_) => {
                AppError::with_message(ErrorCode::DuplicateTargetOccupied, message)
            }
            CatalogError::DayOutsideWeek { .. } | CatalogError::Invalid(_) => {
                AppError::validation(message)
            }
            CatalogError::BadAnchor(_) => {
                AppError::with_message(ErrorCode::InvalidWeekAnchor, message)
            }
            CatalogError::ItemNotFound(_) => {
                AppError::with_message(ErrorCode::NotFound, message)
            }
            CatalogError::Repo(e) => e.into(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;

// =============================================================================
// MenuCatalog
// =============================================================================

/// Menu catalog service
#[derive(Clone)]
pub struct MenuCatalog {
    repo: MenuItemRepository,
    prices: PriceTable,
    default_sides: Vec<DefaultSide>,
}

impl MenuCatalog {
    pub fn new(db: Surreal<Db>, prices: PriceTable, default_sides: Vec<DefaultSide>) -> Self {
        Self {
            repo: MenuItemRepository::new(db),
            prices,
            default_sides,
        }
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    // =========================================================================
    // Availability queries
    // =========================================================================

    /// The end-user view of a week: active and published items only
    ///
    /// An unpublished or missing week is an empty menu, not an error.
    pub async fn published_week(&self, week_start: NaiveDate) -> CatalogResult<WeekMenu> {
        let items = self.repo.find_week_published(week_start).await?;
        Ok(WeekMenu::group(week_start, items))
    }

    /// The admin view of a week: every item regardless of publish state
    pub async fn admin_week(&self, week_start: NaiveDate) -> CatalogResult<WeekMenu> {
        let items = self.repo.find_week_all(week_start).await?;
        Ok(WeekMenu::group(week_start, items))
    }

    /// Effective price of an item for a user category
    pub fn resolve_price(&self, item: &MenuItem, category: UserCategory) -> f64 {
        self.prices.resolve(item.kind, category, item.price)
    }

    // =========================================================================
    // Item CRUD
    // =========================================================================

    pub async fn create_item(&self, data: MenuItemCreate) -> CatalogResult<MenuItem> {
        let code = data.code.trim().to_string();
        if code.is_empty() {
            return Err(CatalogError::Invalid("code must not be empty".into()));
        }
        if data.description.trim().is_empty() {
            return Err(CatalogError::Invalid("description must not be empty".into()));
        }

        let week_start = week::monday_of(data.date);
        if self
            .repo
            .code_exists(week_start, data.kind, &code, None)
            .await?
        {
            return Err(CatalogError::CodeTaken {
                code,
                kind: data.kind,
                week: week_start,
            });
        }

        let now = now_millis();
        let item = MenuItem {
            id: None,
            code,
            description: data.description.trim().to_string(),
            kind: data.kind,
            date: data.date,
            day: week::day_name(data.date.weekday()).to_string(),
            week_start,
            price: data.price,
            active: data.active.unwrap_or(true),
            // Normal flow: create unpublished, publish the week later
            published: false,
            created_at: now,
            updated_at: now,
        };
        Ok(self.repo.create(item).await?)
    }

    pub async fn update_item(&self, id: &str, data: MenuItemUpdate) -> CatalogResult<MenuItem> {
        let existing = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::ItemNotFound(id.to_string()))?;

        if let Some(new_code) = data.code.as_deref() {
            let new_code = new_code.trim();
            if new_code.is_empty() {
                return Err(CatalogError::Invalid("code must not be empty".into()));
            }
            if new_code != existing.code
                && self
                    .repo
                    .code_exists(existing.week_start, existing.kind, new_code, existing.id.clone())
                    .await?
            {
                return Err(CatalogError::CodeTaken {
                    code: new_code.to_string(),
                    kind: existing.kind,
                    week: existing.week_start,
                });
            }
        }

        Ok(self.repo.update(id, data).await?)
    }

    pub async fn delete_item(&self, id: &str) -> CatalogResult<()> {
        Ok(self.repo.delete(id).await?)
    }

    // =========================================================================
    // Week operations
    // =========================================================================

    /// Batch-flip `published` on every active item of the week
    ///
    /// Returns the number of items flipped.
    pub async fn publish_week(&self, week_start: NaiveDate, publish: bool) -> CatalogResult<usize> {
        let items = self.repo.find_week_all(week_start).await?;
        if items.is_empty() {
            return Err(CatalogError::WeekEmpty(week_start));
        }
        if publish && !items.iter().any(|i| i.active) {
            return Err(CatalogError::NothingToPublish(week_start));
        }

        let flipped = self.repo.set_published_week(week_start, publish).await?;
        tracing::info!(
            week = %week_start,
            publish,
            count = flipped.len(),
            "Week publish state updated"
        );
        Ok(flipped.len())
    }

    /// Bulk-create default side dishes for every work day of the week
    pub async fn apply_default_sides(&self, week_start: NaiveDate) -> CatalogResult<Vec<MenuItem>> {
        self.apply_default_sides_on(week_start, week::work_days(week_start))
            .await
    }

    /// Bulk-create default side dishes for a single day
    pub async fn apply_default_sides_for_day(
        &self,
        week_start: NaiveDate,
        date: NaiveDate,
    ) -> CatalogResult<Vec<MenuItem>> {
        if !week::work_days(week_start).contains(&date) {
            return Err(CatalogError::DayOutsideWeek {
                date,
                week: week_start,
            });
        }
        self.apply_default_sides_on(week_start, vec![date]).await
    }

    async fn apply_default_sides_on(
        &self,
        week_start: NaiveDate,
        dates: Vec<NaiveDate>,
    ) -> CatalogResult<Vec<MenuItem>> {
        if self.default_sides.is_empty() {
            return Err(CatalogError::NoDefaultSides);
        }

        // No overwrite: any existing side on a target day aborts the batch
        let existing = self
            .repo
            .find_sides_on(week_start, dates.clone())
            .await?;
        if let Some(item) = existing.first() {
            return Err(CatalogError::SidesAlreadyApplied(item.date));
        }

        let now = now_millis();
        let mut items = Vec::with_capacity(dates.len() * self.default_sides.len());
        for date in &dates {
            // Day ordinal keeps codes unique within (week, kind)
            let day_idx = (*date - week_start).num_days() + 1;
            for side in &self.default_sides {
                items.push(MenuItem {
                    id: None,
                    code: format!("{}-{}", side.code, day_idx),
                    description: side.description.clone(),
                    kind: MenuItemKind::Side,
                    date: *date,
                    day: week::day_name(date.weekday()).to_string(),
                    week_start,
                    price: None,
                    active: true,
                    // Defaults are meant to be instantly visible
                    published: true,
                    created_at: now,
                    updated_at: now,
                });
            }
        }

        let created = self.repo.insert_batch(items).await?;
        tracing::info!(
            week = %week_start,
            days = dates.len(),
            count = created.len(),
            "Default sides applied"
        );

        self.ensure_published(&created).await?;
        Ok(created)
    }

    /// Verify-and-repair pass after a batch that must land published
    ///
    /// The store does not guarantee the batch read-back is immediately
    /// consistent, so re-read the written items and re-apply `published` to
    /// any that were not flipped, up to a bounded number of attempts.
    async fn ensure_published(&self, created: &[MenuItem]) -> CatalogResult<()> {
        let ids: Vec<_> = created.iter().filter_map(|i| i.id.clone()).collect();

        for attempt in 1..=PUBLISH_REPAIR_ATTEMPTS {
            let stragglers = self.repo.find_unpublished(ids.clone()).await?;
            if stragglers.is_empty() {
                return Ok(());
            }
            tracing::warn!(
                attempt,
                count = stragglers.len(),
                "Repairing unpublished items after batch write"
            );
            let straggler_ids: Vec<_> =
                stragglers.into_iter().filter_map(|i| i.id).collect();
            self.repo.republish(straggler_ids).await?;
        }

        let residue = self.repo.find_unpublished(ids).await?;
        if !residue.is_empty() {
            tracing::error!(
                count = residue.len(),
                "Items still unpublished after repair attempts"
            );
        }
        Ok(())
    }

    /// Copy every item of `source_week` into `target_week`
    ///
    /// Copies never auto-publish. Fails when the target week already has any
    /// items; there is no merge.
    pub async fn duplicate_week(
        &self,
        source_week: NaiveDate,
        target_week: NaiveDate,
    ) -> CatalogResult<usize> {
        if !week::is_week_anchor(target_week) {
            return Err(CatalogError::BadAnchor(target_week));
        }

        let source_items = self.repo.find_week_all(source_week).await?;
        if source_items.is_empty() {
            return Err(CatalogError::WeekEmpty(source_week));
        }
        let target_items = self.repo.find_week_all(target_week).await?;
        if !target_items.is_empty() {
            return Err(CatalogError::TargetOccupied(target_week));
        }

        let now = now_millis();
        let copies: Vec<MenuItem> = source_items
            .into_iter()
            .map(|item| {
                let offset = item.date - item.week_start;
                let date = target_week + offset;
                MenuItem {
                    id: None,
                    date,
                    day: week::day_name(date.weekday()).to_string(),
                    week_start: target_week,
                    // Duplication never auto-publishes
                    published: false,
                    created_at: now,
                    updated_at: now,
                    ..item
                }
            })
            .collect();

        let created = self.repo.insert_batch(copies).await?;
        tracing::info!(
            source = %source_week,
            target = %target_week,
            count = created.len(),
            "Week duplicated"
        );
        Ok(created.len())
    }
}
