use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, Sqlite, SqlitePool};
use std::time::{Duration, Instant};

use crate::error::Result;

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

const SLOW_QUERY: Duration = Duration::from_millis(200);

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
            .filter(|s| *s >= 1)
            .map(|s| s.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Saturates instead of overflowing; an out-of-range page is simply empty.
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.page_size())
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub total: i64,
}

/// Appends `AND ...` conditions to a query that already ends in a `WHERE` clause.
pub trait PageFilter {
    fn apply(&self, builder: &mut QueryBuilder<'_, Sqlite>);
}

/// Runs a count and a page query against `table` inside one read transaction,
/// so `total` and `list` come from the same snapshot.
pub async fn paginate<T, F>(
    pool: &SqlitePool,
    table: &str,
    filter: &F,
    order: &str,
    request: PageRequest,
) -> Result<Page<T>>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    F: PageFilter,
{
    let mut tx = pool.begin().await?;

    let started = Instant::now();
    let mut count = QueryBuilder::<Sqlite>::new(format!("SELECT COUNT(*) FROM {} WHERE 1 = 1", table));
    filter.apply(&mut count);
    let total: i64 = count.build_query_scalar::<i64>().fetch_one(&mut *tx).await?;
    warn_if_slow("count", table, started);

    let started = Instant::now();
    let mut data = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {} WHERE 1 = 1", table));
    filter.apply(&mut data);
    data.push(" ORDER BY ")
        .push(order)
        .push(" LIMIT ")
        .push_bind(request.page_size())
        .push(" OFFSET ")
        .push_bind(request.offset());
    let list = data.build_query_as::<T>().fetch_all(&mut *tx).await?;
    warn_if_slow("page", table, started);

    tx.commit().await?;

    Ok(Page { list, total })
}

fn warn_if_slow(kind: &str, table: &str, started: Instant) {
    let elapsed = started.elapsed();
    if elapsed > SLOW_QUERY {
        tracing::warn!(table, ?elapsed, "Slow {} query", kind);
    }
}
