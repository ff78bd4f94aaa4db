//! Local cache of company listings.
//!
//! The table has no natural key: every remote refresh replaces its whole content.

use anyhow::Context;
use sqlx::sqlite::SqlitePool;

// Three binds per row keeps a chunk well under SQLite's host parameter limit.
const INSERT_CHUNK_SIZE: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyListingEntity {
    pub name: String,
    pub symbol: String,
    pub exchange: String,
}

/// Listings whose name contains `query` (case-insensitive) or whose symbol equals the
/// upper-cased `query`, in insertion order. An empty query matches everything.
pub async fn search_company_listings(
    pool: &SqlitePool,
    query: &str,
) -> anyhow::Result<Vec<CompanyListingEntity>> {
    let rows = sqlx::query_as::<_, (String, String, String)>(
        "SELECT name, symbol, exchange \
         FROM company_listings \
         WHERE LOWER(name) LIKE '%' || LOWER(?) || '%' OR symbol = UPPER(?) \
         ORDER BY id ASC",
    )
    .bind(query)
    .bind(query)
    .fetch_all(pool)
    .await
    .context("search company_listings failed")?;

    Ok(rows
        .into_iter()
        .map(|(name, symbol, exchange)| CompanyListingEntity {
            name,
            symbol,
            exchange,
        })
        .collect())
}

pub async fn clear_company_listings(pool: &SqlitePool) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM company_listings")
        .execute(pool)
        .await
        .context("clear company_listings failed")?;
    Ok(res.rows_affected())
}

pub async fn insert_company_listings(
    pool: &SqlitePool,
    items: &[CompanyListingEntity],
) -> anyhow::Result<u64> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;
    let inserted = insert_chunked(&mut tx, items).await?;
    tx.commit().await.context("commit transaction failed")?;
    Ok(inserted)
}

/// Clears the table and inserts `items` in one transaction, so readers never observe an
/// empty cache in between.
pub async fn replace_company_listings(
    pool: &SqlitePool,
    items: &[CompanyListingEntity],
) -> anyhow::Result<u64> {
    let mut tx = pool.begin().await.context("begin transaction failed")?;

    let cleared = sqlx::query("DELETE FROM company_listings")
        .execute(&mut *tx)
        .await
        .context("clear company_listings failed")?
        .rows_affected();
    let inserted = insert_chunked(&mut tx, items).await?;

    tx.commit().await.context("commit transaction failed")?;

    tracing::debug!(cleared, inserted, "company_listings replaced");
    Ok(inserted)
}

async fn insert_chunked(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    items: &[CompanyListingEntity],
) -> anyhow::Result<u64> {
    let mut affected: u64 = 0;
    for chunk in items.chunks(INSERT_CHUNK_SIZE) {
        let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new(
            "INSERT INTO company_listings (name, symbol, exchange) ",
        );
        qb.push_values(chunk, |mut b, item| {
            b.push_bind(item.name.as_str())
                .push_bind(item.symbol.as_str())
                .push_bind(item.exchange.as_str());
        });

        let res = qb
            .build()
            .execute(&mut **tx)
            .await
            .context("batch insert company_listings failed")?;
        affected += res.rows_affected();
    }
    Ok(affected)
}
