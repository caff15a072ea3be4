// src/db/markets.rs
use rusqlite::{params, OptionalExtension};
use thiserror::Error;

use crate::auth::token::new_id;
use crate::db::connection::Database;
use crate::domain::validation::validate;
use crate::domain::FinalizedListing;
use crate::errors::ServerError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{0}")]
    Database(String),
    #[error("market {id} has an unreadable document: {reason}")]
    Corrupt { id: String, reason: String },
    #[error("market {0} not found")]
    NotFound(String),
}

impl From<ServerError> for StoreError {
    fn from(err: ServerError) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// A listing as persisted, with the id the store assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMarket {
    pub id: String,
    pub listing: FinalizedListing,
}

/// Persistence for market listings. The store is authoritative and assigns
/// ids; callers keep no cache beyond what they render.
pub trait ListingStore: Send + Sync {
    fn create(&self, listing: &FinalizedListing) -> Result<String, StoreError>;
    fn list(&self) -> Result<Vec<StoredMarket>, StoreError>;
    fn get(&self, id: &str) -> Result<Option<StoredMarket>, StoreError>;
    fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;
}

/// One JSON document per row in the `markets` table.
#[derive(Debug, Clone)]
pub struct SqliteListingStore {
    db: Database,
}

impl SqliteListingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Parse a stored document and hold it to the same rules as a fresh submit.
fn decode(id: String, document: &str) -> Result<StoredMarket, StoreError> {
    let listing: FinalizedListing = match serde_json::from_str(document) {
        Ok(listing) => listing,
        Err(e) => {
            return Err(StoreError::Corrupt {
                id,
                reason: e.to_string(),
            })
        }
    };

    if let Err(e) = validate(&listing.to_draft()) {
        return Err(StoreError::Corrupt {
            id,
            reason: e.to_string(),
        });
    }

    Ok(StoredMarket { id, listing })
}

impl ListingStore for SqliteListingStore {
    fn create(&self, listing: &FinalizedListing) -> Result<String, StoreError> {
        let document = serde_json::to_string(listing)
            .map_err(|e| StoreError::Database(format!("encode market failed: {e}")))?;
        let id = new_id();

        self.db.with_conn(|conn| {
            conn.execute(
                "insert into markets (id, created_by, created_at, document) values (?, ?, ?, ?)",
                params![
                    id,
                    listing.created_by(),
                    listing.created_at().to_rfc3339(),
                    document
                ],
            )
            .map_err(|e| ServerError::DbError(format!("insert market failed: {e}")))?;
            Ok(())
        })?;

        tracing::info!(market_id = %id, created_by = listing.created_by(), "market created");
        Ok(id)
    }

    fn list(&self) -> Result<Vec<StoredMarket>, StoreError> {
        let rows: Vec<(String, String)> = self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare("select id, document from markets order by created_at desc, id")
                .map_err(|e| ServerError::DbError(e.to_string()))?;

            let rows = stmt
                .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .map_err(|e| ServerError::DbError(e.to_string()))?;

            let mut out = Vec::new();
            for r in rows {
                out.push(r.map_err(|e| ServerError::DbError(e.to_string()))?);
            }
            Ok(out)
        })?;

        let mut markets = Vec::with_capacity(rows.len());
        for (id, document) in rows {
            match decode(id, &document) {
                Ok(market) => markets.push(market),
                // One bad document should not hide every other market.
                Err(e) => tracing::warn!("skipping market: {e}"),
            }
        }
        Ok(markets)
    }

    fn get(&self, id: &str) -> Result<Option<StoredMarket>, StoreError> {
        let document: Option<String> = self.db.with_conn(|conn| {
            conn.query_row(
                "select document from markets where id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| ServerError::DbError(format!("select market failed: {e}")))
        })?;

        document
            .map(|doc| decode(id.to_string(), &doc))
            .transpose()
    }

    fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let deleted = self.db.with_conn(|conn| {
            conn.execute("delete from markets where id = ?", params![id])
                .map_err(|e| ServerError::DbError(format!("delete market failed: {e}")))
        })?;

        if deleted == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        tracing::info!(market_id = %id, "market deleted");
        Ok(())
    }
}

/// Delete a market on behalf of `requester`. Only its creator may do so.
pub fn delete_owned(
    store: &dyn ListingStore,
    id: &str,
    requester: &str,
) -> Result<(), ServerError> {
    let market = store.get(id)?.ok_or(ServerError::NotFound)?;

    if market.listing.created_by() != requester {
        tracing::warn!(market_id = %id, requester, "delete refused: not the creator");
        return Err(ServerError::Forbidden(
            "only the creator may delete this market".into(),
        ));
    }

    store.delete_by_id(id)?;
    Ok(())
}
