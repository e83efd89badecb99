pub mod seed;

use crate::db::DbPool;
use duckdb::{params, Result as DbResult, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub short_description: String,
    pub price: f64,
    pub category: String,
    pub scent_family: String,
    pub rating: f64,
    pub is_bestseller: bool,
    pub is_new: bool,
}

const PRODUCT_COLUMNS: &str =
    "id, name, slug, short_description, price, category, scent_family, rating, is_bestseller, is_new";

/// Read access to the product catalog. Prices and names read from here are
/// authoritative; anything a model says about a product is not.
#[derive(Clone)]
pub struct Catalog {
    pool: DbPool,
}

impl Catalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_product(row: &Row) -> DbResult<Product> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            slug: row.get(2)?,
            short_description: row.get(3)?,
            price: row.get(4)?,
            category: row.get(5)?,
            scent_family: row.get(6)?,
            rating: row.get(7)?,
            is_bestseller: row.get(8)?,
            is_new: row.get(9)?,
        })
    }

    pub fn list_all(&self) -> DbResult<Vec<Product>> {
        let conn = self.pool.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))?;
        let rows = stmt.query_map([], Self::row_to_product)?;

        let mut products = Vec::new();
        for row in rows {
            products.push(row?);
        }
        Ok(products)
    }

    /// Exact lookup, case-insensitive and whitespace-trimmed.
    pub fn find_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        let conn = self.pool.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE lower(name) = lower(trim(?))"
        ))?;
        let mut rows = stmt.query_map(params![name], Self::row_to_product)?;

        if let Some(row) = rows.next() {
            Ok(Some(row?))
        } else {
            Ok(None)
        }
    }

    pub fn top_rated(&self, limit: usize) -> DbResult<Vec<Product>> {
        let conn = self.pool.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rating DESC, name LIMIT ?"
        ))?;
        let rows = stmt.query_map(params![limit as i64], Self::row_to_product)?;

        let mut products = Vec::new();
        for row in rows {
            products.push(row?);
        }
        Ok(products)
    }
}
