use duckdb::{params, Connection, Result as DbResult};
use tracing::info;

struct SeedProduct {
    id: &'static str,
    name: &'static str,
    slug: &'static str,
    short_description: &'static str,
    price: f64,
    category: &'static str,
    scent_family: &'static str,
    rating: f64,
    is_bestseller: bool,
    is_new: bool,
}

const COLLECTION: &[SeedProduct] = &[
    SeedProduct {
        id: "prod_white_rose_musk",
        name: "White Rose Musk",
        slug: "white-rose-musk",
        short_description: "Elegant floral women's aroma with fresh roses and soft musk",
        price: 520.00,
        category: "Home Scents",
        scent_family: "Floral",
        rating: 4.8,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_bleu_sport",
        name: "Bleu Sport",
        slug: "bleu-sport",
        short_description: "Fresh aquatic sporty fragrance for performance spaces",
        price: 385.00,
        category: "Office Scents",
        scent_family: "Fresh",
        rating: 4.6,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_fleur_enchante",
        name: "Fleur Enchanté",
        slug: "fleur-enchante",
        short_description: "Enchanting floral fragrance for diffusers",
        price: 456.50,
        category: "Home Scents",
        scent_family: "Floral",
        rating: 4.9,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_white_mulberry",
        name: "White Mulberry",
        slug: "white-mulberry",
        short_description: "Sweet fruity gourmand fragrance",
        price: 382.50,
        category: "Home Scents",
        scent_family: "Fruity",
        rating: 4.7,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_elegance",
        name: "Elegance",
        slug: "elegance",
        short_description: "Sophisticated signature fragrance",
        price: 350.00,
        category: "Home Scents",
        scent_family: "Luxury",
        rating: 4.9,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_victoria_royale",
        name: "Victoria Royale",
        slug: "victoria-royale",
        short_description: "Majestic royal fragrance",
        price: 300.00,
        category: "Home Scents",
        scent_family: "Luxury",
        rating: 4.8,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_coorg_mandarin",
        name: "Coorg Mandarin",
        slug: "coorg-mandarin",
        short_description: "Vibrant citrus mandarin freshness",
        price: 351.00,
        category: "Home Scents",
        scent_family: "Citrus",
        rating: 4.6,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_sandalwood_tranquility",
        name: "Sandalwood Tranquility",
        slug: "sandalwood-tranquility",
        short_description: "Calming woody sandalwood essence",
        price: 300.00,
        category: "Home Scents",
        scent_family: "Woody",
        rating: 4.9,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_ocean_secrets",
        name: "Ocean Secrets",
        slug: "ocean-secrets",
        short_description: "Mysterious aquatic ocean fragrance",
        price: 300.00,
        category: "Home Scents",
        scent_family: "Fresh",
        rating: 4.9,
        is_bestseller: true,
        is_new: false,
    },
    SeedProduct {
        id: "prod_mystic_whiff",
        name: "Mystic Whiff",
        slug: "mystic-whiff",
        short_description: "Mysterious enchanting aroma",
        price: 250.00,
        category: "Home Scents",
        scent_family: "Luxury",
        rating: 4.7,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_musk_oudh",
        name: "Musk Oudh",
        slug: "musk-oudh",
        short_description: "Luxurious oudh and musk blend",
        price: 550.00,
        category: "Home Scents",
        scent_family: "Woody",
        rating: 4.8,
        is_bestseller: false,
        is_new: true,
    },
    SeedProduct {
        id: "prod_morning_mist",
        name: "Morning Mist",
        slug: "morning-mist",
        short_description: "Fresh morning dew essence",
        price: 280.00,
        category: "Home Scents",
        scent_family: "Fresh",
        rating: 4.6,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_lavender_bliss",
        name: "Lavender Bliss",
        slug: "lavender-bliss",
        short_description: "Calming French lavender essence",
        price: 280.00,
        category: "Home Scents",
        scent_family: "Floral",
        rating: 4.8,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_jasmine_neroli",
        name: "Jasmine Neroli",
        slug: "jasmine-neroli",
        short_description: "Romantic jasmine and neroli blend",
        price: 250.00,
        category: "Home Scents",
        scent_family: "Floral",
        rating: 4.7,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_fleur_rose",
        name: "Fleur Rose",
        slug: "fleur-rose",
        short_description: "Signature rose fragrance",
        price: 280.00,
        category: "Home Scents",
        scent_family: "Floral",
        rating: 4.9,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_first_rain",
        name: "First Rain",
        slug: "first-rain",
        short_description: "Petrichor monsoon rain essence",
        price: 300.00,
        category: "Home Scents",
        scent_family: "Fresh",
        rating: 4.8,
        is_bestseller: false,
        is_new: false,
    },
    SeedProduct {
        id: "prod_jasmine_bloom",
        name: "Jasmine Bloom",
        slug: "jasmine-bloom",
        short_description: "Pure jasmine essence",
        price: 250.00,
        category: "Home Scents",
        scent_family: "Floral",
        rating: 4.7,
        is_bestseller: false,
        is_new: false,
    },
];

/// Inserts the Fleur collection when the products table is empty. Returns
/// the number of rows inserted, 0 when the catalog was already seeded.
pub fn seed_catalog(conn: &Connection) -> DbResult<usize> {
    let count: i64 = conn.query_row("SELECT count(*) FROM products", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(0);
    }

    info!("Seeding product catalog");
    for p in COLLECTION {
        conn.execute(
            "INSERT INTO products (id, name, slug, short_description, price, category, scent_family, rating, is_bestseller, is_new)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                p.id,
                p.name,
                p.slug,
                p.short_description,
                p.price,
                p.category,
                p.scent_family,
                p.rating,
                p.is_bestseller,
                p.is_new
            ],
        )?;
    }
    Ok(COLLECTION.len())
}
