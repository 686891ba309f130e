//! Products

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Backend-assigned product identifier.
pub type ProductId = u64;

/// Product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category identifier
    pub id: u64,

    /// Display name
    pub name: String,

    /// URL slug
    pub slug: String,
}

/// Physical characteristics shown next to a product. All values are display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpecs {
    /// Height, e.g. `40 cm`
    pub height: String,

    /// Width, e.g. `50 cm`
    pub width: String,

    /// Weight, e.g. `2.6 kg`
    pub weight: String,

    /// Maximum load, e.g. `250 kg`
    pub load: String,

    /// Construction material
    pub material: String,
}

impl ProductSpecs {
    fn new(height: &str, width: &str, weight: &str, load: &str, material: &str) -> Self {
        Self {
            height: height.to_string(),
            width: width.to_string(),
            weight: weight.to_string(),
            load: load.to_string(),
            material: material.to_string(),
        }
    }
}

/// Product
///
/// The backend may send `price` either as a JSON number or as a decimal string; both deserialize
/// into a [`Decimal`], so every product held client-side carries a numeric price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier
    pub id: ProductId,

    /// URL slug
    #[serde(default)]
    pub slug: String,

    /// Display name
    pub name: String,

    /// Long description
    #[serde(default)]
    pub description: String,

    /// Unit price
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,

    /// Image paths, in display order
    #[serde(default)]
    pub images: Vec<String>,

    /// Category, when the backend embeds it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Units available according to the backend
    #[serde(default)]
    pub stock: u32,

    /// Whether the product is highlighted in the shop
    #[serde(default)]
    pub featured: bool,

    /// Physical characteristics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specs: Option<ProductSpecs>,

    /// Marketing tag, e.g. `BEST SELLER`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Product {
    /// The product's own specs, or the catalogue specs registered for its slug.
    pub fn specs_or_fallback(&self) -> Option<ProductSpecs> {
        self.specs.clone().or_else(|| fallback_specs(&self.slug))
    }

    /// Whether no units can be ordered at all.
    pub fn is_sold_out(&self) -> bool {
        self.stock == 0
    }
}

/// Catalogue specs for a slug, used when a product arrives without its own.
pub fn fallback_specs(slug: &str) -> Option<ProductSpecs> {
    let specs = match slug {
        "parallette-s" => ProductSpecs::new("30 cm", "42 cm", "1.8 kg", "200 kg", "Acciaio C45"),
        "parallette-m" => ProductSpecs::new(
            "40 cm",
            "50 cm",
            "2.6 kg",
            "250 kg",
            "Acciaio C45 + Alluminio",
        ),
        "parallette-l" => {
            ProductSpecs::new("50 cm", "58 cm", "4.2 kg", "300 kg", "Full Steel C45")
        }
        _ => return None,
    };

    Some(specs)
}

/// The shop's fixed catalogue.
pub fn catalogue() -> Vec<Product> {
    let category = Category {
        id: 1,
        name: "Parallette".to_string(),
        slug: "parallette".to_string(),
    };

    [
        (
            1,
            "parallette-s",
            "Parallette S",
            "Compact parallettes for small spaces. Ideal for L-sit, planche progressions and floor dips.",
            Decimal::new(89_99, 2),
            "/standard.png",
            15,
            false,
            "COMPACT",
        ),
        (
            2,
            "parallette-m",
            "Parallette M",
            "The most versatile size. Built for handstand push-ups, pike push-ups and pseudo planche.",
            Decimal::new(129_99, 2),
            "/medium.png",
            10,
            true,
            "BEST SELLER",
        ),
        (
            3,
            "parallette-l",
            "Parallette L",
            "Full-steel professional parallettes with room for deep dips and muscle-up transitions.",
            Decimal::new(199_99, 2),
            "/large.png",
            8,
            true,
            "PRO",
        ),
    ]
    .into_iter()
    .map(
        |(id, slug, name, description, price, image, stock, featured, tag)| Product {
            id,
            slug: slug.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            images: vec![image.to_string()],
            category: Some(category.clone()),
            stock,
            featured,
            specs: fallback_specs(slug),
            tag: Some(tag.to_string()),
        },
    )
    .collect()
}

/// Finds a catalogue product by id.
pub fn find_in_catalogue(id: ProductId) -> Option<Product> {
    catalogue().into_iter().find(|product| product.id == id)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn price_deserializes_from_string() -> TestResult {
        let product: Product =
            serde_json::from_str(r#"{"id":2,"name":"Parallette M","price":"129.99"}"#)?;

        assert_eq!(product.price, Decimal::new(129_99, 2));
        assert_eq!(product.stock, 0);

        Ok(())
    }

    #[test]
    fn price_deserializes_from_number() -> TestResult {
        let product: Product =
            serde_json::from_str(r#"{"id":2,"name":"Parallette M","price":129.99,"stock":4}"#)?;

        assert_eq!(product.price, Decimal::new(129_99, 2));
        assert_eq!(product.stock, 4);

        Ok(())
    }

    #[test]
    fn price_serializes_as_number() -> TestResult {
        let product = find_in_catalogue(2).ok_or("missing catalogue product")?;

        let value = serde_json::to_value(&product)?;

        assert_eq!(value["price"], serde_json::json!(129.99));

        Ok(())
    }

    #[test]
    fn missing_specs_fall_back_to_catalogue() -> TestResult {
        let mut product = find_in_catalogue(3).ok_or("missing catalogue product")?;
        product.specs = None;

        let specs = product.specs_or_fallback().ok_or("expected fallback specs")?;

        assert_eq!(specs.material, "Full Steel C45");

        Ok(())
    }

    #[test]
    fn unknown_slug_has_no_fallback() {
        assert_eq!(fallback_specs("kettlebell"), None);
    }
}
