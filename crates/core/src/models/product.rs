//! Product catalog entities.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductCategory, ProductId};
use crate::validation::{ValidationError, non_blank, non_negative, optional_non_blank};

/// Stock held for one color of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorStock {
    /// Color name as shown in the storefront.
    pub color: String,
    /// Units in stock.
    pub quantity: u32,
}

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image_url: String,
    pub category: ProductCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub colors: Vec<ColorStock>,
    /// Sum of all color quantities, present once colors have been recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_stock: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Compute the total stock across colors.
///
/// Returns `None` when no colors are listed, leaving any previous total in
/// place.
#[must_use]
pub fn total_stock(colors: &[ColorStock]) -> Option<u32> {
    if colors.is_empty() {
        return None;
    }
    Some(
        colors
            .iter()
            .fold(0_u32, |sum, c| sum.saturating_add(c.quantity)),
    )
}

fn validate_colors(colors: Vec<ColorStock>) -> Result<Vec<ColorStock>, ValidationError> {
    colors
        .into_iter()
        .map(|c| {
            let color = non_blank(Some(c.color))
                .ok_or_else(|| ValidationError::new("Color name is required"))?;
            Ok(ColorStock {
                color,
                quantity: c.quantity,
            })
        })
        .collect()
}

/// Body of `POST /api/products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<ProductCategory>,
    pub description: Option<String>,
    pub colors: Option<Vec<ColorStock>>,
}

/// A validated product ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
    pub image_url: String,
    pub category: ProductCategory,
    pub description: Option<String>,
    pub colors: Vec<ColorStock>,
    pub total_stock: Option<u32>,
}

impl CreateProductRequest {
    /// Check required fields and value ranges.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when name, price, image URL or category
    /// is missing, the price is negative, or a color has no name.
    pub fn validate(self) -> Result<NewProduct, ValidationError> {
        let (Some(name), Some(price), Some(image_url), Some(category)) = (
            non_blank(self.name),
            self.price,
            non_blank(self.image_url),
            self.category,
        ) else {
            return Err(ValidationError::new("Please provide all required fields"));
        };

        let price = non_negative(price, "Price")?;
        let colors = validate_colors(self.colors.unwrap_or_default())?;
        let total_stock = total_stock(&colors);

        Ok(NewProduct {
            name,
            price,
            image_url,
            category,
            description: non_blank(self.description),
            colors,
            total_stock,
        })
    }
}

/// Body of `PUT /api/products/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<ProductCategory>,
    pub description: Option<String>,
    pub colors: Option<Vec<ColorStock>>,
}

/// A validated partial product update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub image_url: Option<String>,
    pub category: Option<ProductCategory>,
    pub description: Option<String>,
    pub colors: Option<Vec<ColorStock>>,
}

impl ProductPatch {
    /// Recomputed total stock when the update replaces a non-empty color list.
    #[must_use]
    pub fn total_stock(&self) -> Option<u32> {
        self.colors.as_deref().and_then(total_stock)
    }
}

impl UpdateProductRequest {
    /// Apply the same field rules as creation to the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when a required field is blanked, the
    /// price is negative, or a color has no name.
    pub fn validate(self) -> Result<ProductPatch, ValidationError> {
        Ok(ProductPatch {
            name: optional_non_blank(self.name, "Name")?,
            price: self
                .price
                .map(|p| non_negative(p, "Price"))
                .transpose()?,
            image_url: optional_non_blank(self.image_url, "Image URL")?,
            category: self.category,
            description: self.description.map(|d| d.trim().to_owned()),
            colors: self.colors.map(validate_colors).transpose()?,
        })
    }
}
