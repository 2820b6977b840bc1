//! Storefront category entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::CategoryId;
use crate::validation::{ValidationError, non_blank, optional_non_blank};

/// Tailwind gradient used when none is given.
pub const DEFAULT_COLOR_GRADIENT: &str = "from-gray-100 to-gray-200";

/// Icon used when none is given.
pub const DEFAULT_ICON: &str = "📦";

/// A browsable category card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color_gradient: String,
    pub icon: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derive a URL slug from a category name.
///
/// The name is lowercased and every run of whitespace becomes a single `-`.
///
/// ```
/// use anar_shop_core::models::category::slugify;
///
/// assert_eq!(slugify("Summer  Collection"), "summer-collection");
/// assert_eq!(slugify("Male"), "male");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Body of `POST /api/categories`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color_gradient: Option<String>,
    pub icon: Option<String>,
}

/// A validated category ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub color_gradient: String,
    pub icon: String,
}

impl CreateCategoryRequest {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name or description is missing.
    pub fn validate(self) -> Result<NewCategory, ValidationError> {
        let (Some(name), Some(description)) = (non_blank(self.name), non_blank(self.description))
        else {
            return Err(ValidationError::new("Name and description are required"));
        };

        Ok(NewCategory {
            slug: slugify(&name),
            name,
            description,
            color_gradient: non_blank(self.color_gradient)
                .unwrap_or_else(|| DEFAULT_COLOR_GRADIENT.to_owned()),
            icon: non_blank(self.icon).unwrap_or_else(|| DEFAULT_ICON.to_owned()),
        })
    }
}

/// Body of `PUT /api/categories/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color_gradient: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

/// A validated partial category update. `slug` follows `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub color_gradient: Option<String>,
    pub icon: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateCategoryRequest {
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the name or description is blanked.
    pub fn validate(self) -> Result<CategoryPatch, ValidationError> {
        let name = optional_non_blank(self.name, "Name")?;
        Ok(CategoryPatch {
            slug: name.as_deref().map(slugify),
            name,
            description: optional_non_blank(self.description, "Description")?,
            color_gradient: non_blank(self.color_gradient),
            icon: non_blank(self.icon),
            is_active: self.is_active,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Accessories"), "accessories");
        assert_eq!(slugify("Winter Sale"), "winter-sale");
        assert_eq!(slugify("  Kids \t Shoes "), "kids-shoes");
    }

    #[test]
    fn test_create_applies_defaults() {
        let req = CreateCategoryRequest {
            name: Some("Home Goods".into()),
            description: Some("Things for the home".into()),
            ..Default::default()
        };
        let category = req.validate().unwrap();
        assert_eq!(category.slug, "home-goods");
        assert_eq!(category.color_gradient, DEFAULT_COLOR_GRADIENT);
        assert_eq!(category.icon, DEFAULT_ICON);
    }

    #[test]
    fn test_create_requires_name_and_description() {
        let req = CreateCategoryRequest {
            name: Some("Home".into()),
            ..Default::default()
        };
        assert_eq!(
            req.validate().unwrap_err().message(),
            "Name and description are required"
        );
    }

    #[test]
    fn test_update_rederives_slug() {
        let req = UpdateCategoryRequest {
            name: Some("New Arrivals".into()),
            is_active: Some(false),
            ..Default::default()
        };
        let patch = req.validate().unwrap();
        assert_eq!(patch.slug.as_deref(), Some("new-arrivals"));
        assert_eq!(patch.is_active, Some(false));

        let patch = UpdateCategoryRequest::default().validate().unwrap();
        assert_eq!(patch, CategoryPatch::default());
    }
}
