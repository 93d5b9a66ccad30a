use axum::body::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Core inventory entity. `id` doubles as the creation timestamp in
/// milliseconds; `image_url` is the `/uploads/...` path of the stored image,
/// empty when the item was created without one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category: String,
    /// `None` when the submitted text did not parse, serialized as `null`.
    pub quantity: Option<i64>,
    /// `None` when the submitted text did not parse, serialized as `null`.
    pub price: Option<f64>,
    pub image_url: String,
}

// ── Request payloads ─────────────────────────────────────────────────────────

/// Raw multipart fields exactly as received; nothing validated or parsed yet.
#[derive(Debug, Default)]
pub struct ItemForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<String>,
    pub price: Option<String>,
    pub image: Option<ImageUpload>,
}

/// An uploaded file part: the submitter's filename plus the raw bytes.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Bytes,
}

/// Validated create payload. The numeric fields keep the lax contract of the
/// form: text that fails a strict parse becomes `None`, not an error.
#[derive(Debug, Clone)]
pub struct CreateItem {
    pub name: String,
    pub category: String,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
}

impl ItemForm {
    /// Checks all four text fields are present and parses the numeric ones.
    /// A field that is absent from the form is a validation error; a field
    /// that is present but unparsable is stored as `None`.
    pub fn into_parts(self) -> AppResult<(CreateItem, Option<ImageUpload>)> {
        let ItemForm {
            name,
            category,
            quantity,
            price,
            image,
        } = self;

        let name = require(name, "name")?;
        let category = require(category, "category")?;
        let quantity = require(quantity, "quantity")?;
        let price = require(price, "price")?;

        Ok((
            CreateItem {
                name,
                category,
                quantity: quantity.trim().parse::<i64>().ok(),
                price: price.trim().parse::<f64>().ok(),
            },
            image,
        ))
    }
}

fn require(field: Option<String>, name: &str) -> AppResult<String> {
    field.ok_or_else(|| AppError::BadRequest(format!("Missing required field: {name}")))
}
