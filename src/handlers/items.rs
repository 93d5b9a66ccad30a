use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    models::{ImageUpload, Item, ItemForm},
    uploads, AppState,
};

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_items(State(state): State<AppState>) -> (StatusCode, Json<Vec<Item>>) {
    let items = state.store.read().await.list();
    info!(count = items.len(), "Listed items");
    (StatusCode::OK, Json(items))
}

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_item(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Item>)> {
    let form = read_form(&mut multipart).await?;
    let (payload, image) = form.into_parts()?;

    // Reject a bad extension before anything reaches the store or the disk.
    if let Some(upload) = &image {
        if uploads::image_extension(&upload.file_name).is_none() {
            return Err(AppError::BadRequest("Only image files are allowed!".to_string()));
        }
    }

    let image_url = match &image {
        Some(upload) => state.uploads.save(&upload.file_name, &upload.data).await?,
        None => String::new(),
    };

    let mut store = state.store.write().await;
    let item = store.create(payload, image_url);

    info!(
        id = item.id,
        name = %item.name,
        total = store.count(),
        has_image = !item.image_url.is_empty(),
        "Created item"
    );

    Ok((StatusCode::OK, Json(item)))
}

/// Drains the multipart stream into an [`ItemForm`]. Unknown field names are
/// skipped; a file part with an empty filename counts as "no image".
async fn read_form(multipart: &mut Multipart) -> AppResult<ItemForm> {
    let mut form = ItemForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "name" => form.name = Some(field.text().await?),
            "category" => form.category = Some(field.text().await?),
            "quantity" => form.quantity = Some(field.text().await?),
            "price" => form.price = Some(field.text().await?),
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if file_name.is_empty() {
                    continue;
                }
                form.image = Some(ImageUpload {
                    file_name,
                    data: field.bytes().await?,
                });
            }
            _ => {}
        }
    }

    Ok(form)
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    let mut store = state.store.write().await;

    let item = store
        .get(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;

    // Image file first; a failed unlink leaves the item listed.
    if !item.image_url.is_empty() {
        state.uploads.remove_by_url(&item.image_url).await?;
    }
    store.remove(id);

    info!(id, remaining = store.count(), "Deleted item");

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "Item deleted successfully" })),
    ))
}
