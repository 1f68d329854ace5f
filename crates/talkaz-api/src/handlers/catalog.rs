//! Static style and room catalogs.

use axum::Json;

use talkaz_models::{Room, StyleInfo};

pub async fn list_styles() -> Json<Vec<StyleInfo>> {
    Json(StyleInfo::catalog())
}

pub async fn list_rooms() -> Json<Vec<Room>> {
    Json(Room::catalog())
}
