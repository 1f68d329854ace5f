//! Character styles and room backgrounds offered to clients.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in character rendering style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum CharacterStyle {
    /// Early-2000s console low-poly look.
    #[default]
    #[serde(alias = "Playstation 2", alias = "PS2")]
    Ps2,
    /// Gritty early-2000s street anime.
    #[serde(alias = "Anime")]
    Anime,
}

impl CharacterStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CharacterStyle::Ps2 => "ps2",
            CharacterStyle::Anime => "anime",
        }
    }

    /// Parse a client-supplied style identifier, accepting display names.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ps2" | "playstation 2" | "playstation2" => Some(CharacterStyle::Ps2),
            "anime" => Some(CharacterStyle::Anime),
            _ => None,
        }
    }

    /// Short description used when authoring prompt sections.
    pub fn description(&self) -> &'static str {
        match self {
            CharacterStyle::Ps2 => "PS2-era GTA San Andreas style character",
            CharacterStyle::Anime => "early 2000s street-anime style character",
        }
    }
}

impl fmt::Display for CharacterStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog entry for a style.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StyleInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Catalog entry for a room background.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub background_url: String,
}

/// Styles listed by `GET /styles`: (id, name, description).
pub const STYLES: &[(&str, &str, &str)] = &[
    ("ps2", "PS2 Era", "Low-poly retro gaming aesthetic"),
    ("anime", "Anime", "Japanese animation style"),
];

/// Rooms listed by `GET /rooms`: (id, name, background path).
pub const ROOMS: &[(&str, &str, &str)] = &[
    ("cozy-room", "Cozy Room", "/rooms/cozy-room.svg"),
    ("cyber-lounge", "Cyber Lounge", "/rooms/cyber-lounge.svg"),
    ("nature-retreat", "Nature Retreat", "/rooms/nature-retreat.svg"),
];

impl StyleInfo {
    pub fn catalog() -> Vec<StyleInfo> {
        STYLES
            .iter()
            .map(|(id, name, description)| StyleInfo {
                id: id.to_string(),
                name: name.to_string(),
                description: description.to_string(),
            })
            .collect()
    }
}

impl Room {
    pub fn catalog() -> Vec<Room> {
        ROOMS
            .iter()
            .map(|(id, name, background_url)| Room {
                id: id.to_string(),
                name: name.to_string(),
                background_url: background_url.to_string(),
            })
            .collect()
    }
}
