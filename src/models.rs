use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const MIN_Y_POSITION: u8 = 0;
pub const MAX_Y_POSITION: u8 = 100;
pub const NEUTRAL_Y_POSITION: u8 = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub characters: Vec<Character>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub locations: Vec<Location>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub plot_points: Vec<PlotPoint>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub relationships: Vec<Relationship>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub notes: Vec<Note>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub chapters: Vec<Chapter>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub scenes: Vec<Scene>,
    #[serde(default)]
    pub word_count: u64,
    #[serde(default)]
    pub word_count_goal: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            created_at: Some(now),
            updated_at: Some(now),
            ..Self::default()
        }
    }

    pub fn character(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|character| character.name == name)
    }

    pub fn character_mut(&mut self, name: &str) -> Option<&mut Character> {
        self.characters.iter_mut().find(|character| character.name == name)
    }

    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub traits: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc: Option<CharacterArc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterArc {
    #[serde(default, deserialize_with = "lenient_string")]
    pub template_type: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub beats: Vec<ArcBeat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcBeat {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_scenes: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub linked_chapters: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub emotional_state: String,
    #[serde(default = "neutral_y_position", deserialize_with = "deserialize_y_position")]
    pub y_position: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub characters: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub locations: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub plot_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub scenes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotPoint {
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub characters: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub locations: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub character1: String,
    pub character2: String,
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub current_screen: String,
    #[serde(default)]
    pub current_book: Option<String>,
    #[serde(default)]
    pub current_character: Option<String>,
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            current_screen: "books".to_string(),
            current_book: None,
            current_character: None,
        }
    }
}

// Non-finite input maps to neutral; only the loader relies on that.
pub fn clamp_y_position(value: f64) -> u8 {
    if !value.is_finite() {
        return NEUTRAL_Y_POSITION;
    }
    value
        .clamp(f64::from(MIN_Y_POSITION), f64::from(MAX_Y_POSITION))
        .round() as u8
}

fn neutral_y_position() -> u8 {
    NEUTRAL_Y_POSITION
}

// Null or non-array collections load as empty; entries that do not fit are dropped.
fn lenient_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Value::Array(items) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    let total = items.len();
    let kept: Vec<T> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if kept.len() < total {
        tracing::warn!(dropped = total - kept.len(), "skipped malformed list entries");
    }
    Ok(kept)
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(value) => Ok(value),
        _ => Ok(String::new()),
    }
}

fn deserialize_y_position<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw.map(clamp_y_position).unwrap_or(NEUTRAL_Y_POSITION))
}
