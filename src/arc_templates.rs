use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::BTreeMap;

pub const FALLBACK_ARC_COLOR: &str = "#9ca3af";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultBeat {
    pub name: &'static str,
    pub y: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub default_beats: &'static [DefaultBeat],
}

const fn beat(name: &'static str, y: u8) -> DefaultBeat {
    DefaultBeat { name, y }
}

static TEMPLATES: [ArcTemplate; 6] = [
    ArcTemplate {
        key: "redemption",
        name: "Redemption Arc",
        description: "A flawed character recognises their wrongs and earns a second chance.",
        color: "#10b981",
        default_beats: &[
            beat("Flawed Beginning", 35),
            beat("Catalyst", 25),
            beat("Struggle", 20),
            beat("Turning Point", 45),
            beat("Sacrifice", 70),
            beat("Redemption", 90),
        ],
    },
    ArcTemplate {
        key: "corruption",
        name: "Corruption Arc",
        description: "A good character is gradually drawn into darkness.",
        color: "#ef4444",
        default_beats: &[
            beat("Noble Start", 80),
            beat("Temptation", 65),
            beat("First Compromise", 50),
            beat("Descent", 30),
            beat("Point of No Return", 15),
            beat("Corruption Complete", 5),
        ],
    },
    ArcTemplate {
        key: "coming-of-age",
        name: "Coming of Age",
        description: "A young or naive character grows into maturity through trials.",
        color: "#3b82f6",
        default_beats: &[
            beat("Innocence", 50),
            beat("Call to Change", 40),
            beat("Trials", 30),
            beat("Mentor's Lesson", 55),
            beat("Crisis", 25),
            beat("Maturity", 85),
        ],
    },
    ArcTemplate {
        key: "tragic",
        name: "Tragic Fall",
        description: "A great character is undone by a fatal flaw.",
        color: "#f59e0b",
        default_beats: &[
            beat("Height of Power", 90),
            beat("Fatal Flaw Revealed", 75),
            beat("Hubris", 60),
            beat("Reversal", 35),
            beat("Downfall", 15),
            beat("Recognition", 10),
        ],
    },
    ArcTemplate {
        key: "flat",
        name: "Flat Arc",
        description: "The character holds a truth steady and changes the world around them.",
        color: "#8b5cf6",
        default_beats: &[
            beat("Steadfast Belief", 70),
            beat("World Tests Belief", 50),
            beat("Pressure Mounts", 40),
            beat("Stands Firm", 60),
            beat("World Transformed", 80),
        ],
    },
    ArcTemplate {
        key: "custom",
        name: "Custom Arc",
        description: "Start from a blank shape and place beats freely.",
        color: "#6b7280",
        default_beats: &[beat("Beginning", 50), beat("Middle", 50), beat("End", 50)],
    },
];

static CATALOG: Lazy<BTreeMap<&'static str, &'static ArcTemplate>> =
    Lazy::new(|| TEMPLATES.iter().map(|template| (template.key, template)).collect());

pub fn list_keys() -> Vec<&'static str> {
    TEMPLATES.iter().map(|template| template.key).collect()
}

pub fn templates() -> &'static [ArcTemplate] {
    &TEMPLATES
}

pub fn get(key: &str) -> Option<&'static ArcTemplate> {
    CATALOG.get(key).copied()
}

pub fn is_valid(key: &str) -> bool {
    CATALOG.contains_key(key)
}

pub fn arc_color(template_type: Option<&str>) -> &'static str {
    template_type
        .and_then(get)
        .map(|template| template.color)
        .unwrap_or(FALLBACK_ARC_COLOR)
}
