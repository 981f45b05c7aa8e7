use crate::arc_templates::ArcTemplate;
use crate::errors::{AppError, AppResult};
use crate::ids::IdGenerator;
use crate::models::{clamp_y_position, ArcBeat, CharacterArc, NEUTRAL_Y_POSITION};
use std::collections::HashSet;

pub fn create_beat(ids: &dyn IdGenerator, name: impl Into<String>, order: u32) -> ArcBeat {
    ArcBeat {
        id: ids.new_id(),
        name: name.into(),
        description: String::new(),
        order,
        linked_scenes: Vec::new(),
        linked_chapters: Vec::new(),
        emotional_state: String::new(),
        y_position: NEUTRAL_Y_POSITION,
    }
}

pub fn beats_from_template(ids: &dyn IdGenerator, template: &ArcTemplate) -> Vec<ArcBeat> {
    template
        .default_beats
        .iter()
        .enumerate()
        .map(|(index, default)| {
            let mut beat = create_beat(ids, default.name, index as u32);
            beat.y_position = clamp_y_position(f64::from(default.y));
            beat
        })
        .collect()
}

impl ArcBeat {
    pub fn is_linked(&self) -> bool {
        self.linked_scenes.len() + self.linked_chapters.len() > 0
    }

    // Non-finite input leaves the stored position alone.
    pub fn set_y_position(&mut self, value: f64) -> Option<u8> {
        if !value.is_finite() {
            return None;
        }
        self.y_position = clamp_y_position(value);
        Some(self.y_position)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::Validation("Beat id cannot be empty".to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Beat name cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn link_scene(&mut self, scene_id: &str) -> bool {
        push_unique(&mut self.linked_scenes, scene_id)
    }

    pub fn unlink_scene(&mut self, scene_id: &str) -> bool {
        remove_value(&mut self.linked_scenes, scene_id)
    }

    pub fn link_chapter(&mut self, chapter_id: &str) -> bool {
        push_unique(&mut self.linked_chapters, chapter_id)
    }

    pub fn unlink_chapter(&mut self, chapter_id: &str) -> bool {
        remove_value(&mut self.linked_chapters, chapter_id)
    }
}

impl CharacterArc {
    pub fn new(template_type: impl Into<String>) -> Self {
        Self {
            template_type: template_type.into(),
            beats: Vec::new(),
        }
    }

    pub fn beat(&self, beat_id: &str) -> Option<&ArcBeat> {
        self.beats.iter().find(|beat| beat.id == beat_id)
    }

    pub fn beat_mut(&mut self, beat_id: &str) -> Option<&mut ArcBeat> {
        self.beats.iter_mut().find(|beat| beat.id == beat_id)
    }

    pub fn push_beat(&mut self, mut beat: ArcBeat) -> AppResult<&ArcBeat> {
        beat.validate()?;
        if self.beat(&beat.id).is_some() {
            return Err(AppError::Conflict(format!("Beat {} already exists in this arc", beat.id)));
        }
        beat.order = self.beats.len() as u32;
        self.beats.push(beat);
        Ok(&self.beats[self.beats.len() - 1])
    }

    pub fn remove_beat(&mut self, beat_id: &str) -> Option<ArcBeat> {
        let index = self.beats.iter().position(|beat| beat.id == beat_id)?;
        let removed = self.beats.remove(index);
        self.renumber();
        Some(removed)
    }

    pub fn renumber(&mut self) {
        for (index, beat) in self.beats.iter_mut().enumerate() {
            beat.order = index as u32;
        }
    }

    pub fn sort_by_order(&mut self) {
        self.beats.sort_by_key(|beat| beat.order);
    }

    pub fn has_unique_beat_ids(&self) -> bool {
        let mut seen = HashSet::new();
        self.beats.iter().all(|beat| seen.insert(beat.id.as_str()))
    }

    pub fn strip_scene_links(&mut self, scene_id: &str) -> usize {
        self.beats
            .iter_mut()
            .map(|beat| beat.unlink_scene(scene_id))
            .filter(|removed| *removed)
            .count()
    }

    pub fn strip_chapter_links(&mut self, chapter_id: &str) -> usize {
        self.beats
            .iter_mut()
            .map(|beat| beat.unlink_chapter(chapter_id))
            .filter(|removed| *removed)
            .count()
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) -> bool {
    if values.iter().any(|existing| existing == value) {
        return false;
    }
    values.push(value.to_string());
    true
}

fn remove_value(values: &mut Vec<String>, value: &str) -> bool {
    let before = values.len();
    values.retain(|existing| existing != value);
    values.len() != before
}
