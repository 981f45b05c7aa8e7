use crate::ids::IdGenerator;
use crate::models::{Book, Chapter, Scene};

impl Scene {
    pub fn new(ids: &dyn IdGenerator, title: impl Into<String>) -> Self {
        Self {
            id: ids.new_id(),
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Chapter {
    pub fn new(ids: &dyn IdGenerator, title: impl Into<String>) -> Self {
        Self {
            id: ids.new_id(),
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn contains_scene(&self, scene_id: &str) -> bool {
        self.scenes.iter().any(|id| id == scene_id)
    }

    pub fn add_scene(&mut self, scene_id: &str) {
        if !self.contains_scene(scene_id) {
            self.scenes.push(scene_id.to_string());
        }
    }

    pub fn remove_scene(&mut self, scene_id: &str) -> bool {
        match self.scenes.iter().position(|id| id == scene_id) {
            Some(index) => {
                self.scenes.remove(index);
                true
            }
            None => false,
        }
    }

    // An index past the end means last.
    pub fn reorder_scene(&mut self, scene_id: &str, new_index: usize) -> bool {
        let Some(current) = self.scenes.iter().position(|id| id == scene_id) else {
            return false;
        };
        let target = new_index.min(self.scenes.len() - 1);
        if target == current {
            return false;
        }
        let id = self.scenes.remove(current);
        self.scenes.insert(target, id);
        true
    }
}

pub fn move_scene(from: &mut Chapter, to: &mut Chapter, scene_id: &str) -> bool {
    if !from.remove_scene(scene_id) {
        return false;
    }
    to.add_scene(scene_id);
    true
}

impl Book {
    pub fn find_scene_by_id(&self, scene_id: &str) -> Option<&Scene> {
        self.scenes.iter().find(|scene| scene.id == scene_id)
    }

    pub fn find_chapter_by_id(&self, chapter_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.id == chapter_id)
    }

    pub fn find_chapter_by_id_mut(&mut self, chapter_id: &str) -> Option<&mut Chapter> {
        self.chapters.iter_mut().find(|chapter| chapter.id == chapter_id)
    }

    pub fn find_chapter_containing_scene(&self, scene_id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|chapter| chapter.contains_scene(scene_id))
    }

    pub fn scenes_in_chapter(&self, chapter_id: &str) -> Vec<&Scene> {
        self.find_chapter_by_id(chapter_id)
            .map(|chapter| {
                chapter
                    .scenes
                    .iter()
                    .filter_map(|id| self.find_scene_by_id(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn unassigned_scenes(&self) -> Vec<&Scene> {
        self.scenes
            .iter()
            .filter(|scene| self.find_chapter_containing_scene(&scene.id).is_none())
            .collect()
    }

    pub fn move_scene_between(&mut self, from_chapter_id: &str, to_chapter_id: &str, scene_id: &str) -> bool {
        let from_index = self.chapters.iter().position(|chapter| chapter.id == from_chapter_id);
        let to_index = self.chapters.iter().position(|chapter| chapter.id == to_chapter_id);
        match (from_index, to_index) {
            (Some(from), Some(to)) if from == to => self.chapters[from].contains_scene(scene_id),
            (Some(from), Some(to)) => {
                let (from_chapter, to_chapter) = if from < to {
                    let (head, tail) = self.chapters.split_at_mut(to);
                    (&mut head[from], &mut tail[0])
                } else {
                    let (head, tail) = self.chapters.split_at_mut(from);
                    (&mut tail[0], &mut head[to])
                };
                move_scene(from_chapter, to_chapter, scene_id)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::move_scene;
    use crate::models::{Book, Chapter, Scene};

    fn chapter(id: &str, scenes: &[&str]) -> Chapter {
        Chapter {
            id: id.to_string(),
            title: id.to_uppercase(),
            summary: String::new(),
            scenes: scenes.iter().map(|id| id.to_string()).collect(),
        }
    }

    fn scene(id: &str) -> Scene {
        Scene {
            id: id.to_string(),
            title: format!("Scene {id}"),
            ..Scene::default()
        }
    }

    fn sample_book() -> Book {
        let mut book = Book::new("Sample");
        book.scenes = vec![scene("s1"), scene("s2"), scene("s3"), scene("s4")];
        book.chapters = vec![chapter("c1", &["s1", "s2"]), chapter("c2", &["s3", "s2"])];
        book
    }

    #[test]
    fn lookups_by_id() {
        let book = sample_book();
        assert_eq!(book.find_scene_by_id("s3").map(|s| s.title.as_str()), Some("Scene s3"));
        assert!(book.find_scene_by_id("missing").is_none());
        assert_eq!(book.find_chapter_by_id("c2").map(|c| c.title.as_str()), Some("C2"));
        assert!(book.find_chapter_by_id("c9").is_none());
    }

    #[test]
    fn containing_chapter_is_first_match() {
        let book = sample_book();
        assert_eq!(book.find_chapter_containing_scene("s2").map(|c| c.id.as_str()), Some("c1"));
        assert_eq!(book.find_chapter_containing_scene("s3").map(|c| c.id.as_str()), Some("c2"));
        assert!(book.find_chapter_containing_scene("s4").is_none());
        assert_eq!(book.unassigned_scenes().len(), 1);
    }

    #[test]
    fn add_scene_is_idempotent() {
        let mut target = chapter("c1", &["s1"]);
        target.add_scene("s2");
        target.add_scene("s2");
        target.add_scene("s1");
        assert_eq!(target.scenes, vec!["s1", "s2"]);
    }

    #[test]
    fn remove_scene_reports_whether_anything_changed() {
        let mut target = chapter("c1", &["s1", "s2"]);
        assert!(target.remove_scene("s1"));
        assert!(!target.remove_scene("s1"));
        assert_eq!(target.scenes, vec!["s2"]);
    }

    #[test]
    fn move_scene_transfers_exactly_once() {
        let mut a = chapter("a", &["s1", "s2"]);
        let mut b = chapter("b", &["s2", "s3"]);
        assert!(move_scene(&mut a, &mut b, "s2"));
        assert_eq!(a.scenes, vec!["s1"]);
        assert_eq!(b.scenes.iter().filter(|id| *id == "s2").count(), 1);

        let mut c = chapter("c", &["s1"]);
        let mut d = chapter("d", &["s5"]);
        assert!(move_scene(&mut c, &mut d, "s1"));
        assert_eq!(d.scenes, vec!["s5", "s1"]);
    }

    #[test]
    fn move_scene_absent_from_source_changes_nothing() {
        let mut a = chapter("a", &["s1"]);
        let mut b = chapter("b", &["s3"]);
        assert!(!move_scene(&mut a, &mut b, "s9"));
        assert_eq!(a.scenes, vec!["s1"]);
        assert_eq!(b.scenes, vec!["s3"]);
    }

    #[test]
    fn reorder_preserves_membership() {
        let mut target = chapter("c", &["a", "b", "c", "d"]);
        assert!(target.reorder_scene("a", 2));
        assert_eq!(target.scenes, vec!["b", "c", "a", "d"]);
        assert!(target.reorder_scene("d", 0));
        assert_eq!(target.scenes, vec!["d", "b", "c", "a"]);

        let mut sorted = target.scenes.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn reorder_noops_return_false() {
        let mut target = chapter("c", &["a", "b", "c"]);
        assert!(!target.reorder_scene("b", 1));
        assert!(!target.reorder_scene("z", 0));
        assert!(!target.reorder_scene("c", 10));
        assert!(target.reorder_scene("a", 10));
        assert_eq!(target.scenes, vec!["b", "c", "a"]);
    }

    #[test]
    fn book_level_move_handles_either_direction() {
        let mut book = sample_book();
        assert!(book.move_scene_between("c2", "c1", "s3"));
        assert_eq!(book.chapters[0].scenes, vec!["s1", "s2", "s3"]);
        assert_eq!(book.chapters[1].scenes, vec!["s2"]);

        assert!(book.move_scene_between("c1", "c2", "s1"));
        assert_eq!(book.chapters[1].scenes, vec!["s2", "s1"]);

        assert!(!book.move_scene_between("c1", "missing", "s2"));
        assert!(!book.move_scene_between("c1", "c2", "s4"));
    }

    #[test]
    fn scenes_in_chapter_skips_dangling_ids() {
        let mut book = sample_book();
        book.chapters[0].scenes.push("ghost".to_string());
        let titles: Vec<&str> = book
            .scenes_in_chapter("c1")
            .into_iter()
            .map(|scene| scene.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Scene s1", "Scene s2"]);
        assert!(book.scenes_in_chapter("nope").is_empty());
    }
}
