use crate::arc_templates;
use crate::beats::{beats_from_template, create_beat};
use crate::db::{BlobStore, LibraryStore};
use crate::errors::{AppError, AppResult};
use crate::ids::IdGenerator;
use crate::migration::LegacyReferenceMigrator;
use crate::models::{ArcBeat, Book, Chapter, Character, CharacterArc, NavigationState, Scene};
use crate::settings::AppSettings;
use serde_json::Value;
use std::sync::Arc;

pub struct Library {
    store: LibraryStore,
    ids: Arc<dyn IdGenerator>,
    settings: AppSettings,
    books: Vec<Book>,
    unreadable: Vec<Value>,
    navigation: NavigationState,
}

impl Library {
    pub async fn open(blobs: Arc<dyn BlobStore>, ids: Arc<dyn IdGenerator>) -> AppResult<Self> {
        let store = LibraryStore::new(blobs);
        let loader = store.clone();
        let (stored, settings) = tokio::task::spawn_blocking(move || -> AppResult<_> {
            Ok((loader.load()?, loader.get_settings()?))
        })
        .await??;

        let report = LegacyReferenceMigrator::new(ids.as_ref()).migrate_all(stored.books);
        if report.migrated_books > 0 {
            tracing::info!(count = report.migrated_books, "migrated legacy scene references");
            let saver = store.clone();
            let migrated = report.books.clone();
            tokio::task::spawn_blocking(move || saver.save(&migrated)).await??;
        }

        let mut books = Vec::with_capacity(report.books.len());
        let mut unreadable = Vec::new();
        for document in report.books {
            match serde_json::from_value::<Book>(document.clone()) {
                Ok(book) => books.push(book),
                Err(error) => {
                    tracing::error!(error = %error, "book document unreadable; keeping it untouched");
                    unreadable.push(document);
                }
            }
        }

        tracing::info!(books = books.len(), "library loaded");
        Ok(Self {
            store,
            ids,
            settings,
            books,
            unreadable,
            navigation: stored.navigation_state,
        })
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn book(&self, name: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.name == name)
    }

    pub fn book_mut(&mut self, name: &str) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.name == name)
    }

    pub fn unreadable_documents(&self) -> &[Value] {
        &self.unreadable
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub async fn persist(&self) -> AppResult<()> {
        let mut documents = self
            .books
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        documents.extend(self.unreadable.iter().cloned());

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.save(&documents)).await??;
        tracing::debug!(books = self.books.len(), "library saved");
        Ok(())
    }

    pub async fn save_navigation(&mut self, state: NavigationState) -> AppResult<()> {
        let store = self.store.clone();
        let snapshot = state.clone();
        tokio::task::spawn_blocking(move || store.save_state(&snapshot)).await??;
        self.navigation = state;
        Ok(())
    }

    pub async fn update_settings(&mut self, patch: Value) -> AppResult<&AppSettings> {
        let store = self.store.clone();
        let settings = tokio::task::spawn_blocking(move || store.update_settings(patch))
            .await?
            .map_err(reject)?;
        self.settings = settings;
        Ok(&self.settings)
    }

    pub fn add_book(&mut self, name: &str) -> AppResult<&Book> {
        let name = validated_name(name, "Book name")?;
        if self.book(&name).is_some() {
            return Err(reject(AppError::Conflict(format!("Book '{name}' already exists"))));
        }
        self.books.push(Book::new(name));
        Ok(&self.books[self.books.len() - 1])
    }

    pub fn rename_book(&mut self, current: &str, new_name: &str) -> AppResult<()> {
        let new_name = validated_name(new_name, "Book name")?;
        if new_name != current && self.book(&new_name).is_some() {
            return Err(reject(AppError::Conflict(format!("Book '{new_name}' already exists"))));
        }
        let book = find_book_mut(&mut self.books, current)?;
        book.name = new_name.clone();
        book.touch();
        if self.navigation.current_book.as_deref() == Some(current) {
            self.navigation.current_book = Some(new_name);
        }
        Ok(())
    }

    // No cascade: references held elsewhere are left as they are.
    pub fn delete_book(&mut self, name: &str) -> AppResult<Book> {
        let index = self
            .books
            .iter()
            .position(|book| book.name == name)
            .ok_or_else(|| reject(AppError::NotFound(format!("Book '{name}'"))))?;
        if self.navigation.current_book.as_deref() == Some(name) {
            self.navigation = NavigationState::default();
        }
        Ok(self.books.remove(index))
    }

    pub fn add_tag(&mut self, book: &str, tag: &str) -> AppResult<()> {
        let tag = validated_name(tag, "Tag")?;
        let book = find_book_mut(&mut self.books, book)?;
        if book.tags.iter().any(|existing| existing.eq_ignore_ascii_case(&tag)) {
            return Err(reject(AppError::Conflict(format!("Tag '{tag}' already exists"))));
        }
        book.tags.push(tag);
        book.touch();
        Ok(())
    }

    pub fn add_character(&mut self, book: &str, name: &str) -> AppResult<&Character> {
        let name = validated_name(name, "Character name")?;
        let book = find_book_mut(&mut self.books, book)?;
        if book.character(&name).is_some() {
            return Err(reject(AppError::Conflict(format!("Character '{name}' already exists"))));
        }
        book.characters.push(Character {
            name,
            ..Character::default()
        });
        book.touch();
        Ok(&book.characters[book.characters.len() - 1])
    }

    pub fn create_scene(&mut self, book: &str, title: &str) -> AppResult<String> {
        let scene = Scene::new(self.ids.as_ref(), title.trim());
        let book = find_book_mut(&mut self.books, book)?;
        let id = scene.id.clone();
        book.scenes.push(scene);
        book.touch();
        Ok(id)
    }

    pub fn create_chapter(&mut self, book: &str, title: &str) -> AppResult<String> {
        let chapter = Chapter::new(self.ids.as_ref(), title.trim());
        let book = find_book_mut(&mut self.books, book)?;
        let id = chapter.id.clone();
        book.chapters.push(chapter);
        book.touch();
        Ok(id)
    }

    pub fn assign_scene_to_chapter(&mut self, book: &str, chapter_id: &str, scene_id: &str) -> AppResult<bool> {
        let book = find_book_mut(&mut self.books, book)?;
        if book.find_scene_by_id(scene_id).is_none() {
            return Err(reject(AppError::Validation(format!("Scene {scene_id} does not exist"))));
        }
        let chapter = book
            .find_chapter_by_id_mut(chapter_id)
            .ok_or_else(|| reject(AppError::NotFound(format!("Chapter {chapter_id}"))))?;
        if chapter.contains_scene(scene_id) {
            return Ok(false);
        }
        chapter.add_scene(scene_id);
        book.touch();
        Ok(true)
    }

    pub fn remove_scene_from_chapter(&mut self, book: &str, chapter_id: &str, scene_id: &str) -> AppResult<bool> {
        let book = find_book_mut(&mut self.books, book)?;
        let chapter = book
            .find_chapter_by_id_mut(chapter_id)
            .ok_or_else(|| reject(AppError::NotFound(format!("Chapter {chapter_id}"))))?;
        let removed = chapter.remove_scene(scene_id);
        if removed {
            book.touch();
        }
        Ok(removed)
    }

    pub fn move_scene(&mut self, book: &str, from_chapter: &str, to_chapter: &str, scene_id: &str) -> AppResult<bool> {
        let book = find_book_mut(&mut self.books, book)?;
        let moved = book.move_scene_between(from_chapter, to_chapter, scene_id);
        if moved {
            book.touch();
        }
        Ok(moved)
    }

    pub fn reorder_scene(&mut self, book: &str, chapter_id: &str, scene_id: &str, new_index: usize) -> AppResult<bool> {
        let book = find_book_mut(&mut self.books, book)?;
        let chapter = book
            .find_chapter_by_id_mut(chapter_id)
            .ok_or_else(|| reject(AppError::NotFound(format!("Chapter {chapter_id}"))))?;
        let reordered = chapter.reorder_scene(scene_id, new_index);
        if reordered {
            book.touch();
        }
        Ok(reordered)
    }

    pub fn delete_scene(&mut self, book: &str, scene_id: &str) -> AppResult<Scene> {
        let book = find_book_mut(&mut self.books, book)?;
        let index = book
            .scenes
            .iter()
            .position(|scene| scene.id == scene_id)
            .ok_or_else(|| reject(AppError::NotFound(format!("Scene {scene_id}"))))?;
        let scene = book.scenes.remove(index);
        for chapter in &mut book.chapters {
            chapter.remove_scene(scene_id);
        }
        let unlinked: usize = arcs_mut(book).map(|arc| arc.strip_scene_links(scene_id)).sum();
        tracing::debug!(scene_id = %scene_id, unlinked, "scene deleted");
        book.touch();
        Ok(scene)
    }

    pub fn delete_chapter(&mut self, book: &str, chapter_id: &str) -> AppResult<Chapter> {
        let book = find_book_mut(&mut self.books, book)?;
        let index = book
            .chapters
            .iter()
            .position(|chapter| chapter.id == chapter_id)
            .ok_or_else(|| reject(AppError::NotFound(format!("Chapter {chapter_id}"))))?;
        let chapter = book.chapters.remove(index);
        let unlinked: usize = arcs_mut(book).map(|arc| arc.strip_chapter_links(chapter_id)).sum();
        tracing::debug!(chapter_id = %chapter_id, unlinked, "chapter deleted");
        book.touch();
        Ok(chapter)
    }

    // An existing arc keeps its beats; only a new arc is prepopulated.
    pub fn set_arc_template(&mut self, book: &str, character: &str, template_key: Option<&str>) -> AppResult<&CharacterArc> {
        let key = template_key.unwrap_or(self.settings.default_template.as_str()).to_string();
        let template = arc_templates::get(&key)
            .ok_or_else(|| reject(AppError::Validation(format!("Unknown arc template '{key}'"))))?;
        let prepopulate = self.settings.prepopulate_arc_beats;
        let ids = Arc::clone(&self.ids);

        let book = find_book_mut(&mut self.books, book)?;
        let character = find_character_mut(book, character)?;
        let arc = character.arc.get_or_insert_with(|| {
            let mut arc = CharacterArc::new(key.clone());
            if prepopulate {
                arc.beats = beats_from_template(ids.as_ref(), template);
            }
            arc
        });
        arc.template_type = key;
        Ok(&*arc)
    }

    pub fn add_beat(&mut self, book: &str, character: &str, name: &str) -> AppResult<String> {
        let beat = create_beat(self.ids.as_ref(), name.trim(), 0);
        beat.validate().map_err(reject)?;
        let book = find_book_mut(&mut self.books, book)?;
        let character = find_character_mut(book, character)?;
        let arc = character.arc.get_or_insert_with(CharacterArc::default);
        let id = arc.push_beat(beat).map_err(reject)?.id.clone();
        book.touch();
        Ok(id)
    }

    pub fn remove_beat(&mut self, book: &str, character: &str, beat_id: &str) -> AppResult<ArcBeat> {
        let book = find_book_mut(&mut self.books, book)?;
        let removed = find_character_mut(book, character)?
            .arc
            .as_mut()
            .and_then(|arc| arc.remove_beat(beat_id))
            .ok_or_else(|| reject(AppError::NotFound(format!("Beat {beat_id}"))))?;
        book.touch();
        Ok(removed)
    }

    pub fn set_beat_position(&mut self, book: &str, character: &str, beat_id: &str, value: f64) -> AppResult<u8> {
        let book = find_book_mut(&mut self.books, book)?;
        let stored = find_beat_mut(book, character, beat_id)?
            .set_y_position(value)
            .ok_or_else(|| reject(AppError::Validation(format!("Beat position must be finite, got {value}"))))?;
        book.touch();
        Ok(stored)
    }

    pub fn link_beat_scene(&mut self, book: &str, character: &str, beat_id: &str, scene_id: &str) -> AppResult<bool> {
        let book = find_book_mut(&mut self.books, book)?;
        if book.find_scene_by_id(scene_id).is_none() {
            return Err(reject(AppError::Validation(format!("Scene {scene_id} does not exist"))));
        }
        let linked = find_beat_mut(book, character, beat_id)?.link_scene(scene_id);
        book.touch();
        Ok(linked)
    }

    pub fn link_beat_chapter(&mut self, book: &str, character: &str, beat_id: &str, chapter_id: &str) -> AppResult<bool> {
        let book = find_book_mut(&mut self.books, book)?;
        if book.find_chapter_by_id(chapter_id).is_none() {
            return Err(reject(AppError::Validation(format!("Chapter {chapter_id} does not exist"))));
        }
        let linked = find_beat_mut(book, character, beat_id)?.link_chapter(chapter_id);
        book.touch();
        Ok(linked)
    }
}

fn reject(error: AppError) -> AppError {
    tracing::warn!(error = %error, "library operation rejected");
    error
}

fn validated_name(raw: &str, what: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(reject(AppError::Validation(format!("{what} cannot be empty"))));
    }
    Ok(name.to_string())
}

fn find_book_mut<'a>(books: &'a mut [Book], name: &str) -> AppResult<&'a mut Book> {
    books
        .iter_mut()
        .find(|book| book.name == name)
        .ok_or_else(|| reject(AppError::NotFound(format!("Book '{name}'"))))
}

fn find_character_mut<'a>(book: &'a mut Book, name: &str) -> AppResult<&'a mut Character> {
    book.character_mut(name)
        .ok_or_else(|| reject(AppError::NotFound(format!("Character '{name}'"))))
}

fn find_beat_mut<'a>(book: &'a mut Book, character: &str, beat_id: &str) -> AppResult<&'a mut ArcBeat> {
    find_character_mut(book, character)?
        .arc
        .as_mut()
        .and_then(|arc| arc.beat_mut(beat_id))
        .ok_or_else(|| reject(AppError::NotFound(format!("Beat {beat_id}"))))
}

fn arcs_mut(book: &mut Book) -> impl Iterator<Item = &mut CharacterArc> {
    book.characters
        .iter_mut()
        .filter_map(|character| character.arc.as_mut())
}

#[cfg(test)]
mod tests {
    use super::Library;
    use crate::db::{BlobStore, MemoryBlobStore, BOOKS_KEY};
    use crate::errors::AppError;
    use crate::ids::SeededIdGenerator;
    use crate::migration::needs_migration;
    use crate::models::NavigationState;
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn open_with(blobs: Arc<MemoryBlobStore>) -> Library {
        Library::open(blobs, Arc::new(SeededIdGenerator::new(99)))
            .await
            .expect("open library")
    }

    fn stored_books(blobs: &MemoryBlobStore) -> Vec<Value> {
        let raw = blobs.get(BOOKS_KEY).expect("get").expect("books saved");
        serde_json::from_str(&raw).expect("books json")
    }

    #[tokio::test]
    async fn open_migrates_and_saves_before_serving() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let legacy = json!([{
            "name": "Legacy",
            "scenes": [{ "title": "A" }, { "title": "B" }],
            "chapters": [{ "title": "One", "scenes": [1, 0, 5] }]
        }]);
        blobs.put(BOOKS_KEY, &legacy.to_string()).expect("seed");

        let library = open_with(blobs.clone()).await;
        let book = library.book("Legacy").expect("book");
        let chapter = &book.chapters[0];
        assert_eq!(chapter.scenes, vec![book.scenes[1].id.clone(), book.scenes[0].id.clone()]);

        let saved = stored_books(&blobs);
        assert!(!needs_migration(&saved[0]));
        assert_eq!(saved[0]["chapters"][0]["scenes"][0], book.scenes[1].id.as_str());
    }

    #[tokio::test]
    async fn open_leaves_current_data_unsaved() {
        let blobs = Arc::new(MemoryBlobStore::new());
        let current = r#"[{"name":"Fresh","scenes":[{"id":"s1"}],"chapters":[{"id":"c1","scenes":["s1"]}]}]"#;
        blobs.put(BOOKS_KEY, current).expect("seed");

        let library = open_with(blobs.clone()).await;
        assert_eq!(library.books().len(), 1);
        assert_eq!(blobs.get(BOOKS_KEY).expect("get").as_deref(), Some(current));
    }

    #[tokio::test]
    async fn unreadable_documents_survive_a_save() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs
            .put(BOOKS_KEY, r#"[{"name":"Ok"},{"name":7},"junk"]"#)
            .expect("seed");

        let library = open_with(blobs.clone()).await;
        assert_eq!(library.books().len(), 1);
        assert_eq!(library.unreadable_documents().len(), 2);

        library.persist().await.expect("persist");
        let saved = stored_books(&blobs);
        assert_eq!(saved.len(), 3);
        assert!(saved.contains(&json!("junk")));
    }

    #[tokio::test]
    async fn book_management_validates_names() {
        let mut library = open_with(Arc::new(MemoryBlobStore::new())).await;
        library.add_book("  Saga ").expect("add");
        assert!(matches!(library.add_book("Saga"), Err(AppError::Conflict(_))));
        assert!(matches!(library.add_book("   "), Err(AppError::Validation(_))));

        library
            .save_navigation(NavigationState {
                current_screen: "book".to_string(),
                current_book: Some("Saga".to_string()),
                current_character: None,
            })
            .await
            .expect("nav");
        library.rename_book("Saga", "Epic").expect("rename");
        assert_eq!(library.navigation().current_book.as_deref(), Some("Epic"));

        library.delete_book("Epic").expect("delete");
        assert!(library.books().is_empty());
        assert_eq!(library.navigation(), &NavigationState::default());
        assert!(matches!(library.delete_book("Epic"), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn tags_reject_blank_and_duplicates() {
        let mut library = open_with(Arc::new(MemoryBlobStore::new())).await;
        library.add_book("Saga").expect("add");
        library.add_tag("Saga", "mystery").expect("tag");
        assert!(matches!(library.add_tag("Saga", " "), Err(AppError::Validation(_))));
        assert!(matches!(library.add_tag("Saga", "Mystery"), Err(AppError::Conflict(_))));
        assert_eq!(library.book("Saga").expect("book").tags, vec!["mystery"]);
    }

    #[tokio::test]
    async fn chapter_membership_requires_existing_scenes() {
        let mut library = open_with(Arc::new(MemoryBlobStore::new())).await;
        library.add_book("Saga").expect("add");
        let scene = library.create_scene("Saga", "Arrival").expect("scene");
        let first = library.create_chapter("Saga", "One").expect("chapter");
        let second = library.create_chapter("Saga", "Two").expect("chapter");

        assert!(matches!(
            library.assign_scene_to_chapter("Saga", &first, "ghost"),
            Err(AppError::Validation(_))
        ));
        assert!(library.assign_scene_to_chapter("Saga", &first, &scene).expect("assign"));
        assert!(!library.assign_scene_to_chapter("Saga", &first, &scene).expect("assign again"));

        assert!(library.move_scene("Saga", &first, &second, &scene).expect("move"));
        assert!(!library.move_scene("Saga", &first, &second, &scene).expect("move again"));
        let book = library.book("Saga").expect("book");
        assert_eq!(book.find_chapter_containing_scene(&scene).map(|c| c.id.as_str()), Some(second.as_str()));

        assert!(!library.reorder_scene("Saga", &second, &scene, 0).expect("reorder"));
        assert!(library.remove_scene_from_chapter("Saga", &second, &scene).expect("remove"));
    }

    #[tokio::test]
    async fn deleting_scenes_and_chapters_cleans_references() {
        let mut library = open_with(Arc::new(MemoryBlobStore::new())).await;
        library.add_book("Saga").expect("add");
        library.add_character("Saga", "Mara").expect("character");
        let scene = library.create_scene("Saga", "Storm").expect("scene");
        let chapter = library.create_chapter("Saga", "One").expect("chapter");
        library.assign_scene_to_chapter("Saga", &chapter, &scene).expect("assign");
        let beat = library.add_beat("Saga", "Mara", "Crisis").expect("beat");
        library.link_beat_scene("Saga", "Mara", &beat, &scene).expect("link scene");
        library.link_beat_chapter("Saga", "Mara", &beat, &chapter).expect("link chapter");

        library.delete_scene("Saga", &scene).expect("delete scene");
        let book = library.book("Saga").expect("book");
        assert!(book.chapters[0].scenes.is_empty());
        let arc = book.character("Mara").and_then(|c| c.arc.as_ref()).expect("arc");
        assert!(arc.beats[0].linked_scenes.is_empty());
        assert_eq!(arc.beats[0].linked_chapters, vec![chapter.clone()]);

        library.delete_chapter("Saga", &chapter).expect("delete chapter");
        let arc = library
            .book("Saga")
            .and_then(|b| b.character("Mara"))
            .and_then(|c| c.arc.as_ref())
            .expect("arc");
        assert!(!arc.beats[0].is_linked());
    }

    #[tokio::test]
    async fn arc_template_prepopulates_once() {
        let mut library = open_with(Arc::new(MemoryBlobStore::new())).await;
        library.add_book("Saga").expect("add");
        library.add_character("Saga", "Mara").expect("character");

        let arc = library.set_arc_template("Saga", "Mara", Some("redemption")).expect("template");
        assert_eq!(arc.template_type, "redemption");
        assert_eq!(arc.beats.len(), 6);
        assert!(arc.has_unique_beat_ids());

        let arc = library.set_arc_template("Saga", "Mara", Some("corruption")).expect("switch");
        assert_eq!(arc.template_type, "corruption");
        assert_eq!(arc.beats[0].name, "Flawed Beginning");

        assert!(matches!(
            library.set_arc_template("Saga", "Mara", Some("heroic")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            library.set_arc_template("Saga", "Nobody", None),
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn default_template_comes_from_settings() {
        let mut library = open_with(Arc::new(MemoryBlobStore::new())).await;
        library
            .update_settings(json!({ "defaultTemplate": "flat", "prepopulateArcBeats": false }))
            .await
            .expect("settings");
        library.add_book("Saga").expect("add");
        library.add_character("Saga", "Mara").expect("character");

        let arc = library.set_arc_template("Saga", "Mara", None).expect("template");
        assert_eq!(arc.template_type, "flat");
        assert!(arc.beats.is_empty());
    }

    #[tokio::test]
    async fn beat_positions_are_clamped() {
        let mut library = open_with(Arc::new(MemoryBlobStore::new())).await;
        library.add_book("Saga").expect("add");
        library.add_character("Saga", "Mara").expect("character");
        let beat = library.add_beat("Saga", "Mara", "Peak").expect("beat");

        assert_eq!(library.set_beat_position("Saga", "Mara", &beat, 140.0).expect("set"), 100);
        assert_eq!(library.set_beat_position("Saga", "Mara", &beat, 12.4).expect("set"), 12);
        assert!(matches!(
            library.set_beat_position("Saga", "Mara", "missing", 10.0),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(library.add_beat("Saga", "Mara", " "), Err(AppError::Validation(_))));

        let removed = library.remove_beat("Saga", "Mara", &beat).expect("remove");
        assert_eq!(removed.y_position, 12);
    }

    #[tokio::test]
    async fn non_finite_positions_keep_the_stored_value() {
        let mut library = open_with(Arc::new(MemoryBlobStore::new())).await;
        library.add_book("Saga").expect("add");
        library.add_character("Saga", "Mara").expect("character");
        let beat = library.add_beat("Saga", "Mara", "Fall").expect("beat");
        library.set_beat_position("Saga", "Mara", &beat, 12.0).expect("set");

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                library.set_beat_position("Saga", "Mara", &beat, value),
                Err(AppError::Validation(_))
            ));
        }
        let arc = library
            .book("Saga")
            .and_then(|b| b.character("Mara"))
            .and_then(|c| c.arc.as_ref())
            .expect("arc");
        assert_eq!(arc.beats[0].y_position, 12);
    }

    async fn open_single(document: Value) -> Library {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.put(BOOKS_KEY, &json!([document]).to_string()).expect("seed");
        open_with(blobs).await
    }

    #[tokio::test]
    async fn null_chapter_collection_loads_as_empty() {
        let library = open_single(json!({ "name": "A", "chapters": null, "scenes": [{ "id": "s1" }] })).await;
        let book = library.book("A").expect("book stays visible");
        assert!(book.chapters.is_empty());
        assert_eq!(book.scenes.len(), 1);
        assert!(library.unreadable_documents().is_empty());
    }

    #[tokio::test]
    async fn non_array_scene_collection_loads_as_empty() {
        let library = open_single(json!({ "name": "B", "scenes": "nope" })).await;
        let book = library.book("B").expect("book stays visible");
        assert!(book.scenes.is_empty());
        assert!(library.unreadable_documents().is_empty());
    }

    #[tokio::test]
    async fn mixed_chapter_list_keeps_string_ids() {
        let library = open_single(json!({
            "name": "C",
            "scenes": [{ "id": "a" }],
            "chapters": [{ "id": "c1", "scenes": ["a", 0] }]
        }))
        .await;
        let book = library.book("C").expect("book stays visible");
        assert_eq!(book.chapters[0].scenes, vec!["a"]);
        assert!(library.unreadable_documents().is_empty());
    }

    #[tokio::test]
    async fn null_string_fields_load_as_empty() {
        let library = open_single(json!({
            "name": "D",
            "characters": [{ "name": "Mara", "description": null, "role": null }]
        }))
        .await;
        let book = library.book("D").expect("book stays visible");
        let mara = book.character("Mara").expect("character");
        assert_eq!(mara.description, "");
        assert_eq!(mara.role, "");
        assert!(library.unreadable_documents().is_empty());
    }
}
