use crate::ids::IdGenerator;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    pub books: Vec<Value>,
    pub migrated_books: usize,
}

pub struct LegacyReferenceMigrator<'a> {
    ids: &'a dyn IdGenerator,
}

impl<'a> LegacyReferenceMigrator<'a> {
    pub fn new(ids: &'a dyn IdGenerator) -> Self {
        Self { ids }
    }

    pub fn migrate(&self, mut book: Value) -> Value {
        let Some(book_map) = book.as_object_mut() else {
            return book;
        };

        self.assign_missing_ids(book_map, "scenes");
        self.assign_missing_ids(book_map, "chapters");

        let scene_ids: Vec<Option<String>> = collection(book_map, "scenes")
            .map(|scenes| scenes.iter().map(|scene| valid_id(scene).map(ToString::to_string)).collect())
            .unwrap_or_default();

        if let Some(chapters) = book_map.get_mut("chapters").and_then(Value::as_array_mut) {
            for chapter in chapters.iter_mut() {
                let Some(list) = chapter.get_mut("scenes").and_then(Value::as_array_mut) else {
                    continue;
                };
                if !starts_with_index(list) {
                    continue;
                }
                let resolved: Vec<Value> = list
                    .iter()
                    .filter_map(as_index)
                    .filter_map(|index| scene_ids.get(index).cloned().flatten())
                    .map(Value::String)
                    .collect();
                *list = resolved;
            }
        }

        book
    }

    pub fn migrate_all(&self, books: Vec<Value>) -> MigrationReport {
        let mut migrated_books = 0;
        let books = books
            .into_iter()
            .map(|book| {
                if needs_migration(&book) {
                    migrated_books += 1;
                    self.migrate(book)
                } else {
                    book
                }
            })
            .collect();
        MigrationReport { books, migrated_books }
    }

    fn assign_missing_ids(&self, book: &mut Map<String, Value>, key: &str) {
        let Some(items) = book.get_mut(key).and_then(Value::as_array_mut) else {
            return;
        };
        for item in items.iter_mut() {
            if valid_id(item).is_some() {
                continue;
            }
            if let Some(fields) = item.as_object_mut() {
                fields.insert("id".to_string(), Value::String(self.ids.new_id()));
            }
        }
    }
}

pub fn needs_migration(book: &Value) -> bool {
    let Some(book_map) = book.as_object() else {
        return false;
    };
    let missing_ids = |key: &str| {
        collection(book_map, key)
            .map(|items| items.iter().any(|item| item.is_object() && valid_id(item).is_none()))
            .unwrap_or(false)
    };
    if missing_ids("scenes") || missing_ids("chapters") {
        return true;
    }
    collection(book_map, "chapters")
        .map(|chapters| {
            chapters.iter().any(|chapter| {
                chapter
                    .get("scenes")
                    .and_then(Value::as_array)
                    .map(|list| starts_with_index(list))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

fn collection<'v>(book: &'v Map<String, Value>, key: &str) -> Option<&'v Vec<Value>> {
    book.get(key).and_then(Value::as_array)
}

fn valid_id(item: &Value) -> Option<&str> {
    item.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

// Only the first element decides; lists mixing indices and ids are not repaired.
fn starts_with_index(list: &[Value]) -> bool {
    list.first().map(Value::is_number).unwrap_or(false)
}

fn as_index(value: &Value) -> Option<usize> {
    if let Some(index) = value.as_u64() {
        return usize::try_from(index).ok();
    }
    value
        .as_f64()
        .filter(|index| *index >= 0.0 && index.fract() == 0.0)
        .map(|index| index as usize)
}

#[cfg(test)]
mod tests {
    use super::{needs_migration, LegacyReferenceMigrator};
    use crate::ids::SeededIdGenerator;
    use serde_json::{json, Value};

    fn legacy_book() -> Value {
        json!({
            "name": "Old Draft",
            "scenes": [
                { "title": "Opening" },
                { "id": "scene-keep", "title": "Middle" },
                { "title": "Finale", "summary": "Storm" }
            ],
            "chapters": [
                { "title": "One", "scenes": [0, 1] },
                { "title": "Two", "scenes": [2, 7, -1, 1.5] },
                { "id": "ch-3", "title": "Three", "scenes": [] }
            ]
        })
    }

    #[test]
    fn detects_legacy_shapes() {
        assert!(needs_migration(&legacy_book()));
        assert!(needs_migration(&json!({ "scenes": [{ "title": "x" }] })));
        assert!(needs_migration(&json!({ "chapters": [{ "id": "", "scenes": [] }] })));
        assert!(needs_migration(&json!({ "chapters": [{ "id": "c", "scenes": [3] }] })));
        assert!(!needs_migration(&json!({ "chapters": [{ "id": "c", "scenes": ["s"] }] })));
        assert!(!needs_migration(&json!({ "name": "Empty" })));
        assert!(!needs_migration(&Value::Null));
    }

    #[test]
    fn rewrites_indices_into_ids_and_drops_unresolvable() {
        let ids = SeededIdGenerator::new(11);
        let migrated = LegacyReferenceMigrator::new(&ids).migrate(legacy_book());

        let scenes = migrated["scenes"].as_array().expect("scenes");
        let scene_ids: Vec<&str> = scenes.iter().map(|s| s["id"].as_str().expect("id")).collect();
        assert_eq!(scene_ids[1], "scene-keep");
        assert!(scene_ids.iter().all(|id| !id.is_empty()));
        assert_eq!(scenes[2]["summary"], "Storm");

        let chapters = migrated["chapters"].as_array().expect("chapters");
        assert_eq!(chapters[0]["scenes"], json!([scene_ids[0], scene_ids[1]]));
        assert_eq!(chapters[1]["scenes"], json!([scene_ids[2]]));
        assert_eq!(chapters[2]["id"], "ch-3");
        assert!(chapters.iter().all(|c| c["id"].as_str().map(|id| !id.is_empty()).unwrap_or(false)));

        assert!(!needs_migration(&migrated));
    }

    #[test]
    fn second_run_is_structurally_identical() {
        let ids = SeededIdGenerator::new(12);
        let migrator = LegacyReferenceMigrator::new(&ids);
        let once = migrator.migrate(legacy_book());
        let twice = migrator.migrate(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn string_lists_are_left_alone_even_when_mixed() {
        let ids = SeededIdGenerator::new(13);
        let book = json!({
            "scenes": [{ "id": "a" }],
            "chapters": [{ "id": "c", "scenes": ["a", 0] }]
        });
        let migrated = LegacyReferenceMigrator::new(&ids).migrate(book.clone());
        assert_eq!(migrated, book);
    }

    #[test]
    fn malformed_collections_are_skipped() {
        let ids = SeededIdGenerator::new(14);
        let migrator = LegacyReferenceMigrator::new(&ids);
        assert_eq!(migrator.migrate(Value::Null), Value::Null);

        let odd = json!({ "scenes": "nope", "chapters": [{ "title": "x", "scenes": 4 }, 17] });
        let migrated = migrator.migrate(odd);
        assert_eq!(migrated["scenes"], "nope");
        assert!(migrated["chapters"][0]["id"].is_string());
        assert_eq!(migrated["chapters"][0]["scenes"], 4);
        assert_eq!(migrated["chapters"][1], 17);
    }

    #[test]
    fn migrate_all_only_touches_books_that_need_it() {
        let ids = SeededIdGenerator::new(15);
        let current = json!({ "name": "Current", "scenes": [{ "id": "s" }], "chapters": [] });
        let report = LegacyReferenceMigrator::new(&ids).migrate_all(vec![current.clone(), legacy_book()]);
        assert_eq!(report.migrated_books, 1);
        assert_eq!(report.books[0], current);
        assert!(!needs_migration(&report.books[1]));
    }
}
