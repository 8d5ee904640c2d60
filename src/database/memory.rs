use std::sync::Mutex;

use serde_json::Value;

use super::{
    query::Query,
    store::{
        new_id, with_id, Collection, DeleteResult, Document, DocumentStore, InsertResult,
        UpdateResult, ID_FIELD,
    },
};
use crate::app::AppError;

/// Keeps documents in insertion order, for handler tests.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<(Collection, Document)>>,
}

impl MemoryStore {
    fn rows(&self) -> Result<std::sync::MutexGuard<'_, Vec<(Collection, Document)>>, AppError> {
        self.rows.lock().map_err(|_| AppError::InternalServerError)
    }
}

impl DocumentStore for MemoryStore {
    fn insert_one(&self, collection: Collection, doc: Document) -> Result<InsertResult, AppError> {
        let id = new_id();
        self.rows()?
            .push((collection, with_id(id.clone(), Value::Object(doc))));

        Ok(InsertResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    fn find(&self, collection: Collection, query: &Query) -> Result<Vec<Document>, AppError> {
        let found: Vec<Document> = self
            .rows()?
            .iter()
            .filter(|(c, doc)| *c == collection && query.matches(doc))
            .map(|(_, doc)| doc.clone())
            .collect();

        Ok(query.arrange(found))
    }

    fn update_by_id(
        &self,
        collection: Collection,
        id: &str,
        fields: Document,
    ) -> Result<UpdateResult, AppError> {
        let mut rows = self.rows()?;
        let target = rows.iter_mut().find(|(c, doc)| {
            *c == collection && doc.get(ID_FIELD).and_then(Value::as_str) == Some(id)
        });

        let (matched, modified) = match target {
            Some((_, doc)) => {
                let mut changed = false;
                for (key, value) in fields {
                    if key != ID_FIELD && doc.get(&key) != Some(&value) {
                        doc.insert(key, value);
                        changed = true;
                    }
                }
                (1, changed as u64)
            }
            None => (0, 0),
        };

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: matched,
            modified_count: modified,
        })
    }

    fn delete_many(&self, collection: Collection, query: &Query) -> Result<DeleteResult, AppError> {
        let mut rows = self.rows()?;
        let before = rows.len();
        rows.retain(|(c, doc)| !(*c == collection && query.matches(doc)));

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: (before - rows.len()) as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::query::Sort;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_collections_are_separate() {
        let store = MemoryStore::default();
        store
            .insert_one(Collection::Blogs, doc(json!({ "title": "a" })))
            .unwrap();
        store
            .insert_one(Collection::Comments, doc(json!({ "title": "a" })))
            .unwrap();

        pretty_assertions::assert_eq!(store.find(Collection::Blogs, &Query::new()).unwrap().len(), 1);
    }

    #[test]
    fn test_update_merges_fields() {
        let store = MemoryStore::default();
        let inserted = store
            .insert_one(Collection::Blogs, doc(json!({ "title": "a", "category": "tech" })))
            .unwrap();

        let result = store
            .update_by_id(
                Collection::Blogs,
                &inserted.inserted_id,
                doc(json!({ "title": "b", "_id": "other" })),
            )
            .unwrap();
        pretty_assertions::assert_eq!(result.matched_count, 1);
        pretty_assertions::assert_eq!(result.modified_count, 1);

        let found = store
            .find_one(Collection::Blogs, &Query::by_id(inserted.inserted_id.clone()))
            .unwrap()
            .unwrap();
        pretty_assertions::assert_eq!(
            Value::Object(found),
            json!({ "_id": inserted.inserted_id, "title": "b", "category": "tech" })
        );

        let missing = store
            .update_by_id(Collection::Blogs, "nope", doc(json!({ "title": "c" })))
            .unwrap();
        pretty_assertions::assert_eq!(missing.matched_count, 0);
    }

    #[test]
    fn test_rewriting_same_values_is_not_a_modification() {
        let store = MemoryStore::default();
        let inserted = store
            .insert_one(Collection::Blogs, doc(json!({ "title": "a" })))
            .unwrap();

        let result = store
            .update_by_id(Collection::Blogs, &inserted.inserted_id, doc(json!({ "title": "a" })))
            .unwrap();
        pretty_assertions::assert_eq!(
            result,
            UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: 0,
            }
        );
    }

    #[test]
    fn test_delete_and_sorted_find() {
        let store = MemoryStore::default();
        for (title, date) in [("a", "2024-01-01"), ("b", "2024-03-01"), ("c", "2024-02-01")] {
            store
                .insert_one(Collection::Blogs, doc(json!({ "title": title, "published_at": date })))
                .unwrap();
        }

        let deleted = store
            .delete_many(Collection::Blogs, &Query::new().eq("title", "a"))
            .unwrap();
        pretty_assertions::assert_eq!(deleted.deleted_count, 1);

        let titles: Vec<Value> = store
            .find(Collection::Blogs, &Query::new().sort(Sort::NewestFirst("published_at")))
            .unwrap()
            .into_iter()
            .map(|d| d["title"].clone())
            .collect();
        pretty_assertions::assert_eq!(titles, vec![json!("b"), json!("c")]);
    }
}
