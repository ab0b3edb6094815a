//! Typed collection shard

use std::collections::BTreeMap;

use parking_lot::RwLock;

use outlast_common::ObjectId;

use crate::{StoreError, StoreResult};

/// A document that lives in a collection
pub trait Doc: Clone {
    /// The document's primary key
    fn id(&self) -> ObjectId;
}

/// A unique index on a collection, expressed as a key extractor.
/// Documents for which the extractor returns `None` are not indexed.
pub struct UniqueIndex<T> {
    /// Index name (reported on violation)
    pub name: &'static str,
    /// Key extraction function
    pub key: fn(&T) -> Option<String>,
}

/// A named collection of typed documents.
///
/// Documents are kept ordered by id, so scans are deterministic and roughly
/// creation-ordered. Every method takes the shard lock for at most one
/// critical section; `find_one_and_update` and `upsert` hold the write lock
/// across their read-check-write, which is what makes them usable as
/// compare-and-swap points.
pub struct Collection<T> {
    name: &'static str,
    docs: RwLock<BTreeMap<ObjectId, T>>,
    unique: Vec<UniqueIndex<T>>,
}

impl<T: Doc> Collection<T> {
    /// Create an empty collection
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            docs: RwLock::new(BTreeMap::new()),
            unique: Vec::new(),
        }
    }

    /// Declare a unique index
    pub fn with_unique(mut self, name: &'static str, key: fn(&T) -> Option<String>) -> Self {
        self.unique.push(UniqueIndex { name, key });
        self
    }

    /// Get the collection name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Insert a document, enforcing the primary key and unique indexes
    pub fn insert(&self, doc: T) -> StoreResult<()> {
        let mut docs = self.docs.write();

        if docs.contains_key(&doc.id()) {
            return Err(StoreError::DuplicateKey("_id"));
        }
        self.check_unique(&docs, &doc, None)?;

        docs.insert(doc.id(), doc);
        Ok(())
    }

    /// Get a document by primary key
    pub fn get(&self, id: ObjectId) -> Option<T> {
        self.docs.read().get(&id).cloned()
    }

    /// Find the first document matching the predicate (id order)
    pub fn find_one(&self, pred: impl Fn(&T) -> bool) -> Option<T> {
        self.docs.read().values().find(|d| pred(d)).cloned()
    }

    /// Find all documents matching the predicate (id order)
    pub fn find(&self, pred: impl Fn(&T) -> bool) -> Vec<T> {
        self.docs
            .read()
            .values()
            .filter(|d| pred(d))
            .cloned()
            .collect()
    }

    /// Count documents matching the predicate
    pub fn count(&self, pred: impl Fn(&T) -> bool) -> usize {
        self.docs.read().values().filter(|d| pred(d)).count()
    }

    /// Check whether any document matches the predicate
    pub fn exists(&self, pred: impl Fn(&T) -> bool) -> bool {
        self.docs.read().values().any(|d| pred(d))
    }

    /// Mutate the document with the given id, returning the after-image
    pub fn update(&self, id: ObjectId, mutate: impl FnOnce(&mut T)) -> StoreResult<T> {
        let mut docs = self.docs.write();

        let mut doc = docs.get(&id).cloned().ok_or(StoreError::NotFound)?;
        mutate(&mut doc);
        self.check_unique(&docs, &doc, Some(id))?;

        docs.insert(id, doc.clone());
        Ok(doc)
    }

    /// Mutate every document matching the predicate; returns how many changed
    pub fn update_many(&self, pred: impl Fn(&T) -> bool, mutate: impl Fn(&mut T)) -> usize {
        let mut docs = self.docs.write();
        let ids: Vec<ObjectId> = docs
            .values()
            .filter(|d| pred(d))
            .map(|d| d.id())
            .collect();

        for id in &ids {
            if let Some(doc) = docs.get_mut(id) {
                mutate(doc);
            }
        }
        ids.len()
    }

    /// Find the first document matching the predicate and mutate it in one
    /// critical section, returning the after-image. Returns `None` when no
    /// document matched; this is the compare-and-swap primitive.
    pub fn find_one_and_update(
        &self,
        pred: impl Fn(&T) -> bool,
        mutate: impl FnOnce(&mut T),
    ) -> Option<T> {
        let mut docs = self.docs.write();
        let id = docs.values().find(|d| pred(d)).map(|d| d.id())?;

        let doc = docs.get_mut(&id)?;
        mutate(doc);
        Some(doc.clone())
    }

    /// Mutate the first document matching the predicate, or insert a fresh
    /// one built by `make` with the mutation applied. Unique indexes are
    /// enforced on the insert path.
    pub fn upsert(
        &self,
        pred: impl Fn(&T) -> bool,
        apply: impl FnOnce(&mut T),
        make: impl FnOnce() -> T,
    ) -> StoreResult<T> {
        let mut docs = self.docs.write();

        if let Some(id) = docs.values().find(|d| pred(d)).map(|d| d.id()) {
            let doc = docs.get_mut(&id).ok_or(StoreError::NotFound)?;
            apply(doc);
            return Ok(doc.clone());
        }

        let mut doc = make();
        apply(&mut doc);
        if docs.contains_key(&doc.id()) {
            return Err(StoreError::DuplicateKey("_id"));
        }
        self.check_unique(&docs, &doc, None)?;

        docs.insert(doc.id(), doc.clone());
        Ok(doc)
    }

    /// Delete a document by primary key; returns whether it existed
    pub fn delete(&self, id: ObjectId) -> bool {
        self.docs.write().remove(&id).is_some()
    }

    /// Delete every document matching the predicate; returns how many
    pub fn delete_many(&self, pred: impl Fn(&T) -> bool) -> usize {
        let mut docs = self.docs.write();
        let ids: Vec<ObjectId> = docs
            .values()
            .filter(|d| pred(d))
            .map(|d| d.id())
            .collect();

        for id in &ids {
            docs.remove(id);
        }
        ids.len()
    }

    /// Total number of documents
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    /// Check whether the collection is empty
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    /// Verify no other document shares a unique key with `doc`.
    /// `exclude` is the id of the document being updated, if any.
    fn check_unique(
        &self,
        docs: &BTreeMap<ObjectId, T>,
        doc: &T,
        exclude: Option<ObjectId>,
    ) -> StoreResult<()> {
        for index in &self.unique {
            let Some(key) = (index.key)(doc) else { continue };
            let clash = docs.values().any(|other| {
                Some(other.id()) != exclude && (index.key)(other).as_deref() == Some(key.as_str())
            });
            if clash {
                return Err(StoreError::DuplicateKey(index.name));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: ObjectId,
        tag: String,
        count: u32,
    }

    impl Doc for Widget {
        fn id(&self) -> ObjectId {
            self.id
        }
    }

    fn widget(tag: &str, count: u32) -> Widget {
        Widget {
            id: ObjectId::new().unwrap(),
            tag: tag.into(),
            count,
        }
    }

    fn tagged() -> Collection<Widget> {
        Collection::new("widgets").with_unique("tag", |w| Some(w.tag.clone()))
    }

    #[test]
    fn test_insert_and_get() {
        let coll = tagged();
        let w = widget("a", 1);
        coll.insert(w.clone()).unwrap();

        assert_eq!(coll.get(w.id), Some(w.clone()));
        assert_eq!(coll.len(), 1);
    }

    #[test]
    fn test_primary_key_violation() {
        let coll = tagged();
        let w = widget("a", 1);
        coll.insert(w.clone()).unwrap();

        let mut dup = widget("b", 2);
        dup.id = w.id;
        assert!(matches!(
            coll.insert(dup),
            Err(StoreError::DuplicateKey("_id"))
        ));
    }

    #[test]
    fn test_unique_index_violation() {
        let coll = tagged();
        coll.insert(widget("a", 1)).unwrap();

        assert!(matches!(
            coll.insert(widget("a", 2)),
            Err(StoreError::DuplicateKey("tag"))
        ));
    }

    #[test]
    fn test_find_and_count() {
        let coll = tagged();
        coll.insert(widget("a", 1)).unwrap();
        coll.insert(widget("b", 2)).unwrap();
        coll.insert(widget("c", 2)).unwrap();

        assert_eq!(coll.find(|w| w.count == 2).len(), 2);
        assert_eq!(coll.count(|w| w.count == 2), 2);
        assert!(coll.exists(|w| w.tag == "a"));
        assert!(!coll.exists(|w| w.tag == "z"));
    }

    #[test]
    fn test_find_one_and_update_cas() {
        let coll = tagged();
        let w = widget("a", 3);
        coll.insert(w.clone()).unwrap();

        // Matching selector: mutation applies, after-image returned
        let after = coll
            .find_one_and_update(|x| x.id == w.id && x.count == 3, |x| x.count += 1)
            .unwrap();
        assert_eq!(after.count, 4);

        // Stale selector: no match, nothing applied
        let miss = coll.find_one_and_update(|x| x.id == w.id && x.count == 3, |x| x.count += 1);
        assert!(miss.is_none());
        assert_eq!(coll.get(w.id).unwrap().count, 4);
    }

    #[test]
    fn test_update_rejects_unique_clash() {
        let coll = tagged();
        let a = widget("a", 1);
        coll.insert(a.clone()).unwrap();
        coll.insert(widget("b", 1)).unwrap();

        let result = coll.update(a.id, |w| w.tag = "b".into());
        assert!(matches!(result, Err(StoreError::DuplicateKey("tag"))));
        // Unchanged on failure
        assert_eq!(coll.get(a.id).unwrap().tag, "a");
    }

    #[test]
    fn test_upsert_inserts_then_updates() {
        let coll = tagged();

        let first = coll
            .upsert(|w| w.tag == "a", |w| w.count = 5, || widget("a", 0))
            .unwrap();
        assert_eq!(first.count, 5);
        assert_eq!(coll.len(), 1);

        let second = coll
            .upsert(|w| w.tag == "a", |w| w.count = 9, || widget("a", 0))
            .unwrap();
        assert_eq!(second.id, first.id);
        assert_eq!(second.count, 9);
        assert_eq!(coll.len(), 1);
    }

    #[test]
    fn test_update_many_and_delete_many() {
        let coll = tagged();
        coll.insert(widget("a", 1)).unwrap();
        coll.insert(widget("b", 1)).unwrap();
        coll.insert(widget("c", 7)).unwrap();

        assert_eq!(coll.update_many(|w| w.count == 1, |w| w.count = 2), 2);
        assert_eq!(coll.count(|w| w.count == 2), 2);

        assert_eq!(coll.delete_many(|w| w.count == 2), 2);
        assert_eq!(coll.len(), 1);
    }

    #[test]
    fn test_delete() {
        let coll = tagged();
        let w = widget("a", 1);
        coll.insert(w.clone()).unwrap();

        assert!(coll.delete(w.id));
        assert!(!coll.delete(w.id));
        assert!(coll.is_empty());
    }
}
