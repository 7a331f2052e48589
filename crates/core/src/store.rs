//! File-backed document store.
//!
//! Each collection is a directory under the data directory; each document is one JSON file
//! stored at a sharded path derived from its [`DocumentId`]:
//!
//! ```text
//! <data_dir>/
//!   clinics/
//!     <s1>/<s2>/<id>.json
//!   bookings/ ...
//!   patients/ ...
//!   platform_admins/ ...
//! ```
//!
//! ## Guarantees
//!
//! - Every write (insert, update, delete) of a single document is atomic: the new content is
//!   written to a temporary file and renamed over the old one while the store's write lock is
//!   held. [`DocumentStore::update`] runs its closure under the same lock, so a read-modify-write
//!   through it cannot interleave with another write.
//! - Unique indexes declared by [`Document::unique_keys`] are checked under the write lock on
//!   insert and update.
//! - There is no multi-document transaction. Callers that read with [`DocumentStore::get`] and
//!   later write with a separate call can lose updates.

use crate::constants::{
    BOOKINGS_COLLECTION, CLINICS_COLLECTION, PATIENTS_COLLECTION, PLATFORM_ADMINS_COLLECTION,
};
use crate::{CoreError, CoreResult};
use clinic_uuid::DocumentId;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// The four persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    PlatformAdmins,
    Clinics,
    Patients,
    Bookings,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::PlatformAdmins,
        Collection::Clinics,
        Collection::Patients,
        Collection::Bookings,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Collection::PlatformAdmins => PLATFORM_ADMINS_COLLECTION,
            Collection::Clinics => CLINICS_COLLECTION,
            Collection::Patients => PATIENTS_COLLECTION,
            Collection::Bookings => BOOKINGS_COLLECTION,
        }
    }
}

/// A value persisted as one document of a collection.
pub trait Document: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn id(&self) -> &DocumentId;

    /// `(index name, key)` pairs that must be unique across the collection.
    ///
    /// Returning no pair for an index makes that document invisible to it (sparse/partial
    /// index).
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Handle to the document store. Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct DocumentStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl DocumentStore {
    /// Opens (and if needed creates) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StorageDirCreation`] if a collection directory cannot be created.
    pub fn open(root: &Path) -> CoreResult<Self> {
        for collection in Collection::ALL {
            fs::create_dir_all(root.join(collection.dir_name()))
                .map_err(CoreError::StorageDirCreation)?;
        }
        Ok(Self {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.dir_name())
    }

    fn path_of<D: Document>(&self, id: &DocumentId) -> PathBuf {
        id.sharded_file(&self.collection_dir(D::COLLECTION))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Inserts a new document.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Conflict`] if a document with the same id exists or a unique
    /// index key is already taken.
    pub fn insert<D: Document>(&self, doc: &D) -> CoreResult<()> {
        let _guard = self.lock();
        let path = self.path_of::<D>(doc.id());
        if path.exists() {
            return Err(CoreError::Conflict(format!(
                "{} document {} already exists",
                D::COLLECTION.dir_name(),
                doc.id()
            )));
        }
        self.check_unique::<D>(doc)?;
        write_atomic(&path, doc)
    }

    /// Loads a document by id.
    pub fn get<D: Document>(&self, id: &DocumentId) -> CoreResult<Option<D>> {
        read_document(&self.path_of::<D>(id))
    }

    /// Applies `f` to the stored document and writes the result as one atomic update.
    ///
    /// Returns `Ok(None)` if no document has this id. If `f` fails, nothing is written.
    pub fn update<D, R>(
        &self,
        id: &DocumentId,
        f: impl FnOnce(&mut D) -> CoreResult<R>,
    ) -> CoreResult<Option<R>>
    where
        D: Document,
    {
        let _guard = self.lock();
        let path = self.path_of::<D>(id);
        let Some(mut doc) = read_document::<D>(&path)? else {
            return Ok(None);
        };
        let result = f(&mut doc)?;
        if doc.id() != id {
            return Err(CoreError::BadRequest("document id cannot change".into()));
        }
        self.check_unique::<D>(&doc)?;
        write_atomic(&path, &doc)?;
        Ok(Some(result))
    }

    /// Removes a document. Returns whether it existed.
    pub fn delete<D: Document>(&self, id: &DocumentId) -> CoreResult<bool> {
        let _guard = self.lock();
        match fs::remove_file(self.path_of::<D>(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(CoreError::StorageWrite(e)),
        }
    }

    /// Returns every document of the collection matching `pred`.
    ///
    /// Files that cannot be parsed are logged and skipped.
    pub fn find<D: Document>(&self, pred: impl Fn(&D) -> bool) -> CoreResult<Vec<D>> {
        let mut out = Vec::new();
        self.scan::<D>(|doc| {
            if pred(&doc) {
                out.push(doc);
            }
            true
        })?;
        Ok(out)
    }

    /// Returns the first document found matching `pred`. Scan order is unspecified.
    pub fn find_one<D: Document>(&self, pred: impl Fn(&D) -> bool) -> CoreResult<Option<D>> {
        let mut found = None;
        self.scan::<D>(|doc| {
            if pred(&doc) {
                found = Some(doc);
                false
            } else {
                true
            }
        })?;
        Ok(found)
    }

    fn check_unique<D: Document>(&self, doc: &D) -> CoreResult<()> {
        let keys = doc.unique_keys();
        if keys.is_empty() {
            return Ok(());
        }
        let mut clash = None;
        self.scan::<D>(|other| {
            if other.id() == doc.id() {
                return true;
            }
            let other_keys = other.unique_keys();
            clash = keys
                .iter()
                .find(|key| other_keys.contains(key))
                .map(|(index, _)| *index);
            clash.is_none()
        })?;
        match clash {
            Some(index) => Err(CoreError::Conflict(format!(
                "duplicate value for unique index {}.{}",
                D::COLLECTION.dir_name(),
                index
            ))),
            None => Ok(()),
        }
    }

    /// Walks `<collection>/<s1>/<s2>/<id>.json`, calling `visit` until it returns false.
    fn scan<D: Document>(&self, mut visit: impl FnMut(D) -> bool) -> CoreResult<()> {
        let base = self.collection_dir(D::COLLECTION);
        let s1_iter = match fs::read_dir(&base) {
            Ok(it) => it,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(CoreError::StorageRead(e)),
        };

        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }
            let Ok(s2_iter) = fs::read_dir(&s1_path) else {
                continue;
            };

            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }
                let Ok(doc_iter) = fs::read_dir(&s2_path) else {
                    continue;
                };

                for entry in doc_iter.flatten() {
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("json") {
                        continue;
                    }
                    match read_document::<D>(&path) {
                        Ok(Some(doc)) => {
                            if !visit(doc) {
                                return Ok(());
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            tracing::warn!("skipping unreadable document {}: {}", path.display(), e);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn read_document<D: DeserializeOwned>(path: &Path) -> CoreResult<Option<D>> {
    let contents = match fs::read(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CoreError::StorageRead(e)),
    };
    serde_json::from_slice(&contents)
        .map(Some)
        .map_err(CoreError::Deserialization)
}

fn write_atomic<D: Serialize>(path: &Path, doc: &D) -> CoreResult<()> {
    let json = serde_json::to_vec_pretty(doc).map_err(CoreError::Serialization)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(CoreError::StorageWrite)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(CoreError::StorageWrite)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(CoreError::StorageWrite(e));
    }
    Ok(())
}
