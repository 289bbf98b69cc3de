// Schema resource storage: the collaborator the converter reads from and writes to.

use crate::types::{ResourceDocument, COMPONENT_KINDS, DICTIONARY_KIND, LINK_KIND};
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid resource file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Schema '{0}' is locked by another conversion")]
    Locked(String),
    #[error("Schema '{0}' does not exist")]
    MissingScope(String),
    #[error("Resource kind '{0}' has no place in a schema")]
    UnknownKind(String),
    #[error("Resource name '{0}' cannot be used as a file name")]
    InvalidName(String),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where resources of one schema (scope) live.
pub trait ResourceStore {
    fn list_kind(&self, scope: &str, kind: &str) -> Result<Vec<ResourceDocument>, StoreError>;

    fn write(&self, scope: &str, doc: &ResourceDocument) -> Result<(), StoreError>;

    /// Exclusive access to a scope until the guard is dropped.
    fn lock(&self, scope: &str) -> Result<ScopeLock, StoreError>;

    fn list_components(&self, scope: &str) -> Result<Vec<ResourceDocument>, StoreError> {
        let mut out = Vec::new();
        for kind in COMPONENT_KINDS {
            out.extend(self.list_kind(scope, kind)?);
        }
        Ok(out)
    }

    fn list_relations(&self, scope: &str) -> Result<Vec<ResourceDocument>, StoreError> {
        self.list_kind(scope, LINK_KIND)
    }
}

/// Lock file guard. The file is removed on drop.
#[derive(Debug)]
pub struct ScopeLock {
    path: PathBuf,
}

impl Drop for ScopeLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release schema lock");
        } else {
            tracing::debug!(path = %self.path.display(), "released schema lock");
        }
    }
}

/// One directory per schema under `root`, resources grouped by kind:
/// `boxes/`, `core/`, `links/` and `dictionaries/`, one `<name>.yml` each.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn scope_dir(&self, scope: &str) -> PathBuf {
        self.root.join(scope)
    }

    fn lock_path(&self, scope: &str) -> PathBuf {
        self.root.join(format!(".{}.lock", scope))
    }
}

pub fn kind_dir(kind: &str) -> Option<&'static str> {
    match kind {
        "Th2Box" => Some("boxes"),
        "Th2CoreBox" | "Th2Estore" | "Th2Mstore" => Some("core"),
        LINK_KIND => Some("links"),
        DICTIONARY_KIND => Some("dictionaries"),
        _ => None,
    }
}

/// Resource names become file names; anything that could leave the kind directory is refused.
fn file_name_for(name: &str) -> Result<String, StoreError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(format!("{}.yml", name))
}

fn is_yaml_file(path: &Path) -> bool {
    path.is_file()
        && matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yml") | Some("yaml")
        )
}

impl ResourceStore for DirectoryStore {
    fn list_kind(&self, scope: &str, kind: &str) -> Result<Vec<ResourceDocument>, StoreError> {
        let scope_dir = self.scope_dir(scope);
        if !scope_dir.is_dir() {
            return Err(StoreError::MissingScope(scope.to_string()));
        }
        let dir_name = kind_dir(kind).ok_or_else(|| StoreError::UnknownKind(kind.to_string()))?;
        let dir = scope_dir.join(dir_name);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in fs::read_dir(&dir).map_err(io_error(&dir))? {
            let path = entry.map_err(io_error(&dir))?.path();
            if is_yaml_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut out = Vec::new();
        for path in paths {
            let text = fs::read_to_string(&path).map_err(io_error(&path))?;
            let doc: ResourceDocument =
                serde_yaml::from_str(&text).map_err(|source| StoreError::Yaml {
                    path: path.clone(),
                    source,
                })?;
            // core/ holds several kinds.
            if doc.kind == kind {
                out.push(doc);
            }
        }
        Ok(out)
    }

    fn write(&self, scope: &str, doc: &ResourceDocument) -> Result<(), StoreError> {
        let dir_name = kind_dir(&doc.kind).ok_or_else(|| StoreError::UnknownKind(doc.kind.clone()))?;
        let file_name = file_name_for(doc.name())?;
        let dir = self.scope_dir(scope).join(dir_name);
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        let path = dir.join(file_name);
        let text = serde_yaml::to_string(doc).map_err(|source| StoreError::Yaml {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, text).map_err(io_error(&path))?;
        tracing::debug!(scope, name = doc.name(), kind = %doc.kind, "wrote resource");
        Ok(())
    }

    fn lock(&self, scope: &str) -> Result<ScopeLock, StoreError> {
        fs::create_dir_all(&self.root).map_err(io_error(&self.root))?;
        let path = self.lock_path(scope);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                tracing::debug!(scope, path = %path.display(), "acquired schema lock");
                Ok(ScopeLock { path })
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::Locked(scope.to_string()))
            }
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;
    use serde_json::json;

    fn resource(kind: &str, name: &str) -> ResourceDocument {
        ResourceDocument {
            api_version: "th2.exactpro.com/v1".to_string(),
            kind: kind.to_string(),
            metadata: Metadata {
                name: name.to_string(),
                extra: Default::default(),
            },
            spec: json!({"image-name": name}),
        }
    }

    #[test]
    fn test_write_then_list_by_kind() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(tmp.path());
        store.write("schema", &resource("Th2Box", "act")).unwrap();
        store.write("schema", &resource("Th2CoreBox", "mstore")).unwrap();
        store.write("schema", &resource("Th2Estore", "estore")).unwrap();
        store.write("schema", &resource("Th2Link", "links")).unwrap();

        assert!(tmp.path().join("schema/boxes/act.yml").is_file());
        assert!(tmp.path().join("schema/core/estore.yml").is_file());

        let components = store.list_components("schema").unwrap();
        let names: Vec<_> = components.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["act", "mstore", "estore"]);
        assert_eq!(store.list_relations("schema").unwrap()[0].name(), "links");
        assert!(store.list_kind("schema", DICTIONARY_KIND).unwrap().is_empty());
    }

    #[test]
    fn test_missing_scope_and_unknown_kind() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(tmp.path());
        assert!(matches!(
            store.list_components("nope"),
            Err(StoreError::MissingScope(_))
        ));
        assert!(matches!(
            store.write("schema", &resource("Th2Settings", "settings")),
            Err(StoreError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_names_that_escape_the_schema_are_refused() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(tmp.path().join("repo"));
        for name in ["../../escaped", "nested/act", "..", "", "dir\\act"] {
            assert!(
                matches!(
                    store.write("schema", &resource("Th2Box", name)),
                    Err(StoreError::InvalidName(_))
                ),
                "{name:?} was accepted"
            );
        }
        assert!(!tmp.path().join("escaped.yml").exists());
        assert!(!tmp.path().join("repo/schema").exists());
        store.write("schema", &resource("Th2Box", "act.v2")).unwrap();
        assert!(tmp.path().join("repo/schema/boxes/act.v2.yml").is_file());
    }

    #[test]
    fn test_lock_is_exclusive_until_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(tmp.path());
        let guard = store.lock("schema").unwrap();
        assert!(matches!(store.lock("schema"), Err(StoreError::Locked(_))));
        assert!(store.lock("other").is_ok());
        drop(guard);
        assert!(store.lock("schema").is_ok());
    }

    #[test]
    fn test_broken_file_is_reported_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("schema/boxes");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("bad.yml"), "kind: [unclosed").unwrap();
        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        let store = DirectoryStore::new(tmp.path());
        let err = store.list_components("schema").unwrap_err();
        assert!(err.to_string().contains("bad.yml"));
    }
}
