//! Directory-backed container: one directory per group.
//!
//! Each group directory holds a `.emdgroup.toml` manifest with the group's
//! attributes and the names of its sub-groups in creation order (directory
//! listings carry no order of their own).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::domain::Value;
use crate::infrastructure::error::{ContainerError, ContainerResult};
use crate::infrastructure::traits::{validate_group_name, Group};

pub const MANIFEST_FILE: &str = ".emdgroup.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Manifest {
    #[serde(default)]
    groups: Vec<String>,
    #[serde(default)]
    attrs: BTreeMap<String, Value>,
}

/// Handle to a group stored as a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirGroup {
    dir: PathBuf,
    location: String,
}

impl DirGroup {
    /// Create a new container at `path`, replacing whatever container was
    /// there. Refuses to clobber a non-empty directory that is not a container.
    #[instrument(level = "debug")]
    pub fn create(path: &Path) -> ContainerResult<Self> {
        ensure_replaceable(path)?;
        if path.exists() {
            fs::remove_dir_all(path)
                .map_err(|e| ContainerError::io(format!("remove {}", path.display()), e))?;
        }
        let group = Self::init_dir(path)?;
        debug!(path = %path.display(), "created container");
        Ok(group)
    }

    /// Start a replacement for the container at `path` in a sibling staging
    /// directory. `path` itself is untouched until [`DirGroup::commit`].
    #[instrument(level = "debug")]
    pub fn stage(path: &Path) -> ContainerResult<Self> {
        ensure_replaceable(path)?;
        let staging = sibling(path, "staging")?;
        if staging.exists() {
            fs::remove_dir_all(&staging)
                .map_err(|e| ContainerError::io(format!("remove {}", staging.display()), e))?;
        }
        Self::init_dir(&staging)
    }

    /// Swap this staged container in for the one at `path`.
    ///
    /// The old container is moved aside first and only removed once the
    /// staged one is in place; if the swap fails it is moved back.
    #[instrument(level = "debug", skip(self), fields(staged = %self.dir.display()))]
    pub fn commit(self, path: &Path) -> ContainerResult<Self> {
        let previous = sibling(path, "previous")?;
        if previous.exists() {
            fs::remove_dir_all(&previous)
                .map_err(|e| ContainerError::io(format!("remove {}", previous.display()), e))?;
        }
        let replacing = path.exists();
        if replacing {
            fs::rename(path, &previous)
                .map_err(|e| ContainerError::io(format!("move aside {}", path.display()), e))?;
        }
        if let Err(e) = fs::rename(&self.dir, path) {
            if replacing {
                if let Err(restore) = fs::rename(&previous, path) {
                    warn!(error = %restore, previous = %previous.display(), "could not restore container");
                }
            }
            return Err(ContainerError::io(format!("move into place {}", path.display()), e));
        }
        if replacing {
            if let Err(e) = fs::remove_dir_all(&previous) {
                warn!(error = %e, previous = %previous.display(), "could not remove replaced container");
            }
        }
        debug!(path = %path.display(), "committed container");
        Ok(Self {
            dir: path.to_path_buf(),
            location: "/".to_string(),
        })
    }

    /// Throw away a staged container.
    pub fn abandon(self) -> ContainerResult<()> {
        fs::remove_dir_all(&self.dir)
            .map_err(|e| ContainerError::io(format!("remove {}", self.dir.display()), e))
    }

    fn init_dir(path: &Path) -> ContainerResult<Self> {
        fs::create_dir_all(path)
            .map_err(|e| ContainerError::io(format!("create {}", path.display()), e))?;
        let group = Self {
            dir: path.to_path_buf(),
            location: "/".to_string(),
        };
        group.write_manifest(&Manifest::default())?;
        Ok(group)
    }

    /// Open an existing container.
    #[instrument(level = "debug")]
    pub fn open(path: &Path) -> ContainerResult<Self> {
        if !path.join(MANIFEST_FILE).is_file() {
            return Err(ContainerError::NotAContainer(path.to_path_buf()));
        }
        Ok(Self {
            dir: path.to_path_buf(),
            location: "/".to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    fn read_manifest(&self) -> ContainerResult<Manifest> {
        let path = self.manifest_path();
        let content = fs::read_to_string(&path)
            .map_err(|e| ContainerError::io(format!("read {}", path.display()), e))?;
        toml::from_str(&content).map_err(|e| ContainerError::Manifest {
            path,
            message: e.to_string(),
        })
    }

    fn write_manifest(&self, manifest: &Manifest) -> ContainerResult<()> {
        let path = self.manifest_path();
        let content = toml::to_string(manifest).map_err(|e| ContainerError::Manifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, content)
            .map_err(|e| ContainerError::io(format!("write {}", path.display()), e))
    }

    fn child(&self, name: &str) -> Self {
        Self {
            dir: self.dir.join(name),
            location: format!("{}/{}", self.location.trim_end_matches('/'), name),
        }
    }
}

/// `path` may be replaced if it is missing, empty, or already a container.
fn ensure_replaceable(path: &Path) -> ContainerResult<()> {
    if !path.exists() || path.join(MANIFEST_FILE).is_file() {
        return Ok(());
    }
    let is_empty = fs::read_dir(path)
        .map_err(|e| ContainerError::io(format!("read {}", path.display()), e))?
        .next()
        .is_none();
    if is_empty {
        Ok(())
    } else {
        Err(ContainerError::NotAContainer(path.to_path_buf()))
    }
}

/// Hidden sibling of `path`, e.g. `data/.scan.emd.staging`.
fn sibling(path: &Path, suffix: &str) -> ContainerResult<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| ContainerError::InvalidName(path.display().to_string()))?;
    Ok(path.with_file_name(format!(".{}.{}", name.to_string_lossy(), suffix)))
}

impl Group for DirGroup {
    fn name(&self) -> String {
        if self.location == "/" {
            return String::new();
        }
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn location(&self) -> String {
        self.location.clone()
    }

    #[instrument(level = "trace", skip(self), fields(parent = %self.location))]
    fn create_group(&self, name: &str) -> ContainerResult<Self> {
        validate_group_name(name)?;
        let mut manifest = self.read_manifest()?;
        let child = self.child(name);
        if manifest.groups.iter().any(|g| g == name) || child.dir.exists() {
            return Err(ContainerError::GroupExists(child.location));
        }
        fs::create_dir(&child.dir)
            .map_err(|e| ContainerError::io(format!("create {}", child.dir.display()), e))?;
        child.write_manifest(&Manifest::default())?;
        manifest.groups.push(name.to_string());
        self.write_manifest(&manifest)?;
        Ok(child)
    }

    fn group(&self, name: &str) -> ContainerResult<Option<Self>> {
        let manifest = self.read_manifest()?;
        Ok(manifest
            .groups
            .iter()
            .any(|g| g == name)
            .then(|| self.child(name)))
    }

    fn groups(&self) -> ContainerResult<Vec<Self>> {
        let manifest = self.read_manifest()?;
        Ok(manifest.groups.iter().map(|g| self.child(g)).collect())
    }

    fn set_attr(&self, key: &str, value: Value) -> ContainerResult<()> {
        let mut manifest = self.read_manifest()?;
        manifest.attrs.insert(key.to_string(), value);
        self.write_manifest(&manifest)
    }

    fn attr(&self, key: &str) -> ContainerResult<Option<Value>> {
        Ok(self.read_manifest()?.attrs.remove(key))
    }

    fn attrs(&self) -> ContainerResult<Vec<(String, Value)>> {
        Ok(self.read_manifest()?.attrs.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn group_names(path: &Path) -> Vec<String> {
        let file = DirGroup::open(path).unwrap();
        file.groups().unwrap().iter().map(|g| g.name()).collect()
    }

    #[test]
    fn given_new_container_when_groups_created_then_reopen_preserves_order_and_attrs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scan.emd");

        let file = DirGroup::create(&path).unwrap();
        let z = file.create_group("z").unwrap();
        file.create_group("a").unwrap();
        z.set_attr("shape", Value::from(vec![256, 256])).unwrap();

        assert_eq!(group_names(&path), vec!["z", "a"]);
        let reopened = DirGroup::open(&path).unwrap();
        let z = reopened.group("z").unwrap().unwrap();
        assert_eq!(z.location(), "/z");
        assert_eq!(z.attr("shape").unwrap(), Some(Value::from(vec![256, 256])));
    }

    #[test]
    fn given_plain_directory_with_files_when_creating_then_not_a_container() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("notes.txt"), "keep me").unwrap();

        let result = DirGroup::create(temp.path());

        assert!(matches!(result, Err(ContainerError::NotAContainer(_))));
        assert!(temp.path().join("notes.txt").exists());
    }

    #[test]
    fn given_staged_replacement_when_committed_then_old_content_replaced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scan.emd");
        DirGroup::create(&path).unwrap().create_group("old").unwrap();

        let staged = DirGroup::stage(&path).unwrap();
        staged.create_group("new").unwrap();
        let before = group_names(&path);
        staged.commit(&path).unwrap();

        assert_eq!(before, vec!["old"]);
        assert_eq!(group_names(&path), vec!["new"]);
        assert!(!temp.path().join(".scan.emd.staging").exists());
        assert!(!temp.path().join(".scan.emd.previous").exists());
    }

    #[test]
    fn given_staged_replacement_when_abandoned_then_original_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scan.emd");
        DirGroup::create(&path).unwrap().create_group("keep").unwrap();

        let staged = DirGroup::stage(&path).unwrap();
        staged.create_group("keep").unwrap();
        assert!(matches!(staged.create_group("keep"), Err(ContainerError::GroupExists(_))));
        staged.abandon().unwrap();

        let reopened = DirGroup::open(&path).unwrap();
        assert!(reopened.group("keep").unwrap().is_some());
        assert!(!temp.path().join(".scan.emd.staging").exists());
    }

    #[test]
    fn given_missing_target_when_committing_then_container_created() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fresh");

        DirGroup::stage(&path).unwrap().commit(&path).unwrap();

        assert!(DirGroup::open(&path).is_ok());
    }

    #[test]
    fn given_missing_manifest_when_opening_then_not_a_container() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            DirGroup::open(temp.path()),
            Err(ContainerError::NotAContainer(_))
        ));
    }
}
