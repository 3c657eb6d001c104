use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::foundation::error::{NixieError, NixieResult};

/// File extension of every bitmap resource.
pub const IMAGE_EXTENSION: &str = "png";

/// A named collection of resource files.
pub trait ResourceBundle {
    /// Human-readable location, used in logs and errors.
    fn describe(&self) -> String;

    /// Read `file_name`, returning `Ok(None)` if the bundle has no such file.
    fn read(&self, file_name: &str) -> NixieResult<Option<Vec<u8>>>;
}

/// Resources stored as files in one directory.
#[derive(Clone, Debug)]
pub struct DirBundle {
    root: PathBuf,
}

impl DirBundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResourceBundle for DirBundle {
    fn describe(&self) -> String {
        self.root.display().to_string()
    }

    fn read(&self, file_name: &str) -> NixieResult<Option<Vec<u8>>> {
        let name = normalize_resource_name(file_name)?;
        let path = self.root.join(Path::new(&name));
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("read resource '{}'", path.display()))
                .map_err(NixieError::from),
        }
    }
}

/// Resources held in memory, keyed by file name.
#[derive(Clone, Debug, Default)]
pub struct MemoryBundle {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, file_name: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.files.insert(file_name.into(), bytes);
        self
    }

    pub fn remove(&mut self, file_name: &str) -> Option<Vec<u8>> {
        self.files.remove(file_name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ResourceBundle for MemoryBundle {
    fn describe(&self) -> String {
        format!("memory bundle ({} files)", self.files.len())
    }

    fn read(&self, file_name: &str) -> NixieResult<Option<Vec<u8>>> {
        let name = normalize_resource_name(file_name)?;
        Ok(self.files.get(&name).cloned())
    }
}

/// Validate a bundle-relative resource file name.
///
/// Names are flat: no separators, no `.`/`..` segments, no surrounding whitespace.
pub fn normalize_resource_name(name: &str) -> NixieResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(NixieError::validation("resource name must be non-empty"));
    }
    if trimmed.contains(['/', '\\']) {
        return Err(NixieError::validation(format!(
            "resource name '{trimmed}' must not contain path separators"
        )));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(NixieError::validation(format!(
            "resource name '{trimmed}' is not a file name"
        )));
    }
    Ok(trimmed.to_string())
}
