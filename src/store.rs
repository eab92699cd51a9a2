//! Hierarchical key-value configuration store.
//!
//! Keys are dotted paths (`git.branch.default.master`) into a JSON object.
//! A literal dot inside a segment is written as `\.`, which is how remote
//! URLs are embedded (`git.repo.github\.com/acme/app.server`).

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "BRANCHFLOW_CONFIG";

/// Read/write access to persisted configuration.
pub trait ConfigStore {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
    /// The whole document.
    fn all(&self) -> Result<Value>;
    /// Backing file, if any.
    fn location(&self) -> Option<&Path>;

    /// String value at `key`; empty strings and non-strings read as unset.
    fn get_str(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .get(key)?
            .and_then(|v| v.as_str().map(str::to_string))
            .filter(|s| !s.is_empty()))
    }
}

/// Escape a raw value (typically a remote URL) for use as one key segment.
pub fn escape_segment(raw: &str) -> String {
    raw.replace('.', "\\.")
}

/// Split a key on unescaped dots, unescaping `\.` inside segments.
pub fn split_key(key: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = key.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'.') => {
                current.push('.');
                chars.next();
            }
            '.' => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

fn lookup<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(root, |node, seg| node.as_object()?.get(seg))
}

fn insert(node: &mut Value, segments: &[String], value: Value) {
    match segments.split_first() {
        None => *node = value,
        Some((head, rest)) => {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            if let Value::Object(obj) = node {
                let child = obj.entry(head.clone()).or_insert(Value::Null);
                insert(child, rest, value);
            }
        }
    }
}

fn remove(root: &mut Value, segments: &[String]) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut node = root;
    for seg in parents {
        match node.as_object_mut().and_then(|obj| obj.get_mut(seg)) {
            Some(child) => node = child,
            None => return,
        }
    }
    if let Some(obj) = node.as_object_mut() {
        obj.remove(last);
    }
}

/// JSON file store. Every call goes back to disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$BRANCHFLOW_CONFIG`, or `<config dir>/branchflow/config.json`.
    pub fn open_default() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Ok(Self::new(path));
            }
        }
        let dir = dirs::config_dir()
            .ok_or_else(|| Error::Store("cannot determine the user config directory".to_string()))?;
        Ok(Self::new(dir.join("branchflow").join("config.json")))
    }

    fn load(&self) -> Result<Value> {
        if !self.path.exists() {
            return Ok(Value::Object(Map::new()));
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }
        let value: Value = serde_json::from_str(&content)?;
        if !value.is_object() {
            return Err(Error::Store(format!(
                "{} does not contain a JSON object",
                self.path.display()
            )));
        }
        Ok(value)
    }

    fn save(&self, value: &Value) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(value)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), "config saved");
        Ok(())
    }
}

impl ConfigStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let doc = self.load()?;
        Ok(lookup(&doc, &split_key(key)).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut doc = self.load()?;
        insert(&mut doc, &split_key(key), value);
        self.save(&doc)
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut doc = self.load()?;
        remove(&mut doc, &split_key(key));
        self.save(&doc)
    }

    fn clear(&self) -> Result<()> {
        self.save(&Value::Object(Map::new()))
    }

    fn all(&self) -> Result<Value> {
        self.load()
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// In-memory store for tests and dry runs.
#[derive(Debug)]
pub struct MemoryStore {
    doc: RefCell<Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    pub fn from_value(doc: Value) -> Self {
        Self {
            doc: RefCell::new(doc),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(lookup(&self.doc.borrow(), &split_key(key)).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        insert(&mut self.doc.borrow_mut(), &split_key(key), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        remove(&mut self.doc.borrow_mut(), &split_key(key));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.doc.borrow_mut() = Value::Object(Map::new());
        Ok(())
    }

    fn all(&self) -> Result<Value> {
        Ok(self.doc.borrow().clone())
    }

    fn location(&self) -> Option<&Path> {
        None
    }
}
