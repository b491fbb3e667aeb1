use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tokio::fs;

use super::{Error, Result};

/// Flat files below one directory.
#[derive(Debug, Clone)]
pub struct FileStore(PathBuf);

impl FileStore {
    pub fn open(p: impl AsRef<Path>) -> Self {
        Self(p.as_ref().to_owned())
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.0.join(file)
    }

    /// One identifier per line. A file that does not exist yet reads as empty.
    pub async fn load_ids(&self, file: &str) -> Result<Vec<String>> {
        let path = self.path(file);
        if !fs::try_exists(&path).await? {
            return Ok(vec![]);
        }
        log::info!("restore IDs from {}", path.display());
        let content = fs::read_to_string(&path).await?;
        // blank lines are left over from editing by hand
        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(ToOwned::to_owned)
            .collect())
    }

    /// Writes one identifier per line. Nothing is written if any identifier
    /// contains a line break.
    pub async fn save_ids(&self, file: &str, ids: &[String]) -> Result<()> {
        validate_ids(ids)?;
        let mut content = String::with_capacity(ids.iter().map(|x| x.len() + 1).sum());
        for id in ids {
            content.push_str(id);
            content.push('\n');
        }
        let path = self.path(file);
        log::info!("generate {}", path.display());
        write_with_backup(&path, content.as_bytes()).await?;
        Ok(())
    }

    /// A JSON object of strings, in file order. A missing file reads as empty.
    pub async fn load_map(&self, file: &str) -> Result<Vec<(String, String)>> {
        let path = self.path(file);
        if !fs::try_exists(&path).await? {
            return Ok(vec![]);
        }
        log::info!("restore IDs from {}", path.display());
        let content = fs::read_to_string(&path).await?;
        let map: Map<String, Value> = serde_json::from_str(&content)?;
        map.into_iter()
            .map(|(key, value)| match value {
                Value::String(value) => Ok((key, value)),
                other => Err(Error::Corrupt(format!(
                    "{}: value of {key} is not a string but {other}",
                    path.display()
                ))),
            })
            .collect()
    }

    /// Writes `entries` as a JSON object, keeping their order.
    pub async fn save_map(&self, file: &str, entries: &[(String, String)]) -> Result<()> {
        validate_ids(entries.iter().map(|(id, _)| id))?;
        let path = self.path(file);
        log::info!("generate {}", path.display());
        write_with_backup(&path, &to_json_object(entries)?).await?;
        Ok(())
    }
}

/// Identifiers are stored one per line, so none may contain a line break.
pub fn validate_ids<'a>(ids: impl IntoIterator<Item = &'a String>) -> Result<()> {
    match ids.into_iter().find(|id| id.contains(['\n', '\r'])) {
        Some(id) => Err(Error::InvalidIdentifier(id.clone())),
        None => Ok(()),
    }
}

/// Pretty printed with four spaces, the way the feed index has always looked.
pub fn to_json_object(entries: &[(String, String)]) -> Result<Vec<u8>> {
    let map: Map<String, Value> = entries
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    serde::Serialize::serialize(&map, &mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

/// Replaces `path` with `content` so readers never see a partial file.
pub async fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let tmp = sibling(path, "tmp");
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await
}

/// Like [`write_atomic`], keeping the previous version as `<file>.old`.
pub async fn write_with_backup(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if fs::try_exists(path).await? {
        fs::copy(path, sibling(path, "old")).await?;
    }
    write_atomic(path, content).await
}

fn sibling(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}
