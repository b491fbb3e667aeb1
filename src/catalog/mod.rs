mod order;
mod safe_name;
mod store;

use std::{collections::HashSet, fmt::Display, path::Path, str::FromStr};

use crate::config::{IDS_ALL_FILE, IDS_ARCHIVE_FILE, IDS_CURRENT_FILE, IDS_NAMED_FILE, INDEX_FILE};
use crate::parse::Facility;

pub use order::{compare_ids, reconcile, Reconciled};
pub use safe_name::safe_name;
pub use store::{to_json_object, validate_ids, write_atomic, FileStore};

#[derive(Debug)]
pub enum Error {
    /// An identifier that cannot be stored one per line.
    InvalidIdentifier(String),
    Corrupt(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidIdentifier(id) => write!(f, "Identifier contains a newline: {id:?}"),
            Self::Corrupt(msg) => write!(f, "Corrupt catalog: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Json(e) => write!(f, "Json error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CatalogMode {
    /// `ids_current`, `ids_archive` and `ids_all`, one identifier per line.
    #[default]
    Lists,
    /// `ids.json`, mapping each current identifier to a safe name.
    Named,
}

impl FromStr for CatalogMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lists" => Ok(Self::Lists),
            "named" => Ok(Self::Named),
            _ => Err(format!("Invalid catalog mode: {s}. Valid options: lists, named")),
        }
    }
}

/// A canteen as known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: String,
    /// Directory and url segment of the canteen: its identifier or its safe name.
    pub key: String,
}

/// The persisted canteen identifiers, owned by whoever drives a run.
#[derive(Debug, Clone)]
pub struct Catalog {
    store: FileStore,
    mode: CatalogMode,
}

impl Catalog {
    pub fn open(dir: impl AsRef<Path>, mode: CatalogMode) -> Self {
        Self {
            store: FileStore::open(dir),
            mode,
        }
    }

    pub const fn mode(&self) -> CatalogMode {
        self.mode
    }

    /// Merges what the upstream lists now with the history and persists the result.
    /// Returns the current entries.
    pub async fn update(&self, facilities: &[Facility]) -> Result<Vec<Entry>> {
        match self.mode {
            CatalogMode::Lists => {
                let fresh = facilities.iter().map(|f| f.id.clone()).collect();
                let historical = self.store.load_ids(IDS_ALL_FILE).await?;
                let Reconciled {
                    current,
                    archive,
                    all,
                } = reconcile(fresh, historical);
                if !archive.is_empty() {
                    log::info!("{} canteens are no longer listed: {archive:?}", archive.len());
                }
                // validate everything before the first file is touched
                validate_ids(current.iter().chain(&all))?;
                self.store.save_ids(IDS_CURRENT_FILE, &current).await?;
                self.store.save_ids(IDS_ARCHIVE_FILE, &archive).await?;
                self.store.save_ids(IDS_ALL_FILE, &all).await?;
                Ok(current
                    .into_iter()
                    .map(|id| Entry {
                        key: id.clone(),
                        id,
                    })
                    .collect())
            }
            CatalogMode::Named => {
                let previous = self.store.load_map(IDS_NAMED_FILE).await?;
                let entries = named_entries(facilities, &previous);
                let pairs: Vec<(String, String)> = entries
                    .iter()
                    .map(|e| (e.id.clone(), e.key.clone()))
                    .collect();
                self.store.save_map(IDS_NAMED_FILE, &pairs).await?;
                Ok(entries)
            }
        }
    }

    /// Entries persisted by the last [`Catalog::update`].
    pub async fn current(&self) -> Result<Vec<Entry>> {
        match self.mode {
            CatalogMode::Lists => Ok(self
                .store
                .load_ids(IDS_CURRENT_FILE)
                .await?
                .into_iter()
                .map(|id| Entry {
                    key: id.clone(),
                    id,
                })
                .collect()),
            CatalogMode::Named => Ok(self
                .store
                .load_map(IDS_NAMED_FILE)
                .await?
                .into_iter()
                .map(|(id, key)| Entry { id, key })
                .collect()),
        }
    }

    /// Writes the index mapping each entry to the url of its metadata feed.
    pub async fn write_index(
        &self,
        entries: &[Entry],
        metadata_url: impl Fn(&str) -> String,
    ) -> Result<()> {
        let pairs: Vec<(String, String)> = entries
            .iter()
            .map(|e| (e.key.clone(), metadata_url(&e.key)))
            .collect();
        let path = self.store.path(INDEX_FILE);
        log::info!("generate {} (index)", path.display());
        write_atomic(&path, &to_json_object(&pairs)?).await?;
        Ok(())
    }
}

/// Sorted, deduplicated entries keyed by safe name. An identifier keeps the key it
/// got in `previous`. A new name that is empty or already taken falls back to the
/// identifier.
fn named_entries(facilities: &[Facility], previous: &[(String, String)]) -> Vec<Entry> {
    let mut facilities: Vec<&Facility> = facilities.iter().collect();
    facilities.sort_by(|a, b| compare_ids(&a.id, &b.id));
    facilities.dedup_by(|a, b| a.id == b.id);

    let previous_key = |id: &str| {
        previous
            .iter()
            .find(|(known, _)| known == id)
            .map(|(_, key)| key.clone())
    };
    let mut taken: HashSet<String> = facilities
        .iter()
        .filter_map(|facility| previous_key(&facility.id))
        .collect();

    let mut entries: Vec<Entry> = Vec::with_capacity(facilities.len());
    for facility in facilities {
        let key = previous_key(&facility.id).unwrap_or_else(|| {
            let mut key = safe_name(&facility.name);
            if key.is_empty() {
                key = safe_name(&facility.id);
            } else if taken.contains(&key) {
                key = format!("{key}_{}", safe_name(&facility.id));
            }
            taken.insert(key.clone());
            key
        });
        entries.push(Entry {
            id: facility.id.clone(),
            key,
        });
    }
    entries
}
