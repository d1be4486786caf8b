//! Saves and restores the board in `localStorage`.
//!
//! Notes, connections and customization live under separate keys so a corrupt
//! entry only costs that one part of the board.

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};
use web_sys::Storage;

use crate::config::{CONNECTIONS_KEY, CUSTOMIZATION_KEY, NOTES_KEY};
use crate::model::{BoardSnapshot, Connection, Customization, Note};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,
    #[error("storage access failed: {0}")]
    Access(String),
    #[error("could not serialize board: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("stored value under `{key}` is not valid: {source}")]
    Deserialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

fn local_storage() -> Result<Storage, StorageError> {
    web_sys::window()
        .ok_or(StorageError::Unavailable)?
        .local_storage()
        .map_err(|e| StorageError::Access(format!("{e:?}")))?
        .ok_or(StorageError::Unavailable)
}

fn read_raw(store: &Storage, key: &'static str) -> Result<Option<String>, StorageError> {
    store.get_item(key).map_err(|e| StorageError::Access(format!("{e:?}")))
}

/// Parses one stored entry. A missing key is `None`, not an error.
pub fn parse_entry<T: DeserializeOwned>(key: &'static str, raw: Option<&str>) -> Result<Option<T>, StorageError> {
    raw.map(|s| serde_json::from_str(s).map_err(|source| StorageError::Deserialize { key, source }))
        .transpose()
}

/// Builds a snapshot from the three raw entries. Bad entries are logged and
/// fall back to their defaults; the rest still loads.
pub fn snapshot_from_entries(notes: Option<&str>, connections: Option<&str>, customization: Option<&str>) -> BoardSnapshot {
    fn or_default<T: Default>(r: Result<Option<T>, StorageError>) -> T {
        r.unwrap_or_else(|e| {
            warn!(error = %e, "ignoring stored entry");
            None
        })
        .unwrap_or_default()
    }
    BoardSnapshot {
        notes: or_default(parse_entry::<Vec<Note>>(NOTES_KEY, notes)),
        connections: or_default(parse_entry::<Vec<Connection>>(CONNECTIONS_KEY, connections)),
        customization: or_default(parse_entry::<Customization>(CUSTOMIZATION_KEY, customization)),
    }
}

/// Serialized (key, value) pairs for a snapshot.
pub fn snapshot_entries(snap: &BoardSnapshot) -> Result<[(&'static str, String); 3], StorageError> {
    Ok([
        (NOTES_KEY, serde_json::to_string(&snap.notes)?),
        (CONNECTIONS_KEY, serde_json::to_string(&snap.connections)?),
        (CUSTOMIZATION_KEY, serde_json::to_string(&snap.customization)?),
    ])
}

pub fn load_board() -> Result<BoardSnapshot, StorageError> {
    let store = local_storage()?;
    let notes = read_raw(&store, NOTES_KEY)?;
    let connections = read_raw(&store, CONNECTIONS_KEY)?;
    let customization = read_raw(&store, CUSTOMIZATION_KEY)?;
    let snap = snapshot_from_entries(notes.as_deref(), connections.as_deref(), customization.as_deref());
    debug!(notes = snap.notes.len(), connections = snap.connections.len(), "board loaded");
    Ok(snap)
}

pub fn save_board(snap: &BoardSnapshot) -> Result<(), StorageError> {
    let store = local_storage()?;
    for (key, value) in snapshot_entries(snap)? {
        store.set_item(key, &value).map_err(|e| StorageError::Access(format!("{e:?}")))?;
    }
    debug!(notes = snap.notes.len(), "board saved");
    Ok(())
}

pub fn clear_board() -> Result<(), StorageError> {
    let store = local_storage()?;
    for key in [NOTES_KEY, CONNECTIONS_KEY, CUSTOMIZATION_KEY] {
        store.remove_item(key).map_err(|e| StorageError::Access(format!("{e:?}")))?;
    }
    Ok(())
}
