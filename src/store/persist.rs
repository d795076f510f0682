//! JSON-file persistence of the whole store.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use super::{DocumentStore, StoreState};
use crate::error::DbResult;

impl DocumentStore {
    /// Write every database, collection and document to `path`.
    pub fn dump_to_json(&self, path: &Path) -> DbResult<()> {
        let state = self.state.read().clone();

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &state)?;
        writer.flush()?;

        tracing::info!(
            "Dumped {} database(s) to {}",
            state.databases.len(),
            path.display()
        );
        Ok(())
    }

    /// Replace the current state with the contents of `path`.
    pub fn load_from_json(&self, path: &Path) -> DbResult<()> {
        let reader = BufReader::new(File::open(path)?);
        let mut loaded: StoreState = serde_json::from_reader(reader)?;
        loaded.reindex();
        let count = loaded.databases.len();

        *self.state.write() = loaded;

        tracing::info!("Loaded {} database(s) from {}", count, path.display());
        Ok(())
    }

    /// Create a store from a state file written by [`DocumentStore::dump_to_json`].
    pub fn from_json_file(path: &Path) -> DbResult<Self> {
        let store = Self::new();
        store.load_from_json(path)?;
        Ok(store)
    }
}
