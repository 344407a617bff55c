//! The deployments registry, a JSON file mapping each network to the
//! addresses of the contracts deployed on it.
//!
//! The file has the shape
//! ```json
//! {
//!   "goerli": {
//!     "XTA": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
//!     "XtatuzFactory": "0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"
//!   }
//! }
//! ```
//!
//! Every write replaces the whole file through a rename, so a reader never
//! observes a partially written registry.

use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    errors::RegistryError,
    types::{AddressRecord, ContractSymbol, NetworkId},
};

/// The full contents of the deployments registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Registry {
    /// The address record of each network
    networks: BTreeMap<NetworkId, AddressRecord>,
}

impl Registry {
    /// Look up the address recorded for `symbol` on `network`
    pub fn get(&self, network: &NetworkId, symbol: &ContractSymbol) -> Option<Address> {
        self.networks.get(network)?.get(symbol).copied()
    }

    /// The address record of `network`, if anything was deployed there
    pub fn record(&self, network: &NetworkId) -> Option<&AddressRecord> {
        self.networks.get(network)
    }

    /// The networks present in the registry
    pub fn networks(&self) -> impl Iterator<Item = &NetworkId> {
        self.networks.keys()
    }

    /// Merge `entries` into the record of `network`.
    ///
    /// Existing symbols are overwritten, all other entries are kept.
    pub fn merge(&mut self, network: &NetworkId, entries: AddressRecord) {
        self.networks
            .entry(network.clone())
            .or_default()
            .extend(entries);
    }
}

/// A handle on the registry file at a given path
#[derive(Debug)]
pub struct AddressRegistry {
    /// The path of the registry file
    path: PathBuf,
    /// Serializes read-modify-write cycles made through this handle
    write_lock: Mutex<()>,
}

impl AddressRegistry {
    /// Create a handle on the registry at `path`. The file is not touched
    /// until the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The path of the registry file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full registry. A missing file is an empty registry.
    pub fn load(&self) -> Result<Registry, RegistryError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Registry::default()),
            Err(e) => {
                return Err(RegistryError::IoFailure(format!(
                    "reading {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&contents).map_err(|e| {
            RegistryError::CorruptState(format!("parsing {}: {}", self.path.display(), e))
        })
    }

    /// Durably replace the registry file with `registry`.
    ///
    /// The new contents are written and synced to a temporary file in the
    /// same directory, which is then renamed over the registry file.
    pub fn persist(&self, registry: &Registry) -> Result<(), RegistryError> {
        let staged = self.stage(registry)?;
        self.commit(staged)?;
        debug!(path = %self.path.display(), "persisted deployments registry");

        Ok(())
    }

    /// Write `registry` to a synced temporary file next to the registry file.
    /// The registry file itself is untouched.
    fn stage(&self, registry: &Registry) -> Result<NamedTempFile, RegistryError> {
        let mut tmp = NamedTempFile::new_in(self.parent_dir()).map_err(|e| self.io_failure(e))?;
        serde_json::to_writer_pretty(&mut tmp, registry)
            .map_err(|e| self.io_failure(io::Error::other(e)))?;
        tmp.write_all(b"\n").map_err(|e| self.io_failure(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_failure(e))?;

        Ok(tmp)
    }

    /// Rename a staged file over the registry file and sync the directory
    /// holding it, so the rename itself is durable
    fn commit(&self, staged: NamedTempFile) -> Result<(), RegistryError> {
        staged
            .persist(&self.path)
            .map_err(|e| self.io_failure(e.error))?;

        #[cfg(unix)]
        fs::File::open(self.parent_dir())
            .and_then(|dir| dir.sync_all())
            .map_err(|e| self.io_failure(e))?;

        Ok(())
    }

    /// Wrap an I/O error raised while writing the registry
    fn io_failure(&self, e: io::Error) -> RegistryError {
        RegistryError::IoFailure(format!("writing {}: {}", self.path.display(), e))
    }

    /// Merge `entries` into the record of `network` and persist the result
    pub fn upsert(&self, network: &NetworkId, entries: AddressRecord) -> Result<(), RegistryError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| RegistryError::IoFailure("registry write lock poisoned".to_string()))?;

        let mut registry = self.load()?;
        registry.merge(network, entries);
        self.persist(&registry)
    }

    /// Read the address recorded for `symbol` on `network`
    pub fn get(
        &self,
        network: &NetworkId,
        symbol: &ContractSymbol,
    ) -> Result<Option<Address>, RegistryError> {
        Ok(self.load()?.get(network, symbol))
    }

    /// Read the address record of `network`, empty if nothing was deployed there
    pub fn record(&self, network: &NetworkId) -> Result<AddressRecord, RegistryError> {
        Ok(self.load()?.record(network).cloned().unwrap_or_default())
    }

    /// The directory the temporary file is staged in, so the final rename
    /// never crosses filesystems
    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}
