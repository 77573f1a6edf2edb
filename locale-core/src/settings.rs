//! Persisted translator settings: the two locale-wide LCIDs plus the
//! installed-catalog list, backed by `<working_dir>/settings.uts`.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::uts::{decode_uts, InstalledCatalog};

const SETTINGS_FILE_NAME: &str = "settings.uts";
const PREFERRED_LCID_OFFSET: u64 = 8;

/// Loads, holds, and persists the contents of `settings.uts`.
///
/// A missing or malformed settings file is not an error: the store becomes
/// valid but empty, with both LCIDs reset to zero and no installed
/// catalogs. `preferred_lcid` may be read and written concurrently; every
/// other field is fixed for the life of the store.
pub struct TranslatorSettings {
    working_dir: PathBuf,
    default_lcid: u32,
    originally_preferred_lcid: u32,
    preferred_lcid: AtomicU32,
    catalogs: Vec<InstalledCatalog>,
}

impl TranslatorSettings {
    /// Loads settings from `<working_dir>/settings.uts`.
    pub fn load(working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        let path = working_dir.join(SETTINGS_FILE_NAME);

        let data = match File::open(&path) {
            Ok(file) => decode_uts(file),
            Err(err) => {
                log::warn!("no settings loaded from {path:?}: {err}");
                Default::default()
            }
        };

        Self {
            working_dir,
            default_lcid: data.default_lcid,
            originally_preferred_lcid: data.preferred_lcid,
            preferred_lcid: AtomicU32::new(data.preferred_lcid),
            catalogs: data.catalogs,
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// `<working_dir>/locale`, where installed catalog files live.
    pub fn catalogs_directory(&self) -> PathBuf {
        self.working_dir.join("locale")
    }

    pub fn default_lcid(&self) -> u32 {
        self.default_lcid
    }

    pub fn preferred_lcid(&self) -> u32 {
        self.preferred_lcid.load(Ordering::Relaxed)
    }

    pub fn set_preferred_lcid(&self, lcid: u32) {
        self.preferred_lcid.store(lcid, Ordering::Relaxed);
    }

    pub fn installed_catalogs(&self) -> &[InstalledCatalog] {
        &self.catalogs
    }

    pub fn is_catalog_installed(&self, name: &str) -> bool {
        self.catalogs.iter().any(|c| c.name == name)
    }

    /// Reverts `preferred_lcid` to the value it had at load time, suppressing
    /// the persist-on-drop step.
    pub fn discard_changes(&self) {
        self.preferred_lcid
            .store(self.originally_preferred_lcid, Ordering::Relaxed);
    }

    fn changed(&self) -> bool {
        self.preferred_lcid() != self.originally_preferred_lcid
    }
}

impl Drop for TranslatorSettings {
    fn drop(&mut self) {
        if !self.changed() {
            return;
        }

        let path = self.working_dir.join(SETTINGS_FILE_NAME);
        let result = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new().write(true).open(&path)?;
            file.seek(SeekFrom::Start(PREFERRED_LCID_OFFSET))?;
            file.write_all(&self.preferred_lcid().to_le_bytes())?;
            Ok(())
        })();

        if let Err(err) = result {
            log::error!("failed to persist preferred LCID to {path:?}: {err}");
        }
    }
}
