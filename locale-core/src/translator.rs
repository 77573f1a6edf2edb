//! Catalog selection and message retrieval, guarded by a reader/writer lock
//! so lookups and catalog swaps can proceed concurrently from many threads.

use std::path::PathBuf;
use std::sync::RwLock;

use crate::format::{format_string, is_formattable, FormatArgs};
use crate::settings::TranslatorSettings;
use crate::sysloc::SystemLocale;
use crate::umc::MessageCatalog;

const DEFAULT_FALLBACK_MESSAGE: &str = "???";

/// Tracks how the translator arrived at its current catalog, for
/// logging/assertions only — never exposed as public mutable state beyond
/// what `catalog_lcid().is_some()` already reveals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TranslatorStateKind {
    Uninitialized,
    OpenCatalog,
    NoCatalog,
}

struct TranslatorState {
    kind: TranslatorStateKind,
    catalog: Option<MessageCatalog>,
    fallback_message: String,
}

/// Resolves the best catalog for the current locale preferences and serves
/// formatted messages with a single shared fallback.
///
/// Construction cannot fail: any error during auto-selection is logged and
/// swallowed, degrading to "no catalog open" rather than propagating.
pub struct Translator {
    settings: TranslatorSettings,
    state: RwLock<TranslatorState>,
}

impl Translator {
    pub fn new(working_dir: impl Into<PathBuf>, sysloc: &dyn SystemLocale) -> Self {
        let settings = TranslatorSettings::load(working_dir);
        let mut state = TranslatorState {
            kind: TranslatorStateKind::Uninitialized,
            catalog: None,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
        };

        for lcid in preference_order(&settings, sysloc) {
            if lcid == 0 {
                continue;
            }
            let Some(name) = find_catalog_name_by_lcid(&settings, lcid) else {
                continue;
            };
            let path = settings.catalogs_directory().join(&name);
            match MessageCatalog::open(&path) {
                Ok(catalog) => {
                    state.catalog = Some(catalog);
                    state.kind = TranslatorStateKind::OpenCatalog;
                    break;
                }
                Err(err) => {
                    log::warn!("failed to open candidate catalog {path:?}: {err:#}");
                }
            }
        }

        if state.kind == TranslatorStateKind::Uninitialized {
            state.kind = TranslatorStateKind::NoCatalog;
        }

        Self {
            settings,
            state: RwLock::new(state),
        }
    }

    pub fn settings(&self) -> &TranslatorSettings {
        &self.settings
    }

    /// The LCID of the currently open catalog, or `None` if no catalog is
    /// open.
    pub fn catalog_lcid(&self) -> Option<u32> {
        self.state.read().unwrap().catalog.as_ref().map(|c| c.lcid())
    }

    pub fn fallback_message(&self) -> String {
        self.state.read().unwrap().fallback_message.clone()
    }

    pub fn set_fallback_message(&self, message: impl Into<String>) {
        self.state.write().unwrap().fallback_message = message.into();
    }

    /// Closes any currently open catalog and opens `<catalogs_directory>/name`.
    /// Returns whether the new catalog is valid.
    pub fn use_catalog(&self, name: &str) -> bool {
        let mut state = self.state.write().unwrap();
        state.catalog = None;

        let path = self.settings.catalogs_directory().join(name);
        match MessageCatalog::open(&path) {
            Ok(catalog) => {
                state.catalog = Some(catalog);
                state.kind = TranslatorStateKind::OpenCatalog;
                true
            }
            Err(err) => {
                log::warn!("use_catalog({name:?}) failed: {err:#}");
                state.kind = TranslatorStateKind::NoCatalog;
                false
            }
        }
    }

    /// Resolves `id` against the open catalog and applies `{%N}` formatting.
    /// Every failure mode (no catalog, lookup miss, decode failure, a
    /// formatting failure) collapses to the fallback message.
    pub fn get_message(&self, id: &str, args: &FormatArgs<'_>) -> String {
        let state = self.state.read().unwrap();
        let Some(catalog) = state.catalog.as_ref() else {
            log::debug!("get_message({id:?}): no catalog open, serving fallback");
            return state.fallback_message.clone();
        };

        let Some(raw) = catalog.raw_message(id) else {
            log::debug!("get_message({id:?}): lookup miss, serving fallback");
            return state.fallback_message.clone();
        };

        if !is_formattable(raw) {
            return raw.to_string();
        }

        let formatted = format_string(raw, args);
        if formatted.is_empty() {
            log::debug!("get_message({id:?}): formatting failed, serving fallback");
            return state.fallback_message.clone();
        }

        formatted
    }
}

fn preference_order(settings: &TranslatorSettings, sysloc: &dyn SystemLocale) -> Vec<u32> {
    let candidates = [
        settings.preferred_lcid(),
        settings.default_lcid(),
        sysloc.system_preferred_lcid(),
        sysloc.system_default_lcid(),
    ];

    let mut ordered = Vec::with_capacity(candidates.len());
    for lcid in candidates {
        if !ordered.contains(&lcid) {
            ordered.push(lcid);
        }
    }
    ordered
}

fn find_catalog_name_by_lcid(settings: &TranslatorSettings, lcid: u32) -> Option<String> {
    settings
        .installed_catalogs()
        .iter()
        .find(|c| c.lcid == lcid)
        .map(|c| c.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sysloc::NullSystemLocale;
    use crate::test_support::build_umc_bytes;
    use std::fs;

    fn write_catalog(dir: &std::path::Path, name: &str, lcid: u32, messages: &[(&str, &str)]) {
        fs::create_dir_all(dir).unwrap();
        let bytes = build_umc_bytes("en-US", lcid, messages);
        fs::write(dir.join(name), bytes).unwrap();
    }

    #[test]
    fn preference_order_dedups_keeping_earliest() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = crate::test_support::build_uts_bytes(0x409, 0x409, &[]);
        fs::write(dir.path().join("settings.uts"), bytes).unwrap();
        let settings = TranslatorSettings::load(dir.path());
        let order = preference_order(&settings, &NullSystemLocale);
        assert_eq!(order, vec![0x409, 0]);
    }

    #[test]
    fn with_no_settings_file_translator_serves_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let tr = Translator::new(dir.path(), &NullSystemLocale);
        assert_eq!(tr.catalog_lcid(), None);
        assert_eq!(tr.get_message("hello", &FormatArgs::new()), "???");
    }

    #[test]
    fn auto_selects_preferred_catalog_and_serves_its_messages() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            &dir.path().join("locale"),
            "en-US.umc",
            0x409,
            &[("greeting", "hello {%0}")],
        );
        let uts = crate::test_support::build_uts_bytes(0x409, 0x409, &[("en-US.umc", 0x409)]);
        fs::write(dir.path().join("settings.uts"), uts).unwrap();

        let tr = Translator::new(dir.path(), &NullSystemLocale);
        assert_eq!(tr.catalog_lcid(), Some(0x409));

        let args: FormatArgs = ["world"].into();
        assert_eq!(tr.get_message("greeting", &args), "hello world");
    }

    #[test]
    fn missing_message_id_serves_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(&dir.path().join("locale"), "en-US.umc", 0x409, &[]);
        let uts = crate::test_support::build_uts_bytes(0x409, 0x409, &[("en-US.umc", 0x409)]);
        fs::write(dir.path().join("settings.uts"), uts).unwrap();

        let tr = Translator::new(dir.path(), &NullSystemLocale);
        assert_eq!(tr.get_message("absent", &FormatArgs::new()), "???");
    }

    #[test]
    fn use_catalog_switches_the_active_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let locale_dir = dir.path().join("locale");
        write_catalog(&locale_dir, "en-US.umc", 0x409, &[("hi", "hi")]);
        write_catalog(&locale_dir, "pl-PL.umc", 0x415, &[("hi", "czesc")]);
        let uts = crate::test_support::build_uts_bytes(
            0x409,
            0x409,
            &[("en-US.umc", 0x409), ("pl-PL.umc", 0x415)],
        );
        fs::write(dir.path().join("settings.uts"), uts).unwrap();

        let tr = Translator::new(dir.path(), &NullSystemLocale);
        assert_eq!(tr.get_message("hi", &FormatArgs::new()), "hi");

        assert!(tr.use_catalog("pl-PL.umc"));
        assert_eq!(tr.get_message("hi", &FormatArgs::new()), "czesc");
    }

    #[test]
    fn use_catalog_failure_leaves_no_catalog_open() {
        let dir = tempfile::tempdir().unwrap();
        let uts = crate::test_support::build_uts_bytes(0, 0, &[]);
        fs::write(dir.path().join("settings.uts"), uts).unwrap();

        let tr = Translator::new(dir.path(), &NullSystemLocale);
        assert!(!tr.use_catalog("missing.umc"));
        assert_eq!(tr.catalog_lcid(), None);
    }

    #[test]
    fn non_formattable_message_is_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            &dir.path().join("locale"),
            "en-US.umc",
            0x409,
            &[("plain", "no specifiers here")],
        );
        let uts = crate::test_support::build_uts_bytes(0x409, 0x409, &[("en-US.umc", 0x409)]);
        fs::write(dir.path().join("settings.uts"), uts).unwrap();

        let tr = Translator::new(dir.path(), &NullSystemLocale);
        assert_eq!(
            tr.get_message("plain", &FormatArgs::new()),
            "no specifiers here"
        );
    }

    #[test]
    fn formatting_failure_serves_fallback() {
        let dir = tempfile::tempdir().unwrap();
        write_catalog(
            &dir.path().join("locale"),
            "en-US.umc",
            0x409,
            &[("needs_arg", "value: {%0}")],
        );
        let uts = crate::test_support::build_uts_bytes(0x409, 0x409, &[("en-US.umc", 0x409)]);
        fs::write(dir.path().join("settings.uts"), uts).unwrap();

        let tr = Translator::new(dir.path(), &NullSystemLocale);
        assert_eq!(tr.get_message("needs_arg", &FormatArgs::new()), "???");
    }

    #[test]
    fn custom_fallback_message_is_honored() {
        let dir = tempfile::tempdir().unwrap();
        let tr = Translator::new(dir.path(), &NullSystemLocale);
        tr.set_fallback_message("N/A");
        assert_eq!(tr.fallback_message(), "N/A");
        assert_eq!(tr.get_message("anything", &FormatArgs::new()), "N/A");
    }
}
