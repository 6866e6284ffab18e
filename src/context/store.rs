//! File-backed merchant context store
//!
//! One pretty-printed JSON file per merchant, named `memory_<name>.json`.

use super::ContextError;
use super::model::{MerchantContext, STAGE_LEAD, STAGE_UNKNOWN};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Merchant name treated as "no merchant" on save
const UNKNOWN_NAME: &str = "unknown";

#[derive(Debug, Clone)]
pub struct ContextStore {
    dir: PathBuf,
}

impl ContextStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name for `merchant_name`
    ///
    /// Lower-cased, with every character other than alphanumerics, `-` and
    /// `_` replaced by `_`, so the name never leaves the store directory.
    pub fn file_name(merchant_name: &str) -> String {
        let stem: String = merchant_name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("memory_{stem}.json")
    }

    pub fn path_for(&self, merchant_name: &str) -> PathBuf {
        self.dir.join(Self::file_name(merchant_name))
    }

    /// Load the stored context for `merchant_name`
    ///
    /// A missing file yields a fresh `Lead` context and an unreadable one a
    /// context at stage `Desconocido`; neither is an error.
    pub fn load(&self, merchant_name: &str) -> MerchantContext {
        let path = self.path_for(merchant_name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) if !path.exists() => return MerchantContext::base(merchant_name, STAGE_LEAD),
            Err(e) => {
                warn!(path = %path.display(), "Failed to read merchant context: {}", e);
                return MerchantContext::base(merchant_name, STAGE_UNKNOWN);
            }
        };

        match serde_json::from_str(&content) {
            Ok(context) => context,
            Err(e) => {
                warn!(path = %path.display(), "Corrupt merchant context: {}", e);
                MerchantContext::base(merchant_name, STAGE_UNKNOWN)
            }
        }
    }

    /// Persist `context`, returning the file written
    ///
    /// Contexts without a merchant name are not saved and yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Fails if the directory or file cannot be written.
    pub fn save(&self, context: &MerchantContext) -> Result<Option<PathBuf>, ContextError> {
        let name = context.merchant_name.trim();
        if name.is_empty() || name == UNKNOWN_NAME {
            warn!("Merchant context has no merchant name; not saving");
            return Ok(None);
        }

        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        fs::write(&path, serde_json::to_string_pretty(context)?)?;

        info!(merchant = name, path = %path.display(), "Saved merchant context");
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_name() {
        assert_eq!(ContextStore::file_name("Zoop"), "memory_zoop.json");
        assert_eq!(
            ContextStore::file_name("Mercado Pago MX"),
            "memory_mercado_pago_mx.json"
        );
        assert_eq!(ContextStore::file_name("Zoop S/A"), "memory_zoop_s_a.json");
        assert_eq!(ContextStore::file_name("../Zoop"), "memory____zoop.json");
        assert_eq!(ContextStore::file_name("Pagos-Ñu"), "memory_pagos-ñu.json");
    }

    #[test]
    fn test_save_name_with_separator_stays_in_dir() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path());
        let context = MerchantContext::base("Zoop S/A", "Negociación");

        let path = store.save(&context).unwrap().unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert!(path.ends_with("memory_zoop_s_a.json"));
        assert_eq!(store.load("Zoop S/A"), context);
    }

    #[test]
    fn test_load_keeps_stage_when_file_has_nulls() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path());
        fs::write(
            store.path_for("Zoop"),
            r#"{"merchant_name": "Zoop", "lifecycle_stage": "Integración", "pending_tasks": null}"#,
        )
        .unwrap();

        let context = store.load("Zoop");
        assert_eq!(context.lifecycle_stage, "Integración");
        assert!(context.pending_tasks.is_empty());
    }

    #[test]
    fn test_load_missing_is_lead() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path());
        let context = store.load("Zoop");
        assert_eq!(context, MerchantContext::base("Zoop", STAGE_LEAD));
    }

    #[test]
    fn test_load_corrupt_is_unknown_stage() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path());
        fs::write(store.path_for("Zoop"), "{ not json").unwrap();

        let context = store.load("Zoop");
        assert_eq!(context.merchant_name, "Zoop");
        assert_eq!(context.lifecycle_stage, STAGE_UNKNOWN);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path().join("nested"));
        let mut context = MerchantContext::base("Zoop Brasil", "Negociación");
        context.pending_tasks.push("Confirmar PSE".into());

        let path = store.save(&context).unwrap().unwrap();
        assert_eq!(path, store.path_for("Zoop Brasil"));
        assert!(path.ends_with("memory_zoop_brasil.json"));

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("Negociación"), "non-ASCII kept as is");
        assert_eq!(store.load("Zoop Brasil"), context);
    }

    #[test]
    fn test_save_without_name_is_skipped() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path());

        assert_eq!(store.save(&MerchantContext::default()).unwrap(), None);
        assert_eq!(
            store
                .save(&MerchantContext::base("unknown", STAGE_LEAD))
                .unwrap(),
            None
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
