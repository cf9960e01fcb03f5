//! File system based repository implementation
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/rules/<id>.json     {"id": 1, "rule_string": "...", "rule_tree": {...}}
//! <root>/records/<id>.json   {"id": 1, "attributes": {...}}
//! ```
//!
//! Documents are written to a temporary file and renamed into place, so a
//! reader never sees a half-written document. A failed write removes the
//! temporary file and leaves the id free for the next store.

use async_trait::async_trait;
use path_absolutize::Absolutize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use verdict_core::serializer::read_json;
use verdict_core::{AttributeContext, PersistedTree};

use crate::models::IdSequence;
use crate::{
    RecordId, RepositoryError, RepositoryResult, RuleId, RuleRepository, StoredRecord, StoredRule,
};

const RULES_DIR: &str = "rules";
const RECORDS_DIR: &str = "records";

/// File system based repository
pub struct FileSystemRepository {
    /// Root path of the repository
    root_path: PathBuf,
    /// Allocates rule ids; held across the write so ids land in order
    rule_ids: Mutex<IdSequence>,
    /// Allocates record ids
    record_ids: Mutex<IdSequence>,
}

impl FileSystemRepository {
    /// Open a repository rooted at `root_path`, creating its directories.
    ///
    /// Id allocation resumes after the highest id already on disk.
    pub async fn open<P: AsRef<Path>>(root_path: P) -> RepositoryResult<Self> {
        let path = root_path.as_ref();
        let root_path = path
            .absolutize()
            .map_err(|_| RepositoryError::InvalidPath {
                path: path.to_path_buf(),
            })?
            .to_path_buf();

        fs::create_dir_all(root_path.join(RULES_DIR)).await?;
        fs::create_dir_all(root_path.join(RECORDS_DIR)).await?;

        let last_rule = Self::highest_id(&root_path.join(RULES_DIR)).await?;
        let last_record = Self::highest_id(&root_path.join(RECORDS_DIR)).await?;

        tracing::info!(
            "Opened file system repository at {} ({} rules, {} records)",
            root_path.display(),
            last_rule,
            last_record
        );

        Ok(Self {
            root_path,
            rule_ids: Mutex::new(IdSequence::after(last_rule)),
            record_ids: Mutex::new(IdSequence::after(last_record)),
        })
    }

    /// Absolute root directory of the repository
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn document_path(&self, dir: &str, id: u64) -> PathBuf {
        self.root_path.join(dir).join(format!("{}.json", id))
    }

    /// Highest numeric file stem among `<n>.json` files in `dir`
    async fn highest_id(dir: &Path) -> RepositoryResult<u64> {
        let mut highest = 0;
        let mut entries = fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok())
            {
                highest = highest.max(id);
            }
        }
        Ok(highest)
    }

    async fn write_document<T: Serialize>(&self, path: &Path, document: &T) -> RepositoryResult<()> {
        let text = serde_json::to_string_pretty(document)?;
        let tmp_path = path.with_extension("json.tmp");

        let written = match fs::write(&tmp_path, text).await {
            Ok(()) => fs::rename(&tmp_path, path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            match fs::remove_file(&tmp_path).await {
                Ok(()) => {}
                Err(cleanup) if cleanup.kind() == ErrorKind::NotFound => {}
                Err(cleanup) => {
                    tracing::warn!("Could not remove {}: {}", tmp_path.display(), cleanup)
                }
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn read_document<T: DeserializeOwned>(&self, path: &Path) -> RepositoryResult<Option<T>> {
        let text = match fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        read_json(&text)
            .map(Some)
            .map_err(|e| RepositoryError::corrupt(path.display().to_string(), e))
    }
}

#[async_trait]
impl RuleRepository for FileSystemRepository {
    async fn store_rule(&self, rule_string: &str, rule_tree: PersistedTree) -> RepositoryResult<RuleId> {
        let mut ids = self.rule_ids.lock().await;
        let id = RuleId(ids.peek().ok_or(RepositoryError::IdsExhausted)?);

        let document = StoredRule {
            id,
            rule_string: rule_string.to_string(),
            rule_tree,
        };
        let path = self.document_path(RULES_DIR, id.0);
        self.write_document(&path, &document).await?;
        ids.commit();

        tracing::debug!("Stored rule {} at {}", id, path.display());
        Ok(id)
    }

    async fn fetch_rule(&self, id: RuleId) -> RepositoryResult<Option<StoredRule>> {
        let path = self.document_path(RULES_DIR, id.0);
        let rule: Option<StoredRule> = self.read_document(&path).await?;

        match rule {
            Some(rule) if rule.id != id => Err(RepositoryError::corrupt(
                path.display().to_string(),
                format!("document holds rule {}", rule.id),
            )),
            other => Ok(other),
        }
    }

    async fn store_record(&self, attributes: AttributeContext) -> RepositoryResult<RecordId> {
        let mut ids = self.record_ids.lock().await;
        let id = RecordId(ids.peek().ok_or(RepositoryError::IdsExhausted)?);

        let document = StoredRecord { id, attributes };
        let path = self.document_path(RECORDS_DIR, id.0);
        self.write_document(&path, &document).await?;
        ids.commit();

        tracing::debug!("Stored record {} at {}", id, path.display());
        Ok(id)
    }

    async fn fetch_record(&self, id: RecordId) -> RepositoryResult<Option<AttributeContext>> {
        let path = self.document_path(RECORDS_DIR, id.0);
        let record: Option<StoredRecord> = self.read_document(&path).await?;

        match record {
            Some(record) if record.id != id => Err(RepositoryError::corrupt(
                path.display().to_string(),
                format!("document holds record {}", record.id),
            )),
            Some(record) => Ok(Some(record.attributes)),
            None => Ok(None),
        }
    }

    fn backend_name(&self) -> &'static str {
        "file_system"
    }
}
