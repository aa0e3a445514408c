//! Repeatable-record editor shared by the education and work-experience
//! sections.
//!
//! The editor holds the section's list, an edit cursor and at most one
//! pending file. Every mutation is written to the document store first and
//! applied to the local list only once the write is acknowledged, so a failed
//! write leaves the editor exactly as it was.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::models::{read_record, EducationRecord, ProfileSection, WorkRecord};
use super::repository::ProfileRepository;
use super::validation::{validate_education, validate_work};
use crate::documents::{StoreError, UpdateDocument};
use crate::errors::AppError;
use crate::uploads::{FileUploader, UploadFile, UploadMeta};

/// One entry of a repeatable section, with its discriminant-dependent
/// validation and a single attached-file slot.
pub trait SectionRecord: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const SECTION: ProfileSection;
    /// Name of the file field inside the record.
    const FILE_FIELD: &'static str;

    fn validate(&self) -> Result<(), AppError>;
    fn file(&self) -> Option<&str>;
    fn set_file(&mut self, path: Option<String>);
}

impl SectionRecord for EducationRecord {
    const SECTION: ProfileSection = ProfileSection::Education;
    const FILE_FIELD: &'static str = "document";

    fn validate(&self) -> Result<(), AppError> {
        validate_education(self)
    }

    fn file(&self) -> Option<&str> {
        self.document.as_deref()
    }

    fn set_file(&mut self, path: Option<String>) {
        self.document = path;
    }
}

impl SectionRecord for WorkRecord {
    const SECTION: ProfileSection = ProfileSection::Work;
    const FILE_FIELD: &'static str = "certificate";

    fn validate(&self) -> Result<(), AppError> {
        validate_work(self)
    }

    fn file(&self) -> Option<&str> {
        self.certificate.as_deref()
    }

    fn set_file(&mut self, path: Option<String>) {
        self.certificate = path;
    }
}

/// At most one record is being added or edited at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCursor {
    Idle,
    Adding,
    Editing(usize),
}

/// What a client should render for the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "index", rename_all = "snake_case")]
pub enum EditorView {
    AddForm,
    EditForm(usize),
    List,
}

/// One stored list element: the JSON exactly as stored, plus its typed
/// reading when it still fits the record type.
#[derive(Debug, Clone)]
struct Entry<R> {
    raw: Value,
    record: Option<R>,
}

/// Editor over one repeatable section.
///
/// Writes are computed from the stored JSON rather than the typed records,
/// so fields the record type does not model survive every operation and
/// entries other than the one being changed are written back verbatim.
pub struct RecordEditor<R: SectionRecord> {
    entries: Vec<Entry<R>>,
    cursor: EditCursor,
    pending_file: Option<UploadFile>,
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(value).map_err(StoreError::from)?)
}

/// Overlays the fields of `record` on the stored object, keeping stored keys
/// the record does not carry.
fn merge_into(stored: &Value, record: Value) -> Value {
    match (stored, record) {
        (Value::Object(stored), Value::Object(fields)) => {
            let mut merged = stored.clone();
            merged.extend(fields);
            Value::Object(merged)
        }
        (_, record) => record,
    }
}

fn set_field(raw: &mut Value, field: &str, value: Value) {
    if let Value::Object(map) = raw {
        map.insert(field.to_string(), value);
    }
}

impl<R: SectionRecord> RecordEditor<R> {
    /// Builds the editor from the stored list elements.
    pub fn new(raw: Vec<Value>) -> Self {
        let entries = raw
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Entry {
                record: read_record(R::SECTION, index, &raw),
                raw,
            })
            .collect();
        Self {
            entries,
            cursor: EditCursor::Idle,
            pending_file: None,
        }
    }

    pub async fn load(repo: &ProfileRepository) -> Result<Self, AppError> {
        let stored: Value = repo.load(R::SECTION.path()).await?;
        let raw = match stored {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                warn!(
                    "{} for user {} is not a list ({other}); treating it as empty",
                    R::SECTION.path(),
                    repo.session().user_id
                );
                Vec::new()
            }
        };
        Ok(Self::new(raw))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The typed record at `index`, or `None` when it is out of range or
    /// unreadable.
    pub fn record(&self, index: usize) -> Option<&R> {
        self.entries.get(index)?.record.as_ref()
    }

    /// Readable records in list order. Unreadable entries are skipped.
    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.entries.iter().filter_map(|e| e.record.as_ref())
    }

    /// Every entry in stored order; unreadable ones are `None` so indices
    /// stay aligned with the stored list.
    pub fn into_entries(self) -> Vec<Option<R>> {
        self.entries.into_iter().map(|e| e.record).collect()
    }

    pub fn cursor(&self) -> EditCursor {
        self.cursor
    }

    pub fn pending_file(&self) -> Option<&UploadFile> {
        self.pending_file.as_ref()
    }

    pub fn view(&self) -> EditorView {
        match self.cursor {
            EditCursor::Editing(index) => EditorView::EditForm(index),
            EditCursor::Adding => EditorView::AddForm,
            EditCursor::Idle if self.entries.is_empty() => EditorView::AddForm,
            EditCursor::Idle => EditorView::List,
        }
    }

    /// Completion status: at least one saved record passes validation.
    pub fn is_complete(&self) -> bool {
        self.records().any(|r| r.validate().is_ok())
    }

    fn check_index(&self, index: usize) -> Result<(), AppError> {
        if index < self.entries.len() {
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "{} entry {} not found",
                R::SECTION.label(),
                index.saturating_add(1)
            )))
        }
    }

    fn readable(&self, index: usize) -> Result<&R, AppError> {
        self.check_index(index)?;
        self.entries[index].record.as_ref().ok_or_else(|| {
            AppError::Validation(format!(
                "{} entry {} could not be read; replace or delete it",
                R::SECTION.label(),
                index + 1
            ))
        })
    }

    /// Starts a new add, dropping any edit in progress and any pending file.
    pub fn begin_add(&mut self) {
        self.cursor = EditCursor::Adding;
        self.pending_file = None;
    }

    /// Starts editing `index`, dropping any other edit and any pending file.
    /// An unreadable entry can still be edited; saving replaces it.
    pub fn begin_edit(&mut self, index: usize) -> Result<Option<&R>, AppError> {
        self.check_index(index)?;
        self.cursor = EditCursor::Editing(index);
        self.pending_file = None;
        Ok(self.entries[index].record.as_ref())
    }

    pub fn cancel(&mut self) {
        self.cursor = EditCursor::Idle;
        self.pending_file = None;
    }

    /// Holds a local file to be uploaded with the next save.
    pub fn select_file(&mut self, file: UploadFile) {
        self.pending_file = Some(file);
    }

    fn finish(&mut self) {
        self.cursor = EditCursor::Idle;
        self.pending_file = None;
    }

    async fn upload(
        &self,
        repo: &ProfileRepository,
        uploader: &dyn FileUploader,
        index: usize,
        file: UploadFile,
    ) -> Result<String, AppError> {
        let session = repo.session();
        let meta = UploadMeta {
            owner_id: session.user_id.clone(),
            section: R::SECTION.path().to_string(),
            record_index: index,
        };
        let stored = uploader.upload(&session.token, file, &meta).await?;
        Ok(stored.path)
    }

    /// Sends `update`. When a file was uploaded for it and the write fails,
    /// the stored file is left without a reference and is logged.
    async fn write(
        repo: &ProfileRepository,
        update: UpdateDocument,
        upsert: bool,
        uploaded: Option<&str>,
    ) -> Result<(), AppError> {
        if let Err(e) = repo.apply(update, upsert).await {
            if let Some(path) = uploaded {
                warn!(
                    "Uploaded file {path} is unreferenced: {} write for user {} failed ({e})",
                    R::SECTION.path(),
                    repo.session().user_id
                );
            }
            return Err(e);
        }
        Ok(())
    }

    /// Creates or updates depending on the cursor. Returns the saved index.
    pub async fn save(
        &mut self,
        repo: &ProfileRepository,
        uploader: &dyn FileUploader,
        record: R,
    ) -> Result<usize, AppError> {
        match self.cursor {
            EditCursor::Editing(index) => {
                self.update(repo, uploader, index, record).await?;
                Ok(index)
            }
            EditCursor::Idle | EditCursor::Adding => self.create(repo, uploader, record).await,
        }
    }

    /// Appends `record` with a `$push`. Returns its index.
    pub async fn create(
        &mut self,
        repo: &ProfileRepository,
        uploader: &dyn FileUploader,
        mut record: R,
    ) -> Result<usize, AppError> {
        record.validate()?;
        let index = self.entries.len();

        let mut uploaded = None;
        if let Some(file) = self.pending_file.clone() {
            let path = self.upload(repo, uploader, index, file).await?;
            record.set_file(Some(path.clone()));
            uploaded = Some(path);
        }

        let raw = to_value(&record)?;
        let update = UpdateDocument::new().push(R::SECTION.path(), raw.clone());
        Self::write(repo, update, true, uploaded.as_deref()).await?;

        self.entries.push(Entry {
            raw,
            record: Some(record),
        });
        self.finish();
        info!(
            "Added {} entry {} for user {}",
            R::SECTION.path(),
            index,
            repo.session().user_id
        );
        Ok(index)
    }

    /// Replaces the record at `index` in place with a `$set` on `<path>.<index>`.
    /// Stored fields the record type does not model are kept. An incoming
    /// record without a file keeps the stored one; detaching is explicit.
    pub async fn update(
        &mut self,
        repo: &ProfileRepository,
        uploader: &dyn FileUploader,
        index: usize,
        mut record: R,
    ) -> Result<(), AppError> {
        self.check_index(index)?;
        record.validate()?;

        let mut uploaded = None;
        if let Some(file) = self.pending_file.clone() {
            let path = self.upload(repo, uploader, index, file).await?;
            record.set_file(Some(path.clone()));
            uploaded = Some(path);
        } else if record.file().is_none() {
            let stored_file = self.entries[index]
                .raw
                .get(R::FILE_FIELD)
                .and_then(Value::as_str)
                .map(str::to_string);
            record.set_file(stored_file);
        }

        let raw = merge_into(&self.entries[index].raw, to_value(&record)?);
        let path = format!("{}.{}", R::SECTION.path(), index);
        Self::write(
            repo,
            UpdateDocument::new().set(path, raw.clone()),
            false,
            uploaded.as_deref(),
        )
        .await?;

        self.entries[index] = Entry {
            raw,
            record: Some(record),
        };
        self.finish();
        info!(
            "Updated {} entry {} for user {}",
            R::SECTION.path(),
            index,
            repo.session().user_id
        );
        Ok(())
    }

    /// Removes the entry at `index` by writing back the reduced stored list.
    /// Later entries shift down by one. Returns the removed record when it was
    /// readable.
    pub async fn delete(
        &mut self,
        repo: &ProfileRepository,
        index: usize,
    ) -> Result<Option<R>, AppError> {
        self.check_index(index)?;

        let reduced: Vec<Value> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, entry)| entry.raw.clone())
            .collect();
        Self::write(
            repo,
            UpdateDocument::new().set(R::SECTION.path(), Value::Array(reduced)),
            false,
            None,
        )
        .await?;

        let removed = self.entries.remove(index);
        self.cursor = match self.cursor {
            EditCursor::Editing(i) if i == index => EditCursor::Idle,
            EditCursor::Editing(i) if i > index => EditCursor::Editing(i - 1),
            other => other,
        };
        info!(
            "Deleted {} entry {} for user {}",
            R::SECTION.path(),
            index,
            repo.session().user_id
        );
        Ok(removed.record)
    }

    /// Uploads `file` and stores its reference in the record's file field only.
    pub async fn attach_file(
        &mut self,
        repo: &ProfileRepository,
        uploader: &dyn FileUploader,
        index: usize,
        file: UploadFile,
    ) -> Result<String, AppError> {
        self.readable(index)?;
        let stored = self.upload(repo, uploader, index, file).await?;

        let path = format!("{}.{}.{}", R::SECTION.path(), index, R::FILE_FIELD);
        Self::write(
            repo,
            UpdateDocument::new().set(path, Value::String(stored.clone())),
            false,
            Some(stored.as_str()),
        )
        .await?;

        let entry = &mut self.entries[index];
        set_field(&mut entry.raw, R::FILE_FIELD, Value::String(stored.clone()));
        if let Some(record) = entry.record.as_mut() {
            record.set_file(Some(stored.clone()));
        }
        Ok(stored)
    }

    /// Clears the record's file field, leaving sibling fields untouched.
    /// Returns `false` when there was nothing to detach.
    pub async fn detach_file(
        &mut self,
        repo: &ProfileRepository,
        index: usize,
    ) -> Result<bool, AppError> {
        if self.readable(index)?.file().is_none() {
            return Ok(false);
        }

        let path = format!("{}.{}.{}", R::SECTION.path(), index, R::FILE_FIELD);
        Self::write(repo, UpdateDocument::new().set(path, Value::Null), false, None).await?;

        let entry = &mut self.entries[index];
        set_field(&mut entry.raw, R::FILE_FIELD, Value::Null);
        if let Some(record) = entry.record.as_mut() {
            record.set_file(None);
        }
        Ok(true)
    }
}
