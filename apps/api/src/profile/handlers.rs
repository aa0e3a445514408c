//! Axum route handlers for the profile sections.
//!
//! Handlers are generic over the section type so every single-valued section
//! shares one load/save pair and both repeatable sections share one set of
//! record operations.

use axum::{
    async_trait,
    extract::{
        multipart::{Field, MultipartError},
        FromRequest, Multipart, Path, Request, State,
    },
    http::header::CONTENT_TYPE,
    Json,
};
use serde::Serialize;
use tracing::info;

use super::completion::{compute_completion_report, CompletionReport};
use super::records::EditorView;
use super::{RecordEditor, SectionData, SectionRecord};
use crate::auth::Session;
use crate::documents::{StoreError, UpdateDocument};
use crate::errors::AppError;
use crate::notify::Notice;
use crate::state::AppState;
use crate::uploads::UploadFile;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

/// Section payload plus the toast to show and the completion status to
/// report upward.
#[derive(Debug, Serialize)]
pub struct SectionResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub completed: bool,
}

/// List payload for a repeatable section. Unreadable stored entries are
/// `null` so indices match the stored list.
#[derive(Debug, Serialize)]
pub struct RecordsResponse<R> {
    pub data: Vec<Option<R>>,
    pub view: EditorView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct FileResponse {
    pub index: usize,
    pub path: Option<String>,
    pub notice: Notice,
}

fn records_response<R: SectionRecord>(
    editor: RecordEditor<R>,
    notice: Option<Notice>,
) -> Json<RecordsResponse<R>> {
    let completed = editor.is_complete();
    let view = editor.view();
    Json(RecordsResponse {
        data: editor.into_entries(),
        view,
        notice,
        completed,
    })
}

/// Body of a record create or update: plain JSON, or a multipart form with
/// the record as JSON text in `record` and an optional `file` to attach.
pub struct RecordForm<R> {
    pub record: R,
    pub file: Option<UploadFile>,
}

#[async_trait]
impl<S, R> FromRequest<S> for RecordForm<R>
where
    S: Send + Sync,
    R: SectionRecord,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(record) = Json::<R>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            return Ok(RecordForm { record, file: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        let mut record = None;
        let mut file = None;
        while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("record") => {
                    let text = field.text().await.map_err(invalid_upload)?;
                    let parsed = serde_json::from_str::<R>(&text).map_err(|e| {
                        AppError::Validation(format!("Invalid {} entry: {e}", R::SECTION.label()))
                    })?;
                    record = Some(parsed);
                }
                Some("file") => file = Some(read_file_field(field).await?),
                _ => {}
            }
        }

        let record = record.ok_or_else(|| {
            AppError::Validation(format!("{} entry is required", R::SECTION.label()))
        })?;
        Ok(RecordForm { record, file })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Single-valued sections
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/profile/{basic,about,skills,personal}
pub async fn handle_get_section<T: SectionData>(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<SectionResponse<T>>, AppError> {
    let repo = state.repository(session);
    let data: T = repo.load(T::SECTION.path()).await?;
    let completed = data.is_complete();
    Ok(Json(SectionResponse {
        data,
        notice: None,
        completed,
    }))
}

/// PUT /api/v1/profile/{basic,about,skills,personal}
pub async fn handle_put_section<T: SectionData>(
    State(state): State<AppState>,
    session: Session,
    Json(mut data): Json<T>,
) -> Result<Json<SectionResponse<T>>, AppError> {
    data.normalize();
    data.validate()?;

    let repo = state.repository(session);
    let value = serde_json::to_value(&data).map_err(StoreError::from)?;
    repo.apply(UpdateDocument::new().set(T::SECTION.path(), value), true)
        .await?;
    info!(
        "Saved {} for user {}",
        T::SECTION.path(),
        repo.session().user_id
    );

    Ok(Json(SectionResponse {
        data,
        notice: Some(Notice::success(format!(
            "{} saved",
            T::SECTION.label()
        ))),
        completed: true,
    }))
}

/// GET /api/v1/profile/completion
pub async fn handle_completion(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CompletionReport>, AppError> {
    let snapshot = state.repository(session).load_snapshot().await?;
    Ok(Json(compute_completion_report(&snapshot)))
}

// ────────────────────────────────────────────────────────────────────────────
// Repeatable sections
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/profile/{education,work}
pub async fn handle_list_records<R: SectionRecord>(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<RecordsResponse<R>>, AppError> {
    let repo = state.repository(session);
    let editor = RecordEditor::<R>::load(&repo).await?;
    Ok(records_response(editor, None))
}

/// POST /api/v1/profile/{education,work}
pub async fn handle_create_record<R: SectionRecord>(
    State(state): State<AppState>,
    session: Session,
    form: RecordForm<R>,
) -> Result<Json<RecordsResponse<R>>, AppError> {
    // Validate before the first network call.
    form.record.validate()?;

    let repo = state.repository(session);
    let mut editor = RecordEditor::<R>::load(&repo).await?;
    editor.begin_add();
    if let Some(file) = form.file {
        editor.select_file(file);
    }
    editor.save(&repo, state.uploader.as_ref(), form.record).await?;

    let notice = Notice::success(format!("{} added", R::SECTION.label()));
    Ok(records_response(editor, Some(notice)))
}

/// PUT /api/v1/profile/{education,work}/:index
pub async fn handle_update_record<R: SectionRecord>(
    State(state): State<AppState>,
    session: Session,
    Path(index): Path<usize>,
    form: RecordForm<R>,
) -> Result<Json<RecordsResponse<R>>, AppError> {
    form.record.validate()?;

    let repo = state.repository(session);
    let mut editor = RecordEditor::<R>::load(&repo).await?;
    editor.begin_edit(index)?;
    if let Some(file) = form.file {
        editor.select_file(file);
    }
    editor.save(&repo, state.uploader.as_ref(), form.record).await?;

    let notice = Notice::success(format!("{} updated", R::SECTION.label()));
    Ok(records_response(editor, Some(notice)))
}

/// DELETE /api/v1/profile/{education,work}/:index
pub async fn handle_delete_record<R: SectionRecord>(
    State(state): State<AppState>,
    session: Session,
    Path(index): Path<usize>,
) -> Result<Json<RecordsResponse<R>>, AppError> {
    let repo = state.repository(session);
    let mut editor = RecordEditor::<R>::load(&repo).await?;
    editor.delete(&repo, index).await?;

    let notice = Notice::success(format!("{} removed", R::SECTION.label()));
    Ok(records_response(editor, Some(notice)))
}

/// POST /api/v1/profile/education/:index/document
/// POST /api/v1/profile/work/:index/certificate
///
/// Multipart body with a single `file` field.
pub async fn handle_attach_file<R: SectionRecord>(
    State(state): State<AppState>,
    session: Session,
    Path(index): Path<usize>,
    multipart: Multipart,
) -> Result<Json<FileResponse>, AppError> {
    let file = read_upload(multipart).await?;

    let repo = state.repository(session);
    let mut editor = RecordEditor::<R>::load(&repo).await?;
    let path = editor
        .attach_file(&repo, state.uploader.as_ref(), index, file)
        .await?;

    Ok(Json(FileResponse {
        index,
        path: Some(path),
        notice: Notice::success("File uploaded"),
    }))
}

/// DELETE /api/v1/profile/education/:index/document
/// DELETE /api/v1/profile/work/:index/certificate
pub async fn handle_detach_file<R: SectionRecord>(
    State(state): State<AppState>,
    session: Session,
    Path(index): Path<usize>,
) -> Result<Json<FileResponse>, AppError> {
    let repo = state.repository(session);
    let mut editor = RecordEditor::<R>::load(&repo).await?;
    let notice = if editor.detach_file(&repo, index).await? {
        Notice::success("File removed")
    } else {
        Notice::info("No file was attached")
    };

    Ok(Json(FileResponse {
        index,
        path: None,
        notice,
    }))
}

fn invalid_upload(e: MultipartError) -> AppError {
    AppError::Validation(format!("Invalid upload: {e}"))
}

async fn read_file_field(field: Field<'_>) -> Result<UploadFile, AppError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await.map_err(invalid_upload)?;
    Ok(UploadFile {
        file_name,
        content_type,
        bytes,
    })
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadFile, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(invalid_upload)? {
        if field.name() == Some("file") {
            return read_file_field(field).await;
        }
    }
    Err(AppError::Validation(
        "Please choose a file to upload".to_string(),
    ))
}
