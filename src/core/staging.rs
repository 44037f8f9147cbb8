//! File Staging Module
//!
//! Captures files from drag-and-drop or the file picker and stages them into
//! the form's file input. The input is the only store: the preview list is
//! always rebuilt from what the input holds after staging.

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;

use super::dom::Element;
use super::form::{FieldKind, Form};
use super::format::{escape_html, format_file_size};

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Drop zone has no file input named '{0}'")]
    MissingInput(String),

    #[error("Field '{0}' is not a file input")]
    NotAFileInput(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StagingError>;

// ============================================================================
// File handles
// ============================================================================

/// A user-selected file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub content_type: Option<String>,
    data: Bytes,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Read a file from disk, for embedders that pick files natively.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, data))
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }
}

/// The ordered file list held by a file input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagedFiles(Vec<FileHandle>);

impl StagedFiles {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileHandle> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn total_size(&self) -> u64 {
        self.0.iter().map(FileHandle::size).sum()
    }
}

impl From<Vec<FileHandle>> for StagedFiles {
    fn from(files: Vec<FileHandle>) -> Self {
        Self(files)
    }
}

impl<'a> IntoIterator for &'a StagedFiles {
    type Item = &'a FileHandle;
    type IntoIter = std::slice::Iter<'a, FileHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One row of the rendered preview list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilePreview {
    pub name: String,
    pub size_label: String,
}

impl FilePreview {
    fn render_html(&self) -> String {
        format!(
            concat!(
                r#"<div class="file-item d-flex align-items-center p-2 border rounded mb-2">"#,
                r#"<i class="fas fa-file me-2 text-primary"></i>"#,
                r#"<span class="flex-grow-1">{}</span>"#,
                r#"<small class="text-muted">{}</small>"#,
                "</div>"
            ),
            escape_html(&self.name),
            self.size_label
        )
    }
}

// ============================================================================
// Drop zone
// ============================================================================

/// Gestures a drop zone reacts to
#[derive(Debug, Clone)]
pub enum DropZoneEvent {
    DragOver,
    DragLeave,
    Drop(Vec<FileHandle>),
    PickerChange(Vec<FileHandle>),
    Click,
}

/// What the embedder must do after a drop-zone event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneEffect {
    /// Suppress the browser's default handling (opening the dropped file).
    PreventDefault,
    OpenFilePicker,
    Staged { count: usize },
    /// The owning form is auto-submit; run the submission pipeline now.
    AutoSubmit,
}

/// A `.file-upload-area` bound to one file input of one form
#[derive(Debug, Clone)]
pub struct DropZone {
    pub id: String,
    pub form_id: String,
    pub input_name: String,
    pub area: Element,
    /// The `.file-list` mount, when the markup has one.
    pub file_list: Option<Element>,
    previews: Vec<FilePreview>,
}

impl DropZone {
    pub fn new(
        id: impl Into<String>,
        form_id: impl Into<String>,
        input_name: impl Into<String>,
    ) -> Self {
        let id = id.into();
        Self {
            area: Element::new("div").with_id(id.clone()).with_class("file-upload-area"),
            id,
            form_id: form_id.into(),
            input_name: input_name.into(),
            file_list: Some(Element::new("div").with_class("file-list")),
            previews: Vec::new(),
        }
    }

    pub fn without_file_list(mut self) -> Self {
        self.file_list = None;
        self
    }

    pub fn is_dragover(&self) -> bool {
        self.area.has_class("dragover")
    }

    pub fn previews(&self) -> &[FilePreview] {
        &self.previews
    }

    /// React to a gesture. `form` must be the zone's owning form.
    pub fn handle(&mut self, event: DropZoneEvent, form: &mut Form) -> Result<Vec<ZoneEffect>> {
        match event {
            DropZoneEvent::DragOver => {
                self.area.add_class("dragover");
                Ok(vec![ZoneEffect::PreventDefault])
            }
            DropZoneEvent::DragLeave => {
                self.area.remove_class("dragover");
                Ok(Vec::new())
            }
            DropZoneEvent::Drop(files) => {
                self.area.remove_class("dragover");
                let mut effects = vec![ZoneEffect::PreventDefault];
                effects.extend(self.stage(files, form)?);
                Ok(effects)
            }
            DropZoneEvent::PickerChange(files) => self.stage(files, form),
            DropZoneEvent::Click => Ok(vec![ZoneEffect::OpenFilePicker]),
        }
    }

    /// Replace the input's files with `files` and rebuild the preview.
    ///
    /// An empty selection is ignored. Nothing is rejected here; size and type
    /// limits belong to the server.
    pub fn stage(&mut self, files: Vec<FileHandle>, form: &mut Form) -> Result<Vec<ZoneEffect>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let auto_submit = form.auto_submit;
        let input = form
            .field_mut(&self.input_name)
            .ok_or_else(|| StagingError::MissingInput(self.input_name.clone()))?;
        if input.kind != FieldKind::File {
            return Err(StagingError::NotAFileInput(self.input_name.clone()));
        }

        input.set_files(StagedFiles::from(files));
        let staged = input.files();
        let count = staged.len();

        self.previews = staged
            .iter()
            .map(|file| FilePreview {
                name: file.name.clone(),
                size_label: format_file_size(file.size()),
            })
            .collect();

        if let Some(list) = self.file_list.as_mut() {
            let html: String = self.previews.iter().map(FilePreview::render_html).collect();
            list.set_inner_html(html);
        }

        tracing::debug!(
            zone = %self.id,
            files = count,
            bytes = staged.total_size(),
            "staged files"
        );

        let mut effects = vec![ZoneEffect::Staged { count }];
        if auto_submit {
            effects.push(ZoneEffect::AutoSubmit);
        }
        Ok(effects)
    }
}
