//! The notice aggregate and the inputs that create or edit it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::history::History;
use crate::plan::FileRef;
use crate::status::NoticeStatus;
use crate::types::{DbId, Timestamp};

/// Maximum length of a derived title.
pub const MAX_TITLE_LENGTH: usize = 60;

/// Maximum length of the free-text description on a new notice.
pub const MAX_DESCRIPTION_LENGTH: usize = 10_000;

/// Prefix of every generated notice code.
pub const NOTICE_CODE_PREFIX: &str = "SCN";

/// A correction notice: one supplier quality issue from report to closure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub id: DbId,
    pub notice_code: String,
    pub category: String,
    pub title: String,
    pub assigned_supplier_id: DbId,
    pub assigned_supplier_name: String,
    pub status: NoticeStatus,
    pub is_reviewed: bool,
    pub sd_notice: SdNotice,
    pub history: History,
    pub likes: BTreeSet<DbId>,
    /// Bumped by the store on every successful save.
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// The originating report written by SD.
///
/// `creator_*`, `description`, `details`, `images`, `attachments` and
/// `created_at` never change after creation. The remaining fields can be
/// edited through [`NoticeEdit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdNotice {
    pub creator_id: DbId,
    pub creator_name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Category-specific structured fields.
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub images: Vec<FileRef>,
    #[serde(default)]
    pub attachments: Vec<FileRef>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub problem_source: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub supplement: Option<String>,
    #[serde(default)]
    pub extra_images: Vec<FileRef>,
    #[serde(default)]
    pub extra_attachments: Vec<FileRef>,
}

/// A supplier as known to the supplier registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: DbId,
    pub name: String,
}

/// Request to open a new notice.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CreateNoticeInput {
    pub category: String,
    pub supplier_id: DbId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub images: Vec<FileRef>,
    #[serde(default)]
    pub attachments: Vec<FileRef>,
    #[serde(default)]
    pub problem_source: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
}

/// A fully formed notice that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNotice {
    pub notice_code: String,
    pub category: String,
    pub title: String,
    pub assigned_supplier_id: DbId,
    pub assigned_supplier_name: String,
    pub status: NoticeStatus,
    pub sd_notice: SdNotice,
    pub created_at: Timestamp,
}

impl NewNotice {
    /// Attach the store-assigned id, producing the first revision.
    pub fn into_notice(self, id: DbId) -> Notice {
        Notice {
            id,
            notice_code: self.notice_code,
            category: self.category,
            title: self.title,
            assigned_supplier_id: self.assigned_supplier_id,
            assigned_supplier_name: self.assigned_supplier_name,
            status: self.status,
            is_reviewed: false,
            sd_notice: self.sd_notice,
            history: History::new(),
            likes: BTreeSet::new(),
            version: 1,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Changes SD may make to an open notice's supplementary fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NoticeEdit {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub supplement: Option<String>,
    #[serde(default)]
    pub problem_source: Option<String>,
    #[serde(default)]
    pub cause: Option<String>,
    #[serde(default)]
    pub add_images: Vec<FileRef>,
    #[serde(default)]
    pub add_attachments: Vec<FileRef>,
}

/// Derive a notice title from its category and report.
///
/// Uses `details.title` when present, otherwise the first line of the
/// description, truncated to [`MAX_TITLE_LENGTH`] characters. Falls back to
/// the bare category when neither is available.
pub fn derive_title(
    category: &str,
    description: Option<&str>,
    details: &Map<String, Value>,
) -> String {
    let summary = details
        .get("title")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| description.and_then(|d| d.lines().map(str::trim).find(|l| !l.is_empty())));

    match summary {
        Some(text) => {
            let truncated: String = text.chars().take(MAX_TITLE_LENGTH).collect();
            format!("[{category}] {truncated}")
        }
        None => format!("[{category}]"),
    }
}

/// Generate a business code such as `SCN-20250110-3FA9C1`.
pub fn generate_notice_code(now: Timestamp) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("{NOTICE_CODE_PREFIX}-{}-{suffix}", now.format("%Y%m%d"))
}

/// Validate a category tag: non-empty, at most 64 characters.
pub fn validate_category(category: &str) -> Result<(), CoreError> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Category must not be empty".into()));
    }
    if trimmed.chars().count() > 64 {
        return Err(CoreError::Validation(
            "Category must be at most 64 characters".into(),
        ));
    }
    Ok(())
}
