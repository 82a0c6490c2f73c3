//! Session configuration

use crate::style::NumberFormat;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Smallest staging buffer a session will allocate
pub const MIN_BUFFER_SIZE: usize = 512;

/// Default staging buffer size (64KB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Default deflate level for the zip sinks created by the crate
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// Built-in number format 22 (`m/d/yy h:mm`)
pub const DEFAULT_DATETIME_FORMAT_ID: u32 = 22;

/// Staging buffer profile for different memory budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferProfile {
    /// Small containers (< 512MB): 16KB buffer
    Low,
    /// Medium containers (512MB-1GB): 64KB buffer
    Medium,
    /// Large containers (> 1GB): 256KB buffer
    High,
    /// Explicit buffer size in bytes
    Custom(usize),
}

impl BufferProfile {
    /// Pick a profile from a memory limit in MB
    pub fn from_memory_mb(memory_mb: usize) -> Self {
        if memory_mb < 512 {
            BufferProfile::Low
        } else if memory_mb < 1024 {
            BufferProfile::Medium
        } else {
            BufferProfile::High
        }
    }

    /// Detect from the `SHEETSTREAM_MEMORY_LIMIT_MB` environment variable
    pub fn from_env() -> Self {
        std::env::var("SHEETSTREAM_MEMORY_LIMIT_MB")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .map(Self::from_memory_mb)
            .unwrap_or(BufferProfile::Medium)
    }

    pub fn buffer_size(&self) -> usize {
        match self {
            BufferProfile::Low => 16 * 1024,
            BufferProfile::Medium => DEFAULT_BUFFER_SIZE,
            BufferProfile::High => 256 * 1024,
            BufferProfile::Custom(size) => (*size).max(MIN_BUFFER_SIZE),
        }
    }
}

/// Cooperative cancellation flag, checked each time the staging buffer is flushed.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Document properties written to `docProps/core.xml` and `docProps/app.xml`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DocumentProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub application: String,
    /// Creation timestamp; `None` writes the time the session was created
    pub created: Option<DateTime<Utc>>,
}

impl Default for DocumentProperties {
    fn default() -> Self {
        DocumentProperties {
            title: None,
            subject: None,
            author: None,
            keywords: None,
            description: None,
            application: "sheetstream".to_string(),
            created: None,
        }
    }
}

impl DocumentProperties {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_application(mut self, application: impl Into<String>) -> Self {
        self.application = application.into();
        self
    }

    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }
}

/// Options for a spreadsheet session
///
/// # Examples
///
/// ```
/// use sheetstream::{DocumentProperties, SpreadsheetOptions};
///
/// let options = SpreadsheetOptions::default()
///     .with_buffer_size(16 * 1024)
///     .with_shared_strings(true)
///     .with_document_properties(DocumentProperties::default().with_title("Report"));
/// assert_eq!(options.buffer_size, 16 * 1024);
/// ```
#[derive(Debug, Clone)]
pub struct SpreadsheetOptions {
    /// Staging buffer capacity in bytes, never below [`MIN_BUFFER_SIZE`]
    pub buffer_size: usize,
    /// Deflate level (0-9) for zip sinks created by the session constructors
    pub compression_level: u32,
    /// `None` omits the docProps parts
    pub document_properties: Option<DocumentProperties>,
    /// Number format applied to date-time cells that have no style of their own
    pub default_datetime_format: Option<NumberFormat>,
    /// Write text through `xl/sharedStrings.xml` instead of inline strings
    pub shared_strings: bool,
    pub cancellation: Option<CancellationToken>,
}

impl Default for SpreadsheetOptions {
    fn default() -> Self {
        SpreadsheetOptions {
            buffer_size: DEFAULT_BUFFER_SIZE,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            document_properties: Some(DocumentProperties::default()),
            default_datetime_format: Some(NumberFormat::BuiltIn(DEFAULT_DATETIME_FORMAT_ID)),
            shared_strings: false,
            cancellation: None,
        }
    }
}

impl SpreadsheetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build options from environment variables.
    ///
    /// `SHEETSTREAM_BUFFER_SIZE` takes precedence over the buffer profile
    /// derived from `SHEETSTREAM_MEMORY_LIMIT_MB`. `SHEETSTREAM_COMPRESSION_LEVEL`
    /// overrides the deflate level.
    pub fn from_env() -> Self {
        let buffer_size = std::env::var("SHEETSTREAM_BUFFER_SIZE")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or_else(|| BufferProfile::from_env().buffer_size());
        let compression_level = std::env::var("SHEETSTREAM_COMPRESSION_LEVEL")
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_COMPRESSION_LEVEL);

        Self::default()
            .with_buffer_size(buffer_size)
            .with_compression_level(compression_level)
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(MIN_BUFFER_SIZE);
        self
    }

    pub fn with_buffer_profile(self, profile: BufferProfile) -> Self {
        self.with_buffer_size(profile.buffer_size())
    }

    /// Set the deflate level (clamped to 0-9)
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level.min(9);
        self
    }

    pub fn with_document_properties(mut self, properties: DocumentProperties) -> Self {
        self.document_properties = Some(properties);
        self
    }

    pub fn without_document_properties(mut self) -> Self {
        self.document_properties = None;
        self
    }

    pub fn with_default_datetime_format(mut self, format: Option<NumberFormat>) -> Self {
        self.default_datetime_format = format;
        self
    }

    pub fn with_shared_strings(mut self, enabled: bool) -> Self {
        self.shared_strings = enabled;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }
}
