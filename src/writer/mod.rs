//! Streaming write engine
//!
//! All XML passes through one fixed-size [`SpreadsheetBuffer`]. Each part is
//! produced by a [`PartWriter`] that writes one chunk per call and reports
//! [`Step::Blocked`] when the chunk does not fit, so the caller can flush and
//! retry without anything being written twice.

pub mod buffer;
pub mod part;
pub(crate) mod row;
pub(crate) mod sheet;
pub mod value;

pub use buffer::SpreadsheetBuffer;
pub use part::{PartWriter, Step};

pub(crate) const XML_DECLARATION: &str =
    "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n";
