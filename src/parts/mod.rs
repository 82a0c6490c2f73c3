//! Package parts written when a worksheet closes or the session finishes
//!
//! Every writer here is a [`FragmentSource`](crate::writer::part::FragmentSource)
//! with a section cursor, so it runs through the same staging buffer as the
//! worksheet rows.

pub(crate) mod comments;
pub(crate) mod content_types;
pub(crate) mod doc_props;
pub(crate) mod drawing;
pub(crate) mod relationships;
pub(crate) mod shared_strings;
pub(crate) mod styles;
pub(crate) mod table;
pub(crate) mod workbook;

pub(crate) const SPREADSHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub(crate) const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
