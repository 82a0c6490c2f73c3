//! Counts of optional parts, used to name them and to declare them in the
//! content types

use std::sync::atomic::{AtomicU64, Ordering};

use crate::image::ImageType;

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Session-wide tally of images, notes and tables.
///
/// Updated when an image is embedded or a worksheet is closed, and read when
/// the workbook-level parts are written at finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceCounter {
    session: u64,
    png: bool,
    jpeg: bool,
    total_images: u32,
    worksheets_with_images: u32,
    worksheets_with_notes: u32,
    total_tables: u32,
}

impl ResourceCounter {
    /// Start a tally with a fresh session token
    pub fn new() -> Self {
        ResourceCounter {
            session: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            png: false,
            jpeg: false,
            total_images: 0,
            worksheets_with_images: 0,
            worksheets_with_notes: 0,
            total_tables: 0,
        }
    }

    /// Token shared by every image embedded through this tally
    pub(crate) fn session(&self) -> u64 {
        self.session
    }

    /// Record an embedded image and return its 1-based id
    pub(crate) fn add_embedded_image(&mut self, image_type: ImageType) -> u32 {
        match image_type {
            ImageType::Png => self.png = true,
            ImageType::Jpeg => self.jpeg = true,
        }
        self.total_images += 1;
        self.total_images
    }

    /// Record a worksheet with images and return its drawing number
    pub(crate) fn add_worksheet_with_images(&mut self) -> u32 {
        self.worksheets_with_images += 1;
        self.worksheets_with_images
    }

    /// Record a worksheet with notes and return its comments number
    pub(crate) fn add_worksheet_with_notes(&mut self) -> u32 {
        self.worksheets_with_notes += 1;
        self.worksheets_with_notes
    }

    /// Record a table and return its workbook-wide id
    pub(crate) fn add_table(&mut self) -> u32 {
        self.total_tables += 1;
        self.total_tables
    }

    /// Image types embedded so far, PNG first
    pub fn embedded_image_types(&self) -> impl Iterator<Item = ImageType> {
        [(self.png, ImageType::Png), (self.jpeg, ImageType::Jpeg)]
            .into_iter()
            .filter_map(|(used, image_type)| used.then_some(image_type))
    }

    pub fn total_images(&self) -> u32 {
        self.total_images
    }

    pub fn worksheets_with_images(&self) -> u32 {
        self.worksheets_with_images
    }

    pub fn worksheets_with_notes(&self) -> u32 {
        self.worksheets_with_notes
    }

    pub fn total_tables(&self) -> u32 {
        self.total_tables
    }
}

impl Default for ResourceCounter {
    fn default() -> Self {
        Self::new()
    }
}
