//! Style deduplication registry

use super::{Alignment, Border, Color, Fill, Font, NumberFormat, Style, StyleId};
use crate::error::{Result, SpreadsheetError};
use indexmap::{IndexMap, IndexSet};

/// First id available for custom number formats
pub const FIRST_CUSTOM_FORMAT_ID: u32 = 164;

/// Format codes of the predefined number formats that have a fixed code.
const BUILT_IN_FORMATS: &[(u32, &str)] = &[
    (0, "General"),
    (1, "0"),
    (2, "0.00"),
    (3, "#,##0"),
    (4, "#,##0.00"),
    (9, "0%"),
    (10, "0.00%"),
    (11, "0.00E+00"),
    (12, "# ?/?"),
    (13, "# ??/??"),
    (14, "mm-dd-yy"),
    (15, "d-mmm-yy"),
    (16, "d-mmm"),
    (17, "mmm-yy"),
    (18, "h:mm AM/PM"),
    (19, "h:mm:ss AM/PM"),
    (20, "h:mm"),
    (21, "h:mm:ss"),
    (22, "m/d/yy h:mm"),
    (37, "#,##0 ;(#,##0)"),
    (38, "#,##0 ;[Red](#,##0)"),
    (39, "#,##0.00;(#,##0.00)"),
    (40, "#,##0.00;[Red](#,##0.00)"),
    (45, "mm:ss"),
    (46, "[h]:mm:ss"),
    (47, "mmss.0"),
    (48, "##0.0E+0"),
    (49, "@"),
];

/// Id of the predefined format with exactly this code
pub fn built_in_format_id(code: &str) -> Option<u32> {
    BUILT_IN_FORMATS
        .iter()
        .find(|(_, builtin)| *builtin == code)
        .map(|(id, _)| *id)
}

/// Assigns stable ids to styles in first-seen order.
///
/// Id 0 is the default style and is never stored. The registry only grows;
/// replaying the same registrations always produces the same ids.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    styles: IndexMap<Style, StyleId>,
    named: IndexMap<String, StyleId>,
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `style`, assigning the next one on first sight
    pub fn register(&mut self, style: &Style) -> StyleId {
        if style.is_default() {
            return StyleId::DEFAULT;
        }
        if let Some(id) = self.styles.get(style) {
            return *id;
        }
        let id = StyleId(self.styles.len() as u32 + 1);
        self.styles.insert(style.clone(), id);
        id
    }

    /// Register a style under a name that can be looked up later
    pub fn register_named(&mut self, name: &str, style: &Style) -> Result<StyleId> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SpreadsheetError::invalid_argument(
                "name",
                "style name must not be empty",
            ));
        }
        if self.named.contains_key(name) {
            return Err(SpreadsheetError::DuplicateStyleName(name.to_string()));
        }
        let id = self.register(style);
        self.named.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn named(&self, name: &str) -> Option<StyleId> {
        self.named.get(name).copied()
    }

    /// Whether `id` was handed out by this registry
    pub fn contains(&self, id: StyleId) -> bool {
        id.0 as usize <= self.styles.len()
    }

    pub fn get(&self, id: StyleId) -> Option<&Style> {
        if id.is_default() {
            return None;
        }
        self.styles.get_index(id.0 as usize - 1).map(|(style, _)| style)
    }

    /// Number of custom styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// De-duplicate the components of every registered style into the tables
    /// `xl/styles.xml` is made of.
    pub fn resolve(&self) -> ResolvedStyles {
        let mut fonts: IndexSet<Font> = IndexSet::new();
        fonts.insert(Font::default());

        // Index 1 is the gray125 pattern every workbook carries.
        let mut fills: IndexSet<FillPattern> = IndexSet::new();
        fills.insert(FillPattern::None);
        fills.insert(FillPattern::Gray125);

        let mut borders: IndexSet<Border> = IndexSet::new();
        borders.insert(Border::default());

        let mut custom_formats: IndexMap<String, u32> = IndexMap::new();
        let mut formats = Vec::with_capacity(self.styles.len() + 1);
        formats.push(CellFormat::default());

        for style in self.styles.keys() {
            let (font_id, _) = fonts.insert_full(style.font.clone());
            let fill_id = match style.fill {
                Fill { color: Some(color) } => fills.insert_full(FillPattern::Solid(color)).0,
                Fill { color: None } => 0,
            };
            let (border_id, _) = borders.insert_full(style.border);

            let number_format_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => match built_in_format_id(code) {
                    Some(id) => id,
                    None => {
                        let next = FIRST_CUSTOM_FORMAT_ID + custom_formats.len() as u32;
                        *custom_formats.entry(code.clone()).or_insert(next)
                    }
                },
            };

            formats.push(CellFormat {
                number_format_id,
                font_id: font_id as u32,
                fill_id: fill_id as u32,
                border_id: border_id as u32,
                alignment: style.alignment,
            });
        }

        ResolvedStyles {
            number_formats: custom_formats.into_iter().map(|(code, id)| (id, code)).collect(),
            fonts: fonts.into_iter().collect(),
            fills: fills.into_iter().collect(),
            borders: borders.into_iter().collect(),
            cell_formats: formats,
        }
    }
}

/// One `<fill>` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FillPattern {
    None,
    Gray125,
    Solid(Color),
}

/// One `<xf>` entry in `cellXfs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellFormat {
    pub number_format_id: u32,
    pub font_id: u32,
    pub fill_id: u32,
    pub border_id: u32,
    pub alignment: Alignment,
}

/// The component tables of a registry, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyles {
    /// Custom formats as (id, code), ids from 164
    pub number_formats: Vec<(u32, String)>,
    pub fonts: Vec<Font>,
    pub fills: Vec<FillPattern>,
    pub borders: Vec<Border>,
    /// Index = style id
    pub cell_formats: Vec<CellFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{BorderEdge, BorderLineStyle};

    #[test]
    fn test_same_style_same_id() {
        let mut registry = StyleRegistry::new();
        let bold = Style::new().bold();
        let first = registry.register(&bold);
        let second = registry.register(&bold.clone());
        assert_eq!(first, second);
        assert_eq!(first, StyleId(1));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_distinct_styles_increase() {
        let mut registry = StyleRegistry::new();
        let ids: Vec<StyleId> = (1..=5)
            .map(|i| registry.register(&Style::new().with_font_color(Color::rgb(i, 0, 0))))
            .collect();
        assert_eq!(ids, (1..=5).map(StyleId).collect::<Vec<_>>());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_default_style_is_zero() {
        let mut registry = StyleRegistry::new();
        assert_eq!(registry.register(&Style::default()), StyleId::DEFAULT);
        assert!(registry.is_empty());
        assert!(registry.contains(StyleId::DEFAULT));
        assert!(!registry.contains(StyleId(1)));
    }

    #[test]
    fn test_named_styles() {
        let mut registry = StyleRegistry::new();
        let id = registry.register_named("Header", &Style::new().bold()).unwrap();
        assert_eq!(registry.named("Header"), Some(id));
        assert_eq!(registry.named("Missing"), None);
        assert!(matches!(
            registry.register_named("Header", &Style::new().italic()),
            Err(SpreadsheetError::DuplicateStyleName(_))
        ));
        assert!(registry.register_named("  ", &Style::new()).is_err());
    }

    #[test]
    fn test_resolve_deduplicates_components() {
        let mut registry = StyleRegistry::new();
        let red = Color::rgb(255, 0, 0);
        registry.register(&Style::new().bold());
        registry.register(&Style::new().bold().with_fill_color(red));
        registry.register(&Style::new().with_fill_color(red));
        registry.register(
            &Style::new().with_border(Border::all(BorderEdge::new(BorderLineStyle::Thin))),
        );
        registry.register(&Style::new().with_number_format(NumberFormat::custom("0.000")));
        registry.register(&Style::new().with_number_format(NumberFormat::custom("0.00")));
        registry.register(&Style::new().italic().with_number_format(NumberFormat::custom("0.000")));

        let resolved = registry.resolve();
        assert_eq!(resolved.fonts.len(), 3);
        assert_eq!(resolved.fills.len(), 3);
        assert_eq!(resolved.fills[2], FillPattern::Solid(red));
        assert_eq!(resolved.borders.len(), 2);
        assert_eq!(resolved.number_formats, vec![(164, "0.000".to_string())]);
        assert_eq!(resolved.cell_formats.len(), 8);
        assert_eq!(resolved.cell_formats[2].fill_id, 2);
        assert_eq!(resolved.cell_formats[3].font_id, 0);
        assert_eq!(resolved.cell_formats[6].number_format_id, 2);
        assert_eq!(resolved.cell_formats[7].number_format_id, 164);
    }
}
