//! Mapping user values to rows
//!
//! A [`RowShape`] turns one value into an ordered list of cells and describes
//! the columns for header rows. [`ColumnMap`] is a closure-based shape built at
//! runtime:
//!
//! ```
//! use sheetstream::ColumnMap;
//!
//! struct Person {
//!     first_name: String,
//!     last_name: String,
//!     age: u32,
//! }
//!
//! let shape = ColumnMap::new()
//!     .column("FirstName", |p: &Person| p.first_name.clone())
//!     .column("LastName", |p: &Person| p.last_name.clone())
//!     .order(1)
//!     .column("Age", |p: &Person| p.age);
//!
//! let headers: Vec<_> = shape.headers().collect();
//! assert_eq!(headers, ["LastName", "FirstName", "Age"]);
//! ```

use crate::style::StyleId;
use crate::types::{Cell, CellValue};

/// One cell produced by a row shape
#[derive(Debug, Clone, PartialEq)]
pub struct ShapedCell {
    /// 1-based column; strictly increasing within a row
    pub column: u32,
    pub cell: Cell,
    /// Longest text to write, in UTF-16 code units
    pub truncate: Option<usize>,
}

/// Header text of a column
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeaderText {
    #[default]
    Empty,
    Text(String),
    /// Looked up through a [`HeaderResolver`], with `fallback` used when the
    /// lookup yields nothing
    Localized { key: String, fallback: String },
}

impl From<&str> for HeaderText {
    fn from(text: &str) -> Self {
        HeaderText::Text(text.to_string())
    }
}

impl From<String> for HeaderText {
    fn from(text: String) -> Self {
        HeaderText::Text(text)
    }
}

impl HeaderText {
    /// Text without localization
    pub fn plain(&self) -> Option<&str> {
        match self {
            HeaderText::Empty => None,
            HeaderText::Text(text) => Some(text),
            HeaderText::Localized { fallback, .. } => Some(fallback),
        }
    }

    /// Text for `locale`; lookups only happen for localized headers
    pub fn resolve(&self, resolver: &dyn HeaderResolver, locale: &str) -> Option<String> {
        match self {
            HeaderText::Localized { key, fallback } => {
                Some(resolver.resolve(key, locale).unwrap_or_else(|| fallback.clone()))
            }
            other => other.plain().map(str::to_string),
        }
    }
}

/// Supplies localized header text. The locale is always passed explicitly.
pub trait HeaderResolver {
    fn resolve(&self, key: &str, locale: &str) -> Option<String>;
}

/// Column metadata of a row shape
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnSpec {
    pub header: HeaderText,
    pub width: Option<f64>,
    pub truncate: Option<usize>,
    pub style: Option<StyleId>,
}

/// Maps values of `T` to rows
pub trait RowShape<T: ?Sized> {
    /// Columns in output order; column `i` in this slice is column `i + 1`
    fn columns(&self) -> &[ColumnSpec];

    /// Append the cells for `value` to `cells`
    fn write_cells(&self, value: &T, cells: &mut Vec<ShapedCell>);
}

impl<T: ?Sized, S: RowShape<T> + ?Sized> RowShape<T> for &S {
    fn columns(&self) -> &[ColumnSpec] {
        (**self).columns()
    }

    fn write_cells(&self, value: &T, cells: &mut Vec<ShapedCell>) {
        (**self).write_cells(value, cells)
    }
}

type Getter<T> = Box<dyn Fn(&T) -> CellValue>;

struct Column<T: ?Sized> {
    spec: ColumnSpec,
    getter: Getter<T>,
    order: Option<i32>,
    declared: usize,
}

/// A [`RowShape`] assembled from per-column getters.
///
/// Columns with an explicit [`order`](Self::order) come first, sorted by that
/// value; the rest follow in declaration order. Modifier methods apply to the
/// most recently added column.
pub struct ColumnMap<T: ?Sized> {
    columns: Vec<Column<T>>,
    specs: Vec<ColumnSpec>,
}

impl<T: ?Sized> Default for ColumnMap<T> {
    fn default() -> Self {
        ColumnMap {
            columns: Vec::new(),
            specs: Vec::new(),
        }
    }
}

impl<T: ?Sized> ColumnMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column<V, F>(mut self, header: impl Into<HeaderText>, getter: F) -> Self
    where
        V: Into<CellValue>,
        F: Fn(&T) -> V + 'static,
    {
        let declared = self.columns.len();
        self.columns.push(Column {
            spec: ColumnSpec {
                header: header.into(),
                ..ColumnSpec::default()
            },
            getter: Box::new(move |value| getter(value).into()),
            order: None,
            declared,
        });
        self.rebuild();
        self
    }

    pub fn order(self, order: i32) -> Self {
        self.modify(|column| column.order = Some(order))
    }

    pub fn width(self, width: f64) -> Self {
        self.modify(|column| column.spec.width = Some(width))
    }

    /// Clip text to `length` UTF-16 code units when written
    pub fn truncate(self, length: usize) -> Self {
        self.modify(|column| column.spec.truncate = Some(length))
    }

    pub fn style(self, style: StyleId) -> Self {
        self.modify(|column| column.spec.style = Some(style))
    }

    /// Resolve the header through `key`, keeping the current text as fallback
    pub fn localized(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.modify(move |column| {
            let fallback = column.spec.header.plain().unwrap_or_default().to_string();
            column.spec.header = HeaderText::Localized { key, fallback };
        })
    }

    /// Plain header texts in column order
    pub fn headers(&self) -> impl Iterator<Item = &str> + '_ {
        self.specs.iter().map(|spec| spec.header.plain().unwrap_or(""))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn modify(mut self, change: impl FnOnce(&mut Column<T>)) -> Self {
        let latest = self.columns.iter_mut().max_by_key(|c| c.declared);
        if let Some(column) = latest {
            change(column);
            self.rebuild();
        }
        self
    }

    fn rebuild(&mut self) {
        self.columns
            .sort_by_key(|c| (c.order.is_none(), c.order.unwrap_or(0), c.declared));
        self.specs = self.columns.iter().map(|c| c.spec.clone()).collect();
    }
}

impl<T: ?Sized> RowShape<T> for ColumnMap<T> {
    fn columns(&self) -> &[ColumnSpec] {
        &self.specs
    }

    fn write_cells(&self, value: &T, cells: &mut Vec<ShapedCell>) {
        for (index, column) in self.columns.iter().enumerate() {
            cells.push(ShapedCell {
                column: index as u32 + 1,
                cell: Cell {
                    value: (column.getter)(value),
                    style: column.spec.style,
                },
                truncate: column.spec.truncate,
            });
        }
    }
}
