//! `xl/styles.xml`

use super::SPREADSHEET_NS;
use crate::style::registry::{CellFormat, FillPattern, ResolvedStyles};
use crate::style::{Alignment, Border, BorderEdge, Font, HorizontalAlignment, VerticalAlignment};
use crate::writer::part::{Fragment, FragmentSource};
use crate::writer::value::format_number;
use crate::writer::XML_DECLARATION;

pub(crate) const PATH: &str = "xl/styles.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    NumberFormats,
    Fonts,
    Fills,
    Borders,
    CellStyleFormats,
    CellFormats,
    Footer,
    Done,
}

/// Writes the resolved component tables of a style registry
pub(crate) struct StylesXml<'a> {
    styles: &'a ResolvedStyles,
    next: Section,
    index: usize,
}

impl<'a> StylesXml<'a> {
    pub(crate) fn new(styles: &'a ResolvedStyles) -> Self {
        StylesXml {
            styles,
            next: Section::Header,
            index: 0,
        }
    }

    /// Walks a `<name count="..">` group: the open tag, one fragment per
    /// item, then the close tag. Returns `None` once the group is complete.
    fn group(
        &mut self,
        name: &str,
        count: usize,
        item: impl FnOnce(usize) -> Fragment,
    ) -> Option<Fragment> {
        let index = self.index;
        self.index += 1;
        match index {
            0 => Some(Fragment::raw(format!("<{name} count=\"{count}\">"))),
            i if i <= count => Some(item(i - 1)),
            i if i == count + 1 => Some(Fragment::raw(format!("</{name}>"))),
            _ => {
                self.index = 0;
                None
            }
        }
    }
}

fn font(font: &Font) -> Fragment {
    let mut markup = String::from("<font>");
    if font.bold {
        markup.push_str("<b/>");
    }
    if font.italic {
        markup.push_str("<i/>");
    }
    if font.strikethrough {
        markup.push_str("<strike/>");
    }
    if font.underline {
        markup.push_str("<u/>");
    }
    let mut numbers = ryu::Buffer::new();
    markup.push_str(&format!("<sz val=\"{}\"/>", format_number(font.size, &mut numbers)));
    match font.color {
        Some(color) => markup.push_str(&format!("<color rgb=\"{}\"/>", color.to_argb_hex())),
        None => markup.push_str("<color theme=\"1\"/>"),
    }
    markup.push_str("<name val=\"");
    Fragment::raw(markup)
        .text(font.name.clone())
        .push("\"/><family val=\"2\"/></font>")
}

fn fill(fill: &FillPattern) -> Fragment {
    Fragment::raw(match fill {
        FillPattern::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillPattern::Gray125 => "<fill><patternFill patternType=\"gray125\"/></fill>".to_string(),
        FillPattern::Solid(color) => format!(
            "<fill><patternFill patternType=\"solid\"><fgColor rgb=\"{}\"/>\
             <bgColor indexed=\"64\"/></patternFill></fill>",
            color.to_argb_hex()
        ),
    })
}

fn border_edge(markup: &mut String, name: &str, edge: &BorderEdge) {
    let Some(style) = edge.style.as_str() else {
        markup.push_str(&format!("<{name}/>"));
        return;
    };
    match edge.color {
        Some(color) => markup.push_str(&format!(
            "<{name} style=\"{style}\"><color rgb=\"{}\"/></{name}>",
            color.to_argb_hex()
        )),
        None => markup.push_str(&format!("<{name} style=\"{style}\"><color auto=\"1\"/></{name}>")),
    }
}

fn border(border: &Border) -> Fragment {
    let mut markup = String::from("<border>");
    border_edge(&mut markup, "left", &border.left);
    border_edge(&mut markup, "right", &border.right);
    border_edge(&mut markup, "top", &border.top);
    border_edge(&mut markup, "bottom", &border.bottom);
    markup.push_str("<diagonal/></border>");
    Fragment::raw(markup)
}

fn alignment(alignment: &Alignment) -> Option<String> {
    if *alignment == Alignment::default() {
        return None;
    }
    let mut markup = String::from("<alignment");
    if alignment.horizontal != HorizontalAlignment::General {
        markup.push_str(&format!(" horizontal=\"{}\"", alignment.horizontal.as_str()));
    }
    if alignment.vertical != VerticalAlignment::Bottom {
        markup.push_str(&format!(" vertical=\"{}\"", alignment.vertical.as_str()));
    }
    if alignment.wrap_text {
        markup.push_str(" wrapText=\"1\"");
    }
    if alignment.indent > 0 {
        markup.push_str(&format!(" indent=\"{}\"", alignment.indent));
    }
    markup.push_str("/>");
    Some(markup)
}

fn cell_format(format: &CellFormat) -> Fragment {
    let mut markup = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"",
        format.number_format_id, format.font_id, format.fill_id, format.border_id
    );
    let flags = [
        (format.number_format_id != 0, " applyNumberFormat=\"1\""),
        (format.font_id != 0, " applyFont=\"1\""),
        (format.fill_id != 0, " applyFill=\"1\""),
        (format.border_id != 0, " applyBorder=\"1\""),
    ];
    for (_, attribute) in flags.iter().filter(|(applies, _)| *applies) {
        markup.push_str(attribute);
    }
    match alignment(&format.alignment) {
        Some(alignment) => {
            markup.push_str(" applyAlignment=\"1\">");
            markup.push_str(&alignment);
            markup.push_str("</xf>");
        }
        None => markup.push_str("/>"),
    }
    Fragment::raw(markup)
}

impl FragmentSource for StylesXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        let styles = self.styles;
        loop {
            let fragment = match self.next {
                Section::Header => Some(
                    Fragment::raw(XML_DECLARATION)
                        .push(format!("<styleSheet xmlns=\"{SPREADSHEET_NS}\">")),
                ),
                Section::NumberFormats if styles.number_formats.is_empty() => None,
                Section::NumberFormats => {
                    self.group("numFmts", styles.number_formats.len(), |i| {
                        let (id, code) = &styles.number_formats[i];
                        Fragment::raw(format!("<numFmt numFmtId=\"{id}\" formatCode=\""))
                            .text(code.clone())
                            .push("\"/>")
                    })
                }
                Section::Fonts => self.group("fonts", styles.fonts.len(), |i| font(&styles.fonts[i])),
                Section::Fills => self.group("fills", styles.fills.len(), |i| fill(&styles.fills[i])),
                Section::Borders => {
                    self.group("borders", styles.borders.len(), |i| border(&styles.borders[i]))
                }
                Section::CellStyleFormats => Some(Fragment::raw(
                    "<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>",
                )),
                Section::CellFormats => self.group("cellXfs", styles.cell_formats.len(), |i| {
                    cell_format(&styles.cell_formats[i])
                }),
                Section::Footer => Some(Fragment::raw(
                    "<cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>\
                     <dxfs count=\"0\"/></styleSheet>",
                )),
                Section::Done => return None,
            };

            let grouped = matches!(
                self.next,
                Section::NumberFormats
                    | Section::Fonts
                    | Section::Fills
                    | Section::Borders
                    | Section::CellFormats
            );
            if fragment.is_none() || !grouped {
                self.next = match self.next {
                    Section::Header => Section::NumberFormats,
                    Section::NumberFormats => Section::Fonts,
                    Section::Fonts => Section::Fills,
                    Section::Fills => Section::Borders,
                    Section::Borders => Section::CellStyleFormats,
                    Section::CellStyleFormats => Section::CellFormats,
                    Section::CellFormats => Section::Footer,
                    Section::Footer | Section::Done => Section::Done,
                };
            }
            if fragment.is_some() {
                return fragment;
            }
        }
    }
}
