//! `xl/drawings/drawing{n}.xml`: images placed on a worksheet

use super::relationships::{Relationship, RelationshipKind};
use super::RELATIONSHIPS_NS;
use crate::image::{EmbeddedImage, PlacedImage};
use crate::writer::part::{Fragment, FragmentSource};
use crate::writer::XML_DECLARATION;

/// English Metric Units per pixel at 96 DPI
const EMU_PER_PIXEL: u64 = 9525;

pub(crate) fn path(number: u32) -> String {
    format!("xl/drawings/drawing{number}.xml")
}

/// Distinct images in first-placement order; image `i` is relationship `rId{i + 1}`
fn distinct_images(images: &[PlacedImage]) -> Vec<EmbeddedImage> {
    let mut distinct: Vec<EmbeddedImage> = Vec::new();
    for placed in images {
        if !distinct.iter().any(|image| image.id == placed.image.id) {
            distinct.push(placed.image);
        }
    }
    distinct
}

/// Relationships from the drawing to the media files
pub(crate) fn relationships(images: &[PlacedImage]) -> Vec<Relationship> {
    distinct_images(images)
        .iter()
        .map(|image| {
            let path = image.path();
            let file = path.trim_start_matches("xl/");
            Relationship::new(RelationshipKind::Image, format!("../{file}"))
        })
        .collect()
}

pub(crate) struct DrawingXml<'a> {
    images: &'a [PlacedImage],
    distinct: Vec<EmbeddedImage>,
    index: usize,
}

impl<'a> DrawingXml<'a> {
    pub(crate) fn new(images: &'a [PlacedImage]) -> Self {
        DrawingXml {
            images,
            distinct: distinct_images(images),
            index: 0,
        }
    }

    fn anchor(&self, position: usize, placed: &PlacedImage) -> Fragment {
        let relationship = self
            .distinct
            .iter()
            .position(|image| image.id == placed.image.id)
            .unwrap_or(0)
            + 1;
        let (width, height) = placed.size();
        let cx = u64::from(width) * EMU_PER_PIXEL;
        let cy = u64::from(height) * EMU_PER_PIXEL;
        let anchor = placed.canvas.anchor;
        let shape_id = position + 2;

        Fragment::raw(format!(
            "<xdr:oneCellAnchor><xdr:from><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff>\
             <xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from><xdr:ext cx=\"{cx}\" cy=\"{cy}\"/>",
            anchor.column - 1,
            anchor.row - 1
        ))
        .push(format!(
            "<xdr:pic><xdr:nvPicPr><xdr:cNvPr id=\"{shape_id}\" name=\"Image {}\"/>\
             <xdr:cNvPicPr><a:picLocks noChangeAspect=\"1\"/></xdr:cNvPicPr></xdr:nvPicPr>\
             <xdr:blipFill><a:blip xmlns:r=\"{RELATIONSHIPS_NS}\" r:embed=\"rId{relationship}\"/>\
             <a:stretch><a:fillRect/></a:stretch></xdr:blipFill>",
            position + 1
        ))
        .push(format!(
            "<xdr:spPr><a:xfrm><a:off x=\"0\" y=\"0\"/><a:ext cx=\"{cx}\" cy=\"{cy}\"/></a:xfrm>\
             <a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></xdr:spPr></xdr:pic>\
             <xdr:clientData/></xdr:oneCellAnchor>"
        ))
    }
}

impl FragmentSource for DrawingXml<'_> {
    fn next_fragment(&mut self) -> Option<Fragment> {
        let count = self.images.len();
        let index = self.index;
        self.index += 1;
        match index {
            0 => Some(Fragment::raw(XML_DECLARATION).push(
                "<xdr:wsDr xmlns:xdr=\"http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing\" \
                 xmlns:a=\"http://schemas.openxmlformats.org/drawingml/2006/main\">",
            )),
            i if i <= count => Some(self.anchor(i - 1, &self.images[i - 1])),
            i if i == count + 1 => Some(Fragment::raw("</xdr:wsDr>")),
            _ => None,
        }
    }
}
