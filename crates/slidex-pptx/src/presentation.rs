//! Source presentation reader
//!
//! Resolves the main presentation part, its ordered slide list and the
//! canvas size. Source packages are opened read-only and never modified.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use slidex_opc::xml::XmlElement;
use slidex_opc::{Package, PartName, RelOwner, Relationships};
use tracing::debug;
use zip::read::ZipArchive;

use crate::canvas::TargetCanvas;
use crate::constants::{NS_RELATIONSHIPS, NS_RELATIONSHIPS_STRICT};
use crate::error::{PptxError, Result};

/// An opened source presentation
#[derive(Debug)]
pub struct Presentation {
    package: Package,
    main_part: PartName,
    slides: Vec<PartName>,
    canvas: Option<TargetCanvas>,
}

impl Presentation {
    /// Open a presentation file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    /// Open a presentation from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(bytes)?)
    }

    /// Interpret a decoded package as a presentation
    pub fn from_package(package: Package) -> Result<Self> {
        let main_part = package
            .main_part()
            .ok_or_else(|| PptxError::invalid_presentation("no officeDocument relationship"))?;
        let main = package
            .part(&main_part)
            .ok_or_else(|| PptxError::missing_part(main_part.as_str()))?;
        let root = XmlElement::parse(&main.blob)?;

        let rel_prefixes = relationship_prefixes(&root);
        let owner = RelOwner::Part(main_part.clone());
        let mut slides = Vec::new();

        if let Some(list) = root.child("sldIdLst") {
            for entry in list.elements().filter(|e| e.local_name() == "sldId") {
                let Some(rid) = rel_prefixes
                    .iter()
                    .find_map(|prefix| entry.attr(&format!("{}:id", prefix)))
                else {
                    continue;
                };
                match package.relationship(&owner, rid).and_then(|r| r.target_part().cloned()) {
                    Some(slide) => slides.push(slide),
                    None => debug!(rid, "Slide list entry has no matching relationship"),
                }
            }
        }

        let canvas = root.child("sldSz").and_then(canvas_from_element);

        debug!(
            main = %main_part,
            slides = slides.len(),
            "Opened presentation"
        );

        Ok(Self {
            package,
            main_part,
            slides,
            canvas,
        })
    }

    /// Underlying part store
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// Name of the main presentation part
    pub fn main_part(&self) -> &PartName {
        &self.main_part
    }

    /// Number of slides in `p:sldIdLst`
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Slide part names in presentation order
    pub fn slide_parts(&self) -> &[PartName] {
        &self.slides
    }

    /// Part name of the slide at `index`
    pub fn slide_part(&self, index: usize) -> Result<&PartName> {
        self.slides.get(index).ok_or(PptxError::SlideIndexOutOfRange {
            index,
            count: self.slides.len(),
        })
    }

    /// Parsed XML of the slide at `index`
    pub fn slide_xml(&self, index: usize) -> Result<XmlElement> {
        let name = self.slide_part(index)?;
        let part = self
            .package
            .part(name)
            .ok_or_else(|| PptxError::missing_part(name.as_str()))?;
        Ok(XmlElement::parse(&part.blob)?)
    }

    /// Canvas size from `p:sldSz`, if present and valid
    pub fn canvas(&self) -> Option<TargetCanvas> {
        self.canvas
    }
}

/// Read only the canvas size of a presentation file
///
/// Touches just the package relationships and the main part, so it stays
/// cheap on large decks. `Ok(None)` means the file opened but declares no
/// usable `p:sldSz`.
pub fn read_canvas<P: AsRef<Path>>(path: P) -> Result<Option<TargetCanvas>> {
    let file = File::open(path)?;
    read_canvas_from(file)
}

/// [`read_canvas`] over any seekable reader
pub fn read_canvas_from<R: Read + Seek>(reader: R) -> Result<Option<TargetCanvas>> {
    let mut archive = ZipArchive::new(reader).map_err(slidex_opc::OpcError::from)?;

    let root_rels = read_entry(&mut archive, "_rels/.rels")?
        .ok_or_else(|| PptxError::invalid_presentation("missing _rels/.rels"))?;
    let rels = Relationships::parse(&root_rels)?;
    let main = rels
        .iter()
        .find(|(_, rel)| rel.rel_type.ends_with("/officeDocument"))
        .map(|(_, rel)| PartName::resolve("/", &rel.target))
        .ok_or_else(|| PptxError::invalid_presentation("no officeDocument relationship"))?;

    let Some(xml) = read_entry(&mut archive, main.zip_path())? else {
        return Err(PptxError::missing_part(main.as_str()));
    };

    let mut reader = Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) if e.local_name().as_ref() == b"sldSz" => {
                let mut cx = None;
                let mut cy = None;
                for attr in e.attributes().flatten() {
                    let value = std::str::from_utf8(&attr.value).ok().and_then(|v| v.parse::<i64>().ok());
                    match attr.key.as_ref() {
                        b"cx" => cx = value,
                        b"cy" => cy = value,
                        _ => {}
                    }
                }
                return Ok(valid_canvas(cx, cy));
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(slidex_opc::OpcError::Xml(e).into()),
            _ => {}
        }
        buf.clear();
    }
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            Ok(Some(contents))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(e) => Err(slidex_opc::OpcError::from(e).into()),
    }
}

fn canvas_from_element(element: &XmlElement) -> Option<TargetCanvas> {
    let cx = element.attr("cx").and_then(|v| v.parse().ok());
    let cy = element.attr("cy").and_then(|v| v.parse().ok());
    valid_canvas(cx, cy)
}

fn valid_canvas(cx: Option<i64>, cy: Option<i64>) -> Option<TargetCanvas> {
    match (cx, cy) {
        (Some(w), Some(h)) if w > 0 && h > 0 => Some(TargetCanvas::new(w, h)),
        _ => None,
    }
}

/// Prefixes bound to the relationships namespace on the root element
fn relationship_prefixes(root: &XmlElement) -> Vec<&str> {
    root.namespace_declarations()
        .into_iter()
        .filter(|(prefix, uri)| {
            !prefix.is_empty() && (*uri == NS_RELATIONSHIPS || *uri == NS_RELATIONSHIPS_STRICT)
        })
        .map(|(prefix, _)| prefix)
        .collect()
}
