//! Shared fixtures for slidex-pptx integration tests
//!
//! Decks are written with `zip` directly so the reader is exercised
//! against archives it did not produce itself.

#![allow(dead_code)]

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use slidex_core::{InMemoryStore, Settings, SlideReference};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Theme name the fixtures use, so copies of it are easy to spot
pub const SOURCE_THEME_NAME: &str = "Fixture Theme";

/// One slide of a fixture deck
#[derive(Debug, Clone)]
pub struct FixtureSlide {
    pub title: String,
    pub text_shapes: usize,
    pub image: bool,
    pub hyperlink: bool,
    pub ole: bool,
    pub chart: bool,
    pub notes: bool,
    /// Extra shape whose click jumps to the deck's first slide
    pub slide_jump: bool,
}

impl FixtureSlide {
    /// A slide with only a title
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            text_shapes: 0,
            image: false,
            hyperlink: false,
            ole: false,
            chart: false,
            notes: false,
            slide_jump: false,
        }
    }

    /// A slide exercising every dependency kind
    pub fn rich(title: &str) -> Self {
        Self {
            title: title.to_string(),
            text_shapes: 2,
            image: true,
            hyperlink: true,
            ole: true,
            chart: true,
            notes: true,
            slide_jump: false,
        }
    }

    pub fn with_text_shapes(mut self, n: usize) -> Self {
        self.text_shapes = n;
        self
    }

    pub fn with_slide_jump(mut self) -> Self {
        self.slide_jump = true;
        self
    }

    /// Shape elements this slide puts in its `p:spTree`
    pub fn shape_count(&self) -> usize {
        1 + self.text_shapes
            + usize::from(self.image)
            + usize::from(self.ole)
            + usize::from(self.chart)
            + usize::from(self.slide_jump)
    }
}

/// A multi-slide deck with the usual master/layout/theme chain
#[derive(Debug, Clone)]
pub struct DeckFixture {
    pub width: i64,
    pub height: i64,
    pub slides: Vec<FixtureSlide>,
}

impl DeckFixture {
    pub fn widescreen() -> Self {
        Self::new(9_144_000, 5_143_500)
    }

    pub fn standard() -> Self {
        Self::new(9_144_000, 6_858_000)
    }

    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width,
            height,
            slides: Vec::new(),
        }
    }

    pub fn slide(mut self, slide: FixtureSlide) -> Self {
        self.slides.push(slide);
        self
    }

    /// Write the deck into `dir` under `name`
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.to_bytes()).unwrap();
        path
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut put = |name: &str, body: &[u8]| {
            zip.start_file(name, options).unwrap();
            zip.write_all(body).unwrap();
        };

        put("[Content_Types].xml", self.content_types().as_bytes());
        put(
            "_rels/.rels",
            rels(&[("rId1", "officeDocument", "ppt/presentation.xml", false)]).as_bytes(),
        );
        put("ppt/presentation.xml", self.presentation_xml().as_bytes());

        let mut main_rels = vec![
            ("rId1".to_string(), "slideMaster", "slideMasters/slideMaster1.xml".to_string()),
            ("rId2".to_string(), "theme", "theme/theme1.xml".to_string()),
        ];
        for n in 1..=self.slides.len() {
            main_rels.push((format!("rId{}", n + 2), "slide", format!("slides/slide{}.xml", n)));
        }
        let main_rels: Vec<(&str, &str, &str, bool)> = main_rels
            .iter()
            .map(|(id, ty, target)| (id.as_str(), *ty, target.as_str(), false))
            .collect();
        put("ppt/_rels/presentation.xml.rels", rels(&main_rels).as_bytes());

        put("ppt/slideMasters/slideMaster1.xml", master_xml().as_bytes());
        put(
            "ppt/slideMasters/_rels/slideMaster1.xml.rels",
            rels(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml", false),
                ("rId2", "theme", "../theme/theme1.xml", false),
            ])
            .as_bytes(),
        );
        put("ppt/slideLayouts/slideLayout1.xml", layout_xml().as_bytes());
        put(
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
            rels(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml", false)]).as_bytes(),
        );
        put(
            "ppt/theme/theme1.xml",
            format!(r#"<?xml version="1.0" encoding="UTF-8"?><a:theme xmlns:a="{}" name="{}"/>"#, NS_A, SOURCE_THEME_NAME)
                .as_bytes(),
        );

        for (i, slide) in self.slides.iter().enumerate() {
            let n = i + 1;
            let (xml, slide_rels) = slide_parts(n, slide);
            put(&format!("ppt/slides/slide{}.xml", n), xml.as_bytes());
            let slide_rels: Vec<(&str, &str, &str, bool)> = slide_rels
                .iter()
                .map(|(id, ty, target, external)| (id.as_str(), *ty, target.as_str(), *external))
                .collect();
            put(&format!("ppt/slides/_rels/slide{}.xml.rels", n), rels(&slide_rels).as_bytes());

            if slide.image {
                put(&format!("ppt/media/image{}.png", n), &png(n as u8));
            }
            if slide.ole {
                put(&format!("ppt/embeddings/oleObject{}.bin", n), format!("OLE-{}", n).as_bytes());
            }
            if slide.chart {
                put(
                    &format!("ppt/charts/chart{}.xml", n),
                    format!(r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:externalData r:id="rId1" xmlns:r="{}"/></c:chartSpace>"#, NS_R).as_bytes(),
                );
                put(
                    &format!("ppt/charts/_rels/chart{}.xml.rels", n),
                    rels(&[(
                        "rId1",
                        "package",
                        &format!("../embeddings/Microsoft_Excel_Worksheet{}.xlsx", n),
                        false,
                    )])
                    .as_bytes(),
                );
                put(
                    &format!("ppt/embeddings/Microsoft_Excel_Worksheet{}.xlsx", n),
                    format!("XLSX-{}", n).as_bytes(),
                );
            }
            if slide.notes {
                put(
                    &format!("ppt/notesSlides/notesSlide{}.xml", n),
                    format!(r#"<p:notes xmlns:p="{}"/>"#, NS_P).as_bytes(),
                );
            }
        }

        zip.finish().unwrap();
        buffer.into_inner()
    }

    fn content_types(&self) -> String {
        let mut overrides = vec![
            ("/ppt/presentation.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"),
            ("/ppt/slideMasters/slideMaster1.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"),
            ("/ppt/slideLayouts/slideLayout1.xml".to_string(), "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"),
            ("/ppt/theme/theme1.xml".to_string(), "application/vnd.openxmlformats-officedocument.theme+xml"),
        ];
        for (i, slide) in self.slides.iter().enumerate() {
            let n = i + 1;
            overrides.push((format!("/ppt/slides/slide{}.xml", n), "application/vnd.openxmlformats-officedocument.presentationml.slide+xml"));
            if slide.chart {
                overrides.push((format!("/ppt/charts/chart{}.xml", n), "application/vnd.openxmlformats-officedocument.drawingml.chart+xml"));
            }
            if slide.notes {
                overrides.push((format!("/ppt/notesSlides/notesSlide{}.xml", n), "application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml"));
            }
        }

        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Default Extension="bin" ContentType="application/vnd.openxmlformats-officedocument.oleObject"/><Default Extension="xlsx" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"/>"#,
        );
        for (part, content_type) in overrides {
            xml.push_str(&format!(r#"<Override PartName="{}" ContentType="{}"/>"#, part, content_type));
        }
        xml.push_str("</Types>");
        xml
    }

    fn presentation_xml(&self) -> String {
        let ids: String = (0..self.slides.len())
            .map(|i| format!(r#"<p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 3))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="{}" cy="{}"/><p:notesSz cx="6858000" cy="9144000"/></p:presentation>"#,
            NS_A, NS_R, NS_P, ids, self.width, self.height
        )
    }
}

/// Slide XML plus its relationship rows `(id, type, target, external)`
fn slide_parts(n: usize, slide: &FixtureSlide) -> (String, Vec<(String, &'static str, String, bool)>) {
    let mut rows = vec![("rId1".to_string(), "slideLayout", "../slideLayouts/slideLayout1.xml".to_string(), false)];
    fn next(ty: &'static str, target: String, external: bool, rows: &mut Vec<(String, &'static str, String, bool)>) -> String {
        let id = format!("rId{}", rows.len() + 1);
        rows.push((id.clone(), ty, target, external));
        id
    }

    let mut shapes = String::new();
    let mut shape_id = 2;

    // Claims the lowest free id, the one the output table mints first after its layout
    let jump = if slide.slide_jump {
        let id = next("slide", "slide1.xml".to_string(), false, &mut rows);
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Jump"><a:hlinkClick r:id="{}" action="ppaction://hlinksldjump"/></p:cNvPr><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr/></p:sp>"#,
            100, id
        )
    } else {
        String::new()
    };

    let link = if slide.hyperlink {
        let id = next("hyperlink", format!("https://example.com/slide/{}", n), true, &mut rows);
        format!(r#"<a:hlinkClick r:id="{}"/>"#, id)
    } else {
        String::new()
    };
    shapes.push_str(&format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Title">{}</p:cNvPr><p:cNvSpPr/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr/><p:txBody><a:bodyPr/><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
        shape_id, link, slide.title
    ));
    shapes.push_str(&jump);
    shape_id += 1;

    for t in 0..slide.text_shapes {
        shapes.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="Text {}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="100"/><a:ext cx="500" cy="500"/></a:xfrm></p:spPr><p:txBody><a:bodyPr/><a:p><a:r><a:t>Body {}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            shape_id, t, 1000 * t, t
        ));
        shape_id += 1;
    }

    if slide.image {
        let id = next("image", format!("../media/image{}.png", n), false, &mut rows);
        shapes.push_str(&format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{}" name="Picture"/><p:cNvPicPr/><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr/></p:pic>"#,
            shape_id, id
        ));
        shape_id += 1;
    }

    if slide.ole {
        let id = next("oleObject", format!("../embeddings/oleObject{}.bin", n), false, &mut rows);
        shapes.push_str(&format!(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Object"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/presentationml/2006/ole"><p:oleObj r:id="{}" progId="Package"/></a:graphicData></a:graphic></p:graphicFrame>"#,
            shape_id, id
        ));
        shape_id += 1;
    }

    if slide.chart {
        let id = next("chart", format!("../charts/chart{}.xml", n), false, &mut rows);
        shapes.push_str(&format!(
            r#"<p:graphicFrame><p:nvGraphicFramePr><p:cNvPr id="{}" name="Chart"/><p:cNvGraphicFramePr/><p:nvPr/></p:nvGraphicFramePr><p:xfrm/><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" r:id="{}"/></a:graphicData></a:graphic></p:graphicFrame>"#,
            shape_id, id
        ));
    }

    if slide.notes {
        next("notesSlide", format!("../notesSlides/notesSlide{}.xml", n), false, &mut rows);
    }

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        NS_A, NS_R, NS_P, shapes
    );
    (xml, rows)
}

fn rels(rows: &[(&str, &str, &str, bool)]) -> String {
    let mut xml = format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{}">"#, NS_RELS);
    for (id, ty, target, external) in rows {
        let mode = if *external { r#" TargetMode="External""# } else { "" };
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"{}/>"#,
            id, REL, ty, target, mode
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn master_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name="Fixture Master"/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
        NS_A, NS_R, NS_P
    )
}

fn layout_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld name="Fixture Layout"><p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree></p:cSld></p:sldLayout>"#,
        NS_A, NS_R, NS_P
    )
}

/// Small PNG with a shade derived from `seed`
pub fn png(seed: u8) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(3, 2, image::Rgb([seed, 40, 200])));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
    bytes
}

/// Settings whose storage root is `dir`
pub fn settings_in(dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.storage.root = dir.to_path_buf();
    settings
}

/// Store holding one reference per `(id, deck, index)`
pub fn store_of<P: AsRef<Path>>(entries: &[(&str, P, usize)]) -> InMemoryStore {
    entries
        .iter()
        .map(|(id, deck, index)| SlideReference::new(*id, deck.as_ref(), *index))
        .collect()
}

/// Names of every entry in a written archive
pub fn entry_names(path: &Path) -> Vec<String> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

/// Contents of one archive entry as text
pub fn read_entry(path: &Path, name: &str) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut text = String::new();
    entry.read_to_string(&mut text).unwrap();
    text
}
