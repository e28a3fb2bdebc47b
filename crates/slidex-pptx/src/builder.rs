//! Output presentation builder
//!
//! Starts from a fresh package carrying its own minimal template chain (one
//! master, one blank layout, one theme) and appends copied slides to it.
//! Slides always link to this chain; no source layout, master or theme is
//! ever brought in.

use chrono::Utc;
use slidex_opc::xml::{XmlElement, XmlNode, XML_DECLARATION};
use slidex_opc::{Package, PartName, PartNameAllocator, PartNameTemplate, RelOwner};
use tracing::debug;

use crate::canvas::TargetCanvas;
use crate::constants::*;
use crate::copier::{PartCopier, SlideCopyReport};
use crate::extractor::SlideFragment;
use crate::remap::{collect_references, RelationshipRemapper};

const MAIN_PART: &str = "/ppt/presentation.xml";
const MASTER_PART: &str = "/ppt/slideMasters/slideMaster1.xml";
const LAYOUT_PART: &str = "/ppt/slideLayouts/slideLayout1.xml";
const THEME_PART: &str = "/ppt/theme/theme1.xml";
const CORE_PART: &str = "/docProps/core.xml";
const APP_PART: &str = "/docProps/app.xml";

/// First id in `p:sldMasterIdLst` and `p:sldLayoutIdLst` (ids must exceed 2^31)
const FIRST_MASTER_ID: u32 = 2_147_483_648;

/// Prefixes every output slide declares itself
const SLIDE_PREFIXES: &[(&str, &str)] = &[
    ("a", NS_DRAWING),
    ("r", NS_RELATIONSHIPS),
    ("p", NS_PRESENTATION),
];

/// Assembles slides into a new presentation package
#[derive(Debug)]
pub struct PresentationBuilder {
    package: Package,
    names: PartNameAllocator,
    canvas: TargetCanvas,
    main: PartName,
    layout: PartName,
    master_rid: String,
    slides: Vec<(PartName, String)>,
}

impl PresentationBuilder {
    /// Create an empty presentation at `canvas`
    pub fn new(canvas: TargetCanvas) -> Self {
        let mut package = Package::new();
        let main = PartName::new(MAIN_PART);
        let master = PartName::new(MASTER_PART);
        let layout = PartName::new(LAYOUT_PART);
        let theme = PartName::new(THEME_PART);

        let root = RelOwner::Package;
        package.relate(&root, &main, REL_TYPE_OFFICE_DOCUMENT);
        package.relate(&root, &PartName::new(CORE_PART), REL_TYPE_CORE_PROPERTIES);
        package.relate(&root, &PartName::new(APP_PART), REL_TYPE_EXTENDED_PROPERTIES);

        let now = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        package.put_part(PartName::new(CORE_PART), CT_CORE_PROPERTIES, core_xml(&now).into_bytes());

        let main_owner = RelOwner::Part(main.clone());
        let master_rid = package.relate(&main_owner, &master, REL_TYPE_SLIDE_MASTER);
        package.relate(&main_owner, &theme, REL_TYPE_THEME);
        for (name, rel_type, content_type, xml) in [
            ("/ppt/presProps.xml", REL_TYPE_PRES_PROPS, CT_PRES_PROPS, pres_props_xml()),
            ("/ppt/viewProps.xml", REL_TYPE_VIEW_PROPS, CT_VIEW_PROPS, view_props_xml()),
            ("/ppt/tableStyles.xml", REL_TYPE_TABLE_STYLES, CT_TABLE_STYLES, table_styles_xml()),
        ] {
            let part = PartName::new(name);
            package.relate(&main_owner, &part, rel_type);
            package.put_part(part, content_type, xml.into_bytes());
        }

        let master_owner = RelOwner::Part(master.clone());
        let layout_rid = package.relate(&master_owner, &layout, REL_TYPE_SLIDE_LAYOUT);
        package.relate(&master_owner, &theme, REL_TYPE_THEME);
        package.relate(&RelOwner::Part(layout.clone()), &master, REL_TYPE_SLIDE_MASTER);

        package.put_part(master, CT_SLIDE_MASTER, master_xml(&layout_rid).into_bytes());
        package.put_part(layout.clone(), CT_SLIDE_LAYOUT, layout_xml().into_bytes());
        package.put_part(theme, CT_THEME, theme_xml().into_bytes());

        Self {
            package,
            names: PartNameAllocator::new(),
            canvas,
            main,
            layout,
            master_rid,
            slides: Vec::new(),
        }
    }

    /// Canvas of the output
    pub fn canvas(&self) -> TargetCanvas {
        self.canvas
    }

    /// Slides appended so far
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Append a copy of `fragment` as the next slide
    pub fn add_slide(&mut self, fragment: &SlideFragment) -> SlideCopyReport {
        let slide = self
            .names
            .next_name(&self.package, &PartNameTemplate::new("/ppt/slides", "slide", "xml"));
        let owner = RelOwner::Part(slide.clone());

        // Ids left unmapped keep their source value in the copied XML, so
        // nothing minted for this slide may reuse one of them.
        let referenced: Vec<String> = fragment
            .shapes
            .iter()
            .chain(fragment.background.as_ref())
            .flat_map(|element| collect_references(element, &fragment.namespaces))
            .collect();
        self.package
            .reserve_relationship_ids(&owner, referenced.iter().map(String::as_str));
        self.package.relate(&owner, &self.layout, REL_TYPE_SLIDE_LAYOUT);

        let relationships = PartCopier::new(fragment.source().package(), &mut self.package, &mut self.names)
            .copy_fragment(fragment, &slide);
        let mut report = SlideCopyReport {
            shapes_copied: 0,
            relationships,
        };

        let mapping = report.id_mapping();
        let remapper = RelationshipRemapper::new(&mapping).with_namespaces(&fragment.namespaces);
        let mut shapes = remapper.remap_all(&fragment.shapes);
        let mut background = fragment.background.as_ref().map(|bg| remapper.remap(bg));

        let (declarations, rebinds) = partition_namespaces(&fragment.namespaces);
        if !rebinds.is_empty() {
            for element in shapes.iter_mut().chain(background.as_mut()) {
                for (prefix, uri) in &rebinds {
                    element.set_attr(format!("xmlns:{}", prefix), uri.clone());
                }
            }
        }
        report.shapes_copied = shapes.len();

        let xml = slide_xml(&declarations, fragment.ignorable.as_deref(), background, shapes);
        self.package.put_part(slide.clone(), CT_SLIDE, xml.into_bytes());

        let rid = self
            .package
            .relate(&RelOwner::Part(self.main.clone()), &slide, REL_TYPE_SLIDE);
        debug!(
            slide = %slide,
            source = %fragment.slide_part,
            shapes = report.shapes_copied,
            "Appended slide"
        );
        self.slides.push((slide, rid));
        report
    }

    /// Write the presentation part and document properties and hand back the package
    pub fn finish(mut self) -> Package {
        let main_xml = presentation_xml(&self.master_rid, &self.slides, self.canvas);
        self.package
            .put_part(self.main.clone(), CT_PRESENTATION, main_xml.into_bytes());
        self.package.put_part(
            PartName::new(APP_PART),
            CT_EXTENDED_PROPERTIES,
            app_xml(self.slides.len(), self.canvas).into_bytes(),
        );
        self.package
    }
}

/// Split source declarations into ones the slide root can carry and ones
/// that rebind a prefix the root already uses
fn partition_namespaces(source: &[(String, String)]) -> (Vec<(String, String)>, Vec<(String, String)>) {
    let mut declarations: Vec<(String, String)> = SLIDE_PREFIXES
        .iter()
        .map(|(p, u)| (p.to_string(), u.to_string()))
        .collect();
    let mut rebinds = Vec::new();

    for (prefix, uri) in source {
        if prefix.is_empty() {
            continue;
        }
        match declarations.iter().find(|(p, _)| p == prefix) {
            Some((_, existing)) if existing == uri => {}
            Some(_) => rebinds.push((prefix.clone(), uri.clone())),
            None => declarations.push((prefix.clone(), uri.clone())),
        }
    }
    (declarations, rebinds)
}

fn slide_xml(
    declarations: &[(String, String)],
    ignorable: Option<&str>,
    background: Option<XmlElement>,
    shapes: Vec<XmlElement>,
) -> String {
    let mut root = XmlElement::new("p:sld");
    for (prefix, uri) in declarations {
        root.set_attr(format!("xmlns:{}", prefix), uri.clone());
    }
    if let Some(ignorable) = ignorable {
        if declarations.iter().any(|(p, _)| p == "mc") {
            root.set_attr("mc:Ignorable", ignorable);
        }
    }

    let group = XmlElement::new("p:nvGrpSpPr")
        .with_child(XmlElement::new("p:cNvPr").with_attr("id", "1").with_attr("name", ""))
        .with_child(XmlElement::new("p:cNvGrpSpPr"))
        .with_child(XmlElement::new("p:nvPr"));
    let transform = XmlElement::new("a:xfrm")
        .with_child(XmlElement::new("a:off").with_attr("x", "0").with_attr("y", "0"))
        .with_child(XmlElement::new("a:ext").with_attr("cx", "0").with_attr("cy", "0"))
        .with_child(XmlElement::new("a:chOff").with_attr("x", "0").with_attr("y", "0"))
        .with_child(XmlElement::new("a:chExt").with_attr("cx", "0").with_attr("cy", "0"));

    let mut tree = XmlElement::new("p:spTree")
        .with_child(group)
        .with_child(XmlElement::new("p:grpSpPr").with_child(transform));
    tree.children.extend(shapes.into_iter().map(XmlNode::Element));

    let mut common = XmlElement::new("p:cSld");
    if let Some(background) = background {
        common.children.push(XmlNode::Element(background));
    }
    common.children.push(XmlNode::Element(tree));

    root = root
        .with_child(common)
        .with_child(XmlElement::new("p:clrMapOvr").with_child(XmlElement::new("a:masterClrMapping")));
    root.to_document()
}

fn presentation_xml(master_rid: &str, slides: &[(PartName, String)], canvas: TargetCanvas) -> String {
    let mut slide_ids = String::new();
    for (n, (_, rid)) in slides.iter().enumerate() {
        slide_ids.push_str(&format!(
            "<p:sldId id=\"{}\" r:id=\"{}\"/>",
            FIRST_SLIDE_ID + n as u32,
            rid
        ));
    }
    let slide_list = if slides.is_empty() {
        String::new()
    } else {
        format!("<p:sldIdLst>{}</p:sldIdLst>", slide_ids)
    };

    format!(
        r#"{}
<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="{}" r:id="{}"/></p:sldMasterIdLst>{}<p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/><p:defaultTextStyle/></p:presentation>"#,
        XML_DECLARATION,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        FIRST_MASTER_ID,
        master_rid,
        slide_list,
        canvas.width,
        canvas.height,
        // Notes pages are portrait
        canvas.height,
        canvas.width
    )
}

fn app_xml(slide_count: usize, canvas: TargetCanvas) -> String {
    format!(
        r#"{}
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes"><TotalTime>0</TotalTime><Application>slidex</Application><PresentationFormat>{}</PresentationFormat><Slides>{}</Slides><Notes>0</Notes><HiddenSlides>0</HiddenSlides><ScaleCrop>false</ScaleCrop><LinksUpToDate>false</LinksUpToDate><SharedDoc>false</SharedDoc><AppVersion>{}</AppVersion></Properties>"#,
        XML_DECLARATION,
        canvas.format_label(),
        slide_count,
        app_version()
    )
}

/// `AppVersion` must look like `XX.YYYY`
fn app_version() -> String {
    let mut parts = env!("CARGO_PKG_VERSION").split('.');
    let major: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor: u32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    format!("{:02}.{:04}", major, minor)
}

fn core_xml(timestamp: &str) -> String {
    format!(
        r#"{}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>Assembled presentation</dc:title><dc:creator>slidex</dc:creator><cp:lastModifiedBy>slidex</cp:lastModifiedBy><dcterms:created xsi:type="dcterms:W3CDTF">{ts}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{ts}</dcterms:modified></cp:coreProperties>"#,
        XML_DECLARATION,
        ts = timestamp
    )
}

fn pres_props_xml() -> String {
    format!(
        r#"{}
<p:presentationPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"/>"#,
        XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
}

fn view_props_xml() -> String {
    format!(
        r#"{}
<p:viewPr xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:normalViewPr><p:restoredLeft sz="15620"/><p:restoredTop sz="94660"/></p:normalViewPr><p:gridSpacing cx="76200" cy="76200"/></p:viewPr>"#,
        XML_DECLARATION, NS_DRAWING, NS_RELATIONSHIPS, NS_PRESENTATION
    )
}

fn table_styles_xml() -> String {
    format!(
        r#"{}
<a:tblStyleLst xmlns:a="{}" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#,
        XML_DECLARATION, NS_DRAWING
    )
}

fn empty_tree() -> &'static str {
    r#"<p:spTree><p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/></p:spTree>"#
}

fn master_xml(layout_rid: &str) -> String {
    format!(
        r#"{}
<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg>{}</p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="{}" r:id="{}"/></p:sldLayoutIdLst></p:sldMaster>"#,
        XML_DECLARATION,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        empty_tree(),
        FIRST_MASTER_ID + 1,
        layout_rid
    )
}

fn layout_xml() -> String {
    format!(
        r#"{}
<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1"><p:cSld name="Blank">{}</p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        XML_DECLARATION,
        NS_DRAWING,
        NS_RELATIONSHIPS,
        NS_PRESENTATION,
        empty_tree()
    )
}

fn theme_xml() -> String {
    let colors = [
        ("dk2", "44546A"),
        ("lt2", "E7E6E6"),
        ("accent1", "4472C4"),
        ("accent2", "ED7D31"),
        ("accent3", "A5A5A5"),
        ("accent4", "FFC000"),
        ("accent5", "5B9BD5"),
        ("accent6", "70AD47"),
        ("hlink", "0563C1"),
        ("folHlink", "954F72"),
    ]
    .iter()
    .map(|(slot, rgb)| format!(r#"<a:{0}><a:srgbClr val="{1}"/></a:{0}>"#, slot, rgb))
    .collect::<String>();

    let fill = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let fills = fill.repeat(3);
    let lines = [6350, 12700, 19050]
        .iter()
        .map(|w| format!(r#"<a:ln w="{}">{}</a:ln>"#, w, fill))
        .collect::<String>();
    let effects = "<a:effectStyle><a:effectLst/></a:effectStyle>".repeat(3);
    let font = |face: &str| format!(r#"<a:latin typeface="{}"/><a:ea typeface=""/><a:cs typeface=""/>"#, face);

    format!(
        r#"{}
<a:theme xmlns:a="{}" name="slidex"><a:themeElements><a:clrScheme name="slidex"><a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1><a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>{}</a:clrScheme><a:fontScheme name="slidex"><a:majorFont>{}</a:majorFont><a:minorFont>{}</a:minorFont></a:fontScheme><a:fmtScheme name="slidex"><a:fillStyleLst>{}</a:fillStyleLst><a:lnStyleLst>{}</a:lnStyleLst><a:effectStyleLst>{}</a:effectStyleLst><a:bgFillStyleLst>{}</a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#,
        XML_DECLARATION,
        NS_DRAWING,
        colors,
        font("Calibri Light"),
        font("Calibri"),
        fills,
        lines,
        effects,
        fills
    )
}
