//! PDF composer scenarios over fabricated single-page artifacts

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lopdf::{Dictionary, Document, Object};
use slidex_core::{AssemblyError, InMemoryStore, Settings, SlideId, SlideOutcome, SlideReference};
use slidex_pdf::{extract_page, page_count, PdfComposer, PdfError};

/// Write a PDF whose pages have the given media box widths
fn write_pdf(path: &Path, widths: &[i64]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let kids: Vec<Object> = widths
        .iter()
        .map(|width| {
            let page = Dictionary::from_iter([
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![0.into(), 0.into(), (*width).into(), 300.into()]),
                ),
            ]);
            Object::Reference(doc.add_object(page))
        })
        .collect();
    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(widths.len() as i64)),
            ("Kids", Object::Array(kids)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.save(path).unwrap();
}

fn widths(path: &Path) -> Vec<i64> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|id| {
            let page = doc.get_dictionary(*id).unwrap();
            page.get(b"MediaBox").unwrap().as_array().unwrap()[2].as_i64().unwrap()
        })
        .collect()
}

fn settings_in(dir: &Path) -> Settings {
    let mut settings = Settings::default();
    settings.storage.root = dir.to_path_buf();
    settings
}

/// Store with one rendered page per slide; deck positions follow `entries` order
fn rendered(dir: &Path, entries: &[(&str, &str, usize, i64)]) -> (InMemoryStore, Vec<PathBuf>) {
    let mut store = InMemoryStore::new();
    let mut paths = Vec::new();
    for (id, deck, index, width) in entries {
        let pdf = dir.join(format!("{}.pdf", id));
        write_pdf(&pdf, &[*width]);
        store.insert(SlideReference::new(*id, dir.join(deck), *index).with_slide_pdf(&pdf));
        paths.push(pdf);
    }
    (store, paths)
}

fn ids(raw: &[&str]) -> Vec<SlideId> {
    raw.iter().map(|s| SlideId::from(*s)).collect()
}

#[test]
fn three_pages_in_requested_order() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = rendered(
        dir.path(),
        &[("a", "deck.pptx", 0, 100), ("b", "deck.pptx", 1, 200), ("c", "deck.pptx", 2, 300)],
    );
    let settings = settings_in(dir.path());

    let assembly = PdfComposer::new(&store, &settings)
        .assemble(&ids(&["c", "a", "b"]), Some("merged"), true)
        .unwrap();

    let output = &assembly.report.output_path;
    assert_eq!(output, &dir.path().join("exports").join("merged.pdf"));
    assert_eq!(assembly.page_count, 3);
    assert_eq!(page_count(output).unwrap(), 3);
    assert_eq!(widths(output), vec![300, 100, 200]);
}

#[test]
fn canonical_order_without_preserve() {
    let dir = tempfile::tempdir().unwrap();
    let (store, _) = rendered(
        dir.path(),
        &[("a", "deck.pptx", 0, 100), ("b", "deck.pptx", 1, 200), ("c", "deck.pptx", 2, 300)],
    );
    let settings = settings_in(dir.path());

    let assembly = PdfComposer::new(&store, &settings)
        .assemble(&ids(&["c", "a", "b"]), None, false)
        .unwrap();
    assert_eq!(widths(&assembly.report.output_path), vec![100, 200, 300]);

    let name = assembly.report.output_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("assembled_") && name.ends_with(".pdf"), "{}", name);
}

#[test]
fn missing_rendered_page_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, paths) = rendered(
        dir.path(),
        &[("a", "deck.pptx", 0, 100), ("b", "deck.pptx", 1, 200), ("c", "deck.pptx", 2, 300)],
    );
    std::fs::remove_file(&paths[1]).unwrap();
    store.insert(SlideReference::new("never-rendered", dir.path().join("deck.pptx"), 3));
    let settings = settings_in(dir.path());

    let assembly = PdfComposer::new(&store, &settings)
        .assemble(&ids(&["a", "b", "c", "never-rendered"]), Some("partial.pdf"), true)
        .unwrap();

    assert_eq!(assembly.page_count, 2);
    assert_eq!(widths(&assembly.report.output_path), vec![100, 300]);
    assert_eq!(assembly.report.assembled_count(), 2);
    assert_eq!(
        assembly.report.outcome_for(&SlideId::from("b")),
        Some(&SlideOutcome::MissingArtifact {
            path: Some(paths[1].clone())
        })
    );
    assert_eq!(
        assembly.report.outcome_for(&SlideId::from("never-rendered")),
        Some(&SlideOutcome::MissingArtifact { path: None })
    );
}

/// Log sink shared between a test and its subscriber
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn missing_rendered_page_is_logged() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = rendered(dir.path(), &[("shown", "deck.pptx", 0, 100)]);
    store.insert(SlideReference::new("never-rendered", dir.path().join("deck.pptx"), 1));
    let settings = settings_in(dir.path());

    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let assembly = tracing::subscriber::with_default(subscriber, || {
        PdfComposer::new(&store, &settings).assemble(&ids(&["shown", "never-rendered"]), Some("logged.pdf"), true)
    })
    .unwrap();
    assert_eq!(assembly.page_count, 1);

    let text = log.text();
    let line = text
        .lines()
        .find(|l| l.contains("PDF not found for slide, skipping"))
        .unwrap_or_else(|| panic!("no warning in:\n{}", text));
    assert!(line.contains("WARN"), "{}", line);
    assert!(line.contains("slide_id=never-rendered"), "{}", line);
    assert!(!text.contains("slide_id=shown"), "{}", text);
}

#[test]
fn only_first_page_of_each_artifact_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("multi.pdf");
    write_pdf(&pdf, &[111, 222, 333]);
    let mut store = InMemoryStore::new();
    store.insert(SlideReference::new("m", dir.path().join("deck.pptx"), 0).with_slide_pdf(&pdf));
    let settings = settings_in(dir.path());

    let assembly = PdfComposer::new(&store, &settings)
        .assemble(&ids(&["m"]), Some("first.pdf"), true)
        .unwrap();
    assert_eq!(widths(&assembly.report.output_path), vec![111]);
}

#[test]
fn unreadable_artifact_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let (mut store, _) = rendered(dir.path(), &[("ok", "deck.pptx", 0, 100)]);
    let garbage = dir.path().join("garbage.pdf");
    std::fs::write(&garbage, b"not a pdf").unwrap();
    store.insert(SlideReference::new("bad", dir.path().join("deck.pptx"), 1).with_slide_pdf(&garbage));
    let settings = settings_in(dir.path());

    let assembly = PdfComposer::new(&store, &settings)
        .assemble(&ids(&["bad", "ok"]), Some("bad.pdf"), true)
        .unwrap();
    assert_eq!(assembly.page_count, 1);
    assert!(matches!(
        assembly.report.outcome_for(&SlideId::from("bad")),
        Some(SlideOutcome::Failed { .. })
    ));
}

#[test]
fn batch_errors() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path());
    let mut store = InMemoryStore::new();
    store.insert(SlideReference::new("unrendered", dir.path().join("deck.pptx"), 0));
    let composer = PdfComposer::new(&store, &settings);

    let err = composer.assemble(&[], None, true).unwrap_err();
    assert!(matches!(err, PdfError::Assembly(AssemblyError::NoSlidesProvided)));

    let err = composer.assemble(&ids(&["nonexistent-id"]), None, true).unwrap_err();
    assert!(matches!(err, PdfError::Assembly(AssemblyError::NoValidSlides { requested: 1 })));

    let err = composer.assemble(&ids(&["unrendered"]), None, true).unwrap_err();
    assert!(matches!(err, PdfError::Assembly(AssemblyError::NoValidSlides { requested: 1 })));
    assert!(!dir.path().join("exports").exists());
}

#[test]
fn extracted_pages_feed_the_composer() {
    let dir = tempfile::tempdir().unwrap();
    let deck_pdf = dir.path().join("deck.pdf");
    write_pdf(&deck_pdf, &[10, 20, 30]);
    let settings = settings_in(dir.path());

    let mut store = InMemoryStore::new();
    for index in 0..page_count(&deck_pdf).unwrap() {
        let id = format!("s{}", index);
        let page = settings.storage.slides_pdf_dir().join(format!("{}.pdf", id));
        extract_page(&deck_pdf, index, &page).unwrap();
        store.insert(SlideReference::new(id.as_str(), dir.path().join("deck.pptx"), index).with_slide_pdf(page));
    }

    let assembly = PdfComposer::new(&store, &settings)
        .assemble(&ids(&["s2", "s0"]), Some("picked.pdf"), true)
        .unwrap();
    assert_eq!(widths(&assembly.report.output_path), vec![30, 10]);
}
