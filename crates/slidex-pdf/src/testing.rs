//! PDF fixtures for unit tests

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// A document with one page per entry of `widths`
///
/// With `inherit_box` the media box lives on the page tree node instead of
/// the pages.
pub fn pdf_document(widths: &[i64], inherit_box: bool) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for (i, width) in widths.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Td", vec![10.into(), 10.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {}", i + 1))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

        let mut page = Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        if !inherit_box {
            page.set("MediaBox", media_box(*width));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut pages = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(widths.len() as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    if inherit_box {
        pages.set("MediaBox", media_box(widths.first().copied().unwrap_or(612)));
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}

/// Width of a page's own media box
pub fn media_box_width(doc: &Document, page_id: ObjectId) -> i64 {
    let page = doc.get_dictionary(page_id).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    media_box[2].as_i64().unwrap()
}

fn media_box(width: i64) -> Object {
    Object::Array(vec![0.into(), 0.into(), width.into(), 400.into()])
}
