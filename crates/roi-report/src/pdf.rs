//! Single-page PDF assembly around a rendered page bitmap.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::render::{PAGE_HEIGHT, PAGE_WIDTH};
use crate::ReportError;

fn pdf_err(e: impl std::fmt::Display) -> ReportError {
    ReportError::Pdf(e.to_string())
}

/// Embed `page` as a Flate-compressed RGB image filling a
/// `PAGE_WIDTH` x `PAGE_HEIGHT` point page.
pub fn single_page_pdf(page: &RgbImage) -> Result<Vec<u8>, ReportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(page.as_raw()).map_err(pdf_err)?;
    let pixels = encoder.finish().map_err(pdf_err)?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => Object::Integer(i64::from(page.width())),
            "Height" => Object::Integer(i64::from(page.height())),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => Object::Integer(8),
            "Filter" => "FlateDecode",
        },
        pixels,
    )
    .with_compression(false);
    let image_id = doc.add_object(image);

    let (w, h) = (i64::from(PAGE_WIDTH), i64::from(PAGE_HEIGHT));
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(w),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(h),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().map_err(pdf_err)?));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    });
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(w),
            Object::Integer(h),
        ],
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => Object::Integer(1),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).map_err(pdf_err)?;
    Ok(out)
}
