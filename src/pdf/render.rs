// src/pdf/render.rs
//! Serialise a [`Layout`] to PDF bytes with the built-in Helvetica faces.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, Pt};

use super::layout::{Font, Layout, PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::{ApiError, ApiResult};

const LAYER_NAME: &str = "Layer 1";

fn pdf_error(e: printpdf::Error) -> ApiError {
    log::error!("PDF generation failed: {}", e);
    ApiError::InternalServerError("Failed to generate PDF".to_string())
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

impl Fonts {
    fn get(&self, font: Font) -> &IndirectFontRef {
        match font {
            Font::Helvetica => &self.regular,
            Font::HelveticaBold => &self.bold,
            Font::HelveticaOblique => &self.oblique,
        }
    }
}

pub fn render(layout: &Layout) -> ApiResult<Vec<u8>> {
    let width = Mm::from(Pt(PAGE_WIDTH));
    let height = Mm::from(Pt(PAGE_HEIGHT));

    let (doc, first_page, first_layer) = PdfDocument::new(layout.title.as_str(), width, height, LAYER_NAME);

    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?,
        oblique: doc.add_builtin_font(BuiltinFont::HelveticaOblique).map_err(pdf_error)?,
    };

    for (index, page) in layout.pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for run in &page.runs {
            layer.use_text(
                run.text.as_str(),
                run.size,
                Mm::from(Pt(run.x)),
                Mm::from(Pt(run.y)),
                fonts.get(run.font),
            );
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::layout::{Page, TextRun};

    fn page(text: &str) -> Page {
        Page {
            runs: vec![TextRun { x: 100.0, y: 770.0, size: 12.0, font: Font::Helvetica, text: text.into() }],
        }
    }

    #[test]
    fn test_render_produces_pdf() {
        let layout = Layout { title: "Test".into(), pages: vec![page("one"), page("two")] };
        let bytes = render(&layout).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 200);
    }
}
