//! Single-page PDF drawing backend for plotters
//!
//! Shapes become vector path operators and text is set in the standard
//! Helvetica font, so no font files are read or embedded. The page is
//! written once, on [`DrawingBackend::present`].
//!
//! Backend pixels map to 3/4 of a PDF point (96 dpi onto a 72 dpi page),
//! with the y axis flipped.

use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use plotters_backend::text_anchor::{HPos, VPos};
use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend,
    DrawingErrorKind, FontTransform,
};

const PT_PER_PX: f32 = 0.75;
const FONT: Name<'static> = Name(b"F1");
/// Average Helvetica advance as a fraction of the em.
const ADVANCE: f64 = 0.55;
/// plotters sizes fonts by line height; the em is this much smaller.
const LINE_TO_EM: f64 = 1.24;

/// Error raised when the finished page cannot be written.
#[derive(Debug, thiserror::Error)]
#[error("PDF write failed: {0}")]
pub struct PdfError(#[from] std::io::Error);

/// Draws one page and writes it to `path` on present.
pub struct PdfBackend {
    path: PathBuf,
    size: (u32, u32),
    title: String,
    content: Content,
    saved: bool,
}

impl std::fmt::Debug for PdfBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfBackend")
            .field("path", &self.path)
            .field("size", &self.size)
            .field("title", &self.title)
            .field("saved", &self.saved)
            .finish_non_exhaustive()
    }
}

impl PdfBackend {
    /// Create a page of `size` backend pixels titled `title`.
    #[must_use]
    pub fn new(path: &Path, size: (u32, u32), title: impl Into<String>) -> Self {
        Self {
            path: path.to_path_buf(),
            size,
            title: title.into(),
            content: Content::new(),
            saved: false,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn map(&self, (x, y): BackendCoord) -> (f32, f32) {
        (
            x as f32 * PT_PER_PX,
            (self.size.1 as f32 - y as f32) * PT_PER_PX,
        )
    }

    fn set_stroke(&mut self, style: &impl BackendStyle) {
        let (r, g, b) = on_white(style.color());
        #[allow(clippy::cast_precision_loss)]
        let width = style.stroke_width() as f32 * PT_PER_PX;
        self.content.set_stroke_rgb(r, g, b);
        self.content.set_line_width(width);
    }

    fn set_fill(&mut self, color: BackendColor) {
        let (r, g, b) = on_white(color);
        self.content.set_fill_rgb(r, g, b);
    }

    fn trace_path(&mut self, points: impl IntoIterator<Item = BackendCoord>) -> bool {
        let mut started = false;
        for point in points {
            let (x, y) = self.map(point);
            if started {
                self.content.line_to(x, y);
            } else {
                self.content.move_to(x, y);
                started = true;
            }
        }
        started
    }

    fn document(&mut self) -> Vec<u8> {
        let catalog_id = Ref::new(1);
        let tree_id = Ref::new(2);
        let page_id = Ref::new(3);
        let font_id = Ref::new(4);
        let content_id = Ref::new(5);
        let info_id = Ref::new(6);

        #[allow(clippy::cast_precision_loss)]
        let (width, height) = (
            self.size.0 as f32 * PT_PER_PX,
            self.size.1 as f32 * PT_PER_PX,
        );

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id).kids([page_id]).count(1);

        let mut page = pdf.page(page_id);
        page.media_box(Rect::new(0.0, 0.0, width, height));
        page.parent(tree_id);
        page.contents(content_id);
        page.resources().fonts().pair(FONT, font_id);
        page.finish();

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));
        pdf.document_info(info_id).title(TextStr(&self.title));

        let data = mem::replace(&mut self.content, Content::new()).finish();
        pdf.stream(content_id, &data);
        pdf.finish()
    }
}

/// Flatten a translucent color onto the white page.
fn on_white(color: BackendColor) -> (f32, f32, f32) {
    #[allow(clippy::cast_possible_truncation)]
    let alpha = color.alpha.clamp(0.0, 1.0) as f32;
    let blend = |c: u8| f32::from(c) / 255.0 * alpha + (1.0 - alpha);
    (blend(color.rgb.0), blend(color.rgb.1), blend(color.rgb.2))
}

/// Width and em of `text` in backend pixels.
fn text_extent(text: &str, line_height: f64) -> (f64, f64) {
    let em = line_height / LINE_TO_EM;
    #[allow(clippy::cast_precision_loss)]
    let width = text.chars().count() as f64 * em * ADVANCE;
    (width, em)
}

impl DrawingBackend for PdfBackend {
    type ErrorType = PdfError;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<PdfError>> {
        Ok(())
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<PdfError>> {
        if self.saved {
            return Ok(());
        }
        let bytes = self.document();
        fs::write(&self.path, bytes)
            .map_err(|e| DrawingErrorKind::DrawingError(PdfError::from(e)))?;
        self.saved = true;
        Ok(())
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        if color.alpha == 0.0 {
            return Ok(());
        }
        self.set_fill(color);
        let (x, y) = self.map(point);
        self.content.rect(x, y - PT_PER_PX, PT_PER_PX, PT_PER_PX);
        self.content.fill_nonzero();
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        self.draw_path([from, to], style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        let (x0, y0) = self.map(upper_left);
        let (x1, y1) = self.map(bottom_right);
        let (x, y) = (x0.min(x1), y0.min(y1));
        let (w, h) = ((x1 - x0).abs(), (y1 - y0).abs());
        if fill {
            self.set_fill(style.color());
            self.content.rect(x, y, w, h);
            self.content.fill_nonzero();
        } else {
            self.set_stroke(style);
            self.content.rect(x, y, w, h);
            self.content.stroke();
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        self.set_stroke(style);
        if self.trace_path(path) {
            self.content.stroke();
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        if style.color().alpha == 0.0 {
            return Ok(());
        }
        self.set_fill(style.color());
        if self.trace_path(vert) {
            self.content.close_path();
            self.content.fill_nonzero();
        }
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<PdfError>> {
        let color = style.color();
        if color.alpha == 0.0 {
            return Ok(());
        }

        let (width, em) = text_extent(text, style.size());
        let dx = match style.anchor().h_pos {
            HPos::Left => 0.0,
            HPos::Center => -width / 2.0,
            HPos::Right => -width,
        };
        let dy = match style.anchor().v_pos {
            VPos::Top => 0.76 * em,
            VPos::Center => 0.3 * em,
            VPos::Bottom => -0.24 * em,
        };

        let transform = style.transform();
        let angle: f32 = match transform {
            FontTransform::None => 0.0,
            FontTransform::Rotate90 => -90.0,
            FontTransform::Rotate180 => 180.0,
            FontTransform::Rotate270 => 90.0,
        };
        #[allow(clippy::cast_possible_truncation)]
        let (ox, oy) = transform.transform(dx.round() as i32, dy.round() as i32);
        let (x, y) = self.map((pos.0 + ox, pos.1 + oy));
        let (sin, cos) = angle.to_radians().sin_cos();
        #[allow(clippy::cast_possible_truncation)]
        let font_size = (em as f32) * PT_PER_PX;

        self.set_fill(color);
        self.content.begin_text();
        self.content.set_font(FONT, font_size);
        self.content.set_text_matrix([cos, sin, -sin, cos, x, y]);
        self.content.show(Str(text.as_bytes()));
        self.content.end_text();
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<PdfError>> {
        let (width, _) = text_extent(text, style.size());
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let extent = (width.ceil() as u32, style.size().ceil() as u32);
        Ok(extent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(path: &Path) -> String {
        String::from_utf8_lossy(&fs::read(path).unwrap()).into_owned()
    }

    #[test]
    fn test_on_white_blends_alpha() {
        let opaque = BackendColor { alpha: 1.0, rgb: (0, 0, 255) };
        assert_eq!(on_white(opaque), (0.0, 0.0, 1.0));

        let faint = BackendColor { alpha: 0.0, rgb: (0, 0, 0) };
        assert_eq!(on_white(faint), (1.0, 1.0, 1.0));
    }

    #[test]
    fn test_text_extent_scales_with_length() {
        let (short, em) = text_extent("ab", 12.4);
        let (long, _) = text_extent("abcd", 12.4);
        assert!((em - 10.0).abs() < 1e-9);
        assert!((long - 2.0 * short).abs() < 1e-9);
    }

    #[test]
    fn test_map_flips_y_axis() {
        let backend = PdfBackend::new(Path::new("unused.pdf"), (400, 200), "t");
        assert_eq!(backend.map((0, 0)), (0.0, 150.0));
        assert_eq!(backend.map((400, 200)), (300.0, 0.0));
    }

    #[test]
    fn test_present_writes_single_page_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.pdf");
        let mut backend = PdfBackend::new(&path, (320, 240), "Page title");
        let blue = BackendColor { alpha: 1.0, rgb: (0, 0, 255) };
        backend.draw_line((0, 0), (10, 10), &blue).unwrap();
        backend.present().unwrap();

        let pdf = read(&path);
        assert!(pdf.starts_with("%PDF-"));
        assert!(pdf.trim_end().ends_with("%%EOF"));
        assert!(pdf.contains("/Helvetica"));
        assert!(pdf.contains("/Title"));
    }

    #[test]
    fn test_present_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.pdf");
        let mut backend = PdfBackend::new(&path, (100, 100), "t");
        backend.present().unwrap();
        fs::remove_file(&path).unwrap();
        backend.present().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_present_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("page.pdf");
        let mut backend = PdfBackend::new(&path, (100, 100), "t");
        assert!(matches!(
            backend.present(),
            Err(DrawingErrorKind::DrawingError(PdfError(_)))
        ));
    }
}
