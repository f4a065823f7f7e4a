//! Diagnostic Image Rendering
//!
//! The renderer only talks to a [`Rasterizer`], so any backend that can create a
//! canvas, fill it, draw a caption and encode the result can produce the image
//! payload. [`PngRasterizer`] is the default backend built on `image`/`imageproc`,
//! falling back to the `font8x8` bitmap glyphs when no outline font is supplied.

use crate::error::DspError;
use crate::graph::{ImageGraph, ImageKind};
use ab_glyph::{FontArc, PxScale};
use base64::{engine::general_purpose, Engine as _};
use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{ImageFormat, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

/// Cell size of the built-in bitmap glyphs
const BITMAP_GLYPH_SIZE: i32 = 8;

/// 8-bit RGB color
pub type Color = [u8; 3];

/// Text drawn onto the canvas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,
    /// Top-left corner in pixels
    pub origin: (i32, i32),
    pub color: Color,
    /// Glyph height in pixels
    pub scale: f32,
}

/// Encoded image bytes and their MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// Minimal raster-drawing backend
pub trait Rasterizer {
    type Canvas;

    /// Allocate a blank canvas
    fn create_canvas(&self, width: u32, height: u32) -> Result<Self::Canvas, DspError>;

    /// Fill the whole canvas with a solid color
    fn fill(&self, canvas: &mut Self::Canvas, color: Color);

    /// Draw a caption onto the canvas
    fn draw_text(&self, canvas: &mut Self::Canvas, caption: &Caption);

    /// Encode the canvas losslessly
    fn encode(&self, canvas: &Self::Canvas) -> Result<EncodedImage, DspError>;
}

/// Fixed rendering parameters for the image payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageOptions {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub caption: Caption,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            name: "Image from custom block".to_string(),
            width: 438,
            height: 146,
            background: [248, 86, 44],
            caption: Caption {
                text: "Hello world!".to_string(),
                origin: (10, 10),
                color: [255, 255, 255],
                scale: 11.0,
            },
        }
    }
}

/// PNG backend on top of `image`
///
/// Captions use `imageproc` with the supplied outline font, or the built-in
/// 8x8 bitmap glyphs when none is configured.
#[derive(Clone, Default)]
pub struct PngRasterizer {
    font: Option<FontArc>,
}

impl PngRasterizer {
    /// Backend drawing captions with the built-in bitmap glyphs
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend drawing captions with the given font
    pub fn with_font(font: FontArc) -> Self {
        Self { font: Some(font) }
    }

    /// Parse a TrueType/OpenType font from raw bytes
    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self, DspError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| DspError::Render(format!("invalid font: {e}")))?;
        Ok(Self::with_font(font))
    }

    /// Whether an outline font overrides the bitmap glyphs
    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }
}

/// Draw `text` with the 8x8 bitmap glyphs, clipping at the canvas edges
fn draw_bitmap_text(canvas: &mut RgbImage, caption: &Caption) {
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    let (x0, y0) = caption.origin;
    let color = Rgb(caption.color);

    for (idx, ch) in caption.text.chars().enumerate() {
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };
        let left = x0 + idx as i32 * BITMAP_GLYPH_SIZE;
        for (row, bits) in glyph.iter().enumerate() {
            let y = y0 + row as i32;
            for col in 0..BITMAP_GLYPH_SIZE {
                let x = left + col;
                if bits & (1 << col) != 0 && (0..width).contains(&x) && (0..height).contains(&y) {
                    canvas.put_pixel(x as u32, y as u32, color);
                }
            }
        }
    }
}

impl std::fmt::Debug for PngRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PngRasterizer")
            .field("font", &self.font.is_some())
            .finish()
    }
}

impl Rasterizer for PngRasterizer {
    type Canvas = RgbImage;

    fn create_canvas(&self, width: u32, height: u32) -> Result<RgbImage, DspError> {
        if width == 0 || height == 0 {
            return Err(DspError::Render(format!(
                "cannot create a {width}x{height} canvas"
            )));
        }
        Ok(RgbImage::new(width, height))
    }

    fn fill(&self, canvas: &mut RgbImage, color: Color) {
        for pixel in canvas.pixels_mut() {
            *pixel = Rgb(color);
        }
    }

    fn draw_text(&self, canvas: &mut RgbImage, caption: &Caption) {
        let Some(font) = &self.font else {
            draw_bitmap_text(canvas, caption);
            return;
        };
        let (x, y) = caption.origin;
        imageproc::drawing::draw_text_mut(
            canvas,
            Rgb(caption.color),
            x,
            y,
            PxScale::from(caption.scale),
            font,
            &caption.text,
        );
    }

    fn encode(&self, canvas: &RgbImage) -> Result<EncodedImage, DspError> {
        let mut bytes = Vec::new();
        canvas.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(EncodedImage {
            bytes,
            mime_type: "image/png",
        })
    }
}

/// Draws the diagnostic image and wraps it as a graph payload
#[derive(Debug, Clone)]
pub struct ImageRenderer<R> {
    rasterizer: R,
    options: ImageOptions,
}

impl<R: Rasterizer> ImageRenderer<R> {
    pub fn new(rasterizer: R, options: ImageOptions) -> Self {
        Self {
            rasterizer,
            options,
        }
    }

    pub fn options(&self) -> &ImageOptions {
        &self.options
    }

    pub fn render(&self) -> Result<ImageGraph, DspError> {
        let opts = &self.options;
        let mut canvas = self.rasterizer.create_canvas(opts.width, opts.height)?;
        self.rasterizer.fill(&mut canvas, opts.background);
        self.rasterizer.draw_text(&mut canvas, &opts.caption);

        let encoded = self.rasterizer.encode(&canvas)?;
        debug!(
            "Rendered {}x{} {} ({} bytes)",
            opts.width,
            opts.height,
            encoded.mime_type,
            encoded.bytes.len()
        );

        Ok(ImageGraph {
            name: opts.name.clone(),
            image: general_purpose::STANDARD.encode(&encoded.bytes),
            mime_type: encoded.mime_type.to_string(),
            kind: ImageKind::Image,
        })
    }
}
