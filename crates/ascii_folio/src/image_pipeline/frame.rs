use image::{DynamicImage, RgbaImage};

/// RGBA8 pixel snapshot handed from a frame producer to the sampler.
///
/// Producers may redraw into the same frame every tick; the sampler only
/// borrows it for a single pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RasterFrame {
    image: RgbaImage,
}

impl RasterFrame {
    pub fn new(width: u32, height: u32) -> Self {
        Self { image: RgbaImage::new(width, height) }
    }

    /// Wraps a raw RGBA buffer. `None` when the length does not match
    /// `width * height * 4`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        RgbaImage::from_raw(width, height, data).map(|image| Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// RGBA of the pixel at `(x, y)`. Caller keeps coordinates in bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Resizes the backing buffer, keeping the allocation when the size is
    /// unchanged.
    pub fn ensure_size(&mut self, width: u32, height: u32) {
        if self.dimensions() != (width, height) {
            self.image = RgbaImage::new(width, height);
        }
    }
}

impl From<RgbaImage> for RasterFrame {
    fn from(image: RgbaImage) -> Self {
        Self { image }
    }
}

impl From<DynamicImage> for RasterFrame {
    fn from(image: DynamicImage) -> Self {
        Self { image: image.into_rgba8() }
    }
}
