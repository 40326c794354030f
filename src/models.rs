use crate::error::{Result, ScanError};
use crate::geometry::{closed_arc_length, polygon_area, Point};

/// Row-major 8-bit raster. One channel is grayscale, three channels are
/// interleaved in BGR order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl Image {
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(ScanError::InvalidImage(format!(
                "zero-area image {}x{}",
                width, height
            )));
        }
        if channels != 1 && channels != 3 {
            return Err(ScanError::InvalidImage(format!(
                "unsupported channel count {}",
                channels
            )));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(ScanError::InvalidImage(format!(
                "buffer holds {} bytes, {}x{}x{} needs {}",
                data.len(),
                width,
                height,
                channels,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Image with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> Result<Self> {
        let len = width as usize * height as usize * channels as usize;
        Self::new(width, height, channels, vec![value; len])
    }

    /// Build a single-channel image from a per-pixel function.
    pub fn from_fn_gray(width: u32, height: u32, f: impl Fn(u32, u32) -> u8) -> Result<Self> {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, 1, data)
    }

    /// Stage outputs whose dimensions are already known to be valid.
    pub(crate) fn zeroed(width: u32, height: u32, channels: u8) -> Self {
        debug_assert!(width > 0 && height > 0 && (channels == 1 || channels == 3));
        Self {
            width,
            height,
            channels,
            data: vec![0; width as usize * height as usize * channels as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn is_grayscale(&self) -> bool {
        self.channels == 1
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Samples of the pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let start = self.offset(x, y);
        &self.data[start..start + self.channels as usize]
    }

    /// First sample of the pixel at (x, y); the intensity of a grayscale image.
    pub fn luma(&self, x: u32, y: u32) -> u8 {
        self.data[self.offset(x, y)]
    }

    /// Number of non-zero samples.
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }
}

/// Closed boundary in traced order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed area by the shoelace formula, independent of trace direction.
    pub fn area(&self) -> f64 {
        polygon_area(&self.points)
    }

    pub fn perimeter(&self) -> f64 {
        closed_arc_length(&self.points)
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

/// Simplified contour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    points: Vec<Point>,
}

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Four-vertex document candidate.
///
/// Vertices keep their traced order. Rectification reads them
/// positionally as top-right, top-left, bottom-left, bottom-right.
#[derive(Debug, Clone, PartialEq)]
pub struct Quadrilateral {
    corners: [Point; 4],
    area: f64,
}

impl Quadrilateral {
    /// `area` is the enclosed area of the contour the polygon came from.
    pub fn new(corners: [Point; 4], area: f64) -> Self {
        Self { corners, area }
    }

    /// `None` unless the polygon has exactly four vertices.
    pub fn from_polygon(polygon: &Polygon, area: f64) -> Option<Self> {
        let corners: [Point; 4] = polygon.points().try_into().ok()?;
        Some(Self::new(corners, area))
    }

    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn top_right(&self) -> Point {
        self.corners[0]
    }

    pub fn top_left(&self) -> Point {
        self.corners[1]
    }

    pub fn bottom_left(&self) -> Point {
        self.corners[2]
    }

    pub fn bottom_right(&self) -> Point {
        self.corners[3]
    }

    /// Axis-aligned bounding box as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (i32, i32, i32, i32) {
        let mut b = (i32::MAX, i32::MAX, i32::MIN, i32::MIN);
        for p in &self.corners {
            b.0 = b.0.min(p.x);
            b.1 = b.1.min(p.y);
            b.2 = b.2.max(p.x);
            b.3 = b.3.max(p.y);
        }
        b
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_area() {
        assert!(matches!(
            Image::new(0, 10, 1, vec![]),
            Err(ScanError::InvalidImage(_))
        ));
    }

    #[test]
    fn rejects_unsupported_channels() {
        assert!(matches!(
            Image::new(2, 2, 4, vec![0; 16]),
            Err(ScanError::InvalidImage(_))
        ));
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(Image::new(4, 4, 3, vec![0; 47]).is_err());
    }

    #[test]
    fn pixel_access_is_row_major() {
        let img = Image::new(2, 2, 3, (0..12).collect()).unwrap();
        assert_eq!(img.pixel(1, 0), &[3, 4, 5]);
        assert_eq!(img.pixel(0, 1), &[6, 7, 8]);
        assert_eq!(img.luma(1, 1), 9);
    }

    #[test]
    fn quadrilateral_requires_four_vertices() {
        let tri = Polygon::new(vec![Point::new(0, 0), Point::new(5, 0), Point::new(0, 5)]);
        assert!(Quadrilateral::from_polygon(&tri, 12.5).is_none());

        let quad = Polygon::new(vec![
            Point::new(9, 0),
            Point::new(0, 0),
            Point::new(0, 9),
            Point::new(9, 9),
        ]);
        let q = Quadrilateral::from_polygon(&quad, 81.0).unwrap();
        assert_eq!(q.top_right(), Point::new(9, 0));
        assert_eq!(q.bottom_right(), Point::new(9, 9));
        assert_eq!(q.bounds(), (0, 0, 9, 9));
    }
}
