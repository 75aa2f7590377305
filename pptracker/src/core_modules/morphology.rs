// THEORY:
// Binary morphology cleans up the raw threshold mask before moments are taken.
//
// - Erosion replaces each pixel with the minimum over the structuring element,
//   which deletes specks smaller than the element.
// - Dilation replaces each pixel with the maximum, which grows regions back and
//   fills small gaps.
//
// `denoise` runs an open (erode, dilate) followed by a close (dilate, erode).
// Open removes isolated noise pixels, close fills pinholes inside the true
// blob.
//
// Neighbors that fall outside the image are skipped rather than treated as
// zero. A region touching the border therefore keeps its border pixels, and a
// fully "on" mask survives erosion unchanged.
//
// The element size is fixed in pixels, so the filter's effect depends on the
// frame resolution.

use crate::core_modules::frame::Mask;
use image::Luma;

/// The default element is 5x5: half-size 2 in each direction.
pub const DEFAULT_HALF_SIZE: (u32, u32) = (2, 2);

/// A neighborhood shape with its anchor at the geometric center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl StructuringElement {
    /// A filled ellipse inscribed in a `(2*half_width+1) x (2*half_height+1)` box.
    ///
    /// Row `i` covers the columns `c - dx ..= c + dx` (clipped), where
    /// `dx = round(c * sqrt((r^2 - (i - r)^2) / r^2))`, `r = half_height` and
    /// `c = half_width`.
    pub fn ellipse(half_width: u32, half_height: u32) -> Self {
        let width = 2 * half_width + 1;
        let height = 2 * half_height + 1;
        let r = half_height as i32;
        let c = half_width as i32;
        let inverse_r2 = if r > 0 { 1.0 / f64::from(r * r) } else { 0.0 };

        let mut cells = vec![false; (width * height) as usize];
        for i in 0..height as i32 {
            let dy = i - r;
            let dx = if r > 0 {
                (f64::from(c) * (f64::from(r * r - dy * dy) * inverse_r2).sqrt()).round() as i32
            } else {
                c
            };
            let start = (c - dx).max(0);
            let end = (c + dx + 1).min(width as i32);
            for j in start..end {
                cells[(i as u32 * width + j as u32) as usize] = true;
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, column: u32, row: u32) -> bool {
        column < self.width && row < self.height && self.cells[(row * self.width + column) as usize]
    }

    /// Offsets of the active cells relative to the anchor.
    fn offsets(&self) -> Vec<(i32, i32)> {
        let anchor_x = (self.width / 2) as i32;
        let anchor_y = (self.height / 2) as i32;
        (0..self.height)
            .flat_map(|row| (0..self.width).map(move |column| (column, row)))
            .filter(|&(column, row)| self.contains(column, row))
            .map(|(column, row)| (column as i32 - anchor_x, row as i32 - anchor_y))
            .collect()
    }
}

impl Default for StructuringElement {
    fn default() -> Self {
        Self::ellipse(DEFAULT_HALF_SIZE.0, DEFAULT_HALF_SIZE.1)
    }
}

/// Single-pass erosion and dilation over a binary mask.
pub trait MorphologyFilter {
    fn erode(&self, mask: &Mask) -> Mask;
    fn dilate(&self, mask: &Mask) -> Mask;
}

/// Morphology with an arbitrary structuring element.
#[derive(Debug, Clone)]
pub struct ElementMorphology {
    offsets: Vec<(i32, i32)>,
}

impl ElementMorphology {
    pub fn new(element: StructuringElement) -> Self {
        Self {
            offsets: element.offsets(),
        }
    }

    pub fn ellipse(half_width: u32, half_height: u32) -> Self {
        Self::new(StructuringElement::ellipse(half_width, half_height))
    }

    fn apply(&self, mask: &Mask, pick: fn(u8, u8) -> u8, identity: u8) -> Mask {
        let (width, height) = mask.dimensions();
        Mask::from_fn(width, height, |x, y| {
            let mut result = identity;
            for &(dx, dy) in &self.offsets {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                    continue;
                }
                result = pick(result, mask.get_pixel(nx as u32, ny as u32).0[0]);
            }
            Luma([result])
        })
    }
}

impl Default for ElementMorphology {
    fn default() -> Self {
        Self::new(StructuringElement::default())
    }
}

impl MorphologyFilter for ElementMorphology {
    fn erode(&self, mask: &Mask) -> Mask {
        self.apply(mask, u8::min, u8::MAX)
    }

    fn dilate(&self, mask: &Mask) -> Mask {
        self.apply(mask, u8::max, u8::MIN)
    }
}

/// Open then close: erode, dilate, dilate, erode.
pub fn denoise<F: MorphologyFilter + ?Sized>(filter: &F, mask: &Mask) -> Mask {
    let opened = filter.dilate(&filter.erode(mask));
    filter.erode(&filter.dilate(&opened))
}
