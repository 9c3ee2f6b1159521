//! Rectangle packing with a growing bounding box.
//!
//! Rectangles are placed largest-first at candidate corners left behind by
//! earlier placements. Each rectangle takes the candidate that grows the
//! bounding box the least, so same-sized groups fill in without leaving
//! half-empty shelves.

use crate::error::{AtlasError, Result};
use crate::input::Rectangle;

/// Where one rectangle ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    /// Position of the rectangle in the input slice.
    pub index: usize,
    /// Name of the rectangle (its source file name).
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    /// Whether the two boxes share any interior area.
    pub fn overlaps(&self, other: &Placement) -> bool {
        overlaps(
            (self.x, self.y, self.width, self.height),
            (other.x, other.y, other.width, other.height),
        )
    }
}

/// The packed arrangement of all rectangles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasLayout {
    /// Atlas width in pixels.
    pub width: u32,
    /// Atlas height in pixels.
    pub height: u32,
    /// One placement per input rectangle, in input order.
    pub placements: Vec<Placement>,
}

impl AtlasLayout {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Get the placement for a rectangle name.
    pub fn get(&self, name: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.name == name)
    }
}

/// Pack decoded rectangles.
pub fn pack(rectangles: &[Rectangle]) -> Result<AtlasLayout> {
    if rectangles.is_empty() {
        return Err(AtlasError::EmptyInput);
    }
    if let Some(bad) = rectangles.iter().find(|r| r.area() == 0) {
        return Err(bad.invalid());
    }

    let sizes: Vec<(u32, u32)> = rectangles.iter().map(|r| (r.width, r.height)).collect();
    let mut layout = pack_sizes(&sizes)?;
    for placement in &mut layout.placements {
        placement.name = rectangles[placement.index].name.clone();
    }
    Ok(layout)
}

/// Pack bare `(width, height)` pairs; placement names are left empty.
pub fn pack_sizes(sizes: &[(u32, u32)]) -> Result<AtlasLayout> {
    if sizes.is_empty() {
        return Err(AtlasError::EmptyInput);
    }
    if let Some((index, &(width, height))) = sizes
        .iter()
        .enumerate()
        .find(|(_, (w, h))| *w == 0 || *h == 0)
    {
        return Err(AtlasError::InvalidRectangle {
            name: format!("#{}", index),
            width,
            height,
        });
    }

    // Largest side first; sort_by_key is stable so ties keep input order.
    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(sizes[i].0.max(sizes[i].1)));

    let mut packer = Packer::default();
    let mut placed: Vec<Option<(u32, u32)>> = vec![None; sizes.len()];
    for &i in &order {
        let (w, h) = sizes[i];
        placed[i] = Some(packer.place(w, h));
    }

    let placements = placed
        .into_iter()
        .enumerate()
        .map(|(index, pos)| {
            let (x, y) = pos.unwrap_or_default();
            let (width, height) = sizes[index];
            Placement {
                index,
                name: String::new(),
                x,
                y,
                width,
                height,
            }
        })
        .collect();

    Ok(AtlasLayout {
        width: packer.width,
        height: packer.height,
        placements,
    })
}

/// Incremental packing state.
#[derive(Debug)]
struct Packer {
    width: u32,
    height: u32,
    /// Placed boxes as (x, y, w, h).
    boxes: Vec<(u32, u32, u32, u32)>,
    /// Candidate top-left corners, seeded with the origin.
    candidates: Vec<(u32, u32)>,
}

impl Default for Packer {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            boxes: Vec::new(),
            candidates: vec![(0, 0)],
        }
    }
}

impl Packer {
    /// Place a `w` x `h` rectangle and return its top-left corner.
    fn place(&mut self, w: u32, h: u32) -> (u32, u32) {
        // The right edge of the rightmost box is always a free candidate, so
        // growing the box is just picking one of the edge corners.
        let (x, y) = self.best_candidate(w, h).unwrap_or((self.width, 0));

        self.candidates.retain(|&c| c != (x, y));
        for corner in [(x + w, y), (x, y + h)] {
            if !self.candidates.contains(&corner) {
                self.candidates.push(corner);
            }
        }

        self.boxes.push((x, y, w, h));
        self.width = self.width.max(x + w);
        self.height = self.height.max(y + h);
        (x, y)
    }

    /// Cheapest free candidate: smallest resulting area, then smallest y, then x.
    fn best_candidate(&self, w: u32, h: u32) -> Option<(u32, u32)> {
        self.candidates
            .iter()
            .copied()
            .filter(|&(x, y)| self.is_free(x, y, w, h))
            .min_by_key(|&(x, y)| (self.area_with(x, y, w, h), y, x))
    }

    fn area_with(&self, x: u32, y: u32, w: u32, h: u32) -> u64 {
        let width = self.width.max(x + w) as u64;
        let height = self.height.max(y + h) as u64;
        width * height
    }

    fn is_free(&self, x: u32, y: u32, w: u32, h: u32) -> bool {
        !self.boxes.iter().any(|&b| overlaps((x, y, w, h), b))
    }
}

fn overlaps(a: (u32, u32, u32, u32), b: (u32, u32, u32, u32)) -> bool {
    let (ax, ay, aw, ah) = a;
    let (bx, by, bw, bh) = b;
    ax < bx + bw && bx < ax + aw && ay < by + bh && by < ay + ah
}
