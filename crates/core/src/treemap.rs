use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use thiserror::Error;

/// Axis-aligned rectangle in integer pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0 || self.h <= 0
    }

    /// Move the left/top edges by `dx1`/`dy1` and the right/bottom edges by
    /// `dx2`/`dy2`. Width and height never go below zero.
    pub fn adjusted(&self, dx1: i32, dy1: i32, dx2: i32, dy2: i32) -> Rect {
        Rect {
            x: self.x + dx1,
            y: self.y + dy1,
            w: (self.w + dx2 - dx1).max(0),
            h: (self.h + dy2 - dy1).max(0),
        }
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// True when the two rectangles share a region of positive area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x.max(other.x) < self.right().min(other.right())
            && self.y.max(other.y) < self.bottom().min(other.bottom())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("aspect ratio undefined for big={big}, small={small}, a={a}, b={b}")]
    DegenerateAspect { big: f64, small: f64, a: f64, b: f64 },
    #[error("weight {weight} at index {index} is negative or not finite")]
    InvalidWeight { index: usize, weight: f64 },
    #[error("weights sum to zero")]
    ZeroTotal,
    #[error("weights are not sorted descending (index {index} is larger than its predecessor)")]
    Unsorted { index: usize },
}

/// Worst aspect ratio of a candidate row covering the cumulative fraction `b`
/// of a `big` x `small` rectangle, whose first (largest) member covers `a`.
///
/// Always `>= 1.0`; a value of `1.0` means the largest member is square.
pub fn norm_aspect(big: f64, small: f64, a: f64, b: f64) -> Result<f64, LayoutError> {
    if !(big > 0.0 && small > 0.0 && a > 0.0 && b > 0.0) {
        return Err(LayoutError::DegenerateAspect { big, small, a, b });
    }
    let x = (big * b) / (small * a / b);
    Ok(if x < 1.0 { 1.0 / x } else { x })
}

/// Check every weight and return them with a finite sum. Weights whose sum
/// overflows are rescaled by their maximum, which keeps their proportions and
/// order.
fn validate(weights: &[f64]) -> Result<(Cow<'_, [f64]>, f64), LayoutError> {
    let mut total = 0.0;
    let mut max: f64 = 0.0;
    for (index, &weight) in weights.iter().enumerate() {
        if !weight.is_finite() || weight < 0.0 {
            return Err(LayoutError::InvalidWeight { index, weight });
        }
        total += weight;
        max = max.max(weight);
    }
    if total <= 0.0 {
        return Err(LayoutError::ZeroTotal);
    }
    if total.is_finite() {
        return Ok((Cow::Borrowed(weights), total));
    }
    let scaled: Vec<f64> = weights.iter().map(|w| w / max).collect();
    let total = scaled.iter().sum();
    Ok((Cow::Owned(scaled), total))
}

/// Split `bounds` into one strip per weight, proportional to `weight / total`.
///
/// Strips stack vertically when `w <= h` and horizontally otherwise. Edges sit
/// at rounded cumulative fractions, so neighbours share an edge and the strips
/// tile `bounds` exactly. A zero weight yields a zero-extent strip.
pub fn slice_layout(weights: &[f64], bounds: Rect) -> Result<Vec<Rect>, LayoutError> {
    if weights.is_empty() {
        return Ok(Vec::new());
    }
    let (weights, total) = validate(weights)?;

    let vertical = bounds.w <= bounds.h;
    let extent = if vertical { bounds.h } else { bounds.w };
    let extent = extent.max(0);

    let mut rects = Vec::with_capacity(weights.len());
    let mut acc = 0.0;
    let mut start = 0;
    for (i, &weight) in weights.iter().enumerate() {
        acc += weight;
        let end = if i + 1 == weights.len() {
            extent
        } else {
            ((extent as f64 * acc / total).round() as i32).clamp(start, extent)
        };
        rects.push(if vertical {
            Rect::new(bounds.x, bounds.y + start, bounds.w, end - start)
        } else {
            Rect::new(bounds.x + start, bounds.y, end - start, bounds.h)
        });
        start = end;
    }
    Ok(rects)
}

/// Squarified treemap layout of descending-sorted `weights` inside `bounds`.
///
/// Returns one rectangle per weight, in input order, tiling `bounds`.
pub fn squarify_layout(weights: &[f64], bounds: Rect) -> Result<Vec<Rect>, LayoutError> {
    if weights.is_empty() {
        return Ok(Vec::new());
    }
    let (weights, _) = validate(weights)?;
    if let Some(i) = weights.windows(2).position(|pair| pair[1] > pair[0]) {
        return Err(LayoutError::Unsorted { index: i + 1 });
    }

    let mut rects = Vec::with_capacity(weights.len());
    let mut rest: &[f64] = &weights;
    let mut bounds = bounds;

    while !rest.is_empty() {
        let total: f64 = rest.iter().sum();
        if total <= 0.0 {
            // only zero weights left
            rects.extend(std::iter::repeat(Rect::new(bounds.x, bounds.y, 0, 0)).take(rest.len()));
            break;
        }
        if rest.len() == 1 || bounds.is_empty() {
            rects.extend(slice_layout(rest, bounds)?);
            break;
        }

        let tall = bounds.w < bounds.h;
        let (big, small) = if tall {
            (bounds.h as f64, bounds.w as f64)
        } else {
            (bounds.w as f64, bounds.h as f64)
        };

        // Grow the row while the largest member keeps getting squarer.
        let a = rest[0] / total;
        let mut b = a;
        let mut count = 1;
        let mut aspect = norm_aspect(big, small, a, b)?;
        while count < rest.len() {
            let q = rest[count] / total;
            let next = norm_aspect(big, small, a, b + q)?;
            if next > aspect {
                break;
            }
            aspect = next;
            b += q;
            count += 1;
        }

        let extent = if tall { bounds.h } else { bounds.w };
        let band = if count == rest.len() {
            extent
        } else {
            ((extent as f64 * b).round() as i32).clamp(0, extent)
        };
        let (row, remainder) = if tall {
            (
                Rect::new(bounds.x, bounds.y, bounds.w, band),
                Rect::new(bounds.x, bounds.y + band, bounds.w, bounds.h - band),
            )
        } else {
            (
                Rect::new(bounds.x, bounds.y, band, bounds.h),
                Rect::new(bounds.x + band, bounds.y, bounds.w - band, bounds.h),
            )
        };
        tracing::trace!(count, band, aspect, "squarify row");

        rects.extend(slice_layout(&rest[..count], row)?);
        rest = &rest[count..];
        bounds = remainder;
    }

    Ok(rects)
}
