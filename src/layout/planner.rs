//! Grid layout: card rectangles for a viewport.
//!
//! Pure geometry. Calling [`GridLayoutPlanner::layout`] again after a
//! viewport change repositions the grid without touching any card state.

use serde::{Deserialize, Serialize};

/// Card width divided by card height.
pub const CARD_ASPECT: f32 = 0.75;

/// Viewport and spacing inputs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Space kept free above the grid (HUD).
    pub reserved_top: f32,
    /// Margin on the left, right and bottom.
    pub padding: f32,
    /// Space between adjacent cards.
    pub gap: f32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            viewport_width: 720.0,
            viewport_height: 1280.0,
            reserved_top: 100.0,
            padding: 40.0,
            gap: 15.0,
        }
    }
}

impl LayoutParams {
    #[must_use]
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Width available to the grid block.
    #[must_use]
    pub fn available_width(&self) -> f32 {
        (self.viewport_width - self.padding * 2.0).max(0.0)
    }

    /// Height available to the grid block.
    #[must_use]
    pub fn available_height(&self) -> f32 {
        (self.viewport_height - self.reserved_top - self.padding).max(0.0)
    }
}

/// Placement of one card. `x`/`y` are the card's center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CardRect {
    #[must_use]
    pub fn left(&self) -> f32 {
        self.x - self.width * 0.5
    }

    #[must_use]
    pub fn top(&self) -> f32 {
        self.y - self.height * 0.5
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width * 0.5
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height * 0.5
    }

    /// Hit test, for hosts that route raw pointer input.
    #[must_use]
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.left() && px <= self.right() && py >= self.top() && py <= self.bottom()
    }
}

/// Plans card placement for a `cols x rows` grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridLayoutPlanner;

impl GridLayoutPlanner {
    /// Card size that fits the available area at [`CARD_ASPECT`].
    #[must_use]
    pub fn card_size(cols: u32, rows: u32, params: &LayoutParams) -> (f32, f32) {
        if cols == 0 || rows == 0 {
            return (0.0, 0.0);
        }
        let cols_f = cols as f32;
        let rows_f = rows as f32;

        let mut card_w = ((params.available_width() - (cols_f - 1.0) * params.gap) / cols_f).max(0.0);
        let mut card_h = ((params.available_height() - (rows_f - 1.0) * params.gap) / rows_f).max(0.0);

        if card_h <= 0.0 || card_w <= 0.0 {
            return (0.0, 0.0);
        }

        // Shrink whichever side is too long for the aspect.
        if card_w / card_h > CARD_ASPECT {
            card_w = card_h * CARD_ASPECT;
        } else {
            card_h = card_w / CARD_ASPECT;
        }
        (card_w, card_h)
    }

    /// Rectangles for every cell, row-major.
    #[must_use]
    pub fn layout(cols: u32, rows: u32, params: &LayoutParams) -> Vec<CardRect> {
        let (card_w, card_h) = Self::card_size(cols, rows, params);
        let cols_f = cols as f32;
        let rows_f = rows as f32;

        let grid_w = cols_f * card_w + (cols_f - 1.0).max(0.0) * params.gap;
        let grid_h = rows_f * card_h + (rows_f - 1.0).max(0.0) * params.gap;

        let start_x = (params.viewport_width - grid_w) * 0.5 + card_w * 0.5;
        let start_y = params.reserved_top + (params.available_height() - grid_h) * 0.5 + card_h * 0.5;

        let mut rects = Vec::with_capacity(cols as usize * rows as usize);
        for r in 0..rows {
            for c in 0..cols {
                rects.push(CardRect {
                    x: start_x + c as f32 * (card_w + params.gap),
                    y: start_y + r as f32 * (card_h + params.gap),
                    width: card_w,
                    height: card_h,
                });
            }
        }
        rects
    }

    /// Position of the card under a point, if any.
    #[must_use]
    pub fn hit_test(rects: &[CardRect], px: f32, py: f32) -> Option<usize> {
        rects.iter().position(|rect| rect.contains(px, py))
    }
}
