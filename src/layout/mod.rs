//! Grid layout planning.

pub mod planner;

pub use planner::{CardRect, GridLayoutPlanner, LayoutParams, CARD_ASPECT};
