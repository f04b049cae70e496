//! UI module root: screen regions, column layout and the drawing functions for each region.

pub mod clients;
pub mod dashboard;
pub mod header;
pub mod layout;
pub mod surface;
pub mod util;
