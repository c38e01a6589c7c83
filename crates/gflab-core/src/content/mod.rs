//! Text processing for board content: `@mention` / `#tag` extraction,
//! mention resolution against known users, and render segmentation.

pub mod extract;
pub mod render;
