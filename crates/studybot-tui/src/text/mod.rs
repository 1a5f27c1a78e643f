//! Text layout helpers shared by the transcript and the compose box.

mod width;
mod wrap;

pub use width::{truncate_to_width, visual_width};
pub use wrap::wrap_lines;
