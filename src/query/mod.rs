//! Query evaluation: parameters in, selected and augmented records out.

pub mod embed;
pub mod params;
pub mod pipeline;
pub use embed::{embed, expand};
pub use params::*;
pub use pipeline::{run, PageLinks, Selection, Window};
