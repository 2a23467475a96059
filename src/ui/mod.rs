//! Terminal output for the interactive commands.

pub mod boxed;
pub mod icons;
pub mod spinner;

pub use boxed::{clean_status, print_box, render_box};
pub use spinner::Step;
