pub mod escape;

pub use escape::{escape_text_into, needs_escape};
