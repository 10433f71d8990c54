pub mod resume;
pub mod roast;
