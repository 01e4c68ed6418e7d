pub mod text;

pub use text::NonBlank;
