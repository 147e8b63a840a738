pub mod font;

pub use font::Font5x7;
