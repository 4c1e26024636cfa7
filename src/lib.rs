pub mod engine;
pub mod flavor;
pub mod ludo;
pub mod misc;
pub mod simulate;
