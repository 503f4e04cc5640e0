pub mod app;
pub mod command;
pub mod editor;
pub mod keys;
pub mod render;
pub mod surface;
pub mod terminal;
pub mod theme;
pub mod undo;
pub mod view;

#[cfg(test)]
pub mod test_helpers;

pub use app::run;
