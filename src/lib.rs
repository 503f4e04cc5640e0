pub mod io;
pub mod model;
pub mod parse;
pub mod tui;
pub mod util;
