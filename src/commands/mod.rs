pub mod config;
mod check;
mod entry;
mod fmt;
mod list;
mod parse;
mod render;
mod show;

pub use check::check;
pub use entry::entry;
pub use fmt::fmt;
pub use list::list;
pub use parse::parse;
pub use render::render;
pub use show::show;
