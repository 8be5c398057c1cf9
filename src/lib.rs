pub mod graph;
pub mod history;
pub mod settings;
pub mod util;
