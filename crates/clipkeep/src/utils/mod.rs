pub mod logging;
pub mod runtime;
pub mod ui;
