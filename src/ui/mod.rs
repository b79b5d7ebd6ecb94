//! Terminal user interface for the board and comment threads.

pub mod app;
pub mod form;
pub mod view;

pub use app::run;
