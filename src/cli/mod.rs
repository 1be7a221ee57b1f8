pub mod setup;
pub mod show;
pub mod token;
pub mod ui;
pub mod watch;
