pub mod content;
pub mod opportunity;
pub mod user;
