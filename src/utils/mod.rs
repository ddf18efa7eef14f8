pub mod secrets;
pub mod terminal;
