pub mod book;
pub mod history;
