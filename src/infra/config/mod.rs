pub mod json;
pub mod secret;
