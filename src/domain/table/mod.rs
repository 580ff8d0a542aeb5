pub mod filter;
pub mod layout;
pub mod mappings;
pub mod na_policy;
pub mod row;
pub mod schema;
pub mod selection;
pub mod sort;
pub mod state;
