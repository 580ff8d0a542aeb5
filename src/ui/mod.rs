pub mod state;
pub mod table_view;
