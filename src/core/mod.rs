pub mod bucket;
pub mod candidate;
pub mod date_key;
pub mod group;
pub mod list_item;
