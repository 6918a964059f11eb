pub mod dropdown;
pub mod search_shortcut;
