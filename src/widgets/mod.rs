pub mod charts;
pub mod controls;
pub mod datatable;
pub mod debug;
pub mod selector;
pub mod text_input;
