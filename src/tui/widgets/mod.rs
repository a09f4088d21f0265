pub mod color;
pub mod form;
pub mod help;
pub mod input;
pub mod status_bar;
pub mod task_list;
