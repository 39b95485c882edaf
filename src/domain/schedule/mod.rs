pub mod exec_window;
pub mod exec_window_store;
