pub mod electricity;
pub mod reliability;
pub mod transfer;
