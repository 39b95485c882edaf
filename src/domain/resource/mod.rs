pub mod datacenter;
pub mod frequency_level;
pub mod resource_pool;
pub mod virtual_machine;
