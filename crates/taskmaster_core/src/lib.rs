pub mod config;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod notify;
pub mod report;
pub mod storage;
pub mod task_api;
pub mod timestamp;
