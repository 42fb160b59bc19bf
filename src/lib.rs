pub mod compatibility;
pub mod config;
pub mod output;
pub mod radar;
pub mod reference;
pub mod scoring;
pub mod storage;
