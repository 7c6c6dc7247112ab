pub mod config;
pub mod download;
pub mod humanize;
pub mod job;
pub mod observability;
pub mod storage;
pub mod validation;
pub mod workflow;
