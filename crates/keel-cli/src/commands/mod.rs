pub mod allocation;
pub mod attachment;
pub mod audit;
pub mod csat;
pub mod dashboard;
pub mod dispatch;
pub mod doc;
pub mod esat;
pub mod finance;
pub mod init;
pub mod lead;
pub mod member;
pub mod project;
pub mod schema;
pub mod shared;
pub mod task;
