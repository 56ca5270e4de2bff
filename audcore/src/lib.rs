pub mod ac;
pub mod apikey;
pub mod error;
pub mod location;
pub mod logs;
pub mod pagination;
pub mod permission;
pub mod repo;
pub mod resource;
pub mod user;
pub mod validate;
