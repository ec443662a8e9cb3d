pub mod micropost;
pub mod user;
