pub mod favorites;
pub mod follows;
pub mod microposts;
pub mod users;
