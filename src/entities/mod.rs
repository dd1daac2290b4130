pub mod prelude;

pub mod facilities;
pub mod keywords;
pub mod users;
