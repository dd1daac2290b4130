pub use super::facilities::Entity as Facilities;
pub use super::keywords::Entity as Keywords;
pub use super::users::Entity as Users;
