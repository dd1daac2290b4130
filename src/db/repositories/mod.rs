pub mod facility;
pub mod keyword;
pub mod user;
