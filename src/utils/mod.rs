pub mod id;
pub mod jwt;
pub mod validation;
