pub mod ownership;
pub mod validation;
