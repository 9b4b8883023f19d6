pub mod error;
pub mod logger;
pub mod markup;
pub mod validation;
