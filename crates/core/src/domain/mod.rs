pub mod configuration;
pub mod quote;
pub mod variant;
