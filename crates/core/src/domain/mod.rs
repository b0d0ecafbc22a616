pub mod message;
pub mod pokemon;
