pub mod email;
pub mod inbound;
