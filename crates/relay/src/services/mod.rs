pub mod composer;
pub mod dispatcher;
pub mod error;
pub mod formatting;
pub mod names;
pub mod pipeline;
pub mod recipients;
