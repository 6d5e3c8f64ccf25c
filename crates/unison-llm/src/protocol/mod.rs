//! Wire format types for provider-specific API protocols
//!
//! Each module contains pure serde structs matching the respective provider's
//! JSON API format. They decode raw responses and stream chunks, and encode the
//! message params echoed back into a conversation; nothing outside
//! [`crate::convert`] inspects them field by field.

pub mod anthropic;
pub mod bedrock;
pub mod cohere;
pub mod google;
pub mod mistral;
pub mod openai;
