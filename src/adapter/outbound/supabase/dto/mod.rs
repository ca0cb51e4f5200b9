//! Wire types for the Supabase REST and Realtime APIs.

pub mod message;
pub mod request;
