//! Outbound adapters (driven side).

pub mod storage;
pub mod supabase;
