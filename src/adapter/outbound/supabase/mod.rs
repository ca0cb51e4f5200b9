//! Supabase adapters: PostgREST for reads/writes, Realtime for pushes.

pub mod dto;
pub mod realtime;
pub mod rest;

pub use realtime::SupabaseRealtime;
pub use rest::SupabaseTable;
