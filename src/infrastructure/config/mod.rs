//! Infrastructure configuration modules.

pub mod inventory;
pub mod logging;
pub mod realtime;
pub mod scroll;
pub mod settings;
pub mod supabase;
