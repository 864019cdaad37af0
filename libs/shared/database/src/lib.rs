pub mod supabase;

pub use supabase::{DatabaseError, DbResult, SupabaseClient};
