// Supabase (PostgREST) implementation of the league data sources.

pub mod client;
pub mod query;

pub use client::{ClientError, SupabaseClient};
