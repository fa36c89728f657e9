//! AdoptIndie Store - Storage ports and adapters
//!
//! This crate defines the record store and blob store ports and provides
//! in-memory, PostgreSQL/PostGIS and Supabase Storage adapters.

pub mod memory;
pub mod ports;
pub mod postgres;
pub mod supabase;
