//! A minimal Redis-compatible key-value server.
//!
//! This crate provides an in-memory server speaking the Redis Serialization
//! Protocol (RESP) that supports:
//!
//! - String operations with optional expiry (GET, SET, INCR, EXISTS, DEL)
//! - Hash operations (HSET, HGET, HGETALL)
//! - Server commands (PING, ECHO, COMMAND)
//! - Durability through an append-only file that is replayed at startup
//!
//! Concurrent clients are served by one Tokio task per connection, all
//! sharing a single [`store::Store`] and [`aof::Aof`].

pub mod aof;
pub mod commands;
pub mod connection;
pub mod resp;
pub mod server;
pub mod store;
