pub mod alphabet;
pub mod api;
pub mod cipher;
pub mod config;
pub mod error;
pub mod kasiski;
pub mod keyspace;
pub mod scorer;
pub mod search;
// cmd and reports are binary modules (see main.rs).
