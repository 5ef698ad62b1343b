//! UDC complaint tracker library
//!
//! This library exposes the core of the complaint tracker: identity,
//! complaints and notifications over a durable key-value store. The
//! `udc` binary is a thin command-line front end over it.

pub mod app;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod services;
pub mod storage;
