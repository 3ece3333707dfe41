//! E-learning platform backend.
//!
//! The interesting part is authentication and session lifecycle: JWT
//! access/refresh pairs carried in HTTP-only cookies, a redis-backed
//! session store holding the authoritative logged-in snapshot per user,
//! transparent token rotation, role-based authorization, and an
//! email-verified activation handshake built on self-contained signed
//! tokens.

pub mod auth;
pub mod configuration;
pub mod email_client;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod startup;
pub mod tasks;
pub mod telemetry;
pub mod users;
pub mod validators;
