//! session-gate web server.
//!
//! Runs the OIDC Authorization Code flow against an external identity
//! provider, keeps the resulting tokens in encrypted cookies, and guards the
//! protected routes with role checks on every request.

pub mod app;
pub mod auth;
pub mod config;
pub mod pages;

#[cfg(test)]
mod tests;
