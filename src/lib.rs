//! AuthVault - user authentication microservice
//!
//! Registration, login and token-validity checking backed by a
//! single-active-token cache, plus a photo-verification upload path that
//! hands work off to a message queue.

pub mod app_state;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod producer;
pub mod routes;
pub mod services;
pub mod store;
pub mod token;
