//! HTTP server for the wedding site: the JSON API used by the admin
//! dashboard and the public pages, plus static file serving.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
