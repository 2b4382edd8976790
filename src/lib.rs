#![doc = "The `taskmaster` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, the authentication and authorization"]
#![doc = "subsystem (password hashing, access/refresh token lifecycle, request gates),"]
#![doc = "routing configuration, and error handling for the Taskmaster API."]
#![doc = "It is used by the main binary (`main.rs`) to construct and run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
