#![doc = "The `listkeeper` library crate."]
#![doc = ""]
#![doc = "A small personal to-do list backend: registration, JWT login, email"]
#![doc = "verification, password reset, and CRUD on lists and tasks owned by a user."]
#![doc = "The binary (`main.rs`) wires these modules into an actix-web application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod mail;
pub mod models;
pub mod routes;
