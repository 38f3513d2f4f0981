mod auth;
mod common;
mod validation;
