// src/lib.rs

//! crop-advisor client library

pub mod chart;
pub mod controller;
pub mod error;
pub mod models;
pub mod render;
pub mod services;
pub mod session;
pub mod utils;
