// src/handlers/mod.rs

pub mod admin;
pub mod catalog;
pub mod games;
pub mod grades;
