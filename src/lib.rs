//! Escriba - A blog backend API
//!
//! This library provides the core functionality for the Escriba blog
//! backend: user accounts and sessions, profiles with follow
//! relationships, articles with tags, categories and themes, likes and
//! notifications, all exposed over a REST API.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
