//! Willpower Fitness backend library.
//!
//! This crate provides the backend functionality as a library,
//! allowing it to be tested and reused from the CLI.
//!
//! # Components
//!
//! - AI coaching chat ("Will Power") backed by the Groq chat completions API
//! - SQLite persistence for users, conversations, customers and orders
//! - Stripe webhook handling for membership lifecycle
//! - Printful fulfillment for the signup t-shirt bonus
//! - Lead capture with AI-personalized first responses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod groq;
pub mod models;
pub mod printful;
pub mod routes;
pub mod services;
pub mod state;
pub mod stripe;
