/**
 * Routes Module
 * API route handlers
 */

pub mod auth;
pub mod catalog;
pub mod content;
pub mod health;
pub mod media;
pub mod projects;
