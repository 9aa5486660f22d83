/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: health check endpoint
/// - `devices`: device CRUD and the checkout/check-in assignment endpoints
/// - `users`: registration, listing, and login
/// - `uploads`: image attachment and retrieval
pub mod devices;
pub mod health;
pub mod uploads;
pub mod users;
