/// Database models for DeviceDesk
///
/// This module contains all database models and their store operations.
///
/// # Models
///
/// - `device`: tracked equipment, including the checkout/check-in
///   assignment operations
/// - `user`: accounts that can hold devices
pub mod device;
pub mod user;
