/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: the `CredentialHasher` seam and its Argon2id
///   implementation
///
/// Login is a single stateless check against the stored digest; there is no
/// session or token layer.
pub mod password;
