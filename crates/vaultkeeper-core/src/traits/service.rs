//! Service marker trait.

/// Marker trait for business logic services.
///
/// Services in `vaultkeeper-service` implement this trait so they can be
/// shared behind `Arc` across request handlers.
pub trait Service: Send + Sync + 'static {}
