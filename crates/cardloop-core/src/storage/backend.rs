//! Key/value backend trait.

use crate::error::Result;

/// A raw string key/value store.
///
/// This trait defines the contract for the persistence medium, decoupling
/// the engines from the specific storage mechanism (files, memory, a host
/// application's local storage).
///
/// # Implementation Notes
///
/// Implementations report failures honestly; swallowing them is the job of
/// [`Storage`](super::Storage). Removing a missing key is not an error.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: Value found
    /// - `Ok(None)`: Key not present
    /// - `Err(_)`: The backend could not be read
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a value (or does nothing if it didn't exist).
    fn remove(&self, key: &str) -> Result<()>;
}
