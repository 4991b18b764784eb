use std::fmt::Debug;

/// SigningCredential is the trait implemented by credentials used to sign requests.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check if the credential is valid.
    fn is_valid(&self) -> bool;
}
