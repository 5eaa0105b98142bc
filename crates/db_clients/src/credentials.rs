use crate::ClientError;

/// The credential-store collaborator.
///
/// Connection specs hold passwords encrypted; a keyring turns the ciphertext
/// back into the plaintext needed to build a connection URL. The cipher
/// itself lives outside this workspace. A failed decryption is an
/// [`ClientError::InvalidConnection`]: the datasource is unusable, exactly as
/// if the host were unreachable.
pub trait Keyring: Send + Sync {
    fn decrypt(&self, encrypted: &[u8]) -> Result<String, ClientError>;
}
