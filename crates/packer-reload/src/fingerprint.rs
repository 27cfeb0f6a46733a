use std::fmt;

use packer_config::EmittedAsset;

use crate::error::FingerprintError;

/// BLAKE3 digest of an artifact's content.
///
/// Two different buffers hashing to the same value are treated as unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint(blake3::Hash);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes))
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash an emitted artifact, reading it from disk when the bundler only
/// handed over its location.
pub async fn fingerprint(file: &str, asset: &EmittedAsset) -> Result<Fingerprint, FingerprintError> {
    match asset {
        EmittedAsset::Bytes(bytes) => Ok(Fingerprint::of(bytes)),
        EmittedAsset::OnDisk(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|source| FingerprintError::Unreadable {
                    file: file.to_string(),
                    source,
                })?;
            Ok(Fingerprint::of(&bytes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_content_equal_fingerprint() {
        assert_eq!(Fingerprint::of(b"body{}"), Fingerprint::of(b"body{}"));
        assert_ne!(Fingerprint::of(b"body{}"), Fingerprint::of(b"body{ }"));
        assert_eq!(Fingerprint::of(b"").to_hex().len(), 64);
    }

    #[tokio::test]
    async fn in_memory_and_on_disk_agree() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.js");
        std::fs::write(&path, "console.log(1)").unwrap();

        let on_disk = fingerprint("app.js", &EmittedAsset::OnDisk(path)).await.unwrap();
        let in_memory = fingerprint("app.js", &EmittedAsset::from("console.log(1)"))
            .await
            .unwrap();
        assert_eq!(on_disk, in_memory);
    }

    #[tokio::test]
    async fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let asset = EmittedAsset::OnDisk(dir.path().join("gone.css"));
        let err = fingerprint("gone.css", &asset).await.unwrap_err();
        let FingerprintError::Unreadable { file, .. } = err;
        assert_eq!(file, "gone.css");
    }
}
