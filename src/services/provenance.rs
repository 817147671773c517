//! Provenance file generation.
//!
//! After a successful build the job's output directory receives a fixed set
//! of plain-text files asserting authorship and integrity: the hash record,
//! the license notice, a security certificate, and a blockchain-verification
//! notice. Pure formatting and IO, no external calls.

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};

use crate::error::Result;
use crate::models::artifact::ArtifactKind;
use crate::models::job::Job;

/// Descriptor of one written provenance file.
#[derive(Debug, Clone)]
pub struct ProvenanceFile {
    pub filename: &'static str,
    pub path: PathBuf,
    pub size: i64,
    pub kind: ArtifactKind,
}

/// Writes the provenance file set for completed builds.
#[derive(Debug, Clone)]
pub struct ProvenanceWriter {
    owner: String,
    owner_email: Option<String>,
}

impl ProvenanceWriter {
    pub fn new(owner: impl Into<String>, owner_email: Option<String>) -> Self {
        Self {
            owner: owner.into(),
            owner_email,
        }
    }

    /// Emit the provenance files into `build_dir`.
    ///
    /// Each descriptor reports the byte length of the content actually
    /// written, not an estimate.
    pub async fn write(&self, build_dir: &Path, hash: &str, job: &Job) -> Result<Vec<ProvenanceFile>> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let contact = self
            .owner_email
            .as_deref()
            .map(|email| format!("Contact: {email}\n"))
            .unwrap_or_default();

        let hash_record = format!(
            "Author: {}\n{}Timestamp: {}\nSHA256: {}\n",
            self.owner, contact, timestamp, hash
        );
        let license = format!(
            "This software is protected by international copyright law.\nCreated by {}\n",
            self.owner
        );
        let certificate = format!(
            "SECURITY CERTIFICATE\n\
             ====================\n\
             Build:     {}\n\
             Source:    {}\n\
             Owner:     {}\n\
             Issued:    {}\n\
             SHA256:    {}\n\n\
             This certificate attests that the artifact set above was produced\n\
             by the owner's build pipeline and matches the recorded digest.\n",
            job.id, job.filename, self.owner, timestamp, hash
        );
        let blockchain = format!(
            "BLOCKCHAIN VERIFICATION RECORD\n\
             ==============================\n\
             Digest:    {}\n\
             Owner:     {}\n\
             Recorded:  {}\n\n\
             This notice records the digest for out-of-band verification.\n",
            hash, self.owner, timestamp
        );

        let files = [
            ("project_hash.txt", hash_record, ArtifactKind::Hash),
            ("LICENSE.txt", license, ArtifactKind::License),
            ("SECURITY_CERTIFICATE.txt", certificate, ArtifactKind::Certificate),
            ("BLOCKCHAIN_RECORD.txt", blockchain, ArtifactKind::Certificate),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (filename, content, kind) in files {
            let path = build_dir.join(filename);
            tokio::fs::write(&path, content.as_bytes()).await?;
            written.push(ProvenanceFile {
                filename,
                path,
                size: content.len() as i64,
                kind,
            });
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::{JobStatus, SourceType};
    use tempfile::TempDir;

    fn job() -> Job {
        Job {
            id: 7,
            filename: "app.py".into(),
            source: SourceType::File,
            source_url: None,
            status: JobStatus::Building,
            hash: None,
            build_time_secs: None,
            file_count: 0,
            created_at: Utc::now(),
            error_message: None,
            status_message: None,
        }
    }

    #[tokio::test]
    async fn writes_the_full_file_set_with_real_sizes() {
        let dir = TempDir::new().unwrap();
        let writer = ProvenanceWriter::new("Example Owner", None);
        let digest = "a".repeat(64);

        let files = writer.write(dir.path(), &digest, &job()).await.unwrap();
        assert_eq!(files.len(), 4);

        for file in &files {
            let on_disk = tokio::fs::metadata(&file.path).await.unwrap();
            assert_eq!(on_disk.len() as i64, file.size, "{}", file.filename);
        }

        let names: Vec<_> = files.iter().map(|f| f.filename).collect();
        assert!(names.contains(&"project_hash.txt"));
        assert!(names.contains(&"LICENSE.txt"));
        assert!(names.contains(&"SECURITY_CERTIFICATE.txt"));
        assert!(names.contains(&"BLOCKCHAIN_RECORD.txt"));
    }

    #[tokio::test]
    async fn hash_record_carries_owner_and_digest() {
        let dir = TempDir::new().unwrap();
        let writer = ProvenanceWriter::new("Example Owner", Some("owner@example.com".into()));
        let digest = "b".repeat(64);

        writer.write(dir.path(), &digest, &job()).await.unwrap();

        let record = tokio::fs::read_to_string(dir.path().join("project_hash.txt"))
            .await
            .unwrap();
        assert!(record.contains("Author: Example Owner"));
        assert!(record.contains("Contact: owner@example.com"));
        assert!(record.contains(&format!("SHA256: {digest}")));
    }

    #[tokio::test]
    async fn kinds_match_the_artifact_taxonomy() {
        let dir = TempDir::new().unwrap();
        let writer = ProvenanceWriter::new("Example Owner", None);
        let files = writer.write(dir.path(), "cafe", &job()).await.unwrap();

        let kind_of = |name: &str| files.iter().find(|f| f.filename == name).unwrap().kind;
        assert_eq!(kind_of("project_hash.txt"), ArtifactKind::Hash);
        assert_eq!(kind_of("LICENSE.txt"), ArtifactKind::License);
        assert_eq!(kind_of("SECURITY_CERTIFICATE.txt"), ArtifactKind::Certificate);
        assert_eq!(kind_of("BLOCKCHAIN_RECORD.txt"), ArtifactKind::Certificate);
    }
}
