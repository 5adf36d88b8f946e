// File: raidbot-core/src/services/artifacts.rs
//
// Flat files read by the overlay: raid.txt, raid_game.txt, raid_pfp.png.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::Error;
use raidbot_common::models::RaidText;

pub const NAME_FILE: &str = "raid.txt";
pub const GAME_FILE: &str = "raid_game.txt";
pub const IMAGE_FILE: &str = "raid_pfp.png";

/// Hand-off point for resolved raid details.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn write(&self, text: &RaidText, profile_image: &[u8]) -> Result<(), Error>;
}

/// Overwrites the three overlay files in `dir` on every accepted raid.
pub struct FileArtifactWriter {
    dir: PathBuf,
}

impl FileArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ArtifactSink for FileArtifactWriter {
    async fn write(&self, text: &RaidText, profile_image: &[u8]) -> Result<(), Error> {
        tokio::fs::write(self.dir.join(NAME_FILE), text.name.as_bytes()).await?;
        tokio::fs::write(self.dir.join(GAME_FILE), text.game.as_bytes()).await?;
        tokio::fs::write(self.dir.join(IMAGE_FILE), profile_image).await?;
        debug!(
            "Wrote raid artifacts to {} (name='{}', game='{}', image={}B)",
            self.dir.display(),
            text.name,
            text.game,
            profile_image.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn writes_all_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileArtifactWriter::new(dir.path());
        let text = RaidText { name: "Alice".into(), game: "Chess".into() };

        assert_ok!(writer.write(&text, &[0x89, b'P', b'N', b'G']).await);

        assert_eq!(std::fs::read_to_string(dir.path().join(NAME_FILE)).unwrap(), "Alice");
        assert_eq!(std::fs::read_to_string(dir.path().join(GAME_FILE)).unwrap(), "Chess");
        assert_eq!(std::fs::read(dir.path().join(IMAGE_FILE)).unwrap(), vec![0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn game_file_is_emptied_on_next_raid() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileArtifactWriter::new(dir.path());
        writer.write(&RaidText { name: "A".into(), game: "Chess".into() }, &[]).await.unwrap();
        writer.write(&RaidText { name: "B playing Go".into(), game: String::new() }, &[]).await.unwrap();

        assert_eq!(std::fs::read_to_string(dir.path().join(NAME_FILE)).unwrap(), "B playing Go");
        assert_eq!(std::fs::read_to_string(dir.path().join(GAME_FILE)).unwrap(), "");
    }

    #[tokio::test]
    async fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FileArtifactWriter::new(dir.path().join("does/not/exist"));
        let res = writer.write(&RaidText::default(), &[]).await;
        assert!(matches!(assert_err!(res), Error::Io(_)));
    }
}
