use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Longest name component kept in a filename.
pub const MAX_NAME_CHARS: usize = 64;

/// URL prefix under which the images directory is served.
pub const IMAGE_URL_PREFIX: &str = "/static/generated_images";

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]").expect("static regex is valid"));

/// Writes generated images to disk and hands back their public URL.
///
/// Filenames carry a random 8-character suffix, so concurrent writers never
/// collide and the directory needs no locking.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `tattoo_{first}_{last}_{suffix}.png` with both names reduced to
    /// `[A-Za-z0-9_-]` and cut to `MAX_NAME_CHARS`.
    pub fn file_name(first_name: &str, last_name: &str) -> String {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "tattoo_{}_{}_{}.png",
            sanitize(first_name),
            sanitize(last_name),
            &suffix[..8]
        )
    }

    /// Saves `bytes` and returns the relative URL the file is served at.
    pub async fn save(
        &self,
        first_name: &str,
        last_name: &str,
        bytes: &[u8],
    ) -> std::io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = Self::file_name(first_name, last_name);
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes).await?;

        tracing::info!("Saved generated image: {} ({} bytes)", path.display(), bytes.len());
        Ok(format!("{}/{}", IMAGE_URL_PREFIX, filename))
    }
}

fn sanitize(name: &str) -> String {
    let mut safe = UNSAFE_FILENAME_CHARS
        .replace_all(name.trim(), "_")
        .into_owned();
    // Only ASCII survives the regex, so byte truncation is char-safe.
    safe.truncate(MAX_NAME_CHARS);
    safe
}
