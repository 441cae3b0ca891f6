use {
    super::FrameSource,
    crate::VideoError,
    image::{Image, load_image},
    std::path::{Path, PathBuf},
};

/// Image files in one directory, read in file name order.
#[derive(Debug)]
pub struct ImageDirectory {
    files: Vec<PathBuf>,
    next: usize,
}

impl ImageDirectory {
    /// List the files in `dir` whose extension matches `ext`.
    ///
    /// Matching ignores case and a leading dot in `ext`. Subdirectories are
    /// not searched.
    pub fn open(dir: impl AsRef<Path>, ext: &str) -> Result<Self, VideoError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(VideoError::PathNotFound(dir.to_path_buf()));
        }
        let ext = ext.trim().trim_start_matches('.');
        if ext.is_empty() {
            return Err(VideoError::Unsupported(
                "empty image extension".to_string(),
            ));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .and_then(|extension| extension.to_str())
                .is_some_and(|extension| extension.eq_ignore_ascii_case(ext));
            if matches {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        base::log_debug!("{}: {} .{} files", dir.display(), files.len(), ext);
        Ok(Self { files, next: 0 })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Iterator for ImageDirectory {
    type Item = Result<Image, VideoError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.get(self.next)?;
        self.next += 1;
        Some(
            load_image(path)
                .map_err(|error| VideoError::InvalidFrame(format!("{}: {}", path.display(), error))),
        )
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.files.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl FrameSource for ImageDirectory {
    fn total_frames(&self) -> Result<usize, VideoError> {
        Ok(self.files.len())
    }

    fn kind(&self) -> &'static str {
        "image directory"
    }
}
