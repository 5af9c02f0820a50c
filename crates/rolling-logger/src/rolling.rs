//! Size-Rotated Log File
//!
//! `<dir>/<app>.log` is the live file. When it would grow past `max_bytes`
//! it becomes `<app>.log.1`, older files shift up, and anything beyond
//! `max_files` is deleted.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub struct RollingFile {
    dir: PathBuf,
    base_name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open(dir: &Path, app_name: &str, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let base_name = format!("{}.log", app_name);
        let path = dir.join(&base_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir: dir.to_path_buf(),
            base_name,
            max_bytes,
            max_files,
            file,
            written,
        })
    }

    pub fn current_path(&self) -> PathBuf {
        self.dir.join(&self.base_name)
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", self.base_name, index))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        if self.max_files == 0 {
            // No history kept: truncate in place
            self.file = File::create(self.current_path())?;
            self.written = 0;
            return Ok(());
        }
        let oldest = self.rotated_path(self.max_files);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.max_files).rev() {
            let from = self.rotated_path(index);
            if from.exists() {
                fs::rename(&from, self.rotated_path(index + 1))?;
            }
        }
        fs::rename(self.current_path(), self.rotated_path(1))?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.current_path())?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotates_past_size_cap() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RollingFile::open(dir.path(), "app", 16, 2).unwrap();

        file.write_all(b"0123456789\n").unwrap();
        file.write_all(b"abcdefghij\n").unwrap();
        file.write_all(b"ABCDEFGHIJ\n").unwrap();
        file.flush().unwrap();

        let live = fs::read_to_string(dir.path().join("app.log")).unwrap();
        let first = fs::read_to_string(dir.path().join("app.log.1")).unwrap();
        let second = fs::read_to_string(dir.path().join("app.log.2")).unwrap();
        assert_eq!(live, "ABCDEFGHIJ\n");
        assert_eq!(first, "abcdefghij\n");
        assert_eq!(second, "0123456789\n");
    }

    #[test]
    fn test_keeps_at_most_max_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RollingFile::open(dir.path(), "app", 4, 1).unwrap();
        for line in ["aaaa", "bbbb", "cccc"] {
            file.write_all(line.as_bytes()).unwrap();
        }
        assert!(dir.path().join("app.log.1").exists());
        assert!(!dir.path().join("app.log.2").exists());
        assert_eq!(fs::read_to_string(dir.path().join("app.log.1")).unwrap(), "bbbb");
    }
}
