//! Temporary file naming for intermediate outputs.

use std::path::{Path, PathBuf};

/// Hands out unique paths inside one job work directory and remembers them
/// for cleanup.
#[derive(Debug, Clone)]
pub struct TempAllocator {
    dir: PathBuf,
    counter: usize,
    allocated: Vec<PathBuf>,
}

impl TempAllocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: 0,
            allocated: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<prefix>_<NNN>.<ext>`, numbered across all prefixes.
    pub fn allocate(&mut self, prefix: &str, ext: &str) -> PathBuf {
        let path = self
            .dir
            .join(format!("{}_{:03}.{}", prefix, self.counter, ext));
        self.counter += 1;
        self.allocated.push(path.clone());
        path
    }

    pub fn allocated(&self) -> &[PathBuf] {
        &self.allocated
    }

    pub fn into_paths(self) -> Vec<PathBuf> {
        self.allocated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_unique_and_tracked() {
        let mut temps = TempAllocator::new("/work/job");
        let a = temps.allocate("ad", "mp4");
        let b = temps.allocate("ad", "mp4");
        let c = temps.allocate("concat_main", "txt");

        assert_eq!(a, PathBuf::from("/work/job/ad_000.mp4"));
        assert_eq!(b, PathBuf::from("/work/job/ad_001.mp4"));
        assert_eq!(c, PathBuf::from("/work/job/concat_main_002.txt"));
        assert_eq!(temps.allocated().len(), 3);
    }
}
