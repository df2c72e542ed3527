use super::{Store, StoreError, YearlyData};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One `treasury-{year}.json` file per year under a data directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, year: i32) -> PathBuf {
        self.dir.join(format!("treasury-{}.json", year))
    }
}

impl Store for JsonFileStore {
    /// Written to a uniquely named temporary file in the same directory,
    /// then renamed over the old one.
    fn save(&self, year: i32, data: &YearlyData) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(year);

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, data)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|err| err.error)?;

        log::info!("Saved {} periods to {}", data.len(), path.display());
        Ok(())
    }

    fn load(&self, year: i32) -> Result<YearlyData, StoreError> {
        let path = self.path(year);
        if !path.exists() {
            log::debug!("{} not found, starting empty", path.display());
            return Ok(YearlyData::default());
        }
        let reader = BufReader::new(File::open(&path)?);
        let data: YearlyData = serde_json::from_reader(reader)?;
        log::debug!("Loaded {} periods from {}", data.len(), path.display());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::sample;
    use tempfile::TempDir;

    #[test]
    fn missing_year_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load(2030).unwrap().is_empty());
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        store.save(2024, &sample()).unwrap();

        assert!(store.path(2024).ends_with("treasury-2024.json"));
        assert_eq!(fs::read_dir(store.dir()).unwrap().count(), 1);
        assert_eq!(store.load(2024).unwrap(), sample());
        assert!(store.load(2023).unwrap().is_empty());
    }

    #[test]
    fn save_replaces_previous_year() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.save(2024, &sample()).unwrap();
        store.save(2024, &YearlyData::default()).unwrap();
        assert!(store.load(2024).unwrap().is_empty());
    }

    #[test]
    fn concurrent_saves_leave_one_complete_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        let data = sample();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| store.save(2024, &data).unwrap());
            }
        });

        assert_eq!(store.load(2024).unwrap(), data);
        let files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(files, vec![std::ffi::OsString::from("treasury-2024.json")]);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.path(2024), "{ not json").unwrap();
        assert!(matches!(store.load(2024), Err(StoreError::Json(_))));
    }
}
