//! Genome blobs and JSON files on disk.

use crate::neat::Genome;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Writes and reads bincode-encoded genomes inside one output directory.
#[derive(Debug, Clone)]
pub struct GenomeStore {
    dir: PathBuf,
}

impl GenomeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Save `genome` as `file_name`, replacing any previous file of that name.
    pub fn save(&self, file_name: &str, genome: &Genome) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let data =
            bincode::serialize(genome).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let path = self.path(file_name);
        fs::write(&path, data)?;
        Ok(path)
    }

    pub fn load(path: &Path) -> io::Result<Genome> {
        let data = fs::read(path)?;
        bincode::deserialize(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Load a JSON file. Missing fields fall back to the type's serde defaults.
pub fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> io::Result<T> {
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Save a value as pretty-printed JSON.
pub fn save_json<T: serde::Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neat::genome::NodeIndexer;
    use crate::neat::NeatConfig;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "flappy_evolve_persistence_{}_{}",
            name,
            std::process::id()
        ));
        fs::remove_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn test_genome_save_and_load() {
        let config = NeatConfig::default();
        let mut indexer = NodeIndexer::new(&config);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut genome = Genome::new(7, &config, &mut indexer, &mut rng);
        genome.fitness = 12.5;

        let dir = temp_dir("genome");
        let store = GenomeStore::new(&dir);
        let path = store.save("best.genome", &genome).expect("save should succeed");
        assert_eq!(path, dir.join("best.genome"));

        let loaded = GenomeStore::load(&path).expect("load should succeed");
        assert_eq!(loaded, genome);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_save_overwrites() {
        let dir = temp_dir("overwrite");
        let store = GenomeStore::new(&dir);
        store.save("best.genome", &Genome::empty(1)).unwrap();
        let path = store.save("best.genome", &Genome::empty(2)).unwrap();
        assert_eq!(GenomeStore::load(&path).unwrap().key, 2);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_garbage_is_invalid_data() {
        let dir = temp_dir("garbage");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.genome");
        fs::write(&path, [0xFFu8; 3]).unwrap();

        let err = GenomeStore::load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_load_missing_file() {
        let err = GenomeStore::load(Path::new("/nonexistent/flappy/best.genome")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = temp_dir("json");
        let path = dir.join("config.json");
        let data = vec![1u32, 2, 3];
        save_json(&path, &data).unwrap();
        let loaded: Vec<u32> = load_json(&path).unwrap();
        assert_eq!(loaded, data);
        fs::remove_dir_all(dir).ok();
    }
}
