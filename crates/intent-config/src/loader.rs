//! Deployment files split across several TOML documents.
//!
//! A deployment usually keeps its chain list apart from relay settings so the
//! same `networks.toml` can back several environments. The entry file names
//! the other documents in `include`; their tables are merged into one
//! document before it is parsed as a [`Config`]. A table name may appear in
//! only one document, and included documents cannot include further files.

use crate::{resolve_env_vars, Config, ConfigError};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

type Table = toml::map::Map<String, toml::Value>;

/// Reads an entry file and the documents it includes.
pub struct ConfigLoader {
	root: PathBuf,
	visited: HashSet<PathBuf>,
	/// Document each top-level table came from
	origins: HashMap<String, PathBuf>,
}

impl ConfigLoader {
	/// `root` anchors relative paths, both the entry file and its includes.
	pub fn new(root: impl AsRef<Path>) -> Self {
		Self {
			root: root.as_ref().to_path_buf(),
			visited: HashSet::new(),
			origins: HashMap::new(),
		}
	}

	/// Reads, merges and validates a deployment configuration.
	pub async fn load_config(&mut self, entry: impl AsRef<Path>) -> Result<Config, ConfigError> {
		let entry = self.locate(entry)?;
		let source = self.read(&entry).await?;
		let mut document: Table = toml::from_str(&source)?;

		let includes = match document.remove("include") {
			Some(value) => include_paths(&value)?,
			None => return source.parse(),
		};

		self.claim_tables(&document, &entry)?;
		for include in includes {
			let path = self.locate(&include)?;
			let included: Table = toml::from_str(&self.read(&path).await?)?;
			if included.contains_key("include") {
				return Err(ConfigError::Validation(format!(
					"{} includes other files; only the entry file may use include",
					path.display()
				)));
			}
			self.claim_tables(&included, &path)?;
			for (name, table) in included {
				document.insert(name, table);
			}
		}

		toml::to_string(&document)
			.map_err(|e| ConfigError::Parse(format!("Cannot re-serialize merged config: {}", e)))?
			.parse()
	}

	/// Returns the file contents with environment references substituted.
	///
	/// A file seen twice means an include cycle.
	async fn read(&mut self, path: &Path) -> Result<String, ConfigError> {
		let canonical = tokio::fs::canonicalize(path).await.map_err(|e| {
			ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Cannot resolve path {}: {}", path.display(), e),
			))
		})?;
		if !self.visited.insert(canonical.clone()) {
			return Err(ConfigError::Validation(format!(
				"Circular include detected: {} was already loaded",
				canonical.display()
			)));
		}

		resolve_env_vars(&tokio::fs::read_to_string(path).await?)
	}

	/// Records `path` as the owner of each table in `document`.
	fn claim_tables(&mut self, document: &Table, path: &Path) -> Result<(), ConfigError> {
		for name in document.keys() {
			if let Some(owner) = self.origins.get(name) {
				return Err(ConfigError::Validation(format!(
					"Duplicate section '{}' found in {} and {}",
					name,
					owner.display(),
					path.display()
				)));
			}
			self.origins.insert(name.clone(), path.to_path_buf());
		}
		Ok(())
	}

	fn locate(&self, path: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
		let path = self.root.join(path.as_ref());
		if !path.exists() {
			return Err(ConfigError::Io(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("Configuration file not found: {}", path.display()),
			)));
		}
		Ok(path)
	}
}

/// `include` holds one path or a list of paths.
fn include_paths(value: &toml::Value) -> Result<Vec<PathBuf>, ConfigError> {
	let invalid = || ConfigError::Validation("include must be a path or a list of paths".into());

	match value {
		toml::Value::String(path) => Ok(vec![PathBuf::from(path)]),
		toml::Value::Array(items) => items
			.iter()
			.map(|item| item.as_str().map(PathBuf::from).ok_or_else(invalid))
			.collect(),
		_ => Err(invalid()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::TempDir;

	const HUB: &str = r#"
[hub]
chain_id = 146
wallet_factory = "0xC67AB69bB9Ab1dB83bEB12F1A2bB3a8E04C7f112"
"#;

	const NETWORKS: &str = r#"
[networks.146]
name = "sonic"
family = "evm"
rpc_url = "http://localhost:8545"

[networks.42161]
name = "arbitrum"
family = "evm"
rpc_url = "http://localhost:8546"
asset_manager = "0x1234567890123456789012345678901234567890"
connection = "0x0987654321098765432109876543210987654321"
"#;

	const RELAY: &str = r#"
[relay]
endpoint = "https://relay.test/api"
timeout_seconds = 30
"#;

	#[tokio::test]
	async fn test_single_file_config() {
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("config.toml");
		fs::write(&config_path, format!("{}{}{}", HUB, NETWORKS, RELAY)).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let config = loader.load_config(&config_path).await.unwrap();

		assert_eq!(config.hub.chain_id, 146);
		assert_eq!(config.relay.timeout_seconds, 30);
		assert_eq!(config.networks.len(), 2);
	}

	#[tokio::test]
	async fn test_config_with_includes() {
		let temp_dir = TempDir::new().unwrap();

		let main_config = format!("include = [\"networks.toml\", \"relay.toml\"]\n{}", HUB);
		fs::write(temp_dir.path().join("main.toml"), main_config).unwrap();
		fs::write(temp_dir.path().join("networks.toml"), NETWORKS).unwrap();
		fs::write(temp_dir.path().join("relay.toml"), RELAY).unwrap();

		let config = Config::from_file(temp_dir.path().join("main.toml").to_str().unwrap())
			.await
			.unwrap();

		assert_eq!(config.hub.chain_id, 146);
		assert_eq!(config.relay.endpoint, "https://relay.test/api");
		assert!(config.registry().unwrap().get(intent_types::ChainId(146)).is_some());
	}

	#[tokio::test]
	async fn test_single_include_string() {
		let temp_dir = TempDir::new().unwrap();

		let main_config = format!("include = \"rest.toml\"\n{}", HUB);
		fs::write(temp_dir.path().join("main.toml"), main_config).unwrap();
		fs::write(
			temp_dir.path().join("rest.toml"),
			format!("{}{}", NETWORKS, RELAY),
		)
		.unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		assert!(loader.load_config("main.toml").await.is_ok());
	}

	#[tokio::test]
	async fn test_duplicate_section_error() {
		let temp_dir = TempDir::new().unwrap();

		let main_config = format!("include = [\"duplicate.toml\"]\n{}{}", HUB, RELAY);
		fs::write(temp_dir.path().join("main.toml"), main_config).unwrap();
		fs::write(
			temp_dir.path().join("duplicate.toml"),
			format!("{}{}", NETWORKS, RELAY),
		)
		.unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load_config("main.toml").await;

		let error_msg = result.unwrap_err().to_string();
		assert!(error_msg.contains("Duplicate section 'relay'"));
	}

	#[tokio::test]
	async fn test_self_include_detection() {
		let temp_dir = TempDir::new().unwrap();

		let config = format!("include = [\"self.toml\"]\n{}", HUB);
		fs::write(temp_dir.path().join("self.toml"), config).unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load_config("self.toml").await;

		let error_msg = result.unwrap_err().to_string();
		assert!(error_msg.contains("already loaded"));
	}

	#[tokio::test]
	async fn test_nested_include_rejected() {
		let temp_dir = TempDir::new().unwrap();

		fs::write(
			temp_dir.path().join("main.toml"),
			format!("include = [\"networks.toml\"]\n{}{}", HUB, RELAY),
		)
		.unwrap();
		fs::write(
			temp_dir.path().join("networks.toml"),
			format!("include = [\"more.toml\"]\n{}", NETWORKS),
		)
		.unwrap();
		fs::write(temp_dir.path().join("more.toml"), "").unwrap();

		let mut loader = ConfigLoader::new(temp_dir.path());
		let error_msg = loader.load_config("main.toml").await.unwrap_err().to_string();
		assert!(error_msg.contains("only the entry file may use include"));
	}

	#[test]
	fn test_include_must_be_paths() {
		assert!(include_paths(&toml::Value::Integer(3)).is_err());
		let list = toml::Value::Array(vec![toml::Value::Boolean(true)]);
		assert!(include_paths(&list).is_err());
	}

	#[tokio::test]
	async fn test_missing_file() {
		let temp_dir = TempDir::new().unwrap();
		let mut loader = ConfigLoader::new(temp_dir.path());
		let result = loader.load_config("absent.toml").await;
		assert!(matches!(result, Err(ConfigError::Io(_))));
	}
}
