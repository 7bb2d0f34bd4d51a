//! # CLI Command Implementations

use crate::api;
use crate::config::ServerConfig;
use arbor_core::{ArborError, SeedTopic, Store, TreeNode, VersionSelector, parse_seed};
use std::path::{Path, PathBuf};

// =============================================================================
// SEED FILES
// =============================================================================

/// Maximum seed document size (50 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_SEED_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Canonicalize a path and make sure it names a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, ArborError> {
    let canonical = path.canonicalize().map_err(|e| {
        ArborError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(ArborError::Io(format!("Path '{}' is not a regular file", path.display())));
    }

    Ok(canonical)
}

fn validate_file_size(path: &Path, max_size: u64) -> Result<(), ArborError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| ArborError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(ArborError::Validation(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Read and parse a seed document.
pub fn load_seed_file(path: &Path) -> Result<Vec<SeedTopic>, ArborError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, MAX_SEED_FILE_SIZE)?;

    let text = std::fs::read_to_string(&validated)
        .map_err(|e| ArborError::Io(format!("Cannot read seed '{}': {}", path.display(), e)))?;
    parse_seed(&text)
}

/// A fresh store, seeded if a document is given.
pub fn build_store(seed: Option<&Path>) -> Result<Store, ArborError> {
    let mut store = Store::new();
    if let Some(path) = seed {
        let roots = load_seed_file(path)?;
        let created = store.import_seed(&roots)?;
        tracing::info!(topics = created, seed = %path.display(), "Store seeded");
    }
    Ok(store)
}

// =============================================================================
// SERVER COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_server(config: &ServerConfig) -> Result<(), ArborError> {
    let store = build_store(config.seed.as_deref())?;
    let stats = store.stats();

    println!("Arbor Server Starting...");
    println!();
    println!("Configuration:");
    println!("  Host:       {}", config.host);
    println!("  Port:       {}", config.port);
    println!("  Rate limit: {}", config.rate_limit);
    let auth = if config.api_key().is_some() {
        "api key"
    } else {
        "disabled"
    };
    println!("  Auth:       {auth}");
    match &config.seed {
        Some(seed) => println!("  Seed:       {} ({} topics)", seed.display(), stats.topics),
        None => println!("  Seed:       none"),
    }
    println!();
    println!("Endpoints:");
    println!("  GET  /topics?parent_id=    - List children (roots if omitted)");
    println!("  POST /topics               - Create a topic");
    println!("  GET  /topics/{{id}}/tree     - Point-in-time snapshot");
    println!("  GET  /topics/shortest-path - Path between two topics");
    println!("  GET  /status               - Store statistics");
    println!("  GET  /health               - Health check");
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    api::run_server(config, store).await
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store statistics.
pub fn cmd_status(seed: Option<&Path>, json_mode: bool) -> Result<(), ArborError> {
    let store = build_store(seed)?;
    let stats = store.stats();

    if json_mode {
        let output = serde_json::json!({
            "seed": seed.map(|p| p.to_string_lossy().into_owned()),
            "topics": stats.topics,
            "active_topics": stats.active_topics,
            "roots": stats.roots,
            "versions": stats.versions,
            "resources": stats.resources,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Arbor Store Status");
    println!("==================");
    match seed {
        Some(p) => println!("Seed: {}", p.display()),
        None => println!("Seed: none (empty store)"),
    }
    println!();
    println!("Topics:        {}", stats.topics);
    println!("Active Topics: {}", stats.active_topics);
    println!("Roots:         {}", stats.roots);
    println!("Versions:      {}", stats.versions);
    println!("Resources:     {}", stats.resources);

    Ok(())
}

// =============================================================================
// TREE COMMAND
// =============================================================================

/// Snapshots of every root at `selector`. Roots lacking the version are
/// skipped with a warning.
pub fn snapshot_roots(
    store: &Store,
    selector: VersionSelector,
    include_resources: bool,
) -> Result<Vec<TreeNode>, ArborError> {
    let mut trees = Vec::new();
    for root in store.list_active_children(None) {
        match store.build_tree(root.id, selector, include_resources) {
            Ok(tree) => trees.push(tree),
            Err(ArborError::VersionNotFound { topic, version }) => {
                tracing::warn!(%topic, version, "Root has no such version, skipping");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(trees)
}

/// Print the reconstructed forest as pretty JSON.
pub fn cmd_tree(
    seed: &Path,
    selector: VersionSelector,
    include_resources: bool,
) -> Result<(), ArborError> {
    let store = build_store(Some(seed))?;
    let trees = snapshot_roots(&store, selector, include_resources)?;
    let json = serde_json::to_string_pretty(&trees)
        .map_err(|e| ArborError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn seed_file(json: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(json.as_bytes()).expect("write");
        file
    }

    #[test]
    fn build_store_imports_seed() {
        let file = seed_file(
            r#"[{ "name": "Rust", "content": "lang",
                  "children": [{ "name": "Cargo", "content": "build" }] }]"#,
        );
        let store = build_store(Some(file.path())).expect("store");
        assert_eq!(store.stats().topics, 2);
        assert_eq!(store.stats().roots, 1);
    }

    #[test]
    fn missing_seed_is_io_error() {
        let missing = Path::new("/definitely/not/here/seed.json");
        assert!(matches!(build_store(Some(missing)), Err(ArborError::Io(_))));
    }

    #[test]
    fn malformed_seed_is_serialization_error() {
        let file = seed_file("{ nope");
        assert!(matches!(
            load_seed_file(file.path()),
            Err(ArborError::Serialization(_))
        ));
    }

    #[test]
    fn snapshot_roots_skips_roots_without_version() {
        let seed = r#"[{ "name": "A", "content": "a" }, { "name": "B", "content": "b" }]"#;
        let file = seed_file(seed);
        let mut store = build_store(Some(file.path())).expect("store");
        let b = store.list_active_children(None)[1].id;
        store
            .append_version(b, arbor_core::TopicPatch::content("b2"))
            .expect("append");

        let at_two = snapshot_roots(&store, VersionSelector::Exact(2), false).expect("trees");
        assert_eq!(at_two.len(), 1);
        assert_eq!(at_two[0].name, "B");

        let latest = snapshot_roots(&store, VersionSelector::Latest, false).expect("trees");
        assert_eq!(latest.len(), 2);
    }
}
