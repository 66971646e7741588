//! Process-wide dialect registry.
//!
//! The only module-level state in the library. Built-ins install on first
//! access through `OnceLock`; lookups take a read lock, supplemental
//! registration takes the write lock. Names are case-insensitive.

use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::builtin::*;
use crate::Dialect;

static REGISTRY: OnceLock<DialectRegistry> = OnceLock::new();

/// Lookup miss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectNotFound {
    pub name: String,
}

impl fmt::Display for DialectNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dialect not found: {}", self.name)
    }
}

impl std::error::Error for DialectNotFound {}

/// Case-insensitive name-to-dialect map.
pub struct DialectRegistry {
    dialects: RwLock<FxHashMap<String, Arc<dyn Dialect>>>,
}

impl DialectRegistry {
    fn with_builtins() -> Self {
        let registry = Self {
            dialects: RwLock::new(FxHashMap::default()),
        };
        let builtins: Vec<Arc<dyn Dialect>> = vec![
            Arc::new(Ansi),
            Arc::new(Postgres),
            Arc::new(MySql),
            Arc::new(BigQuery),
            Arc::new(Snowflake),
            Arc::new(DuckDb),
            Arc::new(Sqlite),
            Arc::new(Hive),
            Arc::new(Spark),
            Arc::new(ClickHouse),
            Arc::new(Trino),
            Arc::new(Redshift),
            Arc::new(Tsql),
            Arc::new(Oracle),
            Arc::new(Databricks),
            Arc::new(Drill),
        ];
        {
            let mut map = registry.dialects.write();
            for dialect in builtins {
                map.insert(dialect.name().to_uppercase(), dialect);
            }
            log::debug!("dialect registry initialized with {} built-ins", map.len());
        }
        registry
    }

    /// The process-wide registry, creating it with the built-ins on first
    /// access.
    pub fn global() -> &'static DialectRegistry {
        REGISTRY.get_or_init(Self::with_builtins)
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Dialect>, DialectNotFound> {
        self.dialects
            .read()
            .get(&name.to_uppercase())
            .cloned()
            .ok_or_else(|| DialectNotFound { name: name.to_string() })
    }

    /// Register a dialect under its own name, replacing any previous entry.
    pub fn register(&self, dialect: Arc<dyn Dialect>) {
        self.dialects
            .write()
            .insert(dialect.name().to_uppercase(), dialect);
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dialects.read().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Look up a dialect in the global registry.
pub fn lookup(name: &str) -> Result<Arc<dyn Dialect>, DialectNotFound> {
    DialectRegistry::global().get(name)
}

/// Register a dialect in the global registry.
pub fn register(dialect: Arc<dyn Dialect>) {
    DialectRegistry::global().register(dialect);
}
