#![allow(dead_code)]

use serde_json::Value;
use shutter_inspector::{AppConfig, AppError, Analyzer, MetadataBackend, RawMetadata};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serves canned tag maps keyed by file name.
#[derive(Default)]
pub struct FixtureBackend {
    fixtures: HashMap<String, Result<Value, String>>,
    calls: AtomicUsize,
}

impl FixtureBackend {
    pub fn with(mut self, file_name: &str, tags: Value) -> Self {
        self.fixtures.insert(file_name.to_string(), Ok(tags));
        self
    }

    pub fn failing(mut self, file_name: &str, message: &str) -> Self {
        self.fixtures.insert(file_name.to_string(), Err(message.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MetadataBackend for FixtureBackend {
    fn extract(&self, path: &Path) -> Result<RawMetadata, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        match self.fixtures.get(&name) {
            Some(Ok(Value::Object(map))) => Ok(RawMetadata::from(map.clone())),
            Some(Ok(other)) => Err(AppError::Extraction(format!("fixture is not an object: {}", other))),
            Some(Err(message)) => Err(AppError::Extraction(message.clone())),
            None => Err(AppError::Extraction(format!("no fixture for {}", name))),
        }
    }
}

pub fn analyzer(backend: Arc<FixtureBackend>) -> Analyzer {
    let config = AppConfig {
        num_workers: 2,
        ..AppConfig::default()
    };
    Analyzer::new(Arc::new(config), backend).unwrap()
}
