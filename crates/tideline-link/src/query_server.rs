//! Offline query server
//!
//! Answers a query from the normalized cache snapshot while the network is
//! down. The result has the shape a live response would have: aliases become
//! response keys, references are followed, and only selected fields appear.
//!
//! The server borrows the snapshot immutably; it never writes to the cache.

use serde_json::{Map, Value};
use tideline_core::cache::DEFAULT_ROOT_QUERY_ID;
use tideline_core::response::render_path;
use tideline_core::{
    store_field_name, CacheMissError, Document, Field, NormalizedSnapshot, PathSegment, Variables,
};

/// Reads query results out of a cache snapshot
#[derive(Debug, Clone, Copy)]
pub struct OfflineQueryServer<'a> {
    snapshot: &'a NormalizedSnapshot,
    root_id: &'a str,
}

impl<'a> OfflineQueryServer<'a> {
    /// Server rooted at the default `ROOT_QUERY` entity
    pub fn new(snapshot: &'a NormalizedSnapshot) -> Self {
        Self::with_root(snapshot, DEFAULT_ROOT_QUERY_ID)
    }

    /// Server rooted at a custom root entity
    pub fn with_root(snapshot: &'a NormalizedSnapshot, root_id: &'a str) -> Self {
        Self { snapshot, root_id }
    }

    /// Resolve `query` with `variables` against the snapshot.
    ///
    /// Fails with [`CacheMissError`] naming the first response path whose
    /// value is absent.
    pub fn read(&self, query: &Document, variables: &Variables) -> Result<Value, CacheMissError> {
        let mut path = Vec::new();
        let root = self.entity(self.root_id, &path)?;
        self.read_selection(root, &query.selection_set, variables, &mut path)
    }

    fn entity(
        &self,
        id: &str,
        path: &[PathSegment],
    ) -> Result<&'a Map<String, Value>, CacheMissError> {
        self.snapshot.entity(id).ok_or_else(|| {
            let at = if path.is_empty() {
                id.to_string()
            } else {
                render_path(path)
            };
            CacheMissError::new(at)
        })
    }

    fn read_selection(
        &self,
        object: &Map<String, Value>,
        selection: &[Field],
        variables: &Variables,
        path: &mut Vec<PathSegment>,
    ) -> Result<Value, CacheMissError> {
        let mut out = Map::new();
        for field in selection {
            path.push(PathSegment::Key(field.response_key().to_string()));
            let key = store_field_name(field, variables);
            let stored = object
                .get(&key)
                .ok_or_else(|| CacheMissError::new(render_path(path)))?;
            let value = self.resolve_value(stored, field, variables, path)?;
            path.pop();
            out.insert(field.response_key().to_string(), value);
        }
        Ok(Value::Object(out))
    }

    fn resolve_value(
        &self,
        stored: &Value,
        field: &Field,
        variables: &Variables,
        path: &mut Vec<PathSegment>,
    ) -> Result<Value, CacheMissError> {
        match stored {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    out.push(self.resolve_value(item, field, variables, path)?);
                    path.pop();
                }
                Ok(Value::Array(out))
            }
            Value::Object(object) if !field.is_leaf() => {
                match NormalizedSnapshot::as_reference(stored) {
                    Some(id) => {
                        let entity = self.entity(id, path)?;
                        self.read_selection(entity, &field.selection_set, variables, path)
                    }
                    None => self.read_selection(object, &field.selection_set, variables, path),
                }
            }
            // A reference needs a selection to be projected; its encoding never
            // leaves the cache.
            Value::Object(_) if NormalizedSnapshot::as_reference(stored).is_some() => {
                Err(CacheMissError::new(render_path(path)))
            }
            // Scalars, nulls and leaf-selected JSON objects are returned as stored.
            other => Ok(other.clone()),
        }
    }
}
