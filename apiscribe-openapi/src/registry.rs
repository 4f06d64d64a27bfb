use serde_json::{json, Map, Value};
use std::collections::{HashMap, HashSet};

use crate::error::SpecError;

/// Prefix of every component reference.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// `{"$ref": "#/components/schemas/<name>"}`
pub fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("{SCHEMA_REF_PREFIX}{name}") })
}

/// Whether a component's body has been filled in yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionState {
    /// Name allocated, body still being resolved. References to it are valid.
    Pending,
    /// Body final; never changes again.
    Complete,
}

#[derive(Debug)]
struct Entry {
    key: String,
    name: String,
    schema: Option<Value>,
    state: DefinitionState,
}

/// Result of interning one identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interned {
    pub name: String,
    pub state: DefinitionState,
}

impl Interned {
    pub fn reference(&self) -> Value {
        schema_ref(&self.name)
    }
}

/// Outcome of [`ComponentRegistry::reserve`].
#[derive(Debug)]
pub enum Slot {
    Existing(Interned),
    Reserved(Reserved),
}

/// A pending entry that must be passed back to
/// [`ComponentRegistry::fulfil`].
#[derive(Debug)]
#[must_use]
pub struct Reserved {
    index: usize,
    name: String,
}

impl Reserved {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Registry that interns schemas into named, reusable components.
///
/// Entries are keyed by a type's identity key, never by shape, and are
/// append-only for the lifetime of one assembly pass. Names come from the
/// declared type name; when two identities claim the same name, the later one
/// gets a numeric suffix (`Pet`, `Pet2`, `Pet3`, ...) in first-seen order, so
/// output is reproducible for a given registration order.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    entries: Vec<Entry>,
    by_key: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `key`, building its schema with `build` on first sight only.
    ///
    /// The entry is `Pending` while `build` runs, so a self-referential type
    /// that reaches this identity again gets the allocated name back without
    /// recursing. Later calls for the same key return the existing name and
    /// never invoke `build`.
    pub fn intern<F>(&mut self, key: &str, declared_name: &str, build: F) -> Result<Interned, SpecError>
    where
        F: FnOnce(&mut Self) -> Result<Value, SpecError>,
    {
        match self.reserve(key, declared_name) {
            Slot::Existing(found) => Ok(found),
            Slot::Reserved(reserved) => {
                let schema = build(self)?;
                Ok(self.fulfil(reserved, schema))
            }
        }
    }

    /// First half of [`intern`](Self::intern): allocate a pending entry for a
    /// new identity, or return the existing one.
    pub fn reserve(&mut self, key: &str, declared_name: &str) -> Slot {
        if let Some(found) = self.lookup(key) {
            return Slot::Existing(found);
        }

        let name = self.allocate_name(declared_name);
        let index = self.entries.len();
        self.entries.push(Entry {
            key: key.to_string(),
            name: name.clone(),
            schema: None,
            state: DefinitionState::Pending,
        });
        self.by_key.insert(key.to_string(), index);
        tracing::debug!(component = %name, key, "schema component allocated");

        Slot::Reserved(Reserved { index, name })
    }

    /// Second half of [`intern`](Self::intern): store the final body.
    pub fn fulfil(&mut self, reserved: Reserved, schema: Value) -> Interned {
        self.complete(reserved.index, schema);
        Interned {
            name: reserved.name,
            state: DefinitionState::Complete,
        }
    }

    /// Name and state of an already interned identity.
    pub fn lookup(&self, key: &str) -> Option<Interned> {
        self.by_key.get(key).map(|&index| {
            let entry = &self.entries[index];
            Interned {
                name: entry.name.clone(),
                state: entry.state,
            }
        })
    }

    /// The finished body of a component, by component name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .and_then(|e| e.schema.as_ref())
    }

    /// Identity key a component name was allocated for.
    pub fn key_of(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the registry and return the components in first-seen order.
    ///
    /// Pending entries only remain when a build failed, which aborts the
    /// pass before this is called; they are skipped.
    pub fn into_schemas(self) -> Map<String, Value> {
        let mut schemas = Map::new();
        for entry in self.entries {
            if let Some(schema) = entry.schema {
                schemas.insert(entry.name, schema);
            }
        }
        schemas
    }

    fn complete(&mut self, index: usize, schema: Value) {
        let entry = &mut self.entries[index];
        debug_assert_eq!(entry.state, DefinitionState::Pending);
        entry.schema = Some(schema);
        entry.state = DefinitionState::Complete;
    }

    fn allocate_name(&mut self, declared_name: &str) -> String {
        let base = sanitize_component_name(declared_name);
        let mut candidate = base.clone();
        let mut suffix = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}

/// Component names must match `^[a-zA-Z0-9._-]+$`.
///
/// Anything else becomes `_`, with runs collapsed and edges trimmed, so
/// `Page<Pet>` turns into `Page_Pet`.
pub fn sanitize_component_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.is_empty() {
        "Schema".to_string()
    } else {
        trimmed.to_string()
    }
}
