//! Schema collaborator.
//!
//! The compiler never introspects a database. It asks a [`SchemaProvider`]
//! whether an object exists, whether it is a view or a table-valued
//! function, and which parameters a function declares. Live providers sit
//! outside this crate; [`StaticSchemaProvider`] serves a fixed table, such as
//! the `[objects]` section of the config file.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::compile::{CallArgument, ObjectKind, ObjectName};
use crate::sql::{ParameterRegistry, SqlValue};

/// Errors raised by schema providers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetadataError {
    #[error("Schema metadata unavailable: {0}")]
    Unavailable(String),
}

pub type MetadataResult<T> = Result<T, MetadataError>;

/// What the compiler needs to know about one object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub kind: ObjectKind,
    /// Declared parameter names in call order; empty for views.
    pub parameters: Vec<String>,
}

impl ObjectInfo {
    pub fn view() -> Self {
        Self {
            kind: ObjectKind::View,
            parameters: Vec::new(),
        }
    }

    pub fn function(parameters: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            kind: ObjectKind::Function,
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }
}

/// Describes database objects by name.
pub trait SchemaProvider {
    /// `Ok(None)` when the object does not exist.
    fn describe(&self, object: &ObjectName) -> MetadataResult<Option<ObjectInfo>>;
}

/// A fixed object table. Lookups ignore case, like the default SQL Server
/// collation.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaProvider {
    objects: HashMap<(String, String), ObjectInfo>,
}

fn key(object: &ObjectName) -> (String, String) {
    (object.schema.to_lowercase(), object.name.to_lowercase())
}

impl StaticSchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: ObjectName, info: ObjectInfo) {
        self.objects.insert(key(&object), info);
    }

    pub fn with_object(mut self, object: ObjectName, info: ObjectInfo) -> Self {
        self.insert(object, info);
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl SchemaProvider for StaticSchemaProvider {
    fn describe(&self, object: &ObjectName) -> MetadataResult<Option<ObjectInfo>> {
        Ok(self.objects.get(&key(object)).cloned())
    }
}

/// Bind function parameters from `userData`.
///
/// Each declared parameter (leading `@` ignored) with a case-insensitive
/// match in `user_data` is registered and passed as its placeholder; the
/// rest are passed as `DEFAULT`. Placeholders are registered in parameter
/// order.
pub fn resolve_arguments(
    parameters: &[String],
    user_data: &IndexMap<String, SqlValue>,
    params: &mut ParameterRegistry,
) -> Vec<CallArgument> {
    parameters
        .iter()
        .map(|parameter| {
            let wanted = parameter.trim_start_matches('@');
            user_data
                .iter()
                .find(|(k, _)| k.trim_start_matches('@').eq_ignore_ascii_case(wanted))
                .map_or(CallArgument::Default, |(_, value)| {
                    CallArgument::Placeholder(params.register(value.clone()))
                })
        })
        .collect()
}
