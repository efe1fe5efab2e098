use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use once_cell::race::OnceBox;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diagnostic::{DUPLICATE_UID, Diagnostic, XREF_NOT_FOUND};
use crate::source_info::Located;

pub trait XrefSpec {
    fn uid(&self) -> &str;

    fn href(&self) -> &str;

    fn monikers(&self) -> &[String];

    fn get_xref_property_value_as_string(&self, property_name: &str) -> Option<&str>;

    fn get_name(&self) -> Option<&str> {
        self.get_xref_property_value_as_string("name")
    }
}

/// A property value computed on first read.
///
/// Concurrent first reads may each run the initializer; the first stored value
/// wins and the others are dropped. Initializers must be pure.
pub struct LazyProperty {
    value: OnceBox<Value>,
    init: Arc<dyn Fn() -> Value + Send + Sync>,
}

impl LazyProperty {
    pub fn new(init: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Self {
            value: OnceBox::new(),
            init: Arc::new(init),
        }
    }

    pub fn ready(value: Value) -> Self {
        let property = Self::new(|| Value::Null);
        // A fresh cell cannot already hold a value.
        let _ = property.value.set(Box::new(value));
        property
    }

    pub fn value(&self) -> &Value {
        self.value.get_or_init(|| Box::new((self.init)()))
    }

    pub fn is_materialized(&self) -> bool {
        self.value.get().is_some()
    }
}

impl fmt::Debug for LazyProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("LazyProperty").field(value).finish(),
            None => f.write_str("LazyProperty(<pending>)"),
        }
    }
}

/// A uid declared by a document in this build.
#[derive(Debug)]
pub struct InternalXrefSpec {
    pub uid: Located<String>,
    pub href: String,
    pub declaring_file: String,
    pub monikers: Vec<String>,
    pub declaring_property_path: Option<String>,
    pub property_path: Option<String>,
    pub uid_global_unique: bool,
    pub schema_type: Option<String>,
    pub xref_properties: Vec<(String, LazyProperty)>,
}

impl InternalXrefSpec {
    pub fn new(
        uid: Located<String>,
        href: impl Into<String>,
        declaring_file: impl Into<String>,
    ) -> Self {
        Self {
            uid,
            href: href.into(),
            declaring_file: declaring_file.into(),
            monikers: Vec::new(),
            declaring_property_path: None,
            property_path: None,
            uid_global_unique: false,
            schema_type: None,
            xref_properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, property: LazyProperty) -> Self {
        self.xref_properties.push((name.into(), property));
        self
    }

    pub fn property(&self, name: &str) -> Option<&LazyProperty> {
        self.xref_properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, property)| property)
    }

    /// Materializes every property into a standalone spec.
    pub fn to_external_xref_spec(&self, overwrite_href: Option<&str>) -> ExternalXrefSpec {
        let extension_data = self
            .xref_properties
            .iter()
            .map(|(key, property)| (key.clone(), property.value().clone()))
            .collect();
        ExternalXrefSpec {
            uid: self.uid.value.clone(),
            href: overwrite_href.unwrap_or(&self.href).to_string(),
            monikers: self.monikers.clone(),
            schema_type: self.schema_type.clone(),
            extension_data,
        }
    }
}

impl XrefSpec for InternalXrefSpec {
    fn uid(&self) -> &str {
        &self.uid.value
    }

    fn href(&self) -> &str {
        &self.href
    }

    fn monikers(&self) -> &[String] {
        &self.monikers
    }

    fn get_xref_property_value_as_string(&self, property_name: &str) -> Option<&str> {
        self.property(property_name)?.value().as_str()
    }
}

/// A uid resolved from a published xref map, properties already flattened.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalXrefSpec {
    pub uid: String,
    pub href: String,
    #[serde(default)]
    pub monikers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(flatten)]
    pub extension_data: Map<String, Value>,
}

impl XrefSpec for ExternalXrefSpec {
    fn uid(&self) -> &str {
        &self.uid
    }

    fn href(&self) -> &str {
        &self.href
    }

    fn monikers(&self) -> &[String] {
        &self.monikers
    }

    fn get_xref_property_value_as_string(&self, property_name: &str) -> Option<&str> {
        self.extension_data.get(property_name)?.as_str()
    }
}

/// Chooses the spec a uid resolves to among every declaration of it.
///
/// A uid that must be globally unique but is declared by more than one file is an
/// error; otherwise the smallest declaring file wins.
pub fn pick_effective_spec<'a>(
    uid: &str,
    specs: &'a [InternalXrefSpec],
) -> Result<&'a InternalXrefSpec, Diagnostic> {
    let Some(first) = specs.first() else {
        return Err(Diagnostic::warning(
            XREF_NOT_FOUND,
            format!("Cross reference not found: '{}'.", uid),
            None,
        ));
    };
    if specs.len() == 1 {
        return Ok(first);
    }

    let files: BTreeSet<&str> = specs
        .iter()
        .map(|spec| spec.declaring_file.as_str())
        .collect();
    if files.len() > 1 && specs.iter().any(|spec| spec.uid_global_unique) {
        let files: Vec<&str> = files.into_iter().collect();
        return Err(Diagnostic::warning(
            DUPLICATE_UID,
            format!(
                "UID '{}' is duplicated in {}.",
                uid,
                files
                    .iter()
                    .map(|file| format!("'{}'", file))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            first.uid.source.clone(),
        ));
    }

    specs
        .iter()
        .min_by(|left, right| {
            left.declaring_file
                .cmp(&right.declaring_file)
                .then_with(|| left.href.cmp(&right.href))
        })
        .ok_or_else(|| Diagnostic::warning(XREF_NOT_FOUND, uid.to_string(), None))
}
