//! Request parameters and per-request context.
//!
//! The routing layer hands over path segments and query-string pairs; this
//! module maps the upstream API's short query keys (`v`, `p`, `pv`, `m`,
//! `pm`) onto named fields.

use std::fmt;

const METADATA_SUFFIX: &str = ".metadata.json";

/// A request field, named by its query-string key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    /// Release channel (path segment).
    Channel,
    /// Product key (path segment).
    Product,
    /// Product version (`v`).
    Version,
    /// Platform (`p`).
    Platform,
    /// Platform version (`pv`).
    PlatformVersion,
    /// Machine architecture (`m`).
    Architecture,
    /// Package manager (`pm`).
    PackageManager,
    /// End-of-life opt-out flag (`eol`).
    Eol,
    /// License identifier (`license_id`).
    LicenseId,
    /// Bill-of-materials key (`bom`).
    Bom,
}

impl Field {
    /// Every field, in declaration order.
    pub const ALL: [Field; 10] = [
        Field::Channel,
        Field::Product,
        Field::Version,
        Field::Platform,
        Field::PlatformVersion,
        Field::Architecture,
        Field::PackageManager,
        Field::Eol,
        Field::LicenseId,
        Field::Bom,
    ];

    /// The query-string (or path parameter) key for this field.
    pub fn key(self) -> &'static str {
        match self {
            Field::Channel => "channel",
            Field::Product => "product",
            Field::Version => "v",
            Field::Platform => "p",
            Field::PlatformVersion => "pv",
            Field::Architecture => "m",
            Field::PackageManager => "pm",
            Field::Eol => "eol",
            Field::LicenseId => "license_id",
            Field::Bom => "bom",
        }
    }

    /// Resolve a query-string key. Long names are accepted too.
    pub fn from_key(key: &str) -> Option<Field> {
        let field = match key {
            "channel" => Field::Channel,
            "product" => Field::Product,
            "v" | "version" => Field::Version,
            "p" | "platform" => Field::Platform,
            "pv" | "platform_version" => Field::PlatformVersion,
            "m" | "architecture" => Field::Architecture,
            "pm" | "package_manager" => Field::PackageManager,
            "eol" => Field::Eol,
            "license_id" => Field::LicenseId,
            "bom" => Field::Bom,
            _ => return None,
        };
        Some(field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Parameters of one inbound request.
///
/// An empty string and an absent field are the same thing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    values: [String; 10],
}

impl RequestParams {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build parameters from key/value pairs, ignoring unknown keys.
    ///
    /// Later pairs overwrite earlier ones.
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            match Field::from_key(key.as_ref()) {
                Some(field) => params.set(field, value),
                None => tracing::debug!(key = key.as_ref(), "ignoring unknown request parameter"),
            }
        }
        params
    }

    /// Builder-style setter.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field value.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[index(field)] = value.into();
    }

    /// Field value, or `None` when absent or empty.
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = self.values[index(field)].as_str();
        (!value.is_empty()).then_some(value)
    }

    /// Field value, or `""` when absent.
    pub fn get_or_empty(&self, field: Field) -> &str {
        &self.values[index(field)]
    }

    /// Whether the caller opted in to end-of-life versions (`eol=true`).
    pub fn eol_requested(&self) -> bool {
        self.get(Field::Eol) == Some("true")
    }

    /// Remove a `.metadata.json` suffix from the first field carrying one.
    ///
    /// Returns `true` when a suffix was removed, marking a metadata request.
    pub fn strip_metadata_suffix(&mut self) -> bool {
        const CANDIDATES: [Field; 5] = [
            Field::Architecture,
            Field::Platform,
            Field::PlatformVersion,
            Field::Eol,
            Field::Version,
        ];

        for field in CANDIDATES {
            let value = &mut self.values[index(field)];
            if let Some(pos) = value.find(METADATA_SUFFIX) {
                value.replace_range(pos..pos + METADATA_SUFFIX.len(), "");
                return true;
            }
        }
        false
    }

    /// Present fields as `(field, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        Field::ALL
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }
}

fn index(field: Field) -> usize {
    field as usize
}

/// Facts about the caller established outside the validation engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// The caller presented a license that an upstream check accepted.
    pub licensed: bool,
}

impl RequestContext {
    /// Context for a caller with a validated license.
    pub fn licensed() -> Self {
        Self { licensed: true }
    }
}
