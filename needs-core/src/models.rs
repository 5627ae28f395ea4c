use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::NeedsError;

/// Current local time in the `YYYY-MM-DDTHH:MM:SS.ffffff` form used by needs.json
pub fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// A single tracked need (requirement, spec, test case, ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Need {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,

    #[serde(rename = "type", default, deserialize_with = "lenient::string")]
    pub need_type: String,

    /// Display label for the type
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub type_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub status: Option<String>,

    #[serde(default, deserialize_with = "lenient::opt_list")]
    pub tags: Option<Vec<String>>,

    /// Ids of other needs
    #[serde(default, deserialize_with = "lenient::opt_list")]
    pub links: Option<Vec<String>>,

    /// Source document, used to build relative references
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub docname: Option<String>,

    /// Keys written by other tools, kept as-is
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Need {
    pub fn new(id: impl Into<String>, title: impl Into<String>, need_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            need_type: need_type.into(),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_links(mut self, links: Vec<String>) -> Self {
        self.links = Some(links);
        self
    }

    pub fn with_docname(mut self, docname: impl Into<String>) -> Self {
        self.docname = Some(docname.into());
        self
    }

    /// Returns the value stored under `field`, or `None` when it is unset
    pub fn field(&self, field: Field) -> Option<FieldValue<'_>> {
        match field {
            Field::Id => Some(FieldValue::Single(&self.id)),
            Field::Title => Some(FieldValue::Single(&self.title)),
            Field::Type => Some(FieldValue::Single(&self.need_type)),
            Field::TypeName => self.type_name.as_deref().map(FieldValue::Single),
            Field::Description => self.description.as_deref().map(FieldValue::Single),
            Field::Status => self.status.as_deref().map(FieldValue::Single),
            Field::Tags => self.tags.as_deref().map(FieldValue::List),
            Field::Links => self.links.as_deref().map(FieldValue::List),
            Field::Docname => self.docname.as_deref().map(FieldValue::Single),
        }
    }
}

/// Addressable attributes of a [`Need`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Title,
    Type,
    TypeName,
    Description,
    Status,
    Tags,
    Links,
    Docname,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Title => "title",
            Field::Type => "type",
            Field::TypeName => "type_name",
            Field::Description => "description",
            Field::Status => "status",
            Field::Tags => "tags",
            Field::Links => "links",
            Field::Docname => "docname",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = NeedsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "id" => Ok(Field::Id),
            "title" => Ok(Field::Title),
            "type" => Ok(Field::Type),
            "type_name" => Ok(Field::TypeName),
            "description" => Ok(Field::Description),
            "status" => Ok(Field::Status),
            "tags" => Ok(Field::Tags),
            "links" => Ok(Field::Links),
            "docname" => Ok(Field::Docname),
            _ => Err(NeedsError::UnknownField(s.to_string())),
        }
    }
}

/// A borrowed field value, either a scalar or an ordered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Single(&'a str),
    List(&'a [String]),
}

impl<'a> FieldValue<'a> {
    /// Normalizes to a list; a scalar becomes a single item
    pub fn items(&self) -> Vec<&'a str> {
        match self {
            FieldValue::Single(s) => vec![*s],
            FieldValue::List(list) => list.iter().map(String::as_str).collect(),
        }
    }
}

/// All needs recorded for one release of the project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionBucket {
    #[serde(default, deserialize_with = "lenient::string")]
    pub created: String,

    #[serde(default, deserialize_with = "lenient::count")]
    pub needs_amount: usize,

    #[serde(default, deserialize_with = "lenient::map")]
    pub needs: BTreeMap<String, Need>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The document persisted as needs.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeedsRegistry {
    #[serde(default, deserialize_with = "lenient::string")]
    pub project: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub current_version: String,

    #[serde(default, deserialize_with = "lenient::string")]
    pub created: String,

    #[serde(default, deserialize_with = "lenient::map")]
    pub versions: BTreeMap<String, VersionBucket>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl NeedsRegistry {
    pub fn new(project: impl Into<String>, current_version: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            current_version: current_version.into(),
            ..Default::default()
        }
    }

    /// Inserts or replaces `need` in the bucket for `version`, creating the bucket if needed
    pub fn insert_need(&mut self, version: &str, need: Need) {
        let bucket = self.versions.entry(version.to_string()).or_default();
        bucket.created = timestamp();
        bucket.needs.insert(need.id.clone(), need);
        bucket.needs_amount = bucket.needs.len();
    }

    /// Drops the bucket for `version`; returns whether one existed
    pub fn remove_version(&mut self, version: &str) -> bool {
        self.versions.remove(version).is_some()
    }

    /// Total number of needs across all versions
    pub fn total_needs(&self) -> usize {
        self.versions.values().map(|b| b.needs.len()).sum()
    }
}

/// Deserializers for needs.json files written by other tools.
///
/// Null or mistyped values fall back to the field default instead of
/// failing the whole document.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::collections::BTreeMap;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(scalar(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(scalar(Value::deserialize(deserializer)?))
    }

    /// A list of scalars; a lone scalar becomes a one-item list
    pub fn opt_list<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<String>>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Null => None,
            Value::Array(items) => Some(items.into_iter().filter_map(scalar).collect()),
            other => scalar(other).map(|item| vec![item]),
        })
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Number(n) => n.as_u64().map(|n| n as usize).unwrap_or(0),
            Value::String(s) => s.trim().parse().unwrap_or(0),
            _ => 0,
        })
    }

    /// An object of records; entries that are not objects are dropped
    pub fn map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Object(entries) = Value::deserialize(deserializer)? else {
            return Ok(BTreeMap::new());
        };

        let mut out = BTreeMap::new();
        for (key, value) in entries {
            match serde_json::from_value(value) {
                Ok(record) => {
                    out.insert(key, record);
                }
                Err(error) => {
                    tracing::warn!(key = %key, error = %error, "skipping malformed needs.json entry");
                }
            }
        }
        Ok(out)
    }
}
