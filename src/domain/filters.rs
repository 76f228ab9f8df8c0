use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Listing filters exactly as the user typed them.
///
/// Every field is a raw string and the empty string means "unset". Sizes are
/// kilobytes here; conversion to bytes happens when the query is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub upload_date: String,
    #[serde(default)]
    pub max_size: String,
    #[serde(default)]
    pub min_size: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub search: String,
}

impl FilterState {
    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::UploadDate => &self.upload_date,
            FilterField::MaxSize => &self.max_size,
            FilterField::MinSize => &self.min_size,
            FilterField::FileType => &self.file_type,
            FilterField::Search => &self.search,
        }
    }

    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let slot = match field {
            FilterField::UploadDate => &mut self.upload_date,
            FilterField::MaxSize => &mut self.max_size,
            FilterField::MinSize => &mut self.min_size,
            FilterField::FileType => &mut self.file_type,
            FilterField::Search => &mut self.search,
        };
        *slot = value.into();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    UploadDate,
    MaxSize,
    MinSize,
    FileType,
    Search,
}

impl FilterField {
    /// Wire order of the query parameters.
    pub const ALL: [FilterField; 5] = [
        FilterField::UploadDate,
        FilterField::MaxSize,
        FilterField::MinSize,
        FilterField::FileType,
        FilterField::Search,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FilterField::UploadDate => "upload_date",
            FilterField::MaxSize => "max_size",
            FilterField::MinSize => "min_size",
            FilterField::FileType => "file_type",
            FilterField::Search => "search",
        }
    }

    pub fn is_size(self) -> bool {
        matches!(self, FilterField::MaxSize | FilterField::MinSize)
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilterField(pub String);

impl fmt::Display for UnknownFilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter field '{}'", self.0)
    }
}

impl std::error::Error for UnknownFilterField {}

impl FromStr for FilterField {
    type Err = UnknownFilterField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterField::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| UnknownFilterField(s.to_string()))
    }
}
