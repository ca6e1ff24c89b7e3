use serde::{Deserialize, Serialize};

/// Boolean combinator for metadata filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOperator {
    #[default]
    And,
    Or,
}

/// A single metadata comparison, e.g. `nbtrace_region in ["north polar cap"]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataExpression {
    pub key: String,
    pub operator: String,
    pub values: Vec<String>,
}

/// Metadata filter attached to a criteria block.
///
/// The filter is carried through to the backend as-is; no client-side
/// evaluation happens.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetadataFilter {
    #[serde(default)]
    pub logical_operator: LogicalOperator,
    #[serde(default)]
    pub expressions: Vec<MetadataExpression>,
}

/// Hemisphere restriction for spacecraft footprints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hemisphere {
    Northern,
    Southern,
}

/// One matching rule set of a conjunction search.
///
/// The same shape is used for ground, space and events blocks; which list a
/// block is placed in decides its category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CriteriaBlock {
    #[serde(default)]
    pub programs: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub instrument_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ephemeris_metadata_filters: Option<MetadataFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hemisphere: Option<Vec<Hemisphere>>,
}

impl CriteriaBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_programs<I, S>(mut self, programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.programs = programs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_instrument_types<I, S>(mut self, instrument_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instrument_types = instrument_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_metadata_filter(mut self, filter: MetadataFilter) -> Self {
        self.ephemeris_metadata_filters = Some(filter);
        self
    }

    pub fn with_hemisphere<I>(mut self, hemisphere: I) -> Self
    where
        I: IntoIterator<Item = Hemisphere>,
    {
        self.hemisphere = Some(hemisphere.into_iter().collect());
        self
    }
}
