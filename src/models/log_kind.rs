//! Inspection log kinds
//!
//! Each kind knows its entity type tag, the backend table its records go
//! to, its default record, and which of its fields are repeatable lists,
//! nested objects, or derived.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::FieldLogError;

/// Kind of daily inspection log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogKind {
    Clearing,
    Ditching,
    Grading,
    Hdd,
    Hydrotest,
    Hydrovac,
    TieIn,
    Cleanup,
}

/// A list of repeatable rows inside a log (soft spots, welds, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatableList {
    /// Key of the array in the record
    pub field: &'static str,
    /// Singular display name of one row
    pub entry_type: &'static str,
}

/// A one-level nested object inside a log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NestedObject {
    pub field: &'static str,
    pub label: &'static str,
}

impl LogKind {
    pub const ALL: [LogKind; 8] = [
        LogKind::Clearing,
        LogKind::Ditching,
        LogKind::Grading,
        LogKind::Hdd,
        LogKind::Hydrotest,
        LogKind::Hydrovac,
        LogKind::TieIn,
        LogKind::Cleanup,
    ];

    /// Short name used on the command line and in file names
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Clearing => "clearing",
            Self::Ditching => "ditching",
            Self::Grading => "grading",
            Self::Hdd => "hdd",
            Self::Hydrotest => "hydrotest",
            Self::Hydrovac => "hydrovac",
            Self::TieIn => "tie-in",
            Self::Cleanup => "cleanup",
        }
    }

    /// Tag recorded as the audit entity type
    pub fn entity_type(&self) -> &'static str {
        match self {
            Self::Clearing => "ClearingLog",
            Self::Ditching => "DitchLog",
            Self::Grading => "GradingLog",
            Self::Hdd => "HddLog",
            Self::Hydrotest => "HydrotestLog",
            Self::Hydrovac => "HydrovacLog",
            Self::TieIn => "TieInLog",
            Self::Cleanup => "CleanupLog",
        }
    }

    /// Backend table holding submitted records of this kind
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Clearing => "clearing_logs",
            Self::Ditching => "ditch_logs",
            Self::Grading => "grading_logs",
            Self::Hdd => "hdd_logs",
            Self::Hydrotest => "hydrotest_logs",
            Self::Hydrovac => "hydrovac_logs",
            Self::TieIn => "tie_in_logs",
            Self::Cleanup => "cleanup_logs",
        }
    }

    pub fn repeatable_list(&self) -> Option<RepeatableList> {
        let (field, entry_type) = match self {
            Self::Clearing => ("timber_decks", "Timber Deck"),
            Self::Ditching => ("soft_spots", "Soft Spot"),
            Self::Hydrovac => ("potholes", "Pothole"),
            Self::TieIn => ("welds", "Weld"),
            Self::Grading | Self::Hdd | Self::Hydrotest | Self::Cleanup => return None,
        };
        Some(RepeatableList { field, entry_type })
    }

    pub fn nested_object(&self) -> Option<NestedObject> {
        let (field, label) = match self {
            Self::Ditching => ("padding", "Padding"),
            Self::Grading => ("topsoil", "Topsoil"),
            Self::Hdd => ("drilling_fluid", "Drilling Fluid"),
            Self::Hydrotest => ("test_section", "Test Section"),
            Self::Cleanup => ("erosion_control", "Erosion Control"),
            Self::Clearing | Self::Hydrovac | Self::TieIn => return None,
        };
        Some(NestedObject { field, label })
    }

    /// Fields computed from other fields; never set directly
    pub fn derived_fields(&self) -> &'static [&'static str] {
        match self {
            Self::Ditching => &["depth_variance", "bags_per_pier"],
            Self::Hydrotest => &["pressure_variance"],
            Self::Cleanup => &["total_seed_used"],
            _ => &[],
        }
    }

    /// Singular display name for rows of `list`
    pub fn entry_type_for(&self, list: &str) -> String {
        match self.repeatable_list() {
            Some(repeatable) if repeatable.field == list => repeatable.entry_type.to_string(),
            _ => humanize_field(list),
        }
    }

    /// Display label for a nested parent field
    pub fn nested_label_for(&self, parent: &str) -> String {
        match self.nested_object() {
            Some(nested) if nested.field == parent => nested.label.to_string(),
            _ => humanize_field(parent),
        }
    }

    /// A blank record of this kind
    pub fn defaults(&self) -> Map<String, Value> {
        let mut record = match json!({
            "date": "",
            "inspector": "",
            "contractor": "",
            "station_from": "",
            "station_to": "",
            "weather": "",
            "comments": "",
        }) {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let specific = match self {
            Self::Clearing => json!({
                "clearing_width": "",
                "merchantable_timber": false,
                "timber_decks": [],
            }),
            Self::Ditching => json!({
                "specified_depth": "",
                "actual_depth": "",
                "depth_variance": null,
                "pier_count": "",
                "total_bags": "",
                "bags_per_pier": null,
                "padding": { "required": false, "material": "", "depth": "" },
                "soft_spots": [],
            }),
            Self::Grading => json!({
                "ramp_count": "",
                "topsoil_stripped": false,
                "topsoil": { "storage_location": "", "strip_depth": "" },
            }),
            Self::Hdd => json!({
                "bore_length": "",
                "entry_angle": "",
                "exit_angle": "",
                "drilling_fluid": { "product": "", "volume": "" },
            }),
            Self::Hydrotest => json!({
                "target_pressure": "",
                "test_pressure": "",
                "pressure_variance": null,
                "hold_hours": "",
                "test_medium": "water",
                "passed": false,
                "test_section": { "start_station": "", "end_station": "" },
            }),
            Self::Hydrovac => json!({
                "locate_ticket": "",
                "potholes": [],
            }),
            Self::TieIn => json!({
                "coating_inspected": false,
                "welds": [],
            }),
            Self::Cleanup => json!({
                "seed_mix": "",
                "seed_rate": "",
                "seeded_area": "",
                "total_seed_used": null,
                "erosion_control": { "silt_fence": false, "matting": false },
            }),
        };

        if let Value::Object(specific) = specific {
            record.extend(specific);
        }
        record
    }

    /// Parse a log kind from its slug, entity type, or a common alias
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "clearing" | "clearinglog" => Some(Self::Clearing),
            "ditching" | "ditch" | "ditchlog" => Some(Self::Ditching),
            "grading" | "gradinglog" => Some(Self::Grading),
            "hdd" | "hddlog" => Some(Self::Hdd),
            "hydrotest" | "hydrotestlog" => Some(Self::Hydrotest),
            "hydrovac" | "hydrovaclog" => Some(Self::Hydrovac),
            "tie-in" | "tiein" | "tieinlog" => Some(Self::TieIn),
            "cleanup" | "cleanuplog" => Some(Self::Cleanup),
            _ => None,
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for LogKind {
    type Err = FieldLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            let valid: Vec<_> = Self::ALL.iter().map(LogKind::slug).collect();
            FieldLogError::Validation(format!(
                "Invalid log kind: '{}'. Valid kinds: {}",
                s,
                valid.join(", ")
            ))
        })
    }
}

/// Turn a snake_case field key into a display name ("specified_depth" -> "Specified Depth")
pub fn humanize_field(field: &str) -> String {
    field
        .split(['_', '-'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
