use serde::{Deserialize, Serialize};

use crate::config::{REGIONS, RegionDef};

#[derive(Serialize, Deserialize, Debug, Clone, Hash, Eq, PartialEq)]
pub struct Region {
    pub name: String,
    pub code: String,
}

impl Region {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Region {
            name: name.into(),
            code: code.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // Sigungu code used to query the transaction source
    pub fn code(&self) -> &str {
        &self.code
    }

    /// True if `selector` is this region's code or (case-insensitively) its name.
    pub fn matches(&self, selector: &str) -> bool {
        let selector = selector.trim();
        self.code == selector || self.name.eq_ignore_ascii_case(selector)
    }

    /// Every region in the configured region table.
    pub fn all() -> Vec<Region> {
        REGIONS.iter().map(Region::from).collect()
    }
}

impl From<&RegionDef> for Region {
    fn from(def: &RegionDef) -> Self {
        Region::new(def.name, def.code)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}
