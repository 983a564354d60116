//! The districts the pipeline runs over.

/// One row of the region table
pub struct RegionDef {
    pub name: &'static str,
    /// Sigungu (administrative district) code the transaction source is queried with
    pub code: &'static str,
}

// Incheon metropolitan districts
pub const REGIONS: &[RegionDef] = &[
    RegionDef { name: "Ganghwa", code: "28710" },
    RegionDef { name: "Gyeyang", code: "28245" },
    RegionDef { name: "Namdong", code: "28200" },
    RegionDef { name: "Dong-gu", code: "28140" },
    RegionDef { name: "Michuhol", code: "28177" },
    RegionDef { name: "Bupyeong", code: "28237" },
    RegionDef { name: "Seo-gu", code: "28260" },
    RegionDef { name: "Yeonsu", code: "28185" },
    RegionDef { name: "Jung-gu", code: "28110" },
];
