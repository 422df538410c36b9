//! Hand-tuned relocation tables used by the dense and exploded layouts, and
//! the synthetic region groupings added to some region-level tables.

/// Move of one subregion, optionally followed by a uniform scale.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Relocation {
    pub code: &'static str,
    pub offset: (f64, f64),
    /// Factor and origin applied after the translation.
    pub scale: Option<(f64, (f64, f64))>,
}

/// Zoomed copy of a dense cluster of subregions drawn beside the main map.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Inset {
    pub codes: &'static [&'static str],
    pub offset: (f64, f64),
    pub factor: f64,
    pub origin: (f64, f64),
}

/// Two extra regions splitting the country in a mainland and an outlying part.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PseudoRegions {
    /// Code and name of the mainland grouping.
    pub mainland: (&'static str, &'static str),
    /// Code and name of the outlying grouping.
    pub outlying: (&'static str, &'static str),
    pub is_outlying: fn(&str) -> bool,
}

// Overseas departments moved next to the metropolitan map.
pub(crate) const FRA_RELOCATION: &[Relocation] = &[
    Relocation { code: "971", offset: (63.0, 23.0), scale: None },
    Relocation { code: "972", offset: (63.0, 23.0), scale: None },
    Relocation { code: "973", offset: (50.0, 35.0), scale: None },
    Relocation { code: "974", offset: (-51.0, 60.0), scale: None },
    Relocation { code: "976", offset: (-38.0, 51.5), scale: None },
];

pub(crate) const USA_RELOCATION: &[Relocation] = &[
    Relocation { code: "AK", offset: (40.0, -40.0), scale: Some((0.4, (-120.0, 25.0))) },
    Relocation { code: "HI", offset: (60.0, 0.0), scale: Some((1.0, (-130.0, 25.0))) },
];

/// Collectivités d'outre-mer: too many small islands to relocate.
pub(crate) const FRA_FRAGMENTED: &[&str] = &["980"];

/// Île-de-France departments.
pub(crate) const FRA_INSET: Inset = Inset {
    codes: &["75", "91", "92", "93", "94", "95", "77", "78"],
    offset: (-6.5, -5.0),
    factor: 3.0,
    origin: (-1.5, 43.0),
};

// Overseas region codes are 01 to 09; mainland regions start at 11.
fn fra_overseas(code_region: &str) -> bool {
    code_region.trim().parse::<u32>().map(|c| c < 10).unwrap_or(false)
}

fn esp_islands(code_region: &str) -> bool {
    code_region == "05"
}

fn prt_islands(code_region: &str) -> bool {
    matches!(code_region, "PT.AC" | "PT.MA")
}

pub(crate) const FRA_PSEUDO: PseudoRegions = PseudoRegions {
    mainland: ("999", "Métropole"),
    outlying: ("000", "Outre-mer"),
    is_outlying: fra_overseas,
};

pub(crate) const ESP_PSEUDO: PseudoRegions = PseudoRegions {
    mainland: ("99", "España peninsular"),
    outlying: ("00", "Islas españolas"),
    is_outlying: esp_islands,
};

pub(crate) const PRT_PSEUDO: PseudoRegions = PseudoRegions {
    mainland: ("PT.99", "Portugal continental"),
    outlying: ("PT.00", "Ilhas portuguesas"),
    is_outlying: prt_islands,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overseas_split_uses_numeric_region_code() {
        assert!((FRA_PSEUDO.is_outlying)("04"));
        assert!(!(FRA_PSEUDO.is_outlying)("11"));
        assert!(!(FRA_PSEUDO.is_outlying)("84"));
    }

    #[test]
    fn inset_cluster_has_no_relocated_department() {
        for r in FRA_RELOCATION {
            assert!(!FRA_INSET.codes.contains(&r.code));
        }
    }
}
