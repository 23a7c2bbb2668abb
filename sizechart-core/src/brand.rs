//! Static brand catalog.

use serde::{Deserialize, Serialize};

/// Id of the brand whose logo is supplied by the user.
pub const CUSTOM_BRAND_ID: &str = "custom";

/// Brand palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandColors {
    /// Main color (header fill and text by default).
    pub primary: String,
    /// Canvas fill when no background template is active.
    pub secondary: String,
    /// Highlight color.
    pub accent: String,
}

impl BrandColors {
    /// Palette used when no brand is selected.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            primary: "#000".to_string(),
            secondary: "#fff".to_string(),
            accent: "#ccc".to_string(),
        }
    }
}

impl Default for BrandColors {
    fn default() -> Self {
        Self::neutral()
    }
}

/// A brand: name, logo reference, palette and font.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Stable id.
    pub id: String,
    /// Display name, also used in export file names.
    pub name: String,
    /// Logo image reference (path or data URI).
    pub logo: Option<String>,
    /// Palette.
    pub colors: BrandColors,
    /// Preferred font family.
    pub font: String,
}

impl Brand {
    /// Whether this is the user-supplied custom brand.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_BRAND_ID
    }

    /// Replace the logo reference (used for custom uploads).
    #[must_use]
    pub fn with_logo(mut self, logo: impl Into<String>) -> Self {
        self.logo = Some(logo.into());
        self
    }
}

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    logo: Option<&'static str>,
    colors: [&'static str; 3],
    font: &'static str,
}

const fn entry(
    id: &'static str,
    name: &'static str,
    logo: Option<&'static str>,
    colors: [&'static str; 3],
    font: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        id,
        name,
        logo,
        colors,
        font,
    }
}

#[rustfmt::skip]
const CATALOG: &[CatalogEntry] = &[
    entry("gmax", "G-Max", Some("/logos/G-max.png"), ["#000000", "#ffffff", "#ff0000"], "Inter"),
    entry("bnc", "BNC", Some("/logos/BNC.png"), ["#003366", "#ffffff", "#f0f0f0"], "Roboto"),
    entry("adidas", "ADIDAS", Some("/logos/ADIDAS.png"), ["#000000", "#ffffff", "#000000"], "Arial"),
    entry("nike", "NIKE", Some("/logos/NIKE.png"), ["#111111", "#ffffff", "#ff6b6b"], "Helvetica"),
    entry("puma", "PUMA", Some("/logos/PUMA.png"), ["#c41e3a", "#ffffff", "#000000"], "Arial"),
    entry("ginna", "GINNA", Some("/logos/GINNA.png"), ["#1e40af", "#ffffff", "#fbbf24"], "Times New Roman"),
    entry("ginzo-black", "GINZO BLACK", Some("/logos/GINZO BLACK.png"), ["#000000", "#ffffff", "#666666"], "Arial"),
    entry("ginzo-blue", "GINZO BLUE", Some("/logos/GINZO BLUE.png"), ["#2563eb", "#ffffff", "#60a5fa"], "Arial"),
    entry("edwin", "EDWIN", Some("/logos/EDWIN.png"), ["#7c2d12", "#ffffff", "#d97706"], "Georgia"),
    entry("birkenstock", "Birkenstock", Some("/logos/Birkenstock.png"), ["#a16207", "#ffffff", "#854d0e"], "Arial"),
    entry("lotto", "LOTTO", Some("/logos/lotto.png"), ["#dc2626", "#ffffff", "#fbbf24"], "Arial"),
    entry("newstar", "Newstar", Some("/logos/Newstar.png"), ["#059669", "#ffffff", "#10b981"], "Arial"),
    entry("lee-cooper", "Lee Cooper", Some("/logos/Lee-Cooper-logo.png"), ["#1f2937", "#ffffff", "#6b7280"], "Arial"),
    entry("fipper", "Fipper", Some("/logos/fipper.png"), ["#0ea5e9", "#ffffff", "#7dd3fc"], "Arial"),
    entry("teva", "TEVA", Some("/logos/TEVA.png"), ["#ea580c", "#ffffff", "#fdba74"], "Arial"),
    entry("pallas", "Pallas", Some("/logos/Pallas.png"), ["#7c3aed", "#ffffff", "#a78bfa"], "Arial"),
    entry("gwingx", "G-WINGX", Some("/logos/gwingx@4x-8.png"), ["#1e293b", "#ffffff", "#475569"], "Arial"),
    entry("ginna-boy", "Ginna Boy", Some("/logos/Ginna Boy.png"), ["#3b82f6", "#ffffff", "#60a5fa"], "Arial"),
    entry("ginna-girl", "Ginna Girl", Some("/logos/Ginna Girl.png"), ["#ec4899", "#ffffff", "#f9a8d4"], "Arial"),
    entry("gmax-kids", "G-MAX KIDS", Some("/logos/G-MAX KIDS.png"), ["#10b981", "#ffffff", "#34d399"], "Comic Sans MS"),
    entry("amigo", "Amigo", Some("/logos/amigopng.png"), ["#f59e0b", "#ffffff", "#fbbf24"], "Arial"),
    entry("asadi", "Asadi", Some("/logos/Asadi.png"), ["#64748b", "#ffffff", "#94a3b8"], "Arial"),
    entry("nanyang", "Nanyang", Some("/logos/Nanyang.png"), ["#991b1b", "#ffffff", "#dc2626"], "Times New Roman"),
    entry("novigo", "Novigo", Some("/logos/novigo.png"), ["#4338ca", "#ffffff", "#6366f1"], "Arial"),
    entry("fitoo", "Fitoo", Some("/logos/fitoo-01.png"), ["#0891b2", "#ffffff", "#06b6d4"], "Arial"),
    entry("showissue", "ShowIssue", Some("/logos/ShowIssue@4x-8.png"), ["#e11d48", "#ffffff", "#f43f5e"], "Arial"),
    entry("soxtec", "SOXTEC", Some("/logos/soxtec.png"), ["#0f766e", "#ffffff", "#14b8a6"], "Arial"),
    entry("tinggu", "Tinggu", Some("/logos/Tinggu.png"), ["#a21caf", "#ffffff", "#c026d3"], "Arial"),
    entry("twenties", "Twenties", Some("/logos/twenties.png"), ["#1f2937", "#ffffff", "#6b7280"], "Arial"),
    entry("eviee", "Eviee", Some("/logos/eviee.png"), ["#be123c", "#ffffff", "#e11d48"], "Arial"),
    entry("g2", "G2", Some("/logos/G2.png"), ["#6366f1", "#ffffff", "#818cf8"], "Arial"),
    entry("blueku", "Blueku", Some("/logos/blueku@4x-8.png"), ["#0284c7", "#ffffff", "#0ea5e9"], "Arial"),
    entry("activate", "Activate", Some("/logos/Activate.png"), ["#16a34a", "#ffffff", "#22c55e"], "Arial"),
    entry("semlouis", "Sem Louis", Some("/logos/semlouis.jpg"), ["#7c2d12", "#ffffff", "#a16207"], "Times New Roman"),
    entry("custom", "Custom Brand", None, ["#000000", "#ffffff", "#cccccc"], "sans-serif"),
];

impl CatalogEntry {
    fn to_brand(&self) -> Brand {
        let [primary, secondary, accent] = self.colors;
        Brand {
            id: self.id.to_string(),
            name: self.name.to_string(),
            logo: self.logo.map(str::to_string),
            colors: BrandColors {
                primary: primary.to_string(),
                secondary: secondary.to_string(),
                accent: accent.to_string(),
            },
            font: self.font.to_string(),
        }
    }
}

/// Every brand in the catalog, in display order.
#[must_use]
pub fn catalog() -> Vec<Brand> {
    CATALOG.iter().map(CatalogEntry::to_brand).collect()
}

/// Look up a brand by id (case-insensitive).
#[must_use]
pub fn find_brand(id: &str) -> Option<Brand> {
    CATALOG
        .iter()
        .find(|e| e.id.eq_ignore_ascii_case(id.trim()))
        .map(CatalogEntry::to_brand)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<&str> = CATALOG.iter().map(|e| e.id).collect();
        assert_eq!(ids.len(), CATALOG.len());
    }

    #[test]
    fn test_find_brand() {
        let brand = find_brand("ADIDAS").expect("known brand");
        assert_eq!(brand.name, "ADIDAS");
        assert_eq!(brand.logo.as_deref(), Some("/logos/ADIDAS.png"));
        assert!(find_brand("nope").is_none());
    }

    #[test]
    fn test_custom_brand_has_no_logo() {
        let custom = find_brand(CUSTOM_BRAND_ID).expect("custom");
        assert!(custom.is_custom());
        assert!(custom.logo.is_none());
        let uploaded = custom.with_logo("data:image/png;base64,AAAA");
        assert!(uploaded.logo.is_some());
    }
}
