//! Built-in catalog of safety-lighting symbols.

use serde::{Deserialize, Serialize};

/// Symbol id selected by default when a session starts.
pub const DEFAULT_SYMBOL_ID: &str = "RZ_RIGHT";

/// Luminaire category a symbol counts toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    /// Rettungszeichenleuchte (illuminated exit sign)
    Rzl,
    /// Notleuchte (emergency luminaire)
    Nl,
    /// Einzelleuchte (single-point luminaire)
    El,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Rzl => "RZL",
            SymbolKind::Nl => "NL",
            SymbolKind::El => "EL",
        }
    }
}

/// Default placement footprint for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    /// Landscape exit-sign footprint
    Standard,
    /// Square cube-arrow footprint
    Compact,
}

impl SizeClass {
    /// Width and height in world units.
    pub fn dims(&self) -> (f64, f64) {
        match self {
            SizeClass::Standard => (90.0, 60.0),
            SizeClass::Compact => (70.0, 70.0),
        }
    }
}

/// One catalog entry. The base SVG carries the sign body; directional signs
/// additionally merge an arrow overlay into it before rasterizing.
#[derive(Debug, Clone)]
pub struct SymbolDef {
    pub id: &'static str,
    pub name: &'static str,
    pub base: &'static str,
    pub overlay: Option<&'static str>,
    pub kind: SymbolKind,
    pub size: SizeClass,
}

/// The fixed set of placeable symbols.
#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    defs: Vec<SymbolDef>,
}

impl Default for SymbolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SymbolCatalog {
    pub fn builtin() -> Self {
        use SizeClass::{Compact, Standard};
        use SymbolKind::{El, Nl, Rzl};

        let rz = |id, name, overlay| SymbolDef {
            id,
            name,
            base: "assets/symbols/rz_iso_base.svg",
            overlay: Some(overlay),
            kind: Rzl,
            size: Standard,
        };
        let plain = |id, name, base, kind, size| SymbolDef {
            id,
            name,
            base,
            overlay: None,
            kind,
            size,
        };

        Self {
            defs: vec![
                rz("RZ_NONE", "Rettungszeichen (ohne Pfeil)", "assets/symbols/arrow_none.svg"),
                rz("RZ_LEFT", "Rettungszeichen ←", "assets/symbols/arrow_left.svg"),
                rz("RZ_RIGHT", "Rettungszeichen →", "assets/symbols/arrow_right.svg"),
                rz("RZ_UP", "Rettungszeichen ↑", "assets/symbols/arrow_up.svg"),
                rz("RZ_DOWN", "Rettungszeichen ↓", "assets/symbols/arrow_down.svg"),
                rz("RZ_UL", "Rettungszeichen ↖", "assets/symbols/arrow_upleft.svg"),
                rz("RZ_UR", "Rettungszeichen ↗", "assets/symbols/arrow_upright.svg"),
                rz("RZ_DL", "Rettungszeichen ↙", "assets/symbols/arrow_downleft.svg"),
                rz("RZ_DR", "Rettungszeichen ↘", "assets/symbols/arrow_downright.svg"),
                plain(
                    "CUBE_RIGHT",
                    "Würfel-Pfeil →",
                    "assets/symbols/cube_arrow_right.svg",
                    Rzl,
                    Compact,
                ),
                plain(
                    "CUBE_LEFT",
                    "Würfel-Pfeil ←",
                    "assets/symbols/cube_arrow_left.svg",
                    Rzl,
                    Compact,
                ),
                plain(
                    "NL",
                    "Notleuchte (Decke)",
                    "assets/symbols/lamp_emergency_ceiling.svg",
                    Nl,
                    Standard,
                ),
                plain(
                    "NL_WALL",
                    "Notleuchte (Wand)",
                    "assets/symbols/lamp_emergency_wall.svg",
                    Nl,
                    Standard,
                ),
                plain("EL", "Einzelleuchte (EL)", "assets/symbols/el_generic.svg", El, Standard),
                plain(
                    "RZL_BOX",
                    "Rettungszeichenleuchte (Box)",
                    "assets/symbols/lamp_exit_box.svg",
                    Rzl,
                    Standard,
                ),
            ],
        }
    }

    /// Look up an entry by symbol id.
    pub fn get(&self, id: &str) -> Option<&SymbolDef> {
        self.defs.iter().find(|d| d.id == id)
    }

    /// All entries in palette order.
    pub fn iter(&self) -> impl Iterator<Item = &SymbolDef> {
        self.defs.iter()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = SymbolCatalog::builtin();
        assert_eq!(catalog.len(), 15);
        assert!(catalog.get(DEFAULT_SYMBOL_ID).is_some());
        assert!(catalog.get("does-not-exist").is_none());
    }

    #[test]
    fn test_directional_signs_carry_overlays() {
        let catalog = SymbolCatalog::builtin();
        let rz = catalog.get("RZ_LEFT").unwrap();
        assert_eq!(rz.base, "assets/symbols/rz_iso_base.svg");
        assert!(rz.overlay.is_some());
        assert_eq!(rz.kind, SymbolKind::Rzl);

        let nl = catalog.get("NL").unwrap();
        assert!(nl.overlay.is_none());
        assert_eq!(nl.kind, SymbolKind::Nl);
    }

    #[test]
    fn test_size_classes() {
        let catalog = SymbolCatalog::builtin();
        assert_eq!(catalog.get("RZ_RIGHT").unwrap().size.dims(), (90.0, 60.0));
        assert_eq!(catalog.get("CUBE_LEFT").unwrap().size.dims(), (70.0, 70.0));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(SymbolKind::Rzl.as_str(), "RZL");
        assert_eq!(SymbolKind::Nl.as_str(), "NL");
        assert_eq!(SymbolKind::El.as_str(), "EL");
    }
}
