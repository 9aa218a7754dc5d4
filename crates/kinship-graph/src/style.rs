//! Family graph style system
//!
//! Generation palette for nodes and per-relationship link styling. Output
//! colors are hex strings so any rendering surface can consume them.

use kinship_core::{RelationshipType, config};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// RGB color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parses `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#').unwrap_or(value);
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(9);
        let _ = write!(out, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b);
        if self.a != 255 {
            let _ = write!(out, "{:02x}", self.a);
        }
        out
    }

    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
            a: self.a,
        }
    }

    pub fn lighten(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) + (255.0 - self.r as f32) * factor) as u8,
            g: ((self.g as f32) + (255.0 - self.g as f32) * factor) as u8,
            b: ((self.b as f32) + (255.0 - self.b as f32) * factor) as u8,
            a: self.a,
        }
    }
}

/// Generation colors, shallowest first. Deeper trees wrap around.
pub const GENERATION_PALETTE: [Color; 8] = [
    Color::rgb(59, 130, 246),  // blue
    Color::rgb(16, 185, 129),  // emerald
    Color::rgb(245, 158, 11),  // amber
    Color::rgb(239, 68, 68),   // red
    Color::rgb(139, 92, 246),  // violet
    Color::rgb(236, 72, 153),  // pink
    Color::rgb(20, 184, 166),  // teal
    Color::rgb(249, 115, 22),  // orange
];

pub const COLOR_NODE_TEXT: Color = Color::rgb(255, 255, 255);
pub const COLOR_SELF_BORDER: Color = Color::rgb(250, 204, 21);

pub fn generation_base_color(generation: i32) -> Color {
    let slot = generation.max(0) as usize % GENERATION_PALETTE.len();
    GENERATION_PALETTE[slot]
}

/// Hex color for a generation; negative generations clamp to the first color.
pub fn generation_color(generation: i32) -> String {
    generation_base_color(generation).to_hex()
}

/// Generation color from a custom palette. An empty palette, or an entry
/// that is not a hex color, uses the built-in slot instead.
pub fn palette_color(palette: &[String], generation: i32) -> Color {
    if palette.is_empty() {
        return generation_base_color(generation);
    }
    let slot = generation.max(0) as usize % palette.len();
    Color::from_hex(&palette[slot]).unwrap_or_else(|| generation_base_color(generation))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeColors {
    pub fill: String,
    pub border: String,
    pub text: String,
}

/// Node colors for a generation; the tree owner gets a highlighted border.
pub fn get_node_colors(generation: i32, is_self: bool) -> NodeColors {
    get_node_colors_with(&[], generation, is_self)
}

pub fn get_node_colors_with(palette: &[String], generation: i32, is_self: bool) -> NodeColors {
    let fill = palette_color(palette, generation);
    let border = if is_self {
        COLOR_SELF_BORDER
    } else {
        fill.darken(0.25)
    };
    NodeColors {
        fill: fill.to_hex(),
        border: border.to_hex(),
        text: COLOR_NODE_TEXT.to_hex(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkStyle {
    pub color: String,
    pub width: f32,
    pub dashed: bool,
    pub arrow_head: bool,
}

pub fn get_link_style(kind: RelationshipType, is_active: bool) -> LinkStyle {
    let base = Color::from_hex(config(kind).color).unwrap_or(Color::rgb(107, 114, 128));
    let base_width = link_width(kind);
    let (color, width) = if is_active {
        (base.lighten(0.3), base_width * 2.0)
    } else {
        (base, base_width)
    };

    LinkStyle {
        color: color.to_hex(),
        width,
        dashed: is_dashed_link(kind),
        arrow_head: !config(kind).is_bidirectional,
    }
}

fn link_width(kind: RelationshipType) -> f32 {
    match kind {
        RelationshipType::Parent | RelationshipType::Child => 2.0,
        RelationshipType::Partner => 1.5,
        _ => 1.0,
    }
}

/// Donor and carrier links are drawn dashed to set them apart from parentage.
fn is_dashed_link(kind: RelationshipType) -> bool {
    matches!(
        kind,
        RelationshipType::Donor | RelationshipType::GestationalCarrier
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let color = Color::from_hex("#3b82f6").unwrap();
        assert_eq!(color, Color::rgb(59, 130, 246));
        assert_eq!(color.to_hex(), "#3b82f6");
        assert_eq!(Color::rgba(0, 0, 0, 16).to_hex(), "#00000010");
        assert!(Color::from_hex("#zzz").is_none());
    }

    #[test]
    fn test_generation_colors_wrap_and_clamp() {
        assert_eq!(generation_color(0), generation_color(8));
        assert_eq!(generation_color(-1), generation_color(0));
        assert_ne!(generation_color(0), generation_color(1));
    }

    #[test]
    fn test_self_border_is_highlighted() {
        let normal = get_node_colors(1, false);
        let owner = get_node_colors(1, true);
        assert_eq!(normal.fill, owner.fill);
        assert_eq!(owner.border, COLOR_SELF_BORDER.to_hex());
    }

    #[test]
    fn test_custom_palette_fills_nodes() {
        let palette = vec!["#111111".to_string(), "nonsense".to_string()];
        assert_eq!(get_node_colors_with(&palette, 2, false).fill, "#111111");
        assert_eq!(
            get_node_colors_with(&palette, 1, false).fill,
            generation_color(1)
        );
        assert_eq!(get_node_colors_with(&[], 3, false), get_node_colors(3, false));
    }

    #[test]
    fn test_link_styles() {
        let donor = get_link_style(RelationshipType::Donor, false);
        assert!(donor.dashed);
        assert!(donor.arrow_head);
        let sibling = get_link_style(RelationshipType::Sibling, false);
        assert!(!sibling.arrow_head);
        let active = get_link_style(RelationshipType::Parent, true);
        assert_eq!(active.width, 4.0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_generation_color_is_palette_entry(generation in -50i32..500) {
                let hex = generation_color(generation);
                prop_assert!(GENERATION_PALETTE.iter().any(|c| c.to_hex() == hex));
            }
        }
    }
}
