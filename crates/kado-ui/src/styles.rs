//! Ayu color theme and styling functions for kado CLI output.
//!
//! Uses the Ayu Dark palette. Color source:
//! <https://github.com/ayu-theme/ayu-colors>
//!
//! Only outcomes get color; bead names stay in standard
//! text except the policy gate, which is accented.

use kado_core::kind::BeadKind;
use owo_colors::OwoColorize;

use crate::terminal::supports_color;

// ---------------------------------------------------------------------------
// Ayu Dark color palette (RGB values)
// ---------------------------------------------------------------------------

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c - bright green
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178 - bright red
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680 - muted gray
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff); // #59c2ff - bright blue

// ---------------------------------------------------------------------------
// Icons
// ---------------------------------------------------------------------------

pub const ICON_PASS: &str = "\u{2713}"; // ✓
pub const ICON_FAIL: &str = "\u{2716}"; // ✖

/// Drawn between beads of one relay chain.
pub const RELAY_ARROW: &str = "\u{2193}"; // ↓

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

fn color_bold_str(s: &str, rgb: (u8, u8, u8)) -> String {
    if supports_color() {
        s.truecolor(rgb.0, rgb.1, rgb.2).bold().to_string()
    } else {
        s.to_string()
    }
}

pub fn render_pass(s: &str) -> String {
    color_str(s, PASS)
}

pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_accent(s: &str) -> String {
    color_str(s, ACCENT)
}

pub fn render_bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

/// Renders a section header in accent color and bold.
pub fn render_header(s: &str) -> String {
    color_bold_str(s, ACCENT)
}

pub fn render_pass_icon() -> String {
    color_str(ICON_PASS, PASS)
}

pub fn render_fail_icon() -> String {
    color_str(ICON_FAIL, FAIL)
}

pub fn render_relay_arrow() -> String {
    color_str(RELAY_ARROW, MUTED)
}

// ---------------------------------------------------------------------------
// Domain rendering
// ---------------------------------------------------------------------------

/// Renders a bead name; the policy gate is accented.
pub fn render_kind(kind: BeadKind) -> String {
    match kind {
        BeadKind::Opa => render_accent(kind.as_str()),
        _ => kind.as_str().to_string(),
    }
}

/// Renders a policy verdict as `allowed` or `denied`.
pub fn render_decision(allow: bool) -> String {
    if allow {
        render_pass("allowed")
    } else {
        render_fail("denied")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_keeps_its_name() {
        for kind in BeadKind::ALL {
            assert!(render_kind(kind).contains(kind.as_str()));
        }
    }

    #[test]
    fn decision_labels() {
        assert!(render_decision(true).contains("allowed"));
        assert!(render_decision(false).contains("denied"));
    }

    #[test]
    fn icons_contain_symbols() {
        assert!(render_pass_icon().contains(ICON_PASS));
        assert!(render_fail_icon().contains(ICON_FAIL));
        assert!(render_relay_arrow().contains(RELAY_ARROW));
    }
}
