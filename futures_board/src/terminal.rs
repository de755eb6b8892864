//! Terminal rendering of the status bar and the category tree.
use futures_service::service::Snapshot;
use futures_service::statusbar::SlotCommand;
use futures_service::tree::{Collapsible, FutureTree};
use futures_service::{BarFamily, DisplaySlot, SlotHost};
use log::debug;

const RESET: &str = "\x1b[0m";

/// Slot host that keeps slots in memory and prints them on demand.
#[derive(Debug, Default)]
pub struct TerminalHost;

impl SlotHost for TerminalHost {
    type Slot = TerminalSlot;

    fn create_slot(&mut self, family: BarFamily) -> TerminalSlot {
        debug!("Creating {:?} slot", family);
        TerminalSlot {
            family,
            text: String::new(),
            tooltip: String::new(),
            color: String::new(),
            command: None,
            visible: false,
        }
    }
}

/// One status-bar entry rendered as a colored text segment.
#[derive(Debug)]
pub struct TerminalSlot {
    family: BarFamily,
    text: String,
    tooltip: String,
    color: String,
    command: Option<SlotCommand>,
    visible: bool,
}

impl TerminalSlot {
    /// Colored text, or `None` while hidden.
    pub fn render(&self) -> Option<String> {
        self.visible.then(|| colorize(&self.text, &self.color))
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }
}

impl DisplaySlot for TerminalSlot {
    fn set_text(&mut self, text: String) {
        self.text = text;
    }

    fn set_tooltip(&mut self, tooltip: String) {
        self.tooltip = tooltip;
    }

    fn set_color(&mut self, color: String) {
        self.color = color;
    }

    fn set_command(&mut self, command: SlotCommand) {
        self.command = Some(command);
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
    }

    fn dispose(self) {
        let bound = self.command.map(|c| c.arguments.join(",")).unwrap_or_default();
        debug!("Disposed {:?} slot {}", self.family, bound);
    }
}

/// Parse a `#rrggbb` color.
fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Wrap `text` in a 24-bit ANSI foreground color; unparsable colors leave it plain.
pub fn colorize(text: &str, color: &str) -> String {
    match parse_hex(color) {
        Some((r, g, b)) => format!("\x1b[38;2;{};{};{}m{}{}", r, g, b, text, RESET),
        None => text.to_string(),
    }
}

/// Visible slots joined into one status line.
pub fn status_line(slots: &[TerminalSlot]) -> String {
    slots
        .iter()
        .filter_map(TerminalSlot::render)
        .collect::<Vec<_>>()
        .join("  ")
}

/// Indented tree listing; collapsed headers print without their children.
pub fn tree_lines(tree: &FutureTree, snapshot: &Snapshot) -> Vec<String> {
    let mut lines = Vec::new();
    for root in tree.root_nodes(snapshot) {
        let item = tree.tree_item(&root);
        match item.collapsible {
            Collapsible::Expanded => {
                lines.push(format!("▾ {}", item.label));
                for child in tree.children(&root, snapshot) {
                    lines.push(format!("    {}", tree.tree_item(&child).label));
                }
            }
            Collapsible::Collapsed => lines.push(format!("▸ {}", item.label)),
            Collapsible::None => lines.push(item.label),
        }
    }
    lines
}
