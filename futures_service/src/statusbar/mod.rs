//! Status-bar slots bound to quote records.
//!
//! The host shell owns the actual widgets; this module only sees them through the
//! `SlotHost` / `DisplaySlot` traits. Each instrument family (stocks, futures) gets
//! its own `SlotPool`, and `StatusBar` keeps both pools together with the host.
//!
//! - `pool`: the reconciler that resizes a pool and rebinds slots on refresh.
mod pool;

pub use pool::SlotPool;

use futures_common::{QuoteRecord, Settings};

/// Click action attached to a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCommand {
    /// Human-readable title.
    pub title: String,
    /// Host command identifier.
    pub command: String,
    /// Command arguments (the bound record's code).
    pub arguments: Vec<String>,
}

/// One display widget owned by the host.
pub trait DisplaySlot {
    /// Replace the visible text.
    fn set_text(&mut self, text: String);
    /// Replace the hover text.
    fn set_tooltip(&mut self, tooltip: String);
    /// Set the foreground color (`#rrggbb`).
    fn set_color(&mut self, color: String);
    /// Set the click action.
    fn set_command(&mut self, command: SlotCommand);
    /// Make the slot visible.
    fn show(&mut self);
    /// Hide the slot without releasing it.
    fn hide(&mut self);
    /// Release the widget. The slot is unusable afterwards.
    fn dispose(self);
}

/// Factory for display slots.
pub trait SlotHost {
    /// Concrete slot type created by this host.
    type Slot: DisplaySlot;

    /// Create a new, hidden slot for `family`.
    fn create_slot(&mut self, family: BarFamily) -> Self::Slot;
}

/// Instrument family a slot pool displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarFamily {
    /// Stock and index quotes.
    Stock,
    /// Futures contracts.
    Future,
}

/// Composite index shown by default in the stock family.
const DEFAULT_STOCK_CODE: &str = "sh000001";

impl BarFamily {
    /// Codes pinned to this family's slots, in slot order.
    pub fn pinned_codes(self, settings: &Settings) -> &[String] {
        match self {
            BarFamily::Stock => &settings.status_bar_stocks,
            BarFamily::Future => &settings.status_bar_futures,
        }
    }

    /// Whether the family-specific hide flag is set.
    pub fn is_hidden(self, settings: &Settings) -> bool {
        match self {
            BarFamily::Stock => settings.hide_status_bar_stock,
            BarFamily::Future => settings.hide_status_bar_future,
        }
    }

    /// Record preferred for the single slot shown when nothing is pinned.
    pub fn default_code(self) -> Option<&'static str> {
        match self {
            BarFamily::Stock => Some(DEFAULT_STOCK_CODE),
            BarFamily::Future => None,
        }
    }

    /// Click command attached to every slot of the family.
    pub fn command(self, code: &str) -> SlotCommand {
        let (title, command) = match self {
            BarFamily::Stock => ("Change stock", "futures-board.changeStatusBarItem"),
            BarFamily::Future => ("Change future", "futures-board.changeFutureStatusBarItem"),
        };
        SlotCommand {
            title: title.to_string(),
            command: command.to_string(),
            arguments: vec![code.to_string()],
        }
    }
}

/// Both slot pools plus the host that creates their widgets.
pub struct StatusBar<H: SlotHost> {
    host: H,
    stocks: SlotPool<H::Slot>,
    futures: SlotPool<H::Slot>,
}

impl<H: SlotHost> StatusBar<H> {
    /// Status bar with empty pools on `host`.
    pub fn new(host: H) -> Self {
        StatusBar {
            host,
            stocks: SlotPool::new(BarFamily::Stock),
            futures: SlotPool::new(BarFamily::Future),
        }
    }

    /// Rebuild the stock slots from `records`.
    pub fn refresh_stocks(&mut self, records: &[QuoteRecord], settings: &Settings) {
        self.stocks.refresh(&mut self.host, records, settings);
    }

    /// Rebuild the futures slots from `records`.
    pub fn refresh_futures(&mut self, records: &[QuoteRecord], settings: &Settings) {
        self.futures.refresh(&mut self.host, records, settings);
    }

    /// Slots of `family`, in slot order.
    pub fn slots(&self, family: BarFamily) -> &[H::Slot] {
        match family {
            BarFamily::Stock => self.stocks.slots(),
            BarFamily::Future => self.futures.slots(),
        }
    }

    /// Host that owns the widgets.
    pub fn host(&self) -> &H {
        &self.host
    }
}
