use std::collections::HashSet;

use futures_common::label::{FALL_ICON, RISE_ICON, render_record};
use futures_common::{QuoteRecord, Settings};
use log::debug;

use super::{BarFamily, DisplaySlot, SlotHost};

/// Pool of display slots for one instrument family.
///
/// On every refresh the pool is sized to the family's pinned code list (one slot
/// when nothing is pinned), grown by appending and shrunk from the tail, and each
/// slot is rebound to the record whose code sits at its position in the pinned
/// list. Slots with no matching record are left as they are. When the display is
/// hidden or there are no records the whole pool is released.
pub struct SlotPool<S: DisplaySlot> {
    family: BarFamily,
    slots: Vec<S>,
}

impl<S: DisplaySlot> SlotPool<S> {
    /// Empty pool for `family`; slots are created on the first refresh.
    pub fn new(family: BarFamily) -> Self {
        SlotPool {
            family,
            slots: Vec::new(),
        }
    }

    /// Family this pool displays.
    pub fn family(&self) -> BarFamily {
        self.family
    }

    /// Live slots, in slot order.
    pub fn slots(&self) -> &[S] {
        &self.slots
    }

    /// Number of live slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pool holds no slots (torn down or never refreshed).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reconcile the pool with `records` under `settings`.
    pub fn refresh<H>(&mut self, host: &mut H, records: &[QuoteRecord], settings: &Settings)
    where
        H: SlotHost<Slot = S>,
    {
        if settings.hide_status_bar || self.family.is_hidden(settings) || records.is_empty() {
            self.tear_down();
            return;
        }

        let targets = self.bind(records, self.family.pinned_codes(settings));
        self.resize(host, targets.len());

        let family = self.family;
        for (slot, record) in self.slots.iter_mut().zip(targets) {
            if let Some(record) = record {
                update_slot(slot, record, family, settings);
            }
        }
    }

    /// Target record for each slot position, in pinned order.
    ///
    /// A code pinned more than once binds only its first position.
    fn bind<'a>(&self, records: &'a [QuoteRecord], pinned: &[String]) -> Vec<Option<&'a QuoteRecord>> {
        if pinned.is_empty() {
            let fallback = self
                .family
                .default_code()
                .and_then(|code| records.iter().find(|r| r.code == code))
                .or_else(|| records.first());
            return vec![fallback];
        }
        let mut seen = HashSet::new();
        pinned
            .iter()
            .map(|code| {
                if !seen.insert(code.as_str()) {
                    return None;
                }
                records.iter().find(|r| &r.code == code)
            })
            .collect()
    }

    fn resize<H>(&mut self, host: &mut H, target: usize)
    where
        H: SlotHost<Slot = S>,
    {
        while self.slots.len() < target {
            self.slots.push(host.create_slot(self.family));
        }
        if self.slots.len() > target {
            debug!(
                "Releasing {} {:?} slots",
                self.slots.len() - target,
                self.family
            );
            for slot in self.slots.drain(target..).rev() {
                release(slot);
            }
        }
    }

    fn tear_down(&mut self) {
        if !self.slots.is_empty() {
            debug!("Tearing down {} {:?} slots", self.slots.len(), self.family);
        }
        for slot in self.slots.drain(..) {
            release(slot);
        }
    }
}

fn release<S: DisplaySlot>(mut slot: S) {
    slot.hide();
    slot.dispose();
}

fn update_slot<S: DisplaySlot>(slot: &mut S, record: &QuoteRecord, family: BarFamily, settings: &Settings) {
    let rising = !record.is_falling();
    let percent = format!("{}%", record.percent);
    let icon = if rising { RISE_ICON } else { FALL_ICON };

    slot.set_text(render_record(
        &settings.label_format.status_bar,
        record,
        &[("percent", percent.clone()), ("icon", icon.to_string())],
    ));
    slot.set_tooltip(format!(
        "「Today」{}{}\nchange: {}   percent: {}\nhigh: {}   low: {}\nopen: {}   prev close: {}",
        record.exchange_prefix,
        record.symbol,
        record.change,
        percent,
        record.high,
        record.low,
        record.open,
        record.previous_close
    ));
    slot.set_color(if rising {
        settings.rise_color.clone()
    } else {
        settings.fall_color.clone()
    });
    slot.set_command(family.command(&record.code));
    slot.show();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statusbar::SlotCommand;
    use futures_common::Category;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Created(usize),
        Hidden(usize),
        Disposed(usize),
    }

    type Log = Rc<RefCell<Vec<Event>>>;

    struct FakeSlot {
        id: usize,
        text: String,
        tooltip: String,
        color: String,
        command: Option<SlotCommand>,
        visible: bool,
        log: Log,
    }

    impl DisplaySlot for FakeSlot {
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
            self.log.borrow_mut().push(Event::Hidden(self.id));
        }
        fn dispose(self) {
            self.log.borrow_mut().push(Event::Disposed(self.id));
        }
    }

    #[derive(Default)]
    struct FakeHost {
        next_id: usize,
        log: Log,
    }

    impl SlotHost for FakeHost {
        type Slot = FakeSlot;

        fn create_slot(&mut self, _family: BarFamily) -> FakeSlot {
            let id = self.next_id;
            self.next_id += 1;
            self.log.borrow_mut().push(Event::Created(id));
            FakeSlot {
                id,
                text: String::new(),
                tooltip: String::new(),
                color: String::new(),
                command: None,
                visible: false,
                log: Rc::clone(&self.log),
            }
        }
    }

    fn future(code: &str, price: &str, percent: &str) -> QuoteRecord {
        let mut record = QuoteRecord::unsupported(code);
        record.category = Category::Future;
        record.name = code.to_lowercase();
        record.price = price.to_string();
        record.percent = percent.to_string();
        record
    }

    fn records() -> Vec<QuoteRecord> {
        vec![
            future("RB2405", "3150.50", "+0.08"),
            future("AG2412", "4995.00", "-0.50"),
            future("IF2406", "3500.00", "+1.20"),
        ]
    }

    fn settings(pinned: &[&str]) -> Settings {
        Settings {
            status_bar_futures: pinned.iter().map(|s| s.to_string()).collect(),
            ..Settings::default()
        }
    }

    fn disposed(log: &Log) -> usize {
        log.borrow()
            .iter()
            .filter(|e| matches!(e, Event::Disposed(_)))
            .count()
    }

    #[test]
    fn slots_follow_pinned_order_not_list_order() {
        let mut host = FakeHost::default();
        let mut pool = SlotPool::new(BarFamily::Future);

        pool.refresh(&mut host, &records(), &settings(&["IF2406", "RB2405"]));

        assert_eq!(pool.len(), 2);
        let codes: Vec<&str> = pool
            .slots()
            .iter()
            .map(|s| s.command.as_ref().unwrap().arguments[0].as_str())
            .collect();
        assert_eq!(codes, ["IF2406", "RB2405"]);
        assert!(pool.slots().iter().all(|s| s.visible));
    }

    #[test]
    fn slot_content_uses_template_color_and_command() {
        let mut host = FakeHost::default();
        let mut pool = SlotPool::new(BarFamily::Future);
        let settings = settings(&["AG2412"]);

        pool.refresh(&mut host, &records(), &settings);

        let slot = &pool.slots()[0];
        assert_eq!(slot.text, "「ag2412」4995.00 📉（-0.50%）");
        assert_eq!(slot.color, settings.fall_color);
        assert!(slot.tooltip.starts_with("「Today」AG2412\n"));
        let command = slot.command.as_ref().unwrap();
        assert_eq!(command.command, "futures-board.changeFutureStatusBarItem");
        assert_eq!(command.arguments, ["AG2412"]);
    }

    #[test]
    fn shrinking_releases_tail_slots_only() {
        let mut host = FakeHost::default();
        let mut pool = SlotPool::new(BarFamily::Future);
        pool.refresh(&mut host, &records(), &settings(&["RB2405", "AG2412", "IF2406"]));
        assert_eq!(pool.len(), 3);

        pool.refresh(&mut host, &records(), &settings(&["RB2405"]));

        assert_eq!(pool.len(), 1);
        assert_eq!(disposed(&host.log), 2);
        let kept = &pool.slots()[0];
        assert_eq!(kept.id, 0);
        assert_eq!(kept.command.as_ref().unwrap().arguments, ["RB2405"]);
        assert!(host.log.borrow().contains(&Event::Hidden(2)));
        assert!(host.log.borrow().contains(&Event::Disposed(1)));
    }

    #[test]
    fn growing_appends_new_slots() {
        let mut host = FakeHost::default();
        let mut pool = SlotPool::new(BarFamily::Future);
        pool.refresh(&mut host, &records(), &settings(&["RB2405"]));
        pool.refresh(&mut host, &records(), &settings(&["RB2405", "AG2412"]));

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.slots()[0].id, 0);
        assert_eq!(pool.slots()[1].id, 1);
        assert_eq!(disposed(&host.log), 0);
    }

    #[test]
    fn unbound_slots_are_left_untouched() {
        let mut host = FakeHost::default();
        let mut pool = SlotPool::new(BarFamily::Future);
        pool.refresh(&mut host, &records(), &settings(&["RB2405", "ZZ9999"]));

        assert_eq!(pool.len(), 2);
        assert!(pool.slots()[1].text.is_empty());
        assert!(!pool.slots()[1].visible);
    }

    #[test]
    fn repeated_pin_binds_only_the_first_slot() {
        let mut host = FakeHost::default();
        let mut pool = SlotPool::new(BarFamily::Future);
        pool.refresh(&mut host, &records(), &settings(&["AG2412", "RB2405", "AG2412"]));

        assert_eq!(pool.len(), 3);
        assert_eq!(pool.slots()[0].command.as_ref().unwrap().arguments, ["AG2412"]);
        assert_eq!(pool.slots()[1].command.as_ref().unwrap().arguments, ["RB2405"]);
        assert!(pool.slots()[2].command.is_none());
        assert!(!pool.slots()[2].visible);
    }

    #[test]
    fn empty_pin_list_shows_first_record() {
        let mut host = FakeHost::default();
        let mut pool = SlotPool::new(BarFamily::Future);
        pool.refresh(&mut host, &records(), &settings(&[]));

        assert_eq!(pool.len(), 1);
        assert_eq!(pool.slots()[0].command.as_ref().unwrap().arguments, ["RB2405"]);
    }

    #[test]
    fn stock_family_prefers_composite_index() {
        let mut host = FakeHost::default();
        let mut pool = SlotPool::new(BarFamily::Stock);
        let mut list = records();
        list.push(future("sh000001", "3000.00", "+0.10"));

        pool.refresh(&mut host, &list, &Settings::default());

        let command = pool.slots()[0].command.as_ref().unwrap();
        assert_eq!(command.arguments, ["sh000001"]);
        assert_eq!(command.command, "futures-board.changeStatusBarItem");
    }

    #[test]
    fn hidden_or_empty_tears_down_and_rebuilds() {
        let mut host = FakeHost::default();
        let mut pool = SlotPool::new(BarFamily::Future);
        let pinned = settings(&["RB2405", "AG2412"]);
        pool.refresh(&mut host, &records(), &pinned);

        let hidden = Settings {
            hide_status_bar_future: true,
            ..pinned.clone()
        };
        pool.refresh(&mut host, &records(), &hidden);
        pool.refresh(&mut host, &records(), &hidden);
        assert!(pool.is_empty());
        assert_eq!(disposed(&host.log), 2);

        pool.refresh(&mut host, &records(), &pinned);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.slots()[0].id, 2);

        pool.refresh(&mut host, &[], &pinned);
        assert!(pool.is_empty());
        assert_eq!(disposed(&host.log), 4);
    }

    #[test]
    fn global_hide_flag_applies_to_every_family() {
        let mut host = FakeHost::default();
        let mut pool = SlotPool::new(BarFamily::Stock);
        let settings = Settings {
            hide_status_bar: true,
            ..Settings::default()
        };
        pool.refresh(&mut host, &records(), &settings);
        assert!(pool.is_empty());
        assert!(host.log.borrow().is_empty());
        assert_eq!(pool.family(), BarFamily::Stock);
    }
}
