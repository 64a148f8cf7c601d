// Two-slot player selection: persisted pair plus default-name resolution.

use tracing::{info, warn};

use crate::model::Element;
use crate::storage::SelectionStorage;

/// Storage key for the persisted pair.
pub const SELECTION_KEY: &str = "fpl.selected.ids";

/// Two independent, optionally-set element ids.
pub type Selection = [Option<u32>; 2];

/// Selection slot index (0 or 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    First,
    Second,
}

impl Slot {
    pub fn index(self) -> usize {
        match self {
            Slot::First => 0,
            Slot::Second => 1,
        }
    }

    pub fn other(self) -> Slot {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }
}

/// Owns the current pair and writes it through to storage on every change.
pub struct SelectionStore {
    storage: Box<dyn SelectionStorage>,
    pair: Selection,
}

impl SelectionStore {
    /// Read the persisted pair. Missing, unreadable, or malformed state
    /// yields an empty selection.
    pub fn load(storage: Box<dyn SelectionStorage>) -> Self {
        let pair = match storage.get(SELECTION_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Selection>(&json) {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("Ignoring malformed persisted selection {json:?}: {e}");
                    [None, None]
                }
            },
            Ok(None) => [None, None],
            Err(e) => {
                warn!("Selection storage unavailable: {e:#}");
                [None, None]
            }
        };
        SelectionStore { storage, pair }
    }

    pub fn pair(&self) -> Selection {
        self.pair
    }

    pub fn get(&self, slot: Slot) -> Option<u32> {
        self.pair[slot.index()]
    }

    /// Set one slot and persist the whole pair immediately.
    pub fn set_slot(&mut self, slot: Slot, element_id: u32) -> anyhow::Result<()> {
        self.pair[slot.index()] = Some(element_id);
        self.persist()
    }

    /// Fill unset slots from `default_names` and persist if anything was
    /// unset beforehand. Returns the resulting pair.
    pub fn apply_defaults(
        &mut self,
        elements: &[Element],
        default_names: &[String],
    ) -> anyhow::Result<Selection> {
        if self.pair.iter().all(Option::is_some) {
            return Ok(self.pair);
        }
        let resolved = resolve_defaults(elements, self.pair, default_names);
        if resolved != self.pair {
            info!("Default selection resolved to {:?}", resolved);
        }
        self.pair = resolved;
        // Written even when nothing matched, so the stored pair always exists
        // after a reference load.
        self.persist()?;
        Ok(self.pair)
    }

    fn persist(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string(&self.pair)?;
        self.storage.set(SELECTION_KEY, &json)
    }
}

/// Fill each unset slot `i` with the first element matching
/// `default_names[i]`. Set slots are never touched.
///
/// An element matches when its full name equals the default name, or its
/// `web_name` equals the default name's second word, both compared
/// case-insensitively.
pub fn resolve_defaults(
    elements: &[Element],
    current: Selection,
    default_names: &[String],
) -> Selection {
    let mut pair = current;
    for (slot, name) in pair.iter_mut().zip(default_names) {
        if slot.is_some() {
            continue;
        }
        let target = name.to_lowercase();
        let short = target.split_whitespace().nth(1);
        let found = elements.iter().find(|el| {
            el.full_name().to_lowercase() == target
                || short.is_some_and(|s| el.web_name.to_lowercase() == s)
        });
        if let Some(el) = found {
            *slot = Some(el.id);
        }
    }
    pair
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
