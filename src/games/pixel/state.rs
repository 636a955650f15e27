/// Pixel Clicker game state definitions.
use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::catalog::{self, Feature, ItemEffect, Scope, ShopItem};
use super::mines::MineSchedule;
use super::throttle::ClickThrottle;

/// Most profiles a player can keep.
pub const MAX_PROFILES: usize = 5;

/// Message log length.
const LOG_CAPACITY: usize = 50;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Game,
    Shop,
    Menu,
    Profiles,
    Customize,
}

/// Pixel colour schemes, stored per profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Classic,
    Mono,
    Neon,
    Gold,
}

impl Theme {
    pub fn all() -> &'static [Theme] {
        &[Theme::Classic, Theme::Mono, Theme::Neon, Theme::Gold]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Classic => "Classic",
            Theme::Mono => "Mono",
            Theme::Neon => "Neon",
            Theme::Gold => "Gold",
        }
    }

    /// Key used in save files.
    pub fn key(&self) -> &'static str {
        match self {
            Theme::Classic => "classic",
            Theme::Mono => "mono",
            Theme::Neon => "neon",
            Theme::Gold => "gold",
        }
    }

    pub fn from_key(key: &str) -> Option<Theme> {
        Theme::all().iter().copied().find(|t| t.key() == key)
    }

    /// Items that must be owned (besides the Palette) to pick this theme.
    pub fn requires(&self) -> &'static [&'static str] {
        match self {
            Theme::Classic | Theme::Mono => &[],
            Theme::Neon => &["dummy-6"],
            Theme::Gold => &["dummy-7"],
        }
    }
}

/// One save slot.
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: u32,
    pub name: String,
    pub cash: u64,
    /// Profile-scoped purchases in purchase order.
    pub purchased: Vec<&'static str>,
    pub theme: Theme,
    pub total_clicks: u64,
    pub lifetime_cash: u64,
    /// Runtime only; rebuilt on load.
    pub mine: MineSchedule,
}

impl Profile {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            name: format!("Profile {id}"),
            cash: 0,
            purchased: Vec::new(),
            theme: Theme::Classic,
            total_clicks: 0,
            lifetime_cash: 0,
            mine: MineSchedule::default(),
        }
    }

    pub fn owns(&self, id: &str) -> bool {
        self.purchased.iter().any(|p| *p == id)
    }

    /// Items this profile can use: its own purchases plus the global set.
    pub fn owned_items<'a>(
        &'a self,
        global: &'a BTreeSet<&'static str>,
    ) -> impl Iterator<Item = &'static ShopItem> + 'a {
        catalog::CATALOG.iter().filter(move |item| match item.scope {
            Scope::Profile => self.owns(item.id),
            Scope::Global => global.contains(item.id),
        })
    }

    /// Credit cash earned by clicking or mining.
    pub fn earn(&mut self, amount: u64) {
        self.cash = self.cash.saturating_add(amount);
        self.lifetime_cash = self.lifetime_cash.saturating_add(amount);
    }
}

/// Log entry for the message panel.
#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// Full state of a Pixel Clicker session.
pub struct PixelState {
    pub profiles: Vec<Profile>,
    /// Index into `profiles`.
    pub active: usize,
    /// Global-scope purchases plus the shop feature, shared by all profiles.
    pub global_unlocks: BTreeSet<&'static str>,
    pub view: View,
    /// Highlighted row in the shop list.
    pub shop_cursor: usize,
    pub log: Vec<LogEntry>,
    /// Ticks of visual feedback remaining.
    pub click_flash: u32,
    pub purchase_flash: u32,
    pub throttle_flash: u32,
    pub throttle: ClickThrottle,
    /// Coin flips for the mines.
    pub rng: StdRng,
}

impl PixelState {
    pub fn new(seed: u64) -> Self {
        Self {
            profiles: vec![Profile::new(1)],
            active: 0,
            global_unlocks: BTreeSet::new(),
            view: View::Game,
            shop_cursor: 0,
            log: vec![LogEntry {
                text: "Click the pixel.".into(),
                is_important: true,
            }],
            click_flash: 0,
            purchase_flash: 0,
            throttle_flash: 0,
            throttle: ClickThrottle::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profiles[self.active]
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profiles[self.active]
    }

    pub fn shop_unlocked(&self) -> bool {
        self.global_unlocks.contains(catalog::SHOP_FEATURE_ID)
    }

    /// Whether the active profile can use a gated feature.
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.profile()
            .owned_items(&self.global_unlocks)
            .any(|item| item.effect == ItemEffect::Feature(feature))
    }

    /// Smallest id not used by any profile.
    pub fn next_profile_id(&self) -> u32 {
        (1..)
            .find(|id| self.profiles.iter().all(|p| p.id != *id))
            .unwrap_or(1)
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > LOG_CAPACITY {
            self.log.remove(0);
        }
    }
}
