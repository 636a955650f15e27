//! The shop catalog: every purchasable item and the unlock graph between them.
//!
//! Prerequisites may only point at items listed earlier in [`CATALOG`], which
//! keeps the graph acyclic without any runtime cycle detection.

/// Cost of the "Unlock Shop" button. Not a catalog item.
pub const SHOP_FEATURE_COST: u64 = 100;

/// Global-unlock id recorded when the shop feature is bought.
pub const SHOP_FEATURE_ID: &str = "shop";

/// Where ownership of an item is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// In the purchasing profile only.
    Profile,
    /// In the global-unlocks set shared by every profile.
    Global,
}

/// Screens and systems gated behind a purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Menu,
    Profiles,
    Customize,
}

/// What owning an item changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ItemEffect {
    /// Cosmetic or purely a stepping stone.
    None,
    Feature(Feature),
    /// Extra clicks per sliding second.
    ClickCap(u32),
    /// One more coin flipped per mine round.
    MineCoin,
    /// Mine cadence in milliseconds; the fastest owned one applies.
    MineInterval(u32),
    /// Multiplies the per-head payout.
    MinePayout(u64),
}

#[derive(Debug)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub blurb: &'static str,
    pub cost: u64,
    pub requires: &'static [&'static str],
    pub scope: Scope,
    pub effect: ItemEffect,
}

const fn cosmetic(id: &'static str, name: &'static str, cost: u64) -> ShopItem {
    ShopItem {
        id,
        name,
        blurb: "Does nothing. Looks great.",
        cost,
        requires: &["shop-choices"],
        scope: Scope::Profile,
        effect: ItemEffect::None,
    }
}

pub static CATALOG: &[ShopItem] = &[
    ShopItem {
        id: "shop-choices",
        name: "Shop Choices",
        blurb: "Stocks the shelves.",
        cost: 100,
        requires: &[],
        scope: Scope::Profile,
        effect: ItemEffect::None,
    },
    cosmetic("dummy-1", "Tiny Billboard", 25),
    cosmetic("dummy-2", "Color Tax", 30),
    cosmetic("dummy-3", "Prestige Smudge", 40),
    cosmetic("dummy-4", "Loot Pixel", 55),
    cosmetic("dummy-5", "Idle Wiggle", 80),
    cosmetic("dummy-6", "Neon Drip", 125),
    cosmetic("dummy-7", "Golden Alias", 180),
    cosmetic("dummy-8", "Pity Multiplier", 260),
    cosmetic("dummy-9", "Whale Magnet", 400),
    cosmetic("dummy-10", "Monetized Blink", 600),
    ShopItem {
        id: "overclock",
        name: "Overclock",
        blurb: "+4 clicks per second allowed.",
        cost: 150,
        requires: &["shop-choices"],
        scope: Scope::Profile,
        effect: ItemEffect::ClickCap(4),
    },
    ShopItem {
        id: "overclock-2",
        name: "Overclock II",
        blurb: "+8 more clicks per second allowed.",
        cost: 450,
        requires: &["overclock"],
        scope: Scope::Profile,
        effect: ItemEffect::ClickCap(8),
    },
    ShopItem {
        id: "menu",
        name: "Menu",
        blurb: "Adds a menu. Shared by every profile.",
        cost: 150,
        requires: &["shop-choices"],
        scope: Scope::Global,
        effect: ItemEffect::Feature(Feature::Menu),
    },
    ShopItem {
        id: "profiles",
        name: "Save Profiles",
        blurb: "Up to five independent saves.",
        cost: 300,
        requires: &["menu"],
        scope: Scope::Global,
        effect: ItemEffect::Feature(Feature::Profiles),
    },
    ShopItem {
        id: "palette",
        name: "Palette",
        blurb: "Recolor the pixel.",
        cost: 200,
        requires: &["menu"],
        scope: Scope::Profile,
        effect: ItemEffect::Feature(Feature::Customize),
    },
    ShopItem {
        id: "cash-mine",
        name: "Cash Mine",
        blurb: "Flips a coin every few seconds. Heads pays.",
        cost: 250,
        requires: &["shop-choices"],
        scope: Scope::Profile,
        effect: ItemEffect::MineCoin,
    },
    ShopItem {
        id: "mine-shaft",
        name: "Mine Shaft",
        blurb: "A second coin per round.",
        cost: 500,
        requires: &["cash-mine"],
        scope: Scope::Profile,
        effect: ItemEffect::MineCoin,
    },
    ShopItem {
        id: "deep-mine",
        name: "Deep Mine",
        blurb: "A third coin per round.",
        cost: 1_200,
        requires: &["mine-shaft"],
        scope: Scope::Profile,
        effect: ItemEffect::MineCoin,
    },
    ShopItem {
        id: "mine-drill",
        name: "Mine Drill",
        blurb: "Rounds every 3 seconds.",
        cost: 400,
        requires: &["cash-mine"],
        scope: Scope::Profile,
        effect: ItemEffect::MineInterval(3_000),
    },
    ShopItem {
        id: "mine-turbo",
        name: "Turbo Drill",
        blurb: "Rounds every 1.5 seconds.",
        cost: 900,
        requires: &["mine-drill"],
        scope: Scope::Profile,
        effect: ItemEffect::MineInterval(1_500),
    },
    ShopItem {
        id: "gilded-coins",
        name: "Gilded Coins",
        blurb: "Heads pay double.",
        cost: 700,
        requires: &["cash-mine"],
        scope: Scope::Profile,
        effect: ItemEffect::MinePayout(2),
    },
    ShopItem {
        id: "mother-lode",
        name: "Mother Lode",
        blurb: "Heads pay triple, on top of gilding.",
        cost: 2_000,
        requires: &["gilded-coins", "deep-mine"],
        scope: Scope::Profile,
        effect: ItemEffect::MinePayout(3),
    },
];

pub fn item_by_id(id: &str) -> Option<&'static ShopItem> {
    CATALOG.iter().find(|item| item.id == id)
}

pub fn index_of(id: &str) -> Option<usize> {
    CATALOG.iter().position(|item| item.id == id)
}

/// Items that list `id` as a prerequisite.
pub fn unlocked_by(id: &str) -> impl Iterator<Item = &'static ShopItem> + '_ {
    CATALOG
        .iter()
        .filter(move |item| item.requires.iter().any(|req| *req == id))
}

/// "Unlocks:" text for a shop card.
pub fn unlock_names(item: &ShopItem) -> String {
    let names: Vec<&str> = unlocked_by(item.id).map(|i| i.name).collect();
    if names.is_empty() {
        "None".to_string()
    } else {
        names.join(", ")
    }
}
