/// Pixel Clicker pure game logic (no rendering / IO).
use tracing::{debug, info};

use super::catalog::{self, Feature, ItemEffect, Scope, ShopItem, SHOP_FEATURE_COST, SHOP_FEATURE_ID};
use super::state::{PixelState, Profile, Theme, View, MAX_PROFILES};
use crate::config::GameConfig;
use crate::error::{ProfileError, PurchaseError};

/// Ticks the pixel stays lit after an accepted click.
pub const CLICK_FLASH_TICKS: u32 = 2;
/// Ticks the shop card flashes after a purchase.
pub const PURCHASE_FLASH_TICKS: u32 = 5;
/// Ticks the "too fast" banner stays up after a rejected click.
pub const THROTTLE_FLASH_TICKS: u32 = 5;

// ── Entitlement ────────────────────────────────────────────────

/// Profile items are owned by the active profile; global items by everyone.
pub fn is_owned(state: &PixelState, item: &ShopItem) -> bool {
    match item.scope {
        Scope::Profile => state.profile().owns(item.id),
        Scope::Global => state.global_unlocks.contains(item.id),
    }
}

/// Whether `id` counts as held, in either scope.
fn holds(state: &PixelState, id: &str) -> bool {
    state.global_unlocks.contains(id) || state.profile().owns(id)
}

/// First prerequisite of `item` that is not yet held.
pub fn missing_prerequisite(state: &PixelState, item: &ShopItem) -> Option<&'static str> {
    item.requires.iter().copied().find(|req| !holds(state, req))
}

pub fn is_unlocked(state: &PixelState, item: &ShopItem) -> bool {
    missing_prerequisite(state, item).is_none()
}

/// Shop cards to show, in catalog order, with their catalog index.
pub fn visible_items(state: &PixelState) -> Vec<(usize, &'static ShopItem)> {
    if !state.shop_unlocked() {
        return Vec::new();
    }
    catalog::CATALOG
        .iter()
        .enumerate()
        .filter(|(_, item)| is_unlocked(state, item) || is_owned(state, item))
        .collect()
}

/// The shop button appears once the shop is affordable and never goes away.
pub fn can_see_shop_button(state: &PixelState) -> bool {
    state.shop_unlocked() || state.profile().cash >= SHOP_FEATURE_COST
}

pub fn has_feature(state: &PixelState, feature: Feature) -> bool {
    state.has_feature(feature)
}

// ── Purchases ──────────────────────────────────────────────────

/// Buy the shop feature itself. The view stays on the game screen.
pub fn unlock_shop(state: &mut PixelState) -> Result<(), PurchaseError> {
    if state.shop_unlocked() {
        return Err(PurchaseError::AlreadyOwned("Shop"));
    }
    let cash = state.profile().cash;
    if cash < SHOP_FEATURE_COST {
        return Err(PurchaseError::InsufficientCash {
            cost: SHOP_FEATURE_COST,
            cash,
        });
    }
    state.profile_mut().cash -= SHOP_FEATURE_COST;
    state.global_unlocks.insert(SHOP_FEATURE_ID);
    state.purchase_flash = PURCHASE_FLASH_TICKS;
    state.add_log("Shop unlocked!", true);
    info!("shop unlocked");
    Ok(())
}

pub fn buy_item(state: &mut PixelState, id: &str) -> Result<(), PurchaseError> {
    if !state.shop_unlocked() {
        return Err(PurchaseError::ShopLocked);
    }
    let item = catalog::item_by_id(id).ok_or_else(|| PurchaseError::UnknownItem(id.to_string()))?;
    if is_owned(state, item) {
        return Err(PurchaseError::AlreadyOwned(item.name));
    }
    if let Some(req) = missing_prerequisite(state, item) {
        let missing = catalog::item_by_id(req).map_or(req, |r| r.name);
        return Err(PurchaseError::Locked {
            item: item.name,
            missing,
        });
    }
    let cash = state.profile().cash;
    if cash < item.cost {
        return Err(PurchaseError::InsufficientCash {
            cost: item.cost,
            cash,
        });
    }

    state.profile_mut().cash -= item.cost;
    match item.scope {
        Scope::Profile => state.profile_mut().purchased.push(item.id),
        Scope::Global => {
            state.global_unlocks.insert(item.id);
        }
    }
    state.purchase_flash = PURCHASE_FLASH_TICKS;
    state.add_log(&format!("Bought {}.", item.name), true);
    info!(item = item.id, cost = item.cost, "purchased");
    Ok(())
}

// ── Clicking ───────────────────────────────────────────────────

/// Clicks per sliding second for the active profile.
pub fn click_rate_cap(state: &PixelState, config: &GameConfig) -> u32 {
    state
        .profile()
        .owned_items(&state.global_unlocks)
        .filter_map(|item| match item.effect {
            ItemEffect::ClickCap(bonus) => Some(bonus),
            _ => None,
        })
        .fold(config.base_click_cap, u32::saturating_add)
}

/// Earn one cash unless the throttle rejects the click.
pub fn click(state: &mut PixelState, config: &GameConfig, now_ms: f64) -> bool {
    let cap = click_rate_cap(state, config);
    if !state.throttle.try_accept(now_ms, cap) {
        if state.throttle_flash == 0 {
            debug!(cap, "click throttled");
        }
        state.throttle_flash = THROTTLE_FLASH_TICKS;
        return false;
    }
    let profile = state.profile_mut();
    profile.earn(1);
    profile.total_clicks += 1;
    state.click_flash = CLICK_FLASH_TICKS;
    true
}

/// Count down visual timers.
pub fn tick_flashes(state: &mut PixelState, ticks: u32) {
    state.click_flash = state.click_flash.saturating_sub(ticks);
    state.purchase_flash = state.purchase_flash.saturating_sub(ticks);
    state.throttle_flash = state.throttle_flash.saturating_sub(ticks);
}

// ── Navigation ─────────────────────────────────────────────────

/// The shop toggle button: buys the shop first, then flips Game ↔ Shop.
pub fn toggle_shop(state: &mut PixelState) -> Result<(), PurchaseError> {
    if !state.shop_unlocked() {
        return unlock_shop(state);
    }
    state.view = match state.view {
        View::Shop => View::Game,
        _ => View::Shop,
    };
    Ok(())
}

/// Open the menu if owned. Returns whether the view changed.
pub fn open_menu(state: &mut PixelState) -> bool {
    if !state.has_feature(Feature::Menu) || state.view == View::Menu {
        return false;
    }
    state.view = View::Menu;
    true
}

/// Open a menu entry if its feature is owned.
pub fn open_screen(state: &mut PixelState, view: View) -> bool {
    let feature = match view {
        View::Profiles => Feature::Profiles,
        View::Customize => Feature::Customize,
        _ => return false,
    };
    if !state.has_feature(feature) {
        return false;
    }
    state.view = view;
    true
}

/// Esc: sub-screens return to the menu, everything else to the game.
pub fn go_back(state: &mut PixelState) {
    state.view = match state.view {
        View::Profiles | View::Customize => View::Menu,
        _ => View::Game,
    };
}

/// Move the shop highlight, clamped to the visible list.
pub fn move_cursor(state: &mut PixelState, delta: i32) {
    let len = visible_items(state).len();
    if len == 0 {
        state.shop_cursor = 0;
        return;
    }
    let target = state.shop_cursor as i64 + delta as i64;
    state.shop_cursor = target.clamp(0, len as i64 - 1) as usize;
}

/// Buy whatever the shop highlight is on.
pub fn buy_at_cursor(state: &mut PixelState) -> Result<(), PurchaseError> {
    let visible = visible_items(state);
    let Some(&(_, item)) = visible.get(state.shop_cursor) else {
        return Err(PurchaseError::UnknownItem(format!("#{}", state.shop_cursor)));
    };
    buy_item(state, item.id)
}

// ── Profiles ───────────────────────────────────────────────────

/// Add an empty profile and switch to it. Returns its index.
pub fn create_profile(state: &mut PixelState) -> Result<usize, ProfileError> {
    if !state.has_feature(Feature::Profiles) {
        return Err(ProfileError::FeatureLocked);
    }
    if state.profiles.len() >= MAX_PROFILES {
        return Err(ProfileError::LimitReached(MAX_PROFILES));
    }
    let profile = Profile::new(state.next_profile_id());
    let name = profile.name.clone();
    state.profiles.push(profile);
    state.active = state.profiles.len() - 1;
    state.shop_cursor = 0;
    state.add_log(&format!("Created {name}."), true);
    info!(profile = %name, "profile created");
    Ok(state.active)
}

pub fn select_profile(state: &mut PixelState, index: usize) -> Result<(), ProfileError> {
    if index == state.active {
        return Ok(());
    }
    if !state.has_feature(Feature::Profiles) {
        return Err(ProfileError::FeatureLocked);
    }
    if index >= state.profiles.len() {
        return Err(ProfileError::NoSuchProfile(index + 1));
    }
    state.active = index;
    state.shop_cursor = 0;
    let name = state.profile().name.clone();
    state.add_log(&format!("Switched to {name}."), false);
    debug!(profile = %name, "profile selected");
    Ok(())
}

pub fn delete_profile(state: &mut PixelState, index: usize) -> Result<(), ProfileError> {
    if !state.has_feature(Feature::Profiles) {
        return Err(ProfileError::FeatureLocked);
    }
    if index >= state.profiles.len() {
        return Err(ProfileError::NoSuchProfile(index + 1));
    }
    if state.profiles.len() == 1 {
        return Err(ProfileError::LastProfile);
    }
    let removed = state.profiles.remove(index);
    if state.active > index {
        state.active -= 1;
    }
    state.active = state.active.min(state.profiles.len() - 1);
    state.shop_cursor = 0;
    state.add_log(&format!("Deleted {}.", removed.name), true);
    info!(profile = %removed.name, "profile deleted");
    Ok(())
}

// ── Customize ──────────────────────────────────────────────────

pub fn theme_unlocked(state: &PixelState, theme: Theme) -> bool {
    if theme == Theme::Classic {
        return true;
    }
    state.has_feature(Feature::Customize) && theme.requires().iter().all(|id| holds(state, id))
}

pub fn available_themes(state: &PixelState) -> Vec<Theme> {
    Theme::all()
        .iter()
        .copied()
        .filter(|t| theme_unlocked(state, *t))
        .collect()
}

/// Apply a theme to the active profile. Locked themes are refused.
pub fn set_theme(state: &mut PixelState, theme: Theme) -> bool {
    if !theme_unlocked(state, theme) {
        return false;
    }
    if state.profile().theme != theme {
        state.profile_mut().theme = theme;
        state.add_log(&format!("Theme set to {}.", theme.name()), false);
    }
    true
}

// ── Formatting ─────────────────────────────────────────────────

/// 1234567 → "1,234,567"
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
