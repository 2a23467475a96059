//! Shared UI icons.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");

// Box titles
pub static MEMO: Emoji<'_, '_> = Emoji("📝 ", "");
pub static CLIPBOARD: Emoji<'_, '_> = Emoji("📋 ", "");
pub static LOCK: Emoji<'_, '_> = Emoji("🔐 ", "");
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
