use serenity::all::{Colour, CreateEmbed};

use crate::services::gateway::{Notice, Tone};

// ============================================================================
// Color Palette
// ============================================================================

/// Success color - Emerald green
pub const SUCCESS_COLOR: Colour = Colour::from_rgb(16, 185, 129);

/// Error color - Rose red
pub const ERROR_COLOR: Colour = Colour::from_rgb(244, 63, 94);

/// Warning color - Amber
pub const WARNING_COLOR: Colour = Colour::from_rgb(245, 158, 11);

/// Info/neutral color - Slate
pub const INFO_COLOR: Colour = Colour::from_rgb(100, 116, 139);

// ============================================================================
// Embed Builders
// ============================================================================

/// Create a success embed
pub fn success_embed() -> CreateEmbed {
    CreateEmbed::new().color(SUCCESS_COLOR)
}

/// Create an error embed
pub fn error_embed() -> CreateEmbed {
    CreateEmbed::new().color(ERROR_COLOR)
}

/// Create a warning embed
pub fn warning_embed() -> CreateEmbed {
    CreateEmbed::new().color(WARNING_COLOR)
}

/// Create an info/neutral embed
pub fn info_embed() -> CreateEmbed {
    CreateEmbed::new().color(INFO_COLOR)
}

/// Render a chat notification
pub fn notice_embed(notice: &Notice) -> CreateEmbed {
    let embed = match notice.tone {
        Tone::Info => info_embed(),
        Tone::Success => success_embed(),
        Tone::Warning => warning_embed(),
        Tone::Error => error_embed(),
    };
    embed.description(notice.text.clone())
}
