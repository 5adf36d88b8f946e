// File: raidbot-core/src/services/raid/display.rs

use raidbot_common::models::{DisplayOptions, RaidMetadata, RaidText};

/// Builds the name/game artifact text from resolved metadata.
///
/// | show_game | separate_game | name                   | game     |
/// |-----------|---------------|------------------------|----------|
/// | false     | *             | `Name`                 | empty    |
/// | true      | false         | `Name playing <game>`  | empty    |
/// | true      | true          | `Name`                 | `<game>` |
///
/// An offline raider has no game, so the suffix and game text are left out.
pub fn compose_text(metadata: &RaidMetadata, options: DisplayOptions) -> RaidText {
    let mut text = RaidText {
        name: metadata.display_name.clone(),
        game: String::new(),
    };

    if !options.show_game {
        return text;
    }
    let Some(game) = metadata.game_name.as_deref() else {
        return text;
    };

    if options.separate_game {
        text.game = game.to_string();
    } else {
        text.name = format!("{} playing {}", text.name, game);
    }
    text
}
