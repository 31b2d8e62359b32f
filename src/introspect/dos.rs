//! Store-metadata heuristics for spotting DOS-era titles before any file
//! exists on disk, so the library layer can pre-route them to DOSBox.

/// Genre keywords that indicate a DOS-era title.
pub const DOS_GENRE_KEYWORDS: &[&str] = &[
    "DOS",
    "MS-DOS",
    "Retro",
    "Classic",
    "Vintage",
    "Point and Click",
    "Adventure",
    "Text Adventure",
    "Interactive Fiction",
];

/// Well-known DOS-era titles, matched as case-insensitive substrings.
pub const KNOWN_DOS_TITLES: &[&str] = &[
    "Battle Chess",
    "Monkey Island",
    "Day of the Tentacle",
    "Sam & Max",
    "Maniac Mansion",
    "King's Quest",
    "Space Quest",
    "Police Quest",
    "Leisure Suit Larry",
    "Doom",
    "Doom II",
    "Heretic",
    "Hexen",
    "Wolfenstein 3D",
    "Commander Keen",
    "Duke Nukem",
    "Lemmings",
    "Civilization",
    "SimCity",
    "Dune",
    "Dune II",
    "StarCraft",
    "Warcraft",
    "Diablo",
    "Baldur's Gate",
    "Planescape Torment",
    "Icewind Dale",
    "Fallout",
    "Fallout 2",
    "The Elder Scrolls",
    "Daggerfall",
    "Morrowind",
    "Quake",
    "Half-Life",
    "System Shock",
    "Ultima",
    "Wizardry",
    "Might and Magic",
    "Eye of the Beholder",
    "Dungeon Master",
    "Wizards & Warriors",
    "Prince of Persia",
    "Another World",
    "Flashback",
    "Ghouls 'n Ghosts",
    "Castlevania",
    "Mega Man",
    "Sonic",
    "Pac-Man",
    "Tetris",
    "Arkanoid",
    "Breakout",
    "Asteroids",
    "Centipede",
    "Galaga",
    "Defender",
    "Robotron",
    "Joust",
    "Dig Dug",
    "Donkey Kong",
    "Mario",
    "Kirby",
    "Metroid",
    "Contra",
    "Gradius",
    "R-Type",
    "Shmup",
    "Shoot 'em up",
];

/// Decide from store metadata whether a title is likely a DOS game.
///
/// True when a genre names DOS outright, a genre carries a retro keyword,
/// the title matches a known DOS-era game, or the release predates 1995
/// and the genres include Adventure/RPG/Strategy. Advisory only; header
/// classification of the installed binary remains authoritative.
pub fn is_dos_game_by_metadata(title: &str, genres: &[String], release_year: Option<i32>) -> bool {
    if genres.iter().any(|g| contains_ignore_case(g, "DOS")) {
        return true;
    }

    for keyword in DOS_GENRE_KEYWORDS {
        if genres.iter().any(|g| contains_ignore_case(g, keyword)) {
            return true;
        }
    }

    let title_lower = title.to_lowercase();
    for known in KNOWN_DOS_TITLES {
        if title_lower.contains(&known.to_lowercase()) {
            return true;
        }
    }

    // Pre-1995 alone is too weak, require a matching genre as well
    if let Some(year) = release_year {
        if year > 0 && year < 1995 {
            return genres.iter().any(|g| {
                contains_ignore_case(g, "Adventure")
                    || contains_ignore_case(g, "RPG")
                    || contains_ignore_case(g, "Strategy")
            });
        }
    }

    false
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genres(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn explicit_dos_genre() {
        assert!(is_dos_game_by_metadata(
            "Some Obscure Title",
            &genres(&["MS-DOS", "Action"]),
            None
        ));
    }

    #[test]
    fn retro_keyword_in_genre() {
        assert!(is_dos_game_by_metadata(
            "Some Obscure Title",
            &genres(&["Classic Shooter"]),
            None
        ));
    }

    #[test]
    fn known_title_substring() {
        assert!(is_dos_game_by_metadata(
            "The Secret of Monkey Island: Special Edition",
            &[],
            None
        ));
        assert!(is_dos_game_by_metadata("DOOM + DOOM II", &[], None));
    }

    #[test]
    fn early_release_needs_genre_support() {
        assert!(is_dos_game_by_metadata(
            "Obscure Dungeon Crawl",
            &genres(&["RPG"]),
            Some(1992)
        ));
        assert!(!is_dos_game_by_metadata(
            "Obscure Dungeon Crawl",
            &genres(&["Racing"]),
            Some(1992)
        ));
        assert!(!is_dos_game_by_metadata("Obscure Dungeon Crawl", &[], Some(1992)));
    }

    #[test]
    fn modern_title_is_not_dos() {
        assert!(!is_dos_game_by_metadata(
            "Cyber Racer 2077",
            &genres(&["Racing", "Open World"]),
            Some(2023)
        ));
    }
}
