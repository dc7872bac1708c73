/*!
 * Game profiles and language definitions.
 *
 * Paradox-style games differ in where localisation files live, which text
 * encoding the engine accepts, and how the translation prompt should frame
 * the game's tone. This module centralizes those per-game and per-language
 * facts as static tables.
 */

use anyhow::{anyhow, Result};

/// A language the localisation format knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageSpec {
    /// Short code used in config and job ids (e.g. "zh-CN")
    pub code: &'static str,
    /// Localisation header key (e.g. "l_simp_chinese")
    pub loc_key: &'static str,
    /// English display name used in prompts
    pub display_name: &'static str,
    /// Folder / filename segment (e.g. "simp_chinese")
    pub folder_name: &'static str,
}

/// All languages the pipeline can read or write
pub const LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec { code: "en", loc_key: "l_english", display_name: "English", folder_name: "english" },
    LanguageSpec { code: "fr", loc_key: "l_french", display_name: "French", folder_name: "french" },
    LanguageSpec { code: "de", loc_key: "l_german", display_name: "German", folder_name: "german" },
    LanguageSpec { code: "es", loc_key: "l_spanish", display_name: "Spanish", folder_name: "spanish" },
    LanguageSpec { code: "pl", loc_key: "l_polish", display_name: "Polish", folder_name: "polish" },
    LanguageSpec { code: "ru", loc_key: "l_russian", display_name: "Russian", folder_name: "russian" },
    LanguageSpec { code: "zh-CN", loc_key: "l_simp_chinese", display_name: "Simplified Chinese", folder_name: "simp_chinese" },
    LanguageSpec { code: "ja", loc_key: "l_japanese", display_name: "Japanese", folder_name: "japanese" },
    LanguageSpec { code: "ko", loc_key: "l_korean", display_name: "Korean", folder_name: "korean" },
    LanguageSpec { code: "pt-BR", loc_key: "l_braz_por", display_name: "Brazilian Portuguese", folder_name: "braz_por" },
    LanguageSpec { code: "tr", loc_key: "l_turkish", display_name: "Turkish", folder_name: "turkish" },
];

/// Look up a language by its short code (case-insensitive)
pub fn language_by_code(code: &str) -> Result<&'static LanguageSpec> {
    LANGUAGES
        .iter()
        .find(|l| l.code.eq_ignore_ascii_case(code))
        .ok_or_else(|| anyhow!("Unsupported language code: {}", code))
}

/// Look up a language by its localisation key (e.g. "l_english")
pub fn language_by_loc_key(loc_key: &str) -> Option<&'static LanguageSpec> {
    LANGUAGES.iter().find(|l| l.loc_key == loc_key)
}

/// Text encoding a game engine accepts for localisation files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocEncoding {
    /// UTF-8 with byte order mark (modern titles)
    Utf8Bom,
    /// Windows-1252 codepage (legacy titles)
    Windows1252,
}

/// Per-game facts the pipeline needs
#[derive(Debug, Clone, Copy)]
pub struct GameProfile {
    /// Profile identifier used in config (e.g. "stellaris")
    pub id: &'static str,
    /// Human-readable game name
    pub display_name: &'static str,
    /// Name of the localisation folder inside a mod
    pub loc_folder: &'static str,
    /// Encoding for both reading and writing localisation files
    pub encoding: LocEncoding,
    /// Whether characters outside the codepage must be flattened to ASCII
    pub strip_diacritics: bool,
    /// Prompt preamble with {source} and {target} placeholders
    prompt_template: &'static str,
}

impl GameProfile {
    /// Get the profile for a given game id
    pub fn for_id(id: &str) -> Result<&'static GameProfile> {
        GAME_PROFILES
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| anyhow!("Unknown game profile: {}", id))
    }

    /// Render the prompt preamble for a language pair
    pub fn render_prompt(&self, source_name: &str, target_name: &str) -> String {
        self.prompt_template
            .replace("{source}", source_name)
            .replace("{target}", target_name)
    }
}

/// Supported game profiles
pub const GAME_PROFILES: &[GameProfile] = &[
    GameProfile {
        id: "stellaris",
        display_name: "Stellaris",
        loc_folder: "localisation",
        encoding: LocEncoding::Utf8Bom,
        strip_diacritics: false,
        prompt_template: "You are a professional game localiser translating a Stellaris mod \
from {source} to {target}. Keep the science-fiction register. Never translate scripting \
constructs: anything in [brackets], $variables$, £icons£ or color codes like §Y...§! must be \
copied verbatim.",
    },
    GameProfile {
        id: "ck3",
        display_name: "Crusader Kings III",
        loc_folder: "localization",
        encoding: LocEncoding::Utf8Bom,
        strip_diacritics: false,
        prompt_template: "You are a professional game localiser translating a Crusader Kings III \
mod from {source} to {target}. Keep the medieval register. Never translate scripting \
constructs: anything in [brackets], $variables$, #formatting#! tags or @icons! must be copied \
verbatim.",
    },
    GameProfile {
        id: "hoi4",
        display_name: "Hearts of Iron IV",
        loc_folder: "localisation",
        encoding: LocEncoding::Utf8Bom,
        strip_diacritics: false,
        prompt_template: "You are a professional game localiser translating a Hearts of Iron IV \
mod from {source} to {target}. Keep the 20th-century military register. Never translate \
scripting constructs: anything in [brackets], $variables$ or color codes like §Y...§! must be \
copied verbatim.",
    },
    GameProfile {
        id: "eu4",
        display_name: "Europa Universalis IV",
        loc_folder: "localisation",
        encoding: LocEncoding::Windows1252,
        strip_diacritics: true,
        prompt_template: "You are a professional game localiser translating a Europa \
Universalis IV mod from {source} to {target}. Keep the early-modern register. Never translate \
scripting constructs: anything in [brackets], $variables$ or §Y...§! color codes must be \
copied verbatim. The game only renders the Windows-1252 character set, so avoid characters \
outside it.",
    },
];

/// CJK-style punctuation that must be flattened to ASCII, per source language.
///
/// The engine fonts for most target languages only carry ASCII punctuation,
/// and models frequently echo the source language's punctuation into the
/// translation.
pub fn punctuation_map(source_code: &str) -> Option<&'static [(char, &'static str)]> {
    const ZH: &[(char, &str)] = &[
        ('，', ","), ('。', "."), ('！', "!"), ('？', "?"), ('：', ":"),
        ('；', ";"), ('（', "("), ('）', ")"), ('、', ","), ('“', "\""),
        ('”', "\""), ('‘', "'"), ('’', "'"), ('…', "..."),
    ];
    const JA: &[(char, &str)] = &[
        ('、', ","), ('。', "."), ('！', "!"), ('？', "?"), ('：', ":"),
        ('（', "("), ('）', ")"), ('「', "\""), ('」', "\""), ('『', "\""),
        ('』', "\""), ('・', " "),
    ];
    const KO: &[(char, &str)] = &[
        ('！', "!"), ('？', "?"), ('：', ":"), ('（', "("), ('）', ")"),
        ('“', "\""), ('”', "\""),
    ];
    const RU: &[(char, &str)] = &[('«', "\""), ('»', "\""), ('—', "-")];
    const FR: &[(char, &str)] = &[
        ('«', "\""), ('»', "\""), ('\u{00a0}', " "), ('\u{202f}', " "),
    ];
    const ES: &[(char, &str)] = &[('¿', ""), ('¡', "")];
    const TR: &[(char, &str)] = &[('“', "\""), ('”', "\"")];
    const DE: &[(char, &str)] = &[('„', "\""), ('“', "\""), ('‚', "'"), ('‘', "'")];
    const PL: &[(char, &str)] = &[('„', "\""), ('”', "\""), ('—', "-")];
    const PT: &[(char, &str)] = &[('«', "\""), ('»', "\"")];

    match source_code {
        "zh-CN" => Some(ZH),
        "ja" => Some(JA),
        "ko" => Some(KO),
        "ru" => Some(RU),
        "fr" => Some(FR),
        "es" => Some(ES),
        "tr" => Some(TR),
        "de" => Some(DE),
        "pl" => Some(PL),
        "pt-BR" => Some(PT),
        _ => None,
    }
}

/// Polish diacritics to their ASCII bases, for codepages that lack them
pub const PL_DIACRITICS: &[(char, char)] = &[
    ('ą', 'a'), ('ć', 'c'), ('ę', 'e'), ('ł', 'l'), ('ń', 'n'),
    ('ó', 'o'), ('ś', 's'), ('ż', 'z'), ('ź', 'z'),
    ('Ą', 'A'), ('Ć', 'C'), ('Ę', 'E'), ('Ł', 'L'), ('Ń', 'N'),
    ('Ó', 'O'), ('Ś', 'S'), ('Ż', 'Z'), ('Ź', 'Z'),
];
