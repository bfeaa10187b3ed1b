use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    German,
    French,
    Russian,
}

/// Reference statistics for one target language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageProfile {
    pub language: Language,
    pub default_alphabet: &'static str,
    /// Relative letter frequencies in percent.
    pub frequencies: &'static [(char, f64)],
    pub expected_ic: f64,
    pub common_words: &'static [&'static str],
    pub illegal_pairs: &'static [&'static str],
}

impl Language {
    pub fn profile(self) -> &'static LanguageProfile {
        match self {
            Language::English => &ENGLISH,
            Language::German => &GERMAN,
            Language::French => &FRENCH,
            Language::Russian => &RUSSIAN,
        }
    }
}

pub const LATIN: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const CYRILLIC: &str = "АБВГДЕЁЖЗИЙКЛМНОПРСТУФХЦЧШЩЪЫЬЭЮЯ";

static ENGLISH: LanguageProfile = LanguageProfile {
    language: Language::English,
    default_alphabet: LATIN,
    frequencies: &[
        ('A', 8.167),
        ('B', 1.492),
        ('C', 2.782),
        ('D', 4.253),
        ('E', 12.702),
        ('F', 2.228),
        ('G', 2.015),
        ('H', 6.094),
        ('I', 6.966),
        ('J', 0.153),
        ('K', 0.772),
        ('L', 4.025),
        ('M', 2.406),
        ('N', 6.749),
        ('O', 7.507),
        ('P', 1.929),
        ('Q', 0.095),
        ('R', 5.987),
        ('S', 6.327),
        ('T', 9.056),
        ('U', 2.758),
        ('V', 0.978),
        ('W', 2.360),
        ('X', 0.150),
        ('Y', 1.974),
        ('Z', 0.074),
    ],
    expected_ic: 0.0667,
    common_words: &[
        "THE", "AND", "THAT", "HAVE", "WITH", "THIS", "FROM", "THEY", "FOR", "NOT", "YOU",
        "BUT", "HIS", "HER", "SHE", "WAS", "ARE", "WERE", "WILL", "WOULD", "THERE", "THEIR",
        "WHAT", "ABOUT", "WHICH", "WHEN", "ONE", "ALL", "BEEN", "HAS", "HAD", "CAN", "OUT",
        "OTHER", "INTO", "MORE", "SOME", "TIME", "ATTACK", "DAWN",
    ],
    illegal_pairs: &["QJ", "ZQ", "ZX", "JQ", "QZ"],
};

static GERMAN: LanguageProfile = LanguageProfile {
    language: Language::German,
    default_alphabet: LATIN,
    frequencies: &[
        ('A', 6.516),
        ('B', 1.886),
        ('C', 2.732),
        ('D', 5.076),
        ('E', 16.396),
        ('F', 1.656),
        ('G', 3.009),
        ('H', 4.577),
        ('I', 6.550),
        ('J', 0.268),
        ('K', 1.417),
        ('L', 3.437),
        ('M', 2.534),
        ('N', 9.776),
        ('O', 2.594),
        ('P', 0.670),
        ('Q', 0.018),
        ('R', 7.003),
        ('S', 7.270),
        ('T', 6.154),
        ('U', 4.166),
        ('V', 0.846),
        ('W', 1.921),
        ('X', 0.034),
        ('Y', 0.039),
        ('Z', 1.134),
        ('Ä', 0.578),
        ('Ö', 0.443),
        ('Ü', 0.995),
    ],
    expected_ic: 0.0762,
    common_words: &[
        "DER", "DIE", "UND", "DAS", "IST", "NICHT", "MIT", "SICH", "DES", "EIN", "EINE", "AUF",
        "DEN", "VON", "DEM", "ZU", "FUR", "AUCH", "WIR", "ICH", "SIE", "WIE", "ABER", "NACH",
    ],
    illegal_pairs: &["QX", "XQ", "JQ", "QJ", "YQ"],
};

static FRENCH: LanguageProfile = LanguageProfile {
    language: Language::French,
    default_alphabet: LATIN,
    frequencies: &[
        ('A', 7.636),
        ('B', 0.901),
        ('C', 3.260),
        ('D', 3.669),
        ('E', 14.715),
        ('F', 1.066),
        ('G', 0.866),
        ('H', 0.737),
        ('I', 7.529),
        ('J', 0.613),
        ('K', 0.074),
        ('L', 5.456),
        ('M', 2.968),
        ('N', 7.095),
        ('O', 5.796),
        ('P', 3.021),
        ('Q', 1.362),
        ('R', 6.693),
        ('S', 7.948),
        ('T', 7.244),
        ('U', 6.311),
        ('V', 1.838),
        ('W', 0.049),
        ('X', 0.427),
        ('Y', 0.128),
        ('Z', 0.326),
    ],
    expected_ic: 0.0778,
    common_words: &[
        "LES", "DES", "UNE", "EST", "QUE", "QUI", "DANS", "POUR", "PAS", "SUR", "AVEC", "PLUS",
        "SONT", "MAIS", "NOUS", "VOUS", "CETTE", "COMME", "TOUT", "ELLE", "LEUR", "FAIT",
    ],
    illegal_pairs: &["QX", "XQ", "KQ", "QK", "WX"],
};

static RUSSIAN: LanguageProfile = LanguageProfile {
    language: Language::Russian,
    default_alphabet: CYRILLIC,
    frequencies: &[
        ('О', 10.97),
        ('Е', 8.45),
        ('А', 8.01),
        ('И', 7.35),
        ('Н', 6.70),
        ('Т', 6.26),
        ('С', 5.47),
        ('Р', 4.73),
        ('В', 4.54),
        ('Л', 4.40),
        ('К', 3.49),
        ('М', 3.21),
        ('Д', 2.98),
        ('П', 2.81),
        ('У', 2.62),
        ('Я', 2.01),
        ('Ы', 1.90),
        ('Ь', 1.74),
        ('Г', 1.70),
        ('З', 1.65),
        ('Б', 1.59),
        ('Ч', 1.44),
        ('Й', 1.21),
        ('Х', 0.97),
        ('Ж', 0.94),
        ('Ш', 0.73),
        ('Ю', 0.64),
        ('Ц', 0.48),
        ('Щ', 0.36),
        ('Э', 0.32),
        ('Ф', 0.26),
        ('Ъ', 0.04),
        ('Ё', 0.04),
    ],
    expected_ic: 0.0553,
    common_words: &[
        "ЧТО", "ЭТО", "КАК", "ОНА", "ОНИ", "ВСЕ", "ТАК", "ЕГО", "БЫЛ", "ДЛЯ", "ИЛИ", "ЕСЛИ",
        "ЕЩЕ", "УЖЕ", "БЫЛО", "КОГДА", "ТОЛЬКО", "ОЧЕНЬ",
    ],
    illegal_pairs: &["ЪЪ", "ЬЬ", "ЪЬ", "ЬЪ", "ЙЙ", "ЫЫ"],
};
