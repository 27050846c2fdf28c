//! ISO 639-1 language codes.
//!
//! Every `LanguageCode` points into a static table, so a code that exists is
//! always resolvable to its English name and its native-script name.
//! Locale strings (BCP-47, e.g. `fr-FR`, `zh-Hant-TW`) reduce to a code through
//! their primary language subtag.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LanguageError {
    #[error("Unknown ISO 639-1 language code: {0:?}")]
    UnknownCode(String),

    #[error("Malformed locale: {0:?}")]
    MalformedLocale(String),
}

#[derive(Debug)]
struct Language {
    code: &'static str,
    name: &'static str,
    native_name: &'static str,
}

/// A validated ISO 639-1 code.
#[derive(Clone, Copy)]
pub struct LanguageCode(&'static Language);

impl LanguageCode {
    /// Look up a two-letter code (case-insensitive).
    pub fn parse(code: &str) -> Result<Self, LanguageError> {
        let trimmed = code.trim();
        LANGUAGES
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(trimmed))
            .map(LanguageCode)
            .ok_or_else(|| LanguageError::UnknownCode(code.to_string()))
    }

    /// Resolve a BCP-47 locale (`fr-FR`, `en_US`, `pt`) to its primary language.
    pub fn from_locale(locale: &str) -> Result<Self, LanguageError> {
        let subtag = primary_subtag(locale)
            .ok_or_else(|| LanguageError::MalformedLocale(locale.to_string()))?;
        Self::parse(&subtag)
    }

    /// Resolve a code as reported by a translation provider.
    ///
    /// Providers return region-qualified codes (`zh-CN`) and a few deprecated
    /// ISO 639-1 codes, which are mapped to their current form.
    pub fn from_provider(code: &str) -> Result<Self, LanguageError> {
        let subtag = primary_subtag(code)
            .ok_or_else(|| LanguageError::MalformedLocale(code.to_string()))?;
        let current = match subtag.as_str() {
            "iw" => "he",
            "in" => "id",
            "ji" => "yi",
            "jw" => "jv",
            other => other,
        };
        Self::parse(current)
    }

    pub fn code(&self) -> &'static str {
        self.0.code
    }

    /// English name, e.g. "French".
    pub fn name(&self) -> &'static str {
        self.0.name
    }

    /// Name in the language itself, e.g. "Français".
    pub fn native_name(&self) -> &'static str {
        self.0.native_name
    }

    pub fn all() -> impl Iterator<Item = LanguageCode> {
        LANGUAGES.iter().map(LanguageCode)
    }
}

/// Primary language subtag of a BCP-47 tag, lowercased.
///
/// Returns `None` when the first subtag is not 2–8 ASCII letters.
pub fn primary_subtag(locale: &str) -> Option<String> {
    let first = locale.trim().split(['-', '_']).next()?;
    let valid = (2..=8).contains(&first.len()) && first.chars().all(|c| c.is_ascii_alphabetic());
    valid.then(|| first.to_ascii_lowercase())
}

impl PartialEq for LanguageCode {
    fn eq(&self, other: &Self) -> bool {
        self.0.code == other.0.code
    }
}

impl Eq for LanguageCode {}

impl Hash for LanguageCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.code.hash(state);
    }
}

impl fmt::Debug for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LanguageCode({})", self.0.code)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.code)
    }
}

impl FromStr for LanguageCode {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for LanguageCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.code)
    }
}

impl<'de> Deserialize<'de> for LanguageCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

macro_rules! languages {
    ($(($code:literal, $name:literal, $native:literal)),* $(,)?) => {
        static LANGUAGES: &[Language] = &[
            $(Language { code: $code, name: $name, native_name: $native }),*
        ];
    };
}

languages![
    ("aa", "Afar", "Afaraf"),
    ("ab", "Abkhaz", "аҧсуа бызшәа"),
    ("ae", "Avestan", "avesta"),
    ("af", "Afrikaans", "Afrikaans"),
    ("ak", "Akan", "Akan"),
    ("am", "Amharic", "አማርኛ"),
    ("an", "Aragonese", "aragonés"),
    ("ar", "Arabic", "اللغة العربية"),
    ("as", "Assamese", "অসমীয়া"),
    ("av", "Avaric", "авар мацӀ"),
    ("ay", "Aymara", "aymar aru"),
    ("az", "Azerbaijani", "azərbaycan dili"),
    ("ba", "Bashkir", "башҡорт теле"),
    ("be", "Belarusian", "беларуская мова"),
    ("bg", "Bulgarian", "български език"),
    ("bi", "Bislama", "Bislama"),
    ("bm", "Bambara", "bamanankan"),
    ("bn", "Bengali", "বাংলা"),
    ("bo", "Tibetan", "བོད་ཡིག"),
    ("br", "Breton", "brezhoneg"),
    ("bs", "Bosnian", "bosanski jezik"),
    ("ca", "Catalan", "Català"),
    ("ce", "Chechen", "нохчийн мотт"),
    ("ch", "Chamorro", "Chamoru"),
    ("co", "Corsican", "corsu"),
    ("cr", "Cree", "ᓀᐦᐃᔭᐍᐏᐣ"),
    ("cs", "Czech", "čeština"),
    ("cu", "Old Church Slavonic", "ѩзыкъ словѣньскъ"),
    ("cv", "Chuvash", "чӑваш чӗлхи"),
    ("cy", "Welsh", "Cymraeg"),
    ("da", "Danish", "Dansk"),
    ("de", "German", "Deutsch"),
    ("dv", "Divehi", "Dhivehi"),
    ("dz", "Dzongkha", "རྫོང་ཁ"),
    ("ee", "Ewe", "Eʋegbe"),
    ("el", "Greek", "Ελληνικά"),
    ("en", "English", "English"),
    ("eo", "Esperanto", "Esperanto"),
    ("es", "Spanish", "Español"),
    ("et", "Estonian", "eesti"),
    ("eu", "Basque", "euskara"),
    ("fa", "Persian", "فارسی"),
    ("ff", "Fula", "Fulfulde"),
    ("fi", "Finnish", "suomi"),
    ("fj", "Fijian", "vosa Vakaviti"),
    ("fo", "Faroese", "Føroyskt"),
    ("fr", "French", "Français"),
    ("fy", "Western Frisian", "Frysk"),
    ("ga", "Irish", "Gaeilge"),
    ("gd", "Scottish Gaelic", "Gàidhlig"),
    ("gl", "Galician", "galego"),
    ("gn", "Guaraní", "Avañe'ẽ"),
    ("gu", "Gujarati", "ગુજરાતી"),
    ("gv", "Manx", "Gaelg"),
    ("ha", "Hausa", "هَوُسَ"),
    ("he", "Hebrew", "עברית"),
    ("hi", "Hindi", "हिन्दी"),
    ("ho", "Hiri Motu", "Hiri Motu"),
    ("hr", "Croatian", "Hrvatski"),
    ("ht", "Haitian", "Kreyòl ayisyen"),
    ("hu", "Hungarian", "magyar"),
    ("hy", "Armenian", "Հայերեն"),
    ("hz", "Herero", "Otjiherero"),
    ("ia", "Interlingua", "Interlingua"),
    ("id", "Indonesian", "Bahasa Indonesia"),
    ("ie", "Interlingue", "Interlingue"),
    ("ig", "Igbo", "Asụsụ Igbo"),
    ("ii", "Nuosu", "ꆈꌠ꒿ Nuosuhxop"),
    ("ik", "Inupiaq", "Iñupiaq"),
    ("io", "Ido", "Ido"),
    ("is", "Icelandic", "Íslenska"),
    ("it", "Italian", "Italiano"),
    ("iu", "Inuktitut", "ᐃᓄᒃᑎᑐᑦ"),
    ("ja", "Japanese", "日本語"),
    ("jv", "Javanese", "basa Jawa"),
    ("ka", "Georgian", "ქართული"),
    ("kg", "Kongo", "Kikongo"),
    ("ki", "Kikuyu", "Gĩkũyũ"),
    ("kj", "Kwanyama", "Kuanyama"),
    ("kk", "Kazakh", "қазақ тілі"),
    ("kl", "Kalaallisut", "kalaallisut"),
    ("km", "Khmer", "ខេមរភាសា"),
    ("kn", "Kannada", "ಕನ್ನಡ"),
    ("ko", "Korean", "한국어"),
    ("kr", "Kanuri", "Kanuri"),
    ("ks", "Kashmiri", "कश्मीरी"),
    ("ku", "Kurdish", "Kurdî"),
    ("kv", "Komi", "коми кыв"),
    ("kw", "Cornish", "Kernewek"),
    ("ky", "Kyrgyz", "Кыргызча"),
    ("la", "Latin", "latine"),
    ("lb", "Luxembourgish", "Lëtzebuergesch"),
    ("lg", "Ganda", "Luganda"),
    ("li", "Limburgish", "Limburgs"),
    ("ln", "Lingala", "Lingála"),
    ("lo", "Lao", "ພາສາ"),
    ("lt", "Lithuanian", "lietuvių kalba"),
    ("lu", "Luba-Katanga", "Tshiluba"),
    ("lv", "Latvian", "latviešu valoda"),
    ("mg", "Malagasy", "fiteny malagasy"),
    ("mh", "Marshallese", "Kajin M̧ajeļ"),
    ("mi", "Māori", "te reo Māori"),
    ("mk", "Macedonian", "македонски јазик"),
    ("ml", "Malayalam", "മലയാളം"),
    ("mn", "Mongolian", "Монгол хэл"),
    ("mr", "Marathi", "मराठी"),
    ("ms", "Malay", "Bahasa Melayu"),
    ("mt", "Maltese", "Malti"),
    ("my", "Burmese", "ဗမာစာ"),
    ("na", "Nauru", "Dorerin Naoero"),
    ("nb", "Norwegian Bokmål", "Norsk bokmål"),
    ("nd", "Northern Ndebele", "isiNdebele"),
    ("ne", "Nepali", "नेपाली"),
    ("ng", "Ndonga", "Owambo"),
    ("nl", "Dutch", "Nederlands"),
    ("nn", "Norwegian Nynorsk", "Norsk nynorsk"),
    ("no", "Norwegian", "Norsk"),
    ("nr", "Southern Ndebele", "isiNdebele"),
    ("nv", "Navajo", "Diné bizaad"),
    ("ny", "Chichewa", "chiCheŵa"),
    ("oc", "Occitan", "occitan"),
    ("oj", "Ojibwe", "ᐊᓂᔑᓈᐯᒧᐎᓐ"),
    ("om", "Oromo", "Afaan Oromoo"),
    ("or", "Oriya", "ଓଡ଼ିଆ"),
    ("os", "Ossetian", "ирон æвзаг"),
    ("pa", "Panjabi", "ਪੰਜਾਬੀ"),
    ("pi", "Pāli", "पाऴि"),
    ("pl", "Polish", "Polski"),
    ("ps", "Pashto", "پښتو"),
    ("pt", "Portuguese", "Português"),
    ("qu", "Quechua", "Runa Simi"),
    ("rm", "Romansh", "rumantsch grischun"),
    ("rn", "Kirundi", "Ikirundi"),
    ("ro", "Romanian", "Română"),
    ("ru", "Russian", "Русский"),
    ("rw", "Kinyarwanda", "Ikinyarwanda"),
    ("sa", "Sanskrit", "संस्कृतम्"),
    ("sc", "Sardinian", "sardu"),
    ("sd", "Sindhi", "सिन्धी"),
    ("se", "Northern Sami", "Davvisámegiella"),
    ("sg", "Sango", "yângâ tî sängö"),
    ("si", "Sinhala", "සිංහල"),
    ("sk", "Slovak", "slovenčina"),
    ("sl", "Slovenian", "slovenščina"),
    ("sm", "Samoan", "gagana fa'a Samoa"),
    ("sn", "Shona", "chiShona"),
    ("so", "Somali", "Soomaaliga"),
    ("sq", "Albanian", "Shqip"),
    ("sr", "Serbian", "српски језик"),
    ("ss", "Swati", "SiSwati"),
    ("st", "Southern Sotho", "Sesotho"),
    ("su", "Sundanese", "Basa Sunda"),
    ("sv", "Swedish", "Svenska"),
    ("sw", "Swahili", "Kiswahili"),
    ("ta", "Tamil", "தமிழ்"),
    ("te", "Telugu", "తెలుగు"),
    ("tg", "Tajik", "тоҷикӣ"),
    ("th", "Thai", "ไทย"),
    ("ti", "Tigrinya", "ትግርኛ"),
    ("tk", "Turkmen", "Türkmençe"),
    ("tl", "Tagalog", "Wikang Tagalog"),
    ("tn", "Tswana", "Setswana"),
    ("to", "Tonga", "faka Tonga"),
    ("tr", "Turkish", "Türkçe"),
    ("ts", "Tsonga", "Xitsonga"),
    ("tt", "Tatar", "татар теле"),
    ("tw", "Twi", "Twi"),
    ("ty", "Tahitian", "Reo Tahiti"),
    ("ug", "Uyghur", "ئۇيغۇرچە"),
    ("uk", "Ukrainian", "Українська"),
    ("ur", "Urdu", "اردو"),
    ("uz", "Uzbek", "Ўзбек"),
    ("ve", "Venda", "Tshivenḓa"),
    ("vi", "Vietnamese", "Tiếng Việt"),
    ("vo", "Volapük", "Volapük"),
    ("wa", "Walloon", "walon"),
    ("wo", "Wolof", "Wollof"),
    ("xh", "Xhosa", "isiXhosa"),
    ("yi", "Yiddish", "ייִדיש"),
    ("yo", "Yoruba", "Yorùbá"),
    ("za", "Zhuang", "Saɯ cueŋƅ"),
    ("zh", "Chinese", "中文"),
    ("zu", "Zulu", "isiZulu"),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_has_every_iso_639_1_code_once() {
        let codes: HashSet<_> = LanguageCode::all().map(|l| l.code()).collect();
        assert_eq!(codes.len(), 183);
        assert!(codes
            .iter()
            .all(|c| c.len() == 2 && c.chars().all(|ch| ch.is_ascii_lowercase())));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let fr = LanguageCode::parse("FR").unwrap();
        assert_eq!(fr.code(), "fr");
        assert_eq!(fr.name(), "French");
        assert_eq!(fr.native_name(), "Français");
    }

    #[test]
    fn test_parse_rejects_unknown_code() {
        assert_eq!(
            LanguageCode::parse("xx"),
            Err(LanguageError::UnknownCode("xx".to_string()))
        );
        assert!(LanguageCode::parse("").is_err());
        assert!(LanguageCode::parse("fra").is_err());
    }

    #[test]
    fn test_locale_resolves_primary_subtag() {
        assert_eq!(LanguageCode::from_locale("fr-FR").unwrap().code(), "fr");
        assert_eq!(LanguageCode::from_locale("en_US").unwrap().code(), "en");
        assert_eq!(LanguageCode::from_locale("zh-Hant-TW").unwrap().code(), "zh");
        assert_eq!(LanguageCode::from_locale("de").unwrap().code(), "de");
    }

    #[test]
    fn test_malformed_locale_is_an_error() {
        assert!(matches!(
            LanguageCode::from_locale(""),
            Err(LanguageError::MalformedLocale(_))
        ));
        assert!(matches!(
            LanguageCode::from_locale("12-34"),
            Err(LanguageError::MalformedLocale(_))
        ));
        // well-formed, but ISO 639-2 only
        assert!(matches!(
            LanguageCode::from_locale("haw-US"),
            Err(LanguageError::UnknownCode(_))
        ));
    }

    #[test]
    fn test_provider_codes_are_normalised() {
        assert_eq!(LanguageCode::from_provider("zh-CN").unwrap().code(), "zh");
        assert_eq!(LanguageCode::from_provider("iw").unwrap().code(), "he");
        assert_eq!(LanguageCode::from_provider("jw").unwrap().code(), "jv");
        assert!(LanguageCode::from_provider("und").is_err());
    }

    #[test]
    fn test_serde_uses_the_bare_code() {
        let es: LanguageCode = serde_json::from_str("\"es\"").unwrap();
        assert_eq!(es.native_name(), "Español");
        assert_eq!(serde_json::to_string(&es).unwrap(), "\"es\"");
        assert!(serde_json::from_str::<LanguageCode>("\"qq\"").is_err());
    }
}
