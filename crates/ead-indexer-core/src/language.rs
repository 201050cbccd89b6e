//! ISO 639 language-code lookup.
//!
//! Covers ISO 639-2 (bibliographic and terminologic) and ISO 639-1 codes.
//! The table is sorted by code so lookups are a binary search.

use crate::error::LanguageError;

/// Resolve a 2- or 3-letter language code to its English name.
///
/// Surrounding whitespace is ignored and matching is case-insensitive.
///
/// ```rust
/// use ead_indexer_core::language::lookup;
///
/// assert_eq!(lookup(" ENG ").unwrap(), "English");
/// assert!(lookup("xxx").is_err());
/// ```
pub fn lookup(code: &str) -> Result<&'static str, LanguageError> {
    let trimmed = code.trim();
    if trimmed.is_empty() {
        return Err(LanguageError::Empty);
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(LanguageError::InternalWhitespace(trimmed.to_string()));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(LanguageError::InvalidCharacters(trimmed.to_string()));
    }
    if !(2..=3).contains(&trimmed.len()) {
        return Err(LanguageError::InvalidLength(trimmed.to_string()));
    }

    let key = trimmed.to_ascii_lowercase();
    LANGUAGES
        .binary_search_by(|(k, _)| (*k).cmp(key.as_str()))
        .map(|idx| LANGUAGES[idx].1)
        .map_err(|_| LanguageError::NotFound(trimmed.to_string()))
}

/// Resolve every code, collecting names and errors separately.
pub fn lookup_all(codes: &[String]) -> (Vec<String>, Vec<LanguageError>) {
    let mut names = Vec::new();
    let mut errors = Vec::new();
    for code in codes {
        match lookup(code) {
            Ok(name) => names.push(name.to_string()),
            Err(e) => errors.push(e),
        }
    }
    (names, errors)
}

static LANGUAGES: &[(&str, &str)] = &[
    ("aa", "Afar"),
    ("aar", "Afar"),
    ("ab", "Abkhazian"),
    ("abk", "Abkhazian"),
    ("ace", "Achinese"),
    ("ach", "Acoli"),
    ("ada", "Adangme"),
    ("ady", "Adyghe"),
    ("ae", "Avestan"),
    ("af", "Afrikaans"),
    ("afa", "Afro-Asiatic languages"),
    ("afh", "Afrihili"),
    ("afr", "Afrikaans"),
    ("ain", "Ainu"),
    ("ak", "Akan"),
    ("aka", "Akan"),
    ("akk", "Akkadian"),
    ("alb", "Albanian"),
    ("ale", "Aleut"),
    ("alg", "Algonquian languages"),
    ("alt", "Southern Altai"),
    ("am", "Amharic"),
    ("amh", "Amharic"),
    ("an", "Aragonese"),
    ("ang", "English, Old (ca.450-1100)"),
    ("anp", "Angika"),
    ("apa", "Apache languages"),
    ("ar", "Arabic"),
    ("ara", "Arabic"),
    ("arc", "Official Aramaic (700-300 BCE)"),
    ("arg", "Aragonese"),
    ("arm", "Armenian"),
    ("arn", "Mapudungun"),
    ("arp", "Arapaho"),
    ("art", "Artificial languages"),
    ("arw", "Arawak"),
    ("as", "Assamese"),
    ("asm", "Assamese"),
    ("ast", "Asturian"),
    ("ath", "Athapascan languages"),
    ("aus", "Australian languages"),
    ("av", "Avaric"),
    ("ava", "Avaric"),
    ("ave", "Avestan"),
    ("awa", "Awadhi"),
    ("ay", "Aymara"),
    ("aym", "Aymara"),
    ("az", "Azerbaijani"),
    ("aze", "Azerbaijani"),
    ("ba", "Bashkir"),
    ("bad", "Banda languages"),
    ("bai", "Bamileke languages"),
    ("bak", "Bashkir"),
    ("bal", "Baluchi"),
    ("bam", "Bambara"),
    ("ban", "Balinese"),
    ("baq", "Basque"),
    ("bas", "Basa"),
    ("bat", "Baltic languages"),
    ("be", "Belarusian"),
    ("bej", "Beja"),
    ("bel", "Belarusian"),
    ("bem", "Bemba"),
    ("ben", "Bengali"),
    ("ber", "Berber languages"),
    ("bg", "Bulgarian"),
    ("bh", "Bihari languages"),
    ("bho", "Bhojpuri"),
    ("bi", "Bislama"),
    ("bih", "Bihari languages"),
    ("bik", "Bikol"),
    ("bin", "Bini"),
    ("bis", "Bislama"),
    ("bla", "Siksika"),
    ("bm", "Bambara"),
    ("bn", "Bengali"),
    ("bnt", "Bantu languages"),
    ("bo", "Tibetan"),
    ("bod", "Tibetan"),
    ("bos", "Bosnian"),
    ("br", "Breton"),
    ("bra", "Braj"),
    ("bre", "Breton"),
    ("bs", "Bosnian"),
    ("btk", "Batak languages"),
    ("bua", "Buriat"),
    ("bug", "Buginese"),
    ("bul", "Bulgarian"),
    ("bur", "Burmese"),
    ("byn", "Blin"),
    ("ca", "Catalan"),
    ("cad", "Caddo"),
    ("cai", "Central American Indian languages"),
    ("car", "Galibi Carib"),
    ("cat", "Catalan"),
    ("cau", "Caucasian languages"),
    ("ce", "Chechen"),
    ("ceb", "Cebuano"),
    ("cel", "Celtic languages"),
    ("ces", "Czech"),
    ("ch", "Chamorro"),
    ("cha", "Chamorro"),
    ("chb", "Chibcha"),
    ("che", "Chechen"),
    ("chg", "Chagatai"),
    ("chi", "Chinese"),
    ("chk", "Chuukese"),
    ("chm", "Mari"),
    ("chn", "Chinook jargon"),
    ("cho", "Choctaw"),
    ("chp", "Chipewyan"),
    ("chr", "Cherokee"),
    ("chu", "Church Slavic"),
    ("chv", "Chuvash"),
    ("chy", "Cheyenne"),
    ("cmc", "Chamic languages"),
    ("cnr", "Montenegrin"),
    ("co", "Corsican"),
    ("cop", "Coptic"),
    ("cor", "Cornish"),
    ("cos", "Corsican"),
    ("cpe", "Creoles and pidgins, English based"),
    ("cpf", "Creoles and pidgins, French-based"),
    ("cpp", "Creoles and pidgins, Portuguese-based"),
    ("cr", "Cree"),
    ("cre", "Cree"),
    ("crh", "Crimean Tatar"),
    ("crp", "Creoles and pidgins"),
    ("cs", "Czech"),
    ("csb", "Kashubian"),
    ("cu", "Church Slavic"),
    ("cus", "Cushitic languages"),
    ("cv", "Chuvash"),
    ("cy", "Welsh"),
    ("cym", "Welsh"),
    ("cze", "Czech"),
    ("da", "Danish"),
    ("dak", "Dakota"),
    ("dan", "Danish"),
    ("dar", "Dargwa"),
    ("day", "Land Dayak languages"),
    ("de", "German"),
    ("del", "Delaware"),
    ("den", "Slave (Athapascan)"),
    ("deu", "German"),
    ("dgr", "Dogrib"),
    ("din", "Dinka"),
    ("div", "Divehi"),
    ("doi", "Dogri"),
    ("dra", "Dravidian languages"),
    ("dsb", "Lower Sorbian"),
    ("dua", "Duala"),
    ("dum", "Dutch, Middle (ca.1050-1350)"),
    ("dut", "Dutch"),
    ("dv", "Divehi"),
    ("dyu", "Dyula"),
    ("dz", "Dzongkha"),
    ("dzo", "Dzongkha"),
    ("ee", "Ewe"),
    ("efi", "Efik"),
    ("egy", "Egyptian (Ancient)"),
    ("eka", "Ekajuk"),
    ("el", "Greek, Modern (1453-)"),
    ("ell", "Greek, Modern (1453-)"),
    ("elx", "Elamite"),
    ("en", "English"),
    ("eng", "English"),
    ("enm", "English, Middle (1100-1500)"),
    ("eo", "Esperanto"),
    ("epo", "Esperanto"),
    ("es", "Spanish"),
    ("est", "Estonian"),
    ("et", "Estonian"),
    ("eu", "Basque"),
    ("eus", "Basque"),
    ("ewe", "Ewe"),
    ("ewo", "Ewondo"),
    ("fa", "Persian"),
    ("fan", "Fang"),
    ("fao", "Faroese"),
    ("fas", "Persian"),
    ("fat", "Fanti"),
    ("ff", "Fulah"),
    ("fi", "Finnish"),
    ("fij", "Fijian"),
    ("fil", "Filipino"),
    ("fin", "Finnish"),
    ("fiu", "Finno-Ugrian languages"),
    ("fj", "Fijian"),
    ("fo", "Faroese"),
    ("fon", "Fon"),
    ("fr", "French"),
    ("fra", "French"),
    ("fre", "French"),
    ("frm", "French, Middle (ca.1400-1600)"),
    ("fro", "French, Old (842-ca.1400)"),
    ("frr", "Northern Frisian"),
    ("frs", "Eastern Frisian"),
    ("fry", "Western Frisian"),
    ("ful", "Fulah"),
    ("fur", "Friulian"),
    ("fy", "Western Frisian"),
    ("ga", "Irish"),
    ("gaa", "Ga"),
    ("gay", "Gayo"),
    ("gba", "Gbaya"),
    ("gd", "Gaelic"),
    ("gem", "Germanic languages"),
    ("geo", "Georgian"),
    ("ger", "German"),
    ("gez", "Geez"),
    ("gil", "Gilbertese"),
    ("gl", "Galician"),
    ("gla", "Gaelic"),
    ("gle", "Irish"),
    ("glg", "Galician"),
    ("glv", "Manx"),
    ("gmh", "German, Middle High (ca.1050-1500)"),
    ("gn", "Guarani"),
    ("goh", "German, Old High (ca.750-1050)"),
    ("gon", "Gondi"),
    ("gor", "Gorontalo"),
    ("got", "Gothic"),
    ("grb", "Grebo"),
    ("grc", "Greek, Ancient (to 1453)"),
    ("gre", "Greek, Modern (1453-)"),
    ("grn", "Guarani"),
    ("gsw", "Swiss German"),
    ("gu", "Gujarati"),
    ("guj", "Gujarati"),
    ("gv", "Manx"),
    ("gwi", "Gwich'in"),
    ("ha", "Hausa"),
    ("hai", "Haida"),
    ("hat", "Haitian"),
    ("hau", "Hausa"),
    ("haw", "Hawaiian"),
    ("he", "Hebrew"),
    ("heb", "Hebrew"),
    ("her", "Herero"),
    ("hi", "Hindi"),
    ("hil", "Hiligaynon"),
    ("him", "Himachali languages"),
    ("hin", "Hindi"),
    ("hit", "Hittite"),
    ("hmn", "Hmong"),
    ("hmo", "Hiri Motu"),
    ("ho", "Hiri Motu"),
    ("hr", "Croatian"),
    ("hrv", "Croatian"),
    ("hsb", "Upper Sorbian"),
    ("ht", "Haitian"),
    ("hu", "Hungarian"),
    ("hun", "Hungarian"),
    ("hup", "Hupa"),
    ("hy", "Armenian"),
    ("hye", "Armenian"),
    ("hz", "Herero"),
    ("ia", "Interlingua"),
    ("iba", "Iban"),
    ("ibo", "Igbo"),
    ("ice", "Icelandic"),
    ("id", "Indonesian"),
    ("ido", "Ido"),
    ("ie", "Interlingue"),
    ("ig", "Igbo"),
    ("ii", "Sichuan Yi"),
    ("iii", "Sichuan Yi"),
    ("ijo", "Ijo languages"),
    ("ik", "Inupiaq"),
    ("iku", "Inuktitut"),
    ("ile", "Interlingue"),
    ("ilo", "Iloko"),
    ("ina", "Interlingua"),
    ("inc", "Indic languages"),
    ("ind", "Indonesian"),
    ("ine", "Indo-European languages"),
    ("inh", "Ingush"),
    ("io", "Ido"),
    ("ipk", "Inupiaq"),
    ("ira", "Iranian languages"),
    ("iro", "Iroquoian languages"),
    ("is", "Icelandic"),
    ("isl", "Icelandic"),
    ("it", "Italian"),
    ("ita", "Italian"),
    ("iu", "Inuktitut"),
    ("ja", "Japanese"),
    ("jav", "Javanese"),
    ("jbo", "Lojban"),
    ("jpn", "Japanese"),
    ("jpr", "Judeo-Persian"),
    ("jrb", "Judeo-Arabic"),
    ("jv", "Javanese"),
    ("ka", "Georgian"),
    ("kaa", "Kara-Kalpak"),
    ("kab", "Kabyle"),
    ("kac", "Kachin"),
    ("kal", "Kalaallisut"),
    ("kam", "Kamba"),
    ("kan", "Kannada"),
    ("kar", "Karen languages"),
    ("kas", "Kashmiri"),
    ("kat", "Georgian"),
    ("kau", "Kanuri"),
    ("kaw", "Kawi"),
    ("kaz", "Kazakh"),
    ("kbd", "Kabardian"),
    ("kg", "Kongo"),
    ("kha", "Khasi"),
    ("khi", "Khoisan languages"),
    ("khm", "Central Khmer"),
    ("kho", "Khotanese"),
    ("ki", "Kikuyu"),
    ("kik", "Kikuyu"),
    ("kin", "Kinyarwanda"),
    ("kir", "Kirghiz"),
    ("kj", "Kuanyama"),
    ("kk", "Kazakh"),
    ("kl", "Kalaallisut"),
    ("km", "Central Khmer"),
    ("kmb", "Kimbundu"),
    ("kn", "Kannada"),
    ("ko", "Korean"),
    ("kok", "Konkani"),
    ("kom", "Komi"),
    ("kon", "Kongo"),
    ("kor", "Korean"),
    ("kos", "Kosraean"),
    ("kpe", "Kpelle"),
    ("kr", "Kanuri"),
    ("krc", "Karachay-Balkar"),
    ("krl", "Karelian"),
    ("kro", "Kru languages"),
    ("kru", "Kurukh"),
    ("ks", "Kashmiri"),
    ("ku", "Kurdish"),
    ("kua", "Kuanyama"),
    ("kum", "Kumyk"),
    ("kur", "Kurdish"),
    ("kut", "Kutenai"),
    ("kv", "Komi"),
    ("kw", "Cornish"),
    ("ky", "Kirghiz"),
    ("la", "Latin"),
    ("lad", "Ladino"),
    ("lah", "Lahnda"),
    ("lam", "Lamba"),
    ("lao", "Lao"),
    ("lat", "Latin"),
    ("lav", "Latvian"),
    ("lb", "Luxembourgish"),
    ("lez", "Lezghian"),
    ("lg", "Ganda"),
    ("li", "Limburgan"),
    ("lim", "Limburgan"),
    ("lin", "Lingala"),
    ("lit", "Lithuanian"),
    ("ln", "Lingala"),
    ("lo", "Lao"),
    ("lol", "Mongo"),
    ("loz", "Lozi"),
    ("lt", "Lithuanian"),
    ("ltz", "Luxembourgish"),
    ("lu", "Luba-Katanga"),
    ("lua", "Luba-Lulua"),
    ("lub", "Luba-Katanga"),
    ("lug", "Ganda"),
    ("lui", "Luiseno"),
    ("lun", "Lunda"),
    ("luo", "Luo (Kenya and Tanzania)"),
    ("lus", "Lushai"),
    ("lv", "Latvian"),
    ("mac", "Macedonian"),
    ("mad", "Madurese"),
    ("mag", "Magahi"),
    ("mah", "Marshallese"),
    ("mai", "Maithili"),
    ("mak", "Makasar"),
    ("mal", "Malayalam"),
    ("man", "Mandingo"),
    ("mao", "Maori"),
    ("map", "Austronesian languages"),
    ("mar", "Marathi"),
    ("mas", "Masai"),
    ("may", "Malay"),
    ("mdf", "Moksha"),
    ("mdr", "Mandar"),
    ("men", "Mende"),
    ("mg", "Malagasy"),
    ("mga", "Irish, Middle (900-1200)"),
    ("mh", "Marshallese"),
    ("mi", "Maori"),
    ("mic", "Mi'kmaq"),
    ("min", "Minangkabau"),
    ("mis", "Uncoded languages"),
    ("mk", "Macedonian"),
    ("mkd", "Macedonian"),
    ("mkh", "Mon-Khmer languages"),
    ("ml", "Malayalam"),
    ("mlg", "Malagasy"),
    ("mlt", "Maltese"),
    ("mn", "Mongolian"),
    ("mnc", "Manchu"),
    ("mni", "Manipuri"),
    ("mno", "Manobo languages"),
    ("moh", "Mohawk"),
    ("mon", "Mongolian"),
    ("mos", "Mossi"),
    ("mr", "Marathi"),
    ("mri", "Maori"),
    ("ms", "Malay"),
    ("msa", "Malay"),
    ("mt", "Maltese"),
    ("mul", "Multiple languages"),
    ("mun", "Munda languages"),
    ("mus", "Creek"),
    ("mwl", "Mirandese"),
    ("mwr", "Marwari"),
    ("my", "Burmese"),
    ("mya", "Burmese"),
    ("myn", "Mayan languages"),
    ("myv", "Erzya"),
    ("na", "Nauru"),
    ("nah", "Nahuatl languages"),
    ("nai", "North American Indian languages"),
    ("nap", "Neapolitan"),
    ("nau", "Nauru"),
    ("nav", "Navajo"),
    ("nb", "Bokmål, Norwegian"),
    ("nbl", "Ndebele, South"),
    ("nd", "Ndebele, North"),
    ("nde", "Ndebele, North"),
    ("ndo", "Ndonga"),
    ("nds", "Low German"),
    ("ne", "Nepali"),
    ("nep", "Nepali"),
    ("new", "Nepal Bhasa"),
    ("ng", "Ndonga"),
    ("nia", "Nias"),
    ("nic", "Niger-Kordofanian languages"),
    ("niu", "Niuean"),
    ("nl", "Dutch"),
    ("nld", "Dutch"),
    ("nn", "Norwegian Nynorsk"),
    ("nno", "Norwegian Nynorsk"),
    ("no", "Norwegian"),
    ("nob", "Bokmål, Norwegian"),
    ("nog", "Nogai"),
    ("non", "Norse, Old"),
    ("nor", "Norwegian"),
    ("nqo", "N'Ko"),
    ("nr", "Ndebele, South"),
    ("nso", "Pedi"),
    ("nub", "Nubian languages"),
    ("nv", "Navajo"),
    ("nwc", "Classical Newari"),
    ("ny", "Chichewa"),
    ("nya", "Chichewa"),
    ("nym", "Nyamwezi"),
    ("nyn", "Nyankole"),
    ("nyo", "Nyoro"),
    ("nzi", "Nzima"),
    ("oc", "Occitan (post 1500)"),
    ("oci", "Occitan (post 1500)"),
    ("oj", "Ojibwa"),
    ("oji", "Ojibwa"),
    ("om", "Oromo"),
    ("or", "Oriya"),
    ("ori", "Oriya"),
    ("orm", "Oromo"),
    ("os", "Ossetian"),
    ("osa", "Osage"),
    ("oss", "Ossetian"),
    ("ota", "Turkish, Ottoman (1500-1928)"),
    ("oto", "Otomian languages"),
    ("pa", "Panjabi"),
    ("paa", "Papuan languages"),
    ("pag", "Pangasinan"),
    ("pal", "Pahlavi"),
    ("pam", "Pampanga"),
    ("pan", "Panjabi"),
    ("pap", "Papiamento"),
    ("pau", "Palauan"),
    ("peo", "Persian, Old (ca.600-400 B.C.)"),
    ("per", "Persian"),
    ("phi", "Philippine languages"),
    ("phn", "Phoenician"),
    ("pi", "Pali"),
    ("pl", "Polish"),
    ("pli", "Pali"),
    ("pol", "Polish"),
    ("pon", "Pohnpeian"),
    ("por", "Portuguese"),
    ("pra", "Prakrit languages"),
    ("pro", "Provençal, Old (to 1500)"),
    ("ps", "Pushto"),
    ("pt", "Portuguese"),
    ("pus", "Pushto"),
    ("qu", "Quechua"),
    ("que", "Quechua"),
    ("raj", "Rajasthani"),
    ("rap", "Rapanui"),
    ("rar", "Rarotongan"),
    ("rm", "Romansh"),
    ("rn", "Rundi"),
    ("ro", "Romanian"),
    ("roa", "Romance languages"),
    ("roh", "Romansh"),
    ("rom", "Romany"),
    ("ron", "Romanian"),
    ("ru", "Russian"),
    ("rum", "Romanian"),
    ("run", "Rundi"),
    ("rup", "Aromanian"),
    ("rus", "Russian"),
    ("rw", "Kinyarwanda"),
    ("sa", "Sanskrit"),
    ("sad", "Sandawe"),
    ("sag", "Sango"),
    ("sah", "Yakut"),
    ("sai", "South American Indian languages"),
    ("sal", "Salishan languages"),
    ("sam", "Samaritan Aramaic"),
    ("san", "Sanskrit"),
    ("sas", "Sasak"),
    ("sat", "Santali"),
    ("sc", "Sardinian"),
    ("scn", "Sicilian"),
    ("sco", "Scots"),
    ("sd", "Sindhi"),
    ("se", "Northern Sami"),
    ("sel", "Selkup"),
    ("sem", "Semitic languages"),
    ("sg", "Sango"),
    ("sga", "Irish, Old (to 900)"),
    ("sgn", "Sign Languages"),
    ("shn", "Shan"),
    ("si", "Sinhala"),
    ("sid", "Sidamo"),
    ("sin", "Sinhala"),
    ("sio", "Siouan languages"),
    ("sit", "Sino-Tibetan languages"),
    ("sk", "Slovak"),
    ("sl", "Slovenian"),
    ("sla", "Slavic languages"),
    ("slk", "Slovak"),
    ("slo", "Slovak"),
    ("slv", "Slovenian"),
    ("sm", "Samoan"),
    ("sma", "Southern Sami"),
    ("sme", "Northern Sami"),
    ("smi", "Sami languages"),
    ("smj", "Lule Sami"),
    ("smn", "Inari Sami"),
    ("smo", "Samoan"),
    ("sms", "Skolt Sami"),
    ("sn", "Shona"),
    ("sna", "Shona"),
    ("snd", "Sindhi"),
    ("snk", "Soninke"),
    ("so", "Somali"),
    ("sog", "Sogdian"),
    ("som", "Somali"),
    ("son", "Songhai languages"),
    ("sot", "Sotho, Southern"),
    ("spa", "Spanish"),
    ("sq", "Albanian"),
    ("sqi", "Albanian"),
    ("sr", "Serbian"),
    ("srd", "Sardinian"),
    ("srn", "Sranan Tongo"),
    ("srp", "Serbian"),
    ("srr", "Serer"),
    ("ss", "Swati"),
    ("ssa", "Nilo-Saharan languages"),
    ("ssw", "Swati"),
    ("st", "Sotho, Southern"),
    ("su", "Sundanese"),
    ("suk", "Sukuma"),
    ("sun", "Sundanese"),
    ("sus", "Susu"),
    ("sux", "Sumerian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("swa", "Swahili"),
    ("swe", "Swedish"),
    ("syc", "Classical Syriac"),
    ("syr", "Syriac"),
    ("ta", "Tamil"),
    ("tah", "Tahitian"),
    ("tai", "Tai languages"),
    ("tam", "Tamil"),
    ("tat", "Tatar"),
    ("te", "Telugu"),
    ("tel", "Telugu"),
    ("tem", "Timne"),
    ("ter", "Tereno"),
    ("tet", "Tetum"),
    ("tg", "Tajik"),
    ("tgk", "Tajik"),
    ("tgl", "Tagalog"),
    ("th", "Thai"),
    ("tha", "Thai"),
    ("ti", "Tigrinya"),
    ("tib", "Tibetan"),
    ("tig", "Tigre"),
    ("tir", "Tigrinya"),
    ("tiv", "Tiv"),
    ("tk", "Turkmen"),
    ("tkl", "Tokelau"),
    ("tl", "Tagalog"),
    ("tlh", "Klingon"),
    ("tli", "Tlingit"),
    ("tmh", "Tamashek"),
    ("tn", "Tswana"),
    ("to", "Tonga (Tonga Islands)"),
    ("tog", "Tonga (Nyasa)"),
    ("ton", "Tonga (Tonga Islands)"),
    ("tpi", "Tok Pisin"),
    ("tr", "Turkish"),
    ("ts", "Tsonga"),
    ("tsi", "Tsimshian"),
    ("tsn", "Tswana"),
    ("tso", "Tsonga"),
    ("tt", "Tatar"),
    ("tuk", "Turkmen"),
    ("tum", "Tumbuka"),
    ("tup", "Tupi languages"),
    ("tur", "Turkish"),
    ("tut", "Altaic languages"),
    ("tvl", "Tuvalu"),
    ("tw", "Twi"),
    ("twi", "Twi"),
    ("ty", "Tahitian"),
    ("tyv", "Tuvinian"),
    ("udm", "Udmurt"),
    ("ug", "Uighur"),
    ("uga", "Ugaritic"),
    ("uig", "Uighur"),
    ("uk", "Ukrainian"),
    ("ukr", "Ukrainian"),
    ("umb", "Umbundu"),
    ("und", "Undetermined"),
    ("ur", "Urdu"),
    ("urd", "Urdu"),
    ("uz", "Uzbek"),
    ("uzb", "Uzbek"),
    ("vai", "Vai"),
    ("ve", "Venda"),
    ("ven", "Venda"),
    ("vi", "Vietnamese"),
    ("vie", "Vietnamese"),
    ("vo", "Volapük"),
    ("vol", "Volapük"),
    ("vot", "Votic"),
    ("wa", "Walloon"),
    ("wak", "Wakashan languages"),
    ("wal", "Wolaitta"),
    ("war", "Waray"),
    ("was", "Washo"),
    ("wel", "Welsh"),
    ("wen", "Sorbian languages"),
    ("wln", "Walloon"),
    ("wo", "Wolof"),
    ("wol", "Wolof"),
    ("xal", "Kalmyk"),
    ("xh", "Xhosa"),
    ("xho", "Xhosa"),
    ("yao", "Yao"),
    ("yap", "Yapese"),
    ("yi", "Yiddish"),
    ("yid", "Yiddish"),
    ("yo", "Yoruba"),
    ("yor", "Yoruba"),
    ("ypk", "Yupik languages"),
    ("za", "Zhuang"),
    ("zap", "Zapotec"),
    ("zbl", "Blissymbols"),
    ("zen", "Zenaga"),
    ("zgh", "Standard Moroccan Tamazight"),
    ("zh", "Chinese"),
    ("zha", "Zhuang"),
    ("zho", "Chinese"),
    ("znd", "Zande languages"),
    ("zu", "Zulu"),
    ("zul", "Zulu"),
    ("zun", "Zuni"),
    ("zxx", "No linguistic content"),
    ("zza", "Zaza"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted() {
        assert!(LANGUAGES.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_lookup_three_and_two_letter_codes() {
        assert_eq!(lookup("eng"), Ok("English"));
        assert_eq!(lookup("ger"), Ok("German"));
        assert_eq!(lookup("deu"), Ok("German"));
        assert_eq!(lookup("fr"), Ok("French"));
        assert_eq!(lookup("  SPA\n"), Ok("Spanish"));
    }

    #[test]
    fn test_lookup_errors() {
        assert_eq!(lookup(""), Err(LanguageError::Empty));
        assert_eq!(lookup("   "), Err(LanguageError::Empty));
        assert_eq!(
            lookup("e ng"),
            Err(LanguageError::InternalWhitespace("e ng".to_string()))
        );
        assert_eq!(
            lookup("en1"),
            Err(LanguageError::InvalidCharacters("en1".to_string()))
        );
        assert_eq!(
            lookup("engl"),
            Err(LanguageError::InvalidLength("engl".to_string()))
        );
        assert_eq!(lookup("e"), Err(LanguageError::InvalidLength("e".to_string())));
        assert_eq!(lookup("xxx"), Err(LanguageError::NotFound("xxx".to_string())));
    }

    #[test]
    fn test_lookup_all_keeps_going_after_errors() {
        let codes = vec!["xxx".to_string(), "eng".to_string(), "".to_string(), "fre".to_string()];
        let (names, errors) = lookup_all(&codes);
        assert_eq!(names, vec!["English".to_string(), "French".to_string()]);
        assert_eq!(errors.len(), 2);
    }
}
