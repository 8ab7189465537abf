//! Taiwanese city and county names.
//!
//! The weather service keys forecasts by the official Chinese name
//! (`臺北市`), the transit service by an English code (`Taipei`).

/// Official names with their transit city codes.
const CITIES: &[(&str, &str)] = &[
    ("臺北市", "Taipei"),
    ("新北市", "NewTaipei"),
    ("桃園市", "Taoyuan"),
    ("臺中市", "Taichung"),
    ("臺南市", "Tainan"),
    ("高雄市", "Kaohsiung"),
    ("基隆市", "Keelung"),
    ("新竹市", "Hsinchu"),
    ("嘉義市", "Chiayi"),
    ("新竹縣", "HsinchuCounty"),
    ("苗栗縣", "MiaoliCounty"),
    ("彰化縣", "ChanghuaCounty"),
    ("南投縣", "NantouCounty"),
    ("雲林縣", "YunlinCounty"),
    ("嘉義縣", "ChiayiCounty"),
    ("屏東縣", "PingtungCounty"),
    ("宜蘭縣", "YilanCounty"),
    ("花蓮縣", "HualienCounty"),
    ("臺東縣", "TaitungCounty"),
    ("澎湖縣", "PenghuCounty"),
    ("金門縣", "KinmenCounty"),
    ("連江縣", "LienchiangCounty"),
];

/// Colloquial short forms, after `台` has become `臺`.
const ALIASES: &[(&str, &str)] = &[
    ("北市", "臺北市"),
    ("中市", "臺中市"),
    ("南市", "臺南市"),
    ("高市", "高雄市"),
    ("竹市", "新竹市"),
    ("竹縣", "新竹縣"),
    ("嘉市", "嘉義市"),
    ("馬祖", "連江縣"),
];

/// Normalizes user input to an official name.
///
/// Trims, maps `台` to `臺`, resolves aliases and appends `市` or `縣` when
/// that yields a known name (`市` first, so `新竹` is the city). Empty input
/// yields `default`; unknown names are returned as typed.
pub fn normalize_city(input: &str, default: &str) -> String {
    let name = input.trim().replace('台', "臺");
    if name.is_empty() {
        return default.to_string();
    }
    if is_known(&name) {
        return name;
    }
    if let Some((_, official)) = ALIASES.iter().find(|(alias, _)| *alias == name) {
        return (*official).to_string();
    }
    for suffix in ["市", "縣"] {
        let candidate = format!("{name}{suffix}");
        if is_known(&candidate) {
            return candidate;
        }
    }
    name
}

fn is_known(name: &str) -> bool {
    CITIES.iter().any(|(official, _)| *official == name)
}

/// The transit city code for an official name.
pub fn transit_code(official: &str) -> Option<&'static str> {
    CITIES
        .iter()
        .find(|(name, _)| *name == official)
        .map(|(_, code)| *code)
}
