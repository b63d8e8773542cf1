//! Browser Fingerprint Spoofing
//!
//! Generates realistic browser header profiles so scraping requests look like
//! ordinary desktop or mobile traffic. A fresh profile is drawn for every
//! request, which rotates the fingerprint without rebuilding the client.

use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT,
};
use serde::{Deserialize, Serialize};

/// Browser profile with realistic fingerprint
#[derive(Debug, Clone, Serialize)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub accept_encoding: String,
    pub sec_ch_ua: String,
    pub sec_ch_ua_mobile: String,
    pub sec_ch_ua_platform: String,
    pub sec_fetch_dest: String,
    pub sec_fetch_mode: String,
    pub sec_fetch_site: String,
    pub sec_fetch_user: String,
}

/// Real Chrome versions (major, full), newest first
const CHROME_VERSIONS: &[(u32, &str)] = &[
    (131, "131.0.0.0"),
    (130, "130.0.0.0"),
    (129, "129.0.0.0"),
    (128, "128.0.0.0"),
    (126, "126.0.0.0"),
    (124, "124.0.0.0"),
    (122, "122.0.0.0"),
    (120, "120.0.0.0"),
    (118, "118.0.0.0"),
    (116, "116.0.0.0"),
    (114, "114.0.0.0"),
    (112, "112.0.0.0"),
    (110, "110.0.0.0"),
];

/// Real Firefox versions
const FIREFOX_VERSIONS: &[&str] = &["133.0", "132.0", "131.0", "130.0"];

/// Real Safari versions (version, webkit build)
const SAFARI_VERSIONS: &[(&str, &str)] = &[
    ("17.6", "605.1.15"),
    ("17.5", "605.1.15"),
    ("17.4", "605.1.15"),
];

/// Browser families a profile can impersonate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserFamily {
    Chrome,
    Firefox,
    Safari,
}

/// Device class of the impersonated browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    Desktop,
    Mobile,
}

/// Knobs for profile generation, loaded from the `[fingerprint]` config table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FingerprintOptions {
    pub browsers: Vec<BrowserFamily>,
    /// Oldest Chrome major version to impersonate.
    pub min_chrome_version: u32,
    pub devices: Vec<Device>,
    /// Primary locales, e.g. `en-US`, `id-ID`.
    pub locales: Vec<String>,
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        Self {
            browsers: vec![BrowserFamily::Chrome],
            min_chrome_version: 110,
            devices: vec![Device::Desktop, Device::Mobile],
            locales: vec!["en-US".to_string(), "id-ID".to_string()],
        }
    }
}

/// Platform configurations
#[derive(Debug, Clone, Copy)]
pub enum Platform {
    MacOS,
    Windows,
    Linux,
    Android,
    Ios,
}

impl Platform {
    fn random(device: Device) -> Self {
        let mut rng = rand::thread_rng();
        let roll: f32 = rng.gen();
        match device {
            // Realistic distribution: Windows 65%, macOS 20%, Linux 15%
            Device::Desktop => {
                if roll < 0.65 {
                    Platform::Windows
                } else if roll < 0.85 {
                    Platform::MacOS
                } else {
                    Platform::Linux
                }
            }
            // Indonesian mobile traffic is overwhelmingly Android
            Device::Mobile => {
                if roll < 0.85 {
                    Platform::Android
                } else {
                    Platform::Ios
                }
            }
        }
    }

    fn os_string(self) -> &'static str {
        match self {
            Platform::MacOS => "Macintosh; Intel Mac OS X 10_15_7",
            Platform::Windows => "Windows NT 10.0; Win64; x64",
            Platform::Linux => "X11; Linux x86_64",
            Platform::Android => "Linux; Android 10; K",
            Platform::Ios => "iPhone; CPU iPhone OS 17_5 like Mac OS X",
        }
    }

    fn sec_ch_platform(self) -> &'static str {
        match self {
            Platform::MacOS => "\"macOS\"",
            Platform::Windows => "\"Windows\"",
            Platform::Linux => "\"Linux\"",
            Platform::Android => "\"Android\"",
            Platform::Ios => "\"iOS\"",
        }
    }
}

/// Generate a realistic Chrome browser profile
#[must_use]
pub fn chrome_profile(device: Device, min_version: u32, accept_language: String) -> BrowserProfile {
    let mut rng = rand::thread_rng();
    // Chrome on iOS is WebKit underneath; keep Chrome profiles on Android for mobile
    let platform = match device {
        Device::Desktop => Platform::random(device),
        Device::Mobile => Platform::Android,
    };

    let eligible: Vec<&(u32, &str)> = CHROME_VERSIONS
        .iter()
        .filter(|(major, _)| *major >= min_version)
        .collect();
    let (major, full) = eligible
        .choose(&mut rng)
        .copied()
        .unwrap_or(&CHROME_VERSIONS[0]);

    let mobile_token = match device {
        Device::Desktop => "",
        Device::Mobile => "Mobile ",
    };
    let user_agent = format!(
        "Mozilla/5.0 ({}) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/{} {}Safari/537.36",
        platform.os_string(),
        full,
        mobile_token
    );

    // Realistic Sec-CH-UA with brand ordering variation
    let mut brands = [
        format!("\"Google Chrome\";v=\"{major}\""),
        format!("\"Chromium\";v=\"{major}\""),
        "\"Not_A Brand\";v=\"24\"".to_string(),
    ];
    brands.shuffle(&mut rng);

    BrowserProfile {
        user_agent,
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7".to_string(),
        accept_language,
        accept_encoding: "gzip, deflate, br".to_string(),
        sec_ch_ua: brands.join(", "),
        sec_ch_ua_mobile: match device {
            Device::Desktop => "?0".to_string(),
            Device::Mobile => "?1".to_string(),
        },
        sec_ch_ua_platform: platform.sec_ch_platform().to_string(),
        sec_fetch_dest: "document".to_string(),
        sec_fetch_mode: "navigate".to_string(),
        sec_fetch_site: "none".to_string(),
        sec_fetch_user: "?1".to_string(),
    }
}

/// Generate a realistic Firefox browser profile
#[must_use]
pub fn firefox_profile(device: Device, accept_language: String) -> BrowserProfile {
    let mut rng = rand::thread_rng();
    let version = FIREFOX_VERSIONS.choose(&mut rng).unwrap_or(&FIREFOX_VERSIONS[0]);

    let user_agent = match device {
        Device::Desktop => format!(
            "Mozilla/5.0 ({}; rv:{version}) Gecko/20100101 Firefox/{version}",
            Platform::random(device).os_string()
        ),
        Device::Mobile => {
            format!(
                "Mozilla/5.0 (Android 14; Mobile; rv:{version}) Gecko/{version} Firefox/{version}"
            )
        }
    };

    BrowserProfile {
        user_agent,
        accept:
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
                .to_string(),
        accept_language,
        accept_encoding: "gzip, deflate, br".to_string(),
        // Firefox doesn't send Sec-CH-UA headers
        sec_ch_ua: String::new(),
        sec_ch_ua_mobile: String::new(),
        sec_ch_ua_platform: String::new(),
        sec_fetch_dest: "document".to_string(),
        sec_fetch_mode: "navigate".to_string(),
        sec_fetch_site: "none".to_string(),
        sec_fetch_user: "?1".to_string(),
    }
}

/// Generate a realistic Safari browser profile
#[must_use]
pub fn safari_profile(device: Device, accept_language: String) -> BrowserProfile {
    let mut rng = rand::thread_rng();
    let (version, webkit) = SAFARI_VERSIONS.choose(&mut rng).unwrap_or(&SAFARI_VERSIONS[0]);

    // Safari only runs on Apple platforms
    let user_agent = match device {
        Device::Desktop => format!(
            "Mozilla/5.0 ({}) AppleWebKit/{webkit} (KHTML, like Gecko) Version/{version} Safari/{webkit}",
            Platform::MacOS.os_string()
        ),
        Device::Mobile => format!(
            "Mozilla/5.0 ({}) AppleWebKit/{webkit} (KHTML, like Gecko) Version/{version} Mobile/15E148 Safari/604.1",
            Platform::Ios.os_string()
        ),
    };

    BrowserProfile {
        user_agent,
        accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
        accept_language,
        accept_encoding: "gzip, deflate, br".to_string(),
        sec_ch_ua: String::new(),
        sec_ch_ua_mobile: String::new(),
        sec_ch_ua_platform: String::new(),
        sec_fetch_dest: "document".to_string(),
        sec_fetch_mode: "navigate".to_string(),
        sec_fetch_site: "none".to_string(),
        sec_fetch_user: "?1".to_string(),
    }
}

/// Generate a random browser profile constrained by `options`
#[must_use]
pub fn random_profile(options: &FingerprintOptions) -> BrowserProfile {
    let mut rng = rand::thread_rng();
    let device = options.devices.choose(&mut rng).copied().unwrap_or(Device::Desktop);
    let family = options
        .browsers
        .choose(&mut rng)
        .copied()
        .unwrap_or(BrowserFamily::Chrome);
    let accept_language = accept_language(&options.locales);

    match family {
        BrowserFamily::Chrome => {
            chrome_profile(device, options.min_chrome_version, accept_language)
        }
        BrowserFamily::Firefox => firefox_profile(device, accept_language),
        BrowserFamily::Safari => safari_profile(device, accept_language),
    }
}

/// Build an Accept-Language header led by one randomly chosen locale.
///
/// `["en-US", "id-ID"]` may yield `id-ID,id;q=0.9,en-US;q=0.8,en;q=0.7`.
fn accept_language(locales: &[String]) -> String {
    let mut rng = rand::thread_rng();
    let mut ordered: Vec<&str> = locales.iter().map(String::as_str).collect();
    if ordered.is_empty() {
        return "en-US,en;q=0.9".to_string();
    }
    ordered.shuffle(&mut rng);

    let mut parts = Vec::new();
    let mut q = 10u32;
    for locale in ordered {
        let primary = locale.split('-').next().unwrap_or(locale);
        for tag in [locale, primary] {
            if parts.iter().any(|p: &String| p.split(';').next() == Some(tag)) {
                continue;
            }
            if q == 10 {
                parts.push(tag.to_string());
            } else {
                parts.push(format!("{tag};q=0.{q}"));
            }
            q = q.saturating_sub(1).max(1);
        }
    }
    parts.join(",")
}

impl BrowserProfile {
    /// Switch the Sec-Fetch headers to what a same-origin XHR sends.
    #[must_use]
    pub fn for_xhr(mut self) -> Self {
        self.sec_fetch_dest = "empty".to_string();
        self.sec_fetch_mode = "cors".to_string();
        self.sec_fetch_site = "same-origin".to_string();
        self.sec_fetch_user = String::new();
        self.accept = "*/*".to_string();
        self
    }

    /// Convert profile to reqwest `HeaderMap`
    ///
    /// Empty fields are omitted; values that are not valid header text
    /// (e.g. a malformed configured locale) are skipped.
    pub fn to_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        insert(&mut headers, USER_AGENT, &self.user_agent);
        insert(&mut headers, ACCEPT, &self.accept);
        insert(&mut headers, ACCEPT_LANGUAGE, &self.accept_language);
        insert(&mut headers, ACCEPT_ENCODING, &self.accept_encoding);

        // Sec-CH-UA headers for Chromium
        insert(&mut headers, HeaderName::from_static("sec-ch-ua"), &self.sec_ch_ua);
        insert(&mut headers, HeaderName::from_static("sec-ch-ua-mobile"), &self.sec_ch_ua_mobile);
        insert(
            &mut headers,
            HeaderName::from_static("sec-ch-ua-platform"),
            &self.sec_ch_ua_platform,
        );

        // Sec-Fetch headers (all modern browsers)
        insert(&mut headers, HeaderName::from_static("sec-fetch-dest"), &self.sec_fetch_dest);
        insert(&mut headers, HeaderName::from_static("sec-fetch-mode"), &self.sec_fetch_mode);
        insert(&mut headers, HeaderName::from_static("sec-fetch-site"), &self.sec_fetch_site);
        insert(&mut headers, HeaderName::from_static("sec-fetch-user"), &self.sec_fetch_user);

        headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));

        headers
    }
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    if value.is_empty() {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(name, value);
    }
}
