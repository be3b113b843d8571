//! Complementary user-agent heuristic sources
//!
//! The analyzer consumes two black-box hint sources behind trait seams: a
//! generic user-agent grammar parser and a device-pattern recognizer. The
//! built-in implementations cover the common browser/OS/handset families;
//! richer external parsers can be substituted through the traits.

use regex::Regex;

/// Dotted-version components, outermost first
#[derive(Debug, Clone, Default)]
pub struct VersionParts {
    pub major: Option<String>,
    pub minor: Option<String>,
    pub patch: Option<String>,
    pub patch_minor: Option<String>,
}

impl VersionParts {
    /// Compose `major.minor.patch.patch_minor`, stopping at the first
    /// missing level
    pub fn compose(&self) -> String {
        let mut ret = String::new();
        for part in [&self.major, &self.minor, &self.patch, &self.patch_minor] {
            match part {
                Some(value) => {
                    if !ret.is_empty() {
                        ret.push('.');
                    }
                    ret.push_str(value);
                }
                None => break,
            }
        }
        ret
    }
}

/// Operating-system hints from the grammar parser
#[derive(Debug, Clone, Default)]
pub struct OsHints {
    pub family: Option<String>,
    pub version: VersionParts,
}

/// Agent (application) hints from the grammar parser
#[derive(Debug, Clone, Default)]
pub struct AgentHints {
    pub family: Option<String>,
    pub version: VersionParts,
}

/// Structured output of the generic grammar parser
#[derive(Debug, Clone, Default)]
pub struct GrammarHints {
    pub device_brand: Option<String>,
    pub os: OsHints,
    pub agent: AgentHints,
}

/// Generic user-agent grammar parser
pub trait UaGrammar {
    fn parse(&self, user_agent: &str) -> GrammarHints;
}

/// Structured output of the device-pattern recognizer
#[derive(Debug, Clone, Default)]
pub struct DeviceHints {
    pub model: Option<String>,
    pub os_family: Option<String>,
    pub app_name: Option<String>,
}

/// Handset/device pattern recognizer
pub trait DevicePatterns {
    fn parse(&self, user_agent: &str) -> DeviceHints;
}

/// Built-in grammar parser over the common OS/browser token shapes
pub struct BuiltinGrammar {
    os_patterns: Vec<(Regex, &'static str)>,
    agent_patterns: Vec<(Regex, &'static str)>,
    generic_agent: Regex,
    brand_patterns: Vec<(Regex, &'static str)>,
}

impl BuiltinGrammar {
    pub fn new() -> Self {
        let os_patterns = vec![
            (
                Regex::new(r"Windows NT (?P<major>\d+)(?:\.(?P<minor>\d+))?").unwrap(),
                "Windows",
            ),
            (
                Regex::new(r"Android (?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<patch>\d+))?")
                    .unwrap(),
                "Android",
            ),
            (
                Regex::new(r"iPhone OS (?P<major>\d+)_(?P<minor>\d+)(?:_(?P<patch>\d+))?")
                    .unwrap(),
                "iOS",
            ),
            (
                Regex::new(r"CPU OS (?P<major>\d+)_(?P<minor>\d+)(?:_(?P<patch>\d+))?").unwrap(),
                "iOS",
            ),
            (
                Regex::new(r"Mac OS X (?P<major>\d+)[._](?P<minor>\d+)(?:[._](?P<patch>\d+))?")
                    .unwrap(),
                "Mac OS X",
            ),
            (Regex::new(r"\bUbuntu\b").unwrap(), "Ubuntu"),
            (Regex::new(r"\bDebian\b").unwrap(), "Debian"),
            (Regex::new(r"\bFedora\b").unwrap(), "Fedora"),
            (Regex::new(r"\bCrOS\b").unwrap(), "Chrome OS"),
            (Regex::new(r"\bLinux\b").unwrap(), "Linux"),
        ];

        let agent_patterns = vec![
            (
                Regex::new(r"Edg/(?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<patch>\d+))?")
                    .unwrap(),
                "Edge",
            ),
            (
                Regex::new(r"OPR/(?P<major>\d+)(?:\.(?P<minor>\d+))?").unwrap(),
                "Opera",
            ),
            (
                Regex::new(r"CriOS/(?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<patch>\d+))?")
                    .unwrap(),
                "Chrome",
            ),
            (
                Regex::new(r"Chrome/(?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<patch>\d+))?")
                    .unwrap(),
                "Chrome",
            ),
            (
                Regex::new(r"Firefox/(?P<major>\d+)(?:\.(?P<minor>\d+))?").unwrap(),
                "Firefox",
            ),
            (
                Regex::new(
                    r"Version/(?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<patch>\d+))?.*Safari/",
                )
                .unwrap(),
                "Safari",
            ),
        ];

        // leading product token, e.g. "curl/8.5.0"; Mozilla is boilerplate
        let generic_agent = Regex::new(
            r"^(?P<family>[A-Za-z][A-Za-z0-9 ._-]*?)/(?P<major>\d+)(?:\.(?P<minor>\d+))?(?:\.(?P<patch>\d+))?",
        )
        .unwrap();

        let brand_patterns = vec![
            (Regex::new(r"iPhone|iPad|iPod|Macintosh").unwrap(), "Apple"),
            (Regex::new(r"\bSM-[A-Za-z0-9]+|Samsung").unwrap(), "Samsung"),
            (Regex::new(r"\bPixel \d").unwrap(), "Google"),
            (Regex::new(r"HUAWEI").unwrap(), "Huawei"),
            (Regex::new(r"Xiaomi|Redmi").unwrap(), "Xiaomi"),
        ];

        Self {
            os_patterns,
            agent_patterns,
            generic_agent,
            brand_patterns,
        }
    }

    fn version_from(caps: &regex::Captures<'_>) -> VersionParts {
        let part = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty())
        };
        VersionParts {
            major: part("major"),
            minor: part("minor"),
            patch: part("patch"),
            patch_minor: part("patch_minor"),
        }
    }
}

impl Default for BuiltinGrammar {
    fn default() -> Self {
        Self::new()
    }
}

impl UaGrammar for BuiltinGrammar {
    fn parse(&self, user_agent: &str) -> GrammarHints {
        let mut hints = GrammarHints::default();

        for (pattern, family) in &self.os_patterns {
            if let Some(caps) = pattern.captures(user_agent) {
                hints.os.family = Some((*family).to_string());
                hints.os.version = Self::version_from(&caps);
                break;
            }
        }

        for (pattern, family) in &self.agent_patterns {
            if let Some(caps) = pattern.captures(user_agent) {
                hints.agent.family = Some((*family).to_string());
                hints.agent.version = Self::version_from(&caps);
                break;
            }
        }
        if hints.agent.family.is_none() {
            if let Some(caps) = self.generic_agent.captures(user_agent) {
                let family = caps["family"].trim().to_string();
                if family != "Mozilla" {
                    hints.agent.version = Self::version_from(&caps);
                    hints.agent.family = Some(family);
                }
            }
        }

        for (pattern, brand) in &self.brand_patterns {
            if pattern.is_match(user_agent) {
                hints.device_brand = Some((*brand).to_string());
                break;
            }
        }

        hints
    }
}

/// Built-in handset recognizer over model tokens and app-style agents
pub struct BuiltinDevicePatterns {
    model_patterns: Vec<(Regex, Option<&'static str>)>,
    cfnetwork_app: Regex,
    dalvik: Regex,
}

impl BuiltinDevicePatterns {
    pub fn new() -> Self {
        let model_patterns = vec![
            (Regex::new(r"\b(SM-[A-Za-z0-9]+)").unwrap(), Some("Android")),
            (
                Regex::new(r"\b(Pixel \d+(?: Pro| XL| a)?)").unwrap(),
                Some("Android"),
            ),
            (Regex::new(r"\b(iPad)\b").unwrap(), Some("iOS")),
            (Regex::new(r"\b(iPhone)\b").unwrap(), Some("iOS")),
            (Regex::new(r"\b(HUAWEI [A-Z0-9-]+)").unwrap(), Some("Android")),
        ];

        // "Spotify/8.9.2 CFNetwork/1494 Darwin/23.2.0" style app agents
        let cfnetwork_app =
            Regex::new(r"^(?P<app>[A-Za-z][A-Za-z0-9%. _-]*?)/[0-9][0-9.]* CFNetwork/").unwrap();
        let dalvik = Regex::new(r"^Dalvik/").unwrap();

        Self {
            model_patterns,
            cfnetwork_app,
            dalvik,
        }
    }
}

impl Default for BuiltinDevicePatterns {
    fn default() -> Self {
        Self::new()
    }
}

impl DevicePatterns for BuiltinDevicePatterns {
    fn parse(&self, user_agent: &str) -> DeviceHints {
        let mut hints = DeviceHints::default();

        for (pattern, os_family) in &self.model_patterns {
            if let Some(caps) = pattern.captures(user_agent) {
                hints.model = caps.get(1).map(|m| m.as_str().to_string());
                hints.os_family = os_family.map(|f| f.to_string());
                break;
            }
        }

        if let Some(caps) = self.cfnetwork_app.captures(user_agent) {
            hints.app_name = Some(caps["app"].to_string());
        } else if self.dalvik.is_match(user_agent) && hints.os_family.is_none() {
            hints.os_family = Some("Android".to_string());
        }

        hints
    }
}
