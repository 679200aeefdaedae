use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// The model's JSON object, exactly as it was parsed.
///
/// Carried to the client untouched so numbers keep their written form and
/// fields the model adds or mistypes still reach the dashboard.
pub type RawAnalysis = Map<String, Value>;

/// Best-effort typed reading of a [`RawAnalysis`].
///
/// Never fails. Absent or unusable fields read as zero or empty, numeric
/// strings such as `"72"` or `"25-35%"` read as their leading number, and
/// clusters written as `"Theme: a, b"` are split into theme and keywords.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordAnalysis {
    /// Overall CPC optimization score, nominally 0-100.
    pub score: f64,
    pub current_keywords: Vec<String>,
    pub high_value_keywords: Vec<String>,
    /// Display order matters.
    pub recommendations: Vec<String>,
    /// Percentage.
    #[serde(rename = "estimatedCPCIncrease")]
    pub estimated_cpc_increase: f64,
    pub content_quality: ContentQuality,
    pub competitive_keywords: Vec<String>,
    pub semantic_clusters: Vec<SemanticCluster>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentQuality {
    pub score: f64,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SemanticCluster {
    pub theme: String,
    pub keywords: Vec<String>,
}

impl From<&RawAnalysis> for KeywordAnalysis {
    fn from(raw: &RawAnalysis) -> Self {
        Self {
            score: number(raw.get("score")),
            current_keywords: strings(raw.get("currentKeywords")),
            high_value_keywords: strings(raw.get("highValueKeywords")),
            recommendations: strings(raw.get("recommendations")),
            estimated_cpc_increase: number(raw.get("estimatedCPCIncrease")),
            content_quality: raw
                .get("contentQuality")
                .and_then(Value::as_object)
                .map(|q| ContentQuality {
                    score: number(q.get("score")),
                    strengths: strings(q.get("strengths")),
                    improvements: strings(q.get("improvements")),
                })
                .unwrap_or_default(),
            competitive_keywords: strings(raw.get("competitiveKeywords")),
            semantic_clusters: match raw.get("semanticClusters") {
                Some(Value::Array(items)) => items.iter().filter_map(cluster).collect(),
                _ => Vec::new(),
            },
        }
    }
}

fn number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => leading_number(s),
        _ => 0.0,
    }
}

/// `"25-35%"` reads as 25, `"n/a"` as 0.
fn leading_number(s: &str) -> f64 {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '0'..='9' => end = i + 1,
            '-' | '+' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
    }
    s[..end].parse().unwrap_or(0.0)
}

fn strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn cluster(value: &Value) -> Option<SemanticCluster> {
    match value {
        Value::Object(map) => Some(SemanticCluster {
            theme: map.get("theme").and_then(scalar_text).unwrap_or_default(),
            keywords: strings(map.get("keywords")),
        }),
        Value::String(s) => Some(match s.split_once(':') {
            Some((theme, rest)) => SemanticCluster {
                theme: theme.trim().to_string(),
                keywords: rest
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect(),
            },
            None => SemanticCluster {
                theme: s.trim().to_string(),
                keywords: Vec::new(),
            },
        }),
        _ => None,
    }
}

/// Band the dashboard uses to describe a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorePotential {
    Excellent,
    Good,
    Moderate,
}

impl ScorePotential {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            ScorePotential::Excellent
        } else if score >= 60.0 {
            ScorePotential::Good
        } else {
            ScorePotential::Moderate
        }
    }

    /// Catalog key of the localized label.
    pub fn message_key(self) -> &'static str {
        match self {
            ScorePotential::Excellent => "analyze.results.potentialExcellent",
            ScorePotential::Good => "analyze.results.potentialGood",
            ScorePotential::Moderate => "analyze.results.potentialModerate",
        }
    }
}

impl KeywordAnalysis {
    pub fn potential(&self) -> ScorePotential {
        ScorePotential::from_score(self.score)
    }
}

/// Success envelope returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub success: bool,
    /// The URL exactly as the client sent it.
    pub url: String,
    pub analysis: RawAnalysis,
    #[serde(serialize_with = "iso_millis")]
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    pub fn new(url: String, analysis: RawAnalysis) -> Self {
        Self {
            success: true,
            url,
            analysis,
            analyzed_at: Utc::now(),
        }
    }

    pub fn keywords(&self) -> KeywordAnalysis {
        KeywordAnalysis::from(&self.analysis)
    }
}

/// `2026-10-16T08:30:00.123Z`
fn iso_millis<S: Serializer>(at: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
