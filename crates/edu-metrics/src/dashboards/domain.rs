use chrono::NaiveDate;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Bucket for records whose representative field is absent or blank.
pub const UNKNOWN_REP: &str = "Unknown";

/// Marketing origin of a lead, reduced to a fixed vocabulary.
///
/// Source feeds spell channels inconsistently ("FB Ads", "fb", "Facebook
/// Campaign"), so every comparison and grouping in the crate goes through
/// [`Channel::normalize`]. Text that matches no rule is carried verbatim in
/// `Other` so caller-specific channels survive grouping unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    Facebook,
    TikTok,
    WalkIn,
    Instagram,
    Google,
    Referral,
    Unknown,
    Other(String),
}

impl Channel {
    /// The recognized vocabulary, in display order.
    pub fn fixed() -> [Self; 7] {
        [
            Self::Facebook,
            Self::TikTok,
            Self::WalkIn,
            Self::Instagram,
            Self::Google,
            Self::Referral,
            Self::Unknown,
        ]
    }

    /// Maps raw channel text onto the vocabulary. First matching substring
    /// rule wins; unmatched text passes through trimmed with its case kept.
    /// Normalizing an already-normalized label is a no-op.
    pub fn normalize(raw: Option<&str>) -> Self {
        let trimmed = match raw {
            Some(value) => value.trim(),
            None => return Self::Unknown,
        };
        let lower = trimmed.to_lowercase();

        if lower.contains("facebook") || lower.contains("fb") {
            return Self::Facebook;
        }
        if lower.contains("tiktok") {
            return Self::TikTok;
        }
        if lower.contains("walk") {
            return Self::WalkIn;
        }
        if lower.contains("instagram") || lower.contains("ig") || lower.contains("insta") {
            return Self::Instagram;
        }
        if lower.contains("google") || lower.contains("search") {
            return Self::Google;
        }
        if lower.contains("referral") || lower.contains("refer") {
            return Self::Referral;
        }
        if lower.is_empty() || lower == "other" || lower == "unknown" {
            return Self::Unknown;
        }

        Self::Other(trimmed.to_string())
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Facebook => "Facebook",
            Self::TikTok => "TikTok",
            Self::WalkIn => "Walk-in",
            Self::Instagram => "Instagram",
            Self::Google => "Google",
            Self::Referral => "Referral",
            Self::Unknown => "Unknown",
            Self::Other(text) => text,
        }
    }
}

impl Serialize for Channel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Channel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Channel::normalize(raw.as_deref()))
    }
}

/// Inclusive [start, end] reporting window. `start <= end` is the caller's
/// responsibility; an inverted range simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Set of normalized channels a record must belong to. An empty filter
/// admits nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    channels: BTreeSet<Channel>,
}

impl SourceFilter {
    /// Builds a filter from raw channel labels, normalizing each entry so
    /// membership checks and grouping keys can never diverge.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let channels = labels
            .into_iter()
            .map(|label| Channel::normalize(Some(label.as_ref())))
            .collect();
        Self { channels }
    }

    pub fn insert(&mut self, channel: Channel) {
        self.channels.insert(channel);
    }

    pub fn contains(&self, channel: &Channel) -> bool {
        self.channels.contains(channel)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }
}

/// One row of the marketing spend feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRecord {
    pub period: Option<NaiveDate>,
    pub channel: Channel,
    pub amount: f64,
}

/// One row of the marketing lead feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub date: Option<NaiveDate>,
    pub channel: Channel,
    pub client_id: Option<String>,
    pub stage: Option<String>,
    pub student_name: Option<String>,
}

/// One row of the call-center activity feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub date: Option<NaiveDate>,
    pub channel: Channel,
    pub client_id: Option<String>,
    pub status: Option<String>,
    pub stage: Option<String>,
    pub rep: Option<String>,
    pub visa_outcome: Option<String>,
    pub loss_reason: Option<String>,
    pub student_name: Option<String>,
}

/// One row of the sales/visa pipeline feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: Option<NaiveDate>,
    pub status_date: Option<NaiveDate>,
    pub stage_start: Option<NaiveDate>,
    pub channel: Channel,
    pub client_id: Option<String>,
    pub outcome: Option<String>,
    pub visa_outcome: Option<String>,
    pub current_stage: Option<String>,
    pub rep: Option<String>,
    pub student_name: Option<String>,
}

/// Records with a date field the reporting window applies to.
pub trait Dated {
    fn relevant_date(&self) -> Option<NaiveDate>;
}

/// Records carrying a normalized marketing channel.
pub trait Sourced {
    fn channel(&self) -> &Channel;
}

impl Dated for SpendRecord {
    fn relevant_date(&self) -> Option<NaiveDate> {
        self.period
    }
}

impl Dated for LeadRecord {
    fn relevant_date(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl Dated for CallRecord {
    fn relevant_date(&self) -> Option<NaiveDate> {
        self.date
    }
}

impl Dated for SalesRecord {
    // "In period" means "status changed in period" when the feed carries a
    // status date; older exports only have the generic date.
    fn relevant_date(&self) -> Option<NaiveDate> {
        self.status_date.or(self.date)
    }
}

impl Sourced for SpendRecord {
    fn channel(&self) -> &Channel {
        &self.channel
    }
}

impl Sourced for LeadRecord {
    fn channel(&self) -> &Channel {
        &self.channel
    }
}

impl Sourced for CallRecord {
    fn channel(&self) -> &Channel {
        &self.channel
    }
}

impl Sourced for SalesRecord {
    fn channel(&self) -> &Channel {
        &self.channel
    }
}

/// Recognized sales pipeline stages, each with its SLA target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    OfferPending,
    GteReview,
    CoeRequest,
    VisaLodged,
}

impl PipelineStage {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::OfferPending,
            Self::GteReview,
            Self::CoeRequest,
            Self::VisaLodged,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::OfferPending => "Offer Pending",
            Self::GteReview => "GTE Review",
            Self::CoeRequest => "COE Request",
            Self::VisaLodged => "Visa Lodged",
        }
    }

    /// Days a file may sit in the stage before it counts as overdue.
    pub const fn target_days(self) -> i64 {
        match self {
            Self::OfferPending => 3,
            Self::GteReview => 5,
            Self::CoeRequest => 4,
            Self::VisaLodged => 7,
        }
    }

    /// Case-insensitive exact match against the stage label. Unrecognized
    /// stage text stays out of the stage view entirely.
    pub fn from_label(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ordered()
            .into_iter()
            .find(|stage| stage.label().eq_ignore_ascii_case(trimmed))
    }
}

/// Representative display name with the blank fallback applied.
pub(crate) fn rep_name(raw: &Option<String>) -> &str {
    match raw.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => UNKNOWN_REP,
    }
}
