//! Media type negotiation.
//!
//! Routes declare what they consume and produce; these helpers decide
//! whether a request's `Content-Type` and `Accept` headers are compatible
//! with those declarations. Media types compare without their parameters
//! and ignoring ASCII case.

/// Media type matching anything.
pub const ANY: &str = "*/*";

/// JSON media type.
pub const APPLICATION_JSON: &str = "application/json";
/// XML media type.
pub const APPLICATION_XML: &str = "application/xml";
/// Plain text media type.
pub const TEXT_PLAIN: &str = "text/plain";
/// Form media type.
pub const APPLICATION_FORM: &str = "application/x-www-form-urlencoded";

/// Returns the media type without parameters, lowercased.
///
/// ```
/// assert_eq!(oxide_rest::mime::essence("Text/HTML; charset=utf-8"), "text/html");
/// ```
#[must_use]
pub fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// One entry of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    essence: String,
    quality: f32,
}

impl MediaRange {
    /// Returns the media range without parameters.
    #[must_use]
    pub fn essence(&self) -> &str {
        &self.essence
    }

    /// Returns the `q` weight, `1.0` when absent or malformed.
    #[must_use]
    pub const fn quality(&self) -> f32 {
        self.quality
    }

    /// Returns whether this range admits a concrete media type.
    #[must_use]
    pub fn admits(&self, media_type: &str) -> bool {
        let media_type = essence(media_type);
        if self.essence == ANY || self.essence == media_type {
            return true;
        }
        match self.essence.strip_suffix("/*") {
            Some(kind) => media_type
                .split_once('/')
                .is_some_and(|(other, _)| other == kind),
            None => false,
        }
    }

    /// 2 for a concrete type, 1 for `type/*`, 0 for `*/*`.
    fn specificity(&self) -> u8 {
        if self.essence == ANY {
            0
        } else if self.essence.ends_with("/*") {
            1
        } else {
            2
        }
    }
}

/// Returns the weight the client gives `media_type`, taken from the most
/// specific range admitting it; `None` when no range does.
fn quality_of(ranges: &[MediaRange], media_type: &str) -> Option<f32> {
    ranges
        .iter()
        .filter(|r| r.admits(media_type))
        .fold(None, |best: Option<&MediaRange>, r| match best {
            Some(b) if b.specificity() >= r.specificity() => Some(b),
            _ => Some(r),
        })
        .map(MediaRange::quality)
}

/// Parses an `Accept` header into media ranges, in header order.
#[must_use]
pub fn parse_accept(accept: &str) -> Vec<MediaRange> {
    accept
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let essence = parts.next()?.trim().to_ascii_lowercase();
            if essence.is_empty() {
                return None;
            }
            let quality = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            Some(MediaRange { essence, quality })
        })
        .collect()
}

/// Returns whether a route consuming `declared` accepts `content_type`.
///
/// An empty declaration accepts anything, as does one containing `*/*`.
#[must_use]
pub fn consumes(declared: &[String], content_type: &str) -> bool {
    if declared.is_empty() {
        return true;
    }
    let wanted = essence(content_type);
    declared
        .iter()
        .any(|d| d == ANY || essence(d) == wanted)
}

/// Returns whether a route producing `declared` can satisfy `accept`.
///
/// An empty declaration or one containing `*/*` satisfies any client.
/// Each produced type is weighed by the most specific range admitting it,
/// so `application/json;q=0, */*` refuses JSON.
#[must_use]
pub fn produces(declared: &[String], accept: &str) -> bool {
    if declared.is_empty() || declared.iter().any(|d| d == ANY) {
        return true;
    }
    let ranges = parse_accept(accept);
    if ranges.is_empty() {
        return true;
    }
    declared
        .iter()
        .any(|produced| quality_of(&ranges, produced).is_some_and(|q| q > 0.0))
}

/// Picks the produced media type the client prefers.
///
/// Ties in quality are broken by declaration order. Returns `None` when
/// nothing declared is acceptable.
#[must_use]
pub fn preferred<'a>(declared: &'a [String], accept: Option<&str>) -> Option<&'a str> {
    let Some(accept) = accept else {
        return declared.first().map(String::as_str);
    };
    let ranges = parse_accept(accept);
    if ranges.is_empty() {
        return declared.first().map(String::as_str);
    }

    let mut best: Option<(&str, f32)> = None;
    for produced in declared {
        if let Some(q) = quality_of(&ranges, produced).filter(|q| *q > 0.0) {
            if best.map_or(true, |(_, b)| q > b) {
                best = Some((produced.as_str(), q));
            }
        }
    }
    best.map(|(media_type, _)| media_type)
}
