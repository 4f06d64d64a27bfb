//! `Accept` and `If-None-Match` handling for the spec endpoint.

/// Serialization of the served document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Json,
    Yaml,
}

/// Outcome of content negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Negotiated {
    pub format: SpecFormat,
    /// Value for the `Content-Type` response header.
    pub content_type: &'static str,
}

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// YAML media types in preference order. The first one is the canonical
/// content type.
pub const YAML_MEDIA_TYPES: [&str; 4] = [
    "application/yaml",
    "application/x-yaml",
    "text/yaml",
    "text/x-yaml",
];

const JSON: Negotiated = Negotiated {
    format: SpecFormat::Json,
    content_type: JSON_MEDIA_TYPE,
};

struct MediaRange {
    kind: String,
    subtype: String,
    q: f32,
}

impl MediaRange {
    /// How specifically this range names `kind/subtype`: 3 for an exact
    /// match, 2 for `kind/*`, 1 for `*/*`.
    fn specificity(&self, kind: &str, subtype: &str) -> Option<u8> {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", "*") => Some(1),
            (k, "*") if k == kind => Some(2),
            (k, s) if k == kind && s == subtype => Some(3),
            _ => None,
        }
    }
}

fn parse_accept(header: &str) -> Vec<MediaRange> {
    header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let media = parts.next()?.trim().to_ascii_lowercase();
            let (kind, subtype) = media.split_once('/')?;
            let mut q = 1.0;
            for param in parts {
                if let Some((name, value)) = param.split_once('=') {
                    if name.trim().eq_ignore_ascii_case("q") {
                        q = value.trim().parse::<f32>().unwrap_or(0.0).clamp(0.0, 1.0);
                    }
                }
            }
            Some(MediaRange {
                kind: kind.trim().to_string(),
                subtype: subtype.trim().to_string(),
                q,
            })
        })
        .collect()
}

/// Quality the client assigns to `media_type`, taken from the most specific
/// range that covers it.
fn quality(ranges: &[MediaRange], media_type: &str) -> f32 {
    let Some((kind, subtype)) = media_type.split_once('/') else {
        return 0.0;
    };
    ranges
        .iter()
        .filter_map(|r| r.specificity(kind, subtype).map(|s| (s, r.q)))
        .max_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)))
        .map_or(0.0, |(_, q)| q)
}

/// Pick JSON or YAML for an `Accept` header value.
///
/// JSON wins ties and is the answer when the header is absent, empty or
/// accepts neither.
pub fn negotiate(accept: Option<&str>) -> Negotiated {
    let Some(accept) = accept.filter(|a| !a.trim().is_empty()) else {
        return JSON;
    };
    let ranges = parse_accept(accept);
    let json_q = quality(&ranges, JSON_MEDIA_TYPE);

    let mut best: Option<(&'static str, f32)> = None;
    for candidate in YAML_MEDIA_TYPES {
        let q = quality(&ranges, candidate);
        if q > best.map_or(0.0, |(_, q)| q) {
            best = Some((candidate, q));
        }
    }

    match best {
        Some((content_type, yaml_q)) if yaml_q > json_q => Negotiated {
            format: SpecFormat::Yaml,
            content_type,
        },
        _ => JSON,
    }
}

/// Weak comparison of an `If-None-Match` value against our entity tag.
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    let ours = strip_weak(etag.trim());
    if_none_match.split(',').map(str::trim).any(|candidate| {
        candidate == "*" || (!candidate.is_empty() && strip_weak(candidate) == ours)
    })
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_or_wildcard_is_json() {
        assert_eq!(negotiate(None), JSON);
        assert_eq!(negotiate(Some("")), JSON);
        assert_eq!(negotiate(Some("*/*")), JSON);
        assert_eq!(negotiate(Some("application/*")), JSON);
    }

    #[test]
    fn yaml_variants_are_echoed() {
        assert_eq!(negotiate(Some("application/yaml")).format, SpecFormat::Yaml);
        assert_eq!(negotiate(Some("text/x-yaml")).content_type, "text/x-yaml");
        assert_eq!(negotiate(Some("Application/X-YAML")).content_type, "application/x-yaml");
    }

    #[test]
    fn q_values_decide() {
        let n = negotiate(Some("application/json;q=0.5, application/yaml;q=0.9"));
        assert_eq!(n.format, SpecFormat::Yaml);
        let n = negotiate(Some("application/json, application/yaml"));
        assert_eq!(n.format, SpecFormat::Json);
        let n = negotiate(Some("application/json;q=0, */*"));
        assert_eq!(n.content_type, "application/yaml");
        let n = negotiate(Some("application/json;q=0, text/*"));
        assert_eq!(n.content_type, "text/yaml");
    }

    #[test]
    fn if_none_match_forms() {
        let etag = "\"abc\"";
        assert!(etag_matches("\"abc\"", etag));
        assert!(etag_matches("\"x\", W/\"abc\"", etag));
        assert!(etag_matches("*", etag));
        assert!(!etag_matches("\"abcd\"", etag));
        assert!(!etag_matches("", etag));
    }
}
