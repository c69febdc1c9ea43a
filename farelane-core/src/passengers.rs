use farelane_shared::PassengerCounts;
use serde_json::{Map, Value};
use tracing::debug;

const COUNT_KEYS: [&str; 3] = ["adults", "children", "infants"];

/// Places a passenger object may live in a raw payload, probed in order
/// after the payload itself.
const PROBE_PATHS: &[&[&str]] = &[
    &["passengers"],
    &["passenger"],
    &["passenger_count"],
    &["data", "passenger_count"],
];

/// Resolve passenger counts from a raw payload.
///
/// `last_requested` is what the traveller asked for most recently. The
/// backend does not always echo passengers back, so when the two disagree
/// the request wins.
pub fn reconcile(
    candidate: Option<&Value>,
    last_requested: Option<&PassengerCounts>,
) -> Option<PassengerCounts> {
    let extracted = candidate.filter(|v| !v.is_null()).map(extract);

    match (extracted, last_requested) {
        (Some(found), Some(requested)) if found != *requested => {
            debug!(
                "Server passenger echo {:?} differs from request {:?}, keeping request",
                found, requested
            );
            Some(*requested)
        }
        (Some(found), _) => Some(found),
        (None, requested) => requested.copied(),
    }
}

/// Counts found in `raw`, all zero when nothing passenger-like is present.
pub fn extract(raw: &Value) -> PassengerCounts {
    let Some(source) = locate(raw) else {
        return PassengerCounts::default();
    };
    if source.is_empty() {
        return PassengerCounts::default();
    }

    let field = |key: &str| source.get(key).map(coerce).unwrap_or(0);
    let counts = PassengerCounts::new(field("adults"), field("children"), field("infants"));
    if counts.is_empty() {
        // something was sent, so at least the searcher travels
        PassengerCounts::single_adult()
    } else {
        counts
    }
}

fn locate(raw: &Value) -> Option<&Map<String, Value>> {
    let obj = raw.as_object()?;
    if COUNT_KEYS.iter().any(|key| obj.contains_key(*key)) {
        return Some(obj);
    }
    PROBE_PATHS.iter().find_map(|path| {
        path.iter()
            .try_fold(raw, |node, key| node.get(*key))
            .and_then(Value::as_object)
    })
}

/// Numbers or numeric strings; negatives and junk become 0.
fn coerce(value: &Value) -> u32 {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if n.is_finite() && n > 0.0 => n.min(u32::MAX as f64) as u32,
        _ => 0,
    }
}
