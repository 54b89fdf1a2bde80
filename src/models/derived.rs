//! Derived-field computation
//!
//! Recomputed on every draft change. A derived field is `null` whenever one
//! of its inputs is missing or not numeric.

use serde_json::{Map, Number, Value};

use super::log_kind::LogKind;

/// Read a number from a JSON number or a numeric string
pub fn numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn number_or_null(value: Option<f64>) -> Value {
    value
        .map(round2)
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

fn difference(record: &Map<String, Value>, minuend: &str, subtrahend: &str) -> Value {
    let result = numeric(record.get(minuend))
        .zip(numeric(record.get(subtrahend)))
        .map(|(a, b)| a - b);
    number_or_null(result)
}

/// Fill in every derived field of `record` for its log kind
pub fn apply_derived(kind: LogKind, record: &mut Map<String, Value>) {
    match kind {
        LogKind::Ditching => {
            let variance = difference(record, "actual_depth", "specified_depth");
            let bags_per_pier = numeric(record.get("total_bags"))
                .zip(numeric(record.get("pier_count")).filter(|piers| *piers > 0.0))
                .map(|(bags, piers)| bags / piers);

            record.insert("depth_variance".into(), variance);
            record.insert("bags_per_pier".into(), number_or_null(bags_per_pier));
        }
        LogKind::Hydrotest => {
            let variance = difference(record, "test_pressure", "target_pressure");
            record.insert("pressure_variance".into(), variance);
        }
        LogKind::Cleanup => {
            let total = numeric(record.get("seed_rate"))
                .zip(numeric(record.get("seeded_area")))
                .map(|(rate, area)| rate * area);
            record.insert("total_seed_used".into(), number_or_null(total));
        }
        LogKind::Clearing
        | LogKind::Grading
        | LogKind::Hdd
        | LogKind::Hydrovac
        | LogKind::TieIn => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_numeric_parsing() {
        assert_eq!(numeric(Some(&json!(2))), Some(2.0));
        assert_eq!(numeric(Some(&json!(" 1.5 "))), Some(1.5));
        assert_eq!(numeric(Some(&json!(""))), None);
        assert_eq!(numeric(Some(&json!("deep"))), None);
        assert_eq!(numeric(Some(&json!(true))), None);
        assert_eq!(numeric(None), None);
    }

    #[test]
    fn test_ditch_variance_and_bags() {
        let mut r = record(json!({
            "specified_depth": "1.2",
            "actual_depth": 1.35,
            "total_bags": "25",
            "pier_count": 4,
        }));
        apply_derived(LogKind::Ditching, &mut r);

        assert_eq!(r["depth_variance"], json!(0.15));
        assert_eq!(r["bags_per_pier"], json!(6.25));
    }

    #[test]
    fn test_zero_piers_yields_null() {
        let mut r = record(json!({ "total_bags": 10, "pier_count": "0" }));
        apply_derived(LogKind::Ditching, &mut r);
        assert_eq!(r["bags_per_pier"], Value::Null);
        assert_eq!(r["depth_variance"], Value::Null);
    }

    #[test]
    fn test_hydrotest_pressure_variance() {
        let mut r = record(json!({ "target_pressure": 9930, "test_pressure": "9875.5" }));
        apply_derived(LogKind::Hydrotest, &mut r);
        assert_eq!(r["pressure_variance"], json!(-54.5));
    }

    #[test]
    fn test_cleanup_total_seed() {
        let mut r = record(json!({ "seed_rate": "12.5", "seeded_area": 3.2 }));
        apply_derived(LogKind::Cleanup, &mut r);
        assert_eq!(r["total_seed_used"], json!(40.0));
    }

    #[test]
    fn test_kinds_without_derivations_untouched() {
        let mut r = record(json!({ "bore_length": "120" }));
        apply_derived(LogKind::Hdd, &mut r);
        assert_eq!(r.len(), 1);
    }
}
