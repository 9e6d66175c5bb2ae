use yoink_api::{Content, ContentValue};

use crate::error::YoinkError;
use crate::params::RawParams;

/// `i64::MIN as f64` and `-(i64::MIN as f64)`: the integral floats that
/// convert to `i64` without saturating.
const I64_LOWER: f64 = -9_223_372_036_854_775_808.0;
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

/// Infer the kind of one raw value: float, then integer, then string.
///
/// A float whose shortest decimal form is integral (`7`, `007`, `7.0`,
/// `1e5`) is an integer reading. Non-finite spellings (`inf`, `NaN`) have
/// no JSON number form and stay strings, as do hex and padded values.
pub fn infer_value(raw: &str) -> ContentValue {
    if let Ok(f) = raw.parse::<f64>() {
        if f.is_finite() {
            return from_float(raw, f);
        }
    }
    if let Ok(i) = raw.parse::<i64>() {
        return ContentValue::Integer(i);
    }
    ContentValue::Text(raw.to_string())
}

fn from_float(raw: &str, f: f64) -> ContentValue {
    if f.fract() != 0.0 {
        return ContentValue::Float(f);
    }
    // Exact parse first so integers past 2^53 keep every digit.
    if let Ok(i) = raw.parse::<i64>() {
        return ContentValue::Integer(i);
    }
    if (I64_LOWER..I64_UPPER).contains(&f) {
        ContentValue::Integer(f as i64)
    } else {
        ContentValue::Float(f)
    }
}

/// Build the typed content of a publish. Fails on the first key carrying
/// more than one value; nothing partial is returned.
pub fn infer_content(params: &RawParams) -> Result<Content, YoinkError> {
    let mut content = Content::new();
    for (key, values) in params.iter() {
        let [value] = values else {
            return Err(YoinkError::MultiValuedParameter { key: key.to_string() });
        };
        content.insert(key.to_string(), infer_value(value));
    }
    Ok(content)
}

/// Serialize content to the stored document and check it reads back as an
/// object before it goes anywhere near storage.
pub fn encode_content(content: &Content) -> Result<String, YoinkError> {
    let document =
        serde_json::to_string(content).map_err(|e| YoinkError::MalformedContent(e.to_string()))?;
    yoink_api::validate_content(&document)
        .map_err(|e| YoinkError::MalformedContent(e.to_string()))?;
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> ContentValue {
        ContentValue::Text(s.to_string())
    }

    #[test]
    fn floats_integers_and_strings() {
        assert_eq!(infer_value("666.666"), ContentValue::Float(666.666));
        assert_eq!(infer_value("7"), ContentValue::Integer(7));
        assert_eq!(infer_value("discard"), text("discard"));
        assert_eq!(infer_value("-3"), ContentValue::Integer(-3));
        assert_eq!(infer_value("-0.25"), ContentValue::Float(-0.25));
    }

    #[test]
    fn leading_zero_is_still_an_integer() {
        assert_eq!(infer_value("007"), ContentValue::Integer(7));
    }

    #[test]
    fn integral_floats_become_integers() {
        assert_eq!(infer_value("7.0"), ContentValue::Integer(7));
        assert_eq!(infer_value("1e5"), ContentValue::Integer(100_000));
        assert_eq!(infer_value("2.5e1"), ContentValue::Integer(25));
        assert_eq!(infer_value("1.5e-1"), ContentValue::Float(0.15));
    }

    #[test]
    fn large_integers_keep_precision() {
        assert_eq!(
            infer_value("9007199254740993"),
            ContentValue::Integer(9_007_199_254_740_993)
        );
        assert_eq!(infer_value("1e300"), ContentValue::Float(1e300));
        assert_eq!(
            infer_value("12345678901234567890"),
            ContentValue::Float(12_345_678_901_234_567_890.0)
        );
    }

    #[test]
    fn ambiguous_inputs_stay_strings() {
        assert_eq!(infer_value("0x10"), text("0x10"));
        assert_eq!(infer_value(" 7"), text(" 7"));
        assert_eq!(infer_value("7 "), text("7 "));
        assert_eq!(infer_value("true"), text("true"));
        assert_eq!(infer_value("false"), text("false"));
        assert_eq!(infer_value(""), text(""));
    }

    #[test]
    fn non_finite_floats_stay_strings() {
        assert_eq!(infer_value("inf"), text("inf"));
        assert_eq!(infer_value("-infinity"), text("-infinity"));
        assert_eq!(infer_value("NaN"), text("NaN"));
    }

    #[test]
    fn multi_valued_parameter_is_rejected() {
        let params: RawParams = [("a", "1"), ("b", "x"), ("b", "y")].into_iter().collect();
        let err = infer_content(&params).unwrap_err();
        assert!(matches!(err, YoinkError::MultiValuedParameter { ref key } if key == "b"));
    }

    #[test]
    fn document_escapes_keys_and_values() {
        let params: RawParams = [("we\"ird", "a\"b\\c"), ("n", "1.5")].into_iter().collect();
        let content = infer_content(&params).unwrap();
        let doc = encode_content(&content).unwrap();
        assert_eq!(doc, r#"{"n":1.5,"we\"ird":"a\"b\\c"}"#);

        let back: yoink_api::Content = serde_json::from_str(&doc).unwrap();
        assert_eq!(back, content);
    }

    #[test]
    fn empty_params_encode_to_empty_object() {
        let content = infer_content(&RawParams::new()).unwrap();
        assert_eq!(encode_content(&content).unwrap(), "{}");
    }
}
