//! Rate listing parser

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::client::FetchError;

#[derive(Clone, Copy, PartialEq)]
enum Field {
    Iso,
    Rate,
}

/// Extract the rate for `currency` from an `ExchangeRatesLatest` response
///
/// Elements are matched by local name so the SOAP and service namespace
/// prefixes do not matter.
pub fn parse_rate(xml: &str, currency: &str) -> Result<f64, FetchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_entry = false;
    let mut field: Option<Field> = None;
    let mut iso: Option<String> = None;
    let mut rate: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ExchangeRate" => {
                    in_entry = true;
                    iso = None;
                    rate = None;
                }
                b"ISO" if in_entry => field = Some(Field::Iso),
                b"Rate" if in_entry => field = Some(Field::Rate),
                _ => field = None,
            },
            Ok(Event::Text(t)) => {
                if let Some(f) = field {
                    let text = t
                        .unescape()
                        .map_err(|e| FetchError::Xml(e.to_string()))?
                        .trim()
                        .to_string();
                    match f {
                        Field::Iso => iso = Some(text),
                        Field::Rate => rate = Some(text),
                    }
                }
            }
            Ok(Event::End(e)) => {
                field = None;
                if e.local_name().as_ref() == b"ExchangeRate" {
                    in_entry = false;
                    if iso.as_deref() == Some(currency) {
                        let raw = rate.take().unwrap_or_default();
                        return raw
                            .parse::<f64>()
                            .ok()
                            .filter(|r| r.is_finite())
                            .ok_or(FetchError::InvalidRate(raw));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(FetchError::Xml(e.to_string())),
        }
    }

    Err(FetchError::MissingCurrency(currency.to_string()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a response envelope shaped like the CBA service output
    pub(crate) fn sample_response(entries: &[(&str, &str)]) -> String {
        let rates: String = entries
            .iter()
            .map(|(iso, rate)| {
                format!(
                    "<ExchangeRate><ISO>{}</ISO><Amount>1</Amount><Rate>{}</Rate>\
                     <Difference>0.12</Difference></ExchangeRate>",
                    iso, rate
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
    <ExchangeRatesLatestResponse xmlns="http://www.cba.am/">
      <ExchangeRatesLatestResult>
        <CurrentDate>2024-05-02T00:00:00</CurrentDate>
        <Rates>{}</Rates>
      </ExchangeRatesLatestResult>
    </ExchangeRatesLatestResponse>
  </soap:Body>
</soap:Envelope>"#,
            rates
        )
    }

    #[test]
    fn test_parse_target_currency() {
        let xml = sample_response(&[("USD", "387.5"), ("EUR", "420.31"), ("RUB", "4.22")]);
        assert_eq!(parse_rate(&xml, "EUR").unwrap(), 420.31);
        assert_eq!(parse_rate(&xml, "USD").unwrap(), 387.5);
    }

    #[test]
    fn test_missing_currency() {
        let xml = sample_response(&[("USD", "387.5")]);
        let err = parse_rate(&xml, "EUR").unwrap_err();
        assert!(matches!(err, FetchError::MissingCurrency(ref c) if c == "EUR"));
    }

    #[test]
    fn test_unparsable_rate() {
        let xml = sample_response(&[("EUR", "n/a")]);
        assert!(matches!(
            parse_rate(&xml, "EUR"),
            Err(FetchError::InvalidRate(_))
        ));
    }

    #[test]
    fn test_malformed_xml() {
        let result = parse_rate("<Rates><ExchangeRate><ISO>EUR</ISO></Rates>", "EUR");
        assert!(matches!(result, Err(FetchError::Xml(_))));
    }

    #[test]
    fn test_prefixed_elements() {
        let xml = r#"<s:Envelope xmlns:s="x" xmlns:c="y"><s:Body>
            <c:ExchangeRate><c:ISO>EUR</c:ISO><c:Rate>431.07</c:Rate></c:ExchangeRate>
            </s:Body></s:Envelope>"#;
        assert_eq!(parse_rate(xml, "EUR").unwrap(), 431.07);
    }
}
