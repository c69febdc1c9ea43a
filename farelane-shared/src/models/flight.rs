use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One bookable flight leg as returned by the search backend.
///
/// Records are built once by the normalizer and never mutated afterwards.
/// Only the id and `pricing.grand_total` are mandatory; everything else
/// falls back to an empty value when the backend omits it, sends `null`
/// or sends a different JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFlightRecord")]
pub struct FlightRecord {
    pub flight_id: i64,
    pub flight_number: String,
    pub airline_id: Option<i64>,
    pub airline_name: String,
    pub departure_airport_code: String,
    pub departure_airport_name: String,
    pub arrival_airport_code: String,
    pub arrival_airport_name: String,
    pub departure_time: String, // ISO 8601, origin timezone
    pub arrival_time: String,
    pub duration_minutes: u32,
    pub stops: u32,
    pub fare_class: FareClass,
    pub pricing: Pricing,
}

/// Wire form of a record. `flight_id` wins over `id`, and
/// `duration_minutes`/`stops` over their older names.
#[derive(Deserialize)]
struct RawFlightRecord {
    #[serde(default)]
    flight_id: Value,
    #[serde(default)]
    id: Value,
    #[serde(default, deserialize_with = "text")]
    flight_number: String,
    #[serde(default)]
    airline_id: Value,
    #[serde(default, deserialize_with = "text")]
    airline_name: String,
    #[serde(default, deserialize_with = "text")]
    departure_airport_code: String,
    #[serde(default, deserialize_with = "text")]
    departure_airport_name: String,
    #[serde(default, deserialize_with = "text")]
    arrival_airport_code: String,
    #[serde(default, deserialize_with = "text")]
    arrival_airport_name: String,
    #[serde(default, deserialize_with = "text")]
    departure_time: String,
    #[serde(default, deserialize_with = "text")]
    arrival_time: String,
    #[serde(default)]
    duration_minutes: Value,
    #[serde(default)]
    duration: Value,
    #[serde(default)]
    stops: Value,
    #[serde(default)]
    stop_count: Value,
    #[serde(default, deserialize_with = "or_default")]
    fare_class: FareClass,
    pricing: Pricing,
}

impl TryFrom<RawFlightRecord> for FlightRecord {
    type Error = String;

    fn try_from(raw: RawFlightRecord) -> Result<Self, Self::Error> {
        let flight_id = parse_integer(&raw.flight_id)
            .or_else(|| parse_integer(&raw.id))
            .ok_or_else(|| format!("flight record has no usable id: {} / {}", raw.flight_id, raw.id))?;
        Ok(FlightRecord {
            flight_id,
            flight_number: raw.flight_number,
            airline_id: parse_integer(&raw.airline_id),
            airline_name: raw.airline_name,
            departure_airport_code: raw.departure_airport_code,
            departure_airport_name: raw.departure_airport_name,
            arrival_airport_code: raw.arrival_airport_code,
            arrival_airport_name: raw.arrival_airport_name,
            departure_time: raw.departure_time,
            arrival_time: raw.arrival_time,
            duration_minutes: parse_count(&raw.duration_minutes)
                .or_else(|| parse_count(&raw.duration))
                .unwrap_or(0),
            stops: parse_count(&raw.stops).or_else(|| parse_count(&raw.stop_count)).unwrap_or(0),
            fare_class: raw.fare_class,
            pricing: raw.pricing,
        })
    }
}

impl FlightRecord {
    pub fn grand_total(&self) -> f64 {
        self.pricing.grand_total
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FareClass {
    #[serde(default, deserialize_with = "text")]
    pub code: String,
    #[serde(default, deserialize_with = "text")]
    pub cabin_class: String,
    #[serde(default, deserialize_with = "or_default")]
    pub refundable: bool,
    #[serde(default, deserialize_with = "or_default")]
    pub changeable: bool,
    #[serde(default, deserialize_with = "text")]
    pub baggage_allowance: String,
    #[serde(default, deserialize_with = "text")]
    pub policy: String,
}

/// Prices are kept exactly as the backend sent them (minor units or not).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default, deserialize_with = "or_default")]
    pub base_price: PassengerPrices,
    #[serde(default, deserialize_with = "or_default")]
    pub total_price: PassengerPrices,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub adult_tax: f64,
    #[serde(deserialize_with = "required_amount")]
    pub grand_total: f64,
    #[serde(default, deserialize_with = "text")]
    pub currency: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassengerPrices {
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub adult: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub child: f64,
    #[serde(default, deserialize_with = "amount_or_zero")]
    pub infant: f64,
}

fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    amount.is_finite().then_some(amount)
}

fn required_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_amount(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("grand_total is not numeric: {}", value)))
}

fn amount_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_amount(&value).unwrap_or(0.0))
}

/// Whole numbers from integers, integral floats or numeric strings.
fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// Non-negative counts; fractional values are rounded.
fn parse_count(value: &Value) -> Option<u32> {
    let amount = parse_amount(value)?;
    (amount >= 0.0 && amount <= f64::from(u32::MAX)).then(|| amount.round() as u32)
}

fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// `null` or a value of the wrong shape reads as the default.
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}
