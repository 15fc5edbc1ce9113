//! MarshalCodec: capability-aware JSON value codec
//!
//! Values serialize to a JSON body in which every capability reference is
//! replaced by a slot index into `CapData::refs`. Kinds JSON cannot express
//! natively travel as `@qclass` records:
//!
//! | Value | Body |
//! |-------|------|
//! | undefined | `{"@qclass":"undefined"}` |
//! | NaN, ±Infinity | `{"@qclass":"NaN"}`, `{"@qclass":"Infinity"}`, `{"@qclass":"-Infinity"}` |
//! | bigint | `{"@qclass":"bigint","digits":"-12"}` |
//! | symbol | `{"@qclass":"symbol","name":"foo"}` |
//! | capability reference | `{"@qclass":"slot","index":0}` |
//!
//! Records may not use `@qclass` as a field name. Each distinct reference
//! occupies one slot, in order of first appearance.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use rustc_hash::FxHashMap;
use serde_json::{Map, Number, Value as Json};

use ordcoll_core::{CapData, CapRef, Error, Result, Value, ValueCodec};

const QCLASS: &str = "@qclass";

/// JSON value codec with slot-indexed capability references
#[derive(Debug, Clone, Copy, Default)]
pub struct MarshalCodec;

impl MarshalCodec {
    /// Create a codec
    pub fn new() -> Self {
        MarshalCodec
    }
}

impl ValueCodec for MarshalCodec {
    fn serialize(&self, value: &Value) -> Result<CapData> {
        let mut slots = SlotTable::default();
        let body = encode(value, &mut slots)?;
        Ok(CapData::new(serde_json::to_string(&body)?, slots.refs))
    }

    fn deserialize(&self, data: &CapData) -> Result<Value> {
        let body: Json = serde_json::from_str(&data.body)?;
        decode(&body, &data.refs)
    }
}

#[derive(Default)]
struct SlotTable {
    refs: Vec<CapRef>,
    index: FxHashMap<CapRef, usize>,
}

impl SlotTable {
    fn slot_for(&mut self, cap: &CapRef) -> usize {
        if let Some(&i) = self.index.get(cap) {
            return i;
        }
        let i = self.refs.len();
        self.refs.push(cap.clone());
        self.index.insert(cap.clone(), i);
        i
    }
}

fn qclass(name: &str) -> Map<String, Json> {
    let mut m = Map::new();
    m.insert(QCLASS.to_string(), Json::String(name.to_string()));
    m
}

fn encode(value: &Value, slots: &mut SlotTable) -> Result<Json> {
    Ok(match value {
        Value::Null => Json::Null,
        Value::Undefined => Json::Object(qclass("undefined")),
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => match Number::from_f64(*n) {
            Some(num) => Json::Number(num),
            None if n.is_nan() => Json::Object(qclass("NaN")),
            None if *n > 0.0 => Json::Object(qclass("Infinity")),
            None => Json::Object(qclass("-Infinity")),
        },
        Value::String(s) => Json::String(s.clone()),
        Value::BigInt(n) => {
            let mut m = qclass("bigint");
            m.insert("digits".to_string(), Json::String(n.to_string()));
            Json::Object(m)
        }
        Value::Symbol(name) => {
            let mut m = qclass("symbol");
            m.insert("name".to_string(), Json::String(name.clone()));
            Json::Object(m)
        }
        Value::CapRef(cap) => {
            let mut m = qclass("slot");
            m.insert("index".to_string(), Json::from(slots.slot_for(cap)));
            Json::Object(m)
        }
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|v| encode(v, slots))
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Record(fields) => {
            let mut m = Map::new();
            for (name, v) in fields {
                if name == QCLASS {
                    return Err(Error::Serialization(format!(
                        "record field name {:?} is reserved",
                        QCLASS
                    )));
                }
                m.insert(name.clone(), encode(v, slots)?);
            }
            Json::Object(m)
        }
    })
}

fn decode(body: &Json, refs: &[CapRef]) -> Result<Value> {
    Ok(match body {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(
            n.as_f64()
                .ok_or_else(|| Error::Serialization(format!("unrepresentable number {}", n)))?,
        ),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(
            items
                .iter()
                .map(|v| decode(v, refs))
                .collect::<Result<Vec<_>>>()?,
        ),
        Json::Object(m) => match m.get(QCLASS) {
            Some(Json::String(class)) => decode_qclass(class, m, refs)?,
            Some(other) => {
                return Err(Error::Serialization(format!(
                    "malformed {} tag {}",
                    QCLASS, other
                )))
            }
            None => {
                let mut fields = BTreeMap::new();
                for (name, v) in m {
                    fields.insert(name.clone(), decode(v, refs)?);
                }
                Value::Record(fields)
            }
        },
    })
}

fn decode_qclass(class: &str, m: &Map<String, Json>, refs: &[CapRef]) -> Result<Value> {
    let field = |name: &str| {
        m.get(name)
            .ok_or_else(|| Error::Serialization(format!("{} record missing {:?}", class, name)))
    };
    Ok(match class {
        "undefined" => Value::Undefined,
        "NaN" => Value::Number(f64::NAN),
        "Infinity" => Value::Number(f64::INFINITY),
        "-Infinity" => Value::Number(f64::NEG_INFINITY),
        "bigint" => {
            let digits = field("digits")?
                .as_str()
                .ok_or_else(|| Error::Serialization("bigint digits must be a string".into()))?;
            let n: BigInt = digits
                .parse()
                .map_err(|_| Error::Serialization(format!("invalid bigint digits {:?}", digits)))?;
            Value::BigInt(n)
        }
        "symbol" => {
            let name = field("name")?
                .as_str()
                .ok_or_else(|| Error::Serialization("symbol name must be a string".into()))?;
            Value::Symbol(name.to_string())
        }
        "slot" => {
            let index = field("index")?
                .as_u64()
                .ok_or_else(|| Error::Serialization("slot index must be an integer".into()))?;
            let cap = refs.get(index as usize).ok_or_else(|| {
                Error::Serialization(format!(
                    "slot index {} out of range ({} refs)",
                    index,
                    refs.len()
                ))
            })?;
            Value::CapRef(cap.clone())
        }
        other => {
            return Err(Error::Serialization(format!(
                "unknown {} {:?}",
                QCLASS, other
            )))
        }
    })
}
