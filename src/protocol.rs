//! Inbound MooMoo wire protocol.
//!
//! Every server frame is a MessagePack value shaped as `[tag, ...rest]`.
//! Only the resource snapshot packet is understood:
//!
//! | Tag   | Payload                | Meaning                        |
//! |-------|------------------------|--------------------------------|
//! | `"H"` | `rest[0][0]`: numbers  | resource snapshot, 8 per record |
//! | other | –                      | ignored                        |
//!
//! A resource record is positional:
//!
//! ```text
//! [sessionId, x, y, direction, scale, kind, item, owner]
//! ```
//!
//! The field order is the wire contract. Incomplete trailing records are
//! discarded, as are records whose `kind` has no [`Category`].

use rmpv::Value;

use crate::error::DecodeError;
use crate::types::{Category, EntityDescriptor};

/// Tag of the resource snapshot packet.
pub const RESOURCE_TAG: &str = "H";

/// Number of wire values in one resource record.
pub const RECORD_WIDTH: usize = 8;

// ---------------------------------------------------------------------------
// Packets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// `"H"`: a bundle of resource records.
    Resources(ResourceBundle),
    /// Any tag we do not handle. Not an error.
    Ignored { tag: String },
}

/// Decode one raw frame into a [`Packet`].
///
/// Fails only when the bytes are not MessagePack or the value does not have
/// the `[tag, ...]` envelope; unknown tags decode to [`Packet::Ignored`].
/// Binary and extension values are kept as they are, so an opaque `item` or
/// `owner` never spoils the rest of the frame.
pub fn decode_frame(bytes: &[u8]) -> Result<Packet, DecodeError> {
    let value = rmpv::decode::read_value(&mut &bytes[..])?;
    decode_value(value)
}

/// Dispatch an already deserialised frame value.
pub fn decode_value(value: Value) -> Result<Packet, DecodeError> {
    let Value::Array(data) = value else {
        return Err(DecodeError::NotASequence);
    };

    let Some(tag) = data.first().and_then(Value::as_str).map(str::to_owned) else {
        return Err(DecodeError::MissingTag);
    };

    if tag != RESOURCE_TAG {
        return Ok(Packet::Ignored { tag });
    }

    // data[1][0]
    let payload = match data.into_iter().nth(1) {
        Some(Value::Array(rest)) => rest.into_iter().next(),
        _ => None,
    };

    match payload {
        Some(Value::Array(values)) => Ok(Packet::Resources(ResourceBundle::new(values))),
        _ => Err(DecodeError::MissingPayload { tag }),
    }
}

// ---------------------------------------------------------------------------
// Resource bundle
// ---------------------------------------------------------------------------

/// The flat value sequence of a resource snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceBundle {
    values: Vec<Value>,
}

impl ResourceBundle {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Raw element count, including any incomplete trailing record.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Complete records, in wire order. The trailing remainder is never
    /// yielded.
    pub fn records(&self) -> impl Iterator<Item = &[Value]> {
        self.values.chunks_exact(RECORD_WIDTH)
    }

    pub fn record_count(&self) -> usize {
        self.values.len() / RECORD_WIDTH
    }

    /// Number of trailing elements that do not form a full record.
    pub fn remainder(&self) -> usize {
        self.values.len() % RECORD_WIDTH
    }

    /// Resolve every complete record into a descriptor, dropping the ones
    /// that cannot be displayed. Arrival order is preserved.
    pub fn descriptors(&self) -> Vec<EntityDescriptor> {
        let mut out = Vec::with_capacity(self.record_count());
        for record in self.records() {
            match decode_record(record) {
                Ok(entity) => out.push(entity),
                Err(skip) => log::debug!("[decoder] dropping record: {:?}", skip),
            }
        }
        if self.remainder() > 0 {
            log::debug!(
                "[decoder] discarding {} trailing value(s) of incomplete record",
                self.remainder()
            );
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Why a single complete record produced no descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSkip {
    /// Kind code outside the known category set.
    UnknownKind(Value),
    /// A positional numeric field held something other than a number.
    BadField(&'static str),
}

/// Turn one 8-value record into a descriptor.
pub fn decode_record(record: &[Value]) -> Result<EntityDescriptor, RecordSkip> {
    let [sid, x, y, direction, scale, kind, item, owner] = record else {
        return Err(RecordSkip::BadField("record width"));
    };

    let kind_code = int_value(kind).ok_or_else(|| RecordSkip::UnknownKind(kind.clone()))?;
    let category =
        Category::from_code(kind_code).ok_or_else(|| RecordSkip::UnknownKind(kind.clone()))?;

    Ok(EntityDescriptor {
        session_id: uint_value(sid).ok_or(RecordSkip::BadField("sessionId"))?,
        x: number_value(x).ok_or(RecordSkip::BadField("x"))?,
        y: number_value(y).ok_or(RecordSkip::BadField("y"))?,
        direction: number_value(direction).ok_or(RecordSkip::BadField("direction"))?,
        scale: number_value(scale).ok_or(RecordSkip::BadField("scale"))?,
        kind: kind_code,
        category,
        item: item.clone(),
        owner: owner.clone(),
    })
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

fn number_value(v: &Value) -> Option<f64> {
    match *v {
        Value::Integer(ref n) => n.as_f64(),
        Value::F32(f) => Some(f64::from(f)),
        Value::F64(f) => Some(f),
        _ => None,
    }
}

// Encoders may ship whole numbers as floats; accept those as integers.
fn whole_float(v: &Value) -> Option<f64> {
    match *v {
        Value::F32(_) | Value::F64(_) => number_value(v).filter(|f| f.fract() == 0.0),
        _ => None,
    }
}

fn int_value(v: &Value) -> Option<i64> {
    match *v {
        Value::Integer(ref n) => n.as_i64(),
        _ => whole_float(v)
            .filter(|f| *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
            .map(|f| f as i64),
    }
}

fn uint_value(v: &Value) -> Option<u64> {
    match *v {
        Value::Integer(ref n) => n.as_u64(),
        _ => whole_float(v)
            .filter(|f| *f >= 0.0 && *f <= u64::MAX as f64)
            .map(|f| f as u64),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn frame(v: serde_json::Value) -> Vec<u8> {
        rmp_serde::to_vec(&v).expect("encode test frame")
    }

    fn encode(v: &Value) -> Vec<u8> {
        let mut buf = Vec::new();
        rmpv::encode::write_value(&mut buf, v).expect("encode test frame");
        buf
    }

    /// The wire form of a JSON literal, as the decoder sees it.
    fn wire(v: serde_json::Value) -> Value {
        rmpv::decode::read_value(&mut &frame(v)[..]).expect("re-read test value")
    }

    fn values_of(v: serde_json::Value) -> Vec<Value> {
        match wire(v) {
            Value::Array(values) => values,
            other => panic!("expected an array, got {other:?}"),
        }
    }

    fn bundle(v: serde_json::Value) -> ResourceBundle {
        match decode_frame(&frame(json!(["H", [v]]))).expect("decodes") {
            Packet::Resources(b) => b,
            other => panic!("expected Resources, got {other:?}"),
        }
    }

    // ---------------------------------------------------------------
    // Dispatch
    // ---------------------------------------------------------------

    #[test]
    fn resource_tag_yields_bundle() {
        let b = bundle(json!([1, 100, 200, 0, 1, 1, 0, 0]));
        assert_eq!(b.len(), 8);
        assert_eq!(b.record_count(), 1);
    }

    #[test]
    fn other_tags_are_ignored() {
        for tag in ["X", "a", "33", "HH", ""] {
            let packet = decode_frame(&frame(json!([tag, [[1, 2, 3]]]))).unwrap();
            assert_eq!(packet, Packet::Ignored { tag: tag.into() });
        }
    }

    #[test]
    fn ignored_tag_needs_no_payload() {
        let packet = decode_frame(&frame(json!(["X"]))).unwrap();
        assert!(matches!(packet, Packet::Ignored { .. }));
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        // 0xc1 is the reserved marker
        assert!(decode_frame(&[0xc1]).is_err());
        // fixarray(2) header followed by nothing
        assert!(matches!(
            decode_frame(&[0x92]),
            Err(DecodeError::Malformed(_))
        ));
        assert!(matches!(decode_frame(&[]), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn non_sequence_top_level_is_rejected() {
        assert!(matches!(
            decode_frame(&frame(json!({"H": 1}))),
            Err(DecodeError::NotASequence)
        ));
        assert!(matches!(
            decode_frame(&frame(json!(42))),
            Err(DecodeError::NotASequence)
        ));
    }

    #[test]
    fn missing_or_non_string_tag_is_rejected() {
        assert!(matches!(
            decode_frame(&frame(json!([]))),
            Err(DecodeError::MissingTag)
        ));
        assert!(matches!(
            decode_frame(&frame(json!([7, [[]]]))),
            Err(DecodeError::MissingTag)
        ));
    }

    #[test]
    fn resource_tag_without_payload_is_rejected() {
        for v in [json!(["H"]), json!(["H", []]), json!(["H", [5]]), json!(["H", 5])] {
            assert!(
                matches!(decode_frame(&frame(v.clone())), Err(DecodeError::MissingPayload { .. })),
                "{v}"
            );
        }
    }

    // ---------------------------------------------------------------
    // Partitioning
    // ---------------------------------------------------------------

    #[test]
    fn trailing_remainder_is_discarded() {
        let mut values: Vec<Value> = (0..15).map(|_| Value::from(0)).collect();
        values[0] = Value::from(7);
        let b = ResourceBundle::new(values);
        assert_eq!(b.record_count(), 1);
        assert_eq!(b.remainder(), 7);
        let d = b.descriptors();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].session_id, 7);
    }

    #[test]
    fn short_bundle_yields_nothing() {
        let b = bundle(json!([1, 2, 3]));
        assert_eq!(b.record_count(), 0);
        assert!(b.descriptors().is_empty());
    }

    #[test]
    fn empty_bundle_yields_nothing() {
        let b = bundle(json!([]));
        assert!(b.is_empty());
        assert!(b.descriptors().is_empty());
    }

    // ---------------------------------------------------------------
    // Records
    // ---------------------------------------------------------------

    #[test]
    fn record_fields_are_positional() {
        let b = bundle(json!([42, 100.5, 200.25, 1.5, 2.0, 2, null, 9]));
        let d = b.descriptors();
        assert_eq!(d.len(), 1);
        let e = &d[0];
        assert_eq!(e.session_id, 42);
        assert_eq!(e.x, 100.5);
        assert_eq!(e.y, 200.25);
        assert_eq!(e.direction, 1.5);
        assert_eq!(e.scale, 2.0);
        assert_eq!(e.kind, 2);
        assert_eq!(e.category, Category::Stone);
        assert_eq!(e.item, Value::Nil);
        assert_eq!(e.owner, Value::from(9));
    }

    #[test]
    fn binary_item_and_ext_owner_are_kept() {
        let rec: Vec<Value> = vec![
            1.into(),
            100.into(),
            200.into(),
            0.into(),
            1.into(),
            1.into(),
            Value::Binary(vec![0x01]),
            Value::Ext(3, vec![0xaa, 0xbb]),
        ];
        let raw = Value::Array(vec![
            Value::from("H"),
            Value::Array(vec![Value::Array(rec)]),
        ]);

        let Packet::Resources(b) = decode_frame(&encode(&raw)).expect("decodes") else {
            panic!("expected resources");
        };
        let d = b.descriptors();
        assert_eq!(d.len(), 1);
        assert_eq!(d[0].category, Category::Food);
        assert_eq!(d[0].item, Value::Binary(vec![0x01]));
        assert_eq!(d[0].owner, Value::Ext(3, vec![0xaa, 0xbb]));
    }

    #[test]
    fn binary_tag_is_not_a_tag() {
        let raw = Value::Array(vec![Value::Binary(b"H".to_vec()), Value::Array(vec![])]);
        assert!(matches!(
            decode_frame(&encode(&raw)),
            Err(DecodeError::MissingTag)
        ));
    }

    #[test]
    fn unknown_kind_drops_only_that_record() {
        let b = bundle(json!([
            1, 10, 10, 0, 1, 0, 0, 0,
            2, 20, 20, 0, 1, 4, 0, 0,
            3, 30, 30, 0, 1, 3, 0, 0
        ]));
        let d = b.descriptors();
        let ids: Vec<u64> = d.iter().map(|e| e.session_id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(d[0].category, Category::Wood);
        assert_eq!(d[1].category, Category::Points);
    }

    #[test]
    fn whole_float_kind_is_accepted() {
        let d = bundle(json!([1, 0, 0, 0, 1, 1.0, 0, 0])).descriptors();
        assert_eq!(d[0].category, Category::Food);
    }

    #[test]
    fn fractional_or_textual_kind_is_dropped() {
        let record = values_of(json!([1, 0, 0, 0, 1, 1.5, 0, 0]));
        assert!(matches!(decode_record(&record), Err(RecordSkip::UnknownKind(_))));

        let record = values_of(json!([1, 0, 0, 0, 1, "1", 0, 0]));
        assert!(matches!(decode_record(&record), Err(RecordSkip::UnknownKind(_))));
    }

    #[test]
    fn non_numeric_position_drops_record() {
        let record = values_of(json!([1, null, 0, 0, 1, 0, 0, 0]));
        assert_eq!(decode_record(&record), Err(RecordSkip::BadField("x")));
    }

    #[test]
    fn negative_session_id_drops_record() {
        let record = values_of(json!([-1, 0, 0, 0, 1, 0, 0, 0]));
        assert_eq!(decode_record(&record), Err(RecordSkip::BadField("sessionId")));
    }

    #[test]
    fn wrong_width_slice_is_rejected() {
        let record = values_of(json!([1, 0]));
        assert!(decode_record(&record).is_err());
    }
}
