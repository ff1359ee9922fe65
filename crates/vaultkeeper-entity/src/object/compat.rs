//! Version compatibility downgrades.
//!
//! A newer build talking to an older peer must not send fields the peer's
//! schema does not know. Downgrading strips every field introduced after the
//! target version and leaves everything else alone.

use vaultkeeper_core::types::{ObjectVersion, Primitive};

use super::field::Schema;

/// Return a copy of `primitive` that is safe for a consumer built against
/// `target`.
///
/// Fields introduced strictly after `target` are removed; names the schema
/// does not track (envelope metadata, caller extras) are kept. A target at
/// or above the schema's own version passes the map through unchanged.
/// Applying the same downgrade twice yields the same map as applying it once.
pub fn make_compatible(schema: &Schema, primitive: &Primitive, target: ObjectVersion) -> Primitive {
    if target >= schema.version {
        return primitive.clone();
    }

    primitive
        .iter()
        .filter(|(name, _)| is_known_at(schema, name, target))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Whether a consumer at `target` understands the field called `name`.
pub fn is_known_at(schema: &Schema, name: &str, target: ObjectVersion) -> bool {
    schema
        .introduced_at(name)
        .is_none_or(|since| since <= target)
}

#[cfg(test)]
mod tests {
    use vaultkeeper_core::types::FieldValue;

    use super::*;
    use crate::object::field::{DerivedField, FieldSpec};

    const V1_0: ObjectVersion = ObjectVersion::new(1, 0);
    const V1_1: ObjectVersion = ObjectVersion::new(1, 1);
    const V1_2: ObjectVersion = ObjectVersion::new(1, 2);

    static FIELDS: [FieldSpec; 3] = [
        FieldSpec::string("a", ObjectVersion::new(1, 0)),
        FieldSpec::integer("b", ObjectVersion::new(1, 1)),
        FieldSpec::integer("c", ObjectVersion::new(1, 2)),
    ];
    static DERIVED: [DerivedField; 1] = [DerivedField {
        name: "has_b",
        since: ObjectVersion::new(1, 1),
    }];
    static SCHEMA: Schema = Schema {
        name: "Sample",
        namespace: "test",
        version: ObjectVersion::new(1, 2),
        fields: &FIELDS,
        derived: &DERIVED,
    };

    fn wire() -> Primitive {
        let mut w = Primitive::new();
        w.insert("a".into(), "x".into());
        w.insert("b".into(), FieldValue::Integer(1));
        w.insert("c".into(), FieldValue::Integer(2));
        w.insert("has_b".into(), true.into());
        w.insert("version".into(), "1.2".into());
        w
    }

    #[test]
    fn test_strips_newer_fields() {
        let down = make_compatible(&SCHEMA, &wire(), V1_0);
        let keys: Vec<_> = down.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "version"]);
    }

    #[test]
    fn test_current_or_newer_target_passes_through() {
        assert_eq!(make_compatible(&SCHEMA, &wire(), V1_2), wire());
        assert_eq!(make_compatible(&SCHEMA, &wire(), ObjectVersion::new(1, 7)), wire());
    }

    #[test]
    fn test_idempotent() {
        for target in [V1_0, V1_1, V1_2] {
            let once = make_compatible(&SCHEMA, &wire(), target);
            let twice = make_compatible(&SCHEMA, &once, target);
            assert_eq!(once, twice, "target {target}");
        }
    }

    #[test]
    fn test_monotonic_removal() {
        let targets = [V1_0, V1_1, V1_2];
        for (i, lower) in targets.iter().enumerate() {
            for higher in &targets[i..] {
                let low = make_compatible(&SCHEMA, &wire(), *lower);
                let high = make_compatible(&SCHEMA, &wire(), *higher);
                assert!(low.keys().all(|k| high.contains_key(k)), "{lower} vs {higher}");
            }
        }
    }

    #[test]
    fn test_source_untouched() {
        let source = wire();
        let _ = make_compatible(&SCHEMA, &source, V1_0);
        assert_eq!(source.len(), 5);
    }
}
