//! Declarative geometric entities and their ordered container.
//!
//! An [`Entity`] is a named record whose [`EntityKind`] carries exactly the
//! payload its kind needs: literal coordinates for leaves, referenced ids for
//! curves, surfaces and volumes. [`EntityMap`] keeps entities in declaration
//! order, which the graph builder relies on for deterministic sequencing.
//!
//! Descriptions are usually decoded from JSON. Decoding happens in two steps:
//! serde first reads an order-preserving list of raw `{type, data,
//! extra_args}` records, then [`EntityMap::try_from`] converts each record
//! into its typed kind so that unknown `type` tokens and malformed payloads
//! surface as [`GeoSeqError`] variants naming the entity.

use std::borrow::Borrow;
use std::fmt;
use std::io::Read;

use indexmap::IndexMap;
use indexmap::map::{Entry, Values};
use serde::de::{DeserializeOwned, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::geo_error::GeoSeqError;

/// Unique, human-readable identifier of an entity.
#[derive(
    Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        EntityId(s.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        EntityId(s)
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Topological dimension of a constructed entity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Dimension {
    Point = 0,
    Curve = 1,
    Surface = 2,
    Volume = 3,
}

impl Dimension {
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Kind of an entity together with its kind-specific payload.
#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Point {
        coords: [f64; 3],
    },
    Line {
        start: EntityId,
        end: EntityId,
    },
    Circle {
        center: [f64; 3],
        radius: f64,
    },
    /// Planar surface bounded by a curve loop, with optional hole loops.
    PlaneSurface {
        contour: Vec<EntityId>,
        holes: Vec<Vec<EntityId>>,
    },
    /// Surface interpolated through a single closed curve loop.
    SurfaceFilling {
        curves: Vec<EntityId>,
    },
    /// Volume bounded by a surface loop, with optional hole loops.
    Volume {
        contour: Vec<EntityId>,
        holes: Vec<Vec<EntityId>>,
    },
}

impl EntityKind {
    /// The `type` token this kind is declared with.
    pub const fn token(&self) -> &'static str {
        match self {
            EntityKind::Point { .. } => "point",
            EntityKind::Line { .. } => "line",
            EntityKind::Circle { .. } => "circle",
            EntityKind::PlaneSurface { .. } => "plane-surface",
            EntityKind::SurfaceFilling { .. } => "surface-filling",
            EntityKind::Volume { .. } => "volume",
        }
    }

    pub const fn dimension(&self) -> Dimension {
        match self {
            EntityKind::Point { .. } => Dimension::Point,
            EntityKind::Line { .. } | EntityKind::Circle { .. } => Dimension::Curve,
            EntityKind::PlaneSurface { .. } | EntityKind::SurfaceFilling { .. } => {
                Dimension::Surface
            }
            EntityKind::Volume { .. } => Dimension::Volume,
        }
    }

    /// Referenced entity ids, contour members before hole members.
    pub fn dependencies(&self) -> Vec<&EntityId> {
        match self {
            EntityKind::Point { .. } | EntityKind::Circle { .. } => Vec::new(),
            EntityKind::Line { start, end } => vec![start, end],
            EntityKind::SurfaceFilling { curves } => curves.iter().collect(),
            EntityKind::PlaneSurface { contour, holes } | EntityKind::Volume { contour, holes } => {
                contour.iter().chain(holes.iter().flatten()).collect()
            }
        }
    }
}

/// A named declarative record.
#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Options forwarded verbatim to the kernel call that builds this entity.
    pub extra_args: Option<Value>,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            kind,
            extra_args: None,
        }
    }

    pub fn point(id: impl Into<EntityId>, coords: [f64; 3]) -> Self {
        Self::new(id, EntityKind::Point { coords })
    }

    pub fn line(id: impl Into<EntityId>, start: impl Into<EntityId>, end: impl Into<EntityId>) -> Self {
        Self::new(
            id,
            EntityKind::Line {
                start: start.into(),
                end: end.into(),
            },
        )
    }

    pub fn circle(id: impl Into<EntityId>, center: [f64; 3], radius: f64) -> Self {
        Self::new(id, EntityKind::Circle { center, radius })
    }

    pub fn surface_filling<I, S>(id: impl Into<EntityId>, curves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        Self::new(
            id,
            EntityKind::SurfaceFilling {
                curves: curves.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn plane_surface<I, S>(id: impl Into<EntityId>, contour: I, holes: Vec<Vec<EntityId>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        Self::new(
            id,
            EntityKind::PlaneSurface {
                contour: contour.into_iter().map(Into::into).collect(),
                holes,
            },
        )
    }

    pub fn volume<I, S>(id: impl Into<EntityId>, contour: I, holes: Vec<Vec<EntityId>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        Self::new(
            id,
            EntityKind::Volume {
                contour: contour.into_iter().map(Into::into).collect(),
                holes,
            },
        )
    }

    /// Attach kernel pass-through options.
    pub fn with_extra_args(mut self, extra_args: Value) -> Self {
        self.extra_args = Some(extra_args);
        self
    }

    #[inline]
    pub fn dependencies(&self) -> Vec<&EntityId> {
        self.kind.dependencies()
    }

    /// Decode a raw record. `token` is the already-normalised `type` token.
    fn from_raw(id: String, token: &str, raw: RawEntity) -> Result<Self, GeoSeqError> {
        let kind = match token {
            "point" => EntityKind::Point {
                coords: decode_data(&id, token, raw.data)?,
            },
            "line" => {
                let (start, end): (EntityId, EntityId) = decode_data(&id, token, raw.data)?;
                EntityKind::Line { start, end }
            }
            "circle" => {
                let c: CircleData = decode_data(&id, token, raw.data)?;
                if !(c.radius.is_finite() && c.radius > 0.0) {
                    return Err(GeoSeqError::MalformedEntity {
                        entity: id,
                        kind: token.into(),
                        reason: format!("radius must be positive, got {}", c.radius),
                    });
                }
                EntityKind::Circle {
                    center: c.coords,
                    radius: c.radius,
                }
            }
            "surface-filling" => EntityKind::SurfaceFilling {
                curves: decode_data(&id, token, raw.data)?,
            },
            "plane-surface" => {
                let l: LoopData = decode_data(&id, token, raw.data)?;
                EntityKind::PlaneSurface {
                    contour: l.contour,
                    holes: l.holes.unwrap_or_default(),
                }
            }
            "volume" => {
                let l: LoopData = decode_data(&id, token, raw.data)?;
                EntityKind::Volume {
                    contour: l.contour,
                    holes: l.holes.unwrap_or_default(),
                }
            }
            other => {
                return Err(GeoSeqError::UnsupportedEntityKind {
                    entity: id,
                    kind: other.into(),
                });
            }
        };
        Ok(Entity {
            id: EntityId(id),
            kind,
            extra_args: raw.extra_args,
        })
    }
}

#[derive(Deserialize)]
struct CircleData {
    coords: [f64; 3],
    radius: f64,
}

#[derive(Deserialize)]
struct LoopData {
    contour: Vec<EntityId>,
    #[serde(default)]
    holes: Option<Vec<Vec<EntityId>>>,
}

fn decode_data<T: DeserializeOwned>(id: &str, token: &str, data: Value) -> Result<T, GeoSeqError> {
    serde_json::from_value(data).map_err(|e| GeoSeqError::MalformedEntity {
        entity: id.into(),
        kind: token.into(),
        reason: e.to_string(),
    })
}

/// Undecoded `{type, data, extra_args}` record.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEntity {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub extra_args: Option<Value>,
}

/// Order-preserving list of raw records as they appear in the source map.
///
/// Duplicate keys are kept so that conversion can report them.
#[derive(Clone, Debug, Default)]
pub struct RawDescription(pub Vec<(String, RawEntity)>);

impl<'de> Deserialize<'de> for RawDescription {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = RawDescription;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from entity id to entity record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((k, v)) = map.next_entry::<String, RawEntity>()? {
                    out.push((k, v));
                }
                Ok(RawDescription(out))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Description grouped into `points`, `curves`, `surfaces` and `volumes`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawSections {
    #[serde(default)]
    pub points: RawDescription,
    #[serde(default)]
    pub curves: RawDescription,
    #[serde(default)]
    pub surfaces: RawDescription,
    #[serde(default)]
    pub volumes: RawDescription,
}

/// Section-local `type` token → flat token. `None` for tokens that do not
/// belong to the section.
fn section_token(section: &str, token: Option<&str>) -> Option<&'static str> {
    match (section, token) {
        ("points", None | Some("point")) => Some("point"),
        ("curves", Some("line")) => Some("line"),
        ("curves", Some("circle")) => Some("circle"),
        ("surfaces", Some("filling" | "surface-filling")) => Some("surface-filling"),
        ("surfaces", Some("plane" | "plane-surface")) => Some("plane-surface"),
        ("volumes", Some("volume")) => Some("volume"),
        _ => None,
    }
}

/// Entities keyed by id, iterated in declaration order.
#[derive(Clone, Debug, Default)]
pub struct EntityMap {
    entities: IndexMap<EntityId, Entity>,
}

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity.
    ///
    /// # Errors
    /// [`GeoSeqError::DuplicateEntity`] if the id is already declared.
    pub fn insert(&mut self, entity: Entity) -> Result<(), GeoSeqError> {
        match self.entities.entry(entity.id.clone()) {
            Entry::Occupied(e) => Err(GeoSeqError::DuplicateEntity(e.key().to_string())),
            Entry::Vacant(e) => {
                e.insert(entity);
                Ok(())
            }
        }
    }

    #[inline]
    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    /// Entities in declaration order.
    pub fn iter(&self) -> Values<'_, EntityId, Entity> {
        self.entities.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Collect entities in iteration order.
    ///
    /// # Errors
    /// [`GeoSeqError::DuplicateEntity`] on the first repeated id.
    pub fn from_entities<I>(entities: I) -> Result<Self, GeoSeqError>
    where
        I: IntoIterator<Item = Entity>,
    {
        let mut map = EntityMap::new();
        for e in entities {
            map.insert(e)?;
        }
        Ok(map)
    }

    /// Decode a flat `{id: {type, data, extra_args}}` description.
    pub fn from_json_str(s: &str) -> Result<Self, GeoSeqError> {
        let raw: RawDescription = serde_json::from_str(s)?;
        Self::try_from(raw)
    }

    /// Decode a flat description from a reader.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, GeoSeqError> {
        let raw: RawDescription = serde_json::from_reader(reader)?;
        Self::try_from(raw)
    }

    /// Decode a description grouped into `points`/`curves`/`surfaces`/`volumes`.
    pub fn from_sectioned_json_str(s: &str) -> Result<Self, GeoSeqError> {
        let raw: RawSections = serde_json::from_str(s)?;
        Self::try_from(raw)
    }
}

impl<'a> IntoIterator for &'a EntityMap {
    type Item = &'a Entity;
    type IntoIter = Values<'a, EntityId, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<RawDescription> for EntityMap {
    type Error = GeoSeqError;

    fn try_from(raw: RawDescription) -> Result<Self, Self::Error> {
        let mut map = EntityMap::new();
        for (id, rec) in raw.0 {
            let Some(token) = rec.kind.clone() else {
                return Err(GeoSeqError::MalformedEntity {
                    entity: id,
                    kind: "unknown".into(),
                    reason: "missing `type` field".into(),
                });
            };
            map.insert(Entity::from_raw(id, &token, rec)?)?;
        }
        Ok(map)
    }
}

impl TryFrom<RawSections> for EntityMap {
    type Error = GeoSeqError;

    fn try_from(raw: RawSections) -> Result<Self, Self::Error> {
        let mut map = EntityMap::new();
        let sections = [
            ("points", raw.points),
            ("curves", raw.curves),
            ("surfaces", raw.surfaces),
            ("volumes", raw.volumes),
        ];
        for (section, desc) in sections {
            for (id, rec) in desc.0 {
                let Some(token) = section_token(section, rec.kind.as_deref()) else {
                    return Err(GeoSeqError::UnsupportedEntityKind {
                        entity: id,
                        kind: rec.kind.unwrap_or_else(|| "<missing>".into()),
                    });
                };
                map.insert(Entity::from_raw(id, token, rec)?)?;
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_description_keeps_declaration_order() {
        let map = EntityMap::from_json_str(
            r#"{
                "b": {"type": "point", "data": [1, 0, 0]},
                "a": {"type": "point", "data": [0, 0, 0]},
                "ab": {"type": "line", "data": ["a", "b"], "extra_args": {"tag": 7}}
            }"#,
        )
        .unwrap();
        let ids: Vec<&str> = map.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "ab"]);
        let ab = map.get("ab").unwrap();
        assert_eq!(ab.dependencies(), vec![&EntityId::from("a"), &EntityId::from("b")]);
        assert_eq!(ab.extra_args, Some(serde_json::json!({"tag": 7})));
    }

    #[test]
    fn loops_accept_missing_or_null_holes() {
        let map = EntityMap::from_json_str(
            r#"{
                "s": {"type": "plane-surface", "data": {"contour": ["c1"]}},
                "v": {"type": "volume", "data": {"contour": ["s"], "holes": null}}
            }"#,
        )
        .unwrap();
        assert_eq!(
            map.get("s").unwrap().kind,
            EntityKind::PlaneSurface {
                contour: vec!["c1".into()],
                holes: vec![]
            }
        );
        assert_eq!(map.get("v").unwrap().kind.dimension(), Dimension::Volume);
    }

    #[test]
    fn unknown_type_token_is_reported() {
        let err = EntityMap::from_json_str(r#"{"s1": {"type": "bspline", "data": []}}"#).unwrap_err();
        assert_eq!(
            err,
            GeoSeqError::UnsupportedEntityKind {
                entity: "s1".into(),
                kind: "bspline".into()
            }
        );
    }

    #[test]
    fn wrong_arity_is_malformed() {
        let err = EntityMap::from_json_str(r#"{"x": {"type": "point", "data": [1, 2]}}"#).unwrap_err();
        assert!(matches!(err, GeoSeqError::MalformedEntity { ref entity, .. } if entity == "x"));
    }

    #[test]
    fn non_positive_radius_is_malformed() {
        let err = EntityMap::from_json_str(
            r#"{"c": {"type": "circle", "data": {"coords": [0, 0, 0], "radius": 0}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GeoSeqError::MalformedEntity { .. }));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = EntityMap::from_json_str(
            r#"{"x": {"type": "point", "data": [0, 0, 0]}, "x": {"type": "point", "data": [1, 1, 1]}}"#,
        )
        .unwrap_err();
        assert_eq!(err, GeoSeqError::DuplicateEntity("x".into()));
    }

    #[test]
    fn invalid_json_is_invalid_input() {
        let err = EntityMap::from_json_str("{").unwrap_err();
        assert!(matches!(err, GeoSeqError::InvalidInput(_)));
    }

    #[test]
    fn sectioned_description_maps_section_tokens() {
        let map = EntityMap::from_sectioned_json_str(
            r#"{
                "points": {"x1": {"data": [0, 0, 0]}, "x2": {"data": [1, 0, 0]}},
                "curves": {"l1": {"type": "line", "data": ["x1", "x2"]}},
                "surfaces": {"s1": {"type": "filling", "data": ["l1"]}},
                "volumes": {}
            }"#,
        )
        .unwrap();
        let tokens: Vec<&str> = map.iter().map(|e| e.kind.token()).collect();
        assert_eq!(tokens, vec!["point", "point", "line", "surface-filling"]);
    }

    #[test]
    fn sectioned_description_rejects_misplaced_kind() {
        let err = EntityMap::from_sectioned_json_str(
            r#"{"surfaces": {"s1": {"type": "line", "data": ["a", "b"]}}}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            GeoSeqError::UnsupportedEntityKind {
                entity: "s1".into(),
                kind: "line".into()
            }
        );
    }

    #[test]
    fn collecting_entities_rejects_duplicates() {
        let res = EntityMap::from_entities([
            Entity::point("p", [0.0; 3]),
            Entity::point("p", [1.0; 3]),
        ]);
        assert_eq!(res.unwrap_err(), GeoSeqError::DuplicateEntity("p".into()));
    }
}
