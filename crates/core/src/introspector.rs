//! Object introspector
//!
//! Builds a [`PropertyTree`] over a live target from its [`Schema`]. Leaves
//! never copy field values: every leaf is bound to the target through its
//! [`Place`], so reads observe live state and writes go straight to the field.
//!
//! ## Table of Contents
//! 1. Introspector - entry points
//! 2. Field exposure and ranges
//! 3. Field-to-node mapping
//! 4. Composite decomposition (Vec2 / Vec3 / Color)

use crate::binding::{Place, PlaceExt, Shared};
use crate::error::{PropertyError, Result};
use crate::options::BuildOptions;
use crate::property::{
    BoolProperty, EnumProperty, FloatProperty, IntProperty, Property, StringProperty,
};
use crate::schema::{Accessor, Field, FieldKind, Get, Inspect, Schema, Set, Visibility};
use crate::tree::PropertyTree;
use bevy::color::{Color, Srgba};
use bevy::math::{Vec2, Vec3};
use parking_lot::RwLock;
use std::sync::{Arc, Weak};

/// Group name used when the caller does not supply one
pub const DEFAULT_ROOT_NAME: &str = "Root";

// ============================================================================
// 1. Introspector
// ============================================================================

/// Schema-driven property tree builder
#[derive(Debug, Clone, Default)]
pub struct Introspector {
    options: BuildOptions,
}

/// Output of one field before it is attached to its group
enum Built {
    Leaf(String, Property),
    Group(PropertyTree),
}

impl Introspector {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build a tree named [`DEFAULT_ROOT_NAME`] over `target`
    pub fn build<T: Inspect>(&self, target: &Shared<T>) -> Result<PropertyTree> {
        self.build_named(target, DEFAULT_ROOT_NAME)
    }

    pub fn build_named<T: Inspect>(&self, target: &Shared<T>, name: &str) -> Result<PropertyTree> {
        let place: Arc<dyn Place<T>> = target.clone();
        self.build_with_schema(place, &T::schema(), name)
    }

    /// Build over a weak handle; the leaves do not keep the target alive and
    /// read defaults once it is dropped
    pub fn build_weak<T: Inspect>(&self, target: &Weak<RwLock<T>>, name: &str) -> Result<PropertyTree> {
        let place: Arc<dyn Place<T>> = Arc::new(target.clone());
        self.build_with_schema(place, &T::schema(), name)
    }

    /// Build over any place with an explicit schema.
    ///
    /// Fails with [`PropertyError::InvalidArgument`] when the target is absent.
    /// Individual field failures are logged and the field is left out.
    pub fn build_with_schema<T: 'static>(
        &self,
        target: Arc<dyn Place<T>>,
        schema: &Schema<T>,
        name: &str,
    ) -> Result<PropertyTree> {
        if !target.is_present() {
            return Err(PropertyError::InvalidArgument(format!(
                "build target for '{}' is absent",
                name
            )));
        }

        tracing::debug!(
            "Building property tree '{}' for {} ({} fields)",
            name,
            std::any::type_name::<T>(),
            schema.len()
        );
        let tree = self.build_group(target, schema, name, 0)?;
        tracing::debug!("Built property tree '{}' with {} nodes", name, tree.len());
        Ok(tree)
    }

    /// Build one group from `schema`; `depth` is the nesting level of the group itself
    pub(crate) fn build_group<T: 'static>(
        &self,
        place: Arc<dyn Place<T>>,
        schema: &Schema<T>,
        name: &str,
        depth: usize,
    ) -> Result<PropertyTree> {
        let mut tree = PropertyTree::new(name);
        let root = tree.root();

        for field in schema.fields() {
            if !self.is_exposed(field) {
                continue;
            }
            match self.build_field(&place, field, depth) {
                Ok(Some(Built::Leaf(label, property))) => {
                    tree.add(root, label, property)?;
                }
                Ok(Some(Built::Group(subtree))) => {
                    tree.graft(root, subtree)?;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to create property for field {}: {}", field.name(), e);
                }
            }
        }

        Ok(tree)
    }

    // ========================================================================
    // 2. Field exposure and ranges
    // ========================================================================

    /// Marked fields are always exposed; otherwise only public fields whose
    /// name and type are not excluded
    fn is_exposed<T>(&self, field: &Field<T>) -> bool {
        if field.meta().inspectable {
            return true;
        }
        field.meta().visibility == Visibility::Public && !self.is_excluded(field)
    }

    fn is_excluded<T>(&self, field: &Field<T>) -> bool {
        self.options.is_field_excluded(field.name()) || self.options.is_type_excluded(field.type_id())
    }

    /// Nested groups are also subject to the exclusion lists and the nesting switch
    fn should_nest<T>(&self, field: &Field<T>) -> bool {
        self.options.allow_nested_objects && !self.is_excluded(field)
    }

    /// Ranges are advisory: inverted bounds are logged and kept as given
    fn float_range<T>(&self, field: &Field<T>) -> (f32, f32) {
        let (min, max) = match field.meta().range {
            Some((min, max)) => (min as f32, max as f32),
            None => (self.options.default_float_min, self.options.default_float_max),
        };
        if min.is_nan() || max.is_nan() || min > max {
            tracing::warn!("Field {} has an inverted range [{}, {}]", field.name(), min, max);
        }
        (min, max)
    }

    fn int_range<T>(&self, field: &Field<T>) -> (i32, i32) {
        let (min, max) = match field.meta().range {
            Some((min, max)) => (min as i32, max as i32),
            None => (self.options.default_int_min, self.options.default_int_max),
        };
        if min > max {
            tracing::warn!("Field {} has an inverted range [{}, {}]", field.name(), min, max);
        }
        (min, max)
    }

    /// Vector components always take the default float range
    fn component_range(&self) -> (f32, f32) {
        (self.options.default_float_min, self.options.default_float_max)
    }

    // ========================================================================
    // 3. Field-to-node mapping
    // ========================================================================

    fn build_field<T: 'static>(
        &self,
        place: &Arc<dyn Place<T>>,
        field: &Field<T>,
        depth: usize,
    ) -> Result<Option<Built>> {
        let label = field.display_name().to_string();

        let property: Property = match field.kind() {
            FieldKind::Float(accessor) => {
                let (min, max) = self.float_range(field);
                FloatProperty::bound(min, max, getter(place, &accessor.get), setter(place, &accessor.set))
                    .into()
            }
            FieldKind::Int(accessor) => {
                let (min, max) = self.int_range(field);
                IntProperty::bound(min, max, getter(place, &accessor.get), setter(place, &accessor.set))
                    .into()
            }
            FieldKind::Bool(accessor) => {
                BoolProperty::bound(getter(place, &accessor.get), setter(place, &accessor.set)).into()
            }
            FieldKind::Text(accessor) => {
                StringProperty::bound(getter(place, &accessor.get), setter(place, &accessor.set)).into()
            }
            FieldKind::Enum(table) => {
                if table.variants.is_empty() {
                    return Err(PropertyError::field_build(field.name(), "enum has no variants"));
                }
                EnumProperty::from_table(
                    table.variants.clone(),
                    table.enum_type,
                    table.type_name,
                    getter(place, &table.ordinal.get),
                    setter(place, &table.ordinal.set),
                )
                .into()
            }
            FieldKind::Vec2(accessor) => {
                let group = composite(place, accessor, &label, &vec2_axes(), self.component_range())?;
                return Ok(Some(Built::Group(group)));
            }
            FieldKind::Vec3(accessor) => {
                let group = composite(place, accessor, &label, &vec3_axes(), self.component_range())?;
                return Ok(Some(Built::Group(group)));
            }
            FieldKind::Color(accessor) => {
                let group = composite(place, accessor, &label, &color_axes(), (0.0, 1.0))?;
                return Ok(Some(Built::Group(group)));
            }
            FieldKind::Nested(nested) => {
                if !self.should_nest(field) {
                    return Ok(None);
                }
                self.check_depth(field, depth)?;
                let group = nested.build(self, place.clone(), &label, depth + 1)?;
                if group.is_none() {
                    tracing::debug!("Skipping nested field {}: value is absent", field.name());
                }
                return Ok(group.map(Built::Group));
            }
            FieldKind::Inline(inline) => {
                if !self.should_nest(field) {
                    return Ok(None);
                }
                if let Some(present) = &inline.present {
                    if place.inspect(|target| present(target)) != Some(true) {
                        tracing::debug!("Skipping nested field {}: value is absent", field.name());
                        return Ok(None);
                    }
                }
                self.check_depth(field, depth)?;
                let group = self.build_group(place.clone(), &inline.schema, &label, depth + 1)?;
                return Ok(Some(Built::Group(group)));
            }
            FieldKind::Opaque => {
                tracing::debug!(
                    "Skipping field {}: no property mapping for {}",
                    field.name(),
                    field.type_name()
                );
                return Ok(None);
            }
        };

        Ok(Some(Built::Leaf(label, property)))
    }

    fn check_depth<T>(&self, field: &Field<T>, depth: usize) -> Result<()> {
        if depth >= self.options.max_depth {
            return Err(PropertyError::field_build(
                field.name(),
                format!("nesting exceeds max depth {}", self.options.max_depth),
            ));
        }
        Ok(())
    }
}

fn getter<T: 'static, V: Default + 'static>(
    place: &Arc<dyn Place<T>>,
    get: &Get<T, V>,
) -> impl Fn() -> V + Send + Sync + 'static {
    let place = place.clone();
    let get = get.clone();
    move || place.inspect(|target| get(target)).unwrap_or_default()
}

fn setter<T: 'static, V: 'static>(
    place: &Arc<dyn Place<T>>,
    set: &Set<T, V>,
) -> impl Fn(V) + Send + Sync + 'static {
    let place = place.clone();
    let set = set.clone();
    move |value| {
        if place.modify(|target| set(target, value)).is_none() {
            tracing::debug!("Dropped write to {}: target is absent", std::any::type_name::<T>());
        }
    }
}

// ============================================================================
// 4. Composite decomposition
// ============================================================================

/// One float component of a composite value
struct Axis<V> {
    name: &'static str,
    read: fn(&V) -> f32,
    write: fn(&mut V, f32),
}

fn vec2_axes() -> [Axis<Vec2>; 2] {
    [
        Axis { name: "X", read: |v: &Vec2| v.x, write: |v: &mut Vec2, x: f32| v.x = x },
        Axis { name: "Y", read: |v: &Vec2| v.y, write: |v: &mut Vec2, y: f32| v.y = y },
    ]
}

fn vec3_axes() -> [Axis<Vec3>; 3] {
    [
        Axis { name: "X", read: |v: &Vec3| v.x, write: |v: &mut Vec3, x: f32| v.x = x },
        Axis { name: "Y", read: |v: &Vec3| v.y, write: |v: &mut Vec3, y: f32| v.y = y },
        Axis { name: "Z", read: |v: &Vec3| v.z, write: |v: &mut Vec3, z: f32| v.z = z },
    ]
}

fn color_axes() -> [Axis<Color>; 4] {
    [
        Axis {
            name: "R",
            read: |c: &Color| c.to_srgba().red,
            write: |c: &mut Color, red: f32| *c = Color::Srgba(Srgba { red, ..c.to_srgba() }),
        },
        Axis {
            name: "G",
            read: |c: &Color| c.to_srgba().green,
            write: |c: &mut Color, green: f32| *c = Color::Srgba(Srgba { green, ..c.to_srgba() }),
        },
        Axis {
            name: "B",
            read: |c: &Color| c.to_srgba().blue,
            write: |c: &mut Color, blue: f32| *c = Color::Srgba(Srgba { blue, ..c.to_srgba() }),
        },
        Axis {
            name: "A",
            read: |c: &Color| c.to_srgba().alpha,
            write: |c: &mut Color, alpha: f32| *c = Color::Srgba(Srgba { alpha, ..c.to_srgba() }),
        },
    ]
}

/// Group of float leaves, one per axis. Each write reads the whole value,
/// replaces one component and writes the value back.
fn composite<T: 'static, V: 'static>(
    place: &Arc<dyn Place<T>>,
    accessor: &Accessor<T, V>,
    label: &str,
    axes: &[Axis<V>],
    (min, max): (f32, f32),
) -> Result<PropertyTree> {
    let mut group = PropertyTree::new(label);
    let root = group.root();

    for axis in axes {
        let (read, write) = (axis.read, axis.write);
        let (reader, get) = (place.clone(), accessor.get.clone());
        let (writer, get_back, set) = (place.clone(), accessor.get.clone(), accessor.set.clone());

        let component = FloatProperty::bound(
            min,
            max,
            move || reader.inspect(|target| read(&get(target))).unwrap_or_default(),
            move |value| {
                writer.modify(|target| {
                    let mut current = get_back(target);
                    write(&mut current, value);
                    set(target, current);
                });
            },
        );
        group.add(root, axis.name, component)?;
    }

    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::shared;
    use crate::property::{ActionProperty, PropertyEnum};
    use crate::property_enum;
    use crate::resolver::PathResolver;
    use crate::tree::NodeId;
    use bevy::ecs::entity::Entity;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum WeaponType {
        Sword,
        Bow,
        Staff,
    }

    property_enum!(WeaponType { Sword, Bow, Staff });

    #[derive(Debug, Clone, PartialEq)]
    struct Stats {
        strength: i32,
        agility: f32,
    }

    impl Inspect for Stats {
        fn schema() -> Schema<Self> {
            Schema::new()
                .int("strength", |s: &Stats| s.strength, |s: &mut Stats, v| s.strength = v)
                .float("agility", |s: &Stats| s.agility, |s: &mut Stats, v| s.agility = v)
        }
    }

    struct Player {
        speed: f32,
        level: i32,
        alive: bool,
        title: String,
        position: Vec3,
        aim: Vec2,
        tint: Color,
        weapon: WeaponType,
        stats: Stats,
        companion: Option<Stats>,
        owner: Entity,
        secret: f32,
        notes: f32,
        inventory: Vec<String>,
    }

    impl Default for Player {
        fn default() -> Self {
            Self {
                speed: 2.5,
                level: 3,
                alive: true,
                title: "Scout".into(),
                position: Vec3::new(1.0, 2.0, 3.0),
                aim: Vec2::new(0.5, -0.5),
                tint: Color::srgba(1.0, 0.5, 0.25, 1.0),
                weapon: WeaponType::Bow,
                stats: Stats { strength: 7, agility: 0.4 },
                companion: None,
                owner: Entity::PLACEHOLDER,
                secret: 9.0,
                notes: 1.0,
                inventory: vec!["potion".into()],
            }
        }
    }

    impl Inspect for Player {
        fn schema() -> Schema<Self> {
            Schema::new()
                .float("speed", |p: &Player| p.speed, |p: &mut Player, v| p.speed = v)
                .range(0.0, 10.0)
                .header("Speed")
                .int("level", |p: &Player| p.level, |p: &mut Player, v| p.level = v)
                .boolean("alive", |p: &Player| p.alive, |p: &mut Player, v| p.alive = v)
                .tooltip("Is alive")
                .string("title", |p: &Player| p.title.clone(), |p: &mut Player, v| p.title = v)
                .vec3("position", |p: &Player| p.position, |p: &mut Player, v| p.position = v)
                .vec2("aim", |p: &Player| p.aim, |p: &mut Player, v| p.aim = v)
                .color("tint", |p: &Player| p.tint, |p: &mut Player, v| p.tint = v)
                .enumeration("weapon", |p: &Player| p.weapon, |p: &mut Player, v| p.weapon = v)
                .nested("stats", |p: &Player| Some(&p.stats), |p: &mut Player| Some(&mut p.stats))
                .nested("companion", |p: &Player| p.companion.as_ref(), |p: &mut Player| {
                    p.companion.as_mut()
                })
                .opaque::<Entity>("owner")
                .float("secret", |p: &Player| p.secret, |p: &mut Player, v| p.secret = v)
                .private()
                .float("notes", |p: &Player| p.notes, |p: &mut Player, v| p.notes = v)
                .private()
                .inspectable()
                .opaque::<Vec<String>>("inventory")
        }
    }

    fn names(tree: &PropertyTree, group: NodeId) -> Vec<String> {
        tree.items(group)
            .unwrap()
            .iter()
            .map(|&id| tree[id].name().to_string())
            .collect()
    }

    fn find(tree: &PropertyTree, path: &str) -> NodeId {
        PathResolver::root(tree).find_by_path(path).unwrap()
    }

    #[test]
    fn test_build_maps_fields_to_nodes() {
        let target = shared(Player::default());
        let tree = Introspector::default().build(&target).unwrap();

        assert_eq!(tree[tree.root()].name(), "Root");
        assert_eq!(
            names(&tree, tree.root()),
            vec!["Speed", "level", "Is alive", "title", "position", "aim", "tint", "weapon", "stats", "notes"]
        );

        let speed = tree.at::<FloatProperty>(tree.root(), 0).unwrap();
        assert_eq!((speed.min(), speed.max(), speed.get()), (0.0, 10.0, 2.5));

        let level = tree.at::<IntProperty>(tree.root(), 1).unwrap();
        assert_eq!((level.min(), level.max(), level.get()), (0, 100, 3));

        let weapon = tree.at::<EnumProperty>(tree.root(), 7).unwrap();
        assert_eq!(weapon.variants(), WeaponType::variant_names().as_slice());
        assert_eq!(weapon.get_as::<WeaponType>(), Some(WeaponType::Bow));

        let stats = tree.group_at(tree.root(), 8).unwrap();
        assert_eq!(names(&tree, stats), vec!["strength", "agility"]);
    }

    #[test]
    fn test_leaves_write_through_to_target() {
        let target = shared(Player::default());
        let mut tree = Introspector::default().build(&target).unwrap();
        let root = tree.root();

        tree.at_mut::<FloatProperty>(root, 0).unwrap().set(4.0);
        tree.at_mut::<BoolProperty>(root, 2).unwrap().toggle();
        tree.at_mut::<StringProperty>(root, 3).unwrap().set("Ranger");
        tree.at_mut::<EnumProperty>(root, 7).unwrap().set_variant("Staff").unwrap();
        let strength = find(&tree, "Root.stats.strength");
        tree.leaf_mut::<IntProperty>(strength).unwrap().set(12);

        let player = target.read();
        assert_eq!(player.speed, 4.0);
        assert!(!player.alive);
        assert_eq!(player.title, "Ranger");
        assert_eq!(player.weapon, WeaponType::Staff);
        assert_eq!(player.stats.strength, 12);
    }

    #[test]
    fn test_leaves_read_live_state() {
        let target = shared(Player::default());
        let tree = Introspector::default().build(&target).unwrap();

        target.write().speed = 8.0;
        assert_eq!(tree.at::<FloatProperty>(tree.root(), 0).unwrap().get(), 8.0);
    }

    #[test]
    fn test_vec3_component_writes_only_its_axis() {
        let target = shared(Player::default());
        let mut tree = Introspector::default().build(&target).unwrap();

        let position = find(&tree, "Root.position");
        assert_eq!(names(&tree, position), vec!["X", "Y", "Z"]);
        let x = tree.at_mut::<FloatProperty>(position, 0).unwrap();
        assert_eq!((x.min(), x.max()), (0.0, 1.0));
        x.set(10.0);

        assert_eq!(target.read().position, Vec3::new(10.0, 2.0, 3.0));
        assert_eq!(tree.at::<FloatProperty>(position, 1).unwrap().get(), 2.0);
    }

    #[test]
    fn test_color_channels_in_unit_range() {
        let target = shared(Player::default());
        let mut tree = Introspector::default().build(&target).unwrap();

        let tint = find(&tree, "Root.tint");
        assert_eq!(names(&tree, tint), vec!["R", "G", "B", "A"]);
        let green = tree.at_mut::<FloatProperty>(tint, 1).unwrap();
        assert_eq!((green.min(), green.max(), green.get()), (0.0, 1.0, 0.5));
        green.set(0.75);

        let srgba = target.read().tint.to_srgba();
        assert_eq!((srgba.red, srgba.green, srgba.blue), (1.0, 0.75, 0.25));
    }

    #[test]
    fn test_exclusions_and_visibility() {
        let options = BuildOptions::default()
            .exclude_field("title")
            .exclude_type::<Vec2>()
            .exclude_field("notes");
        let target = shared(Player::default());
        let tree = Introspector::new(options).build(&target).unwrap();
        let names = names(&tree, tree.root());

        assert!(!names.contains(&"title".to_string()));
        assert!(!names.contains(&"aim".to_string()));
        // Private without marking
        assert!(!names.contains(&"secret".to_string()));
        // Marked fields bypass the exclusion list
        assert!(names.contains(&"notes".to_string()));
        // Entity is excluded by default and opaque anyway
        assert!(!names.contains(&"owner".to_string()));
    }

    #[test]
    fn test_nested_objects_can_be_disabled() {
        let target = shared(Player::default());
        let tree = Introspector::new(BuildOptions::default().with_nested_objects(false))
            .build(&target)
            .unwrap();
        assert!(PathResolver::root(&tree).find_by_path("Root.stats").is_none());
    }

    #[test]
    fn test_absent_nested_value_is_skipped() {
        let target = shared(Player::default());
        let tree = Introspector::default().build(&target).unwrap();
        assert!(PathResolver::root(&tree).find_by_path("Root.companion").is_none());

        target.write().companion = Some(Stats { strength: 1, agility: 0.1 });
        let tree = Introspector::default().build(&target).unwrap();
        let companion = find(&tree, "Root.companion");
        assert_eq!(names(&tree, companion), vec!["strength", "agility"]);
    }

    #[test]
    fn test_failing_field_leaves_others_intact() {
        let schema = Schema::<Player>::new()
            .float("speed", |p: &Player| p.speed, |p: &mut Player, v| p.speed = v)
            .enum_table(
                "broken",
                Vec::new(),
                std::any::TypeId::of::<WeaponType>(),
                "WeaponType",
                Accessor::new(|_: &Player| 0usize, |_: &mut Player, _: usize| {}),
            )
            .int("level", |p: &Player| p.level, |p: &mut Player, v| p.level = v);
        let target = shared(Player::default());
        let tree = Introspector::default()
            .build_with_schema(target.clone(), &schema, "Root")
            .unwrap();

        assert_eq!(names(&tree, tree.root()), vec!["speed", "level"]);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.at::<IntProperty>(tree.root(), 1).unwrap().get(), 3);
    }

    #[test]
    fn test_inverted_ranges_are_kept() {
        let schema = Schema::<Player>::new()
            .float("gain", |p: &Player| p.speed, |p: &mut Player, v| p.speed = v)
            .range(1.0, 0.0)
            .float("trim", |p: &Player| p.secret, |p: &mut Player, v| p.secret = v)
            .int("level", |p: &Player| p.level, |p: &mut Player, v| p.level = v)
            .vec3("position", |p: &Player| p.position, |p: &mut Player, v| p.position = v);
        let options = BuildOptions::default().with_float_range(2.0, -2.0).with_int_range(5, 1);
        let target = shared(Player::default());
        let mut tree = Introspector::new(options)
            .build_with_schema(target.clone(), &schema, "Root")
            .unwrap();
        let root = tree.root();

        assert_eq!(names(&tree, root), vec!["gain", "trim", "level", "position"]);
        let gain = tree.at_mut::<FloatProperty>(root, 0).unwrap();
        assert_eq!((gain.min(), gain.max()), (1.0, 0.0));
        gain.set(7.0);
        assert_eq!(target.read().speed, 7.0);

        let trim = tree.at::<FloatProperty>(root, 1).unwrap();
        assert_eq!((trim.min(), trim.max()), (2.0, -2.0));
        let level = tree.at::<IntProperty>(root, 2).unwrap();
        assert_eq!((level.min(), level.max()), (5, 1));
    }

    #[test]
    fn test_vector_components_use_default_range() {
        let schema = Schema::<Player>::new()
            .vec3("position", |p: &Player| p.position, |p: &mut Player, v| p.position = v)
            .range(-50.0, 50.0)
            .vec2("aim", |p: &Player| p.aim, |p: &mut Player, v| p.aim = v)
            .range(-1.0, 1.0);
        let options = BuildOptions::default().with_float_range(-5.0, 5.0);
        let target = shared(Player::default());
        let tree = Introspector::new(options)
            .build_with_schema(target.clone(), &schema, "Root")
            .unwrap();

        for path in ["Root.position.X", "Root.position.Z", "Root.aim.Y"] {
            let component = tree.leaf::<FloatProperty>(find(&tree, path)).unwrap();
            assert_eq!((component.min(), component.max()), (-5.0, 5.0), "{}", path);
        }
    }

    #[test]
    fn test_built_tree_parent_links_and_paths() {
        let target = shared(Player::default());
        target.write().companion = Some(Stats { strength: 1, agility: 0.1 });
        let tree = Introspector::default().build_named(&target, "Player").unwrap();
        let root = tree.root();

        assert_eq!(tree[root].parent(), None);
        for id in tree.descendants(root) {
            let parent = tree[id].parent().unwrap();
            assert!(tree[parent].items().contains(&id));
            assert_eq!(
                tree.full_path(id),
                format!("{}.{}", tree.full_path(parent), tree[id].name())
            );
            assert_eq!(tree.depth(id), tree.depth(parent) + 1);
            assert_eq!(find(&tree, &tree.full_path(id)), id);
        }
        assert_eq!(tree.depth(find(&tree, "Player.companion.agility")), 2);
        assert_eq!(tree.depth(find(&tree, "Player.tint.A")), 2);
    }

    #[test]
    fn test_depth_limit_fails_only_the_nested_field() {
        let target = shared(Player::default());
        let tree = Introspector::new(BuildOptions::default().with_max_depth(0))
            .build(&target)
            .unwrap();

        assert!(PathResolver::root(&tree).find_by_path("Root.stats").is_none());
        assert!(PathResolver::root(&tree).find_by_path("Root.Speed").is_some());
    }

    #[test]
    fn test_build_is_idempotent_in_shape() {
        let target = shared(Player::default());
        let introspector = Introspector::default();
        let first = introspector.build(&target).unwrap();
        let second = introspector.build(&target).unwrap();

        let shape = |tree: &PropertyTree| -> Vec<(String, bool)> {
            tree.descendants(tree.root())
                .into_iter()
                .map(|id| (tree.full_path(id), tree[id].is_group()))
                .collect()
        };
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn test_absent_target_fails_fast() {
        let target = shared(Player::default());
        let weak = Arc::downgrade(&target);
        drop(target);

        let result = Introspector::default().build_weak(&weak, "Root");
        assert!(matches!(result, Err(PropertyError::InvalidArgument(_))));
    }

    #[test]
    fn test_weak_build_reads_defaults_after_drop() {
        let target = shared(Player::default());
        let weak = Arc::downgrade(&target);
        let mut tree = Introspector::default().build_weak(&weak, "Player").unwrap();
        drop(target);

        let speed = tree.at_mut::<FloatProperty>(tree.root(), 0).unwrap();
        speed.set(1.0);
        assert_eq!(speed.get(), 0.0);
    }

    #[test]
    fn test_built_tree_accepts_extra_nodes() {
        let target = shared(Player::default());
        let mut tree = Introspector::default().build_named(&target, "Player").unwrap();
        let root = tree.root();
        let actions = tree.add_group(root, "Actions").unwrap();
        tree.add(actions, "Reset", ActionProperty::new(|| {})).unwrap();

        assert_eq!(tree.full_path(find(&tree, "Player.Actions.Reset")), "Player.Actions.Reset");
    }
}
