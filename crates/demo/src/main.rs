//! # proptree demo
//!
//! Builds a property tree mixing hand-made groups with introspected objects,
//! prints it and runs a search query against it.
//!
//! ## Usage
//!
//! ```bash
//! # Print the sample tree
//! proptree-demo
//!
//! # Search: `*` wildcards, trailing `.` for a prefix, anything else is an exact path
//! proptree-demo --query "root.*.Speed"
//! proptree-demo --query "root.GroupA."
//!
//! # Build the sample object through Bevy reflection instead of its schema
//! proptree-demo --reflect
//!
//! # Load build options
//! proptree-demo --options build.toml
//! ```
//!
//! ## Build options (build.toml)
//!
//! ```toml
//! exclude_field_names = ["name"]
//! allow_nested_objects = true
//! default_float_min = 0.0
//! default_float_max = 10.0
//! max_depth = 8
//! ```

use bevy::math::Vec3;
use bevy::reflect::Reflect;
use clap::Parser;
use proptree_core::prelude::*;
use proptree_reflect::{Header, Range, ReflectIntrospector};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "proptree-demo")]
#[command(about = "Build, print and search a sample property tree")]
#[command(version)]
struct Args {
    /// Build options file (TOML)
    #[arg(short, long)]
    options: Option<PathBuf>,

    /// Search query run against the tree
    #[arg(short, long)]
    query: Option<String>,

    /// Introspect the sample object through Bevy reflection
    #[arg(long)]
    reflect: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

// ============================================================================
// Sample state
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
enum PlayerState {
    Idle,
    Walking,
    Running,
    Jumping,
    Falling,
}

property_enum!(PlayerState { Idle, Walking, Running, Jumping, Falling });

#[derive(Debug, Clone, Copy, PartialEq)]
enum WeaponType {
    Sword,
    Bow,
    Staff,
    Dagger,
}

property_enum!(WeaponType { Sword, Bow, Staff, Dagger });

#[derive(Debug)]
struct Audio {
    speed: f32,
    volume: f32,
}

#[derive(Debug)]
struct Flags {
    enabled: bool,
    debug_mode: bool,
}

/// Object built into its own group by the introspector
#[derive(Reflect, Debug, Clone)]
struct SampleA {
    #[reflect(@Range { min: -10.0, max: 10.0 })]
    i: i32,
    #[reflect(@Header("Factor"))]
    f: f32,
    name: String,
    offset: Vec3,
}

impl Inspect for SampleA {
    fn schema() -> Schema<Self> {
        Schema::new()
            .int("i", |s: &SampleA| s.i, |s: &mut SampleA, v| s.i = v)
            .range(-10.0, 10.0)
            .float("f", |s: &SampleA| s.f, |s: &mut SampleA, v| s.f = v)
            .header("Factor")
            .string("name", |s: &SampleA| s.name.clone(), |s: &mut SampleA, v| s.name = v)
            .vec3("offset", |s: &SampleA| s.offset, |s: &mut SampleA, v| s.offset = v)
    }
}

// ============================================================================
// Tree assembly
// ============================================================================

fn float_adapter(
    audio: &Shared<Audio>,
    min: f32,
    max: f32,
    read: fn(&Audio) -> f32,
    write: fn(&mut Audio, f32),
) -> FloatProperty {
    let (reader, writer) = (audio.clone(), audio.clone());
    FloatProperty::bound(min, max, move || read(&reader.read()), move |v| write(&mut writer.write(), v))
}

fn bool_adapter(flags: &Shared<Flags>, read: fn(&Flags) -> bool, write: fn(&mut Flags, bool)) -> BoolProperty {
    let (reader, writer) = (flags.clone(), flags.clone());
    BoolProperty::bound(move || read(&reader.read()), move |v| write(&mut writer.write(), v))
}

/// Action that flips one bool of the animator parameter group
fn toggle_action(animator: &Shared<PropertyTree>, index: usize) -> ActionProperty {
    let animator = animator.clone();
    ActionProperty::new(move || {
        let mut tree = animator.write();
        let root = tree.root();
        match tree.at_mut::<BoolProperty>(root, index) {
            Ok(parameter) => {
                let value = parameter.toggle();
                info!("Animator parameter {} -> {}", index, value);
            }
            Err(e) => warn!("Failed to toggle animator parameter: {}", e),
        }
    })
}

struct Sample {
    audio: Shared<Audio>,
    flags: Shared<Flags>,
    animator: Shared<PropertyTree>,
    sample_a: Shared<SampleA>,
}

impl Sample {
    fn new() -> Self {
        let animator = PropertyTree::with_items(
            "toAnimator",
            [
                ("Jump", BoolProperty::default().into()),
                ("Rest", BoolProperty::default().into()),
            ],
        );

        Self {
            audio: shared(Audio { speed: 5.0, volume: 0.75 }),
            flags: shared(Flags { enabled: true, debug_mode: false }),
            animator: shared(animator),
            sample_a: shared(SampleA {
                i: 3,
                f: 0.5,
                name: "sample".to_string(),
                offset: Vec3::ZERO,
            }),
        }
    }

    fn build(&self, options: &BuildOptions, use_reflect: bool) -> proptree_reflect::Result<PropertyTree> {
        let mut tree = PropertyTree::new("root");
        let root = tree.root();

        tree.add(root, "Speed", float_adapter(&self.audio, 0.0, 10.0, |a| a.speed, |a, v| a.speed = v))?;
        tree.add(root, "Volume", float_adapter(&self.audio, 0.0, 1.0, |a| a.volume, |a, v| a.volume = v))?;
        tree.add(root, "Run", ActionProperty::new(|| info!("Run")))?;

        let bools = tree.add_group(root, "BoolProperties")?;
        tree.add(bools, "Jump", BoolProperty::default())?;
        tree.add(bools, "Rest", BoolProperty::new(true))?;
        tree.add(bools, "Enabled", bool_adapter(&self.flags, |f| f.enabled, |f, v| f.enabled = v))?;
        tree.add(
            bools,
            "Debug Mode",
            bool_adapter(&self.flags, |f| f.debug_mode, |f, v| f.debug_mode = v),
        )?;

        let group_a = tree.add_group(root, "GroupA")?;
        tree.add(group_a, "Speed", float_adapter(&self.audio, 0.0, 10.0, |a| a.speed, |a, v| a.speed = v))?;
        tree.add(group_a, "Volume", float_adapter(&self.audio, 0.0, 1.0, |a| a.volume, |a, v| a.volume = v))?;
        tree.add(group_a, "Run", ActionProperty::new(|| info!("Run")))?;

        // Duplicate names are allowed; lookups return the first
        let group_b = tree.add_group(root, "GroupB")?;
        tree.add(group_b, "Run", toggle_action(&self.animator, 0))?;
        tree.add(group_b, "Run", toggle_action(&self.animator, 1))?;

        let enums = tree.add_group(root, "Enums")?;
        tree.add(enums, "Player", EnumProperty::new(PlayerState::Idle))?;
        tree.add(enums, "Weapon", EnumProperty::new(WeaponType::Sword))?;

        let sample_a = if use_reflect {
            ReflectIntrospector::new(options.clone()).build(&self.sample_a, DEFAULT_ROOT_NAME)?
        } else {
            Introspector::new(options.clone()).build(&self.sample_a)?
        };
        tree.graft(root, sample_a)?;

        Ok(tree)
    }
}

// ============================================================================
// Output
// ============================================================================

fn describe(property: &Property) -> String {
    match property {
        Property::Float(p) => format!("{} [{}, {}]", p.get(), p.min(), p.max()),
        Property::Int(p) => format!("{} [{}, {}]", p.get(), p.min(), p.max()),
        Property::Bool(p) => p.get().to_string(),
        Property::Text(p) => format!("{:?}", p.get()),
        Property::Enum(p) => match p.get() {
            Some(value) => format!("{} ({})", value.name, p.variants().join(" | ")),
            None => format!("<invalid ordinal {}>", p.ordinal()),
        },
        Property::Action(_) => "<action>".to_string(),
    }
}

fn print_tree(tree: &PropertyTree) {
    println!("{}", tree[tree.root()].name());
    for id in tree.descendants(tree.root()) {
        let node = &tree[id];
        let indent = "  ".repeat(tree.depth(id));
        match node.property() {
            Some(property) => println!("{}{}: {}", indent, node.name(), describe(property)),
            None => println!("{}{}/", indent, node.name()),
        }
    }
}

fn load_options(path: &Path) -> BuildOptions {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            warn!("Failed to parse build options: {}, using defaults", e);
            BuildOptions::default()
        }),
        Err(e) => {
            warn!("Failed to read build options file: {}, using defaults", e);
            BuildOptions::default()
        }
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = args.options.as_deref().map(load_options).unwrap_or_default();
    let sample = Sample::new();

    let tree = match sample.build(&options, args.reflect) {
        Ok(tree) => tree,
        Err(e) => {
            error!("Failed to build property tree: {}", e);
            std::process::exit(1);
        }
    };
    print_tree(&tree);

    let Some(query) = args.query.as_deref().and_then(SearchQuery::parse) else {
        return;
    };
    info!("Search {:?}", query);

    let matches = PathResolver::root(&tree).search(&query);
    if matches.is_empty() {
        println!("no matches");
    }
    for id in matches {
        let node = &tree[id];
        match node.property() {
            Some(Property::Action(action)) => {
                println!("{} (running)", tree.full_path(id));
                action.execute();
            }
            Some(property) => println!("{} = {}", tree.full_path(id), describe(property)),
            None => println!("{}/", tree.full_path(id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(tree: &PropertyTree) -> Vec<String> {
        tree.descendants(tree.root())
            .into_iter()
            .map(|id| tree.full_path(id))
            .collect()
    }

    #[test]
    fn test_sample_tree_search() {
        let sample = Sample::new();
        let tree = sample.build(&BuildOptions::default(), false).unwrap();
        let resolver = PathResolver::root(&tree);

        let speeds = resolver.find_by_pattern("root.*.Speed");
        assert_eq!(speeds.len(), 1);
        assert_eq!(tree.full_path(speeds[0]), "root.GroupA.Speed");
        assert_eq!(resolver.find_by_prefix("GroupA").len(), 3);
        assert!(resolver.find_by_path("root.Root.offset.X").is_some());
    }

    #[test]
    fn test_adapters_share_state() {
        let sample = Sample::new();
        let mut tree = sample.build(&BuildOptions::default(), false).unwrap();
        let group_a_speed = PathResolver::root(&tree).find_by_path("root.GroupA.Speed").unwrap();

        tree.leaf_mut::<FloatProperty>(group_a_speed).unwrap().set(7.0);
        assert_eq!(tree.at::<FloatProperty>(tree.root(), 0).unwrap().get(), 7.0);
        assert_eq!(sample.audio.read().speed, 7.0);
    }

    #[test]
    fn test_duplicate_run_actions_toggle_animator() {
        let sample = Sample::new();
        let tree = sample.build(&BuildOptions::default(), false).unwrap();
        let group_b = PathResolver::root(&tree).find_by_path("root.GroupB").unwrap();

        tree.at::<ActionProperty>(group_b, 1).unwrap().execute();
        let animator = sample.animator.read();
        assert!(!animator.at::<BoolProperty>(animator.root(), 0).unwrap().get());
        assert!(animator.at::<BoolProperty>(animator.root(), 1).unwrap().get());
    }

    #[test]
    fn test_reflect_and_schema_agree() {
        let sample = Sample::new();
        let by_schema = sample.build(&BuildOptions::default(), false).unwrap();
        let by_reflect = sample.build(&BuildOptions::default(), true).unwrap();
        assert_eq!(shape(&by_schema), shape(&by_reflect));
    }

    #[test]
    fn test_options_from_toml() {
        let options: BuildOptions = toml::from_str("exclude_field_names = [\"name\"]").unwrap();
        let sample = Sample::new();
        let tree = sample.build(&options, false).unwrap();
        assert!(PathResolver::root(&tree).find_by_path("root.Root.name").is_none());
        assert!(PathResolver::root(&tree).find_by_path("root.Root.Factor").is_some());
    }
}
