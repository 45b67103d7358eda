//! Example generation.
//!
//! After a successful run every attribute without a declared example gets a
//! synthesized one. Synthesis is never memoized: each reference to a named
//! type synthesizes that type again with fresh randomness, reusing only
//! explicit examples. Recursion through named types is cut by a guard that
//! tracks the types currently being synthesized on the call stack, so sibling
//! references still synthesize independently while cycles terminate with an
//! empty placeholder.

mod format;
mod pattern;

use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::attribute::{AttributeDefinition, Example, ValidationDefinition};
use crate::config::DesignConfig;
use crate::media_type::MediaTypeDefinition;
use crate::registry::Registry;
use crate::types::{DataType, MediaTypeId, Object, Primitive, TypeKey};

/// Synthesizes example values from a resolved registry.
///
/// ## Examples
///
/// ```
/// use apidsl_define::{AttributeDefinition, DesignConfig, ExampleGenerator, Primitive, Registry};
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let registry = Registry::default();
/// let config = DesignConfig::default();
/// let mut rng = StdRng::seed_from_u64(1);
/// let mut generator = ExampleGenerator::new(&registry, &mut rng, &config);
///
/// let mut count = AttributeDefinition::new(Primitive::Integer);
/// count.validation.minimum = Some(10.0);
/// let value = generator.synthesize(&count);
/// assert!(value.as_i64().unwrap() > 10);
/// ```
pub struct ExampleGenerator<'a, R: Rng + ?Sized> {
    registry: &'a Registry,
    rng: &'a mut R,
    config: &'a DesignConfig,
    in_progress: Vec<TypeKey>,
}

impl<'a, R: Rng + ?Sized> ExampleGenerator<'a, R> {
    pub fn new(registry: &'a Registry, rng: &'a mut R, config: &'a DesignConfig) -> Self {
        Self {
            registry,
            rng,
            config,
            in_progress: Vec::new(),
        }
    }

    /// The example an attribute renders with: its explicit value, nothing
    /// when it declares no example, a fresh synthesis otherwise.
    pub fn example_for(&mut self, attribute: &AttributeDefinition) -> Option<Value> {
        match &attribute.example {
            Example::Explicit(value) => Some(value.clone()),
            Example::Absent => None,
            Example::NotComputed | Example::Generated(_) => Some(self.synthesize(attribute)),
        }
    }

    /// Synthesizes a value of the attribute's type honoring its validations.
    pub fn synthesize(&mut self, attribute: &AttributeDefinition) -> Value {
        let validation = &attribute.validation;
        if let Some(value) = validation.enum_values.choose(&mut *self.rng) {
            return value.clone();
        }
        match &attribute.data_type {
            DataType::Primitive(primitive) => self.primitive(*primitive, validation),
            DataType::Object(members) => self.object(members),
            DataType::Array(array) => {
                let len = self.length(validation);
                let items = (0..len)
                    .map(|_| self.example_for(&array.element).unwrap_or(Value::Null))
                    .collect();
                Value::Array(items)
            }
            DataType::Map(map) => {
                let len = self.length(validation);
                let mut entries = Map::new();
                for _ in 0..len {
                    let key = match self.example_for(&map.key) {
                        Some(Value::String(key)) => key,
                        Some(other) => other.to_string(),
                        None => continue,
                    };
                    let value = self.example_for(&map.value).unwrap_or(Value::Null);
                    entries.insert(key, value);
                }
                Value::Object(entries)
            }
            DataType::User(id) => {
                let registry = self.registry;
                self.guarded(TypeKey::User(*id), &registry.user_type(*id).attribute)
            }
            DataType::Media(id) => {
                let registry = self.registry;
                let value = self.guarded(TypeKey::Media(*id), &registry.media_type(*id).attribute);
                project_view(registry, attribute, value)
            }
        }
    }

    /// Synthesizes the root of a named type unless it is already being
    /// synthesized further up the stack.
    fn guarded(&mut self, key: TypeKey, root: &AttributeDefinition) -> Value {
        if self.in_progress.contains(&key) {
            trace!(?key, "recursive type, using placeholder");
            return match root.data_type {
                DataType::Array(_) => Value::Array(Vec::new()),
                _ => Value::Object(Map::new()),
            };
        }
        self.in_progress.push(key);
        let value = self.example_for(root).unwrap_or(Value::Null);
        self.in_progress.pop();
        value
    }

    fn object(&mut self, members: &Object) -> Value {
        let mut map = Map::new();
        for (name, member) in members {
            if let Some(value) = self.example_for(member) {
                map.insert(name.clone(), value);
            }
        }
        Value::Object(map)
    }

    fn primitive(&mut self, primitive: Primitive, validation: &ValidationDefinition) -> Value {
        match primitive {
            Primitive::Boolean => Value::Bool(self.rng.gen_bool(0.5)),
            Primitive::Integer => self.integer(validation),
            Primitive::Number => self.number(validation),
            Primitive::String => Value::String(self.string(validation)),
            Primitive::DateTime => Value::String(format::date_time(&mut *self.rng)),
            Primitive::Uuid => Value::String(format::uuid(&mut *self.rng)),
            Primitive::Any => Value::String(format::word(&mut *self.rng).to_string()),
            Primitive::File => Value::String(format!("{}.txt", format::word(&mut *self.rng))),
        }
    }

    /// Strictly above the minimum, at most the maximum. Equal bounds yield
    /// the bound.
    fn integer(&mut self, validation: &ValidationDefinition) -> Value {
        let value = match (validation.minimum, validation.maximum) {
            (Some(min), Some(max)) if min == max => max.floor() as i64,
            (Some(min), Some(max)) => {
                let lo = (min.floor() as i64).saturating_add(1);
                let hi = max.floor() as i64;
                if lo > hi { hi } else { self.rng.gen_range(lo..=hi) }
            }
            (Some(min), None) => {
                let lo = (min.floor() as i64).saturating_add(1);
                self.rng.gen_range(lo..=lo.saturating_add(1000))
            }
            (None, Some(max)) => {
                let hi = max.floor() as i64;
                self.rng.gen_range(hi.saturating_sub(1000)..=hi)
            }
            (None, None) => self.rng.gen_range(1..=1000),
        };
        Value::from(value)
    }

    fn number(&mut self, validation: &ValidationDefinition) -> Value {
        let value = match (validation.minimum, validation.maximum) {
            (Some(min), Some(max)) if min >= max => max,
            (Some(min), Some(max)) => max - self.rng.gen_range(0.0..(max - min)),
            (Some(min), None) => min + self.rng.gen_range(1.0..1000.0),
            (None, Some(max)) => max - self.rng.gen_range(0.0..1000.0),
            (None, None) => self.rng.gen_range(0.0..1000.0),
        };
        Value::from(value)
    }

    fn string(&mut self, validation: &ValidationDefinition) -> String {
        if let Some(pattern) = &validation.pattern
            && let Some(generated) =
                pattern::generate(pattern, &mut *self.rng, self.config.max_pattern_repeat)
        {
            return generated;
        }
        if let Some(format) = validation.format {
            return format::generate(format, &mut *self.rng);
        }
        format::lorem(&mut *self.rng, validation.min_length, validation.max_length)
    }

    /// Array and map sizes: at least one item unless the maximum is zero.
    fn length(&mut self, validation: &ValidationDefinition) -> usize {
        let lo = validation
            .min_length
            .unwrap_or(1)
            .min(validation.max_length.unwrap_or(usize::MAX));
        let hi = validation
            .max_length
            .unwrap_or(self.config.max_collection_length)
            .max(lo);
        self.rng.gen_range(lo..=hi)
    }
}

/// A synthesized example and where it goes.
struct Update {
    owner: TypeKey,
    path: Vec<String>,
    value: Value,
}

/// Generates examples for every definition of the registry.
///
/// Values are computed against the registry as declared and written back in
/// a second step, so nested synthesis only ever reuses explicit examples.
/// Views then copy the examples of the attributes they project, narrowed to
/// the views those attributes render.
pub(crate) fn populate<R: Rng + ?Sized>(registry: &mut Registry, rng: &mut R, config: &DesignConfig) {
    let updates = {
        let reader: &Registry = registry;
        let mut generator = ExampleGenerator::new(reader, rng, config);
        let mut updates = Vec::new();
        for def in reader.all_user_types() {
            plan(
                &mut generator,
                TypeKey::User(def.id),
                &def.attribute,
                &mut Vec::new(),
                &mut updates,
            );
        }
        for def in reader.all_media_types() {
            plan(
                &mut generator,
                TypeKey::Media(def.id),
                &def.attribute,
                &mut Vec::new(),
                &mut updates,
            );
        }
        updates
    };

    let generated = updates.len();
    for update in updates {
        apply(registry, update);
    }
    for index in 0..registry.all_media_types().len() {
        let id = MediaTypeId(index);
        let views = plan_views(registry, registry.media_type(id));
        let def = registry.media_type_mut(id);
        for (name, attribute) in views {
            if let Some(view) = def.views.get_mut(&name) {
                view.attribute = attribute;
            }
        }
    }
    debug!(generated, "generated examples");
}

/// Computes the example of `attribute` and of its inline members, recording
/// an update for each one that needs synthesis. Inline objects are assembled
/// from their members.
fn plan<R: Rng + ?Sized>(
    generator: &mut ExampleGenerator<'_, R>,
    owner: TypeKey,
    attribute: &AttributeDefinition,
    path: &mut Vec<String>,
    updates: &mut Vec<Update>,
) -> Option<Value> {
    let assembled = attribute.members().map(|members| {
        let mut map = Map::new();
        for (name, member) in members {
            path.push(name.clone());
            if let Some(value) = plan(generator, owner, member, path, updates) {
                map.insert(name.clone(), value);
            }
            path.pop();
        }
        Value::Object(map)
    });

    match &attribute.example {
        Example::Explicit(value) | Example::Generated(value) => Some(value.clone()),
        Example::Absent => None,
        Example::NotComputed => {
            let value = match assembled {
                Some(object) if attribute.validation.enum_values.is_empty() => object,
                _ => generator.synthesize(attribute),
            };
            updates.push(Update {
                owner,
                path: path.clone(),
                value: value.clone(),
            });
            Some(value)
        }
    }
}

fn apply(registry: &mut Registry, update: Update) {
    let mut target = match update.owner {
        TypeKey::Media(id) => &mut registry.media_type_mut(id).attribute,
        TypeKey::User(id) => &mut registry.user_type_mut(id).attribute,
    };
    for name in &update.path {
        match target.member_mut(name) {
            Some(member) => target = member,
            None => return,
        }
    }
    if target.example == Example::NotComputed {
        target.example = Example::Generated(update.value);
    }
}

/// Example-filled copies of every view of `def`, keyed by view name.
///
/// View attributes take the examples of the parent attributes they project,
/// restricted to whatever view they render their media type with.
fn plan_views(
    registry: &Registry,
    def: &MediaTypeDefinition,
) -> Vec<(String, AttributeDefinition)> {
    let mut planned = Vec::with_capacity(def.views.len());
    for (name, view) in &def.views {
        let mut attribute = view.attribute.clone();
        match attribute.data_type.as_object_mut() {
            None => {
                copy_examples(&def.attribute, &mut attribute);
                project_example(registry, &mut attribute);
            }
            Some(members) => {
                let mut assembled = Map::new();
                for (member_name, member) in members.iter_mut() {
                    if let Some(parent) = def.attribute.member(member_name) {
                        copy_examples(parent, member);
                    }
                    project_example(registry, member);
                    if let Some(value) = member.example.value() {
                        assembled.insert(member_name.clone(), value.clone());
                    }
                }
                if attribute.example == Example::NotComputed {
                    attribute.example = Example::Generated(Value::Object(assembled));
                }
            }
        }
        planned.push((name.clone(), attribute));
    }
    planned
}

fn project_example(registry: &Registry, attribute: &mut AttributeDefinition) {
    attribute.example = match &attribute.example {
        Example::Explicit(value) => {
            Example::Explicit(project_view(registry, attribute, value.clone()))
        }
        Example::Generated(value) => {
            Example::Generated(project_view(registry, attribute, value.clone()))
        }
        Example::NotComputed | Example::Absent => return,
    };
}

/// Restricts `value`, an example of `attribute`, to the keys each media type
/// view along the way renders.
fn project_view(registry: &Registry, attribute: &AttributeDefinition, value: Value) -> Value {
    match (&attribute.data_type, value) {
        (DataType::Media(id), value) => {
            let view = attribute
                .view
                .as_deref()
                .and_then(|name| registry.media_type(*id).view(name));
            let Some(view) = view else {
                return value;
            };
            match (view.attribute.members(), value) {
                (Some(members), Value::Object(mut map)) => {
                    map.retain(|key, _| members.contains_key(key));
                    project_members(registry, members, &mut map);
                    Value::Object(map)
                }
                (_, value) => project_view(registry, &view.attribute, value),
            }
        }
        (DataType::Array(array), Value::Array(items)) => Value::Array(
            items
                .into_iter()
                .map(|item| project_view(registry, &array.element, item))
                .collect(),
        ),
        (DataType::Object(members), Value::Object(mut map)) => {
            project_members(registry, members, &mut map);
            Value::Object(map)
        }
        (_, value) => value,
    }
}

fn project_members(registry: &Registry, members: &Object, map: &mut Map<String, Value>) {
    for (key, value) in map.iter_mut() {
        if let Some(member) = members.get(key) {
            *value = project_view(registry, member, value.take());
        }
    }
}

fn copy_examples(from: &AttributeDefinition, to: &mut AttributeDefinition) {
    if to.example == Example::NotComputed {
        to.example = from.example.clone();
    }
    if let (Some(source), Some(members)) = (from.members(), to.data_type.as_object_mut()) {
        for (name, member) in members.iter_mut() {
            if let Some(parent) = source.get(name) {
                copy_examples(parent, member);
            }
        }
    }
}
