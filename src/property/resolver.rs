//! Property resolution.
//!
//! The resolver runs the [`Classifier`] over every method of a type, groups the resulting
//! candidates by property name and picks one reader and one writer per group. Groups backed only
//! by unranked candidates are dropped, and a writer whose parameter cannot accept the reader's
//! value (after boxing) is demoted, leaving the property read-only.
//!
//! Resolution is deterministic: groups keep the order in which their first candidate was seen
//! and ties between equally ranked candidates go to the method declared first.

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::{
    property::{
        classifier::{AccessorCandidate, Classifier, Direction, DiscoveryScratch},
        ResolvedProperties, ResolvedProperty,
    },
    typesystem::{TypeDescriptorRc, TypeRegistry},
};

#[derive(Default)]
struct CandidateGroup {
    readers: Vec<AccessorCandidate>,
    writers: Vec<AccessorCandidate>,
}

impl CandidateGroup {
    fn push(&mut self, candidate: AccessorCandidate) {
        match candidate.direction {
            Direction::Reader => self.readers.push(candidate),
            Direction::Writer => self.writers.push(candidate),
        }
    }
}

/// Resolve the properties of `descriptor`.
///
/// ## Arguments
/// * `registry` - The registry that produced `descriptor`, used for ancestor lookups
/// * `descriptor` - The type to resolve
#[must_use]
pub fn resolve(registry: &TypeRegistry, descriptor: &TypeDescriptorRc) -> ResolvedProperties {
    debug!(type_name = descriptor.name(), "resolving properties");

    let scratch = DiscoveryScratch::new(registry, descriptor);
    let classifier = Classifier::new(&scratch);

    let mut groups: IndexMap<String, CandidateGroup> = IndexMap::new();
    for method in descriptor.methods() {
        if let Some(candidate) = classifier.classify(method) {
            trace!(
                type_name = descriptor.name(),
                method = method.name(),
                property = %candidate.name,
                direction = ?candidate.direction,
                evidence = ?candidate.evidence,
                "accessor candidate"
            );
            groups
                .entry(candidate.name.clone())
                .or_default()
                .push(candidate);
        }
    }
    drop(scratch);

    let mut properties = IndexMap::with_capacity(groups.len());
    for (name, group) in groups {
        let reader = group.readers.iter().min_by_key(|c| c.priority());
        let writer = group.writers.iter().min_by_key(|c| c.priority());

        let ranked = |side: Option<&AccessorCandidate>| side.is_some_and(|c| c.evidence.is_ranked());
        if !ranked(reader) && !ranked(writer) {
            trace!(
                type_name = descriptor.name(),
                property = %name,
                "dropping unranked property"
            );
            continue;
        }

        let writer = match (reader, writer) {
            (Some(reader), Some(writer))
                if !registry
                    .is_assignable(&writer.value_type().boxed(), &reader.value_type().boxed()) =>
            {
                warn!(
                    type_name = descriptor.name(),
                    property = %name,
                    reader = %reader.value_type(),
                    writer = %writer.value_type(),
                    "writer cannot accept reader type, property is read-only"
                );
                None
            }
            (_, writer) => writer,
        };

        let property = ResolvedProperty {
            name: name.clone(),
            reader: reader.map(|c| c.method.clone()),
            writer: writer.map(|c| c.method.clone()),
        };
        properties.insert(name, property);
    }

    debug!(
        type_name = descriptor.name(),
        properties = properties.len(),
        "resolved properties"
    );

    ResolvedProperties {
        owner: descriptor.clone(),
        properties,
    }
}
