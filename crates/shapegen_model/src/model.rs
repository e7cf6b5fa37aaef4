//! The shape graph and its lookups.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::{Member, ModelError, Shape, ShapeId, ShapeKind};

/// Namespace of the built-in prelude shapes (`smithy.api#String`, ...).
pub const PRELUDE_NAMESPACE: &str = "smithy.api";

/// A loaded shape graph.
///
/// Every model starts with the prelude simple shapes and `smithy.api#Unit`, so hand-written models can target them
/// without declaring them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    shapes: BTreeMap<ShapeId, Shape>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create a model containing only the prelude.
    pub fn new() -> Self {
        let prelude = [
            ("Blob", ShapeKind::Blob),
            ("Boolean", ShapeKind::Boolean),
            ("String", ShapeKind::String),
            ("Byte", ShapeKind::Byte),
            ("Short", ShapeKind::Short),
            ("Integer", ShapeKind::Integer),
            ("Long", ShapeKind::Long),
            ("Float", ShapeKind::Float),
            ("Double", ShapeKind::Double),
            ("BigInteger", ShapeKind::BigInteger),
            ("BigDecimal", ShapeKind::BigDecimal),
            ("Timestamp", ShapeKind::Timestamp),
            ("Document", ShapeKind::Document),
            ("Unit", ShapeKind::Structure { members: Vec::new() }),
        ];
        let shapes = prelude
            .into_iter()
            .map(|(name, kind)| {
                let id = ShapeId::new(PRELUDE_NAMESPACE, name);
                (id.clone(), Shape::new(id, kind))
            })
            .collect();
        Self { shapes }
    }

    /// Add or replace a shape.
    pub fn insert(&mut self, shape: Shape) {
        self.shapes.insert(shape.id.clone(), shape);
    }

    pub fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    /// Look up a shape, failing with [`ModelError::UnknownShapeReference`].
    pub fn expect_shape(&self, id: &ShapeId) -> Result<&Shape, ModelError> {
        self.shapes
            .get(id)
            .ok_or_else(|| ModelError::unknown(id, "model lookup"))
    }

    /// Look up a member of a container, failing with [`ModelError::MissingMember`].
    pub fn expect_member(&self, container: &ShapeId, member: &str) -> Result<&Member, ModelError> {
        self.expect_shape(container)?
            .member(member)
            .ok_or_else(|| ModelError::MissingMember {
                container: container.clone(),
                member: member.to_string(),
            })
    }

    /// Look up a member by its absolute id (`ns#Container$member`).
    pub fn member(&self, id: &ShapeId) -> Result<&Member, ModelError> {
        match id.member() {
            Some(name) => self.expect_member(&id.without_member(), name),
            None => Err(ModelError::invalid(id.to_string(), "not a member id")),
        }
    }

    /// All shapes in sorted id order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn is_prelude(id: &ShapeId) -> bool {
        id.namespace() == PRELUDE_NAMESPACE
    }

    /// Check that every reference in the graph resolves.
    ///
    /// ## Errors
    /// - [`ModelError::UnknownShapeReference`] naming the first dangling reference (in sorted shape order).
    /// - [`ModelError::InvalidModel`] if an operation's error is not an error structure, or a list, set or map
    ///   contains itself without passing through a structure or union.
    pub fn validate(&self) -> Result<(), ModelError> {
        for shape in self.shapes() {
            for member in shape.members() {
                if !self.shapes.contains_key(&member.target) {
                    return Err(ModelError::unknown(&member.target, format!("member `{}`", member.id)));
                }
            }
            match &shape.kind {
                ShapeKind::Operation { input, output, errors } => {
                    for io in input.iter().chain(output.iter()) {
                        let target = self.shape(io).ok_or_else(|| {
                            ModelError::unknown(io, format!("operation `{}`", shape.id))
                        })?;
                        if !matches!(target.kind, ShapeKind::Structure { .. }) {
                            return Err(ModelError::invalid(
                                shape.id.to_string(),
                                format!("input/output `{io}` is not a structure"),
                            ));
                        }
                    }
                    for error in errors {
                        let target = self.shape(error).ok_or_else(|| {
                            ModelError::unknown(error, format!("errors of operation `{}`", shape.id))
                        })?;
                        if !target.is_error() {
                            return Err(ModelError::invalid(
                                shape.id.to_string(),
                                format!("`{error}` is listed as an error but has no error trait"),
                            ));
                        }
                    }
                }
                ShapeKind::Service { operations, .. } => {
                    for op in operations {
                        let target = self.shape(op).ok_or_else(|| {
                            ModelError::unknown(op, format!("service `{}`", shape.id))
                        })?;
                        if !matches!(target.kind, ShapeKind::Operation { .. }) {
                            return Err(ModelError::invalid(
                                shape.id.to_string(),
                                format!("`{op}` is bound as an operation but is a {}", target.kind.type_name()),
                            ));
                        }
                    }
                }
                _ => {}
            }
        }
        self.check_collection_cycles()
    }

    /// Collections resolve to anonymous slice and map types, so a collection-only cycle has no finite spelling.
    fn check_collection_cycles(&self) -> Result<(), ModelError> {
        let mut finished: BTreeSet<&ShapeId> = BTreeSet::new();
        for root in self.shapes().filter(|shape| shape.kind.is_collection()) {
            if finished.contains(&root.id) {
                continue;
            }
            let mut on_path: BTreeSet<&ShapeId> = BTreeSet::from([&root.id]);
            let mut stack = vec![(root, self.collection_targets(root))];
            while let Some((shape, targets)) = stack.last_mut() {
                let current = *shape;
                match targets.next() {
                    Some(next) if on_path.contains(&next.id) => {
                        return Err(ModelError::invalid(
                            next.id.to_string(),
                            format!(
                                "collection contains itself through `{}` without an intervening structure or union",
                                current.id
                            ),
                        ));
                    }
                    Some(next) if finished.contains(&next.id) => {}
                    Some(next) => {
                        on_path.insert(&next.id);
                        stack.push((next, self.collection_targets(next)));
                    }
                    None => {
                        on_path.remove(&current.id);
                        finished.insert(&current.id);
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }

    /// Collection-typed member targets of a collection shape.
    fn collection_targets(&self, shape: &Shape) -> std::vec::IntoIter<&Shape> {
        let targets: Vec<&Shape> = if shape.kind.is_collection() {
            shape
                .members()
                .into_iter()
                .filter_map(|member| self.shape(&member.target))
                .filter(|target| target.kind.is_collection())
                .collect()
        } else {
            Vec::new()
        };
        targets.into_iter()
    }

    /// Operations bound to a service, in sorted id order.
    pub fn operations(&self, service: &ShapeId) -> Result<Vec<&Shape>, ModelError> {
        let shape = self.expect_shape(service)?;
        let ShapeKind::Service { operations, .. } = &shape.kind else {
            return Err(ModelError::invalid(service.to_string(), "not a service shape"));
        };
        let sorted: BTreeSet<&ShapeId> = operations.iter().collect();
        sorted
            .into_iter()
            .map(|op| {
                self.shape(op)
                    .ok_or_else(|| ModelError::unknown(op, format!("service `{service}`")))
            })
            .collect()
    }

    /// Every shape reachable from a service, in sorted id order.
    ///
    /// Follows operation bindings, operation input/output/errors, and member targets.
    #[tracing::instrument(skip_all, fields(service = %service))]
    pub fn service_closure(&self, service: &ShapeId) -> Result<Vec<ShapeId>, ModelError> {
        let mut seen: BTreeSet<ShapeId> = BTreeSet::new();
        let mut queue: VecDeque<(ShapeId, String)> = VecDeque::new();
        queue.push_back((service.clone(), "service closure root".to_string()));

        while let Some((id, context)) = queue.pop_front() {
            if seen.contains(&id) {
                continue;
            }
            let shape = self.shape(&id).ok_or_else(|| ModelError::unknown(&id, context))?;
            seen.insert(id.clone());

            for member in shape.members() {
                queue.push_back((member.target.clone(), format!("member `{}`", member.id)));
            }
            match &shape.kind {
                ShapeKind::Operation { input, output, errors } => {
                    for next in input.iter().chain(output.iter()).chain(errors.iter()) {
                        queue.push_back((next.clone(), format!("operation `{id}`")));
                    }
                }
                ShapeKind::Service { operations, .. } => {
                    for op in operations {
                        queue.push_back((op.clone(), format!("service `{id}`")));
                    }
                }
                _ => {}
            }
        }

        tracing::debug!(shapes = seen.len(), "computed service closure");
        Ok(seen.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Traits;

    fn id(text: &str) -> ShapeId {
        ShapeId::parse(text).unwrap()
    }

    fn sample() -> Model {
        let mut model = Model::new();
        let forecast = id("ns#Forecast");
        model.insert(Shape::new(
            forecast.clone(),
            ShapeKind::Structure {
                members: vec![Member::new(&forecast, "chance", id("smithy.api#Float"))],
            },
        ));
        let op = id("ns#GetForecast");
        model.insert(Shape::new(
            op.clone(),
            ShapeKind::Operation {
                input: None,
                output: Some(forecast),
                errors: vec![],
            },
        ));
        model.insert(Shape::new(
            id("ns#Weather"),
            ShapeKind::Service {
                version: "2024-01-01".to_string(),
                operations: vec![op],
            },
        ));
        model
    }

    #[test]
    fn test_prelude_present() {
        let model = Model::new();
        assert!(model.shape(&id("smithy.api#String")).is_some());
        assert!(Model::is_prelude(&id("smithy.api#Unit")));
    }

    #[test]
    fn test_expect_shape_unknown() {
        let err = Model::new().expect_shape(&id("ns#Nope")).unwrap_err();
        assert!(matches!(err, ModelError::UnknownShapeReference { .. }));
    }

    #[test]
    fn test_expect_member_missing() {
        let err = sample().expect_member(&id("ns#Forecast"), "nope").unwrap_err();
        assert!(matches!(err, ModelError::MissingMember { ref member, .. } if member == "nope"));
    }

    #[test]
    fn test_member_by_id() {
        let model = sample();
        let member = model.member(&id("ns#Forecast$chance")).unwrap();
        assert_eq!(member.target, id("smithy.api#Float"));
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_dangling_target() {
        let mut model = sample();
        let s = id("ns#Broken");
        model.insert(Shape::new(
            s.clone(),
            ShapeKind::Structure {
                members: vec![Member::new(&s, "x", id("ns#Missing"))],
            },
        ));
        let err = model.validate().unwrap_err();
        assert!(matches!(err, ModelError::UnknownShapeReference { ref id, .. } if id.name() == "Missing"));
    }

    #[test]
    fn test_validate_error_without_trait() {
        let mut model = sample();
        let op = id("ns#Bad");
        model.insert(Shape::new(
            op,
            ShapeKind::Operation {
                input: None,
                output: None,
                errors: vec![id("ns#Forecast")],
            },
        ));
        assert!(matches!(model.validate(), Err(ModelError::InvalidModel { .. })));
    }

    #[test]
    fn test_validate_rejects_self_containing_list() {
        let mut model = sample();
        let list = id("ns#Loop");
        model.insert(Shape::new(
            list.clone(),
            ShapeKind::List {
                member: Box::new(Member::new(&list, "member", list.clone())),
            },
        ));
        let err = model.validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidModel { ref shape, .. } if shape == "ns#Loop"));
    }

    #[test]
    fn test_validate_rejects_list_map_cycle() {
        let mut model = sample();
        let list = id("ns#Rows");
        let map = id("ns#Row");
        model.insert(Shape::new(
            list.clone(),
            ShapeKind::List {
                member: Box::new(Member::new(&list, "member", map.clone())),
            },
        ));
        model.insert(Shape::new(
            map.clone(),
            ShapeKind::Map {
                key: Box::new(Member::new(&map, "key", id("smithy.api#String"))),
                value: Box::new(Member::new(&map, "value", list.clone())),
            },
        ));
        assert!(matches!(model.validate(), Err(ModelError::InvalidModel { .. })));
    }

    #[test]
    fn test_validate_allows_cycle_through_structure() {
        let mut model = sample();
        let node = id("ns#Node");
        let children = id("ns#Children");
        model.insert(Shape::new(
            node.clone(),
            ShapeKind::Structure {
                members: vec![Member::new(&node, "children", children.clone())],
            },
        ));
        model.insert(Shape::new(
            children.clone(),
            ShapeKind::List {
                member: Box::new(Member::new(&children, "member", node)),
            },
        ));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_service_closure_sorted_and_complete() {
        let closure = sample().service_closure(&id("ns#Weather")).unwrap();
        let names: Vec<String> = closure.iter().map(|i| i.to_string()).collect();
        assert_eq!(
            names,
            vec!["ns#Forecast", "ns#GetForecast", "ns#Weather", "smithy.api#Float"]
        );
    }

    #[test]
    fn test_service_closure_handles_cycles() {
        let mut model = Model::new();
        let node = id("ns#Node");
        model.insert(Shape::new(
            node.clone(),
            ShapeKind::Structure {
                members: vec![Member::new(&node, "next", node.clone()).with_traits(Traits::default())],
            },
        ));
        model.insert(Shape::new(
            id("ns#Svc"),
            ShapeKind::Service {
                version: "1".to_string(),
                operations: vec![],
            },
        ));
        let closure = model.service_closure(&id("ns#Svc")).unwrap();
        assert_eq!(closure.len(), 1);
        assert!(model.service_closure(&node).unwrap().contains(&node));
    }

    #[test]
    fn test_operations_requires_service() {
        assert!(sample().operations(&id("ns#Forecast")).is_err());
        assert_eq!(sample().operations(&id("ns#Weather")).unwrap().len(), 1);
    }
}
