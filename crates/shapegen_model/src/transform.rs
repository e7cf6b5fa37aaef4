//! Model transforms run before code generation.

use std::collections::BTreeSet;

use crate::{Member, Model, ModelError, Shape, ShapeId, ShapeKind, SyntheticTrait, Traits};

/// Suffix appended to the service namespace for synthesized operation input/output shapes.
pub const SYNTHETIC_NAMESPACE_SUFFIX: &str = ".synthetic";

/// Give every operation of `service` its own input and output structure.
///
/// For operation `GetForecast` in a service in namespace `example.weather` this creates
/// `example.weather.synthetic#GetForecastInput` and `...#GetForecastOutput`. Members are copied from the
/// hand-authored input/output when the operation has one; otherwise the new structure is empty. Each copy carries a
/// [`SyntheticTrait`] pointing back at its operation, and the operation is rewired to the copies.
///
/// ## Notes
/// - Running the transform twice is a no-op for operations that already point at synthesized shapes.
/// - The original input/output shapes stay in the model; other shapes may still target them.
#[tracing::instrument(skip_all, fields(service = %service))]
pub fn synthesize_operation_io(model: &Model, service: &ShapeId) -> Result<Model, ModelError> {
    let synthetic_namespace = format!("{}{SYNTHETIC_NAMESPACE_SUFFIX}", service.namespace());
    let mut result = model.clone();
    let operations: BTreeSet<ShapeId> = model.operations(service)?.into_iter().map(|op| op.id.clone()).collect();

    for op_id in &operations {
        let op = model.expect_shape(op_id)?;
        let ShapeKind::Operation { input, output, errors } = &op.kind else {
            continue;
        };

        let input_id = synthesize(model, &mut result, op_id, input.as_ref(), &synthetic_namespace, "Input")?;
        let output_id = synthesize(model, &mut result, op_id, output.as_ref(), &synthetic_namespace, "Output")?;

        result.insert(
            Shape::new(
                op_id.clone(),
                ShapeKind::Operation {
                    input: Some(input_id),
                    output: Some(output_id),
                    errors: errors.clone(),
                },
            )
            .with_traits(op.traits.clone()),
        );
    }

    tracing::debug!(operations = operations.len(), "synthesized operation input/output shapes");
    Ok(result)
}

fn synthesize(
    model: &Model,
    result: &mut Model,
    operation: &ShapeId,
    original: Option<&ShapeId>,
    namespace: &str,
    suffix: &str,
) -> Result<ShapeId, ModelError> {
    if let Some(existing) = original {
        if model.expect_shape(existing)?.is_synthetic() {
            return Ok(existing.clone());
        }
    }

    let id = ShapeId::new(namespace, format!("{}{suffix}", operation.name()));
    let (members, documentation) = match original {
        Some(original_id) => {
            let shape = model.expect_shape(original_id)?;
            let ShapeKind::Structure { members } = &shape.kind else {
                return Err(ModelError::invalid(
                    operation.to_string(),
                    format!("input/output `{original_id}` is not a structure"),
                ));
            };
            let copied = members
                .iter()
                .map(|m| Member::new(&id, m.name(), m.target.clone()).with_traits(m.traits.clone()))
                .collect();
            (copied, shape.traits.documentation.clone())
        }
        None => (Vec::new(), None),
    };

    let traits = Traits {
        documentation,
        synthetic: Some(SyntheticTrait {
            operation: operation.clone(),
            original: original.cloned(),
        }),
        ..Traits::default()
    };
    result.insert(Shape::new(id.clone(), ShapeKind::Structure { members }).with_traits(traits));
    Ok(id)
}
