#![no_main]

use libfuzzer_sys::fuzz_target;
use shapegen::backend::{Codegen, CodegenSettings, MemorySink};
use shapegen_model::{Model, ShapeKind};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    // Loading may fail; generation for every service in a loaded model must not panic
    let Ok(model) = Model::from_json_str(s) else {
        return;
    };
    let services: Vec<_> = model
        .shapes()
        .filter(|shape| matches!(shape.kind, ShapeKind::Service { .. }))
        .map(|shape| shape.id.clone())
        .collect();
    for service in services {
        let mut sink = MemorySink::new();
        let _ = Codegen::new(CodegenSettings::new("example.com/fuzz", service)).generate(&model, &mut sink);
    }
});
