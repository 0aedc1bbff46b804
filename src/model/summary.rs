//! JSON renderings of Bedrock model records.
//!
//! The SDK types are not `Serialize`, so they are rendered by hand using the
//! service's own camelCase field names. Nothing here interprets the values.

use aws_sdk_bedrock::primitives::{DateTime, DateTimeFormat};
use aws_sdk_bedrock::types::{
    FoundationModelDetails, FoundationModelLifecycle, FoundationModelSummary, InferenceType,
    ModelCustomization, ModelModality,
};
use serde_json::{json, Map, Value};

pub fn model_summary_json(model: &FoundationModelSummary) -> Value {
    render(ModelFields {
        model_arn: model.model_arn(),
        model_id: model.model_id(),
        model_name: model.model_name(),
        provider_name: model.provider_name(),
        input_modalities: model.input_modalities(),
        output_modalities: model.output_modalities(),
        response_streaming_supported: model.response_streaming_supported(),
        customizations_supported: model.customizations_supported(),
        inference_types_supported: model.inference_types_supported(),
        model_lifecycle: model.model_lifecycle(),
    })
}

pub fn model_details_json(model: &FoundationModelDetails) -> Value {
    render(ModelFields {
        model_arn: model.model_arn(),
        model_id: model.model_id(),
        model_name: model.model_name(),
        provider_name: model.provider_name(),
        input_modalities: model.input_modalities(),
        output_modalities: model.output_modalities(),
        response_streaming_supported: model.response_streaming_supported(),
        customizations_supported: model.customizations_supported(),
        inference_types_supported: model.inference_types_supported(),
        model_lifecycle: model.model_lifecycle(),
    })
}

// Summary and details share the same shape in the Bedrock API.
struct ModelFields<'a> {
    model_arn: &'a str,
    model_id: &'a str,
    model_name: Option<&'a str>,
    provider_name: Option<&'a str>,
    input_modalities: &'a [ModelModality],
    output_modalities: &'a [ModelModality],
    response_streaming_supported: Option<bool>,
    customizations_supported: &'a [ModelCustomization],
    inference_types_supported: &'a [InferenceType],
    model_lifecycle: Option<&'a FoundationModelLifecycle>,
}

fn render(fields: ModelFields<'_>) -> Value {
    let mut out = Map::new();
    out.insert("modelArn".into(), json!(fields.model_arn));
    out.insert("modelId".into(), json!(fields.model_id));
    if let Some(name) = fields.model_name {
        out.insert("modelName".into(), json!(name));
    }
    if let Some(provider) = fields.provider_name {
        out.insert("providerName".into(), json!(provider));
    }
    out.insert(
        "inputModalities".into(),
        strings(fields.input_modalities.iter().map(|m| m.as_str())),
    );
    out.insert(
        "outputModalities".into(),
        strings(fields.output_modalities.iter().map(|m| m.as_str())),
    );
    if let Some(streaming) = fields.response_streaming_supported {
        out.insert("responseStreamingSupported".into(), json!(streaming));
    }
    out.insert(
        "customizationsSupported".into(),
        strings(fields.customizations_supported.iter().map(|c| c.as_str())),
    );
    out.insert(
        "inferenceTypesSupported".into(),
        strings(fields.inference_types_supported.iter().map(|t| t.as_str())),
    );
    if let Some(lifecycle) = fields.model_lifecycle {
        out.insert("modelLifecycle".into(), lifecycle_json(lifecycle));
    }
    Value::Object(out)
}

fn lifecycle_json(lifecycle: &FoundationModelLifecycle) -> Value {
    let mut out = Map::new();
    out.insert("status".into(), json!(lifecycle.status().as_str()));

    let times: [(&str, Option<&DateTime>); 4] = [
        ("startOfLifeTime", lifecycle.start_of_life_time()),
        ("endOfLifeTime", lifecycle.end_of_life_time()),
        ("legacyTime", lifecycle.legacy_time()),
        ("publicExtendedAccessTime", lifecycle.public_extended_access_time()),
    ];
    for (key, time) in times {
        // ISO-8601, as the service itself returns them
        if let Some(formatted) = time.and_then(|t| t.fmt(DateTimeFormat::DateTime).ok()) {
            out.insert(key.into(), json!(formatted));
        }
    }
    Value::Object(out)
}

fn strings<'a>(values: impl Iterator<Item = &'a str>) -> Value {
    Value::Array(values.map(|v| Value::String(v.to_string())).collect())
}
