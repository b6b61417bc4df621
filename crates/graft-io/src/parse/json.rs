//! Typed field access over tokenized JSON.
//!
//! The tokenizer (serde_json) yields untyped values; these helpers give the
//! section parsers the three-way outcome they work with: `Ok(Some)` on
//! success, `Ok(None)` for a missing field, `Err` on a type mismatch. A
//! missing optional field is never an error; callers substitute the
//! documented default.

use serde_json::{Map, Value};

use crate::{GltfError, Result};

pub(crate) type JsonObject = Map<String, Value>;

pub(crate) fn as_object(value: &Value) -> Result<&JsonObject> {
    value.as_object().ok_or(GltfError::InvalidGltf)
}

pub(crate) fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or(GltfError::InvalidGltf)
}

pub(crate) fn as_str(value: &Value) -> Result<&str> {
    value.as_str().ok_or(GltfError::InvalidGltf)
}

pub(crate) fn as_usize(value: &Value) -> Result<usize> {
    value
        .as_u64()
        .map(|v| v as usize)
        .ok_or(GltfError::InvalidGltf)
}

pub(crate) fn as_u64(value: &Value) -> Result<u64> {
    value.as_u64().ok_or(GltfError::InvalidGltf)
}

pub(crate) fn as_f32(value: &Value) -> Result<f32> {
    value
        .as_f64()
        .map(|v| v as f32)
        .ok_or(GltfError::InvalidGltf)
}

pub(crate) fn object_field<'a>(obj: &'a JsonObject, key: &str) -> Result<Option<&'a JsonObject>> {
    obj.get(key).map(as_object).transpose()
}

pub(crate) fn array_field<'a>(obj: &'a JsonObject, key: &str) -> Result<Option<&'a Vec<Value>>> {
    obj.get(key).map(as_array).transpose()
}

pub(crate) fn str_field<'a>(obj: &'a JsonObject, key: &str) -> Result<Option<&'a str>> {
    obj.get(key).map(as_str).transpose()
}

pub(crate) fn string_field(obj: &JsonObject, key: &str) -> Result<Option<String>> {
    Ok(str_field(obj, key)?.map(str::to_owned))
}

pub(crate) fn usize_field(obj: &JsonObject, key: &str) -> Result<Option<usize>> {
    obj.get(key).map(as_usize).transpose()
}

pub(crate) fn u64_field(obj: &JsonObject, key: &str) -> Result<Option<u64>> {
    obj.get(key).map(as_u64).transpose()
}

pub(crate) fn f32_field(obj: &JsonObject, key: &str) -> Result<Option<f32>> {
    obj.get(key).map(as_f32).transpose()
}

pub(crate) fn bool_field(obj: &JsonObject, key: &str) -> Result<Option<bool>> {
    obj.get(key)
        .map(|v| v.as_bool().ok_or(GltfError::InvalidGltf))
        .transpose()
}

/// A required field; missing is a document error.
pub(crate) fn require<T>(field: Option<T>) -> Result<T> {
    field.ok_or(GltfError::InvalidGltf)
}

/// A fixed-length array of numbers, e.g. a color factor or matrix.
pub(crate) fn f32_array_field<const N: usize>(
    obj: &JsonObject,
    key: &str,
) -> Result<Option<[f32; N]>> {
    let Some(value) = obj.get(key) else {
        return Ok(None);
    };
    let array = as_array(value)?;
    if array.len() != N {
        return Err(GltfError::InvalidGltf);
    }
    let mut out = [0.0f32; N];
    for (slot, item) in out.iter_mut().zip(array) {
        *slot = as_f32(item)?;
    }
    Ok(Some(out))
}

/// A variable-length list of numbers, e.g. morph weights.
pub(crate) fn f32_list_field(obj: &JsonObject, key: &str) -> Result<Option<Vec<f32>>> {
    let Some(value) = obj.get(key) else {
        return Ok(None);
    };
    let array = as_array(value)?;
    array.iter().map(as_f32).collect::<Result<Vec<_>>>().map(Some)
}

/// A list of entity indices, e.g. scene roots or node children.
pub(crate) fn index_list_field(obj: &JsonObject, key: &str) -> Result<Option<Vec<usize>>> {
    let Some(value) = obj.get(key) else {
        return Ok(None);
    };
    let array = as_array(value)?;
    array
        .iter()
        .map(as_usize)
        .collect::<Result<Vec<_>>>()
        .map(Some)
}
