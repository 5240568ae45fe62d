use std::collections::HashMap;

use tinyjson::JsonValue;

use crate::error::{DocumentError, RecordError};
use crate::renderer::gltf::{
    resolver, Accessor, Arena, Buffer, BufferTarget, BufferView, ComponentType, Index, Mesh, Node,
    Primitive, Scene, SceneDocument,
};

type JsonObject = HashMap<String, JsonValue>;

/// Parses a glTF JSON document into a [`SceneDocument`].
///
/// Each top-level section is parsed on its own. A section that is missing or
/// isn't an array becomes an empty arena, and a record that can't be decoded
/// is logged and leaves a vacant slot, without affecting any other record.
/// Buffers are decoded from their data uris as part of parsing.
pub fn parse_document(document: &[u8]) -> Result<SceneDocument, DocumentError> {
    let text = std::str::from_utf8(document).map_err(|_| DocumentError::InvalidUtf8)?;
    let root: JsonValue = text
        .parse()
        .map_err(|err: tinyjson::JsonParseError| DocumentError::InvalidJson(err.to_string()))?;
    let root: &JsonObject = root.get().ok_or(DocumentError::NotAnObject)?;

    let document = SceneDocument {
        scenes: parse_section(root, "scenes", parse_scene),
        nodes: parse_section(root, "nodes", parse_node),
        meshes: parse_section(root, "meshes", parse_mesh),
        buffers: parse_section(root, "buffers", parse_buffer),
        buffer_views: parse_section(root, "bufferViews", parse_buffer_view),
        accessors: parse_section(root, "accessors", parse_accessor),
    };
    log::debug!(
        "parsed glTF: {} scenes, {} nodes, {} meshes, {} buffers, {} buffer views, {} accessors",
        document.scenes.len(),
        document.nodes.len(),
        document.meshes.len(),
        document.buffers.len(),
        document.buffer_views.len(),
        document.accessors.len(),
    );
    Ok(document)
}

fn parse_section<T>(
    root: &JsonObject,
    section: &'static str,
    parse_record: fn(&JsonObject) -> Result<T, String>,
) -> Arena<T> {
    let Some(records) = root.get(section).and_then(|v| v.get::<Vec<_>>()) else {
        log::debug!("glTF has no \"{section}\" array, treating it as empty");
        return Arena::default();
    };
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let record = record
                .get::<JsonObject>()
                .ok_or_else(|| "not an object".to_string())
                .and_then(parse_record);
            match record {
                Ok(record) => Some(record),
                Err(reason) => {
                    log::error!("skipping {}", RecordError::new(section, i, reason));
                    None
                }
            }
        })
        .collect()
}

fn parse_scene(scene: &JsonObject) -> Result<Scene, String> {
    Ok(Scene {
        name: take_name(scene)?,
        nodes: take_indices(scene, "nodes")?,
    })
}

fn parse_node(node: &JsonObject) -> Result<Node, String> {
    let children = if node.contains_key("children") {
        take_indices(node, "children")?
    } else {
        Vec::new()
    };
    Ok(Node {
        name: take_name(node)?,
        mesh: Index::new(take_usize(node, "mesh")?),
        children,
    })
}

fn parse_mesh(mesh: &JsonObject) -> Result<Mesh, String> {
    let primitives = take_array(mesh, "primitives")?
        .iter()
        .enumerate()
        .map(|(i, primitive)| {
            primitive
                .get::<JsonObject>()
                .ok_or_else(|| "not an object".to_string())
                .and_then(parse_primitive)
                .map_err(|reason| format!("primitive {i}: {reason}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Mesh {
        name: take_name(mesh)?,
        primitives,
    })
}

fn parse_primitive(primitive: &JsonObject) -> Result<Primitive, String> {
    let attributes_json = primitive
        .get("attributes")
        .ok_or("missing \"attributes\"")?
        .get::<JsonObject>()
        .ok_or("\"attributes\" is not an object")?;
    let mut attributes = HashMap::with_capacity(attributes_json.len());
    for (semantic, accessor) in attributes_json {
        let accessor = as_usize(accessor).ok_or_else(|| {
            format!("attribute \"{semantic}\" is not a non-negative integer")
        })?;
        attributes.insert(semantic.clone(), Index::new(accessor));
    }
    Ok(Primitive {
        attributes,
        indices: Index::new(take_usize(primitive, "indices")?),
    })
}

fn parse_buffer(buffer: &JsonObject) -> Result<Buffer, String> {
    let uri = take_string(buffer, "uri")?;
    let byte_length = take_usize(buffer, "byteLength")?;
    let data = resolver::decode_data_uri(&uri);
    if let Err(err) = &data {
        log::error!("buffer \"{}\" could not be decoded: {err}", truncated(&uri));
    }
    Ok(Buffer {
        name: take_name(buffer)?,
        byte_length,
        uri,
        data,
    })
}

fn parse_buffer_view(view: &JsonObject) -> Result<BufferView, String> {
    let byte_stride = if view.contains_key("byteStride") {
        take_usize(view, "byteStride")?
    } else {
        0
    };
    let target = u32::try_from(take_usize(view, "target")?)
        .map_err(|_| "\"target\" is out of range".to_string())?;
    Ok(BufferView {
        name: take_name(view)?,
        buffer: Index::new(take_usize(view, "buffer")?),
        byte_offset: take_usize(view, "byteOffset")?,
        byte_length: take_usize(view, "byteLength")?,
        byte_stride,
        target: BufferTarget::from_code(target),
    })
}

fn parse_accessor(accessor: &JsonObject) -> Result<Accessor, String> {
    let component_type = take_usize(accessor, "componentType")?;
    let component_type = u32::try_from(component_type)
        .ok()
        .and_then(ComponentType::from_code)
        .ok_or_else(|| format!("unknown componentType {component_type}"))?;
    Ok(Accessor {
        name: take_name(accessor)?,
        buffer_view: Index::new(take_usize(accessor, "bufferView")?),
        byte_offset: take_usize(accessor, "byteOffset")?,
        component_type,
        count: take_usize(accessor, "count")?,
        type_: take_string(accessor, "type")?,
    })
}

fn as_usize(value: &JsonValue) -> Option<usize> {
    let n = *value.get::<f64>()?;
    (n >= 0.0 && n.fract() == 0.0 && n <= usize::MAX as f64).then_some(n as usize)
}

/// Return the field as a usize if it's a non-negative integer.
fn take_usize(object: &JsonObject, key: &str) -> Result<usize, String> {
    let value = object.get(key).ok_or_else(|| format!("missing \"{key}\""))?;
    as_usize(value).ok_or_else(|| format!("\"{key}\" is not a non-negative integer"))
}

fn take_string(object: &JsonObject, key: &str) -> Result<String, String> {
    let value = object.get(key).ok_or_else(|| format!("missing \"{key}\""))?;
    value
        .get::<String>()
        .cloned()
        .ok_or_else(|| format!("\"{key}\" is not a string"))
}

fn take_array<'a>(object: &'a JsonObject, key: &str) -> Result<&'a Vec<JsonValue>, String> {
    let value = object.get(key).ok_or_else(|| format!("missing \"{key}\""))?;
    value
        .get::<Vec<_>>()
        .ok_or_else(|| format!("\"{key}\" is not an array"))
}

fn take_indices<T>(object: &JsonObject, key: &str) -> Result<Vec<Index<T>>, String> {
    take_array(object, key)?
        .iter()
        .map(|value| {
            as_usize(value)
                .map(Index::new)
                .ok_or_else(|| format!("\"{key}\" contains a non-index value"))
        })
        .collect()
}

/// Names are optional, but a name that isn't a string is still malformed.
fn take_name(object: &JsonObject) -> Result<Option<String>, String> {
    match object.get("name") {
        None => Ok(None),
        Some(_) => take_string(object, "name").map(Some),
    }
}

/// Data uris are long, keep them out of the logs.
fn truncated(uri: &str) -> &str {
    match uri.char_indices().nth(48) {
        Some((end, _)) => &uri[..end],
        None => uri,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IndexError, ResolveError};
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r#"{
        "asset": { "version": "2.0" },
        "scenes": [ { "name": "main", "nodes": [0] } ],
        "nodes": [ { "mesh": 0, "children": [] } ],
        "meshes": [ {
            "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ]
        } ],
        "buffers": [ { "uri": "data:application/octet-stream;base64,AQID", "byteLength": 3 } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 2, "target": 34962 },
            { "buffer": 0, "byteOffset": 2, "byteLength": 1, "byteStride": 0, "target": 34963 }
        ],
        "accessors": [
            { "bufferView": 0, "byteOffset": 0, "componentType": 5126, "count": 4, "type": "VEC3" },
            { "bufferView": 1, "byteOffset": 0, "componentType": 5123, "count": 6, "type": "SCALAR" }
        ]
    }"#;

    #[test]
    fn parses_every_section() {
        let document = parse_document(MINIMAL.as_bytes()).unwrap();

        let scene = document.scenes.get(Index::new(0)).unwrap();
        assert_eq!(scene.name.as_deref(), Some("main"));
        assert_eq!(scene.nodes, vec![Index::new(0)]);

        let node = document.nodes.get(Index::new(0)).unwrap();
        assert_eq!(node.mesh, Index::new(0));
        assert!(node.children.is_empty());

        let mesh = document.meshes.get(Index::new(0)).unwrap();
        assert_eq!(mesh.primitives.len(), 1);
        assert_eq!(mesh.primitives[0].position(), Some(Index::new(0)));
        assert_eq!(mesh.primitives[0].indices, Index::new(1));

        let buffer = document.buffers.get(Index::new(0)).unwrap();
        assert_eq!(buffer.byte_length, 3);
        assert_eq!(buffer.data.as_deref(), Ok(&[1u8, 2, 3][..]));

        let view = document.buffer_views.get(Index::new(1)).unwrap();
        assert_eq!(view.byte_offset, 2);
        assert_eq!(view.target, BufferTarget::ElementArrayBuffer);

        let accessor = document.accessors.get(Index::new(1)).unwrap();
        assert_eq!(accessor.component_type, ComponentType::UnsignedShort);
        assert_eq!(accessor.count, 6);
        assert_eq!(accessor.type_, "SCALAR");
    }

    #[test]
    fn missing_or_malformed_sections_are_empty() {
        let document = parse_document(
            br#"{
                "scenes": "not an array",
                "nodes": [ { "mesh": 0 } ]
            }"#,
        )
        .unwrap();
        assert!(document.scenes.is_empty());
        assert!(document.meshes.is_empty());
        assert!(document.buffers.is_empty());
        assert!(document.buffer_views.is_empty());
        assert!(document.accessors.is_empty());
        assert_eq!(document.nodes.len(), 1);
        assert!(document.nodes.get(Index::new(0)).is_ok());
    }

    #[test]
    fn malformed_record_is_skipped_in_place() {
        let document = parse_document(
            br#"{
                "nodes": [
                    { "name": "no mesh" },
                    { "mesh": "zero" },
                    { "name": "third", "mesh": 2 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(document.nodes.len(), 3);
        assert_eq!(
            document.nodes.get(Index::new(0)),
            Err(IndexError::Vacant {
                kind: "node",
                index: 0
            })
        );
        assert!(document.nodes.get(Index::new(1)).is_err());
        let third = document.nodes.get(Index::new(2)).unwrap();
        assert_eq!(third.name.as_deref(), Some("third"));
        assert_eq!(third.mesh, Index::new(2));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let document = parse_document(
            br#"{
                "scenes": [ { "nodes": [], "extras": { "anything": true } } ],
                "materials": [ {} ]
            }"#,
        )
        .unwrap();
        assert_eq!(document.scenes.iter().count(), 1);
    }

    #[test]
    fn duplicate_attribute_keys_keep_the_last_value() {
        let document = parse_document(
            br#"{
                "meshes": [ {
                    "primitives": [ {
                        "attributes": { "POSITION": 0, "POSITION": 3 },
                        "indices": 1
                    } ]
                } ]
            }"#,
        )
        .unwrap();
        let mesh = document.meshes.get(Index::new(0)).unwrap();
        assert_eq!(mesh.primitives[0].position(), Some(Index::new(3)));
    }

    #[test]
    fn primitive_without_indices_skips_the_mesh() {
        let document = parse_document(
            br#"{
                "meshes": [
                    { "primitives": [ { "attributes": { "POSITION": 0 } } ] },
                    { "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ] }
                ]
            }"#,
        )
        .unwrap();
        assert!(document.meshes.get(Index::new(0)).is_err());
        assert!(document.meshes.get(Index::new(1)).is_ok());
    }

    #[test]
    fn unknown_component_type_skips_the_accessor() {
        let document = parse_document(
            br#"{
                "accessors": [
                    { "bufferView": 0, "byteOffset": 0, "componentType": 1234, "count": 1, "type": "SCALAR" }
                ]
            }"#,
        )
        .unwrap();
        assert!(document.accessors.get(Index::new(0)).is_err());
    }

    #[test]
    fn unsupported_uri_keeps_the_buffer_record() {
        let document = parse_document(
            br#"{
                "buffers": [ { "uri": "http://example.com/scene.bin", "byteLength": 60 } ]
            }"#,
        )
        .unwrap();
        let buffer = document.buffers.get(Index::new(0)).unwrap();
        assert_eq!(
            buffer.data,
            Err(ResolveError::UnsupportedUri(
                "http://example.com/scene.bin".to_string()
            ))
        );
    }

    #[test]
    fn rejects_documents_that_are_not_objects() {
        assert_eq!(
            parse_document(b"[1, 2, 3]").unwrap_err(),
            DocumentError::NotAnObject
        );
        assert!(matches!(
            parse_document(b"{ \"scenes\": [").unwrap_err(),
            DocumentError::InvalidJson(_)
        ));
        assert_eq!(
            parse_document(&[0xff, 0xfe]).unwrap_err(),
            DocumentError::InvalidUtf8
        );
    }
}
