//! glTF documents shared by the tests.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use super::DATA_URI_PREFIX;

pub const QUAD_VERTICES: [f32; 12] = [
    -0.5, -0.5, 0.0, //
    0.5, -0.5, 0.0, //
    0.5, 0.5, 0.0, //
    -0.5, 0.5, 0.0,
];
pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// 48 bytes of vertices followed by 12 bytes of indices.
pub fn quad_buffer_uri() -> String {
    let mut bytes = bytemuck::cast_slice::<f32, u8>(&QUAD_VERTICES).to_vec();
    bytes.extend_from_slice(bytemuck::cast_slice::<u16, u8>(&QUAD_INDICES));
    format!("{DATA_URI_PREFIX}{}", BASE64.encode(bytes))
}

/// One scene, one node, one mesh with one primitive, backed by `uri`.
pub fn quad_document(uri: &str) -> String {
    format!(
        r#"{{
    "asset": {{ "version": "2.0" }},
    "scenes": [ {{ "nodes": [0] }} ],
    "nodes": [ {{ "mesh": 0 }} ],
    "meshes": [ {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }} ] }} ],
    "buffers": [ {{ "uri": "{uri}", "byteLength": 60 }} ],
    "bufferViews": [
        {{ "buffer": 0, "byteOffset": 0, "byteLength": 48, "target": 34962 }},
        {{ "buffer": 0, "byteOffset": 48, "byteLength": 12, "target": 34963 }}
    ],
    "accessors": [
        {{ "bufferView": 0, "byteOffset": 0, "componentType": 5126, "count": 4, "type": "VEC3" }},
        {{ "bufferView": 1, "byteOffset": 0, "componentType": 5123, "count": 6, "type": "SCALAR" }}
    ]
}}"#
    )
}

/// Two meshes with one primitive each, the first backed by `first_uri` and
/// the second by `second_uri`.
pub fn two_quad_document(first_uri: &str, second_uri: &str) -> String {
    format!(
        r#"{{
    "scenes": [ {{ "nodes": [0, 1] }} ],
    "nodes": [ {{ "mesh": 0 }}, {{ "mesh": 1 }} ],
    "meshes": [
        {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }} ] }},
        {{ "primitives": [ {{ "attributes": {{ "POSITION": 2 }}, "indices": 3 }} ] }}
    ],
    "buffers": [
        {{ "uri": "{first_uri}", "byteLength": 60 }},
        {{ "uri": "{second_uri}", "byteLength": 60 }}
    ],
    "bufferViews": [
        {{ "buffer": 0, "byteOffset": 0, "byteLength": 48, "target": 34962 }},
        {{ "buffer": 0, "byteOffset": 48, "byteLength": 12, "target": 34963 }},
        {{ "buffer": 1, "byteOffset": 0, "byteLength": 48, "target": 34962 }},
        {{ "buffer": 1, "byteOffset": 48, "byteLength": 12, "target": 34963 }}
    ],
    "accessors": [
        {{ "bufferView": 0, "byteOffset": 0, "componentType": 5126, "count": 4, "type": "VEC3" }},
        {{ "bufferView": 1, "byteOffset": 0, "componentType": 5123, "count": 6, "type": "SCALAR" }},
        {{ "bufferView": 2, "byteOffset": 0, "componentType": 5126, "count": 4, "type": "VEC3" }},
        {{ "bufferView": 3, "byteOffset": 0, "componentType": 5123, "count": 6, "type": "SCALAR" }}
    ]
}}"#
    )
}
